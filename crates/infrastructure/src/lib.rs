//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod iics_session_client;
mod postgres_login_event_repository;

pub use iics_session_client::{
    IicsCredentials, IicsSessionClient, Session, login_url_for_region,
};
pub use postgres_login_event_repository::PostgresLoginEventRepository;
