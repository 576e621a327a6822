//! User accounts backend: an HTTP layer that validates requests and maps
//! outcomes to status codes, over [`service::UserService`], over a
//! [`store::UserStore`].

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod store;

pub use config::Config;
pub use db::DbPool;
pub use error::{AppError, UserError, UserResult};
pub use routes::{create_router, AppState};
pub use service::UserService;
