pub mod api;
pub mod auth;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod rbac;

pub use api::WorkbenchApi;
pub use auth::{Session, SessionManager, Tokens};
pub use error::{ClientError, ClientResult};
pub use http::CancelToken;
pub use rbac::{PermissionGate, PermissionLevel, PermissionResolver, Requirement, Resource};
