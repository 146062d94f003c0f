pub mod activity;
pub mod auth;
pub mod config;
pub mod cost;
pub mod datasource;
pub mod execution;
pub mod init;
pub mod role;
pub mod solution;
pub mod user;
pub mod workspace;
