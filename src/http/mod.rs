pub mod cancel;
pub mod client;

pub use cancel::{CancelGuard, CancelToken};
pub use client::{ApiRequest, HttpClient};
