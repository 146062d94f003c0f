pub mod query_cache;
pub mod tag;

pub use query_cache::{CacheKey, FetchTicket, QueryCache};
pub use tag::{Tag, TagId, TagKind};
