pub mod claims;
pub mod session;
pub mod store;

pub use claims::{decode_identity_token, IdentityClaims};
pub use session::{PermissionSource, Session, SessionManager, Tokens};
pub use store::{FileTokenStore, MemoryTokenStore, StoredSession, TokenStore};
