//! Password authentication and bearer-token sessions.
//!
//! Login and registration verify credentials, then mint a short-lived
//! HS256 token whose string is also the key of a durable session record.
//! Protected routes run behind [`require_session`], which requires both a
//! valid signature and a live record.

mod credentials;
mod errors;
mod gate;
mod header;
mod sessions;
mod types;

pub use credentials::Credentials;
pub use errors::{ApiAuthError, AuthError, AuthErrorKind};
pub use gate::{authorize, require_session};
pub use sessions::SessionManager;
pub use types::{Identity, Session};
