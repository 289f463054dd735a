//! Domain models for the staff panel.
//!
//! - [`CurrentUser`] - the signed-in account as reported by the backend
//! - [`SessionTokens`] - the backend JWT pair held in the session

pub mod session;
pub mod user;

pub use session::{AuthKey, SessionTokens, keys as session_keys};
pub use user::CurrentUser;
