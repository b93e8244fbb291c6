//! Credentials for HTTP Basic authentication.
//!
//! - [`BasicCredentials`]: username and password, with a redacted `Debug`
//! - [`AuthScope`]: the host and port a credential may be sent to
//! - [`CredentialStore`]: credentials keyed by scope
//! - [`load_password_file`]: one-shot password loading

mod credential;
mod password;

pub use credential::{AuthScope, BasicCredentials, CredentialStore};
pub use password::load_password_file;
