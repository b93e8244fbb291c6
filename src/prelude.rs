//! Common imports for security client users.
//!
//! ```rust
//! use jenkins_security::prelude::*;
//! ```

pub use crate::security::{BasicSecurityClient, SecurityClient};

pub use crate::client::{HttpTransport, NetworkConfig, ResponseStream, Transport};

pub use crate::config::SecurityConfig;

pub use crate::{Error, Result};
