//! Credential check guarding the dashboard.

use tracing::{info, warn};

use crate::session::SessionFlag;

/// Hard-coded login name.
///
/// SECURITY: plaintext credentials in source, compared without hashing.
/// Kept as-is; not externally configurable.
pub const ADMIN_USERNAME: &str = "Admin";
/// Hard-coded password. See [`ADMIN_USERNAME`].
pub const ADMIN_PASSWORD: &str = "saloni123";

pub const LOGIN_SUCCESS: &str = "Logged in successfully!";
pub const LOGIN_FAILURE: &str = "Invalid username or password";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    InvalidCredentials,
}

impl LoginOutcome {
    pub fn message(self) -> &'static str {
        match self {
            LoginOutcome::Authenticated => LOGIN_SUCCESS,
            LoginOutcome::InvalidCredentials => LOGIN_FAILURE,
        }
    }
}

pub struct AccessGate;

impl AccessGate {
    /// Exact, case-sensitive match on both fields.
    pub fn check(username: &str, password: &str) -> bool {
        username == ADMIN_USERNAME && password == ADMIN_PASSWORD
    }

    /// Raise `flag` on a match. A failed attempt leaves it untouched and
    /// may be retried without limit.
    pub fn login(flag: &mut SessionFlag, username: &str, password: &str) -> LoginOutcome {
        if Self::check(username, password) {
            flag.raise();
            info!(username, "Login succeeded");
            LoginOutcome::Authenticated
        } else {
            warn!(username, "Login rejected: invalid credentials");
            LoginOutcome::InvalidCredentials
        }
    }
}
