//! vizboard-security: Access gate and the per-session login flag.
//!
//! The gate compares credentials against two literals compiled into the
//! binary. There is no hashing, rate limiting, lockout or expiry. This is a
//! known weakness carried over unchanged; see [`gate::ADMIN_USERNAME`].

pub mod gate;
pub mod session;

pub use gate::{AccessGate, LoginOutcome};
pub use session::SessionFlag;
