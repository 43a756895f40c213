//! # Domain Module
//!
//! Session state machine and error taxonomy for the wallet session.

pub mod errors;
pub mod session;

pub use errors::*;
pub use session::*;
