//! Core types for gatekit.

pub mod events;
pub mod provider;
pub mod session;

pub use events::*;
pub use provider::*;
pub use session::*;
