//! Handshake data model: properties bags, claims identities, and tickets.

pub mod claims;
pub mod properties;
pub mod ticket;

pub use claims::*;
pub use properties::*;
pub use ticket::*;
