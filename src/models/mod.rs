//! Data models for the Pumpkinfest RSVP system.
//!
//! Field names match the frontend JSON exactly (camelCase).

mod envelope;
mod gallery;
mod rsvp;

pub use envelope::*;
pub use gallery::*;
pub use rsvp::*;
