//! Client state manager.
//!
//! Holds the guest list and gallery in memory, talks to the backend over one
//! of two transports, and derives the filtered views the page renders.

mod manager;
mod sample;
mod state;
mod transport;
mod upload;
mod view;

pub use manager::*;
pub use sample::{sample_gallery, sample_rsvps};
pub use state::*;
pub use transport::*;
pub use upload::*;
pub use view::*;
