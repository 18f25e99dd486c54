//! test data shared between the spot crates.

pub mod bebuffer;
pub mod gpos;
pub mod gsub;
pub mod layout;

pub use bebuffer::BeBuffer;
