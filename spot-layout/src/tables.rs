//! The layout tables

pub mod gpos;
pub mod gsub;
pub mod layout;
