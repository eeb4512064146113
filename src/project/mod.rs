//! Project registration, measurement recording and lookup

pub mod search;
pub mod tracker;

pub use search::*;
pub use tracker::*;
