//! Schedule tables: planned and measured amounts by line item and period

pub mod records;
pub mod table;

pub use records::*;
pub use table::*;
