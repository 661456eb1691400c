//! Export of stored records.

mod records;

pub use records::*;
