//! Domain models for the medscan system.

mod fields;
mod gender;
mod record;
mod session;
mod visit_date;

pub use fields::*;
pub use gender::*;
pub use record::*;
pub use session::*;
pub use visit_date::*;
