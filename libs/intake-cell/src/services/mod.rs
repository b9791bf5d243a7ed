pub mod appointments;
pub mod calendar;
pub mod catalog;
pub mod patients;
pub mod reader;

pub use appointments::*;
pub use calendar::*;
pub use catalog::*;
pub use patients::*;
pub use reader::*;
