pub mod store;
pub mod hours;
pub mod populator;

pub use store::*;
pub use hours::*;
pub use populator::*;
