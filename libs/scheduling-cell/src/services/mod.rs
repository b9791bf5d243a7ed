pub mod capacity;
pub mod context;
pub mod engine;
pub mod finder;
pub mod queue;
pub mod run;

pub use capacity::*;
pub use context::*;
pub use engine::*;
pub use finder::*;
pub use queue::*;
pub use run::*;
