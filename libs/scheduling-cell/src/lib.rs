pub mod error;
pub mod models;
pub mod services;
pub mod traits;

pub use error::*;
pub use models::*;
pub use services::*;
pub use traits::*;

// Calendar types flow through the public API (slots in outcomes, state
// codes on patients); re-export them so callers need one import.
pub use calendar_cell::{AppointmentId, ProviderId, Slot, SlotKey, StateCode};
