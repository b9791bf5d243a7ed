use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchedulingError {
    #[error("Could not read the current maximum appointment id from the appointment store")]
    IdSeedFailed {
        #[source]
        source: anyhow::Error,
    },

    #[error("Failed to remove {count} booked patients from the pending registration set")]
    RemovalFailed {
        count: usize,
        #[source]
        source: anyhow::Error,
    },
}
