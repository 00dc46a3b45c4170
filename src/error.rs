use crate::{aes::CoreState, poll::Wait};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A bounded status poll ran out of attempts. The core should be reset
    /// before it is used again.
    #[error("timed out waiting for {waiting_for} after {attempts} polls")]
    BusTimeout { waiting_for: Wait, attempts: u32 },

    /// Rejected before any bus transaction was issued.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// The operation is not allowed in the driver's current state.
    #[error("{operation} not allowed in state {state:?}")]
    Sequence {
        state: CoreState,
        operation: &'static str,
    },
}
