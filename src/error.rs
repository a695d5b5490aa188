use thiserror::Error;

/// Why an emit was rejected. Nothing was written to the channel in any case.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum EmitError {
    /// The channel has zero capacity, or `init` has not run yet.
    #[error("channel is disabled (zero capacity or not initialized)")]
    Disabled,

    /// Another emit on the same uplink is still in flight.
    #[error("channel is already being written by another producer")]
    Busy,

    /// Not enough free space right now; the host has to read first.
    #[error("channel full: frame needs {needed} bytes, {free} free")]
    Full { needed: usize, free: usize },

    /// The frame cannot fit even into an empty channel.
    #[error("frame needs {needed} bytes but channel capacity is {capacity}")]
    Oversize { needed: usize, capacity: usize },
}
