use thiserror::Error;

/// Shape violations on the input of the downsampling core.
///
/// Bad individual samples never end up here; they become null records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("invalid argument: channel {channel} out of range, recording has {channels} channel(s)")]
    ChannelOutOfRange { channel: usize, channels: usize },
    #[error("invalid argument: window length must be greater than zero")]
    ZeroWindow,
}

impl SeriesError {
    /// Every variant is a caller contract violation.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            SeriesError::ChannelOutOfRange { .. } | SeriesError::ZeroWindow
        )
    }
}
