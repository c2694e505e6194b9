use core::fmt;

use nvm::NvmError;

/// Errors surfaced by the settings store's public API.
///
/// Wraps [`NvmError`] from the layers below and adds the three outcomes
/// that only make sense at the framing/log level: an empty partition found
/// during a scan that the caller asked to treat as fatal, a malformed
/// header chain, and an on-disk frame newer than this firmware can parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsError {
    /// Propagated from the device or access layer unchanged.
    Nvm(NvmError),
    /// Scan found nothing (used internally; not normally surfaced, since
    /// an empty partition falls back to defaults rather than erroring).
    NotFound,
    /// A partition's header chain is malformed beyond recovery.
    IllSequence,
    /// An on-disk frame's `length` exceeds this firmware's current frame
    /// size, meaning it was written by newer firmware than the one reading it.
    TooLarge,
}

impl From<NvmError> for SettingsError {
    fn from(e: NvmError) -> Self {
        SettingsError::Nvm(e)
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Nvm(e) => write!(f, "nvm error: {}", e),
            SettingsError::NotFound => write!(f, "partition empty"),
            SettingsError::IllSequence => write!(f, "corrupt partition chain"),
            SettingsError::TooLarge => write!(f, "on-disk frame larger than current frame size"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SettingsError {}
