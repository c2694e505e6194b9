use core::fmt;

/// Errors surfaced by the device and access layers.
///
/// `INVALID` (bad argument, alignment, or bounds), `NOT_SUPPORTED` (backend
/// hook missing or unimplemented), and any propagated backend I/O failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvmError {
    /// Bad argument, misaligned address/length, or out-of-bounds access.
    Invalid,
    /// The backend does not implement this operation (e.g. no erase hook).
    NotSupported,
    /// The backend reported an I/O failure.
    Io,
}

impl fmt::Display for NvmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NvmError::Invalid => write!(f, "invalid argument, alignment, or bounds"),
            NvmError::NotSupported => write!(f, "operation not supported by backend"),
            NvmError::Io => write!(f, "backend I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for NvmError {}
