mod mock;
pub use mock::MockNvm;

#[cfg(feature = "std")]
mod posix;
#[cfg(feature = "std")]
pub use posix::PosixFileNvm;

#[cfg(feature = "embedded-storage")]
mod embedded_storage;
#[cfg(feature = "embedded-storage")]
pub use embedded_storage::EmbeddedStorageNvm;
