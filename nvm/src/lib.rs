//! Device and area/partition access layers over a generic non-volatile
//! memory backend.
//!
//! This crate is the middle of three layers: a [`device`] layer that talks
//! to a concrete backend (real flash controller, or a host-side
//! simulator/file for testing) and enforces write/erase alignment, and an
//! [`access`] layer that carves a device up into named, bounds-checked
//! areas and partitions. The settings-store layer built on top of this
//! crate never touches a backend directly.
#![cfg_attr(not(feature = "std"), no_std)]

pub mod access;
pub mod backends;
pub mod device;
pub mod error;

pub use access::{AreaDescriptor, AreaTable, Partition};
pub use device::{Device, NvmBackend, NvmDeviceOps};
pub use error::NvmError;
