//! Wear-aware, power-fail-safe A/B settings log over the `nvm` access
//! layer.
//!
//! The store keeps exactly one fixed-shape settings record durable across
//! arbitrary power loss by appending framed copies to two partitions in
//! turn and always reloading the newest intact one. See [`handle`] for the
//! public `init`/`load`/`save` surface, [`frame`] for the on-disk layout,
//! and [`store`] for the scan/write machinery underneath it.
#![cfg_attr(not(feature = "std"), no_std)]

mod crc;
mod error;
mod frame;
mod settings;
mod store;

mod handle;

pub use error::SettingsError;
pub use settings::Settings;
pub use handle::SettingsStore;

pub use frame::{FRAME_LEN, MAGIC};
