use nvm::Partition;

#[cfg(feature = "log")]
use log::debug;

use crate::error::SettingsError;
use crate::frame::FRAME_LEN;
use crate::settings::{Settings, SETTINGS_LEN};
use crate::store::{encode_current_frame, find_latest_valid_store, write_store, ScanStatus};

/// Partition state inferred at scan time; drives the save decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartStatus {
    Clean,
    Empty,
    Corrupt,
}

impl From<ScanStatus> for PartStatus {
    fn from(s: ScanStatus) -> Self {
        match s {
            ScanStatus::Valid | ScanStatus::Stale => PartStatus::Clean,
            ScanStatus::Empty => PartStatus::Empty,
            ScanStatus::Corrupt => PartStatus::Corrupt,
        }
    }
}

/// The settings storage handle: single owner, reused across every
/// `load`/`save` for the lifetime of the process.
pub struct SettingsStore<'a> {
    part_a: Partition<'a>,
    part_b: Partition<'a>,
    part_a_offset: u32,
    part_b_offset: u32,
    part_a_status: PartStatus,
    part_b_status: PartStatus,
    latest: Settings,
    counter: u16,
    initialized: bool,
    write_needed: bool,
}

impl<'a> SettingsStore<'a> {
    /// Construct a handle over the two partitions that make up this
    /// store's A/B log. Scanning is deferred to the first `load`/`save`
    /// rather than done here, so construction itself cannot fail.
    pub fn new(part_a: Partition<'a>, part_b: Partition<'a>) -> Self {
        Self {
            part_a,
            part_b,
            part_a_offset: 0,
            part_b_offset: 0,
            part_a_status: PartStatus::Empty,
            part_b_status: PartStatus::Empty,
            latest: Settings::default(),
            counter: 0,
            initialized: false,
            write_needed: false,
        }
    }

    /// Load the newest intact settings record, scanning both partitions on
    /// first call and serving the cached copy thereafter.
    pub fn load(&mut self) -> Result<Settings, SettingsError> {
        if !self.initialized {
            self.init_load()?;
        }
        Ok(self.latest)
    }

    fn init_load(&mut self) -> Result<(), SettingsError> {
        let a = find_latest_valid_store(&self.part_a)?;
        let b = find_latest_valid_store(&self.part_b)?;

        let a_usable = matches!(a.status, ScanStatus::Valid | ScanStatus::Stale);
        let b_usable = matches!(b.status, ScanStatus::Valid | ScanStatus::Stale);
        let stale_a = a.status == ScanStatus::Stale;
        let stale_b = b.status == ScanStatus::Stale;

        let (settings, counter, write_needed) = match (a_usable, b_usable) {
            (true, true) => {
                // Greater counter wins; ties (and the plain, non-wrap-aware
                // `>=`, which is wrap-unsafe after 65,535 saves) go to A.
                if b.counter > a.counter {
                    (b.settings, b.counter, stale_b)
                } else {
                    (a.settings, a.counter, stale_a)
                }
            }
            (true, false) => (
                a.settings,
                a.counter,
                stale_a || b.status == ScanStatus::Corrupt,
            ),
            (false, true) => (
                b.settings,
                b.counter,
                stale_b || a.status == ScanStatus::Corrupt,
            ),
            (false, false) => (Settings::default(), 0, true),
        };

        #[cfg(feature = "log")]
        debug!(
            "settings init: a={:?} b={:?} chosen_counter={} write_needed={}",
            a.status, b.status, counter, write_needed
        );

        self.latest = settings;
        self.counter = counter;
        self.part_a_offset = a.free_offset;
        self.part_b_offset = b.free_offset;
        self.part_a_status = a.status.into();
        self.part_b_status = b.status.into();
        self.write_needed = write_needed;
        self.initialized = true;
        Ok(())
    }

    /// Persist `new` if it differs from the cached record or a rewrite was
    /// already pending, alternating partitions by counter parity.
    pub fn save(&mut self, new: &Settings) -> Result<(), SettingsError> {
        if !self.initialized {
            self.init_load()?;
        }

        let mut cur_bytes = [0u8; SETTINGS_LEN];
        self.latest.encode(&mut cur_bytes);
        let mut new_bytes = [0u8; SETTINGS_LEN];
        new.encode(&mut new_bytes);

        if cur_bytes != new_bytes || self.write_needed {
            self.latest = *new;
            self.counter = self.counter.wrapping_add(1);
            self.write_needed = true;
        }

        if !self.write_needed {
            return Ok(());
        }

        let mut frame = [0u8; FRAME_LEN];
        encode_current_frame(&mut frame, self.counter, &self.latest);

        let target_b = self.counter % 2 == 1;
        if target_b {
            let erase = self.part_b_status == PartStatus::Corrupt;
            let new_offset = write_store(&self.part_b, &frame, self.part_b_offset, erase)?;
            self.part_b_offset = new_offset;
            self.part_b_status = PartStatus::Clean;
        } else {
            let erase = self.part_a_status == PartStatus::Corrupt;
            let new_offset = write_store(&self.part_a, &frame, self.part_a_offset, erase)?;
            self.part_a_offset = new_offset;
            self.part_a_status = PartStatus::Clean;
        }

        #[cfg(feature = "log")]
        debug!(
            "settings save: counter={} target={} offset_a={} offset_b={}",
            self.counter,
            if target_b { "B" } else { "A" },
            self.part_a_offset,
            self.part_b_offset
        );

        self.write_needed = false;
        Ok(())
    }
}
