//! Non-interactive reporting: boot-time log lines and a JSON snapshot.
//!
//! [`log_boot_report`] emits the chip facts through the `log` facade at
//! startup, without any shell:
//!
//! ```text
//! I (312) info: chip ESP32-S3 (rev: 2, cores 2)
//! I (312) info:   flash     [ ]
//! I (312) info:   PSRAM     [x]
//! I (312) info:   Wi-Fi     [x]
//! I (312) info:   Bluetooth [ ]
//! I (312) info:   BLE       [x]
//! I (312) info:   LR-WPAN   [ ]
//! I (312) info: eFuse MAC (08:07:)06:05:04:03:02:01
//! I (312) info: last reset - power-on
//! ```
//!
//! The two leading unique-id bytes are parenthesised because the remaining
//! six are the base MAC address.

use core::fmt::{self, Write as _};

use heapless::String;
use serde::Serialize;

use super::chip::{FeatureSet, Platform};
use super::descriptor::{feature_flags, map_chip_model, map_reset_reason};

/// Log target used for boot report lines.
pub const TAG: &str = "info";

/// Buffer size that always fits the output of [`to_json`].
pub const JSON_SNAPSHOT_MAX_LEN: usize = 320;

/// Errors produced while rendering a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportError {
    /// The output buffer is too small.
    BufferOverflow,
    /// The snapshot could not be serialized.
    Serialize,
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::BufferOverflow => f.write_str("buffer overflow"),
            ReportError::Serialize => f.write_str("serialization failed"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ReportError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ReportError::BufferOverflow => defmt::write!(f, "BufferOverflow"),
            ReportError::Serialize => defmt::write!(f, "Serialize"),
        }
    }
}

/// Produce the boot report, one call to `emit` per line, in order.
///
/// Lines carry no terminator. The platform is queried afresh on every call.
///
/// # Arguments
///
/// * `platform` - Source of the chip facts
/// * `emit` - Receives each formatted line
///
/// # Examples
///
/// ```rust
/// use libsocinfo::system::report::write_boot_report;
/// # use libsocinfo::system::chip::{ChipInfo, Platform, ResetReason, UniqueId};
/// struct Board;
///
/// impl Platform for Board {
///     fn chip_info(&self) -> ChipInfo {
///         ChipInfo::from_raw(9, 2, 2, 0b1001_0010)
///     }
///     fn reset_reason(&self) -> ResetReason {
///         ResetReason::from(1)
///     }
///     fn unique_id(&self) -> UniqueId {
///         UniqueId::new([1, 2, 3, 4, 5, 6, 7, 8])
///     }
/// }
///
/// let mut lines = Vec::new();
/// write_boot_report(&Board, |line| lines.push(line.to_string()));
/// assert_eq!(lines[0], "chip ESP32-S3 (rev: 2, cores 2)");
/// assert_eq!(lines[8], "last reset - power-on");
/// ```
pub fn write_boot_report<P, F>(platform: &P, mut emit: F)
where
    P: Platform + ?Sized,
    F: FnMut(fmt::Arguments<'_>),
{
    let info = platform.chip_info();
    emit(format_args!(
        "chip {} (rev: {}, cores {})",
        map_chip_model(info.model),
        info.revision,
        info.cores
    ));

    for (label, present) in feature_flags(info.features) {
        emit(format_args!(
            "  {:<9} [{}]",
            label,
            if present { 'x' } else { ' ' }
        ));
    }

    let id = platform.unique_id().to_display_order();
    emit(format_args!(
        "eFuse MAC ({:02x}:{:02x}:){:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        id[0], id[1], id[2], id[3], id[4], id[5], id[6], id[7]
    ));

    emit(format_args!(
        "last reset - {}",
        map_reset_reason(platform.reset_reason())
    ));
}

/// Log the boot report at info level under [`TAG`].
///
/// One `log::info!` record per line of [`write_boot_report`]. Nothing is
/// emitted until the application installs a logger.
///
/// # Arguments
///
/// * `platform` - Source of the chip facts
pub fn log_boot_report<P: Platform + ?Sized>(platform: &P) {
    write_boot_report(platform, |line| log::info!(target: TAG, "{}", line));
}

/// Feature presence, keyed by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureFlags {
    /// Embedded flash.
    pub flash: bool,
    /// Embedded PSRAM.
    pub psram: bool,
    /// Wi-Fi.
    pub wifi: bool,
    /// Bluetooth classic.
    pub bt: bool,
    /// Bluetooth Low Energy.
    pub ble: bool,
    /// IEEE 802.15.4.
    pub lr_wpan: bool,
}

impl From<FeatureSet> for FeatureFlags {
    fn from(features: FeatureSet) -> Self {
        Self {
            flash: features.contains(FeatureSet::EMB_FLASH),
            psram: features.contains(FeatureSet::EMB_PSRAM),
            wifi: features.contains(FeatureSet::WIFI_BGN),
            bt: features.contains(FeatureSet::BT),
            ble: features.contains(FeatureSet::BLE),
            lr_wpan: features.contains(FeatureSet::IEEE802154),
        }
    }
}

/// Point-in-time chip facts, as serialized by [`to_json`].
#[derive(Debug, Clone, Serialize)]
pub struct ChipSnapshot<'a> {
    /// Model descriptor.
    pub model: &'a str,
    /// Raw model code.
    pub model_code: u32,
    /// Raw silicon revision.
    pub revision: u16,
    /// CPU cores.
    pub cores: u8,
    /// Integrated peripherals.
    pub features: FeatureFlags,
    /// Unique id, display order.
    pub unique_id: &'a str,
    /// Reset cause descriptor.
    pub reset_reason: &'a str,
}

/// Serialize the current chip facts as JSON into `buf`.
///
/// # Arguments
///
/// * `platform` - Source of the chip facts
/// * `buf` - Output buffer. [`JSON_SNAPSHOT_MAX_LEN`] bytes always suffice
///
/// # Returns
///
/// * `Ok(len)` - Number of bytes written to the front of `buf`
/// * `Err(ReportError::BufferOverflow)` - `buf` is too small
///
/// # Examples
///
/// ```rust
/// use libsocinfo::system::report::{to_json, JSON_SNAPSHOT_MAX_LEN};
/// # use libsocinfo::system::chip::{ChipInfo, Platform, ResetReason, UniqueId};
/// struct Board;
///
/// impl Platform for Board {
///     fn chip_info(&self) -> ChipInfo {
///         ChipInfo::from_raw(9, 2, 2, 0b1001_0010)
///     }
///     fn reset_reason(&self) -> ResetReason {
///         ResetReason::from(1)
///     }
///     fn unique_id(&self) -> UniqueId {
///         UniqueId::new([1, 2, 3, 4, 5, 6, 7, 8])
///     }
/// }
///
/// let mut buf = [0u8; JSON_SNAPSHOT_MAX_LEN];
/// let len = to_json(&Board, &mut buf).unwrap();
/// let json = core::str::from_utf8(&buf[..len]).unwrap();
/// assert!(json.starts_with(r#"{"model":"ESP32-S3""#));
/// ```
pub fn to_json<P: Platform + ?Sized>(platform: &P, buf: &mut [u8]) -> Result<usize, ReportError> {
    let info = platform.chip_info();
    let model = map_chip_model(info.model);
    let reset_reason = map_reset_reason(platform.reset_reason());

    let mut unique_id: String<23> = String::new();
    write!(unique_id, "{}", platform.unique_id()).map_err(|_| ReportError::BufferOverflow)?;

    let snapshot = ChipSnapshot {
        model: &model,
        model_code: info.model.code(),
        revision: info.revision,
        cores: info.cores,
        features: FeatureFlags::from(info.features),
        unique_id: &unique_id,
        reset_reason: &reset_reason,
    };

    serde_json_core::to_slice(&snapshot, buf).map_err(|e| match e {
        serde_json_core::ser::Error::BufferFull => ReportError::BufferOverflow,
        _ => ReportError::Serialize,
    })
}
