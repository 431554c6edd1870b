//! Human-readable descriptors for hardware codes.
//!
//! The mappers here are total: any code, including ones assigned by a later
//! platform revision, produces a non-empty [`Descriptor`]. Codes without a
//! name map to [`SENTINEL`]. They run during early boot and never fail.
//!
//! ```rust
//! use libsocinfo::system::chip::{ChipModel, ResetReason};
//! use libsocinfo::system::descriptor::{map_chip_model, map_reset_reason, SENTINEL};
//!
//! assert_eq!(map_chip_model(ChipModel::Esp32S3), "ESP32-S3");
//! assert_eq!(map_reset_reason(ResetReason::InterruptWatchdog), "WDT (int)");
//! assert_eq!(map_chip_model(ChipModel::from(4242)), SENTINEL);
//! ```

use super::chip::{ChipModel, FeatureSet, ResetReason};
use heapless::String;

/// Maximum number of characters in a descriptor.
pub const DESCRIPTOR_LEN: usize = 15;

/// Descriptor used for codes without a name.
pub const SENTINEL: &str = "unknown";

/// Bounded, owned descriptor string.
pub type Descriptor = String<DESCRIPTOR_LEN>;

/// Feature bits in reporting order, paired with their labels.
pub const FEATURE_LABELS: [(FeatureSet, &str); 6] = [
    (FeatureSet::EMB_FLASH, "flash"),
    (FeatureSet::EMB_PSRAM, "PSRAM"),
    (FeatureSet::WIFI_BGN, "Wi-Fi"),
    (FeatureSet::BT, "Bluetooth"),
    (FeatureSet::BLE, "BLE"),
    (FeatureSet::IEEE802154, "LR-WPAN"),
];

/// Name of a chip model, if it has one.
pub fn chip_model_name(model: ChipModel) -> Option<&'static str> {
    let name = match model {
        ChipModel::Esp32 => "ESP32",
        ChipModel::Esp32S2 => "ESP32-S2",
        ChipModel::Esp32S3 => "ESP32-S3",
        ChipModel::Esp32C2 => "ESP32-C2",
        ChipModel::Esp32C3 => "ESP32-C3",
        ChipModel::Esp32C5 => "ESP32-C5",
        ChipModel::Esp32C6 => "ESP32-C6",
        ChipModel::Esp32H2 => "ESP32-H2",
        ChipModel::Esp32P4 => "ESP32-P4",
        ChipModel::PosixLinux => "ESP32 sim",
        ChipModel::Unknown(_) => return None,
    };
    Some(name)
}

/// Name of a reset cause, if it has one.
pub fn reset_reason_name(reason: ResetReason) -> Option<&'static str> {
    let name = match reason {
        ResetReason::PowerOn => "power-on",
        ResetReason::External => "ext",
        ResetReason::Software => "SW",
        ResetReason::Panic => "PANIC",
        ResetReason::InterruptWatchdog => "WDT (int)",
        ResetReason::TaskWatchdog => "WDT (task)",
        ResetReason::Watchdog => "WDT (other)",
        ResetReason::DeepSleep => "deep sleep",
        ResetReason::Brownout => "brown-out",
        ResetReason::Sdio => "SDIO",
        ResetReason::Usb => "USB",
        ResetReason::Jtag => "JTAG",
        ResetReason::Unknown(_) => return None,
    };
    Some(name)
}

/// Descriptor for a chip model.
pub fn map_chip_model(model: ChipModel) -> Descriptor {
    descriptor(chip_model_name(model))
}

/// Descriptor for a reset cause.
pub fn map_reset_reason(reason: ResetReason) -> Descriptor {
    descriptor(reset_reason_name(reason))
}

/// Presence of each reported feature, in [`FEATURE_LABELS`] order.
pub fn feature_flags(features: FeatureSet) -> impl Iterator<Item = (&'static str, bool)> {
    FEATURE_LABELS
        .into_iter()
        .map(move |(flag, label)| (label, features.contains(flag)))
}

fn descriptor(name: Option<&'static str>) -> Descriptor {
    let mut out = Descriptor::new();
    for ch in name.unwrap_or(SENTINEL).chars() {
        // Stop at the bound rather than fail; names are well under it.
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}
