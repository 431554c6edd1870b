//! Chip identity data model and the platform query interface.
//!
//! The platform reports its identity as raw enumeration codes. These are
//! wrapped in closed enums with a catch-all `Unknown` variant, so a code
//! introduced by a later silicon revision still round-trips unchanged.
//!
//! Raw code values follow the ESP-IDF numbering (`esp_chip_model_t`,
//! `esp_reset_reason_t` and the `CHIP_FEATURE_*` bits).

use core::fmt;

/// Silicon model reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipModel {
    /// ESP32.
    Esp32,
    /// ESP32-S2.
    Esp32S2,
    /// ESP32-S3.
    Esp32S3,
    /// ESP32-C2.
    Esp32C2,
    /// ESP32-C3.
    Esp32C3,
    /// ESP32-C5.
    Esp32C5,
    /// ESP32-C6.
    Esp32C6,
    /// ESP32-H2.
    Esp32H2,
    /// ESP32-P4.
    Esp32P4,
    /// Host simulation target (POSIX/Linux).
    PosixLinux,
    /// A code this crate has no name for.
    Unknown(u32),
}

impl ChipModel {
    /// Raw platform code for this model.
    pub fn code(self) -> u32 {
        match self {
            ChipModel::Esp32 => 1,
            ChipModel::Esp32S2 => 2,
            ChipModel::Esp32C3 => 5,
            ChipModel::Esp32S3 => 9,
            ChipModel::Esp32C2 => 12,
            ChipModel::Esp32C6 => 13,
            ChipModel::Esp32H2 => 16,
            ChipModel::Esp32P4 => 18,
            ChipModel::Esp32C5 => 23,
            ChipModel::PosixLinux => 999,
            ChipModel::Unknown(code) => code,
        }
    }
}

impl From<u32> for ChipModel {
    fn from(code: u32) -> Self {
        match code {
            1 => ChipModel::Esp32,
            2 => ChipModel::Esp32S2,
            5 => ChipModel::Esp32C3,
            9 => ChipModel::Esp32S3,
            12 => ChipModel::Esp32C2,
            13 => ChipModel::Esp32C6,
            16 => ChipModel::Esp32H2,
            18 => ChipModel::Esp32P4,
            23 => ChipModel::Esp32C5,
            999 => ChipModel::PosixLinux,
            other => ChipModel::Unknown(other),
        }
    }
}

impl From<ChipModel> for u32 {
    fn from(model: ChipModel) -> Self {
        model.code()
    }
}

/// Cause of the most recent system restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetReason {
    /// Power-on reset.
    PowerOn,
    /// External pin reset.
    External,
    /// Software reset.
    Software,
    /// Reset after an exception or panic.
    Panic,
    /// Interrupt watchdog.
    InterruptWatchdog,
    /// Task watchdog.
    TaskWatchdog,
    /// Any other watchdog.
    Watchdog,
    /// Exit from deep sleep.
    DeepSleep,
    /// Brown-out detector.
    Brownout,
    /// Reset over SDIO.
    Sdio,
    /// Reset by the USB peripheral.
    Usb,
    /// Reset by JTAG.
    Jtag,
    /// A code this crate has no name for, including the platform's own
    /// "cannot be determined" value (0).
    Unknown(u32),
}

impl ResetReason {
    /// Raw platform code for this reset cause.
    pub fn code(self) -> u32 {
        match self {
            ResetReason::PowerOn => 1,
            ResetReason::External => 2,
            ResetReason::Software => 3,
            ResetReason::Panic => 4,
            ResetReason::InterruptWatchdog => 5,
            ResetReason::TaskWatchdog => 6,
            ResetReason::Watchdog => 7,
            ResetReason::DeepSleep => 8,
            ResetReason::Brownout => 9,
            ResetReason::Sdio => 10,
            ResetReason::Usb => 11,
            ResetReason::Jtag => 12,
            ResetReason::Unknown(code) => code,
        }
    }
}

impl From<u32> for ResetReason {
    fn from(code: u32) -> Self {
        match code {
            1 => ResetReason::PowerOn,
            2 => ResetReason::External,
            3 => ResetReason::Software,
            4 => ResetReason::Panic,
            5 => ResetReason::InterruptWatchdog,
            6 => ResetReason::TaskWatchdog,
            7 => ResetReason::Watchdog,
            8 => ResetReason::DeepSleep,
            9 => ResetReason::Brownout,
            10 => ResetReason::Sdio,
            11 => ResetReason::Usb,
            12 => ResetReason::Jtag,
            other => ResetReason::Unknown(other),
        }
    }
}

impl From<ResetReason> for u32 {
    fn from(reason: ResetReason) -> Self {
        reason.code()
    }
}

bitflags::bitflags! {
    /// Capabilities integrated on the chip.
    ///
    /// Bits the crate does not know about are kept as-is and ignored by the
    /// reporting code.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FeatureSet: u32 {
        /// Embedded flash memory.
        const EMB_FLASH = 1 << 0;
        /// 2.4 GHz Wi-Fi.
        const WIFI_BGN = 1 << 1;
        /// Bluetooth Low Energy.
        const BLE = 1 << 4;
        /// Bluetooth classic.
        const BT = 1 << 5;
        /// IEEE 802.15.4 (low-rate wireless PAN).
        const IEEE802154 = 1 << 6;
        /// Embedded PSRAM.
        const EMB_PSRAM = 1 << 7;
    }
}

/// Identity of the running chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChipInfo {
    /// Silicon model.
    pub model: ChipModel,
    /// Silicon revision, encoded as `major * 100 + minor`.
    pub revision: u16,
    /// Number of CPU cores.
    pub cores: u8,
    /// Integrated peripherals.
    pub features: FeatureSet,
}

impl ChipInfo {
    /// Build from the raw values the platform reports.
    ///
    /// # Arguments
    ///
    /// * `model` - Chip model code; unassigned codes become [`ChipModel::Unknown`]
    /// * `revision` - Silicon revision, `major * 100 + minor`
    /// * `cores` - Number of CPU cores
    /// * `features` - Feature bitmask; unknown bits are retained
    ///
    /// # Examples
    ///
    /// ```rust
    /// use libsocinfo::system::chip::{ChipInfo, ChipModel, FeatureSet};
    ///
    /// let info = ChipInfo::from_raw(9, 102, 2, 0x12);
    /// assert_eq!(info.model, ChipModel::Esp32S3);
    /// assert_eq!((info.revision_major(), info.revision_minor()), (1, 2));
    /// assert!(info.features.contains(FeatureSet::WIFI_BGN | FeatureSet::BLE));
    /// ```
    pub fn from_raw(model: u32, revision: u16, cores: u8, features: u32) -> Self {
        Self {
            model: ChipModel::from(model),
            revision,
            cores,
            features: FeatureSet::from_bits_retain(features),
        }
    }

    /// Major silicon revision.
    pub fn revision_major(&self) -> u16 {
        self.revision / 100
    }

    /// Minor silicon revision.
    pub fn revision_minor(&self) -> u16 {
        self.revision % 100
    }
}

/// Length of the factory-programmed unique identifier.
pub const UNIQUE_ID_LEN: usize = 8;

/// Factory-programmed unique identifier, in storage order.
///
/// The display form is most significant byte first, which is the reverse of
/// storage order:
///
/// ```rust
/// use libsocinfo::system::chip::UniqueId;
///
/// let id = UniqueId::new([1, 2, 3, 4, 5, 6, 7, 8]);
/// assert_eq!(format!("{}", id), "08:07:06:05:04:03:02:01");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniqueId([u8; UNIQUE_ID_LEN]);

impl UniqueId {
    /// Wrap the bytes exactly as the platform stores them.
    pub const fn new(bytes: [u8; UNIQUE_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Bytes in storage order.
    pub fn as_bytes(&self) -> &[u8; UNIQUE_ID_LEN] {
        &self.0
    }

    /// Bytes in display order (most significant first).
    pub fn to_display_order(&self) -> [u8; UNIQUE_ID_LEN] {
        let mut bytes = self.0;
        bytes.reverse();
        bytes
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().rev().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Hardware queries the reporting code depends on.
///
/// Implementations read values the hardware has already latched, so every
/// method is infallible and cheap. Nothing is cached: each query reads again.
///
/// # Examples
///
/// ```rust
/// use libsocinfo::system::chip::{ChipInfo, Platform, ResetReason, UniqueId};
///
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
/// assert_eq!(Board.unique_id().to_string(), "08:07:06:05:04:03:02:01");
/// ```
pub trait Platform {
    /// Silicon model, revision, core count and features.
    fn chip_info(&self) -> ChipInfo;

    /// Cause of the last restart.
    fn reset_reason(&self) -> ResetReason;

    /// Factory-programmed unique identifier.
    fn unique_id(&self) -> UniqueId;
}

impl<P: Platform + ?Sized> Platform for &P {
    fn chip_info(&self) -> ChipInfo {
        (**self).chip_info()
    }

    fn reset_reason(&self) -> ResetReason {
        (**self).reset_reason()
    }

    fn unique_id(&self) -> UniqueId {
        (**self).unique_id()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ChipModel {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ChipModel::Esp32 => defmt::write!(f, "Esp32"),
            ChipModel::Esp32S2 => defmt::write!(f, "Esp32S2"),
            ChipModel::Esp32S3 => defmt::write!(f, "Esp32S3"),
            ChipModel::Esp32C2 => defmt::write!(f, "Esp32C2"),
            ChipModel::Esp32C3 => defmt::write!(f, "Esp32C3"),
            ChipModel::Esp32C5 => defmt::write!(f, "Esp32C5"),
            ChipModel::Esp32C6 => defmt::write!(f, "Esp32C6"),
            ChipModel::Esp32H2 => defmt::write!(f, "Esp32H2"),
            ChipModel::Esp32P4 => defmt::write!(f, "Esp32P4"),
            ChipModel::PosixLinux => defmt::write!(f, "PosixLinux"),
            ChipModel::Unknown(code) => defmt::write!(f, "Unknown({=u32})", code),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ResetReason {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ResetReason::PowerOn => defmt::write!(f, "PowerOn"),
            ResetReason::External => defmt::write!(f, "External"),
            ResetReason::Software => defmt::write!(f, "Software"),
            ResetReason::Panic => defmt::write!(f, "Panic"),
            ResetReason::InterruptWatchdog => defmt::write!(f, "InterruptWatchdog"),
            ResetReason::TaskWatchdog => defmt::write!(f, "TaskWatchdog"),
            ResetReason::Watchdog => defmt::write!(f, "Watchdog"),
            ResetReason::DeepSleep => defmt::write!(f, "DeepSleep"),
            ResetReason::Brownout => defmt::write!(f, "Brownout"),
            ResetReason::Sdio => defmt::write!(f, "Sdio"),
            ResetReason::Usb => defmt::write!(f, "Usb"),
            ResetReason::Jtag => defmt::write!(f, "Jtag"),
            ResetReason::Unknown(code) => defmt::write!(f, "Unknown({=u32})", code),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for UniqueId {
    fn format(&self, f: defmt::Formatter) {
        let b = self.to_display_order();
        defmt::write!(
            f,
            "{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}:{=u8:02x}",
            b[0],
            b[1],
            b[2],
            b[3],
            b[4],
            b[5],
            b[6],
            b[7]
        );
    }
}
