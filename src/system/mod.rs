//! Chip identity reporting for embedded devices.
//!
//! This module turns the platform's raw identity codes into readable text and
//! exposes them two ways: as log lines at boot, or as commands in an
//! interactive shell. Everything is `no_std` and allocation-free.
//!
//! # Components
//!
//! - **[`chip`]**: data model (`ChipModel`, `ResetReason`, `FeatureSet`,
//!   `UniqueId`) and the [`Platform`](chip::Platform) query trait
//! - **[`descriptor`]**: total mapping from codes to bounded descriptors
//! - **[`shell`]**: command registry, dispatcher and line editor
//! - **[`commands`]**: `lscpu`, `lssoc`, `lsid` and `lsrst`
//! - **[`report`]**: boot-time log lines and JSON snapshot
//!
//! # Usage
//!
//! ```rust,no_run
//! use libsocinfo::system::chip::{ChipInfo, Platform, ResetReason, UniqueId};
//! use libsocinfo::system::commands::HwCommands;
//! use libsocinfo::system::report::log_boot_report;
//! use libsocinfo::system::shell::Shell;
//!
//! # struct Board;
//! # impl Platform for Board {
//! #     fn chip_info(&self) -> ChipInfo { ChipInfo::from_raw(5, 4, 1, 0x12) }
//! #     fn reset_reason(&self) -> ResetReason { ResetReason::PowerOn }
//! #     fn unique_id(&self) -> UniqueId { UniqueId::new([0; 8]) }
//! # }
//! let board = Board;
//!
//! // Boot-time log mode
//! log_boot_report(&board);
//!
//! // Interactive mode
//! let commands = HwCommands::new(&board);
//! let uart = |text: &str| print!("{}", text);
//! let mut shell = Shell::new();
//! shell.set_output_function(&uart);
//! commands.register(&mut shell).into_result().expect("shell setup");
//!
//! loop {
//!     let byte = [b'\r']; // read from the transport
//!     shell.input(&byte);
//! }
//! ```

/// Chip identity data model and platform query trait.
pub mod chip;

/// Code to descriptor mapping and feature reporting order.
pub mod descriptor;

/// Command registry and dispatcher.
///
/// Provides command registration, argument parsing, help output and
/// character-by-character input processing.
pub mod shell;

/// Shell commands reporting chip identity: `lscpu`, `lssoc`, `lsid` and `lsrst`.
pub mod commands;

/// Boot-time log report and JSON snapshot.
pub mod report;
