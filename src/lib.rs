//! # libsocinfo - chip identity reporting
//!
//! Reads a microcontroller's identity (silicon model, revision, core count,
//! integrated peripherals), the cause of its last reset and its
//! factory-programmed unique id, and reports them either as boot-time log
//! lines or through interactive shell commands. Designed for embedded
//! firmware and `no_std` environments.
//!
//! ## Features
//!
//! ### Descriptor mapping
//! - Total mapping from chip-model and reset-cause codes to short names
//! - Codes from future platform revisions map to a fixed sentinel
//!
//! ### Shell
//! - Name-keyed command registry with unique names
//! - Sequential dispatch with quoted-argument parsing
//! - Built-in `list` command and `--help` flag
//!
//! ### Commands
//! - `lscpu`, `lssoc`, `lsid`, `lsrst`
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libsocinfo = "0.1.0"
//! ```
//!
//! ### Descriptor example
//!
//! ```rust
//! use libsocinfo::system::chip::ResetReason;
//! use libsocinfo::system::descriptor::map_reset_reason;
//!
//! let desc = map_reset_reason(ResetReason::from(5));
//! assert_eq!(desc, "WDT (int)");
//! ```
//!
//! The hardware itself is reached through the
//! [`Platform`](system::chip::Platform) trait, implemented by the board
//! support code. The shell's transport and the log sink are likewise provided
//! by the application.
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt formatting of the public types

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]
#![doc(html_root_url = "https://docs.rs/libsocinfo/0.1.0")]

/// Chip identity queries, descriptor mapping, shell and reporting.
pub mod system;
