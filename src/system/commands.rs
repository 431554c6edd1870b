//! Shell commands reporting chip identity.
//!
//! | command | output |
//! |---------|--------|
//! | `lscpu` | chip model, revision, core count, one `yes`/`no` line per feature |
//! | `lssoc` | nothing (reserved) |
//! | `lsid`  | unique id, most significant byte first |
//! | `lsrst` | cause of the last reset |
//!
//! Each invocation queries the [`Platform`] again; nothing is cached.
//!
//! ```rust
//! use libsocinfo::system::chip::{ChipInfo, Platform, ResetReason, UniqueId};
//! use libsocinfo::system::commands::HwCommands;
//! use libsocinfo::system::shell::Shell;
//!
//! struct Board;
//!
//! impl Platform for Board {
//!     fn chip_info(&self) -> ChipInfo {
//!         ChipInfo::from_raw(9, 2, 2, 0b0001_0011)
//!     }
//!     fn reset_reason(&self) -> ResetReason {
//!         ResetReason::PowerOn
//!     }
//!     fn unique_id(&self) -> UniqueId {
//!         UniqueId::new([1, 2, 3, 4, 5, 6, 7, 8])
//!     }
//! }
//!
//! let board = Board;
//! let commands = HwCommands::new(&board);
//! let print = |text: &str| print!("{}", text);
//!
//! let mut shell = Shell::new();
//! shell.set_output_function(&print);
//! commands.register(&mut shell).into_result().expect("command registration");
//!
//! shell.dispatch("lsid"); // 08:07:06:05:04:03:02:01
//! ```

use core::fmt;

use super::chip::Platform;
use super::descriptor::{feature_flags, map_chip_model, map_reset_reason};
use super::report::{self, JSON_SNAPSHOT_MAX_LEN};
use super::shell::{Command, CommandHandler, Shell, ShellResult};

/// Name of the CPU listing command.
pub const LSCPU: &str = "lscpu";
/// Name of the reserved SoC listing command.
pub const LSSOC: &str = "lssoc";
/// Name of the unique-id command.
pub const LSID: &str = "lsid";
/// Name of the reset-cause command.
pub const LSRST: &str = "lsrst";

fn status(result: fmt::Result) -> ShellResult {
    match result {
        Ok(()) => ShellResult::Ok,
        Err(_) => ShellResult::ExecutionError,
    }
}

fn yes_no(present: bool) -> &'static str {
    if present { "yes" } else { "no" }
}

/// `lscpu [-j|--json]`: chip model, revision, cores and features.
#[derive(Debug)]
pub struct Lscpu<'p, P: ?Sized> {
    platform: &'p P,
}

impl<'p, P: Platform + ?Sized> Lscpu<'p, P> {
    /// Handler querying `platform`.
    pub fn new(platform: &'p P) -> Self {
        Self { platform }
    }

    fn write_listing(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        let info = self.platform.chip_info();

        write!(out, "chip: {}\r\n", map_chip_model(info.model))?;
        write!(
            out,
            "revision: v{}.{} ({})\r\n",
            info.revision_major(),
            info.revision_minor(),
            info.revision
        )?;
        write!(out, "cores: {}\r\n", info.cores)?;
        for (label, present) in feature_flags(info.features) {
            write!(out, "{}: {}\r\n", label, yes_no(present))?;
        }
        Ok(())
    }

    fn write_json(&self, out: &mut dyn fmt::Write) -> ShellResult {
        let mut buf = [0u8; JSON_SNAPSHOT_MAX_LEN];
        let Ok(len) = report::to_json(self.platform, &mut buf) else {
            return ShellResult::ExecutionError;
        };
        let Ok(json) = core::str::from_utf8(&buf[..len]) else {
            return ShellResult::ExecutionError;
        };
        status(write!(out, "{}\r\n", json))
    }
}

impl<P: Platform + ?Sized> CommandHandler for Lscpu<'_, P> {
    fn call(&self, args: &[&str], out: &mut dyn fmt::Write) -> ShellResult {
        match args.get(1..).unwrap_or(&[]) {
            [] => status(self.write_listing(out)),
            ["-j"] | ["--json"] => self.write_json(out),
            _ => ShellResult::InvalidParameter,
        }
    }
}

/// `lssoc`: reserved for SoC-level details.
///
/// Currently a no-op: prints nothing and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lssoc;

impl CommandHandler for Lssoc {
    fn call(&self, _args: &[&str], _out: &mut dyn fmt::Write) -> ShellResult {
        ShellResult::Ok
    }
}

/// `lsid`: the unique id as colon-separated hex, most significant byte first.
#[derive(Debug)]
pub struct Lsid<'p, P: ?Sized> {
    platform: &'p P,
}

impl<'p, P: Platform + ?Sized> Lsid<'p, P> {
    /// Handler querying `platform`.
    pub fn new(platform: &'p P) -> Self {
        Self { platform }
    }
}

impl<P: Platform + ?Sized> CommandHandler for Lsid<'_, P> {
    fn call(&self, _args: &[&str], out: &mut dyn fmt::Write) -> ShellResult {
        status(write!(out, "{}\r\n", self.platform.unique_id()))
    }
}

/// `lsrst`: cause of the last reset.
#[derive(Debug)]
pub struct Lsrst<'p, P: ?Sized> {
    platform: &'p P,
}

impl<'p, P: Platform + ?Sized> Lsrst<'p, P> {
    /// Handler querying `platform`.
    pub fn new(platform: &'p P) -> Self {
        Self { platform }
    }
}

impl<P: Platform + ?Sized> CommandHandler for Lsrst<'_, P> {
    fn call(&self, _args: &[&str], out: &mut dyn fmt::Write) -> ShellResult {
        let reason = map_reset_reason(self.platform.reset_reason());
        status(write!(out, "last reset: {}\r\n", reason))
    }
}

/// The full set of chip-information commands for one platform.
pub struct HwCommands<'p, P: ?Sized> {
    lscpu: Lscpu<'p, P>,
    lssoc: Lssoc,
    lsid: Lsid<'p, P>,
    lsrst: Lsrst<'p, P>,
}

impl<'p, P: Platform + ?Sized> HwCommands<'p, P> {
    /// Commands querying `platform`.
    pub fn new(platform: &'p P) -> Self {
        Self {
            lscpu: Lscpu::new(platform),
            lssoc: Lssoc,
            lsid: Lsid::new(platform),
            lsrst: Lsrst::new(platform),
        }
    }

    /// Command table, ready for [`Shell::register_commands`].
    pub fn commands(&self) -> [Command<'_>; 4] {
        [
            Command {
                name: LSCPU,
                description: "Show chip model, revision, cores and features",
                handler: &self.lscpu,
            },
            Command {
                name: LSSOC,
                description: "Show SoC details (reserved)",
                handler: &self.lssoc,
            },
            Command {
                name: LSID,
                description: "Show the factory-programmed unique id",
                handler: &self.lsid,
            },
            Command {
                name: LSRST,
                description: "Show the cause of the last reset",
                handler: &self.lsrst,
            },
        ]
    }

    /// Register every command on `shell`.
    ///
    /// Fails if a name is taken or the registry is full; treat that as a
    /// fatal startup error.
    pub fn register<'a>(&'a self, shell: &mut Shell<'a>) -> ShellResult {
        shell.register_commands(&self.commands())
    }
}

impl<P: ?Sized> fmt::Debug for HwCommands<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries([LSCPU, LSSOC, LSID, LSRST])
            .finish()
    }
}
