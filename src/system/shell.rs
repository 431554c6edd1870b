//! Command shell for embedded systems.
//!
//! The shell keeps a registry of named commands and dispatches input lines to
//! them. Every command is a [`CommandHandler`] trait object stored under its
//! name; names are unique within a shell. Handlers write their output to a
//! [`Session`], which forwards text to the output function configured on the
//! shell (UART, USB-CDC, USB-JTAG, a test buffer...).
//!
//! # Execution model
//!
//! Dispatch is strictly sequential. A matched handler runs to completion on
//! the caller's context before the next line is processed, and the shell
//! reports [`DispatchState::Executing`] only for that duration. There is no
//! timeout: a handler that never returns owns the session.
//!
//! ```text
//!            line read, command found
//!   ┌──────┐ ───────────────────────▶ ┌───────────┐
//!   │ Idle │                          │ Executing │
//!   └──────┘ ◀─────────────────────── └───────────┘
//!             handler returned (any status)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use core::fmt::Write;
//! use libsocinfo::system::shell::{Shell, ShellResult};
//!
//! fn hello(args: &[&str], out: &mut dyn Write) -> ShellResult {
//!     let who = args.get(1).copied().unwrap_or("world");
//!     let _ = write!(out, "hello, {}\r\n", who);
//!     ShellResult::Ok
//! }
//!
//! let print = |text: &str| print!("{}", text);
//! let mut shell = Shell::new();
//! shell.set_output_function(&print);
//! shell.register_command("hello", "Say hello", &hello).into_result().unwrap();
//!
//! // Whole lines...
//! assert_eq!(shell.dispatch("hello there"), ShellResult::Ok);
//! // ...or raw transport bytes.
//! shell.input(b"hello\r");
//! ```
//!
//! # Argument syntax
//!
//! Arguments are separated by spaces or tabs. Double quotes group an argument
//! containing spaces and accept the escapes `\"`, `\\`, `\n`, `\t` and `\r`:
//!
//! ```text
//! > echo "Hello World"           # ["echo", "Hello World"]
//! > echo "Line 1\nLine 2"        # ["echo", "Line 1<LF>Line 2"]
//! > path "C:\\Program Files"     # ["path", "C:\Program Files"]
//! ```

use core::fmt::{self, Write as _};
use core::str;
use heapless::{FnvIndexMap, String, Vec};

/// Maximum length of an input line, including the terminator slot.
pub const MAX_BUFFER_SIZE: usize = 256;

/// Maximum number of arguments per line, the command name included.
pub const MAX_ARGS: usize = 16;

/// Capacity of the command registry. Must be a power of two.
pub const MAX_COMMANDS: usize = 16;

/// Maximum length of a command name.
pub const MAX_COMMAND_NAME_LEN: usize = 32;

/// Help text of the built-in `list` command.
pub const LIST_DESCRIPTION: &str = "List available commands";

/// ASCII backspace character (0x08).
pub const ASCII_BACKSPACE: u8 = 0x08;
/// ASCII horizontal tab character (0x09).
pub const ASCII_TAB: u8 = 0x09;
/// ASCII line feed character (0x0A).
pub const ASCII_LF: u8 = 0x0A;
/// ASCII carriage return character (0x0D).
pub const ASCII_CR: u8 = 0x0D;
/// ASCII delete character (0x7F).
pub const ASCII_DEL: u8 = 0x7F;
/// ASCII space character (0x20).
pub const ASCII_SPACE: u8 = 0x20;

/// Status of a shell operation or of a command handler.
///
/// Every status has a numeric [`code`](ShellResult::code) in the platform's
/// error-code space; `Ok` is the only zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellResult {
    /// Operation completed successfully.
    Ok,
    /// Invalid parameter was provided to a command or shell operation.
    InvalidParameter,
    /// The command registry is full.
    OutOfMemory,
    /// Input line too long.
    BufferOverflow,
    /// A command with this name is already registered.
    DuplicateCommand,
    /// No command with this name is registered.
    CommandNotFound,
    /// A command handler failed while running.
    ExecutionError,
}

impl ShellResult {
    /// Numeric status code. Zero for `Ok`.
    pub fn code(self) -> i32 {
        match self {
            ShellResult::Ok => 0,
            ShellResult::ExecutionError => -1,
            ShellResult::OutOfMemory => 0x101,
            ShellResult::InvalidParameter => 0x102,
            ShellResult::DuplicateCommand => 0x103,
            ShellResult::BufferOverflow => 0x104,
            ShellResult::CommandNotFound => 0x105,
        }
    }

    /// Whether this is [`ShellResult::Ok`].
    pub fn is_ok(self) -> bool {
        self == ShellResult::Ok
    }

    /// Convert to a `Result`, so setup code can use `?` or abort on failure.
    ///
    /// ```rust
    /// use libsocinfo::system::shell::ShellResult;
    ///
    /// assert_eq!(ShellResult::Ok.into_result(), Ok(()));
    /// assert_eq!(
    ///     ShellResult::OutOfMemory.into_result(),
    ///     Err(ShellResult::OutOfMemory)
    /// );
    /// ```
    pub fn into_result(self) -> Result<(), ShellResult> {
        match self {
            ShellResult::Ok => Ok(()),
            err => Err(err),
        }
    }

    /// Short name of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            ShellResult::Ok => "Ok",
            ShellResult::InvalidParameter => "InvalidParameter",
            ShellResult::OutOfMemory => "OutOfMemory",
            ShellResult::BufferOverflow => "BufferOverflow",
            ShellResult::DuplicateCommand => "DuplicateCommand",
            ShellResult::CommandNotFound => "CommandNotFound",
            ShellResult::ExecutionError => "ExecutionError",
        }
    }
}

impl fmt::Display for ShellResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ShellResult {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ShellResult::Ok => defmt::write!(f, "Ok"),
            ShellResult::InvalidParameter => defmt::write!(f, "InvalidParameter"),
            ShellResult::OutOfMemory => defmt::write!(f, "OutOfMemory"),
            ShellResult::BufferOverflow => defmt::write!(f, "BufferOverflow"),
            ShellResult::DuplicateCommand => defmt::write!(f, "DuplicateCommand"),
            ShellResult::CommandNotFound => defmt::write!(f, "CommandNotFound"),
            ShellResult::ExecutionError => defmt::write!(f, "ExecutionError"),
        }
    }
}

/// Behaviour bound to a command name.
///
/// `args[0]` is the command name as typed; the remaining entries are its
/// arguments. Output goes to `out`, one logical message per line, each line
/// terminated by `\r\n`. Write errors on `out` may be ignored: a session sink
/// cannot fail.
///
/// Any `Fn(&[&str], &mut dyn fmt::Write) -> ShellResult` is a handler, so
/// plain functions and closures can be registered directly.
pub trait CommandHandler {
    /// Run the command to completion.
    fn call(&self, args: &[&str], out: &mut dyn fmt::Write) -> ShellResult;
}

impl<F> CommandHandler for F
where
    F: Fn(&[&str], &mut dyn fmt::Write) -> ShellResult,
{
    fn call(&self, args: &[&str], out: &mut dyn fmt::Write) -> ShellResult {
        self(args, out)
    }
}

/// Output sink for shell text.
///
/// Receives every piece of text the shell produces: echoed input, handler
/// output, help text and error messages.
pub type OutputFn<'a> = &'a dyn Fn(&str);

/// Text writer handed to command handlers.
///
/// Forwards everything to the shell's output function. Writing never fails;
/// with no output function configured the text is discarded.
#[derive(Clone, Copy)]
pub struct Session<'s> {
    output_fn: Option<OutputFn<'s>>,
}

impl<'s> Session<'s> {
    /// Session writing to `output_fn`.
    pub fn new(output_fn: Option<OutputFn<'s>>) -> Self {
        Self { output_fn }
    }
}

impl fmt::Write for Session<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(output_fn) = self.output_fn {
            output_fn(s);
        }
        Ok(())
    }
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("connected", &self.output_fn.is_some())
            .finish()
    }
}

/// A registered command.
#[derive(Clone, Copy)]
pub struct Command<'a> {
    /// The command name as typed by the user. Case-sensitive.
    pub name: &'a str,

    /// One-line help text, shown by `list` and `<name> --help`.
    pub description: &'a str,

    /// What runs when the command is invoked.
    pub handler: &'a dyn CommandHandler,
}

impl fmt::Debug for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Whether the shell is waiting for a line or running a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Waiting for the next line.
    Idle,
    /// A matched handler is running.
    Executing,
}

type CommandKey = String<MAX_COMMAND_NAME_LEN>;

/// Command registry, dispatcher and line editor.
///
/// Populate the registry once at startup, then feed it input. The registry
/// borrows its handlers for `'a`, so they must outlive the shell.
///
/// # Examples
///
/// ```rust
/// use libsocinfo::system::shell::Shell;
///
/// let print = |text: &str| print!("{}", text);
/// let mut shell = Shell::new();
/// shell.set_echo(false);
/// shell.set_help(true);
/// shell.set_output_function(&print);
/// ```
pub struct Shell<'a> {
    buffer: [u8; MAX_BUFFER_SIZE],
    buffer_len: usize,
    discarding: bool,

    commands: FnvIndexMap<CommandKey, Command<'a>, MAX_COMMANDS>,
    output_fn: Option<OutputFn<'a>>,
    state: DispatchState,

    echo_enabled: bool,
    list_command_enabled: bool,
    help_enabled: bool,
}

impl Default for Shell<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Shell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("commands", &self.commands.len())
            .field("state", &self.state)
            .field("echo_enabled", &self.echo_enabled)
            .finish_non_exhaustive()
    }
}

impl<'a> Shell<'a> {
    /// Create a shell with echo, help flags and the `list` command enabled,
    /// no output function and an empty registry.
    pub fn new() -> Self {
        Self {
            buffer: [0; MAX_BUFFER_SIZE],
            buffer_len: 0,
            discarding: false,
            commands: FnvIndexMap::new(),
            output_fn: None,
            state: DispatchState::Idle,
            echo_enabled: true,
            list_command_enabled: true,
            help_enabled: true,
        }
    }

    /// Set where shell output goes.
    pub fn set_output_function(&mut self, output_fn: OutputFn<'a>) -> ShellResult {
        self.output_fn = Some(output_fn);
        ShellResult::Ok
    }

    /// Echo typed characters back through the output function.
    ///
    /// Only affects [`input`](Self::input); [`dispatch`](Self::dispatch)
    /// never echoes.
    pub fn set_echo(&mut self, enabled: bool) {
        self.echo_enabled = enabled;
    }

    /// Enable the built-in `list` command.
    ///
    /// A registered command named `list` takes precedence over the built-in.
    pub fn set_list_command(&mut self, enabled: bool) {
        self.list_command_enabled = enabled;
    }

    /// Answer `<name> -h` and `<name> --help` with the command's help text
    /// instead of running it.
    pub fn set_help(&mut self, enabled: bool) {
        self.help_enabled = enabled;
    }

    /// Register a command.
    ///
    /// # Arguments
    ///
    /// * `name` - Command name, matched case-sensitively against `argv[0]`
    /// * `description` - One-line help text for `list` and `--help`
    /// * `handler` - What runs when the command is invoked
    ///
    /// # Returns
    ///
    /// * [`ShellResult::Ok`] - Command registered
    /// * [`ShellResult::InvalidParameter`] - Name empty or longer than [`MAX_COMMAND_NAME_LEN`]
    /// * [`ShellResult::DuplicateCommand`] - Name already taken; the registry is unchanged
    /// * [`ShellResult::OutOfMemory`] - [`MAX_COMMANDS`] already registered
    ///
    /// Registration happens at startup, so callers should treat any failure
    /// as fatal.
    pub fn register_command(
        &mut self,
        name: &'a str,
        description: &'a str,
        handler: &'a dyn CommandHandler,
    ) -> ShellResult {
        if name.is_empty() {
            return ShellResult::InvalidParameter;
        }

        let Ok(key) = CommandKey::try_from(name) else {
            log::warn!("command name too long: {}", name);
            return ShellResult::InvalidParameter;
        };

        if self.commands.contains_key(&key) {
            log::warn!("command already registered: {}", name);
            return ShellResult::DuplicateCommand;
        }

        let command = Command {
            name,
            description,
            handler,
        };

        match self.commands.insert(key, command) {
            Ok(_) => ShellResult::Ok,
            Err(_) => {
                log::warn!("command registry full, dropping {}", name);
                ShellResult::OutOfMemory
            }
        }
    }

    /// Register a table of commands, stopping at the first failure.
    ///
    /// Commands registered before the failing one stay registered.
    ///
    /// # Arguments
    ///
    /// * `commands` - Commands to register, in order
    ///
    /// # Returns
    ///
    /// [`ShellResult::Ok`] when all were registered, otherwise the first
    /// failure from [`register_command`](Self::register_command).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use core::fmt::Write;
    /// use libsocinfo::system::shell::{Command, Shell, ShellResult};
    ///
    /// fn ping(_: &[&str], out: &mut dyn Write) -> ShellResult {
    ///     let _ = out.write_str("pong\r\n");
    ///     ShellResult::Ok
    /// }
    ///
    /// let table = [
    ///     Command { name: "ping", description: "Reply with pong", handler: &ping },
    ///     Command { name: "ping", description: "Again", handler: &ping },
    /// ];
    /// let mut shell = Shell::new();
    /// assert_eq!(shell.register_commands(&table), ShellResult::DuplicateCommand);
    /// assert_eq!(shell.len(), 1);
    /// ```
    pub fn register_commands(&mut self, commands: &[Command<'a>]) -> ShellResult {
        for command in commands {
            let result = self.register_command(command.name, command.description, command.handler);
            if !result.is_ok() {
                return result;
            }
        }
        ShellResult::Ok
    }

    /// Look up a command by name.
    pub fn command(&self, name: &str) -> Option<&Command<'a>> {
        let key = CommandKey::try_from(name).ok()?;
        self.commands.get(&key)
    }

    /// Registered commands, in registration order.
    pub fn commands(&self) -> impl Iterator<Item = &Command<'a>> {
        self.commands.values()
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Current dispatcher state.
    pub fn state(&self) -> DispatchState {
        self.state
    }

    /// Process raw input bytes from the transport.
    ///
    /// - **CR/LF**: dispatches the buffered line
    /// - **Backspace/Delete**: removes the last character
    /// - **Printable ASCII**: appended to the line (and echoed)
    /// - anything else is ignored
    ///
    /// A line that outgrows [`MAX_BUFFER_SIZE`] is dropped whole: the buffer
    /// is cleared and every byte up to the next CR/LF is skipped without
    /// being run. Processing then resumes with the bytes after that
    /// terminator, so later lines in the same chunk still execute.
    ///
    /// # Arguments
    ///
    /// * `data` - Bytes as received, possibly several lines or a fragment
    ///
    /// # Returns
    ///
    /// * [`ShellResult::Ok`] - Every byte was consumed
    /// * [`ShellResult::BufferOverflow`] - At least one line in `data` was
    ///   too long and dropped
    ///
    /// Handler statuses are reported to the session, not returned here.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use libsocinfo::system::shell::{Shell, ShellResult};
    ///
    /// let mut shell = Shell::new();
    /// assert_eq!(shell.input(b"list\r"), ShellResult::Ok);
    ///
    /// let mut long = [b'x'; 300].to_vec();
    /// long.extend_from_slice(b"\rlist\r");
    /// assert_eq!(shell.input(&long), ShellResult::BufferOverflow);
    /// ```
    pub fn input(&mut self, data: &[u8]) -> ShellResult {
        let mut overflowed = false;

        for &byte in data {
            match byte {
                ASCII_CR | ASCII_LF => {
                    if self.echo_enabled {
                        self.output(if byte == ASCII_CR { "\r" } else { "\n" });
                    }
                    if self.discarding {
                        self.discarding = false;
                    } else {
                        self.execute_buffer();
                    }
                    self.reset_buffer();
                }
                _ if self.discarding => {}
                ASCII_BACKSPACE | ASCII_DEL => {
                    if self.buffer_len > 0 {
                        self.buffer_len -= 1;
                        self.buffer[self.buffer_len] = 0;
                        if self.echo_enabled {
                            self.output("\x08 \x08");
                        }
                    }
                }
                0x20..=0x7E => {
                    if self.buffer_len >= MAX_BUFFER_SIZE - 1 {
                        log::warn!("input line too long, dropped");
                        self.reset_buffer();
                        self.discarding = true;
                        overflowed = true;
                        continue;
                    }
                    self.buffer[self.buffer_len] = byte;
                    self.buffer_len += 1;

                    if self.echo_enabled {
                        let mut ch = [0u8; 4];
                        self.output(char::from(byte).encode_utf8(&mut ch));
                    }
                }
                _ => {}
            }
        }

        if overflowed {
            ShellResult::BufferOverflow
        } else {
            ShellResult::Ok
        }
    }

    /// Dispatch one complete line.
    ///
    /// `<name> -h` and `<name> --help` print the help text of a registered
    /// command instead of running it. A name that is neither registered nor
    /// a built-in is reported to the session as unknown, with or without a
    /// help flag.
    ///
    /// # Arguments
    ///
    /// * `line` - One line without its terminator
    ///
    /// # Returns
    ///
    /// * The handler's status when a command ran
    /// * [`ShellResult::Ok`] - Empty line, built-in `list` or a help request
    /// * [`ShellResult::CommandNotFound`] - Nothing matched
    /// * [`ShellResult::BufferOverflow`] - `line` does not fit the line buffer
    ///
    /// Any partially typed [`input`](Self::input) line is discarded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use libsocinfo::system::shell::{Shell, ShellResult};
    ///
    /// let mut shell = Shell::new();
    /// assert_eq!(shell.dispatch(""), ShellResult::Ok);
    /// assert_eq!(shell.dispatch("nosuch"), ShellResult::CommandNotFound);
    /// assert_eq!(shell.dispatch("nosuch --help"), ShellResult::CommandNotFound);
    /// ```
    pub fn dispatch(&mut self, line: &str) -> ShellResult {
        let bytes = line.as_bytes();
        if bytes.len() >= MAX_BUFFER_SIZE {
            return ShellResult::BufferOverflow;
        }

        self.reset_buffer();
        self.discarding = false;
        self.buffer[..bytes.len()].copy_from_slice(bytes);
        self.buffer_len = bytes.len();

        let result = self.execute_buffer();
        self.reset_buffer();
        result
    }

    pub(crate) fn output(&self, text: &str) {
        if let Some(output_fn) = self.output_fn {
            output_fn(text);
        }
    }

    fn output_fmt(&self, args: fmt::Arguments<'_>) {
        let _ = Session::new(self.output_fn).write_fmt(args);
    }

    fn reset_buffer(&mut self) {
        self.buffer.fill(0);
        self.buffer_len = 0;
    }

    fn execute_buffer(&mut self) -> ShellResult {
        let spans = split_arguments(&mut self.buffer[..self.buffer_len]);

        let mut argv: Vec<&str, MAX_ARGS> = Vec::new();
        for &(start, len) in &spans {
            let arg = str::from_utf8(&self.buffer[start..start + len]).unwrap_or("");
            // `spans` holds at most MAX_ARGS entries
            let _ = argv.push(arg);
        }

        let Some(&name) = argv.first() else {
            return ShellResult::Ok;
        };

        let help_requested =
            self.help_enabled && argv.len() == 2 && matches!(argv[1], "-h" | "--help");

        let Some(command) = self.command(name).copied() else {
            if self.list_command_enabled && name == "list" {
                if help_requested {
                    self.output(LIST_DESCRIPTION);
                    self.output("\r\n");
                } else {
                    self.list_commands();
                }
                return ShellResult::Ok;
            }

            log::debug!("unknown command: {}", name);
            if self.list_command_enabled {
                self.output("Unknown command. Type 'list' to see available commands.\r\n");
            } else {
                self.output("Unknown command.\r\n");
            }
            return ShellResult::CommandNotFound;
        };

        if help_requested {
            self.output(command.description);
            self.output("\r\n");
            return ShellResult::Ok;
        }

        log::debug!("dispatch: {} ({} args)", command.name, argv.len() - 1);
        self.state = DispatchState::Executing;
        let status = command
            .handler
            .call(&argv, &mut Session::new(self.output_fn));
        self.state = DispatchState::Idle;

        if !status.is_ok() {
            self.output_fmt(format_args!(
                "Command returned non-zero error code: 0x{:x} ({})\r\n",
                status.code(),
                status
            ));
        }

        status
    }

    fn list_commands(&self) {
        self.output("Available commands:\r\n");
        for command in self.commands.values() {
            self.output(command.name);
            self.output("\t\t");
            self.output(command.description);
            self.output("\r\n");
        }
    }
}

fn is_separator(byte: u8) -> bool {
    byte == ASCII_SPACE || byte == ASCII_TAB
}

/// Split `line` into argument spans of `(start, len)`.
///
/// Quoted arguments are unescaped in place, which is why the line is taken
/// mutably. Arguments past [`MAX_ARGS`] are dropped.
fn split_arguments(line: &mut [u8]) -> Vec<(usize, usize), MAX_ARGS> {
    let mut spans = Vec::new();
    let mut i = 0;

    while i < line.len() && !spans.is_full() {
        while i < line.len() && is_separator(line[i]) {
            i += 1;
        }
        if i >= line.len() {
            break;
        }

        let span = if line[i] == b'"' {
            let (len, next) = unquote(line, i + 1);
            let span = (i + 1, len);
            i = next;
            span
        } else {
            // A quote inside a bare word starts a new argument.
            let start = i;
            while i < line.len() && !is_separator(line[i]) && line[i] != b'"' {
                i += 1;
            }
            (start, i - start)
        };

        let _ = spans.push(span);
    }

    spans
}

/// Unescape the quoted argument starting at `start` (just past the opening
/// quote). Returns its unescaped length and the index after the closing
/// quote. An unterminated quote runs to the end of the line.
fn unquote(line: &mut [u8], start: usize) -> (usize, usize) {
    let mut read = start;
    let mut write = start;

    while read < line.len() {
        match line[read] {
            b'"' => return (write - start, read + 1),
            b'\\' if read + 1 < line.len() => {
                line[write] = match line[read + 1] {
                    b'n' => b'\n',
                    b't' => b'\t',
                    b'r' => b'\r',
                    other => other,
                };
                read += 2;
            }
            byte => {
                line[write] = byte;
                read += 1;
            }
        }
        write += 1;
    }

    (write - start, read)
}
