use crate::mock::Capture;
use core::fmt::Write;
use libsocinfo::system::shell::*;
use std::cell::RefCell;

fn ok_handler(_args: &[&str], _out: &mut dyn Write) -> ShellResult {
    ShellResult::Ok
}

fn hello_handler(args: &[&str], out: &mut dyn Write) -> ShellResult {
    let who = args.get(1).copied().unwrap_or("world");
    let _ = write!(out, "hello, {}\r\n", who);
    ShellResult::Ok
}

fn fail_handler(_args: &[&str], _out: &mut dyn Write) -> ShellResult {
    ShellResult::InvalidParameter
}

fn first_handler(_args: &[&str], out: &mut dyn Write) -> ShellResult {
    let _ = out.write_str("first\r\n");
    ShellResult::Ok
}

fn second_handler(_args: &[&str], out: &mut dyn Write) -> ShellResult {
    let _ = out.write_str("second\r\n");
    ShellResult::Ok
}

#[test]
fn test_shell_default() {
    let shell = Shell::default();
    assert!(shell.is_empty());
    assert_eq!(shell.state(), DispatchState::Idle);
}

#[test]
fn test_register_command() {
    let mut shell = Shell::new();

    let result = shell.register_command("hello", "Say hello", &hello_handler);
    assert_eq!(result, ShellResult::Ok);
    assert_eq!(shell.len(), 1);
    assert_eq!(shell.command("hello").map(|c| c.description), Some("Say hello"));
}

#[test]
fn test_register_command_empty_name() {
    let mut shell = Shell::new();

    let result = shell.register_command("", "Empty name command", &ok_handler);
    assert_eq!(result, ShellResult::InvalidParameter);
    assert!(shell.is_empty());
}

#[test]
fn test_register_command_name_too_long() {
    let name = "x".repeat(MAX_COMMAND_NAME_LEN + 1);
    let mut shell = Shell::new();

    let result = shell.register_command(&name, "Too long", &ok_handler);
    assert_eq!(result, ShellResult::InvalidParameter);
    assert!(shell.is_empty());
}

#[test]
fn test_register_duplicate_is_rejected() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);

    assert_eq!(shell.register_command("cmd", "first", &first_handler), ShellResult::Ok);
    assert_eq!(
        shell.register_command("cmd", "second", &second_handler),
        ShellResult::DuplicateCommand
    );
    assert_eq!(shell.len(), 1);
    assert_eq!(shell.command("cmd").map(|c| c.description), Some("first"));

    shell.dispatch("cmd");
    assert_eq!(capture.take(), "first\r\n");
}

#[test]
fn test_register_command_overflow() {
    let mut shell = Shell::new();

    for i in 0..MAX_COMMANDS {
        let name: &'static str = format!("cmd{}", i).leak();
        assert_eq!(shell.register_command(name, "Test command", &ok_handler), ShellResult::Ok);
    }

    let result = shell.register_command("overflow", "Overflow command", &ok_handler);
    assert_eq!(result, ShellResult::OutOfMemory);
    assert_eq!(shell.len(), MAX_COMMANDS);
    assert!(result.into_result().is_err());
}

#[test]
fn test_register_commands_table_stops_at_first_failure() {
    let mut shell = Shell::new();
    let table = [
        Command { name: "a", description: "A", handler: &ok_handler },
        Command { name: "a", description: "again", handler: &ok_handler },
        Command { name: "b", description: "B", handler: &ok_handler },
    ];

    assert_eq!(shell.register_commands(&table), ShellResult::DuplicateCommand);
    assert_eq!(shell.len(), 1);
    assert!(shell.command("b").is_none());
}

#[test]
fn test_dispatch_passes_arguments() {
    let seen: RefCell<Vec<String>> = RefCell::new(Vec::new());
    let record = |args: &[&str], _out: &mut dyn Write| {
        *seen.borrow_mut() = args.iter().map(|s| s.to_string()).collect();
        ShellResult::Ok
    };
    let mut shell = Shell::new();
    shell.register_command("rec", "Record arguments", &record);

    let result = shell.dispatch(r#"rec one "two three" four"#);
    assert_eq!(result, ShellResult::Ok);
    assert_eq!(*seen.borrow(), ["rec", "one", "two three", "four"]);
}

#[test]
fn test_dispatch_writes_to_session() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.register_command("hello", "Say hello", &hello_handler);

    assert_eq!(shell.dispatch("hello rust"), ShellResult::Ok);
    assert_eq!(capture.take(), "hello, rust\r\n");
    assert_eq!(shell.state(), DispatchState::Idle);
}

#[test]
fn test_unknown_command_reports_once() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.register_command("hello", "Say hello", &hello_handler);

    let result = shell.dispatch("nosuch arg");
    assert_eq!(result, ShellResult::CommandNotFound);

    let output = capture.take();
    assert_eq!(output.matches("Unknown command").count(), 1);
    assert_eq!(output, "Unknown command. Type 'list' to see available commands.\r\n");
    assert_eq!(shell.len(), 1);
    assert!(shell.command("nosuch").is_none());
    assert_eq!(shell.state(), DispatchState::Idle);
}

#[test]
fn test_unknown_command_without_list() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.set_list_command(false);

    shell.dispatch("nosuch");
    assert_eq!(capture.take(), "Unknown command.\r\n");
}

#[test]
fn test_failing_handler_is_reported_and_loop_continues() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.register_command("fail", "Always fails", &fail_handler);
    shell.register_command("hello", "Say hello", &hello_handler);

    assert_eq!(shell.dispatch("fail"), ShellResult::InvalidParameter);
    assert_eq!(
        capture.take(),
        "Command returned non-zero error code: 0x102 (InvalidParameter)\r\n"
    );
    assert_eq!(shell.state(), DispatchState::Idle);

    assert_eq!(shell.dispatch("hello"), ShellResult::Ok);
    assert_eq!(capture.take(), "hello, world\r\n");
}

#[test]
fn test_empty_and_blank_lines() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);

    assert_eq!(shell.dispatch(""), ShellResult::Ok);
    assert_eq!(shell.dispatch("   \t  "), ShellResult::Ok);
    assert_eq!(capture.take(), "");
}

#[test]
fn test_dispatch_line_too_long() {
    let mut shell = Shell::new();
    let line = "a".repeat(MAX_BUFFER_SIZE);

    assert_eq!(shell.dispatch(&line), ShellResult::BufferOverflow);
}

#[test]
fn test_help_flag() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.register_command("hello", "Say hello", &hello_handler);

    shell.dispatch("hello --help");
    assert_eq!(capture.take(), "Say hello\r\n");

    shell.dispatch("hello -h");
    assert_eq!(capture.take(), "Say hello\r\n");

    assert_eq!(shell.dispatch("nosuch -h"), ShellResult::CommandNotFound);
    assert_eq!(
        capture.take(),
        "Unknown command. Type 'list' to see available commands.\r\n"
    );

    assert_eq!(shell.dispatch("nosuch --help"), ShellResult::CommandNotFound);
    assert_eq!(capture.take().matches("Unknown command").count(), 1);
}

#[test]
fn test_help_flag_unknown_without_list() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.set_list_command(false);

    assert_eq!(shell.dispatch("list --help"), ShellResult::CommandNotFound);
    assert_eq!(capture.take(), "Unknown command.\r\n");
}

#[test]
fn test_list_help_flag() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.register_command("hello", "Say hello", &hello_handler);

    assert_eq!(shell.dispatch("list -h"), ShellResult::Ok);
    assert_eq!(capture.take(), "List available commands\r\n");
}

#[test]
fn test_help_disabled_runs_command() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.set_help(false);
    shell.register_command("hello", "Say hello", &hello_handler);

    shell.dispatch("hello --help");
    assert_eq!(capture.take(), "hello, --help\r\n");
}

#[test]
fn test_list_command() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.register_command("hello", "Say hello", &hello_handler);
    shell.register_command("fail", "Always fails", &fail_handler);

    assert_eq!(shell.dispatch("list"), ShellResult::Ok);
    assert_eq!(
        capture.take(),
        "Available commands:\r\nhello\t\tSay hello\r\nfail\t\tAlways fails\r\n"
    );
}

#[test]
fn test_list_command_disabled() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.set_list_command(false);

    assert_eq!(shell.dispatch("list"), ShellResult::CommandNotFound);
    assert_eq!(capture.take(), "Unknown command.\r\n");
}

#[test]
fn test_input_echo_and_execute() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.register_command("hello", "Say hello", &hello_handler);

    assert_eq!(shell.input(b"hello"), ShellResult::Ok);
    assert_eq!(capture.take(), "hello");

    assert_eq!(shell.input(b"\r"), ShellResult::Ok);
    assert_eq!(capture.take(), "\rhello, world\r\n");
}

#[test]
fn test_input_no_echo() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.set_echo(false);
    shell.register_command("hello", "Say hello", &hello_handler);

    shell.input(b"hello you\n");
    assert_eq!(capture.take(), "hello, you\r\n");
}

#[test]
fn test_input_backspace_and_delete() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.set_echo(false);
    shell.register_command("hello", "Say hello", &hello_handler);

    shell.input(b"helloo\x08 bob\x7f\x7fb\r");
    assert_eq!(capture.take(), "hello, bb\r\n");
}

#[test]
fn test_input_backspace_echo() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);

    shell.input(b"ab\x08");
    assert_eq!(capture.take(), "ab\x08 \x08");

    // Nothing left to erase beyond the buffer start.
    shell.input(b"\x08\x08\x08");
    assert_eq!(capture.take(), "\x08 \x08");
}

#[test]
fn test_input_ignores_control_characters() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.set_echo(false);
    shell.register_command("hello", "Say hello", &hello_handler);

    shell.input(b"hel\x01\x1blo\x00\r");
    assert_eq!(capture.take(), "hello, world\r\n");
}

#[test]
fn test_input_buffer_overflow() {
    let mut shell = Shell::new();
    shell.set_echo(false);

    let data = vec![b'a'; MAX_BUFFER_SIZE];
    assert_eq!(shell.input(&data), ShellResult::BufferOverflow);
}

#[test]
fn test_input_overflow_drops_line_and_runs_next() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.set_echo(false);
    shell.register_command("hello", "Say hello", &hello_handler);

    let mut data = b"hello ".to_vec();
    data.extend(std::iter::repeat_n(b'x', MAX_BUFFER_SIZE + 40));
    data.extend_from_slice(b"\rhello again\r");

    assert_eq!(shell.input(&data), ShellResult::BufferOverflow);
    assert_eq!(capture.take(), "hello, again\r\n");

    assert_eq!(shell.input(b"\r"), ShellResult::Ok);
    assert_eq!(capture.take(), "");
}

#[test]
fn test_input_overflow_discards_until_terminator_across_calls() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.set_echo(false);
    shell.register_command("hello", "Say hello", &hello_handler);

    let data = vec![b'a'; MAX_BUFFER_SIZE];
    assert_eq!(shell.input(&data), ShellResult::BufferOverflow);

    // Tail of the dropped line, editing keys included, never reaches a handler.
    assert_eq!(shell.input(b"aa\x08\x7fhello"), ShellResult::Ok);
    assert_eq!(capture.take(), "");

    assert_eq!(shell.input(b"\nhello\r"), ShellResult::Ok);
    assert_eq!(capture.take(), "hello, world\r\n");
}

#[test]
fn test_dispatch_clears_dropped_input_line() {
    let capture = Capture::new();
    let sink = capture.sink();
    let mut shell = Shell::new();
    shell.set_output_function(&sink);
    shell.set_echo(false);
    shell.register_command("hello", "Say hello", &hello_handler);

    let data = vec![b'a'; MAX_BUFFER_SIZE];
    assert_eq!(shell.input(&data), ShellResult::BufferOverflow);
    assert_eq!(shell.dispatch("hello"), ShellResult::Ok);
    assert_eq!(capture.take(), "hello, world\r\n");

    assert_eq!(shell.input(b"hello bob\r"), ShellResult::Ok);
    assert_eq!(capture.take(), "hello, bob\r\n");
}

#[test]
fn test_input_crlf_runs_command_once() {
    let count = RefCell::new(0);
    let counter = |_args: &[&str], _out: &mut dyn Write| {
        *count.borrow_mut() += 1;
        ShellResult::Ok
    };
    let mut shell = Shell::new();
    shell.register_command("tick", "Count", &counter);

    shell.input(b"tick\r\n");
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn test_session_without_output_discards() {
    let mut session = Session::new(None);
    assert!(write!(session, "dropped").is_ok());
}

#[test]
fn test_shell_result_codes() {
    assert_eq!(ShellResult::Ok.code(), 0);
    assert!(ShellResult::Ok.is_ok());
    assert_eq!(ShellResult::Ok.into_result(), Ok(()));

    for status in [
        ShellResult::InvalidParameter,
        ShellResult::OutOfMemory,
        ShellResult::BufferOverflow,
        ShellResult::DuplicateCommand,
        ShellResult::CommandNotFound,
        ShellResult::ExecutionError,
    ] {
        assert_ne!(status.code(), 0);
        assert!(!status.is_ok());
        assert_eq!(status.into_result(), Err(status));
    }
}
