//! Tests for the shell protocol
//!
//! These tests verify:
//! - Command parsing (verbs, aliases, case, whitespace)
//! - Rejection of malformed lines
//! - Response rendering

use hashkv::protocol::{format_response, parse_command, Command, CommandType, Response};
use hashkv::HashKvError;

// =============================================================================
// Helper Functions
// =============================================================================

fn assert_protocol_error(line: &str) {
    let result = parse_command(line);
    assert!(
        matches!(result, Err(HashKvError::Protocol(_))),
        "expected protocol error for {:?}, got {:?}",
        line,
        result
    );
}

// =============================================================================
// Parse Tests
// =============================================================================

#[test]
fn test_parse_get() {
    let cmd = parse_command("GET mykey").unwrap();
    assert_eq!(
        cmd,
        Command::Get {
            key: b"mykey".to_vec()
        }
    );
    assert_eq!(cmd.command_type(), CommandType::Get);
}

#[test]
fn test_parse_put() {
    let cmd = parse_command("PUT mykey myvalue").unwrap();
    assert_eq!(
        cmd,
        Command::Put {
            key: b"mykey".to_vec(),
            value: b"myvalue".to_vec()
        }
    );
    assert_eq!(cmd.command_type(), CommandType::Put);
}

#[test]
fn test_parse_put_value_keeps_spaces() {
    let cmd = parse_command("PUT greeting hello   big world").unwrap();
    assert_eq!(
        cmd,
        Command::Put {
            key: b"greeting".to_vec(),
            value: b"hello   big world".to_vec()
        }
    );
}

#[test]
fn test_parse_set_alias() {
    let cmd = parse_command("SET k v").unwrap();
    assert_eq!(cmd.command_type(), CommandType::Put);
}

#[test]
fn test_parse_delete_aliases() {
    for line in ["DEL k", "DELETE k", "del k"] {
        assert_eq!(
            parse_command(line).unwrap(),
            Command::Delete { key: b"k".to_vec() }
        );
    }
}

#[test]
fn test_parse_is_case_insensitive() {
    assert_eq!(parse_command("get Key").unwrap().command_type(), CommandType::Get);
    assert_eq!(parse_command("Ping").unwrap(), Command::Ping);

    // Keys keep their case
    assert_eq!(
        parse_command("get Key").unwrap(),
        Command::Get {
            key: b"Key".to_vec()
        }
    );
}

#[test]
fn test_parse_trims_whitespace() {
    assert_eq!(
        parse_command("   GET   k  \r").unwrap(),
        Command::Get { key: b"k".to_vec() }
    );
}

#[test]
fn test_parse_admin_commands() {
    assert_eq!(parse_command("STATS").unwrap(), Command::Stats);
    assert_eq!(parse_command("RESET").unwrap(), Command::ResetStats);
    assert_eq!(parse_command("PING").unwrap(), Command::Ping);
    assert_eq!(
        parse_command("reset").unwrap().command_type(),
        CommandType::ResetStats
    );
}

#[test]
fn test_parse_malformed_lines() {
    assert_protocol_error("");
    assert_protocol_error("   ");
    assert_protocol_error("GET");
    assert_protocol_error("GET a b");
    assert_protocol_error("PUT onlykey");
    assert_protocol_error("DEL");
    assert_protocol_error("STATS now");
    assert_protocol_error("PING pong");
}

#[test]
fn test_parse_unknown_command() {
    let result = parse_command("FLUSH");
    match result {
        Err(HashKvError::Protocol(message)) => assert!(message.contains("FLUSH")),
        other => panic!("unexpected result: {:?}", other),
    }
}

// =============================================================================
// Format Tests
// =============================================================================

#[test]
fn test_format_responses() {
    assert_eq!(format_response(&Response::ok(None)), "OK");
    assert_eq!(
        format_response(&Response::ok(Some(b"value".to_vec()))),
        "value"
    );
    assert_eq!(format_response(&Response::not_found()), "NOT_FOUND");
    assert_eq!(format_response(&Response::exists()), "EXISTS");
    assert_eq!(format_response(&Response::error("bad")), "ERR bad");
}

#[test]
fn test_format_non_utf8_payload() {
    let response = Response::ok(Some(vec![b'a', 0xFF, b'b']));
    assert_eq!(format_response(&response), "a\u{FFFD}b");
}
