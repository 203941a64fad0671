//! Protocol codec
//!
//! Parsing of command lines and rendering of responses.

use crate::error::{HashKvError, Result};

use super::{Command, Response, Status};

/// Parse one command line
pub fn parse_command(line: &str) -> Result<Command> {
    let (verb, rest) = split_token(line.trim());
    if verb.is_empty() {
        return Err(HashKvError::Protocol("empty command".to_string()));
    }

    match verb.to_ascii_uppercase().as_str() {
        "GET" => Ok(Command::Get {
            key: single_key("GET", rest)?,
        }),
        "PUT" | "SET" => {
            let (key, value) = split_token(rest);
            if key.is_empty() || value.is_empty() {
                return Err(HashKvError::Protocol(
                    "PUT command: expected <key> <value>".to_string(),
                ));
            }
            Ok(Command::Put {
                key: key.as_bytes().to_vec(),
                value: value.as_bytes().to_vec(),
            })
        }
        "DEL" | "DELETE" => Ok(Command::Delete {
            key: single_key("DEL", rest)?,
        }),
        "STATS" => no_arguments("STATS", rest, Command::Stats),
        "RESET" => no_arguments("RESET", rest, Command::ResetStats),
        "PING" => no_arguments("PING", rest, Command::Ping),
        _ => Err(HashKvError::Protocol(format!("Unknown command: {}", verb))),
    }
}

/// Render a response as a single output line
pub fn format_response(response: &Response) -> String {
    let payload = response
        .payload
        .as_deref()
        .map(|bytes| String::from_utf8_lossy(bytes).into_owned());

    match (response.status, payload) {
        (Status::Ok, Some(payload)) => payload,
        (Status::Ok, None) => "OK".to_string(),
        (Status::NotFound, _) => "NOT_FOUND".to_string(),
        (Status::Exists, _) => "EXISTS".to_string(),
        (Status::Error, Some(message)) => format!("ERR {}", message),
        (Status::Error, None) => "ERR".to_string(),
    }
}

/// Split off the first whitespace-delimited token
fn split_token(input: &str) -> (&str, &str) {
    match input.find(char::is_whitespace) {
        Some(pos) => (&input[..pos], input[pos..].trim_start()),
        None => (input, ""),
    }
}

fn single_key(verb: &str, rest: &str) -> Result<Vec<u8>> {
    let (key, extra) = split_token(rest);
    if key.is_empty() || !extra.is_empty() {
        return Err(HashKvError::Protocol(format!(
            "{} command: expected exactly one key",
            verb
        )));
    }
    Ok(key.as_bytes().to_vec())
}

fn no_arguments(verb: &str, rest: &str, command: Command) -> Result<Command> {
    if !rest.is_empty() {
        return Err(HashKvError::Protocol(format!(
            "{} command takes no arguments",
            verb
        )));
    }
    Ok(command)
}
