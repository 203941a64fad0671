//! Protocol Module
//!
//! Line-oriented text protocol spoken by the `hashkv` shell.
//!
//! ## Request Format
//! One command per line, verbs are case-insensitive:
//! ```text
//! GET <key>
//! PUT <key> <value...>     (value runs to the end of the line)
//! DEL <key>
//! STATS                    (page reads / peeks / writes so far)
//! RESET                    (zero the page access counters)
//! PING
//! ```
//!
//! ## Response Format
//! ```text
//! <value> | OK | NOT_FOUND | EXISTS | ERR <message>
//! ```

mod codec;
mod command;
mod response;

pub use codec::{format_response, parse_command};
pub use command::{Command, CommandType};
pub use response::{Response, Status};
