//! Commands sent to bspwm over its control socket.
//!
//! This module defines the vocabulary shared by the engine, the snapshot
//! model and the transport: [`Command`] describes every message btops ever
//! sends.  The wire encoding is a sequence of UTF-8 tokens, each terminated
//! by a single NUL byte.

use std::fmt;

/// Every message btops sends to the window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Dump the full window-manager state as JSON (`wm -d`).
    QueryState,

    /// Open a report subscription (`subscribe report`).
    Subscribe,

    /// Rename the desktop with the given id.
    RenameDesktop { id: u32, name: String },

    /// Append a new desktop to the named monitor.
    AppendDesktop { monitor: String, name: String },

    /// Remove the desktop with the given id.
    RemoveDesktop { id: u32 },
}

impl Command {
    /// The ordered tokens of this command.
    pub fn tokens(&self) -> Vec<String> {
        match self {
            Command::QueryState => vec!["wm".into(), "-d".into()],
            Command::Subscribe => vec!["subscribe".into(), "report".into()],
            Command::RenameDesktop { id, name } => {
                vec!["desktop".into(), id.to_string(), "-n".into(), name.clone()]
            }
            Command::AppendDesktop { monitor, name } => {
                vec!["monitor".into(), monitor.clone(), "-a".into(), name.clone()]
            }
            Command::RemoveDesktop { id } => vec!["desktop".into(), id.to_string(), "-r".into()],
        }
    }

    /// Encode the command for the wire: every token followed by `\0`.
    pub fn payload(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for token in self.tokens() {
            buf.extend_from_slice(token.as_bytes());
            buf.push(0);
        }
        buf
    }

    /// Whether this command changes the desktop layout.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::RenameDesktop { .. } | Command::AppendDesktop { .. } | Command::RemoveDesktop { .. }
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tokens().join(" "))
    }
}
