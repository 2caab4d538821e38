//! [`Transport`] implementation backed by bspwm's control socket.
//!
//! bspwm listens on a Unix stream socket, by default
//! `/tmp/bspwm{host}_{display}_{screen}-socket` derived from `$DISPLAY`, or
//! whatever `$BSPWM_SOCKET` names.  Every command opens a short-lived
//! connection, writes the NUL-delimited tokens and reads until bspwm closes
//! the stream.

use crate::command::Command;
use crate::traits::Transport;
use log::debug;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the socket path.
pub const SOCKET_ENV: &str = "BSPWM_SOCKET";

/// First byte of a response that reports a failed command.
const FAILURE_MARKER: u8 = 0x07;

/// Errors that can occur when talking to bspwm.
#[derive(Debug, thiserror::Error)]
pub enum BspwmError {
    #[error("connect to {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("bspwm IPC error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bspwm rejected command: {0}")]
    Rejected(String),
}

/// bspwm-backed transport.
///
/// No connection is held; each [`send`](Transport::send) opens its own.
#[derive(Debug, Clone)]
pub struct BspwmIpc {
    path: PathBuf,
}

impl Default for BspwmIpc {
    fn default() -> Self {
        Self::new()
    }
}

impl BspwmIpc {
    /// Use the socket bspwm would pick for the current environment.
    pub fn new() -> Self {
        Self { path: socket_path() }
    }

    /// Use an explicit socket path.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The filesystem path of the socket.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection and write `command` to it.
    pub(crate) fn connect_and_send(&self, command: &Command) -> Result<UnixStream, BspwmError> {
        let mut stream = UnixStream::connect(&self.path).map_err(|source| BspwmError::Connect {
            path: self.path.display().to_string(),
            source,
        })?;
        stream.write_all(&command.payload())?;
        Ok(stream)
    }
}

impl Transport for BspwmIpc {
    type Error = BspwmError;

    fn send(&self, command: &Command) -> Result<Vec<u8>, BspwmError> {
        debug!("sending {}", command);
        let mut stream = self.connect_and_send(command)?;
        let mut response = Vec::new();
        stream.read_to_end(&mut response)?;
        check_response(response)
    }
}

/// Turn a failure-marked response into [`BspwmError::Rejected`].
pub(crate) fn check_response(response: Vec<u8>) -> Result<Vec<u8>, BspwmError> {
    match response.split_first() {
        Some((&FAILURE_MARKER, message)) => Err(BspwmError::Rejected(
            String::from_utf8_lossy(message).trim().to_string(),
        )),
        _ => Ok(response),
    }
}

/// Resolve the socket path from `$BSPWM_SOCKET` or `$DISPLAY`.
pub fn socket_path() -> PathBuf {
    socket_path_from(
        std::env::var(SOCKET_ENV).ok(),
        std::env::var("DISPLAY").ok(),
    )
}

fn socket_path_from(explicit: Option<String>, display: Option<String>) -> PathBuf {
    if let Some(path) = explicit.filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let (host, display, screen) = display
        .as_deref()
        .and_then(parse_display)
        .unwrap_or_else(|| (String::new(), 0, 0));
    PathBuf::from(format!("/tmp/bspwm{}_{}_{}-socket", host, display, screen))
}

/// Split an X display name `[host]:display[.screen]`.
fn parse_display(name: &str) -> Option<(String, u32, u32)> {
    let (host, rest) = name.rsplit_once(':')?;
    let (display, screen) = match rest.split_once('.') {
        Some((d, s)) => (d.parse().ok()?, s.parse().ok()?),
        None => (rest.parse().ok()?, 0),
    };
    Some((host.to_string(), display, screen))
}

//  Tests
