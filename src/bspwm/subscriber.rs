//! bspwm report subscription.
//!
//! After sending `subscribe report`, bspwm keeps the connection open and
//! writes one status line per event:
//!
//! ```text
//! WMDP-1:O1:f2:LT:TT:G
//! WMDP-1:O1:o2:F3:LT:TT:G
//! ```
//!
//! btops does not interpret the report; each line is only a wake-up that
//! triggers a fresh `wm -d` query.

use crate::bspwm::ipc::{check_response, BspwmError, BspwmIpc};
use crate::command::Command;
use std::io::{BufRead, BufReader, Lines};
use std::os::unix::net::UnixStream;

/// An open report subscription.  Iterating yields one line per event and
/// ends when bspwm closes the connection.
pub struct Subscriber {
    lines: Lines<BufReader<UnixStream>>,
}

impl Subscriber {
    /// Connect to the socket used by `ipc` and subscribe to reports.
    pub fn connect(ipc: &BspwmIpc) -> Result<Self, BspwmError> {
        let stream = ipc.connect_and_send(&Command::Subscribe)?;
        Ok(Self {
            lines: BufReader::new(stream).lines(),
        })
    }
}

impl Iterator for Subscriber {
    type Item = Result<String, BspwmError>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = match self.lines.next()? {
            Ok(line) => line,
            Err(e) => return Some(Err(e.into())),
        };
        Some(check_response(line.into_bytes()).map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }
}
