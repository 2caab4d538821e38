//! Core trait that decouples btops from the concrete control socket.
//!
//! The reconciliation engine, the naming strategies and the snapshot query
//! only depend on [`Transport`].  The bspwm Unix-socket backend lives in
//! [`bspwm`](crate::bspwm); tests use an in-memory recorder.

use crate::command::Command;

/// Abstraction over the window manager's control channel.
///
/// An implementation might talk to bspwm over its Unix socket, or it might
/// be a recorder used in tests.  Implementations never retry: a failed
/// command is reported to the caller and the next event re-evaluates.
pub trait Transport {
    /// The error type produced by this transport.
    type Error: std::error::Error + Send + 'static;

    /// Send `command` and return the raw response bytes.
    ///
    /// The response is opaque: a text line, a JSON document, or empty.
    fn send(&self, command: &Command) -> Result<Vec<u8>, Self::Error>;
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Records every command and answers `QueryState` with a canned state.
    #[derive(Debug, Default)]
    pub struct RecorderTransport {
        pub sent: RefCell<Vec<Command>>,
        pub state: RefCell<String>,
        /// Number of upcoming mutating commands that should fail.
        pub fail_next: Cell<usize>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("recorder error")]
    pub struct RecorderErr;

    impl RecorderTransport {
        pub fn with_state(json: &str) -> Self {
            let t = Self::default();
            *t.state.borrow_mut() = json.to_string();
            t
        }

        pub fn failing(n: usize) -> Self {
            let t = Self::default();
            t.fail_next.set(n);
            t
        }

        /// Mutating commands that reached the window manager.
        pub fn mutations(&self) -> Vec<Command> {
            self.sent
                .borrow()
                .iter()
                .filter(|c| c.is_mutating())
                .cloned()
                .collect()
        }
    }

    impl Transport for RecorderTransport {
        type Error = RecorderErr;

        fn send(&self, command: &Command) -> Result<Vec<u8>, RecorderErr> {
            if command.is_mutating() && self.fail_next.get() > 0 {
                self.fail_next.set(self.fail_next.get() - 1);
                return Err(RecorderErr);
            }
            self.sent.borrow_mut().push(command.clone());
            match command {
                Command::QueryState => Ok(self.state.borrow().clone().into_bytes()),
                _ => Ok(Vec::new()),
            }
        }
    }

    #[test]
    fn recorder_fails_then_recovers() {
        let t = RecorderTransport::failing(1);
        let cmd = Command::RemoveDesktop { id: 3 };
        assert!(t.send(&cmd).is_err());
        assert!(t.send(&cmd).is_ok());
        assert_eq!(t.mutations(), vec![cmd]);
    }
}
