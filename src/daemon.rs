//! The listen loop that ties events, snapshots and the engine together.
//!
//! For every event line: query a fresh [`Snapshot`], run one
//! [`Reconciler`] pass, then wait for the next event.  The reload signal is
//! checked before each wait, never in the middle of a pass.

use crate::command::Command;
use crate::engine::Reconciler;
use crate::reload::ReloadSignal;
use crate::snapshot::Snapshot;
use crate::traits::Transport;
use log::{debug, error, info};
use std::fmt;

/// Why [`listen`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenOutcome {
    /// The configuration changed.
    Reload,
    /// The event stream closed.
    StreamEnded,
    /// Reading the event stream failed.
    StreamError(String),
}

/// Run reconciliation passes until the stream ends or a reload is requested.
pub fn listen<T, I, E>(
    engine: &Reconciler,
    transport: &T,
    events: I,
    reload: &ReloadSignal,
) -> ListenOutcome
where
    T: Transport,
    I: IntoIterator<Item = Result<String, E>>,
    E: fmt::Display,
{
    let mut events = events.into_iter();
    loop {
        if reload.triggered() {
            info!("configuration changed, reloading");
            return ListenOutcome::Reload;
        }
        match events.next() {
            None => {
                info!("event stream closed");
                return ListenOutcome::StreamEnded;
            }
            Some(Err(e)) => {
                error!("event stream error: {}", e);
                return ListenOutcome::StreamError(e.to_string());
            }
            Some(Ok(line)) => {
                debug!("event: {}", line);
                run_pass(engine, transport);
            }
        }
    }
}

/// One reconciliation pass against a freshly queried snapshot.
///
/// A snapshot that cannot be obtained abandons the pass.
pub fn run_pass<T: Transport>(engine: &Reconciler, transport: &T) -> Option<Command> {
    match Snapshot::query(transport) {
        Ok(mut snapshot) => engine.reconcile(&mut snapshot, transport),
        Err(e) => {
            error!("unable to obtain monitors: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::traits::mock::RecorderTransport;

    const OCCUPIED: &str = r#"{"monitors":[{"name":"DP-1","id":1,"focusedDesktopId":2,
        "desktops":[{"name":"1","id":2,"root":{"id":3,"client":{"className":"kitty"},
        "firstChild":null,"secondChild":null}}]}]}"#;

    fn events(n: usize) -> Vec<Result<String, String>> {
        (0..n).map(|i| Ok(format!("WMDP-1:O{}", i))).collect()
    }

    #[test]
    fn one_pass_per_event() {
        let engine = Reconciler::new(&Config::default());
        let t = RecorderTransport::with_state(OCCUPIED);
        let outcome = listen(&engine, &t, events(3), &ReloadSignal::never());
        assert_eq!(outcome, ListenOutcome::StreamEnded);
        let queries = t.sent.borrow().iter().filter(|c| **c == Command::QueryState).count();
        assert_eq!(queries, 3);
        // The canned state never changes, so every pass appends once.
        assert_eq!(t.mutations().len(), 3);
    }

    #[test]
    fn pending_reload_stops_before_next_event() {
        let engine = Reconciler::new(&Config::default());
        let t = RecorderTransport::with_state(OCCUPIED);
        let (tx, reload) = ReloadSignal::channel();
        tx.send(()).unwrap();
        assert_eq!(listen(&engine, &t, events(5), &reload), ListenOutcome::Reload);
        assert!(t.sent.borrow().is_empty());
    }

    #[test]
    fn malformed_snapshot_abandons_pass() {
        let engine = Reconciler::new(&Config::default());
        let t = RecorderTransport::with_state("garbage");
        assert_eq!(run_pass(&engine, &t), None);
        assert!(t.mutations().is_empty());
    }

    #[test]
    fn stream_error_ends_listen() {
        let engine = Reconciler::new(&Config::default());
        let t = RecorderTransport::with_state(OCCUPIED);
        let stream: Vec<Result<String, String>> = vec![Ok("W".into()), Err("reset".into())];
        assert_eq!(
            listen(&engine, &t, stream, &ReloadSignal::never()),
            ListenOutcome::StreamError("reset".into())
        );
        assert_eq!(t.mutations().len(), 1);
    }
}
