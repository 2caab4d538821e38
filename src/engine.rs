//! The reconciliation engine.
//!
//! [`Reconciler`] owns the fixed handler chain (append, remove, rename) and
//! reacts to a [`Snapshot`] by issuing **at most one** mutating command.
//! Handlers run in order; the first one that actually changes something ends
//! the pass.  The next window-manager event triggers a fresh pass, so there
//! is no batching and no retry.

use crate::command::Command;
use crate::config::Config;
use crate::naming::Renamer;
use crate::snapshot::{Desktop, Snapshot};
use crate::traits::Transport;
use log::{debug, error, info};

/// Appends a desktop when a monitor is below `min` or fully occupied.
#[derive(Debug, Clone)]
pub struct AppendHandler {
    min: usize,
    max: usize,
    append_when_occupied: bool,
}

/// Removes surplus empty desktops.
#[derive(Debug, Clone)]
pub struct RemoveHandler {
    min: usize,
    remove_empty: bool,
    remove_focused: bool,
}

/// Renames desktops with the configured strategies.
#[derive(Debug, Clone)]
pub struct RenameHandler {
    renamers: Vec<Renamer>,
}

/// One link of the chain.
#[derive(Debug, Clone)]
pub enum Handler {
    Append(AppendHandler),
    Remove(RemoveHandler),
    Rename(RenameHandler),
}

impl AppendHandler {
    pub fn new(config: &Config) -> Self {
        Self {
            min: config.min,
            max: config.max,
            append_when_occupied: config.append_when_occupied,
        }
    }

    pub fn should_handle(&self) -> bool {
        self.append_when_occupied || self.min > 1
    }

    /// Whether `monitor` needs another desktop.
    fn wants_append(&self, desktops: &[Desktop]) -> bool {
        let count = desktops.len();
        if count >= self.max {
            return false;
        }
        if count < self.min {
            return true;
        }
        if !self.append_when_occupied {
            return false;
        }
        // Any empty desktop can take the next window.
        !desktops.is_empty() && !desktops.iter().any(|d| d.is_empty())
    }

    pub fn handle<T: Transport>(&self, snapshot: &mut Snapshot, transport: &T) -> Option<Command> {
        for monitor in &mut snapshot.monitors {
            if !self.wants_append(&monitor.desktops) {
                continue;
            }
            match monitor.append_desktop(transport, "") {
                Ok(()) => {
                    return Some(Command::AppendDesktop {
                        monitor: monitor.name.clone(),
                        name: String::new(),
                    });
                }
                Err(e) => {
                    error!("unable to append desktop to monitor {}: {}", monitor.name, e);
                }
            }
        }
        None
    }
}

impl RemoveHandler {
    pub fn new(config: &Config) -> Self {
        Self {
            min: config.min,
            remove_empty: config.remove_empty,
            remove_focused: config.remove_focused,
        }
    }

    pub fn should_handle(&self) -> bool {
        self.remove_empty
    }

    pub fn handle<T: Transport>(&self, snapshot: &mut Snapshot, transport: &T) -> Option<Command> {
        for monitor in &mut snapshot.monitors {
            let empty: Vec<(u32, String)> = monitor
                .empty_desktops()
                .into_iter()
                .map(|d| (d.id, d.name.clone()))
                .collect();

            // A lone empty desktop is the landing pad for new windows.
            if empty.len() == 1 {
                debug!("monitor {} keeps its only empty desktop", monitor.name);
                continue;
            }

            for (id, name) in empty {
                if self.min >= monitor.desktops.len() {
                    continue;
                }
                if !self.remove_focused && monitor.focused_desktop_id == id {
                    continue;
                }
                match monitor.remove_desktop(transport, id) {
                    Ok(()) => return Some(Command::RemoveDesktop { id }),
                    Err(e) => error!("unable to remove desktop {}: {}", name, e),
                }
            }
        }
        None
    }
}

impl RenameHandler {
    pub fn new(config: &Config) -> Self {
        Self {
            renamers: Renamer::from_config(config),
        }
    }

    pub fn should_handle(&self) -> bool {
        !self.renamers.is_empty()
    }

    pub fn renamers(&self) -> &[Renamer] {
        &self.renamers
    }

    pub fn handle<T: Transport>(&self, snapshot: &mut Snapshot, transport: &T) -> Option<Command> {
        for monitor in &mut snapshot.monitors {
            for (index, desktop) in monitor.desktops.iter_mut().enumerate() {
                // The first strategy that applies settles the desktop.
                let Some(renamer) = self.renamers.iter().find(|r| r.can_rename(desktop, index)) else {
                    continue;
                };
                match renamer.rename(transport, desktop, index) {
                    Ok(true) => {
                        return Some(Command::RenameDesktop {
                            id: desktop.id,
                            name: desktop.name.clone(),
                        });
                    }
                    Ok(false) => {}
                    Err(e) => error!("{} renamer: {}", renamer.id(), e),
                }
            }
        }
        None
    }
}

impl Handler {
    pub fn name(&self) -> &'static str {
        match self {
            Handler::Append(_) => "append",
            Handler::Remove(_) => "remove",
            Handler::Rename(_) => "rename",
        }
    }

    pub fn should_handle(&self) -> bool {
        match self {
            Handler::Append(h) => h.should_handle(),
            Handler::Remove(h) => h.should_handle(),
            Handler::Rename(h) => h.should_handle(),
        }
    }

    /// Run the handler; `Some` carries the command it issued.
    pub fn handle<T: Transport>(&self, snapshot: &mut Snapshot, transport: &T) -> Option<Command> {
        match self {
            Handler::Append(h) => h.handle(snapshot, transport),
            Handler::Remove(h) => h.handle(snapshot, transport),
            Handler::Rename(h) => h.handle(snapshot, transport),
        }
    }
}

/// The ordered handler chain, built once per configuration.
///
/// # Typical usage
///
/// ```ignore
/// let engine = Reconciler::new(&config);
/// let mut snapshot = Snapshot::query(&ipc)?;
/// engine.reconcile(&mut snapshot, &ipc);
/// ```
#[derive(Debug, Clone)]
pub struct Reconciler {
    handlers: Vec<Handler>,
}

impl Reconciler {
    pub fn new(config: &Config) -> Self {
        Self {
            handlers: vec![
                Handler::Append(AppendHandler::new(config)),
                Handler::Remove(RemoveHandler::new(config)),
                Handler::Rename(RenameHandler::new(config)),
            ],
        }
    }

    pub fn handlers(&self) -> &[Handler] {
        &self.handlers
    }

    /// Run one pass over `snapshot`.
    ///
    /// Returns the single mutating command that was issued, or `None` if
    /// every eligible handler declined.
    pub fn reconcile<T: Transport>(&self, snapshot: &mut Snapshot, transport: &T) -> Option<Command> {
        for handler in &self.handlers {
            if !handler.should_handle() {
                continue;
            }
            if let Some(cmd) = handler.handle(snapshot, transport) {
                info!("{} handler: {}", handler.name(), cmd);
                return Some(cmd);
            }
            debug!("{} handler: nothing to do", handler.name());
        }
        None
    }
}

//  Tests
