//! Desktop naming strategies.
//!
//! Each [`Renamer`] answers two questions for a desktop at a given position
//! on its monitor: *may I name it?* ([`Renamer::can_rename`]) and *what
//! should it be called?*  [`Renamer::rename`] only talks to the window
//! manager when the proposed name differs from the current one, so running
//! the same strategy twice is a no-op the second time.
//!
//! | id           | applies when                          | name                          |
//! |--------------|---------------------------------------|-------------------------------|
//! | `constant`   | always                                | `names.constant`              |
//! | `static`     | position < `names.static` length      | `names.static[position]`      |
//! | `client`     | the desktop has windows               | sorted client classes, spaced |
//! | `numeric`    | always                                | `position + 1`                |
//! | `classified` | some client belongs to a group        | highest-priority group name   |

use crate::config::{ClassGroup, Config};
use crate::snapshot::{ClientAggregate, Desktop};
use crate::traits::Transport;
use log::warn;
use std::collections::HashMap;

/// A transport failure while renaming.
#[derive(Debug, thiserror::Error)]
#[error("failed to rename desktop {desktop:?} to {name:?}: {reason}")]
pub struct RenameError {
    pub desktop: String,
    pub name: String,
    pub reason: String,
}

/// Target name and rank of a classified client.  Lower rank wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub name: String,
    pub priority: usize,
}

/// Client class → [`Classification`], built once from the configured groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriorityMap {
    map: HashMap<String, Classification>,
}

impl PriorityMap {
    /// Each group is ranked by its position.  A client listed in several
    /// groups keeps the last one.
    pub fn new(groups: &[ClassGroup]) -> Self {
        let mut map = HashMap::new();
        for (priority, group) in groups.iter().enumerate() {
            for client in &group.clients {
                map.insert(
                    client.clone(),
                    Classification {
                        name: group.name.clone(),
                        priority,
                    },
                );
            }
        }
        Self { map }
    }

    pub fn get(&self, client: &str) -> Option<&Classification> {
        self.map.get(client)
    }

    /// The best classification among `clients`; on equal rank the first
    /// client in sorted order wins.
    pub fn classify(&self, clients: &ClientAggregate) -> Option<&Classification> {
        let mut best: Option<&Classification> = None;
        for name in clients.names() {
            let Some(class) = self.map.get(name) else {
                continue;
            };
            if best.map_or(true, |b| class.priority < b.priority) {
                best = Some(class);
            }
        }
        best
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// A naming strategy.
#[derive(Debug, Clone, PartialEq)]
pub enum Renamer {
    Constant(String),
    Static(Vec<String>),
    Client,
    Numeric,
    Classified(PriorityMap),
}

impl Renamer {
    /// Build the strategy named `id`, or `None` if the id is unknown.
    pub fn from_id(id: &str, config: &Config) -> Option<Self> {
        match id {
            "constant" => Some(Renamer::Constant(config.names.constant.clone())),
            "static" => Some(Renamer::Static(config.names.static_names.clone())),
            "client" => Some(Renamer::Client),
            "numeric" => Some(Renamer::Numeric),
            "classified" => Some(Renamer::Classified(PriorityMap::new(&config.names.classified))),
            _ => None,
        }
    }

    /// Build every configured strategy in order, skipping unknown ids.
    pub fn from_config(config: &Config) -> Vec<Self> {
        config
            .renamers
            .iter()
            .filter_map(|id| {
                let renamer = Self::from_id(id, config);
                if renamer.is_none() {
                    warn!("ignoring unknown renamer {:?}", id);
                }
                renamer
            })
            .collect()
    }

    /// The configuration identifier of this strategy.
    pub fn id(&self) -> &'static str {
        match self {
            Renamer::Constant(_) => "constant",
            Renamer::Static(_) => "static",
            Renamer::Client => "client",
            Renamer::Numeric => "numeric",
            Renamer::Classified(_) => "classified",
        }
    }

    pub fn can_rename(&self, desktop: &Desktop, index: usize) -> bool {
        match self {
            Renamer::Constant(_) | Renamer::Numeric => true,
            Renamer::Static(names) => index < names.len(),
            Renamer::Client => !desktop.clients().is_empty(),
            Renamer::Classified(priorities) => desktop
                .clients()
                .names()
                .into_iter()
                .any(|name| priorities.get(name).is_some()),
        }
    }

    /// The name this strategy wants for `desktop`, if it applies.
    pub fn proposed_name(&self, desktop: &Desktop, index: usize) -> Option<String> {
        match self {
            Renamer::Constant(name) => Some(name.clone()),
            Renamer::Static(names) => names.get(index).cloned(),
            Renamer::Client => {
                let clients = desktop.clients();
                (!clients.is_empty()).then(|| clients.names().join(" "))
            }
            Renamer::Numeric => Some((index + 1).to_string()),
            Renamer::Classified(priorities) => priorities
                .classify(&desktop.clients())
                .map(|c| c.name.clone()),
        }
    }

    /// Rename `desktop` if its name differs from the proposed one.
    ///
    /// Returns `Ok(true)` when a rename command was issued, `Ok(false)` when
    /// the desktop already carries the proposed name.
    pub fn rename<T: Transport>(
        &self,
        transport: &T,
        desktop: &mut Desktop,
        index: usize,
    ) -> Result<bool, RenameError> {
        let Some(name) = self.proposed_name(desktop, index) else {
            return Ok(false);
        };
        if desktop.name == name {
            return Ok(false);
        }
        desktop.rename(transport, &name).map_err(|e| RenameError {
            desktop: desktop.name.clone(),
            name: name.clone(),
            reason: e.to_string(),
        })?;
        Ok(true)
    }
}
