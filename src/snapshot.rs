//! The window-manager state model.
//!
//! A [`Snapshot`] is the decoded answer to `wm -d`: monitors, their desktops
//! in positional order, and each desktop's binary window tree.  Snapshots are
//! rebuilt for every reconciliation pass and thrown away afterwards; the only
//! local mutation is mirroring a command btops itself just issued, so the
//! rest of the pass sees a consistent picture.
//!
//! bspwm emits camelCase keys (`focusedDesktopId`, `firstChild`, …).  The
//! PascalCase spellings (`FocusedDesktopId`, `FirstChild`, …) are accepted as
//! aliases.  Unknown keys are ignored.

use crate::command::Command;
use crate::traits::Transport;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Errors from obtaining a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The state query itself failed.
    #[error("state query failed: {0}")]
    Transport(String),
    /// The payload did not decode into monitors/desktops/nodes.
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Full window-manager state for one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(alias = "Monitors")]
    pub monitors: Vec<Monitor>,
}

/// A display region and its ordered desktops.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Id")]
    pub id: u32,
    #[serde(alias = "FocusedDesktopId")]
    pub focused_desktop_id: u32,
    #[serde(alias = "Desktops")]
    pub desktops: Vec<Desktop>,
}

/// A virtual desktop.  Commands always address it by `id`, never by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Desktop {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Id")]
    pub id: u32,
    #[serde(alias = "Root")]
    pub root: Option<Node>,
}

/// A node of a desktop's layout tree.  Only leaves carry a client.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(alias = "Id")]
    pub id: u32,
    #[serde(alias = "Client")]
    pub client: Option<Client>,
    #[serde(alias = "FirstChild")]
    pub first_child: Option<Box<Node>>,
    #[serde(alias = "SecondChild")]
    pub second_child: Option<Box<Node>>,
}

/// The application window held by a leaf node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(alias = "ClassName")]
    pub class_name: String,
}

/// Multiset of client class names found on one desktop.
///
/// Iteration and [`names`](ClientAggregate::names) are in lexicographic
/// order, which keeps renaming deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientAggregate {
    counts: BTreeMap<String, usize>,
}

impl ClientAggregate {
    /// Sorted, deduplicated client class names.
    pub fn names(&self) -> Vec<&str> {
        self.counts.keys().map(String::as_str).collect()
    }

    /// How many windows of `class_name` the desktop holds.
    pub fn count(&self, class_name: &str) -> usize {
        self.counts.get(class_name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct class names.
    pub fn len(&self) -> usize {
        self.counts.len()
    }
}

impl<'a> FromIterator<&'a Client> for ClientAggregate {
    fn from_iter<I: IntoIterator<Item = &'a Client>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        for client in iter {
            *counts.entry(client.class_name.clone()).or_insert(0) += 1;
        }
        Self { counts }
    }
}

impl Snapshot {
    /// Decode a `wm -d` payload.
    pub fn parse(payload: &[u8]) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// Ask the window manager for its state and decode it.
    pub fn query<T: Transport>(transport: &T) -> Result<Self, SnapshotError> {
        let payload = transport
            .send(&Command::QueryState)
            .map_err(|e| SnapshotError::Transport(e.to_string()))?;
        Self::parse(&payload)
    }
}

impl Desktop {
    /// A desktop is empty iff it has no window tree.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// All nodes in depth-first pre-order: root, first subtree, second subtree.
    pub fn nodes(&self) -> Vec<&Node> {
        let mut out = Vec::new();
        let mut stack: Vec<&Node> = self.root.iter().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            if let Some(second) = node.second_child.as_deref() {
                stack.push(second);
            }
            if let Some(first) = node.first_child.as_deref() {
                stack.push(first);
            }
        }
        out
    }

    /// The clients on this desktop, aggregated by class name.
    pub fn clients(&self) -> ClientAggregate {
        self.nodes().into_iter().filter_map(|n| n.client.as_ref()).collect()
    }

    /// Rename this desktop and mirror the new name locally.
    pub fn rename<T: Transport>(&mut self, transport: &T, name: &str) -> Result<(), T::Error> {
        transport.send(&Command::RenameDesktop {
            id: self.id,
            name: name.to_string(),
        })?;
        self.name = name.to_string();
        Ok(())
    }
}

impl Monitor {
    /// Empty desktops in positional order.
    pub fn empty_desktops(&self) -> Vec<&Desktop> {
        self.desktops.iter().filter(|d| d.is_empty()).collect()
    }

    /// Append a desktop named `name`.
    ///
    /// The local copy gets id `0` because bspwm only assigns the real id on
    /// creation; the next snapshot carries it.
    pub fn append_desktop<T: Transport>(&mut self, transport: &T, name: &str) -> Result<(), T::Error> {
        transport.send(&Command::AppendDesktop {
            monitor: self.name.clone(),
            name: name.to_string(),
        })?;
        self.desktops.push(Desktop {
            name: name.to_string(),
            id: 0,
            root: None,
        });
        Ok(())
    }

    /// Remove the desktop with `id` and drop it from the local copy.
    pub fn remove_desktop<T: Transport>(&mut self, transport: &T, id: u32) -> Result<(), T::Error> {
        transport.send(&Command::RemoveDesktop { id })?;
        if let Some(pos) = self.desktops.iter().position(|d| d.id == id) {
            self.desktops.remove(pos);
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::traits::mock::RecorderTransport;

    const BSPWM_STATE: &str = r#"{
        "focusedMonitorId": 2097153,
        "monitors": [{
            "name": "DP-1",
            "id": 2097153,
            "focusedDesktopId": 2097154,
            "desktops": [
                {
                    "name": "1",
                    "id": 2097154,
                    "layout": "tiled",
                    "root": {
                        "id": 10,
                        "splitType": "vertical",
                        "client": null,
                        "firstChild": {
                            "id": 11,
                            "client": { "className": "kitty", "instanceName": "kitty" },
                            "firstChild": null,
                            "secondChild": null
                        },
                        "secondChild": {
                            "id": 12,
                            "client": null,
                            "firstChild": {
                                "id": 13,
                                "client": { "className": "firefox" },
                                "firstChild": null,
                                "secondChild": null
                            },
                            "secondChild": {
                                "id": 14,
                                "client": { "className": "kitty" },
                                "firstChild": null,
                                "secondChild": null
                            }
                        }
                    }
                },
                { "name": "2", "id": 2097155, "root": null }
            ]
        }]
    }"#;

    #[test]
    fn parses_bspwm_dump() {
        let snap = Snapshot::parse(BSPWM_STATE.as_bytes()).unwrap();
        assert_eq!(snap.monitors.len(), 1);
        let mon = &snap.monitors[0];
        assert_eq!(mon.name, "DP-1");
        assert_eq!(mon.focused_desktop_id, 2097154);
        assert_eq!(mon.desktops.len(), 2);
        assert!(!mon.desktops[0].is_empty());
        assert!(mon.desktops[1].is_empty());
    }

    #[test]
    fn parses_pascal_case_keys() {
        let json = r#"{"Monitors":[{"Name":"HDMI-A-1","Id":1,"FocusedDesktopId":5,
            "Desktops":[{"Name":"web","Id":5,"Root":{"Id":9,"Client":{"ClassName":"Firefox"},
            "FirstChild":null,"SecondChild":null}}]}]}"#;
        let snap = Snapshot::parse(json.as_bytes()).unwrap();
        let desk = &snap.monitors[0].desktops[0];
        assert_eq!(desk.name, "web");
        assert_eq!(desk.clients().names(), vec!["Firefox"]);
    }

    #[test]
    fn missing_root_means_empty() {
        let json = r#"{"monitors":[{"name":"a","id":1,"focusedDesktopId":2,
            "desktops":[{"name":"x","id":2}]}]}"#;
        let snap = Snapshot::parse(json.as_bytes()).unwrap();
        assert!(snap.monitors[0].desktops[0].is_empty());
        assert!(snap.monitors[0].desktops[0].clients().is_empty());
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        assert!(matches!(Snapshot::parse(b"not json"), Err(SnapshotError::Malformed(_))));
        assert!(matches!(Snapshot::parse(b""), Err(SnapshotError::Malformed(_))));
        assert!(matches!(
            Snapshot::parse(br#"{"monitors":[{"name":"a"}]}"#),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn nodes_are_pre_order() {
        let snap = Snapshot::parse(BSPWM_STATE.as_bytes()).unwrap();
        let ids: Vec<u32> = snap.monitors[0].desktops[0].nodes().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![10, 11, 12, 13, 14]);
    }

    #[test]
    fn clients_are_sorted_and_counted() {
        let snap = Snapshot::parse(BSPWM_STATE.as_bytes()).unwrap();
        let clients = snap.monitors[0].desktops[0].clients();
        assert_eq!(clients.names(), vec!["firefox", "kitty"]);
        assert_eq!(clients.count("kitty"), 2);
        assert_eq!(clients.count("firefox"), 1);
        assert_eq!(clients.count("mpv"), 0);
        assert_eq!(clients.len(), 2);
    }

    #[test]
    fn one_sided_split_does_not_loop() {
        let root = Node {
            id: 1,
            client: None,
            first_child: Some(Box::new(leaf(2, "b"))),
            second_child: None,
        };
        let d = desktop(1, "x", Some(root));
        assert_eq!(d.nodes().len(), 2);
        assert_eq!(d.clients().names(), vec!["b"]);
    }

    #[test]
    fn query_sends_wm_dump() {
        let t = RecorderTransport::with_state(BSPWM_STATE);
        let snap = Snapshot::query(&t).unwrap();
        assert_eq!(snap.monitors[0].desktops.len(), 2);
        assert_eq!(*t.sent.borrow(), vec![Command::QueryState]);
    }

    #[test]
    fn rename_mirrors_locally() {
        let t = RecorderTransport::default();
        let mut d = occupied(3, "old", "kitty");
        d.rename(&t, "new").unwrap();
        assert_eq!(d.name, "new");
        assert_eq!(
            t.mutations(),
            vec![Command::RenameDesktop { id: 3, name: "new".into() }]
        );
    }

    #[test]
    fn failed_rename_keeps_old_name() {
        let t = RecorderTransport::failing(1);
        let mut d = occupied(3, "old", "kitty");
        assert!(d.rename(&t, "new").is_err());
        assert_eq!(d.name, "old");
    }

    #[test]
    fn append_and_remove_update_monitor() {
        let t = RecorderTransport::default();
        let mut m = monitor("DP-1", 1, vec![occupied(1, "1", "a"), empty(2, "2")]);
        m.append_desktop(&t, "").unwrap();
        assert_eq!(m.desktops.len(), 3);
        assert!(m.desktops[2].is_empty());
        m.remove_desktop(&t, 2).unwrap();
        assert_eq!(m.desktops.len(), 2);
        assert_eq!(m.empty_desktops().len(), 1);
        assert_eq!(
            t.mutations(),
            vec![
                Command::AppendDesktop { monitor: "DP-1".into(), name: String::new() },
                Command::RemoveDesktop { id: 2 },
            ]
        );
    }
}
