// ── Device registry ──
//
// Insertion-ordered storage for the endpoints one session knows about.
// Each merge publishes a fresh device snapshot and regenerates the three
// selection lists through `watch` channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tokio::sync::watch;

use crate::model::{DeviceRecord, MacAddress, SelectionLists};

type DeviceMap = IndexMap<MacAddress, Arc<DeviceRecord>>;

/// Result of one merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub updated: usize,
}

impl MergeSummary {
    pub fn total(&self) -> usize {
        self.added + self.updated
    }
}

/// The device registry owned by one session.
///
/// At most one record per MAC. New MACs are appended; a MAC seen again
/// replaces its record in place. Devices missing from a later poll are
/// retained.
pub struct DeviceRegistry {
    devices: watch::Sender<Arc<DeviceMap>>,
    lists: watch::Sender<Arc<SelectionLists>>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        let (devices, _) = watch::channel(Arc::new(DeviceMap::new()));
        let (lists, _) = watch::channel(Arc::new(SelectionLists::default()));
        let (last_refresh, _) = watch::channel(None);

        Self {
            devices,
            lists,
            last_refresh,
        }
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Merge one poll response and regenerate the lists once.
    pub fn merge(&self, records: impl IntoIterator<Item = DeviceRecord>) -> MergeSummary {
        let mut summary = MergeSummary::default();

        self.devices.send_modify(|map| {
            let map = Arc::make_mut(map);
            for record in records {
                // `insert` on an existing key keeps its position.
                if map.insert(record.mac.clone(), Arc::new(record)).is_some() {
                    summary.updated += 1;
                } else {
                    summary.added += 1;
                }
            }
        });

        self.rebuild_lists();
        self.last_refresh.send_modify(|ts| *ts = Some(Utc::now()));

        summary
    }

    /// Forget every device. Used when the session is reconfigured.
    pub fn clear(&self) {
        self.devices.send_modify(|map| *map = Arc::new(DeviceMap::new()));
        self.rebuild_lists();
        self.last_refresh.send_modify(|ts| *ts = None);
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Records in registry order (cheap `Arc` clones).
    pub fn devices_snapshot(&self) -> Vec<Arc<DeviceRecord>> {
        self.devices.borrow().values().cloned().collect()
    }

    pub fn selection_lists(&self) -> Arc<SelectionLists> {
        Arc::clone(&self.lists.borrow())
    }

    pub fn subscribe_selection_lists(&self) -> watch::Receiver<Arc<SelectionLists>> {
        self.lists.subscribe()
    }

    pub fn device_by_mac(&self, mac: &MacAddress) -> Option<Arc<DeviceRecord>> {
        self.devices.borrow().get(mac).cloned()
    }

    /// Resolve operator input to a registered MAC.
    ///
    /// Tries the MAC itself first, then an exact custom-name match, then a
    /// case-insensitive one. Returns `None` when nothing matches.
    pub fn resolve(&self, identifier: &str) -> Option<MacAddress> {
        let mac = MacAddress::new(identifier);
        let devices = self.devices.borrow();
        if devices.contains_key(&mac) {
            return Some(mac);
        }

        let wanted = identifier.trim();
        let by_name = |exact: bool| {
            devices.values().find(|r| {
                r.custom_name().is_some_and(|name| {
                    if exact {
                        name == wanted
                    } else {
                        name.eq_ignore_ascii_case(wanted)
                    }
                })
            })
        };

        by_name(true)
            .or_else(|| by_name(false))
            .map(|r| r.mac.clone())
    }

    pub fn len(&self) -> usize {
        self.devices.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.borrow().is_empty()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn rebuild_lists(&self) {
        let lists = {
            let devices = self.devices.borrow();
            SelectionLists::build(devices.values().map(|r| &**r))
        };
        // `send_modify` updates unconditionally, even with zero receivers.
        self.lists.send_modify(|current| *current = Arc::new(lists));
    }
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(raw: serde_json::Value) -> DeviceRecord {
        DeviceRecord::try_from(raw).unwrap()
    }

    fn macs(registry: &DeviceRegistry) -> Vec<String> {
        registry
            .devices_snapshot()
            .iter()
            .map(|r| r.mac.to_string())
            .collect()
    }

    #[test]
    fn merge_appends_new_and_replaces_existing_in_place() {
        let registry = DeviceRegistry::new();
        let first = registry.merge([
            record(json!({ "mac": "A", "modelName": "X-TX" })),
            record(json!({ "mac": "B", "modelName": "X-RX" })),
        ]);
        assert_eq!(first, MergeSummary { added: 2, updated: 0 });

        let second = registry.merge([
            record(json!({ "mac": "C", "modelName": "X-RX" })),
            record(json!({ "mac": "A", "modelName": "X-TX", "customName": "Desk" })),
        ]);
        assert_eq!(second, MergeSummary { added: 1, updated: 1 });

        assert_eq!(macs(&registry), ["A", "B", "C"]);
        let a = registry.device_by_mac(&MacAddress::new("A")).unwrap();
        assert_eq!(a.custom_name(), Some("Desk"));
    }

    #[test]
    fn replacement_drops_fields_missing_from_the_new_record() {
        let registry = DeviceRegistry::new();
        registry.merge([record(json!({ "mac": "A", "modelName": "X-TX", "ip": "10.0.0.1" }))]);
        registry.merge([record(json!({ "mac": "A", "modelName": "X-TX" }))]);
        let a = registry.device_by_mac(&MacAddress::new("A")).unwrap();
        assert_eq!(a.ip(), None);
    }

    #[test]
    fn devices_missing_from_a_poll_are_retained() {
        let registry = DeviceRegistry::new();
        registry.merge([
            record(json!({ "mac": "A", "modelName": "X-TX" })),
            record(json!({ "mac": "B", "modelName": "X-RX" })),
        ]);
        registry.merge([record(json!({ "mac": "B", "modelName": "X-RX" }))]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lists_follow_every_merge() {
        let registry = DeviceRegistry::new();
        let mut rx = registry.subscribe_selection_lists();
        assert_eq!(registry.selection_lists().all.choices().len(), 1);

        registry.merge([
            record(json!({ "mac": "A", "modelName": "X-TX" })),
            record(json!({ "mac": "B", "modelName": "X-RX" })),
            record(json!({ "mac": "C", "modelName": "Y-TX" })),
        ]);

        assert!(rx.has_changed().unwrap());
        let lists = rx.borrow_and_update().clone();
        assert_eq!(lists.all.choices().len(), 4);
        assert_eq!(lists.transmitters.choices().len(), 3);
        assert_eq!(lists.receivers.choices().len(), 2);
        assert!(registry.last_refresh().is_some());
    }

    #[test]
    fn clear_resets_everything() {
        let registry = DeviceRegistry::new();
        registry.merge([record(json!({ "mac": "A", "modelName": "X-TX" }))]);
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.last_refresh().is_none());
        assert_eq!(registry.selection_lists().all.choices()[0].label, "(no devices found)");
    }

    #[test]
    fn resolve_by_mac_or_custom_name() {
        let registry = DeviceRegistry::new();
        registry.merge([record(json!({
            "mac": "00-11-22-33-44-55", "modelName": "X-TX", "customName": "Desk",
        }))]);

        let expected = Some(MacAddress::new("00-11-22-33-44-55"));
        assert_eq!(registry.resolve("00:11:22:33:44:55"), expected);
        assert_eq!(registry.resolve("Desk"), expected);
        assert_eq!(registry.resolve("desk"), expected);
        assert_eq!(registry.resolve("Lobby"), None);
    }
}
