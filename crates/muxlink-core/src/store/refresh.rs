// ── Poll response application ──
//
// Turns the raw `p_data` array of a `get_devices` reply into records and
// merges them. Entries that cannot be read as a device are skipped.

use tracing::{debug, warn};

use super::{DeviceRegistry, MergeSummary};
use crate::model::DeviceRecord;

impl DeviceRegistry {
    /// Apply one successful `get_devices` reply.
    ///
    /// Every entry is decoded before anything is merged, so the registry
    /// sees one merge per poll response.
    pub fn apply_poll(&self, entries: Vec<serde_json::Value>) -> MergeSummary {
        let total = entries.len();
        let records: Vec<DeviceRecord> = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match DeviceRecord::try_from(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(index, error = %e, "skipping device entry without a usable mac");
                    None
                }
            })
            .collect();

        let summary = self.merge(records);
        debug!(
            received = total,
            added = summary.added,
            updated = summary.updated,
            "device poll applied"
        );
        summary
    }
}
