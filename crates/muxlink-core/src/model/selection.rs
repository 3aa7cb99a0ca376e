// ── Selection lists ──
//
// Derived choice lists for an operator picking an endpoint. Every list
// opens with a sentinel entry (id "0") so "nothing chosen" is always a
// valid selection.

use serde::Serialize;

use super::device::{DeviceRecord, DeviceRole};

/// Sentinel id shared by every list.
pub const NO_SELECTION_ID: &str = "0";
const LABEL_EMPTY: &str = "(no devices found)";
const LABEL_NONE: &str = "(no selection)";

/// One selectable entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

/// An ordered choice list with its leading sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionList(Vec<Choice>);

impl SelectionList {
    /// Build a list from records in registry order.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a DeviceRecord>) -> Self {
        let entries: Vec<Choice> = records
            .into_iter()
            .map(|r| Choice {
                id: r.mac.to_string(),
                label: r.label(),
            })
            .collect();

        let sentinel = Choice {
            id: NO_SELECTION_ID.to_owned(),
            label: (if entries.is_empty() { LABEL_EMPTY } else { LABEL_NONE }).to_owned(),
        };

        let mut choices = Vec::with_capacity(entries.len() + 1);
        choices.push(sentinel);
        choices.extend(entries);
        Self(choices)
    }

    pub fn choices(&self) -> &[Choice] {
        &self.0
    }
}

impl Default for SelectionList {
    fn default() -> Self {
        Self::from_records(std::iter::empty())
    }
}

/// The three derived lists, rebuilt together after every merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionLists {
    pub all: SelectionList,
    pub transmitters: SelectionList,
    pub receivers: SelectionList,
}

impl SelectionLists {
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a DeviceRecord>,
        I::IntoIter: Clone,
    {
        let records = records.into_iter();
        Self {
            all: SelectionList::from_records(records.clone()),
            transmitters: SelectionList::from_records(
                records.clone().filter(|r| r.role() == DeviceRole::Transmitter),
            ),
            receivers: SelectionList::from_records(
                records.filter(|r| r.role() == DeviceRole::Receiver),
            ),
        }
    }

    pub fn for_role(&self, role: Option<DeviceRole>) -> &SelectionList {
        match role {
            None => &self.all,
            Some(DeviceRole::Transmitter) => &self.transmitters,
            Some(DeviceRole::Receiver) => &self.receivers,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record(mac: &str, model: &str, name: Option<&str>) -> DeviceRecord {
        let mut raw = json!({ "mac": mac, "modelName": model });
        if let Some(name) = name {
            raw["customName"] = json!(name);
        }
        DeviceRecord::try_from(raw).unwrap()
    }

    #[test]
    fn empty_lists_carry_only_the_empty_sentinel() {
        let lists = SelectionLists::default();
        for list in [&lists.all, &lists.transmitters, &lists.receivers] {
            assert_eq!(
                list.choices(),
                &[Choice {
                    id: "0".into(),
                    label: "(no devices found)".into()
                }]
            );
            assert_eq!(list.choices().len(), 1);
        }
    }

    #[test]
    fn lists_split_by_role_in_order() {
        let records = [
            record("A", "X-TX", Some("Desk")),
            record("B", "X-RX", None),
            record("C", "Y-TX", None),
        ];
        let lists = SelectionLists::build(records.iter());

        let ids = |l: &SelectionList| l.choices().iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&lists.all), ["0", "A", "B", "C"]);
        assert_eq!(ids(&lists.transmitters), ["0", "A", "C"]);
        assert_eq!(ids(&lists.receivers), ["0", "B"]);

        assert_eq!(lists.all.choices()[0].label, "(no selection)");
        assert_eq!(lists.all.choices()[1].label, "Desk A");
        assert_eq!(lists.all.choices()[2].label, "B");
    }

    #[test]
    fn role_with_no_members_uses_empty_label() {
        let records = [record("A", "X-TX", None)];
        let lists = SelectionLists::build(records.iter());
        assert_eq!(lists.receivers.choices()[0].label, "(no devices found)");
        assert_eq!(lists.transmitters.choices()[0].label, "(no selection)");
        let has_a = |l: &SelectionList| l.choices().iter().any(|c| c.id == "A");
        assert!(has_a(lists.for_role(Some(DeviceRole::Transmitter))));
        assert!(!has_a(lists.for_role(Some(DeviceRole::Receiver))));
    }
}
