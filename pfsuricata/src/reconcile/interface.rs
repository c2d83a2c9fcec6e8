use std::collections::BTreeSet;

use pfxml_core::XmlNode;

use super::{locate_unique, DesiredState, Reconciler, Record, State};
use crate::error::ReconcileError;
use crate::validate::validate_key;

/// Parameters for one Suricata interface definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceParams {
    pub interface: String,
    pub descr: String,
    pub uuid: Option<u32>,
    pub state: State,
}

/// Suricata interface definitions under `installedpackages/suricata/rule`.
///
/// Records are keyed by `interface`; when no record carries that interface
/// and a `uuid` is given, the record with that uuid is used instead, so an
/// interface can be reassigned without losing its per-interface state.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuricataInterface;

impl Reconciler for SuricataInterface {
    type Params = InterfaceParams;

    fn module_name(&self) -> &'static str {
        "suricata_interface"
    }

    fn collection_path(&self) -> &'static [&'static str] {
        &["installedpackages", "suricata"]
    }

    fn element_tag(&self) -> &'static str {
        "rule"
    }

    fn key_field(&self) -> &'static str {
        "interface"
    }

    fn schema(&self) -> &'static [&'static str] {
        &["interface", "descr", "uuid"]
    }

    fn record_noun(&self) -> &'static str {
        "interface rules"
    }

    fn missing_collection_message(&self) -> &'static str {
        "Unable to find suricata XML configuration entry. Are you sure suricata is installed?"
    }

    fn validate(&self, params: &InterfaceParams) -> Result<(), ReconcileError> {
        validate_key("interface", &params.interface)
    }

    fn build_desired(&self, params: &InterfaceParams) -> DesiredState {
        let mut record = Record::new();
        record.insert("interface".to_string(), params.interface.clone());
        if params.state == State::Present {
            record.insert("descr".to_string(), params.descr.clone());
            if let Some(uuid) = params.uuid {
                record.insert("uuid".to_string(), uuid.to_string());
            }
        }
        DesiredState {
            state: params.state,
            record,
        }
    }

    fn locate(
        &self,
        collection: &XmlNode,
        desired: &Record,
    ) -> Result<Option<usize>, ReconcileError> {
        let interface = desired
            .get("interface")
            .map(String::as_str)
            .unwrap_or_default();
        if let Some(idx) = locate_unique(
            collection,
            self.element_tag(),
            "interface",
            interface,
            self.record_noun(),
        )? {
            return Ok(Some(idx));
        }

        match desired.get("uuid") {
            Some(uuid) => locate_unique(
                collection,
                self.element_tag(),
                "uuid",
                uuid,
                self.record_noun(),
            ),
            None => Ok(None),
        }
    }

    fn prepare_new(&self, collection: &XmlNode, record: &mut Record) {
        if record.contains_key("uuid") {
            return;
        }
        let uuid = next_free_uuid(collection, self.element_tag());
        record.insert("uuid".to_string(), uuid.to_string());
    }
}

/// Smallest positive uuid not used by any existing interface record.
fn next_free_uuid(collection: &XmlNode, tag: &str) -> u32 {
    let used: BTreeSet<u32> = collection
        .get_children(tag)
        .into_iter()
        .filter_map(|rule| rule.get_text(&["uuid"]))
        .filter_map(|uuid| uuid.trim().parse().ok())
        .collect();
    (1..).find(|candidate| !used.contains(candidate)).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::{next_free_uuid, InterfaceParams, SuricataInterface};
    use crate::reconcile::{Reconciler, State};
    use pfxml_core::parse;

    #[test]
    fn absent_desired_state_only_carries_the_key() {
        let desired = SuricataInterface.build_desired(&InterfaceParams {
            interface: "lan".to_string(),
            descr: "ignored".to_string(),
            uuid: Some(4),
            state: State::Absent,
        });
        assert_eq!(desired.record.len(), 1);
        assert_eq!(desired.record["interface"], "lan");
    }

    #[test]
    fn falls_back_to_uuid_when_interface_is_unknown() {
        let collection = parse(
            br#"<suricata><rule><interface>opt1</interface><uuid>77</uuid></rule></suricata>"#,
        )
        .expect("parse");
        let desired = SuricataInterface.build_desired(&InterfaceParams {
            interface: "opt2".to_string(),
            uuid: Some(77),
            ..InterfaceParams::default()
        });

        let found = SuricataInterface
            .locate(&collection, &desired.record)
            .expect("locate");
        assert_eq!(found, Some(0));
    }

    #[test]
    fn no_fallback_without_uuid() {
        let collection = parse(
            br#"<suricata><rule><interface>opt1</interface><uuid>77</uuid></rule></suricata>"#,
        )
        .expect("parse");
        let desired = SuricataInterface.build_desired(&InterfaceParams {
            interface: "opt2".to_string(),
            ..InterfaceParams::default()
        });

        let found = SuricataInterface
            .locate(&collection, &desired.record)
            .expect("locate");
        assert_eq!(found, None);
    }

    #[test]
    fn next_free_uuid_fills_gaps() {
        let collection = parse(
            br#"<suricata><rule><uuid>1</uuid></rule><rule><uuid>3</uuid></rule><rule><uuid>junk</uuid></rule></suricata>"#,
        )
        .expect("parse");
        assert_eq!(next_free_uuid(&collection, "rule"), 2);
    }
}
