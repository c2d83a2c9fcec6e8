use super::{DesiredState, Reconciler, Record, State};
use crate::error::ReconcileError;
use crate::rules_codec::{decode_rules, encode_rules};
use crate::validate::validate_key;

/// Stored field holding the encoded rule text.
const ENCODED_FIELD: &str = "suppresspassthru";
/// Name the decoded rule text is reported under.
const REPORTED_FIELD: &str = "rules";

/// Parameters for one suppression list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuppressParams {
    pub name: String,
    pub descr: String,
    /// Plain rule text, one suppression per line.
    pub rules: String,
    pub state: State,
}

/// Suricata suppression lists under `installedpackages/suricata/suppress/item`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuricataSuppress;

impl Reconciler for SuricataSuppress {
    type Params = SuppressParams;

    fn module_name(&self) -> &'static str {
        "suricata_suppress"
    }

    fn collection_path(&self) -> &'static [&'static str] {
        &["installedpackages", "suricata", "suppress"]
    }

    fn element_tag(&self) -> &'static str {
        "item"
    }

    fn key_field(&self) -> &'static str {
        "name"
    }

    fn schema(&self) -> &'static [&'static str] {
        &["name", "descr", ENCODED_FIELD]
    }

    fn record_noun(&self) -> &'static str {
        "suppress items"
    }

    fn missing_collection_message(&self) -> &'static str {
        "Unable to find suppression list XML configuration entry. Are you sure suricata is installed?"
    }

    fn validate(&self, params: &SuppressParams) -> Result<(), ReconcileError> {
        validate_key("name", &params.name)
    }

    fn build_desired(&self, params: &SuppressParams) -> DesiredState {
        let mut record = Record::new();
        record.insert("name".to_string(), params.name.clone());
        if params.state == State::Present {
            record.insert("descr".to_string(), params.descr.clone());
            record.insert(ENCODED_FIELD.to_string(), encode_rules(&params.rules));
        }
        DesiredState {
            state: params.state,
            record,
        }
    }

    /// Swap the encoded field for the decoded rule text.
    fn report_view(&self, record: &Record) -> Result<Record, ReconcileError> {
        let mut view = record.clone();
        if let Some(encoded) = view.remove(ENCODED_FIELD) {
            let rules = decode_rules(&encoded).ok_or(ReconcileError::Decode {
                field: ENCODED_FIELD,
            })?;
            view.insert(REPORTED_FIELD.to_string(), rules);
        }
        Ok(view)
    }
}

#[cfg(test)]
mod tests {
    use super::{SuppressParams, SuricataSuppress};
    use crate::error::ReconcileError;
    use crate::reconcile::{Reconciler, Record, State};

    #[test]
    fn desired_record_stores_encoded_rules() {
        let desired = SuricataSuppress.build_desired(&SuppressParams {
            name: "lansuppress".to_string(),
            descr: "LAN".to_string(),
            rules: "suppress gen_id 1, sig_id 2210016\n".to_string(),
            state: State::Present,
        });

        assert_eq!(desired.record["name"], "lansuppress");
        assert_eq!(
            desired.record["suppresspassthru"],
            "c3VwcHJlc3MgZ2VuX2lkIDEsIHNpZ19pZCAyMjEwMDE2DQo="
        );
        assert!(!desired.record.contains_key("rules"));
    }

    #[test]
    fn report_view_decodes_rules() {
        let mut stored = Record::new();
        stored.insert("name".to_string(), "x".to_string());
        stored.insert(
            "suppresspassthru".to_string(),
            "c3VwcHJlc3MgZ2VuX2lkIDEsIHNpZ19pZCAyMjEwMDE2DQo=".to_string(),
        );

        let view = SuricataSuppress.report_view(&stored).expect("view");
        assert_eq!(view["rules"], "suppress gen_id 1, sig_id 2210016\r\n");
        assert!(!view.contains_key("suppresspassthru"));
    }

    #[test]
    fn report_view_rejects_corrupt_storage() {
        let mut stored = Record::new();
        stored.insert("suppresspassthru".to_string(), "%%%".to_string());

        assert_eq!(
            SuricataSuppress.report_view(&stored),
            Err(ReconcileError::Decode {
                field: "suppresspassthru"
            })
        );
    }
}
