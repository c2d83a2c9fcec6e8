//! Desired-state reconciliation of configuration records.
//!
//! Every managed record type implements [`Reconciler`]; [`reconcile`] drives
//! the shared locate / diff / write / report cycle against a
//! [`ConfigDocument`]:
//!
//! | state     | record found | effect                                   |
//! |-----------|--------------|------------------------------------------|
//! | `present` | no           | new element appended, changed            |
//! | `present` | yes          | differing fields overwritten             |
//! | `absent`  | yes          | element removed, changed                 |
//! | `absent`  | no           | nothing                                  |
//!
//! The document is only touched after validation, collection lookup and
//! record location have all succeeded.

pub mod interface;
pub mod suppress;


use pfxml_core::{FieldMap, XmlNode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::ConfigDocument;
use crate::error::ReconcileError;
use crate::report::{format_created_fields, format_updated_fields, quote_value};

pub use interface::{InterfaceParams, SuricataInterface};
pub use suppress::{SuppressParams, SuricataSuppress};

/// One configuration entry as a field name -> value map.
pub type Record = FieldMap;

/// PHP run on the appliance to resynchronise the Suricata package.
pub const SURICATA_SYNC: &str =
    "require_once(\"suricata/suricata.inc\");\nsync_suricata_package_config();";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

/// Caller-declared target values plus presence directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredState {
    pub state: State,
    pub record: Record,
}

/// Before/after snapshots of one reconciled record, in reporting form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSet {
    pub before: Option<Record>,
    pub after: Option<Record>,
    pub changed: bool,
}

/// Result of one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub module: &'static str,
    pub changed: bool,
    pub commands: Vec<String>,
    pub diff: ChangeSet,
    /// Instruction to send to the appliance once the change is committed.
    pub reload: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Delete stored leaf fields that are not part of the record schema.
    pub prune_unknown_fields: bool,
}

/// A record type managed through desired-state reconciliation.
pub trait Reconciler {
    /// Caller-supplied parameters.
    type Params;

    /// Name used in command logs, e.g. `suricata_interface`.
    fn module_name(&self) -> &'static str;

    /// Section path from the document root to the collection.
    fn collection_path(&self) -> &'static [&'static str];

    /// Tag of each record element inside the collection.
    fn element_tag(&self) -> &'static str;

    /// Field that identifies a record within its collection.
    fn key_field(&self) -> &'static str;

    /// Every stored field this reconciler owns.
    fn schema(&self) -> &'static [&'static str];

    /// Plural noun used in ambiguity errors, e.g. `interface rules`.
    fn record_noun(&self) -> &'static str;

    /// Error shown when the collection section is missing.
    fn missing_collection_message(&self) -> &'static str;

    fn validate(&self, params: &Self::Params) -> Result<(), ReconcileError>;

    fn build_desired(&self, params: &Self::Params) -> DesiredState;

    /// Find the index of the single element in `collection` that `desired`
    /// refers to.
    fn locate(
        &self,
        collection: &XmlNode,
        desired: &Record,
    ) -> Result<Option<usize>, ReconcileError> {
        let value = desired
            .get(self.key_field())
            .map(String::as_str)
            .unwrap_or_default();
        locate_unique(
            collection,
            self.element_tag(),
            self.key_field(),
            value,
            self.record_noun(),
        )
    }

    /// Fill in generated fields before a new record is inserted.
    fn prepare_new(&self, _collection: &XmlNode, _record: &mut Record) {}

    /// Write `desired` onto an existing element. Returns `true` if anything
    /// changed.
    fn apply_changes(&self, element: &mut XmlNode, desired: &Record, opts: RunOptions) -> bool {
        let mut changed = ConfigDocument::copy_fields_to_element(desired, element);
        if opts.prune_unknown_fields {
            let schema = self.schema();
            let removed = element.retain_fields(|tag| schema.contains(&tag));
            if !removed.is_empty() {
                debug!(module = self.module_name(), fields = ?removed, "pruned unknown fields");
                changed = true;
            }
        }
        changed
    }

    /// Convert a stored record into the form shown in diffs and logs.
    fn report_view(&self, record: &Record) -> Result<Record, ReconcileError> {
        Ok(record.clone())
    }

    /// Pseudo-CLI `field='value'` listing: every field of `after` on
    /// creation, only the differences against `before` on update.
    fn describe(&self, after: &Record, before: Option<&Record>) -> String {
        match before {
            None => format_created_fields(after, self.key_field()),
            Some(before) => format_updated_fields(before, after),
        }
    }

    fn reload_instruction(&self) -> &'static str {
        SURICATA_SYNC
    }
}

/// Find the single child of `collection` tagged `tag` whose `field` equals
/// `value`. Several matches mean the collection is corrupt.
pub fn locate_unique(
    collection: &XmlNode,
    tag: &str,
    field: &'static str,
    value: &str,
    noun: &'static str,
) -> Result<Option<usize>, ReconcileError> {
    let mut matches = collection
        .children
        .iter()
        .enumerate()
        .filter(|(_, child)| {
            child.tag == tag && child.get_text(&[field]).unwrap_or_default() == value
        })
        .map(|(idx, _)| idx);

    let first = matches.next();
    if first.is_some() && matches.next().is_some() {
        return Err(ReconcileError::AmbiguousRecord {
            what: noun,
            field,
            value: value.to_string(),
        });
    }
    Ok(first)
}

/// Reconcile one record of `reconciler`'s type in `doc` against `params`.
///
/// The returned [`Outcome`] carries the change set, the command log and the
/// reload instruction to issue once the document has been committed.
pub fn reconcile<R: Reconciler>(
    doc: &mut ConfigDocument,
    reconciler: &R,
    params: &R::Params,
    opts: RunOptions,
) -> Result<Outcome, ReconcileError> {
    let module = reconciler.module_name();
    reconciler.validate(params)?;
    let mut desired = reconciler.build_desired(params);
    let key = desired
        .record
        .get(reconciler.key_field())
        .cloned()
        .unwrap_or_default();
    let name = quote_value(&key);

    let collection = doc
        .get_element_mut(reconciler.collection_path())
        .ok_or(ReconcileError::MissingCollection {
            message: reconciler.missing_collection_message(),
        })?;
    let found = reconciler.locate(collection, &desired.record)?;

    let mut commands = Vec::new();
    let diff = match (desired.state, found) {
        (State::Present, None) => {
            reconciler.prepare_new(collection, &mut desired.record);
            let after = reconciler.report_view(&desired.record)?;

            let mut element = ConfigDocument::new_element(reconciler.element_tag());
            ConfigDocument::copy_fields_to_element(&desired.record, &mut element);
            collection.children.push(element);

            info!(module, key = %key, "created record");
            commands.push(format!(
                "create {module} {name}{}",
                reconciler.describe(&after, None)
            ));
            ChangeSet {
                before: None,
                after: Some(after),
                changed: true,
            }
        }
        (State::Present, Some(idx)) => {
            let element = &mut collection.children[idx];
            let before = reconciler.report_view(&ConfigDocument::element_to_map(element))?;
            let changed = reconciler.apply_changes(element, &desired.record, opts);
            let after = reconciler.report_view(&ConfigDocument::element_to_map(element))?;

            if changed {
                info!(module, key = %key, "updated record");
                commands.push(format!(
                    "update {module} {name} set {}",
                    reconciler.describe(&after, Some(&before))
                ));
            } else {
                debug!(module, key = %key, "record already up to date");
            }
            ChangeSet {
                before: Some(before),
                after: Some(after),
                changed,
            }
        }
        (State::Absent, Some(idx)) => {
            let before =
                reconciler.report_view(&ConfigDocument::element_to_map(&collection.children[idx]))?;
            collection.children.remove(idx);

            info!(module, key = %key, "deleted record");
            commands.push(format!("delete {module} {name}"));
            ChangeSet {
                before: Some(before),
                after: None,
                changed: true,
            }
        }
        (State::Absent, None) => {
            debug!(module, key = %key, "record already absent");
            ChangeSet::default()
        }
    };

    Ok(Outcome {
        module,
        changed: diff.changed,
        commands,
        reload: diff.changed.then(|| reconciler.reload_instruction()),
        diff,
    })
}
