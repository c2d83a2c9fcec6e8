//! Persisting a reconciled document and triggering the package reload.
//!
//! A commit happens at most once per invocation, after reconciliation has
//! fully succeeded:
//!
//! 1. stamp the `<revision>` block,
//! 2. atomically replace the target file,
//! 3. drop pfSense's parsed-config cache,
//! 4. send the reload instruction.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tracing::{debug, info};

use crate::document::{ConfigDocument, DocumentError, Revision};
use crate::exec::{CommandExecutor, ExecError};
use crate::reconcile::Outcome;

#[derive(Debug, Error)]
pub enum CommitError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("failed to remove config cache {path}: {source}")]
    Cache {
        path: String,
        source: std::io::Error,
    },
    #[error("reload failed: {0}")]
    Reload(#[from] ExecError),
}

/// Where and how to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitPlan {
    pub target: PathBuf,
    pub revision_user: String,
    pub cache_path: Option<PathBuf>,
    /// Report only; leave the file and the appliance alone.
    pub check_mode: bool,
    pub reload: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub written: bool,
    pub reloaded: bool,
}

/// Write `doc` and run the reload instruction if `outcome` changed anything.
pub fn commit(
    doc: &mut ConfigDocument,
    outcome: &Outcome,
    plan: &CommitPlan,
    executor: &mut dyn CommandExecutor,
    now: u64,
) -> Result<CommitReport, CommitError> {
    if !outcome.changed {
        debug!(module = outcome.module, "nothing to commit");
        return Ok(CommitReport::default());
    }
    if plan.check_mode {
        info!(module = outcome.module, "check mode, config left untouched");
        return Ok(CommitReport::default());
    }

    doc.stamp_revision(&Revision {
        time: now,
        description: format!("{}: {}", outcome.module, outcome.commands.join("; ")),
        username: plan.revision_user.clone(),
    });
    doc.save(&plan.target)?;
    info!(path = %plan.target.display(), "config written");

    if let Some(cache) = &plan.cache_path {
        remove_cache(cache)?;
    }

    let mut report = CommitReport {
        written: true,
        reloaded: false,
    };
    if let (true, Some(instruction)) = (plan.reload, outcome.reload) {
        executor.execute(instruction)?;
        report.reloaded = true;
    }
    Ok(report)
}

/// Seconds since the unix epoch, for revision stamps.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or_default()
}

fn remove_cache(path: &Path) -> Result<(), CommitError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "config cache removed");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CommitError::Cache {
            path: path.display().to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{commit, CommitPlan, CommitReport};
    use crate::document::ConfigDocument;
    use crate::exec::RecordingExecutor;
    use crate::reconcile::{ChangeSet, Outcome, SURICATA_SYNC};

    fn outcome(changed: bool) -> Outcome {
        Outcome {
            module: "suricata_interface",
            changed,
            commands: if changed {
                vec!["create suricata_interface 'lan'".to_string()]
            } else {
                Vec::new()
            },
            diff: ChangeSet {
                changed,
                ..ChangeSet::default()
            },
            reload: changed.then_some(SURICATA_SYNC),
        }
    }

    fn plan(dir: &std::path::Path) -> CommitPlan {
        CommitPlan {
            target: dir.join("config.xml"),
            revision_user: "tester".to_string(),
            cache_path: Some(dir.join("config.cache")),
            check_mode: false,
            reload: true,
        }
    }

    fn doc() -> ConfigDocument {
        ConfigDocument::from_bytes(b"<pfsense><version>23.3</version></pfsense>").expect("parse")
    }

    #[test]
    fn changed_outcome_writes_stamps_and_reloads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let plan = plan(dir.path());
        fs::write(plan.cache_path.as_ref().expect("cache"), "cached").expect("write cache");
        let mut executor = RecordingExecutor::default();
        let mut doc = doc();

        let report = commit(&mut doc, &outcome(true), &plan, &mut executor, 42).expect("commit");

        assert_eq!(
            report,
            CommitReport {
                written: true,
                reloaded: true
            }
        );
        assert_eq!(executor.executed, vec![SURICATA_SYNC.to_string()]);
        assert!(!plan.cache_path.as_ref().expect("cache").exists());

        let written = ConfigDocument::load(&plan.target).expect("reload written config");
        assert_eq!(written.root().get_text(&["revision", "time"]), Some("42"));
        assert_eq!(
            written.root().get_text(&["revision", "description"]),
            Some("suricata_interface: create suricata_interface 'lan'")
        );
    }

    #[test]
    fn unchanged_outcome_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let plan = plan(dir.path());
        let mut executor = RecordingExecutor::default();

        let report = commit(&mut doc(), &outcome(false), &plan, &mut executor, 1).expect("commit");

        assert_eq!(report, CommitReport::default());
        assert!(executor.executed.is_empty());
        assert!(!plan.target.exists());
    }

    #[test]
    fn check_mode_skips_write_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let plan = CommitPlan {
            check_mode: true,
            ..plan(dir.path())
        };
        let mut executor = RecordingExecutor::default();

        let report = commit(&mut doc(), &outcome(true), &plan, &mut executor, 1).expect("commit");

        assert!(!report.written);
        assert!(executor.executed.is_empty());
        assert!(!plan.target.exists());
    }

    #[test]
    fn reload_can_be_disabled() {
        let dir = tempfile::tempdir().expect("tempdir");
        let plan = CommitPlan {
            reload: false,
            ..plan(dir.path())
        };
        let mut executor = RecordingExecutor::default();

        let report = commit(&mut doc(), &outcome(true), &plan, &mut executor, 1).expect("commit");

        assert!(report.written);
        assert!(!report.reloaded);
        assert!(executor.executed.is_empty());
    }
}
