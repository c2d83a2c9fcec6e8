//! Desired-state management of Suricata settings in a pfSense `config.xml`.
//!
//! Two record types are managed, both under `installedpackages/suricata`:
//!
//! - [`reconcile::SuricataInterface`]: interface definitions (`rule`)
//! - [`reconcile::SuricataSuppress`]: suppression lists (`suppress/item`)
//!
//! # Workflow
//!
//! 1. **Load** the configuration into a [`document::ConfigDocument`]
//! 2. **Reconcile** the desired state with [`reconcile::reconcile`], which
//!    validates the key, locates the record, writes the fields and returns an
//!    [`reconcile::Outcome`] (change set, command log, reload instruction)
//! 3. **Commit** with [`commit::commit`]: stamp the revision, atomically
//!    rewrite the file and send the reload instruction through a
//!    [`exec::CommandExecutor`]
//! 4. **Report** the outcome with [`report`]
//!
//! # Examples
//!
//! ```ignore
//! use pfsuricata::document::ConfigDocument;
//! use pfsuricata::reconcile::{reconcile, InterfaceParams, RunOptions, SuricataInterface};
//!
//! let mut doc = ConfigDocument::load("config.xml".as_ref())?;
//! let params = InterfaceParams { interface: "lan".into(), ..Default::default() };
//! let outcome = reconcile(&mut doc, &SuricataInterface, &params, RunOptions::default())?;
//! println!("changed={}", outcome.changed);
//! ```
//!
//! XML parsing and writing live in `pfxml-core`; everything pfSense- and
//! Suricata-specific is in this crate.

pub mod commit;
pub mod document;
pub mod error;
pub mod exec;
pub mod logging;
pub mod reconcile;
pub mod report;
pub mod rules_codec;
pub mod settings;
pub mod validate;
