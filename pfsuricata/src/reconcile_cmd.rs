//! `interface` and `suppress` subcommands.
//!
//! Both follow the same sequence:
//!
//! 1. **Validate** the key before anything is read
//! 2. **Load** settings and the config document
//! 3. **Reconcile** the desired state in memory
//! 4. **Commit** (unless `--check`): write once, then reload
//! 5. **Report** the outcome as text or JSON

use std::fs;

use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::{GlobalArgs, InterfaceArgs, OutputFormat, StateArg, SuppressArgs};
use pfsuricata::commit::{commit, unix_now, CommitPlan};
use pfsuricata::document::ConfigDocument;
use pfsuricata::exec::PhpShell;
use pfsuricata::reconcile::{
    reconcile, InterfaceParams, Reconciler, RunOptions, State, SuppressParams, SuricataInterface,
    SuricataSuppress,
};
use pfsuricata::report::{render_json, render_text};
use pfsuricata::settings::Settings;

pub fn run_interface(global: &GlobalArgs, args: InterfaceArgs) -> Result<()> {
    let params = InterfaceParams {
        interface: args.interface,
        descr: args.descr,
        uuid: args.uuid,
        state: state(args.state),
    };
    run(global, &SuricataInterface, &params)
}

pub fn run_suppress(global: &GlobalArgs, args: SuppressArgs) -> Result<()> {
    let rules = match &args.rules_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read rules file {}", path.display()))?,
        None => args.rules,
    };
    let params = SuppressParams {
        name: args.name,
        descr: args.descr,
        rules,
        state: state(args.state),
    };
    run(global, &SuricataSuppress, &params)
}

fn run<R: Reconciler>(global: &GlobalArgs, reconciler: &R, params: &R::Params) -> Result<()> {
    let module = reconciler.module_name();
    reconciler
        .validate(params)
        .with_context(|| format!("{module}: invalid parameters"))?;

    let (settings, settings_source) = Settings::resolve(global.settings.as_deref())?;
    debug!(source = %settings_source, "settings loaded");

    let config_path = global
        .config
        .clone()
        .unwrap_or_else(|| settings.config_path.clone());
    let mut doc = ConfigDocument::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let opts = RunOptions {
        prune_unknown_fields: global.prune_unknown || settings.prune_unknown_fields,
    };
    let outcome =
        reconcile(&mut doc, reconciler, params, opts).with_context(|| format!("{module} failed"))?;

    let target = global.output.clone().unwrap_or(config_path);
    // The appliance's cache only shadows the live config, not a copy.
    let cache_path = if target == settings.config_path {
        settings.cache_path.clone()
    } else {
        debug!(target = %target.display(), "not the live config, cache left alone");
        None
    };
    let plan = CommitPlan {
        target,
        revision_user: settings.revision_user.clone(),
        cache_path,
        check_mode: global.check,
        reload: !global.no_reload,
    };
    let mut shell = PhpShell::new(
        global
            .shell
            .clone()
            .unwrap_or_else(|| settings.shell.program.clone()),
        settings.shell.args.clone(),
    );
    commit(&mut doc, &outcome, &plan, &mut shell, unix_now())
        .with_context(|| format!("failed to commit {}", plan.target.display()))?;

    match global.format {
        OutputFormat::Text => println!("{}", render_text(&outcome)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&render_json(&outcome))?),
    }
    Ok(())
}

fn state(arg: StateArg) -> State {
    match arg {
        StateArg::Present => State::Present,
        StateArg::Absent => State::Absent,
    }
}
