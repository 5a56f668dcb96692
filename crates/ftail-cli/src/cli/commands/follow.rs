//! `ftail follow [URL...]` – follow URLs until every tailer stops or Ctrl-C.

use anyhow::{bail, Context, Result};
use ftail_core::config::FtailConfig;
use ftail_core::scheduler::{self, ControlledPacer, ScheduleMode};
use ftail_core::{FollowControl, TailResult, Tailer, TargetSpec, Transport};
use std::sync::Arc;

use crate::cli::output::Output;

/// Command-line options of `ftail follow`.
#[derive(Debug, Clone, Default)]
pub struct FollowArgs {
    pub urls: Vec<String>,
    pub offset: Option<u64>,
    pub wait: Option<u64>,
    pub max_retries: Option<u32>,
    pub always_callback: bool,
    pub verbose: bool,
    pub round_robin: bool,
}

impl FollowArgs {
    /// Command-line values win over whatever the target already has.
    fn apply(&self, mut spec: TargetSpec) -> TargetSpec {
        if let Some(offset) = self.offset {
            spec.offset = Some(offset);
        }
        if let Some(wait) = self.wait {
            spec.wait = Some(wait);
        }
        if let Some(max_retries) = self.max_retries {
            spec.max_retries = Some(max_retries);
        }
        spec.always_callback |= self.always_callback;
        spec.verbose |= self.verbose;
        spec
    }
}

/// Targets to follow: the URLs given on the command line, else the config's
/// `[target]` entries. Config defaults fill whatever is still unset.
pub fn build_specs(cfg: &FtailConfig, args: &FollowArgs) -> Result<Vec<TargetSpec>> {
    let specs: Vec<TargetSpec> = if args.urls.is_empty() {
        cfg.targets()?
    } else {
        args.urls.iter().map(TargetSpec::new).collect()
    };
    if specs.is_empty() {
        bail!("nothing to follow: pass a URL or add a [target] to the config");
    }
    Ok(specs
        .into_iter()
        .map(|s| cfg.apply_defaults(args.apply(s)))
        .collect())
}

pub async fn run_follow(cfg: &FtailConfig, args: FollowArgs) -> Result<()> {
    let specs = build_specs(cfg, &args)?;
    let mode = if args.round_robin {
        ScheduleMode::RoundRobin
    } else {
        cfg.schedule
    };
    let transport: Arc<dyn Transport> = Arc::new(cfg.transport());
    let control = Arc::new(FollowControl::new());
    let output = Output::stdout(specs.len() > 1);
    tracing::debug!(?mode, "starting follow");

    let mut task = tokio::task::spawn_blocking({
        let control = Arc::clone(&control);
        move || {
            let pacer = ControlledPacer::new(Arc::clone(&control));
            scheduler::follow_with(
                mode,
                specs,
                transport,
                &pacer,
                Some(&control),
                |r: &TailResult, t: &Tailer| output.on_result(r, t),
            )
        }
    });

    let joined = tokio::select! {
        joined = &mut task => joined,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, stopping all tailers");
            control.stop_all();
            task.await
        }
    };
    let statuses = joined.context("follow task join")??;

    for status in &statuses {
        eprintln!("ftail: {}", status);
    }
    Ok(())
}
