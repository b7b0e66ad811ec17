use crate::component::{PreviewSampler, SamplerOutcome};
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use log::warn;
use rust_i18n::t;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn run_preview_sampler(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    if let Err(e) = run_sampler_once(shutdown_signal, config, None) {
        eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
    }

    pause(term)?;
    Ok(())
}

/// 執行一次取樣，成功後記錄來源影片
pub fn run_sampler_once(
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
    source: Option<PathBuf>,
) -> Result<SamplerOutcome> {
    let sampler = PreviewSampler::new(config.clone(), Arc::clone(shutdown_signal));
    let outcome = sampler.run(source)?;
    remember_source(config, &outcome);
    Ok(outcome)
}

fn remember_source(config: &mut Config, outcome: &SamplerOutcome) {
    let SamplerOutcome::Created { source, .. } = outcome else {
        return;
    };

    let path = fs::canonicalize(source).unwrap_or_else(|_| source.clone());
    add_recent_path(&mut config.settings, &path.to_string_lossy());

    if let Err(e) = save_settings(&config.settings) {
        warn!("無法儲存最近使用清單: {e:#}");
    }
}
