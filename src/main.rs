use anyhow::Result;
use console::{Term, style};
use log::{error, info, warn};
use rust_i18n::t;
use std::path::PathBuf;
use std::process::ExitCode;
use video_sampler::config::types::Config;
use video_sampler::init;
use video_sampler::menu::handlers::run_sampler_once;
use video_sampler::menu::show_main_menu;
use video_sampler::signal::setup_shutdown_signal;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

fn main() -> Result<ExitCode> {
    init::init();
    let shutdown_signal = setup_shutdown_signal()?;

    let mut config = Config::new()?;
    rust_i18n::set_locale(config.settings.language.as_str());

    // 指定影片路徑時只處理該影片，不進入選單
    if let Some(source) = std::env::args_os().nth(1).map(PathBuf::from) {
        return match run_sampler_once(&shutdown_signal, &mut config, Some(source)) {
            Ok(outcome) => {
                info!("Finished: {outcome:?}");
                Ok(ExitCode::SUCCESS)
            }
            Err(e) => {
                error!("Sampler failed: {e:#}");
                eprintln!("{} {e:#}", style(t!("common.error_prefix")).red().bold());
                Ok(ExitCode::FAILURE)
            }
        };
    }

    let term = Term::stdout();
    loop {
        match show_main_menu(&term, &shutdown_signal, &mut config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style(t!("common.error_prefix")).red().bold(), e);
                break;
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
