use crate::component::preview_sampler::{
    ExtractionMode, MAX_CLIP_LENGTH, MIN_CLIP_LENGTH, validate_clip_length,
};
use crate::config::save::save_settings;
use crate::config::types::{Config, Language};
use crate::menu::handlers::run_preview_sampler;
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_sampler"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_preview_sampler(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(2) | None => Ok(false),
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("common.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_clip_length"),
            t!("settings.opt_extraction_mode"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_clip_length_menu(term, config)?,
            Some(1) => show_extraction_mode_menu(term, config)?,
            Some(2) => show_language_menu(term, config)?,
            Some(3) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 預設片段長度
fn show_clip_length_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.clip_length.title")).cyan().bold());
    println!(
        "\n{} {}",
        style(t!("settings.clip_length.current")).dim(),
        config.settings.sampler.default_clip_length
    );
    println!();

    let clip_length: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!(
            "sampler.clip_length_prompt",
            min = MIN_CLIP_LENGTH,
            max = MAX_CLIP_LENGTH
        ))
        .default(config.settings.sampler.default_clip_length)
        .validate_with(|value: &u32| -> Result<(), String> {
            validate_clip_length(*value).map(|_| ()).map_err(|_| {
                t!(
                    "sampler.clip_length_invalid",
                    min = MIN_CLIP_LENGTH,
                    max = MAX_CLIP_LENGTH
                )
                .to_string()
            })
        })
        .interact_text_on(term)?;

    if clip_length != config.settings.sampler.default_clip_length {
        config.settings.sampler.default_clip_length = clip_length;
        save_settings(&config.settings)?;
        println!("\n{} {}", style(t!("settings.saved")).green(), clip_length);
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 片段擷取模式
fn show_extraction_mode_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!(
        "{}",
        style(t!("settings.extraction_mode.title")).cyan().bold()
    );
    println!("{}", style(t!("common.esc_hint")).dim());
    println!(
        "\n{} {}",
        style(t!("settings.extraction_mode.current")).dim(),
        config.settings.sampler.extraction_mode
    );
    println!();

    let modes = [ExtractionMode::Sequential, ExtractionMode::Parallel];

    let items: Vec<String> = vec![
        t!("settings.extraction_mode.sequential").to_string(),
        t!("settings.extraction_mode.parallel").to_string(),
    ];

    let default_index = modes
        .iter()
        .position(|&m| m == config.settings.sampler.extraction_mode)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.extraction_mode.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_mode = modes[selection];

    if selected_mode != config.settings.sampler.extraction_mode {
        config.settings.sampler.extraction_mode = selected_mode;
        save_settings(&config.settings)?;
        println!("\n{} {}", style(t!("settings.saved")).green(), selected_mode);
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let items: Vec<String> = Language::ALL.iter().map(ToString::to_string).collect();

    let default_index = Language::ALL
        .iter()
        .position(|&l| l == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.language.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = Language::ALL[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        println!(
            "\n{} {}",
            style(t!("settings.saved")).green(),
            selected_lang
        );
        std::thread::sleep(std::time::Duration::from_secs(1));
    }

    Ok(())
}
