use crate::config::save::save_settings;
use crate::config::{Config, FailurePolicy, Language};
use crate::menu::handlers::{run_batch_renamer, run_video_categorizer, run_video_compressor};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_renamer"),
        t!("main_menu.opt_compressor"),
        t!("main_menu.opt_categorizer"),
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
            run_batch_renamer(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_video_compressor(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) => {
            run_video_categorizer(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(3) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(4) | None => Ok(false),
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
            t!("settings.opt_failure_policy"),
            t!("settings.opt_timeout"),
            t!("settings.opt_compressor"),
            t!("settings.opt_categorizer"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_failure_policy_menu(term, config)?,
            Some(1) => show_timeout_menu(term, config)?,
            Some(2) => show_compressor_settings_menu(term, config)?,
            Some(3) => show_categorizer_settings_menu(term, config)?,
            Some(4) => show_language_menu(term, config)?,
            Some(5) | None => break,
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn announce_saved(value: impl std::fmt::Display) {
    println!("\n{} {}", style(t!("settings.saved")).green(), value);
    std::thread::sleep(Duration::from_secs(1));
}

/// 各工作流程的失敗處理方式
fn show_failure_policy_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.failure_policy.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let workflows = vec![
        format!(
            "{} ({})",
            t!("main_menu.opt_renamer"),
            config.settings.renamer.failure_policy
        ),
        format!(
            "{} ({})",
            t!("main_menu.opt_compressor"),
            config.settings.compressor.failure_policy
        ),
        format!(
            "{} ({})",
            t!("main_menu.opt_categorizer"),
            config.settings.categorizer.failure_policy
        ),
    ];

    let Some(workflow) = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.failure_policy.workflow_prompt"))
        .items(&workflows)
        .default(0)
        .interact_on_opt(term)?
    else {
        return Ok(());
    };

    let current = match workflow {
        0 => &mut config.settings.renamer.failure_policy,
        1 => &mut config.settings.compressor.failure_policy,
        _ => &mut config.settings.categorizer.failure_policy,
    };

    let policies = FailurePolicy::all();
    let items: Vec<String> = policies.iter().map(ToString::to_string).collect();
    let default_index = policies.iter().position(|p| *p == *current).unwrap_or(0);

    let Some(selection) = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.failure_policy.prompt"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?
    else {
        return Ok(());
    };

    let selected = policies[selection];
    if selected != *current {
        *current = selected;
        save_settings(&config.settings)?;
        announce_saved(selected);
    }

    Ok(())
}

/// 單一項目處理時限
fn show_timeout_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.timeout.title")).cyan().bold());
    println!("{}", style(t!("settings.timeout.hint")).dim());

    let current = config.settings.per_item_timeout_secs.unwrap_or(0);
    let secs: u64 = Input::new()
        .with_prompt(t!("settings.timeout.prompt"))
        .default(current)
        .interact_text()?;

    let new_value = (secs > 0).then_some(secs);
    if new_value != config.settings.per_item_timeout_secs {
        config.settings.per_item_timeout_secs = new_value;
        save_settings(&config.settings)?;
        announce_saved(secs);
    }

    Ok(())
}

/// 壓縮參數設定
fn show_compressor_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.compressor.title")).cyan().bold());

    let current = config.settings.compressor.clone();
    let mut updated = current.clone();

    updated.target_height = Input::new()
        .with_prompt(t!("settings.compressor.height"))
        .default(current.target_height)
        .validate_with(|h: &u32| -> Result<(), String> {
            if *h >= 2 && h % 2 == 0 {
                Ok(())
            } else {
                Err(t!("settings.compressor.height_invalid").to_string())
            }
        })
        .interact_text()?;
    updated.codec = Input::new()
        .with_prompt(t!("settings.compressor.codec"))
        .default(current.codec.clone())
        .interact_text()?;
    updated.preset = Input::new()
        .with_prompt(t!("settings.compressor.preset"))
        .default(current.preset.clone())
        .interact_text()?;
    updated.bitrate = Input::new()
        .with_prompt(t!("settings.compressor.bitrate"))
        .default(current.bitrate.clone())
        .interact_text()?;
    updated.threads = Input::new()
        .with_prompt(t!("settings.compressor.threads"))
        .default(current.threads)
        .interact_text()?;

    if updated != current {
        config.settings.compressor = updated;
        save_settings(&config.settings)?;
        announce_saved(t!("settings.compressor.title"));
    }

    Ok(())
}

fn show_categorizer_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.categorizer.title")).cyan().bold());

    let verify = Confirm::new()
        .with_prompt(t!("settings.categorizer.verify_prompt"))
        .default(config.settings.categorizer.verify_readable)
        .interact()?;

    if verify != config.settings.categorizer.verify_readable {
        config.settings.categorizer.verify_readable = verify;
        save_settings(&config.settings)?;
        announce_saved(verify);
    }

    Ok(())
}

/// 語言設定選單
fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    println!("{}", style(t!("settings.language.title")).cyan().bold());
    println!("{}", style(t!("common.esc_hint")).dim());

    let languages = Language::all();
    let items: Vec<String> = languages.iter().map(ToString::to_string).collect();

    let default_index = languages
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

    let selected_lang = languages[selection];

    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.as_str());
        save_settings(&config.settings)?;
        announce_saved(selected_lang);
    }

    Ok(())
}
