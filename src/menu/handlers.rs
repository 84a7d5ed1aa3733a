use crate::component::{BatchRenamer, VideoCategorizer, VideoCompressor};
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use log::error;
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

fn report_error(e: &anyhow::Error) {
    error!("{e:#}");
    eprintln!("{} {:#}", style(t!("common.error_prefix")).red().bold(), e);
}

pub fn run_batch_renamer(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let renamer = BatchRenamer::new(Arc::clone(shutdown_signal));

    if let Err(e) = renamer.run(config) {
        report_error(&e);
    }

    pause(term)?;
    Ok(())
}

pub fn run_video_compressor(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let compressor = VideoCompressor::new(Arc::clone(shutdown_signal));

    if let Err(e) = compressor.run(config) {
        report_error(&e);
    }

    pause(term)?;
    Ok(())
}

pub fn run_video_categorizer(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let categorizer = VideoCategorizer::new(Arc::clone(shutdown_signal));

    if let Err(e) = categorizer.run(config) {
        report_error(&e);
    }

    pause(term)?;
    Ok(())
}
