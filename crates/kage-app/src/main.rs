use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use kage_capture::{ScreenCapture, XcapCapture};
use kage_config::Config;
use kage_core::DetectionFilter;
use kage_hotkey::{ChordTable, HotkeyListener};
use kage_translator::FallbackChain;
use kage_types::Command;
use kage_ui::{run_overlay, ui_bridge, FontResolver, OverlayRenderer, RenderStyle, RepaintSignal};
use tokio_util::sync::CancellationToken;

use crate::capabilities::Capabilities;
use crate::dispatcher::ChannelDispatcher;
use crate::orchestrator::Orchestrator;
use crate::pipeline::CapturePipeline;

pub mod capabilities;
pub mod dispatcher;
pub mod logging;
pub mod orchestrator;
pub mod pipeline;

#[cfg(test)]
mod tests;

/// Hotkey-driven screen translation overlay
#[derive(Debug, Parser)]
#[command(name = "kage", version, about)]
struct Args {
    /// Config file (defaults to ./config.json when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Print the resolved hotkey table and exit
    #[arg(long)]
    list_hotkeys: bool,

    /// Do not probe the local translation model
    #[arg(long)]
    no_local_model: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(args.log_json);

    let config = Config::load(args.config.as_deref()).context("failed to load configuration")?;
    let table = ChordTable::from_strings(config.hotkeys.bindings())
        .context("invalid hotkey in configuration")?;

    if args.list_hotkeys {
        for binding in table.bindings() {
            println!("{:<16} {}", binding.chord.to_string(), binding.command);
        }
        return Ok(());
    }

    // The GUI loop owns the main thread, so the runtime is built by hand
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("kage-worker")
        .build()
        .context("failed to start async runtime")?;

    let capture: Arc<dyn ScreenCapture> = Arc::new(XcapCapture::new());
    let geometry = capture
        .display_geometry()
        .context("failed to read the primary display")?;

    let capabilities = runtime.block_on(Capabilities::resolve(&config, !args.no_local_model));
    capabilities.log();

    let detector = capabilities::build_detector(&config.ocr)?;
    let script = capabilities::subject_script(&config.ocr.subject_script)?;
    let filter = DetectionFilter::new(config.ocr.min_confidence, script);
    let chain = FallbackChain::new(
        capabilities.primary.clone(),
        capabilities.secondary.clone(),
        config.translator.from_lang.clone(),
        config.translator.to_lang.clone(),
    );
    let pipeline = Arc::new(CapturePipeline::new(capture, detector, filter, chain));

    let fonts = FontResolver::new(
        Arc::clone(&capabilities.font_catalog),
        config.overlay.font_families.clone(),
        config.overlay.font_paths.iter().map(PathBuf::from).collect(),
    );
    let style = RenderStyle {
        box_alpha: config.overlay.box_alpha,
        text_inset: config.overlay.text_inset,
        font_size: config.overlay.font_size,
        ..RenderStyle::default()
    };
    let renderer = OverlayRenderer::new(style, Arc::new(fonts));

    let shutdown = CancellationToken::new();
    let repaint = RepaintSignal::new();
    let (command_tx, commands) = ui_bridge::<Command>(64, repaint.clone());

    let listener = HotkeyListener::spawn(table, ChannelDispatcher::new(command_tx), shutdown.clone())
        .context("failed to start hotkey listener")?;

    let handle = runtime.handle().clone();
    let orchestrator_shutdown = shutdown.clone();
    let orchestrator_repaint = repaint.clone();
    run_overlay(geometry, repaint, move || {
        Orchestrator::new(
            pipeline,
            renderer,
            commands,
            orchestrator_repaint,
            handle,
            orchestrator_shutdown,
        )
    })
    .context("overlay window failed")?;

    listener.shutdown();
    runtime.shutdown_timeout(Duration::from_secs(1));
    tracing::info!("Shut down");
    Ok(())
}
