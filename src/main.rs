//! Application entry point for the Teachable Machine.
//!
//! # Startup sequence
//!
//! 1. Initialise logging and parse the command line.
//! 2. Load [`AppConfig`] (defaults on first run) and apply CLI overrides.
//!    `--save-config` writes it back and exits here.
//! 3. Create the [`tokio`] runtime and the Ctrl-C [`Interrupt`].
//! 4. Check that camera support is compiled in (not needed for `--testui`),
//!    then resolve the board; an unsupported platform is fatal.
//! 5. Open the GPIO session and the board UI, run the LED self test.
//! 6. `--testui`: mirror buttons onto LEDs until interrupted, exit 1.
//! 7. Load the embedding model; a missing model is fatal.
//! 8. Run the camera pipeline into the [`TeachableMachine`] on a blocking
//!    thread until the shutdown chord, end of stream, an error or Ctrl-C.
//! 9. Closing LED sequence; exit 0 only after the shutdown chord.

use std::process::ExitCode;

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;

use teachable_machine::{
    camera::{self, FrameSource},
    cli::Cli,
    config::{AppConfig, AppPaths},
    engine::{KnnEmbeddingEngine, TractEmbedder},
    interrupt::Interrupt,
    machine::TeachableMachine,
    ui::{resolve_board, Board, HardwareUi},
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

fn load_config(cli: &Cli) -> AppConfig {
    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if let Some(model) = &cli.model {
        config.model.path = Some(model.clone());
    }
    config
}

fn save_config(cli: &Cli, config: &AppConfig) -> Result<()> {
    match &cli.config {
        Some(path) => {
            config.save_to(path)?;
            log::info!("Settings written to {}", path.display());
        }
        None => {
            config.save()?;
            log::info!("Settings written to {}", AppPaths::new().settings_file.display());
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Board bring-up
// ---------------------------------------------------------------------------

#[cfg(feature = "raspberry")]
async fn run_raspberry(cli: Cli, config: AppConfig, interrupt: Interrupt) -> Result<bool> {
    use teachable_machine::ui::{GpioSession, RaspberryUi};

    let session = GpioSession::open().context("failed to open GPIO")?;
    let ui = RaspberryUi::new(&session, &config.board)?;
    let clean = run_with_ui(ui, cli, config, interrupt).await;
    drop(session);
    clean
}

#[cfg(not(feature = "raspberry"))]
async fn run_raspberry(_cli: Cli, _config: AppConfig, _interrupt: Interrupt) -> Result<bool> {
    Err(teachable_machine::ui::UiError::NotCompiled {
        board: "Raspberry Pi",
        feature: "raspberry",
    }
    .into())
}

// ---------------------------------------------------------------------------
// Main flow
// ---------------------------------------------------------------------------

/// Everything after the board is up.  Returns `true` on a clean shutdown.
async fn run_with_ui<U>(ui: U, cli: Cli, config: AppConfig, interrupt: Interrupt) -> Result<bool>
where
    U: HardwareUi + Send + 'static,
{
    let mut ui = tokio::task::spawn_blocking(move || {
        let mut ui = ui;
        ui.wiggle(3);
        ui
    })
    .await?;

    if cli.testui {
        log::info!("Testing buttons; Ctrl-C to stop");
        tokio::task::spawn_blocking(move || ui.test_buttons(&interrupt)).await?;
        return Ok(false);
    }

    log::info!("Initialize Model...");
    let model_path = config
        .model
        .path
        .as_deref()
        .map(|p| AppPaths::new().resolve_model(p))
        .context("no model given (use --model or set model.path in settings.toml)")?;
    if !model_path.is_file() {
        bail!("model file not found: {}", model_path.display());
    }
    ensure!(config.model.k > 0, "model.k must be at least 1");
    ensure!(
        config.machine.buffer_length > 0 && config.machine.fps_window > 0,
        "machine.buffer_length and machine.fps_window must be at least 1"
    );

    let embedder = TractEmbedder::load(&model_path, &config.model)?;
    let engine = KnnEmbeddingEngine::new(embedder, config.model.k);
    let mut machine = TeachableMachine::new(engine, ui, &config.machine);

    log::info!("Start Pipeline.");
    let camera_config = config.camera.clone();
    let (machine, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = camera::open(&camera_config)
            .and_then(|mut source| source.run(&mut machine, &interrupt));
        (machine, outcome)
    })
    .await?;

    match outcome {
        Ok(reason) => log::info!("Pipeline stopped ({reason:?})"),
        Err(e) => log::error!("Pipeline failed: {e}"),
    }

    let clean = machine.clean_shutdown();
    let mut ui = machine.into_ui();
    tokio::task::spawn_blocking(move || ui.wiggle(4)).await?;
    Ok(clean)
}

async fn run(cli: Cli, config: AppConfig) -> Result<bool> {
    let interrupt = Interrupt::new();
    {
        let interrupt = interrupt.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupted");
                interrupt.trigger();
            }
        });
    }

    if !cli.testui {
        camera::ensure_supported()?;
    }

    log::info!("Initialize UI.");
    match resolve_board(config.board.kind)? {
        Board::Raspberry => run_raspberry(cli, config, interrupt).await,
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    log::info!("Teachable Machine starting up");

    // 2. Configuration
    let config = load_config(&cli);
    if cli.save_config {
        return match save_config(&cli, &config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("failed to save settings: {e:#}");
                ExitCode::FAILURE
            }
        };
    }

    // 3. Tokio runtime (2 workers: the frame loop and the signal task)
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli, config)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
