//! `lcd-hat`: show text on the HAT display, blank it, or log button events.
//!
//! ```text
//! lcd-hat show "Hej Pi!"              # best-fit text, black on white
//! lcd-hat show --theme server 123 kr  # yellow on black
//! lcd-hat show --test-pattern         # colour bars
//! lcd-hat off                         # black frame, backlight off
//! lcd-hat ping                        # border, then colour cycles
//! lcd-hat input                       # log debounced buttons until Ctrl-C
//! lcd-hat --set LCD_PRESET=waveshare144 --print-config
//! ```
//!
//! Settings come from `./lcd.env` (or `--env-file`), then the environment,
//! then `--set KEY=VALUE`. `RUST_LOG` controls verbosity (default `info`).

// Binary crate: user-facing output goes to stdout on purpose.
#![allow(missing_docs, clippy::print_stdout)]

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use lcd_hat::config::{env_file, env_overrides, Config, Resolver, Settings};
use lcd_hat::display::{self, PanelHandle};
use lcd_hat::hardware::{LinuxPanelBackend, LinuxSt7735, RppalGpio};
use lcd_hat::input::{InputSession, LogSink};
use lcd_hat::render::{centered_text, test_pattern, TextTheme};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Message shown when `show` gets no text.
const DEFAULT_MESSAGE: &str = "Hej Pi!";

#[derive(Parser)]
#[command(name = "lcd-hat")]
#[command(about = "ST7735 LCD HAT display and button tool", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (default: ./lcd.env when present)
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Override one setting; may be repeated
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value, global = true)]
    set: Vec<(String, String)>,

    /// Print the resolved configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a message centred on the display
    Show {
        /// Words of the message
        text: Vec<String>,
        /// Show colour bars instead of the message
        #[arg(long)]
        test_pattern: bool,
        /// Colour scheme
        #[arg(long, value_enum, default_value_t = Theme::Hello)]
        theme: Theme,
    },
    /// Blank the display and switch the backlight off
    Off,
    /// Cycle full-screen colours to check wiring and window offset
    Ping,
    /// Log debounced button events until interrupted
    Input,
}

#[derive(Clone, Copy, ValueEnum)]
enum Theme {
    /// Black on white
    Hello,
    /// Yellow on black
    Server,
}

impl From<Theme> for TextTheme {
    fn from(theme: Theme) -> Self {
        match theme {
            Theme::Hello => TextTheme::Hello,
            Theme::Server => TextTheme::Server,
        }
    }
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("`{raw}` is not KEY=VALUE"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("`{raw}` has an empty key"));
    }
    Ok((key.to_owned(), value.trim().to_owned()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.env_file.as_deref(), cli.set)?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    match cli.command {
        Some(Commands::Show {
            text,
            test_pattern,
            theme,
        }) => show(&config, &text.join(" "), test_pattern, theme.into()),
        Some(Commands::Off) => off(&config),
        Some(Commands::Ping) => ping(&config),
        Some(Commands::Input) => input(&config),
        None => show(&config, DEFAULT_MESSAGE, false, TextTheme::Hello),
    }
}

fn load_config(env_file: Option<&Path>, set: Vec<(String, String)>) -> Result<Config> {
    let file = match env_file {
        Some(path) => env_file::load(path)?,
        None => env_file::load_if_present(Path::new(env_file::DEFAULT_FILE_NAME))?.unwrap_or_default(),
    };
    let settings = Resolver::new()
        .with_file(file)
        .with_overrides(env_overrides())
        .with_overrides(set.into_iter().collect::<Settings>())
        .resolve()
        .context("resolving settings")?;
    let config = Config::from_settings(&settings).context("invalid settings")?;
    info!(
        preset = config.display.preset.as_deref().unwrap_or("-"),
        port = config.display.port,
        cs = config.display.cs,
        dc = config.display.dc,
        rst = %config.display.reset,
        bl = %config.display.backlight,
        rot = config.display.rotation.degrees(),
        speed = config.display.speed_hz,
        width = config.display.width,
        height = config.display.height,
        ox = config.display.offset_x,
        oy = config.display.offset_y,
        invert = config.display.invert,
        bl_active_high = config.display.backlight_active_high,
        "configuration"
    );
    Ok(config)
}

fn open_display(config: &Config) -> Result<PanelHandle<LinuxSt7735>> {
    let mut backend = LinuxPanelBackend::open().context("opening display GPIO")?;
    let capabilities = display::probe(&backend);
    let handle = display::init(&mut backend, &config.display, capabilities)?;
    Ok(handle)
}

fn show(config: &Config, message: &str, pattern: bool, theme: TextTheme) -> Result<()> {
    let mut panel = open_display(config)?;
    let message = if message.trim().is_empty() {
        DEFAULT_MESSAGE
    } else {
        message
    };
    let frame = if pattern {
        test_pattern(panel.window())
    } else {
        centered_text(panel.window(), message, theme)
    };
    panel.draw_frame(&frame).context("drawing frame")?;
    info!(tier = %panel.tier(), "frame displayed");
    Ok(())
}

fn off(config: &Config) -> Result<()> {
    let panel = open_display(config)?;
    panel.off().context("blanking display")?;
    info!("display off");
    Ok(())
}

fn ping(config: &Config) -> Result<()> {
    let mut panel = open_display(config)?;
    info!(
        cycles = config.ping.cycles,
        delay_ms = config.ping.delay_ms,
        tier = %panel.tier(),
        "ping"
    );
    let shown = display::ping::run(&mut panel, &config.ping, std::thread::sleep).context("ping frame")?;
    info!(frames = shown, "ping done");
    Ok(())
}

fn input(config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(async {
        let mut gpio = RppalGpio::open()?;
        let mut session = InputSession::start(&mut gpio, &config.input.button_specs())
            .context("starting input session")?
            .with_poll_interval(config.input.poll_interval());
        info!(
            debounce_ms = config.input.debounce_ms,
            active_low = config.input.active_low,
            "watching buttons, Ctrl-C to stop"
        );
        session.run(&mut LogSink::new(), shutdown_signal()).await;
        Ok::<(), anyhow::Error>(())
    })
}

/// Resolves on Ctrl-C or SIGTERM.
fn shutdown_signal() -> impl Future<Output = ()> {
    async {
        let ctrl_c = async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                warn!(%error, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(error) => {
                    warn!(%error, "cannot listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {}
            () = terminate => {}
        }
        info!("shutting down");
    }
}
