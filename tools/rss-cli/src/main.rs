//! RSS-Studio: Reed-Solomon Studio front-end
//!
//! Encode text, push it through a simulated noisy channel and inspect how
//! much of the damage Reed-Solomon parity repairs.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

use rss_cli::domain::parse_rate;
use rss_cli::{App, Command, OutputMode, Setting, ThemeChoice};
use rss_codec::{
    ApiRevision, ChannelType, ErrorType, FilePreferenceStore, HttpCodecService, StudioApi,
    StudioConfig, StudioService, Theme,
};
use rss_telemetry::{init_telemetry, TelemetryConfig};

/// RSS-Studio: Reed-Solomon error-correction studio
#[derive(Parser, Debug)]
#[command(name = "rss-studio", version)]
#[command(about = "Encode, corrupt and repair messages with a Reed-Solomon codec service")]
struct Args {
    /// Codec service base URL (overrides RSS_API_BASE_URL)
    #[arg(short, long, global = true)]
    base_url: Option<String>,

    /// API revision spoken by the service
    #[arg(long, global = true, value_enum)]
    revision: Option<RevisionArg>,

    /// Request timeout in milliseconds (overrides RSS_TIMEOUT_MS)
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Directory holding persisted preferences
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Directory exports are written to
    #[arg(long, global = true)]
    export_dir: Option<PathBuf>,

    /// Emit JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Disable colors
    #[arg(long, global = true)]
    plain: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Mode>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RevisionArg {
    Current,
    Legacy,
}

impl From<RevisionArg> for ApiRevision {
    fn from(arg: RevisionArg) -> Self {
        match arg {
            RevisionArg::Current => ApiRevision::Current,
            RevisionArg::Legacy => ApiRevision::Legacy,
        }
    }
}

/// Channel settings shared by the one-shot commands.
#[derive(clap::Args, Debug)]
struct ChannelArgs {
    /// Parity symbols
    #[arg(short, long)]
    ecc: Option<u32>,

    /// Error rate as a fraction (0.15) or percentage (15%)
    #[arg(short, long, value_parser = parse_rate_arg)]
    rate: Option<f64>,

    /// Noise model (random, burst, erasures)
    #[arg(long)]
    error_type: Option<ErrorType>,

    /// Transmission medium (wireless, wired, satellite, optical)
    #[arg(long)]
    channel: Option<ChannelType>,
}

impl ChannelArgs {
    fn settings(&self) -> Vec<Setting> {
        let mut settings = Vec::new();
        if let Some(ecc) = self.ecc {
            settings.push(Setting::Ecc(ecc));
        }
        if let Some(rate) = self.rate {
            settings.push(Setting::Rate(rate));
        }
        if let Some(kind) = self.error_type {
            settings.push(Setting::ErrorType(kind));
        }
        if let Some(channel) = self.channel {
            settings.push(Setting::Channel(channel));
        }
        settings
    }
}

fn parse_rate_arg(value: &str) -> Result<f64, String> {
    parse_rate(value).map_err(|e| e.to_string())
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Read commands from stdin (default)
    Interactive,
    /// Encode text and print the statistics
    Encode {
        /// Text to encode
        text: String,
        #[command(flatten)]
        channel: ChannelArgs,
    },
    /// Encode text, then simulate transmission
    Simulate {
        /// Text to encode
        text: String,
        #[command(flatten)]
        channel: ChannelArgs,
        /// Also export the simulation result
        #[arg(long)]
        export: bool,
    },
    /// Encode text, then decode it again
    Decode {
        /// Text to encode
        text: String,
        #[command(flatten)]
        channel: ChannelArgs,
        /// Known erasure positions
        #[arg(long, value_delimiter = ',')]
        erasures: Vec<u64>,
    },
    /// Probe the codec service
    Health,
    /// Show or change the theme
    Theme {
        /// light, dark or toggle; omitted prints the current theme
        choice: Option<String>,
    },
}

impl Args {
    fn studio_config(&self) -> Result<StudioConfig> {
        let mut config = StudioConfig::from_env();
        if let Some(url) = &self.base_url {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(revision) = self.revision {
            config.api_revision = revision.into();
        }
        if let Some(ms) = self.timeout_ms {
            config.timeouts.request = Duration::from_millis(ms);
        }
        if let Some(dir) = &self.state_dir {
            config.state_dir = dir.clone();
        }
        if let Some(dir) = &self.export_dir {
            config.export_dir = dir.clone();
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }

    fn output_mode(&self) -> OutputMode {
        if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text { plain: self.plain }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let telemetry = TelemetryConfig::from_env().with_verbosity(args.verbose);
    init_telemetry(&telemetry).context("failed to initialize logging")?;

    let config = args.studio_config()?;
    debug!(base_url = %config.base_url, revision = ?config.api_revision, "starting studio");

    let codec = HttpCodecService::new(config.clone()).context("failed to create codec client")?;
    let preferences = FilePreferenceStore::new(config.preferences_path());
    let studio: Arc<dyn StudioApi> = Arc::new(
        StudioService::new(Arc::new(codec), Arc::new(preferences), config.clone())
            .context("failed to create studio")?,
    );

    let mut app = App::new(studio.clone(), &config, args.output_mode());

    match args.command.unwrap_or(Mode::Interactive) {
        Mode::Interactive => run_interactive(&mut app).await?,
        Mode::Encode { text, channel } => {
            apply_settings(&mut app, &channel).await?;
            println!("{}", app.execute(Command::Encode(text)).await?);
        }
        Mode::Simulate {
            text,
            channel,
            export,
        } => {
            apply_settings(&mut app, &channel).await?;
            println!("{}", app.execute(Command::Encode(text)).await?);
            println!("{}", app.execute(Command::Simulate).await?);
            if export {
                println!("{}", app.execute(Command::Export(None)).await?);
            }
        }
        Mode::Decode {
            text,
            channel,
            erasures,
        } => {
            apply_settings(&mut app, &channel).await?;
            println!("{}", app.execute(Command::Encode(text)).await?);
            let erasures = Some(erasures).filter(|e| !e.is_empty());
            println!("{}", app.execute(Command::Decode(erasures)).await?);
        }
        Mode::Health => println!("{}", app.execute(Command::Health).await?),
        Mode::Theme { choice } => {
            let output = match choice.as_deref() {
                None => studio.theme().to_string(),
                Some("toggle") => app.execute(Command::Theme(ThemeChoice::Toggle)).await?,
                Some(name) => {
                    let theme: Theme = name.parse()?;
                    app.execute(Command::Theme(ThemeChoice::Set(theme))).await?
                }
            };
            println!("{output}");
        }
    }

    Ok(())
}

async fn apply_settings(app: &mut App, channel: &ChannelArgs) -> Result<()> {
    for setting in channel.settings() {
        app.execute(Command::Set(setting)).await?;
    }
    Ok(())
}

async fn run_interactive(app: &mut App) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    println!("Reed-Solomon Studio {} - type `help` for commands", rss_codec::VERSION);

    while !app.should_quit() {
        stdout.write_all(b"rss> ").await?;
        stdout.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let output = app.handle_line(&line).await;
        if !output.is_empty() {
            println!("{output}");
        }
    }

    Ok(())
}
