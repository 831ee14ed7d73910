//! Application state management.

use std::path::PathBuf;
use std::sync::Arc;

use rss_codec::{
    domain::validate_error_rate, ChannelType, ErrorType, SimulationParameters, StudioApi,
    StudioConfig, StudioError, ValidationError,
};
use serde::Serialize;

use super::{Command, CommandError, Setting, ThemeChoice};
use crate::ui::{OutputMode, Renderer, HELP};

/// Current simulation controls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Controls {
    /// Parity symbols for the next encode and simulate.
    pub ecc_symbols: u32,
    /// Error rate in [0, 1].
    pub error_rate: f64,
    /// Noise model.
    pub error_type: ErrorType,
    /// Transmission medium.
    pub channel_type: ChannelType,
}

impl Controls {
    /// Controls initialised from configuration defaults.
    pub fn from_config(config: &StudioConfig) -> Self {
        let defaults = &config.defaults;
        Self {
            ecc_symbols: defaults.ecc_symbols,
            error_rate: defaults.error_rate,
            error_type: defaults.error_type,
            channel_type: defaults.channel_type,
        }
    }

    /// Apply a setting, rejecting out-of-range values.
    pub fn apply(&mut self, setting: Setting, max_ecc: u32) -> Result<(), ValidationError> {
        match setting {
            Setting::Ecc(value) if value > max_ecc => {
                return Err(ValidationError::EccSymbolsOutOfRange {
                    value,
                    max: max_ecc,
                })
            }
            Setting::Ecc(value) => self.ecc_symbols = value,
            Setting::Rate(rate) => self.error_rate = validate_error_rate(rate)?,
            Setting::ErrorType(kind) => self.error_type = kind,
            Setting::Channel(channel) => self.channel_type = channel,
        }
        Ok(())
    }

    /// Parameters for the next simulation.
    pub fn parameters(&self) -> SimulationParameters {
        SimulationParameters {
            ecc_symbols: self.ecc_symbols,
            error_rate: self.error_rate,
            error_type: self.error_type,
            channel_type: self.channel_type,
        }
    }
}

/// Application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Accepting commands.
    #[default]
    Running,
    /// Quitting.
    Quit,
}

/// Main application model.
pub struct App {
    studio: Arc<dyn StudioApi>,
    /// Current controls.
    pub controls: Controls,
    renderer: Renderer,
    max_ecc_symbols: u32,
    export_dir: PathBuf,
    state: AppState,
}

impl App {
    /// Create an application over `studio`.
    pub fn new(studio: Arc<dyn StudioApi>, config: &StudioConfig, mode: OutputMode) -> Self {
        let renderer = Renderer::new(mode, studio.theme());
        Self {
            studio,
            controls: Controls::from_config(config),
            renderer,
            max_ecc_symbols: config.max_ecc_symbols,
            export_dir: config.export_dir.clone(),
            state: AppState::Running,
        }
    }

    /// Renderer in use.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Check if the app should quit.
    pub fn should_quit(&self) -> bool {
        self.state == AppState::Quit
    }

    /// Parse and run one line of input, rendering errors instead of returning them.
    pub async fn handle_line(&mut self, line: &str) -> String {
        match line.parse::<Command>() {
            Ok(command) => match self.execute(command).await {
                Ok(output) => output,
                Err(e) => self.renderer.error(e),
            },
            Err(CommandError::Empty) => String::new(),
            Err(e) => self.renderer.error(e),
        }
    }

    /// Run a command and render its result.
    pub async fn execute(&mut self, command: Command) -> Result<String, StudioError> {
        let output = match command {
            Command::Encode(text) => {
                let artifact = self
                    .studio
                    .handle_encode(&text, self.controls.ecc_symbols)
                    .await?;
                self.renderer.artifact(&artifact)
            }
            Command::Simulate => {
                let record = self
                    .studio
                    .handle_simulate(self.controls.parameters())
                    .await?;
                self.renderer.simulation(&record)
            }
            Command::Decode(erasures) => {
                let outcome = self.studio.handle_decode(erasures).await?;
                self.renderer.decode(&outcome)
            }
            Command::Set(setting) => {
                self.controls.apply(setting, self.max_ecc_symbols)?;
                self.renderer.note("controls updated")
            }
            Command::Hex => {
                let preview = self
                    .studio
                    .hex_preview()
                    .ok_or(StudioError::NoEncodedData)?;
                self.renderer.hex(&preview)
            }
            Command::Export(dir) => {
                let dir = dir.unwrap_or_else(|| self.export_dir.clone());
                let path = self.studio.export(&dir)?;
                self.renderer
                    .note(&format!("exported to {}", path.display()))
            }
            Command::Clear => {
                self.studio.clear();
                self.renderer.note("session cleared")
            }
            Command::Theme(choice) => {
                let theme = match choice {
                    ThemeChoice::Toggle => self.studio.toggle_theme()?,
                    ThemeChoice::Set(theme) => self.studio.set_theme(theme)?,
                };
                self.renderer.retheme(theme);
                self.renderer.note(&format!("theme: {theme}"))
            }
            Command::Health => {
                let health = self.studio.check_health().await?;
                self.renderer.health(&health)
            }
            Command::Show => self
                .renderer
                .session(&self.controls, &self.studio.snapshot()),
            Command::Help => HELP.to_string(),
            Command::Quit => {
                self.state = AppState::Quit;
                String::new()
            }
        };
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rss_codec::{
        MemoryPreferenceStore, MockBehavior, MockCodecService, StudioService, Theme,
    };

    fn app(behavior: MockBehavior, export_dir: PathBuf) -> App {
        let config = StudioConfig {
            export_dir,
            ..Default::default()
        };
        let studio = StudioService::new(
            Arc::new(MockCodecService::with_behavior(behavior)),
            Arc::new(MemoryPreferenceStore::default()),
            config.clone(),
        )
        .unwrap();
        App::new(Arc::new(studio), &config, OutputMode::Text { plain: true })
    }

    #[test]
    fn test_controls_apply() {
        let mut controls = Controls::from_config(&StudioConfig::default());
        assert_eq!(controls.ecc_symbols, 10);
        assert_eq!(controls.error_rate, 0.15);

        controls.apply(Setting::Ecc(20), 50).unwrap();
        controls.apply(Setting::Rate(0.4), 50).unwrap();
        assert_eq!(controls.parameters().ecc_symbols, 20);
        assert_eq!(controls.parameters().error_rate, 0.4);

        assert!(controls.apply(Setting::Ecc(51), 50).is_err());
        assert!(controls.apply(Setting::Rate(1.5), 50).is_err());
        assert_eq!(controls.ecc_symbols, 20);
    }

    #[tokio::test]
    async fn test_encode_simulate_export_flow() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(MockBehavior::Unavailable, dir.path().to_path_buf());

        let out = app.handle_line("encode aaaaaaaaaaaaaaaaaaaa").await;
        assert!(out.contains("local approximation"), "{out}");

        app.handle_line("set rate 50%").await;
        let out = app.handle_line("simulate").await;
        assert!(out.contains("status:      partial"), "{out}");

        let out = app.handle_line("export").await;
        assert!(out.starts_with("exported to"), "{out}");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_rendered() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(MockBehavior::Succeed, dir.path().to_path_buf());

        let out = app.handle_line("simulate").await;
        assert!(out.contains("no encoded data"), "{out}");
        let out = app.handle_line("hex").await;
        assert!(out.contains("no encoded data"), "{out}");
        let out = app.handle_line("bogus").await;
        assert!(out.contains("unknown command"), "{out}");
        assert_eq!(app.handle_line("   ").await, "");
    }

    #[tokio::test]
    async fn test_theme_and_quit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app(MockBehavior::Succeed, dir.path().to_path_buf());

        let out = app.handle_line("theme dark").await;
        assert!(out.contains("theme: dark"));
        assert_eq!(app.studio.theme(), Theme::Dark);

        assert!(!app.should_quit());
        app.handle_line("quit").await;
        assert!(app.should_quit());
    }
}
