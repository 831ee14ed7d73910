//! Text rendering for studio results.
//!
//! Every block states where its result came from; fallback results carry a
//! warning line with the reason the remote call failed.

use std::fmt::Write as _;

use rss_codec::{
    DecodeOutcome, DecodeStatus, EncodedArtifact, HexPreview, ResultOrigin, ServiceHealth,
    Session, SimulationRecord, SimulationStatus, Theme,
};
use serde::Serialize;

use crate::domain::Controls;

/// ANSI styling for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    heading: &'static str,
    good: &'static str,
    warn: &'static str,
    bad: &'static str,
    dim: &'static str,
    reset: &'static str,
}

impl Palette {
    /// Colors tuned for the given theme.
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                heading: "\x1b[1;34m",
                good: "\x1b[32m",
                warn: "\x1b[33m",
                bad: "\x1b[31m",
                dim: "\x1b[2m",
                reset: "\x1b[0m",
            },
            Theme::Dark => Self {
                heading: "\x1b[1;96m",
                good: "\x1b[92m",
                warn: "\x1b[93m",
                bad: "\x1b[91m",
                dim: "\x1b[90m",
                reset: "\x1b[0m",
            },
        }
    }

    /// No escape sequences at all.
    pub fn plain() -> Self {
        Self {
            heading: "",
            good: "",
            warn: "",
            bad: "",
            dim: "",
            reset: "",
        }
    }

    fn paint(&self, color: &str, text: impl std::fmt::Display) -> String {
        format!("{color}{text}{}", self.reset)
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text, colored unless `plain`.
    Text {
        /// Suppress ANSI colors.
        plain: bool,
    },
    /// Pretty JSON documents.
    Json,
}

/// Turns studio results into printable text.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    mode: OutputMode,
    palette: Palette,
}

impl Renderer {
    /// Renderer for `mode` using the colors of `theme`.
    pub fn new(mode: OutputMode, theme: Theme) -> Self {
        let palette = match mode {
            OutputMode::Text { plain: false } => Palette::for_theme(theme),
            _ => Palette::plain(),
        };
        Self { mode, palette }
    }

    /// Switch colors after a theme change.
    pub fn retheme(&mut self, theme: Theme) {
        *self = Self::new(self.mode, theme);
    }

    fn json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
    }

    fn origin_line(&self, out: &mut String, origin: &ResultOrigin) {
        match origin {
            ResultOrigin::Remote => {
                let origin = self.palette.paint(self.palette.good, "remote");
                let _ = writeln!(out, "  origin:      {origin}");
            }
            ResultOrigin::LocalFallback { reason } => {
                let _ = writeln!(
                    out,
                    "  origin:      {}",
                    self.palette.paint(self.palette.warn, "local approximation")
                );
                let reason = self.palette.paint(self.palette.dim, reason);
                let _ = writeln!(out, "  reason:      {reason}");
            }
        }
    }

    /// Encoding statistics.
    pub fn artifact(&self, artifact: &EncodedArtifact) -> String {
        if self.mode == OutputMode::Json {
            return Self::json(artifact);
        }
        let r = &artifact.result;
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.palette.paint(self.palette.heading, "Encoded"));
        self.origin_line(&mut out, &artifact.origin);
        let _ = writeln!(out, "  original:    {} bytes", r.original_length_bytes);
        let _ = writeln!(out, "  encoded:     {} bytes", r.encoded_length_bytes);
        let _ = writeln!(
            out,
            "  parity:      {} bytes ({} ecc symbols)",
            r.parity_bytes, artifact.ecc_symbols
        );
        let _ = writeln!(out, "  overhead:    {:.2}%", r.overhead_percentage);
        let _ = write!(out, "  payload:     {}", r.encoded_payload);
        out
    }

    /// Simulation outcome.
    pub fn simulation(&self, record: &SimulationRecord) -> String {
        if self.mode == OutputMode::Json {
            return Self::json(record);
        }
        let r = &record.result;
        let status_color = match r.status {
            SimulationStatus::Success => self.palette.good,
            SimulationStatus::Partial => self.palette.warn,
            SimulationStatus::Failure => self.palette.bad,
        };
        let positions = if r.error_positions.is_empty() {
            "none".to_string()
        } else {
            r.error_positions
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.palette.paint(self.palette.heading, "Simulation"));
        self.origin_line(&mut out, &record.origin);
        let _ = writeln!(
            out,
            "  channel:     {} / {} errors at {:.0}%",
            record.parameters.channel_type,
            record.parameters.error_type,
            record.parameters.error_rate * 100.0
        );
        let _ = writeln!(out, "  status:      {}", self.palette.paint(status_color, r.status));
        let _ = writeln!(out, "  success:     {:.2}%", r.success_rate_percent);
        let _ = writeln!(out, "  introduced:  {}", r.errors_introduced);
        let _ = writeln!(out, "  corrected:   {}", r.errors_corrected);
        let _ = writeln!(out, "  remaining:   {}", r.errors_remaining);
        let _ = writeln!(out, "  capacity:    {}", r.max_correctable);
        let _ = write!(out, "  positions:   {positions}");
        out
    }

    /// Decode outcome.
    pub fn decode(&self, outcome: &DecodeOutcome) -> String {
        if self.mode == OutputMode::Json {
            return Self::json(outcome);
        }
        let r = &outcome.result;
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.palette.paint(self.palette.heading, "Decoded"));
        self.origin_line(&mut out, &outcome.origin);
        match r.status {
            DecodeStatus::Success => {
                let _ = writeln!(out, "  text:        {}", r.text);
                let _ = writeln!(out, "  length:      {} bytes", r.length_bytes);
                let _ = writeln!(out, "  corrected:   {}", r.errors_corrected);
                let _ = write!(out, "  corrupted:   {}", r.was_corrupted);
            }
            DecodeStatus::Uncorrectable => {
                let status = self.palette.paint(self.palette.bad, "uncorrectable");
                let _ = writeln!(out, "  status:      {status}");
                let _ = write!(out, "  capacity:    {} errors", r.max_correctable);
            }
        }
        out
    }

    /// Hex preview.
    pub fn hex(&self, preview: &HexPreview) -> String {
        if self.mode == OutputMode::Json {
            return Self::json(preview);
        }
        let suffix = if preview.truncated { " ..." } else { "" };
        format!("{}{}", preview.hex, self.palette.paint(self.palette.dim, suffix))
    }

    /// Health report.
    pub fn health(&self, health: &ServiceHealth) -> String {
        if self.mode == OutputMode::Json {
            return Self::json(health);
        }
        let color = if health.is_healthy() {
            self.palette.good
        } else {
            self.palette.warn
        };
        let mut line = format!("service: {}", self.palette.paint(color, &health.status));
        if let Some(name) = &health.service {
            let _ = write!(line, " ({name}");
            if let Some(version) = &health.version {
                let _ = write!(line, " {version}");
            }
            line.push(')');
        }
        line
    }

    /// Controls plus a summary of the session.
    pub fn session(&self, controls: &Controls, session: &Session) -> String {
        if self.mode == OutputMode::Json {
            return Self::json(&serde_json::json!({
                "controls": controls,
                "theme": session.theme(),
                "encoded": session.encoded(),
                "simulation": session.simulation(),
            }));
        }
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.palette.paint(self.palette.heading, "Controls"));
        let _ = writeln!(out, "  ecc:         {}", controls.ecc_symbols);
        let _ = writeln!(out, "  rate:        {:.0}%", controls.error_rate * 100.0);
        let _ = writeln!(out, "  error type:  {}", controls.error_type);
        let _ = writeln!(out, "  channel:     {}", controls.channel_type);
        let _ = writeln!(out, "  theme:       {}", session.theme());
        match session.encoded() {
            Some(a) => {
                let _ = writeln!(
                    out,
                    "  artifact:    {:?} ({} bytes)",
                    a.source_text, a.result.encoded_length_bytes
                );
            }
            None => {
                let none = self.palette.paint(self.palette.dim, "none");
                let _ = writeln!(out, "  artifact:    {none}");
            }
        }
        match session.simulation() {
            Some(s) => {
                let _ = write!(
                    out,
                    "  simulation:  {} ({:.2}%)",
                    s.result.status, s.result.success_rate_percent
                );
            }
            None => {
                let none = self.palette.paint(self.palette.dim, "none");
                let _ = write!(out, "  simulation:  {none}");
            }
        }
        out
    }

    /// Informational one-liner.
    pub fn note(&self, message: &str) -> String {
        if self.mode == OutputMode::Json {
            return Self::json(&serde_json::json!({ "message": message }));
        }
        self.palette.paint(self.palette.dim, message)
    }

    /// Error one-liner.
    pub fn error(&self, message: impl std::fmt::Display) -> String {
        if self.mode == OutputMode::Json {
            return Self::json(&serde_json::json!({ "error": message.to_string() }));
        }
        format!("{} {message}", self.palette.paint(self.palette.bad, "error:"))
    }
}

/// Interactive command reference.
pub const HELP: &str = "\
commands:
  encode <text>              encode text with the current ecc setting
  simulate                   send the current artifact through the channel
  decode [pos,pos,...]       decode the current artifact (optional erasures)
  set ecc <n>                parity symbols
  set rate <0..1 | n%>       error rate
  set error-type <random|burst|erasures>
  set channel <wireless|wired|satellite|optical>
  hex                        hex preview of the encoded payload
  export [dir]               write the current simulation as JSON
  clear                      drop the current artifact and simulation
  theme [light|dark|toggle]  change the color theme
  health                     probe the codec service
  show                       controls and session summary
  quit                       leave";
