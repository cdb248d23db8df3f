//! Command-line interface for the wardley utility
//!
//! Decodes strategy map block documents, lays them out and writes the
//! resulting map as JSON for a renderer.

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use tracing::{debug, info};

use crate::colorizer::{format_diagnostics, status_line};
use wardley::core::logging::init_logging;
use wardley::{
    decode_document, layout, route_connectors, DecodeFailure, DecodeOptions, Decoded,
    Diagnostics, EvolutionStage, Grid, JsonDocumentParser, LayoutParams, Map, Size, SizeVariant,
};

/// Wardley - Decode and lay out strategy maps
#[derive(Parser)]
#[command(name = "wardley")]
#[command(about = "Turn strategy map block documents into laid-out map JSON")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error) [default: warn]
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, clap::ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Canvas size overrides; unset fields keep the built-in defaults
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeArgs {
    /// Default map width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Default map height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Default map margin in pixels
    #[arg(long)]
    pub margin: Option<u32>,

    /// Use the compact font size
    #[arg(long)]
    pub compact: bool,
}

impl SizeArgs {
    fn variant(&self) -> SizeVariant {
        if self.compact {
            SizeVariant::Compact
        } else {
            SizeVariant::Standard
        }
    }

    /// The size template a missing or partial size block is filled from
    pub fn size(&self) -> Size {
        let standard = Size::standard(self.variant());
        Size::new(
            self.width.unwrap_or(standard.width),
            self.height.unwrap_or(standard.height),
            self.margin.unwrap_or(standard.margin),
            standard.font_size,
        )
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions::with_variant(self.variant()).with_size_defaults(self.size())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a map document, lay it out and write the map as JSON
    Convert {
        /// Input block document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file for the map JSON (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        size: SizeArgs,

        /// Jitter node positions with this seed
        #[arg(long)]
        jitter_seed: Option<u64>,

        /// Fail on recoverable diagnostics such as dangling connectors
        #[arg(long)]
        strict: bool,

        /// Include routed connector paths in the output
        #[arg(long)]
        routes: bool,

        /// When to use colors in diagnostics
        #[arg(
            long,
            value_enum,
            default_value_t = ColorChoice::Auto
        )]
        color: ColorChoice,
    },

    /// Check a map document and report diagnostics
    Validate {
        /// Input block document (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        size: SizeArgs,

        /// Fail on recoverable diagnostics
        #[arg(long)]
        strict: bool,

        /// When to use colors in diagnostics
        #[arg(
            long,
            value_enum,
            default_value_t = ColorChoice::Auto
        )]
        color: ColorChoice,
    },

    /// Show the evolution stages and where their bands start
    Stages {
        #[command(flatten)]
        size: SizeArgs,

        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// When to colorize diagnostics
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Use colors if stderr is a terminal and NO_COLOR is not set
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorChoice {
    fn should_colorize(&self) -> bool {
        match self {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                std::env::var("NO_COLOR").is_err() && crossterm::tty::IsTty::is_tty(&io::stderr())
            }
        }
    }
}

/// Main CLI application
pub struct WardleyApp {
    parser: JsonDocumentParser,
}

impl WardleyApp {
    /// Create a new application instance
    pub fn new() -> Self {
        Self {
            parser: JsonDocumentParser::new(),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        let log_level = resolve_log_level(
            cli.log_level,
            std::env::var("WARDLEY_LOG_LEVEL").ok(),
            std::env::var("RUST_LOG").ok(),
        );
        let log_format = std::env::var("WARDLEY_LOG_FORMAT")
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("Wardley v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Convert {
                input,
                output,
                size,
                jitter_seed,
                strict,
                routes,
                color,
            } => {
                let content = self.read_input(input)?;
                if cli.verbose {
                    eprintln!("Read {} bytes of input", content.len());
                }
                let options = ConvertOptions {
                    decode: size.decode_options(),
                    layout: LayoutParams { jitter_seed },
                    strict,
                    routes,
                };
                let colorize = color.should_colorize();
                let (map, diagnostics) = self
                    .convert(&content, &options)
                    .map_err(|failure| report_failure(failure, colorize))?;
                report(&diagnostics, colorize);
                let json = map_json(&map, options.routes)?;
                if cli.verbose {
                    eprintln!("Successfully converted map");
                }
                self.write_output(output, &json)
            }
            Commands::Validate {
                input,
                size,
                strict,
                color,
            } => {
                let content = self.read_input(input)?;
                if cli.verbose {
                    eprintln!("Read {} bytes of input", content.len());
                }
                self.validate_command(
                    &content,
                    &size.decode_options(),
                    strict,
                    color.should_colorize(),
                )
            }
            Commands::Stages { size, json } => {
                println!("{}", self.stages_command(&size, json)?);
                Ok(())
            }
        }
    }

    /// Decode and lay out `content`
    pub fn convert(
        &self,
        content: &str,
        options: &ConvertOptions,
    ) -> std::result::Result<(Map, Diagnostics), DecodeFailure> {
        let decoded = self.decode(content, &options.decode, options.strict)?;
        let map = layout(decoded.map, &options.layout);
        info!(
            node_count = map.node_count(),
            connector_count = map.connector_count(),
            "Converted map"
        );
        Ok((map, decoded.diagnostics))
    }

    fn decode(
        &self,
        content: &str,
        options: &DecodeOptions,
        strict: bool,
    ) -> std::result::Result<Decoded, DecodeFailure> {
        debug!(input_len = content.len(), strict, "Decoding document");
        let decoded = decode_document(&self.parser, content, options)?;
        if strict {
            let diagnostics = decoded.diagnostics.clone();
            let map = decoded.strict()?;
            return Ok(Decoded { map, diagnostics });
        }
        Ok(decoded)
    }

    /// Handle the validate command
    fn validate_command(
        &self,
        content: &str,
        options: &DecodeOptions,
        strict: bool,
        colorize: bool,
    ) -> Result<()> {
        match self.decode(content, options, strict) {
            Ok(decoded) => {
                report(&decoded.diagnostics, colorize);
                let message = format!(
                    "Valid map: {} nodes, {} connectors, {} warnings",
                    decoded.map.node_count(),
                    decoded.map.connector_count(),
                    decoded.diagnostics.warnings().count()
                );
                println!("{}", status_line(true, &message, colorize));
                Ok(())
            }
            Err(failure) => {
                let message = format!("Invalid map: {}", failure.error);
                let err = report_failure(failure, colorize);
                println!("{}", status_line(false, &message, colorize));
                Err(err)
            }
        }
    }

    /// Handle the stages command
    fn stages_command(&self, size: &SizeArgs, json: bool) -> Result<String> {
        let grid = Grid::from_size(&size.size());

        if json {
            let stages: Vec<_> = grid
                .band_labels()
                .iter()
                .map(|(stage, origin, label)| {
                    serde_json::json!({
                        "name": stage.to_string(),
                        "label": label,
                        "bandOrigin": origin,
                        "bandWidth": grid.band_width(),
                    })
                })
                .collect();
            let value = serde_json::json!({
                "stages": stages,
                "total": EvolutionStage::ALL.len(),
            });
            return Ok(serde_json::to_string_pretty(&value)?);
        }

        let mut out = String::from("Evolution stages:\n");
        for (stage, origin, label) in grid.band_labels() {
            out.push_str(&format!(
                "  {:<10} {:<22} x = {}\n",
                stage.to_string(),
                label,
                origin
            ));
        }
        out.push_str(&format!("\nBand width: {}", grid.band_width()));
        Ok(out)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

impl Default for WardleyApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Settings for one convert run
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub decode: DecodeOptions,
    pub layout: LayoutParams,
    pub strict: bool,
    pub routes: bool,
}

/// Serialize a laid-out map, optionally with routed connectors under `routes`
pub fn map_json(map: &Map, routes: bool) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(map)?;
    if routes {
        if let serde_json::Value::Object(fields) = &mut value {
            fields.insert(
                "routes".to_string(),
                serde_json::to_value(route_connectors(map))?,
            );
        }
    }
    serde_json::to_string_pretty(&value)
}

/// Pick the log filter: the flag, then `WARDLEY_LOG_LEVEL`, then `RUST_LOG`, then warn
fn resolve_log_level(
    flag: Option<LogLevel>,
    wardley_env: Option<String>,
    rust_log: Option<String>,
) -> String {
    flag.map(|level| level.as_str().to_string())
        .or(wardley_env)
        .or(rust_log)
        .unwrap_or_else(|| LogLevel::Warn.as_str().to_string())
}

fn report(diagnostics: &Diagnostics, colorize: bool) {
    if !diagnostics.is_empty() {
        eprintln!("{}", format_diagnostics(diagnostics, colorize));
    }
}

/// Print a failure's diagnostics and turn it into the command error
fn report_failure(failure: DecodeFailure, colorize: bool) -> anyhow::Error {
    report(&failure.diagnostics, colorize);
    anyhow::Error::new(failure)
}
