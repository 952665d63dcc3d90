//! CLI configuration from environment.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use geoone_core::PlannerConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub planner: PlannerConfig,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Emit logs as JSON lines instead of plain text
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            planner: PlannerConfig::default(),
            pretty: true,
            log_json: false,
        }
    }
}

impl Config {
    /// Reads `GEOONE_CONFIG`, `GEOONE_PRETTY` and `GEOONE_LOG_JSON`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(
            env::var("GEOONE_CONFIG").ok().map(PathBuf::from),
            env::var("GEOONE_PRETTY").ok(),
            env::var("GEOONE_LOG_JSON").ok(),
        )
    }

    pub fn from_vars(
        config_path: Option<PathBuf>,
        pretty: Option<String>,
        log_json: Option<String>,
    ) -> Result<Self> {
        let planner = match config_path {
            Some(path) => {
                let raw = fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                PlannerConfig::from_json_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => PlannerConfig::default(),
        };

        Ok(Self {
            planner,
            pretty: pretty.as_deref().and_then(parse_flag).unwrap_or(true),
            log_json: log_json.as_deref().and_then(parse_flag).unwrap_or(false),
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
