//! Configuration management for the mortgage ledger

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::amortization::LoanTerms;
use crate::error::{LedgerError, Result};
use crate::export::DEFAULT_HASH_PREVIEW_LEN;

pub const DEFAULT_CONFIG_FILE: &str = "ledger.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub loan: LoanConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoanConfig {
    #[serde(default = "default_principal")]
    pub principal: f64,
    #[serde(default = "default_rate")]
    pub annual_rate_percent: f64,
    #[serde(default = "default_years")]
    pub years: u32,
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            principal: default_principal(),
            annual_rate_percent: default_rate(),
            years: default_years(),
        }
    }
}

impl LoanConfig {
    pub fn terms(&self) -> LoanTerms {
        LoanTerms {
            principal: self.principal,
            annual_rate_percent: self.annual_rate_percent,
            years: self.years,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_json_path")]
    pub json_path: String,
    #[serde(default = "default_csv_path")]
    pub csv_path: String,
    #[serde(default = "default_hash_preview_len")]
    pub hash_preview_len: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            json_path: default_json_path(),
            csv_path: default_csv_path(),
            hash_preview_len: default_hash_preview_len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: default_api_port(),
        }
    }
}

fn default_principal() -> f64 {
    250_000.0
}

fn default_rate() -> f64 {
    6.5
}

fn default_years() -> u32 {
    30
}

fn default_json_path() -> String {
    "mortgage_blockchain.json".to_string()
}

fn default_csv_path() -> String {
    "mortgage_ledger.csv".to_string()
}

fn default_hash_preview_len() -> usize {
    DEFAULT_HASH_PREVIEW_LEN
}

fn default_api_port() -> u16 {
    3000
}

/// Load `ledger.toml` from the working directory, falling back to defaults
/// when the file is absent.
pub fn load_config() -> Result<Config> {
    load_config_from(Path::new(DEFAULT_CONFIG_FILE))
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        parse_config(&config_str)?
    } else {
        Config::default()
    };

    config.validate()?;
    Ok(config)
}

pub fn parse_config(config_str: &str) -> Result<Config> {
    Ok(toml::from_str(config_str)?)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.loan
            .terms()
            .validate()
            .map_err(|e| LedgerError::ConfigError(format!("[loan] {}", e)))?;

        if self.export.json_path.is_empty() {
            return Err(LedgerError::ConfigError(
                "export.json_path must not be empty".to_string(),
            ));
        }
        if self.export.csv_path.is_empty() {
            return Err(LedgerError::ConfigError(
                "export.csv_path must not be empty".to_string(),
            ));
        }
        if self.export.hash_preview_len == 0 {
            return Err(LedgerError::ConfigError(
                "export.hash_preview_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
