//! Runtime configuration read from the environment.
//!
//! Every setting has a default so the service starts with no environment at all;
//! each fallback is logged so a misnamed variable is visible in the output.

use log::{info, warn};
use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Font family shipped with the backend package.
const BUNDLED_FONTS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fonts");

#[derive(Debug, Error)]
#[error("invalid value for {key}: {reason}")]
pub struct ConfigError {
    key: &'static str,
    reason: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite file holding the survey records.
    pub db_path: PathBuf,
    /// Directory where uploaded images are written and served from.
    pub upload_dir: PathBuf,
    /// Directory containing the TTF font family used for reports.
    pub fonts_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            host: try_load("SURVEY_HOST", "127.0.0.1")?,
            port: try_load("SURVEY_PORT", "5000")?,
            db_path: try_load("SURVEY_DB_PATH", "schools.sqlite")?,
            upload_dir: try_load("SURVEY_UPLOAD_DIR", "uploads")?,
            fonts_dir: try_load("SURVEY_FONTS_DIR", BUNDLED_FONTS_DIR)?,
        })
    }
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError {
            key,
            reason: e.to_string(),
        }
    })
}
