//! Process configuration.
//!
//! The connection defaults suit a local InfluxDB in its stock
//! configuration; everything can be overridden on the command line or
//! through the environment.

use std::path::PathBuf;

pub const DEFAULT_URL: &'static str = "http://localhost:8086";
pub const DEFAULT_USERNAME: &'static str = "root";
pub const DEFAULT_PASSWORD: &'static str = "root";
pub const DEFAULT_DATABASE: &'static str = "its";

/// Where frames come from.
///
/// Exactly one input per process; the two modes are never mixed or switched
/// at runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Read a finite capture file.
    File(PathBuf),
    /// Capture live on a named interface.
    Live(String),
}

/// Everything the bridge needs for one run.
#[derive(Clone, Debug)]
pub struct Config {
    pub input: Input,

    /// Name of the station this bridge records at; written as the
    /// `location` tag of every point.
    pub location: String,

    /// Drop the database before starting.
    pub purge: bool,

    pub influx: InfluxConfig,
}

/// InfluxDB connection settings.
#[derive(Clone, Debug)]
pub struct InfluxConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            username: DEFAULT_USERNAME.to_owned(),
            password: DEFAULT_PASSWORD.to_owned(),
            database: DEFAULT_DATABASE.to_owned(),
        }
    }
}
