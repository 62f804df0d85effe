use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;
use wayfinder_core::NodeSelection;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Command line flags; any flag given overrides the config file
#[derive(Parser, Debug, Default)]
#[command(name = "wayfinder-server", version, about = "Indoor wayfinding HTTP service")]
pub struct Args {
    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Directory holding edges.csv and locations.csv
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    #[arg(long)]
    pub max_concurrent_requests: Option<usize>,

    /// Frontier strategy: linear_scan or binary_heap
    #[arg(long, value_parser = parse_selection)]
    pub selection: Option<NodeSelection>,
}

pub fn parse_selection(value: &str) -> Result<NodeSelection, String> {
    match value {
        "linear_scan" | "linear" => Ok(NodeSelection::LinearScan),
        "binary_heap" | "heap" => Ok(NodeSelection::BinaryHeap),
        other => Err(format!(
            "unknown selection `{other}`, expected linear_scan or binary_heap"
        )),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub data_dir: PathBuf,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    /// Allow any origin, method and header
    pub permissive_cors: bool,
    pub selection: NodeSelection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            data_dir: PathBuf::from("data"),
            request_timeout_secs: 10,
            max_concurrent_requests: 64,
            permissive_cors: true,
            selection: NodeSelection::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&source)
    }

    /// Config file (or defaults) with command line overrides applied
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(bind) = args.bind {
            config.bind = bind;
        }
        if let Some(data_dir) = &args.data_dir {
            config.data_dir.clone_from(data_dir);
        }
        if let Some(secs) = args.request_timeout_secs {
            config.request_timeout_secs = secs;
        }
        if let Some(limit) = args.max_concurrent_requests {
            config.max_concurrent_requests = limit;
        }
        if let Some(selection) = args.selection {
            config.selection = selection;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_requests must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
