//! Bridge configuration parsing from bridge.toml files

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::session::AgentSession;
use crate::transport::{ApiClient, RconClient, TransportError};
use crate::wire::{console, http, ConsoleRenderer, HttpRenderer, WireFormat};

/// RCON connection section
#[derive(Debug, Clone, Deserialize)]
pub struct RconConfig {
    #[serde(default = "default_rcon_host")]
    pub host: String,
    #[serde(default = "default_rcon_port")]
    pub port: u16,
    #[serde(default)]
    pub password: String,
    /// Remote interface name registered by the scenario
    #[serde(default = "default_handler")]
    pub handler: String,
    /// Interface that receives `reset` and `execute_steps`
    #[serde(default = "default_control_handler")]
    pub control_handler: String,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    #[serde(default = "default_rcon_timeout")]
    pub timeout_secs: u64,
}

impl Default for RconConfig {
    fn default() -> Self {
        Self {
            host: default_rcon_host(),
            port: default_rcon_port(),
            password: String::new(),
            handler: default_handler(),
            control_handler: default_control_handler(),
            command_prefix: default_command_prefix(),
            timeout_secs: default_rcon_timeout(),
        }
    }
}

/// HTTP API section
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_actions_path")]
    pub actions_path: String,
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            actions_path: default_actions_path(),
            timeout_secs: default_http_timeout(),
        }
    }
}

/// Bridge configuration from bridge.toml
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Agent whose queue this bridge drives
    #[serde(default = "default_agent_id")]
    pub agent_id: u32,
    /// Wire format used for flushes ("console" or "http")
    #[serde(default)]
    pub format: WireFormat,
    /// Search radius for world snapshots
    #[serde(default = "default_radius")]
    pub radius: u32,
    #[serde(default)]
    pub rcon: RconConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            agent_id: default_agent_id(),
            format: WireFormat::default(),
            radius: default_radius(),
            rcon: RconConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

fn default_agent_id() -> u32 {
    1
}

fn default_radius() -> u32 {
    150
}

fn default_rcon_host() -> String {
    "127.0.0.1".to_string()
}

fn default_rcon_port() -> u16 {
    27015
}

fn default_handler() -> String {
    console::DEFAULT_HANDLER.to_string()
}

fn default_control_handler() -> String {
    console::DEFAULT_CONTROL_HANDLER.to_string()
}

fn default_command_prefix() -> String {
    console::DEFAULT_COMMAND_PREFIX.to_string()
}

fn default_rcon_timeout() -> u64 {
    10
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_actions_path() -> String {
    http::DEFAULT_ACTIONS_PATH.to_string()
}

fn default_http_timeout() -> u64 {
    30
}

impl BridgeConfig {
    /// Load bridge configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn console_renderer(&self) -> ConsoleRenderer {
        ConsoleRenderer {
            command_prefix: self.rcon.command_prefix.clone(),
            handler: self.rcon.handler.clone(),
            control_handler: self.rcon.control_handler.clone(),
        }
    }

    pub fn http_renderer(&self) -> HttpRenderer {
        HttpRenderer {
            actions_path: self.http.actions_path.clone(),
        }
    }

    /// Open the configured transport and wrap it in a session
    pub fn connect(&self) -> Result<AgentSession, TransportError> {
        match self.format {
            WireFormat::Console => {
                let client = RconClient::connect(
                    (self.rcon.host.as_str(), self.rcon.port),
                    &self.rcon.password,
                    Duration::from_secs(self.rcon.timeout_secs),
                )?;
                Ok(AgentSession::console(
                    self.agent_id,
                    self.console_renderer(),
                    client,
                ))
            }
            WireFormat::Http => {
                let client = ApiClient::new(
                    &self.http.base_url,
                    Duration::from_secs(self.http.timeout_secs),
                )?;
                Ok(AgentSession::http(self.agent_id, self.http_renderer(), client))
            }
        }
    }
}

/// Errors that can occur when loading bridge configuration
#[derive(Debug)]
pub enum ConfigError {
    IoError(std::path::PathBuf, std::io::Error),
    ParseError(std::path::PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, e) => {
                write!(f, "Failed to read {}: {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
