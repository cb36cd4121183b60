// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agent Configuration Types
//
// Defines the configuration schema for fleet endpoint agents, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Manager endpoint, request timeout and credential key origin
// - Identity overrides (hostname, group, group delimiter)
// - Heartbeat cadence and remote shutdown behaviour
// - Credential store backend selection
// - Observability settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use super::identity::{self, IdentityContext, DEFAULT_GROUP_DELIMITER};
use super::registration::KeyOrigin;

pub const API_VERSION: &str = "fleet-agent/v1";
pub const KIND: &str = "AgentConfig";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "FLEET_AGENT_CONFIG_PATH";

pub type AgentConfig = AgentConfigManifest;

/// Top-level Kubernetes-style agent configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfigManifest {
    /// API version (must be "fleet-agent/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "AgentConfig")
    pub kind: String,

    /// Agent metadata (name, labels)
    pub metadata: ManifestMetadata,

    /// Agent configuration specification
    #[serde(default)]
    pub spec: AgentConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Human-readable agent name
    pub name: String,

    /// Optional: Labels for categorization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Agent configuration specification (content under spec:)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfigSpec {
    #[serde(default)]
    pub manager: ManagerConfig,

    #[serde(default)]
    pub identity: IdentityConfig,

    #[serde(default)]
    pub heartbeat: HeartbeatConfig,

    #[serde(default)]
    pub shutdown: ShutdownConfig,

    #[serde(default)]
    pub credential_store: CredentialStoreConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub autostart: AutostartConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Base URL of the manager API; `register` and `heartbeat` are joined onto it
    #[serde(default = "default_manager_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds (independent of the heartbeat interval)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Whether the manager or the agent mints the credential
    #[serde(default)]
    pub key_origin: KeyOrigin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Hostname override (default: OS hostname)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Group override (default: derived from hostname)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Delimiter used to derive the group from the hostname
    #[serde(default = "default_group_delimiter")]
    pub group_delimiter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartbeatConfig {
    /// Seconds between cycles
    #[serde(default = "default_heartbeat")]
    pub interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShutdownConfig {
    /// Delay handed to the OS shutdown command
    #[serde(default = "default_shutdown_delay")]
    pub delay_seconds: u64,

    /// Message attached to the OS shutdown request
    #[serde(default = "default_shutdown_message")]
    pub message: String,

    /// Title of the desktop notification shown before shutdown
    #[serde(default = "default_notification_title")]
    pub notification_title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialBackend {
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialStoreConfig {
    #[serde(default = "default_backend")]
    pub backend: CredentialBackend,

    /// File backend path (default: platform data directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Keyring service name
    #[serde(default = "default_keyring_service")]
    pub service: String,

    /// Keyring entry (user) name
    #[serde(default = "default_keyring_entry")]
    pub entry: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutostartConfig {
    /// Register the agent to start on boot when `run` starts
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_manager_endpoint() -> String {
    "http://127.0.0.1:23456/api/manager".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_group_delimiter() -> String {
    DEFAULT_GROUP_DELIMITER.to_string()
}

fn default_heartbeat() -> u64 {
    10
}

fn default_shutdown_delay() -> u64 {
    60
}

fn default_shutdown_message() -> String {
    "Remote shutdown initiated by the manager.".to_string()
}

fn default_notification_title() -> String {
    "Remote Shutdown".to_string()
}

fn default_backend() -> CredentialBackend {
    CredentialBackend::File
}

fn default_keyring_service() -> String {
    "fleet-agent".to_string()
}

fn default_keyring_entry() -> String {
    "agent-key".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_manager_endpoint(),
            timeout_seconds: default_timeout(),
            key_origin: KeyOrigin::default(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            hostname: None,
            group: None,
            group_delimiter: default_group_delimiter(),
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_heartbeat(),
        }
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            delay_seconds: default_shutdown_delay(),
            message: default_shutdown_message(),
            notification_title: default_notification_title(),
        }
    }
}

impl Default for CredentialStoreConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
            service: default_keyring_service(),
            entry: default_keyring_entry(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for AgentConfigManifest {
    fn default() -> Self {
        let hostname = identity::system_hostname().unwrap_or_else(|| "fleet-agent".to_string());

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: hostname,
                labels: None,
            },
            spec: AgentConfigSpec::default(),
        }
    }
}

impl ManagerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl HeartbeatConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}

impl CredentialStoreConfig {
    /// Path used by the file backend.
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(default_credential_path)
    }
}

/// Platform default location for the persisted credential.
pub fn default_credential_path() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        Some(PathBuf::from("C:\\ProgramData\\FleetAgent\\agent.key"))
    }

    #[cfg(unix)]
    {
        let uid = unsafe { libc::geteuid() };
        if uid == 0 {
            Some(PathBuf::from("/var/lib/fleet-agent/agent.key"))
        } else {
            dirs::data_local_dir().map(|dir| dir.join("fleet-agent").join("agent.key"))
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        dirs::data_local_dir().map(|dir| dir.join("fleet-agent").join("agent.key"))
    }
}

impl AgentConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Candidate config locations, in precedence order (excluding `--config`).
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            paths.push(PathBuf::from(path));
        }

        paths.push(PathBuf::from("./fleet-agent.yaml"));

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".fleet-agent").join("config.yaml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/fleet-agent/config.yaml"));
        #[cfg(windows)]
        paths.push(PathBuf::from("C:\\ProgramData\\FleetAgent\\config.yaml"));

        paths
    }

    /// Discover configuration file using precedence order
    /// 1. FLEET_AGENT_CONFIG_PATH environment variable
    /// 2. ./fleet-agent.yaml (working directory)
    /// 3. ~/.fleet-agent/config.yaml (user home)
    /// 4. /etc/fleet-agent/config.yaml (Unix) or C:\ProgramData\FleetAgent\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|path| path.exists())
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // 1. Explicit CLI path (Fail if missing/invalid)
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        // 2. Discovery (Env -> Cwd -> Home -> System)
        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("FLEET_AGENT_MANAGER_ENDPOINT") {
            tracing::info!("Environment override: FLEET_AGENT_MANAGER_ENDPOINT={}", val);
            self.spec.manager.endpoint = val;
        }

        if let Some(val) = lookup("FLEET_AGENT_GROUP") {
            tracing::info!("Environment override: FLEET_AGENT_GROUP={}", val);
            self.spec.identity.group = Some(val);
        }

        if let Some(val) = lookup("FLEET_AGENT_HEARTBEAT_INTERVAL") {
            match val.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => {
                    tracing::info!("Environment override: FLEET_AGENT_HEARTBEAT_INTERVAL={}", secs);
                    self.spec.heartbeat.interval_seconds = secs;
                }
                _ => tracing::warn!(
                    "Invalid value for FLEET_AGENT_HEARTBEAT_INTERVAL: '{}'. Expected positive seconds. Ignoring.",
                    val
                ),
            }
        }

        if let Some(val) = lookup("FLEET_AGENT_SHUTDOWN_DELAY") {
            match val.trim().parse::<u64>() {
                Ok(secs) => {
                    tracing::info!("Environment override: FLEET_AGENT_SHUTDOWN_DELAY={}", secs);
                    self.spec.shutdown.delay_seconds = secs;
                }
                Err(_) => tracing::warn!(
                    "Invalid value for FLEET_AGENT_SHUTDOWN_DELAY: '{}'. Expected seconds. Ignoring.",
                    val
                ),
            }
        }

        if let Some(val) = lookup("FLEET_AGENT_KEY_ORIGIN") {
            match val.parse::<KeyOrigin>() {
                Ok(origin) => {
                    tracing::info!("Environment override: FLEET_AGENT_KEY_ORIGIN={}", origin);
                    self.spec.manager.key_origin = origin;
                }
                Err(e) => tracing::warn!("Invalid value for FLEET_AGENT_KEY_ORIGIN: {}. Ignoring.", e),
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        self.manager_url()?;

        if self.spec.manager.timeout_seconds == 0 {
            anyhow::bail!("spec.manager.timeout_seconds must be greater than zero");
        }

        if self.spec.heartbeat.interval_seconds == 0 {
            anyhow::bail!("spec.heartbeat.interval_seconds must be greater than zero");
        }

        if self.spec.identity.group_delimiter.is_empty() {
            anyhow::bail!("spec.identity.group_delimiter cannot be empty");
        }

        if let Some(group) = &self.spec.identity.group {
            if group.trim().is_empty() {
                anyhow::bail!("spec.identity.group cannot be blank when set");
            }
        }

        let store = &self.spec.credential_store;
        match store.backend {
            CredentialBackend::Keyring => {
                if store.service.is_empty() || store.entry.is_empty() {
                    anyhow::bail!("Keyring credential store requires non-empty service and entry");
                }
            }
            CredentialBackend::File => {
                if store.resolved_path().is_none() {
                    anyhow::bail!(
                        "File credential store has no path and no platform default could be determined"
                    );
                }
            }
            CredentialBackend::Memory => {}
        }

        Ok(())
    }

    /// Parsed manager base URL (http or https only).
    pub fn manager_url(&self) -> anyhow::Result<Url> {
        let url = Url::parse(&self.spec.manager.endpoint).map_err(|e| {
            anyhow::anyhow!("Invalid manager endpoint '{}': {}", self.spec.manager.endpoint, e)
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!(
                "Manager endpoint must use http or https, got '{}'",
                url.scheme()
            );
        }

        Ok(url)
    }

    /// Resolve the process identity: configured hostname or the OS hostname,
    /// configured group or one derived from the hostname.
    pub fn identity(&self) -> anyhow::Result<IdentityContext> {
        let endpoint = self.manager_url()?;
        let ident = &self.spec.identity;

        let hostname = ident
            .hostname
            .clone()
            .or_else(identity::system_hostname)
            .ok_or_else(|| anyhow::anyhow!("Could not determine hostname; set spec.identity.hostname"))?;

        Ok(match &ident.group {
            Some(group) => IdentityContext::new(hostname, group.trim(), endpoint),
            None => IdentityContext::with_derived_group(hostname, &ident.group_delimiter, endpoint),
        })
    }
}
