use anyhow::Context;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// How controller credentials are used after login
#[derive(Clone, PartialEq, Eq)]
pub enum AuthMode {
    /// The operator's own credentials are used for every call
    Single,
    /// The operator's credentials only prove identity; all controller calls
    /// run under this write credential
    Dual { username: String, password: String },
}

impl AuthMode {
    pub fn from_parts(mode: &str, username: Option<String>, password: Option<String>) -> anyhow::Result<Self> {
        match mode {
            "SINGLEAUTH" => Ok(AuthMode::Single),
            "MULTIAUTH" => match (username, password) {
                (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => {
                    Ok(AuthMode::Dual { username: u, password: p })
                }
                _ => anyhow::bail!(
                    "If multiple authentication is enabled, then DNA center credentials must be provided via DNAC_USER and DNAC_PASS environment variables."
                ),
            },
            other => anyhow::bail!("Unknown APP_MODE '{}': expected SINGLEAUTH or MULTIAUTH", other),
        }
    }
}

impl std::fmt::Debug for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthMode::Single => f.write_str("Single"),
            AuthMode::Dual { username, .. } => f.debug_struct("Dual").field("username", username).finish_non_exhaustive(),
        }
    }
}

/// A selectable controller
#[derive(Debug, Clone, Deserialize)]
pub struct ServerEntry {
    pub address: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl ServerEntry {
    pub fn base_url(&self) -> String {
        format!("https://{}", self.address.trim_end_matches('/'))
    }
}

/// Project holding the provisioning templates, and the template name prefix
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSettings {
    pub project: String,
    pub template: String,
}

/// Contents of the server file (`dna-servers.yaml`)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerCatalog {
    pub servers: BTreeMap<String, ServerEntry>,
    pub templates: TemplateSettings,
}

impl ServerCatalog {
    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let catalog: Self = serde_yaml::from_str(text).context("Error loading server file")?;
        if catalog.servers.is_empty() {
            anyhow::bail!("Server file lists no servers");
        }
        Ok(catalog)
    }
}

/// Config holds all application configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub customer_name: String,
    pub auth_mode: AuthMode,
    pub servers_file: String,
    pub config_templates_dir: PathBuf,
    pub settle_delay: Duration,
    pub session_idle: Duration,
    pub verify_tls: bool,
    pub frontend_dir: String,
    pub jwt_secret: String,
    pub catalog: ServerCatalog,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> anyhow::Result<Self> {
        let auth_mode = AuthMode::from_parts(
            &get_env("APP_MODE", "SINGLEAUTH"),
            env::var("DNAC_USER").ok(),
            env::var("DNAC_PASS").ok(),
        )?;

        let servers_file = get_env("SERVERS_FILE", "./dna-servers.yaml");
        let text = std::fs::read_to_string(&servers_file)
            .with_context(|| format!("Failed to read {}", servers_file))?;
        let catalog = ServerCatalog::from_yaml(&text)?;

        Ok(Self {
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            customer_name: get_env("CUSTOMER_NAME", "Cisco Catalyst Center"),
            auth_mode,
            servers_file,
            config_templates_dir: PathBuf::from(get_env("CONFIG_TEMPLATES_DIR", "./config_templates")),
            settle_delay: Duration::from_millis(get_env("SETTLE_DELAY_MS", "3000").parse().unwrap_or(3000)),
            session_idle: Duration::from_secs(get_env("SESSION_IDLE_SECS", "3540").parse().unwrap_or(3540)),
            verify_tls: parse_bool(&get_env("CONTROLLER_VERIFY_TLS", "false")),
            frontend_dir: get_env("FRONTEND_DIR", "./frontend"),
            jwt_secret: get_env("JWT_SECRET", ""),
            catalog,
        })
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
