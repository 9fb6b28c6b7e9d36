use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `STREAMRATE__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Valuation policy knobs. The engine revisions disagree on the audience
/// model and the placement spot length, so both are explicit configuration
/// rather than buried constants.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// "unique_cycles" or "concurrent".
    #[serde(default = "default_audience_model")]
    pub audience_model: String,
    /// Fixed spot length in minutes (0.5 = 30-second spots).
    #[serde(default = "default_placement_duration")]
    pub placement_duration_minutes: f64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    /// Hex-encoded SHA-256 digest of the admin bearer token. Admin routes
    /// are disabled when unset.
    #[serde(default)]
    pub token_sha256: Option<String>,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_audience_model() -> String {
    "unique_cycles".to_string()
}
fn default_placement_duration() -> f64 {
    0.5
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            audience_model: default_audience_model(),
            placement_duration_minutes: default_placement_duration(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            pricing: PricingConfig::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("STREAMRATE")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
