use crate::domain::reading::Metric;
use crate::domain::theme::{ThemeError, ThemeName, ThemeVariables};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub theme: ThemeSettings,
    /// Keyed by metric name
    #[serde(default)]
    pub metrics: HashMap<String, MetricSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            enabled: true,
        }
    }
}

impl RefreshSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ThemeSettings {
    #[serde(default)]
    pub active: ThemeName,
    /// Overrides for the built-in palettes.
    #[serde(default)]
    pub overrides: Vec<ThemeVariables>,
}

impl ThemeSettings {
    /// Built-in themes with configured overrides applied, all validated.
    pub fn resolve(&self) -> Result<HashMap<ThemeName, ThemeVariables>, ThemeError> {
        let mut themes: HashMap<ThemeName, ThemeVariables> = ThemeName::ALL
            .into_iter()
            .map(|name| (name, ThemeVariables::builtin(name)))
            .collect();

        for theme in &self.overrides {
            theme.validate()?;
            themes.insert(theme.name, theme.clone());
        }

        Ok(themes)
    }
}

/// Where and how a metric is fetched, and how it is labelled.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MetricSettings {
    /// Path segment under the API base URL
    pub path: String,
    /// JSON field carrying the numeric value
    pub value_field: String,
    #[serde(default)]
    pub unit: String,
    pub title: String,
}

impl MetricSettings {
    pub fn defaults_for(metric: Metric) -> Self {
        let (path, unit, title) = match metric {
            Metric::Humidity => ("umidade", "", "Humidity"),
            Metric::Pressure => ("pressao", "", "Pressure"),
            Metric::Temperature => ("temperatura", "ºC", "Temperature"),
        };

        Self {
            path: path.to_string(),
            value_field: path.to_string(),
            unit: unit.to_string(),
            title: title.to_string(),
        }
    }
}

impl AppConfig {
    /// Settings for a metric, falling back to the built-in mapping.
    pub fn metric(&self, metric: Metric) -> MetricSettings {
        self.metrics
            .iter()
            .find(|(name, _)| name.parse::<Metric>().ok() == Some(metric))
            .map(|(_, settings)| settings.clone())
            .unwrap_or_else(|| MetricSettings::defaults_for(metric))
    }

    pub fn metric_settings(&self) -> HashMap<Metric, MetricSettings> {
        Metric::ALL.into_iter().map(|m| (m, self.metric(m))).collect()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.refresh.interval_secs == 0 {
            anyhow::bail!("refresh.interval_secs must be greater than zero");
        }
        if self.api.timeout_secs == 0 {
            anyhow::bail!("api.timeout_secs must be greater than zero");
        }
        self.theme.resolve()?;
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://filaiot.herokuapp.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_secs() -> u64 {
    5
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_true() -> bool {
    true
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
