// Dashboard store - latest aligned data and its rendered chart options
use crate::application::chart_builder::build_chart_options;
use crate::domain::chart::{ChartOptions, ChartSpec};
use crate::domain::reading::Metric;
use crate::domain::theme::{ThemeName, ThemeVariables};
use crate::infrastructure::config::MetricSettings;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{RwLock, broadcast};

const EVENT_CAPACITY: usize = 64;

/// Change notifications pushed to connected views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DashboardEvent {
    ChartUpdated {
        metric: Metric,
        sensors: usize,
        points: usize,
    },
    ThemeChanged {
        theme: ThemeName,
    },
    Loading {
        loading: bool,
    },
}

struct StoreState {
    theme: ThemeVariables,
    specs: BTreeMap<Metric, ChartSpec>,
    options: BTreeMap<Metric, ChartOptions>,
}

pub struct DashboardStore {
    metrics: HashMap<Metric, MetricSettings>,
    state: RwLock<StoreState>,
    events: broadcast::Sender<DashboardEvent>,
}

impl DashboardStore {
    pub fn new(metrics: HashMap<Metric, MetricSettings>, theme: ThemeVariables) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            metrics,
            state: RwLock::new(StoreState {
                theme,
                specs: BTreeMap::new(),
                options: BTreeMap::new(),
            }),
            events,
        }
    }

    fn settings(&self, metric: Metric) -> MetricSettings {
        self.metrics
            .get(&metric)
            .cloned()
            .unwrap_or_else(|| MetricSettings::defaults_for(metric))
    }

    /// Replaces a metric's data and re-renders its chart with the active theme.
    pub async fn publish_spec(&self, spec: ChartSpec) {
        let metric = spec.metric;
        let event = DashboardEvent::ChartUpdated {
            metric,
            sensors: spec.series.len(),
            points: spec.timeline.len(),
        };

        {
            let mut state = self.state.write().await;
            let options = build_chart_options(&spec, &state.theme, &self.settings(metric));
            state.options.insert(metric, options);
            state.specs.insert(metric, spec);
        }

        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Re-renders every chart with a new theme. Data is left untouched.
    pub async fn apply_theme(&self, theme: ThemeVariables) {
        let name = theme.name;
        {
            let mut state = self.state.write().await;
            let options = state
                .specs
                .iter()
                .map(|(metric, spec)| {
                    (*metric, build_chart_options(spec, &theme, &self.settings(*metric)))
                })
                .collect();
            state.options = options;
            state.theme = theme;
        }

        let _ = self.events.send(DashboardEvent::ThemeChanged { theme: name });
    }

    #[cfg(test)]
    pub async fn spec(&self, metric: Metric) -> Option<ChartSpec> {
        self.state.read().await.specs.get(&metric).cloned()
    }

    pub async fn chart(&self, metric: Metric) -> Option<ChartOptions> {
        self.state.read().await.options.get(&metric).cloned()
    }

    pub async fn charts(&self) -> BTreeMap<Metric, ChartOptions> {
        self.state.read().await.options.clone()
    }

    #[cfg(test)]
    pub async fn theme_name(&self) -> ThemeName {
        self.state.read().await.theme.name
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.events.subscribe()
    }
}
