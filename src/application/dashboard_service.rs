// Dashboard service - Use cases behind the HTTP surface
use crate::application::dashboard_store::{DashboardEvent, DashboardStore};
use crate::application::loading_service::LoadingService;
use crate::application::refresh_loop::RefreshControl;
use crate::application::theme_service::ThemeService;
use crate::domain::chart::ChartOptions;
use crate::domain::reading::Metric;
use crate::domain::status_card::{CardSettings, status_cards_for};
use crate::domain::theme::{ThemeError, ThemeName};
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio_stream::wrappers::{BroadcastStream, WatchStream};

#[derive(Debug, Clone, Serialize)]
pub struct StatusCards {
    pub theme: ThemeName,
    pub cards: Vec<CardSettings>,
}

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<DashboardStore>,
    loading: LoadingService,
    themes: ThemeService,
    control: RefreshControl,
}

impl DashboardService {
    pub fn new(
        store: Arc<DashboardStore>,
        loading: LoadingService,
        themes: ThemeService,
        control: RefreshControl,
    ) -> Self {
        Self {
            store,
            loading,
            themes,
            control,
        }
    }

    pub async fn charts(&self) -> BTreeMap<Metric, ChartOptions> {
        self.store.charts().await
    }

    pub async fn chart(&self, metric: Metric) -> Option<ChartOptions> {
        self.store.chart(metric).await
    }

    pub fn status_cards(&self) -> StatusCards {
        let theme = self.themes.current().name;
        StatusCards {
            theme,
            cards: status_cards_for(theme),
        }
    }

    pub fn set_theme(&self, name: ThemeName) -> Result<StatusCards, ThemeError> {
        self.themes.set_theme(name)?;
        Ok(self.status_cards())
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        if enabled {
            self.control.enable();
        } else {
            self.control.disable();
        }
        tracing::info!(enabled, "Auto-refresh toggled");
    }

    pub fn auto_refresh(&self) -> bool {
        self.control.is_enabled()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }

    /// Loading state (current value first) merged with store events.
    /// Events a slow consumer missed are dropped.
    pub fn events(&self) -> impl Stream<Item = DashboardEvent> + Send + use<> {
        let loading = WatchStream::new(self.loading.subscribe())
            .map(|loading| DashboardEvent::Loading { loading });
        let updates = BroadcastStream::new(self.store.subscribe()).filter_map(|event| async move {
            match event {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!("Event subscriber lagging: {}", e);
                    None
                }
            }
        });

        futures::stream::select(loading, updates)
    }
}
