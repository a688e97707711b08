// Refresh loop - Polls and aligns every metric, one non-overlapping tick at a time

use crate::application::dashboard_store::DashboardStore;
use crate::application::loading_service::LoadingService;
use crate::application::series_aligner::align;
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::chart::ChartSpec;
use crate::domain::reading::Metric;
use crate::domain::theme::ThemeVariables;
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Shared auto-refresh gate.
#[derive(Debug, Clone)]
pub struct RefreshControl {
    enabled: Arc<AtomicBool>,
}

impl RefreshControl {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

pub struct RefreshLoop {
    repository: Arc<dyn TelemetryRepository>,
    store: Arc<DashboardStore>,
    loading: LoadingService,
    control: RefreshControl,
    metrics: Vec<Metric>,
    first_run: bool,
}

impl RefreshLoop {
    pub fn new(
        repository: Arc<dyn TelemetryRepository>,
        store: Arc<DashboardStore>,
        loading: LoadingService,
        control: RefreshControl,
    ) -> Self {
        Self {
            repository,
            store,
            loading,
            control,
            metrics: Metric::ALL.to_vec(),
            first_run: true,
        }
    }

    /// Runs one fetch+align cycle if refreshing is enabled or nothing has
    /// loaded yet. Returns whether any work was done.
    ///
    /// A failed fetch leaves that metric's previous chart in place.
    pub async fn tick(&mut self) -> bool {
        if !self.first_run && !self.control.is_enabled() {
            tracing::trace!("Auto-refresh disabled, skipping tick");
            return false;
        }

        let fetches = self.metrics.iter().map(|&metric| {
            let repository = self.repository.clone();
            async move { (metric, repository.fetch_readings(metric).await) }
        });

        for (metric, result) in join_all(fetches).await {
            match result {
                Ok(readings) => {
                    let (timeline, series) = align(&readings);
                    tracing::debug!(
                        %metric,
                        readings = readings.len(),
                        sensors = series.len(),
                        points = timeline.len(),
                        "Aligned readings"
                    );
                    self.store
                        .publish_spec(ChartSpec::new(metric, timeline, series))
                        .await;
                }
                Err(e) => {
                    tracing::warn!(%metric, "Failed to refresh chart: {}", e);
                }
            }
        }

        if self.first_run {
            self.first_run = false;
            self.loading.disable();
            tracing::info!("Initial dashboard load finished");
        }

        true
    }
}

/// Owns the running refresh task of one dashboard session.
pub struct RefreshSession {
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl RefreshSession {
    /// Starts polling immediately. Theme changes re-render the stored charts
    /// without fetching.
    pub fn spawn(
        refresh: RefreshLoop,
        interval: Duration,
        themes: watch::Receiver<ThemeVariables>,
    ) -> Self {
        let (shutdown, stop) = watch::channel(false);
        let task = tokio::spawn(run(refresh, interval, themes, stop));

        Self {
            shutdown,
            task: Some(task),
        }
    }

    /// Stops the tick chain and waits for the task to exit. An in-flight tick
    /// is dropped and its results are discarded.
    pub async fn shutdown(mut self) {
        self.shutdown.send_replace(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("Refresh task ended abnormally: {}", e);
            }
        }
        tracing::info!("Refresh session stopped");
    }
}

impl Drop for RefreshSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    mut refresh: RefreshLoop,
    interval: Duration,
    mut themes: watch::Receiver<ThemeVariables>,
    mut stop: watch::Receiver<bool>,
) {
    let store = refresh.store.clone();

    loop {
        tokio::select! {
            biased;
            _ = stop.changed() => return,
            _ = refresh.tick() => {}
        }

        let next_tick = tokio::time::sleep(interval);
        tokio::pin!(next_tick);

        loop {
            tokio::select! {
                biased;
                _ = stop.changed() => return,
                Ok(()) = themes.changed() => {
                    let theme = themes.borrow_and_update().clone();
                    store.apply_theme(theme).await;
                }
                _ = &mut next_tick => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::telemetry_repository::FetchError;
    use crate::application::theme_service::ThemeService;
    use crate::domain::reading::Reading;
    use crate::domain::theme::ThemeName;
    use crate::infrastructure::config::MetricSettings;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, AtomicUsize};

    #[derive(Default)]
    struct MockRepository {
        calls: AtomicUsize,
        completed: AtomicUsize,
        fail: AtomicBool,
        failing_metric: Mutex<Option<Metric>>,
        delay_secs: AtomicU64,
    }

    impl MockRepository {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn completed(&self) -> usize {
            self.completed.load(Ordering::SeqCst)
        }

        fn fail_only(&self, metric: Option<Metric>) {
            *self.failing_metric.lock().unwrap() = metric;
        }
    }

    #[async_trait]
    impl TelemetryRepository for MockRepository {
        async fn fetch_readings(&self, metric: Metric) -> Result<Vec<Reading>, FetchError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);

            let delay = self.delay_secs.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
            self.completed.fetch_add(1, Ordering::SeqCst);

            let failing = *self.failing_metric.lock().unwrap() == Some(metric);
            if failing || self.fail.load(Ordering::SeqCst) {
                return Err(FetchError::Timeout);
            }

            let ts = NaiveDate::from_ymd_opt(2020, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, call as u32 % 60)
                .unwrap();
            Ok(vec![Reading::new(metric.as_str(), ts, call as f64)])
        }
    }

    struct Fixture {
        repository: Arc<MockRepository>,
        store: Arc<DashboardStore>,
        loading: LoadingService,
        control: RefreshControl,
        themes: ThemeService,
    }

    impl Fixture {
        fn new(enabled: bool) -> Self {
            let metrics = Metric::ALL
                .into_iter()
                .map(|m| (m, MetricSettings::defaults_for(m)))
                .collect();
            let themes = ThemeName::ALL
                .into_iter()
                .map(|n| (n, ThemeVariables::builtin(n)))
                .collect();
            let themes = ThemeService::new(themes, ThemeName::Default).unwrap();

            Self {
                repository: Arc::new(MockRepository::default()),
                store: Arc::new(DashboardStore::new(metrics, themes.current())),
                loading: LoadingService::new(),
                control: RefreshControl::new(enabled),
                themes,
            }
        }

        fn refresh_loop(&self) -> RefreshLoop {
            RefreshLoop::new(
                self.repository.clone(),
                self.store.clone(),
                self.loading.clone(),
                self.control.clone(),
            )
        }

        fn spawn(&self) -> RefreshSession {
            RefreshSession::spawn(
                self.refresh_loop(),
                Duration::from_secs(5),
                self.themes.subscribe(),
            )
        }
    }

    async fn advance(secs: u64) {
        tokio::time::sleep(Duration::from_secs(secs)).await;
    }

    #[tokio::test]
    async fn test_first_tick_runs_even_when_disabled() {
        let fx = Fixture::new(false);
        let mut refresh = fx.refresh_loop();

        assert!(refresh.tick().await);
        assert_eq!(fx.repository.calls(), 3);
        assert!(fx.store.spec(Metric::Temperature).await.is_some());

        assert!(!refresh.tick().await);
        assert_eq!(fx.repository.calls(), 3);
    }

    #[tokio::test]
    async fn test_loading_finishes_after_first_tick() {
        let fx = Fixture::new(true);
        let mut refresh = fx.refresh_loop();
        assert!(fx.loading.is_loading());

        refresh.tick().await;

        assert!(!fx.loading.is_loading());
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_previous_chart() {
        let fx = Fixture::new(true);
        let mut refresh = fx.refresh_loop();

        refresh.tick().await;
        let before = fx.store.spec(Metric::Humidity).await.unwrap();

        fx.repository.fail.store(true, Ordering::SeqCst);
        assert!(refresh.tick().await);
        assert_eq!(fx.repository.calls(), 6);
        assert_eq!(fx.store.spec(Metric::Humidity).await.unwrap(), before);

        fx.repository.fail.store(false, Ordering::SeqCst);
        refresh.tick().await;
        assert_ne!(fx.store.spec(Metric::Humidity).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_one_failing_metric_does_not_block_the_others() {
        let fx = Fixture::new(true);
        let mut refresh = fx.refresh_loop();

        refresh.tick().await;
        let pressure = fx.store.spec(Metric::Pressure).await.unwrap();
        let humidity = fx.store.spec(Metric::Humidity).await.unwrap();
        let temperature = fx.store.spec(Metric::Temperature).await.unwrap();

        fx.repository.fail_only(Some(Metric::Pressure));
        assert!(refresh.tick().await);

        assert_eq!(fx.store.spec(Metric::Pressure).await.unwrap(), pressure);
        assert_ne!(fx.store.spec(Metric::Humidity).await.unwrap(), humidity);
        assert_ne!(fx.store.spec(Metric::Temperature).await.unwrap(), temperature);
    }

    #[tokio::test]
    async fn test_failed_first_tick_still_clears_loading() {
        let fx = Fixture::new(true);
        fx.repository.fail.store(true, Ordering::SeqCst);
        let mut refresh = fx.refresh_loop();

        refresh.tick().await;

        assert!(!fx.loading.is_loading());
        assert!(fx.store.charts().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_polls_on_interval() {
        let fx = Fixture::new(true);
        let _session = fx.spawn();

        advance(1).await;
        assert_eq!(fx.repository.calls(), 3);

        // Ticks at t=5 and t=10
        advance(11).await;
        assert_eq!(fx.repository.calls(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_session_keeps_scheduling() {
        let fx = Fixture::new(false);
        let _session = fx.spawn();

        // First tick fetches, the ticks at t=5 and t=10 do nothing.
        advance(12).await;
        assert_eq!(fx.repository.calls(), 3);

        // The chain is still alive: the tick at t=15 picks the gate up.
        fx.control.enable();
        advance(5).await;
        assert_eq!(fx.repository.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_prevents_next_tick() {
        let fx = Fixture::new(true);
        let session = fx.spawn();

        advance(1).await;
        assert_eq!(fx.repository.calls(), 3);

        session.shutdown().await;
        advance(30).await;
        assert_eq!(fx.repository.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_discards_in_flight_tick() {
        let fx = Fixture::new(true);
        fx.repository.delay_secs.store(3, Ordering::SeqCst);
        let session = fx.spawn();

        advance(1).await;
        assert_eq!(fx.repository.calls(), 3);
        assert_eq!(fx.repository.completed(), 0);

        session.shutdown().await;
        advance(30).await;

        assert_eq!(fx.repository.calls(), 3);
        assert_eq!(fx.repository.completed(), 0);
        assert!(fx.loading.is_loading());
        assert!(fx.store.charts().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_session_stops_polling() {
        let fx = Fixture::new(true);
        let session = fx.spawn();

        advance(6).await;
        assert_eq!(fx.repository.calls(), 6);

        drop(session);
        advance(30).await;
        assert_eq!(fx.repository.calls(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_theme_change_rerenders_without_fetching() {
        let fx = Fixture::new(true);
        let _session = fx.spawn();

        advance(1).await;
        fx.themes.set_theme(ThemeName::Cosmic).unwrap();
        advance(1).await;

        assert_eq!(fx.repository.calls(), 3);
        let chart = fx.store.chart(Metric::Pressure).await.unwrap();
        assert_eq!(
            chart.background_color,
            ThemeVariables::builtin(ThemeName::Cosmic).background
        );
    }
}
