// Loading state observed by the view shell to toggle its spinner
use tokio::sync::watch;

#[derive(Clone)]
pub struct LoadingService {
    state: watch::Sender<bool>,
}

impl LoadingService {
    /// Starts in the loading state.
    pub fn new() -> Self {
        let (state, _) = watch::channel(true);
        Self { state }
    }

    #[cfg(test)]
    pub fn enable(&self) {
        self.state.send_replace(true);
    }

    pub fn disable(&self) {
        self.state.send_replace(false);
    }

    pub fn is_loading(&self) -> bool {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

impl Default for LoadingService {
    fn default() -> Self {
        Self::new()
    }
}
