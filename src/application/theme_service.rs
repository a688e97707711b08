// Theme service - publishes theme-changed events
use crate::domain::theme::{ThemeError, ThemeName, ThemeVariables};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Clone)]
pub struct ThemeService {
    themes: Arc<HashMap<ThemeName, ThemeVariables>>,
    current: watch::Sender<ThemeVariables>,
}

impl ThemeService {
    pub fn new(
        themes: HashMap<ThemeName, ThemeVariables>,
        active: ThemeName,
    ) -> Result<Self, ThemeError> {
        let initial = themes
            .get(&active)
            .cloned()
            .ok_or_else(|| ThemeError::UnknownTheme(active.to_string()))?;
        let (current, _) = watch::channel(initial);

        Ok(Self {
            themes: Arc::new(themes),
            current,
        })
    }

    pub fn current(&self) -> ThemeVariables {
        self.current.borrow().clone()
    }

    /// Switches the active theme. Subscribers are only notified on an actual change.
    pub fn set_theme(&self, name: ThemeName) -> Result<ThemeVariables, ThemeError> {
        let theme = self
            .themes
            .get(&name)
            .cloned()
            .ok_or_else(|| ThemeError::UnknownTheme(name.to_string()))?;

        self.current.send_if_modified(|current| {
            if *current == theme {
                return false;
            }
            *current = theme.clone();
            true
        });

        tracing::info!(theme = %name, "Theme changed");
        Ok(theme)
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeVariables> {
        self.current.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ThemeService {
        let themes = ThemeName::ALL
            .into_iter()
            .map(|n| (n, ThemeVariables::builtin(n)))
            .collect();
        ThemeService::new(themes, ThemeName::Default).unwrap()
    }

    #[test]
    fn test_unknown_active_theme() {
        let err = ThemeService::new(HashMap::new(), ThemeName::Cosmic).err();
        assert_eq!(err, Some(ThemeError::UnknownTheme("cosmic".to_string())));
    }

    #[tokio::test]
    async fn test_set_theme_notifies_subscribers() {
        let themes = service();
        let mut rx = themes.subscribe();

        themes.set_theme(ThemeName::Cosmic).unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().name, ThemeName::Cosmic);
        assert_eq!(themes.current().name, ThemeName::Cosmic);
    }

    #[test]
    fn test_same_theme_is_not_a_change() {
        let themes = service();
        let rx = themes.subscribe();

        themes.set_theme(ThemeName::Default).unwrap();

        assert!(!rx.has_changed().unwrap());
    }
}
