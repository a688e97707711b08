// Theme domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ThemeError {
    #[error("unknown theme: {0}")]
    UnknownTheme(String),
    #[error("theme {theme}: `{field}` must not be empty")]
    EmptyField { theme: ThemeName, field: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    #[default]
    Default,
    Cosmic,
    Corporate,
}

impl ThemeName {
    pub const ALL: [ThemeName; 3] = [ThemeName::Default, ThemeName::Cosmic, ThemeName::Corporate];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Default => "default",
            ThemeName::Cosmic => "cosmic",
            ThemeName::Corporate => "corporate",
        }
    }
}

impl fmt::Display for ThemeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeName {
    type Err = ThemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeName::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ThemeError::UnknownTheme(s.to_string()))
    }
}

/// Style tokens the chart builder needs from a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeVariables {
    pub name: ThemeName,
    pub background: String,
    pub palette: Vec<String>,
    pub text_color: String,
    pub axis_line_color: String,
    pub split_line_color: String,
}

impl ThemeVariables {
    pub fn validate(&self) -> Result<(), ThemeError> {
        let empty = |field: &'static str| ThemeError::EmptyField {
            theme: self.name,
            field,
        };

        if self.palette.is_empty() || self.palette.iter().any(|c| c.trim().is_empty()) {
            return Err(empty("palette"));
        }
        for (field, value) in [
            ("background", &self.background),
            ("text_color", &self.text_color),
            ("axis_line_color", &self.axis_line_color),
            ("split_line_color", &self.split_line_color),
        ] {
            if value.trim().is_empty() {
                return Err(empty(field));
            }
        }
        Ok(())
    }

    /// Built-in palette for a theme, used when configuration does not override it.
    /// Palette order is danger, primary, info.
    pub fn builtin(name: ThemeName) -> Self {
        let (background, palette, text_color, axis_line_color, split_line_color) = match name {
            ThemeName::Default => (
                "#ffffff",
                ["#ff4c6a", "#8a7fff", "#0088ff"],
                "#484848",
                "#bbbbbb",
                "#ebeef2",
            ),
            ThemeName::Cosmic => (
                "#3d3780",
                ["#ff386a", "#7659ff", "#0088ff"],
                "#ffffff",
                "#a1a1e5",
                "#342e73",
            ),
            ThemeName::Corporate => (
                "#ffffff",
                ["#ff6b83", "#73a1ff", "#5dcfe3"],
                "#484848",
                "#cccccc",
                "#ebeef2",
            ),
        };

        Self {
            name,
            background: background.to_string(),
            palette: palette.iter().map(|c| c.to_string()).collect(),
            text_color: text_color.to_string(),
            axis_line_color: axis_line_color.to_string(),
            split_line_color: split_line_color.to_string(),
        }
    }
}
