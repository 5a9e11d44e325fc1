// src/config.rs
use crate::render::BlockOptions;
use crate::utils::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const ENV_MIN_ITEMS: &str = "FAQ_MIN_ITEMS";
pub const ENV_STYLE: &str = "FAQ_STYLE";

/// How each FAQ item is rendered in the block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresentationStyle {
    /// Collapsible `<details>`/`<summary>` widgets.
    #[default]
    Disclosure,
    /// Static question heading followed by the answer.
    Static,
}

impl FromStr for PresentationStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disclosure" => Ok(Self::Disclosure),
            "static" => Ok(Self::Static),
            other => Err(format!("unknown presentation style '{}' (expected disclosure or static)", other)),
        }
    }
}

impl fmt::Display for PresentationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disclosure => "disclosure",
            Self::Static => "static",
        })
    }
}

/// Where the block goes relative to the document content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Prepend,
    #[default]
    Append,
}

impl FromStr for InsertPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "prepend" => Ok(Self::Prepend),
            "append" => Ok(Self::Append),
            other => Err(format!("unknown insert position '{}' (expected prepend or append)", other)),
        }
    }
}

/// Host-side settings. Only `presentation_style` reaches the core (through
/// [`BlockOptions`]); the rest gates what the host does with the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaqConfig {
    pub presentation_style: PresentationStyle,
    /// Minimum number of items before anything is persisted or inserted.
    pub min_items: usize,
    pub insert_position: InsertPosition,
    pub auto_insert: bool,
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            presentation_style: PresentationStyle::Disclosure,
            min_items: 1,
            insert_position: InsertPosition::Append,
            auto_insert: false,
        }
    }
}

impl FaqConfig {
    /// Defaults, overlaid by the JSON file at `path` (if any), overlaid by
    /// the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                serde_json::from_str::<Self>(&raw).map_err(|e| {
                    AppError::Config(format!("Invalid config file {}: {}", path.display(), e))
                })?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        tracing::debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    /// Applies `FAQ_MIN_ITEMS` / `FAQ_STYLE` as returned by `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MIN_ITEMS) {
            self.min_items = raw.trim().parse().map_err(|_| {
                AppError::Config(format!("{} must be a non-negative integer, got '{}'", ENV_MIN_ITEMS, raw))
            })?;
        }
        if let Some(raw) = lookup(ENV_STYLE) {
            self.presentation_style = raw.parse().map_err(AppError::Config)?;
        }
        Ok(())
    }

    pub fn block_options(&self) -> BlockOptions {
        BlockOptions { presentation_style: self.presentation_style }
    }

    /// Whether `count` items clear the minimum-item gate.
    pub fn meets_minimum(&self, count: usize) -> bool {
        count > 0 && count >= self.min_items
    }
}
