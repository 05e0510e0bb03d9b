use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tagmark_core::{PatternError, UrlPattern};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid target page pattern: {0}")]
    Pattern(#[from] PatternError),
}

/// Engine settings, loadable from a RON file. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Debounce window for insertion bursts, in milliseconds.
    pub debounce_ms: u64,
    /// Pages where link/container highlighting runs and refreshes are relayed.
    pub target_pages: Vec<String>,
    pub profiles: ProfileConfig,
    pub container: ContainerRules,
    pub action: ActionConfig,
    pub style: StyleConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Hosts whose first path segment names a user.
    pub hosts: Vec<String>,
    /// First path segments that are site sections, not users.
    pub reserved_paths: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerRules {
    /// Each signature lists class substrings that must all be present.
    pub signatures: Vec<Vec<String>>,
    pub max_signature_depth: usize,
    pub generic_keywords: Vec<String>,
    pub title_tags: Vec<String>,
    pub title_class_keywords: Vec<String>,
    pub overlay_keywords: Vec<String>,
    pub overlay_depth: usize,
    pub min_content_size: MinSize,
    pub min_fallback_size: MinSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    pub video_hosts: Vec<String>,
    /// Search endpoint; the title text is sent as the `q` parameter.
    pub search_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub accent: String,
    pub mention_background: String,
    pub mention_text: String,
    pub highlight_background: String,
    pub highlight_hover_background: String,
    pub badge_icon: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            target_pages: strings(&["*://*.producthunt.com/*"]),
            profiles: ProfileConfig::default(),
            container: ContainerRules::default(),
            action: ActionConfig::default(),
            style: StyleConfig::default(),
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            hosts: strings(&["x.com", "twitter.com"]),
            reserved_paths: strings(&[
                "home",
                "explore",
                "search",
                "i",
                "intent",
                "hashtag",
                "settings",
                "messages",
                "notifications",
                "share",
            ]),
        }
    }
}

impl Default for ContainerRules {
    fn default() -> Self {
        Self {
            signatures: vec![strings(&["styles_item"]), strings(&["styles_postItem"])],
            max_signature_depth: 10,
            generic_keywords: strings(&["card", "row", "item"]),
            title_tags: strings(&["h1", "h2", "h3", "h4"]),
            title_class_keywords: strings(&["title", "name"]),
            overlay_keywords: strings(&["modal", "popup", "dialog", "overlay"]),
            overlay_depth: 5,
            min_content_size: MinSize {
                width: 200.0,
                height: 50.0,
            },
            min_fallback_size: MinSize {
                width: 300.0,
                height: 80.0,
            },
        }
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            video_hosts: strings(&["youtube.com", "youtu.be", "vimeo.com", "twitch.tv"]),
            search_url: "https://www.google.com/search".to_string(),
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            accent: "#1d9bf0".to_string(),
            mention_background: "#1d9bf0".to_string(),
            mention_text: "#ffffff".to_string(),
            highlight_background: "rgba(29, 155, 240, 0.08)".to_string(),
            highlight_hover_background: "rgba(29, 155, 240, 0.16)".to_string(),
            badge_icon: "\u{1f3f7}".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_ron(&text)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.target_patterns()?;
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn target_patterns(&self) -> Result<Vec<UrlPattern>, PatternError> {
        self.target_pages
            .iter()
            .map(|raw| UrlPattern::parse(raw))
            .collect()
    }
}
