//! Marker attributes and inline style sets applied by the annotators.

use crate::config::StyleConfig;

pub const MENTION_ATTR: &str = "data-tagmark-mention";
pub const BADGE_ATTR: &str = "data-tagmark-badge";
pub const HIGHLIGHTED_ATTR: &str = "data-highlighted";
pub const USERNAME_ATTR: &str = "data-username";
pub const HOVER_BOUND_ATTR: &str = "data-hover-bound";
pub const CLICK_BOUND_ATTR: &str = "data-click-bound";

pub type Declarations = Vec<(&'static str, String)>;

pub fn mention_marker(style: &StyleConfig) -> Declarations {
    vec![
        ("background-color", style.mention_background.clone()),
        ("color", style.mention_text.clone()),
        ("padding", "1px 6px".into()),
        ("border-radius", "999px".into()),
        ("font-weight", "600".into()),
        ("white-space", "nowrap".into()),
    ]
}

pub fn container_base(style: &StyleConfig) -> Declarations {
    vec![
        ("background-color", style.highlight_background.clone()),
        ("border", format!("2px solid {}", style.accent)),
        ("border-radius", "8px".into()),
        ("box-shadow", "0 2px 8px rgba(0, 0, 0, 0.12)".into()),
        ("transition", "background-color 0.2s, box-shadow 0.2s".into()),
        ("cursor", "pointer".into()),
    ]
}

pub fn container_hover(style: &StyleConfig) -> Declarations {
    vec![
        ("background-color", style.highlight_hover_background.clone()),
        ("box-shadow", "0 4px 16px rgba(0, 0, 0, 0.2)".into()),
    ]
}

pub fn badge(style: &StyleConfig) -> Declarations {
    vec![
        ("position", "absolute".into()),
        ("top", "6px".into()),
        ("right", "6px".into()),
        ("z-index", "10".into()),
        ("background-color", style.accent.clone()),
        ("color", "#ffffff".into()),
        ("font-size", "11px".into()),
        ("padding", "2px 8px".into()),
        ("border-radius", "999px".into()),
        ("pointer-events", "none".into()),
    ]
}

pub fn mention_tooltip(username: &str) -> String {
    format!("Tagged user @{username}")
}
