use log::{warn, Level};
use serde::Deserialize;
use web_sys::Document;

use crate::components::notification::Lifecycle;
use crate::error::EnhanceError;

// Optional `<script type="application/json">` block with overrides.
pub const CONFIG_ELEMENT_ID: &str = "enhancer-config";

#[cfg(debug_assertions)]
pub fn log_level() -> Level {
    Level::Debug // Verbose while running locally
}

#[cfg(not(debug_assertions))]
pub fn log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnhancerConfig {
    pub reveal_selector: String,
    pub reveal_threshold: f64,
    pub reveal_root_margin: String,
    pub hover_selector: String,
    pub counter_selector: String,
    pub nav_breakpoint: f64,
    pub counter_duration_ms: f64,
    pub notification_display_ms: u32,
    pub notification_fade_ms: u32,
    pub parallax_factor: f64,
    pub page_transition_ms: u32,
    pub orb_count: usize,
    pub cursor_glow: bool,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            reveal_selector: ".reveal, .card, .prize, .stage-cards, .prize-list, section"
                .to_string(),
            reveal_threshold: 0.1,
            reveal_root_margin: "0px 0px -50px 0px".to_string(),
            hover_selector: ".btn, .card, .prize".to_string(),
            counter_selector: ".counter[data-target]".to_string(),
            nav_breakpoint: 768.0,
            counter_duration_ms: 2000.0,
            notification_display_ms: 3000,
            notification_fade_ms: 300,
            parallax_factor: 0.5,
            page_transition_ms: 300,
            orb_count: 10,
            cursor_glow: true,
        }
    }
}

impl EnhancerConfig {
    pub fn from_json(raw: &str) -> Result<Self, EnhanceError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(document: &Document) -> Self {
        let Some(raw) = document
            .get_element_by_id(CONFIG_ELEMENT_ID)
            .and_then(|el| el.text_content())
        else {
            return Self::default();
        };
        if raw.trim().is_empty() {
            return Self::default();
        }
        match Self::from_json(&raw) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring #{}: {}", CONFIG_ELEMENT_ID, e);
                Self::default()
            }
        }
    }

    pub fn notification_lifecycle(&self) -> Lifecycle {
        Lifecycle {
            display_ms: self.notification_display_ms,
            fade_ms: self.notification_fade_ms,
        }
    }
}
