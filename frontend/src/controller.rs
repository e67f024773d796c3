use std::rc::Rc;

use log::{debug, info, warn};
use web_sys::{Document, HtmlElement, Window};

use crate::components::notification::{Notifier, Severity};
use crate::config::EnhancerConfig;
use crate::counters;
use crate::dom::{self, Listener};
use crate::effects;
use crate::error::EnhanceError;
use crate::forms;
use crate::nav::{self, MobileNav};
use crate::reveal::RevealAnimator;

const FLASH_SELECTOR: &str = "[data-flash]";

pub struct Enhancer {
    config: EnhancerConfig,
    notifier: Notifier,
    menu: Option<Rc<MobileNav>>,
    reveal: Option<RevealAnimator>,
    listeners: Vec<Listener>,
}

impl Enhancer {
    pub fn install(window: &Window, document: &Document, config: EnhancerConfig) -> Self {
        let notifier = Notifier::new(config.notification_lifecycle());
        let mut enhancer = Self {
            config,
            notifier,
            menu: None,
            reveal: None,
            listeners: Vec::new(),
        };
        enhancer.install_navigation(window, document);
        if let Some(shown) = settle("flash messages", enhancer.surface_flashes(document)) {
            debug!("Surfaced {} flash messages", shown);
        }

        let config = &enhancer.config;
        enhancer.reveal = settle(
            "scroll reveal",
            RevealAnimator::install(
                document,
                &config.reveal_selector,
                config.reveal_threshold,
                &config.reveal_root_margin,
            ),
        );

        let forms = settle("form validation", forms::install(document, enhancer.notifier));
        enhancer.keep(forms);

        let config = &enhancer.config;
        let counters = counters::install(
            window,
            document,
            &config.counter_selector,
            config.counter_duration_ms,
        );
        if let Some(started) = settle("counters", counters) {
            debug!("Animating {} counters", started);
        }

        let hover = settle(
            "hover effects",
            effects::install_hover(document, &enhancer.config.hover_selector),
        );
        enhancer.keep(hover);
        let parallax = settle(
            "parallax",
            effects::install_parallax(window, document, enhancer.config.parallax_factor),
        );
        enhancer.keep(parallax.map(|listener| vec![listener]));
        settle("floating orbs", effects::install_orbs(document, enhancer.config.orb_count));
        if enhancer.config.cursor_glow {
            let glow = settle("cursor glow", effects::install_cursor_glow(document));
            enhancer.keep(glow.map(|listener| vec![listener]));
        }

        info!(
            "Page enhancements ready: {} listeners, mobile menu {}, reveal {}",
            enhancer.listeners.len(),
            if enhancer.menu.is_some() { "on" } else { "off" },
            if enhancer.reveal.is_some() { "on" } else { "off" },
        );
        enhancer
    }

    fn install_navigation(&mut self, window: &Window, document: &Document) {
        if let Some((menu, listeners)) = settle(
            "mobile navigation",
            MobileNav::install(window, document, self.config.nav_breakpoint),
        ) {
            self.menu = Some(menu);
            self.listeners.extend(listeners);
        }
        let scroll = settle(
            "smooth scroll",
            nav::install_smooth_scroll(document, self.menu.clone()),
        );
        self.keep(scroll);
        let transitions = settle(
            "page transitions",
            nav::install_page_transitions(window, document, self.config.page_transition_ms),
        );
        self.keep(transitions);
    }

    fn keep(&mut self, listeners: Option<Vec<Listener>>) {
        if let Some(listeners) = listeners {
            for listener in &listeners {
                debug!("Listening for {}", listener.event());
            }
            self.listeners.extend(listeners);
        }
    }

    fn surface_flashes(&self, document: &Document) -> Result<usize, EnhanceError> {
        let flashes: Vec<HtmlElement> = dom::require_all(document, FLASH_SELECTOR)?;
        let mut shown = 0;
        for flash in flashes {
            let message = flash.text_content().unwrap_or_default();
            let message = message.trim();
            if message.is_empty() {
                continue;
            }
            let category = flash.get_attribute("data-flash").unwrap_or_default();
            self.notify(message, Severity::from_category(&category));
            flash.style().set_property("display", "none")?;
            shown += 1;
        }
        Ok(shown)
    }

    pub fn notify(&self, message: &str, severity: Severity) {
        if let Err(e) = self.notifier.notify(message, severity) {
            warn!("Notification dropped: {}", e);
        }
    }
}

/// Logs a feature that could not be installed and carries on without it.
fn settle<T>(feature: &str, result: Result<T, EnhanceError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) if e.is_missing() => {
            debug!("Skipping {}: {}", feature, e);
            None
        }
        Err(e) => {
            warn!("Skipping {}: {}", feature, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_keeps_successes() {
        assert_eq!(settle("counters", Ok::<_, EnhanceError>(3)), Some(3));
    }

    #[test]
    fn settle_skips_missing_markup_and_failures() {
        assert_eq!(settle::<()>("parallax", Err(EnhanceError::missing(".hero"))), None);
        assert_eq!(settle::<()>("orbs", Err(EnhanceError::NoBody)), None);
    }
}
