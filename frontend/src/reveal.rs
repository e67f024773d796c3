use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::js_sys::Array;
use web_sys::{
    Document, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};

use crate::dom;
use crate::error::EnhanceError;

pub const VISIBLE_CLASS: &str = "visible";
const FADE_CLASS: &str = "fade-in-up";

const HIDDEN_STYLE: [(&str, &str); 3] = [
    ("opacity", "0"),
    ("transform", "translateY(30px)"),
    ("transition", "opacity 0.6s ease-out, transform 0.6s ease-out"),
];
const SHOWN_STYLE: [(&str, &str); 2] = [("opacity", "1"), ("transform", "translateY(0)")];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RevealState {
    #[default]
    Hidden,
    Visible,
}

impl RevealState {
    pub fn from_visible(visible: bool) -> Self {
        if visible {
            RevealState::Visible
        } else {
            RevealState::Hidden
        }
    }

    pub fn observe(&mut self, intersecting: bool) -> bool {
        match (*self, intersecting) {
            (RevealState::Hidden, true) => {
                *self = RevealState::Visible;
                true
            }
            _ => false,
        }
    }
}

pub struct RevealAnimator {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(Array, IntersectionObserver)>,
}

impl RevealAnimator {
    pub fn install(
        document: &Document,
        selector: &str,
        threshold: f64,
        root_margin: &str,
    ) -> Result<Self, EnhanceError> {
        let targets: Vec<HtmlElement> = dom::require_all(document, selector)?;

        let callback = Closure::wrap(Box::new(|entries: Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let target = entry.target();
                let visible = target.class_list().contains(VISIBLE_CLASS);
                let mut state = RevealState::from_visible(visible);
                if !state.observe(entry.is_intersecting()) {
                    continue;
                }
                if let Err(e) = reveal(target.unchecked_ref()) {
                    warn!("Reveal failed: {}", e);
                }
                observer.unobserve(&target);
            }
        }) as Box<dyn FnMut(Array, IntersectionObserver)>);

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        options.set_root_margin(root_margin);
        let created =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options);
        let observer = match created {
            Ok(observer) => observer,
            Err(e) => {
                // Without an observer there is nothing to wait for.
                for target in &targets {
                    let _ = reveal(target);
                }
                return Err(e.into());
            }
        };

        for target in &targets {
            if target.class_list().contains(VISIBLE_CLASS) {
                continue;
            }
            dom::set_styles(target, &HIDDEN_STYLE)?;
            observer.observe(target);
        }
        debug!("Observing {} elements for reveal", targets.len());

        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for RevealAnimator {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

fn reveal(el: &HtmlElement) -> Result<(), EnhanceError> {
    dom::set_styles(el, &SHOWN_STYLE)?;
    el.class_list().add_2(VISIBLE_CLASS, FADE_CLASS)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_intersection_reveals() {
        let mut state = RevealState::default();
        assert!(!state.observe(false));
        assert_eq!(state, RevealState::Hidden);
        assert!(state.observe(true));
        assert_eq!(state, RevealState::Visible);
    }

    #[test]
    fn visible_never_reverts() {
        let mut state = RevealState::Hidden;
        state.observe(true);
        for intersecting in [false, true, false, false, true] {
            assert!(!state.observe(intersecting));
            assert_eq!(state, RevealState::Visible);
        }
    }

    #[test]
    fn already_visible_elements_are_not_revealed_again() {
        let mut state = RevealState::from_visible(true);
        assert!(!state.observe(true));
        assert_eq!(RevealState::from_visible(false), RevealState::Hidden);
    }
}
