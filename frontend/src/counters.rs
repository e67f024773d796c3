use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use crate::dom;
use crate::error::EnhanceError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterAnimation {
    target: u64,
    duration_ms: f64,
}

impl CounterAnimation {
    pub fn new(target: u64, duration_ms: f64) -> Self {
        Self { target, duration_ms }
    }

    pub fn parse(raw: &str, duration_ms: f64) -> Option<Self> {
        let digits: String = raw
            .trim()
            .chars()
            .filter(|c| *c != ',' && *c != '_')
            .collect();
        let target = digits.parse::<i64>().ok()?;
        Some(Self::new(target.max(0) as u64, duration_ms))
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn is_finished(&self, elapsed_ms: f64) -> bool {
        elapsed_ms >= self.duration_ms
    }

    /// Value to display `elapsed_ms` after the first frame. Ease-out cubic,
    /// so it only ever grows, and lands exactly on the target.
    pub fn value_at(&self, elapsed_ms: f64) -> u64 {
        if self.duration_ms <= 0.0 || self.is_finished(elapsed_ms) {
            return self.target;
        }
        let progress = (elapsed_ms / self.duration_ms).clamp(0.0, 1.0);
        let eased = 1.0 - (1.0 - progress).powi(3);
        ((self.target as f64 * eased).floor() as u64).min(self.target)
    }
}

pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn install(
    window: &Window,
    document: &Document,
    selector: &str,
    duration_ms: f64,
) -> Result<usize, EnhanceError> {
    let counters: Vec<HtmlElement> = dom::require_all(document, selector)?;
    let mut started = 0;
    for counter in counters {
        let raw = counter.get_attribute("data-target").unwrap_or_default();
        let Some(animation) = CounterAnimation::parse(&raw, duration_ms) else {
            debug!("Skipping counter with data-target={:?}", raw);
            continue;
        };
        animate(window, counter, animation)?;
        started += 1;
    }
    Ok(started)
}

fn animate(
    window: &Window,
    counter: HtmlElement,
    animation: CounterAnimation,
) -> Result<(), EnhanceError> {
    counter.set_text_content(Some("0"));

    let started_at: Cell<Option<f64>> = Cell::new(None);
    let frame: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
    let next_frame = frame.clone();
    let win = window.clone();

    *frame.borrow_mut() = Some(Closure::wrap(Box::new(move |now: f64| {
        let start = started_at.get().unwrap_or(now);
        started_at.set(Some(start));
        let elapsed = now - start;

        counter.set_text_content(Some(&format_thousands(animation.value_at(elapsed))));
        if animation.is_finished(elapsed) {
            // Breaks the frame -> closure cycle so the closure is freed.
            let _ = next_frame.borrow_mut().take();
            return;
        }
        if let Some(callback) = next_frame.borrow().as_ref() {
            if let Err(e) = win.request_animation_frame(callback.as_ref().unchecked_ref()) {
                warn!("Counter stopped early: {:?}", e);
                counter.set_text_content(Some(&format_thousands(animation.target())));
            }
        }
    }) as Box<dyn FnMut(f64)>));

    if let Some(callback) = frame.borrow().as_ref() {
        window.request_animation_frame(callback.as_ref().unchecked_ref())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_exactly_on_target() {
        let counter = CounterAnimation::parse("500", 2000.0).unwrap();
        assert_eq!(counter.value_at(0.0), 0);
        assert_eq!(counter.value_at(2000.0), 500);
        assert_eq!(counter.value_at(2016.7), 500);
        assert!(counter.is_finished(2000.0));
        assert!(!counter.is_finished(1999.9));
    }

    #[test]
    fn never_overshoots_or_goes_backwards() {
        let counter = CounterAnimation::new(500, 2000.0);
        let mut last = 0;
        for frame in 0..=140 {
            let value = counter.value_at(frame as f64 * 16.7);
            assert!(value >= last, "frame {} went from {} to {}", frame, last, value);
            assert!(value <= 500);
            last = value;
        }
        assert_eq!(last, 500);
    }

    #[test]
    fn zero_duration_jumps_to_target() {
        assert_eq!(CounterAnimation::new(42, 0.0).value_at(0.0), 42);
    }

    #[test]
    fn parses_data_target() {
        assert_eq!(CounterAnimation::parse(" 250 ", 1.0).map(|c| c.target()), Some(250));
        assert_eq!(CounterAnimation::parse("10,000", 1.0).map(|c| c.target()), Some(10_000));
        assert_eq!(CounterAnimation::parse("-5", 1.0).map(|c| c.target()), Some(0));
        assert_eq!(CounterAnimation::parse("", 1.0), None);
        assert_eq!(CounterAnimation::parse("lots", 1.0), None);
    }

    #[test]
    fn formats_with_thousands_separators() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(500), "500");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(12500), "12,500");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }
}
