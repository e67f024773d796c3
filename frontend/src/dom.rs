use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, NodeList, Window};

use crate::error::EnhanceError;

pub fn window() -> Result<Window, EnhanceError> {
    web_sys::window().ok_or(EnhanceError::NoWindow)
}

pub fn document() -> Result<Document, EnhanceError> {
    window()?.document().ok_or(EnhanceError::NoDocument)
}

pub fn body(document: &Document) -> Result<HtmlElement, EnhanceError> {
    document.body().ok_or(EnhanceError::NoBody)
}

pub fn viewport_width(window: &Window) -> Result<f64, EnhanceError> {
    window
        .inner_width()?
        .as_f64()
        .ok_or_else(|| EnhanceError::Js("innerWidth is not a number".to_string()))
}

pub fn collect<T: JsCast>(list: NodeList) -> Vec<T> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect()
}

pub fn query_all<T: JsCast>(document: &Document, selector: &str) -> Result<Vec<T>, EnhanceError> {
    Ok(collect(document.query_selector_all(selector)?))
}

pub fn query_all_in<T: JsCast>(root: &Element, selector: &str) -> Result<Vec<T>, EnhanceError> {
    Ok(collect(root.query_selector_all(selector)?))
}

pub fn require_all<T: JsCast>(document: &Document, selector: &str) -> Result<Vec<T>, EnhanceError> {
    let found = query_all(document, selector)?;
    if found.is_empty() {
        return Err(EnhanceError::missing(selector));
    }
    Ok(found)
}

pub fn query_first<T: JsCast>(document: &Document, selectors: &[&str]) -> Option<T> {
    selectors.iter().find_map(|selector| {
        document
            .query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<T>().ok())
    })
}

pub fn set_styles(el: &HtmlElement, props: &[(&str, &str)]) -> Result<(), EnhanceError> {
    let style = el.style();
    for (name, value) in props {
        style.set_property(name, value)?;
    }
    Ok(())
}

pub fn clear_styles(el: &HtmlElement, names: &[&str]) -> Result<(), EnhanceError> {
    let style = el.style();
    for name in names {
        style.remove_property(name)?;
    }
    Ok(())
}

/// A registered DOM event handler. Dropping it unregisters the handler.
pub struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    pub fn new<F>(
        target: &EventTarget,
        event: &'static str,
        handler: F,
    ) -> Result<Self, EnhanceError>
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        target.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            event,
            callback,
        })
    }

    pub fn event(&self) -> &'static str {
        self.event
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback(
            self.event,
            self.callback.as_ref().unchecked_ref(),
        );
    }
}
