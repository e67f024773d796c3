use std::cell::RefCell;
use std::rc::Rc;

use log::warn;
use wasm_bindgen::JsCast;
use web_sys::js_sys::Math;
use web_sys::{Document, HtmlElement, MouseEvent, Window};

use crate::dom::{self, Listener};
use crate::error::EnhanceError;

const HOVER_SHADOW: &str = "0 12px 30px rgba(0, 0, 0, 0.25)";
const HOVER_TRANSFORM: &str = "scale(1.05)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformRestore {
    Set(String),
    Remove,
    Keep,
}

/// Remembers the inline transform a hover replaced.
#[derive(Debug, Default)]
pub struct HoverMemory {
    saved: Option<String>,
}

impl HoverMemory {
    pub fn enter(&mut self, inline_transform: &str) {
        if inline_transform != HOVER_TRANSFORM {
            self.saved = Some(inline_transform.to_string());
        }
    }

    pub fn leave(&mut self, inline_transform: &str) -> TransformRestore {
        let saved = self.saved.take();
        if inline_transform != HOVER_TRANSFORM {
            return TransformRestore::Keep;
        }
        match saved {
            Some(transform) if !transform.is_empty() => TransformRestore::Set(transform),
            _ => TransformRestore::Remove,
        }
    }
}

fn hover_enter(el: &HtmlElement, memory: &RefCell<HoverMemory>) -> Result<(), EnhanceError> {
    let style = el.style();
    memory.borrow_mut().enter(&style.get_property_value("transform")?);
    dom::set_styles(el, &[("transform", HOVER_TRANSFORM), ("box-shadow", HOVER_SHADOW)])
}

fn hover_leave(el: &HtmlElement, memory: &RefCell<HoverMemory>) -> Result<(), EnhanceError> {
    let style = el.style();
    let restore = memory.borrow_mut().leave(&style.get_property_value("transform")?);
    match restore {
        TransformRestore::Set(transform) => style.set_property("transform", &transform)?,
        TransformRestore::Remove => {
            style.remove_property("transform")?;
        }
        TransformRestore::Keep => {}
    }
    // The stylesheet's own shadow comes back.
    dom::clear_styles(el, &["box-shadow"])
}

pub fn install_hover(document: &Document, selector: &str) -> Result<Vec<Listener>, EnhanceError> {
    let targets: Vec<HtmlElement> = dom::require_all(document, selector)?;
    let mut listeners = Vec::with_capacity(targets.len() * 2);
    for target in targets {
        let memory = Rc::new(RefCell::new(HoverMemory::default()));
        for entering in [true, false] {
            let el = target.clone();
            let memory = memory.clone();
            let event = if entering { "mouseenter" } else { "mouseleave" };
            listeners.push(Listener::new(&target, event, move |_| {
                let result = if entering {
                    hover_enter(&el, &memory)
                } else {
                    hover_leave(&el, &memory)
                };
                if let Err(e) = result {
                    warn!("Hover style failed: {}", e);
                }
            })?);
        }
    }
    Ok(listeners)
}

pub fn parallax_offset(scroll_y: f64, factor: f64) -> f64 {
    scroll_y.max(0.0) * factor
}

#[derive(Clone)]
enum ParallaxTarget {
    Layer(HtmlElement),
    Hero(HtmlElement),
}

impl ParallaxTarget {
    fn find(document: &Document) -> Option<Self> {
        if let Some(layer) = dom::query_first(document, &[".hero-background"]) {
            return Some(Self::Layer(layer));
        }
        dom::query_first(document, &[".hero"]).map(Self::Hero)
    }

    fn apply(&self, offset: f64) -> Result<(), EnhanceError> {
        match self {
            Self::Layer(el) => el
                .style()
                .set_property("transform", &format!("translateY({}px)", offset))?,
            Self::Hero(el) => el
                .style()
                .set_property("background-position-y", &format!("{}px", offset))?,
        }
        Ok(())
    }
}

pub fn install_parallax(
    window: &Window,
    document: &Document,
    factor: f64,
) -> Result<Listener, EnhanceError> {
    let target = ParallaxTarget::find(document)
        .ok_or_else(|| EnhanceError::missing(".hero-background, .hero"))?;
    let win = window.clone();
    let update = move || -> Result<(), EnhanceError> {
        target.apply(parallax_offset(win.scroll_y()?, factor))
    };
    update()?;
    Listener::new(window, "scroll", move |_| {
        if let Err(e) = update() {
            warn!("Parallax update failed: {}", e);
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orb {
    pub left_pct: f64,
    pub top_pct: f64,
    pub duration_s: f64,
}

impl Orb {
    pub fn scatter(mut random: impl FnMut() -> f64) -> Self {
        Self {
            left_pct: random() * 100.0,
            top_pct: random() * 100.0,
            duration_s: 10.0 + random() * 10.0,
        }
    }
}

pub fn install_orbs(document: &Document, count: usize) -> Result<(), EnhanceError> {
    if count == 0 {
        return Ok(());
    }
    let body = dom::body(document)?;
    let container = document.create_element("div")?;
    container.class_list().add_1("bg-orb")?;
    for _ in 0..count {
        let orb = Orb::scatter(Math::random);
        let node: HtmlElement = document.create_element("div")?.unchecked_into();
        node.class_list().add_1("orb")?;
        dom::set_styles(
            &node,
            &[
                ("left", format!("{}%", orb.left_pct).as_str()),
                ("top", format!("{}%", orb.top_pct).as_str()),
                ("animation-duration", format!("{}s", orb.duration_s).as_str()),
            ],
        )?;
        container.append_child(&node)?;
    }
    body.append_child(&container)?;
    Ok(())
}

pub fn install_cursor_glow(document: &Document) -> Result<Listener, EnhanceError> {
    let body = dom::body(document)?;
    let glow: HtmlElement = document.create_element("div")?.unchecked_into();
    glow.class_list().add_1("cursor-glow")?;
    body.append_child(&glow)?;
    Listener::new(document, "mousemove", move |event| {
        let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
            return;
        };
        let transform = format!("translate({}px, {}px)", mouse.client_x(), mouse.client_y());
        let _ = glow.style().set_property("transform", &transform);
    })
}
