use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, HtmlElement, MouseEvent, ScrollBehavior, ScrollIntoViewOptions, Window,
};

use crate::dom::{self, Listener};
use crate::error::EnhanceError;

const ANCHOR_SELECTOR: &str = r##"nav a[href^="#"]"##;
const PAGE_LINK_SELECTOR: &str = r##"a[href]:not([href^="#"])"##;
const NAV_LIST_SELECTORS: [&str; 2] = ["nav ul", ".nav-container ul"];
const OPEN_CLASS: &str = "show";

pub fn fragment_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

pub fn scroll_target<T>(href: &str, lookup: impl FnOnce(&str) -> Option<T>) -> Option<T> {
    fragment_id(href).and_then(lookup)
}

#[derive(Debug, Clone, Copy)]
pub struct LinkClick<'a> {
    pub href: &'a str,
    pub primary_button: bool,
    pub modified: bool,
    pub new_tab: bool,
    pub download: bool,
}

impl LinkClick<'_> {
    pub fn wants_transition(&self) -> bool {
        if !self.primary_button || self.modified || self.new_tab || self.download {
            return false;
        }
        let href = self.href.trim();
        if href.is_empty() || href.starts_with('#') {
            return false;
        }
        let lower = href.to_ascii_lowercase();
        !["mailto:", "tel:", "javascript:"]
            .iter()
            .any(|scheme| lower.starts_with(scheme))
    }
}

// A failed navigation must not leave the page faded out.
fn opacity_after_navigation(result: &Result<(), EnhanceError>) -> Option<&'static str> {
    result.is_err().then_some("1")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavLayout {
    Mobile,
    Desktop,
}

impl NavLayout {
    pub fn for_width(width: f64, breakpoint: f64) -> Self {
        if width < breakpoint {
            NavLayout::Mobile
        } else {
            NavLayout::Desktop
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuState {
    layout: NavLayout,
    open: bool,
}

impl MenuState {
    pub fn new(layout: NavLayout) -> Self {
        Self { layout, open: false }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) -> bool {
        if self.layout == NavLayout::Mobile {
            self.open = !self.open;
        }
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn resize(&mut self, layout: NavLayout) {
        self.layout = layout;
        if layout == NavLayout::Desktop {
            self.open = false;
        }
    }

    pub fn toggle_visible(&self) -> bool {
        self.layout == NavLayout::Mobile
    }

    pub fn list_visible(&self) -> bool {
        self.layout == NavLayout::Desktop || self.open
    }

    // Always written, so page CSS cannot hide a list that should show.
    pub fn list_display(&self) -> &'static str {
        if self.list_visible() {
            "flex"
        } else {
            "none"
        }
    }
}

const OPEN_STYLE: [(&str, &str); 9] = [
    ("display", "flex"),
    ("flex-direction", "column"),
    ("position", "absolute"),
    ("top", "100%"),
    ("left", "0"),
    ("right", "0"),
    ("padding", "1rem 0"),
    ("background", "rgba(0, 0, 0, 0.95)"),
    ("z-index", "1000"),
];

pub struct MobileNav {
    state: Cell<MenuState>,
    toggle: HtmlElement,
    list: HtmlElement,
    breakpoint: f64,
}

impl MobileNav {
    pub fn install(
        window: &Window,
        document: &Document,
        breakpoint: f64,
    ) -> Result<(Rc<Self>, Vec<Listener>), EnhanceError> {
        let list: HtmlElement = dom::query_first(document, &NAV_LIST_SELECTORS)
            .ok_or_else(|| EnhanceError::missing(NAV_LIST_SELECTORS.join(", ")))?;
        let parent = list
            .parent_node()
            .ok_or_else(|| EnhanceError::missing("nav list parent"))?;

        let toggle: HtmlElement = document.create_element("button")?.unchecked_into();
        toggle.set_text_content(Some("☰"));
        toggle.set_class_name("nav-toggle");
        toggle.set_attribute("type", "button")?;
        toggle.set_attribute("aria-label", "Toggle navigation")?;
        dom::set_styles(
            &toggle,
            &[
                ("position", "absolute"),
                ("right", "1rem"),
                ("top", "1rem"),
                ("background", "none"),
                ("border", "none"),
                ("color", "#fff"),
                ("font-size", "1.8rem"),
                ("cursor", "pointer"),
            ],
        )?;
        parent.insert_before(&toggle, Some(&list))?;

        let layout = NavLayout::for_width(dom::viewport_width(window)?, breakpoint);
        let nav = Rc::new(Self {
            state: Cell::new(MenuState::new(layout)),
            toggle,
            list,
            breakpoint,
        });
        nav.render()?;

        let on_click = {
            let nav = nav.clone();
            let toggle = nav.toggle.clone();
            Listener::new(&toggle, "click", move |event| {
                event.prevent_default();
                nav.update(|state| {
                    state.toggle();
                });
            })?
        };
        let on_resize = {
            let nav = nav.clone();
            let win = window.clone();
            Listener::new(window, "resize", move |_| match dom::viewport_width(&win) {
                Ok(width) => {
                    let layout = NavLayout::for_width(width, nav.breakpoint);
                    nav.update(|state| state.resize(layout));
                }
                Err(e) => warn!("Cannot read viewport width: {}", e),
            })?
        };

        Ok((nav, vec![on_click, on_resize]))
    }

    pub fn state(&self) -> MenuState {
        self.state.get()
    }

    pub fn close(&self) {
        if self.state().is_open() {
            self.update(MenuState::close);
        }
    }

    fn update(&self, change: impl FnOnce(&mut MenuState)) {
        let mut state = self.state.get();
        change(&mut state);
        self.state.set(state);
        if let Err(e) = self.render() {
            warn!("Failed to restyle navigation: {}", e);
        }
    }

    fn render(&self) -> Result<(), EnhanceError> {
        let state = self.state.get();
        let display = if state.toggle_visible() { "block" } else { "none" };
        self.toggle.style().set_property("display", display)?;
        self.toggle
            .set_attribute("aria-expanded", if state.is_open() { "true" } else { "false" })?;

        let open_props: Vec<&str> = OPEN_STYLE.iter().map(|(name, _)| *name).collect();
        let classes = self.list.class_list();
        if state.is_open() {
            classes.add_1(OPEN_CLASS)?;
            dom::set_styles(&self.list, &OPEN_STYLE)?;
        } else {
            classes.remove_1(OPEN_CLASS)?;
            dom::clear_styles(&self.list, &open_props)?;
        }
        self.list.style().set_property("display", state.list_display())?;
        Ok(())
    }
}

pub fn install_smooth_scroll(
    document: &Document,
    menu: Option<Rc<MobileNav>>,
) -> Result<Vec<Listener>, EnhanceError> {
    let links: Vec<Element> = dom::require_all(document, ANCHOR_SELECTOR)?;
    links
        .into_iter()
        .map(|link| {
            let document = document.clone();
            let menu = menu.clone();
            let anchor = link.clone();
            Listener::new(&link, "click", move |event| {
                let href = anchor.get_attribute("href").unwrap_or_default();
                let Some(target) = scroll_target(&href, |id| document.get_element_by_id(id)) else {
                    debug!("No section for {:?}, leaving navigation alone", href);
                    return;
                };
                event.prevent_default();
                let options = ScrollIntoViewOptions::new();
                options.set_behavior(ScrollBehavior::Smooth);
                target.scroll_into_view_with_scroll_into_view_options(&options);
                if let Some(menu) = &menu {
                    menu.close();
                }
            })
        })
        .collect()
}

pub fn install_page_transitions(
    window: &Window,
    document: &Document,
    delay_ms: u32,
) -> Result<Vec<Listener>, EnhanceError> {
    let body = dom::body(document)?;
    let links: Vec<Element> = dom::require_all(document, PAGE_LINK_SELECTOR)?;

    let mut listeners = Vec::with_capacity(links.len() + 1);
    for link in links {
        let anchor = link.clone();
        let body = body.clone();
        listeners.push(Listener::new(&link, "click", move |event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let Some(href) = anchor.get_attribute("href") else {
                return;
            };
            let click = LinkClick {
                href: &href,
                primary_button: mouse.button() == 0,
                modified: mouse.ctrl_key()
                    || mouse.meta_key()
                    || mouse.shift_key()
                    || mouse.alt_key(),
                new_tab: anchor.get_attribute("target").as_deref() == Some("_blank"),
                download: anchor.has_attribute("download"),
            };
            if !click.wants_transition() {
                return;
            }
            event.prevent_default();
            let transition = format!("opacity {}ms ease", delay_ms);
            let fade = [("transition", transition.as_str()), ("opacity", "0")];
            if let Err(e) = dom::set_styles(&body, &fade) {
                warn!("Page fade-out failed: {}", e);
            }
            let body = body.clone();
            spawn_local(async move {
                TimeoutFuture::new(delay_ms).await;
                let navigated = dom::window()
                    .and_then(|window| Ok(window.location().set_href(&href)?));
                if let Err(e) = &navigated {
                    warn!("Cannot navigate to {}: {}", href, e);
                }
                if let Some(opacity) = opacity_after_navigation(&navigated) {
                    let _ = body.style().set_property("opacity", opacity);
                }
            });
        })?);
    }

    // Pages restored from the back/forward cache come back faded out.
    listeners.push(Listener::new(window, "pageshow", move |_| {
        let _ = body.style().set_property("opacity", "1");
    })?);

    Ok(listeners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    fn sections() -> HashMap<&'static str, &'static str> {
        HashMap::from([("about", "section#about"), ("prizes", "section#prizes")])
    }

    #[test]
    fn resolvable_anchor_scrolls_to_its_section_once() {
        let lookups = RefCell::new(Vec::new());
        let found = scroll_target("#prizes", |id| {
            lookups.borrow_mut().push(id.to_string());
            sections().get(id).copied()
        });
        assert_eq!(found, Some("section#prizes"));
        assert_eq!(lookups.into_inner(), vec!["prizes".to_string()]);
    }

    #[test]
    fn unresolvable_anchor_keeps_default_navigation() {
        assert_eq!(scroll_target("#sponsors", |id| sections().get(id).copied()), None);
        assert_eq!(scroll_target("#", |id| sections().get(id).copied()), None);
        assert_eq!(scroll_target("/rules#about", |id| sections().get(id).copied()), None);
    }

    #[test]
    fn fragment_requires_a_name() {
        assert_eq!(fragment_id("#about"), Some("about"));
        assert_eq!(fragment_id("#"), None);
        assert_eq!(fragment_id("about"), None);
    }

    fn click(href: &str) -> LinkClick<'_> {
        LinkClick {
            href,
            primary_button: true,
            modified: false,
            new_tab: false,
            download: false,
        }
    }

    #[test]
    fn plain_clicks_on_page_links_fade_out() {
        assert!(click("/register").wants_transition());
        assert!(click("https://example.org/schedule").wants_transition());
    }

    #[test]
    fn special_links_and_clicks_navigate_immediately() {
        assert!(!click("#about").wants_transition());
        assert!(!click("").wants_transition());
        assert!(!click("mailto:team@hackathon.dev").wants_transition());
        assert!(!click("TEL:+15550100").wants_transition());
        assert!(!click("javascript:void(0)").wants_transition());
        assert!(!LinkClick { modified: true, ..click("/register") }.wants_transition());
        assert!(!LinkClick { new_tab: true, ..click("/register") }.wants_transition());
        assert!(!LinkClick { download: true, ..click("/brochure.pdf") }.wants_transition());
        assert!(!LinkClick { primary_button: false, ..click("/register") }.wants_transition());
    }

    #[test]
    fn failed_navigation_brings_the_page_back() {
        assert_eq!(opacity_after_navigation(&Ok(())), None);
        let failed = Err(EnhanceError::Js("SecurityError".to_string()));
        assert_eq!(opacity_after_navigation(&failed), Some("1"));
        assert_eq!(opacity_after_navigation(&Err(EnhanceError::NoWindow)), Some("1"));
    }

    #[test]
    fn breakpoint_is_exclusive() {
        assert_eq!(NavLayout::for_width(767.0, 768.0), NavLayout::Mobile);
        assert_eq!(NavLayout::for_width(768.0, 768.0), NavLayout::Desktop);
        assert_eq!(NavLayout::for_width(1280.0, 768.0), NavLayout::Desktop);
    }

    #[test]
    fn mobile_shows_toggle_and_hides_closed_list() {
        let mut state = MenuState::new(NavLayout::for_width(375.0, 768.0));
        assert!(state.toggle_visible());
        assert!(!state.list_visible());

        assert!(state.toggle());
        assert!(state.list_visible());
        assert!(!state.toggle());
        assert!(!state.list_visible());
    }

    #[test]
    fn desktop_hides_toggle_and_forces_list_visible() {
        let mut state = MenuState::new(NavLayout::for_width(1024.0, 768.0));
        assert!(!state.toggle_visible());
        assert!(state.list_visible());
        assert!(!state.toggle());
        assert!(state.list_visible());
    }

    #[test]
    fn list_display_is_written_for_every_layout() {
        let mut mobile = MenuState::new(NavLayout::Mobile);
        assert_eq!(mobile.list_display(), "none");
        mobile.toggle();
        assert_eq!(mobile.list_display(), "flex");

        let desktop = MenuState::new(NavLayout::for_width(768.0, 768.0));
        assert_eq!(desktop.list_display(), "flex");
    }

    #[test]
    fn growing_past_breakpoint_closes_open_menu() {
        let mut state = MenuState::new(NavLayout::Mobile);
        state.toggle();
        state.resize(NavLayout::Desktop);
        assert!(!state.is_open());
        assert!(state.list_visible());

        state.resize(NavLayout::Mobile);
        assert!(!state.is_open());
        assert!(!state.list_visible());
    }
}
