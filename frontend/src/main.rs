use std::cell::RefCell;

use log::{error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

mod config;
mod controller;
mod counters;
mod dom;
mod effects;
mod error;
mod forms;
mod nav;
mod reveal;
mod components {
    pub mod notification;
}

use config::EnhancerConfig;
use controller::Enhancer;
use error::EnhanceError;

thread_local! {
    // Listeners and observers live as long as the page does.
    static ENHANCER: RefCell<Option<Enhancer>> = RefCell::new(None);
}

fn start() {
    if let Err(e) = enhance_page() {
        error!("Cannot enhance page: {}", e);
    }
}

fn enhance_page() -> Result<(), EnhanceError> {
    let window = dom::window()?;
    let document = dom::document()?;
    let config = EnhancerConfig::load(&document);
    let enhancer = Enhancer::install(&window, &document, config);
    ENHANCER.with(|slot| *slot.borrow_mut() = Some(enhancer));
    Ok(())
}

fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(config::log_level()).expect("error initializing log");

    info!("Starting page enhancer");
    match dom::document() {
        Ok(document) if document.ready_state() == "loading" => {
            let ready = Closure::once_into_js(start);
            if let Err(e) =
                document.add_event_listener_with_callback("DOMContentLoaded", ready.unchecked_ref())
            {
                warn!("Could not wait for DOMContentLoaded: {:?}", e);
            }
        }
        Ok(_) => start(),
        Err(e) => error!("Cannot enhance page: {}", e),
    }
}
