#![cfg(target_arch = "wasm32")]
//! Browser entry point. Both features are independent: navigation activates
//! when the page has a `main.main` region, particles when a `#particles`
//! canvas is present. Neither failing stops the other.

mod dom;
mod nav;
mod particles;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("site-web starting");

    let Some(document) = dom::window_document() else {
        return Ok(());
    };

    if let Err(e) = nav::boot(&document) {
        log::error!("navigation init error: {e:?}");
    }
    if let Err(e) = particles::boot(&document) {
        log::error!("particles init error: {e:?}");
    }
    Ok(())
}
