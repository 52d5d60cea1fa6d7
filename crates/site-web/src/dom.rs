use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Read once at startup; neither feature re-queries it afterwards.
pub fn prefers_reduced_motion() -> bool {
    web::window()
        .and_then(|w| w.match_media("(prefers-reduced-motion: reduce)").ok())
        .flatten()
        .map(|mql| mql.matches())
        .unwrap_or(false)
}

/// A future over a `setTimeout` timer. The timer is armed immediately on
/// creation, so it can run concurrently with other work and be awaited later.
pub fn timeout_future(ms: i32) -> JsFuture {
    JsFuture::from(js_sys::Promise::new(&mut |resolve, _reject| {
        if let Some(w) = web::window() {
            let _ = w.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
        }
    }))
}

/// Timer-backed async sleep; resolves on the macrotask queue.
pub async fn sleep_ms(ms: i32) {
    let _ = timeout_future(ms).await;
}

/// Map a `JsValue` error into something `anyhow` can carry.
#[inline]
pub fn js_err(e: JsValue) -> anyhow::Error {
    anyhow::anyhow!(format!("{e:?}"))
}
