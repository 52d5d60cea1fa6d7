//! Soft navigation: intercept page-like link clicks, fetch the destination,
//! and patch the current document instead of reloading it.
//!
//! Every failure mode falls back to a full page load; the only silent no-op
//! is a fetch superseded by a newer navigation.

use crate::dom;
use site_core::nav::{
    is_html_content_type, should_intercept, LinkCandidate, ACTIVE_CLASS, HEAD_SELECTORS,
    MAIN_SELECTOR, NAVIGATE_EVENT, NAV_LINKS_SELECTOR, TRANSITION_MS,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

struct NavState {
    reduced_motion: bool,
    /// At most one in-flight fragment fetch; a newer navigation aborts it.
    controller: RefCell<Option<web::AbortController>>,
}

pub fn boot(document: &web::Document) -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let state = Rc::new(NavState {
        reduced_motion: dom::prefers_reduced_motion(),
        controller: RefCell::new(None),
    });

    if let Ok(history) = window.history() {
        let _ = history.set_scroll_restoration(web::ScrollRestoration::Manual);
    }

    // Click interception via event delegation on the document.
    {
        let state_click = state.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::MouseEvent| {
            handle_click(&state_click, &ev);
        }) as Box<dyn FnMut(_)>);
        document
            .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;
        closure.forget();
    }

    // Browser back/forward re-runs the same routine without pushing history.
    {
        let state_pop = state.clone();
        let closure = Closure::wrap(Box::new(move || {
            let Some(href) = current_href() else { return };
            let state = state_pop.clone();
            spawn_local(async move {
                navigate(state, href, false).await;
            });
        }) as Box<dyn FnMut()>);
        window
            .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
            .map_err(dom::js_err)?;
        closure.forget();
    }

    Ok(())
}

fn handle_click(state: &Rc<NavState>, ev: &web::MouseEvent) {
    // Modified clicks open tabs/windows; leave them to the browser.
    if ev.meta_key() || ev.ctrl_key() || ev.shift_key() || ev.alt_key() {
        return;
    }
    if ev.button() != 0 {
        return;
    }

    let Some(target) = ev.target() else { return };
    let Some(el) = target.dyn_ref::<web::Element>() else {
        return;
    };
    let Ok(Some(anchor_el)) = el.closest("a") else {
        return;
    };
    let Ok(anchor) = anchor_el.dyn_into::<web::HtmlAnchorElement>() else {
        return;
    };

    let href = anchor.href();
    if href.is_empty() {
        return;
    }
    let Ok(url) = web::Url::new(&href) else { return };

    let Some(window) = web::window() else { return };
    let location = window.location();
    let (Ok(page_origin), Ok(page_pathname), Ok(page_href)) =
        (location.origin(), location.pathname(), location.href())
    else {
        return;
    };

    let origin = url.origin();
    let pathname = url.pathname();
    let hash = url.hash();
    let link = LinkCandidate {
        origin: &origin,
        pathname: &pathname,
        hash: &hash,
        target_blank: anchor.target() == "_blank",
        download: anchor.has_attribute("download"),
    };
    if !should_intercept(&link, &page_origin, &page_pathname) {
        return;
    }

    ev.prevent_default();

    // Exact same URL: intercepted, but nothing to do.
    if href == page_href {
        return;
    }

    let state = state.clone();
    spawn_local(async move {
        navigate(state, href, true).await;
    });
}

async fn navigate(state: Rc<NavState>, url: String, push: bool) {
    if let Some(prev) = state.controller.borrow_mut().take() {
        prev.abort();
    }
    let Ok(controller) = web::AbortController::new() else {
        full_load(&url);
        return;
    };
    let signal = controller.signal();
    *state.controller.borrow_mut() = Some(controller);

    let Some(document) = dom::window_document() else {
        full_load(&url);
        return;
    };
    let Some(main) = document
        .query_selector(MAIN_SELECTOR)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<web::HtmlElement>().ok())
    else {
        full_load(&url);
        return;
    };

    // The fade timer and the fetch run concurrently; the swap waits on both.
    let fade = if state.reduced_motion {
        None
    } else {
        set_opacity(&main, "0");
        Some(dom::timeout_future(TRANSITION_MS))
    };

    let response = match fetch_html(&url, &signal).await {
        Ok(resp) => resp,
        Err(_) if signal.aborted() => return, // superseded: deliberate no-op
        Err(_) => {
            set_opacity(&main, "1");
            full_load(&url);
            return;
        }
    };

    let content_type = response.headers().get("content-type").ok().flatten();
    if !response.ok() || !is_html_content_type(content_type.as_deref()) {
        set_opacity(&main, "1");
        full_load(&url);
        return;
    }

    let html = match response_text(&response).await {
        Ok(text) => text,
        Err(_) if signal.aborted() => return,
        Err(_) => {
            set_opacity(&main, "1");
            full_load(&url);
            return;
        }
    };

    let Some(doc) = parse_html(&html) else {
        set_opacity(&main, "1");
        full_load(&url);
        return;
    };
    let Some(new_main) = doc.query_selector(MAIN_SELECTOR).ok().flatten() else {
        set_opacity(&main, "1");
        full_load(&url);
        return;
    };

    if let Some(fade) = fade {
        let _ = fade.await;
    }
    if signal.aborted() {
        return; // a newer navigation won while we waited on the fade
    }

    // Fragment is same-origin server HTML parsed via DOMParser, which neither
    // executes scripts nor loads subresources.
    main.set_inner_html(&new_main.inner_html());
    document.set_title(&doc.title());
    sync_head(&document, &doc);
    update_active_nav(&document, &doc);

    if push {
        if let Some(history) = web::window().and_then(|w| w.history().ok()) {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(&url));
        }
    }

    scroll_to_destination(&document, &url);

    if !state.reduced_motion {
        set_opacity(&main, "1");
    }

    if let Ok(ev) = web::CustomEvent::new(NAVIGATE_EVENT) {
        let _ = document.dispatch_event(&ev);
    }

    if !signal.aborted() {
        state.controller.borrow_mut().take();
    }
}

async fn fetch_html(url: &str, signal: &web::AbortSignal) -> Result<web::Response, JsValue> {
    let window = web::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let init = web::RequestInit::new();
    init.set_signal(Some(signal));
    let headers = web::Headers::new()?;
    headers.set("Accept", "text/html")?;
    init.set_headers(&headers.into());
    let resp = wasm_bindgen_futures::JsFuture::from(window.fetch_with_str_and_init(url, &init))
        .await?;
    resp.dyn_into::<web::Response>()
}

async fn response_text(response: &web::Response) -> Result<String, JsValue> {
    let text = wasm_bindgen_futures::JsFuture::from(response.text()?).await?;
    Ok(text.as_string().unwrap_or_default())
}

fn parse_html(html: &str) -> Option<web::Document> {
    let parser = web::DomParser::new().ok()?;
    parser
        .parse_from_string(html, web::SupportedType::TextHtml)
        .ok()
}

/// Reconcile the head metadata allow-list: drop the old element, clone in the
/// fetched one, one selector at a time.
fn sync_head(document: &web::Document, fetched: &web::Document) {
    let (Some(head), Some(new_head)) = (document.head(), fetched.head()) else {
        return;
    };
    for selector in HEAD_SELECTORS {
        if let Ok(Some(old)) = head.query_selector(selector) {
            old.remove();
        }
        if let Ok(Some(new)) = new_head.query_selector(selector) {
            if let Ok(clone) = new.clone_node_with_deep(true) {
                let _ = head.append_child(&clone);
            }
        }
    }
}

/// Copy the `active` marker onto the nav links from the fetched document.
fn update_active_nav(document: &web::Document, fetched: &web::Document) {
    let Ok(links) = document.query_selector_all(NAV_LINKS_SELECTOR) else {
        return;
    };
    for i in 0..links.length() {
        let Some(link) = links
            .item(i)
            .and_then(|n| n.dyn_into::<web::Element>().ok())
        else {
            continue;
        };
        let Some(href) = link.get_attribute("href") else {
            continue;
        };
        let selector = format!("{NAV_LINKS_SELECTOR}[href=\"{href}\"]");
        let is_active = fetched
            .query_selector(&selector)
            .ok()
            .flatten()
            .map(|m| m.class_list().contains(ACTIVE_CLASS))
            .unwrap_or(false);
        let list = link.class_list();
        let _ = if is_active {
            list.add_1(ACTIVE_CLASS)
        } else {
            list.remove_1(ACTIVE_CLASS)
        };
    }
}

fn scroll_to_destination(document: &web::Document, url: &str) {
    let hash = web::Url::new(url).map(|u| u.hash()).unwrap_or_default();
    if !hash.is_empty() {
        if let Ok(Some(target)) = document.query_selector(&hash) {
            let opts = web::ScrollIntoViewOptions::new();
            opts.set_behavior(web::ScrollBehavior::Instant);
            target.scroll_into_view_with_scroll_into_view_options(&opts);
            return;
        }
    }
    if let Some(window) = web::window() {
        let opts = web::ScrollToOptions::new();
        opts.set_top(0.0);
        opts.set_behavior(web::ScrollBehavior::Instant);
        window.scroll_to_with_scroll_to_options(&opts);
    }
}

fn set_opacity(main: &web::HtmlElement, value: &str) {
    let _ = main.style().set_property("opacity", value);
}

fn current_href() -> Option<String> {
    web::window().and_then(|w| w.location().href().ok())
}

fn full_load(url: &str) {
    log::warn!("soft navigation fallback, full load: {url}");
    if let Some(w) = web::window() {
        let _ = w.location().set_href(url);
    }
}
