//! Canvas particle backdrop: config from data-attributes, DPR-aware sizing,
//! pointer repulsion, visibility-gated render loop, and the one-shot text
//! formation trigger. All simulation lives in `site-core`; this module only
//! moves browser events in and pixels out.

use crate::dom;
use glam::Vec2;
use instant::Instant;
use site_core::{
    mask_points, plan_formation, ParticleConfig, ParticleField, Rgb, FORMATION_ANCHOR_GAP,
    FORMATION_DELAY_MS, FORMATION_FALLBACK_ANCHOR, FORMATION_FONT_MAX, FORMATION_FONT_SCALE,
    MESH_LINE_OPACITY, MIN_DRAW_RADIUS, MIN_FORMATION_VIEWPORT,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

const CANVAS_ID: &str = "particles";
const HERO_TITLE_SELECTOR: &str = ".hero__title";
const MAX_DPR: f64 = 2.0;

struct App {
    field: ParticleField,
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
    /// Viewport size in CSS pixels; the canvas backing store is DPR-scaled.
    view: Vec2,
    reduced_motion: bool,
    epoch: Instant,
}

pub fn boot(document: &web::Document) -> anyhow::Result<()> {
    let Some(canvas_el) = document.get_element_by_id(CANVAS_ID) else {
        return Ok(()); // page without a backdrop
    };
    let canvas: web::HtmlCanvasElement = canvas_el
        .dyn_into()
        .map_err(|_| anyhow::anyhow!("#{CANVAS_ID} is not a canvas"))?;
    let ctx = canvas
        .get_context("2d")
        .map_err(dom::js_err)?
        .ok_or_else(|| anyhow::anyhow!("no 2d context"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|_| anyhow::anyhow!("unexpected context type"))?;

    let config = {
        let dataset = canvas.dataset();
        ParticleConfig::from_lookup(|key| dataset.get(key))
    };

    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let view = viewport_size(&window);
    let seed = js_sys::Date::now() as u64;
    let field = ParticleField::new(config, view.x, view.y, seed);

    let app = Rc::new(RefCell::new(App {
        field,
        canvas,
        ctx,
        view,
        reduced_motion: dom::prefers_reduced_motion(),
        epoch: Instant::now(),
    }));
    app.borrow_mut().resize();

    wire_resize(app.clone());
    wire_pointer(app.clone(), document);
    schedule_formation(app.clone(), document.clone());
    start_loop(app, document);
    Ok(())
}

impl App {
    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    fn frame(&mut self) {
        let now = self.now_ms();
        if !self.reduced_motion {
            self.field.step(now);
        }
        self.draw();
    }

    fn resize(&mut self) {
        let Some(window) = web::window() else { return };
        let dpr = window.device_pixel_ratio();
        let dpr = if dpr > 0.0 { dpr.min(MAX_DPR) } else { 1.0 };
        self.view = viewport_size(&window);

        self.canvas.set_width((self.view.x as f64 * dpr) as u32);
        self.canvas.set_height((self.view.y as f64 * dpr) as u32);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{}px", self.view.x));
        let _ = style.set_property("height", &format!("{}px", self.view.y));
        let _ = self.ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);

        self.field.resize(self.view.x, self.view.y);
    }

    fn draw(&self) {
        let ctx = &self.ctx;
        let cfg = &self.field.config;
        let particles = &self.field.particles;
        ctx.clear_rect(0.0, 0.0, self.view.x as f64, self.view.y as f64);

        if !self.reduced_motion {
            let meshed = self.field.formation.meshed();
            let max_dist = cfg.connection_distance;

            ctx.set_line_width(0.5);
            for i in 0..particles.len() {
                for j in (i + 1)..particles.len() {
                    let a = &particles[i];
                    let b = &particles[j];
                    // Formation members get dedicated mesh lines instead.
                    if meshed && a.formation.is_some() && b.formation.is_some() {
                        continue;
                    }
                    let dist = a.pos.distance(b.pos);
                    if dist < max_dist {
                        let opacity = (1.0 - dist / max_dist) * cfg.connection_opacity;
                        stroke_line(ctx, a.pos, b.pos, cfg.color, opacity);
                    }
                }
            }

            if meshed && self.field.formation.member_count > 1 {
                ctx.set_line_width(0.8);
                for i in 0..self.field.formation.member_count {
                    let a = &particles[i];
                    let Some(slot) = a.formation else { continue };
                    for j in slot.neighbors {
                        if j < i {
                            continue; // each line drawn once, lower index owns it
                        }
                        let b = &particles[j];
                        let dist = a.pos.distance(b.pos);
                        if dist < max_dist {
                            let opacity = (1.0 - dist / max_dist) * MESH_LINE_OPACITY;
                            stroke_line(ctx, a.pos, b.pos, cfg.color, opacity);
                        }
                    }
                }
            }
        }

        for p in particles {
            ctx.begin_path();
            let _ = ctx.arc(
                p.pos.x as f64,
                p.pos.y as f64,
                p.radius.max(MIN_DRAW_RADIUS) as f64,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.set_fill_style_str(&rgba(p.color, p.opacity));
            ctx.fill();
        }
    }
}

fn stroke_line(ctx: &web::CanvasRenderingContext2d, a: Vec2, b: Vec2, color: Rgb, opacity: f32) {
    ctx.begin_path();
    ctx.move_to(a.x as f64, a.y as f64);
    ctx.line_to(b.x as f64, b.y as f64);
    ctx.set_stroke_style_str(&rgba(color, opacity));
    ctx.stroke();
}

fn rgba(color: Rgb, opacity: f32) -> String {
    format!("rgba({}, {}, {}, {})", color.r, color.g, color.b, opacity)
}

fn viewport_size(window: &web::Window) -> Vec2 {
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    Vec2::new(w as f32, h as f32)
}

fn wire_resize(app: Rc<RefCell<App>>) {
    if let Some(window) = web::window() {
        let closure = Closure::wrap(Box::new(move || {
            app.borrow_mut().resize();
        }) as Box<dyn FnMut()>);
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn wire_pointer(app: Rc<RefCell<App>>, document: &web::Document) {
    let Some(window) = web::window() else { return };

    {
        let app_move = app.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            app_move
                .borrow_mut()
                .field
                .set_pointer(ev.client_x() as f32, ev.client_y() as f32);
        }) as Box<dyn FnMut(_)>);
        let _ = window
            .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // A lifted touch stops repelling; mouse buttons do not.
    {
        let app_up = app.clone();
        let closure = Closure::wrap(Box::new(move |ev: web::PointerEvent| {
            if ev.pointer_type() == "touch" {
                app_up.borrow_mut().field.clear_pointer();
            }
        }) as Box<dyn FnMut(_)>);
        let _ =
            window.add_event_listener_with_callback("pointerup", closure.as_ref().unchecked_ref());
        let _ = window
            .add_event_listener_with_callback("pointercancel", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    {
        let app_leave = app.clone();
        let closure = Closure::wrap(Box::new(move || {
            app_leave.borrow_mut().field.clear_pointer();
        }) as Box<dyn FnMut()>);
        let _ = document
            .add_event_listener_with_callback("pointerleave", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Render loop driven by requestAnimationFrame, fully suspended while the
/// document is hidden and re-armed when it becomes visible again.
fn start_loop(app: Rc<RefCell<App>>, document: &web::Document) {
    let raf_id = Rc::new(Cell::new(None::<i32>));
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

    let tick_clone = tick.clone();
    let raf_for_tick = raf_id.clone();
    let app_tick = app.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        app_tick.borrow_mut().frame();
        if let Some(w) = web::window() {
            if let Ok(id) = w.request_animation_frame(
                tick_clone
                    .borrow()
                    .as_ref()
                    .unwrap()
                    .as_ref()
                    .unchecked_ref(),
            ) {
                raf_for_tick.set(Some(id));
            }
        }
    }) as Box<dyn FnMut()>));

    {
        let doc = document.clone();
        let tick_vis = tick.clone();
        let raf_vis = raf_id.clone();
        let closure = Closure::wrap(Box::new(move || {
            if doc.hidden() {
                if let (Some(w), Some(id)) = (web::window(), raf_vis.take()) {
                    let _ = w.cancel_animation_frame(id);
                }
            } else if raf_vis.get().is_none() {
                if let Some(w) = web::window() {
                    if let Ok(id) = w.request_animation_frame(
                        tick_vis.borrow().as_ref().unwrap().as_ref().unchecked_ref(),
                    ) {
                        raf_vis.set(Some(id));
                    }
                }
            }
        }) as Box<dyn FnMut()>);
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    if let Some(w) = web::window() {
        if let Ok(id) =
            w.request_animation_frame(tick.borrow().as_ref().unwrap().as_ref().unchecked_ref())
        {
            raf_id.set(Some(id));
        }
    }
}

/// Arm the one-shot formation: wait for fonts, then a short settle delay.
fn schedule_formation(app: Rc<RefCell<App>>, document: web::Document) {
    if app.borrow().field.config.formation_text.is_empty() {
        return;
    }
    let fonts_ready = document.fonts().ready();
    spawn_local(async move {
        if let Ok(ready) = fonts_ready {
            let _ = JsFuture::from(ready).await;
        }
        dom::sleep_ms(FORMATION_DELAY_MS).await;
        start_formation(&app, &document);
    });
}

fn start_formation(app: &Rc<RefCell<App>>, document: &web::Document) {
    let mut app = app.borrow_mut();
    if app.reduced_motion
        || app.view.x < MIN_FORMATION_VIEWPORT
        || app.field.formation.active()
    {
        return;
    }
    let text = app.field.config.formation_text.clone();
    if text.is_empty() {
        return;
    }

    let font_size = (app.view.x * FORMATION_FONT_SCALE).min(FORMATION_FONT_MAX);
    let Some(points) = text_mask_points(document, &text, font_size) else {
        return;
    };
    let Some(offsets) = plan_formation(&points, app.field.particles.len()) else {
        return;
    };

    let anchor = formation_anchor(document, app.view);
    let targets: Vec<Vec2> = offsets.iter().map(|o| anchor + *o).collect();
    let now = app.now_ms();
    app.field.begin_formation(&targets, now);
}

/// Rasterise the formation text on an offscreen canvas and sample its alpha
/// mask into centered points.
fn text_mask_points(document: &web::Document, text: &str, font_size: f32) -> Option<Vec<Vec2>> {
    let off: web::HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
    let ctx: web::CanvasRenderingContext2d =
        off.get_context("2d").ok().flatten()?.dyn_into().ok()?;

    let font = format!("bold {font_size}px \"DejaVu Sans\", sans-serif");
    ctx.set_font(&font);
    let width = ctx.measure_text(text).ok()?.width().ceil() as u32;
    let height = (font_size * 1.4).ceil() as u32;
    if width == 0 || height == 0 {
        return None;
    }
    off.set_width(width);
    off.set_height(height);

    // Resizing the canvas reset the context state.
    ctx.set_font(&font);
    ctx.set_fill_style_str("#fff");
    ctx.set_text_baseline("middle");
    ctx.fill_text(text, 0.0, height as f64 / 2.0).ok()?;

    let image = ctx
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .ok()?;
    let data = image.data();
    let step = ((font_size / 40.0).round() as usize).max(3);
    Some(mask_points(&data, width as usize, height as usize, step))
}

fn formation_anchor(document: &web::Document, view: Vec2) -> Vec2 {
    if let Ok(Some(title)) = document.query_selector(HERO_TITLE_SELECTOR) {
        let rect = title.get_bounding_client_rect();
        let cy = (rect.top() + rect.height() / 2.0) as f32;
        if view.x >= MIN_FORMATION_VIEWPORT {
            // Wide viewport: to the right of the title.
            return Vec2::new(rect.right() as f32 + FORMATION_ANCHOR_GAP, cy);
        }
        // Narrow: centered behind it.
        return Vec2::new((rect.left() + rect.width() / 2.0) as f32, cy);
    }
    Vec2::new(
        view.x * FORMATION_FALLBACK_ANCHOR[0],
        view.y * FORMATION_FALLBACK_ANCHOR[1],
    )
}
