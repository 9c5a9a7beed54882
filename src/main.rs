//! Headless demo of the browser-to-texture bridge.
//!
//! Stands in for a real host: creates a session against the stub engine,
//! feeds it a scripted event sequence and reads the resulting dirty
//! rects and pixels back the way a host uploads them to a texture. Set
//! `WEBTEX_CONFIG` to point at an alternative `webtex.toml`.

use std::ffi::{CStr, c_char};
use std::sync::Arc;

use anyhow::{Context, Result};
use webtex_bridge::{
    BrowserSession, DirtyRect, EngineEvent, EngineRuntime, PaintEvent, SessionConfig, StubEngine,
};

extern "C" fn on_paint_ready() {
    log::info!("host: paint ready");
}

extern "C" fn on_apply_texture() {
    log::info!("host: texture applied");
}

extern "C" fn on_scroll(l: i32, t: i32, w: i32, h: i32, dx: i32, dy: i32) {
    log::info!("host: scroll blit ({l},{t},{w},{h}) by ({dx},{dy})");
}

extern "C" fn on_nav_hook(url: *const c_char) {
    let url = unsafe { CStr::from_ptr(url) }.to_string_lossy();
    log::info!("host: navigation hooked for {url}");
}

extern "C" fn on_load(url: *const c_char) {
    let url = unsafe { CStr::from_ptr(url) }.to_string_lossy();
    log::info!("host: load complete at {url}");
}

extern "C" fn on_external_host() {
    // Signal only; the message itself is pulled from the session slot.
    log::info!("host: script message arrived");
}

/// BGRA fill for a rect, one solid color.
fn solid(rect: DirtyRect, bgra: [u8; 4]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(rect.area() * 4);
    for _ in 0..rect.area() {
        buf.extend_from_slice(&bgra);
    }
    buf
}

fn paint(session: &BrowserSession, rect: DirtyRect, bgra: [u8; 4]) {
    let source = solid(rect, bgra);
    session.deliver(EngineEvent::Paint(PaintEvent {
        source: &source,
        source_rect: rect,
        copy_rects: &[rect],
        dx: 0,
        dy: 0,
        scroll_rect: DirtyRect::default(),
    }));
}

fn main() -> Result<()> {
    env_logger::init();

    let config_path =
        std::env::var("WEBTEX_CONFIG").unwrap_or_else(|_| "webtex.toml".to_string());
    let config = SessionConfig::load_or_default(std::path::Path::new(&config_path));
    log::info!(
        "session {}: {}x{} at {}",
        config.id,
        config.width,
        config.height,
        config.url
    );

    let runtime = EngineRuntime::with_backend(Arc::new(StubEngine::new()));
    let session = BrowserSession::new(&runtime, &config).context("creating browser session")?;
    session.set_paint_functions(Some(on_paint_ready), Some(on_apply_texture), Some(on_scroll));
    session.set_navigation_functions(config.nav_hook.clone(), Some(on_nav_hook), Some(on_load));
    session.set_external_host_callback(Some(on_external_host));

    // Scripted engine traffic: a page load with a full paint, a partial
    // repaint, a scroll, and a script message.
    session.deliver(EngineEvent::StartLoading {
        url: config.url.as_str(),
    });
    session.deliver(EngineEvent::TitleChanged { title: "Demo Page" });

    let full = DirtyRect::full(config.width, config.height);
    paint(&session, full, [32, 32, 32, 255]);
    log::info!("dirty after full paint: {:?}", session.take_dirty_rect());

    paint(&session, DirtyRect::new(8, 8, 16, 16), [0, 0, 255, 255]);
    paint(&session, DirtyRect::new(40, 8, 4, 4), [0, 255, 0, 255]);
    let dirty = session.take_dirty_rect();
    log::info!("dirty union after two repaints: {dirty:?}");

    session.deliver(EngineEvent::Paint(PaintEvent {
        source: &[],
        source_rect: DirtyRect::default(),
        copy_rects: &[],
        dx: 0,
        dy: -4,
        scroll_rect: DirtyRect::new(0, 4, config.width, config.height - 4),
    }));

    session.deliver(EngineEvent::Load);
    session.deliver(EngineEvent::ExternalHost {
        message: "{\"func\":\"ready\"}",
        origin: config.url.as_str(),
        target: "host",
    });

    if let Some(hook) = &config.nav_hook {
        session.deliver(EngineEvent::NavigationRequested {
            url: &format!("{}/{hook}", config.url),
            referrer: config.url.as_str(),
            is_new_window: false,
        });
    }

    let corner = session.with_frame(|frame| frame.pixel(8, 8));
    log::info!("pixel at (8,8): {corner:?}");
    log::info!(
        "title seen: {}, message: {:?}",
        session.ever_received_title_update(),
        session.last_external_host_message()
    );

    drop(session);
    runtime.shutdown();
    Ok(())
}
