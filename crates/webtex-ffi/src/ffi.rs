//! Exported C symbols.
//!
//! Mirrors the embedding contract of the original plugin: a process-wide
//! init/update/destroy triple plus per-window calls keyed by the host's
//! integer id. All string parameters are NUL-terminated UTF-8; invalid
//! input is logged and rejected, never undefined behavior.

use std::ffi::{CStr, c_char, c_int};
use std::path::PathBuf;

use webtex_bridge::{
    ApplyTextureFn, ExternalHostFn, HealthFn, LoadCompleteFn, NavHookFn, PaintReadyFn,
    ScrollBlitFn, SessionConfig,
};

use crate::{HostBufferSpec, create_session, destroy_session, pump_engine, teardown, with_session};

/// Dirty rectangle handed back to the host by value.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct WebtexRect {
    pub left: c_int,
    pub top: c_int,
    pub width: c_int,
    pub height: c_int,
}

fn cstr_arg(ptr: *const c_char, what: &str) -> Option<String> {
    if ptr.is_null() {
        log::error!("{} is null", what);
        return None;
    }
    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => Some(s.to_string()),
        Err(_) => {
            log::error!("{} is not valid UTF-8", what);
            None
        }
    }
}

/// Initialize the engine runtime with the given profile/cache directory.
///
/// Returns `true` on success. Must be called once before any window is
/// created; a second call fails.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_init(home_dir: *const c_char) -> bool {
    let _ = env_logger::try_init();

    let Some(home_dir) = cstr_arg(home_dir, "home_dir") else {
        return false;
    };
    log::info!("webtex_init: cache dir {}", home_dir);
    crate::init_runtime_dynamic(&PathBuf::from(home_dir))
}

/// Destroy all windows and shut the engine runtime down.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_destroy() {
    log::info!("webtex_destroy");
    teardown();
}

/// Run one iteration of the engine message loop. Call from the host's
/// update step.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_update() {
    pump_engine();
}

/// Create a browser window bound to host-owned pixel memory.
///
/// `pixels` must point to a pinned `width * height * 4` float buffer that
/// stays valid until `webtex_window_destroy`; committed dirty rects are
/// mirrored into it before each paint-ready signal. Pass null to skip
/// mirroring and read pixels through the bridge API instead.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_window_create(
    id: c_int,
    pixels: *mut f32,
    transparency: bool,
    width: c_int,
    height: c_int,
    url: *const c_char,
) -> bool {
    let Some(url) = cstr_arg(url, "url") else {
        return false;
    };
    if width <= 0 || height <= 0 {
        log::error!("window {}: invalid size {}x{}", id, width, height);
        return false;
    }

    let config = SessionConfig {
        id,
        width,
        height,
        transparency,
        url,
        ..SessionConfig::default()
    };
    let buffer = if pixels.is_null() {
        None
    } else {
        Some(HostBufferSpec {
            ptr: pixels,
            len: width as usize * height as usize * webtex_bridge::CHANNELS,
        })
    };

    create_session(&config, buffer)
}

/// Destroy a window and release its engine handle.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_window_destroy(id: c_int) {
    destroy_session(id);
}

/// Navigate an existing window.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_window_navigate_to(id: c_int, url: *const c_char) {
    let Some(url) = cstr_arg(url, "url") else {
        return;
    };
    let _ = with_session(id, |entry| {
        if let Err(e) = entry.session.navigate_to(&url) {
            log::error!("window {}: navigation failed: {}", id, e);
        }
    });
}

/// Register the paint callback triple (any pointer may be null).
#[unsafe(no_mangle)]
pub extern "C" fn webtex_window_set_paint_functions(
    id: c_int,
    set_pixels: Option<PaintReadyFn>,
    apply_texture: Option<ApplyTextureFn>,
    scroll_rect: Option<ScrollBlitFn>,
) {
    let _ = with_session(id, |entry| {
        entry
            .session
            .set_paint_functions(set_pixels, apply_texture, scroll_rect);
    });
}

/// Register the navigation hook substring and callbacks. A null
/// `hook_url` disables hooking.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_window_set_navigation_functions(
    id: c_int,
    hook_url: *const c_char,
    nav_cb: Option<NavHookFn>,
    load_cb: Option<LoadCompleteFn>,
) {
    let hook = if hook_url.is_null() {
        None
    } else {
        cstr_arg(hook_url, "hook_url")
    };
    let _ = with_session(id, |entry| {
        entry.session.set_navigation_functions(hook, nav_cb, load_cb);
    });
}

/// Register the script-host message callback.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_window_set_external_host_callback(
    id: c_int,
    callback: Option<ExternalHostFn>,
) {
    let _ = with_session(id, |entry| {
        entry.session.set_external_host_callback(callback);
    });
}

/// Register the engine health callback.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_window_set_health_callback(id: c_int, callback: Option<HealthFn>) {
    let _ = with_session(id, |entry| {
        entry.session.set_health_callback(callback);
    });
}

/// Take the accumulated dirty rectangle, resetting it. Reading is the
/// host's acknowledgment; until the next paint the rect reads empty.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_window_get_last_dirty_rect(id: c_int) -> WebtexRect {
    with_session(id, |entry| {
        let rect = entry.session.take_dirty_rect();
        WebtexRect {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
        }
    })
    .unwrap_or_default()
}

/// The most recent script-host message as a NUL-terminated UTF-8 string,
/// or null when none arrived yet. The pointer stays valid until the next
/// call for the same window.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_window_get_last_external_host_message(id: c_int) -> *const c_char {
    with_session(id, |entry| {
        entry.last_message = entry
            .session
            .last_external_host_message()
            .and_then(|m| std::ffi::CString::new(m).ok());
        entry
            .last_message
            .as_ref()
            .map(|c| c.as_ptr())
            .unwrap_or(std::ptr::null())
    })
    .unwrap_or(std::ptr::null())
}

/// Whether the window ever received a title update. Hosts use this to
/// gate first paint and avoid flashing unstyled content.
#[unsafe(no_mangle)]
pub extern "C" fn webtex_window_ever_received_title_update(id: c_int) -> bool {
    with_session(id, |entry| entry.session.ever_received_title_update()).unwrap_or(false)
}
