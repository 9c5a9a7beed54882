//! Host callback slots.
//!
//! The host registers plain C function pointers; the bridge fires them
//! synchronously from the engine event context. A slot that was never set
//! is a defined no-op, not an error. Setting a slot again replaces the
//! previous pointer; there is no multi-subscriber fan-out and no unset.

use std::ffi::{CString, c_char, c_int};

use crate::rect::DirtyRect;

/// Signal: a dirty rect has been converted into the frame buffer. Carries
/// no payload; the host pulls the committed rectangle separately.
pub type PaintReadyFn = extern "C" fn();

/// Signal: all rects of the current paint event are committed and the
/// host texture can be uploaded.
pub type ApplyTextureFn = extern "C" fn();

/// Instruction to shift previously valid host texture content in place:
/// (left, top, width, height, dx, dy).
pub type ScrollBlitFn = extern "C" fn(c_int, c_int, c_int, c_int, c_int, c_int);

/// A navigation target matched the configured hook substring.
pub type NavHookFn = extern "C" fn(*const c_char);

/// A page finished loading; carries the final address.
pub type LoadCompleteFn = extern "C" fn(*const c_char);

/// In-page script posted a message to the host. Signal only; the host
/// pulls the buffered message separately.
pub type ExternalHostFn = extern "C" fn();

/// Engine health changed; carries a `HealthEvent` discriminant.
pub type HealthFn = extern "C" fn(c_int);

/// Engine health transitions surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthEvent {
    Crashed = 0,
    CrashedWorker = 1,
    CrashedPlugin = 2,
    Unresponsive = 3,
    Responsive = 4,
}

impl HealthEvent {
    pub fn as_raw(self) -> c_int {
        self as c_int
    }
}

/// Storage for the host-supplied function pointers.
#[derive(Default)]
pub struct CallbackRegistry {
    paint_ready: Option<PaintReadyFn>,
    apply_texture: Option<ApplyTextureFn>,
    scroll_blit: Option<ScrollBlitFn>,
    nav_hook: Option<NavHookFn>,
    load_complete: Option<LoadCompleteFn>,
    external_host: Option<ExternalHostFn>,
    health: Option<HealthFn>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_paint_functions(
        &mut self,
        paint_ready: Option<PaintReadyFn>,
        apply_texture: Option<ApplyTextureFn>,
        scroll_blit: Option<ScrollBlitFn>,
    ) {
        self.paint_ready = paint_ready;
        self.apply_texture = apply_texture;
        self.scroll_blit = scroll_blit;
    }

    pub fn set_navigation_functions(
        &mut self,
        nav_hook: Option<NavHookFn>,
        load_complete: Option<LoadCompleteFn>,
    ) {
        self.nav_hook = nav_hook;
        self.load_complete = load_complete;
    }

    pub fn set_external_host(&mut self, callback: Option<ExternalHostFn>) {
        self.external_host = callback;
    }

    pub fn set_health(&mut self, callback: Option<HealthFn>) {
        self.health = callback;
    }

    pub fn signal_paint_ready(&self) {
        if let Some(f) = self.paint_ready {
            f();
        }
    }

    pub fn signal_apply_texture(&self) {
        if let Some(f) = self.apply_texture {
            f();
        }
    }

    pub fn signal_scroll_blit(&self, rect: DirtyRect, dx: i32, dy: i32) {
        if let Some(f) = self.scroll_blit {
            f(rect.left, rect.top, rect.width, rect.height, dx, dy);
        }
    }

    pub fn signal_nav_hook(&self, url: &str) {
        if let Some(f) = self.nav_hook {
            if let Some(url) = to_c_string(url) {
                f(url.as_ptr());
            }
        }
    }

    pub fn signal_load_complete(&self, url: &str) {
        if let Some(f) = self.load_complete {
            if let Some(url) = to_c_string(url) {
                f(url.as_ptr());
            }
        }
    }

    pub fn signal_external_host(&self) {
        if let Some(f) = self.external_host {
            f();
        }
    }

    pub fn signal_health(&self, event: HealthEvent) {
        if let Some(f) = self.health {
            f(event.as_raw());
        }
    }
}

/// Engine strings should never carry interior NULs; if one does we skip
/// the callback rather than truncate silently.
fn to_c_string(s: &str) -> Option<CString> {
    match CString::new(s) {
        Ok(c) => Some(c),
        Err(_) => {
            log::warn!("dropping callback: string contains interior NUL");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

    static PAINT_CALLS: AtomicUsize = AtomicUsize::new(0);
    static SCROLL_DX: AtomicI32 = AtomicI32::new(0);
    static NAV_LEN: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn count_paint() {
        PAINT_CALLS.fetch_add(1, Ordering::SeqCst);
    }

    extern "C" fn record_scroll(_l: c_int, _t: c_int, _w: c_int, _h: c_int, dx: c_int, _dy: c_int) {
        SCROLL_DX.store(dx, Ordering::SeqCst);
    }

    extern "C" fn record_nav(url: *const c_char) {
        let len = unsafe { CStr::from_ptr(url) }.to_bytes().len();
        NAV_LEN.store(len, Ordering::SeqCst);
    }

    #[test]
    fn unset_slots_are_noops() {
        let registry = CallbackRegistry::new();
        registry.signal_paint_ready();
        registry.signal_apply_texture();
        registry.signal_scroll_blit(DirtyRect::new(0, 0, 1, 1), 1, 1);
        registry.signal_nav_hook("http://example.com");
        registry.signal_load_complete("http://example.com");
        registry.signal_external_host();
        registry.signal_health(HealthEvent::Crashed);
    }

    #[test]
    fn set_slots_are_invoked_with_arguments() {
        let mut registry = CallbackRegistry::new();
        registry.set_paint_functions(Some(count_paint), None, Some(record_scroll));
        registry.set_navigation_functions(Some(record_nav), None);

        let before = PAINT_CALLS.load(Ordering::SeqCst);
        registry.signal_paint_ready();
        assert_eq!(PAINT_CALLS.load(Ordering::SeqCst), before + 1);

        registry.signal_scroll_blit(DirtyRect::new(0, 0, 10, 10), -7, 3);
        assert_eq!(SCROLL_DX.load(Ordering::SeqCst), -7);

        registry.signal_nav_hook("https://site/logout");
        assert_eq!(NAV_LEN.load(Ordering::SeqCst), "https://site/logout".len());
    }

    #[test]
    fn setters_replace_previous_pointer() {
        let mut registry = CallbackRegistry::new();
        registry.set_paint_functions(Some(count_paint), None, None);
        registry.set_paint_functions(None, None, None);

        let before = PAINT_CALLS.load(Ordering::SeqCst);
        registry.signal_paint_ready();
        assert_eq!(PAINT_CALLS.load(Ordering::SeqCst), before);
    }

    #[test]
    fn interior_nul_drops_the_call() {
        let mut registry = CallbackRegistry::new();
        registry.set_navigation_functions(Some(record_nav), None);
        NAV_LEN.store(usize::MAX, Ordering::SeqCst);
        registry.signal_nav_hook("bad\0url");
        assert_eq!(NAV_LEN.load(Ordering::SeqCst), usize::MAX);
    }
}
