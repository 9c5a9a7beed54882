//! Browser session: one engine window plus its event bridge.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::bridge::{EventBridge, Health, MirrorFn};
use crate::callbacks::{
    ApplyTextureFn, ExternalHostFn, HealthFn, LoadCompleteFn, NavHookFn, PaintReadyFn,
    ScrollBlitFn,
};
use crate::config::SessionConfig;
use crate::engine::{EngineBackend, EngineRuntime, WindowHandle};
use crate::events::{EngineEvent, EventReply};
use crate::frame::FrameBuffer;
use crate::rect::DirtyRect;
use crate::Result;

/// One embedded browser window bridged to a host texture.
///
/// The bridge state is shared between two contexts: the engine's event
/// context writes through `deliver`, the host's render loop reads through
/// the query accessors. A mutex scopes each write and each read, so the
/// host can at worst observe a one-frame-stale paint, never torn state.
///
/// Destruction releases the engine window unconditionally. The engine
/// must not be mid-delivery when the session drops; in practice the host
/// detaches the window before tearing the session down.
pub struct BrowserSession {
    id: i32,
    handle: WindowHandle,
    backend: Arc<dyn EngineBackend>,
    bridge: Arc<Mutex<EventBridge>>,
}

// Safety: the raw window handle is only ever passed back to the engine
// backend, which is itself Send + Sync.
unsafe impl Send for BrowserSession {}

impl BrowserSession {
    /// Create the engine window and its bridge. Fails when the frame
    /// buffer cannot be allocated or the engine refuses the window; a
    /// failed session holds no resources.
    pub fn new(runtime: &EngineRuntime, config: &SessionConfig) -> Result<Self> {
        let bridge = EventBridge::new(
            config.id,
            config.width,
            config.height,
            config.transparency,
            &config.url,
        )?;

        let backend = runtime.backend();
        let handle =
            backend.create_window(config.width, config.height, config.transparency, &config.url)?;

        log::info!(
            "session {}: created {}x{} window for {}",
            config.id,
            config.width,
            config.height,
            config.url
        );

        Ok(Self {
            id: config.id,
            handle,
            backend,
            bridge: Arc::new(Mutex::new(bridge)),
        })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    /// The underlying engine window handle, for host code that issues
    /// direct engine calls (input injection, resize) outside this core.
    pub fn window_handle(&self) -> WindowHandle {
        self.handle
    }

    /// Ask the engine to navigate this window.
    pub fn navigate_to(&self, url: &str) -> Result<()> {
        self.backend.navigate(self.handle, url)
    }

    // -- producer side (engine event context) ------------------------

    /// Deliver one engine event into the bridge. Engine glue calls this
    /// for every event of the window; events are serialized per window by
    /// the engine itself.
    pub fn deliver(&self, event: EngineEvent<'_>) -> EventReply {
        self.bridge.lock().handle_event(event)
    }

    // -- host-facing registration ------------------------------------

    pub fn set_paint_functions(
        &self,
        paint_ready: Option<PaintReadyFn>,
        apply_texture: Option<ApplyTextureFn>,
        scroll_blit: Option<ScrollBlitFn>,
    ) {
        self.bridge
            .lock()
            .set_paint_functions(paint_ready, apply_texture, scroll_blit);
    }

    pub fn set_navigation_functions(
        &self,
        hook_url: Option<String>,
        nav_hook: Option<NavHookFn>,
        load_complete: Option<LoadCompleteFn>,
    ) {
        self.bridge
            .lock()
            .set_navigation_functions(hook_url, nav_hook, load_complete);
    }

    pub fn set_external_host_callback(&self, callback: Option<ExternalHostFn>) {
        self.bridge.lock().set_external_host_callback(callback);
    }

    pub fn set_health_callback(&self, callback: Option<HealthFn>) {
        self.bridge.lock().set_health_callback(callback);
    }

    pub fn set_mirror(&self, mirror: Option<MirrorFn>) {
        self.bridge.lock().set_mirror(mirror);
    }

    // -- consumer side (host render loop) ----------------------------

    /// Acknowledge and reset the accumulated dirty region.
    pub fn take_dirty_rect(&self) -> DirtyRect {
        self.bridge.lock().take_dirty_rect()
    }

    /// Peek at the accumulated dirty region without acknowledging it.
    pub fn dirty_rect(&self) -> DirtyRect {
        self.bridge.lock().dirty_rect()
    }

    pub fn last_external_host_message(&self) -> Option<String> {
        self.bridge
            .lock()
            .last_external_host_message()
            .map(str::to_owned)
    }

    pub fn ever_received_title_update(&self) -> bool {
        self.bridge.lock().ever_received_title_update()
    }

    pub fn current_address(&self) -> String {
        self.bridge.lock().current_address().to_owned()
    }

    pub fn is_loading(&self) -> bool {
        self.bridge.lock().is_loading()
    }

    pub fn health(&self) -> Health {
        self.bridge.lock().health()
    }

    /// Read the frame buffer under the consumer lock.
    pub fn with_frame<R>(&self, f: impl FnOnce(&FrameBuffer) -> R) -> R {
        f(self.bridge.lock().frame())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        log::debug!("session {}: destroying window", self.id);
        self.backend.destroy_window(self.handle);
        self.handle = WindowHandle::NULL;
    }
}
