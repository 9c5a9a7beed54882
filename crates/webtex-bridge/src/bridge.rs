//! The event bridge: routes engine events into the paint pipeline or the
//! host callback slots.
//!
//! All handlers run synchronously on the engine's event context and
//! complete in time bounded by the event payload; nothing here blocks or
//! re-enters the engine.

use crate::callbacks::{
    ApplyTextureFn, CallbackRegistry, ExternalHostFn, HealthEvent, HealthFn, LoadCompleteFn,
    NavHookFn, PaintReadyFn, ScrollBlitFn,
};
use crate::events::{EngineEvent, EventReply, PaintEvent};
use crate::frame::FrameBuffer;
use crate::nav::{NavDecision, NavigationFilter};
use crate::rect::{DirtyRect, DirtyRegionTracker};
use crate::Result;

/// Engine window health as last reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Health {
    #[default]
    Healthy,
    Unresponsive,
    Crashed,
}

/// Hook invoked after each converted rect, before `paint_ready` fires.
/// Embedding layers use it to mirror pixels into host-owned memory.
pub type MirrorFn = Box<dyn FnMut(&FrameBuffer, DirtyRect) + Send>;

/// Converts paint events into the owned frame buffer and multiplexes the
/// remaining engine events onto the host callback slots.
pub struct EventBridge {
    id: i32,
    frame: FrameBuffer,
    tracker: DirtyRegionTracker,
    callbacks: CallbackRegistry,
    nav: NavigationFilter,
    address: String,
    last_external_host: Option<String>,
    got_title_update: bool,
    loading: bool,
    health: Health,
    mirror: Option<MirrorFn>,
}

impl EventBridge {
    /// Build a bridge with an owned frame buffer for the given viewport.
    /// Fails when the buffer cannot be allocated; a failed bridge must not
    /// be used.
    pub fn new(id: i32, width: i32, height: i32, transparency: bool, url: &str) -> Result<Self> {
        Ok(Self {
            id,
            frame: FrameBuffer::new(width, height, transparency)?,
            tracker: DirtyRegionTracker::new(),
            callbacks: CallbackRegistry::new(),
            nav: NavigationFilter::new(),
            address: url.to_string(),
            last_external_host: None,
            got_title_update: false,
            loading: false,
            health: Health::Healthy,
            mirror: None,
        })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    pub fn width(&self) -> i32 {
        self.frame.width()
    }

    pub fn height(&self) -> i32 {
        self.frame.height()
    }

    // -- host-facing registration ------------------------------------

    pub fn set_paint_functions(
        &mut self,
        paint_ready: Option<PaintReadyFn>,
        apply_texture: Option<ApplyTextureFn>,
        scroll_blit: Option<ScrollBlitFn>,
    ) {
        self.callbacks
            .set_paint_functions(paint_ready, apply_texture, scroll_blit);
    }

    pub fn set_navigation_functions(
        &mut self,
        hook_url: Option<String>,
        nav_hook: Option<NavHookFn>,
        load_complete: Option<LoadCompleteFn>,
    ) {
        self.nav.set_hook(hook_url);
        self.callbacks
            .set_navigation_functions(nav_hook, load_complete);
    }

    pub fn set_external_host_callback(&mut self, callback: Option<ExternalHostFn>) {
        self.callbacks.set_external_host(callback);
    }

    pub fn set_health_callback(&mut self, callback: Option<HealthFn>) {
        self.callbacks.set_health(callback);
    }

    pub fn set_mirror(&mut self, mirror: Option<MirrorFn>) {
        self.mirror = mirror;
    }

    // -- host-facing queries -----------------------------------------

    /// The accumulated dirty region without acknowledging it.
    pub fn dirty_rect(&self) -> DirtyRect {
        self.tracker.current()
    }

    /// Acknowledge and reset the accumulated dirty region.
    pub fn take_dirty_rect(&mut self) -> DirtyRect {
        self.tracker.take()
    }

    /// The most recent script-host message, if any. A new message
    /// overwrites the previous one; there is no queue.
    pub fn last_external_host_message(&self) -> Option<&str> {
        self.last_external_host.as_deref()
    }

    /// Latched true on the first title-change event for the session.
    pub fn ever_received_title_update(&self) -> bool {
        self.got_title_update
    }

    pub fn current_address(&self) -> &str {
        &self.address
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn health(&self) -> Health {
        self.health
    }

    // -- engine-facing dispatch --------------------------------------

    /// Handle one engine event. The single entry point for the full
    /// delegate surface; events without a host-visible effect fall through
    /// to engine-default behavior.
    pub fn handle_event(&mut self, event: EngineEvent<'_>) -> EventReply {
        match event {
            EngineEvent::Paint(paint) => {
                self.on_paint(paint);
                EventReply::Continue
            }

            EngineEvent::AddressBarChanged { url } => {
                self.address = url.to_string();
                if self.nav.decide(url) == NavDecision::Hook {
                    self.callbacks.signal_nav_hook(url);
                }
                EventReply::Continue
            }
            EngineEvent::StartLoading { url } => {
                log::debug!("window {}: start loading {}", self.id, url);
                self.address = url.to_string();
                self.loading = true;
                EventReply::Continue
            }
            EngineEvent::LoadingStateChanged { is_loading } => {
                self.loading = is_loading;
                EventReply::Continue
            }
            EngineEvent::Load => {
                self.loading = false;
                self.callbacks.signal_load_complete(&self.address);
                EventReply::Continue
            }
            EngineEvent::NavigationRequested { url, .. } => match self.nav.decide(url) {
                NavDecision::Hook => {
                    log::debug!("window {}: navigation hooked: {}", self.id, url);
                    self.callbacks.signal_nav_hook(url);
                    EventReply::CancelNavigation
                }
                NavDecision::PassThrough => EventReply::Continue,
            },
            EngineEvent::ProvisionalLoadError {
                url,
                error_code,
                is_main_frame,
            } => {
                log::warn!(
                    "window {}: load error {} for {} (main frame: {})",
                    self.id,
                    error_code,
                    url,
                    is_main_frame
                );
                EventReply::Continue
            }

            EngineEvent::TitleChanged { .. } => {
                self.got_title_update = true;
                EventReply::Continue
            }

            EngineEvent::ExternalHost { message, .. } => {
                self.last_external_host = Some(message.to_string());
                self.callbacks.signal_external_host();
                EventReply::Continue
            }

            EngineEvent::Crashed => self.on_health(Health::Crashed, HealthEvent::Crashed),
            EngineEvent::CrashedWorker => {
                log::warn!("window {}: worker crashed", self.id);
                self.callbacks.signal_health(HealthEvent::CrashedWorker);
                EventReply::Continue
            }
            EngineEvent::CrashedPlugin { plugin } => {
                log::warn!("window {}: plugin crashed: {}", self.id, plugin);
                self.callbacks.signal_health(HealthEvent::CrashedPlugin);
                EventReply::Continue
            }
            EngineEvent::Unresponsive => {
                self.on_health(Health::Unresponsive, HealthEvent::Unresponsive)
            }
            EngineEvent::Responsive => self.on_health(Health::Healthy, HealthEvent::Responsive),

            EngineEvent::ConsoleMessage {
                message,
                source,
                line,
            } => {
                log::debug!("window {}: console [{}:{}] {}", self.id, source, line, message);
                EventReply::Continue
            }
            EngineEvent::ScriptAlert { message } => {
                // Dismissed without blocking; the engine default applies.
                log::debug!("window {}: script alert dismissed: {}", self.id, message);
                EventReply::Continue
            }

            // Observed but deliberately left at engine-default behavior.
            EngineEvent::TooltipChanged { .. }
            | EngineEvent::CreatedWindow
            | EngineEvent::WidgetCreated { .. }
            | EngineEvent::WidgetDestroyed
            | EngineEvent::WidgetResized { .. }
            | EngineEvent::WidgetMoved { .. }
            | EngineEvent::WidgetPaint
            | EngineEvent::CursorUpdated
            | EngineEvent::ShowContextMenu => EventReply::Continue,
        }
    }

    fn on_health(&mut self, state: Health, event: HealthEvent) -> EventReply {
        log::warn!("window {}: health event {:?}", self.id, event);
        self.health = state;
        self.callbacks.signal_health(event);
        EventReply::Continue
    }

    /// The paint pipeline.
    ///
    /// Scroll first: previously valid host texture content is shifted by
    /// the host itself (it owns the destination memory); the bridge only
    /// hands over exact clamped geometry. Then only the newly invalidated
    /// rects are converted, so moved-but-unchanged pixels are never
    /// re-converted. `paint_ready` fires once per event after all rects
    /// are committed, followed by `apply_texture`.
    fn on_paint(&mut self, paint: PaintEvent<'_>) {
        let mut committed = false;

        if paint.dx != 0 || paint.dy != 0 {
            let scroll = paint
                .scroll_rect
                .clamped_to(self.frame.width(), self.frame.height());
            let shifted = scroll
                .translated(paint.dx, paint.dy)
                .clamped_to(self.frame.width(), self.frame.height());
            if !scroll.is_empty() && !shifted.is_empty() {
                self.callbacks.signal_scroll_blit(scroll, paint.dx, paint.dy);
                committed = true;
            }
        }

        for rect in paint.copy_rects {
            if let Some(done) = self.frame.blit_bgra(paint.source, paint.source_rect, *rect) {
                self.tracker.mark(done);
                if let Some(mirror) = self.mirror.as_mut() {
                    mirror(&self.frame, done);
                }
                committed = true;
            }
        }

        if committed {
            self.callbacks.signal_paint_ready();
            self.callbacks.signal_apply_texture();
        }
    }
}
