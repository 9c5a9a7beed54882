//! Bridge between an off-screen browser engine and a host application
//! that consumes rendered frames as a texture.
//!
//! The engine paints BGRA pixels and emits lifecycle events on its own
//! execution context; the host owns a float RGBA texture and a small set
//! of native callbacks. This crate owns the middle: the dirty-rectangle
//! paint pipeline (convert, merge, scroll-blit fast path) and the
//! event-to-callback multiplexer (navigation hooks, load signals,
//! script-host messages, health events).
//!
//! Engine internals (DOM, JS, networking) are opaque here; the engine is
//! reached through the [`engine::EngineBackend`] seam and everything else
//! hangs off [`session::BrowserSession`].

mod bridge;
mod callbacks;
mod config;
mod engine;
mod error;
mod events;
mod frame;
mod nav;
mod rect;
mod session;

pub use bridge::{EventBridge, Health, MirrorFn};
pub use callbacks::{
    ApplyTextureFn, CallbackRegistry, ExternalHostFn, HealthEvent, HealthFn, LoadCompleteFn,
    NavHookFn, PaintReadyFn, ScrollBlitFn,
};
pub use config::SessionConfig;
pub use engine::{DynamicEngine, EngineBackend, EngineRuntime, StubEngine, WindowHandle};
pub use error::{BridgeError, Result};
pub use events::{EngineEvent, EventReply, PaintEvent};
pub use frame::{BgraPixel, CHANNELS, FrameBuffer, RgbaPixelF};
pub use nav::{NavDecision, NavigationFilter};
pub use rect::{DirtyRect, DirtyRegionTracker};
pub use session::BrowserSession;
