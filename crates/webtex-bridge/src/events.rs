//! The engine-facing event surface.
//!
//! The engine's delegate interface is modelled as one tagged event type
//! dispatched through a single `match` in the bridge. Every event the
//! engine can deliver has a variant here, including the ones the bridge
//! deliberately leaves at engine-default behavior; the contract is that
//! the full surface is covered, not that every event does something.

use crate::rect::DirtyRect;

/// Payload of a paint event.
///
/// `source` is the engine's BGRA buffer covering `source_rect` of the
/// viewport. `copy_rects` lists the sub-rectangles that actually changed.
/// A non-zero `(dx, dy)` means previously valid content inside
/// `scroll_rect` moved by that delta before the copy rects were painted.
#[derive(Debug, Clone, Copy)]
pub struct PaintEvent<'a> {
    pub source: &'a [u8],
    pub source_rect: DirtyRect,
    pub copy_rects: &'a [DirtyRect],
    pub dx: i32,
    pub dy: i32,
    pub scroll_rect: DirtyRect,
}

/// Every event the engine window can deliver, in one tagged type.
#[derive(Debug, Clone, Copy)]
pub enum EngineEvent<'a> {
    AddressBarChanged { url: &'a str },
    StartLoading { url: &'a str },
    Load,
    LoadingStateChanged { is_loading: bool },
    NavigationRequested {
        url: &'a str,
        referrer: &'a str,
        is_new_window: bool,
    },
    ProvisionalLoadError {
        url: &'a str,
        error_code: i32,
        is_main_frame: bool,
    },
    TitleChanged { title: &'a str },
    TooltipChanged { text: &'a str },
    ConsoleMessage {
        message: &'a str,
        source: &'a str,
        line: i32,
    },
    ScriptAlert { message: &'a str },
    ExternalHost {
        message: &'a str,
        origin: &'a str,
        target: &'a str,
    },
    Crashed,
    CrashedWorker,
    CrashedPlugin { plugin: &'a str },
    Unresponsive,
    Responsive,
    CreatedWindow,
    Paint(PaintEvent<'a>),
    WidgetCreated { z_index: i32 },
    WidgetDestroyed,
    WidgetResized { width: i32, height: i32 },
    WidgetMoved { x: i32, y: i32 },
    WidgetPaint,
    CursorUpdated,
    ShowContextMenu,
}

/// Answer handed back to the engine after an event is handled.
///
/// Only `NavigationRequested` can produce `CancelNavigation`; everything
/// else continues with engine-default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventReply {
    Continue,
    CancelNavigation,
}
