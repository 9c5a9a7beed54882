//! C ABI surface for embedding the browser bridge in a native host.
//!
//! The host talks to sessions by integer id (it used its texture id in
//! the original embedding). Session state lives in a process-wide
//! registry; the exported functions in [`ffi`] look sessions up per call.
//!
//! Engine glue written in Rust links against this crate as an rlib and
//! feeds window events through [`deliver_event`].

pub mod ffi;

use std::collections::HashMap;
use std::ffi::CString;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use webtex_bridge::{
    BrowserSession, EngineBackend, EngineEvent, EngineRuntime, EventReply, SessionConfig,
};

/// A host-pinned `width * height * 4` float pixel buffer.
///
/// The host guarantees the memory stays valid and pinned from window
/// creation until the matching destroy call; the mirror hook writes
/// committed dirty rects into it from the engine event context.
struct HostBuffer {
    ptr: *mut f32,
    len: usize,
}

// Safety: the buffer is pinned by the host for the window's lifetime and
// only written from the (engine-serialized) mirror hook.
unsafe impl Send for HostBuffer {}

impl HostBuffer {
    fn as_mut_slice(&mut self) -> &mut [f32] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.len) }
    }
}

struct FfiSession {
    session: BrowserSession,
    /// C-string cache for the last script-host message; the returned
    /// pointer stays valid until the next query or message.
    last_message: Option<CString>,
}

static RUNTIME: Lazy<Mutex<Option<EngineRuntime>>> = Lazy::new(|| Mutex::new(None));
static SESSIONS: Lazy<Mutex<HashMap<i32, FfiSession>>> = Lazy::new(|| Mutex::new(HashMap::new()));

/// Install an explicit engine backend instead of the dynamically loaded
/// one. For Rust embeddings and tests; C hosts go through `webtex_init`.
pub fn init_runtime_with_backend(backend: Arc<dyn EngineBackend>) -> bool {
    let mut runtime = RUNTIME.lock();
    if runtime.is_some() {
        log::warn!("runtime already initialized");
        return false;
    }
    *runtime = Some(EngineRuntime::with_backend(backend));
    true
}

pub(crate) fn init_runtime_dynamic(cache_dir: &std::path::Path) -> bool {
    let mut runtime = RUNTIME.lock();
    if runtime.is_some() {
        log::warn!("runtime already initialized");
        return false;
    }
    match EngineRuntime::init(cache_dir) {
        Ok(r) => {
            *runtime = Some(r);
            true
        }
        Err(e) => {
            log::error!("engine runtime init failed: {}", e);
            false
        }
    }
}

pub(crate) fn create_session(config: &SessionConfig, pixels: Option<HostBufferSpec>) -> bool {
    let runtime = RUNTIME.lock();
    let Some(runtime) = runtime.as_ref() else {
        log::error!("webtex not initialized");
        return false;
    };

    let mut sessions = SESSIONS.lock();
    if sessions.contains_key(&config.id) {
        log::error!("window {} already exists", config.id);
        return false;
    }

    let session = match BrowserSession::new(runtime, config) {
        Ok(s) => s,
        Err(e) => {
            log::error!("window {} creation failed: {}", config.id, e);
            return false;
        }
    };

    if let Some(spec) = pixels {
        let mut buffer = HostBuffer {
            ptr: spec.ptr,
            len: spec.len,
        };
        session.set_mirror(Some(Box::new(move |frame, rect| {
            frame.mirror_rect(rect, buffer.as_mut_slice());
        })));
    }

    sessions.insert(
        config.id,
        FfiSession {
            session,
            last_message: None,
        },
    );
    true
}

pub(crate) struct HostBufferSpec {
    pub ptr: *mut f32,
    pub len: usize,
}

pub(crate) fn destroy_session(id: i32) {
    if SESSIONS.lock().remove(&id).is_none() {
        log::warn!("destroy of unknown window {}", id);
    }
}

pub(crate) fn with_session<R>(id: i32, f: impl FnOnce(&mut FfiSession) -> R) -> Option<R> {
    let mut sessions = SESSIONS.lock();
    match sessions.get_mut(&id) {
        Some(entry) => Some(f(entry)),
        None => {
            log::warn!("unknown window {}", id);
            None
        }
    }
}

/// Deliver one engine event to a window's bridge. Entry point for engine
/// glue; events for one window must already be serialized by the engine.
pub fn deliver_event(id: i32, event: EngineEvent<'_>) -> EventReply {
    with_session(id, |entry| entry.session.deliver(event)).unwrap_or(EventReply::Continue)
}

pub(crate) fn pump_engine() {
    if let Some(runtime) = RUNTIME.lock().as_ref() {
        runtime.update();
    }
}

pub(crate) fn teardown() {
    SESSIONS.lock().clear();
    if let Some(runtime) = RUNTIME.lock().take() {
        runtime.shutdown();
    }
}
