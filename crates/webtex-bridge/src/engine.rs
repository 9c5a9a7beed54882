//! Engine runtime and window handles.
//!
//! The browser engine is opaque to this crate: it is reached through the
//! `EngineBackend` seam, either dynamically loaded from a shim library
//! (`DynamicEngine`) or stubbed in-process for tests and demos
//! (`StubEngine`). The process-wide engine lifecycle that the original
//! design left ambient is modelled explicitly by `EngineRuntime`, whose
//! dynamic `init`/`shutdown` pair runs exactly once per process.

use std::ffi::{CString, c_char, c_int, c_void};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use libloading::{Library, Symbol};
use parking_lot::Mutex;

use crate::{BridgeError, Result};

/// Opaque per-window handle owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHandle(*mut c_void);

impl WindowHandle {
    pub const NULL: WindowHandle = WindowHandle(std::ptr::null_mut());

    pub fn from_raw(ptr: *mut c_void) -> Self {
        Self(ptr)
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.0
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }
}

/// The engine operations a session needs. Event delivery into the bridge
/// is not part of this seam: whatever glue adapts a concrete engine's
/// callback surface hands events to `BrowserSession::deliver` directly.
pub trait EngineBackend: Send + Sync {
    fn create_window(
        &self,
        width: i32,
        height: i32,
        transparency: bool,
        url: &str,
    ) -> Result<WindowHandle>;

    fn destroy_window(&self, handle: WindowHandle);

    fn navigate(&self, handle: WindowHandle, url: &str) -> Result<()>;

    /// One iteration of the engine's message loop.
    fn update(&self);

    fn shutdown(&self);
}

// -- dynamic engine shim ---------------------------------------------

type WtxInitFn = unsafe extern "C" fn(*const c_char) -> c_int;
type WtxShutdownFn = unsafe extern "C" fn();
type WtxUpdateFn = unsafe extern "C" fn();
type WtxWindowCreateFn =
    unsafe extern "C" fn(c_int, c_int, c_int, *const c_char) -> *mut c_void;
type WtxWindowDestroyFn = unsafe extern "C" fn(*mut c_void);
type WtxWindowNavigateFn = unsafe extern "C" fn(*mut c_void, *const c_char);

/// Dynamically loaded engine shim library.
struct EngineLibrary {
    #[allow(dead_code)]
    lib: Library,
    wtx_init: WtxInitFn,
    wtx_shutdown: WtxShutdownFn,
    wtx_update: WtxUpdateFn,
    wtx_window_create: WtxWindowCreateFn,
    wtx_window_destroy: WtxWindowDestroyFn,
    wtx_window_navigate: WtxWindowNavigateFn,
}

impl EngineLibrary {
    fn load() -> Result<Self> {
        let lib_name = Self::library_name();

        let lib = if let Ok(path) = std::env::var("WEBTEX_ENGINE_PATH") {
            let path = PathBuf::from(path);
            let lib_path = if path.is_file() {
                path
            } else {
                path.join(lib_name)
            };
            log::info!("loading engine library from {}", lib_path.display());
            unsafe { Library::new(&lib_path) }
        } else {
            log::info!("loading engine library from system path: {}", lib_name);
            unsafe { Library::new(lib_name) }
        }
        .map_err(|e| BridgeError::LibraryLoad(e.to_string()))?;

        let (wtx_init, wtx_shutdown, wtx_update, wtx_window_create, wtx_window_destroy, wtx_window_navigate) = unsafe {
            let init: Symbol<WtxInitFn> = lib
                .get(b"wtx_init")
                .map_err(|e| BridgeError::SymbolNotFound(format!("wtx_init: {}", e)))?;
            let shutdown: Symbol<WtxShutdownFn> = lib
                .get(b"wtx_shutdown")
                .map_err(|e| BridgeError::SymbolNotFound(format!("wtx_shutdown: {}", e)))?;
            let update: Symbol<WtxUpdateFn> = lib
                .get(b"wtx_update")
                .map_err(|e| BridgeError::SymbolNotFound(format!("wtx_update: {}", e)))?;
            let create: Symbol<WtxWindowCreateFn> = lib
                .get(b"wtx_window_create")
                .map_err(|e| BridgeError::SymbolNotFound(format!("wtx_window_create: {}", e)))?;
            let destroy: Symbol<WtxWindowDestroyFn> = lib
                .get(b"wtx_window_destroy")
                .map_err(|e| BridgeError::SymbolNotFound(format!("wtx_window_destroy: {}", e)))?;
            let navigate: Symbol<WtxWindowNavigateFn> = lib
                .get(b"wtx_window_navigate")
                .map_err(|e| BridgeError::SymbolNotFound(format!("wtx_window_navigate: {}", e)))?;

            (*init, *shutdown, *update, *create, *destroy, *navigate)
        };

        Ok(Self {
            lib,
            wtx_init,
            wtx_shutdown,
            wtx_update,
            wtx_window_create,
            wtx_window_destroy,
            wtx_window_navigate,
        })
    }

    #[cfg(target_os = "windows")]
    fn library_name() -> &'static str {
        "webtex_engine.dll"
    }

    #[cfg(target_os = "macos")]
    fn library_name() -> &'static str {
        "libwebtex_engine.dylib"
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    fn library_name() -> &'static str {
        "libwebtex_engine.so"
    }
}

static ENGINE_LIBRARY: OnceLock<Arc<EngineLibrary>> = OnceLock::new();

fn get_engine_library() -> Result<Arc<EngineLibrary>> {
    if let Some(lib) = ENGINE_LIBRARY.get() {
        return Ok(Arc::clone(lib));
    }
    let lib = EngineLibrary::load().map(Arc::new)?;
    // In case of concurrent initialization, prefer the one that won the race.
    if ENGINE_LIBRARY.set(Arc::clone(&lib)).is_err() {
        if let Some(existing) = ENGINE_LIBRARY.get() {
            return Ok(Arc::clone(existing));
        }
    }
    Ok(lib)
}

/// Engine backend bound to the dynamically loaded shim.
pub struct DynamicEngine {
    library: Arc<EngineLibrary>,
}

impl DynamicEngine {
    fn new(cache_dir: &Path) -> Result<Self> {
        let library = get_engine_library()?;
        let cache = CString::new(cache_dir.to_string_lossy().as_bytes())?;
        let ok = unsafe { (library.wtx_init)(cache.as_ptr()) };
        if ok == 0 {
            return Err(BridgeError::InitFailed("wtx_init returned failure".into()));
        }
        Ok(Self { library })
    }
}

impl EngineBackend for DynamicEngine {
    fn create_window(
        &self,
        width: i32,
        height: i32,
        transparency: bool,
        url: &str,
    ) -> Result<WindowHandle> {
        let url = CString::new(url)?;
        let handle = unsafe {
            (self.library.wtx_window_create)(
                width,
                height,
                transparency as c_int,
                url.as_ptr(),
            )
        };
        if handle.is_null() {
            return Err(BridgeError::WindowCreate(
                "wtx_window_create returned null".into(),
            ));
        }
        Ok(WindowHandle::from_raw(handle))
    }

    fn destroy_window(&self, handle: WindowHandle) {
        if !handle.is_null() {
            unsafe { (self.library.wtx_window_destroy)(handle.as_ptr()) };
        }
    }

    fn navigate(&self, handle: WindowHandle, url: &str) -> Result<()> {
        if handle.is_null() {
            return Err(BridgeError::NotInitialized);
        }
        let url = CString::new(url)?;
        unsafe { (self.library.wtx_window_navigate)(handle.as_ptr(), url.as_ptr()) };
        Ok(())
    }

    fn update(&self) {
        unsafe { (self.library.wtx_update)() };
    }

    fn shutdown(&self) {
        unsafe { (self.library.wtx_shutdown)() };
    }
}

// -- stub engine ------------------------------------------------------

#[derive(Default)]
struct StubState {
    next_handle: usize,
    live: Vec<usize>,
    navigations: Vec<String>,
    updates: usize,
    shutdowns: usize,
}

/// In-process engine stand-in for tests and the demo driver. Hands out
/// fake handles and records what a real engine would have been asked.
#[derive(Default)]
pub struct StubEngine {
    state: Mutex<StubState>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_windows(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().navigations.clone()
    }

    pub fn update_count(&self) -> usize {
        self.state.lock().updates
    }

    pub fn shutdown_count(&self) -> usize {
        self.state.lock().shutdowns
    }
}

impl EngineBackend for StubEngine {
    fn create_window(
        &self,
        width: i32,
        height: i32,
        _transparency: bool,
        url: &str,
    ) -> Result<WindowHandle> {
        if width <= 0 || height <= 0 {
            return Err(BridgeError::WindowCreate(format!(
                "bad dimensions {}x{}",
                width, height
            )));
        }
        let mut state = self.state.lock();
        state.next_handle += 1;
        let id = state.next_handle;
        state.live.push(id);
        state.navigations.push(url.to_string());
        Ok(WindowHandle::from_raw(id as *mut c_void))
    }

    fn destroy_window(&self, handle: WindowHandle) {
        let id = handle.as_ptr() as usize;
        self.state.lock().live.retain(|&h| h != id);
    }

    fn navigate(&self, handle: WindowHandle, url: &str) -> Result<()> {
        if handle.is_null() {
            return Err(BridgeError::NotInitialized);
        }
        self.state.lock().navigations.push(url.to_string());
        Ok(())
    }

    fn update(&self) {
        self.state.lock().updates += 1;
    }

    fn shutdown(&self) {
        self.state.lock().shutdowns += 1;
    }
}

// -- runtime ----------------------------------------------------------

static DYNAMIC_RUNTIME_STARTED: AtomicBool = AtomicBool::new(false);

/// Process-scoped engine lifecycle, handed to each session at
/// construction instead of assumed ambient.
pub struct EngineRuntime {
    backend: Arc<dyn EngineBackend>,
    shut_down: AtomicBool,
}

impl EngineRuntime {
    /// Start the dynamically loaded engine. May be called at most once
    /// per process; a second call fails rather than re-initializing the
    /// engine underneath live sessions.
    pub fn init(cache_dir: &Path) -> Result<Self> {
        if DYNAMIC_RUNTIME_STARTED.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::InitFailed(
                "engine runtime already initialized".into(),
            ));
        }
        let backend = DynamicEngine::new(cache_dir).inspect_err(|_| {
            DYNAMIC_RUNTIME_STARTED.store(false, Ordering::SeqCst);
        })?;
        log::info!("engine runtime initialized (cache: {})", cache_dir.display());
        Ok(Self {
            backend: Arc::new(backend),
            shut_down: AtomicBool::new(false),
        })
    }

    /// Wrap an explicit backend (stub or otherwise). Not subject to the
    /// once-per-process rule; useful for tests and embedding.
    pub fn with_backend(backend: Arc<dyn EngineBackend>) -> Self {
        Self {
            backend,
            shut_down: AtomicBool::new(false),
        }
    }

    pub fn backend(&self) -> Arc<dyn EngineBackend> {
        Arc::clone(&self.backend)
    }

    /// Pump the engine message loop once.
    pub fn update(&self) {
        if !self.shut_down.load(Ordering::SeqCst) {
            self.backend.update();
        }
    }

    /// Tear the engine down. Idempotent; sessions must be destroyed
    /// first.
    pub fn shutdown(&self) {
        if !self.shut_down.swap(true, Ordering::SeqCst) {
            self.backend.shutdown();
        }
    }
}
