//! End-to-end paint pipeline against a simulated host texture.
//!
//! The host side is played by a float RGBA pixel array: the scroll-blit
//! callback shifts it in place, and after each paint signal the test
//! pulls the committed dirty rect out of the session frame buffer, the
//! way a real host uploads to its texture.

use std::sync::Mutex;

use webtex_bridge::{
    BrowserSession, CHANNELS, DirtyRect, EngineEvent, EngineRuntime, PaintEvent, SessionConfig,
    StubEngine,
};

const W: i32 = 8;
const H: i32 = 8;

static HOST: Mutex<Vec<f32>> = Mutex::new(Vec::new());

/// Host-side in-place shift of previously valid texture content.
extern "C" fn host_scroll_blit(l: i32, t: i32, w: i32, h: i32, dx: i32, dy: i32) {
    let mut host = HOST.lock().unwrap();
    let snapshot = host.clone();
    for y in t..t + h {
        for x in l..l + w {
            let (nx, ny) = (x + dx, y + dy);
            if nx < 0 || ny < 0 || nx >= W || ny >= H {
                continue;
            }
            let src = (y * W + x) as usize * CHANNELS;
            let dst = (ny * W + nx) as usize * CHANNELS;
            host[dst..dst + CHANNELS].copy_from_slice(&snapshot[src..src + CHANNELS]);
        }
    }
}

fn pull_into_host(session: &BrowserSession) {
    let rect = session.take_dirty_rect();
    let mut host = HOST.lock().unwrap();
    session.with_frame(|frame| frame.mirror_rect(rect, &mut host));
}

/// BGRA source for a rect where each pixel's blue channel encodes its
/// viewport position, so shifts are traceable per pixel.
fn position_encoded(rect: DirtyRect) -> Vec<u8> {
    let mut buf = Vec::with_capacity(rect.area() * 4);
    for y in rect.top..rect.bottom() {
        for x in rect.left..rect.right() {
            buf.extend_from_slice(&[(x * W + y) as u8, 0, 0, 255]);
        }
    }
    buf
}

fn host_pixel(host: &[f32], x: i32, y: i32) -> [f32; 4] {
    let idx = (y * W + x) as usize * CHANNELS;
    host[idx..idx + CHANNELS].try_into().unwrap()
}

#[test]
fn scroll_blit_preserves_untouched_pixels_bit_identical() {
    let runtime = EngineRuntime::with_backend(std::sync::Arc::new(StubEngine::new()));
    let config = SessionConfig {
        width: W,
        height: H,
        ..SessionConfig::default()
    };
    let session = BrowserSession::new(&runtime, &config).unwrap();
    session.set_paint_functions(None, None, Some(host_scroll_blit));

    *HOST.lock().unwrap() = vec![0.0; (W * H) as usize * CHANNELS];

    // First paint: full viewport, position-encoded.
    let full = DirtyRect::full(W, H);
    let source = position_encoded(full);
    session.deliver(EngineEvent::Paint(PaintEvent {
        source: &source,
        source_rect: full,
        copy_rects: &[full],
        dx: 0,
        dy: 0,
        scroll_rect: DirtyRect::default(),
    }));

    // The first paint dirties the whole viewport.
    assert_eq!(session.dirty_rect(), full);
    pull_into_host(&session);
    assert!(session.dirty_rect().is_empty());

    let before = HOST.lock().unwrap().clone();

    // Content of (2,2,4,4) scrolls right by one; the engine repaints the
    // newly exposed column with a green marker.
    let exposed = DirtyRect::new(2, 2, 1, 4);
    let mut green = Vec::with_capacity(exposed.area() * 4);
    for _ in 0..exposed.area() {
        green.extend_from_slice(&[0, 255, 0, 255]);
    }
    session.deliver(EngineEvent::Paint(PaintEvent {
        source: &green,
        source_rect: exposed,
        copy_rects: &[exposed],
        dx: 1,
        dy: 0,
        scroll_rect: DirtyRect::new(2, 2, 4, 4),
    }));

    // Only the repainted column is dirty; the shift happened host-side.
    assert_eq!(session.dirty_rect(), exposed);
    pull_into_host(&session);

    let after = HOST.lock().unwrap().clone();

    for y in 0..H {
        for x in 0..W {
            let px = host_pixel(&after, x, y);
            let in_exposed = (2..3).contains(&x) && (2..6).contains(&y);
            let in_shift_dest = (3..7).contains(&x) && (2..6).contains(&y);
            if in_exposed {
                // Fresh green paint.
                assert_eq!(px[1], 1.0, "expected new paint at ({x},{y})");
            } else if in_shift_dest {
                // Moved content: bit-identical to the pre-scroll pixel
                // one column to the left.
                assert_eq!(
                    px,
                    host_pixel(&before, x - 1, y),
                    "expected shifted content at ({x},{y})"
                );
            } else {
                // Everything else untouched, bit for bit.
                assert_eq!(
                    px,
                    host_pixel(&before, x, y),
                    "expected untouched pixel at ({x},{y})"
                );
            }
        }
    }
}
