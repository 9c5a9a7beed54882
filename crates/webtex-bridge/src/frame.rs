//! Owned frame store and BGRA-to-float pixel conversion.
//!
//! The engine paints BGRA 8-bit; the host texture is RGBA float. The
//! converter touches only the sub-rectangles the engine reports dirty,
//! so cost stays proportional to the changed pixel count.

use bytemuck::{Pod, Zeroable};

use crate::rect::DirtyRect;
use crate::{BridgeError, Result};

/// BGRA pixel as delivered by the engine's paint buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct BgraPixel {
    pub b: u8,
    pub g: u8,
    pub r: u8,
    pub a: u8,
}

/// RGBA pixel in the host texture's normalized float representation.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct RgbaPixelF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl RgbaPixelF {
    /// Convert one engine pixel. With `opaque` set the alpha channel is
    /// forced to 1.0 regardless of the source value.
    fn from_bgra(src: BgraPixel, opaque: bool) -> Self {
        Self {
            r: src.r as f32 / 255.0,
            g: src.g as f32 / 255.0,
            b: src.b as f32 / 255.0,
            a: if opaque { 1.0 } else { src.a as f32 / 255.0 },
        }
    }
}

/// Channels per pixel in the host representation.
pub const CHANNELS: usize = 4;

/// Owned pixel store matching the browser viewport.
///
/// Written by the engine event context through `blit_bgra`, read by the
/// host render loop. Dimensions are fixed for the life of the session.
#[derive(Debug)]
pub struct FrameBuffer {
    pixels: Vec<f32>,
    width: i32,
    height: i32,
    transparency: bool,
}

impl FrameBuffer {
    /// Allocate a zeroed `width x height` RGBA float buffer.
    ///
    /// Fails on non-positive dimensions; a session must not be considered
    /// usable when this fails.
    pub fn new(width: i32, height: i32, transparency: bool) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(BridgeError::Allocation { width, height });
        }
        let len = width as usize * height as usize * CHANNELS;
        Ok(Self {
            pixels: vec![0.0; len],
            width,
            height,
            transparency,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn transparency(&self) -> bool {
        self.transparency
    }

    /// Total channel count (`width * height * 4`).
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.pixels
    }

    /// Read back a single pixel, if in bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Option<[f32; 4]> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * CHANNELS;
        let px: &[f32; 4] = self.pixels[idx..idx + CHANNELS].try_into().ok()?;
        Some(*px)
    }

    /// Copy-convert one dirty rect from an engine BGRA buffer into this
    /// store at matching coordinates.
    ///
    /// `source_rect` describes the viewport region covered by `source`
    /// (partial repaints hand over a buffer smaller than the viewport).
    /// The rect is clamped to both the viewport and the source coverage;
    /// an empty clamp result drops the rect. Returns the rect actually
    /// committed, or `None` when nothing was written.
    pub fn blit_bgra(
        &mut self,
        source: &[u8],
        source_rect: DirtyRect,
        rect: DirtyRect,
    ) -> Option<DirtyRect> {
        let rect = rect
            .clamped_to(self.width, self.height)
            .intersect(&source_rect);
        if rect.is_empty() {
            return None;
        }

        let src_stride = source_rect.width as usize;
        let expected = source_rect.area() * CHANNELS;
        if source.len() < expected {
            log::warn!(
                "paint buffer too small: {} bytes for {}x{} source rect",
                source.len(),
                source_rect.width,
                source_rect.height
            );
            return None;
        }
        let src_pixels: &[BgraPixel] = bytemuck::cast_slice(&source[..expected]);

        let opaque = !self.transparency;
        for row in 0..rect.height {
            let y = rect.top + row;
            let src_off = (y - source_rect.top) as usize * src_stride
                + (rect.left - source_rect.left) as usize;
            let dst_off = (y as usize * self.width as usize + rect.left as usize) * CHANNELS;

            let src_row = &src_pixels[src_off..src_off + rect.width as usize];
            let dst_row: &mut [RgbaPixelF] = bytemuck::cast_slice_mut(
                &mut self.pixels[dst_off..dst_off + rect.width as usize * CHANNELS],
            );
            for (dst, src) in dst_row.iter_mut().zip(src_row) {
                *dst = RgbaPixelF::from_bgra(*src, opaque);
            }
        }

        Some(rect)
    }

    /// Copy one committed rect into a host-owned buffer laid out exactly
    /// like this store. Used by embedding layers that mirror pixels into
    /// memory pinned by the host.
    ///
    /// Returns false (and copies nothing) when the destination is too
    /// small or the rect does not fit the viewport.
    pub fn mirror_rect(&self, rect: DirtyRect, dst: &mut [f32]) -> bool {
        let rect = rect.clamped_to(self.width, self.height);
        if rect.is_empty() || dst.len() < self.pixels.len() {
            return false;
        }
        let stride = self.width as usize * CHANNELS;
        for row in 0..rect.height {
            let y = (rect.top + row) as usize;
            let off = y * stride + rect.left as usize * CHANNELS;
            let len = rect.width as usize * CHANNELS;
            dst[off..off + len].copy_from_slice(&self.pixels[off..off + len]);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bgra(b: u8, g: u8, r: u8, a: u8) -> [u8; 4] {
        [b, g, r, a]
    }

    fn solid_source(rect: DirtyRect, px: [u8; 4]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(rect.area() * 4);
        for _ in 0..rect.area() {
            buf.extend_from_slice(&px);
        }
        buf
    }

    #[test]
    fn construction_sizes_buffer() {
        let fb = FrameBuffer::new(8, 4, false).unwrap();
        assert_eq!(fb.len(), 8 * 4 * CHANNELS);
        assert_eq!(fb.pixel(0, 0), Some([0.0; 4]));
    }

    #[test]
    fn construction_rejects_bad_dimensions() {
        assert!(matches!(
            FrameBuffer::new(0, 10, false),
            Err(BridgeError::Allocation { .. })
        ));
        assert!(matches!(
            FrameBuffer::new(10, -1, false),
            Err(BridgeError::Allocation { .. })
        ));
    }

    #[test]
    fn blit_reorders_channels_and_normalizes() {
        let mut fb = FrameBuffer::new(4, 4, true).unwrap();
        let full = DirtyRect::full(4, 4);
        let source = solid_source(full, bgra(255, 0, 0, 128));

        let committed = fb.blit_bgra(&source, full, full).unwrap();
        assert_eq!(committed, full);

        let px = fb.pixel(2, 3).unwrap();
        assert_eq!(px[0], 0.0); // r
        assert_eq!(px[1], 0.0); // g
        assert_eq!(px[2], 1.0); // b (source B channel)
        assert!((px[3] - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn opaque_mode_forces_alpha() {
        let mut fb = FrameBuffer::new(2, 2, false).unwrap();
        let full = DirtyRect::full(2, 2);
        let source = solid_source(full, bgra(10, 20, 30, 0));

        fb.blit_bgra(&source, full, full).unwrap();
        assert_eq!(fb.pixel(1, 1).unwrap()[3], 1.0);
    }

    #[test]
    fn blit_touches_only_the_dirty_rect() {
        let mut fb = FrameBuffer::new(8, 8, false).unwrap();
        let full = DirtyRect::full(8, 8);
        let source = solid_source(full, bgra(0, 0, 255, 255));

        let rect = DirtyRect::new(2, 2, 3, 3);
        fb.blit_bgra(&source, full, rect).unwrap();

        assert_eq!(fb.pixel(2, 2).unwrap()[0], 1.0);
        assert_eq!(fb.pixel(4, 4).unwrap()[0], 1.0);
        // Outside the rect stays untouched.
        assert_eq!(fb.pixel(5, 5).unwrap(), [0.0; 4]);
        assert_eq!(fb.pixel(1, 2).unwrap(), [0.0; 4]);
    }

    #[test]
    fn blit_with_offset_source_rect() {
        // Engine repaints only a 4x2 band at (2,3); the source buffer
        // covers just that band.
        let mut fb = FrameBuffer::new(8, 8, false).unwrap();
        let band = DirtyRect::new(2, 3, 4, 2);
        let source = solid_source(band, bgra(0, 255, 0, 255));

        let committed = fb.blit_bgra(&source, band, band).unwrap();
        assert_eq!(committed, band);
        assert_eq!(fb.pixel(2, 3).unwrap()[1], 1.0);
        assert_eq!(fb.pixel(5, 4).unwrap()[1], 1.0);
        assert_eq!(fb.pixel(1, 3).unwrap(), [0.0; 4]);
        assert_eq!(fb.pixel(2, 5).unwrap(), [0.0; 4]);
    }

    #[test]
    fn malformed_geometry_is_dropped_without_writes() {
        let mut fb = FrameBuffer::new(4, 4, false).unwrap();
        let full = DirtyRect::full(4, 4);
        let source = solid_source(full, bgra(255, 255, 255, 255));

        assert!(fb
            .blit_bgra(&source, full, DirtyRect::new(0, 0, -3, 2))
            .is_none());
        assert!(fb
            .blit_bgra(&source, full, DirtyRect::new(10, 10, 4, 4))
            .is_none());
        assert!(fb.as_slice().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn overshooting_rect_is_clamped() {
        let mut fb = FrameBuffer::new(4, 4, false).unwrap();
        let full = DirtyRect::full(4, 4);
        let source = solid_source(full, bgra(9, 9, 9, 255));

        let committed = fb
            .blit_bgra(&source, full, DirtyRect::new(2, 2, 10, 10))
            .unwrap();
        assert_eq!(committed, DirtyRect::new(2, 2, 2, 2));
        assert!(fb.pixel(3, 3).unwrap()[0] > 0.0);
    }

    #[test]
    fn short_source_buffer_is_rejected() {
        let mut fb = FrameBuffer::new(4, 4, false).unwrap();
        let full = DirtyRect::full(4, 4);
        let short = vec![0u8; 8];
        assert!(fb.blit_bgra(&short, full, full).is_none());
    }

    #[test]
    fn mirror_copies_only_the_rect() {
        let mut fb = FrameBuffer::new(4, 4, false).unwrap();
        let full = DirtyRect::full(4, 4);
        let source = solid_source(full, bgra(0, 0, 255, 255));
        fb.blit_bgra(&source, full, full).unwrap();

        let mut host = vec![-1.0f32; fb.len()];
        let rect = DirtyRect::new(1, 1, 2, 2);
        assert!(fb.mirror_rect(rect, &mut host));

        // Inside the rect: red channel mirrored.
        let idx = (1 * 4 + 1) * CHANNELS;
        assert_eq!(host[idx], 1.0);
        // Outside: untouched sentinel.
        assert_eq!(host[0], -1.0);
    }
}
