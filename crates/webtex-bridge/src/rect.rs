//! Dirty-rectangle geometry for the paint pipeline.

/// An axis-aligned rectangle in viewport pixel coordinates.
///
/// Mirrors the engine's paint rect layout (left, top, width, height).
/// A rect with non-positive width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyRect {
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

impl DirtyRect {
    pub fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The full viewport rect for the given dimensions.
    pub fn full(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// One past the rightmost column.
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    /// One past the bottom row.
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    /// Pixel count covered by this rect (zero when empty).
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }

    /// Intersect with another rect. Empty rects stay empty.
    pub fn intersect(&self, other: &DirtyRect) -> DirtyRect {
        if self.is_empty() || other.is_empty() {
            return DirtyRect::default();
        }
        let left = self.left.max(other.left);
        let top = self.top.max(other.top);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= left || bottom <= top {
            DirtyRect::default()
        } else {
            DirtyRect::new(left, top, right - left, bottom - top)
        }
    }

    /// Clamp this rect to `[0, width) x [0, height)`.
    ///
    /// Malformed geometry (negative origin, zero or negative extent,
    /// overshooting bounds) collapses to the valid overlap, which may be
    /// empty. The result never escapes the viewport.
    pub fn clamped_to(&self, width: i32, height: i32) -> DirtyRect {
        self.intersect(&DirtyRect::full(width, height))
    }

    /// Smallest rect covering both `self` and `other`.
    pub fn union(&self, other: &DirtyRect) -> DirtyRect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let left = self.left.min(other.left);
        let top = self.top.min(other.top);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        DirtyRect::new(left, top, right - left, bottom - top)
    }

    /// The same rect shifted by a scroll delta.
    pub fn translated(&self, dx: i32, dy: i32) -> DirtyRect {
        DirtyRect::new(self.left + dx, self.top + dy, self.width, self.height)
    }

    /// Whether `other` lies entirely inside this rect.
    pub fn contains(&self, other: &DirtyRect) -> bool {
        !other.is_empty()
            && other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

/// Accumulates the bounding rect of all pixels committed since the host
/// last acknowledged a paint.
///
/// The tracked region only grows between acknowledgments; `take` is the
/// explicit reset point. Reading without taking (`current`) is allowed and
/// does not disturb accumulation.
#[derive(Debug, Default)]
pub struct DirtyRegionTracker {
    accumulated: DirtyRect,
}

impl DirtyRegionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a committed rect into the accumulated region.
    pub fn mark(&mut self, rect: DirtyRect) {
        if rect.is_empty() {
            return;
        }
        self.accumulated = self.accumulated.union(&rect);
    }

    /// The accumulated region since the last `take`.
    pub fn current(&self) -> DirtyRect {
        self.accumulated
    }

    pub fn is_empty(&self) -> bool {
        self.accumulated.is_empty()
    }

    /// Hand the accumulated region to the host and reset it.
    pub fn take(&mut self) -> DirtyRect {
        std::mem::take(&mut self.accumulated)
    }
}
