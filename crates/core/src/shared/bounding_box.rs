use serde::{Deserialize, Serialize};

/// Axis-aligned box in source-image pixel space, corners `(x1, y1)` and `(x2, y2)`.
///
/// Detectors report sub-pixel coordinates; conversion to whole pixels
/// happens only when a crop is taken.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Integer pixel rectangle clamped to an image, `x..x + width` by `y..y + height`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// True when the box has no positive extent or carries non-finite coordinates.
    pub fn is_degenerate(&self) -> bool {
        let finite = [self.x1, self.y1, self.x2, self.y2]
            .iter()
            .all(|c| c.is_finite());
        !finite || self.x2 <= self.x1 || self.y2 <= self.y1
    }

    /// Whole-pixel rectangle inside a `frame_width` x `frame_height` image.
    ///
    /// Coordinates are truncated to pixels and clamped to the image.
    /// Returns `None` when nothing of the box survives.
    pub fn to_pixel_rect(&self, frame_width: u32, frame_height: u32) -> Option<PixelRect> {
        if self.is_degenerate() {
            return None;
        }
        let clamp = |v: f64, max: u32| -> u32 { v.max(0.0).min(max as f64) as u32 };

        let x1 = clamp(self.x1, frame_width);
        let y1 = clamp(self.y1, frame_height);
        let x2 = clamp(self.x2, frame_width);
        let y2 = clamp(self.y2, frame_height);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(PixelRect {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        })
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(c: [f64; 4]) -> Self {
        Self::new(c[0], c[1], c[2], c[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}
