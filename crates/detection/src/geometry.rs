use serde::{Deserialize, Serialize};

/// Candidate box in center form, as emitted by the detector head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CenterBox {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    pub confidence: f32,
    pub class_id: usize,
}

/// Box in corner form. Coordinates are in whatever space the source box was in;
/// nothing here clamps to image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

impl CenterBox {
    /// Convert bounding box from center-width-height format to corner format
    #[inline]
    pub fn to_corner_form(&self) -> CornerBox {
        CornerBox {
            x1: self.cx - self.w / 2.0,
            y1: self.cy - self.h / 2.0,
            x2: self.cx + self.w / 2.0,
            y2: self.cy + self.h / 2.0,
            confidence: self.confidence,
            class_id: self.class_id,
        }
    }
}

impl From<CenterBox> for CornerBox {
    fn from(b: CenterBox) -> Self {
        b.to_corner_form()
    }
}

impl CornerBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Pixel-inclusive area: a box from `x1` to `x2` covers `x2 - x1 + 1` columns.
    /// Degenerate extents count as zero.
    pub fn area(&self) -> f32 {
        inclusive_extent(self.x1, self.x2) * inclusive_extent(self.y1, self.y2)
    }

    /// Intersection-over-union with the same pixel-inclusive convention as [`CornerBox::area`].
    ///
    /// Returns 0 when the union is empty or the ratio is not finite.
    pub fn iou(&self, other: &CornerBox) -> f32 {
        let overlap_w = inclusive_extent(self.x1.max(other.x1), self.x2.min(other.x2));
        let overlap_h = inclusive_extent(self.y1.max(other.y1), self.y2.min(other.y2));
        let intersection = overlap_w * overlap_h;

        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            return 0.0;
        }

        let iou = intersection / union;
        if iou.is_finite() { iou } else { 0.0 }
    }
}

#[inline]
fn inclusive_extent(lo: f32, hi: f32) -> f32 {
    (hi - lo + 1.0).max(0.0)
}
