use {
    crate::{FEATURE_WIDTH, GestureError, Hand, LANDMARK_COUNT},
    base::{Vec2, Vec3},
};

/// Axis-aligned bounds of a hand.
///
/// Corners are stored `[y, x]` (row-major image order): `top_left` is
/// `[min_y, min_x]` and `bottom_right` is `[max_y, max_x]`. Downstream
/// consumers of recorded sessions rely on this ordering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub top_left: [f32; 2],
    pub bottom_right: [f32; 2],
}

impl BoundingBox {
    pub fn of(hand: &Hand) -> Self {
        let joints = hand.joints();
        let first = joints[0].xy();
        let (min, max) = joints
            .iter()
            .skip(1)
            .fold((first, first), |(min, max), joint| {
                (min.min(joint.xy()), max.max(joint.xy()))
            });
        Self {
            top_left: [min.y, min.x],
            bottom_right: [max.y, max.x],
        }
    }

    pub fn top(&self) -> f32 {
        self.top_left[0]
    }

    pub fn left(&self) -> f32 {
        self.top_left[1]
    }

    pub fn bottom(&self) -> f32 {
        self.bottom_right[0]
    }

    pub fn right(&self) -> f32 {
        self.bottom_right[1]
    }

    pub fn width(&self) -> f32 {
        self.right() - self.left()
    }

    pub fn height(&self) -> f32 {
        self.bottom() - self.top()
    }

    /// Whether both extents are finite and strictly positive.
    pub fn has_area(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0
    }
}

/// A hand together with its joints rescaled into its own bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedHand {
    pub hand: Hand,
    pub bounding_box: BoundingBox,
    /// `((x - left) / width, (y - top) / height, 0)` per joint.
    pub joints: [Vec3<f32>; LANDMARK_COUNT],
}

impl NormalizedHand {
    /// The 42-value feature vector `[lm1_x, lm1_y, ..., lm21_x, lm21_y]`.
    pub fn features(&self) -> Vec<f32> {
        flatten(&self.joints)
    }
}

/// Rescale every joint of `hand` into its bounding box.
///
/// A joint in the middle of the hand maps to (0.5, 0.5). The depth component
/// has no meaningful reference and is zeroed. Hands whose joints all share an
/// x or a y coordinate are rejected with `DegenerateHand`.
pub fn normalize(hand: &Hand) -> Result<NormalizedHand, GestureError> {
    let bounding_box = BoundingBox::of(hand);
    if !bounding_box.has_area() {
        return Err(GestureError::DegenerateHand {
            width: bounding_box.width(),
            height: bounding_box.height(),
        });
    }

    let origin = Vec2::new(bounding_box.left(), bounding_box.top());
    let extent = Vec2::new(bounding_box.width(), bounding_box.height());
    let joints = hand.joints().map(|joint| {
        let scaled = (joint.xy() - origin) / extent;
        Vec3::new(scaled.x, scaled.y, 0.0)
    });

    Ok(NormalizedHand {
        hand: *hand,
        bounding_box,
        joints,
    })
}

/// Flatten joints into `[x0, y0, x1, y1, ...]`, dropping z.
pub fn flatten(joints: &[Vec3<f32>; LANDMARK_COUNT]) -> Vec<f32> {
    let mut features = Vec::with_capacity(FEATURE_WIDTH);
    for joint in joints {
        features.push(joint.x);
        features.push(joint.y);
    }
    features
}

/// Inverse of `flatten`: split a feature vector back into (x, y) pairs.
pub fn unflatten(features: &[f32]) -> Result<Vec<Vec2<f32>>, GestureError> {
    if features.len() != FEATURE_WIDTH {
        return Err(GestureError::FeatureWidth {
            expected: FEATURE_WIDTH,
            actual: features.len(),
        });
    }
    Ok(features
        .chunks_exact(2)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect())
}
