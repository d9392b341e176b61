use {crate::GestureError, base::Vec3};

/// Number of joints the hand-landmark detector reports per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Width of a flattened feature vector: (x, y) per joint.
pub const FEATURE_WIDTH: usize = LANDMARK_COUNT * 2;

/// Hand joint indices, in detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    pub const ALL: [HandLandmark; LANDMARK_COUNT] = [
        HandLandmark::Wrist,
        HandLandmark::ThumbCmc,
        HandLandmark::ThumbMcp,
        HandLandmark::ThumbIp,
        HandLandmark::ThumbTip,
        HandLandmark::IndexMcp,
        HandLandmark::IndexPip,
        HandLandmark::IndexDip,
        HandLandmark::IndexTip,
        HandLandmark::MiddleMcp,
        HandLandmark::MiddlePip,
        HandLandmark::MiddleDip,
        HandLandmark::MiddleTip,
        HandLandmark::RingMcp,
        HandLandmark::RingPip,
        HandLandmark::RingDip,
        HandLandmark::RingTip,
        HandLandmark::PinkyMcp,
        HandLandmark::PinkyPip,
        HandLandmark::PinkyDip,
        HandLandmark::PinkyTip,
    ];
}

impl From<HandLandmark> for usize {
    fn from(landmark: HandLandmark) -> usize {
        landmark as usize
    }
}

impl TryFrom<usize> for HandLandmark {
    type Error = GestureError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        HandLandmark::ALL
            .get(value)
            .copied()
            .ok_or_else(|| {
                GestureError::InvalidSample(format!(
                    "landmark index {value} out of range 0-{}",
                    LANDMARK_COUNT - 1
                ))
            })
    }
}

/// One detected hand: 21 joints in source image-pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hand {
    joints: [Vec3<f32>; LANDMARK_COUNT],
}

impl Hand {
    /// Build a hand from detector output.
    ///
    /// Fails unless there are exactly 21 joints, all with finite coordinates.
    pub fn new(joints: &[Vec3<f32>]) -> Result<Self, GestureError> {
        let joints: [Vec3<f32>; LANDMARK_COUNT] =
            joints.try_into().map_err(|_| GestureError::JointCount {
                expected: LANDMARK_COUNT,
                actual: joints.len(),
            })?;
        if let Some(index) = joints.iter().position(|joint| !joint.is_finite()) {
            return Err(GestureError::InvalidSample(format!(
                "joint {index} has non-finite coordinates"
            )));
        }
        Ok(Self { joints })
    }

    /// Build a hand from `[x, y, z]` triples, the detector's wire shape.
    pub fn from_triples(triples: &[[f32; 3]]) -> Result<Self, GestureError> {
        let joints: Vec<Vec3<f32>> = triples.iter().copied().map(Vec3::from).collect();
        Self::new(&joints)
    }

    pub fn joints(&self) -> &[Vec3<f32>; LANDMARK_COUNT] {
        &self.joints
    }

    pub fn joint(&self, landmark: HandLandmark) -> Vec3<f32> {
        self.joints[usize::from(landmark)]
    }
}

/// A hand as reported by the detector, with its confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandPrediction {
    pub hand: Hand,
    /// Hand presence confidence in [0.0, 1.0].
    pub confidence: f32,
}
