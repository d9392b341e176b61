use {
    crate::{
        GestureError, LANDMARK_COUNT, NormalizedHand, SessionMeta,
        meta::GestureLabel,
        normalize::flatten,
    },
    base::{Vec3, log},
};

/// 0-based gesture class id, assigned in insertion order.
pub type ClassId = u32;

/// One recorded observation: the normalized joints of a single hand.
///
/// Joints keep their (x, y, z) structure until the dataset is encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub joints: [Vec3<f32>; LANDMARK_COUNT],
}

impl Sample {
    /// Build a sample from already-normalized `[x, y, z]` joints.
    pub fn from_triples(triples: &[[f32; 3]]) -> Result<Self, GestureError> {
        let joints: [[f32; 3]; LANDMARK_COUNT] =
            triples.try_into().map_err(|_| GestureError::JointCount {
                expected: LANDMARK_COUNT,
                actual: triples.len(),
            })?;
        let joints = joints.map(Vec3::from);
        if let Some(index) = joints.iter().position(|joint| !joint.is_finite()) {
            return Err(GestureError::InvalidSample(format!(
                "joint {index} has non-finite coordinates"
            )));
        }
        Ok(Self { joints })
    }

    pub fn features(&self) -> Vec<f32> {
        flatten(&self.joints)
    }
}

impl From<&NormalizedHand> for Sample {
    fn from(hand: &NormalizedHand) -> Self {
        Self {
            joints: hand.joints,
        }
    }
}

/// A labeled gesture category and the samples recorded for it.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureClass {
    pub id: ClassId,
    pub label: String,
    pub samples: Vec<Sample>,
}

impl GestureClass {
    pub fn new(id: ClassId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            samples: Vec::new(),
        }
    }
}

/// Capture session state: the gesture classes, which one is receiving
/// samples, and whether recording is on.
#[derive(Debug, Default)]
pub struct Recorder {
    classes: Vec<GestureClass>,
    active: Option<ClassId>,
    recording: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new, empty gesture class and make it the active one.
    pub fn add_class(&mut self, label: &str) -> Result<ClassId, GestureError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(GestureError::EmptyLabel);
        }
        let id = self.classes.len() as ClassId;
        self.classes.push(GestureClass::new(id, label));
        self.active = Some(id);
        log::debug!("added gesture class {} ({})", id, label);
        Ok(id)
    }

    /// Choose which class receives samples. Recording state is unchanged.
    pub fn set_active_class(&mut self, id: ClassId) -> Result<(), GestureError> {
        if self.class(id).is_none() {
            return Err(GestureError::UnknownClass(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Flip the recording flag and return the new state.
    pub fn toggle_recording(&mut self) -> bool {
        self.recording = !self.recording;
        self.recording
    }

    /// Feed one detection frame. Returns whether a sample was recorded.
    ///
    /// Frames without a hand, frames arriving while not recording, and frames
    /// arriving with no active class are dropped.
    pub fn on_frame(&mut self, hand: Option<&NormalizedHand>) -> bool {
        if !self.recording {
            return false;
        }
        let (Some(hand), Some(active)) = (hand, self.active) else {
            return false;
        };
        match self.classes.get_mut(active as usize) {
            Some(class) => {
                class.samples.push(Sample::from(hand));
                true
            }
            None => false,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn active_class(&self) -> Option<&GestureClass> {
        self.active.and_then(|id| self.class(id))
    }

    pub fn class(&self, id: ClassId) -> Option<&GestureClass> {
        self.classes.get(id as usize)
    }

    pub fn classes(&self) -> &[GestureClass] {
        &self.classes
    }

    pub fn sample_count(&self, id: ClassId) -> Option<usize> {
        self.class(id).map(|class| class.samples.len())
    }

    /// Session metadata for the current classes under the given record id.
    pub fn meta(&self, record_id: u64) -> SessionMeta {
        SessionMeta {
            record_id,
            gestures: self
                .classes
                .iter()
                .map(|class| GestureLabel {
                    id: class.id,
                    label: class.label.clone(),
                })
                .collect(),
        }
    }

    /// Session metadata stamped with the current time in milliseconds.
    pub fn meta_now(&self) -> SessionMeta {
        self.meta(SessionMeta::timestamp_record_id())
    }

    pub fn into_classes(self) -> Vec<GestureClass> {
        self.classes
    }
}
