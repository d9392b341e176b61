use {
    crate::{
        Classifier, GestureError, NormalizedHand, SessionMeta,
        meta::{META_FILE, load_meta},
        recorder::ClassId,
    },
    base::log,
    candle_core::Device,
    std::path::Path,
};

/// Rendered label for a class index that has no metadata entry.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Index of the largest probability.
///
/// Ties resolve to the first maximal index. NaN entries are skipped; `None`
/// means there was nothing to choose from.
pub fn argmax(probabilities: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &value) in probabilities.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((index, value)),
        }
    }
    best.map(|(index, _)| index)
}

/// Most likely class id for a 42-value feature vector.
pub fn predict(classifier: &Classifier, features: &[f32]) -> Result<ClassId, GestureError> {
    pick(&classifier.probabilities(features)?)
}

fn pick(probabilities: &[f32]) -> Result<ClassId, GestureError> {
    argmax(probabilities)
        .map(|index| index as ClassId)
        .ok_or_else(|| GestureError::Runtime("classifier produced no usable probabilities".into()))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub class_id: ClassId,
    /// `None` when the session metadata has no entry for `class_id`.
    pub label: Option<String>,
    pub probabilities: Vec<f32>,
}

impl Prediction {
    pub fn label_or_unknown(&self) -> &str {
        self.label.as_deref().unwrap_or(UNKNOWN_LABEL)
    }

    pub fn confidence(&self) -> f32 {
        self.probabilities
            .get(self.class_id as usize)
            .copied()
            .unwrap_or(0.0)
    }
}

/// A loaded model plus the labels of the session that trained it.
#[derive(Debug)]
pub struct Predictor {
    classifier: Classifier,
    meta: SessionMeta,
}

impl Predictor {
    pub fn new(classifier: Classifier, meta: SessionMeta) -> Self {
        if meta.gestures.len() != classifier.class_count() {
            log::warn!(
                "model has {} outputs but metadata lists {} gestures",
                classifier.class_count(),
                meta.gestures.len()
            );
        }
        Self { classifier, meta }
    }

    /// Load the model and `meta.json` from a saved model directory.
    pub fn load(dir: impl AsRef<Path>, device: &Device) -> Result<Self, GestureError> {
        let dir = dir.as_ref();
        let classifier = Classifier::load(dir, device)?;
        let meta = load_meta(dir.join(META_FILE))?;
        log::info!(
            "loaded gesture model {} with {} classes from {}",
            meta.record_id,
            classifier.class_count(),
            dir.display()
        );
        Ok(Self::new(classifier, meta))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    pub fn predict(&self, features: &[f32]) -> Result<Prediction, GestureError> {
        let probabilities = self.classifier.probabilities(features)?;
        let class_id = pick(&probabilities)?;
        Ok(Prediction {
            class_id,
            label: self.meta.label(class_id).map(str::to_string),
            probabilities,
        })
    }

    pub fn predict_hand(&self, hand: &NormalizedHand) -> Result<Prediction, GestureError> {
        self.predict(&hand.features())
    }
}
