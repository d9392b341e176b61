use {
    crate::{FEATURE_WIDTH, GestureError},
    serde::{Deserialize, Serialize},
};

/// Hidden layer widths of the gesture classifier.
pub const HIDDEN_LAYERS: [usize; 3] = [250, 175, 150];

/// Shape of the feed-forward classifier.
///
/// `input_width -> dense(h, relu) for h in hidden_layers -> dense(output_width, softmax)`.
/// Only `output_width` varies between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    pub input_width: usize,
    pub hidden_layers: Vec<usize>,
    pub output_width: usize,
}

impl Topology {
    /// The standard topology for `class_count` gesture classes.
    pub fn for_classes(class_count: usize) -> Result<Self, GestureError> {
        let topology = Self {
            input_width: FEATURE_WIDTH,
            hidden_layers: HIDDEN_LAYERS.to_vec(),
            output_width: class_count,
        };
        topology.validate()?;
        Ok(topology)
    }

    pub fn validate(&self) -> Result<(), GestureError> {
        if self.input_width != FEATURE_WIDTH {
            return Err(GestureError::FeatureWidth {
                expected: FEATURE_WIDTH,
                actual: self.input_width,
            });
        }
        if self.output_width == 0 {
            return Err(GestureError::ClassCount(self.output_width));
        }
        if self.hidden_layers.iter().any(|&width| width == 0) {
            return Err(GestureError::Runtime(format!(
                "hidden layer widths must be positive: {:?}",
                self.hidden_layers
            )));
        }
        Ok(())
    }

    /// `(in, out)` for every dense layer, input to output.
    pub fn layer_dims(&self) -> Vec<(usize, usize)> {
        let mut widths = Vec::with_capacity(self.hidden_layers.len() + 2);
        widths.push(self.input_width);
        widths.extend(&self.hidden_layers);
        widths.push(self.output_width);
        widths.windows(2).map(|pair| (pair[0], pair[1])).collect()
    }

    /// Variable-name prefix of dense layer `index`.
    pub fn layer_name(index: usize) -> String {
        format!("dense{index}")
    }
}
