use {
    crate::{FEATURE_WIDTH, GestureError, Topology},
    candle_core::{DType, Device, Module, Tensor},
    candle_nn::{Linear, VarBuilder},
    std::path::Path,
};

/// Serialized `Topology` of a saved model.
pub const TOPOLOGY_FILE: &str = "model.json";
/// Weights of a saved model, one tensor per layer parameter.
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// Feed-forward gesture classifier.
///
/// `forward` yields logits; `probabilities` applies the output softmax.
#[derive(Debug)]
pub struct Classifier {
    topology: Topology,
    layers: Vec<Linear>,
    device: Device,
}

impl Classifier {
    /// Build the layers of `topology`, taking parameters from `vb`.
    pub fn new(topology: Topology, vb: VarBuilder) -> Result<Self, GestureError> {
        topology.validate()?;
        let layers = topology
            .layer_dims()
            .into_iter()
            .enumerate()
            .map(|(index, (input, output))| {
                candle_nn::linear(input, output, vb.pp(Topology::layer_name(index)))
            })
            .collect::<candle_core::Result<Vec<_>>>()?;
        Ok(Self {
            topology,
            layers,
            device: vb.device().clone(),
        })
    }

    /// Load a classifier saved by `TrainedModel::save`.
    pub fn load(dir: impl AsRef<Path>, device: &Device) -> Result<Self, GestureError> {
        let dir = dir.as_ref();
        let topology: Topology =
            serde_json::from_str(&std::fs::read_to_string(dir.join(TOPOLOGY_FILE))?)?;
        let tensors = candle_core::safetensors::load(dir.join(WEIGHTS_FILE), device)?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, device);
        Self::new(topology, vb)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn class_count(&self) -> usize {
        self.topology.output_width
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Class probabilities for one 42-value feature vector.
    pub fn probabilities(&self, features: &[f32]) -> Result<Vec<f32>, GestureError> {
        check_width(features)?;
        let xs = Tensor::from_slice(features, (1, FEATURE_WIDTH), &self.device)?;
        let probs = candle_nn::ops::softmax_last_dim(&self.forward(&xs)?)?;
        Ok(probs.squeeze(0)?.to_vec1::<f32>()?)
    }

    pub(crate) fn save_topology(&self, dir: &Path) -> Result<(), GestureError> {
        let json = serde_json::to_string_pretty(&self.topology)?;
        std::fs::write(dir.join(TOPOLOGY_FILE), json)?;
        Ok(())
    }
}

impl Module for Classifier {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let (output, hidden) = self
            .layers
            .split_last()
            .ok_or_else(|| candle_core::Error::Msg("classifier has no layers".to_string()))?;
        let mut xs = xs.clone();
        for layer in hidden {
            xs = layer.forward(&xs)?.relu()?;
        }
        output.forward(&xs)
    }
}

fn check_width(features: &[f32]) -> Result<(), GestureError> {
    if features.len() != FEATURE_WIDTH {
        return Err(GestureError::FeatureWidth {
            expected: FEATURE_WIDTH,
            actual: features.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_nn::VarMap;

    #[test]
    fn test_forward_shape() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let classifier = Classifier::new(Topology::for_classes(3).unwrap(), vb).unwrap();

        let xs = Tensor::zeros((5, FEATURE_WIDTH), DType::F32, &device).unwrap();
        let logits = classifier.forward(&xs).unwrap();
        assert_eq!(logits.dims(), &[5, 3]);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let classifier = Classifier::new(Topology::for_classes(4).unwrap(), vb).unwrap();

        let probs = classifier.probabilities(&[0.5; FEATURE_WIDTH]).unwrap();
        assert_eq!(probs.len(), 4);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum was {sum}");
    }

    #[test]
    fn test_probabilities_rejects_wrong_width() {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let classifier = Classifier::new(Topology::for_classes(2).unwrap(), vb).unwrap();

        let err = classifier.probabilities(&[0.0; 40]).unwrap_err();
        assert!(matches!(
            err,
            GestureError::FeatureWidth { expected: 42, actual: 40 }
        ));
    }
}
