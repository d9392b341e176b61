use {
    crate::{
        Classifier, DatasetRow, FEATURE_WIDTH, GestureError, Topology,
        classifier::WEIGHTS_FILE,
    },
    base::{CancelToken, log},
    candle_core::{D, DType, Device, Module, Tensor},
    candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap},
    std::path::Path,
};

pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_SHUFFLE_BUFFER: usize = 100;
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;
pub const DEFAULT_SEED: u64 = 42;

/// Inputs of one training run.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub epoch_count: usize,
    pub gesture_class_count: usize,
    pub train_rows: Vec<DatasetRow>,
    pub test_rows: Vec<DatasetRow>,
    pub batch_size: usize,
    pub shuffle_buffer: usize,
    pub learning_rate: f64,
    pub seed: u64,
}

impl TrainConfig {
    pub fn new(
        epoch_count: usize,
        gesture_class_count: usize,
        train_rows: Vec<DatasetRow>,
        test_rows: Vec<DatasetRow>,
    ) -> Self {
        Self {
            epoch_count,
            gesture_class_count,
            train_rows,
            test_rows,
            batch_size: DEFAULT_BATCH_SIZE,
            shuffle_buffer: DEFAULT_SHUFFLE_BUFFER,
            learning_rate: DEFAULT_LEARNING_RATE,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_batching(mut self, batch_size: usize, shuffle_buffer: usize) -> Self {
        self.batch_size = batch_size;
        self.shuffle_buffer = shuffle_buffer;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Reject configurations that can never train.
    pub fn validate(&self) -> Result<(), GestureError> {
        if self.gesture_class_count == 0 {
            return Err(GestureError::ClassCount(0));
        }
        if self.epoch_count == 0 {
            return Err(GestureError::EpochCount(0));
        }
        if self.train_rows.is_empty() {
            return Err(GestureError::EmptyDataset);
        }
        if self.batch_size == 0 || self.shuffle_buffer == 0 {
            return Err(GestureError::Runtime(format!(
                "batch size ({}) and shuffle buffer ({}) must be positive",
                self.batch_size, self.shuffle_buffer
            )));
        }
        for row in self.train_rows.iter().chain(&self.test_rows) {
            if row.features.len() != FEATURE_WIDTH {
                return Err(GestureError::FeatureWidth {
                    expected: FEATURE_WIDTH,
                    actual: row.features.len(),
                });
            }
            if row.label as usize >= self.gesture_class_count {
                return Err(GestureError::LabelOutOfRange {
                    label: row.label,
                    class_count: self.gesture_class_count,
                });
            }
        }
        Ok(())
    }
}

/// Reported once at the end of every epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochProgress {
    /// 0-based epoch index.
    pub epoch: usize,
    pub epoch_count: usize,
    /// Mean sparse categorical cross-entropy over the epoch's batches.
    pub loss: f32,
    pub accuracy: f32,
}

/// Loss and accuracy on the held-out test rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub loss: f32,
    pub accuracy: f32,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub epochs: Vec<EpochProgress>,
    /// `None` when there were no test rows.
    pub evaluation: Option<Evaluation>,
}

impl TrainingReport {
    pub fn final_loss(&self) -> Option<f32> {
        self.epochs.last().map(|epoch| epoch.loss)
    }
}

/// A classifier fresh out of training, still holding its variables.
pub struct TrainedModel {
    classifier: Classifier,
    varmap: VarMap,
    report: TrainingReport,
}

impl TrainedModel {
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn report(&self) -> &TrainingReport {
        &self.report
    }

    /// Write `model.json` and `model.safetensors` into `dir`.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<(), GestureError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        self.classifier.save_topology(dir)?;
        self.varmap.save(dir.join(WEIGHTS_FILE))?;
        log::info!("saved gesture model to {}", dir.display());
        Ok(())
    }
}

/// Train a fresh classifier on `config.train_rows`.
///
/// `on_epoch` is called after every epoch. `cancel` is checked before every
/// batch; a cancelled run returns `GestureError::Cancelled`.
pub fn train(
    config: &TrainConfig,
    device: &Device,
    cancel: &CancelToken,
    mut on_epoch: impl FnMut(&EpochProgress),
) -> Result<TrainedModel, GestureError> {
    config.validate()?;
    let topology = Topology::for_classes(config.gesture_class_count)?;
    let mut rng = fastrand::Rng::with_seed(config.seed);

    let mut varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
    let classifier = Classifier::new(topology.clone(), vb)?;
    glorot_uniform(&mut varmap, &topology, &mut rng, device)?;

    let params = ParamsAdamW {
        lr: config.learning_rate,
        weight_decay: 0.0,
        ..Default::default()
    };
    let mut optimizer = AdamW::new(varmap.all_vars(), params)?;

    log::info!(
        "training {} classes on {} rows ({} test) for {} epochs",
        config.gesture_class_count,
        config.train_rows.len(),
        config.test_rows.len(),
        config.epoch_count
    );

    let sample_count = config.train_rows.len();
    let mut epochs = Vec::with_capacity(config.epoch_count);
    for epoch in 0..config.epoch_count {
        let order = buffered_shuffle(sample_count, config.shuffle_buffer, &mut rng);
        let mut loss_sum = 0.0f64;
        let mut correct = 0usize;
        for batch in order.chunks(config.batch_size) {
            if cancel.is_cancelled() {
                log::warn!("training cancelled during epoch {}", epoch + 1);
                return Err(GestureError::Cancelled);
            }
            let rows: Vec<&DatasetRow> = batch.iter().map(|&i| &config.train_rows[i]).collect();
            let (xs, ys) = batch_tensors(&rows, device)?;
            let logits = classifier.forward(&xs)?;
            let loss = candle_nn::loss::cross_entropy(&logits, &ys)?;
            optimizer.backward_step(&loss)?;
            loss_sum += loss.to_scalar::<f32>()? as f64 * batch.len() as f64;
            correct += count_correct(&logits, &ys)?;
        }

        let progress = EpochProgress {
            epoch,
            epoch_count: config.epoch_count,
            loss: (loss_sum / sample_count as f64) as f32,
            accuracy: correct as f32 / sample_count as f32,
        };
        log::debug!(
            "epoch {}/{}: loss {:.4}, accuracy {:.3}",
            epoch + 1,
            config.epoch_count,
            progress.loss,
            progress.accuracy
        );
        on_epoch(&progress);
        epochs.push(progress);
    }

    let evaluation = evaluate(&classifier, &config.test_rows, device)?;
    if let Some(evaluation) = &evaluation {
        log::info!(
            "evaluation on {} test rows: loss {:.4}, accuracy {:.3}",
            evaluation.sample_count,
            evaluation.loss,
            evaluation.accuracy
        );
    }

    Ok(TrainedModel {
        classifier,
        varmap,
        report: TrainingReport { epochs, evaluation },
    })
}

/// Run every row through `classifier` as a single batch.
pub fn evaluate(
    classifier: &Classifier,
    rows: &[DatasetRow],
    device: &Device,
) -> Result<Option<Evaluation>, GestureError> {
    if rows.is_empty() {
        return Ok(None);
    }
    let rows: Vec<&DatasetRow> = rows.iter().collect();
    let (xs, ys) = batch_tensors(&rows, device)?;
    let logits = classifier.forward(&xs)?;
    let loss = candle_nn::loss::cross_entropy(&logits, &ys)?.to_scalar::<f32>()?;
    let correct = count_correct(&logits, &ys)?;
    Ok(Some(Evaluation {
        loss,
        accuracy: correct as f32 / rows.len() as f32,
        sample_count: rows.len(),
    }))
}

fn batch_tensors(rows: &[&DatasetRow], device: &Device) -> Result<(Tensor, Tensor), GestureError> {
    let mut features = Vec::with_capacity(rows.len() * FEATURE_WIDTH);
    let mut labels = Vec::with_capacity(rows.len());
    for row in rows {
        features.extend_from_slice(&row.features);
        labels.push(row.label);
    }
    let xs = Tensor::from_vec(features, (rows.len(), FEATURE_WIDTH), device)?;
    let ys = Tensor::from_vec(labels, rows.len(), device)?;
    Ok((xs, ys))
}

fn count_correct(logits: &Tensor, labels: &Tensor) -> Result<usize, GestureError> {
    let hits = logits
        .argmax(D::Minus1)?
        .eq(labels)?
        .to_dtype(DType::F32)?
        .sum_all()?
        .to_scalar::<f32>()?;
    Ok(hits as usize)
}

/// Overwrite the freshly created layer variables with Glorot-uniform weights
/// and zero biases drawn from `rng`, so runs with the same seed match.
fn glorot_uniform(
    varmap: &mut VarMap,
    topology: &Topology,
    rng: &mut fastrand::Rng,
    device: &Device,
) -> Result<(), GestureError> {
    for (index, (input, output)) in topology.layer_dims().into_iter().enumerate() {
        let name = Topology::layer_name(index);
        let limit = (6.0 / (input + output) as f32).sqrt();
        let weights: Vec<f32> = (0..input * output)
            .map(|_| (rng.f32() * 2.0 - 1.0) * limit)
            .collect();
        varmap.set_one(
            format!("{name}.weight"),
            Tensor::from_vec(weights, (output, input), device)?,
        )?;
        varmap.set_one(
            format!("{name}.bias"),
            Tensor::zeros(output, DType::F32, device)?,
        )?;
    }
    Ok(())
}

/// Streaming shuffle over `0..len` with a bounded buffer.
///
/// The buffer is filled with the first `buffer_size` indices; each step
/// emits a random buffered index and refills its slot with the next unseen
/// one. With `buffer_size >= len` this is a uniform shuffle.
fn buffered_shuffle(len: usize, buffer_size: usize, rng: &mut fastrand::Rng) -> Vec<usize> {
    let mut order = Vec::with_capacity(len);
    let mut next = buffer_size.min(len);
    let mut buffer: Vec<usize> = (0..next).collect();
    while !buffer.is_empty() {
        let pick = rng.usize(..buffer.len());
        if next < len {
            order.push(std::mem::replace(&mut buffer[pick], next));
            next += 1;
        } else {
            order.push(buffer.swap_remove(pick));
        }
    }
    order
}
