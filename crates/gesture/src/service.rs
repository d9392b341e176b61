use {
    crate::{
        GestureClass, GestureError, Sample, SessionMeta, Settings, TrainConfig, TrainingReport,
        dataset::{encode, read_csv},
        meta::META_FILE,
        recorder::ClassId,
        trainer::{EpochProgress, train},
    },
    base::{CancelToken, log},
    candle_core::Device,
    serde::{Deserialize, Serialize},
    std::{
        collections::HashSet,
        fs,
        path::{Path, PathBuf},
        sync::Arc,
    },
    tokio::sync::{Mutex, OwnedMutexGuard, mpsc},
};

/// Samples recorded for one gesture class, as uploaded by the capture client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedGesture {
    pub label: String,
    pub id: ClassId,
    /// One entry per sample, each 21 normalized `[x, y, z]` joints.
    pub gestures: Vec<Vec<[f32; 3]>>,
}

impl RecordedGesture {
    fn to_class(&self) -> Result<GestureClass, GestureError> {
        let samples = self
            .gestures
            .iter()
            .map(|joints| Sample::from_triples(joints))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GestureClass {
            id: self.id,
            label: self.label.clone(),
            samples,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingRequest {
    pub meta_data: SessionMeta,
    pub recorded_gestures: Vec<RecordedGesture>,
}

impl TrainingRequest {
    /// Validate the upload and convert it into gesture classes.
    ///
    /// Class ids must be unique and dense (`0..n`), since they become the
    /// classifier's output indices.
    pub fn classes(&self) -> Result<Vec<GestureClass>, GestureError> {
        let class_count = self.recorded_gestures.len();
        if class_count == 0 {
            return Err(GestureError::ClassCount(0));
        }
        let mut seen = HashSet::new();
        for gesture in &self.recorded_gestures {
            if gesture.id as usize >= class_count {
                return Err(GestureError::LabelOutOfRange {
                    label: gesture.id,
                    class_count,
                });
            }
            if !seen.insert(gesture.id) {
                return Err(GestureError::InvalidSample(format!(
                    "duplicate gesture class id {}",
                    gesture.id
                )));
            }
        }
        self.recorded_gestures.iter().map(RecordedGesture::to_class).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingResponse {
    pub message: String,
    pub model_url: String,
}

/// Runs encode → write → read → train → persist for uploaded sessions.
///
/// Only one run is active at a time; a second request while one is in flight
/// fails with `GestureError::Busy`. The slot is held by the blocking job, so a
/// run keeps it even when the caller stops waiting.
pub struct TrainingService {
    settings: Settings,
    device: Device,
    slot: Arc<Mutex<()>>,
    shutdown: CancelToken,
}

impl TrainingService {
    pub fn new(settings: Settings, device: Device) -> Self {
        Self {
            settings,
            device,
            slot: Arc::new(Mutex::new(())),
            shutdown: CancelToken::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_busy(&self) -> bool {
        self.slot.try_lock().is_err()
    }

    /// Stop any in-flight run at its next batch and refuse new ones.
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    /// Train a model for `request` and persist it under the static root.
    ///
    /// Per-epoch progress is sent on `progress` when given. A failed or
    /// cancelled run leaves no model directory behind.
    pub async fn train(
        &self,
        request: TrainingRequest,
        progress: Option<mpsc::UnboundedSender<EpochProgress>>,
    ) -> Result<TrainingResponse, GestureError> {
        let slot = self
            .slot
            .clone()
            .try_lock_owned()
            .map_err(|_| GestureError::Busy)?;
        if self.shutdown.is_cancelled() {
            return Err(GestureError::Cancelled);
        }

        let classes = request.classes()?;
        let record_id = request.meta_data.record_id;
        let job = TrainingJob {
            _slot: slot,
            settings: self.settings.clone(),
            device: self.device.clone(),
            cancel: self.shutdown.clone(),
            classes,
            meta: request.meta_data,
            partial_dir: self.settings.models_dir().join(format!(".{record_id}.partial")),
            final_dir: self.settings.model_dir(record_id),
            progress,
        };

        tokio::task::spawn_blocking(move || job.run())
            .await
            .map_err(|e| GestureError::Runtime(format!("training task failed: {e}")))??;

        Ok(TrainingResponse {
            message: "Training done".to_string(),
            model_url: Settings::model_url(record_id),
        })
    }
}

/// The blocking part of a training request. Owns the service slot until the
/// model is published or cleaned up.
struct TrainingJob {
    _slot: OwnedMutexGuard<()>,
    settings: Settings,
    device: Device,
    cancel: CancelToken,
    classes: Vec<GestureClass>,
    meta: SessionMeta,
    partial_dir: PathBuf,
    final_dir: PathBuf,
    progress: Option<mpsc::UnboundedSender<EpochProgress>>,
}

impl TrainingJob {
    fn run(self) -> Result<(), GestureError> {
        let record_id = self.meta.record_id;
        let result = self
            .train_into(&self.partial_dir)
            .and_then(|report| publish(&self.partial_dir, &self.final_dir).map(|()| report));
        match result {
            Ok(report) => {
                log::info!(
                    "model {} ready after {} epochs (final loss {:?})",
                    record_id,
                    report.epochs.len(),
                    report.final_loss()
                );
                Ok(())
            }
            Err(e) => {
                log::error!("training for record {} failed: {}", record_id, e);
                remove_dir_if_exists(&self.partial_dir);
                Err(e)
            }
        }
    }

    fn train_into(&self, output_dir: &Path) -> Result<TrainingReport, GestureError> {
        let dataset = encode(&self.classes)?;
        let (train_path, test_path) = dataset.write(&self.settings.data_dir)?;

        // train from what is on disk, so the files are known-good artifacts
        let train_rows = read_csv(&train_path)?;
        let test_rows = read_csv(&test_path)?;

        let config = TrainConfig::new(
            self.settings.epoch_count,
            self.classes.len(),
            train_rows,
            test_rows,
        )
        .with_seed(self.settings.seed)
        .with_batching(self.settings.batch_size, self.settings.shuffle_buffer)
        .with_learning_rate(self.settings.learning_rate);

        let model = train(&config, &self.device, &self.cancel, |epoch| {
            log::info!(
                "epoch {}/{}: loss {:.4}",
                epoch.epoch + 1,
                epoch.epoch_count,
                epoch.loss
            );
            if let Some(tx) = &self.progress {
                tx.send(*epoch).ok();
            }
        })?;

        model.save(output_dir)?;
        self.meta.save(output_dir.join(META_FILE))?;
        Ok(model.report().clone())
    }
}

/// Move a finished model into place, replacing an older model for the same record.
fn publish(partial_dir: &Path, final_dir: &Path) -> Result<(), GestureError> {
    if final_dir.exists() {
        fs::remove_dir_all(final_dir)?;
    }
    fs::rename(partial_dir, final_dir)?;
    Ok(())
}

fn remove_dir_if_exists(dir: &Path) {
    if dir.exists() {
        if let Err(e) = fs::remove_dir_all(dir) {
            log::warn!("failed to remove partial model {}: {}", dir.display(), e);
        }
    }
}
