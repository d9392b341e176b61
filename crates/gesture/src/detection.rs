use {
    crate::{GestureError, HandPrediction, NormalizedHand, Settings, normalize},
    base::{CancelToken, log},
    std::future::Future,
    tokio::{
        sync::watch,
        task::JoinHandle,
        time::{MissedTickBehavior, interval},
    },
};

/// Source of hand predictions, typically a landmark model fed by a camera.
pub trait HandDetector: Send + 'static {
    /// Detect hands in the most recent frame.
    fn detect(&mut self) -> impl Future<Output = Result<Vec<HandPrediction>, GestureError>> + Send;
}

/// The result of one detection cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Cycle counter, 0 before the first cycle completes.
    pub tick: u64,
    pub hand: Option<NormalizedHand>,
}

/// Pick the first hand above `threshold` and normalize it.
///
/// `None` when no hand qualifies; `Some(Err)` when the chosen hand is degenerate.
pub fn select_hand(
    predictions: &[HandPrediction],
    threshold: f32,
) -> Option<Result<NormalizedHand, GestureError>> {
    predictions
        .iter()
        .find(|prediction| prediction.confidence > threshold)
        .map(|prediction| normalize(&prediction.hand))
}

/// Repeating detection task.
pub struct DetectionLoop;

impl DetectionLoop {
    /// Start polling `detector` once per `settings.tick`.
    ///
    /// Every cycle overwrites the previous observation; a slow detector lowers
    /// the observed rate instead of building a backlog. Must be called from
    /// within a tokio runtime.
    pub fn spawn<D: HandDetector>(mut detector: D, settings: &Settings) -> DetectionHandle {
        let (tx, rx) = watch::channel(Observation {
            tick: 0,
            hand: None,
        });
        let cancel = CancelToken::new();
        let threshold = settings.confidence_threshold;
        let period = settings.tick;

        let task = tokio::spawn({
            let cancel = cancel.clone();
            async move {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                let mut tick = 0u64;
                loop {
                    ticker.tick().await;
                    if cancel.is_cancelled() {
                        break;
                    }
                    let hand = match detector.detect().await {
                        Ok(predictions) => match select_hand(&predictions, threshold) {
                            Some(Ok(hand)) => Some(hand),
                            Some(Err(e)) => {
                                log::debug!("dropping hand: {}", e);
                                None
                            }
                            None => None,
                        },
                        Err(e) => {
                            log::warn!("hand detection failed: {}", e);
                            None
                        }
                    };
                    tick += 1;
                    if tx.send(Observation { tick, hand }).is_err() {
                        break;
                    }
                }
                log::debug!("detection loop stopped after {} ticks", tick);
            }
        });

        DetectionHandle { rx, cancel, task }
    }
}

/// Owner of a running detection loop. Dropping it stops the loop.
pub struct DetectionHandle {
    rx: watch::Receiver<Observation>,
    cancel: CancelToken,
    task: JoinHandle<()>,
}

impl DetectionHandle {
    /// The latest observation, without waiting.
    pub fn snapshot(&self) -> Observation {
        self.rx.borrow().clone()
    }

    /// Wait for the next observation. `None` once the loop has stopped.
    pub async fn changed(&mut self) -> Option<Observation> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// An independent receiver for another consumer.
    pub fn subscribe(&self) -> watch::Receiver<Observation> {
        self.rx.clone()
    }

    /// Ask the loop to stop after its current cycle.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for DetectionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}
