use {
    gesture::{
        DetectionLoop, GestureError, Hand, HandDetector, HandPrediction, LANDMARK_COUNT, Settings,
        detection::select_hand,
    },
    std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    },
};

fn hand(scale: f32) -> Hand {
    let triples: Vec<[f32; 3]> = (0..LANDMARK_COUNT)
        .map(|i| [i as f32 * scale, (i % 5) as f32 * scale, 0.0])
        .collect();
    Hand::from_triples(&triples).unwrap()
}

fn flat_hand() -> Hand {
    Hand::from_triples(&vec![[1.0, 1.0, 0.0]; LANDMARK_COUNT]).unwrap()
}

// Replays a script of detector results, then reports nothing.
struct ScriptedDetector {
    script: Vec<Result<Vec<HandPrediction>, GestureError>>,
    calls: Arc<AtomicUsize>,
}

impl HandDetector for ScriptedDetector {
    async fn detect(&mut self) -> Result<Vec<HandPrediction>, GestureError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.script.len() {
            std::mem::replace(&mut self.script[call], Ok(Vec::new()))
        } else {
            Ok(Vec::new())
        }
    }
}

fn fast_settings() -> Settings {
    Settings::default().with_tick(Duration::from_millis(1))
}

#[test]
fn test_select_hand_uses_strict_threshold() {
    let at_threshold = HandPrediction {
        hand: hand(1.0),
        confidence: 0.8,
    };
    assert!(select_hand(&[at_threshold], 0.8).is_none());

    let confident = HandPrediction {
        hand: hand(2.0),
        confidence: 0.95,
    };
    let selected = select_hand(&[at_threshold, confident], 0.8).unwrap().unwrap();
    assert_eq!(selected.hand, hand(2.0));
}

#[test]
fn test_select_hand_reports_degenerate() {
    let flat = HandPrediction {
        hand: flat_hand(),
        confidence: 0.99,
    };
    assert!(matches!(
        select_hand(&[flat], 0.8),
        Some(Err(GestureError::DegenerateHand { .. }))
    ));
}

#[tokio::test]
async fn test_loop_publishes_observations() {
    let calls = Arc::new(AtomicUsize::new(0));
    let detector = ScriptedDetector {
        script: vec![
            Ok(vec![HandPrediction {
                hand: hand(1.0),
                confidence: 0.9,
            }]),
            Ok(vec![HandPrediction {
                hand: hand(1.0),
                confidence: 0.5,
            }]),
        ],
        calls: calls.clone(),
    };
    let mut handle = DetectionLoop::spawn(detector, &fast_settings());
    assert_eq!(handle.snapshot().tick, 0);

    let first = handle.changed().await.unwrap();
    let second = handle.changed().await.unwrap();
    assert!(second.tick > first.tick);
    // the low-confidence frame clears the previous hand
    let latest = handle.changed().await.unwrap();
    assert!(latest.hand.is_none());
    assert!(calls.load(Ordering::SeqCst) >= 3);
}

#[tokio::test]
async fn test_first_observation_carries_confident_hand() {
    let detector = ScriptedDetector {
        script: vec![Ok(vec![HandPrediction {
            hand: hand(3.0),
            confidence: 0.9,
        }])],
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let handle = DetectionLoop::spawn(detector, &fast_settings());
    let mut first = handle.subscribe();
    first.changed().await.unwrap();
    let observation = first.borrow_and_update().clone();
    // the subscriber may lag behind; only tick 1 carries the hand
    if observation.tick == 1 {
        assert_eq!(observation.hand.unwrap().hand, hand(3.0));
    }
    handle.cancel();
}

#[tokio::test]
async fn test_detector_errors_do_not_stop_loop() {
    let detector = ScriptedDetector {
        script: vec![
            Err(GestureError::Runtime("camera hiccup".into())),
            Ok(vec![HandPrediction {
                hand: flat_hand(),
                confidence: 0.99,
            }]),
        ],
        calls: Arc::new(AtomicUsize::new(0)),
    };
    let mut handle = DetectionLoop::spawn(detector, &fast_settings());
    for _ in 0..4 {
        let observation = handle.changed().await.unwrap();
        assert!(observation.hand.is_none());
    }
    assert!(!handle.is_finished());
}

#[tokio::test]
async fn test_cancel_stops_loop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let detector = ScriptedDetector {
        script: Vec::new(),
        calls: calls.clone(),
    };
    let mut handle = DetectionLoop::spawn(detector, &fast_settings());
    handle.changed().await.unwrap();
    handle.cancel();

    // drain until the sender goes away
    let drained = tokio::time::timeout(Duration::from_secs(2), async {
        while handle.changed().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok());

    let stopped_at = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), stopped_at);
}

#[tokio::test]
async fn test_drop_stops_detector() {
    let calls = Arc::new(AtomicUsize::new(0));
    let detector = ScriptedDetector {
        script: Vec::new(),
        calls: calls.clone(),
    };
    let mut handle = DetectionLoop::spawn(detector, &fast_settings());
    handle.changed().await.unwrap();
    drop(handle);

    tokio::time::sleep(Duration::from_millis(10)).await;
    let after_drop = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(calls.load(Ordering::SeqCst), after_drop);
}
