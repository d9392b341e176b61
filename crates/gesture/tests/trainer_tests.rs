use {
    base::CancelToken,
    candle_core::Device,
    gesture::{
        Classifier, DatasetRow, FEATURE_WIDTH, GestureError, TrainConfig, Topology,
        classifier::{TOPOLOGY_FILE, WEIGHTS_FILE},
        train,
    },
    std::fs,
};

fn rows(label: u32, level: f32, count: usize) -> Vec<DatasetRow> {
    (0..count)
        .map(|i| DatasetRow {
            features: (0..FEATURE_WIDTH)
                .map(|j| level + ((i + j) % 7) as f32 * 0.01)
                .collect(),
            label,
        })
        .collect()
}

fn two_class_config(epochs: usize) -> TrainConfig {
    let mut train_rows = rows(0, 0.1, 9);
    train_rows.extend(rows(1, 0.8, 9));
    let mut test_rows = rows(0, 0.1, 1);
    test_rows.extend(rows(1, 0.8, 1));
    TrainConfig::new(epochs, 2, train_rows, test_rows)
}

fn no_progress(_: &gesture::EpochProgress) {}

#[test]
fn test_topology_for_classes() {
    let topology = Topology::for_classes(3).unwrap();
    assert_eq!(topology.input_width, 42);
    assert_eq!(topology.hidden_layers, vec![250, 175, 150]);
    assert_eq!(
        topology.layer_dims(),
        vec![(42, 250), (250, 175), (175, 150), (150, 3)]
    );
    assert!(matches!(Topology::for_classes(0), Err(GestureError::ClassCount(0))));
}

#[test]
fn test_config_validation() {
    let device = Device::Cpu;
    let cancel = CancelToken::new();

    let zero_epochs = two_class_config(0);
    assert!(matches!(
        train(&zero_epochs, &device, &cancel, no_progress),
        Err(GestureError::EpochCount(0))
    ));

    let mut zero_classes = two_class_config(1);
    zero_classes.gesture_class_count = 0;
    assert!(matches!(zero_classes.validate(), Err(GestureError::ClassCount(0))));

    let empty = TrainConfig::new(1, 2, Vec::new(), Vec::new());
    assert!(matches!(empty.validate(), Err(GestureError::EmptyDataset)));

    let out_of_range = TrainConfig::new(1, 1, rows(1, 0.5, 2), Vec::new());
    assert!(matches!(
        out_of_range.validate(),
        Err(GestureError::LabelOutOfRange {
            label: 1,
            class_count: 1
        })
    ));

    let mut narrow = rows(0, 0.5, 1);
    narrow[0].features.pop();
    let narrow = TrainConfig::new(1, 1, narrow, Vec::new());
    assert!(matches!(narrow.validate(), Err(GestureError::FeatureWidth { .. })));
}

#[test]
fn test_train_reports_every_epoch() {
    let config = two_class_config(3);
    let mut seen = Vec::new();
    let model = train(&config, &Device::Cpu, &CancelToken::new(), |progress| {
        seen.push(progress.epoch)
    })
    .unwrap();

    assert_eq!(seen, vec![0, 1, 2]);
    let report = model.report();
    assert_eq!(report.epochs.len(), 3);
    assert!(report.epochs.iter().all(|epoch| epoch.loss.is_finite()));
    let evaluation = report.evaluation.unwrap();
    assert_eq!(evaluation.sample_count, 2);
    assert_eq!(model.classifier().class_count(), 2);
}

#[test]
fn test_loss_decreases_on_separable_data() {
    let model = train(&two_class_config(20), &Device::Cpu, &CancelToken::new(), no_progress).unwrap();
    let epochs = &model.report().epochs;
    assert!(epochs[19].loss < epochs[0].loss);
}

#[test]
fn test_same_seed_same_run() {
    let config = two_class_config(2).with_seed(7);
    let a = train(&config, &Device::Cpu, &CancelToken::new(), no_progress).unwrap();
    let b = train(&config, &Device::Cpu, &CancelToken::new(), no_progress).unwrap();
    assert_eq!(a.report(), b.report());
}

#[test]
fn test_no_test_rows_skips_evaluation() {
    let config = TrainConfig::new(1, 2, two_class_config(1).train_rows, Vec::new());
    let model = train(&config, &Device::Cpu, &CancelToken::new(), no_progress).unwrap();
    assert!(model.report().evaluation.is_none());
}

#[test]
fn test_cancelled_before_start() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let result = train(&two_class_config(5), &Device::Cpu, &cancel, no_progress);
    assert!(matches!(result, Err(GestureError::Cancelled)));
}

#[test]
fn test_cancel_between_epochs() {
    let cancel = CancelToken::new();
    let mut epochs = 0;
    let result = train(&two_class_config(10), &Device::Cpu, &cancel, |_| {
        epochs += 1;
        cancel.cancel();
    });
    assert!(matches!(result, Err(GestureError::Cancelled)));
    assert_eq!(epochs, 1);
}

#[test]
fn test_probabilities_sum_to_one() {
    let model = train(&two_class_config(1), &Device::Cpu, &CancelToken::new(), no_progress).unwrap();
    let probabilities = model.classifier().probabilities(&[0.5; FEATURE_WIDTH]).unwrap();
    assert_eq!(probabilities.len(), 2);
    let sum: f32 = probabilities.iter().sum();
    assert!((sum - 1.0).abs() < 1e-5);

    assert!(matches!(
        model.classifier().probabilities(&[0.5; 10]),
        Err(GestureError::FeatureWidth { .. })
    ));
}

#[test]
fn test_save_and_load() {
    let dir = std::env::temp_dir().join(format!("gesture-model-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    let model = train(&two_class_config(2), &Device::Cpu, &CancelToken::new(), no_progress).unwrap();
    model.save(&dir).unwrap();
    assert!(dir.join(TOPOLOGY_FILE).exists());
    assert!(dir.join(WEIGHTS_FILE).exists());

    let loaded = Classifier::load(&dir, &Device::Cpu).unwrap();
    assert_eq!(loaded.topology(), model.classifier().topology());

    let input = [0.3; FEATURE_WIDTH];
    let expected = model.classifier().probabilities(&input).unwrap();
    let actual = loaded.probabilities(&input).unwrap();
    for (a, b) in expected.iter().zip(&actual) {
        assert!((a - b).abs() < 1e-6);
    }

    fs::remove_dir_all(&dir).unwrap();
}
