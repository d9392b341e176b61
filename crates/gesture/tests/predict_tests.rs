use {
    base::CancelToken,
    candle_core::{DType, Device},
    candle_nn::{VarBuilder, VarMap},
    gesture::{
        Classifier, DatasetRow, FEATURE_WIDTH, GestureLabel, Hand, LANDMARK_COUNT, Predictor,
        SessionMeta, TrainConfig, Topology, UNKNOWN_LABEL, argmax, load_meta, meta::META_FILE,
        classifier::TOPOLOGY_FILE, normalize, predict, train,
    },
    std::fs,
};

fn classifier(class_count: usize) -> Classifier {
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    Classifier::new(Topology::for_classes(class_count).unwrap(), vb).unwrap()
}

fn meta(labels: &[(u32, &str)]) -> SessionMeta {
    SessionMeta {
        record_id: 1,
        gestures: labels
            .iter()
            .map(|&(id, label)| GestureLabel {
                id,
                label: label.to_string(),
            })
            .collect(),
    }
}

#[test]
fn test_argmax_first_maximum_wins() {
    assert_eq!(argmax(&[0.1, 0.1, 0.3, 0.1, 0.1, 0.3]), Some(2));
    assert_eq!(argmax(&[0.9, 0.05, 0.05]), Some(0));
    assert_eq!(argmax(&[0.25; 4]), Some(0));
}

#[test]
fn test_argmax_skips_nan_and_empty() {
    assert_eq!(argmax(&[f32::NAN, 0.2, 0.7]), Some(2));
    assert_eq!(argmax(&[f32::NAN, f32::NAN]), None);
    assert_eq!(argmax(&[]), None);
}

#[test]
fn test_predict_returns_valid_class() {
    let classifier = classifier(3);
    let class = predict(&classifier, &[0.5; FEATURE_WIDTH]).unwrap();
    assert!(class < 3);
}

#[test]
fn test_missing_label_renders_unknown() {
    let predictor = Predictor::new(classifier(2), meta(&[]));
    let prediction = predictor.predict(&[0.5; FEATURE_WIDTH]).unwrap();
    assert_eq!(prediction.label, None);
    assert_eq!(prediction.label_or_unknown(), UNKNOWN_LABEL);
    assert_eq!(prediction.probabilities.len(), 2);
    assert!(prediction.confidence() > 0.0);
}

#[test]
fn test_labels_resolved_by_id() {
    // listed out of order on purpose
    let predictor = Predictor::new(classifier(2), meta(&[(1, "palm"), (0, "fist")]));
    let prediction = predictor.predict(&[0.5; FEATURE_WIDTH]).unwrap();
    let expected = if prediction.class_id == 0 { "fist" } else { "palm" };
    assert_eq!(prediction.label_or_unknown(), expected);
}

#[test]
fn test_predict_hand() {
    let triples: Vec<[f32; 3]> = (0..LANDMARK_COUNT)
        .map(|i| [i as f32 * 3.0, (i % 4) as f32 * 5.0, 0.0])
        .collect();
    let hand = normalize(&Hand::from_triples(&triples).unwrap()).unwrap();
    let predictor = Predictor::new(classifier(2), meta(&[(0, "fist"), (1, "palm")]));
    let prediction = predictor.predict_hand(&hand).unwrap();
    assert!(prediction.label.is_some());
}

#[test]
fn test_load_saved_model_with_meta() {
    let dir = std::env::temp_dir().join(format!("gesture-predictor-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    let rows: Vec<DatasetRow> = (0..4)
        .map(|i| DatasetRow {
            features: vec![i as f32 / 4.0; FEATURE_WIDTH],
            label: i % 2,
        })
        .collect();
    let config = TrainConfig::new(1, 2, rows, Vec::new());
    let model = train(&config, &Device::Cpu, &CancelToken::new(), |_| {}).unwrap();
    model.save(&dir).unwrap();
    let session = meta(&[(0, "fist"), (1, "palm")]);
    session.save(dir.join(META_FILE)).unwrap();

    assert_eq!(load_meta(dir.join(META_FILE)).unwrap(), session);
    let json = fs::read_to_string(dir.join(META_FILE)).unwrap();
    assert!(json.contains("\"recordId\""));

    let predictor = Predictor::load(&dir, &Device::Cpu).unwrap();
    assert_eq!(predictor.meta(), &session);
    assert_eq!(predictor.classifier().class_count(), 2);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_label_map_by_id() {
    let labels = meta(&[(1, "palm"), (0, "fist")]).label_map();
    assert_eq!(labels.len(), 2);
    assert_eq!(labels[&0], "fist");
    assert_eq!(labels[&1], "palm");
}

#[test]
fn test_load_missing_model_fails() {
    let dir = std::env::temp_dir().join(format!("gesture-no-model-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    assert!(Predictor::load(&dir, &Device::Cpu).is_err());
    assert!(load_meta(dir.join(META_FILE)).is_err());
}

#[test]
fn test_load_corrupt_model_fails() {
    let dir = std::env::temp_dir().join(format!("gesture-corrupt-model-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(TOPOLOGY_FILE), "{ not a topology").unwrap();
    meta(&[(0, "fist")]).save(dir.join(META_FILE)).unwrap();

    assert!(matches!(
        Predictor::load(&dir, &Device::Cpu),
        Err(gesture::GestureError::Json(_))
    ));
    assert!(Classifier::load(&dir, &Device::Cpu).is_err());

    fs::remove_dir_all(&dir).unwrap();
}
