use {
    crate::{FEATURE_WIDTH, GestureClass, GestureError, LANDMARK_COUNT, normalize::unflatten},
    base::{Vec2, log},
    std::{
        fs,
        io::Write,
        path::{Path, PathBuf},
    },
};

pub const TRAIN_FILE: &str = "train.csv";
pub const TEST_FILE: &str = "test.csv";

/// Every 9th sample of a class, starting at index 1, goes to the test split.
const TEST_STRIDE: usize = 9;
const TEST_OFFSET: usize = 1;

/// Name of the label column, always last.
pub const LABEL_COLUMN: &str = "label";

/// Column names: `lm1_x, lm1_y, ..., lm21_x, lm21_y, label`.
pub fn header() -> Vec<String> {
    let mut columns = Vec::with_capacity(FEATURE_WIDTH + 1);
    for joint in 1..=LANDMARK_COUNT {
        columns.push(format!("lm{joint}_x"));
        columns.push(format!("lm{joint}_y"));
    }
    columns.push(LABEL_COLUMN.to_string());
    columns
}

/// One labeled, flattened sample.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetRow {
    pub features: Vec<f32>,
    pub label: u32,
}

impl DatasetRow {
    /// Decode the features back into per-joint (x, y) pairs.
    pub fn joints(&self) -> Result<Vec<Vec2<f32>>, GestureError> {
        unflatten(&self.features)
    }

    fn to_csv_line(&self) -> String {
        let mut fields: Vec<String> = self.features.iter().map(|v| v.to_string()).collect();
        fields.push(self.label.to_string());
        fields.join(",")
    }
}

/// Whether the sample at per-class index `index` belongs to the test split.
pub fn is_test_index(index: usize) -> bool {
    index % TEST_STRIDE == TEST_OFFSET
}

/// Train and test rows produced from one recording session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodedDataset {
    pub train: Vec<DatasetRow>,
    pub test: Vec<DatasetRow>,
}

impl EncodedDataset {
    pub fn train_csv(&self) -> String {
        to_csv(&self.train)
    }

    pub fn test_csv(&self) -> String {
        to_csv(&self.test)
    }

    /// Write `train.csv` and `test.csv` into `dir`, train first.
    ///
    /// Each file is replaced atomically; if the train file fails to write the
    /// test file is left untouched.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<(PathBuf, PathBuf), GestureError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let train_path = dir.join(TRAIN_FILE);
        let test_path = dir.join(TEST_FILE);
        write_atomic(&train_path, self.train_csv().as_bytes())?;
        write_atomic(&test_path, self.test_csv().as_bytes())?;
        log::info!(
            "wrote {} train rows and {} test rows to {}",
            self.train.len(),
            self.test.len(),
            dir.display()
        );
        Ok((train_path, test_path))
    }
}

/// Flatten and partition recorded gesture classes.
///
/// Samples are visited in recording order per class; the class id becomes
/// the row label. Classes without samples contribute nothing.
pub fn encode(classes: &[GestureClass]) -> Result<EncodedDataset, GestureError> {
    let mut dataset = EncodedDataset::default();
    for class in classes {
        for (index, sample) in class.samples.iter().enumerate() {
            let features = sample.features();
            if let Some(position) = features.iter().position(|v| !v.is_finite()) {
                return Err(GestureError::InvalidSample(format!(
                    "class {} sample {} has non-finite feature {}",
                    class.id, index, position
                )));
            }
            let row = DatasetRow {
                features,
                label: class.id,
            };
            if is_test_index(index) {
                dataset.test.push(row);
            } else {
                dataset.train.push(row);
            }
        }
    }
    Ok(dataset)
}

/// Render rows as CSV text with a header line and no trailing newline.
pub fn to_csv(rows: &[DatasetRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(header().join(","));
    lines.extend(rows.iter().map(DatasetRow::to_csv_line));
    lines.join("\n")
}

/// Parse CSV text produced by `to_csv`. The last column is the label.
pub fn parse_csv(text: &str) -> Result<Vec<DatasetRow>, GestureError> {
    let mut lines = text.lines().enumerate().filter(|(_, line)| !line.trim().is_empty());

    let Some((_, header_line)) = lines.next() else {
        return Err(GestureError::Csv {
            line: 1,
            message: "missing header".to_string(),
        });
    };
    let expected = header();
    let columns: Vec<&str> = header_line.split(',').map(str::trim).collect();
    if columns != expected {
        return Err(GestureError::Csv {
            line: 1,
            message: format!("expected {} header columns ending in '{LABEL_COLUMN}'", expected.len()),
        });
    }

    lines
        .map(|(index, line)| parse_row(index + 1, line))
        .collect()
}

fn parse_row(line_number: usize, line: &str) -> Result<DatasetRow, GestureError> {
    let csv_error = |message: String| GestureError::Csv {
        line: line_number,
        message,
    };
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FEATURE_WIDTH + 1 {
        return Err(GestureError::FeatureWidth {
            expected: FEATURE_WIDTH,
            actual: fields.len().saturating_sub(1),
        });
    }
    let (label_field, feature_fields) = fields.split_last().ok_or_else(|| csv_error("empty row".into()))?;
    let features = feature_fields
        .iter()
        .map(|field| {
            field
                .parse::<f32>()
                .map_err(|e| csv_error(format!("bad feature '{field}': {e}")))
        })
        .collect::<Result<Vec<f32>, _>>()?;
    let label = label_field
        .parse::<u32>()
        .map_err(|e| csv_error(format!("bad label '{label_field}': {e}")))?;
    Ok(DatasetRow { features, label })
}

/// Load a dataset CSV file written by `EncodedDataset::write`.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<DatasetRow>, GestureError> {
    let text = fs::read_to_string(path)?;
    parse_csv(&text)
}

/// Replace `path` with `contents` so readers never observe a partial file.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), GestureError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| GestureError::Io(format!("not a file path: {}", path.display())))?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));
    let result = (|| {
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)
    })();
    if let Err(e) = result {
        fs::remove_file(&tmp_path).ok();
        return Err(e.into());
    }
    Ok(())
}
