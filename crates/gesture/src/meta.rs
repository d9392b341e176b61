use {
    crate::{GestureError, recorder::ClassId},
    serde::{Deserialize, Serialize},
    std::{
        collections::HashMap,
        path::Path,
        time::{SystemTime, UNIX_EPOCH},
    },
};

/// File name of the session metadata stored next to a trained model.
pub const META_FILE: &str = "meta.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureLabel {
    pub id: ClassId,
    pub label: String,
}

/// The record id and class labels of one training session.
///
/// Persisted as `meta.json` so an inference session can turn output indices
/// back into labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMeta {
    pub record_id: u64,
    pub gestures: Vec<GestureLabel>,
}

impl SessionMeta {
    /// Milliseconds since the Unix epoch, used as a unique-enough record id.
    pub fn timestamp_record_id() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    pub fn label(&self, id: ClassId) -> Option<&str> {
        self.gestures
            .iter()
            .find(|gesture| gesture.id == id)
            .map(|gesture| gesture.label.as_str())
    }

    pub fn label_map(&self) -> HashMap<ClassId, String> {
        self.gestures
            .iter()
            .map(|gesture| (gesture.id, gesture.label.clone()))
            .collect()
    }

    /// Write pretty-printed JSON to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GestureError> {
        let json = serde_json::to_string_pretty(self)?;
        crate::dataset::write_atomic(path.as_ref(), json.as_bytes())
    }
}

/// Read session metadata from a `meta.json` file.
pub fn load_meta(path: impl AsRef<Path>) -> Result<SessionMeta, GestureError> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
