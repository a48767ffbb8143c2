use serde::{Deserialize, Serialize};

/// The sample resource served by the dummy services.
///
/// `id` is `None` until the controller stores the dummy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dummy {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    pub content: String,
}

impl Dummy {
    /// Creates an unsaved dummy.
    pub fn new(key: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            key: key.into(),
            content: content.into(),
        }
    }
}

/// A page of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPage<T> {
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}
