use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One timestamped value for a field. Several records may share a field
/// name; the most recent one wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRecord {
    /// Field this value belongs to.
    pub field_name: String,
    /// `None` resolves to an empty string.
    pub value: Option<String>,
    /// Newest timestamp wins during resolution.
    pub created_at: NaiveDateTime,
}
