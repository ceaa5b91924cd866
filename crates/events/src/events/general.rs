use serde::{Deserialize, Serialize};

/// Events that belong to the whole run rather than to one sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Configuration validation results
    ConfigurationValidated {
        source: String,
        entities: usize,
        warnings: Vec<String>,
    },
}
