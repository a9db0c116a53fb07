use serde::Deserialize;

pub const DEFAULT_SOFT_DELETE: bool = true;

/// How local accounts are removed
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalStoreConfig {
    /// Stamp `deleted_at` instead of removing the row
    pub soft_delete: bool,
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            soft_delete: DEFAULT_SOFT_DELETE,
        }
    }
}
