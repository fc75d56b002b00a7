use serde::{Deserialize, Serialize};

/// Boot behavior of a [`RecipeStore`](crate::RecipeStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Wipe the durable record on every launch before loading. Only useful
    /// for demos: it discards all user edits across restarts.
    pub reset_on_launch: bool,
    /// Seed an empty catalog with the bundled sample recipes.
    pub seed_when_empty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            reset_on_launch: false,
            seed_when_empty: true,
        }
    }
}

impl StoreConfig {
    /// Demo mode: start from the sample recipes on every launch.
    pub fn demo() -> Self {
        Self {
            reset_on_launch: true,
            ..Default::default()
        }
    }
}
