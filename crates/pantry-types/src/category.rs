use serde::{Deserialize, Serialize};

/// One entry of the recipe taxonomy.
///
/// Recipes join to categories through [`Category::key`]; `label` is display
/// text only. The store never mutates categories.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub key: String,
    pub label: String,
}

impl Category {
    pub fn new(id: impl Into<String>, key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            label: label.into(),
        }
    }
}
