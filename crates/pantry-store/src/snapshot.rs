use std::fmt;

use pantry_types::Recipe;

/// Lifecycle phase of a recipe store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorePhase {
    Uninitialized,
    Loading,
    Ready,
}

impl fmt::Display for StorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "uninitialized"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
        }
    }
}

/// Point-in-time view of the store, as handed to observers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub phase: StorePhase,
    pub recipes: Vec<Recipe>,
    /// Active category key; empty means "show all".
    pub selected_filter: String,
}

impl StoreSnapshot {
    pub(crate) fn initial() -> Self {
        Self {
            phase: StorePhase::Uninitialized,
            recipes: Vec::new(),
            selected_filter: String::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase != StorePhase::Ready
    }

    /// Recipes matching the active filter, recomputed on every call.
    pub fn filtered_recipes(&self) -> Vec<Recipe> {
        filter_recipes(&self.recipes, &self.selected_filter)
    }
}

/// Recipes whose category equals `filter`, in collection order. An empty
/// filter returns the whole collection.
pub fn filter_recipes(recipes: &[Recipe], filter: &str) -> Vec<Recipe> {
    if filter.is_empty() {
        return recipes.to_vec();
    }
    recipes.iter().filter(|r| r.in_category(filter)).cloned().collect()
}
