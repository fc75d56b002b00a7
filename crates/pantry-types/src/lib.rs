//! Foundation types for Pantry, a local-first recipe catalog.
//!
//! Every other Pantry crate depends on `pantry-types`. Nothing in here touches
//! storage or the network; the types are plain values with serde support.
//!
//! # Key Types
//!
//! - [`Recipe`]: a user-owned recipe with ordered ingredients and steps
//! - [`RecipeId`]: opaque unique identifier, minted by an [`IdGenerator`]
//! - [`ImageRef`]: none, a bundled image key, or an external URI
//! - [`Category`]: taxonomy entry joined to recipes by `key`
//! - [`NewRecipe`] / [`RecipePatch`]: inputs for add and partial update
//! - [`Clock`]: timestamp source with strictly advancing `updatedAt`

pub mod category;
pub mod error;
pub mod identity;
pub mod image;
pub mod recipe;
pub mod seed;
pub mod temporal;

pub use category::Category;
pub use error::TypeError;
pub use identity::{IdGenerator, RecipeId, UuidGenerator};
pub use image::ImageRef;
pub use recipe::{NewRecipe, Recipe, RecipePatch};
pub use seed::{fallback_categories, sample_recipes, BUNDLED_IMAGE_KEYS, SAMPLE_RECIPE_COUNT};
pub use temporal::{advance_past, Clock, FixedClock, SystemClock};
