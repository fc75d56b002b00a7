//! High-level SDK for Pantry.
//!
//! [`Catalog`] bundles a [`RecipeStore`] and a [`Taxonomy`] behind one
//! handle, wires them from a [`CatalogConfig`], and boots them as two
//! independent tasks. It also carries what a presentation layer needs around
//! the store: caller-side [`RecipeDraft`] validation and user-facing
//! [`Notice`]s.

pub mod catalog;
pub mod config;
pub mod draft;
pub mod error;
pub mod notice;

pub use catalog::{BootHandle, BootReport, Catalog};
pub use config::CatalogConfig;
pub use draft::{DraftError, RecipeDraft};
pub use error::{SdkError, SdkResult};
pub use notice::{CatalogAction, Notice, NoticeLevel};

// Re-export key types
pub use pantry_storage::{FileBlobStore, InMemoryBlobStore};
pub use pantry_store::{LoadOutcome, RecipeStore, StorePhase, StoreSnapshot};
pub use pantry_taxonomy::{Taxonomy, TaxonomyOrigin, ALL_CATEGORIES_LABEL};
pub use pantry_types::{Category, ImageRef, Recipe, RecipeId};
