//! Recipe category taxonomy for Pantry.
//!
//! Categories come from two interchangeable places: a remote JSON document
//! fetched once per session, and a list bundled with the application. The
//! bundled list is always available immediately; a usable remote list
//! replaces it wholesale when (and if) it arrives.
//!
//! # Modules
//!
//! - [`document`]: lenient parsing of the remote document
//! - [`source`]: the [`CategorySource`] trait and its HTTP implementation
//! - [`taxonomy`]: the [`Taxonomy`] working set with a stale-result guard

pub mod document;
pub mod error;
pub mod source;
pub mod taxonomy;

pub use document::parse_category_document;
pub use error::{TaxonomyError, TaxonomyResult};
pub use source::{CategorySource, HttpCategorySource, DEFAULT_FETCH_TIMEOUT_MS, DEFAULT_TAXONOMY_URL};
pub use taxonomy::{resolve_categories, RefreshToken, Taxonomy, TaxonomyOrigin, ALL_CATEGORIES_LABEL};
