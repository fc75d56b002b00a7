use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use pantry_storage::{BlobStore, FileBlobStore, RecipeStorage};
use pantry_store::{LoadOutcome, RecipeStore, StoreResult, StoreSnapshot};
use pantry_taxonomy::{CategorySource, HttpCategorySource, Taxonomy, TaxonomyOrigin};
use pantry_types::{Category, Recipe, RecipeId};

use crate::config::CatalogConfig;
use crate::draft::RecipeDraft;
use crate::error::{SdkError, SdkResult};

/// High-level Pantry catalog API.
///
/// Cheap to clone; clones share the same store and taxonomy.
pub struct Catalog<B = FileBlobStore> {
    store: Arc<RecipeStore<B>>,
    taxonomy: Arc<Taxonomy>,
    source: Option<Arc<dyn CategorySource>>,
}

impl<B> Clone for Catalog<B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            taxonomy: Arc::clone(&self.taxonomy),
            source: self.source.clone(),
        }
    }
}

/// Result of booting a catalog.
#[derive(Debug)]
pub struct BootReport {
    /// How the recipe store came up. An `Err` here is a failed first save of
    /// the sample seed; the store is still ready.
    pub recipes: StoreResult<LoadOutcome>,
    pub taxonomy: TaxonomyOrigin,
}

/// The two boot tasks, running independently of each other.
pub struct BootHandle {
    recipes: JoinHandle<StoreResult<LoadOutcome>>,
    refresh: Option<JoinHandle<TaxonomyOrigin>>,
    taxonomy: Arc<Taxonomy>,
}

impl BootHandle {
    /// Wait for both tasks.
    pub async fn join(self) -> SdkResult<BootReport> {
        let recipes = self
            .recipes
            .await
            .map_err(|e| SdkError::Task(e.to_string()))?;
        let taxonomy = match self.refresh {
            Some(handle) => handle.await.map_err(|e| SdkError::Task(e.to_string()))?,
            None => self.taxonomy.origin(),
        };
        Ok(BootReport { recipes, taxonomy })
    }
}

impl Catalog<FileBlobStore> {
    /// Catalog persisting under `config.data_dir`, fetching categories from
    /// `config.taxonomy_url` unless remote fetch is disabled.
    pub fn open(config: &CatalogConfig) -> SdkResult<Self> {
        let storage = RecipeStorage::with_key(
            FileBlobStore::new(&config.data_dir),
            config.storage_key.clone(),
        );
        let store = RecipeStore::new(storage).with_config(config.store_config());

        let source: Option<Arc<dyn CategorySource>> = if config.fetch_remote_taxonomy {
            let http = HttpCategorySource::new(config.taxonomy_url.clone(), config.fetch_timeout_ms)
                .map_err(|e| SdkError::Config(e.to_string()))?;
            Some(Arc::new(http))
        } else {
            None
        };

        debug!(data_dir = %config.data_dir.display(), remote = source.is_some(), "catalog opened");
        Ok(Self::from_parts(store, Taxonomy::bundled(), source))
    }
}

impl<B: BlobStore + 'static> Catalog<B> {
    pub fn from_parts(
        store: RecipeStore<B>,
        taxonomy: Taxonomy,
        source: Option<Arc<dyn CategorySource>>,
    ) -> Self {
        Self {
            store: Arc::new(store),
            taxonomy: Arc::new(taxonomy),
            source,
        }
    }

    pub fn store(&self) -> &RecipeStore<B> {
        &self.store
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    // ---- Boot ----

    /// Start the recipe load and the category fetch as two independent
    /// tasks. Neither waits for the other; categories are usable right away
    /// from the bundled list.
    pub fn spawn_boot(&self) -> BootHandle {
        let store = Arc::clone(&self.store);
        let recipes = tokio::spawn(async move { store.init().await });

        let refresh = self.source.as_ref().map(|source| {
            let taxonomy = Arc::clone(&self.taxonomy);
            let source = Arc::clone(source);
            tokio::spawn(async move { taxonomy.refresh(&source).await })
        });

        BootHandle {
            recipes,
            refresh,
            taxonomy: Arc::clone(&self.taxonomy),
        }
    }

    /// Boot and wait for both tasks.
    pub async fn boot(&self) -> SdkResult<BootReport> {
        let report = self.spawn_boot().join().await?;
        info!(recipes = self.store.len(), taxonomy = ?report.taxonomy, "catalog booted");
        Ok(report)
    }

    // ---- Mutations ----

    /// Validate `draft`, add it, and clear the active filter so the new
    /// recipe is visible.
    pub async fn add(&self, draft: RecipeDraft) -> SdkResult<Recipe> {
        let input = draft.into_new_recipe()?;
        let recipe = self.store.add_recipe(input).await?;
        self.store.clear_filter();
        Ok(recipe)
    }

    /// Validate `draft` and replace the fields of recipe `id` with it.
    pub async fn update(&self, id: &RecipeId, draft: RecipeDraft) -> SdkResult<Recipe> {
        let patch = draft.into_patch()?;
        if !self.store.update_recipe(id, patch).await? {
            return Err(SdkError::RecipeNotFound(id.to_string()));
        }
        self.store
            .get_recipe_by_id(id)
            .ok_or_else(|| SdkError::RecipeNotFound(id.to_string()))
    }

    pub async fn delete(&self, id: &RecipeId) -> SdkResult<()> {
        if !self.store.delete_recipe(id).await? {
            return Err(SdkError::RecipeNotFound(id.to_string()));
        }
        Ok(())
    }

    pub async fn reload(&self) -> SdkResult<LoadOutcome> {
        Ok(self.store.reload().await?)
    }

    /// Throw away every stored recipe and start over from the samples.
    pub async fn reset(&self) -> SdkResult<LoadOutcome> {
        Ok(self.store.reset().await?)
    }

    // ---- Reads ----

    pub fn recipe(&self, id: &RecipeId) -> SdkResult<Recipe> {
        self.store
            .get_recipe_by_id(id)
            .ok_or_else(|| SdkError::RecipeNotFound(id.to_string()))
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.store.recipes()
    }

    pub fn filtered_recipes(&self) -> Vec<Recipe> {
        self.store.filtered_recipes()
    }

    pub fn set_filter(&self, category_key: impl Into<String>) {
        self.store.set_filter(category_key);
    }

    pub fn selected_filter(&self) -> String {
        self.store.selected_filter()
    }

    /// Label of the active filter: "All" when none is set.
    pub fn filter_label(&self) -> String {
        self.taxonomy.label_for(&self.store.selected_filter())
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.store.subscribe()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.taxonomy.categories()
    }

    pub fn label_for(&self, category_key: &str) -> String {
        self.taxonomy.label_for(category_key)
    }
}

impl<B> std::fmt::Debug for Catalog<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("store", &self.store)
            .field("taxonomy", &self.taxonomy)
            .field("remote_source", &self.source.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pantry_storage::{InMemoryBlobStore, StorageError};
    use pantry_store::{StoreConfig, StoreError, StorePhase};
    use pantry_taxonomy::{TaxonomyError, TaxonomyResult};
    use pantry_types::{fallback_categories, SAMPLE_RECIPE_COUNT};
    use tempfile::TempDir;
    use tokio::sync::oneshot;

    use super::*;
    use crate::draft::DraftError;
    use crate::notice::{CatalogAction, Notice};

    type MemCatalog = Catalog<Arc<InMemoryBlobStore>>;

    fn memory_catalog(source: Option<Arc<dyn CategorySource>>) -> (Arc<InMemoryBlobStore>, MemCatalog) {
        let backend = Arc::new(InMemoryBlobStore::new());
        let store = RecipeStore::new(RecipeStorage::new(backend.clone()));
        (backend, Catalog::from_parts(store, Taxonomy::bundled(), source))
    }

    fn laksa() -> RecipeDraft {
        RecipeDraft::new("Laksa", "MALAY")
            .ingredient("noodles")
            .step("boil")
    }

    struct StaticSource(Vec<Category>);

    #[async_trait]
    impl CategorySource for StaticSource {
        async fn fetch_remote(&self) -> TaxonomyResult<Vec<Category>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl CategorySource for FailingSource {
        async fn fetch_remote(&self) -> TaxonomyResult<Vec<Category>> {
            Err(TaxonomyError::Network {
                status: Some(503),
                message: "unavailable".into(),
            })
        }
    }

    /// Source that does not answer until released.
    struct HeldSource {
        release: std::sync::Mutex<Option<oneshot::Receiver<()>>>,
        categories: Vec<Category>,
    }

    #[async_trait]
    impl CategorySource for HeldSource {
        async fn fetch_remote(&self) -> TaxonomyResult<Vec<Category>> {
            let gate = self.release.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(self.categories.clone())
        }
    }

    #[tokio::test]
    async fn boot_seeds_and_installs_remote_categories() {
        let remote = vec![Category::new("9", "THAI", "Thai")];
        let (_, catalog) = memory_catalog(Some(Arc::new(StaticSource(remote.clone()))));

        let report = catalog.boot().await.unwrap();
        assert_eq!(report.recipes.unwrap(), LoadOutcome::Seeded(SAMPLE_RECIPE_COUNT));
        assert_eq!(report.taxonomy, TaxonomyOrigin::Remote);
        assert_eq!(catalog.categories(), remote);
        assert!(!catalog.is_loading());
    }

    #[tokio::test]
    async fn network_failure_keeps_bundled_categories() {
        let (_, catalog) = memory_catalog(Some(Arc::new(FailingSource)));
        let report = catalog.boot().await.unwrap();
        assert_eq!(report.taxonomy, TaxonomyOrigin::Fallback);
        assert_eq!(catalog.categories(), fallback_categories());
        assert_eq!(catalog.recipes().len(), SAMPLE_RECIPE_COUNT);
    }

    #[tokio::test]
    async fn without_source_boot_uses_bundled_list() {
        let (_, catalog) = memory_catalog(None);
        let report = catalog.boot().await.unwrap();
        assert_eq!(report.taxonomy, TaxonomyOrigin::Fallback);
        assert_eq!(catalog.label_for("JAPANESE"), "Japanese");
    }

    #[tokio::test]
    async fn recipes_are_ready_while_category_fetch_is_pending() {
        let (release, gate) = oneshot::channel();
        let source = Arc::new(HeldSource {
            release: std::sync::Mutex::new(Some(gate)),
            categories: vec![Category::new("9", "THAI", "Thai")],
        });
        let (_, catalog) = memory_catalog(Some(source));

        let handle = catalog.spawn_boot();
        while catalog.is_loading() {
            tokio::task::yield_now().await;
        }
        assert_eq!(catalog.recipes().len(), SAMPLE_RECIPE_COUNT);
        assert_eq!(catalog.categories(), fallback_categories());

        release.send(()).unwrap();
        let report = handle.join().await.unwrap();
        assert_eq!(report.taxonomy, TaxonomyOrigin::Remote);
        assert_eq!(catalog.label_for("THAI"), "Thai");
    }

    #[tokio::test]
    async fn add_validates_and_clears_filter() {
        let (_, catalog) = memory_catalog(None);
        catalog.boot().await.unwrap();
        catalog.set_filter("CHINESE");

        let recipe = catalog.add(laksa()).await.unwrap();
        assert_eq!(catalog.selected_filter(), "");
        assert_eq!(catalog.filter_label(), "All");
        assert_eq!(catalog.filtered_recipes()[0].id, recipe.id);
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_store() {
        let (_, catalog) = memory_catalog(None);
        catalog.boot().await.unwrap();
        catalog.set_filter("CHINESE");

        let outcome = catalog.add(RecipeDraft::new("", "MALAY")).await;
        assert!(matches!(outcome, Err(SdkError::Validation(DraftError::MissingTitle))));
        assert_eq!(
            Notice::for_outcome(CatalogAction::Add, &outcome),
            Notice::error("Please enter a recipe title.")
        );
        assert_eq!(catalog.recipes().len(), SAMPLE_RECIPE_COUNT);
        assert_eq!(catalog.selected_filter(), "CHINESE");
    }

    #[tokio::test]
    async fn failed_add_keeps_filter_and_reports_retryable() {
        let (backend, catalog) = memory_catalog(None);
        catalog.boot().await.unwrap();
        catalog.set_filter("CHINESE");
        backend.set_read_only(true);

        let outcome = catalog.add(laksa()).await;
        let err = outcome.as_ref().unwrap_err();
        assert!(matches!(err, SdkError::Store(StoreError::Persist(StorageError::ReadOnly))));
        assert!(err.is_retryable());
        assert_eq!(
            Notice::for_outcome(CatalogAction::Add, &outcome).message,
            "Failed to add recipe. Please try again."
        );
        assert_eq!(catalog.selected_filter(), "CHINESE");
    }

    #[tokio::test]
    async fn update_replaces_fields_from_draft() {
        let (_, catalog) = memory_catalog(None);
        catalog.boot().await.unwrap();

        let id = RecipeId::from("3");
        let mut draft = RecipeDraft::from_recipe(&catalog.recipe(&id).unwrap());
        draft.title = "Roti Canai Special".into();
        draft.steps.push("  serve hot ".into());

        let updated = catalog.update(&id, draft).await.unwrap();
        assert_eq!(updated.title, "Roti Canai Special");
        assert_eq!(updated.steps.last().map(String::as_str), Some("serve hot"));
        assert_eq!(updated.category_key, "INDIAN");
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_id_report_not_found() {
        let (_, catalog) = memory_catalog(None);
        catalog.boot().await.unwrap();
        let ghost = RecipeId::from("ghost");

        assert!(matches!(catalog.update(&ghost, laksa()).await, Err(SdkError::RecipeNotFound(_))));
        assert!(matches!(catalog.delete(&ghost).await, Err(SdkError::RecipeNotFound(_))));
        assert!(matches!(catalog.recipe(&ghost), Err(SdkError::RecipeNotFound(_))));
    }

    #[tokio::test]
    async fn operations_before_boot_are_not_ready() {
        let (_, catalog) = memory_catalog(None);
        let err = catalog.add(laksa()).await.unwrap_err();
        assert!(matches!(
            err,
            SdkError::Store(StoreError::NotReady { phase: StorePhase::Uninitialized })
        ));
    }

    #[tokio::test]
    async fn file_backed_catalog_survives_restart() {
        let dir = TempDir::new().unwrap();
        let config = CatalogConfig {
            data_dir: dir.path().join("data"),
            fetch_remote_taxonomy: false,
            ..Default::default()
        };

        let first = Catalog::open(&config).unwrap();
        first.boot().await.unwrap();
        let added = first.add(laksa()).await.unwrap();
        first.delete(&RecipeId::from("1")).await.unwrap();
        assert!(dir.path().join("data/RECIPES_V1.json").exists());

        let second = Catalog::open(&config).unwrap();
        let report = second.boot().await.unwrap();
        assert_eq!(report.recipes.unwrap(), LoadOutcome::Loaded(SAMPLE_RECIPE_COUNT));
        assert_eq!(second.recipes(), first.recipes());
        assert_eq!(second.recipe(&added.id).unwrap().title, "Laksa");
    }

    #[tokio::test]
    async fn reset_on_launch_config_discards_edits() {
        let dir = TempDir::new().unwrap();
        let mut config = CatalogConfig {
            data_dir: dir.path().to_path_buf(),
            fetch_remote_taxonomy: false,
            ..Default::default()
        };

        let first = Catalog::open(&config).unwrap();
        first.boot().await.unwrap();
        first.add(laksa()).await.unwrap();

        config.reset_on_launch = true;
        let second = Catalog::open(&config).unwrap();
        assert_eq!(second.store().config(), &StoreConfig::demo());
        second.boot().await.unwrap();
        assert!(second.recipes().iter().all(|r| r.title != "Laksa"));
    }

    #[tokio::test]
    async fn explicit_reset_reseeds() {
        let (_, catalog) = memory_catalog(None);
        catalog.boot().await.unwrap();
        catalog.add(laksa()).await.unwrap();
        assert_eq!(catalog.reset().await.unwrap(), LoadOutcome::Seeded(SAMPLE_RECIPE_COUNT));
        assert_eq!(catalog.recipes().len(), SAMPLE_RECIPE_COUNT);
    }
}
