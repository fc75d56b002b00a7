use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use pantry_storage::{BlobStore, RecipeStorage};
use pantry_types::{
    sample_recipes, Clock, IdGenerator, NewRecipe, Recipe, RecipeId, RecipePatch, SystemClock,
    UuidGenerator,
};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::snapshot::{filter_recipes, StorePhase, StoreSnapshot};

/// How many fresh ids to try before giving up on a colliding generator.
const MAX_ID_ATTEMPTS: usize = 16;

/// What a completed load did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A stored collection of this many recipes was installed.
    Loaded(usize),
    /// Nothing usable was stored; the sample recipes were installed.
    Seeded(usize),
    /// Nothing usable was stored and seeding is disabled.
    Empty,
    /// A newer load started before this one finished; its result was dropped.
    Superseded,
}

struct StoreState {
    phase: StorePhase,
    recipes: Vec<Recipe>,
    selected_filter: String,
}

impl StoreState {
    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            phase: self.phase,
            recipes: self.recipes.clone(),
            selected_filter: self.selected_filter.clone(),
        }
    }

    fn ensure_ready(&self) -> StoreResult<()> {
        if self.phase != StorePhase::Ready {
            return Err(StoreError::NotReady { phase: self.phase });
        }
        Ok(())
    }

    fn position(&self, id: &RecipeId) -> Option<usize> {
        self.recipes.iter().position(|r| &r.id == id)
    }
}

/// Authoritative in-memory recipe collection with persistence on every
/// mutation.
///
/// Construct once at startup and share through an `Arc`.
pub struct RecipeStore<B> {
    storage: RecipeStorage<B>,
    config: StoreConfig,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    state: RwLock<StoreState>,
    /// Serializes mutate-then-persist sequences and whole loads.
    writer: Mutex<()>,
    /// Incremented by every load; a load only installs its result if it is
    /// still the latest.
    generation: AtomicU64,
    updates: watch::Sender<StoreSnapshot>,
}

impl<B: BlobStore> RecipeStore<B> {
    pub fn new(storage: RecipeStorage<B>) -> Self {
        let (updates, _) = watch::channel(StoreSnapshot::initial());
        Self {
            storage,
            config: StoreConfig::default(),
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidGenerator),
            state: RwLock::new(StoreState {
                phase: StorePhase::Uninitialized,
                recipes: Vec::new(),
                selected_filter: String::new(),
            }),
            writer: Mutex::new(()),
            generation: AtomicU64::new(0),
            updates,
        }
    }

    pub fn with_config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage(&self) -> &RecipeStorage<B> {
        &self.storage
    }

    // ---- Lifecycle ----

    /// Launch-time load. Clears the durable record first when
    /// `reset_on_launch` is set.
    pub async fn init(&self) -> StoreResult<LoadOutcome> {
        self.load(self.config.reset_on_launch).await
    }

    /// Re-enter `Loading` and install whatever storage holds now.
    pub async fn reload(&self) -> StoreResult<LoadOutcome> {
        self.load(false).await
    }

    /// Clear the durable record and start over from the sample recipes
    /// (or an empty catalog when seeding is disabled).
    pub async fn reset(&self) -> StoreResult<LoadOutcome> {
        self.load(true).await
    }

    async fn load(&self, reset: bool) -> StoreResult<LoadOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.update_state(|state| state.phase = StorePhase::Loading);
        debug!(generation, reset, "recipe store loading");

        // Held across the read so an in-flight mutation's save lands first.
        let _writer = self.writer.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded recipe load");
            return Ok(LoadOutcome::Superseded);
        }
        if reset {
            info!("clearing stored recipes before load");
            self.storage.clear().await;
        }
        let stored = self.storage.load().await;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "discarding superseded recipe load");
            return Ok(LoadOutcome::Superseded);
        }

        match stored {
            Some(recipes) if !recipes.is_empty() => {
                let count = recipes.len();
                self.install(recipes);
                info!(count, "recipe store ready");
                Ok(LoadOutcome::Loaded(count))
            }
            _ if self.config.seed_when_empty => {
                let seed = sample_recipes(self.clock.now());
                let count = seed.len();
                self.install(seed.clone());
                info!(count, "recipe store seeded with sample recipes");
                self.storage.save(&seed).await?;
                Ok(LoadOutcome::Seeded(count))
            }
            _ => {
                self.install(Vec::new());
                info!("recipe store ready with an empty catalog");
                Ok(LoadOutcome::Empty)
            }
        }
    }

    fn install(&self, recipes: Vec<Recipe>) {
        self.update_state(|state| {
            state.recipes = recipes;
            state.phase = StorePhase::Ready;
        });
    }

    // ---- Mutations ----

    /// Create a recipe from already-validated fields, insert it at the front,
    /// and persist.
    ///
    /// On [`StoreError::Persist`] the recipe stays in memory.
    pub async fn add_recipe(&self, input: NewRecipe) -> StoreResult<Recipe> {
        let _writer = self.writer.lock().await;
        let (recipe, recipes) = {
            let mut state = self.state.write().expect("store lock poisoned");
            state.ensure_ready()?;
            let id = self.fresh_id(&state)?;
            let recipe = Recipe::create(id, input, self.clock.now());
            state.recipes.insert(0, recipe.clone());
            (recipe, state.recipes.clone())
        };
        self.publish();
        debug!(id = %recipe.id, "recipe added");

        self.persist(&recipes).await?;
        Ok(recipe)
    }

    /// Merge `patch` into the recipe with `id` and persist.
    ///
    /// Returns `Ok(false)` without touching anything if `id` is unknown.
    pub async fn update_recipe(&self, id: &RecipeId, patch: RecipePatch) -> StoreResult<bool> {
        let _writer = self.writer.lock().await;
        let recipes = {
            let mut state = self.state.write().expect("store lock poisoned");
            state.ensure_ready()?;
            let Some(index) = state.position(id) else {
                debug!(%id, "update of unknown recipe ignored");
                return Ok(false);
            };
            let now = self.clock.now();
            state.recipes[index].apply(patch, now);
            state.recipes.clone()
        };
        self.publish();
        debug!(%id, "recipe updated");

        self.persist(&recipes).await?;
        Ok(true)
    }

    /// Remove the recipe with `id` and persist.
    ///
    /// Returns `Ok(false)` without touching anything if `id` is unknown.
    pub async fn delete_recipe(&self, id: &RecipeId) -> StoreResult<bool> {
        let _writer = self.writer.lock().await;
        let recipes = {
            let mut state = self.state.write().expect("store lock poisoned");
            state.ensure_ready()?;
            let Some(index) = state.position(id) else {
                debug!(%id, "delete of unknown recipe ignored");
                return Ok(false);
            };
            state.recipes.remove(index);
            state.recipes.clone()
        };
        self.publish();
        debug!(%id, "recipe deleted");

        self.persist(&recipes).await?;
        Ok(true)
    }

    fn fresh_id(&self, state: &StoreState) -> StoreResult<RecipeId> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = self.ids.next_id();
            if state.position(&id).is_none() {
                return Ok(id);
            }
            warn!(%id, "id generator returned an id already in use");
        }
        Err(StoreError::IdCollision {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    async fn persist(&self, recipes: &[Recipe]) -> StoreResult<()> {
        if let Err(e) = self.storage.save(recipes).await {
            warn!(error = %e, "recipe save failed; keeping in-memory changes");
            return Err(e.into());
        }
        Ok(())
    }

    // ---- Filter ----

    /// Set the active category filter; empty shows everything. Not persisted.
    pub fn set_filter(&self, category_key: impl Into<String>) {
        let key = category_key.into();
        self.update_state(|state| state.selected_filter = key);
    }

    pub fn clear_filter(&self) {
        self.set_filter(String::new());
    }

    // ---- Reads ----

    pub fn get_recipe_by_id(&self, id: &RecipeId) -> Option<Recipe> {
        let state = self.state.read().expect("store lock poisoned");
        state.recipes.iter().find(|r| &r.id == id).cloned()
    }

    pub fn recipes(&self) -> Vec<Recipe> {
        self.state.read().expect("store lock poisoned").recipes.clone()
    }

    /// Recipes matching the active filter, recomputed from the current
    /// collection and filter on every call.
    pub fn filtered_recipes(&self) -> Vec<Recipe> {
        let state = self.state.read().expect("store lock poisoned");
        filter_recipes(&state.recipes, &state.selected_filter)
    }

    pub fn selected_filter(&self) -> String {
        self.state.read().expect("store lock poisoned").selected_filter.clone()
    }

    pub fn phase(&self) -> StorePhase {
        self.state.read().expect("store lock poisoned").phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase() != StorePhase::Ready
    }

    pub fn len(&self) -> usize {
        self.state.read().expect("store lock poisoned").recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.read().expect("store lock poisoned").snapshot()
    }

    /// Receive a fresh [`StoreSnapshot`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.updates.subscribe()
    }

    fn update_state(&self, f: impl FnOnce(&mut StoreState)) {
        {
            let mut state = self.state.write().expect("store lock poisoned");
            f(&mut state);
        }
        self.publish();
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.updates.send_replace(snapshot);
    }
}

impl<B> std::fmt::Debug for RecipeStore<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read().expect("store lock poisoned");
        f.debug_struct("RecipeStore")
            .field("phase", &state.phase)
            .field("recipe_count", &state.recipes.len())
            .field("selected_filter", &state.selected_filter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use pantry_storage::{InMemoryBlobStore, StorageError, StorageResult, DEFAULT_STORAGE_KEY};
    use pantry_types::{FixedClock, ImageRef, SAMPLE_RECIPE_COUNT};
    use tokio::sync::oneshot;

    use super::*;

    type MemStore = RecipeStore<Arc<InMemoryBlobStore>>;

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()))
    }

    fn store_over(backend: Arc<InMemoryBlobStore>) -> MemStore {
        RecipeStore::new(RecipeStorage::new(backend))
    }

    async fn ready_store() -> (Arc<InMemoryBlobStore>, MemStore) {
        let backend = Arc::new(InMemoryBlobStore::new());
        let store = store_over(backend.clone());
        store.init().await.unwrap();
        (backend, store)
    }

    fn test_input() -> NewRecipe {
        NewRecipe::new("Test", "CHINESE")
            .with_ingredients(["a"])
            .with_steps(["b"])
    }

    async fn persisted(backend: &Arc<InMemoryBlobStore>) -> Vec<Recipe> {
        RecipeStorage::new(backend.clone()).load().await.expect("record present")
    }

    // -----------------------------------------------------------------------
    // Boot
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn empty_storage_is_seeded_and_persisted() {
        let backend = Arc::new(InMemoryBlobStore::new());
        let store = store_over(backend.clone());
        assert_eq!(store.phase(), StorePhase::Uninitialized);
        assert!(store.is_loading());

        let outcome = store.init().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Seeded(SAMPLE_RECIPE_COUNT));
        assert_eq!(store.phase(), StorePhase::Ready);
        assert_eq!(store.len(), SAMPLE_RECIPE_COUNT);
        assert_eq!(persisted(&backend).await, store.recipes());
    }

    #[tokio::test]
    async fn existing_record_is_loaded_not_seeded() {
        let backend = Arc::new(InMemoryBlobStore::new());
        let first = store_over(backend.clone());
        first.init().await.unwrap();
        first.add_recipe(test_input()).await.unwrap();

        let second = store_over(backend.clone());
        assert_eq!(second.init().await.unwrap(), LoadOutcome::Loaded(SAMPLE_RECIPE_COUNT + 1));
        assert_eq!(second.recipes(), first.recipes());
    }

    #[tokio::test]
    async fn corrupt_record_falls_back_to_seed() {
        let backend = Arc::new(InMemoryBlobStore::new());
        backend.put(DEFAULT_STORAGE_KEY, b"][").await.unwrap();
        let store = store_over(backend.clone());
        assert_eq!(store.init().await.unwrap(), LoadOutcome::Seeded(SAMPLE_RECIPE_COUNT));
        assert_eq!(persisted(&backend).await.len(), SAMPLE_RECIPE_COUNT);
    }

    #[tokio::test]
    async fn empty_stored_list_is_seeded() {
        let backend = Arc::new(InMemoryBlobStore::new());
        RecipeStorage::new(backend.clone()).save(&[]).await.unwrap();
        let store = store_over(backend);
        assert_eq!(store.init().await.unwrap(), LoadOutcome::Seeded(SAMPLE_RECIPE_COUNT));
    }

    #[tokio::test]
    async fn seeding_can_be_disabled() {
        let store = store_over(Arc::new(InMemoryBlobStore::new())).with_config(StoreConfig {
            seed_when_empty: false,
            ..Default::default()
        });
        assert_eq!(store.init().await.unwrap(), LoadOutcome::Empty);
        assert!(store.is_empty());
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn reset_on_launch_discards_previous_edits() {
        let backend = Arc::new(InMemoryBlobStore::new());
        let first = store_over(backend.clone());
        first.init().await.unwrap();
        first.add_recipe(test_input()).await.unwrap();

        let demo = store_over(backend.clone()).with_config(StoreConfig::demo());
        assert_eq!(demo.init().await.unwrap(), LoadOutcome::Seeded(SAMPLE_RECIPE_COUNT));
        assert!(demo.recipes().iter().all(|r| r.title != "Test"));
    }

    #[tokio::test]
    async fn explicit_reset_restores_samples() {
        let (backend, store) = ready_store().await;
        store.add_recipe(test_input()).await.unwrap();
        store.delete_recipe(&RecipeId::from("1")).await.unwrap();

        assert_eq!(store.reset().await.unwrap(), LoadOutcome::Seeded(SAMPLE_RECIPE_COUNT));
        assert!(store.get_recipe_by_id(&RecipeId::from("1")).is_some());
        assert_eq!(persisted(&backend).await, store.recipes());
    }

    #[tokio::test]
    async fn seed_save_failure_is_reported_but_store_is_ready() {
        let backend = Arc::new(InMemoryBlobStore::new());
        backend.set_read_only(true);
        let store = store_over(backend);
        let err = store.init().await.unwrap_err();
        assert!(matches!(err, StoreError::Persist(StorageError::ReadOnly)));
        assert_eq!(store.phase(), StorePhase::Ready);
        assert_eq!(store.len(), SAMPLE_RECIPE_COUNT);
    }

    #[tokio::test]
    async fn mutations_before_ready_are_rejected() {
        let store = store_over(Arc::new(InMemoryBlobStore::new()));
        let err = store.add_recipe(test_input()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotReady { phase: StorePhase::Uninitialized }));
        assert!(store.delete_recipe(&RecipeId::from("1")).await.is_err());
        assert!(store.update_recipe(&RecipeId::from("1"), RecipePatch::default()).await.is_err());
        assert!(store.get_recipe_by_id(&RecipeId::from("1")).is_none());
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn walkthrough_add_then_delete_sample() {
        let (backend, store) = ready_store().await;
        assert_eq!(store.len(), 5);

        let sample_ids: Vec<RecipeId> = store.recipes().into_iter().map(|r| r.id).collect();
        let added = store.add_recipe(test_input()).await.unwrap();
        assert_eq!(store.len(), 6);
        assert_eq!(store.recipes()[0], added);
        assert!(!added.id.as_str().is_empty());
        assert!(!sample_ids.contains(&added.id));
        assert_eq!(persisted(&backend).await.len(), 6);

        let victim = &sample_ids[2];
        assert!(store.delete_recipe(victim).await.unwrap());
        assert_eq!(store.len(), 5);
        assert!(store.get_recipe_by_id(victim).is_none());
        assert_eq!(persisted(&backend).await, store.recipes());
    }

    #[tokio::test]
    async fn add_sets_timestamps_and_keeps_order_of_lists() {
        let clock = fixed_clock();
        let backend = Arc::new(InMemoryBlobStore::new());
        let store = store_over(backend).with_clock(clock.clone());
        store.init().await.unwrap();

        let input = NewRecipe::new("  Soup  ", "WESTERN")
            .with_image(ImageRef::uri("file:///soup.jpg"))
            .with_ingredients(["c", "a", "b"])
            .with_steps(["3", "1", "2"]);
        let recipe = store.add_recipe(input).await.unwrap();

        assert_eq!(recipe.title, "Soup");
        assert_eq!(recipe.created_at, clock.now());
        assert_eq!(recipe.updated_at, clock.now());
        assert_eq!(recipe.ingredients, vec!["c", "a", "b"]);
        assert_eq!(recipe.steps, vec!["3", "1", "2"]);
        assert_eq!(recipe.image.as_uri(), Some("file:///soup.jpg"));
    }

    #[tokio::test]
    async fn newest_recipes_come_first() {
        let (_, store) = ready_store().await;
        let a = store.add_recipe(NewRecipe::new("A", "X")).await.unwrap();
        let b = store.add_recipe(NewRecipe::new("B", "X")).await.unwrap();
        let recipes = store.recipes();
        assert_eq!(recipes[0].id, b.id);
        assert_eq!(recipes[1].id, a.id);
    }

    #[tokio::test]
    async fn title_update_merges_and_advances_updated_at() {
        let clock = fixed_clock();
        let backend = Arc::new(InMemoryBlobStore::new());
        let store = store_over(backend.clone()).with_clock(clock.clone());
        store.init().await.unwrap();

        let id = RecipeId::from("2");
        let before = store.get_recipe_by_id(&id).unwrap();
        // Clock deliberately not advanced.
        assert!(store.update_recipe(&id, RecipePatch::default().title("Nasi Lemak Special")).await.unwrap());

        let after = store.get_recipe_by_id(&id).unwrap();
        assert_eq!(after.title, "Nasi Lemak Special");
        assert_eq!(after.id, before.id);
        assert_eq!(after.category_key, before.category_key);
        assert_eq!(after.ingredients, before.ingredients);
        assert_eq!(after.steps, before.steps);
        assert_eq!(after.image, before.image);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);

        let stored = persisted(&backend).await;
        assert_eq!(stored.iter().find(|r| r.id == id).unwrap(), &after);
    }

    #[tokio::test]
    async fn update_uses_clock_when_it_moves_forward() {
        let clock = fixed_clock();
        let store = store_over(Arc::new(InMemoryBlobStore::new())).with_clock(clock.clone());
        store.init().await.unwrap();

        clock.advance(Duration::minutes(5));
        let id = RecipeId::from("1");
        store.update_recipe(&id, RecipePatch::default().category_key("MALAY")).await.unwrap();
        let recipe = store.get_recipe_by_id(&id).unwrap();
        assert_eq!(recipe.updated_at, clock.now());
        assert_eq!(recipe.category_key, "MALAY");
    }

    #[tokio::test]
    async fn update_of_missing_id_is_a_silent_noop() {
        let (backend, store) = ready_store().await;
        let before = store.recipes();
        let stored_before = persisted(&backend).await;

        let found = store
            .update_recipe(&RecipeId::from("ghost"), RecipePatch::default().title("x"))
            .await
            .unwrap();
        assert!(!found);
        assert_eq!(store.recipes(), before);
        assert_eq!(persisted(&backend).await, stored_before);
    }

    #[tokio::test]
    async fn delete_of_missing_id_leaves_collection_unchanged() {
        let (_, store) = ready_store().await;
        assert!(!store.delete_recipe(&RecipeId::from("ghost")).await.unwrap());
        assert_eq!(store.len(), SAMPLE_RECIPE_COUNT);
    }

    #[tokio::test]
    async fn dangling_category_keys_are_kept() {
        let (_, store) = ready_store().await;
        let recipe = store.add_recipe(NewRecipe::new("Fusion", "NOT_IN_TAXONOMY")).await.unwrap();
        assert_eq!(store.get_recipe_by_id(&recipe.id).unwrap().category_key, "NOT_IN_TAXONOMY");
    }

    // -----------------------------------------------------------------------
    // Persistence failures
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn failed_save_keeps_in_memory_mutation() {
        let (backend, store) = ready_store().await;
        backend.set_read_only(true);

        let err = store.add_recipe(test_input()).await.unwrap_err();
        assert!(matches!(err, StoreError::Persist(StorageError::ReadOnly)));
        assert!(err.is_retryable());
        assert_eq!(store.len(), SAMPLE_RECIPE_COUNT + 1);
        assert_eq!(store.recipes()[0].title, "Test");

        let id = RecipeId::from("1");
        assert!(store.delete_recipe(&id).await.is_err());
        assert!(store.get_recipe_by_id(&id).is_none());

        // The lost writes resurface as the old durable state on reload.
        backend.set_read_only(false);
        assert_eq!(store.reload().await.unwrap(), LoadOutcome::Loaded(SAMPLE_RECIPE_COUNT));
        assert!(store.get_recipe_by_id(&id).is_some());
        assert!(store.recipes().iter().all(|r| r.title != "Test"));
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    struct ConstantIds(&'static str);

    impl IdGenerator for ConstantIds {
        fn next_id(&self) -> RecipeId {
            RecipeId::from(self.0)
        }
    }

    #[tokio::test]
    async fn colliding_generator_is_refused() {
        let store = store_over(Arc::new(InMemoryBlobStore::new()))
            .with_id_generator(Arc::new(ConstantIds("fixed")));
        store.init().await.unwrap();

        store.add_recipe(test_input()).await.unwrap();
        let err = store.add_recipe(test_input()).await.unwrap_err();
        assert!(matches!(err, StoreError::IdCollision { .. }));
        assert_eq!(store.len(), SAMPLE_RECIPE_COUNT + 1);
    }

    #[tokio::test]
    async fn many_adds_yield_unique_ids() {
        let (_, store) = ready_store().await;
        for i in 0..50 {
            store.add_recipe(NewRecipe::new(format!("r{i}"), "X")).await.unwrap();
        }
        let ids: HashSet<RecipeId> = store.recipes().into_iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), SAMPLE_RECIPE_COUNT + 50);
    }

    // -----------------------------------------------------------------------
    // Filter and observation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn filter_tracks_collection_changes() {
        let (_, store) = ready_store().await;
        assert_eq!(store.filtered_recipes().len(), SAMPLE_RECIPE_COUNT);

        store.set_filter("MALAY");
        assert_eq!(store.selected_filter(), "MALAY");
        assert_eq!(store.filtered_recipes().len(), 1);

        store.add_recipe(NewRecipe::new("Mee Goreng", "MALAY")).await.unwrap();
        let filtered = store.filtered_recipes();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered[0].title, "Mee Goreng");

        store.clear_filter();
        assert_eq!(store.filtered_recipes().len(), SAMPLE_RECIPE_COUNT + 1);
    }

    #[tokio::test]
    async fn subscribers_see_each_change() {
        let (_, store) = ready_store().await;
        let mut rx = store.subscribe();
        assert_eq!(rx.borrow_and_update().recipes.len(), SAMPLE_RECIPE_COUNT);

        store.add_recipe(test_input()).await.unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().recipes.len(), SAMPLE_RECIPE_COUNT + 1);

        store.set_filter("CHINESE");
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.selected_filter, "CHINESE");
        assert_eq!(snapshot.filtered_recipes().len(), 2);
        assert!(!snapshot.is_loading());
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_are_all_applied_and_persisted() {
        let backend = Arc::new(InMemoryBlobStore::new());
        let store = Arc::new(store_over(backend.clone()));
        store.init().await.unwrap();

        let handles: Vec<_> = (0..24)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store.add_recipe(NewRecipe::new(format!("c{i}"), "X")).await.unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(), SAMPLE_RECIPE_COUNT + 24);
        assert_eq!(persisted(&backend).await, store.recipes());
    }

    /// Blob store whose next read or next write can be held until
    /// released. A held read returns the value stored when it started.
    #[derive(Default)]
    struct GatedBlobStore {
        inner: InMemoryBlobStore,
        get_gate: StdMutex<Option<oneshot::Receiver<()>>>,
        put_gate: StdMutex<Option<oneshot::Receiver<()>>>,
    }

    impl GatedBlobStore {
        fn hold_next_get(&self) -> oneshot::Sender<()> {
            let (release, gate) = oneshot::channel();
            *self.get_gate.lock().unwrap() = Some(gate);
            release
        }

        fn hold_next_put(&self) -> oneshot::Sender<()> {
            let (release, gate) = oneshot::channel();
            *self.put_gate.lock().unwrap() = Some(gate);
            release
        }
    }

    #[async_trait]
    impl BlobStore for GatedBlobStore {
        async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
            let value = self.inner.get(key).await?;
            let gate = self.get_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(value)
        }

        async fn put(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
            let gate = self.put_gate.lock().unwrap().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            self.inner.put(key, bytes).await
        }

        async fn remove(&self, key: &str) -> StorageResult<bool> {
            self.inner.remove(key).await
        }
    }

    type GatedStore = RecipeStore<Arc<GatedBlobStore>>;

    async fn gated_ready_store() -> (Arc<GatedBlobStore>, Arc<GatedStore>) {
        let backend = Arc::new(GatedBlobStore::default());
        let store = Arc::new(RecipeStore::new(RecipeStorage::new(backend.clone())));
        store.init().await.unwrap();
        (backend, store)
    }

    async fn durable(backend: &Arc<GatedBlobStore>) -> Vec<Recipe> {
        RecipeStorage::new(backend.clone()).load().await.expect("record present")
    }

    async fn wait_for_generation(store: &GatedStore, generation: u64) {
        while store.generation.load(Ordering::SeqCst) < generation {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn superseded_reload_does_not_overwrite_newer_one() {
        let backend = Arc::new(GatedBlobStore::default());
        let old = sample_recipes(Utc::now());
        RecipeStorage::new(backend.clone()).save(&old).await.unwrap();
        let store = Arc::new(RecipeStore::new(RecipeStorage::new(backend.clone())));

        let release = backend.hold_next_get();
        let slow = {
            let store = store.clone();
            tokio::spawn(async move { store.reload().await })
        };
        wait_for_generation(&store, 1).await;

        let newer = vec![old[0].clone()];
        let fresh = {
            let store = store.clone();
            tokio::spawn(async move { store.reload().await })
        };
        wait_for_generation(&store, 2).await;
        RecipeStorage::new(backend.clone()).save(&newer).await.unwrap();

        release.send(()).unwrap();
        assert_eq!(slow.await.unwrap().unwrap(), LoadOutcome::Superseded);
        assert_eq!(fresh.await.unwrap().unwrap(), LoadOutcome::Loaded(1));
        assert_eq!(store.recipes(), newer);
        assert_eq!(store.phase(), StorePhase::Ready);
    }

    #[tokio::test]
    async fn reload_waits_for_add_in_flight() {
        let (backend, store) = gated_ready_store().await;

        let release = backend.hold_next_put();
        let add = {
            let store = store.clone();
            tokio::spawn(async move { store.add_recipe(test_input()).await })
        };
        while store.len() != SAMPLE_RECIPE_COUNT + 1 {
            tokio::task::yield_now().await;
        }
        let reload = {
            let store = store.clone();
            tokio::spawn(async move { store.reload().await })
        };
        wait_for_generation(&store, 2).await;

        release.send(()).unwrap();
        let added = add.await.unwrap().unwrap();
        assert_eq!(
            reload.await.unwrap().unwrap(),
            LoadOutcome::Loaded(SAMPLE_RECIPE_COUNT + 1)
        );
        assert_eq!(store.get_recipe_by_id(&added.id), Some(added));
        assert_eq!(store.recipes(), durable(&backend).await);
    }

    #[tokio::test]
    async fn reset_applies_after_delete_in_flight() {
        let (backend, store) = gated_ready_store().await;
        store.add_recipe(test_input()).await.unwrap();

        let release = backend.hold_next_put();
        let delete = {
            let store = store.clone();
            tokio::spawn(async move { store.delete_recipe(&RecipeId::from("1")).await })
        };
        while store.get_recipe_by_id(&RecipeId::from("1")).is_some() {
            tokio::task::yield_now().await;
        }
        let reset = {
            let store = store.clone();
            tokio::spawn(async move { store.reset().await })
        };
        wait_for_generation(&store, 2).await;

        release.send(()).unwrap();
        assert!(delete.await.unwrap().unwrap());
        assert_eq!(
            reset.await.unwrap().unwrap(),
            LoadOutcome::Seeded(SAMPLE_RECIPE_COUNT)
        );
        assert!(store.get_recipe_by_id(&RecipeId::from("1")).is_some());
        assert!(store.recipes().iter().all(|r| r.title != "Test"));
        assert_eq!(store.recipes(), durable(&backend).await);
    }
}
