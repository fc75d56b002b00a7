use thiserror::Error;

use pantry_types::{ImageRef, NewRecipe, Recipe, RecipePatch};

/// Reasons a [`RecipeDraft`] cannot be saved. The messages are shown to the
/// user as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DraftError {
    /// Blank title on a new recipe.
    #[error("Please enter a recipe title.")]
    MissingTitle,

    /// Blank title while editing an existing recipe.
    #[error("Title cannot be empty.")]
    EmptyTitle,

    #[error("Please select a recipe type.")]
    MissingCategory,

    #[error("Please add at least 1 ingredient.")]
    NoIngredients,

    #[error("Please add at least 1 step.")]
    NoSteps,
}

/// Raw form input for a recipe, before cleanup.
///
/// Titles are trimmed; ingredient and step lines are trimmed and blank lines
/// dropped. A draft is checked in the order title, category, ingredients,
/// steps and reports the first problem only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: String,
    pub category_key: String,
    pub image: ImageRef,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

/// A draft that passed validation.
struct CleanDraft {
    title: String,
    category_key: String,
    image: ImageRef,
    ingredients: Vec<String>,
    steps: Vec<String>,
}

impl RecipeDraft {
    pub fn new(title: impl Into<String>, category_key: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category_key: category_key.into(),
            ..Default::default()
        }
    }

    /// Pre-fill an edit form from a stored recipe.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            category_key: recipe.category_key.clone(),
            image: recipe.image.clone(),
            ingredients: recipe.ingredients.clone(),
            steps: recipe.steps.clone(),
        }
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = image;
        self
    }

    pub fn ingredient(mut self, line: impl Into<String>) -> Self {
        self.ingredients.push(line.into());
        self
    }

    pub fn step(mut self, line: impl Into<String>) -> Self {
        self.steps.push(line.into());
        self
    }

    /// Validate as a new recipe.
    pub fn into_new_recipe(self) -> Result<NewRecipe, DraftError> {
        let clean = self.clean(DraftError::MissingTitle)?;
        Ok(NewRecipe::new(clean.title, clean.category_key)
            .with_image(clean.image)
            .with_ingredients(clean.ingredients)
            .with_steps(clean.steps))
    }

    /// Validate as an edit of an existing recipe. The edit form submits
    /// every field, so every field is replaced.
    pub fn into_patch(self) -> Result<RecipePatch, DraftError> {
        let clean = self.clean(DraftError::EmptyTitle)?;
        Ok(RecipePatch::default()
            .title(clean.title)
            .category_key(clean.category_key)
            .image(clean.image)
            .ingredients(clean.ingredients)
            .steps(clean.steps))
    }

    fn clean(self, blank_title: DraftError) -> Result<CleanDraft, DraftError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(blank_title);
        }
        let category_key = self.category_key.trim().to_string();
        if category_key.is_empty() {
            return Err(DraftError::MissingCategory);
        }
        let ingredients = clean_lines(self.ingredients);
        if ingredients.is_empty() {
            return Err(DraftError::NoIngredients);
        }
        let steps = clean_lines(self.steps);
        if steps.is_empty() {
            return Err(DraftError::NoSteps);
        }
        Ok(CleanDraft {
            title,
            category_key,
            image: self.image,
            ingredients,
            steps,
        })
    }
}

fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
