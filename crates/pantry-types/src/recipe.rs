use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::RecipeId;
use crate::image::ImageRef;
use crate::temporal::advance_past;

/// A user-owned recipe.
///
/// `ingredients` and `steps` are kept in exactly the order they were given.
/// `category_key` is an opaque join key into the taxonomy; a key that no
/// longer exists there is kept as-is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    /// Older records call this field `typeKey`.
    #[serde(alias = "typeKey")]
    pub category_key: String,
    #[serde(flatten)]
    pub image: ImageRef,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Build a recipe from caller-supplied fields. Both timestamps are `at`;
    /// the title is trimmed, nothing else is touched.
    pub fn create(id: RecipeId, input: NewRecipe, at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: input.title.trim().to_string(),
            category_key: input.category_key,
            image: input.image.normalized(),
            ingredients: input.ingredients,
            steps: input.steps,
            created_at: at,
            updated_at: at,
        }
    }

    /// Merge the provided fields of `patch` and refresh `updated_at`.
    ///
    /// `id` and `created_at` are never touched. `updated_at` strictly
    /// advances even if `now` is not later than the previous value.
    pub fn apply(&mut self, patch: RecipePatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(category_key) = patch.category_key {
            self.category_key = category_key;
        }
        if let Some(image) = patch.image {
            self.image = image.normalized();
        }
        if let Some(ingredients) = patch.ingredients {
            self.ingredients = ingredients;
        }
        if let Some(steps) = patch.steps {
            self.steps = steps;
        }
        self.updated_at = advance_past(self.updated_at, now);
    }

    pub fn in_category(&self, key: &str) -> bool {
        self.category_key == key
    }
}

/// Fields for a new recipe. Validation is the caller's job.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewRecipe {
    pub title: String,
    pub category_key: String,
    pub image: ImageRef,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

impl NewRecipe {
    pub fn new(title: impl Into<String>, category_key: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category_key: category_key.into(),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = image;
        self
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.steps = steps.into_iter().map(Into::into).collect();
        self
    }
}

/// A partial update. `None` fields are left unchanged.
///
/// To remove a photo, set `image` to `Some(ImageRef::None)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub category_key: Option<String>,
    pub image: Option<ImageRef>,
    pub ingredients: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
}

impl RecipePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn category_key(mut self, key: impl Into<String>) -> Self {
        self.category_key = Some(key.into());
        self
    }

    pub fn image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    pub fn ingredients(mut self, ingredients: Vec<String>) -> Self {
        self.ingredients = Some(ingredients);
        self
    }

    pub fn steps(mut self, steps: Vec<String>) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Returns `true` if the patch touches no field.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category_key.is_none()
            && self.image.is_none()
            && self.ingredients.is_none()
            && self.steps.is_none()
    }
}
