//! Data shipped with the application: the starter recipes used to seed an
//! empty catalog, and the fallback category list used until (or unless) the
//! remote taxonomy arrives.

use chrono::{DateTime, Utc};

use crate::category::Category;
use crate::identity::RecipeId;
use crate::image::ImageRef;
use crate::recipe::Recipe;

/// Number of recipes in [`sample_recipes`].
pub const SAMPLE_RECIPE_COUNT: usize = 5;

/// Keys of the images bundled with the application.
pub const BUNDLED_IMAGE_KEYS: &[&str] = &["bkt", "chickenChop", "curryRice", "nasiLemak", "rotiCanoi"];

struct SampleSpec {
    id: &'static str,
    title: &'static str,
    category_key: &'static str,
    image_key: &'static str,
    ingredients: &'static [&'static str],
    steps: &'static [&'static str],
}

const SAMPLES: [SampleSpec; SAMPLE_RECIPE_COUNT] = [
    SampleSpec {
        id: "1",
        title: "Bak Kut Teh",
        category_key: "CHINESE",
        image_key: "bkt",
        ingredients: &["Pork ribs", "Garlic", "White pepper", "Soy sauce", "Chinese herbs (optional)"],
        steps: &[
            "Blanch pork ribs to remove impurities",
            "Add water, garlic, pepper and herbs into a pot",
            "Simmer for 45–60 minutes until tender",
            "Season with soy sauce and serve hot",
        ],
    },
    SampleSpec {
        id: "2",
        title: "Nasi Lemak",
        category_key: "MALAY",
        image_key: "nasiLemak",
        ingredients: &["Rice", "Coconut milk", "Pandan leaves", "Sambal", "Egg", "Anchovies"],
        steps: &[
            "Wash rice and cook with coconut milk and pandan leaves",
            "Prepare sambal (or use ready-made sambal)",
            "Serve rice with sambal, egg and anchovies",
        ],
    },
    SampleSpec {
        id: "3",
        title: "Roti Canai",
        category_key: "INDIAN",
        image_key: "rotiCanoi",
        ingredients: &["Flour", "Water", "Salt", "Oil / ghee", "Egg (optional)"],
        steps: &[
            "Mix flour, water, salt and oil to form dough",
            "Rest the dough for at least 2 hours",
            "Stretch and fold dough into layers",
            "Pan-fry until golden and crispy",
        ],
    },
    SampleSpec {
        id: "4",
        title: "Chicken Chop",
        category_key: "WESTERN",
        image_key: "chickenChop",
        ingredients: &["Chicken thigh / breast", "Salt & pepper", "Flour", "Butter", "Black pepper sauce"],
        steps: &[
            "Season chicken with salt & pepper",
            "Coat chicken lightly with flour",
            "Pan-fry until cooked through and golden",
            "Serve with black pepper sauce",
        ],
    },
    SampleSpec {
        id: "5",
        title: "Curry Rice",
        category_key: "JAPANESE",
        image_key: "curryRice",
        ingredients: &["Japanese curry roux", "Onion", "Potato", "Carrot", "Chicken (optional)"],
        steps: &[
            "Saute onion until fragrant",
            "Add vegetables (and chicken if using) and cook",
            "Add water and simmer until soft",
            "Add curry roux and stir until thick, serve with rice",
        ],
    },
];

/// The starter recipes, stamped with `at` for both timestamps.
pub fn sample_recipes(at: DateTime<Utc>) -> Vec<Recipe> {
    SAMPLES
        .iter()
        .map(|spec| Recipe {
            id: RecipeId::from(spec.id),
            title: spec.title.to_string(),
            category_key: spec.category_key.to_string(),
            image: ImageRef::bundled(spec.image_key),
            ingredients: spec.ingredients.iter().map(|s| s.to_string()).collect(),
            steps: spec.steps.iter().map(|s| s.to_string()).collect(),
            created_at: at,
            updated_at: at,
        })
        .collect()
}

/// The bundled category list.
pub fn fallback_categories() -> Vec<Category> {
    [
        ("1", "CHINESE", "Chinese"),
        ("2", "MALAY", "Malay"),
        ("3", "INDIAN", "Indian"),
        ("4", "WESTERN", "Western"),
        ("5", "JAPANESE", "Japanese"),
    ]
    .into_iter()
    .map(|(id, key, label)| Category::new(id, key, label))
    .collect()
}
