use serde_json::{json, Value};

/// Instructions sent ahead of the ingredient list in every recipe request.
///
/// Loaded from `prompt.txt` at compile time so the wording can be tuned
/// without touching Rust string syntax.
pub const RECIPE_PROMPT: &str = include_str!("prompt.txt");

/// Field order the generator is asked to follow in its JSON answer
pub const RECIPE_FIELDS: [&str; 6] = [
    "era",
    "recipeName",
    "description",
    "funFact",
    "ingredients",
    "instructions",
];

/// Build the recipe prompt for a set of ingredients.
pub fn build_recipe_prompt(ingredients: &[String]) -> String {
    format!(
        "{} Ingredients: {}.",
        RECIPE_PROMPT.trim_end(),
        ingredients.join(", ")
    )
}

/// Build the image prompt for a recipe name.
pub fn build_image_prompt(recipe_name: &str) -> String {
    format!(
        "A photograph of \"{recipe_name}\", a rustic and beautiful historical dish, food styling, detailed, high resolution, soft lighting."
    )
}

/// Structured-output schema constraining the recipe response
pub fn recipe_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "era": { "type": "STRING" },
            "recipeName": { "type": "STRING" },
            "description": { "type": "STRING" },
            "funFact": { "type": "STRING" },
            "ingredients": { "type": "ARRAY", "items": { "type": "STRING" } },
            "instructions": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": RECIPE_FIELDS,
        "propertyOrdering": RECIPE_FIELDS
    })
}
