use rand::Rng;
use rand::seq::SliceRandom;

use crate::recipe::Recipe;

/// Random subset of at most `max_count` recipes for recommendation rails.
/// Unseeded; use `sample_with` where reproducibility matters.
pub fn sample(recipes: Vec<Recipe>, max_count: usize) -> Vec<Recipe> {
    sample_with(recipes, max_count, &mut rand::rng())
}

/// Uniform shuffle, then truncate to `min(max_count, len)`.
pub fn sample_with(mut recipes: Vec<Recipe>, max_count: usize, rng: &mut impl Rng) -> Vec<Recipe> {
    if recipes.is_empty() || max_count == 0 {
        return Vec::new();
    }
    recipes.shuffle(rng);
    recipes.truncate(max_count);
    recipes
}
