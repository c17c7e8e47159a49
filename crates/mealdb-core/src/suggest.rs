use std::collections::{HashMap, HashSet};

use crate::constants::{EXAMPLE_LIMIT, MIN_PREFERRED_EXAMPLES};
use crate::normalize::normalize;

/// Common pantry items offered as exclusion examples before anything is typed.
pub const COMMON_INGREDIENTS: &[&str] = &[
    "Onion", "Garlic", "Milk", "Eggs", "Butter", "Cheese", "Mushrooms", "Tomatoes", "Peanuts",
    "Shrimp", "Pork", "Chicken",
];

fn selected_set(selected: &[String]) -> HashSet<String> {
    selected.iter().map(|s| normalize(s)).collect()
}

/// Autocomplete: candidates whose normalized form contains the query and is
/// not already selected, in candidate order, at most `limit`.
pub fn suggest(candidates: &[String], query: &str, selected: &[String], limit: usize) -> Vec<String> {
    let q = normalize(query);
    if q.is_empty() {
        return Vec::new();
    }
    let selected = selected_set(selected);
    candidates
        .iter()
        .filter(|c| {
            let key = normalize(c);
            key.contains(&q) && !selected.contains(&key)
        })
        .take(limit)
        .cloned()
        .collect()
}

/// Sorted, not-yet-selected candidates, at most `limit`.
pub fn examples(candidates: &[String], selected: &[String], limit: usize) -> Vec<String> {
    let selected = selected_set(selected);
    let mut sorted: Vec<&String> = candidates.iter().collect();
    sorted.sort();
    sorted
        .into_iter()
        .filter(|c| !selected.contains(&normalize(c)))
        .take(limit)
        .cloned()
        .collect()
}

/// Ingredient examples: known common ingredients first, padded from the
/// catalog (without repeats) when too few of them exist.
pub fn ingredient_examples(catalog_names: &[String], excluded: &[String]) -> Vec<String> {
    let excluded = selected_set(excluded);
    let by_key: HashMap<String, &String> = catalog_names.iter().map(|n| (normalize(n), n)).collect();

    let mut picked: Vec<String> = Vec::new();
    for candidate in COMMON_INGREDIENTS {
        let key = normalize(candidate);
        let Some(item) = by_key.get(&key) else {
            continue;
        };
        if excluded.contains(&key) {
            continue;
        }
        picked.push((*item).clone());
        if picked.len() >= EXAMPLE_LIMIT {
            break;
        }
    }

    if picked.len() >= MIN_PREFERRED_EXAMPLES {
        return picked;
    }

    let fallback: Vec<String> = catalog_names
        .iter()
        .filter(|n| !excluded.contains(&normalize(n)) && !picked.contains(*n))
        .take(EXAMPLE_LIMIT - picked.len())
        .cloned()
        .collect();
    picked.extend(fallback);
    picked
}
