use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::allergen::AllergenId;
use crate::catalog::CatalogIndex;
use crate::normalize::normalize;
use crate::recipe::Recipe;

/// A user's standing dietary and taste constraints.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferenceProfile {
    pub allergens: BTreeSet<AllergenId>,
    pub excluded_ingredients: BTreeSet<String>,
    pub preferred_categories: BTreeSet<String>,
    pub preferred_areas: BTreeSet<String>,
}

/// Untrusted preference payload as it comes out of storage.
/// Every field may be missing; allergens are free strings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPreferences {
    #[serde(alias = "allergies")]
    pub allergens: Vec<String>,
    #[serde(alias = "excluded_ingredients")]
    pub excluded_ingredients: Vec<String>,
    #[serde(alias = "preferred_categories")]
    pub preferred_categories: Vec<String>,
    #[serde(alias = "preferred_areas")]
    pub preferred_areas: Vec<String>,
}

/// Editable list of a profile, for toggle-style UIs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreferenceField {
    ExcludedIngredients,
    PreferredCategories,
    PreferredAreas,
}

impl PreferenceProfile {
    /// Validate a raw payload once, at the storage boundary.
    ///
    /// Blank entries are dropped. Unknown allergen ids are returned alongside
    /// the profile so the caller can report them.
    pub fn from_raw(raw: RawPreferences) -> (Self, Vec<String>) {
        let mut unknown = Vec::new();
        let mut allergens = BTreeSet::new();
        for id in raw.allergens {
            match id.parse::<AllergenId>() {
                Ok(a) => {
                    allergens.insert(a);
                }
                Err(_) => unknown.push(id),
            }
        }

        let profile = Self {
            allergens,
            excluded_ingredients: non_blank(raw.excluded_ingredients),
            preferred_categories: non_blank(raw.preferred_categories),
            preferred_areas: non_blank(raw.preferred_areas),
        };
        (profile, unknown)
    }

    pub fn is_empty(&self) -> bool {
        self.allergens.is_empty()
            && self.excluded_ingredients.is_empty()
            && self.preferred_categories.is_empty()
            && self.preferred_areas.is_empty()
    }

    /// Add `value` if absent, remove it if present. Returns true if added.
    pub fn toggle(&mut self, field: PreferenceField, value: &str) -> bool {
        let set = match field {
            PreferenceField::ExcludedIngredients => &mut self.excluded_ingredients,
            PreferenceField::PreferredCategories => &mut self.preferred_categories,
            PreferenceField::PreferredAreas => &mut self.preferred_areas,
        };
        if set.remove(value) {
            false
        } else {
            set.insert(value.to_string());
            true
        }
    }

    /// Add the allergen if absent, remove it if present. Returns true if added.
    pub fn toggle_allergen(&mut self, allergen: AllergenId) -> bool {
        if self.allergens.remove(&allergen) {
            false
        } else {
            self.allergens.insert(allergen);
            true
        }
    }

    pub fn exclusions(&self) -> ExclusionSet {
        ExclusionSet::from_profile(self)
    }
}

fn non_blank(values: Vec<String>) -> BTreeSet<String> {
    values.into_iter().filter(|v| !v.trim().is_empty()).collect()
}

/// Normalized ingredient exclusions derived from a profile.
#[derive(Clone, Debug, Default)]
pub struct ExclusionSet {
    /// Matched by equality.
    excluded: HashSet<String>,
    /// Matched by substring.
    keywords: Vec<String>,
}

impl ExclusionSet {
    pub fn from_profile(profile: &PreferenceProfile) -> Self {
        let excluded = profile
            .excluded_ingredients
            .iter()
            .map(|s| normalize(s))
            .filter(|s| !s.is_empty())
            .collect();
        let keywords = profile
            .allergens
            .iter()
            .flat_map(|a| a.keywords().iter().map(|k| normalize(k)))
            .collect();
        Self { excluded, keywords }
    }

    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty() && self.keywords.is_empty()
    }

    /// True if a normalized ingredient name is forbidden.
    pub fn forbids(&self, name: &str) -> bool {
        self.excluded.contains(name) || self.keywords.iter().any(|k| name.contains(k.as_str()))
    }

    /// True if any of the names is forbidden. No names, no evidence.
    pub fn forbids_any(&self, names: &[String]) -> bool {
        names.iter().any(|n| self.forbids(n))
    }
}

/// Reduce recipes by a preference profile. Order is preserved; `None`
/// returns the input untouched.
pub fn apply_preferences(
    index: &CatalogIndex,
    recipes: Vec<Recipe>,
    profile: Option<&PreferenceProfile>,
) -> Vec<Recipe> {
    let Some(profile) = profile else {
        return recipes;
    };

    let mut filtered = recipes;

    if !profile.preferred_categories.is_empty() {
        filtered.retain(|r| profile.preferred_categories.contains(&r.category));
    }

    if !profile.preferred_areas.is_empty() {
        filtered.retain(|r| profile.preferred_areas.contains(&r.area));
    }

    let exclusions = profile.exclusions();
    if exclusions.is_empty() {
        return filtered;
    }

    filtered.retain(|r| {
        let names = r
            .meal_id()
            .map(|id| index.ingredient_names_for(id))
            .unwrap_or(&[]);
        !exclusions.forbids_any(names)
    });
    filtered
}
