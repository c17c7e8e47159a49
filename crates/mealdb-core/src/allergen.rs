use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of allergen categories a profile can exclude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllergenId {
    Dairy,
    Eggs,
    Gluten,
    Peanuts,
    TreeNuts,
    Fish,
    Shellfish,
    Soy,
    Sesame,
}

impl AllergenId {
    pub const ALL: [AllergenId; 9] = [
        AllergenId::Dairy,
        AllergenId::Eggs,
        AllergenId::Gluten,
        AllergenId::Peanuts,
        AllergenId::TreeNuts,
        AllergenId::Fish,
        AllergenId::Shellfish,
        AllergenId::Soy,
        AllergenId::Sesame,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AllergenId::Dairy => "dairy",
            AllergenId::Eggs => "eggs",
            AllergenId::Gluten => "gluten",
            AllergenId::Peanuts => "peanuts",
            AllergenId::TreeNuts => "tree_nuts",
            AllergenId::Fish => "fish",
            AllergenId::Shellfish => "shellfish",
            AllergenId::Soy => "soy",
            AllergenId::Sesame => "sesame",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AllergenId::Dairy => "Dairy",
            AllergenId::Eggs => "Eggs",
            AllergenId::Gluten => "Gluten",
            AllergenId::Peanuts => "Peanuts",
            AllergenId::TreeNuts => "Tree Nuts",
            AllergenId::Fish => "Fish",
            AllergenId::Shellfish => "Shellfish",
            AllergenId::Soy => "Soy",
            AllergenId::Sesame => "Sesame",
        }
    }

    /// Lowercase keyword fragments matched by substring against ingredient
    /// names. "egg" deliberately matches "eggplant".
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            AllergenId::Dairy => &[
                "milk", "butter", "cheese", "cream", "yogurt", "yoghurt", "ghee", "ice cream",
            ],
            AllergenId::Eggs => &["egg", "eggs", "yolk", "whites"],
            AllergenId::Gluten => &[
                "flour",
                "bread",
                "pasta",
                "wheat",
                "semolina",
                "breadcrumbs",
                "noodles",
                "biscuit",
                "biscuits",
            ],
            AllergenId::Peanuts => &["peanut", "peanuts", "peanut butter"],
            AllergenId::TreeNuts => &[
                "almond",
                "almonds",
                "cashew",
                "cashews",
                "walnut",
                "walnuts",
                "hazelnut",
                "hazelnuts",
                "pistachio",
                "pistachios",
            ],
            AllergenId::Fish => &[
                "fish", "salmon", "tuna", "cod", "anchovy", "anchovies", "sardine", "sardines",
            ],
            AllergenId::Shellfish => &[
                "shrimp", "prawn", "prawns", "crab", "lobster", "mussel", "mussels", "clam",
                "clams", "scallop", "scallops",
            ],
            AllergenId::Soy => &["soy", "soya", "tofu", "edamame", "soy sauce", "miso"],
            AllergenId::Sesame => &["sesame", "tahini"],
        }
    }
}

impl fmt::Display for AllergenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized allergen identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAllergen(pub String);

impl fmt::Display for UnknownAllergen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown allergen: {}", self.0)
    }
}

impl std::error::Error for UnknownAllergen {}

impl FromStr for AllergenId {
    type Err = UnknownAllergen;

    /// Accepts the snake_case id or the display label, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        AllergenId::ALL
            .into_iter()
            .find(|a| a.as_str() == key)
            .ok_or_else(|| UnknownAllergen(s.to_string()))
    }
}
