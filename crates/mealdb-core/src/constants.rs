/// Maximum ingredient/measure slots surfaced per recipe.
/// Links past this position are unreachable for display and filtering.
pub const MAX_INGREDIENT_SLOTS: usize = 20;

/// Filter-axis sentinel meaning "no constraint".
pub const ALL: &str = "All";

/// Default size of a "recommended for you" sample.
pub const DEFAULT_RECOMMENDATIONS: usize = 10;

/// Suggestion list cap for facet autocomplete.
pub const SUGGESTION_LIMIT: usize = 12;

/// Cap for facet examples shown before anything is typed.
pub const EXAMPLE_LIMIT: usize = 8;

/// Fewer preferred ingredient examples than this triggers the catalog fallback.
pub const MIN_PREFERRED_EXAMPLES: usize = 4;
