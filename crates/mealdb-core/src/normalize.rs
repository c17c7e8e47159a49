/// Canonical form for every name comparison: trimmed and lowercased.
///
/// Applied to catalog ingredient names, user-typed exclusions, allergen
/// keywords and free-text queries alike. Comparing a normalized value with a
/// raw one silently never matches.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
