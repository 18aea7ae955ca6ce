/// Whether `candidate` counts as a translation of `source`.
///
/// Both sides are compared with all whitespace removed and lower-cased, so a
/// service that echoes the input back (possibly re-spaced) is rejected.
pub fn is_translation_valid(source: &str, candidate: Option<&str>) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    let candidate = normalize(candidate);
    if candidate.is_empty() {
        return false;
    }
    normalize(source) != candidate
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|ch| !ch.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
