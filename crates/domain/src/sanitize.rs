use once_cell::sync::Lazy;
use regex::Regex;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

/// Strip markup tags from client-supplied text. Every text field (names,
/// recipients, message bodies) goes through this before it reaches storage.
pub fn strip_markup(value: &str) -> String {
    MARKUP_TAG.replace_all(value, "").into_owned()
}
