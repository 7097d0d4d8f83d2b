//! Tenant identifiers and display names.
//!
//! A tenant is one restaurant. Its canonical id is derived from the name the
//! owner typed and is used verbatim as a storage path segment, so the output
//! of [`normalize_tenant_name`] never contains anything outside `[a-z0-9_-]`.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Identifier used when a name is empty or normalizes to nothing.
pub const DEFAULT_TENANT_ID: &str = "default-restaurant";

/// Upper bound on a path segment accepted by the document store.
const MAX_TENANT_ID_LEN: usize = 1500;

/// Restaurants with a curated display name.
pub const KNOWN_TENANTS: &[(&str, &str)] = &[
    ("marios-pizzeria", "Mario's Pizzeria"),
    ("joes-cafe", "Joe's Cafe"),
    ("downtown-bistro", "Downtown Bistro"),
    ("golden-dragon", "Golden Dragon"),
    ("burger-palace", "Burger Palace"),
    ("fine-dining-restaurant", "Fine Dining Restaurant"),
    ("family-kitchen", "Family Kitchen"),
    ("street-food-corner", "Street Food Corner"),
    ("my-restaurant-name", "My Restaurant"),
];

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\s\-_]").unwrap())
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn hyphen_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").unwrap())
}

/// Convert a restaurant name into its canonical tenant id.
///
/// Example: `"  Mario's   Pizzeria!! "` → `"marios-pizzeria"`
///
/// Accented letters fold to their base letter (`"Café"` → `"cafe"`); every
/// other character outside `[a-z0-9\s_-]` is dropped. Whitespace runs become a
/// single hyphen, hyphen runs collapse, and edge hyphens are trimmed. Empty
/// results fall back to [`DEFAULT_TENANT_ID`].
pub fn normalize_tenant_name(name: &str) -> String {
    let folded: String = name
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase();

    let kept = disallowed_chars().replace_all(folded.trim(), "");
    let hyphenated = whitespace_runs().replace_all(&kept, "-");
    let collapsed = hyphen_runs().replace_all(&hyphenated, "-");
    let id = collapsed.trim_matches('-');

    if id.is_empty() {
        DEFAULT_TENANT_ID.to_string()
    } else {
        id.to_string()
    }
}

/// Same as [`normalize_tenant_name`] but accepts a missing name.
pub fn normalize_optional_tenant_name(name: Option<&str>) -> String {
    name.map(normalize_tenant_name)
        .unwrap_or_else(|| DEFAULT_TENANT_ID.to_string())
}

/// Human-readable name for a tenant id.
///
/// Curated names come from [`KNOWN_TENANTS`]; anything else is title-cased
/// with hyphens read as spaces (`"harbour-fish-bar"` → `"Harbour Fish Bar"`).
pub fn display_name(tenant_id: &str) -> String {
    if let Some((_, name)) = KNOWN_TENANTS.iter().find(|(id, _)| *id == tenant_id) {
        return (*name).to_string();
    }

    let mut out = String::with_capacity(tenant_id.len());
    let mut at_word_start = true;
    for c in tenant_id.chars() {
        let c = if c == '-' { ' ' } else { c };
        if at_word_start && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !(c.is_alphanumeric() || c == '_');
    }
    out
}

/// Whether `tenant_id` can be used as a document-store path segment.
pub fn is_valid_tenant_id(tenant_id: &str) -> bool {
    !tenant_id.is_empty()
        && tenant_id.len() <= MAX_TENANT_ID_LEN
        && tenant_id != "."
        && tenant_id != ".."
        && !tenant_id.contains('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_canonical_format(id: &str) -> bool {
        let re = Regex::new(r"^[a-z0-9_]+(-[a-z0-9_]+)*$").unwrap();
        re.is_match(id)
    }

    #[test]
    fn test_normalize_mixed_punctuation() {
        assert_eq!(normalize_tenant_name("  Mario's   Pizzeria!! "), "marios-pizzeria");
    }

    #[test]
    fn test_normalize_simple_name() {
        assert_eq!(normalize_tenant_name("Joe's Cafe"), "joes-cafe");
        assert_eq!(normalize_tenant_name("Downtown Bistro"), "downtown-bistro");
    }

    #[test]
    fn test_normalize_collapses_hyphen_runs() {
        assert_eq!(normalize_tenant_name("Fish -- and --- Chips"), "fish-and-chips");
        assert_eq!(normalize_tenant_name("--Edge Case--"), "edge-case");
    }

    #[test]
    fn test_normalize_keeps_underscores_and_digits() {
        assert_eq!(normalize_tenant_name("Unit_7 Kitchen 2"), "unit_7-kitchen-2");
    }

    #[test]
    fn test_normalize_folds_accents() {
        assert_eq!(normalize_tenant_name("Café Crème"), "cafe-creme");
    }

    #[test]
    fn test_normalize_empty_falls_back() {
        assert_eq!(normalize_tenant_name(""), DEFAULT_TENANT_ID);
        assert_eq!(normalize_tenant_name("   "), DEFAULT_TENANT_ID);
        assert_eq!(normalize_tenant_name("!!!"), DEFAULT_TENANT_ID);
        assert_eq!(normalize_optional_tenant_name(None), DEFAULT_TENANT_ID);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "  Mario's   Pizzeria!! ",
            "GOLDEN   dragon",
            "a - b - c",
            "Tab\tSeparated\nName",
            "Café Crème",
            "x",
            "42 Burgers & Shakes",
        ];
        for input in inputs {
            let once = normalize_tenant_name(input);
            assert_eq!(normalize_tenant_name(&once), once, "input {input:?}");
            assert!(matches_canonical_format(&once), "{once:?}");
        }
    }

    #[test]
    fn test_display_name_known() {
        assert_eq!(display_name("marios-pizzeria"), "Mario's Pizzeria");
        assert_eq!(display_name("my-restaurant-name"), "My Restaurant");
    }

    #[test]
    fn test_display_name_fallback_title_case() {
        assert_eq!(display_name("harbour-fish-bar"), "Harbour Fish Bar");
        assert_eq!(display_name("default-restaurant"), "Default Restaurant");
    }

    #[test]
    fn test_valid_tenant_ids() {
        assert!(is_valid_tenant_id("marios-pizzeria"));
        assert!(!is_valid_tenant_id(""));
        assert!(!is_valid_tenant_id("."));
        assert!(!is_valid_tenant_id(".."));
        assert!(!is_valid_tenant_id("a/b"));
        assert!(!is_valid_tenant_id(&"x".repeat(1501)));
    }
}
