/// Strip invisible characters, collapse whitespace and lowercase.
pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Case- and spacing-insensitive substring match used for city search.
pub(crate) fn contains_text(haystack: &str, needle: &str) -> bool {
    normalize_text(haystack).contains(&normalize_text(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_removes_whitespace_and_case() {
        assert_eq!(normalize_text("\u{feff}San  Juan\t"), "san juan");
    }

    #[test]
    fn partial_city_match() {
        assert!(contains_text("Fort Lauderdale", "lauder"));
        assert!(contains_text("Fort Lauderdale", "FORT  lau"));
        assert!(!contains_text("Miami", "tampa"));
    }
}
