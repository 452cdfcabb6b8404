use super::normalizer::normalize_text;
use std::collections::HashMap;
use std::sync::OnceLock;

const STATES: [(&str, &str); 51] = [
    ("Alabama", "AL"),
    ("Alaska", "AK"),
    ("Arizona", "AZ"),
    ("Arkansas", "AR"),
    ("California", "CA"),
    ("Colorado", "CO"),
    ("Connecticut", "CT"),
    ("Delaware", "DE"),
    ("Florida", "FL"),
    ("Georgia", "GA"),
    ("Hawaii", "HI"),
    ("Idaho", "ID"),
    ("Illinois", "IL"),
    ("Indiana", "IN"),
    ("Iowa", "IA"),
    ("Kansas", "KS"),
    ("Kentucky", "KY"),
    ("Louisiana", "LA"),
    ("Maine", "ME"),
    ("Maryland", "MD"),
    ("Massachusetts", "MA"),
    ("Michigan", "MI"),
    ("Minnesota", "MN"),
    ("Mississippi", "MS"),
    ("Missouri", "MO"),
    ("Montana", "MT"),
    ("Nebraska", "NE"),
    ("Nevada", "NV"),
    ("New Hampshire", "NH"),
    ("New Jersey", "NJ"),
    ("New Mexico", "NM"),
    ("New York", "NY"),
    ("North Carolina", "NC"),
    ("North Dakota", "ND"),
    ("Ohio", "OH"),
    ("Oklahoma", "OK"),
    ("Oregon", "OR"),
    ("Pennsylvania", "PA"),
    ("Rhode Island", "RI"),
    ("South Carolina", "SC"),
    ("South Dakota", "SD"),
    ("Tennessee", "TN"),
    ("Texas", "TX"),
    ("Utah", "UT"),
    ("Vermont", "VT"),
    ("Virginia", "VA"),
    ("Washington", "WA"),
    ("West Virginia", "WV"),
    ("Wisconsin", "WI"),
    ("Wyoming", "WY"),
    ("Puerto Rico", "PR"),
];

static NAME_TO_CODE: OnceLock<HashMap<String, &'static str>> = OnceLock::new();

fn name_to_code() -> &'static HashMap<String, &'static str> {
    NAME_TO_CODE.get_or_init(|| {
        STATES
            .iter()
            .map(|(name, code)| (normalize_text(name), *code))
            .collect()
    })
}

/// Two-letter code for a state name. A value that already is a known code is
/// returned in canonical upper case.
pub fn state_code(value: &str) -> Option<&'static str> {
    let normalized = normalize_text(value);
    if let Some(code) = name_to_code().get(&normalized).copied() {
        return Some(code);
    }

    STATES
        .iter()
        .find(|(_, code)| code.eq_ignore_ascii_case(&normalized))
        .map(|(_, code)| *code)
}

pub fn state_name(code: &str) -> Option<&'static str> {
    let trimmed = code.trim();
    STATES
        .iter()
        .find(|(_, known)| known.eq_ignore_ascii_case(trimmed))
        .map(|(name, _)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_fifty_states_and_puerto_rico() {
        assert_eq!(name_to_code().len(), 51);
        assert_eq!(state_code("Puerto Rico"), Some("PR"));
    }

    #[test]
    fn lookup_ignores_case_and_spacing() {
        assert_eq!(state_code("  new   york "), Some("NY"));
        assert_eq!(state_code("WEST VIRGINIA"), Some("WV"));
        assert_eq!(state_code("tx"), Some("TX"));
        assert_eq!(state_code("Atlantis"), None);
    }

    #[test]
    fn reverse_lookup_returns_display_name() {
        assert_eq!(state_name("fl"), Some("Florida"));
        assert_eq!(state_name("ZZ"), None);
    }
}
