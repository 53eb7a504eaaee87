use serde::{Deserialize, Serialize};

/// How a feed event's declared country is compared against the target country.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CountryMatch {
    /// Byte-for-byte equality. Case or spelling differences drop the event.
    #[default]
    Exact,
    /// Trimmed, case-insensitive equality.
    IgnoreCase,
    /// The declared value is a `,`/`;` separated list; any entry may match.
    Listed,
}

impl CountryMatch {
    pub fn matches(&self, declared: &str, target: &str) -> bool {
        match self {
            CountryMatch::Exact => declared == target,
            CountryMatch::IgnoreCase => eq_ignore_case(declared, target),
            CountryMatch::Listed => declared
                .split([',', ';'])
                .any(|entry| eq_ignore_case(entry, target)),
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

impl std::str::FromStr for CountryMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(CountryMatch::Exact),
            "ignore-case" | "ignore_case" => Ok(CountryMatch::IgnoreCase),
            "listed" => Ok(CountryMatch::Listed),
            other => Err(format!("unknown country match mode `{}`", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_is_case_sensitive() {
        assert!(CountryMatch::Exact.matches("India", "India"));
        assert!(!CountryMatch::Exact.matches("india", "India"));
        assert!(!CountryMatch::Exact.matches("India ", "India"));
        assert!(!CountryMatch::Exact.matches("India, Nepal", "India"));
    }

    #[test]
    fn ignore_case_trims_and_folds() {
        assert!(CountryMatch::IgnoreCase.matches(" INDIA ", "India"));
        assert!(!CountryMatch::IgnoreCase.matches("Indonesia", "India"));
    }

    #[test]
    fn listed_checks_every_entry() {
        assert!(CountryMatch::Listed.matches("Nepal, india; Bangladesh", "India"));
        assert!(!CountryMatch::Listed.matches("Nepal, Bangladesh", "India"));
        assert!(CountryMatch::Listed.matches("India", "India"));
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("exact".parse::<CountryMatch>(), Ok(CountryMatch::Exact));
        assert_eq!("Ignore-Case".parse::<CountryMatch>(), Ok(CountryMatch::IgnoreCase));
        assert_eq!("listed".parse::<CountryMatch>(), Ok(CountryMatch::Listed));
        assert!("fuzzy".parse::<CountryMatch>().is_err());
    }
}
