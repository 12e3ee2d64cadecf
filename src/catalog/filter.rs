//! Keyword and status predicates applied to the flat record list before the
//! tree is built.

use std::str::FromStr;
use thiserror::Error;

use super::types::CategoryRecord;

/// Status predicate for the filter pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// No status filtering (`""`).
    #[default]
    Any,
    /// Records whose status is an active alias.
    Active,
    /// Everything that is not active, including an empty status.
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown status filter '{0}' (expected \"\", \"active\" or \"inactive\")")]
pub struct ParseStatusFilterError(String);

impl FromStr for StatusFilter {
    type Err = ParseStatusFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Self::Any),
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            _ => Err(ParseStatusFilterError(s.to_owned())),
        }
    }
}

impl StatusFilter {
    pub fn matches(self, record: &CategoryRecord) -> bool {
        match self {
            Self::Any => true,
            Self::Active => record.is_active(),
            Self::Inactive => !record.is_active(),
        }
    }

    /// Next filter in the `Any -> Active -> Inactive` cycle used by the browser.
    pub fn cycle(self) -> Self {
        match self {
            Self::Any => Self::Active,
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Any,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "all",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Case-insensitive substring match against title, description and parent title.
///
/// A blank keyword matches every record.
pub fn matches_keyword(record: &CategoryRecord, keyword: &str) -> bool {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    let hit = |field: &str| field.to_lowercase().contains(&needle);

    hit(&record.title)
        || record.description.as_deref().is_some_and(hit)
        || record.parent_ref.as_deref().is_some_and(hit)
}

/// Return the records that match both predicates, preserving input order.
pub fn filter(records: &[CategoryRecord], keyword: &str, status: StatusFilter) -> Vec<CategoryRecord> {
    records
        .iter()
        .filter(|r| status.matches(r) && matches_keyword(r, keyword))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<CategoryRecord> {
        vec![
            CategoryRecord::new("1", "Shoes").with_status("active"),
            CategoryRecord::new("2", "Sneakers")
                .with_parent("Shoes")
                .with_status("inactive"),
            CategoryRecord::new("3", "Hats")
                .with_status("Hoạt động")
                .with_description("Caps and beanies"),
            CategoryRecord::new("4", "Scarves"),
        ]
    }

    fn ids(records: &[CategoryRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_returns_everything_in_order() {
        let records = sample();
        let out = filter(&records, "", StatusFilter::Any);
        assert_eq!(out, records);
    }

    #[test]
    fn test_whitespace_keyword_matches_everything() {
        let records = sample();
        assert_eq!(filter(&records, "   ", StatusFilter::Any).len(), 4);
    }

    #[test]
    fn test_keyword_matches_title_case_insensitive() {
        let out = filter(&sample(), "SNEAK", StatusFilter::Any);
        assert_eq!(ids(&out), vec!["2"]);
    }

    #[test]
    fn test_keyword_matches_parent_ref() {
        // "shoes" matches Shoes by title and Sneakers by parent reference
        let out = filter(&sample(), "shoes", StatusFilter::Any);
        assert_eq!(ids(&out), vec!["1", "2"]);
    }

    #[test]
    fn test_keyword_matches_description() {
        let out = filter(&sample(), "beanies", StatusFilter::Any);
        assert_eq!(ids(&out), vec!["3"]);
    }

    #[test]
    fn test_status_active_includes_vietnamese_alias() {
        let out = filter(&sample(), "", StatusFilter::Active);
        assert_eq!(ids(&out), vec!["1", "3"]);
    }

    #[test]
    fn test_status_inactive_includes_empty_status() {
        let out = filter(&sample(), "", StatusFilter::Inactive);
        assert_eq!(ids(&out), vec!["2", "4"]);
    }

    #[test]
    fn test_keyword_and_status_combine() {
        let out = filter(&sample(), "s", StatusFilter::Active);
        assert_eq!(ids(&out), vec!["1", "3"]);
    }

    #[test]
    fn test_parse_status_filter() {
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::Any);
        assert_eq!("Active".parse::<StatusFilter>().unwrap(), StatusFilter::Active);
        assert_eq!(
            " inactive ".parse::<StatusFilter>().unwrap(),
            StatusFilter::Inactive
        );
        assert!("archived".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_status_cycle_wraps() {
        let mut f = StatusFilter::Any;
        for _ in 0..3 {
            f = f.cycle();
        }
        assert_eq!(f, StatusFilter::Any);
    }
}
