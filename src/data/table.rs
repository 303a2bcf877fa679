//! Row view of the dataset shown next to the map.

use crate::data::StatRow;
use std::cmp::Ordering;
use tracing::info;

/// Year criterion of the table. A specific year is matched exactly, so
/// choosing one narrows the table to that year instead of lifting the
/// latest-only restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum YearFilter {
    /// Only rows flagged as the latest observation for their country
    Latest,
    Year(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFilters {
    pub measure: String,
    pub approach: String,
    pub year: YearFilter,
    /// Regions to include; a row whose region is not listed is dropped
    pub regions: Vec<String>,
}

impl TableFilters {
    fn matches(&self, row: &StatRow) -> bool {
        row.measure == self.measure
            && row.approach == self.approach
            && match &self.year {
                YearFilter::Latest => row.latest_flag == 1,
                YearFilter::Year(year) => row.year == *year,
            }
            && self.regions.iter().any(|r| *r == row.region)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Year,
    Region,
    Variable,
    Value,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Name,
        SortKey::Year,
        SortKey::Region,
        SortKey::Variable,
        SortKey::Value,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Name => "Name",
            SortKey::Year => "Year",
            SortKey::Region => "Region",
            SortKey::Variable => "Variable",
            SortKey::Value => "Value",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn compare(self, a: &StatRow, b: &StatRow) -> Ordering {
        match self {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Year => a.year.cmp(&b.year),
            SortKey::Region => a.region.cmp(&b.region),
            SortKey::Variable => a.variable.cmp(&b.variable),
            // NaN compares equal to everything, like an unordered comparator
            SortKey::Value => a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// `key == None` keeps dataset order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub key: Option<SortKey>,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            key: None,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortConfig {
    /// Sort by `key`; choosing the current key again flips direction.
    pub fn select(self, key: SortKey) -> Self {
        let direction = if self.key == Some(key) && self.direction == SortDirection::Ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        Self {
            key: Some(key),
            direction,
        }
    }
}

/// Filter then stable-sort the general table
pub fn filter_general<'a>(rows: &'a [StatRow], filters: &TableFilters, sort: SortConfig) -> Vec<&'a StatRow> {
    let mut kept: Vec<&StatRow> = rows.iter().filter(|row| filters.matches(row)).collect();
    if let Some(key) = sort.key {
        kept.sort_by(|a, b| {
            let ord = key.compare(a, b);
            match sort.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }
    kept
}

/// First row for one country and year
pub fn find_country<'a>(rows: &'a [StatRow], country_code: &str, year: &str) -> Option<&'a StatRow> {
    let found = rows
        .iter()
        .find(|row| row.country_code == country_code && row.year == year);
    if found.is_none() {
        info!(country_code, year, "no data found for this country and year");
    }
    found
}
