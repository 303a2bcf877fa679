use crate::data::{GeoFeature, StatRow};
use std::collections::HashMap;

/// Statistic bound to one feature
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Match<'a> {
    Row(&'a StatRow),
    NoData,
}

impl<'a> Match<'a> {
    pub fn row(self) -> Option<&'a StatRow> {
        match self {
            Match::Row(row) => Some(row),
            Match::NoData => None,
        }
    }
}

/// Bind every feature to its statistic by ISO alpha-3 code.
///
/// Returns one entry per feature, in feature order. When several rows share
/// a country code the first one in `rows` wins.
pub fn join<'a>(features: &[GeoFeature], rows: &[&'a StatRow]) -> Vec<Match<'a>> {
    let mut by_code: HashMap<&str, &'a StatRow> = HashMap::with_capacity(rows.len());
    for &row in rows {
        by_code.entry(row.country_code.as_str()).or_insert(row);
    }

    features
        .iter()
        .map(|feature| match by_code.get(feature.iso_a3.as_str()) {
            Some(&row) => Match::Row(row),
            None => Match::NoData,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::geometry::square;
    use crate::data::stats::row;

    #[test]
    fn test_join_is_total_and_ordered() {
        let features = vec![
            square("USA", "United States", -100.0, 30.0, 10.0),
            square("FRA", "France", 0.0, 45.0, 5.0),
            square("-99", "Somaliland", 45.0, 9.0, 2.0),
        ];
        let rows = vec![row("FRA", 0.3)];
        let refs: Vec<&StatRow> = rows.iter().collect();

        let matches = join(&features, &refs);
        assert_eq!(matches.len(), features.len());
        assert_eq!(matches[0], Match::NoData);
        assert_eq!(matches[1].row().map(|r| r.value), Some(0.3));
        assert_eq!(matches[2], Match::NoData);
    }

    #[test]
    fn test_duplicate_codes_first_wins() {
        let features = vec![square("USA", "United States", -100.0, 30.0, 10.0)];
        let rows = vec![row("USA", 1.0), row("USA", 2.0)];
        let refs: Vec<&StatRow> = rows.iter().collect();
        let matches = join(&features, &refs);
        assert!(std::ptr::eq(matches[0].row().unwrap(), &rows[0]));
    }

    #[test]
    fn test_no_rows() {
        let features = vec![square("USA", "United States", -100.0, 30.0, 10.0)];
        assert_eq!(join(&features, &[]), vec![Match::NoData]);
    }
}
