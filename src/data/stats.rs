use crate::config::BOTH_VARIABLES;
use crate::error::DatasetError;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// One row of the statistics table.
///
/// Field names follow the dataset's column headers. The table is exported
/// from a CSV, so numeric columns may arrive as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StatRow {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "iso", default)]
    pub iso_code: String,
    #[serde(rename = "y", default, deserialize_with = "lenient_text")]
    pub year: String,
    /// ISO alpha-3 code, the join key against country geometry
    #[serde(rename = "c", default)]
    pub country_code: String,
    #[serde(rename = "latest", default, deserialize_with = "lenient_flag")]
    pub latest_flag: i64,
    #[serde(rename = "var", default)]
    pub variable: String,
    #[serde(rename = "Region", default)]
    pub region: String,
    #[serde(rename = "Approach1", default, deserialize_with = "lenient_text")]
    pub approach1: String,
    #[serde(rename = "Value", default = "nan", deserialize_with = "lenient_number")]
    pub value: f64,
    #[serde(rename = "Measure", default)]
    pub measure: String,
    #[serde(rename = "Approach", default)]
    pub approach: String,
    #[serde(rename = "Perspective", default)]
    pub perspective: String,
    #[serde(rename = "Circumstances", default, deserialize_with = "lenient_text")]
    pub circumstances: String,
}

fn nan() -> f64 {
    f64::NAN
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Number(f64),
    Text(String),
    Null,
}

fn lenient_number<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    Ok(match Cell::deserialize(de)? {
        Cell::Number(n) => n,
        Cell::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        Cell::Null => f64::NAN,
    })
}

/// Integer parse that stops at the first non-digit, so `"1.0"` reads as 1
fn lenient_flag<'de, D: Deserializer<'de>>(de: D) -> Result<i64, D::Error> {
    Ok(match Cell::deserialize(de)? {
        Cell::Number(n) if n.is_finite() => n.trunc() as i64,
        Cell::Text(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
                .map_or(s.len(), |(i, _)| i);
            s[..end].parse().unwrap_or(0)
        }
        _ => 0,
    })
}

fn lenient_text<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(match Cell::deserialize(de)? {
        Cell::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", n as i64),
        Cell::Number(n) => n.to_string(),
        Cell::Text(s) => s,
        Cell::Null => String::new(),
    })
}

/// The four user-selected criteria that pick one value per country
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub perspective: String,
    pub measure: String,
    pub approach: String,
    /// A variable name, or `"Both"` to accept any variable
    pub variable: String,
}

impl FilterCriteria {
    pub fn new(
        perspective: impl Into<String>,
        measure: impl Into<String>,
        approach: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        Self {
            perspective: perspective.into(),
            measure: measure.into(),
            approach: approach.into(),
            variable: variable.into(),
        }
    }

    /// All four fields are required; an empty one means the user has not
    /// finished choosing.
    pub fn is_complete(&self) -> bool {
        !self.perspective.is_empty()
            && !self.measure.is_empty()
            && !self.approach.is_empty()
            && !self.variable.is_empty()
    }

    pub fn matches(&self, row: &StatRow) -> bool {
        row.latest_flag == 1
            && row.perspective == self.perspective
            && row.measure == self.measure
            && row.approach == self.approach
            && (self.variable == BOTH_VARIABLES || row.variable == self.variable)
    }
}

/// Select the rows that pass `criteria`, preserving input order.
pub fn filter_rows<'a>(rows: &'a [StatRow], criteria: &FilterCriteria) -> Vec<&'a StatRow> {
    rows.iter().filter(|row| criteria.matches(row)).collect()
}

/// Sorted distinct values of one column
pub fn distinct<F>(rows: &[StatRow], column: F) -> Vec<String>
where
    F: Fn(&StatRow) -> &str,
{
    rows.iter()
        .map(|row| column(row))
        .filter(|v| !v.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Parse a JSON array of rows. simd-json parses in place, hence `&mut`.
pub fn parse_dataset(bytes: &mut [u8]) -> Result<Vec<StatRow>, DatasetError> {
    Ok(simd_json::serde::from_slice(bytes)?)
}

pub fn load_dataset(path: &Path) -> Result<Vec<StatRow>, DatasetError> {
    let mut bytes = fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_dataset(&mut bytes)
}

#[cfg(test)]
pub(crate) fn row(country: &str, value: f64) -> StatRow {
    StatRow {
        name: country.to_string(),
        iso_code: country.to_string(),
        year: "2019".to_string(),
        country_code: country.to_string(),
        latest_flag: 1,
        variable: "V".to_string(),
        region: "R".to_string(),
        approach1: String::new(),
        value,
        measure: "M".to_string(),
        approach: "A".to_string(),
        perspective: "P".to_string(),
        circumstances: String::new(),
    }
}
