//! Dataset handle used by every rule evaluator.
//!
//! A [`Dataset`] wraps an immutable polars `DataFrame` and exposes the small
//! set of operations the rules need: column access, row counts, filtering by
//! a row mask, grouping on key tuples and anti-joins against another dataset.
//! Key comparisons are done on the text rendering of each cell so that a
//! numeric column can be matched against a string reference column.

use std::collections::{HashMap, HashSet};

use polars::prelude::*;

use crate::error::{DatasetError, Result};
use crate::lookup::CaseInsensitiveSet;
use crate::polars::{any_to_f64, any_to_text};

/// Key tuple for one row. `None` entries are null cells.
pub type RowKey = Vec<Option<String>>;

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    frame: DataFrame,
}

impl From<DataFrame> for Dataset {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}

impl Dataset {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Column names in schema order.
    pub fn columns(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn column_lookup(&self) -> CaseInsensitiveSet {
        CaseInsensitiveSet::new(self.columns())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    pub fn column(&self, name: &str) -> Result<&Column> {
        self.frame
            .column(name)
            .map_err(|_| DatasetError::MissingColumn {
                name: name.to_string(),
            })
    }

    pub fn dtype(&self, name: &str) -> Result<&DataType> {
        Ok(self.column(name)?.dtype())
    }

    /// Text rendering of every cell in a column, `None` for nulls.
    pub fn texts(&self, name: &str) -> Result<Vec<Option<String>>> {
        let column = self.column(name)?;
        Ok((0..self.row_count())
            .map(|idx| column.get(idx).ok().and_then(any_to_text))
            .collect())
    }

    /// Numeric view of a column. Nulls and unparsable text are `None`.
    pub fn numbers(&self, name: &str) -> Result<Vec<Option<f64>>> {
        let column = self.column(name)?;
        Ok((0..self.row_count())
            .map(|idx| column.get(idx).ok().and_then(any_to_f64))
            .collect())
    }

    /// Key tuples for each row over the given columns.
    pub fn row_keys(&self, names: &[String]) -> Result<Vec<RowKey>> {
        let columns = names
            .iter()
            .map(|name| self.texts(name))
            .collect::<Result<Vec<_>>>()?;
        Ok((0..self.row_count())
            .map(|idx| columns.iter().map(|values| values[idx].clone()).collect())
            .collect())
    }

    /// Keep the rows whose mask entry is `true`.
    pub fn filter(&self, mask: &[bool]) -> Result<Dataset> {
        if mask.len() != self.row_count() {
            return Err(DatasetError::MaskLength {
                expected: self.row_count(),
                found: mask.len(),
            });
        }
        let mask = BooleanChunked::from_slice("mask".into(), mask);
        Ok(Dataset::new(self.frame.filter(&mask)?))
    }

    /// Row indices grouped by key tuple, in first-appearance order.
    ///
    /// Null cells take part in the key, so rows with nulls in the same
    /// positions group together.
    pub fn group_by(&self, keys: &[String]) -> Result<Vec<Vec<usize>>> {
        let mut positions: HashMap<RowKey, usize> = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (idx, key) in self.row_keys(keys)?.into_iter().enumerate() {
            match positions.get(&key) {
                Some(&group) => groups[group].push(idx),
                None => {
                    positions.insert(key, groups.len());
                    groups.push(vec![idx]);
                }
            }
        }
        Ok(groups)
    }

    /// For each row, the size of the group sharing its key tuple.
    pub fn group_counts(&self, keys: &[String]) -> Result<Vec<usize>> {
        let mut counts = vec![0; self.row_count()];
        for group in self.group_by(keys)? {
            for &idx in &group {
                counts[idx] = group.len();
            }
        }
        Ok(counts)
    }

    /// `true` for each row with no match in `other`.
    ///
    /// A key containing a null never matches.
    pub fn anti_join_mask(
        &self,
        other: &Dataset,
        left_on: &[String],
        right_on: &[String],
    ) -> Result<Vec<bool>> {
        if left_on.len() != right_on.len() {
            return Err(DatasetError::KeyArity {
                left: left_on.len(),
                right: right_on.len(),
            });
        }
        let reference: HashSet<Vec<String>> = other
            .row_keys(right_on)?
            .into_iter()
            .filter_map(complete_key)
            .collect();
        Ok(self
            .row_keys(left_on)?
            .into_iter()
            .map(|key| complete_key(key).is_none_or(|key| !reference.contains(&key)))
            .collect())
    }

    /// Rows of `self` with no match in `other`.
    pub fn anti_join(
        &self,
        other: &Dataset,
        left_on: &[String],
        right_on: &[String],
    ) -> Result<Dataset> {
        let mask = self.anti_join_mask(other, left_on, right_on)?;
        self.filter(&mask)
    }
}

fn complete_key(key: RowKey) -> Option<Vec<String>> {
    key.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let frame = DataFrame::new(vec![
            Column::new("id".into(), vec![Some("1"), Some("2"), Some("2"), None]),
            Column::new("amount".into(), vec![Some("10"), Some("x"), None, Some("4.5")]),
        ])
        .unwrap();
        Dataset::new(frame)
    }

    #[test]
    fn numbers_skip_unparsable_cells() {
        let numbers = sample().numbers("amount").unwrap();
        assert_eq!(numbers, vec![Some(10.0), None, None, Some(4.5)]);
    }

    #[test]
    fn filter_rejects_wrong_mask_length() {
        let err = sample().filter(&[true]).unwrap_err();
        assert!(matches!(err, DatasetError::MaskLength { expected: 4, found: 1 }));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let err = sample().texts("nope").unwrap_err();
        assert_eq!(err.to_string(), "column not found: nope");
    }

    #[test]
    fn group_counts_treat_nulls_as_one_key() {
        let frame = DataFrame::new(vec![Column::new(
            "k".into(),
            vec![None, Some("a"), None, Some("b")],
        )])
        .unwrap();
        let counts = Dataset::new(frame).group_counts(&["k".to_string()]).unwrap();
        assert_eq!(counts, vec![2, 1, 2, 1]);
    }

    #[test]
    fn anti_join_never_matches_null_keys() {
        let reference = Dataset::new(
            DataFrame::new(vec![Column::new("ref_id".into(), vec![Some("2"), None])]).unwrap(),
        );
        let mask = sample()
            .anti_join_mask(&reference, &["id".to_string()], &["ref_id".to_string()])
            .unwrap();
        assert_eq!(mask, vec![true, false, false, true]);
    }
}
