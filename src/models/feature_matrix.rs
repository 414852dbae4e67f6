use anyhow::{Result, bail};
use std::ops::Range;

/// Row-major numeric table: rows are time-ordered observations, columns are
/// named features. Never contains missing values.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    data: Vec<f64>,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, data: Vec<f64>) -> Result<Self> {
        if columns.is_empty() {
            bail!("A feature matrix needs at least one column");
        }
        if data.len() % columns.len() != 0 {
            bail!(
                "Data length {} is not a multiple of the column count {}",
                data.len(),
                columns.len()
            );
        }
        Ok(Self { columns, data })
    }

    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let n_cols = columns.len();
        if let Some(bad) = rows.iter().position(|r| r.len() != n_cols) {
            bail!(
                "Row {} has {} values, expected {}",
                bad,
                rows[bad].len(),
                n_cols
            );
        }
        Self::new(columns, rows.concat())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.data.len() / self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn row(&self, idx: usize) -> &[f64] {
        let n = self.n_cols();
        &self.data[idx * n..(idx + 1) * n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_cols())
    }

    pub fn last_row(&self) -> Option<&[f64]> {
        self.n_rows().checked_sub(1).map(|idx| self.row(idx))
    }

    /// Contiguous rows `range` as a flat slice.
    pub fn rows_flat(&self, range: Range<usize>) -> &[f64] {
        let n = self.n_cols();
        &self.data[range.start * n..range.end * n]
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        self.rows().map(|r| r[col]).collect()
    }

    pub fn slice_rows(&self, range: Range<usize>) -> Self {
        Self {
            columns: self.columns.clone(),
            data: self.rows_flat(range).to_vec(),
        }
    }

    pub fn map_rows(&self, mut f: impl FnMut(&[f64], &mut [f64])) -> Self {
        let mut data = vec![0.0; self.data.len()];
        let n = self.n_cols();
        for (src, dst) in self.data.chunks_exact(n).zip(data.chunks_exact_mut(n)) {
            f(src, dst);
        }
        Self {
            columns: self.columns.clone(),
            data,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("c{i}")).collect()
    }

    #[test]
    fn test_shape_and_rows() {
        let m = FeatureMatrix::from_rows(cols(2), &[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
            .unwrap();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.n_cols(), 2);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.last_row(), Some(&[5.0, 6.0][..]));
        assert_eq!(m.column(0), vec![1.0, 3.0, 5.0]);
        assert_eq!(m.slice_rows(1..3).row(0), &[3.0, 4.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        assert!(FeatureMatrix::from_rows(cols(2), &[vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(FeatureMatrix::new(cols(3), vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_empty_matrix() {
        let m = FeatureMatrix::new(cols(4), Vec::new()).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.n_rows(), 0);
        assert!(m.last_row().is_none());
    }
}
