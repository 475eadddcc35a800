use crate::error::GeneratorError;

/// Token id fed as the first input when sampling without a prefix.
pub const START_TOKEN: usize = 0;

/// A rectangular batch of token id sequences, stored row-major
/// (`batch_size` rows of `seq_len` ids).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenBatch {
    batch_size: usize,
    seq_len: usize,
    ids: Vec<usize>,
}

impl TokenBatch {
    pub fn new(batch_size: usize, seq_len: usize, ids: Vec<usize>) -> Result<Self, GeneratorError> {
        if ids.len() != batch_size * seq_len {
            return Err(GeneratorError::RaggedBatch {
                row: 0,
                expected: batch_size * seq_len,
                found: ids.len(),
            });
        }
        Ok(Self {
            batch_size,
            seq_len,
            ids,
        })
    }

    /// Build a batch from one `Vec` per sequence. All rows must have the
    /// same length.
    pub fn from_rows(rows: &[Vec<usize>]) -> Result<Self, GeneratorError> {
        let seq_len = rows.first().map_or(0, |r| r.len());
        let mut ids = Vec::with_capacity(rows.len() * seq_len);
        for (row, r) in rows.iter().enumerate() {
            if r.len() != seq_len {
                return Err(GeneratorError::RaggedBatch {
                    row,
                    expected: seq_len,
                    found: r.len(),
                });
            }
            ids.extend_from_slice(r);
        }
        Ok(Self {
            batch_size: rows.len(),
            seq_len,
            ids,
        })
    }

    /// Stack per-position columns side by side. Each column holds one token
    /// per sequence.
    pub fn from_columns(columns: &[Vec<usize>]) -> Result<Self, GeneratorError> {
        let batch_size = columns.first().map_or(0, |c| c.len());
        let seq_len = columns.len();
        if let Some(col) = columns.iter().find(|c| c.len() != batch_size) {
            return Err(GeneratorError::BatchSizeMismatch {
                expected: batch_size,
                found: col.len(),
            });
        }
        let mut ids = vec![0; batch_size * seq_len];
        for (t, col) in columns.iter().enumerate() {
            for (b, &tok) in col.iter().enumerate() {
                ids[b * seq_len + t] = tok;
            }
        }
        Ok(Self {
            batch_size,
            seq_len,
            ids,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// `(batch_size, seq_len)`
    pub fn shape(&self) -> (usize, usize) {
        (self.batch_size, self.seq_len)
    }

    pub fn get(&self, b: usize, t: usize) -> usize {
        self.ids[b * self.seq_len + t]
    }

    pub fn row(&self, b: usize) -> &[usize] {
        &self.ids[b * self.seq_len..(b + 1) * self.seq_len]
    }

    /// The token at position `t` of every sequence.
    pub fn column(&self, t: usize) -> Vec<usize> {
        (0..self.batch_size).map(|b| self.get(b, t)).collect()
    }

    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    pub fn to_rows(&self) -> Vec<Vec<usize>> {
        (0..self.batch_size).map(|b| self.row(b).to_vec()).collect()
    }

    /// Largest token id in the batch, if any.
    pub fn max_token(&self) -> Option<usize> {
        self.ids.iter().copied().max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_columns_agree() {
        let batch = TokenBatch::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(batch.shape(), (2, 3));
        assert_eq!(batch.column(1), vec![2, 5]);
        let rebuilt =
            TokenBatch::from_columns(&[batch.column(0), batch.column(1), batch.column(2)]).unwrap();
        assert_eq!(rebuilt, batch);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = TokenBatch::from_rows(&[vec![1, 2], vec![3]]).unwrap_err();
        assert_eq!(
            err,
            GeneratorError::RaggedBatch {
                row: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn uneven_columns_are_rejected() {
        assert!(TokenBatch::from_columns(&[vec![1, 2], vec![3]]).is_err());
    }

    #[test]
    fn new_checks_length() {
        assert!(TokenBatch::new(2, 2, vec![0; 3]).is_err());
        let b = TokenBatch::new(2, 2, vec![0, 1, 2, 3]).unwrap();
        assert_eq!(b.row(1), &[2, 3]);
        assert_eq!(b.max_token(), Some(3));
    }
}
