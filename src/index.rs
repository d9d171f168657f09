use std::ops::Range;

/// Bijection between `(dimension, segment, coefficient)` triples and the
/// flat decision vector of length `d · N · (n+1)`.
///
/// Dimensions are interleaved within each segment: the coefficient block
/// for `(j, s)` occupies columns `[(j + d·s)·(n+1), (j + d·s + 1)·(n+1))`.
/// Two consecutive segments of the same dimension are therefore separated
/// by a fixed offset of `(n+1)·d` columns.
#[derive(Debug, Clone, Copy)]
pub struct IndexMap {
    dim: usize,
    n_segments: usize,
    order: usize,
}

impl IndexMap {
    pub fn new(dim: usize, n_segments: usize, order: usize) -> Self {
        Self {
            dim,
            n_segments,
            order,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn n_segments(&self) -> usize {
        self.n_segments
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Total length of the decision vector, `d · N · (n+1)`.
    pub fn decision_len(&self) -> usize {
        self.dim * self.n_segments * (self.order + 1)
    }

    fn block_start(&self, j: usize, s: usize) -> usize {
        (j + self.dim * s) * (self.order + 1)
    }

    /// Column range in the decision vector occupied by dimension `j`,
    /// segment `s`.
    pub fn block_cols(&self, j: usize, s: usize) -> Range<usize> {
        let start = self.block_start(j, s);
        start..start + (self.order + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_len_matches_invariant_i2() {
        let index = IndexMap::new(3, 4, 7);
        assert_eq!(index.decision_len(), 3 * 4 * 8);
    }

    #[test]
    fn blocks_interleave_dimensions_within_a_segment() {
        let index = IndexMap::new(2, 3, 5);
        // order 5 => block width 6.
        assert_eq!(index.block_cols(0, 0), 0..6);
        assert_eq!(index.block_cols(1, 0), 6..12);
        assert_eq!(index.block_cols(0, 1), 12..18);
    }

    #[test]
    fn same_dimension_consecutive_segments_offset_by_block_width_times_dim() {
        let index = IndexMap::new(2, 3, 5);
        let a = index.block_cols(0, 0);
        let b = index.block_cols(0, 1);
        assert_eq!(b.start - a.start, 6 * 2);
    }
}
