use log::warn;

use crate::config::MemoryConfig;
use crate::error::MemoryError;

/// Occupancy bitmap over every physical block
///
/// Cells are stored row by row, `row_width` cells per row; the last row
/// only holds the blocks that exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockStore {
    rows: Vec<Vec<bool>>,
    row_width: usize,
    block_count: usize,
}

impl BlockStore {
    /// Create a bitmap with every block free
    pub fn new(config: &MemoryConfig) -> Self {
        let row_width = config.row_width();
        let block_count = config.block_count();
        let rows = (0..config.row_count())
            .map(|row| {
                let width = (block_count - row * row_width).min(row_width);
                vec![false; width]
            })
            .collect();

        BlockStore {
            rows,
            row_width,
            block_count,
        }
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Split a flat block index into (row, col)
    #[inline]
    fn position(&self, block: usize) -> Result<(usize, usize), MemoryError> {
        if block >= self.block_count {
            return Err(MemoryError::BlockOutOfRange {
                block,
                block_count: self.block_count,
            });
        }
        Ok((block / self.row_width, block % self.row_width))
    }

    /// Lowest-indexed free block, scanning rows in order
    ///
    /// The block is NOT marked; the caller marks it with `mark_used` once it
    /// has been bound.
    pub fn allocate_one(&self) -> Option<usize> {
        self.rows.iter().enumerate().find_map(|(row, cells)| {
            cells
                .iter()
                .position(|used| !used)
                .map(|col| row * self.row_width + col)
        })
    }

    pub fn mark_used(&mut self, block: usize) -> Result<(), MemoryError> {
        let (row, col) = self.position(block)?;
        self.rows[row][col] = true;
        Ok(())
    }

    /// Return a block to the free pool
    ///
    /// Freeing a block that is already free changes nothing and returns
    /// `Ok(false)`.
    pub fn free_one(&mut self, block: usize) -> Result<bool, MemoryError> {
        let (row, col) = self.position(block)?;
        let cell = &mut self.rows[row][col];
        if !*cell {
            warn!("block {} freed while already free", block);
            return Ok(false);
        }
        *cell = false;
        Ok(true)
    }

    pub fn is_used(&self, block: usize) -> Result<bool, MemoryError> {
        let (row, col) = self.position(block)?;
        Ok(self.rows[row][col])
    }

    pub fn used_count(&self) -> usize {
        self.rows
            .iter()
            .map(|cells| cells.iter().filter(|&&used| used).count())
            .sum()
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.block_count - self.used_count()
    }

    /// Read-only view of the bitmap rows (for reports)
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(memory_size: usize, word_length: usize, block_length: usize) -> BlockStore {
        BlockStore::new(&MemoryConfig::new(memory_size, word_length, block_length).unwrap())
    }

    #[test]
    fn test_store_initialization() {
        let bs = store(1024, 1, 8);
        assert_eq!(bs.block_count(), 128);
        assert_eq!(bs.rows().len(), 16);
        assert!(bs.rows().iter().all(|row| row.len() == 8));
        assert_eq!(bs.used_count(), 0);
        assert_eq!(bs.free_count(), 128);
    }

    #[test]
    fn test_partial_last_row_holds_only_existing_blocks() {
        let bs = store(100, 1, 8); // 12 blocks
        assert_eq!(bs.rows().len(), 2);
        assert_eq!(bs.rows()[0].len(), 8);
        assert_eq!(bs.rows()[1].len(), 4);
    }

    #[test]
    fn test_allocate_one_does_not_mark() {
        let bs = store(1024, 1, 8);
        assert_eq!(bs.allocate_one(), Some(0));
        // Still free, so the same block comes back
        assert_eq!(bs.allocate_one(), Some(0));
        assert_eq!(bs.used_count(), 0);
    }

    #[test]
    fn test_first_fit_crosses_rows() {
        let mut bs = store(1024, 1, 8);
        for block in 0..8 {
            bs.mark_used(block).unwrap();
        }
        // First row full -> row 1, col 0
        assert_eq!(bs.allocate_one(), Some(8));

        bs.free_one(3).unwrap();
        assert_eq!(bs.allocate_one(), Some(3));
    }

    #[test]
    fn test_allocate_on_full_store() {
        let mut bs = store(64, 1, 8); // 8 blocks
        for block in 0..8 {
            bs.mark_used(block).unwrap();
        }
        let before = bs.clone();

        assert_eq!(bs.allocate_one(), None);
        assert_eq!(bs, before);
    }

    #[test]
    fn test_free_one_is_tolerant() {
        let mut bs = store(1024, 1, 8);
        bs.mark_used(5).unwrap();

        assert_eq!(bs.free_one(5), Ok(true));
        assert_eq!(bs.free_one(5), Ok(false));
        assert_eq!(bs.used_count(), 0);
    }

    #[test]
    fn test_out_of_range_block() {
        let mut bs = store(1024, 1, 8);
        let err = MemoryError::BlockOutOfRange { block: 128, block_count: 128 };

        assert_eq!(bs.mark_used(128), Err(err.clone()));
        assert_eq!(bs.free_one(128), Err(err.clone()));
        assert_eq!(bs.is_used(128), Err(err));
        assert_eq!(bs.used_count(), 0);
    }

    #[test]
    fn test_flat_index_layout() {
        let mut bs = store(1024, 1, 8);
        // block 19 = row 2, col 3
        bs.mark_used(19).unwrap();
        assert!(bs.rows()[2][3]);
        assert!(bs.is_used(19).unwrap());
        assert_eq!(bs.used_count(), 1);
    }
}
