use crate::constants::MAX_BLOCKS;
use crate::error::MemoryError;

/// Geometry of the simulated main memory
///
/// `block_count = memory_size / (block_length * word_length)`. The bitmap is
/// kept in rows of `block_length` cells, so a block's flat index is
/// `row * block_length + col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryConfig {
    memory_size: usize,
    word_length: usize,
    block_length: usize,
    block_count: usize,
}

impl MemoryConfig {
    pub fn new(memory_size: usize, word_length: usize, block_length: usize) -> Result<Self, MemoryError> {
        if memory_size == 0 {
            return Err(MemoryError::InvalidConfig("memory size must be positive".to_string()));
        }
        if word_length == 0 {
            return Err(MemoryError::InvalidConfig("word length must be positive".to_string()));
        }
        if block_length == 0 {
            return Err(MemoryError::InvalidConfig("block length must be positive".to_string()));
        }

        let block_bytes = block_length
            .checked_mul(word_length)
            .ok_or_else(|| MemoryError::InvalidConfig("block length * word length overflows".to_string()))?;
        let block_count = memory_size / block_bytes;
        if block_count == 0 {
            return Err(MemoryError::InvalidConfig(format!(
                "memory size {} is smaller than one block ({} * {})",
                memory_size, block_length, word_length
            )));
        }
        if block_count > MAX_BLOCKS {
            return Err(MemoryError::InvalidConfig(format!(
                "{} blocks requested, at most {} supported",
                block_count, MAX_BLOCKS
            )));
        }

        Ok(MemoryConfig {
            memory_size,
            word_length,
            block_length,
            block_count,
        })
    }

    #[inline]
    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    #[inline]
    pub fn word_length(&self) -> usize {
        self.word_length
    }

    #[inline]
    pub fn block_length(&self) -> usize {
        self.block_length
    }

    #[inline]
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Cells per bitmap row
    #[inline]
    pub fn row_width(&self) -> usize {
        self.block_length
    }

    /// Number of bitmap rows; the last one may be partial
    pub fn row_count(&self) -> usize {
        self.block_count.div_ceil(self.row_width())
    }

    /// Free memory as reported after admission and removal
    pub fn free_memory(&self, used_blocks: usize) -> usize {
        self.memory_size
            .saturating_sub(used_blocks.saturating_mul(self.word_length))
    }
}
