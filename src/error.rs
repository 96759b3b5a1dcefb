use std::fmt;

/// Why a logical address could not be mapped to a physical one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressFault {
    SegmentOutOfRange { segment: usize, segments: usize },
    PageOutOfRange { segment: usize, page: usize, pages: usize },
    OffsetOutOfRange { offset: usize, block_length: usize },
    /// The page exists but has no block bound to it
    PageUnassigned { segment: usize, page: usize },
}

impl fmt::Display for AddressFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFault::SegmentOutOfRange { segment, segments } => {
                write!(f, "segment {} out of range (job has {} segments)", segment, segments)
            }
            AddressFault::PageOutOfRange { segment, page, pages } => write!(
                f,
                "page {} out of range (segment {} has {} pages)",
                page, segment, pages
            ),
            AddressFault::OffsetOutOfRange { offset, block_length } => write!(
                f,
                "offset {} out of range (block length is {})",
                offset, block_length
            ),
            AddressFault::PageUnassigned { segment, page } => {
                write!(f, "page {} of segment {} has no block", page, segment)
            }
        }
    }
}

/// Errors returned by the allocation engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// No free block was left while admitting a job; nothing was kept
    AllocationExhausted {
        job: String,
        requested: usize,
        available: usize,
    },
    InvalidAddress(AddressFault),
    JobNotFound(String),
    DuplicateJob(String),
    InvalidJobLayout(String),
    BlockOutOfRange { block: usize, block_count: usize },
    InvalidConfig(String),
}

impl fmt::Display for MemoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryError::AllocationExhausted { job, requested, available } => write!(
                f,
                "not enough memory for job {}: {} blocks requested, {} free",
                job, requested, available
            ),
            MemoryError::InvalidAddress(fault) => write!(f, "invalid address: {}", fault),
            MemoryError::JobNotFound(name) => write!(f, "job {} not found", name),
            MemoryError::DuplicateJob(name) => write!(f, "job {} already exists", name),
            MemoryError::InvalidJobLayout(reason) => write!(f, "invalid job layout: {}", reason),
            MemoryError::BlockOutOfRange { block, block_count } => write!(
                f,
                "block {} out of range (memory has {} blocks)",
                block, block_count
            ),
            MemoryError::InvalidConfig(reason) => write!(f, "invalid memory configuration: {}", reason),
        }
    }
}

impl std::error::Error for MemoryError {}

impl From<AddressFault> for MemoryError {
    fn from(fault: AddressFault) -> Self {
        MemoryError::InvalidAddress(fault)
    }
}
