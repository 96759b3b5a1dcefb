use crate::error::{AddressFault, MemoryError};
use crate::segment::Job;

/// A logical address inside one job: segment, page within the segment and
/// word offset within the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogicalAddress {
    pub segment: usize,
    pub page: usize,
    pub offset: usize,
}

impl LogicalAddress {
    pub fn new(segment: usize, page: usize, offset: usize) -> Self {
        LogicalAddress { segment, page, offset }
    }
}

impl std::fmt::Display for LogicalAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(s={}, p={}, w={})", self.segment, self.page, self.offset)
    }
}

/// Translate a logical address of `job` to a physical address
///
/// PA = block * block_length + offset. The offset must lie inside the
/// block.
pub fn translate(job: &Job, addr: &LogicalAddress, block_length: usize) -> Result<usize, MemoryError> {
    // Step 1: segment table lookup
    let segment = job.segment(addr.segment).ok_or(AddressFault::SegmentOutOfRange {
        segment: addr.segment,
        segments: job.segments().len(),
    })?;

    // Step 2: page table lookup
    let entry = segment.page(addr.page).ok_or(AddressFault::PageOutOfRange {
        segment: addr.segment,
        page: addr.page,
        pages: segment.page_count(),
    })?;

    // Step 3: offset must stay inside the block
    if addr.offset >= block_length {
        return Err(AddressFault::OffsetOutOfRange {
            offset: addr.offset,
            block_length,
        }
        .into());
    }

    // Admission binds every page or none, so only a job built outside the
    // manager can get here
    let block = entry.block.ok_or(AddressFault::PageUnassigned {
        segment: addr.segment,
        page: addr.page,
    })?;

    Ok(block * block_length + addr.offset)
}
