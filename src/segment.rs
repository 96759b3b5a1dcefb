use std::fmt;

use crate::constants::*;
use crate::error::MemoryError;

/// One page of a segment and the physical block backing it, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEntry {
    pub page_number: usize,
    pub block: Option<usize>,
}

impl PageEntry {
    fn unassigned(page_number: usize) -> Self {
        PageEntry {
            page_number,
            block: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentState {
    Unallocated,
    Allocated,
}

impl fmt::Display for SegmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentState::Unallocated => write!(f, "unallocated"),
            SegmentState::Allocated => write!(f, "allocated"),
        }
    }
}

/// A segment owns a fixed-length page table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub segment_number: usize,
    pub state: SegmentState,
    pages: Vec<PageEntry>,
}

impl Segment {
    fn new(segment_number: usize, page_count: usize) -> Self {
        Segment {
            segment_number,
            state: SegmentState::Unallocated,
            pages: (0..page_count).map(PageEntry::unassigned).collect(),
        }
    }

    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    /// Page entries can be rebound but the table never changes length
    pub(crate) fn pages_mut(&mut self) -> &mut [PageEntry] {
        &mut self.pages
    }

    pub fn page(&self, page_number: usize) -> Option<&PageEntry> {
        self.pages.get(page_number)
    }
}

/// A simulated process: name, declared size and its segment table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    name: String,
    size: usize,
    segments: Vec<Segment>,
}

impl Job {
    /// Build the segment table for a job, one entry per element of
    /// `page_counts`. No blocks are bound here.
    pub fn new(name: &str, size: usize, page_counts: &[usize]) -> Result<Self, MemoryError> {
        validate_name(name)?;

        check_segment_count(page_counts.len())?;
        if let Some((segment, &pages)) = page_counts
            .iter()
            .enumerate()
            .find(|&(_, &pages)| pages > MAX_PAGES)
        {
            return Err(MemoryError::InvalidJobLayout(format!(
                "segment {} requests {} pages, at most {} allowed",
                segment, pages, MAX_PAGES
            )));
        }

        let segments = page_counts
            .iter()
            .enumerate()
            .map(|(number, &pages)| Segment::new(number, pages))
            .collect();

        Ok(Job {
            name: name.to_string(),
            size,
            segments,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub(crate) fn segments_mut(&mut self) -> &mut [Segment] {
        &mut self.segments
    }

    pub fn segment(&self, segment_number: usize) -> Option<&Segment> {
        self.segments.get(segment_number)
    }

    /// Total pages over all segments
    pub fn page_count(&self) -> usize {
        self.segments.iter().map(Segment::page_count).sum()
    }

    /// Every block currently bound to one of this job's pages, in
    /// segment-then-page order
    pub fn bound_blocks(&self) -> impl Iterator<Item = usize> + '_ {
        self.segments
            .iter()
            .flat_map(|segment| segment.pages.iter().filter_map(|entry| entry.block))
    }
}

/// Reject a segment table longer than `MAX_SEGMENTS`
pub fn check_segment_count(count: usize) -> Result<(), MemoryError> {
    if count > MAX_SEGMENTS {
        return Err(MemoryError::InvalidJobLayout(format!(
            "{} segments requested, at most {} allowed",
            count, MAX_SEGMENTS
        )));
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<(), MemoryError> {
    if name.is_empty() {
        return Err(MemoryError::InvalidJobLayout("job name is empty".to_string()));
    }
    if name.chars().count() > MAX_JOB_NAME_LEN {
        return Err(MemoryError::InvalidJobLayout(format!(
            "job name {} is longer than {} characters",
            name, MAX_JOB_NAME_LEN
        )));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(MemoryError::InvalidJobLayout(format!(
            "job name {:?} contains whitespace",
            name
        )));
    }
    Ok(())
}
