use std::collections::{BTreeMap, HashMap};

use crate::error::MemoryError;
use crate::segment::Job;

/// Jobs keyed by name
///
/// Lookup and removal go through the name index; iteration yields the most
/// recently admitted job first.
#[derive(Debug, Default)]
pub struct JobRegistry {
    index: HashMap<String, u64>,
    jobs: BTreeMap<u64, Job>,
    next_seq: u64,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Job> {
        self.index.get(name).and_then(|seq| self.jobs.get(seq))
    }

    pub fn insert(&mut self, job: Job) -> Result<(), MemoryError> {
        if self.contains(job.name()) {
            return Err(MemoryError::DuplicateJob(job.name().to_string()));
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(job.name().to_string(), seq);
        self.jobs.insert(seq, job);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Job, MemoryError> {
        let seq = self
            .index
            .remove(name)
            .ok_or_else(|| MemoryError::JobNotFound(name.to_string()))?;
        self.jobs
            .remove(&seq)
            .ok_or_else(|| MemoryError::JobNotFound(name.to_string()))
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.values().rev()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
