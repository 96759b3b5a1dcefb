use log::{debug, info, warn};

use crate::config::MemoryConfig;
use crate::error::MemoryError;
use crate::memory::BlockStore;
use crate::registry::JobRegistry;
use crate::segment::{Job, SegmentState};
use crate::translation::{LogicalAddress, translate};

/// Owns the block bitmap and every admitted job
///
/// All admissions, removals and translations go through one
/// `MemoryManager`; callers needing shared access wrap it in a lock.
#[derive(Debug)]
pub struct MemoryManager {
    config: MemoryConfig,
    blocks: BlockStore,
    jobs: JobRegistry,
}

impl MemoryManager {
    pub fn new(config: MemoryConfig) -> Self {
        MemoryManager {
            config,
            blocks: BlockStore::new(&config),
            jobs: JobRegistry::new(),
        }
    }

    /// Admit a job: build its segment table and bind every page to a free
    /// block, lowest index first.
    ///
    /// All or nothing: if memory runs out part way, the blocks already bound
    /// are released and the job is not registered. Returns the free memory
    /// left after admission.
    pub fn admit(&mut self, name: &str, size: usize, page_counts: &[usize]) -> Result<usize, MemoryError> {
        if self.jobs.contains(name) {
            return Err(MemoryError::DuplicateJob(name.to_string()));
        }
        let mut job = Job::new(name, size, page_counts)?;

        if let Err(e) = self.allocate_blocks(&mut job) {
            self.release_blocks(&job)?;
            warn!("admission of {} rolled back: {}", name, e);
            return Err(e);
        }

        info!(
            "admitted job {} ({} segments, {} pages)",
            name,
            job.segments().len(),
            job.page_count()
        );
        self.jobs.insert(job)?;
        Ok(self.free_memory())
    }

    fn allocate_blocks(&mut self, job: &mut Job) -> Result<(), MemoryError> {
        let requested = job.page_count();
        let available = self.blocks.free_count();
        let name = job.name().to_string();

        for segment in job.segments_mut() {
            let segment_number = segment.segment_number;
            for entry in segment.pages_mut() {
                let block = self.blocks.allocate_one().ok_or_else(|| MemoryError::AllocationExhausted {
                    job: name.clone(),
                    requested,
                    available,
                })?;
                self.blocks.mark_used(block)?;
                entry.block = Some(block);
                debug!(
                    "job {} segment {} page {} -> block {}",
                    name, segment_number, entry.page_number, block
                );
            }
            segment.state = SegmentState::Allocated;
        }
        Ok(())
    }

    /// Free every block bound to one of the job's pages
    fn release_blocks(&mut self, job: &Job) -> Result<(), MemoryError> {
        for block in job.bound_blocks() {
            self.blocks.free_one(block)?;
        }
        Ok(())
    }

    /// Remove a job and return its blocks to the free pool. Returns the free
    /// memory left after removal.
    pub fn remove(&mut self, name: &str) -> Result<usize, MemoryError> {
        let job = self.jobs.remove(name)?;
        self.release_blocks(&job)?;
        info!("removed job {} ({} blocks released)", name, job.bound_blocks().count());
        Ok(self.free_memory())
    }

    /// Translate a logical address of a registered job
    pub fn translate(&self, name: &str, addr: &LogicalAddress) -> Result<usize, MemoryError> {
        let job = self
            .jobs
            .get(name)
            .ok_or_else(|| MemoryError::JobNotFound(name.to_string()))?;
        let pa = translate(job, addr, self.config.block_length())?;
        debug!("job {} {} -> PA {}", name, addr, pa);
        Ok(pa)
    }

    #[inline]
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn blocks(&self) -> &BlockStore {
        &self.blocks
    }

    pub fn used_count(&self) -> usize {
        self.blocks.used_count()
    }

    pub fn free_count(&self) -> usize {
        self.blocks.free_count()
    }

    /// `memory_size - used_blocks * word_length`
    pub fn free_memory(&self) -> usize {
        self.config.free_memory(self.blocks.used_count())
    }

    pub fn job(&self, name: &str) -> Option<&Job> {
        self.jobs.get(name)
    }

    /// Registered jobs, newest first
    pub fn jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }
}
