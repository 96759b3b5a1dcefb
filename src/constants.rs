// largest bitmap the simulator will build
pub const MAX_BLOCKS: usize = 1 << 20;

// limits on a single job's layout
pub const MAX_SEGMENTS: usize = 1000;
pub const MAX_PAGES: usize = 2048;
pub const MAX_JOB_NAME_LEN: usize = 19;

// session tokens
pub const EXIT_TOKEN: &str = "exit";
pub const SKIP_TOKEN: &str = "none";

// bitmap cell values as printed in reports
pub const BLOCK_FREE: u8 = 0;
pub const BLOCK_USED: u8 = 1;

// printed in the job table for a page entry without a block
pub const UNASSIGNED_BLOCK: &str = "-";
