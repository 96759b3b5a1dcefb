//! Segmented paging simulator - interactive session
//!
//! Usage: segmented-paging-sim [OPTIONS]
//!
//! Memory size, word length and block length are taken from the options
//! when given and asked for on stdin otherwise. Jobs are then admitted and
//! released interactively until `exit`.

use std::io::{self, BufWriter};
use std::process;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use log::info;

use paging_sim::io::{Session, StartupValues};
use paging_sim::{MemoryManager, logging};

/// Command-line configuration
#[derive(Parser, Debug)]
#[clap(name = "segmented-paging-sim", about = "Segmented paging memory allocation simulator")]
struct Config {
    /// Main memory size
    #[clap(short = 'm', long)]
    memory_size: Option<usize>,

    /// Word length
    #[clap(short = 'w', long)]
    word_length: Option<usize>,

    /// Block length (words per block, also the bitmap row width)
    #[clap(short = 'b', long)]
    block_length: Option<usize>,

    /// Ask for a logical address to translate after each admission
    #[clap(short = 't', long)]
    translate: bool,

    /// Print allocation details on stderr
    #[clap(short = 'v', long)]
    verbose: bool,
}

fn main() {
    let config = Config::parse();

    if let Err(e) = logging::init(config.verbose) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    // Run the session and handle any errors
    if let Err(e) = run(&config) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Main logic separated from main() for cleaner error handling
fn run(config: &Config) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut session = Session::new(stdin.lock(), BufWriter::new(stdout.lock()))
        .with_translation(config.translate);

    let preset = StartupValues {
        memory_size: config.memory_size,
        word_length: config.word_length,
        block_length: config.block_length,
    };
    let memory = session
        .read_config(preset)
        .map_err(|e| anyhow!(e))
        .context("Failed to set up memory")?;

    info!(
        "memory: size={}, word length={}, block length={}, {} blocks",
        memory.memory_size(),
        memory.word_length(),
        memory.block_length(),
        memory.block_count()
    );

    let mut mm = MemoryManager::new(memory);
    session.run(&mut mm).map_err(|e| anyhow!(e))?;

    info!("session ended with {} jobs resident", mm.jobs().count());
    Ok(())
}
