use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Symbol set of the classic 6-character vault codes: digits then
/// lowercase letters.
pub const DEFAULT_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Recover the password of an encrypted ZIP archive by exhaustive search.
    #[command(alias = "c")]
    Crack {
        /// The password-protected ZIP archive to attack.
        #[arg(required = true)]
        archive: PathBuf,

        /// Write the recovered password to this file (bare UTF-8 plus a newline).
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Candidate symbols, given as one string of distinct characters.
        #[arg(long, default_value = DEFAULT_ALPHABET)]
        alphabet: String,

        /// Exact password length to search.
        #[arg(long, default_value_t = 6)]
        length: usize,

        /// Number of worker threads. [0 = auto-detect based on CPU cores]
        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Keyspace partitions handed out per worker. Finer slices react to the stop signal sooner.
        #[arg(long, default_value_t = 4)]
        oversplit: usize,

        /// Candidates tried between stop-signal checks.
        #[arg(long, default_value_t = 1000)]
        poll_interval: u64,

        /// Give up after this many seconds, reporting "not found".
        #[arg(long)]
        deadline: Option<u64>,

        /// Render a live status line on stderr while searching.
        #[arg(long)]
        progress: bool,
    },

    /// Show the keyspace size and partition layout without touching an archive.
    Plan {
        /// Candidate symbols, given as one string of distinct characters.
        #[arg(long, default_value = DEFAULT_ALPHABET)]
        alphabet: String,

        /// Exact password length to search.
        #[arg(long, default_value_t = 6)]
        length: usize,

        /// Number of worker threads. [0 = auto-detect based on CPU cores]
        #[arg(long, default_value_t = 0)]
        threads: usize,

        /// Keyspace partitions handed out per worker.
        #[arg(long, default_value_t = 4)]
        oversplit: usize,
    },

    /// Try a single candidate password against an archive.
    Probe {
        /// The password-protected ZIP archive to test.
        #[arg(required = true)]
        archive: PathBuf,

        /// The candidate password.
        #[arg(required = true)]
        password: String,
    },
}

/// Resolve the worker-thread count from the `--threads` flag, the
/// `BLITZCRACK_THREADS` environment variable, or CPU auto-detection.
///
/// Priority:
/// 1. A non-zero `--threads` command-line argument.
/// 2. `BLITZCRACK_THREADS` environment variable.
/// 3. The number of logical CPUs.
pub fn resolve_threads(flag: usize) -> usize {
    if flag > 0 {
        return flag;
    }
    if let Ok(value) = std::env::var("BLITZCRACK_THREADS") {
        if let Ok(parsed) = value.parse::<usize>() {
            if parsed > 0 {
                return parsed;
            }
        }
    }
    num_cpus::get()
}

/// Parses command-line arguments using `clap` and returns the command to execute.
pub fn run() -> Result<Commands, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args.command)
}
