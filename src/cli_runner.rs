//! Reusable CLI runner mapping the engine's three outcomes (found,
//! exhausted, fatal error) onto process exit codes and human output.
//!
//! All status goes through `println!`/`eprintln!` with a bracketed tag;
//! the live progress line rewrites itself in place on stderr so it never
//! interferes with stdout.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Local;

use crate::archive::{ArchiveHandle, PasswordCheck};
use crate::cli::{self, Commands};
use crate::engine::{self, SearchOptions, SearchReport};
use crate::error::CrackError;
use crate::keyspace::{Alphabet, Keyspace};
use crate::partition::partition;
use crate::progress::{ProgressCallback, SearchProgress};

/// Exit code for "keyspace exhausted" and "candidate rejected", distinct
/// from the generic failure code used for configuration/resource errors.
pub const EXIT_NOT_FOUND: u8 = 2;

/// Public entry for running CLI logic.
pub fn run_cli_app() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let command = cli::run()?;

    match &command {
        Commands::Crack {
            archive,
            output,
            alphabet,
            length,
            threads,
            oversplit,
            poll_interval,
            deadline,
            progress,
        } => {
            let keyspace = Keyspace::new(Alphabet::new(alphabet)?, *length)?;
            let options = SearchOptions {
                workers: cli::resolve_threads(*threads),
                oversplit: *oversplit,
                poll_interval: *poll_interval,
                deadline: deadline.map(Duration::from_secs),
            };
            run_crack(archive, output.as_deref(), &keyspace, &options, *progress)
        }
        Commands::Plan { alphabet, length, threads, oversplit } => {
            let keyspace = Keyspace::new(Alphabet::new(alphabet)?, *length)?;
            run_plan(&keyspace, cli::resolve_threads(*threads), *oversplit)
        }
        Commands::Probe { archive, password } => run_probe(archive, password),
    }
}

fn run_crack(
    archive: &Path,
    output: Option<&Path>,
    keyspace: &Keyspace,
    options: &SearchOptions,
    progress: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let handle = ArchiveHandle::open(archive)?;
    let slices = partition(
        keyspace.total(),
        options.workers.saturating_mul(options.oversplit),
    )
    .len();

    println!(
        "[crack] {} candidates | {} symbols × length {}",
        group_digits(keyspace.total()),
        keyspace.alphabet().len(),
        keyspace.length()
    );
    println!(
        "[crack] Testing member '{}' of {}",
        handle.member_name(),
        archive.display()
    );
    println!(
        "[crack] {} workers × {} slices each → {} partitions",
        options.workers, options.oversplit, slices
    );
    println!("[crack] Started {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    let progress_line = create_cli_progress_line();
    let progress_cb: Option<&ProgressCallback> = if progress { Some(&progress_line) } else { None };

    let report = engine::crack(&handle, keyspace, options, progress_cb)?;
    if progress {
        eprintln!();
    }

    match &report.password {
        Some(password) => {
            println!(
                "[crack] ✅ Password found: {} | {} candidates in {}",
                password,
                group_digits(report.attempts),
                describe_pace(&report)
            );
            if let Some(path) = output {
                persist_password(path, password)?;
                println!("[crack] Password saved to {}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            if report.attempts < keyspace.total() {
                eprintln!(
                    "[crack] Deadline hit after {} of {} candidates in {}. No password found.",
                    group_digits(report.attempts),
                    group_digits(keyspace.total()),
                    describe_pace(&report)
                );
            } else {
                eprintln!(
                    "[crack] Keyspace exhausted: {} candidates in {}. No password found.",
                    group_digits(report.attempts),
                    describe_pace(&report)
                );
            }
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
    }
}

fn run_plan(
    keyspace: &Keyspace,
    workers: usize,
    oversplit: usize,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let ranges = partition(keyspace.total(), workers.saturating_mul(oversplit));
    let chunk = ranges.first().map(|r| r.len()).unwrap_or(0);

    println!(
        "[plan] {} candidates | {} symbols × length {}",
        group_digits(keyspace.total()),
        keyspace.alphabet().len(),
        keyspace.length()
    );
    println!(
        "[plan] {} workers × {} slices each → {} partitions of up to {} candidates",
        workers,
        oversplit,
        ranges.len(),
        group_digits(chunk)
    );
    Ok(ExitCode::SUCCESS)
}

fn run_probe(archive: &Path, password: &str) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let handle = ArchiveHandle::open(archive)?;
    let mut verifier = handle.verifier()?;
    if verifier.check(password)? {
        println!(
            "[probe] ✅ Password accepted: member '{}' decrypts",
            handle.member_name()
        );
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("[probe] Password rejected by {}", archive.display());
        Ok(ExitCode::from(EXIT_NOT_FOUND))
    }
}

/// The recovered password is the engine's only output artifact: bare
/// UTF-8 with a trailing newline.
fn persist_password(path: &Path, password: &str) -> Result<(), CrackError> {
    std::fs::write(path, format!("{}\n", password))
        .map_err(|e| CrackError::io(e, PathBuf::from(path)))
}

// --- utils for CLI progress -------------------------------------------------

fn create_cli_progress_line() -> impl Fn(SearchProgress) + Sync {
    let prev_len = Mutex::new(0usize);

    move |state: SearchProgress| {
        // Determine terminal width (default 80)
        let term_width = term_size::dimensions().map(|(w, _)| w).unwrap_or(80);

        let line = format!(
            "[CRACK] {:.1}% | {} / {} candidates | {:.0}/s | elapsed {:.1}s",
            state.percent,
            group_digits(state.attempts),
            group_digits(state.total),
            state.rate,
            state.elapsed.as_secs_f64(),
        );
        let mut line_to_print = if line.len() > term_width {
            line[..term_width].to_string()
        } else {
            line
        };
        {
            let mut prev = prev_len.lock().unwrap();
            if *prev > line_to_print.len() {
                let diff = *prev - line_to_print.len();
                line_to_print.push_str(&" ".repeat(diff));
            }
            *prev = line_to_print.len();
        }
        // Print to stderr to avoid interfering with stdout
        eprint!("\r\x1B[2K{}", line_to_print);
        io::stderr().flush().ok();
    }
}

fn describe_pace(report: &SearchReport) -> String {
    let secs = report.elapsed.as_secs_f64();
    let rate = if secs > 0.0 { report.attempts as f64 / secs } else { 0.0 };
    format!("{:.2}s ({}/s)", secs, group_digits(rate as u64))
}

fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_grouping() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1000), "1,000");
        assert_eq!(group_digits(2_176_782_336), "2,176,782,336");
    }
}
