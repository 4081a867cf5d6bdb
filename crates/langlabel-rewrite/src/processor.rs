//! Main processor that labels code blocks across a rendered site directory.

use crate::config::Config;
use crate::html::{TransformError, TransformResult, transform_html};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Options for the processor.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Input directory containing rendered HTML.
    pub input_dir: PathBuf,
    /// Output directory (if None, modifies in place).
    pub output_dir: Option<PathBuf>,
    /// Label attribute and candidate selector.
    pub config: Config,
    /// Draw a progress bar on stderr.
    pub progress: bool,
}

impl ProcessOptions {
    /// Options that modify `input_dir` in place with the default config.
    pub fn in_place(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            config: Config::default(),
            progress: false,
        }
    }
}

/// Statistics from processing.
#[derive(Debug, Default)]
pub struct ProcessorStats {
    /// Number of HTML files processed.
    pub files_processed: usize,
    /// Number of HTML files rewritten.
    pub files_changed: usize,
    /// Number of code blocks labelled.
    pub blocks_labelled: usize,
    /// Number of candidate blocks without a language class.
    pub blocks_skipped: usize,
    /// Distinct labels written, sorted.
    pub languages: Vec<String>,
    /// Total bytes read from input HTML files.
    pub bytes_input: u64,
    /// Total bytes written to output HTML files.
    pub bytes_output: u64,
    /// Time spent processing HTML files (excludes clone time).
    pub process_duration: Duration,
}

impl ProcessorStats {
    /// Calculate processing throughput in MB/s (excludes clone time).
    pub fn throughput_mb_s(&self) -> f64 {
        let secs = self.process_duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            (self.bytes_input as f64 / (1024.0 * 1024.0)) / secs
        }
    }
}

/// Processor for a rendered site directory.
pub struct Processor {
    options: ProcessOptions,
}

impl Processor {
    /// Create a new processor with the given options.
    pub fn new(options: ProcessOptions) -> Self {
        Self { options }
    }

    /// Label every HTML file under the input directory.
    pub fn process(&mut self) -> Result<ProcessorStats, ProcessError> {
        let input_dir = &self.options.input_dir;
        if !input_dir.is_dir() {
            return Err(ProcessError::NotADirectory(input_dir.clone()));
        }

        // Determine the actual output directory
        let output_dir = match &self.options.output_dir {
            Some(out) => Self::resolve_output_dir(input_dir, out)?,
            None => None,
        };

        // A distinct output directory gets a fresh copy of the input first
        if let Some(out) = &output_dir {
            // Remove output directory if it exists (clean slate)
            if out.exists() {
                fs::remove_dir_all(out)?;
            }

            let spinner = self.spinner("Cloning directory tree...");
            debug!(from = %input_dir.display(), to = %out.display(), "cloning tree");

            // Use clonetree for fast copy-on-write cloning (instant on APFS)
            clonetree::clone_tree(input_dir, out, &clonetree::Options::new())
                .map_err(|e| ProcessError::Io(std::io::Error::other(e.to_string())))?;

            spinner.finish_with_message("Clone complete");
        }

        let output_dir = output_dir.as_ref().unwrap_or(input_dir);

        // Collect all HTML files to process
        let html_files: Vec<PathBuf> = WalkDir::new(output_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
            .map(|e| e.path().to_path_buf())
            .collect();

        debug!(count = html_files.len(), "collected html files");

        let progress = self.progress_bar(html_files.len() as u64);
        let process_start = Instant::now();

        // Atomic counters for parallel aggregation
        let files_processed = AtomicUsize::new(0);
        let files_changed = AtomicUsize::new(0);
        let blocks_labelled = AtomicUsize::new(0);
        let blocks_skipped = AtomicUsize::new(0);
        let bytes_input = AtomicUsize::new(0);
        let bytes_output = AtomicUsize::new(0);
        let languages = Mutex::new(BTreeSet::<String>::new());

        let config = &self.options.config;

        html_files.par_iter().for_each(|path| {
            match Self::process_html_file(path, config) {
                Ok(outcome) => {
                    files_processed.fetch_add(1, Ordering::Relaxed);
                    if outcome.changed {
                        files_changed.fetch_add(1, Ordering::Relaxed);
                    }
                    blocks_labelled.fetch_add(outcome.result.blocks_labelled, Ordering::Relaxed);
                    blocks_skipped.fetch_add(outcome.result.blocks_skipped, Ordering::Relaxed);
                    bytes_input.fetch_add(outcome.input_size, Ordering::Relaxed);
                    bytes_output.fetch_add(outcome.output_size, Ordering::Relaxed);

                    if !outcome.result.languages.is_empty() {
                        let mut langs = languages.lock().unwrap_or_else(|e| e.into_inner());
                        langs.extend(outcome.result.languages);
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to process file");
                    progress.println(format!(
                        "Warning: Failed to process {}: {}",
                        path.display(),
                        e
                    ));
                }
            }
            progress.inc(1);
        });

        let process_duration = process_start.elapsed();
        progress.finish_and_clear();

        let languages = languages.into_inner().unwrap_or_else(|e| e.into_inner());

        Ok(ProcessorStats {
            files_processed: files_processed.load(Ordering::Relaxed),
            files_changed: files_changed.load(Ordering::Relaxed),
            blocks_labelled: blocks_labelled.load(Ordering::Relaxed),
            blocks_skipped: blocks_skipped.load(Ordering::Relaxed),
            languages: languages.into_iter().collect(),
            bytes_input: bytes_input.load(Ordering::Relaxed) as u64,
            bytes_output: bytes_output.load(Ordering::Relaxed) as u64,
            process_duration,
        })
    }

    /// Resolve `output` against `input` before anything is deleted.
    ///
    /// Returns `None` when both name the same directory, so the run happens in
    /// place. Output directories nested inside the input, or containing it,
    /// are rejected.
    fn resolve_output_dir(input: &Path, output: &Path) -> Result<Option<PathBuf>, ProcessError> {
        let input_real = fs::canonicalize(input)?;
        let output_real = canonicalize_lenient(output)?;

        if output_real == input_real {
            debug!(path = %input_real.display(), "output is the input directory, modifying in place");
            return Ok(None);
        }
        if output_real.starts_with(&input_real) || input_real.starts_with(&output_real) {
            return Err(ProcessError::OverlappingOutput {
                input: input.to_path_buf(),
                output: output.to_path_buf(),
            });
        }
        Ok(Some(output.to_path_buf()))
    }

    /// Label a single HTML file in place.
    fn process_html_file(path: &Path, config: &Config) -> Result<FileOutcome, ProcessError> {
        let html = fs::read_to_string(path)?;
        let input_size = html.len();

        let (transformed, result) = transform_html(&html, config)?;
        let output_size = transformed.len();

        // Only write if we actually changed something
        let changed = transformed != html;
        if changed {
            fs::write(path, &transformed)?;
            debug!(path = %path.display(), labelled = result.blocks_labelled, "rewrote file");
        }

        Ok(FileOutcome {
            result,
            changed,
            input_size,
            output_size,
        })
    }

    fn spinner(&self, message: &'static str) -> ProgressBar {
        if !self.options.progress {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.options.progress {
            return ProgressBar::hidden();
        }
        let progress = ProgressBar::new(len);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .map(|style| style.progress_chars("█▉▊▋▌▍▎▏  "))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style);
        progress
    }
}

/// Canonicalize the longest existing ancestor of `path` and re-attach the rest.
fn canonicalize_lenient(path: &Path) -> std::io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut existing = absolute.as_path();
    let mut rest = Vec::new();

    while !existing.exists() {
        let Some(parent) = existing.parent() else {
            break;
        };
        if let Some(last) = existing.components().next_back() {
            rest.push(last);
        }
        existing = parent;
    }

    let mut resolved = fs::canonicalize(existing)?;
    for component in rest.into_iter().rev() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            other => resolved.push(other),
        }
    }
    Ok(resolved)
}

struct FileOutcome {
    result: TransformResult,
    changed: bool,
    input_size: usize,
    output_size: usize,
}

/// Errors that can occur during processing.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Input path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error(
        "Output directory {} overlaps input directory {}",
        .output.display(),
        .input.display()
    )]
    OverlappingOutput { input: PathBuf, output: PathBuf },
}
