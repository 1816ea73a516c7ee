//! The packaging run.
//!
//! A run moves through fixed phases: clear stale category directories, scan
//! the input tree, then either finalize an empty manifest straight away or
//! fan out one task per candidate and finalize once every candidate has been
//! accounted for.
//!
//! File tasks never touch shared state. Each one sends a [`FileEvent`] to the
//! coordinator, which owns the manifest and the [`CompletionDetector`] and
//! handles events one at a time. Copies are gated by a semaphore so at most
//! `concurrency` files are open at once.

use crate::category::{Category, Classification, ResourceClassifier, SkipReason};
use crate::completion::CompletionDetector;
use crate::config::RunConfig;
use crate::identifier::IdentifierGenerator;
use crate::manifest::{ManifestError, ManifestWriter, ResourceManifest, ResourceRecord};
use crate::materializer::{FileMaterializer, MaterializeError};
use crate::output_dirs::{ClearFailure, OutputDirectoryManager};
use crate::scanner::{Candidate, DirectoryScanner, ScanError, ScanOutcome};
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinHandle;

/// What happened to one candidate.
#[derive(Debug)]
pub enum FileEvent {
    /// Dropped by the classifier; removed from the run's bookkeeping.
    Skipped {
        file_name: String,
        reason: SkipReason,
    },
    /// Copied into the output tree.
    Copied {
        category: Category,
        record: ResourceRecord,
        bytes: u64,
    },
    /// The copy failed. Counted as handled, not recorded in the manifest.
    Failed {
        category: Category,
        file_name: String,
        error: MaterializeError,
    },
}

/// A non-fatal problem met during a run.
#[derive(Debug, Error)]
pub enum RunIssue {
    #[error("Scan: {0}")]
    Scan(#[from] ScanError),
    #[error("Clear: {0}")]
    Clear(#[from] ClearFailure),
    #[error("Copy of {file_name}: {error}")]
    Copy {
        file_name: String,
        #[source]
        error: MaterializeError,
    },
    #[error("Manifest: {0}")]
    Manifest(#[from] ManifestError),
    #[error("Task for {file_name} did not finish: {reason}")]
    TaskPanicked { file_name: String, reason: String },
}

/// Summary of a finished run.
#[derive(Debug)]
pub struct RunReport {
    /// Candidates found by the scan.
    pub discovered: usize,
    /// Candidates handled as processed (copied or failed).
    pub processed: usize,
    /// Candidates removed by the classifier.
    pub skipped: usize,
    /// Files successfully copied.
    pub copied: usize,
    /// Total bytes copied.
    pub copied_bytes: u64,
    /// The manifest as finalized.
    pub manifest: ResourceManifest,
    /// Where the manifest was written.
    pub manifest_path: PathBuf,
    /// True once the manifest was written successfully.
    pub finalized: bool,
    /// Every non-fatal error, in the order met.
    pub issues: Vec<RunIssue>,
}

impl RunReport {
    fn new(manifest_path: PathBuf) -> Self {
        Self {
            discovered: 0,
            processed: 0,
            skipped: 0,
            copied: 0,
            copied_bytes: 0,
            manifest: ResourceManifest::new(),
            manifest_path,
            finalized: false,
            issues: Vec::new(),
        }
    }

    /// True if the manifest was written and nothing went wrong.
    pub fn is_complete_success(&self) -> bool {
        self.finalized && self.issues.is_empty()
    }

    /// Number of copies that failed.
    pub fn failed_copies(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| matches!(issue, RunIssue::Copy { .. }))
            .count()
    }
}

/// Runs the packaging pipeline for one configuration.
pub struct Pipeline {
    config: RunConfig,
    progress: ProgressBar,
}

impl Pipeline {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports per-file progress on `progress`. Its length is set after scanning.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Executes the run. Never fails as a whole; problems land in [`RunReport::issues`].
    pub async fn run(&self) -> RunReport {
        let config = &self.config;
        let mut report = RunReport::new(config.manifest_path());

        tracing::info!(
            "Packaging {} into {}",
            config.input_root.display(),
            config.output_root.display()
        );

        self.clear(&mut report).await;

        let outcome = self.scan().await;
        report
            .issues
            .extend(outcome.errors.into_iter().map(RunIssue::from));
        let candidates = outcome.candidates;
        report.discovered = candidates.len();

        let mut detector = CompletionDetector::new(candidates.len());
        let mut manifest = ResourceManifest::new();

        if candidates.is_empty() {
            tracing::info!("No recognized files found; writing an empty manifest");
            if detector.claim_finalization() {
                self.finalize(&manifest, &mut report).await;
            }
            report.manifest = manifest;
            return report;
        }

        tracing::info!(
            "Found {} file(s); copying with up to {} at a time",
            candidates.len(),
            config.concurrency()
        );
        self.progress.set_length(candidates.len() as u64);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let handles = self.dispatch(candidates, &tx);
        drop(tx);

        while let Some(event) = rx.recv().await {
            let done = self.handle_event(event, &mut detector, &mut manifest, &mut report);
            self.progress.inc(1);
            if done {
                self.finalize(&manifest, &mut report).await;
            }
        }

        for (file_name, handle) in handles {
            if let Err(e) = handle.await {
                tracing::error!("Task for {} did not finish: {}", file_name, e);
                report.issues.push(RunIssue::TaskPanicked {
                    file_name,
                    reason: e.to_string(),
                });
            }
        }

        if detector.claim_finalization() {
            tracing::warn!(
                "{} file(s) never reported back; finalizing with what was collected",
                detector.outstanding()
            );
            self.finalize(&manifest, &mut report).await;
        }

        self.progress.finish_and_clear();
        report.processed = detector.processed();
        report.manifest = manifest;
        report
    }

    /// Blocking form of [`Pipeline::run`] for synchronous callers.
    pub fn run_blocking(&self) -> std::io::Result<RunReport> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.run()))
    }

    async fn clear(&self, report: &mut RunReport) {
        let resources_dir = self.config.resources_dir();
        let cleared = tokio::task::spawn_blocking(move || {
            OutputDirectoryManager::clear_categories(&resources_dir)
        })
        .await;

        match cleared {
            Ok(failures) => report
                .issues
                .extend(failures.into_iter().map(RunIssue::from)),
            Err(e) => {
                tracing::error!("Clear task failed: {}", e);
                report.issues.push(RunIssue::TaskPanicked {
                    file_name: self.config.resources_dir().display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    async fn scan(&self) -> ScanOutcome {
        let scanner = DirectoryScanner::new(self.config.extension_match)
            .with_excludes(self.config.exclude.clone());
        let root = self.config.input_root.clone();

        match tokio::task::spawn_blocking(move || scanner.scan(&root)).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Scan task failed: {}", e);
                ScanOutcome::default()
            }
        }
    }

    /// Classifies every candidate and spawns a copy task for each accepted one.
    ///
    /// Skips are sent through the same channel as copy results so the
    /// coordinator sees every candidate exactly once.
    fn dispatch(
        &self,
        candidates: Vec<Candidate>,
        tx: &mpsc::UnboundedSender<FileEvent>,
    ) -> Vec<(String, JoinHandle<()>)> {
        let classifier = ResourceClassifier::new(self.config.ignore_sound);
        let mut identifiers = IdentifierGenerator::new(self.config.identifier_length());
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency().max(1)));
        let mut handles = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let category = match classifier.classify(&candidate.extension) {
                Classification::Accept(category) => category,
                Classification::Skip(reason) => {
                    // The receiver outlives dispatch, so this cannot fail.
                    let _ = tx.send(FileEvent::Skipped {
                        file_name: candidate.file_name,
                        reason,
                    });
                    continue;
                }
            };

            let identifier = identifiers.identifier_for(&candidate.extension);
            let dest_dir = self.config.category_dir(category);
            let semaphore = Arc::clone(&semaphore);
            let tx = tx.clone();
            let file_name = candidate.file_name.clone();

            let handle = tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };

                let event =
                    match FileMaterializer::copy(&candidate.path, &dest_dir, &identifier).await {
                        Ok(done) => FileEvent::Copied {
                            category,
                            record: ResourceRecord::new(identifier, candidate.file_name),
                            bytes: done.bytes,
                        },
                        Err(error) => FileEvent::Failed {
                            category,
                            file_name: candidate.file_name,
                            error,
                        },
                    };

                let _ = tx.send(event);
            });

            handles.push((file_name, handle));
        }

        handles
    }

    /// Applies one event and returns true when the run must finalize now.
    fn handle_event(
        &self,
        event: FileEvent,
        detector: &mut CompletionDetector,
        manifest: &mut ResourceManifest,
        report: &mut RunReport,
    ) -> bool {
        match event {
            FileEvent::Skipped { file_name, reason } => {
                tracing::debug!("Skipped {} ({})", file_name, reason);
                report.skipped += 1;
                detector.discount();
                detector.on_file_handled(false)
            }
            FileEvent::Copied {
                category,
                record,
                bytes,
            } => {
                tracing::debug!(
                    "{} -> {}/{}",
                    record.file_name,
                    category,
                    record.resource_identifier
                );
                report.copied += 1;
                report.copied_bytes += bytes;
                manifest.append(category, record);
                detector.on_file_handled(true)
            }
            FileEvent::Failed {
                category,
                file_name,
                error,
            } => {
                tracing::error!("Could not package {} as {}: {}", file_name, category, error);
                report.issues.push(RunIssue::Copy { file_name, error });
                detector.on_file_handled(true)
            }
        }
    }

    async fn finalize(&self, manifest: &ResourceManifest, report: &mut RunReport) {
        let snapshot = manifest.clone();
        let path = report.manifest_path.clone();
        let written =
            tokio::task::spawn_blocking(move || ManifestWriter::finalize(&snapshot, &path)).await;

        match written {
            Ok(Ok(())) => report.finalized = true,
            Ok(Err(e)) => {
                tracing::error!("{}", e);
                report.issues.push(RunIssue::Manifest(e));
            }
            Err(e) => {
                tracing::error!("Manifest task failed: {}", e);
                report.issues.push(RunIssue::TaskPanicked {
                    file_name: report.manifest_path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }
}

/// Runs the pipeline for `config` on the current runtime.
pub async fn run(config: &RunConfig) -> RunReport {
    Pipeline::new(config.clone()).run().await
}

/// Runs the pipeline for `config` on a new multi-threaded runtime.
///
/// # Errors
///
/// Returns an error only if the runtime cannot be started.
pub fn run_blocking(config: &RunConfig) -> std::io::Result<RunReport> {
    Pipeline::new(config.clone()).run_blocking()
}
