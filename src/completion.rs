//! Run completion tracking.
//!
//! The coordinator feeds every handled candidate into a [`CompletionDetector`].
//! The detector reports completion once `processed >= expected`, and only
//! the first such report is honoured: finalization happens exactly once per run.

/// Processed-versus-expected bookkeeping with a finalize-once gate.
///
/// Invariant: `processed <= expected`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionDetector {
    expected: usize,
    processed: usize,
    finalized: bool,
}

impl CompletionDetector {
    /// Creates a detector for a scan that found `expected` candidates.
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            processed: 0,
            finalized: false,
        }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Candidates neither processed nor discounted yet.
    pub fn outstanding(&self) -> usize {
        self.expected - self.processed
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// True when all expected work has been processed.
    pub fn is_complete(&self) -> bool {
        self.processed >= self.expected
    }

    /// Removes one skipped candidate from the expected count.
    pub fn discount(&mut self) {
        if self.expected > self.processed {
            self.expected -= 1;
        } else {
            tracing::warn!(
                "Discount ignored: {} of {} already processed",
                self.processed,
                self.expected
            );
        }
    }

    /// Records one handled candidate and reports whether the caller must finalize now.
    ///
    /// `counted` is false for skipped candidates, which must be
    /// [`discount`](Self::discount)ed first. Returns `true` at most once.
    ///
    /// # Examples
    ///
    /// ```
    /// use vypack::completion::CompletionDetector;
    ///
    /// let mut detector = CompletionDetector::new(2);
    /// assert!(!detector.on_file_handled(true));
    /// detector.discount();
    /// assert!(detector.on_file_handled(false));
    /// assert!(!detector.on_file_handled(false));
    /// ```
    pub fn on_file_handled(&mut self, counted: bool) -> bool {
        if counted {
            if self.processed < self.expected {
                self.processed += 1;
            } else {
                tracing::warn!(
                    "Ignoring extra completion: {} of {} already processed",
                    self.processed,
                    self.expected
                );
            }
        }

        self.is_complete() && self.claim_finalization()
    }

    /// Takes the finalize-once gate without a completion check.
    ///
    /// Used when a scan found nothing, and when a run must finalize after
    /// losing tasks. Returns `false` if finalization was already claimed.
    pub fn claim_finalization(&mut self) -> bool {
        if self.finalized {
            return false;
        }
        self.finalized = true;
        true
    }
}
