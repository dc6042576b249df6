use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing request activity.
#[derive(Default)]
pub struct ServiceMetrics {
    documents_processed: AtomicU64,
    questions_answered: AtomicU64,
    summaries_generated: AtomicU64,
    summaries_skipped: AtomicU64,
}

impl ServiceMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a processed document and whether a summary was attached to it.
    pub fn record_document(&self, summarized: bool) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
        if summarized {
            self.summaries_generated.fetch_add(1, Ordering::Relaxed);
        } else {
            self.summaries_skipped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an answered question.
    pub fn record_question(&self) {
        self.questions_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            summaries_generated: self.summaries_generated.load(Ordering::Relaxed),
            summaries_skipped: self.summaries_skipped.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of service counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents whose text was extracted successfully since startup.
    pub documents_processed: u64,
    /// Questions answered since startup.
    pub questions_answered: u64,
    /// Processed documents that came back with a summary.
    pub summaries_generated: u64,
    /// Processed documents without a summary (short text or failed summarization).
    pub summaries_skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_summaries() {
        let metrics = ServiceMetrics::new();
        metrics.record_document(true);
        metrics.record_document(false);
        metrics.record_question();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_processed, 2);
        assert_eq!(snapshot.summaries_generated, 1);
        assert_eq!(snapshot.summaries_skipped, 1);
        assert_eq!(snapshot.questions_answered, 1);
    }

    #[test]
    fn snapshot_starts_empty() {
        let metrics = ServiceMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }
}
