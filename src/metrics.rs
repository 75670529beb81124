use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide counters covering both pipelines.
///
/// Counters are relaxed atomics; readers get a point-in-time snapshot, not a
/// consistent cut across all three values.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_indexed: AtomicU64,
    chunks_indexed: AtomicU64,
    queries_answered: AtomicU64,
}

impl PipelineMetrics {
    /// Create a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one completed ingestion and the chunks it indexed.
    pub fn record_ingestion(&self, chunks: usize) {
        self.documents_indexed.fetch_add(1, Ordering::Relaxed);
        self.chunks_indexed
            .fetch_add(chunks as u64, Ordering::Relaxed);
    }

    /// Count one completed query.
    pub fn record_query(&self) {
        self.queries_answered.fetch_add(1, Ordering::Relaxed);
    }

    /// Read the current counter values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_indexed: self.documents_indexed.load(Ordering::Relaxed),
            chunks_indexed: self.chunks_indexed.load(Ordering::Relaxed),
            queries_answered: self.queries_answered.load(Ordering::Relaxed),
        }
    }
}

/// Serializable view of the counters served by `GET /metrics`.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents ingested since startup.
    pub documents_indexed: u64,
    /// Chunks indexed across all ingested documents.
    pub chunks_indexed: u64,
    /// Grounded queries completed since startup.
    pub queries_answered: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let snapshot = PipelineMetrics::new().snapshot();
        assert_eq!(snapshot.documents_indexed, 0);
        assert_eq!(snapshot.chunks_indexed, 0);
        assert_eq!(snapshot.queries_answered, 0);
    }

    #[test]
    fn ingestions_accumulate_documents_and_chunks() {
        let metrics = PipelineMetrics::new();
        metrics.record_ingestion(4);
        metrics.record_ingestion(0);
        metrics.record_query();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_indexed, 2);
        assert_eq!(snapshot.chunks_indexed, 4);
        assert_eq!(snapshot.queries_answered, 1);
    }
}
