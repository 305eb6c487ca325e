//! In-memory log of executed queries and their timings.

use crate::util::as_millis_f64;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::io::Write;
use std::ops::AddAssign;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One executed query. Never mutated after it is recorded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceEntry {
    pub script: String,
    pub params: Map<String, Value>,
    /// Script with parameters substituted, for reading only.
    pub query: String,
    #[serde(rename = "execution_time_ms", serialize_with = "serialize_millis")]
    pub execution_time: Duration,
}

fn serialize_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(as_millis_f64(*duration))
}

/// Thread-safe accumulator of [`TraceEntry`] values.
///
/// `add` may be called concurrently without losing entries. Compound
/// operations such as `reset` are not atomic with respect to a concurrent
/// `add`.
#[derive(Debug, Default)]
pub struct QueryTracer {
    entries: Mutex<Vec<TraceEntry>>,
}

impl QueryTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &self,
        script: impl Into<String>,
        params: Map<String, Value>,
        query: impl Into<String>,
        execution_time: Duration,
    ) {
        self.lock().push(TraceEntry {
            script: script.into(),
            params,
            query: query.into(),
            execution_time,
        });
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sum of execution time across all entries.
    pub fn total_time(&self) -> Duration {
        self.lock().iter().map(|entry| entry.execution_time).sum()
    }

    pub fn reset(&self) {
        self.lock().clear();
    }

    /// Copy of the current entries.
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.lock().clone()
    }

    /// Append copies of `other`'s entries to this tracer, in place.
    ///
    /// The copies are independent: resetting either tracer afterwards does
    /// not affect the other. Merging a tracer into itself doubles its entries.
    pub fn merge(&self, other: &Self) {
        let copied = other.entries();
        self.lock().extend(copied);
    }

    /// Write one JSON object per entry.
    pub fn write_jsonl(&self, mut writer: impl Write) -> std::io::Result<()> {
        for entry in self.entries() {
            let line = serde_json::to_string(&entry)?;
            writeln!(writer, "{line}")?;
        }
        writer.flush()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TraceEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AddAssign<&QueryTracer> for QueryTracer {
    fn add_assign(&mut self, other: &QueryTracer) {
        self.merge(other);
    }
}
