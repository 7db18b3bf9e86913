use parking_lot::Mutex;

use crate::error::SinkError;

use super::{OutputSink, RunResult};

/// Keeps every result and line in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    results: Mutex<Vec<RunResult>>,
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn results(&self) -> Vec<RunResult> {
        self.results.lock().clone()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.lock().is_empty()
    }
}

impl OutputSink for MemorySink {
    fn write_result(&self, result: &RunResult) -> Result<(), SinkError> {
        self.results.lock().push(result.clone());
        Ok(())
    }

    fn write_lines(&self, lines: &[String]) -> Result<(), SinkError> {
        self.lines.lock().extend_from_slice(lines);
        Ok(())
    }
}
