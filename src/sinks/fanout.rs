use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::error::{SinkError, panic_message};

use super::{OutputSink, RunResult};

/// Forwards every call to each inner sink, even when an earlier one fails or panics.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn OutputSink>>,
}

impl FanoutSink {
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn OutputSink>>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: Arc<dyn OutputSink>) {
        self.sinks.push(sink);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    fn forward<F>(&self, mut call: F) -> Result<(), SinkError>
    where
        F: FnMut(&dyn OutputSink) -> Result<(), SinkError>,
    {
        let mut failed = 0_usize;
        let mut first = None;
        for sink in &self.sinks {
            let outcome = catch_unwind(AssertUnwindSafe(|| call(sink.as_ref())))
                .unwrap_or_else(|payload| {
                    Err(SinkError::Panicked {
                        message: panic_message(payload.as_ref()),
                    })
                });
            if let Err(err) = outcome {
                failed = failed.saturating_add(1);
                if first.is_none() {
                    first = Some(err);
                }
            }
        }
        match first {
            None => Ok(()),
            Some(first) => Err(SinkError::Fanout {
                failed,
                total: self.sinks.len(),
                first: Box::new(first),
            }),
        }
    }
}

impl OutputSink for FanoutSink {
    fn write_result(&self, result: &RunResult) -> Result<(), SinkError> {
        self.forward(|sink| sink.write_result(result))
    }

    fn write_lines(&self, lines: &[String]) -> Result<(), SinkError> {
        self.forward(|sink| sink.write_lines(lines))
    }
}
