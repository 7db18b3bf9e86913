use std::io::{IsTerminal, Write};

use crossterm::style::{Color, Stylize};
use parking_lot::Mutex;

use crate::error::SinkError;

use super::{OutputSink, RunResult};

/// Prints one line per result; failures are red when colour is enabled.
pub struct ConsoleSink {
    writer: Mutex<Box<dyn Write + Send>>,
    color: bool,
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

impl ConsoleSink {
    #[must_use]
    pub fn stdout(no_color: bool) -> Self {
        let color = !no_color && std::io::stdout().is_terminal();
        Self::with_writer(Box::new(std::io::stdout()), color)
    }

    #[must_use]
    pub fn with_writer(writer: Box<dyn Write + Send>, color: bool) -> Self {
        Self {
            writer: Mutex::new(writer),
            color,
        }
    }

    fn emit(&self, line: &str, failure: bool) -> Result<(), SinkError> {
        let mut writer = self.writer.lock();
        let written = if failure && self.color {
            writeln!(writer, "{}", line.with(Color::Red))
        } else {
            writeln!(writer, "{}", line)
        };
        written
            .and_then(|()| writer.flush())
            .map_err(|err| SinkError::WriteConsole { source: err })
    }
}

impl OutputSink for ConsoleSink {
    fn write_result(&self, result: &RunResult) -> Result<(), SinkError> {
        self.emit(&format_console_line(result), !result.success)
    }

    fn write_lines(&self, lines: &[String]) -> Result<(), SinkError> {
        for line in lines {
            self.emit(line, false)?;
        }
        Ok(())
    }
}

pub(crate) fn format_console_line(result: &RunResult) -> String {
    let mut line = format!(
        "{} IN: {}  FOR: {}-{}:{}",
        result.status_code, result.elapsed_ms, result.verb, result.instance, result.request_path
    );
    if !result.success && !result.status_description.is_empty() {
        line.push_str(" (");
        line.push_str(&result.status_description);
        line.push(')');
    }
    line
}
