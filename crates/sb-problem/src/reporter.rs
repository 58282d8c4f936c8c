//! Line-oriented sinks for user-facing run summaries.

use parking_lot::Mutex;
use sb_types::{BenchResult, ConfigError};
use std::io::Write;
use std::sync::Arc;

/// Destination for human-readable progress and timing lines.
pub trait Reporter: Send + Sync + std::fmt::Debug {
    fn write(&self, msg: &str);

    fn writeln(&self, msg: &str) {
        self.write(msg);
        self.write("\n");
    }
}

/// Writes to standard output.
#[derive(Debug, Default)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn write(&self, msg: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = stdout.write_all(msg.as_bytes());
        let _ = stdout.flush();
    }
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn write(&self, _msg: &str) {}
}

/// Keeps everything in memory, split into lines.
#[derive(Debug, Default)]
pub struct BufferReporter {
    buffer: Mutex<String>,
}

impl BufferReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.buffer.lock().lines().map(str::to_string).collect()
    }
}

impl Reporter for BufferReporter {
    fn write(&self, msg: &str) {
        self.buffer.lock().push_str(msg);
    }
}

/// Build a reporter by kind: `"default"` (stdout) or `"silent"`.
pub fn get_reporter(kind: &str) -> BenchResult<Arc<dyn Reporter>> {
    match kind {
        "default" | "stdout" => Ok(Arc::new(StdoutReporter)),
        "silent" => Ok(Arc::new(SilentReporter)),
        other => Err(ConfigError::Invalid {
            message: format!("unknown reporter kind '{other}'"),
        }
        .into()),
    }
}
