//! In-memory logger recording every emitted line for assertions.

use callwatch_logging::{CallContext, Fields, Level, Logger};
use parking_lot::RwLock;
use std::sync::Arc;

/// One recorded log line.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub message: String,
    pub fields: Fields,
}

/// Logger capturing lines in memory. Clones share the same buffer, so a
/// clone can be handed to an installation while the original keeps access
/// for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingLogger {
    entries: Arc<RwLock<Vec<LogEntry>>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().clone()
    }

    /// Messages of the recorded lines, in emission order.
    pub fn messages(&self) -> Vec<String> {
        self.entries.read().iter().map(|e| e.message.clone()).collect()
    }

    /// Number of lines recorded with the given message.
    pub fn count_message(&self, message: &str) -> usize {
        self.entries.read().iter().filter(|e| e.message == message).count()
    }

    /// First line recorded with the given message.
    pub fn find(&self, message: &str) -> Option<LogEntry> {
        self.entries.read().iter().find(|e| e.message == message).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl Logger for RecordingLogger {
    fn log(&self, _ctx: &CallContext, level: Level, message: &str, fields: Fields) {
        self.entries.write().push(LogEntry {
            level,
            message: message.to_string(),
            fields,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_buffer() {
        let logger = RecordingLogger::new();
        let clone = logger.clone();

        clone.log(&CallContext::new(), Level::Info, "hello", Fields::new());

        assert_eq!(logger.count_message("hello"), 1);
        assert_eq!(logger.entries()[0].level, Level::Info);
    }

    #[test]
    fn test_clear_empties_the_buffer() {
        let logger = RecordingLogger::new();
        logger.log(&CallContext::new(), Level::Warn, "line", Fields::new());

        logger.clear();

        assert!(logger.is_empty());
    }
}
