//! Scenario log streams and the unified log interleaving all of them

use netsim_replay_shared::{EntityId, LogStreamDef};
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct LogStream {
    def: LogStreamDef,
    entries: Vec<String>,
}

impl LogStream {
    pub fn new(def: LogStreamDef) -> Self {
        Self {
            def,
            entries: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.def.id
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    pub fn def(&self) -> &LogStreamDef {
        &self.def
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Stream contents as one document
    pub fn text(&self) -> String {
        self.entries.concat()
    }

    pub(crate) fn push(&mut self, text: String) {
        self.entries.push(text);
    }

    pub(crate) fn pop(&mut self) -> Option<String> {
        self.entries.pop()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnifiedEntry {
    pub stream_id: EntityId,
    pub text: String,
}

/// Every stream's entries in the order they were applied
#[derive(Debug, Clone, Default)]
pub struct UnifiedLog {
    entries: Vec<UnifiedEntry>,
}

impl UnifiedLog {
    pub fn entries(&self) -> &[UnifiedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn push(&mut self, stream_id: EntityId, text: String) {
        self.entries.push(UnifiedEntry { stream_id, text });
    }

    /// Remove the newest entry, which must belong to `stream_id`
    pub(crate) fn pop(&mut self, stream_id: EntityId) {
        if self.entries.last().map(|e| e.stream_id) == Some(stream_id) {
            self.entries.pop();
        } else {
            log::warn!(
                "[UnifiedLog] Newest entry does not belong to stream {}, leaving log untouched",
                stream_id
            );
        }
    }

    /// Render as text, one line per write.
    ///
    /// Each line opens with a `[name]: ` prompt. A write from a different
    /// stream than the previous one always starts on a fresh line.
    pub fn render<'a>(&self, name_of: impl Fn(EntityId) -> Option<&'a str>) -> String {
        let mut out = String::new();
        let mut last_writer = None;

        for entry in &self.entries {
            let name = name_of(entry.stream_id).unwrap_or("unknown");

            for line in entry.text.split_inclusive('\n') {
                let at_line_start = out.is_empty() || out.ends_with('\n');

                if last_writer != Some(entry.stream_id) && !at_line_start {
                    out.push('\n');
                }
                if out.is_empty() || out.ends_with('\n') {
                    out.push('[');
                    out.push_str(name);
                    out.push_str("]: ");
                }
                out.push_str(line);
                last_writer = Some(entry.stream_id);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(id: EntityId) -> Option<&'static str> {
        match id {
            1 => Some("Node 0"),
            2 => Some("Node 1"),
            _ => None,
        }
    }

    #[test]
    fn test_render_prompts_each_line() {
        let mut log = UnifiedLog::default();
        log.push(1, "first\nsecond\n".to_string());

        assert_eq!(log.render(names), "[Node 0]: first\n[Node 0]: second\n");
    }

    #[test]
    fn test_render_breaks_line_on_writer_change() {
        let mut log = UnifiedLog::default();
        log.push(1, "partial".to_string());
        log.push(1, " continued".to_string());
        log.push(2, "other\n".to_string());
        log.push(7, "orphan".to_string());

        assert_eq!(
            log.render(names),
            "[Node 0]: partial continued\n[Node 1]: other\n[unknown]: orphan"
        );
    }

    #[test]
    fn test_pop_only_removes_matching_stream() {
        let mut log = UnifiedLog::default();
        log.push(1, "a".to_string());
        log.pop(2);
        assert_eq!(log.len(), 1);
        log.pop(1);
        assert!(log.is_empty());
    }
}
