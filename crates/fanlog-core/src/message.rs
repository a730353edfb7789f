//! Message type carried through the dispatch path.

use crate::level::LogLevel;

/// Maximum number of content parts a single message may carry.
pub const MAX_MESSAGE_PARTS: usize = 10;

/// A single leveled message, immutable once submitted.
///
/// Messages carry a logical source label used for routing context, a
/// non-sentinel level, and an ordered sequence of up to
/// [`MAX_MESSAGE_PARTS`] content parts (the first is mandatory).
#[derive(Debug, Clone)]
pub struct LogMessage {
    /// Logical source-engine label (e.g. "All", "Session Log")
    pub source: String,
    /// Severity of the message; never a sentinel value
    pub level: LogLevel,
    /// Ordered content parts, first mandatory
    pub parts: Vec<String>,
}

impl LogMessage {
    /// Create a message; the part list is truncated to [`MAX_MESSAGE_PARTS`].
    pub fn new(source: impl Into<String>, level: LogLevel, mut parts: Vec<String>) -> Self {
        parts.truncate(MAX_MESSAGE_PARTS);
        Self {
            source: source.into(),
            level,
            parts,
        }
    }
}

/// Assemble an ordered part list from a mandatory first part and a run of
/// optional parts. Omitted parts are skipped while the relative order of
/// the present ones is preserved; the result is capped at
/// [`MAX_MESSAGE_PARTS`].
pub fn assemble_parts(
    first: impl Into<String>,
    rest: impl IntoIterator<Item = Option<String>>,
) -> Vec<String> {
    let mut parts = vec![first.into()];
    for part in rest.into_iter().flatten() {
        if parts.len() == MAX_MESSAGE_PARTS {
            break;
        }
        parts.push(part);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_skips_omitted_parts() {
        let parts = assemble_parts(
            "first",
            vec![None, Some("second".to_string()), None, Some("third".to_string())],
        );
        assert_eq!(parts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_assemble_caps_at_max() {
        let rest: Vec<Option<String>> = (0..20).map(|i| Some(format!("p{}", i))).collect();
        let parts = assemble_parts("first", rest);
        assert_eq!(parts.len(), MAX_MESSAGE_PARTS);
        assert_eq!(parts[0], "first");
        assert_eq!(parts[9], "p8");
    }

    #[test]
    fn test_message_truncates() {
        let parts: Vec<String> = (0..15).map(|i| format!("p{}", i)).collect();
        let msg = LogMessage::new("All", LogLevel::Info, parts);
        assert_eq!(msg.parts.len(), MAX_MESSAGE_PARTS);
    }
}
