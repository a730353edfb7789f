//! Binary session-config codec.
//!
//! A session config is the persisted snapshot of the global threshold plus
//! the exportable sink states. The layout is fixed-width little-endian,
//! strings are length-prefixed UTF-8, in this exact order:
//!
//! ```text
//! [u32 format-version]
//! [u32 marker-tag]
//! [u32 global-threshold]
//! [u32 exportable-engine-count]
//!   repeated: [string factory-tag][engine-specific bytes]
//! [u32 total-attached-engine-count]
//!   repeated: [string name][string formatting-engine-name][bool active]
//! [u32 marker-tag]
//! ```
//!
//! Writing streams straight to the destination, so a failed save may leave
//! a truncated file; the missing trailing marker makes such a file read as
//! corrupt. Parsing validates the entire stream, reconstructing engines
//! along the way, before the caller mutates any live state.

use std::io::Write;
use std::sync::Arc;

use crate::error::{LogError, LogResult};
use crate::factory::EngineFactory;
use crate::level::LogLevel;

use super::engine::LoggerEngine;

/// Compiled-in session file format version.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Marker written after the header and at the end of the stream.
pub const SESSION_MARKER: u32 = 0xFAC0_000F;

// ---------------------------------------------------------------------------
// Codec primitives
// ---------------------------------------------------------------------------

pub fn put_u32(writer: &mut dyn Write, value: u32) -> LogResult<()> {
    writer.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub fn put_bool(writer: &mut dyn Write, value: bool) -> LogResult<()> {
    writer.write_all(&[value as u8])?;
    Ok(())
}

pub fn put_string(writer: &mut dyn Write, value: &str) -> LogResult<()> {
    put_u32(writer, value.len() as u32)?;
    writer.write_all(value.as_bytes())?;
    Ok(())
}

/// Bounds-checked cursor over an in-memory session stream.
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize) -> LogResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(LogError::ConfigCorrupt(
                "unexpected end of session data".to_string(),
            ));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn get_u32(&mut self) -> LogResult<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn get_bool(&mut self) -> LogResult<bool> {
        let bytes = self.take(1)?;
        match bytes[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(LogError::ConfigCorrupt(format!(
                "invalid boolean value: {}",
                other
            ))),
        }
    }

    pub fn get_string(&mut self) -> LogResult<String> {
        let len = self.get_u32()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| LogError::ConfigCorrupt("invalid UTF-8 in string".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Session records
// ---------------------------------------------------------------------------

/// Per-engine properties restored by name after engine reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineProperties {
    pub name: String,
    pub formatting_engine: String,
    pub active: bool,
}

/// A fully parsed and validated session stream.
pub struct ParsedSession {
    /// Global threshold stored in the file
    pub threshold: LogLevel,
    /// Reconstructed exportable engines, not yet attached anywhere
    pub engines: Vec<Arc<dyn LoggerEngine>>,
    /// Name/formatting/active triples for every engine that was attached
    /// at save time
    pub properties: Vec<EngineProperties>,
}

impl std::fmt::Debug for ParsedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedSession")
            .field("threshold", &self.threshold)
            .field("engines", &self.engines.len())
            .field("properties", &self.properties)
            .finish()
    }
}

/// Write a complete session stream for the given live engine set.
///
/// The exportable subset is computed here; engines without the export
/// capability still contribute a properties triple.
pub fn write_session(
    writer: &mut dyn Write,
    threshold: LogLevel,
    engines: &[Arc<dyn LoggerEngine>],
) -> LogResult<()> {
    put_u32(writer, SESSION_FORMAT_VERSION)?;
    put_u32(writer, SESSION_MARKER)?;
    put_u32(writer, threshold as u32)?;

    let exportable: Vec<_> = engines.iter().filter(|e| e.exportable().is_some()).collect();
    put_u32(writer, exportable.len() as u32)?;
    for engine in &exportable {
        if let Some(export) = engine.exportable() {
            put_string(writer, export.factory_tag())?;
            export.export_binary(writer)?;
        }
    }

    put_u32(writer, engines.len() as u32)?;
    for engine in engines {
        put_string(writer, &engine.name())?;
        put_string(writer, &engine.formatting_engine_name())?;
        put_bool(writer, engine.is_active())?;
    }

    put_u32(writer, SESSION_MARKER)?;
    Ok(())
}

/// Parse and validate an entire session stream.
///
/// Exportable engines are reconstructed through the factory and fed their
/// serialized state, but nothing outside this function is touched: on any
/// failure the reconstructed instances are simply dropped. The trailing
/// marker is verified here, before any live mutation can take place.
///
/// # Errors
///
/// * `FormatVersionMismatch` when the version field differs from
///   [`SESSION_FORMAT_VERSION`].
/// * `ConfigCorrupt` for marker mismatches, truncation, unknown factory
///   tags, or undecodable values.
pub fn parse_session(data: &[u8], factory: &EngineFactory) -> LogResult<ParsedSession> {
    let mut reader = ByteReader::new(data);

    let version = reader.get_u32()?;
    if version != SESSION_FORMAT_VERSION {
        return Err(LogError::FormatVersionMismatch {
            found: version,
            expected: SESSION_FORMAT_VERSION,
        });
    }

    if reader.get_u32()? != SESSION_MARKER {
        return Err(LogError::ConfigCorrupt(
            "leading marker mismatch".to_string(),
        ));
    }

    let threshold = LogLevel::from_u32(reader.get_u32()?)?;

    // Counts come from untrusted file contents; every record carries at
    // least a 4-byte length prefix, so a count larger than the remaining
    // byte count can never be satisfied. Checked here and never used to
    // reserve memory.
    let export_count = reader.get_u32()? as usize;
    if export_count > reader.remaining() {
        return Err(LogError::ConfigCorrupt(format!(
            "engine count {} exceeds remaining stream size",
            export_count
        )));
    }
    let mut engines: Vec<Arc<dyn LoggerEngine>> = Vec::new();
    for _ in 0..export_count {
        let tag = reader.get_string()?;
        let engine = factory.try_create(&tag).ok_or_else(|| {
            LogError::ConfigCorrupt(format!("unknown engine tag '{}' in session file", tag))
        })?;
        let export = engine.exportable().ok_or_else(|| {
            LogError::ConfigCorrupt(format!("engine tag '{}' is not exportable", tag))
        })?;
        export.import_binary(&mut reader)?;
        engines.push(engine);
    }

    let attached_count = reader.get_u32()? as usize;
    if attached_count > reader.remaining() {
        return Err(LogError::ConfigCorrupt(format!(
            "engine properties count {} exceeds remaining stream size",
            attached_count
        )));
    }
    let mut properties = Vec::new();
    for _ in 0..attached_count {
        let name = reader.get_string()?;
        let formatting_engine = reader.get_string()?;
        let active = reader.get_bool()?;
        properties.push(EngineProperties {
            name,
            formatting_engine,
            active,
        });
    }

    if reader.get_u32()? != SESSION_MARKER {
        return Err(LogError::ConfigCorrupt(
            "trailing marker mismatch".to_string(),
        ));
    }

    Ok(ParsedSession {
        threshold,
        engines,
        properties,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{FileSink, FILE_SINK_TAG};

    fn file_factory() -> EngineFactory {
        let mut factory = EngineFactory::new();
        factory.register_constructor(FILE_SINK_TAG, FileSink::constructor());
        factory
    }

    fn sample_stream() -> Vec<u8> {
        let sink: Arc<dyn LoggerEngine> = Arc::new(FileSink::new("session", "out/session.log"));
        sink.set_active(true);
        let engines = vec![sink];

        let mut buf = Vec::new();
        write_session(&mut buf, LogLevel::Warning, &engines).unwrap();
        buf
    }

    #[test]
    fn test_byte_reader_truncation() {
        let mut reader = ByteReader::new(&[1, 2]);
        assert!(matches!(
            reader.get_u32(),
            Err(LogError::ConfigCorrupt(_))
        ));
    }

    #[test]
    fn test_string_roundtrip() {
        let mut buf = Vec::new();
        put_string(&mut buf, "File").unwrap();
        put_bool(&mut buf, true).unwrap();

        let mut reader = ByteReader::new(&buf);
        assert_eq!(reader.get_string().unwrap(), "File");
        assert!(reader.get_bool().unwrap());
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_session_roundtrip() {
        let buf = sample_stream();
        let parsed = parse_session(&buf, &file_factory()).unwrap();

        assert_eq!(parsed.threshold, LogLevel::Warning);
        assert_eq!(parsed.engines.len(), 1);
        assert_eq!(parsed.engines[0].name(), "session");
        assert_eq!(parsed.properties.len(), 1);
        assert_eq!(
            parsed.properties[0],
            EngineProperties {
                name: "session".to_string(),
                formatting_engine: String::new(),
                active: true,
            }
        );
    }

    #[test]
    fn test_hostile_engine_count_rejected_without_allocation() {
        // A short stream claiming u32::MAX engine records must come back
        // as corrupt data, not attempt to reserve memory for the count.
        let mut buf = Vec::new();
        put_u32(&mut buf, SESSION_FORMAT_VERSION).unwrap();
        put_u32(&mut buf, SESSION_MARKER).unwrap();
        put_u32(&mut buf, LogLevel::Warning as u32).unwrap();
        put_u32(&mut buf, u32::MAX).unwrap();

        let err = parse_session(&buf, &file_factory()).unwrap_err();
        assert!(matches!(err, LogError::ConfigCorrupt(_)));
        assert!(err.to_string().contains("exceeds remaining stream size"));
    }

    #[test]
    fn test_hostile_properties_count_rejected() {
        let mut buf = Vec::new();
        put_u32(&mut buf, SESSION_FORMAT_VERSION).unwrap();
        put_u32(&mut buf, SESSION_MARKER).unwrap();
        put_u32(&mut buf, LogLevel::Warning as u32).unwrap();
        put_u32(&mut buf, 0).unwrap(); // no exportable records
        put_u32(&mut buf, u32::MAX).unwrap();

        let err = parse_session(&buf, &file_factory()).unwrap_err();
        assert!(matches!(err, LogError::ConfigCorrupt(_)));
        assert!(err.to_string().contains("exceeds remaining stream size"));
    }

    #[test]
    fn test_version_mismatch_is_distinct_from_corruption() {
        let mut buf = sample_stream();
        buf[0] = 99;
        assert!(matches!(
            parse_session(&buf, &file_factory()),
            Err(LogError::FormatVersionMismatch {
                found: 99,
                expected: SESSION_FORMAT_VERSION
            })
        ));
    }

    #[test]
    fn test_leading_marker_corruption() {
        let mut buf = sample_stream();
        buf[4] ^= 0xFF;
        assert!(matches!(
            parse_session(&buf, &file_factory()),
            Err(LogError::ConfigCorrupt(_))
        ));
    }

    #[test]
    fn test_trailing_marker_corruption() {
        let mut buf = sample_stream();
        let last = buf.len() - 1;
        buf[last] ^= 0xFF;
        let err = parse_session(&buf, &file_factory()).unwrap_err();
        assert!(matches!(err, LogError::ConfigCorrupt(_)));
        assert!(err.to_string().contains("trailing marker"));
    }

    #[test]
    fn test_truncated_stream_is_corrupt() {
        let buf = sample_stream();
        let truncated = &buf[..buf.len() - 6];
        assert!(matches!(
            parse_session(truncated, &file_factory()),
            Err(LogError::ConfigCorrupt(_))
        ));
    }

    #[test]
    fn test_unknown_tag_is_corrupt_not_panic() {
        let sink: Arc<dyn LoggerEngine> = Arc::new(FileSink::new("session", "out/session.log"));
        let engines = vec![sink];
        let mut buf = Vec::new();
        write_session(&mut buf, LogLevel::Info, &engines).unwrap();

        let empty_factory = EngineFactory::new();
        assert!(matches!(
            parse_session(&buf, &empty_factory),
            Err(LogError::ConfigCorrupt(_))
        ));
    }
}
