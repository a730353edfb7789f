//! File sink engine, constructible through the factory and exportable.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::error::{LogError, LogResult};
use crate::factory::EngineConstructor;
use crate::level::LogLevel;
use crate::session::{put_string, ByteReader};

use super::{EngineCommon, ExportableEngine, LoggerEngine};

/// Factory tag under which the file sink is registered.
pub const FILE_SINK_TAG: &str = "File";

/// Appends rendered messages to a log file, one per line. Each write is
/// flushed so sink output survives an abrupt process exit.
pub struct FileSink {
    common: EngineCommon,
    path: RwLock<PathBuf>,
    writer: Mutex<Option<BufWriter<File>>>,
}

impl FileSink {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            common: EngineCommon::new(name),
            path: RwLock::new(path.into()),
            writer: Mutex::new(None),
        }
    }

    /// An unconfigured instance as produced by the factory; the path is
    /// filled in by `import_binary` or `set_path` before `initialize`.
    pub fn empty() -> Self {
        Self::new(FILE_SINK_TAG, PathBuf::new())
    }

    /// Constructor for registration with the engine factory.
    pub fn constructor() -> EngineConstructor {
        Box::new(|| {
            let engine: Arc<dyn LoggerEngine> = Arc::new(FileSink::empty());
            engine
        })
    }

    pub fn path(&self) -> PathBuf {
        self.path.read().clone()
    }

    pub fn set_path(&self, path: impl Into<PathBuf>) {
        *self.path.write() = path.into();
    }
}

impl LoggerEngine for FileSink {
    fn common(&self) -> &EngineCommon {
        &self.common
    }

    fn initialize(&self) -> LogResult<()> {
        let path = self.path();
        if path.as_os_str().is_empty() {
            return Err(LogError::EngineInitFailed(format!(
                "file sink '{}' has no file path configured",
                self.name()
            )));
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        *self.writer.lock() = Some(BufWriter::new(file));
        Ok(())
    }

    fn emit(&self, _level: LogLevel, rendered: &str) {
        let mut guard = self.writer.lock();
        if let Some(writer) = guard.as_mut() {
            // Output errors must not take down the dispatch path.
            let _ = writeln!(writer, "{}", rendered);
            let _ = writer.flush();
        }
    }

    fn exportable(&self) -> Option<&dyn ExportableEngine> {
        Some(self)
    }
}

impl ExportableEngine for FileSink {
    fn factory_tag(&self) -> &str {
        FILE_SINK_TAG
    }

    fn export_binary(&self, writer: &mut dyn Write) -> LogResult<()> {
        put_string(writer, &self.name())?;
        put_string(writer, &self.path().to_string_lossy())?;
        Ok(())
    }

    fn import_binary(&self, reader: &mut ByteReader<'_>) -> LogResult<()> {
        let name = reader.get_string()?;
        let path = reader.get_string()?;
        self.common.set_name(name);
        self.set_path(Path::new(&path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_fails_without_path() {
        let sink = FileSink::empty();
        assert!(matches!(
            sink.initialize(),
            Err(LogError::EngineInitFailed(_))
        ));
    }

    #[test]
    fn test_emit_appends_lines() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.log");

        let sink = FileSink::new("session", &path);
        sink.initialize().unwrap();
        sink.emit(LogLevel::Info, "first line");
        sink.emit(LogLevel::Error, "second line");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines, vec!["first line", "second line"]);
    }

    #[test]
    fn test_initialize_creates_parent_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/session.log");

        let sink = FileSink::new("session", &path);
        sink.initialize().unwrap();
        assert!(path.parent().unwrap().exists());
    }

    #[test]
    fn test_export_import_roundtrip() {
        let sink = FileSink::new("session", "out/session.log");

        let mut buf = Vec::new();
        sink.export_binary(&mut buf).unwrap();

        let restored = FileSink::empty();
        let mut reader = ByteReader::new(&buf);
        restored.import_binary(&mut reader).unwrap();

        assert_eq!(restored.name(), "session");
        assert_eq!(restored.path(), PathBuf::from("out/session.log"));
        assert_eq!(reader.remaining(), 0);
    }
}
