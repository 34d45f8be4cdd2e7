//! Shared file writer for the file log layer.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::FileConfig;

/// Appends or truncates the configured file once, then serializes writes.
#[derive(Clone)]
pub(crate) struct FileWriter {
    file: Arc<Mutex<File>>,
}

impl FileWriter {
    pub fn open(config: &FileConfig) -> io::Result<Self> {
        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if config.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }

        Ok(Self {
            file: Arc::new(Mutex::new(options.open(&config.path)?)),
        })
    }
}

impl Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush()
    }
}

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogFormat;
    use tempfile::TempDir;

    fn config(dir: &TempDir, append: bool) -> FileConfig {
        FileConfig {
            enabled: true,
            path: dir.path().join("nested").join("app.log"),
            append,
            format: LogFormat::Full,
        }
    }

    #[test]
    fn test_creates_parent_and_appends() {
        let dir = TempDir::new().unwrap();

        let mut writer = FileWriter::open(&config(&dir, true)).unwrap();
        writer.write_all(b"first\n").unwrap();
        let writer = FileWriter::open(&config(&dir, true)).unwrap();
        writer.make_writer().write_all(b"second\n").unwrap();

        let content = std::fs::read_to_string(dir.path().join("nested/app.log")).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_truncates_when_not_appending() {
        let dir = TempDir::new().unwrap();

        FileWriter::open(&config(&dir, true))
            .unwrap()
            .write_all(b"stale\n")
            .unwrap();
        FileWriter::open(&config(&dir, false))
            .unwrap()
            .write_all(b"fresh\n")
            .unwrap();

        let content = std::fs::read_to_string(dir.path().join("nested/app.log")).unwrap();
        assert_eq!(content, "fresh\n");
    }
}
