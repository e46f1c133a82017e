//! 文件日志处理器

use std::any::Any;
use std::io::{self, Write};

use parking_lot::Mutex;

use crate::config::{Format, Level, Record};
use crate::fmt_impl::format_record;
use crate::handler::{HandlerType, LogHandler, Output};

/// 文件日志处理器，独占文件句柄（或包裹它的 gzip 流）
pub struct FileHandler {
    location: String,
    writer: Mutex<Option<Output>>,
    gzip: bool,
    level: Level,
    format: Format,
}

impl FileHandler {
    /// 创建新的文件处理器，`output` 应为 `open_output` 返回的文件或 gzip 输出
    pub fn new(location: impl Into<String>, output: Output, level: Level, format: Format) -> Self {
        Self {
            location: location.into(),
            gzip: matches!(output, Output::Gzip(_)),
            writer: Mutex::new(Some(output)),
            level,
            format,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.writer.lock().is_none()
    }
}

impl LogHandler for FileHandler {
    fn handle(&self, record: &Record) {
        if !self.enabled(record.level) {
            return;
        }

        let mut buf = Vec::with_capacity(256);
        if let Err(e) = format_record(self.format, &mut buf, record) {
            eprintln!("[file] 格式化失败: {}", e);
            return;
        }

        let mut guard = self.writer.lock();
        if let Some(writer) = guard.as_mut() {
            if let Err(e) = writer.write_all(&buf) {
                eprintln!("[file] 写入 {} 失败: {}", self.location, e);
            }
        }
    }

    fn flush(&self) -> io::Result<()> {
        match self.writer.lock().as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn close(&self) -> io::Result<()> {
        match self.writer.lock().take() {
            Some(writer) => writer.finish(),
            None => Ok(()),
        }
    }

    fn handler_type(&self) -> HandlerType {
        if self.gzip {
            HandlerType::Gzip
        } else {
            HandlerType::File
        }
    }

    fn level(&self) -> Level {
        self.level
    }

    fn format(&self) -> Format {
        self.format
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Drop for FileHandler {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[file] 关闭 {} 失败: {}", self.location, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::open_output;
    use std::io::Read;

    fn open(path: &std::path::Path, level: Level, format: Format) -> FileHandler {
        let location = path.to_str().unwrap();
        FileHandler::new(location, open_output(location).unwrap(), level, format)
    }

    #[test]
    fn test_filters_below_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let handler = open(&path, Level::Warn, Format::Text);

        handler.handle(&Record::new(Level::Info, "quiet"));
        handler.handle(&Record::new(Level::Error, "loud"));
        handler.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("quiet"));
        assert!(content.contains("msg=loud"));
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "previous\n").unwrap();

        let handler = open(&path, Level::Info, Format::Text);
        handler.handle(&Record::new(Level::Info, "next"));
        handler.close().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("previous\n"));
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_gzip_is_finalized_on_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log.gz");
        let handler = open(&path, Level::Info, Format::Json);
        assert_eq!(handler.handler_type(), HandlerType::Gzip);

        handler.handle(&Record::new(Level::Info, "compressed"));
        handler.close().unwrap();
        assert!(handler.is_closed());
        handler.handle(&Record::new(Level::Info, "after close"));

        let mut decoder = flate2::read::GzDecoder::new(std::fs::File::open(&path).unwrap());
        let mut content = String::new();
        decoder.read_to_string(&mut content).unwrap();
        assert!(content.contains("\"msg\":\"compressed\""));
        assert!(!content.contains("after close"));
    }
}
