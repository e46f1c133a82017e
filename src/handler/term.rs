//! 终端日志处理器

use std::any::Any;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::config::{Format, Level, Record};
use crate::fmt_impl::format_record;
use crate::handler::{HandlerType, LogHandler, Output};

/// 写入 stdout 或 stderr 的处理器
///
/// 进程标准流不归处理器所有：`close` 只刷新，之后的记录被忽略。
pub struct TermHandler {
    output: Mutex<Output>,
    location: &'static str,
    level: Level,
    format: Format,
    closed: AtomicBool,
}

impl TermHandler {
    pub fn new(output: Output, level: Level, format: Format) -> Self {
        let location = match output {
            Output::Stderr => "stderr",
            _ => "stdout",
        };
        Self {
            output: Mutex::new(output),
            location,
            level,
            format,
            closed: AtomicBool::new(false),
        }
    }

    pub fn stdout(level: Level, format: Format) -> Self {
        Self::new(Output::Stdout, level, format)
    }

    pub fn stderr(level: Level, format: Format) -> Self {
        Self::new(Output::Stderr, level, format)
    }
}

impl LogHandler for TermHandler {
    fn handle(&self, record: &Record) {
        if !self.enabled(record.level) || self.closed.load(Ordering::Acquire) {
            return;
        }

        let mut buf = Vec::with_capacity(128);
        if let Err(e) = format_record(self.format, &mut buf, record) {
            eprintln!("[term] 格式化失败: {}", e);
            return;
        }

        if let Err(e) = self.output.lock().write_all(&buf) {
            eprintln!("[term] 写入 {} 失败: {}", self.location, e);
        }
    }

    fn flush(&self) -> io::Result<()> {
        self.output.lock().flush()
    }

    fn close(&self) -> io::Result<()> {
        self.closed.store(true, Ordering::Release);
        self.flush()
    }

    fn handler_type(&self) -> HandlerType {
        HandlerType::Terminal
    }

    fn level(&self) -> Level {
        self.level
    }

    fn format(&self) -> Format {
        self.format
    }

    fn location(&self) -> &str {
        self.location
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
