//! 日志核心模块 - 组合日志器
//!
//! 一次日志调用按插入顺序同步分发给所有处理器，
//! 每个处理器自行决定是否输出以及以何种格式输出。

use std::fmt;
use std::io;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{Fields, Format, Level, Record, SinkConfig};
use crate::error::LoggerError;
use crate::handler::{LogHandler, build_handler};

/// fatal 级别日志的分发策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatalPolicy {
    /// 只写入第一个处理器
    #[default]
    FirstSink,
    /// 写入所有处理器
    AllSinks,
}

/// fatal 日志写出后负责结束进程
pub trait Terminator: Send + Sync {
    fn terminate(&self, code: i32);
}

/// 默认终止器：直接退出进程
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self, code: i32) {
        std::process::exit(code)
    }
}

/// fatal 日志之后的退出码
pub const FATAL_EXIT_CODE: i32 = 1;

/// 组合日志器
///
/// 处理器只能追加，不会删除或重排。组合器本身不加锁，
/// 每个处理器内部用互斥锁保护自己的写入端。
pub struct CompositeLogger {
    handlers: Vec<Box<dyn LogHandler>>,
    fatal_policy: FatalPolicy,
    terminator: Arc<dyn Terminator>,
}

impl CompositeLogger {
    /// 创建没有任何处理器的组合日志器
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
            fatal_policy: FatalPolicy::default(),
            terminator: Arc::new(ProcessExit),
        }
    }

    /// 默认组合：stdout/info/text 和 stderr/warning/text
    pub fn default_logger() -> Result<Self, LoggerError> {
        Self::from_configs(&SinkConfig::defaults())
    }

    /// 按顺序为每个配置构建处理器
    ///
    /// 任意一个失败时，已打开的处理器会先被关闭，再返回该错误。
    pub fn from_configs(configs: &[SinkConfig]) -> Result<Self, LoggerError> {
        let mut logger = Self::new();
        for config in configs {
            if let Err(e) = logger.add_config(config) {
                if let Err(close_err) = logger.close() {
                    eprintln!("[composite] 构建失败后关闭处理器出错: {}", close_err);
                }
                return Err(e);
            }
        }
        Ok(logger)
    }

    /// 追加一个输出目标，失败时处理器数量不变
    pub fn add_sink(&mut self, location: &str, format: &str, level: &str) -> Result<(), LoggerError> {
        self.add_config(&SinkConfig::new(location, level, format))
    }

    pub fn add_config(&mut self, config: &SinkConfig) -> Result<(), LoggerError> {
        let handler = build_handler(config)?;
        self.handlers.push(handler);
        Ok(())
    }

    /// 追加自定义处理器
    pub fn add_handler(&mut self, handler: Box<dyn LogHandler>) {
        self.handlers.push(handler);
    }

    pub fn handlers(&self) -> &[Box<dyn LogHandler>] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn fatal_policy(&self) -> FatalPolicy {
        self.fatal_policy
    }

    pub fn set_fatal_policy(&mut self, policy: FatalPolicy) {
        self.fatal_policy = policy;
    }

    pub fn set_terminator(&mut self, terminator: Arc<dyn Terminator>) {
        self.terminator = terminator;
    }

    /// 把记录分发给所有处理器
    pub fn dispatch(&self, record: &Record) {
        for handler in &self.handlers {
            handler.handle(record);
        }
    }

    pub fn log(&self, level: Level, msg: impl fmt::Display) {
        self.dispatch(&Record::new(level, msg));
    }

    pub fn log_with_fields(&self, level: Level, msg: impl fmt::Display, fields: &Fields) {
        self.dispatch(&Record::new(level, msg).with_fields(fields));
    }

    pub fn debug(&self, msg: impl fmt::Display) {
        self.log(Level::Debug, msg);
    }

    pub fn info(&self, msg: impl fmt::Display) {
        self.log(Level::Info, msg);
    }

    pub fn warn(&self, msg: impl fmt::Display) {
        self.log(Level::Warn, msg);
    }

    pub fn error(&self, msg: impl fmt::Display) {
        self.log(Level::Error, msg);
    }

    pub fn debug_with_fields(&self, msg: impl fmt::Display, fields: &Fields) {
        self.log_with_fields(Level::Debug, msg, fields);
    }

    pub fn info_with_fields(&self, msg: impl fmt::Display, fields: &Fields) {
        self.log_with_fields(Level::Info, msg, fields);
    }

    pub fn warn_with_fields(&self, msg: impl fmt::Display, fields: &Fields) {
        self.log_with_fields(Level::Warn, msg, fields);
    }

    pub fn error_with_fields(&self, msg: impl fmt::Display, fields: &Fields) {
        self.log_with_fields(Level::Error, msg, fields);
    }

    /// 记录 fatal 日志，关闭所有处理器后结束进程
    pub fn fatal(&self, msg: impl fmt::Display) {
        self.fatal_record(Record::new(Level::Fatal, msg));
    }

    pub fn fatal_with_fields(&self, msg: impl fmt::Display, fields: &Fields) {
        self.fatal_record(Record::new(Level::Fatal, msg).with_fields(fields));
    }

    fn fatal_record(&self, record: Record) {
        match self.fatal_policy {
            FatalPolicy::FirstSink => {
                if let Some(handler) = self.handlers.first() {
                    handler.handle(&record);
                }
            }
            FatalPolicy::AllSinks => self.dispatch(&record),
        }

        // 进程退出不会运行析构，gzip 尾部必须在这里写完
        if let Err(e) = self.close() {
            eprintln!("[composite] fatal 前关闭处理器出错: {}", e);
        }
        self.terminator.terminate(FATAL_EXIT_CODE);
    }

    /// 刷新所有处理器，返回遇到的第一个错误
    pub fn flush(&self) -> Result<(), LoggerError> {
        self.for_each_handler(|handler| handler.flush())
    }

    /// 刷新并关闭所有处理器；之后的日志被忽略，重复调用无副作用
    pub fn close(&self) -> Result<(), LoggerError> {
        self.for_each_handler(|handler| handler.close())
    }

    fn for_each_handler<F>(&self, op: F) -> Result<(), LoggerError>
    where
        F: Fn(&dyn LogHandler) -> io::Result<()>,
    {
        let mut first_err = None;
        for handler in &self.handlers {
            if let Err(e) = op(handler.as_ref()) {
                eprintln!("[composite] 处理器 {} 出错: {}", handler.location(), e);
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(LoggerError::Io(e)),
            None => Ok(()),
        }
    }
}

impl Default for CompositeLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CompositeLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeLogger")
            .field(
                "sinks",
                &self
                    .handlers
                    .iter()
                    .map(|h| (h.location().to_string(), h.level(), h.format()))
                    .collect::<Vec<_>>(),
            )
            .field("fatal_policy", &self.fatal_policy)
            .finish()
    }
}

impl Drop for CompositeLogger {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

enum PendingSink {
    Config(SinkConfig),
    Handler(Box<dyn LogHandler>),
}

/// 组合日志器构建器
pub struct LoggerBuilder {
    sinks: Vec<PendingSink>,
    fatal_policy: FatalPolicy,
    terminator: Arc<dyn Terminator>,
}

impl LoggerBuilder {
    /// 创建新的日志构建器
    pub fn new() -> Self {
        Self {
            sinks: Vec::new(),
            fatal_policy: FatalPolicy::default(),
            terminator: Arc::new(ProcessExit),
        }
    }

    pub fn add_sink(mut self, config: SinkConfig) -> Self {
        self.sinks.push(PendingSink::Config(config));
        self
    }

    /// 添加终端输出（stdout）
    pub fn add_stdout(self, level: Level, format: Format) -> Self {
        self.add_sink(SinkConfig::new("stdout", level.as_str(), format.as_str()))
    }

    /// 添加终端输出（stderr）
    pub fn add_stderr(self, level: Level, format: Format) -> Self {
        self.add_sink(SinkConfig::new("stderr", level.as_str(), format.as_str()))
    }

    /// 添加文件输出，路径以 `.gz` 结尾时压缩
    pub fn add_file(self, path: impl Into<String>, level: Level, format: Format) -> Self {
        self.add_sink(SinkConfig::new(path, level.as_str(), format.as_str()))
    }

    pub fn add_handler(mut self, handler: Box<dyn LogHandler>) -> Self {
        self.sinks.push(PendingSink::Handler(handler));
        self
    }

    pub fn with_fatal_policy(mut self, policy: FatalPolicy) -> Self {
        self.fatal_policy = policy;
        self
    }

    pub fn with_terminator(mut self, terminator: Arc<dyn Terminator>) -> Self {
        self.terminator = terminator;
        self
    }

    /// 构建日志器，出错时已打开的处理器会被关闭
    pub fn build(self) -> Result<CompositeLogger, LoggerError> {
        let mut logger = CompositeLogger::new();
        logger.set_fatal_policy(self.fatal_policy);
        logger.set_terminator(self.terminator);

        for sink in self.sinks {
            match sink {
                PendingSink::Config(config) => {
                    if let Err(e) = logger.add_config(&config) {
                        if let Err(close_err) = logger.close() {
                            eprintln!("[composite] 构建失败后关闭处理器出错: {}", close_err);
                        }
                        return Err(e);
                    }
                }
                PendingSink::Handler(handler) => logger.add_handler(handler),
            }
        }
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
