//! 日志处理器模块
//!
//! 每个处理器对应一个输出目标：持有自己的写入端、格式和最低级别，
//! 级别过滤在处理器内部完成。

use std::any::Any;
use std::io;

use crate::config::{Format, Level, Record, SinkConfig};
use crate::error::LoggerError;

/// 日志处理器 trait
pub trait LogHandler: Send + Sync + Any {
    /// 处理日志记录，低于阈值的记录直接忽略
    fn handle(&self, record: &Record);

    /// 刷新处理器
    fn flush(&self) -> io::Result<()>;

    /// 刷新并释放写入端，之后的记录被忽略；重复调用无副作用
    fn close(&self) -> io::Result<()>;

    /// 获取处理器类型
    fn handler_type(&self) -> HandlerType;

    /// 最低输出级别
    fn level(&self) -> Level;

    fn format(&self) -> Format;

    /// 输出位置，用于诊断信息
    fn location(&self) -> &str;

    /// 类型安全的向下转型
    fn as_any(&self) -> &dyn Any;

    fn enabled(&self, level: Level) -> bool {
        self.level().admits(level)
    }
}

/// 处理器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerType {
    Terminal,
    File,
    Gzip,
    Custom,
}

pub mod output;
pub mod term;
pub mod file;

pub use output::{Output, expand_home, open_output};
pub use term::TermHandler;
pub use file::FileHandler;

/// 根据配置构建处理器
///
/// 级别和格式先于打开文件校验，校验失败不会留下新建的文件。
pub fn build_handler(config: &SinkConfig) -> Result<Box<dyn LogHandler>, LoggerError> {
    let level: Level = config.level.parse()?;
    let format = Format::from_config_str(&config.format);

    let output = open_output(&config.location)?;
    let handler: Box<dyn LogHandler> = if output.is_stream() {
        Box::new(TermHandler::new(output, level, format))
    } else {
        Box::new(FileHandler::new(&config.location, output, level, format))
    };
    Ok(handler)
}
