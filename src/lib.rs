//! composite_logger - 扇出式日志库
//!
//! 把多个独立的输出目标（stdout、stderr、普通文件、gzip 文件）组合在一起，
//! 一次日志调用按各自的级别和格式写入所有目标。
//!
//! ```no_run
//! use composite_logger::{CompositeLogger, Fields};
//!
//! let mut logger = CompositeLogger::default_logger()?;
//! logger.add_sink("~/logs/app.log.gz", "json", "debug")?;
//!
//! let mut fields = Fields::new();
//! fields.insert("port".to_string(), 8080.into());
//! logger.info_with_fields("服务已启动", &fields);
//! composite_logger::warn!(logger, "连接池剩余 {} 个连接", 2);
//!
//! logger.close()?;
//! # Ok::<(), composite_logger::LoggerError>(())
//! ```

pub mod core;
pub mod handler;
pub mod config;
pub mod error;
pub mod fmt_impl;

// 重新导出主要类型
pub use crate::core::{CompositeLogger, FatalPolicy, LoggerBuilder, ProcessExit, Terminator};
pub use handler::{LogHandler, HandlerType, term::TermHandler, file::FileHandler};
pub use config::{Fields, Format, Level, LoggerConfig, Record, SinkConfig};
pub use error::LoggerError;

// 日志宏，第一个参数为日志器
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => ($logger.fatal(format_args!($($arg)+)));
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => ($crate::__private_log!($logger, $crate::Level::Error, $($arg)+));
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => ($crate::__private_log!($logger, $crate::Level::Warn, $($arg)+));
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => ($crate::__private_log!($logger, $crate::Level::Info, $($arg)+));
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => ($crate::__private_log!($logger, $crate::Level::Debug, $($arg)+));
}

#[macro_export]
#[doc(hidden)]
macro_rules! __private_log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log($level, format_args!($($arg)+))
    };
}

// 便捷构建函数
pub fn default_logger() -> Result<CompositeLogger, LoggerError> {
    CompositeLogger::default_logger()
}

pub fn from_configs(configs: &[SinkConfig]) -> Result<CompositeLogger, LoggerError> {
    CompositeLogger::from_configs(configs)
}
