//! 错误类型

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 构建或关闭组合日志器时可能出现的错误
#[derive(Debug, Error)]
pub enum LoggerError {
    /// 无法展开 `~` 家目录
    #[error("无法展开路径 {location} 中的家目录")]
    PathResolution { location: String },

    /// 打开日志文件失败（权限、父目录不存在、磁盘已满等）
    #[error("无法打开日志文件 {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("无效的日志级别: {0:?}")]
    InvalidLevel(String),

    #[error("配置解析失败: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
}
