//! 配置模块

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{CompositeLogger, FatalPolicy};
use crate::error::LoggerError;

/// 日志级别，按严重程度从低到高排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Panic,
}

impl Level {
    /// 所有级别，从低到高
    pub const ALL: [Level; 7] = [
        Level::Trace,
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
        Level::Panic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warning",
            Level::Error => "error",
            Level::Fatal => "fatal",
            Level::Panic => "panic",
        }
    }

    /// 阈值为 `self` 的输出目标是否接收 `level` 级别的记录
    pub fn admits(&self, level: Level) -> bool {
        level >= *self
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    /// 不区分大小写；`warn` 与 `warning` 等价
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Level::Trace),
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            "fatal" => Ok(Level::Fatal),
            "panic" => Ok(Level::Panic),
            _ => Err(LoggerError::InvalidLevel(s.to_string())),
        }
    }
}

impl Serialize for Level {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Level {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl Format {
    /// 只有精确的 `"json"` 选择 JSON，其余一律回退为文本格式
    pub fn from_config_str(s: &str) -> Self {
        if s == "json" {
            Format::Json
        } else {
            Format::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个输出目标的配置
///
/// 三个字段都保持为字符串，与配置文件中的形式一致；
/// 级别和格式在构建输出目标时才解析，解析后不再重新解释。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkConfig {
    /// `stdout`、`stderr` 或文件路径（可以 `~/` 开头，以 `.gz` 结尾时启用压缩）
    pub location: String,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

impl SinkConfig {
    pub fn new(
        location: impl Into<String>,
        level: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            level: level.into(),
            format: format.into(),
        }
    }

    /// 默认配置：stdout/info/text 与 stderr/warning/text
    pub fn defaults() -> Vec<SinkConfig> {
        vec![
            SinkConfig::new("stdout", "info", "text"),
            SinkConfig::new("stderr", "warning", "text"),
        ]
    }
}

/// 整个组合日志器的配置，通常从 JSON 文件读取
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggerConfig {
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
    #[serde(default)]
    pub fatal_policy: FatalPolicy,
}

impl LoggerConfig {
    pub fn from_json_str(s: &str) -> Result<Self, LoggerError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoggerError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// 按配置顺序构建组合日志器
    pub fn build(&self) -> Result<CompositeLogger, LoggerError> {
        let mut logger = CompositeLogger::from_configs(&self.sinks)?;
        logger.set_fatal_policy(self.fatal_policy);
        Ok(logger)
    }
}

/// 附加字段，按键排序输出
pub type Fields = BTreeMap<String, serde_json::Value>;

/// 日志记录
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    pub message: String,
    pub fields: Fields,
    pub time: DateTime<Local>,
}

impl Record {
    pub fn new(level: Level, message: impl fmt::Display) -> Self {
        Self {
            level,
            message: message.to_string(),
            fields: Fields::new(),
            time: Local::now(),
        }
    }

    pub fn with_fields(mut self, fields: &Fields) -> Self {
        self.fields = fields.clone();
        self
    }
}
