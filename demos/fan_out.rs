//! 扇出日志示例
//!
//! 用法：`cargo run --example fan_out [config.json]`
//! 未提供配置文件时使用内置配置：stdout(text) + stderr(warning) + /tmp 下的 gzip 文件

use std::sync::Arc;

use composite_logger::{Fields, LoggerConfig, LoggerError, ProcessExit};

const BUILTIN_CONFIG: &str = r#"{
    "sinks": [
        {"location": "stdout", "level": "info", "format": "text"},
        {"location": "stderr", "level": "warning", "format": "json"},
        {"location": "/tmp/composite_logger_demo.log.gz", "level": "debug", "format": "json"}
    ],
    "fatal_policy": "all_sinks"
}"#;

fn main() -> Result<(), LoggerError> {
    let config = match std::env::args().nth(1) {
        Some(path) => LoggerConfig::from_file(path)?,
        None => LoggerConfig::from_json_str(BUILTIN_CONFIG)?,
    };

    let mut logger = config.build()?;
    logger.set_terminator(Arc::new(ProcessExit));
    println!("已配置 {} 个输出目标: {:?}\n", logger.len(), logger);

    logger.debug("只会写入 gzip 文件");
    logger.info("服务启动");

    let mut fields = Fields::new();
    fields.insert("pool".to_string(), "primary".into());
    fields.insert("available".to_string(), 2.into());
    logger.warn_with_fields("连接池即将耗尽", &fields);

    composite_logger::error!(logger, "第 {} 次重试失败", 3);

    logger.close()?;
    println!("\n日志已写入，查看: zcat /tmp/composite_logger_demo.log.gz");
    Ok(())
}
