//! 按级别过滤与分发测试
//!
//! 用记录型处理器观察每个输出目标实际收到的记录

use std::any::Any;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use composite_logger::{
    CompositeLogger, Fields, Format, HandlerType, Level, LogHandler, LoggerBuilder, Record,
};

/// 记录收到的每条日志的处理器
struct RecordingHandler {
    name: String,
    level: Level,
    records: Arc<Mutex<Vec<Record>>>,
}

impl RecordingHandler {
    fn new(name: &str, level: Level) -> (Self, Arc<Mutex<Vec<Record>>>) {
        let records = Arc::new(Mutex::new(Vec::new()));
        let handler = Self {
            name: name.to_string(),
            level,
            records: Arc::clone(&records),
        };
        (handler, records)
    }
}

impl LogHandler for RecordingHandler {
    fn handle(&self, record: &Record) {
        if self.enabled(record.level) {
            self.records.lock().push(record.clone());
        }
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }

    fn close(&self) -> io::Result<()> {
        Ok(())
    }

    fn handler_type(&self) -> HandlerType {
        HandlerType::Custom
    }

    fn level(&self) -> Level {
        self.level
    }

    fn format(&self) -> Format {
        Format::Text
    }

    fn location(&self) -> &str {
        &self.name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[test]
fn test_info_reaches_every_sink_once() {
    let mut logger = CompositeLogger::new();
    let mut all = Vec::new();
    for i in 0..3 {
        let (handler, records) = RecordingHandler::new(&format!("sink-{}", i), Level::Debug);
        logger.add_handler(Box::new(handler));
        all.push(records);
    }

    logger.info("x");

    for records in &all {
        let records = records.lock();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].level, Level::Info);
        assert_eq!(records[0].message, "x");
    }
}

#[test]
fn test_each_sink_applies_its_own_threshold() {
    let (debug_sink, debug_records) = RecordingHandler::new("debug", Level::Debug);
    let (warn_sink, warn_records) = RecordingHandler::new("warn", Level::Warn);
    let (error_sink, error_records) = RecordingHandler::new("error", Level::Error);

    let logger = LoggerBuilder::new()
        .add_handler(Box::new(debug_sink))
        .add_handler(Box::new(warn_sink))
        .add_handler(Box::new(error_sink))
        .build()
        .unwrap();

    logger.debug("d");
    logger.info("i");
    logger.warn("w");
    logger.error("e");

    let messages = |records: &Arc<Mutex<Vec<Record>>>| -> Vec<String> {
        records.lock().iter().map(|r| r.message.clone()).collect()
    };
    assert_eq!(messages(&debug_records), vec!["d", "i", "w", "e"]);
    assert_eq!(messages(&warn_records), vec!["w", "e"]);
    assert_eq!(messages(&error_records), vec!["e"]);
}

#[test]
fn test_fields_are_attached() {
    let (sink, records) = RecordingHandler::new("fields", Level::Info);
    let mut logger = CompositeLogger::new();
    logger.add_handler(Box::new(sink));

    let mut fields = Fields::new();
    fields.insert("request_id".to_string(), json!("abc-123"));
    fields.insert("attempt".to_string(), json!(2));

    logger.info_with_fields("retrying", &fields);
    logger.warn_with_fields("giving up", &fields);

    let records = records.lock();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].level, Level::Info);
    assert_eq!(records[1].level, Level::Warn);
    assert_eq!(records[1].fields, fields);
}

#[test]
fn test_macros_format_arguments() {
    let (sink, records) = RecordingHandler::new("macro", Level::Debug);
    let mut logger = CompositeLogger::new();
    logger.add_handler(Box::new(sink));

    composite_logger::info!(logger, "用户 {} 登录", "alice");
    composite_logger::warn!(logger, "剩余 {} 次", 3);
    composite_logger::error!(logger, "失败");
    composite_logger::debug!(logger, "{:?}", (1, 2));

    let records = records.lock();
    let summary: Vec<_> = records.iter().map(|r| (r.level, r.message.as_str())).collect();
    assert_eq!(
        summary,
        vec![
            (Level::Info, "用户 alice 登录"),
            (Level::Warn, "剩余 3 次"),
            (Level::Error, "失败"),
            (Level::Debug, "(1, 2)"),
        ]
    );
}

#[test]
fn test_downcast_custom_handler() {
    let (sink, _records) = RecordingHandler::new("downcast", Level::Info);
    let mut logger = CompositeLogger::new();
    logger.add_handler(Box::new(sink));

    let handler = &logger.handlers()[0];
    assert_eq!(handler.handler_type(), HandlerType::Custom);
    assert!(handler.as_any().downcast_ref::<RecordingHandler>().is_some());
}
