//! 日志记录格式化
//!
//! 文本格式为 `key=value` 风格的单行记录：
//!
//! ```text
//! time="2024-05-01T10:00:00+08:00" level=info msg="服务已启动" port=8080
//! ```
//!
//! JSON 格式每条记录一行，字段与 `time`、`level`、`msg` 同级：
//!
//! ```text
//! {"level":"info","msg":"服务已启动","port":8080,"time":"2024-05-01T10:00:00+08:00"}
//! ```

use std::io::{self, Write};

use chrono::SecondsFormat;
use serde_json::{Map, Value};

use crate::config::{Format, Record};

const TIME_KEY: &str = "time";
const LEVEL_KEY: &str = "level";
const MSG_KEY: &str = "msg";

/// 按指定格式写出一条记录（包含结尾换行）
pub fn format_record(format: Format, buf: &mut dyn Write, record: &Record) -> io::Result<()> {
    match format {
        Format::Text => text_format(buf, record),
        Format::Json => json_format(buf, record),
    }
}

/// 文本格式化函数
pub fn text_format(buf: &mut dyn Write, record: &Record) -> io::Result<()> {
    let timestamp = record.time.to_rfc3339_opts(SecondsFormat::Secs, false);

    write!(
        buf,
        "{}={} {}={} {}={}",
        TIME_KEY,
        quote_if_needed(&timestamp),
        LEVEL_KEY,
        record.level,
        MSG_KEY,
        quote_if_needed(&record.message)
    )?;

    for (key, value) in &record.fields {
        let rendered = match value {
            Value::String(s) => quote_if_needed(s),
            other => quote_if_needed(&other.to_string()),
        };
        write!(buf, " {}={}", key, rendered)?;
    }

    writeln!(buf)
}

/// JSON 格式化函数
pub fn json_format(buf: &mut dyn Write, record: &Record) -> io::Result<()> {
    let mut object = Map::new();

    // 与保留键冲突的字段改名为 fields.<key>
    for (key, value) in &record.fields {
        let key = match key.as_str() {
            TIME_KEY | LEVEL_KEY | MSG_KEY => format!("fields.{}", key),
            _ => key.clone(),
        };
        object.insert(key, value.clone());
    }

    object.insert(
        TIME_KEY.to_string(),
        Value::String(record.time.to_rfc3339_opts(SecondsFormat::Secs, false)),
    );
    object.insert(LEVEL_KEY.to_string(), Value::String(record.level.to_string()));
    object.insert(MSG_KEY.to_string(), Value::String(record.message.clone()));

    serde_json::to_writer(&mut *buf, &Value::Object(object)).map_err(io::Error::from)?;
    writeln!(buf)
}

fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || !s.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+')
        })
}

fn quote_if_needed(s: &str) -> String {
    if needs_quoting(s) {
        format!("{:?}", s)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Fields, Level};
    use serde_json::json;

    fn render(format: Format, record: &Record) -> String {
        let mut buf = Vec::new();
        format_record(format, &mut buf, record).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_text_format_plain_message() {
        let record = Record::new(Level::Info, "started");
        let line = render(Format::Text, &record);

        assert!(line.starts_with("time=\""));
        assert!(line.contains(" level=info msg=started"));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn test_text_format_quotes_and_fields() {
        let mut fields = Fields::new();
        fields.insert("user".to_string(), json!("alice"));
        fields.insert("path".to_string(), json!("/var/log app"));
        fields.insert("port".to_string(), json!(8080));
        let record = Record::new(Level::Warn, "disk almost full").with_fields(&fields);

        let line = render(Format::Text, &record);
        assert!(line.contains("level=warning msg=\"disk almost full\""));
        assert!(line.trim_end().ends_with("path=\"/var/log app\" port=8080 user=alice"));
    }

    #[test]
    fn test_text_format_empty_message_is_quoted() {
        let record = Record::new(Level::Error, "");
        assert!(render(Format::Text, &record).contains("msg=\"\""));
    }

    #[test]
    fn test_json_format_includes_fields() {
        let mut fields = Fields::new();
        fields.insert("port".to_string(), json!(8080));
        let record = Record::new(Level::Info, "listening").with_fields(&fields);

        let line = render(Format::Json, &record);
        let value: Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["level"], "info");
        assert_eq!(value["msg"], "listening");
        assert_eq!(value["port"], 8080);
        assert!(value["time"].is_string());
    }

    #[test]
    fn test_json_format_renames_clashing_fields() {
        let mut fields = Fields::new();
        fields.insert("msg".to_string(), json!("shadow"));
        fields.insert("level".to_string(), json!(3));
        let record = Record::new(Level::Debug, "real").with_fields(&fields);

        let line = render(Format::Json, &record);
        let value: Value = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(value["msg"], "real");
        assert_eq!(value["level"], "debug");
        assert_eq!(value["fields.msg"], "shadow");
        assert_eq!(value["fields.level"], 3);
    }
}
