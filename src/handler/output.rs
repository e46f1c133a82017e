//! 输出位置解析

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::error::LoggerError;

/// 解析后的字节输出目标
pub enum Output {
    /// 进程标准输出，不归日志器所有，永不关闭
    Stdout,
    /// 进程标准错误，不归日志器所有，永不关闭
    Stderr,
    File(File),
    /// 包裹文件句柄的 gzip 压缩流
    Gzip(GzEncoder<File>),
}

impl Output {
    pub fn is_stream(&self) -> bool {
        matches!(self, Output::Stdout | Output::Stderr)
    }

    /// 刷新并释放底层资源
    ///
    /// gzip 输出先写完压缩尾部再同步文件，否则归档会被截断。
    pub fn finish(self) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().flush(),
            Output::Stderr => io::stderr().flush(),
            Output::File(mut file) => file.flush(),
            Output::Gzip(encoder) => {
                let mut file = encoder.finish()?;
                file.flush()
            }
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout => io::stdout().write(buf),
            Output::Stderr => io::stderr().write(buf),
            Output::File(file) => file.write(buf),
            Output::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        // 整行一次写入，避免与其他线程的输出交错
        match self {
            Output::Stdout => io::stdout().lock().write_all(buf),
            Output::Stderr => io::stderr().lock().write_all(buf),
            Output::File(file) => file.write_all(buf),
            Output::Gzip(encoder) => encoder.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout => io::stdout().flush(),
            Output::Stderr => io::stderr().flush(),
            Output::File(file) => file.flush(),
            Output::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// 展开开头的 `~`（`~` 或 `~/...`）为当前用户的家目录
///
/// 不支持 `~user` 形式。
pub fn expand_home(location: &str) -> Result<PathBuf, LoggerError> {
    if !location.starts_with('~') {
        return Ok(PathBuf::from(location));
    }

    let rest = &location[1..];
    if !rest.is_empty() && !rest.starts_with('/') && !rest.starts_with('\\') {
        return Err(LoggerError::PathResolution {
            location: location.to_string(),
        });
    }

    let home = dirs::home_dir().ok_or_else(|| LoggerError::PathResolution {
        location: location.to_string(),
    })?;

    let rest = rest.trim_start_matches(['/', '\\']);
    if rest.is_empty() {
        Ok(home)
    } else {
        Ok(home.join(rest))
    }
}

/// 把位置字符串解析为可写的输出目标
///
/// `stdout` 和 `stderr` 是保留字；其余按文件路径处理，以追加方式打开，
/// 不存在时创建（权限 0644），文件名以 `.gz` 结尾时包裹 gzip 压缩流。
pub fn open_output(location: &str) -> Result<Output, LoggerError> {
    match location {
        "stdout" => return Ok(Output::Stdout),
        "stderr" => return Ok(Output::Stderr),
        _ => {}
    }

    let path = expand_home(location)?;
    let file = open_append(&path).map_err(|source| LoggerError::FileOpen {
        path: path.clone(),
        source,
    })?;

    if is_gzip_path(&path) {
        Ok(Output::Gzip(GzEncoder::new(file, Compression::default())))
    } else {
        Ok(Output::File(file))
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }

    options.open(path)
}

fn is_gzip_path(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".gz"))
}
