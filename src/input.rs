// 该文件是 Chicun （尺寸） 项目的一部分。
// src/input.rs - 请求输入源
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{
  fs::File,
  io::{BufRead, BufReader, Read},
  marker::PhantomData,
  path::PathBuf,
};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, warn};
use url::Url;

use crate::FromUrl;

#[cfg(feature = "read_depth_image")]
mod depth_image;
#[cfg(feature = "read_depth_image")]
pub use self::depth_image::{DepthImageInput, DepthImageInputError};

const FILE_SCHEME: &str = "file";
const STDIN_SCHEME: &str = "stdin";

#[derive(Error, Debug)]
pub enum SourceError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("请求解析错误: {0}")]
  ParseError(#[from] serde_json::Error),
  #[error("第 {line} 行请求无效: {source}")]
  InvalidLine {
    line: usize,
    source: serde_json::Error,
  },
}

/// JSON 请求来源，`file:///path.json` 或 `stdin:`
#[derive(Debug, Clone, PartialEq)]
pub enum RequestSource {
  File(PathBuf),
  Stdin,
}

impl FromUrl for RequestSource {
  type Error = SourceError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      FILE_SCHEME => Ok(RequestSource::File(PathBuf::from(url.path()))),
      STDIN_SCHEME => Ok(RequestSource::Stdin),
      other => {
        error!("不支持的输入方案: {}", other);
        Err(SourceError::SchemeMismatch(other.to_string()))
      }
    }
  }
}

impl RequestSource {
  fn open(&self) -> Result<Box<dyn BufRead>, SourceError> {
    match self {
      RequestSource::File(path) => {
        debug!("打开请求文件: {}", path.display());
        Ok(Box::new(BufReader::new(File::open(path)?)))
      }
      RequestSource::Stdin => Ok(Box::new(BufReader::new(std::io::stdin()))),
    }
  }

  /// 整个输入作为单个 JSON 请求
  pub fn read_one<T: DeserializeOwned>(&self) -> Result<T, SourceError> {
    let mut content = String::new();
    self.open()?.read_to_string(&mut content)?;
    debug!("读取请求 {} 字节", content.len());
    Ok(serde_json::from_str(&content)?)
  }

  /// 每行一个 JSON 请求
  pub fn into_lines<T: DeserializeOwned>(self) -> Result<RequestLines<T>, SourceError> {
    Ok(RequestLines {
      reader: self.open()?,
      line_number: 0,
      done: false,
      _marker: PhantomData,
    })
  }
}

/// 逐行读取请求，跳过空行
///
/// 每个非空行产生一项：解析成功为请求，失败为 `SourceError::InvalidLine`。
/// 非 UTF-8 字节按替换字符解码，因而只影响所在行。
/// 读取出错时产生一次 `SourceError::IoError` 后结束。
pub struct RequestLines<T> {
  reader: Box<dyn BufRead>,
  line_number: usize,
  done: bool,
  _marker: PhantomData<T>,
}

impl<T> RequestLines<T> {
  pub fn from_reader<R: BufRead + 'static>(reader: R) -> Self {
    Self {
      reader: Box::new(reader),
      line_number: 0,
      done: false,
      _marker: PhantomData,
    }
  }
}

impl<T: DeserializeOwned> Iterator for RequestLines<T> {
  type Item = Result<T, SourceError>;

  fn next(&mut self) -> Option<Self::Item> {
    if self.done {
      return None;
    }
    let mut buf = Vec::new();
    loop {
      buf.clear();
      match self.reader.read_until(b'\n', &mut buf) {
        Ok(0) => return None,
        Ok(_) => {}
        Err(e) => {
          error!("读取第 {} 行失败: {}", self.line_number + 1, e);
          self.done = true;
          return Some(Err(e.into()));
        }
      }
      self.line_number += 1;

      let line = String::from_utf8_lossy(&buf);
      let trimmed = line.trim();
      if trimmed.is_empty() {
        continue;
      }
      let line_number = self.line_number;
      return Some(serde_json::from_str(trimmed).map_err(|source| {
        warn!("第 {} 行请求无效: {}", line_number, source);
        SourceError::InvalidLine {
          line: line_number,
          source,
        }
      }));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::HealthStatus;

  #[test]
  fn test_source_schemes() {
    let url = Url::parse("file:///tmp/request.json").unwrap();
    assert_eq!(
      RequestSource::from_url(&url).unwrap(),
      RequestSource::File(PathBuf::from("/tmp/request.json"))
    );
    let url = Url::parse("stdin:").unwrap();
    assert_eq!(RequestSource::from_url(&url).unwrap(), RequestSource::Stdin);
    let url = Url::parse("http://localhost/").unwrap();
    assert!(matches!(
      RequestSource::from_url(&url),
      Err(SourceError::SchemeMismatch(_))
    ));
  }

  #[test]
  fn test_read_one_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("request.json");
    std::fs::write(&path, r#"{"status": "healthy"}"#).unwrap();
    let status: HealthStatus = RequestSource::File(path).read_one().unwrap();
    assert_eq!(status.status, "healthy");
  }

  fn statuses(data: &[u8]) -> Vec<Result<String, SourceError>> {
    RequestLines::<HealthStatus>::from_reader(std::io::Cursor::new(data.to_vec()))
      .map(|item| item.map(|s| s.status))
      .collect()
  }

  #[test]
  fn test_lines_report_invalid() {
    let items = statuses(b"{\"status\": \"a\"}\n\nnot json\n{\"status\": \"b\"}\n");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap(), "a");
    // 空行不计入请求，但计入行号
    assert!(matches!(
      items[1],
      Err(SourceError::InvalidLine { line: 3, .. })
    ));
    assert_eq!(items[2].as_ref().unwrap(), "b");
  }

  #[test]
  fn test_lines_invalid_utf8_only_fails_its_line() {
    let items = statuses(b"{}\n\xff\xfe\n{\"status\": \"c\"}\n{\"status\": \"d\"}");
    assert_eq!(items.len(), 4);
    // `{}` 缺少 status 字段
    assert!(matches!(
      items[0],
      Err(SourceError::InvalidLine { line: 1, .. })
    ));
    assert!(matches!(
      items[1],
      Err(SourceError::InvalidLine { line: 2, .. })
    ));
    assert_eq!(items[2].as_ref().unwrap(), "c");
    assert_eq!(items[3].as_ref().unwrap(), "d");
  }

  struct FailingReader;

  impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
      Err(std::io::Error::other("设备已断开"))
    }
  }

  #[test]
  fn test_lines_read_error_is_reported_once() {
    let mut lines = RequestLines::<HealthStatus>::from_reader(BufReader::new(FailingReader));
    assert!(matches!(lines.next(), Some(Err(SourceError::IoError(_)))));
    assert!(lines.next().is_none());
  }
}
