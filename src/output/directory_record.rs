// 该文件是 Chicun （尺寸） 项目的一部分。
// src/output/directory_record.rs - 按日期目录记录结果
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

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use chrono::{Datelike, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::{FromUrl, FromUrlWithScheme, api::ErrorResponse, output::Render};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct Record<'a, Req, Res> {
  request: &'a Req,
  result: &'a Res,
}

/// 记录写到 `<目录>/YYYY/MM/DD/HH-MM-SS-XXXX.json`，XXXX 为十六进制序号
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  record_counter: Mutex<u16>,
  with_request: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let with_request = uri.query_pairs().any(|(k, _)| k == "request");

    Ok(DirectoryRecordOutput {
      directory: PathBuf::from(uri.path()),
      record_counter: Mutex::new(0),
      with_request,
    })
  }
}

impl DirectoryRecordOutput {
  fn record_id(&self) -> u16 {
    let mut counter = self
      .record_counter
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    let id = counter.wrapping_add(1);
    *counter = id;
    id
  }

  fn record_path(&self) -> Result<PathBuf, DirectoryRecordOutputError> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    if !directory.exists() {
      std::fs::create_dir_all(&directory)?;
    }

    Ok(directory.join(format!(
      "{}-{:04X}.json",
      now.format("%H-%M-%S"),
      self.record_id()
    )))
  }

  fn save<T: Serialize>(&self, value: &T) -> Result<(), DirectoryRecordOutputError> {
    let path = self.record_path()?;
    std::fs::write(&path, serde_json::to_vec_pretty(value)?)?;
    debug!("结果已记录: {}", path.display());
    Ok(())
  }
}

impl<Req: Serialize, Res: Serialize> Render<Req, Res> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, request: &Req, result: &Res) -> Result<(), Self::Error> {
    if self.with_request {
      self.save(&Record { request, result })
    } else {
      self.save(result)
    }
  }

  fn render_error(&self, error: &ErrorResponse) -> Result<(), Self::Error> {
    self.save(error)
  }
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::*;
  use crate::api::{HealthStatus, health};

  fn records(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
      for entry in std::fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
          stack.push(path);
        } else {
          found.push(path);
        }
      }
    }
    found.sort();
    found
  }

  #[test]
  fn test_dated_records() {
    let dir = tempfile::tempdir().unwrap();
    let url = url::Url::parse(&format!("folder://{}", dir.path().display())).unwrap();
    let output = DirectoryRecordOutput::from_url(&url).unwrap();

    output.render_result(&(), &health()).unwrap();
    Render::<(), HealthStatus>::render_error(&output, &ErrorResponse::new("x")).unwrap();

    let files = records(dir.path());
    assert_eq!(files.len(), 2);
    let relative = files[0].strip_prefix(dir.path()).unwrap();
    // YYYY/MM/DD/HH-MM-SS-XXXX.json
    assert_eq!(relative.components().count(), 4);
    let names: Vec<String> = files
      .iter()
      .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
      .collect();
    assert!(names.iter().any(|n| n.ends_with("-0001.json")));
    assert!(names.iter().any(|n| n.ends_with("-0002.json")));
  }

  #[test]
  fn test_record_with_request() {
    let dir = tempfile::tempdir().unwrap();
    let url =
      url::Url::parse(&format!("folder://{}?request", dir.path().display())).unwrap();
    let output = DirectoryRecordOutput::from_url(&url).unwrap();
    output.render_result(&"req", &health()).unwrap();

    let files = records(dir.path());
    let value: serde_json::Value =
      serde_json::from_slice(&std::fs::read(&files[0]).unwrap()).unwrap();
    assert_eq!(value["request"], "req");
    assert_eq!(value["result"]["status"], "healthy");
  }
}
