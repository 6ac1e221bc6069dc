// 该文件是 Chicun （尺寸） 项目的一部分。
// src/output.rs - 结果输出
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
  io::Write,
  path::Path,
};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

#[cfg(feature = "directory_record")]
use crate::FromUrlWithScheme;
use crate::{FromUrl, api::ErrorResponse};

pub trait Render<Request, Response>: Sized {
  type Error;
  fn render_result(&self, request: &Request, result: &Response) -> Result<(), Self::Error>;
  fn render_error(&self, error: &ErrorResponse) -> Result<(), Self::Error>;
}

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};

const STDOUT_SCHEME: &str = "stdout";
const FILE_SCHEME: &str = "file";

#[derive(Error, Debug)]
pub enum SinkError {
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  SerializeError(#[from] serde_json::Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 每个结果占一行写到标准输出
#[derive(Debug, Default)]
pub struct StdoutOutput;

impl StdoutOutput {
  fn write_line<T: Serialize>(&self, value: &T) -> Result<(), SinkError> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
  }
}

/// 创建时清空文件，之后每个结果追加一行
#[derive(Debug)]
pub struct JsonFileOutput {
  file: File,
}

impl JsonFileOutput {
  pub fn create(path: &Path) -> Result<Self, SinkError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    debug!("创建输出文件: {}", path.display());
    Ok(Self {
      file: File::create(path)?,
    })
  }

  fn write_line<T: Serialize>(&self, value: &T) -> Result<(), SinkError> {
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    (&self.file).write_all(&line)?;
    Ok(())
  }
}

pub enum OutputWrapper {
  Stdout(StdoutOutput),
  File(JsonFileOutput),
  #[cfg(feature = "directory_record")]
  DirectoryRecord(DirectoryRecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = SinkError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      STDOUT_SCHEME => Ok(OutputWrapper::Stdout(StdoutOutput)),
      FILE_SCHEME => Ok(OutputWrapper::File(JsonFileOutput::create(Path::new(
        url.path(),
      ))?)),
      #[cfg(feature = "directory_record")]
      DirectoryRecordOutput::SCHEME => {
        let output = DirectoryRecordOutput::from_url(url)?;
        Ok(OutputWrapper::DirectoryRecord(output))
      }
      other => {
        error!("不支持的输出方案: {}", other);
        Err(SinkError::SchemeMismatch(other.to_string()))
      }
    }
  }
}

impl<Request: Serialize, Response: Serialize> Render<Request, Response> for OutputWrapper {
  type Error = SinkError;

  fn render_result(&self, request: &Request, result: &Response) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::Stdout(output) => output.write_line(result),
      OutputWrapper::File(output) => output.write_line(result),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecord(output) => output
        .render_result(request, result)
        .map_err(SinkError::from),
    }
  }

  fn render_error(&self, error: &ErrorResponse) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::Stdout(output) => output.write_line(error),
      OutputWrapper::File(output) => output.write_line(error),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecord(output) => {
        Render::<Request, Response>::render_error(output, error).map_err(SinkError::from)
      }
    }
  }
}
