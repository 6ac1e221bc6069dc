// 该文件是 Chicun （尺寸） 项目的一部分。
// src/error.rs - 核心错误定义
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

use thiserror::Error;

/// 核心引擎错误
///
/// 空尺码表、无可用空间、无墙面等情况都属于退化结果而不是错误。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
  #[error("输入无效: {0}")]
  InvalidInput(String),
  #[error("尺码不存在: {0}")]
  SizeNotFound(String),
  /// 仅由学习模型加载器产生，构造引擎时在本地回退到规则模式
  #[error("模型不可用: {path}, 原因: {reason}")]
  ModelUnavailable { path: String, reason: String },
}

impl Error {
  pub fn invalid(msg: impl Into<String>) -> Self {
    Error::InvalidInput(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
