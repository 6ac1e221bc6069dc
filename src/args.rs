// 该文件是 Chicun （尺寸） 项目的一部分。
// src/args.rs - 命令行参数
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

use clap::{Parser, Subcommand, ValueEnum};
use url::Url;

use chicun::measure::DEFAULT_CAMERA_DISTANCE_M;

/// Chicun 尺码推荐与家具摆放
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// 根据人体关键点推荐尺码
  Size {
    /// 请求来源: file:///path.json 或 stdin:
    #[arg(long, default_value = "stdin:", value_name = "SOURCE")]
    input: Url,
    /// 输出: stdout:, file:///path.json 或 folder:///dir[?request]
    #[arg(long, default_value = "stdout:", value_name = "OUTPUT")]
    output: Url,
    /// 尺码模型: rule: 或 learned:///path/model.json
    #[arg(long, value_name = "MODEL")]
    model: Option<Url>,
    /// 拍摄距离（米）
    #[arg(long, default_value_t = DEFAULT_CAMERA_DISTANCE_M, value_name = "METERS")]
    camera_distance: f64,
  },
  /// 分析房间并给出家具摆放建议
  Furniture {
    /// 请求来源: file:///path.json 或 stdin:
    #[arg(long, default_value = "stdin:", value_name = "SOURCE")]
    input: Url,
    /// 输出: stdout:, file:///path.json 或 folder:///dir[?request]
    #[arg(long, default_value = "stdout:", value_name = "OUTPUT")]
    output: Url,
    /// 灰度深度图像，替换请求中的深度图: image:///path.png
    #[cfg(feature = "read_depth_image")]
    #[arg(long, value_name = "IMAGE")]
    depth_image: Option<Url>,
  },
  /// 健康检查
  Health {
    #[arg(long, default_value = "stdout:", value_name = "OUTPUT")]
    output: Url,
  },
  /// 逐行读取 JSON 请求并持续处理
  Serve {
    #[arg(long, value_enum)]
    kind: ServeKind,
    #[arg(long, default_value = "stdin:", value_name = "SOURCE")]
    input: Url,
    #[arg(long, default_value = "stdout:", value_name = "OUTPUT")]
    output: Url,
    /// 处理的最大请求数，缺省不限
    #[arg(long, value_name = "COUNT")]
    max_requests: Option<usize>,
    #[arg(long, value_name = "MODEL")]
    model: Option<Url>,
    #[arg(long, default_value_t = DEFAULT_CAMERA_DISTANCE_M, value_name = "METERS")]
    camera_distance: f64,
  },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServeKind {
  Size,
  Furniture,
}
