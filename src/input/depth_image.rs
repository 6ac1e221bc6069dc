// 该文件是 Chicun （尺寸） 项目的一部分。
// src/input/depth_image.rs - 从灰度图像读取深度图
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

use image::ImageReader;
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, error::Error, room::DepthMap};

#[derive(Error, Debug)]
pub enum DepthImageInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像加载错误: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("深度图无效: {0}")]
  InvalidDepthMap(#[from] Error),
}

/// 灰度像素值 (0~255) 直接作为深度/亮度
pub struct DepthImageInput {
  depth_map: DepthMap,
}

impl FromUrlWithScheme for DepthImageInput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for DepthImageInput {
  type Error = DepthImageInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(DepthImageInputError::SchemeMismatch);
    }

    let path = url.path();
    let image = ImageReader::open(path)?.decode()?.to_luma8();
    let (width, height) = image.dimensions();
    info!("读取深度图像 {}: {}x{}", path, width, height);

    let values = image.pixels().map(|p| f64::from(p.0[0])).collect();
    let depth_map = DepthMap::from_values(height as usize, width as usize, values)?;
    Ok(DepthImageInput { depth_map })
  }
}

impl DepthImageInput {
  pub fn into_depth_map(self) -> DepthMap {
    self.depth_map
  }
}
