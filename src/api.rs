// 该文件是 Chicun （尺寸） 项目的一部分。
// src/api.rs - 请求/响应结构与对外接口
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

use serde::{Deserialize, Serialize};

use crate::{
  engine::{FurniturePlacementEngine, SizeRecommendationEngine},
  error::{Error, Result},
  fit::{ProductData, SizeRecommendation},
  pose::{ImageDimensions, Landmark},
  room::{
    CameraIntrinsics, DepthMap, FurnitureDimensions, FurnitureType, PlacementResult, Plane,
    SpaceSegmentation, WallGeometry,
  },
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeRecommendationRequest {
  pub body_landmarks: Vec<Landmark>,
  pub image_dimensions: ImageDimensions,
  pub product_data: ProductData,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomData {
  #[serde(default)]
  pub depth_map: DepthMap,
  #[serde(default)]
  pub camera_intrinsics: CameraIntrinsics,
  #[serde(default)]
  pub detected_planes: Vec<Plane>,
}

fn default_furniture_type() -> FurnitureType {
  FurnitureType::Other("furniture".to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureData {
  #[serde(default)]
  pub dimensions: FurnitureDimensions,
  #[serde(rename = "type", default = "default_furniture_type")]
  pub furniture_type: FurnitureType,
}

impl Default for FurnitureData {
  fn default() -> Self {
    Self {
      dimensions: FurnitureDimensions::default(),
      furniture_type: default_furniture_type(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FurniturePlacementRequest {
  #[serde(default)]
  pub room_data: RoomData,
  #[serde(default)]
  pub furniture_data: FurnitureData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
  pub status: String,
}

/// 所有失败都以这一结构返回
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
  pub error: String,
}

impl From<&Error> for ErrorResponse {
  fn from(err: &Error) -> Self {
    Self {
      error: err.to_string(),
    }
  }
}

impl ErrorResponse {
  pub fn new(error: impl ToString) -> Self {
    Self {
      error: error.to_string(),
    }
  }
}

pub fn size_recommendation(
  engine: &SizeRecommendationEngine,
  request: SizeRecommendationRequest,
) -> Result<SizeRecommendation> {
  engine.recommend(&request)
}

pub fn furniture_placement<S: SpaceSegmentation, G: WallGeometry>(
  engine: &FurniturePlacementEngine<S, G>,
  request: FurniturePlacementRequest,
) -> Result<PlacementResult> {
  engine.place(&request)
}

pub fn health() -> HealthStatus {
  HealthStatus {
    status: "healthy".to_string(),
  }
}
