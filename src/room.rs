// 该文件是 Chicun （尺寸） 项目的一部分。
// src/room.rs - 房间分析与家具摆放
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

use crate::error::Error;

mod analyze;
mod geometry;
mod placement;

pub use self::analyze::{
  RoomSpaceAnalyzer, detect_walls, estimate_lighting, find_floor_plane, floor_area,
};
pub use self::geometry::{
  PlanarWallGeometry, SimplifiedSegmentation, SimplifiedWallGeometry, SpaceSegmentation,
  WallGeometry,
};
pub use self::placement::{
  DEFAULT_FLOOR_AREA_M2, LIMITED_CLEARANCE_WARNING, NO_SPACE_WARNING, PlacementScorer, can_fit,
  clearance, lighting_quality, placement_confidence, room_compatibility,
};

pub type Vec3 = [f64; 3];

/// 英寸到米
pub const INCH_TO_METER: f64 = 0.0254;
pub const DEFAULT_FURNITURE_WIDTH_IN: f64 = 36.0;
pub const DEFAULT_FURNITURE_HEIGHT_IN: f64 = 30.0;
pub const DEFAULT_FURNITURE_DEPTH_IN: f64 = 36.0;
/// 缺省深度图尺寸 (行, 列)
pub const DEFAULT_DEPTH_ROWS: usize = 480;
pub const DEFAULT_DEPTH_COLS: usize = 640;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Plane {
  #[serde(default)]
  pub normal: Vec3,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub boundary: Option<Vec<Vec3>>,
}

impl Plane {
  pub fn new(normal: Vec3) -> Self {
    Self {
      normal,
      boundary: None,
    }
  }

  pub fn with_boundary(mut self, boundary: Vec<Vec3>) -> Self {
    self.boundary = Some(boundary);
    self
  }

  /// 法向接近竖直向上
  pub fn is_floor(&self) -> bool {
    self.normal[1] > 0.9
  }

  /// 法向接近水平
  pub fn is_wall(&self) -> bool {
    self.normal[1].abs() < 0.1
  }
}

/// 行优先的二维深度（亮度）图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct DepthMap {
  rows: usize,
  cols: usize,
  values: Vec<f64>,
}

impl Default for DepthMap {
  fn default() -> Self {
    Self::zeros(DEFAULT_DEPTH_ROWS, DEFAULT_DEPTH_COLS)
  }
}

impl DepthMap {
  pub fn zeros(rows: usize, cols: usize) -> Self {
    Self {
      rows,
      cols,
      values: vec![0.0; rows * cols],
    }
  }

  pub fn from_values(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self, Error> {
    if values.len() != rows * cols {
      return Err(Error::invalid(format!(
        "深度图数据长度不匹配: 期望 {}, 实际 {}",
        rows * cols,
        values.len()
      )));
    }
    Ok(Self { rows, cols, values })
  }

  pub fn rows(&self) -> usize {
    self.rows
  }

  pub fn cols(&self) -> usize {
    self.cols
  }

  pub fn get(&self, row: usize, col: usize) -> Option<f64> {
    if row < self.rows && col < self.cols {
      self.values.get(row * self.cols + col).copied()
    } else {
      None
    }
  }

  /// 平均值，空图返回 0
  pub fn mean(&self) -> f64 {
    if self.values.is_empty() {
      return 0.0;
    }
    self.values.iter().sum::<f64>() / self.values.len() as f64
  }
}

impl TryFrom<Vec<Vec<f64>>> for DepthMap {
  type Error = Error;

  fn try_from(grid: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
    let rows = grid.len();
    let cols = grid.first().map(Vec::len).unwrap_or(0);
    if let Some((i, row)) = grid.iter().enumerate().find(|(_, r)| r.len() != cols) {
      return Err(Error::invalid(format!(
        "深度图不是矩形: 第 {} 行长度 {}, 期望 {}",
        i,
        row.len(),
        cols
      )));
    }
    Ok(Self {
      rows,
      cols,
      values: grid.into_iter().flatten().collect(),
    })
  }
}

impl From<DepthMap> for Vec<Vec<f64>> {
  fn from(map: DepthMap) -> Self {
    if map.cols == 0 {
      return vec![Vec::new(); map.rows];
    }
    map.values.chunks(map.cols).map(<[f64]>::to_vec).collect()
  }
}

/// 相机内参，分析阶段不解释，只透传给空间分割
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraIntrinsics {
  pub fx: Option<f64>,
  pub fy: Option<f64>,
  pub cx: Option<f64>,
  pub cy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableSpace {
  pub center: Vec3,
  /// [宽, 深]，单位米
  pub size: [f64; 2],
  pub shape: String,
}

impl AvailableSpace {
  pub fn area(&self) -> f64 {
    self.size[0] * self.size[1]
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
  pub center: Vec3,
  pub size: Vec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lighting {
  pub intensity: f64,
  pub direction: Vec3,
  pub color_temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomAnalysis {
  pub floor_area: f64,
  pub available_spaces: Vec<AvailableSpace>,
  pub walls: Vec<Plane>,
  pub obstacles: Vec<Obstacle>,
  pub lighting: Lighting,
}

fn default_width_in() -> f64 {
  DEFAULT_FURNITURE_WIDTH_IN
}

fn default_height_in() -> f64 {
  DEFAULT_FURNITURE_HEIGHT_IN
}

fn default_depth_in() -> f64 {
  DEFAULT_FURNITURE_DEPTH_IN
}

/// 家具尺寸（英寸）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FurnitureDimensions {
  #[serde(default = "default_width_in")]
  pub width: f64,
  #[serde(default = "default_height_in")]
  pub height: f64,
  #[serde(default = "default_depth_in")]
  pub depth: f64,
}

impl Default for FurnitureDimensions {
  fn default() -> Self {
    Self {
      width: DEFAULT_FURNITURE_WIDTH_IN,
      height: DEFAULT_FURNITURE_HEIGHT_IN,
      depth: DEFAULT_FURNITURE_DEPTH_IN,
    }
  }
}

impl FurnitureDimensions {
  pub fn to_meters(&self) -> FurnitureSize {
    FurnitureSize {
      width: self.width * INCH_TO_METER,
      height: self.height * INCH_TO_METER,
      depth: self.depth * INCH_TO_METER,
    }
  }
}

/// 家具尺寸（米）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FurnitureSize {
  pub width: f64,
  pub height: f64,
  pub depth: f64,
}

impl FurnitureSize {
  pub fn footprint(&self) -> f64 {
    self.width * self.depth
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FurnitureType {
  Sofa,
  Table,
  TvStand,
  Other(String),
}

impl From<&str> for FurnitureType {
  fn from(value: &str) -> Self {
    match value {
      "sofa" => FurnitureType::Sofa,
      "table" => FurnitureType::Table,
      "tv_stand" => FurnitureType::TvStand,
      other => FurnitureType::Other(other.to_string()),
    }
  }
}

impl From<String> for FurnitureType {
  fn from(value: String) -> Self {
    FurnitureType::from(value.as_str())
  }
}

impl From<FurnitureType> for String {
  fn from(value: FurnitureType) -> Self {
    match value {
      FurnitureType::Sofa => "sofa".to_string(),
      FurnitureType::Table => "table".to_string(),
      FurnitureType::TvStand => "tv_stand".to_string(),
      FurnitureType::Other(other) => other,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightingQuality {
  Good,
  Moderate,
  Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementCandidate {
  pub position: Vec3,
  /// 绕竖直轴的旋转（弧度）
  pub rotation: f64,
  pub scale: f64,
  pub confidence: f64,
  pub clearance: f64,
  pub lighting_quality: LightingQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementResult {
  pub recommended_placements: Vec<PlacementCandidate>,
  pub furniture_fits: bool,
  pub warnings: Vec<String>,
  pub room_compatibility_score: f64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_plane_classification() {
    assert!(Plane::new([0.0, 1.0, 0.0]).is_floor());
    assert!(!Plane::new([0.0, 0.9, 0.1]).is_floor());
    assert!(Plane::new([1.0, 0.0, 0.0]).is_wall());
    assert!(Plane::new([0.0, -0.05, 1.0]).is_wall());
    assert!(!Plane::new([0.0, 0.5, 0.5]).is_wall());
  }

  #[test]
  fn test_plane_json_defaults() {
    let plane: Plane = serde_json::from_str("{}").unwrap();
    assert_eq!(plane.normal, [0.0, 0.0, 0.0]);
    assert!(plane.boundary.is_none());
  }

  #[test]
  fn test_depth_map_from_grid() {
    let map: DepthMap = serde_json::from_str("[[0, 255], [255, 0]]").unwrap();
    assert_eq!(map.rows(), 2);
    assert_eq!(map.cols(), 2);
    assert_eq!(map.get(0, 1), Some(255.0));
    assert_eq!(map.get(2, 0), None);
    assert!((map.mean() - 127.5).abs() < 1e-12);

    let json = serde_json::to_value(&map).unwrap();
    assert_eq!(json, serde_json::json!([[0.0, 255.0], [255.0, 0.0]]));
  }

  #[test]
  fn test_depth_map_rejects_ragged_grid() {
    assert!(serde_json::from_str::<DepthMap>("[[1, 2], [3]]").is_err());
    assert!(DepthMap::from_values(2, 2, vec![1.0]).is_err());
  }

  #[test]
  fn test_default_depth_map() {
    let map = DepthMap::default();
    assert_eq!((map.rows(), map.cols()), (480, 640));
    assert_eq!(map.mean(), 0.0);
    assert_eq!(DepthMap::zeros(0, 0).mean(), 0.0);
  }

  #[test]
  fn test_furniture_dimensions_defaults_and_conversion() {
    let dims: FurnitureDimensions = serde_json::from_str(r#"{"width": 40}"#).unwrap();
    assert_eq!(dims.height, 30.0);
    let size = dims.to_meters();
    assert!((size.width - 1.016).abs() < 1e-12);
    assert!((size.depth - 0.9144).abs() < 1e-12);
  }

  #[test]
  fn test_furniture_type_roundtrip_names() {
    assert_eq!(FurnitureType::from("tv_stand"), FurnitureType::TvStand);
    assert_eq!(
      FurnitureType::from("lamp"),
      FurnitureType::Other("lamp".to_string())
    );
    assert_eq!(String::from(FurnitureType::Sofa), "sofa");
  }
}
