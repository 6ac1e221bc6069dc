// 该文件是 Chicun （尺寸） 项目的一部分。
// src/room/placement.rs - 家具摆放评分
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

use tracing::{debug, warn};

use super::{
  AvailableSpace, FurnitureDimensions, FurnitureSize, FurnitureType, Lighting, LightingQuality,
  PlacementCandidate, PlacementResult, Plane, RoomAnalysis, SimplifiedWallGeometry, Vec3,
  WallGeometry,
};

const MAX_PLACEMENTS: usize = 3;
// 家具占用空间比例
const CROWDED_SPACE_RATIO: f64 = 0.8;
const CROWDED_SPACE_PENALTY: f64 = 0.7;
const SPARSE_SPACE_RATIO: f64 = 0.2;
const SPARSE_SPACE_PENALTY: f64 = 0.8;
// 沙发前方需要额外 1 米活动空间
const SOFA_EXTRA_WIDTH_M: f64 = 1.0;
const SOFA_CLEARANCE_PENALTY: f64 = 0.6;
const LIMITED_CLEARANCE_M: f64 = 0.5;
// 家具占地面积比例
const LARGE_FOR_ROOM_RATIO: f64 = 0.3;
const LARGE_FOR_ROOM_PENALTY: f64 = 0.7;
const SMALL_FOR_ROOM_RATIO: f64 = 0.05;
const SMALL_FOR_ROOM_PENALTY: f64 = 0.8;
const SOFA_WITHOUT_WALL_PENALTY: f64 = 0.8;
/// 地面面积未知时假定的面积（平方米）
pub const DEFAULT_FLOOR_AREA_M2: f64 = 10.0;
const GOOD_LIGHT: f64 = 0.7;
const MODERATE_LIGHT: f64 = 0.4;

pub const NO_SPACE_WARNING: &str = "No suitable space found for this furniture";
pub const LIMITED_CLEARANCE_WARNING: &str = "Limited walking space around furniture";

/// 正向或旋转 90 度任一方向能放下即可
pub fn can_fit(space: &AvailableSpace, furniture: &FurnitureSize) -> bool {
  let [sw, sd] = space.size;
  let fits_normal = furniture.width <= sw && furniture.depth <= sd;
  let fits_rotated = furniture.depth <= sw && furniture.width <= sd;
  fits_normal || fits_rotated
}

pub fn placement_confidence(
  space: &AvailableSpace,
  furniture: &FurnitureSize,
  furniture_type: &FurnitureType,
) -> f64 {
  let mut confidence = 1.0;
  let ratio = furniture.footprint() / space.area();

  if ratio > CROWDED_SPACE_RATIO {
    confidence *= CROWDED_SPACE_PENALTY;
  } else if ratio < SPARSE_SPACE_RATIO {
    confidence *= SPARSE_SPACE_PENALTY;
  }

  if *furniture_type == FurnitureType::Sofa && space.size[0] < furniture.width + SOFA_EXTRA_WIDTH_M
  {
    confidence *= SOFA_CLEARANCE_PENALTY;
  }

  confidence
}

pub fn clearance(space: &AvailableSpace, furniture: &FurnitureSize) -> f64 {
  let clearance_x = (space.size[0] - furniture.width) / 2.0;
  let clearance_z = (space.size[1] - furniture.depth) / 2.0;
  clearance_x.min(clearance_z)
}

pub fn lighting_quality(lighting: &Lighting) -> LightingQuality {
  if lighting.intensity > GOOD_LIGHT {
    LightingQuality::Good
  } else if lighting.intensity > MODERATE_LIGHT {
    LightingQuality::Moderate
  } else {
    LightingQuality::Low
  }
}

pub fn room_compatibility(
  analysis: &RoomAnalysis,
  furniture: &FurnitureSize,
  furniture_type: &FurnitureType,
) -> f64 {
  if analysis.available_spaces.is_empty() {
    return 0.0;
  }

  let floor_area = if analysis.floor_area > 0.0 {
    analysis.floor_area
  } else {
    DEFAULT_FLOOR_AREA_M2
  };

  let mut score = 1.0;
  let ratio = furniture.footprint() / floor_area;
  if ratio > LARGE_FOR_ROOM_RATIO {
    score *= LARGE_FOR_ROOM_PENALTY;
  } else if ratio < SMALL_FOR_ROOM_RATIO {
    score *= SMALL_FOR_ROOM_PENALTY;
  }

  if *furniture_type == FurnitureType::Sofa && analysis.walls.is_empty() {
    score *= SOFA_WITHOUT_WALL_PENALTY;
  }

  score
}

#[derive(Debug, Clone, Default)]
pub struct PlacementScorer<G = SimplifiedWallGeometry> {
  geometry: G,
}

impl<G: WallGeometry> PlacementScorer<G> {
  pub fn new(geometry: G) -> Self {
    Self { geometry }
  }

  fn nearest_wall<'a>(&self, position: &Vec3, walls: &'a [Plane]) -> Option<&'a Plane> {
    // 距离相同时取第一面墙
    walls
      .iter()
      .map(|wall| (wall, self.geometry.distance_to_wall(position, wall)))
      .min_by(|a, b| a.1.total_cmp(&b.1))
      .map(|(wall, _)| wall)
  }

  pub fn rotation(
    &self,
    space: &AvailableSpace,
    furniture_type: &FurnitureType,
    walls: &[Plane],
  ) -> f64 {
    let nearest = self.nearest_wall(&space.center, walls);
    match (furniture_type, nearest) {
      (FurnitureType::Sofa, Some(wall)) => self.geometry.angle_away_from_wall(&space.center, wall),
      (FurnitureType::TvStand, Some(wall)) => self.geometry.angle_along_wall(&space.center, wall),
      _ => 0.0,
    }
  }

  pub fn place(
    &self,
    analysis: &RoomAnalysis,
    dimensions: &FurnitureDimensions,
    furniture_type: &FurnitureType,
  ) -> PlacementResult {
    let furniture = dimensions.to_meters();
    let lighting = lighting_quality(&analysis.lighting);

    let mut placements: Vec<PlacementCandidate> = analysis
      .available_spaces
      .iter()
      .filter(|space| can_fit(space, &furniture))
      .map(|space| PlacementCandidate {
        position: space.center,
        rotation: self.rotation(space, furniture_type, &analysis.walls),
        scale: 1.0,
        confidence: placement_confidence(space, &furniture, furniture_type),
        clearance: clearance(space, &furniture),
        lighting_quality: lighting,
      })
      .collect();

    placements.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut warnings = Vec::new();
    match placements.first() {
      None => {
        warn!(
          "没有可容纳 {:.2}x{:.2} m 家具的空间",
          furniture.width, furniture.depth
        );
        warnings.push(NO_SPACE_WARNING.to_string());
      }
      Some(top) if top.clearance < LIMITED_CLEARANCE_M => {
        warnings.push(LIMITED_CLEARANCE_WARNING.to_string());
      }
      Some(_) => {}
    }

    let furniture_fits = !placements.is_empty();
    placements.truncate(MAX_PLACEMENTS);

    let room_compatibility_score = room_compatibility(analysis, &furniture, furniture_type);
    debug!(
      "摆放候选 {}, 房间兼容度 {:.2}",
      placements.len(),
      room_compatibility_score
    );

    PlacementResult {
      recommended_placements: placements,
      furniture_fits,
      warnings,
      room_compatibility_score,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::room::PlanarWallGeometry;

  fn space(w: f64, d: f64) -> AvailableSpace {
    AvailableSpace {
      center: [0.0, 0.0, -2.0],
      size: [w, d],
      shape: "rectangle".to_string(),
    }
  }

  fn meters(width: f64, depth: f64) -> FurnitureSize {
    FurnitureSize {
      width,
      height: 0.5,
      depth,
    }
  }

  fn analysis(spaces: Vec<AvailableSpace>, walls: Vec<Plane>, floor_area: f64) -> RoomAnalysis {
    RoomAnalysis {
      floor_area,
      available_spaces: spaces,
      walls,
      obstacles: Vec::new(),
      lighting: Lighting {
        intensity: 0.5,
        direction: [0.0, -1.0, 0.0],
        color_temperature: 5000.0,
      },
    }
  }

  #[test]
  fn test_fit_either_orientation() {
    assert!(can_fit(&space(1.0, 2.0), &meters(1.8, 0.9)));
    assert!(can_fit(&space(2.0, 1.0), &meters(1.8, 0.9)));
    assert!(!can_fit(&space(1.0, 1.0), &meters(1.8, 0.9)));
    // 40 英寸宽的家具放进 3x3 米空间，两个方向都能放下
    let f = FurnitureDimensions {
      width: 40.0,
      ..Default::default()
    }
    .to_meters();
    assert!(can_fit(&space(3.0, 3.0), &f));
  }

  #[test]
  fn test_ratio_thresholds_are_strict() {
    let other = FurnitureType::Other("chair".to_string());
    assert_eq!(placement_confidence(&space(1.0, 1.0), &meters(0.5, 0.4), &other), 1.0);
    assert_eq!(placement_confidence(&space(1.0, 1.0), &meters(0.8, 1.0), &other), 1.0);
    assert_eq!(placement_confidence(&space(1.0, 1.0), &meters(0.5, 0.39), &other), 0.8);
    assert_eq!(placement_confidence(&space(1.0, 1.0), &meters(0.9, 1.0), &other), 0.7);
  }

  #[test]
  fn test_small_item_in_large_space_is_penalized() {
    let f = FurnitureDimensions {
      width: 40.0,
      ..Default::default()
    }
    .to_meters();
    let c = placement_confidence(&space(3.0, 3.0), &f, &FurnitureType::Table);
    assert!((c - 0.8).abs() < 1e-12);
  }

  #[test]
  fn test_sofa_needs_extra_width() {
    let c = placement_confidence(&space(2.0, 2.0), &meters(1.5, 1.0), &FurnitureType::Sofa);
    assert!((c - 0.6).abs() < 1e-12);
    let c = placement_confidence(&space(3.0, 1.2), &meters(1.5, 1.0), &FurnitureType::Sofa);
    assert!((c - 1.0).abs() < 1e-12);
  }

  #[test]
  fn test_clearance_and_lighting() {
    assert!((clearance(&space(3.0, 2.0), &meters(1.0, 1.5)) - 0.25).abs() < 1e-12);
    let mut light = analysis(vec![], vec![], 0.0).lighting;
    assert_eq!(lighting_quality(&light), LightingQuality::Moderate);
    light.intensity = 0.71;
    assert_eq!(lighting_quality(&light), LightingQuality::Good);
    light.intensity = 0.4;
    assert_eq!(lighting_quality(&light), LightingQuality::Low);
  }

  #[test]
  fn test_no_space_warning() {
    let result = PlacementScorer::<SimplifiedWallGeometry>::default().place(
      &analysis(vec![], vec![], 0.0),
      &FurnitureDimensions::default(),
      &FurnitureType::Sofa,
    );
    assert!(!result.furniture_fits);
    assert!(result.recommended_placements.is_empty());
    assert_eq!(result.warnings, vec![NO_SPACE_WARNING.to_string()]);
    assert_eq!(result.room_compatibility_score, 0.0);
  }

  #[test]
  fn test_top_three_sorted() {
    let spaces = vec![
      space(1.0, 1.0),
      space(3.0, 3.0),
      space(1.0, 1.2),
      space(1.5, 1.5),
      space(0.5, 0.5),
    ];
    let dims = FurnitureDimensions {
      width: 36.0,
      height: 30.0,
      depth: 36.0,
    };
    let result = PlacementScorer::new(SimplifiedWallGeometry).place(
      &analysis(spaces, vec![], 20.0),
      &dims,
      &FurnitureType::Table,
    );
    assert!(result.furniture_fits);
    assert_eq!(result.recommended_placements.len(), 3);
    let c: Vec<f64> = result
      .recommended_placements
      .iter()
      .map(|p| p.confidence)
      .collect();
    assert!(c.windows(2).all(|w| w[0] >= w[1]));
    // 最优候选为 1x1.2 空间，间隙 (1 - 0.9144)/2 < 0.5
    assert_eq!(
      result.warnings,
      vec![LIMITED_CLEARANCE_WARNING.to_string()]
    );
  }

  #[test]
  fn test_room_compatibility() {
    let f = meters(1.0, 1.0);
    let a = analysis(vec![space(3.0, 3.0)], vec![], 10.0);
    assert_eq!(room_compatibility(&a, &f, &FurnitureType::Table), 1.0);
    assert!((room_compatibility(&a, &f, &FurnitureType::Sofa) - 0.8).abs() < 1e-12);

    let small_room = analysis(vec![space(3.0, 3.0)], vec![Plane::new([1.0, 0.0, 0.0])], 3.0);
    assert!((room_compatibility(&small_room, &f, &FurnitureType::Sofa) - 0.7).abs() < 1e-12);

    let huge_room = analysis(vec![space(3.0, 3.0)], vec![], 100.0);
    assert!((room_compatibility(&huge_room, &f, &FurnitureType::Table) - 0.8).abs() < 1e-12);

    // 地面面积未知时按 10 平方米计算
    let unknown = analysis(vec![space(3.0, 3.0)], vec![], 0.0);
    assert_eq!(room_compatibility(&unknown, &f, &FurnitureType::Table), 1.0);
  }

  #[test]
  fn test_rotation_by_type() {
    let walls = vec![
      Plane::new([0.0, 0.0, 1.0]).with_boundary(vec![[0.0, 0.0, -5.0]]),
      Plane::new([-1.0, 0.0, 0.0]).with_boundary(vec![[1.0, 0.0, 0.0]]),
    ];
    let s = space(3.0, 3.0);

    let simple = PlacementScorer::new(SimplifiedWallGeometry);
    assert_eq!(simple.rotation(&s, &FurnitureType::Sofa, &walls), 0.0);

    let planar = PlacementScorer::new(PlanarWallGeometry);
    // 最近的是 x = 1 的侧墙
    let sofa = planar.rotation(&s, &FurnitureType::Sofa, &walls);
    assert!((sofa + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    let tv = planar.rotation(&s, &FurnitureType::TvStand, &walls);
    assert!(tv.abs() < 1e-12);
    assert_eq!(planar.rotation(&s, &FurnitureType::Table, &walls), 0.0);
    assert_eq!(planar.rotation(&s, &FurnitureType::Sofa, &[]), 0.0);
  }
}
