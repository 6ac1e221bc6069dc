// 该文件是 Chicun （尺寸） 项目的一部分。
// src/room/analyze.rs - 房间空间分析
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

use tracing::{debug, info};

use super::{
  CameraIntrinsics, DepthMap, Lighting, Plane, RoomAnalysis, SimplifiedSegmentation,
  SpaceSegmentation,
};

const MAX_BRIGHTNESS: f64 = 255.0;
const LIGHT_DIRECTION: [f64; 3] = [0.0, -1.0, 0.0];
const COLOR_TEMPERATURE_K: f64 = 5000.0;

pub fn find_floor_plane(planes: &[Plane]) -> Option<&Plane> {
  planes.iter().find(|p| p.is_floor())
}

/// 鞋带公式，取边界的 x/z 坐标
pub fn floor_area(floor: &Plane) -> f64 {
  let Some(points) = floor.boundary.as_deref() else {
    return 0.0;
  };
  let n = points.len();
  let twice_area: f64 = (0..n)
    .map(|i| {
      let j = (i + 1) % n;
      points[i][0] * points[j][2] - points[j][0] * points[i][2]
    })
    .sum();
  twice_area.abs() / 2.0
}

pub fn detect_walls(planes: &[Plane]) -> Vec<Plane> {
  planes.iter().filter(|p| p.is_wall()).cloned().collect()
}

pub fn estimate_lighting(depth: &DepthMap) -> Lighting {
  Lighting {
    intensity: (depth.mean() / MAX_BRIGHTNESS).clamp(0.0, 1.0),
    direction: LIGHT_DIRECTION,
    color_temperature: COLOR_TEMPERATURE_K,
  }
}

#[derive(Debug, Clone, Default)]
pub struct RoomSpaceAnalyzer<S = SimplifiedSegmentation> {
  segmentation: S,
}

impl<S: SpaceSegmentation> RoomSpaceAnalyzer<S> {
  pub fn new(segmentation: S) -> Self {
    Self { segmentation }
  }

  pub fn analyze(
    &self,
    depth: &DepthMap,
    intrinsics: &CameraIntrinsics,
    planes: &[Plane],
  ) -> RoomAnalysis {
    let floor = find_floor_plane(planes);
    let (floor_area, available_spaces) = match floor {
      Some(floor) => (
        floor_area(floor),
        self
          .segmentation
          .find_available_spaces(floor, depth, intrinsics),
      ),
      None => {
        info!("未检测到地面，共 {} 个平面", planes.len());
        (0.0, Vec::new())
      }
    };

    let analysis = RoomAnalysis {
      floor_area,
      available_spaces,
      walls: detect_walls(planes),
      obstacles: self.segmentation.detect_obstacles(depth, floor),
      lighting: estimate_lighting(depth),
    };

    debug!(
      "房间分析: 地面 {:.2} m², 可用空间 {}, 墙面 {}, 光照 {:.2}",
      analysis.floor_area,
      analysis.available_spaces.len(),
      analysis.walls.len(),
      analysis.lighting.intensity
    );
    analysis
  }
}
