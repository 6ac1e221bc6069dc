// 该文件是 Chicun （尺寸） 项目的一部分。
// src/room/geometry.rs - 空间分割与墙面几何
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

use std::f64::consts::{FRAC_PI_2, PI};

use super::{AvailableSpace, CameraIntrinsics, DepthMap, Obstacle, Plane, Vec3};

/// 在地面上查找可摆放区域和障碍物
pub trait SpaceSegmentation {
  fn find_available_spaces(
    &self,
    floor: &Plane,
    depth: &DepthMap,
    intrinsics: &CameraIntrinsics,
  ) -> Vec<AvailableSpace>;

  fn detect_obstacles(&self, depth: &DepthMap, floor: Option<&Plane>) -> Vec<Obstacle>;
}

/// 家具朝向相关的墙面几何，角度为绕竖直轴的弧度，0 朝向 +z
pub trait WallGeometry {
  fn distance_to_wall(&self, position: &Vec3, wall: &Plane) -> f64;
  fn angle_away_from_wall(&self, position: &Vec3, wall: &Plane) -> f64;
  fn angle_along_wall(&self, position: &Vec3, wall: &Plane) -> f64;
}

const SIMPLIFIED_SPACE_CENTER: Vec3 = [0.0, 0.0, -2.0];
const SIMPLIFIED_SPACE_SIZE: [f64; 2] = [3.0, 3.0];
const SIMPLIFIED_WALL_DISTANCE: f64 = 1.0;

/// 简化分割：相机前方 2 米处固定一个 3x3 米的矩形空间，不检测障碍物
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplifiedSegmentation;

impl SpaceSegmentation for SimplifiedSegmentation {
  fn find_available_spaces(
    &self,
    _floor: &Plane,
    _depth: &DepthMap,
    _intrinsics: &CameraIntrinsics,
  ) -> Vec<AvailableSpace> {
    vec![AvailableSpace {
      center: SIMPLIFIED_SPACE_CENTER,
      size: SIMPLIFIED_SPACE_SIZE,
      shape: "rectangle".to_string(),
    }]
  }

  fn detect_obstacles(&self, _depth: &DepthMap, _floor: Option<&Plane>) -> Vec<Obstacle> {
    Vec::new()
  }
}

/// 简化几何：所有墙距离相同，角度恒为 0
#[derive(Debug, Clone, Copy, Default)]
pub struct SimplifiedWallGeometry;

impl WallGeometry for SimplifiedWallGeometry {
  fn distance_to_wall(&self, _position: &Vec3, _wall: &Plane) -> f64 {
    SIMPLIFIED_WALL_DISTANCE
  }

  fn angle_away_from_wall(&self, _position: &Vec3, _wall: &Plane) -> f64 {
    0.0
  }

  fn angle_along_wall(&self, _position: &Vec3, _wall: &Plane) -> f64 {
    0.0
  }
}

/// 基于平面方程的几何：墙面过边界第一个点（无边界时过原点）
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarWallGeometry;

impl PlanarWallGeometry {
  fn anchor(wall: &Plane) -> Vec3 {
    wall
      .boundary
      .as_ref()
      .and_then(|b| b.first().copied())
      .unwrap_or([0.0; 3])
  }

  /// 单位法向，并翻转到位置所在一侧；法向为零时返回 None
  fn facing_normal(position: &Vec3, wall: &Plane) -> Option<(Vec3, f64)> {
    let n = wall.normal;
    let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
    if len <= f64::EPSILON {
      return None;
    }
    let a = Self::anchor(wall);
    let mut unit = [n[0] / len, n[1] / len, n[2] / len];
    let mut signed =
      unit[0] * (position[0] - a[0]) + unit[1] * (position[1] - a[1]) + unit[2] * (position[2] - a[2]);
    if signed < 0.0 {
      unit = [-unit[0], -unit[1], -unit[2]];
      signed = -signed;
    }
    Some((unit, signed))
  }
}

fn wrap_angle(angle: f64) -> f64 {
  let mut a = angle;
  while a > PI {
    a -= 2.0 * PI;
  }
  while a <= -PI {
    a += 2.0 * PI;
  }
  a
}

impl WallGeometry for PlanarWallGeometry {
  fn distance_to_wall(&self, position: &Vec3, wall: &Plane) -> f64 {
    Self::facing_normal(position, wall)
      .map(|(_, d)| d)
      .unwrap_or(f64::INFINITY)
  }

  fn angle_away_from_wall(&self, position: &Vec3, wall: &Plane) -> f64 {
    match Self::facing_normal(position, wall) {
      Some((n, _)) if n[0].abs() > f64::EPSILON || n[2].abs() > f64::EPSILON => n[0].atan2(n[2]),
      _ => 0.0,
    }
  }

  fn angle_along_wall(&self, position: &Vec3, wall: &Plane) -> f64 {
    wrap_angle(self.angle_away_from_wall(position, wall) + FRAC_PI_2)
  }
}
