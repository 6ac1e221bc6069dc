// 该文件是 Chicun （尺寸） 项目的一部分。
// src/pose.rs - 人体关键点定义
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

use crate::error::{Error, Result};

/// COCO / MoveNet 的 17 关键点索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
  Nose = 0,
  LeftEye = 1,
  RightEye = 2,
  LeftEar = 3,
  RightEar = 4,
  LeftShoulder = 5,
  RightShoulder = 6,
  LeftElbow = 7,
  RightElbow = 8,
  LeftWrist = 9,
  RightWrist = 10,
  LeftHip = 11,
  RightHip = 12,
  LeftKnee = 13,
  RightKnee = 14,
  LeftAnkle = 15,
  RightAnkle = 16,
}

impl KeypointIndex {
  pub const COUNT: usize = 17;

  pub fn name(&self) -> &'static str {
    match self {
      Self::Nose => "nose",
      Self::LeftEye => "left_eye",
      Self::RightEye => "right_eye",
      Self::LeftEar => "left_ear",
      Self::RightEar => "right_ear",
      Self::LeftShoulder => "left_shoulder",
      Self::RightShoulder => "right_shoulder",
      Self::LeftElbow => "left_elbow",
      Self::RightElbow => "right_elbow",
      Self::LeftWrist => "left_wrist",
      Self::RightWrist => "right_wrist",
      Self::LeftHip => "left_hip",
      Self::RightHip => "right_hip",
      Self::LeftKnee => "left_knee",
      Self::RightKnee => "right_knee",
      Self::LeftAnkle => "left_ankle",
      Self::RightAnkle => "right_ankle",
    }
  }
}

fn default_visibility() -> f64 {
  1.0
}

/// 单个归一化关键点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
  /// 归一化 X 坐标 (0.0 ~ 1.0)
  pub x: f64,
  /// 归一化 Y 坐标 (0.0 ~ 1.0)
  pub y: f64,
  #[serde(default)]
  pub z: f64,
  #[serde(default = "default_visibility")]
  pub visibility: f64,
}

impl Landmark {
  pub fn new(x: f64, y: f64) -> Self {
    Self {
      x,
      y,
      z: 0.0,
      visibility: 1.0,
    }
  }

  pub fn with_visibility(mut self, visibility: f64) -> Self {
    self.visibility = visibility;
    self
  }

  /// 转换到像素坐标，z 放大 100 倍作为深度代理
  pub fn to_pixel(&self, dims: ImageDimensions) -> PixelPoint {
    PixelPoint {
      x: self.x * dims.width() as f64,
      y: self.y * dims.height() as f64,
      z: self.z * 100.0,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
  pub x: f64,
  pub y: f64,
  pub z: f64,
}

impl PixelPoint {
  pub fn midpoint(&self, other: &PixelPoint) -> PixelPoint {
    PixelPoint {
      x: (self.x + other.x) / 2.0,
      y: (self.y + other.y) / 2.0,
      z: (self.z + other.z) / 2.0,
    }
  }

  /// 图像平面上的欧氏距离（忽略 z）
  pub fn planar_distance(&self, other: &PixelPoint) -> f64 {
    ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
  }
}

/// 图像尺寸 (宽, 高)，序列化为二元数组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions(pub u32, pub u32);

impl ImageDimensions {
  pub fn new(width: u32, height: u32) -> Result<Self> {
    let dims = Self(width, height);
    dims.validate()?;
    Ok(dims)
  }

  pub fn width(&self) -> u32 {
    self.0
  }

  pub fn height(&self) -> u32 {
    self.1
  }

  pub fn validate(&self) -> Result<()> {
    if self.0 == 0 || self.1 == 0 {
      return Err(Error::invalid(format!(
        "图像尺寸必须为正数: {}x{}",
        self.0, self.1
      )));
    }
    Ok(())
  }
}

/// 17 个关键点组成的姿态
#[derive(Debug, Clone)]
pub struct Pose {
  landmarks: [Landmark; KeypointIndex::COUNT],
}

impl Pose {
  pub fn from_slice(landmarks: &[Landmark]) -> Result<Self> {
    let landmarks: [Landmark; KeypointIndex::COUNT] = landmarks.try_into().map_err(|_| {
      Error::invalid(format!(
        "关键点数量应为 {}, 实际为 {}",
        KeypointIndex::COUNT,
        landmarks.len()
      ))
    })?;
    if let Some((i, lm)) = landmarks
      .iter()
      .enumerate()
      .find(|(_, l)| !(0.0..=1.0).contains(&l.visibility))
    {
      return Err(Error::invalid(format!(
        "第 {} 个关键点可见度超出 [0, 1]: {}",
        i, lm.visibility
      )));
    }
    Ok(Self { landmarks })
  }

  pub fn get(&self, index: KeypointIndex) -> &Landmark {
    &self.landmarks[index as usize]
  }

  /// 全部关键点的平均可见度
  pub fn mean_visibility(&self) -> f64 {
    let sum: f64 = self.landmarks.iter().map(|l| l.visibility).sum();
    sum / KeypointIndex::COUNT as f64
  }
}
