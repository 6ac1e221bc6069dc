// 该文件是 Chicun （尺寸） 项目的一部分。
// src/measure.rs - 由关键点估计身体尺寸
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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::pose::{ImageDimensions, KeypointIndex, Landmark, Pose};

/// 标定用的成人平均身高（厘米）
pub const AVERAGE_HEIGHT_CM: f64 = 170.0;
/// 距离修正的参考拍摄距离（米）
pub const REFERENCE_CAMERA_DISTANCE_M: f64 = 1.5;
pub const DEFAULT_CAMERA_DISTANCE_M: f64 = 1.5;
/// 胸围 = 肩宽 × 2.8（经验值）
pub const CHEST_FROM_SHOULDER: f64 = 2.8;
/// 腰围 = 髋宽 × 2.5（经验值）
pub const WAIST_FROM_HIP_WIDTH: f64 = 2.5;
/// 臀围 = 髋宽 × 2.8（经验值）
pub const HIP_FROM_HIP_WIDTH: f64 = 2.8;
/// 内长 = (身高 - 躯干) × 0.45
pub const INSEAM_RATIO: f64 = 0.45;
/// 像素身高低于此值视为无法标定
pub const MIN_HEIGHT_PX: f64 = 1e-6;

const DEFAULT_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
  Height,
  ShoulderWidth,
  #[serde(rename = "chest_circumference")]
  Chest,
  #[serde(rename = "waist_circumference")]
  Waist,
  #[serde(rename = "hip_circumference")]
  Hip,
  TorsoLength,
  ArmLength,
  Inseam,
}

fn default_confidence() -> f64 {
  DEFAULT_CONFIDENCE
}

/// 身体尺寸（厘米），创建后不可修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyMeasurements {
  #[serde(flatten)]
  values: BTreeMap<Measurement, f64>,
  #[serde(default = "default_confidence")]
  confidence: f64,
}

impl BodyMeasurements {
  pub fn builder(confidence: f64) -> BodyMeasurementsBuilder {
    BodyMeasurementsBuilder {
      values: BTreeMap::new(),
      confidence,
    }
  }

  pub fn get(&self, measurement: Measurement) -> Option<f64> {
    self.values.get(&measurement).copied()
  }

  pub fn confidence(&self) -> f64 {
    self.confidence
  }

  pub fn iter(&self) -> impl Iterator<Item = (Measurement, f64)> + '_ {
    self.values.iter().map(|(k, v)| (*k, *v))
  }
}

pub struct BodyMeasurementsBuilder {
  values: BTreeMap<Measurement, f64>,
  confidence: f64,
}

impl BodyMeasurementsBuilder {
  pub fn with(mut self, measurement: Measurement, value: f64) -> Self {
    self.values.insert(measurement, value);
    self
  }

  pub fn build(self) -> BodyMeasurements {
    BodyMeasurements {
      values: self.values,
      confidence: self.confidence,
    }
  }
}

/// 标定参数，默认值全部取自上方常量，测试中可覆盖
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementCalibration {
  pub average_height_cm: f64,
  pub reference_distance_m: f64,
  pub camera_distance_m: f64,
  pub chest_from_shoulder: f64,
  pub waist_from_hip_width: f64,
  pub hip_from_hip_width: f64,
  pub inseam_ratio: f64,
}

impl Default for MeasurementCalibration {
  fn default() -> Self {
    Self {
      average_height_cm: AVERAGE_HEIGHT_CM,
      reference_distance_m: REFERENCE_CAMERA_DISTANCE_M,
      camera_distance_m: DEFAULT_CAMERA_DISTANCE_M,
      chest_from_shoulder: CHEST_FROM_SHOULDER,
      waist_from_hip_width: WAIST_FROM_HIP_WIDTH,
      hip_from_hip_width: HIP_FROM_HIP_WIDTH,
      inseam_ratio: INSEAM_RATIO,
    }
  }
}

impl MeasurementCalibration {
  pub fn with_camera_distance(mut self, camera_distance_m: f64) -> Self {
    self.camera_distance_m = camera_distance_m;
    self
  }

  fn distance_correction(&self) -> Result<f64> {
    if !self.camera_distance_m.is_finite() || self.camera_distance_m <= 0.0 {
      return Err(Error::invalid(format!(
        "拍摄距离必须为正数: {}",
        self.camera_distance_m
      )));
    }
    Ok(self.camera_distance_m / self.reference_distance_m)
  }
}

#[derive(Debug, Clone, Default)]
pub struct MeasurementEstimator {
  calibration: MeasurementCalibration,
}

impl MeasurementEstimator {
  pub fn new(calibration: MeasurementCalibration) -> Self {
    Self { calibration }
  }

  pub fn estimate(&self, landmarks: &[Landmark], dims: ImageDimensions) -> Result<BodyMeasurements> {
    dims.validate()?;
    let pose = Pose::from_slice(landmarks)?;
    let cal = &self.calibration;
    let px = |index: KeypointIndex| pose.get(index).to_pixel(dims);

    let left_shoulder = px(KeypointIndex::LeftShoulder);
    let right_shoulder = px(KeypointIndex::RightShoulder);
    let left_hip = px(KeypointIndex::LeftHip);
    let right_hip = px(KeypointIndex::RightHip);
    let left_elbow = px(KeypointIndex::LeftElbow);
    let left_wrist = px(KeypointIndex::LeftWrist);
    let ankle_mid = px(KeypointIndex::LeftAnkle).midpoint(&px(KeypointIndex::RightAnkle));

    let shoulder_width_px = left_shoulder.planar_distance(&right_shoulder);
    let hip_width_px = left_hip.planar_distance(&right_hip);
    let height_px = px(KeypointIndex::Nose).planar_distance(&ankle_mid);
    let torso_length_px = left_shoulder
      .midpoint(&right_shoulder)
      .planar_distance(&left_hip.midpoint(&right_hip));
    let arm_length_px =
      left_shoulder.planar_distance(&left_elbow) + left_elbow.planar_distance(&left_wrist);

    debug!(
      "像素尺寸: 身高 {:.1}, 肩宽 {:.1}, 髋宽 {:.1}, 躯干 {:.1}, 手臂 {:.1}",
      height_px, shoulder_width_px, hip_width_px, torso_length_px, arm_length_px
    );

    if !height_px.is_finite() || height_px < MIN_HEIGHT_PX {
      return Err(Error::invalid(format!(
        "像素身高过小，无法标定: {height_px}"
      )));
    }

    let ratio = cal.average_height_cm / height_px;
    // 身高本身用于标定比例，因此距离修正只作用于水平方向的尺寸
    let correction = cal.distance_correction()?;

    let height = height_px * ratio;
    let shoulder_width = shoulder_width_px * ratio * correction;
    let torso_length = torso_length_px * ratio;

    let measurements = BodyMeasurements::builder(pose.mean_visibility())
      .with(Measurement::Height, height)
      .with(Measurement::ShoulderWidth, shoulder_width)
      .with(Measurement::Chest, shoulder_width * cal.chest_from_shoulder)
      .with(
        Measurement::Waist,
        hip_width_px * ratio * correction * cal.waist_from_hip_width,
      )
      .with(
        Measurement::Hip,
        hip_width_px * ratio * correction * cal.hip_from_hip_width,
      )
      .with(Measurement::TorsoLength, torso_length)
      .with(Measurement::ArmLength, arm_length_px * ratio)
      .with(Measurement::Inseam, (height - torso_length) * cal.inseam_ratio)
      .build();

    debug!("身体尺寸: {:?}", measurements);
    Ok(measurements)
  }
}
