// 该文件是 Chicun （尺寸） 项目的一部分。
// src/fit/virtual_fit.rs - 虚拟试穿模拟
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

use super::{ChartKey, MaterialProperties, SizeChart, SizeEntry};
use crate::error::{Error, Result};
use crate::measure::{BodyMeasurements, Measurement};

// 胸围偏紧/偏松阈值（厘米），对宽松的容忍度更高
const TIGHT_THRESHOLD_CM: f64 = 5.0;
const LOOSE_THRESHOLD_CM: f64 = -10.0;
const TIGHT_SEVERITY_SPAN_CM: f64 = 10.0;
const LOOSE_SEVERITY_SPAN_CM: f64 = 15.0;
const COMFORT_SEVERITY_WEIGHT: f64 = 0.3;
const FULL_COMFORT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitIssue {
  TooTight,
  TooLoose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemArea {
  pub area: ChartKey,
  pub issue: FitIssue,
  pub severity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StretchArea {
  pub area: ChartKey,
  pub stretch_percentage: f64,
  pub within_limits: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub excess: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualFitResult {
  pub overall_fit: String,
  pub problem_areas: Vec<ProblemArea>,
  pub stretch_areas: Vec<StretchArea>,
  pub comfort_score: u32,
  pub movement_restriction: String,
  pub visual_adjustments: BTreeMap<String, f64>,
  pub material: MaterialProperties,
}

pub fn simulate<S: AsRef<str>>(
  body: &BodyMeasurements,
  chart: &SizeChart,
  materials: &[S],
  size: &str,
) -> Result<VirtualFitResult> {
  let entry = chart
    .get(size)
    .ok_or_else(|| Error::SizeNotFound(size.to_string()))?;
  let material = MaterialProperties::from_materials(materials);

  let mut problem_areas = Vec::new();
  let mut visual_adjustments = BTreeMap::new();

  if let (Some(chart_chest), Some(body_chest)) = (
    entry.get(ChartKey::Chest.as_str()),
    body.get(Measurement::Chest),
  ) {
    let diff = body_chest - chart_chest;
    if diff > TIGHT_THRESHOLD_CM {
      problem_areas.push(ProblemArea {
        area: ChartKey::Chest,
        issue: FitIssue::TooTight,
        severity: (diff / TIGHT_SEVERITY_SPAN_CM).min(1.0),
      });
      visual_adjustments.insert("chest_stretch".to_string(), diff / 100.0);
    } else if diff < LOOSE_THRESHOLD_CM {
      problem_areas.push(ProblemArea {
        area: ChartKey::Chest,
        issue: FitIssue::TooLoose,
        severity: (diff.abs() / LOOSE_SEVERITY_SPAN_CM).min(1.0),
      });
    }
  }

  let stretch_areas = if material.stretch_factor > 0.0 {
    stretch_areas(body, entry, material.stretch_factor)
  } else {
    Vec::new()
  };

  let comfort_score = comfort_score(&problem_areas);
  debug!(
    "尺码 {} 虚拟试穿: 问题区域 {}, 拉伸区域 {}, 舒适度 {}",
    size,
    problem_areas.len(),
    stretch_areas.len(),
    comfort_score
  );

  Ok(VirtualFitResult {
    overall_fit: "good".to_string(),
    problem_areas,
    stretch_areas,
    comfort_score,
    movement_restriction: "minimal".to_string(),
    visual_adjustments,
    material,
  })
}

fn stretch_areas(body: &BodyMeasurements, entry: &SizeEntry, stretch_factor: f64) -> Vec<StretchArea> {
  let mut areas = Vec::new();
  for (key, measurement) in ChartKey::SCORED {
    let (Some(chart_value), Some(body_value)) = (entry.get(key.as_str()), body.get(measurement))
    else {
      continue;
    };
    let diff = body_value - chart_value;
    let limit = chart_value * stretch_factor;

    if diff > 0.0 && diff <= limit {
      areas.push(StretchArea {
        area: key,
        stretch_percentage: diff / chart_value * 100.0,
        within_limits: true,
        excess: None,
      });
    } else if diff > limit {
      areas.push(StretchArea {
        area: key,
        stretch_percentage: stretch_factor * 100.0,
        within_limits: false,
        excess: Some(diff - limit),
      });
    }
  }
  areas
}

fn comfort_score(problem_areas: &[ProblemArea]) -> u32 {
  if problem_areas.is_empty() {
    return FULL_COMFORT;
  }
  let sum: f64 = problem_areas
    .iter()
    .map(|p| 1.0 - p.severity * COMFORT_SEVERITY_WEIGHT)
    .sum();
  (sum / problem_areas.len() as f64 * 100.0) as u32
}

#[cfg(test)]
mod tests {
  use super::*;

  fn chart(chest: f64, waist: f64) -> SizeChart {
    SizeChart::from([(
      "M".to_string(),
      SizeEntry::from([("chest".to_string(), chest), ("waist".to_string(), waist)]),
    )])
  }

  fn body(chest: f64, waist: f64) -> BodyMeasurements {
    BodyMeasurements::builder(1.0)
      .with(Measurement::Chest, chest)
      .with(Measurement::Waist, waist)
      .build()
  }

  const NO_MATERIALS: [&str; 0] = [];

  #[test]
  fn test_missing_size() {
    let err = simulate(&body(100.0, 80.0), &chart(100.0, 80.0), &NO_MATERIALS, "XL").unwrap_err();
    assert_eq!(err, Error::SizeNotFound("XL".to_string()));
  }

  #[test]
  fn test_tight_threshold_is_strict() {
    let at = simulate(&body(105.0, 80.0), &chart(100.0, 80.0), &NO_MATERIALS, "M").unwrap();
    assert!(at.problem_areas.is_empty());
    assert_eq!(at.comfort_score, 100);

    let over = simulate(&body(105.01, 80.0), &chart(100.0, 80.0), &NO_MATERIALS, "M").unwrap();
    assert_eq!(over.problem_areas.len(), 1);
    assert_eq!(over.problem_areas[0].issue, FitIssue::TooTight);
    assert!((over.problem_areas[0].severity - 0.501).abs() < 1e-9);
    assert!(over.visual_adjustments.contains_key("chest_stretch"));
  }

  #[test]
  fn test_loose_threshold_and_comfort() {
    let result = simulate(&body(85.0, 80.0), &chart(100.0, 80.0), &NO_MATERIALS, "M").unwrap();
    assert_eq!(result.problem_areas[0].issue, FitIssue::TooLoose);
    assert!((result.problem_areas[0].severity - 1.0).abs() < 1e-12);
    // 1 - 1.0 * 0.3 = 0.7
    assert_eq!(result.comfort_score, 70);

    let ok = simulate(&body(90.0, 80.0), &chart(100.0, 80.0), &NO_MATERIALS, "M").unwrap();
    assert!(ok.problem_areas.is_empty());
  }

  #[test]
  fn test_stretch_areas_need_elastic_material() {
    let plain = simulate(&body(104.0, 82.0), &chart(100.0, 80.0), &["cotton"], "M").unwrap();
    assert!(plain.stretch_areas.is_empty());

    let stretchy = simulate(&body(104.0, 95.0), &chart(100.0, 80.0), &["spandex"], "M").unwrap();
    assert_eq!(stretchy.stretch_areas.len(), 2);

    let chest = &stretchy.stretch_areas[0];
    assert_eq!(chest.area, ChartKey::Chest);
    assert!(chest.within_limits);
    assert!((chest.stretch_percentage - 4.0).abs() < 1e-9);
    assert!(chest.excess.is_none());

    // 腰围限制 80 * 0.15 = 12，超出 3
    let waist = &stretchy.stretch_areas[1];
    assert!(!waist.within_limits);
    assert!((waist.stretch_percentage - 15.0).abs() < 1e-9);
    assert!((waist.excess.unwrap() - 3.0).abs() < 1e-9);
  }
}
