// 该文件是 Chicun （尺寸） 项目的一部分。
// src/fit/score.rs - 尺码匹配评分
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
use tracing::{debug, info};

use super::{
  AlternativeSize, ChartKey, FALLBACK_SIZE, MAX_ALTERNATIVES, ProductType, ScoringParams,
  SizeChart, SizeEntry, SizeRecommendation,
};
use crate::measure::BodyMeasurements;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitDescription {
  #[serde(rename = "Perfect fit")]
  Perfect,
  #[serde(rename = "Good fit")]
  Good,
  #[serde(rename = "Slightly loose")]
  SlightlyLoose,
  #[serde(rename = "Slightly tight")]
  SlightlyTight,
  #[serde(rename = "Too loose")]
  TooLoose,
  #[serde(rename = "Too tight")]
  TooTight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeasurementQuality {
  Excellent,
  Good,
  Fair,
  #[serde(rename = "Poor - Please ensure full body is visible")]
  Poor,
}

impl MeasurementQuality {
  pub fn from_confidence(confidence: f64) -> Self {
    if confidence > 0.9 {
      MeasurementQuality::Excellent
    } else if confidence > 0.8 {
      MeasurementQuality::Good
    } else if confidence > 0.7 {
      MeasurementQuality::Fair
    } else {
      MeasurementQuality::Poor
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitScoreEntry {
  pub score: f64,
  /// 身体尺寸 - 成衣尺寸，正数表示衣服偏小
  pub difference: f64,
  pub fit: FitDescription,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeScore {
  pub size: String,
  pub overall_score: f64,
  pub fit_scores: BTreeMap<ChartKey, FitScoreEntry>,
  pub confidence: f64,
}

/// 线性衰减：差值为 0 时 100 分，两倍容差时降到 0
pub fn fit_score(difference: f64, tolerance: f64) -> f64 {
  (100.0 - (difference.abs() / tolerance) * 50.0).max(0.0)
}

pub fn fit_description(difference: f64, tolerance: f64) -> FitDescription {
  let magnitude = difference.abs();
  let tight = difference > 0.0;
  if magnitude < tolerance * 0.5 {
    FitDescription::Perfect
  } else if magnitude < tolerance {
    FitDescription::Good
  } else if magnitude < tolerance * 1.5 {
    if tight {
      FitDescription::SlightlyTight
    } else {
      FitDescription::SlightlyLoose
    }
  } else if tight {
    FitDescription::TooTight
  } else {
    FitDescription::TooLoose
  }
}

pub fn score_size(
  size: &str,
  entry: &SizeEntry,
  body: &BodyMeasurements,
  product: &ProductType,
  params: &ScoringParams,
) -> SizeScore {
  let mut fit_scores = BTreeMap::new();
  let mut total_score = 0.0;
  let mut total_weight = 0.0;

  for (key, measurement) in ChartKey::SCORED {
    let (Some(chart_value), Some(body_value)) = (entry.get(key.as_str()), body.get(measurement))
    else {
      continue;
    };
    let tolerance = params.tolerance(product, key);
    let difference = body_value - chart_value;
    let score = fit_score(difference, tolerance);
    let weight = params.weights.weight(key);

    fit_scores.insert(
      key,
      FitScoreEntry {
        score,
        difference,
        fit: fit_description(difference, tolerance),
      },
    );
    total_score += score * weight;
    total_weight += weight;
  }

  let overall_score = if total_weight > 0.0 {
    total_score / total_weight
  } else {
    0.0
  };

  SizeScore {
    size: size.to_string(),
    overall_score,
    fit_scores,
    confidence: body.confidence() * (overall_score / 100.0),
  }
}

/// 对尺码表中每个尺码评分，按总分降序（稳定排序）
pub fn rank_sizes(
  body: &BodyMeasurements,
  chart: &SizeChart,
  product: &ProductType,
  params: &ScoringParams,
) -> Vec<SizeScore> {
  let mut scores: Vec<SizeScore> = chart
    .iter()
    .map(|(size, entry)| score_size(size, entry, body, product, params))
    .collect();
  scores.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));
  scores
}

pub fn recommend(
  body: &BodyMeasurements,
  chart: &SizeChart,
  product: &ProductType,
  params: &ScoringParams,
) -> SizeRecommendation {
  let measurement_quality = MeasurementQuality::from_confidence(body.confidence());
  let mut ranked = rank_sizes(body, chart, product, params).into_iter();

  let Some(best) = ranked.next() else {
    info!("尺码表为空，使用兜底尺码 {}", FALLBACK_SIZE);
    return SizeRecommendation {
      recommended_size: FALLBACK_SIZE.to_string(),
      fit_score: 0.0,
      confidence: 0.0,
      fit_details: BTreeMap::new(),
      alternative_sizes: Vec::new(),
      measurement_quality,
      virtual_fit: None,
    };
  };

  let alternative_sizes: Vec<AlternativeSize> = ranked
    .filter(|s| s.overall_score > params.alternative_threshold)
    .take(MAX_ALTERNATIVES)
    .map(|s| AlternativeSize {
      size: s.size,
      score: s.overall_score,
    })
    .collect();

  debug!(
    "推荐尺码 {} (得分 {:.1}), 备选 {:?}",
    best.size, best.overall_score, alternative_sizes
  );

  SizeRecommendation {
    recommended_size: best.size,
    fit_score: best.overall_score,
    confidence: best.confidence,
    fit_details: best.fit_scores,
    alternative_sizes,
    measurement_quality,
    virtual_fit: None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::measure::Measurement;

  fn body() -> BodyMeasurements {
    BodyMeasurements::builder(0.95)
      .with(Measurement::Chest, 100.0)
      .with(Measurement::Waist, 80.0)
      .with(Measurement::Hip, 96.0)
      .build()
  }

  fn entry(chest: f64, waist: f64, hip: f64) -> SizeEntry {
    SizeEntry::from([
      ("chest".to_string(), chest),
      ("waist".to_string(), waist),
      ("hip".to_string(), hip),
    ])
  }

  fn chart() -> SizeChart {
    SizeChart::from([
      ("M".to_string(), entry(98.0, 78.0, 95.0)),
      ("L".to_string(), entry(104.0, 84.0, 100.0)),
    ])
  }

  #[test]
  fn test_fit_score_curve() {
    assert_eq!(fit_score(0.0, 5.0), 100.0);
    assert!((fit_score(2.0, 5.0) - 80.0).abs() < 1e-9);
    assert_eq!(fit_score(10.0, 5.0), 0.0);
    assert_eq!(fit_score(-25.0, 5.0), 0.0);
    let mut last = f64::MAX;
    for i in 0..200 {
      let s = fit_score(i as f64 * 0.1, 5.0);
      assert!(s <= last);
      last = s;
    }
  }

  #[test]
  fn test_fit_description_buckets() {
    assert_eq!(fit_description(2.0, 5.0), FitDescription::Perfect);
    assert_eq!(fit_description(-3.0, 5.0), FitDescription::Good);
    assert_eq!(fit_description(6.0, 5.0), FitDescription::SlightlyTight);
    assert_eq!(fit_description(-6.0, 5.0), FitDescription::SlightlyLoose);
    assert_eq!(fit_description(7.5, 5.0), FitDescription::TooTight);
    assert_eq!(fit_description(-9.0, 5.0), FitDescription::TooLoose);
  }

  #[test]
  fn test_shirt_example_prefers_m() {
    let rec = recommend(&body(), &chart(), &ProductType::Shirt, &ScoringParams::default());
    assert_eq!(rec.recommended_size, "M");
    let chest = &rec.fit_details[&ChartKey::Chest];
    assert!((chest.score - 80.0).abs() < 1e-9);
    assert!((chest.difference - 2.0).abs() < 1e-9);
    assert!((rec.confidence - 0.95 * rec.fit_score / 100.0).abs() < 1e-12);
    assert_eq!(rec.measurement_quality, MeasurementQuality::Excellent);
  }

  #[test]
  fn test_alternatives_exclude_winner_and_cap() {
    let mut chart = chart();
    chart.insert("M2".to_string(), entry(99.0, 79.0, 95.0));
    chart.insert("M3".to_string(), entry(100.0, 80.0, 97.0));
    chart.insert("M4".to_string(), entry(101.0, 80.0, 96.0));
    let rec = recommend(&body(), &chart, &ProductType::Shirt, &ScoringParams::default());
    assert!(rec.alternative_sizes.len() <= MAX_ALTERNATIVES);
    assert!(
      rec
        .alternative_sizes
        .iter()
        .all(|a| a.size != rec.recommended_size && a.score > 70.0)
    );
    let scores: Vec<f64> = rec.alternative_sizes.iter().map(|a| a.score).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
  }

  #[test]
  fn test_partial_measurements_normalize_weights() {
    let body = BodyMeasurements::builder(1.0)
      .with(Measurement::Chest, 100.0)
      .build();
    let score = score_size(
      "M",
      &entry(100.0, 60.0, 60.0),
      &body,
      &ProductType::Default,
      &ScoringParams::default(),
    );
    assert!((score.overall_score - 100.0).abs() < 1e-9);
    assert_eq!(score.fit_scores.len(), 1);
  }

  #[test]
  fn test_empty_chart_falls_back() {
    let rec = recommend(
      &body(),
      &SizeChart::new(),
      &ProductType::Shirt,
      &ScoringParams::default(),
    );
    assert_eq!(rec.recommended_size, FALLBACK_SIZE);
    assert_eq!(rec.fit_score, 0.0);
    assert_eq!(rec.confidence, 0.0);
    assert!(rec.fit_details.is_empty());
    assert!(rec.alternative_sizes.is_empty());
  }

  #[test]
  fn test_ranking_is_deterministic() {
    let a = recommend(&body(), &chart(), &ProductType::Dress, &ScoringParams::default());
    let b = recommend(&body(), &chart(), &ProductType::Dress, &ScoringParams::default());
    assert_eq!(a, b);
  }

  #[test]
  fn test_quality_buckets() {
    assert_eq!(MeasurementQuality::from_confidence(0.95), MeasurementQuality::Excellent);
    assert_eq!(MeasurementQuality::from_confidence(0.9), MeasurementQuality::Good);
    assert_eq!(MeasurementQuality::from_confidence(0.75), MeasurementQuality::Fair);
    assert_eq!(MeasurementQuality::from_confidence(0.7), MeasurementQuality::Poor);
    assert_eq!(
      serde_json::to_value(MeasurementQuality::Poor).unwrap(),
      "Poor - Please ensure full body is visible"
    );
  }
}
