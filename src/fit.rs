// 该文件是 Chicun （尺寸） 项目的一部分。
// src/fit.rs - 尺码推荐与虚拟试穿
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

use crate::measure::Measurement;

mod material;
mod score;
mod virtual_fit;

pub use self::material::MaterialProperties;
pub use self::score::{
  FitDescription, FitScoreEntry, MeasurementQuality, SizeScore, fit_description, fit_score,
  rank_sizes, recommend, score_size,
};
pub use self::virtual_fit::{FitIssue, ProblemArea, StretchArea, VirtualFitResult, simulate};

/// 单个尺码的成衣尺寸：测量名 -> 厘米
pub type SizeEntry = BTreeMap<String, f64>;
/// 尺码表：尺码标签 -> 成衣尺寸，按标签排序以保证并列时结果确定
pub type SizeChart = BTreeMap<String, SizeEntry>;

/// 尺码表为空时的兜底尺码
pub const FALLBACK_SIZE: &str = "M";
/// 容差表中缺项时使用的容差（厘米）
pub const FALLBACK_TOLERANCE_CM: f64 = 5.0;
pub const CHEST_WEIGHT: f64 = 0.4;
pub const WAIST_WEIGHT: f64 = 0.3;
pub const HIP_WEIGHT: f64 = 0.3;
/// 备选尺码的最低分数（严格大于）
pub const ALTERNATIVE_MIN_SCORE: f64 = 70.0;
pub const MAX_ALTERNATIVES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKey {
  Chest,
  Waist,
  Hip,
  Shoulder,
  Length,
  Inseam,
}

impl ChartKey {
  pub fn as_str(&self) -> &'static str {
    match self {
      ChartKey::Chest => "chest",
      ChartKey::Waist => "waist",
      ChartKey::Hip => "hip",
      ChartKey::Shoulder => "shoulder",
      ChartKey::Length => "length",
      ChartKey::Inseam => "inseam",
    }
  }

  /// 参与评分的成衣尺寸及其对应的身体尺寸
  pub const SCORED: [(ChartKey, Measurement); 3] = [
    (ChartKey::Chest, Measurement::Chest),
    (ChartKey::Waist, Measurement::Waist),
    (ChartKey::Hip, Measurement::Hip),
  ];
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
  Shirt,
  Pants,
  Dress,
  Jacket,
  /// 未知品类都归入默认容差
  Default,
}

impl From<&str> for ProductType {
  fn from(value: &str) -> Self {
    match value.trim().to_ascii_lowercase().as_str() {
      "shirt" => ProductType::Shirt,
      "pants" => ProductType::Pants,
      "dress" => ProductType::Dress,
      "jacket" => ProductType::Jacket,
      _ => ProductType::Default,
    }
  }
}

impl From<String> for ProductType {
  fn from(value: String) -> Self {
    ProductType::from(value.as_str())
  }
}

impl From<ProductType> for String {
  fn from(value: ProductType) -> Self {
    match value {
      ProductType::Shirt => "shirt",
      ProductType::Pants => "pants",
      ProductType::Dress => "dress",
      ProductType::Jacket => "jacket",
      ProductType::Default => "default",
    }
    .to_string()
  }
}

impl ProductType {
  /// 规则容差表（厘米）
  pub fn rule_tolerance(&self, key: ChartKey) -> Option<f64> {
    use ChartKey::*;
    match (self, key) {
      (ProductType::Shirt, Chest) => Some(5.0),
      (ProductType::Shirt, Waist) => Some(8.0),
      (ProductType::Shirt, Length) => Some(3.0),
      (ProductType::Pants, Waist) => Some(3.0),
      (ProductType::Pants, Hip) => Some(5.0),
      (ProductType::Pants, Inseam) => Some(2.0),
      (ProductType::Dress, Chest) => Some(4.0),
      (ProductType::Dress, Waist | Hip) => Some(6.0),
      (ProductType::Jacket, Chest) => Some(6.0),
      (ProductType::Jacket, Shoulder) => Some(2.0),
      (ProductType::Jacket, Length) => Some(4.0),
      (ProductType::Default, Chest | Waist | Hip) => Some(5.0),
      _ => None,
    }
  }
}

/// 胸/腰/臀的加权
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
  pub chest: f64,
  pub waist: f64,
  pub hip: f64,
}

impl Default for ScoringWeights {
  fn default() -> Self {
    Self {
      chest: CHEST_WEIGHT,
      waist: WAIST_WEIGHT,
      hip: HIP_WEIGHT,
    }
  }
}

impl ScoringWeights {
  pub fn weight(&self, key: ChartKey) -> f64 {
    match key {
      ChartKey::Chest => self.chest,
      ChartKey::Waist => self.waist,
      ChartKey::Hip => self.hip,
      _ => 0.0,
    }
  }
}

/// 评分参数，规则模式使用默认值，学习模型可以覆盖其中一部分
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringParams {
  pub weights: ScoringWeights,
  pub tolerance_overrides: BTreeMap<ProductType, BTreeMap<ChartKey, f64>>,
  pub alternative_threshold: f64,
}

impl Default for ScoringParams {
  fn default() -> Self {
    Self {
      weights: ScoringWeights::default(),
      tolerance_overrides: BTreeMap::new(),
      alternative_threshold: ALTERNATIVE_MIN_SCORE,
    }
  }
}

impl ScoringParams {
  pub fn tolerance(&self, product: &ProductType, key: ChartKey) -> f64 {
    self
      .tolerance_overrides
      .get(product)
      .and_then(|t| t.get(&key).copied())
      .or_else(|| product.rule_tolerance(key))
      .unwrap_or(FALLBACK_TOLERANCE_CM)
  }
}

fn default_product_type() -> String {
  "clothing".to_string()
}

/// 商品数据：尺码表、品类与面料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
  #[serde(default)]
  pub measurements: SizeChart,
  #[serde(rename = "type", default = "default_product_type")]
  pub product_type: String,
  #[serde(default)]
  pub materials: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlternativeSize {
  pub size: String,
  pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeRecommendation {
  pub recommended_size: String,
  pub fit_score: f64,
  pub confidence: f64,
  pub fit_details: BTreeMap<ChartKey, FitScoreEntry>,
  pub alternative_sizes: Vec<AlternativeSize>,
  pub measurement_quality: MeasurementQuality,
  /// 推荐尺码不在尺码表中（空表兜底）时为空
  pub virtual_fit: Option<VirtualFitResult>,
}
