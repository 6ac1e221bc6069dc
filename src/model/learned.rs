// 该文件是 Chicun （尺寸） 项目的一部分。
// src/model/learned.rs - 学习得到的尺码评分参数
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

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  fit::{ChartKey, ProductType, ScoringParams, ScoringWeights},
};

#[derive(Error, Debug)]
pub enum LearnedModelError {
  #[error("模型路径必须使用 {0} 方案")]
  SchemeMismatch(&'static str),
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("模型解析错误: {0}")]
  ModelParseError(#[from] serde_json::Error),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
}

/// 模型文件格式，缺省项沿用规则表
#[derive(Debug, Deserialize)]
struct LearnedArtifact {
  #[serde(default)]
  weights: Option<ScoringWeights>,
  #[serde(default)]
  tolerances: BTreeMap<ProductType, BTreeMap<ChartKey, f64>>,
  #[serde(default)]
  alternative_threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LearnedSizeModel {
  params: ScoringParams,
}

impl LearnedSizeModel {
  pub fn params(&self) -> &ScoringParams {
    &self.params
  }

  pub fn from_json_str(json: &str) -> Result<Self, LearnedModelError> {
    let artifact: LearnedArtifact = serde_json::from_str(json)?;
    let mut params = ScoringParams::default();

    if let Some(weights) = artifact.weights {
      let ws = [weights.chest, weights.waist, weights.hip];
      if ws.iter().any(|w| !w.is_finite() || *w < 0.0) || ws.iter().sum::<f64>() <= 0.0 {
        error!("模型权重无效: {:?}", weights);
        return Err(LearnedModelError::ModelInvalid(format!(
          "权重必须非负且总和为正: {:?}",
          weights
        )));
      }
      params.weights = weights;
    }

    for (product, table) in &artifact.tolerances {
      if let Some((key, tol)) = table.iter().find(|(_, t)| !t.is_finite() || **t <= 0.0) {
        return Err(LearnedModelError::ModelInvalid(format!(
          "容差必须为正数: {:?}.{} = {}",
          product,
          key.as_str(),
          tol
        )));
      }
    }
    params.tolerance_overrides = artifact.tolerances;

    if let Some(threshold) = artifact.alternative_threshold {
      if !(0.0..=100.0).contains(&threshold) {
        return Err(LearnedModelError::ModelInvalid(format!(
          "备选阈值超出范围: {}",
          threshold
        )));
      }
      params.alternative_threshold = threshold;
    }

    debug!("学习模型参数: {:?}", params);
    Ok(Self { params })
  }
}

pub struct LearnedSizeModelBuilder {
  model_path: String,
}

impl FromUrlWithScheme for LearnedSizeModelBuilder {
  const SCHEME: &'static str = "learned";
}

impl FromUrl for LearnedSizeModelBuilder {
  type Error = LearnedModelError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LearnedModelError::SchemeMismatch(Self::SCHEME));
    }

    Ok(LearnedSizeModelBuilder {
      model_path: url.path().to_string(),
    })
  }
}

impl LearnedSizeModelBuilder {
  pub fn build(self) -> Result<LearnedSizeModel, LearnedModelError> {
    info!("加载模型文件: {}", self.model_path);
    let content = std::fs::read_to_string(&self.model_path)?;
    debug!("模型文件大小: {} 字节", content.len());
    LearnedSizeModel::from_json_str(&content)
  }
}
