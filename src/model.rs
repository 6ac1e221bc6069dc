// 该文件是 Chicun （尺寸） 项目的一部分。
// src/model.rs - 模型与尺码估计策略
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

use std::borrow::Cow;

use tracing::{info, warn};
use url::Url;

use crate::{
  FromUrl,
  error::Error,
  fit::{ProductType, ScoringParams, SizeChart, SizeRecommendation, recommend},
  measure::BodyMeasurements,
};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

mod learned;
pub use self::learned::{LearnedModelError, LearnedSizeModel, LearnedSizeModelBuilder};

const RULE_SCHEME: &str = "rule";

/// 尺码估计策略，在构造引擎时一次性选定
#[derive(Debug, Clone, Default)]
pub enum SizeEstimator {
  #[default]
  RuleBased,
  Learned(LearnedSizeModel),
}

impl SizeEstimator {
  /// 按 URL 加载估计器；学习模型不可用时回退到规则模式，不会返回错误
  pub fn from_model_url(url: Option<&Url>) -> Self {
    match url {
      None => SizeEstimator::RuleBased,
      Some(url) if url.scheme() == RULE_SCHEME => SizeEstimator::RuleBased,
      Some(url) => match Self::load(url) {
        Ok(estimator) => estimator,
        Err(e) => {
          warn!("{}，使用规则模式", e);
          SizeEstimator::RuleBased
        }
      },
    }
  }

  /// 加载学习模型，失败时返回 `Error::ModelUnavailable`
  pub fn load(url: &Url) -> Result<Self, Error> {
    let model = LearnedSizeModelBuilder::from_url(url)
      .and_then(|builder| builder.build())
      .map_err(|e| Error::ModelUnavailable {
        path: url.path().to_string(),
        reason: e.to_string(),
      })?;
    info!("已加载学习模型: {}", url);
    Ok(SizeEstimator::Learned(model))
  }

  pub fn kind(&self) -> &'static str {
    match self {
      SizeEstimator::RuleBased => "rule",
      SizeEstimator::Learned(_) => "learned",
    }
  }

  pub fn params(&self) -> Cow<'_, ScoringParams> {
    match self {
      SizeEstimator::RuleBased => Cow::Owned(ScoringParams::default()),
      SizeEstimator::Learned(model) => Cow::Borrowed(model.params()),
    }
  }

  pub fn recommend(
    &self,
    body: &BodyMeasurements,
    chart: &SizeChart,
    product_type: &str,
  ) -> SizeRecommendation {
    let product = ProductType::from(product_type);
    recommend(body, chart, &product, &self.params())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_model_falls_back_to_rules() {
    let url = Url::parse("learned:///definitely/not/here/model.json").unwrap();
    assert!(matches!(
      SizeEstimator::load(&url),
      Err(Error::ModelUnavailable { .. })
    ));
    let estimator = SizeEstimator::from_model_url(Some(&url));
    assert_eq!(estimator.kind(), "rule");
  }

  #[test]
  fn test_rule_scheme_and_none() {
    let url = Url::parse("rule:").unwrap();
    assert_eq!(SizeEstimator::from_model_url(Some(&url)).kind(), "rule");
    assert_eq!(SizeEstimator::from_model_url(None).kind(), "rule");
    assert_eq!(*SizeEstimator::RuleBased.params(), ScoringParams::default());
  }
}
