// 该文件是 Chicun （尺寸） 项目的一部分。
// src/engine.rs - 尺码推荐与家具摆放引擎
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

use crate::{
  api::{FurniturePlacementRequest, SizeRecommendationRequest},
  error::{Error, Result},
  fit::{SizeRecommendation, simulate},
  measure::MeasurementEstimator,
  model::{Model, SizeEstimator},
  room::{
    PlacementResult, PlacementScorer, RoomSpaceAnalyzer, SimplifiedSegmentation,
    SimplifiedWallGeometry, SpaceSegmentation, WallGeometry,
  },
};

/// 关键点 -> 身体尺寸 -> 尺码评分 -> 虚拟试穿
#[derive(Debug, Clone, Default)]
pub struct SizeRecommendationEngine {
  estimator: SizeEstimator,
  measurer: MeasurementEstimator,
}

impl SizeRecommendationEngine {
  pub fn new(estimator: SizeEstimator, measurer: MeasurementEstimator) -> Self {
    info!("尺码推荐引擎: {} 模式", estimator.kind());
    Self {
      estimator,
      measurer,
    }
  }

  pub fn estimator(&self) -> &SizeEstimator {
    &self.estimator
  }

  pub fn recommend(&self, request: &SizeRecommendationRequest) -> Result<SizeRecommendation> {
    let body = self
      .measurer
      .estimate(&request.body_landmarks, request.image_dimensions)?;
    debug!("身体尺寸: {:?}", body);

    let product = &request.product_data;
    let mut recommendation =
      self
        .estimator
        .recommend(&body, &product.measurements, &product.product_type);

    recommendation.virtual_fit = match simulate(
      &body,
      &product.measurements,
      &product.materials,
      &recommendation.recommended_size,
    ) {
      Ok(fit) => Some(fit),
      Err(Error::SizeNotFound(size)) => {
        info!("尺码 {} 不在尺码表中，跳过虚拟试穿", size);
        None
      }
      Err(e) => return Err(e),
    };

    Ok(recommendation)
  }
}

impl Model for SizeRecommendationEngine {
  type Input = SizeRecommendationRequest;
  type Output = SizeRecommendation;
  type Error = Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output> {
    self.recommend(input)
  }
}

/// 深度图与平面 -> 房间分析 -> 摆放评分
#[derive(Debug, Clone, Default)]
pub struct FurniturePlacementEngine<S = SimplifiedSegmentation, G = SimplifiedWallGeometry> {
  analyzer: RoomSpaceAnalyzer<S>,
  scorer: PlacementScorer<G>,
}

impl<S: SpaceSegmentation, G: WallGeometry> FurniturePlacementEngine<S, G> {
  pub fn new(analyzer: RoomSpaceAnalyzer<S>, scorer: PlacementScorer<G>) -> Self {
    Self { analyzer, scorer }
  }

  pub fn place(&self, request: &FurniturePlacementRequest) -> Result<PlacementResult> {
    let room = &request.room_data;
    let analysis =
      self
        .analyzer
        .analyze(&room.depth_map, &room.camera_intrinsics, &room.detected_planes);

    let furniture = &request.furniture_data;
    let result = self
      .scorer
      .place(&analysis, &furniture.dimensions, &furniture.furniture_type);
    info!(
      "家具摆放: 可放置 {}, 候选 {}, 兼容度 {:.2}",
      result.furniture_fits,
      result.recommended_placements.len(),
      result.room_compatibility_score
    );
    Ok(result)
  }
}

impl<S: SpaceSegmentation, G: WallGeometry> Model for FurniturePlacementEngine<S, G> {
  type Input = FurniturePlacementRequest;
  type Output = PlacementResult;
  type Error = Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output> {
    self.place(input)
  }
}
