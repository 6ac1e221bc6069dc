// 该文件是 Chicun （尺寸） 项目的一部分。
// src/main.rs - 命令行入口
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

mod args;

use anyhow::Result;
use clap::Parser;
use serde::de::DeserializeOwned;
use tracing::info;
use url::Url;

use chicun::{
  FromUrl, FurniturePlacementEngine, SizeRecommendationEngine,
  api::{ErrorResponse, FurniturePlacementRequest, SizeRecommendationRequest, health},
  input::RequestSource,
  measure::{MeasurementCalibration, MeasurementEstimator},
  model::SizeEstimator,
  output::{OutputWrapper, Render},
  task::{ContinuousTask, OneShotTask, Task},
};

use args::{Args, Command, ServeKind};

fn size_engine(model: Option<&Url>, camera_distance: f64) -> SizeRecommendationEngine {
  let calibration = MeasurementCalibration::default().with_camera_distance(camera_distance);
  SizeRecommendationEngine::new(
    SizeEstimator::from_model_url(model),
    MeasurementEstimator::new(calibration),
  )
}

/// 读取单个请求，解析失败时输出错误响应
fn read_request<T: DeserializeOwned>(source: &RequestSource, output: &OutputWrapper) -> Result<T> {
  match source.read_one() {
    Ok(request) => Ok(request),
    Err(e) => {
      Render::<(), ()>::render_error(output, &ErrorResponse::new(&e))?;
      Err(e.into())
    }
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  match args.command {
    Command::Size {
      input,
      output,
      model,
      camera_distance,
    } => {
      info!("输入来源: {}", input);
      info!("输出路径: {}", output);
      let source = RequestSource::from_url(&input)?;
      let output = OutputWrapper::from_url(&output)?;
      let engine = size_engine(model.as_ref(), camera_distance);
      let request: SizeRecommendationRequest = read_request(&source, &output)?;
      OneShotTask.run_task(std::iter::once(request), engine, output)?;
    }
    Command::Furniture {
      input,
      output,
      #[cfg(feature = "read_depth_image")]
      depth_image,
    } => {
      info!("输入来源: {}", input);
      info!("输出路径: {}", output);
      let source = RequestSource::from_url(&input)?;
      let output = OutputWrapper::from_url(&output)?;
      #[allow(unused_mut)]
      let mut request: FurniturePlacementRequest = read_request(&source, &output)?;

      #[cfg(feature = "read_depth_image")]
      if let Some(url) = depth_image {
        info!("深度图像: {}", url);
        request.room_data.depth_map =
          chicun::input::DepthImageInput::from_url(&url)?.into_depth_map();
      }

      let engine: FurniturePlacementEngine = FurniturePlacementEngine::default();
      OneShotTask.run_task(std::iter::once(request), engine, output)?;
    }
    Command::Health { output } => {
      let output = OutputWrapper::from_url(&output)?;
      output.render_result(&(), &health())?;
    }
    Command::Serve {
      kind,
      input,
      output,
      max_requests,
      model,
      camera_distance,
    } => {
      info!("持续处理 {:?} 请求, 输入来源: {}", kind, input);
      let source = RequestSource::from_url(&input)?;
      let output = OutputWrapper::from_url(&output)?;
      let task = ContinuousTask::default().with_max_requests(max_requests);
      match kind {
        ServeKind::Size => task.run_task(
          source.into_lines::<SizeRecommendationRequest>()?,
          size_engine(model.as_ref(), camera_distance),
          output,
        )?,
        ServeKind::Furniture => {
          let engine: FurniturePlacementEngine = FurniturePlacementEngine::default();
          task.run_task(
            source.into_lines::<FurniturePlacementRequest>()?,
            engine,
            output,
          )?
        }
      }
    }
  }

  Ok(())
}
