// 该文件是 Chicun （尺寸） 项目的一部分。
// src/task.rs - 单次与连续处理任务
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

use std::{thread, time::Duration, time::Instant};
use tracing::{info, warn};

use crate::{api::ErrorResponse, model::Model, output::Render};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error>;
}

/// 处理第一个请求；失败时先输出错误响应再返回错误
pub struct OneShotTask;

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let Some(request) = input.next() else {
      output.render_error(&ErrorResponse::new("没有输入请求"))?;
      anyhow::bail!("没有输入请求");
    };
    let now = Instant::now();
    match model.infer(&request) {
      Ok(result) => {
        info!("推理完成，耗时: {:.2?}", now.elapsed());
        output.render_result(&request, &result)?;
        Ok(())
      }
      Err(e) => {
        warn!("请求处理失败: {}", e);
        output.render_error(&ErrorResponse::new(&e))?;
        Err(e.into())
      }
    }
  }
}

/// 逐个处理请求直到输入结束、达到请求数上限或收到中断信号
///
/// 输入中的每一项都对应一次输出，读取失败的项输出错误响应。
#[derive(Default, Debug)]
pub struct ContinuousTask {
  max_requests: Option<usize>,
}

impl ContinuousTask {
  pub fn with_max_requests(mut self, max_requests: Option<usize>) -> Self {
    self.max_requests = max_requests;
    self
  }
}

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  SE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = Result<F, SE>>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for ContinuousTask
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let (tx, rx) = std::sync::mpsc::channel();

    if let Err(e) = ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = tx.send(());
      thread::spawn(|| {
        thread::sleep(Duration::from_secs(30));
        warn!("强制退出程序");
        std::process::exit(1);
      });
    }) {
      warn!("无法设置中断处理: {}", e);
    }

    let mut request_index = 0usize;
    let mut failures = 0usize;
    for request in input {
      request_index = request_index.saturating_add(1);
      info!("处理第 {} 个请求", request_index);
      let now = Instant::now();
      let outcome = match request {
        Ok(request) => match model.infer(&request) {
          Ok(result) => Ok(output.render_result(&request, &result)?),
          Err(e) => Err(ErrorResponse::new(&e)),
        },
        Err(e) => Err(ErrorResponse::new(&e)),
      };
      if let Err(response) = outcome {
        failures += 1;
        warn!("第 {} 个请求失败: {}", request_index, response.error);
        output.render_error(&response)?;
      }
      info!("处理完成，耗时: {:.2?}", now.elapsed());

      if self.max_requests.is_some_and(|n| request_index >= n) {
        info!("达到指定请求数 {}, 退出任务循环", request_index);
        break;
      }
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!("任务结束: 共 {} 个请求, 失败 {}", request_index, failures);
    Ok(())
  }
}
