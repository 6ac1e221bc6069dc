// 该文件是 Chicun （尺寸） 项目的一部分。
// src/fit/material.rs - 面料属性估计
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

const ELASTIC_FIBERS: [&str; 4] = ["spandex", "elastane", "lycra", "stretch"];
const BREATHABLE_FIBERS: [&str; 3] = ["cotton", "linen", "bamboo"];
const SYNTHETIC_FIBERS: [&str; 2] = ["polyester", "nylon"];

const ELASTIC_STRETCH: f64 = 0.15;
const COTTON_STRETCH: f64 = 0.08;
const BREATHABLE: f64 = 0.8;
const SYNTHETIC_BREATHABILITY: f64 = 0.4;
const NEUTRAL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperties {
  pub stretch_factor: f64,
  pub breathability: f64,
  pub thickness: f64,
  pub drape: f64,
}

impl Default for MaterialProperties {
  fn default() -> Self {
    Self {
      stretch_factor: 0.0,
      breathability: NEUTRAL,
      thickness: NEUTRAL,
      drape: NEUTRAL,
    }
  }
}

impl MaterialProperties {
  /// 对小写拼接后的面料描述做子串匹配
  pub fn from_materials<S: AsRef<str>>(materials: &[S]) -> Self {
    let text = materials
      .iter()
      .map(|m| m.as_ref())
      .collect::<Vec<_>>()
      .join(" ")
      .to_lowercase();
    let has = |word: &&str| text.contains(*word);

    let mut props = Self::default();

    if ELASTIC_FIBERS.iter().any(has) {
      props.stretch_factor = ELASTIC_STRETCH;
    } else if text.contains("cotton") && text.contains("stretch") {
      props.stretch_factor = COTTON_STRETCH;
    }

    if BREATHABLE_FIBERS.iter().any(has) {
      props.breathability = BREATHABLE;
    } else if SYNTHETIC_FIBERS.iter().any(has) {
      props.breathability = SYNTHETIC_BREATHABILITY;
    }

    props
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_plain_cotton() {
    let p = MaterialProperties::from_materials(&["100% Cotton"]);
    assert_eq!(p.stretch_factor, 0.0);
    assert_eq!(p.breathability, 0.8);
  }

  #[test]
  fn test_elastic_blend() {
    let p = MaterialProperties::from_materials(&["Polyester", "Elastane 5%"]);
    assert_eq!(p.stretch_factor, 0.15);
    assert_eq!(p.breathability, 0.4);
  }

  #[test]
  fn test_stretch_cotton_matches_elastic_first() {
    let p = MaterialProperties::from_materials(&["stretch cotton"]);
    assert_eq!(p.stretch_factor, 0.15);
  }

  #[test]
  fn test_unknown_material_is_neutral() {
    let p = MaterialProperties::from_materials::<&str>(&[]);
    assert_eq!(p, MaterialProperties::default());
    let p = MaterialProperties::from_materials(&["wool"]);
    assert_eq!(p.breathability, 0.5);
    assert_eq!(p.thickness, 0.5);
    assert_eq!(p.drape, 0.5);
  }
}
