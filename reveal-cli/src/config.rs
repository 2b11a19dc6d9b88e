//! # Config 模块
//!
//! 模拟配置：视口尺寸、帧参数、滚动速度与指针脚本。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (simulation.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// 模拟配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 视口宽度
    #[serde(default = "default_viewport_width")]
    pub viewport_width: f32,

    /// 视口高度
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f32,

    /// 每帧时长（秒）
    #[serde(default = "default_frame_dt")]
    pub frame_dt: f32,

    /// 模拟帧数
    #[serde(default = "default_frames")]
    pub frames: usize,

    /// 滚动速度（像素/秒），滚到底后停止
    #[serde(default = "default_scroll_speed")]
    pub scroll_speed: f32,

    /// 指针脚本
    #[serde(default = "default_pointer_script")]
    pub pointer: Vec<PointerCue>,
}

/// 在指定帧移动指针，`position` 为空表示指针离开窗口
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerCue {
    pub frame: usize,
    #[serde(default)]
    pub position: Option<[f32; 2]>,
}

// 默认值函数
fn default_viewport_width() -> f32 {
    1280.0
}

fn default_viewport_height() -> f32 {
    720.0
}

fn default_frame_dt() -> f32 {
    1.0 / 60.0
}

fn default_frames() -> usize {
    240
}

fn default_scroll_speed() -> f32 {
    600.0
}

fn default_pointer_script() -> Vec<PointerCue> {
    vec![
        PointerCue {
            frame: 30,
            position: Some([1100.0, 44.0]),
        },
        PointerCue {
            frame: 90,
            position: None,
        },
    ]
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            frame_dt: default_frame_dt(),
            frames: default_frames(),
            scroll_speed: default_scroll_speed(),
            pointer: default_pointer_script(),
        }
    }
}

impl SimulationConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "模拟配置不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "模拟配置加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "模拟配置解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "模拟配置读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("写入 {} 失败", path.display()))?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> anyhow::Result<()> {
        if !is_positive(self.viewport_width) || !is_positive(self.viewport_height) {
            bail!(
                "视口尺寸必须大于 0: {}x{}",
                self.viewport_width,
                self.viewport_height
            );
        }
        if !is_positive(self.frame_dt) {
            bail!("frame_dt 必须大于 0: {}", self.frame_dt);
        }
        if self.scroll_speed.is_nan() || self.scroll_speed < 0.0 {
            bail!("scroll_speed 不能为负: {}", self.scroll_speed);
        }
        Ok(())
    }
}

fn is_positive(value: f32) -> bool {
    !value.is_nan() && value > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.viewport_width, 1280.0);
        assert_eq!(config.frames, 240);
        assert_eq!(config.pointer.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{ "frames": 10, "pointer": [] }"#).unwrap();
        assert_eq!(config.frames, 10);
        assert!(config.pointer.is_empty());
        assert_eq!(config.viewport_height, 720.0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SimulationConfig::default();
        config.frame_dt = 0.0;
        assert!(config.validate().is_err());

        config.frame_dt = 0.02;
        config.scroll_speed = -5.0;
        assert!(config.validate().is_err());

        config.scroll_speed = 0.0;
        assert!(config.validate().is_ok());
    }
}
