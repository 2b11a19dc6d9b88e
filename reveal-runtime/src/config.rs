//! # Config 模块
//!
//! 序列器配置：步骤默认值与帧推进限制。
//!
//! ## 配置优先级
//!
//! 1. choreography 中显式写出的字段（最高）
//! 2. 配置文件 (reveal.json)
//! 3. 默认值（最低）

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::easing::EasingFunction;
use crate::registry;

/// 序列器配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// 步骤默认值
    #[serde(default)]
    pub step_defaults: StepDefaults,

    /// 帧推进配置
    #[serde(default)]
    pub frame: FrameConfig,
}

/// 步骤默认值（choreography 省略字段时使用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepDefaults {
    /// 默认时长（秒）
    #[serde(default = "default_duration")]
    pub duration: f32,

    /// 默认缓动函数名
    #[serde(default = "default_easing")]
    pub easing: String,
}

/// 帧推进配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    /// 单帧最大时间步长（秒）
    ///
    /// 宿主切到后台再切回时 dt 可能很大，超过此值的 dt 会被截断。
    #[serde(default = "default_max_dt")]
    pub max_dt: f32,
}

// 默认值函数
fn default_duration() -> f32 {
    0.5
}

fn default_easing() -> String {
    "none".to_string()
}

fn default_max_dt() -> f32 {
    0.1
}

impl Default for StepDefaults {
    fn default() -> Self {
        Self {
            duration: default_duration(),
            easing: default_easing(),
        }
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_dt: default_max_dt(),
        }
    }
}

impl SequencerConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        let duration = self.step_defaults.duration;
        if duration.is_nan() || duration < 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "默认时长必须是非负数: {}",
                duration
            )));
        }

        let max_dt = self.frame.max_dt;
        if max_dt.is_nan() || max_dt <= 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "max_dt 必须大于 0: {}",
                max_dt
            )));
        }

        if registry::is_initialized() {
            registry::easing_by_name(&self.step_defaults.easing)
                .map_err(|e| ConfigError::ValidationFailed(e.to_string()))?;
        }

        Ok(())
    }

    /// 默认缓动函数
    ///
    /// 名称无法解析时回退到线性并记录警告。
    pub fn default_easing(&self) -> EasingFunction {
        match registry::easing_by_name(&self.step_defaults.easing) {
            Ok(easing) => easing,
            Err(e) => {
                warn!(error = %e, "默认缓动函数不可用，使用线性");
                EasingFunction::Linear
            }
        }
    }

    /// 截断过大的帧时间步长
    pub fn clamp_dt(&self, dt: f32) -> f32 {
        if dt.is_nan() || dt < 0.0 {
            return 0.0;
        }
        dt.min(self.frame.max_dt)
    }
}

/// 配置错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SequencerConfig::default();
        assert_eq!(config.step_defaults.duration, 0.5);
        assert_eq!(config.step_defaults.easing, "none");
        assert_eq!(config.frame.max_dt, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SequencerConfig =
            serde_json::from_str(r#"{ "step_defaults": { "duration": 0.8 } }"#).unwrap();
        assert_eq!(config.step_defaults.duration, 0.8);
        assert_eq!(config.step_defaults.easing, "none");
        assert_eq!(config.frame.max_dt, 0.1);
    }

    #[test]
    fn test_config_validation() {
        let mut config = SequencerConfig::default();

        config.step_defaults.duration = -1.0;
        assert!(config.validate().is_err());

        config.step_defaults.duration = 0.5;
        config.frame.max_dt = 0.0;
        assert!(config.validate().is_err());

        config.frame.max_dt = 0.05;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_easing_fails_validation() {
        registry::init();
        let mut config = SequencerConfig::default();
        config.step_defaults.easing = "wobbly".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));
        assert_eq!(config.default_easing(), EasingFunction::Linear);
    }

    #[test]
    fn test_clamp_dt() {
        let config = SequencerConfig::default();
        assert_eq!(config.clamp_dt(0.016), 0.016);
        assert_eq!(config.clamp_dt(2.0), 0.1);
        assert_eq!(config.clamp_dt(-1.0), 0.0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = SequencerConfig::load("/nonexistent/reveal.json");
        assert_eq!(config, SequencerConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("reveal-config-{}.json", std::process::id()));
        let mut config = SequencerConfig::default();
        config.step_defaults.easing = "power2.out".to_string();
        config.save(&path).unwrap();

        let loaded = SequencerConfig::load(&path);
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }
}
