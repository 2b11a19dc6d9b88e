//! # Error 模块
//!
//! 定义 reveal-runtime 中使用的错误类型。
//!
//! 动画是装饰性的：运行时内部的失败一律就地吸收（跳过、钳制、记录日志），
//! 只有声明式配置（choreography）的解析阶段才会以 `Result` 形式返回错误。

use thiserror::Error;
use tracing::warn;

/// 序列器错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequencerError {
    /// 目标已被移除或未挂载
    #[error("动画目标不可用: {target}")]
    MissingTarget { target: String },

    /// 参数无效（负数或 NaN）
    #[error("参数 '{field}' 的值无效: {value}")]
    InvalidConfig { field: String, value: f32 },

    /// 阈值语法错误
    #[error("无效的触发阈值 '{input}' - {message}")]
    ParseThreshold { input: String, message: String },

    /// 未知缓动函数
    #[error("未知的缓动函数 '{name}'")]
    ParseEasing { name: String },

    /// 属性值语法错误
    #[error("无效的属性值 '{input}'")]
    ParseValue { input: String },

    /// 配置中引用了不存在的元素
    #[error("元素 '{id}' 不存在")]
    UnknownTarget { id: String },

    /// choreography 文档格式错误
    #[error("choreography 解析失败: {message}")]
    InvalidChoreography { message: String },

    /// 内置预设不存在
    #[error("未知的预设 '{name}'")]
    UnknownPreset { name: String },

    /// 文件读取失败
    #[error("读取 '{path}' 失败: {message}")]
    Io { path: String, message: String },

    /// 尚未调用 `reveal_runtime::init()`
    #[error("缓动表尚未注册，请先调用 init()")]
    NotInitialized,
}

/// Result 类型别名
pub type SequencerResult<T> = Result<T, SequencerError>;

/// 将时间类参数钳制到合法范围
///
/// 负数与 NaN 被替换为 0 并记录警告，其余值原样返回。
pub(crate) fn sanitize_non_negative(field: &str, value: f32) -> f32 {
    if value.is_nan() || value < 0.0 {
        let err = SequencerError::InvalidConfig {
            field: field.to_string(),
            value,
        };
        warn!(error = %err, "参数已钳制为 0");
        0.0
    } else {
        value
    }
}

/// 将比例类参数钳制到 [0, 1]
pub(crate) fn sanitize_fraction(field: &str, value: f32) -> f32 {
    if value.is_nan() || !(0.0..=1.0).contains(&value) {
        let err = SequencerError::InvalidConfig {
            field: field.to_string(),
            value,
        };
        let clamped = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        warn!(error = %err, clamped = clamped, "比例参数已钳制");
        clamped
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_non_negative() {
        assert_eq!(sanitize_non_negative("duration", 0.5), 0.5);
        assert_eq!(sanitize_non_negative("duration", -1.0), 0.0);
        assert_eq!(sanitize_non_negative("duration", f32::NAN), 0.0);
        assert_eq!(sanitize_non_negative("duration", f32::INFINITY), f32::INFINITY);
    }

    #[test]
    fn test_sanitize_fraction() {
        assert_eq!(sanitize_fraction("viewport", 0.8), 0.8);
        assert_eq!(sanitize_fraction("viewport", 1.5), 1.0);
        assert_eq!(sanitize_fraction("viewport", -0.2), 0.0);
        assert_eq!(sanitize_fraction("viewport", f32::NAN), 0.0);
    }

    #[test]
    fn test_error_display() {
        let err = SequencerError::ParseEasing {
            name: "wobble".to_string(),
        };
        assert_eq!(err.to_string(), "未知的缓动函数 'wobble'");
    }
}
