//! # Value 模块
//!
//! 写入展示目标的属性值，以及值之间的插值规则。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SequencerError;

/// 属性值
///
/// JSON 中数字映射为 `Number`，`"200%"`、`"-100%"`、`"20px"` 这类带单位的字符串
/// 映射为 `Dimension`，其余字符串映射为 `Keyword`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawValue", into = "RawValue")]
pub enum PropertyValue {
    /// 纯数值（透明度、缩放、旋转、位移）
    Number(f32),
    /// 带单位的数值
    Dimension { value: f32, unit: String },
    /// 不可插值的关键字
    Keyword(String),
}

impl PropertyValue {
    pub fn number(value: f32) -> Self {
        Self::Number(value)
    }

    pub fn dimension(value: f32, unit: impl Into<String>) -> Self {
        Self::Dimension {
            value,
            unit: unit.into(),
        }
    }

    pub fn keyword(value: impl Into<String>) -> Self {
        Self::Keyword(value.into())
    }

    /// 数值部分（关键字没有数值）
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Number(v) => Some(*v),
            Self::Dimension { value, .. } => Some(*value),
            Self::Keyword(_) => None,
        }
    }

    /// 插值
    ///
    /// 两端都是数值（或单位相同，或一端为纯数值）时线性插值；
    /// 否则在 `t >= 1` 时从起始值跳变到终止值。
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        // 端点直接取原值，避免浮点误差
        if t == 0.0 {
            return self.clone();
        }
        if t == 1.0 {
            return other.clone();
        }
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a + (b - a) * t),
            (
                Self::Dimension { value: a, unit },
                Self::Dimension {
                    value: b,
                    unit: other_unit,
                },
            ) if unit == other_unit => Self::dimension(a + (b - a) * t, unit.clone()),
            (Self::Number(a), Self::Dimension { value: b, unit })
            | (Self::Dimension { value: a, unit }, Self::Number(b)) => {
                Self::dimension(a + (b - a) * t, unit.clone())
            }
            _ => {
                if t < 1.0 {
                    self.clone()
                } else {
                    other.clone()
                }
            }
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Number(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value as f32)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| Self::Keyword(value.to_string()))
    }
}

impl FromStr for PropertyValue {
    type Err = SequencerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SequencerError::ParseValue {
                input: input.to_string(),
            });
        }

        let split = numeric_prefix_len(trimmed);
        if split == 0 {
            return Ok(Self::Keyword(trimmed.to_string()));
        }

        let (number, unit) = trimmed.split_at(split);
        let value: f32 = match number.parse() {
            Ok(v) => v,
            Err(_) => return Ok(Self::Keyword(trimmed.to_string())),
        };

        if unit.is_empty() {
            Ok(Self::Number(value))
        } else if unit == "%" || unit.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self::dimension(value, unit))
        } else {
            Ok(Self::Keyword(trimmed.to_string()))
        }
    }
}

/// `[+-]?digits(.digits)?` 前缀长度
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut idx = 0;
    if idx < bytes.len() && (bytes[idx] == b'-' || bytes[idx] == b'+') {
        idx += 1;
    }
    let digits_start = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx < bytes.len() && bytes[idx] == b'.' {
        idx += 1;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
    }
    // 只有符号或只有小数点都不算数值
    if idx == digits_start || &s[digits_start..idx] == "." {
        0
    } else {
        idx
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{}", v),
            Self::Dimension { value, unit } => write!(f, "{}{}", value, unit),
            Self::Keyword(s) => write!(f, "{}", s),
        }
    }
}

/// JSON 表示
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f32),
    Text(String),
}

impl TryFrom<RawValue> for PropertyValue {
    type Error = SequencerError;

    fn try_from(raw: RawValue) -> Result<Self, Self::Error> {
        match raw {
            RawValue::Number(v) => Ok(Self::Number(v)),
            RawValue::Text(s) => s.parse(),
        }
    }
}

impl From<PropertyValue> for RawValue {
    fn from(value: PropertyValue) -> Self {
        match value {
            PropertyValue::Number(v) => RawValue::Number(v),
            other => RawValue::Text(other.to_string()),
        }
    }
}
