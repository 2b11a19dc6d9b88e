//! # Registry 模块
//!
//! 进程级的一次性注册：命名缓动表。
//!
//! 宿主在启动时调用一次 [`init`]，之后声明式配置中的缓动名称
//! （如 `"power2.out"`、`"back.out(1.7)"`）才能被解析。重复调用是安全的。

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use tracing::debug;

use crate::easing::{BACK_OVERSHOOT, EasingFunction};
use crate::error::{SequencerError, SequencerResult};

static EASINGS: OnceLock<RwLock<HashMap<String, EasingFunction>>> = OnceLock::new();

/// 内置的缓动名称表（GSAP 风格 + CSS 风格）
const BUILTIN_EASINGS: &[(&str, EasingFunction)] = &[
    ("none", EasingFunction::Linear),
    ("linear", EasingFunction::Linear),
    ("ease-in", EasingFunction::EaseIn),
    ("ease-out", EasingFunction::EaseOut),
    ("ease-in-out", EasingFunction::EaseInOut),
    ("power1.in", EasingFunction::EaseInQuad),
    ("power1.out", EasingFunction::EaseOutQuad),
    ("power1.inout", EasingFunction::EaseInOutQuad),
    ("power2.in", EasingFunction::EaseInCubic),
    ("power2.out", EasingFunction::EaseOutCubic),
    ("power2.inout", EasingFunction::EaseInOutCubic),
    ("power3.in", EasingFunction::EaseInQuart),
    ("power3.out", EasingFunction::EaseOutQuart),
    ("power3.inout", EasingFunction::EaseInOutQuart),
    ("sine.in", EasingFunction::EaseInSine),
    ("sine.out", EasingFunction::EaseOutSine),
    ("sine.inout", EasingFunction::EaseInOutSine),
    ("back.in", EasingFunction::EaseInBack(BACK_OVERSHOOT)),
    ("back.out", EasingFunction::EaseOutBack(BACK_OVERSHOOT)),
    ("elastic.out", EasingFunction::EaseOutElastic),
    ("bounce.out", EasingFunction::EaseOutBounce),
];

/// 执行进程级注册
///
/// # 返回
/// - `true`: 本次调用完成了注册
/// - `false`: 已经注册过，什么也没做
pub fn init() -> bool {
    let mut installed = false;
    EASINGS.get_or_init(|| {
        installed = true;
        let table = BUILTIN_EASINGS
            .iter()
            .map(|(name, easing)| (name.to_string(), *easing))
            .collect();
        RwLock::new(table)
    });
    if installed {
        debug!(count = BUILTIN_EASINGS.len(), "缓动表注册完成");
    }
    installed
}

/// 是否已完成注册
pub fn is_initialized() -> bool {
    EASINGS.get().is_some()
}

/// 注册自定义缓动别名
///
/// 必须在 [`init`] 之后调用；同名别名会被覆盖。
pub fn register_easing(name: &str, easing: EasingFunction) -> SequencerResult<()> {
    let table = EASINGS.get().ok_or(SequencerError::NotInitialized)?;
    let mut table = table
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    table.insert(normalize(name), easing);
    Ok(())
}

/// 按名称查找缓动函数
///
/// 名称不区分大小写。括号内的参数（如 `back.out(1.2)` 中的过冲系数）
/// 通过 [`EasingFunction::with_parameter`] 应用到查到的曲线上。
pub fn easing_by_name(name: &str) -> SequencerResult<EasingFunction> {
    let table = EASINGS.get().ok_or(SequencerError::NotInitialized)?;
    let parse_err = || SequencerError::ParseEasing {
        name: name.to_string(),
    };
    let parameter = parameter(name).ok_or_else(parse_err)?;

    let table = table.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    let easing = table.get(&normalize(name)).copied().ok_or_else(parse_err)?;
    Ok(match parameter {
        Some(value) => easing.with_parameter(value),
        None => easing,
    })
}

/// 解析名称中的参数
///
/// - `Some(None)`: 没有参数（或空括号）
/// - `Some(Some(v))`: 参数为 `v`
/// - `None`: 参数格式错误
fn parameter(name: &str) -> Option<Option<f32>> {
    let Some(open) = name.find('(') else {
        return Some(None);
    };
    let inner = name[open + 1..].trim_end().strip_suffix(')')?.trim();
    if inner.is_empty() {
        return Some(None);
    }
    inner.parse::<f32>().ok().filter(|v| v.is_finite()).map(Some)
}

fn normalize(name: &str) -> String {
    let base = match name.find('(') {
        Some(idx) => &name[..idx],
        None => name,
    };
    base.trim().to_ascii_lowercase()
}
