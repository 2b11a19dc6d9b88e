//! # Step 模块
//!
//! 时间轴上的单个步骤：一个目标、一组属性补间、起始偏移、时长与缓动。
//!
//! 步骤构建完成后不可变，由时间轴在一次播放期间独占持有。

use crate::easing::EasingFunction;
use crate::error::sanitize_non_negative;
use crate::target::TargetHandle;
use crate::value::PropertyValue;

/// 单个属性的补间
#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    /// 属性名
    pub property: String,
    /// 起始值（窗口之前保持）
    pub from: PropertyValue,
    /// 终止值（窗口之后保持）
    pub to: PropertyValue,
}

impl Tween {
    pub fn new(
        property: impl Into<String>,
        from: impl Into<PropertyValue>,
        to: impl Into<PropertyValue>,
    ) -> Self {
        Self {
            property: property.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// 局部进度（已缓动）对应的值
    pub fn value_at(&self, local: f32) -> PropertyValue {
        self.from.lerp(&self.to, local)
    }
}

/// 动画步骤
#[derive(Debug, Clone)]
pub struct AnimationStep {
    target: TargetHandle,
    tweens: Vec<Tween>,
    offset: f32,
    duration: f32,
    easing: EasingFunction,
}

impl AnimationStep {
    /// 创建步骤构建器
    ///
    /// 默认偏移 0，时长 0.5 秒，线性缓动。
    pub fn builder(target: TargetHandle) -> StepBuilder {
        StepBuilder {
            target,
            tweens: Vec::new(),
            offset: 0.0,
            duration: 0.5,
            easing: EasingFunction::Linear,
        }
    }

    pub fn target(&self) -> &TargetHandle {
        &self.target
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// 起始偏移（秒）
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// 时长（秒）
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// 结束时刻（秒）
    pub fn end(&self) -> f32 {
        self.offset + self.duration
    }

    pub fn easing(&self) -> EasingFunction {
        self.easing
    }

    /// 给定时间轴时刻的局部进度（已缓动）
    ///
    /// 窗口之前为 0，窗口之后为 1。零时长步骤在时刻严格越过偏移后跳到 1。
    pub fn local_progress(&self, time: f32) -> f32 {
        if time <= self.offset {
            return 0.0;
        }
        if time >= self.end() {
            return 1.0;
        }
        self.easing.apply((time - self.offset) / self.duration)
    }

    /// 步骤是否已经开始（时刻到达窗口起点）
    pub fn has_started(&self, time: f32) -> bool {
        time >= self.offset
    }
}

/// 步骤构建器
#[derive(Debug, Clone)]
pub struct StepBuilder {
    target: TargetHandle,
    tweens: Vec<Tween>,
    offset: f32,
    duration: f32,
    easing: EasingFunction,
}

impl StepBuilder {
    /// 添加属性补间（fromTo）
    pub fn tween(
        mut self,
        property: impl Into<String>,
        from: impl Into<PropertyValue>,
        to: impl Into<PropertyValue>,
    ) -> Self {
        self.tweens.push(Tween::new(property, from, to));
        self
    }

    /// 设置起始偏移（秒），负数/NaN 钳制为 0
    pub fn offset(mut self, offset: f32) -> Self {
        self.offset = offset;
        self
    }

    /// 设置时长（秒），负数/NaN 钳制为 0
    pub fn duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    pub fn easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    pub fn build(self) -> AnimationStep {
        AnimationStep {
            target: self.target,
            tweens: self.tweens,
            offset: sanitize_non_negative("offset", self.offset),
            duration: sanitize_non_negative("duration", self.duration),
            easing: self.easing,
        }
    }
}

/// 交错步骤
///
/// 为每个目标复制同一组补间，第 `i` 个目标的偏移为 `base_offset + i * each`。
pub fn stagger(
    targets: &[TargetHandle],
    tweens: &[Tween],
    base_offset: f32,
    each: f32,
    duration: f32,
    easing: EasingFunction,
) -> Vec<AnimationStep> {
    let each = sanitize_non_negative("stagger", each);
    targets
        .iter()
        .enumerate()
        .map(|(i, target)| {
            let builder = AnimationStep::builder(target.clone())
                .offset(base_offset + each * i as f32)
                .duration(duration)
                .easing(easing);
            tweens
                .iter()
                .fold(builder, |b, t| {
                    b.tween(t.property.clone(), t.from.clone(), t.to.clone())
                })
                .build()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let step = AnimationStep::builder(TargetHandle::detached())
            .tween("opacity", 0.0, 1.0)
            .build();
        assert_eq!(step.offset(), 0.0);
        assert_eq!(step.duration(), 0.5);
        assert_eq!(step.easing(), EasingFunction::Linear);
        assert_eq!(step.tweens().len(), 1);
    }

    #[test]
    fn test_invalid_durations_are_clamped() {
        let step = AnimationStep::builder(TargetHandle::detached())
            .offset(f32::NAN)
            .duration(-2.0)
            .build();
        assert_eq!(step.offset(), 0.0);
        assert_eq!(step.duration(), 0.0);
    }

    #[test]
    fn test_local_progress_clamps_outside_window() {
        let step = AnimationStep::builder(TargetHandle::detached())
            .offset(1.0)
            .duration(2.0)
            .build();
        assert_eq!(step.local_progress(0.5), 0.0);
        assert_eq!(step.local_progress(2.0), 0.5);
        assert_eq!(step.local_progress(5.0), 1.0);
    }

    #[test]
    fn test_zero_duration_step() {
        let step = AnimationStep::builder(TargetHandle::detached())
            .offset(0.0)
            .duration(0.0)
            .build();
        assert_eq!(step.local_progress(0.0), 0.0);
        assert_eq!(step.local_progress(0.01), 1.0);
    }

    #[test]
    fn test_stagger_offsets() {
        let targets = vec![TargetHandle::detached(); 3];
        let steps = stagger(
            &targets,
            &[Tween::new("y", 30.0, 0.0)],
            0.2,
            0.15,
            0.8,
            EasingFunction::EaseOutCubic,
        );
        let offsets: Vec<f32> = steps.iter().map(|s| s.offset()).collect();
        assert!((offsets[0] - 0.2).abs() < 1e-6);
        assert!((offsets[1] - 0.35).abs() < 1e-6);
        assert!((offsets[2] - 0.5).abs() < 1e-6);
        assert!(steps.iter().all(|s| s.duration() == 0.8));
    }
}
