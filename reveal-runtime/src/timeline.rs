//! # Timeline 模块
//!
//! 一次播放的时间轴：一组有序步骤 + 驱动方式 + 播放头。
//!
//! ## 两种驱动
//!
//! - [`Driver::Progress`]：播放头由外部进度（滚动）直接决定，每个步骤的
//!   `[offset, offset + duration]` 窗口映射到 `[0, 1]` 进度域。
//! - [`Driver::Time`]：按帧推进，从 0 播到时间轴跨度后结束；`looping` 时无限循环。
//!
//! ## 取值规则
//!
//! 窗口之前取起始值，窗口之后取终止值。多个步骤作用于同一 (目标, 属性) 时，
//! 已开始的步骤中最靠后的一个生效；都未开始时取第一个步骤的起始值。

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{SequencerError, sanitize_non_negative};
use crate::step::AnimationStep;
use crate::target::TargetKey;
use crate::value::PropertyValue;

/// 播放驱动方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    /// 进度驱动（滚动擦洗）
    Progress,
    /// 时间驱动
    Time {
        /// 是否无限循环
        looping: bool,
    },
}

impl Driver {
    /// 播放一次的时间驱动
    pub const fn once() -> Self {
        Self::Time { looping: false }
    }

    /// 循环的时间驱动
    pub const fn looping() -> Self {
        Self::Time { looping: true }
    }
}

/// 播放方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// 已加载，等待启动（初始值已写入）
    #[default]
    Ready,
    /// 等待开始（有延迟）
    Pending,
    /// 正在播放
    Playing,
    /// 已暂停
    Paused,
    /// 已自然结束
    Completed,
    /// 已被停止
    Stopped,
}

impl PlaybackStatus {
    /// 是否为活跃状态（需要按帧更新）
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Pending | Self::Playing)
    }

    /// 是否已结束
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Completed | Self::Stopped)
    }
}

/// 时间轴
#[derive(Debug)]
pub struct Timeline {
    steps: Vec<AnimationStep>,
    /// 时间轴跨度（秒）：所有步骤结束时刻的最大值
    span: f32,
    driver: Driver,
    delay: f32,
    delay_elapsed: f32,
    direction: Direction,
    status: PlaybackStatus,
    /// 播放头（进度域 0.0 - 1.0）
    progress: f32,
    /// 已写入的值，避免重复写入
    written: HashMap<(TargetKey, String), PropertyValue>,
    /// 已报告过缺失的目标
    missing: HashSet<TargetKey>,
}

impl Timeline {
    /// 创建时间轴
    ///
    /// 进度驱动的时间轴立即处于 `Playing`；时间驱动的时间轴处于 `Ready`，
    /// 需要调用 [`Timeline::start`]。
    pub fn new(steps: Vec<AnimationStep>, driver: Driver) -> Self {
        let span = steps.iter().map(|s| s.end()).fold(0.0_f32, f32::max);
        let status = match driver {
            Driver::Progress => PlaybackStatus::Playing,
            Driver::Time { .. } => PlaybackStatus::Ready,
        };
        Self {
            steps,
            span,
            driver,
            delay: 0.0,
            delay_elapsed: 0.0,
            direction: Direction::Forward,
            status,
            progress: 0.0,
            written: HashMap::new(),
            missing: HashSet::new(),
        }
    }

    /// 设置启动延迟（秒），仅对时间驱动有效
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = sanitize_non_negative("delay", delay);
        self
    }

    pub fn span(&self) -> f32 {
        self.span
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// 当前进度 (0.0 - 1.0)
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn steps(&self) -> &[AnimationStep] {
        &self.steps
    }

    /// 启动时间驱动的播放
    ///
    /// 只在 `Ready` 状态下生效，返回是否真正启动。
    pub fn start(&mut self) -> bool {
        if self.status != PlaybackStatus::Ready || self.driver == Driver::Progress {
            return false;
        }
        self.delay_elapsed = 0.0;
        self.status = if self.delay > 0.0 {
            PlaybackStatus::Pending
        } else {
            PlaybackStatus::Playing
        };
        true
    }

    /// 设置进度并写入属性
    ///
    /// # 返回
    /// 本次实际写入的属性数量
    pub fn set_progress(&mut self, progress: f32) -> usize {
        if self.status == PlaybackStatus::Stopped {
            return 0;
        }
        self.progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.render()
    }

    /// 按帧推进（仅时间驱动）
    ///
    /// 负数或 NaN 的 `dt` 按 0 处理。
    ///
    /// # 返回
    /// - `true`: 本帧自然结束
    /// - `false`: 仍在进行或未在播放
    pub fn advance(&mut self, dt: f32) -> bool {
        let Driver::Time { looping } = self.driver else {
            return false;
        };

        if !self.status.is_running() {
            return false;
        }
        let mut dt = sanitize_non_negative("dt", dt);
        match self.status {
            PlaybackStatus::Pending => {
                self.delay_elapsed += dt;
                if self.delay_elapsed < self.delay {
                    return false;
                }
                dt = self.delay_elapsed - self.delay;
                self.status = PlaybackStatus::Playing;
            }
            PlaybackStatus::Playing => {}
            _ => return false,
        }

        if self.span <= 0.0 {
            self.progress = match self.direction {
                Direction::Forward => 1.0,
                Direction::Reverse => 0.0,
            };
            self.status = PlaybackStatus::Completed;
            self.render();
            return true;
        }

        let delta = dt / self.span;
        let next = match self.direction {
            Direction::Forward => self.progress + delta,
            Direction::Reverse => self.progress - delta,
        };

        let finished = if (0.0..=1.0).contains(&next) {
            self.progress = next;
            // 正向播放恰好到达终点时也算结束
            !looping
                && match self.direction {
                    Direction::Forward => next >= 1.0,
                    Direction::Reverse => next <= 0.0,
                }
        } else if looping {
            self.progress = next.rem_euclid(1.0);
            false
        } else {
            self.progress = next.clamp(0.0, 1.0);
            true
        };

        if finished {
            self.status = PlaybackStatus::Completed;
        }
        self.render();
        finished
    }

    /// 正向播放（从当前进度继续）
    pub fn play_forward(&mut self) {
        self.resume_in(Direction::Forward);
    }

    /// 反向播放（从当前进度倒回起点）
    pub fn reverse(&mut self) {
        self.resume_in(Direction::Reverse);
    }

    fn resume_in(&mut self, direction: Direction) {
        if self.status == PlaybackStatus::Stopped || self.driver == Driver::Progress {
            return;
        }
        self.direction = direction;
        match self.status {
            PlaybackStatus::Ready => {
                self.start();
            }
            PlaybackStatus::Completed | PlaybackStatus::Paused => {
                self.status = PlaybackStatus::Playing;
            }
            _ => {}
        }
    }

    /// 暂停
    pub fn pause(&mut self) {
        if self.status.is_running() {
            self.status = PlaybackStatus::Paused;
        }
    }

    /// 恢复
    pub fn resume(&mut self) {
        if self.status == PlaybackStatus::Paused {
            self.status = PlaybackStatus::Playing;
        }
    }

    /// 停止播放，属性保持最后写入的值
    ///
    /// 重复调用无副作用，返回本次是否真正停止。
    pub fn stop(&mut self) -> bool {
        if self.status == PlaybackStatus::Stopped {
            return false;
        }
        self.status = PlaybackStatus::Stopped;
        true
    }

    /// 步骤在当前进度下的局部进度
    fn local_progress(&self, step: &AnimationStep) -> f32 {
        if self.progress >= 1.0 {
            return 1.0;
        }
        if self.progress <= 0.0 {
            return 0.0;
        }
        if self.span <= 0.0 {
            return 1.0;
        }
        step.local_progress(self.progress * self.span)
    }

    fn has_started(&self, step: &AnimationStep) -> bool {
        self.progress >= 1.0 || step.has_started(self.progress * self.span)
    }

    /// 计算当前进度下每个 (目标, 属性) 的值并写入
    fn render(&mut self) -> usize {
        // (key, property) -> (step index, value)
        let mut resolved: Vec<((TargetKey, String), usize, PropertyValue)> = Vec::new();
        let mut index: HashMap<(TargetKey, String), usize> = HashMap::new();

        for (i, step) in self.steps.iter().enumerate() {
            let local = self.local_progress(step);
            let started = self.has_started(step);
            for tween in step.tweens() {
                let key = (step.target().key(), tween.property.clone());
                match index.get(&key) {
                    None => {
                        index.insert(key.clone(), resolved.len());
                        resolved.push((key, i, tween.value_at(local)));
                    }
                    Some(&slot) if started => {
                        resolved[slot].1 = i;
                        resolved[slot].2 = tween.value_at(local);
                    }
                    Some(_) => {}
                }
            }
        }

        let mut writes = 0;
        for (key, step_index, value) in resolved {
            if self.written.get(&key) == Some(&value) {
                continue;
            }
            let step = &self.steps[step_index];
            let Some(target) = step.target().resolve() else {
                if self.missing.insert(key.0) {
                    let err = SequencerError::MissingTarget {
                        target: step.target().describe(),
                    };
                    debug!(error = %err, property = %key.1, "跳过缺失目标的步骤");
                }
                continue;
            };
            if target.write_property(&key.1, &value) {
                writes += 1;
            }
            self.written.insert(key, value);
        }
        writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::EasingFunction;
    use crate::geometry::Rect;
    use crate::target::{StyleNode, TargetHandle};
    use std::rc::Rc;

    fn node(id: &str) -> Rc<StyleNode> {
        Rc::new(StyleNode::new(id, Rect::default()))
    }

    fn fade(target: &Rc<StyleNode>, offset: f32, duration: f32) -> AnimationStep {
        AnimationStep::builder(TargetHandle::new(target))
            .tween("opacity", 0.0, 1.0)
            .offset(offset)
            .duration(duration)
            .build()
    }

    #[test]
    fn test_two_step_window_mapping() {
        let a = node("a");
        let b = node("b");
        let mut timeline =
            Timeline::new(vec![fade(&a, 0.0, 0.5), fade(&b, 0.5, 0.5)], Driver::Progress);

        timeline.set_progress(0.25);
        assert_eq!(a.style_f32("opacity"), Some(0.5));
        assert_eq!(b.style_f32("opacity"), Some(0.0));

        timeline.set_progress(0.75);
        assert_eq!(a.style_f32("opacity"), Some(1.0));
        assert_eq!(b.style_f32("opacity"), Some(0.5));
    }

    #[test]
    fn test_window_normalized_by_span() {
        let a = node("a");
        let mut timeline = Timeline::new(vec![fade(&a, 1.0, 1.0)], Driver::Progress);
        assert_eq!(timeline.span(), 2.0);

        timeline.set_progress(0.4);
        assert_eq!(a.style_f32("opacity"), Some(0.0));
        timeline.set_progress(0.75);
        assert_eq!(a.style_f32("opacity"), Some(0.5));
    }

    #[test]
    fn test_later_step_wins_once_started() {
        let quote = node("quote");
        let handle = TargetHandle::new(&quote);
        let fade_in = AnimationStep::builder(handle.clone())
            .tween("opacity", 0.2, 1.0)
            .offset(0.0)
            .duration(1.0)
            .build();
        let fade_out = AnimationStep::builder(handle)
            .tween("opacity", 1.0, 0.2)
            .offset(2.0)
            .duration(1.0)
            .build();
        let mut timeline = Timeline::new(vec![fade_in, fade_out], Driver::Progress);

        timeline.set_progress(0.0);
        assert_eq!(quote.style_f32("opacity"), Some(0.2));
        timeline.set_progress(0.5);
        assert_eq!(quote.style_f32("opacity"), Some(1.0));
        timeline.set_progress(1.0);
        assert_eq!(quote.style_f32("opacity"), Some(0.2));
        timeline.set_progress(0.5);
        assert_eq!(quote.style_f32("opacity"), Some(1.0));
    }

    #[test]
    fn test_unchanged_values_are_not_rewritten() {
        let a = node("a");
        let mut timeline = Timeline::new(vec![fade(&a, 0.5, 0.5)], Driver::Progress);
        assert_eq!(timeline.set_progress(0.1), 1);
        assert_eq!(timeline.set_progress(0.2), 0);
        assert_eq!(a.write_count(), 1);
    }

    #[test]
    fn test_missing_target_is_skipped() {
        let a = node("a");
        let gone = node("gone");
        let steps = vec![fade(&gone, 0.0, 1.0), fade(&a, 0.0, 1.0)];
        drop(gone);

        let mut timeline = Timeline::new(steps, Driver::Progress);
        assert_eq!(timeline.set_progress(0.5), 1);
        assert_eq!(a.style_f32("opacity"), Some(0.5));
    }

    #[test]
    fn test_time_driven_runs_once() {
        let a = node("a");
        let mut timeline = Timeline::new(vec![fade(&a, 0.0, 1.0)], Driver::once());
        assert_eq!(timeline.status(), PlaybackStatus::Ready);
        assert!(!timeline.advance(0.5));
        assert_eq!(a.write_count(), 0);

        assert!(timeline.start());
        assert!(!timeline.advance(0.5));
        assert_eq!(a.style_f32("opacity"), Some(0.5));
        assert!(timeline.advance(0.6));
        assert_eq!(timeline.status(), PlaybackStatus::Completed);
        assert_eq!(a.style_f32("opacity"), Some(1.0));
        assert!(!timeline.advance(0.1));
    }

    #[test]
    fn test_delay_before_playing() {
        let a = node("a");
        let mut timeline = Timeline::new(vec![fade(&a, 0.0, 1.0)], Driver::once()).with_delay(0.2);
        timeline.start();
        timeline.advance(0.1);
        assert_eq!(timeline.status(), PlaybackStatus::Pending);
        timeline.advance(0.35);
        assert_eq!(timeline.status(), PlaybackStatus::Playing);
        let opacity = a.style_f32("opacity").unwrap();
        assert!((opacity - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_looping_wraps() {
        let a = node("a");
        let step = AnimationStep::builder(TargetHandle::new(&a))
            .tween("x", 0.0, -400.0)
            .duration(15.0)
            .easing(EasingFunction::Linear)
            .build();
        let mut timeline = Timeline::new(vec![step], Driver::looping());
        timeline.start();
        for _ in 0..20 {
            assert!(!timeline.advance(1.0));
        }
        assert_eq!(timeline.status(), PlaybackStatus::Playing);
        let x = a.style_f32("x").unwrap();
        assert!((x - (-400.0 * 5.0 / 15.0)).abs() < 0.01);
    }

    #[test]
    fn test_reverse_returns_to_initial() {
        let a = node("a");
        let mut timeline = Timeline::new(vec![fade(&a, 0.0, 0.3)], Driver::once());
        timeline.start();
        timeline.advance(0.3);
        assert_eq!(timeline.status(), PlaybackStatus::Completed);

        timeline.reverse();
        assert_eq!(timeline.status(), PlaybackStatus::Playing);
        assert!(timeline.advance(0.5));
        assert_eq!(a.style_f32("opacity"), Some(0.0));
        assert_eq!(timeline.direction(), Direction::Reverse);
    }

    #[test]
    fn test_invalid_dt_does_not_complete() {
        let a = node("a");
        let mut timeline = Timeline::new(vec![fade(&a, 0.0, 1.0)], Driver::once());
        timeline.start();

        assert!(!timeline.advance(-0.016));
        assert_eq!(timeline.status(), PlaybackStatus::Playing);
        assert_eq!(timeline.progress(), 0.0);

        assert!(!timeline.advance(f32::NAN));
        assert_eq!(timeline.status(), PlaybackStatus::Playing);
        assert_eq!(timeline.progress(), 0.0);

        timeline.advance(0.5);
        assert_eq!(a.style_f32("opacity"), Some(0.5));
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let a = node("a");
        let mut timeline = Timeline::new(vec![fade(&a, 0.0, 1.0)], Driver::once());
        timeline.start();
        timeline.advance(0.25);

        timeline.pause();
        assert_eq!(timeline.status(), PlaybackStatus::Paused);
        assert!(!timeline.advance(0.5));
        assert_eq!(timeline.progress(), 0.25);
        assert_eq!(a.style_f32("opacity"), Some(0.25));

        timeline.resume();
        assert_eq!(timeline.status(), PlaybackStatus::Playing);
        timeline.advance(0.5);
        assert_eq!(a.style_f32("opacity"), Some(0.75));
        assert!(timeline.advance(0.25));
    }

    #[test]
    fn test_stop_is_idempotent_and_freezes() {
        let a = node("a");
        let mut timeline = Timeline::new(vec![fade(&a, 0.0, 1.0)], Driver::Progress);
        timeline.set_progress(0.3);
        assert!(timeline.stop());
        assert!(!timeline.stop());
        assert_eq!(timeline.set_progress(0.9), 0);
        let opacity = a.style_f32("opacity").unwrap();
        assert!((opacity - 0.3).abs() < 1e-6);
    }
}
