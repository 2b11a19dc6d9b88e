//! # View 模块
//!
//! 视图作用域：持有一个视图内创建的所有订阅与播放，并在卸载时统一清理。
//!
//! ## 生命周期
//!
//! ```text
//! Unmounted → Mounting → Observing → (Animating ⇄ Idle) → Unmounting → Unmounted
//! ```
//!
//! - `mount()` 进入 `Mounting`，此时安装绑定与自由播放
//! - 第一帧进入 `Observing`
//! - 有触发器激活或有播放在推进时进入 `Animating`，否则回到 `Idle`
//! - `unmount()` 可从任意已挂载状态进入，清理只执行一次；`Drop` 时自动卸载
//!
//! ## 帧顺序
//!
//! 每帧先 [`TriggerObserver::flush`]，把所有触发更新应用到播放器与跟随目标，
//! 再推进时间驱动的播放与跟随。
//!
//! 非切换绑定的播放完成后立即从播放器释放；切换绑定的播放需要反向，保留到卸载。

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SequencerConfig;
use crate::event::HostEvent;
use crate::follow::PointerFollow;
use crate::geometry::Viewport;
use crate::player::{PlaybackHandle, PlayerEvent, TimelinePlayer};
use crate::registry;
use crate::step::AnimationStep;
use crate::timeline::{Driver, Timeline};
use crate::trigger::{PlaybackState, SubscriptionId, TriggerConfig, TriggerObserver, TriggerUpdate};

/// 视图阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ViewPhase {
    #[default]
    Unmounted,
    Mounting,
    Observing,
    Animating,
    Idle,
    Unmounting,
}

/// 触发器与时间轴的绑定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Binding {
    /// 触发进度直接驱动播放进度
    #[default]
    Scrub,
    /// 首次激活时启动一次时间驱动的播放
    PlayOnce,
    /// 激活时正向播放，失活时反向播放
    Toggle,
    /// 目标追随指针位置（不绑定时间轴，见 [`ViewScope::follow`]）
    Follow,
}

impl Binding {
    /// 绑定默认的播放驱动
    pub fn driver(&self) -> Driver {
        match self {
            Self::Scrub => Driver::Progress,
            Self::PlayOnce | Self::Toggle | Self::Follow => Driver::once(),
        }
    }
}

/// 一帧的处理结果
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FrameReport {
    /// 本帧的触发更新
    pub updates: Vec<TriggerUpdate>,
    /// 本帧的播放事件
    pub events: Vec<PlayerEvent>,
}

impl FrameReport {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.events.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
struct BoundTimeline {
    binding: Binding,
    playback: PlaybackHandle,
}

/// 视图作用域
#[derive(Debug)]
pub struct ViewScope {
    name: String,
    config: SequencerConfig,
    observer: TriggerObserver,
    player: TimelinePlayer,
    bindings: BTreeMap<SubscriptionId, BoundTimeline>,
    follows: BTreeMap<SubscriptionId, Vec<PointerFollow>>,
    /// 当前激活且会驱动动画的订阅
    active: BTreeSet<SubscriptionId>,
    phase: ViewPhase,
    phase_log: Vec<ViewPhase>,
    cleanups: usize,
}

impl ViewScope {
    pub fn new(name: impl Into<String>, viewport: Viewport, config: SequencerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            observer: TriggerObserver::new(viewport),
            player: TimelinePlayer::new(),
            bindings: BTreeMap::new(),
            follows: BTreeMap::new(),
            active: BTreeSet::new(),
            phase: ViewPhase::Unmounted,
            phase_log: Vec::new(),
            cleanups: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    /// 经历过的阶段（不含初始的 `Unmounted`）
    pub fn phase_log(&self) -> &[ViewPhase] {
        &self.phase_log
    }

    /// 已执行的清理次数
    pub fn cleanup_count(&self) -> usize {
        self.cleanups
    }

    pub fn is_mounted(&self) -> bool {
        !matches!(self.phase, ViewPhase::Unmounted | ViewPhase::Unmounting)
    }

    pub fn observer(&self) -> &TriggerObserver {
        &self.observer
    }

    pub fn player(&self) -> &TimelinePlayer {
        &self.player
    }

    /// 订阅的当前状态
    pub fn trigger_state(&self, id: SubscriptionId) -> Option<PlaybackState> {
        self.observer.state(id)
    }

    fn enter(&mut self, phase: ViewPhase) {
        if self.phase == phase {
            return;
        }
        debug!(view = %self.name, from = ?self.phase, to = ?phase, "视图阶段变化");
        self.phase = phase;
        self.phase_log.push(phase);
    }

    /// 挂载视图
    ///
    /// 挂载时会确保进程级注册已完成。已挂载时返回 `false`。
    pub fn mount(&mut self) -> bool {
        if self.phase != ViewPhase::Unmounted {
            return false;
        }
        registry::init();
        self.enter(ViewPhase::Mounting);
        true
    }

    /// 绑定触发器与步骤
    ///
    /// 播放驱动由绑定方式决定。未挂载时返回 `None`。
    pub fn bind(
        &mut self,
        trigger: TriggerConfig,
        steps: Vec<AnimationStep>,
        binding: Binding,
    ) -> Option<(SubscriptionId, PlaybackHandle)> {
        self.bind_timeline(trigger, Timeline::new(steps, binding.driver()), binding)
    }

    /// 绑定触发器与已构建的时间轴
    pub fn bind_timeline(
        &mut self,
        trigger: TriggerConfig,
        timeline: Timeline,
        binding: Binding,
    ) -> Option<(SubscriptionId, PlaybackHandle)> {
        if !self.is_mounted() {
            return None;
        }
        if binding == Binding::Follow {
            warn!(view = %self.name, "跟随绑定不驱动时间轴，请使用 follow()");
            return None;
        }
        let playback = self.player.load(timeline);
        let subscription = self.observer.observe(trigger);
        self.bindings
            .insert(subscription, BoundTimeline { binding, playback });
        Some((subscription, playback))
    }

    /// 绑定指针触发器与跟随目标
    ///
    /// 触发器激活期间，每次指针移动都让所有跟随目标重新追向指针位置。
    /// 未挂载时返回 `None`。
    pub fn follow(
        &mut self,
        trigger: TriggerConfig,
        followers: Vec<PointerFollow>,
    ) -> Option<SubscriptionId> {
        if !self.is_mounted() {
            return None;
        }
        let subscription = self.observer.observe(trigger);
        self.follows.insert(subscription, followers);
        Some(subscription)
    }

    /// 订阅的跟随目标
    pub fn followers(&self, id: SubscriptionId) -> &[PointerFollow] {
        self.follows.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// 启动不依赖触发器的自由播放（入场动画、循环跑马灯）
    pub fn play(&mut self, steps: Vec<AnimationStep>, driver: Driver) -> Option<PlaybackHandle> {
        self.play_timeline(Timeline::new(steps, driver))
    }

    pub fn play_timeline(&mut self, timeline: Timeline) -> Option<PlaybackHandle> {
        if !self.is_mounted() {
            return None;
        }
        let handle = self.player.load(timeline);
        self.player.start(handle);
        Some(handle)
    }

    /// 记录宿主事件，未挂载时忽略
    pub fn handle_event(&mut self, event: HostEvent) {
        if self.is_mounted() {
            self.observer.handle_event(event);
        }
    }

    /// 处理一帧
    pub fn frame(&mut self, dt: f32) -> FrameReport {
        if !self.is_mounted() {
            return FrameReport::default();
        }
        if self.phase == ViewPhase::Mounting {
            self.enter(ViewPhase::Observing);
        }

        let updates = self.observer.flush();
        for update in &updates {
            self.route(update);
        }

        let dt = self.config.clamp_dt(dt);
        let events = self.player.tick(dt);
        self.release_completed(&events);
        for follow in self.follows.values_mut().flatten() {
            follow.advance(dt);
        }

        let animating = !self.active.is_empty()
            || self.player.has_running()
            || self.follows.values().flatten().any(|f| !f.is_settled());
        match (self.phase, animating) {
            (ViewPhase::Observing | ViewPhase::Idle, true) => self.enter(ViewPhase::Animating),
            (ViewPhase::Animating, false) => self.enter(ViewPhase::Idle),
            _ => {}
        }

        FrameReport { updates, events }
    }

    fn release_completed(&mut self, events: &[PlayerEvent]) {
        for event in events {
            let PlayerEvent::Completed(handle) = *event else {
                continue;
            };
            let toggled = self
                .bindings
                .values()
                .any(|b| b.binding == Binding::Toggle && b.playback == handle);
            if !toggled {
                self.player.release(handle);
            }
        }
    }

    fn route(&mut self, update: &TriggerUpdate) {
        if let Some(followers) = self.follows.get_mut(&update.subscription) {
            if update.state.is_active
                && let Some(pointer) = update.pointer
            {
                for follow in followers.iter_mut() {
                    follow.retarget(pointer);
                }
            }
            return;
        }
        let Some(bound) = self.bindings.get(&update.subscription).copied() else {
            return;
        };
        match bound.binding {
            Binding::Scrub => {
                self.player.set_progress(bound.playback, update.state.progress);
            }
            Binding::PlayOnce => {
                if update.state.is_active {
                    self.player.start(bound.playback);
                    // 一次性播放启动后不再需要订阅
                    self.observer.unobserve(update.subscription);
                    self.bindings.remove(&update.subscription);
                }
                return;
            }
            Binding::Toggle => {
                if update.became_active() {
                    self.player.play_forward(bound.playback);
                } else if update.became_inactive() {
                    self.player.reverse(bound.playback);
                }
            }
            Binding::Follow => return,
        }
        if update.state.is_active {
            self.active.insert(update.subscription);
        } else {
            self.active.remove(&update.subscription);
        }
    }

    /// 停止一个播放，重复调用无副作用
    pub fn stop(&mut self, handle: PlaybackHandle) -> bool {
        self.player.stop(handle)
    }

    /// 取消一个订阅，重复调用无副作用
    ///
    /// 绑定的播放保持当前值，直到视图卸载。
    pub fn unobserve(&mut self, id: SubscriptionId) -> bool {
        self.bindings.remove(&id);
        self.follows.remove(&id);
        self.active.remove(&id);
        self.observer.unobserve(id)
    }

    /// 卸载视图
    ///
    /// 取消所有订阅并停止所有播放。未挂载时返回 `false`。
    pub fn unmount(&mut self) -> bool {
        if !self.is_mounted() {
            return false;
        }
        self.enter(ViewPhase::Unmounting);

        let subscriptions = self.observer.unobserve_all();
        let playbacks = self.player.stop_all();
        self.bindings.clear();
        self.follows.clear();
        self.active.clear();
        // 卸载后不再向外报告任何事件
        self.player.tick(0.0);
        self.cleanups += 1;
        debug!(
            view = %self.name,
            subscriptions = subscriptions,
            playbacks = playbacks,
            "视图已清理"
        );

        self.enter(ViewPhase::Unmounted);
        true
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.unmount();
    }
}
