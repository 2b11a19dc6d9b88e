//! # Player 模块
//!
//! 时间轴播放器：管理一个视图内的所有播放实例。
//!
//! ```rust,ignore
//! let mut player = TimelinePlayer::new();
//! let handle = player.play(steps, Driver::Progress);
//! player.set_progress(handle, 0.25);
//!
//! // 每帧
//! for event in player.tick(dt) { /* ... */ }
//!
//! player.stop(handle);
//! player.stop(handle); // 无副作用
//! ```

use std::collections::BTreeMap;

use crate::error::sanitize_non_negative;
use crate::step::AnimationStep;
use crate::timeline::{Direction, Driver, PlaybackStatus, Timeline};

/// 播放句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaybackHandle(u64);

impl PlaybackHandle {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PlaybackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Playback({})", self.0)
    }
}

/// 播放事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerEvent {
    /// 播放开始
    Started(PlaybackHandle),
    /// 播放自然结束
    Completed(PlaybackHandle),
    /// 播放被停止
    Stopped(PlaybackHandle),
}

/// 时间轴播放器
#[derive(Debug, Default)]
pub struct TimelinePlayer {
    timelines: BTreeMap<PlaybackHandle, Timeline>,
    next_id: u64,
    events: Vec<PlayerEvent>,
}

impl TimelinePlayer {
    pub fn new() -> Self {
        Self {
            timelines: BTreeMap::new(),
            next_id: 1,
            events: Vec::new(),
        }
    }

    fn next_handle(&mut self) -> PlaybackHandle {
        let handle = PlaybackHandle(self.next_id);
        self.next_id += 1;
        handle
    }

    /// 开始播放
    ///
    /// 进度驱动的播放立即写入进度 0 对应的初始值；时间驱动的播放立即启动。
    pub fn play(&mut self, steps: Vec<AnimationStep>, driver: Driver) -> PlaybackHandle {
        let handle = self.load(Timeline::new(steps, driver));
        self.start(handle);
        handle
    }

    /// 加载时间轴但不启动
    ///
    /// 立即写入初始值，等待 [`TimelinePlayer::start`]（进入视口时的一次性播放）。
    pub fn load(&mut self, mut timeline: Timeline) -> PlaybackHandle {
        let handle = self.next_handle();
        timeline.set_progress(0.0);
        if timeline.driver() == Driver::Progress {
            self.events.push(PlayerEvent::Started(handle));
        }
        self.timelines.insert(handle, timeline);
        handle
    }

    /// 启动已加载的时间驱动播放
    pub fn start(&mut self, handle: PlaybackHandle) -> bool {
        let Some(timeline) = self.timelines.get_mut(&handle) else {
            return false;
        };
        let started = timeline.start();
        if started {
            self.events.push(PlayerEvent::Started(handle));
        }
        started
    }

    /// 设置进度驱动播放的进度
    ///
    /// # 返回
    /// 本次实际写入的属性数量
    pub fn set_progress(&mut self, handle: PlaybackHandle, progress: f32) -> usize {
        self.timelines
            .get_mut(&handle)
            .map_or(0, |timeline| timeline.set_progress(progress))
    }

    /// 正向播放（悬停进入）
    pub fn play_forward(&mut self, handle: PlaybackHandle) {
        self.redirect(handle, Direction::Forward);
    }

    /// 反向播放（悬停离开）
    pub fn reverse(&mut self, handle: PlaybackHandle) {
        self.redirect(handle, Direction::Reverse);
    }

    fn redirect(&mut self, handle: PlaybackHandle, direction: Direction) {
        let Some(timeline) = self.timelines.get_mut(&handle) else {
            return;
        };
        let was_running = timeline.status().is_running();
        match direction {
            Direction::Forward => timeline.play_forward(),
            Direction::Reverse => timeline.reverse(),
        }
        if !was_running && timeline.status().is_running() {
            self.events.push(PlayerEvent::Started(handle));
        }
    }

    pub fn pause(&mut self, handle: PlaybackHandle) {
        if let Some(timeline) = self.timelines.get_mut(&handle) {
            timeline.pause();
        }
    }

    pub fn resume(&mut self, handle: PlaybackHandle) {
        if let Some(timeline) = self.timelines.get_mut(&handle) {
            timeline.resume();
        }
    }

    /// 停止播放
    ///
    /// 属性保持最后写入的值，句柄随即失效。重复调用或对已结束的播放调用都是安全的。
    ///
    /// # 返回
    /// - `true`: 本次调用停止了播放
    /// - `false`: 句柄已失效，什么也没做
    pub fn stop(&mut self, handle: PlaybackHandle) -> bool {
        match self.timelines.remove(&handle) {
            Some(mut timeline) => {
                timeline.stop();
                self.events.push(PlayerEvent::Stopped(handle));
                true
            }
            None => false,
        }
    }

    /// 释放已自然结束的播放
    ///
    /// 属性保持终值，不产生事件。只对 `Completed` 状态生效，返回是否真正释放。
    pub fn release(&mut self, handle: PlaybackHandle) -> bool {
        if self.status(handle) != Some(PlaybackStatus::Completed) {
            return false;
        }
        self.timelines.remove(&handle).is_some()
    }

    /// 停止所有播放，返回停止的数量
    pub fn stop_all(&mut self) -> usize {
        let handles: Vec<PlaybackHandle> = self.timelines.keys().copied().collect();
        handles.into_iter().filter(|h| self.stop(*h)).count()
    }

    /// 按帧推进所有时间驱动的播放
    ///
    /// 负数或 NaN 的 `dt` 按 0 处理。
    ///
    /// # 返回
    /// 返回自上次调用以来产生的事件
    pub fn tick(&mut self, dt: f32) -> Vec<PlayerEvent> {
        let dt = sanitize_non_negative("dt", dt);
        for (handle, timeline) in &mut self.timelines {
            if timeline.advance(dt) {
                self.events.push(PlayerEvent::Completed(*handle));
            }
        }
        std::mem::take(&mut self.events)
    }

    // ========== 查询方法 ==========

    pub fn status(&self, handle: PlaybackHandle) -> Option<PlaybackStatus> {
        self.timelines.get(&handle).map(|t| t.status())
    }

    pub fn progress(&self, handle: PlaybackHandle) -> Option<f32> {
        self.timelines.get(&handle).map(|t| t.progress())
    }

    /// 句柄是否仍有效
    pub fn contains(&self, handle: PlaybackHandle) -> bool {
        self.timelines.contains_key(&handle)
    }

    /// 是否有按帧推进中的时间驱动播放
    pub fn has_running(&self) -> bool {
        self.timelines
            .values()
            .any(|t| t.driver() != Driver::Progress && t.status().is_running())
    }

    pub fn is_running(&self, handle: PlaybackHandle) -> bool {
        self.status(handle).is_some_and(|s| s.is_running())
    }

    /// 有效播放数量
    pub fn len(&self) -> usize {
        self.timelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timelines.is_empty()
    }
}
