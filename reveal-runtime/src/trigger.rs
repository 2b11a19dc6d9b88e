//! # Trigger 模块
//!
//! 触发观察器：把滚动、视口尺寸和指针事件转换为激活状态与进度。
//!
//! ## 节流
//!
//! [`TriggerObserver::handle_event`] 只记录事件；宿主每个绘制帧调用一次
//! [`TriggerObserver::flush`]，每个订阅在一帧内最多产生一次更新，且只在状态变化时产生。
//!
//! ## 阈值
//!
//! 阈值解析后缓存为滚动偏移区间。视口尺寸变化只把缓存标记为失效，
//! 在下一次处理滚动/尺寸事件时才重新计算。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{SequencerError, sanitize_fraction, sanitize_non_negative};
use crate::event::{HostEvent, PointerEvent};
use crate::geometry::{Rect, Vec2, Viewport};
use crate::target::TargetHandle;

/// 触发阈值
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// 元素锚点越过视口锚点（两者都是相对高度的比例）
    ///
    /// 例如 `"center 80%"`：元素中线越过视口 80% 高度处。
    Anchored { element: f32, viewport: f32 },
    /// 整页可滚动距离的比例
    PageFraction(f32),
    /// 绝对滚动偏移（像素）
    Offset(f32),
}

impl Threshold {
    pub fn anchored(element: f32, viewport: f32) -> Self {
        Self::Anchored {
            element: sanitize_non_negative("threshold.element", element),
            viewport: sanitize_non_negative("threshold.viewport", viewport),
        }
    }

    pub fn page_fraction(fraction: f32) -> Self {
        Self::PageFraction(sanitize_fraction("threshold.page", fraction))
    }

    pub fn offset(px: f32) -> Self {
        Self::Offset(sanitize_non_negative("threshold.offset", px))
    }

    /// 解析为滚动偏移
    ///
    /// 锚点阈值需要元素的布局矩形，缺失时返回 `None`。
    pub fn resolve(&self, bounds: Option<Rect>, viewport: &Viewport) -> Option<f32> {
        match *self {
            Self::Anchored { element, viewport: anchor } => {
                let bounds = bounds?;
                Some(bounds.top() + element * bounds.height - anchor * viewport.height)
            }
            Self::PageFraction(f) => Some(f * viewport.max_scroll()),
            Self::Offset(px) => Some(px),
        }
    }
}

impl FromStr for Threshold {
    type Err = SequencerError;

    /// 支持的写法：
    /// - `"top 80%"`、`"center center"`、`"bottom top"`、`"50% 20%"`
    /// - `"page 20%"`、`"page 0.2"`
    /// - `"300px"`
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let err = |message: &str| SequencerError::ParseThreshold {
            input: input.to_string(),
            message: message.to_string(),
        };

        let tokens: Vec<&str> = input.split_whitespace().collect();
        match tokens.as_slice() {
            ["page", fraction] => {
                let f = parse_fraction(fraction).ok_or_else(|| err("无法解析页面比例"))?;
                Ok(Self::page_fraction(f))
            }
            [element, viewport] => {
                let element = parse_anchor(element).ok_or_else(|| err("无法解析元素锚点"))?;
                let viewport = parse_anchor(viewport).ok_or_else(|| err("无法解析视口锚点"))?;
                Ok(Self::anchored(element, viewport))
            }
            [px] => {
                let value = px
                    .strip_suffix("px")
                    .and_then(|v| v.parse::<f32>().ok())
                    .ok_or_else(|| err("单个值必须是像素偏移，例如 300px"))?;
                Ok(Self::offset(value))
            }
            _ => Err(err("期望 \"<元素锚点> <视口锚点>\"")),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anchored { element, viewport } => {
                write!(f, "{}% {}%", element * 100.0, viewport * 100.0)
            }
            Self::PageFraction(v) => write!(f, "page {}%", v * 100.0),
            Self::Offset(px) => write!(f, "{}px", px),
        }
    }
}

fn parse_anchor(token: &str) -> Option<f32> {
    match token {
        "top" | "left" => Some(0.0),
        "center" => Some(0.5),
        "bottom" | "right" => Some(1.0),
        other => parse_fraction(other),
    }
}

fn parse_fraction(token: &str) -> Option<f32> {
    match token.strip_suffix('%') {
        Some(percent) => percent.parse::<f32>().ok().map(|v| v / 100.0),
        None => token.parse::<f32>().ok(),
    }
}

/// 触发模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    /// 进度与滚动位置绑定
    #[default]
    Scrub,
    /// 首次进入后固定为完成
    OneShot,
    /// 由指针悬停/触摸驱动
    Pointer,
}

/// 触发配置
#[derive(Debug, Clone)]
pub struct TriggerConfig {
    pub trigger: TargetHandle,
    pub start: Threshold,
    pub end: Threshold,
    pub mode: TriggerMode,
}

impl TriggerConfig {
    pub fn new(trigger: TargetHandle, start: Threshold, end: Threshold, mode: TriggerMode) -> Self {
        Self {
            trigger,
            start,
            end,
            mode,
        }
    }

    /// 滚动擦洗
    pub fn scrub(trigger: TargetHandle, start: Threshold, end: Threshold) -> Self {
        Self::new(trigger, start, end, TriggerMode::Scrub)
    }

    /// 进入视口时触发一次
    pub fn once(trigger: TargetHandle, start: Threshold) -> Self {
        Self::new(trigger, start, start, TriggerMode::OneShot)
    }

    /// 指针悬停
    pub fn pointer(trigger: TargetHandle) -> Self {
        Self::new(
            trigger,
            Threshold::Offset(0.0),
            Threshold::Offset(0.0),
            TriggerMode::Pointer,
        )
    }
}

/// 播放状态（激活 + 进度）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PlaybackState {
    /// 进度 (0.0 - 1.0)
    pub progress: f32,
    /// 是否激活
    pub is_active: bool,
}

/// 订阅 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// 一次触发更新
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TriggerUpdate {
    pub subscription: SubscriptionId,
    pub state: PlaybackState,
    /// 上一次发出的激活状态
    pub was_active: bool,
    /// 指针位置（仅指针模式，视口坐标）
    pub pointer: Option<Vec2>,
}

impl TriggerUpdate {
    /// 本次更新是否从未激活变为激活
    pub fn became_active(&self) -> bool {
        self.state.is_active && !self.was_active
    }

    /// 本次更新是否从激活变为未激活
    pub fn became_inactive(&self) -> bool {
        !self.state.is_active && self.was_active
    }
}

/// 订阅
#[derive(Debug)]
struct Subscription {
    config: TriggerConfig,
    state: PlaybackState,
    /// 缓存的滚动区间 (start, end)
    range: Option<(f32, f32)>,
    range_dirty: bool,
    /// 尚未做过首次求值
    needs_eval: bool,
    /// 一次性触发已完成
    spent: bool,
    /// 触发元素已移除
    detached: bool,
    /// 上次发出的指针位置
    last_pointer: Option<Vec2>,
}

/// 本帧待处理的事件类别
#[derive(Debug, Default, Clone, Copy)]
struct Pending {
    scroll: bool,
    pointer: bool,
}

/// 触发观察器
#[derive(Debug)]
pub struct TriggerObserver {
    subscriptions: BTreeMap<SubscriptionId, Subscription>,
    next_id: u64,
    viewport: Viewport,
    /// 指针位置（视口坐标），`None` 表示指针不在窗口内
    pointer: Option<Vec2>,
    pending: Pending,
}

impl TriggerObserver {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            subscriptions: BTreeMap::new(),
            next_id: 1,
            viewport,
            pointer: None,
            pending: Pending::default(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// 开始观察
    ///
    /// 首次求值在下一次 [`TriggerObserver::flush`] 时进行（元素挂载时可能已在视口内）。
    pub fn observe(&mut self, config: TriggerConfig) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        debug!(
            subscription = id.value(),
            trigger = %config.trigger.describe(),
            mode = ?config.mode,
            "开始观察触发器"
        );
        self.subscriptions.insert(
            id,
            Subscription {
                config,
                state: PlaybackState::default(),
                range: None,
                range_dirty: true,
                needs_eval: true,
                spent: false,
                detached: false,
                last_pointer: None,
            },
        );
        id
    }

    /// 停止观察
    ///
    /// 重复调用无副作用，返回本次是否真正移除了订阅。
    pub fn unobserve(&mut self, id: SubscriptionId) -> bool {
        self.subscriptions.remove(&id).is_some()
    }

    /// 移除所有订阅，返回移除的数量
    pub fn unobserve_all(&mut self) -> usize {
        let count = self.subscriptions.len();
        self.subscriptions.clear();
        count
    }

    pub fn is_observing(&self, id: SubscriptionId) -> bool {
        self.subscriptions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// 订阅的当前状态
    pub fn state(&self, id: SubscriptionId) -> Option<PlaybackState> {
        self.subscriptions.get(&id).map(|s| s.state)
    }

    /// 记录宿主事件（不立即产生更新）
    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::Scroll { x, y } => {
                self.viewport.scroll_x = x;
                self.viewport.scroll_y = sanitize_non_negative("scroll_y", y);
                self.pending.scroll = true;
                // 文档坐标随滚动变化，指针命中结果也要重新计算
                self.pending.pointer |= self.pointer.is_some();
            }
            HostEvent::Resize {
                width,
                height,
                document_height,
            } => {
                self.viewport.width = sanitize_non_negative("viewport.width", width);
                self.viewport.height = sanitize_non_negative("viewport.height", height);
                self.viewport.document_height =
                    sanitize_non_negative("viewport.document_height", document_height);
                self.invalidate_thresholds();
                self.pending.scroll = true;
            }
            HostEvent::Pointer(pointer) => {
                self.pointer = match pointer {
                    PointerEvent::Move { .. } | PointerEvent::TouchStart { .. } => {
                        pointer.position()
                    }
                    PointerEvent::Leave | PointerEvent::TouchEnd => None,
                };
                self.pending.pointer = true;
            }
        }
    }

    /// 标记所有阈值缓存失效（布局变化后调用）
    pub fn invalidate_thresholds(&mut self) {
        for sub in self.subscriptions.values_mut() {
            sub.range_dirty = true;
        }
    }

    /// 每帧调用一次，合并本帧事件并产生更新
    pub fn flush(&mut self) -> Vec<TriggerUpdate> {
        let pending = std::mem::take(&mut self.pending);
        let viewport = self.viewport;
        let pointer = self.pointer;
        let mut updates = Vec::new();

        for (id, sub) in self.subscriptions.iter_mut() {
            if sub.detached || sub.spent {
                continue;
            }
            let relevant = sub.needs_eval
                || match sub.config.mode {
                    TriggerMode::Scrub | TriggerMode::OneShot => pending.scroll,
                    TriggerMode::Pointer => pending.pointer,
                };
            if !relevant {
                continue;
            }

            let Some(target) = sub.config.trigger.resolve() else {
                sub.detached = true;
                debug!(subscription = id.value(), "触发元素已移除，停止发出更新");
                continue;
            };
            let bounds = target.bounding_box();
            let first = std::mem::replace(&mut sub.needs_eval, false);
            let previous = sub.state;

            let next = match sub.config.mode {
                TriggerMode::Scrub => sub.eval_scrub(bounds, &viewport),
                TriggerMode::OneShot => sub.eval_one_shot(bounds, &viewport),
                TriggerMode::Pointer => sub.eval_pointer(bounds, &viewport, pointer),
            };
            let Some(next) = next else {
                continue;
            };

            let pointer_moved = sub.config.mode == TriggerMode::Pointer
                && next.is_active
                && sub.last_pointer != pointer;
            if next == previous && !pointer_moved && !first {
                continue;
            }

            sub.state = next;
            if sub.config.mode == TriggerMode::Pointer {
                sub.last_pointer = pointer;
            }
            if sub.config.mode == TriggerMode::OneShot && next.is_active {
                sub.spent = true;
            }
            updates.push(TriggerUpdate {
                subscription: *id,
                state: next,
                was_active: previous.is_active,
                pointer: if sub.config.mode == TriggerMode::Pointer {
                    pointer
                } else {
                    None
                },
            });
        }
        updates
    }
}

impl Subscription {
    /// 按需重新计算滚动区间
    fn range(&mut self, bounds: Option<Rect>, viewport: &Viewport) -> Option<(f32, f32)> {
        if self.range_dirty || self.range.is_none() {
            let start = self.config.start.resolve(bounds, viewport);
            let end = self.config.end.resolve(bounds, viewport);
            self.range = match (start, end) {
                (Some(start), Some(end)) => {
                    if end < start {
                        warn!(start = start, end = end, "触发区间终点早于起点，已收缩为单点");
                    }
                    Some((start, end.max(start)))
                }
                _ => None,
            };
            self.range_dirty = false;
        }
        self.range
    }

    fn eval_scrub(&mut self, bounds: Option<Rect>, viewport: &Viewport) -> Option<PlaybackState> {
        let (start, end) = self.range(bounds, viewport)?;
        let scroll = viewport.scroll_y;
        let is_active = scroll >= start && scroll <= end;
        let progress = if end > start {
            ((scroll - start) / (end - start)).clamp(0.0, 1.0)
        } else if scroll >= start {
            1.0
        } else {
            0.0
        };
        Some(PlaybackState {
            progress,
            is_active,
        })
    }

    fn eval_one_shot(&mut self, bounds: Option<Rect>, viewport: &Viewport) -> Option<PlaybackState> {
        let (start, _) = self.range(bounds, viewport)?;
        if viewport.scroll_y >= start {
            Some(PlaybackState {
                progress: 1.0,
                is_active: true,
            })
        } else {
            Some(self.state)
        }
    }

    fn eval_pointer(
        &mut self,
        bounds: Option<Rect>,
        viewport: &Viewport,
        pointer: Option<Vec2>,
    ) -> Option<PlaybackState> {
        let hit = match (bounds, pointer) {
            (Some(bounds), Some(pointer)) => {
                let doc = viewport.to_document(pointer);
                bounds.contains(doc).then_some((bounds, doc))
            }
            _ => None,
        };
        match hit {
            Some((bounds, doc)) => {
                let progress = if bounds.width > 0.0 {
                    ((doc.x - bounds.x) / bounds.width).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                Some(PlaybackState {
                    progress,
                    is_active: true,
                })
            }
            // 离开时进度冻结
            None => Some(PlaybackState {
                progress: self.state.progress,
                is_active: false,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::StyleNode;
    use std::rc::Rc;

    fn section(y: f32, height: f32) -> Rc<StyleNode> {
        Rc::new(StyleNode::new("section", Rect::new(0.0, y, 1000.0, height)))
    }

    fn viewport() -> Viewport {
        Viewport::new(1000.0, 1000.0, 5000.0)
    }

    #[test]
    fn test_parse_thresholds() {
        assert_eq!("top 80%".parse(), Ok(Threshold::anchored(0.0, 0.8)));
        assert_eq!("center center".parse(), Ok(Threshold::anchored(0.5, 0.5)));
        assert_eq!("center top".parse(), Ok(Threshold::anchored(0.5, 0.0)));
        assert_eq!("page 20%".parse(), Ok(Threshold::page_fraction(0.2)));
        assert_eq!("300px".parse(), Ok(Threshold::offset(300.0)));
        assert!("middle of nowhere".parse::<Threshold>().is_err());
        assert!("sideways 10%".parse::<Threshold>().is_err());
    }

    #[test]
    fn test_negative_threshold_is_clamped() {
        assert_eq!(Threshold::offset(-50.0), Threshold::Offset(0.0));
        assert_eq!(Threshold::page_fraction(f32::NAN), Threshold::PageFraction(0.0));
    }

    #[test]
    fn test_anchored_resolution() {
        let threshold = Threshold::anchored(0.5, 0.8);
        let bounds = Rect::new(0.0, 2000.0, 100.0, 400.0);
        // 元素中线 2200 越过视口 80% (800) 处
        assert_eq!(threshold.resolve(Some(bounds), &viewport()), Some(1400.0));
        assert_eq!(threshold.resolve(None, &viewport()), None);
    }

    #[test]
    fn test_scrub_progress_and_activation() {
        let node = section(2000.0, 400.0);
        let mut observer = TriggerObserver::new(viewport());
        let id = observer.observe(TriggerConfig::scrub(
            TargetHandle::new(&node),
            Threshold::anchored(0.0, 1.0),
            Threshold::anchored(0.0, 0.0),
        ));

        // 区间 [1000, 2000]
        let first = observer.flush();
        assert_eq!(first.len(), 1);
        assert!(!first[0].state.is_active);

        observer.handle_event(HostEvent::scroll_to(1500.0));
        let updates = observer.flush();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].became_active());
        assert_eq!(updates[0].state.progress, 0.5);

        observer.handle_event(HostEvent::scroll_to(2600.0));
        let updates = observer.flush();
        assert!(updates[0].became_inactive());
        assert_eq!(updates[0].state.progress, 1.0);

        // 停在区间之外，进度保持不变且不再发出更新
        observer.handle_event(HostEvent::scroll_to(3000.0));
        assert!(observer.flush().is_empty());
        assert_eq!(observer.state(id).unwrap().progress, 1.0);
    }

    #[test]
    fn test_events_coalesce_per_frame() {
        let node = section(2000.0, 400.0);
        let mut observer = TriggerObserver::new(viewport());
        observer.observe(TriggerConfig::scrub(
            TargetHandle::new(&node),
            Threshold::anchored(0.0, 1.0),
            Threshold::anchored(0.0, 0.0),
        ));
        observer.flush();

        for y in [1100.0, 1200.0, 1300.0, 1400.0] {
            observer.handle_event(HostEvent::scroll_to(y));
        }
        let updates = observer.flush();
        assert_eq!(updates.len(), 1);
        assert!((updates[0].state.progress - 0.4).abs() < 1e-6);
        assert!(observer.flush().is_empty());
    }

    #[test]
    fn test_resize_recomputes_lazily() {
        let node = section(2000.0, 400.0);
        let mut observer = TriggerObserver::new(viewport());
        let id = observer.observe(TriggerConfig::scrub(
            TargetHandle::new(&node),
            Threshold::anchored(0.0, 1.0),
            Threshold::anchored(0.0, 0.0),
        ));
        observer.handle_event(HostEvent::scroll_to(1500.0));
        observer.flush();
        assert_eq!(observer.state(id).unwrap().progress, 0.5);

        // 视口变矮：区间变为 [1500, 2000]
        observer.handle_event(HostEvent::Resize {
            width: 1000.0,
            height: 500.0,
            document_height: 5000.0,
        });
        let updates = observer.flush();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].state.progress, 0.0);
        assert!(updates[0].state.is_active);
    }

    #[test]
    fn test_detached_trigger_stops_emitting() {
        let node = section(0.0, 400.0);
        let mut observer = TriggerObserver::new(viewport());
        let id = observer.observe(TriggerConfig::scrub(
            TargetHandle::new(&node),
            Threshold::offset(0.0),
            Threshold::offset(1000.0),
        ));
        observer.flush();

        node.detach();
        observer.handle_event(HostEvent::scroll_to(500.0));
        assert!(observer.flush().is_empty());

        drop(node);
        observer.handle_event(HostEvent::scroll_to(700.0));
        assert!(observer.flush().is_empty());
        assert!(observer.is_observing(id));
    }

    #[test]
    fn test_unobserve_is_idempotent() {
        let node = section(0.0, 400.0);
        let mut observer = TriggerObserver::new(viewport());
        let id = observer.observe(TriggerConfig::scrub(
            TargetHandle::new(&node),
            Threshold::offset(0.0),
            Threshold::offset(1000.0),
        ));
        assert!(observer.unobserve(id));
        assert!(!observer.unobserve(id));

        observer.handle_event(HostEvent::scroll_to(500.0));
        assert!(observer.flush().is_empty());
        assert!(observer.is_empty());
    }

    #[test]
    fn test_pointer_hover_and_leave() {
        let button = Rc::new(StyleNode::new("link", Rect::new(100.0, 100.0, 200.0, 50.0)));
        let mut observer = TriggerObserver::new(viewport());
        let id = observer.observe(TriggerConfig::pointer(TargetHandle::new(&button)));

        observer.handle_event(HostEvent::pointer_move(150.0, 120.0));
        let updates = observer.flush();
        assert_eq!(updates.len(), 1);
        assert!(updates[0].became_active());
        assert_eq!(updates[0].state.progress, 0.25);
        assert_eq!(updates[0].pointer, Some(Vec2::new(150.0, 120.0)));

        observer.handle_event(HostEvent::pointer_leave());
        let updates = observer.flush();
        assert!(updates[0].became_inactive());
        assert_eq!(updates[0].state.progress, 0.25);
        assert!(!observer.state(id).unwrap().is_active);
    }

    #[test]
    fn test_pointer_hit_test_follows_scroll() {
        let button = Rc::new(StyleNode::new("link", Rect::new(0.0, 1100.0, 200.0, 50.0)));
        let mut observer = TriggerObserver::new(viewport());
        observer.observe(TriggerConfig::pointer(TargetHandle::new(&button)));

        observer.handle_event(HostEvent::pointer_move(50.0, 120.0));
        let updates = observer.flush();
        assert!(!updates[0].state.is_active);

        // 指针不动，页面滚动后按钮移到指针下方
        observer.handle_event(HostEvent::scroll_to(1000.0));
        let updates = observer.flush();
        assert!(updates[0].became_active());
    }
    #[test]
    fn test_touch_press_and_release() {
        let button = Rc::new(StyleNode::new("link", Rect::new(100.0, 100.0, 200.0, 50.0)));
        let mut observer = TriggerObserver::new(viewport());
        let id = observer.observe(TriggerConfig::pointer(TargetHandle::new(&button)));

        observer.handle_event(HostEvent::Pointer(PointerEvent::TouchStart {
            x: 200.0,
            y: 110.0,
        }));
        let updates = observer.flush();
        assert!(updates[0].became_active());
        assert_eq!(updates[0].state.progress, 0.5);
        assert_eq!(updates[0].pointer, Some(Vec2::new(200.0, 110.0)));

        observer.handle_event(HostEvent::Pointer(PointerEvent::TouchEnd));
        let updates = observer.flush();
        assert!(updates[0].became_inactive());
        assert_eq!(updates[0].pointer, None);
        assert!(!observer.state(id).unwrap().is_active);
    }

    #[test]
    fn test_layout_change_after_invalidate() {
        let node = section(2000.0, 400.0);
        let mut observer = TriggerObserver::new(viewport());
        let id = observer.observe(TriggerConfig::scrub(
            TargetHandle::new(&node),
            Threshold::anchored(0.0, 1.0),
            Threshold::anchored(0.0, 0.0),
        ));
        observer.handle_event(HostEvent::scroll_to(1500.0));
        observer.flush();
        assert_eq!(observer.state(id).unwrap().progress, 0.5);

        // 内容插入使段落下移 500，缓存的区间在失效前保持不变
        node.set_bounds(Rect::new(0.0, 2500.0, 1000.0, 400.0));
        observer.handle_event(HostEvent::scroll_to(1500.0));
        assert!(observer.flush().is_empty());

        observer.invalidate_thresholds();
        observer.handle_event(HostEvent::scroll_to(1400.0));
        let updates = observer.flush();
        assert_eq!(updates[0].state.progress, 0.0);
        assert!(updates[0].became_inactive());
    }
}
