//! # Reveal Runtime
//!
//! 滚动/指针触发的动画时间轴引擎。
//!
//! ## 架构概述
//!
//! `reveal-runtime` 不依赖任何 UI 框架或渲染树，只通过 [`PresentationTarget`]
//! 读取布局矩形、写入样式属性。数据单向流动：
//!
//! ```text
//! Host                    ViewScope
//!   │                        │
//!   │── HostEvent ─────────►│ TriggerObserver（只记录）
//!   │                        │
//!   │── frame(dt) ─────────►│ flush → 激活/进度 → TimelinePlayer → 属性写入
//!   │◄── FrameReport ───────│
//!   │                        │
//!   │── unmount() ─────────►│ 取消所有订阅、停止所有播放
//! ```
//!
//! ## 核心类型
//!
//! - [`TriggerObserver`]：把滚动/尺寸/指针事件转换为 [`PlaybackState`]
//! - [`Timeline`] / [`TimelinePlayer`]：按进度或时间插值并写入属性
//! - [`ViewScope`]：一个视图内所有订阅与播放的所有者，负责清理
//! - [`Choreography`]：声明式编排（JSON），内置预设见 [`presets`]
//!
//! ## 使用示例
//!
//! ```ignore
//! reveal_runtime::init();
//!
//! let doc = reveal_runtime::presets::load("about")?;
//! let tree = doc.build_tree();
//! let mut view = ViewScope::new("about", Viewport::new(1280.0, 720.0, doc.document_height), config);
//! view.mount();
//! doc.install(&mut view, &tree)?;
//!
//! // 宿主事件循环
//! view.handle_event(HostEvent::scroll_to(1200.0));
//! let report = view.frame(1.0 / 60.0);
//!
//! // 视图销毁
//! view.unmount();
//! ```

pub mod choreography;
pub mod config;
pub mod easing;
pub mod error;
pub mod event;
pub mod follow;
pub mod geometry;
pub mod player;
pub mod presets;
pub mod registry;
pub mod step;
pub mod target;
pub mod timeline;
pub mod trigger;
pub mod value;
pub mod view;

// 重导出核心类型
pub use choreography::{Choreography, InstallReport, TargetResolver};
pub use config::{ConfigError, SequencerConfig};
pub use easing::EasingFunction;
pub use error::{SequencerError, SequencerResult};
pub use event::{HostEvent, PointerEvent};
pub use follow::PointerFollow;
pub use geometry::{Rect, Vec2, Viewport};
pub use player::{PlaybackHandle, PlayerEvent, TimelinePlayer};
pub use registry::init;
pub use step::{AnimationStep, StepBuilder, Tween, stagger};
pub use target::{ElementTree, PresentationTarget, StyleNode, TargetHandle, WriteRecord};
pub use timeline::{Direction, Driver, PlaybackStatus, Timeline};
pub use trigger::{
    PlaybackState, SubscriptionId, Threshold, TriggerConfig, TriggerMode, TriggerObserver,
    TriggerUpdate,
};
pub use value::PropertyValue;
pub use view::{Binding, FrameReport, ViewPhase, ViewScope};
