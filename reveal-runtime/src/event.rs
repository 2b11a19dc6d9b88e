//! # Event 模块
//!
//! 宿主向序列器传递的离散事件。

use serde::{Deserialize, Serialize};

use crate::geometry::Vec2;

/// 指针事件（视口坐标）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PointerEvent {
    /// 鼠标移动
    Move { x: f32, y: f32 },
    /// 鼠标离开窗口
    Leave,
    /// 触摸开始（触屏没有悬停，按下即进入）
    TouchStart { x: f32, y: f32 },
    /// 触摸结束
    TouchEnd,
}

impl PointerEvent {
    /// 事件携带的指针位置，离开类事件返回 `None`
    pub fn position(&self) -> Option<Vec2> {
        match self {
            Self::Move { x, y } | Self::TouchStart { x, y } => Some(Vec2::new(*x, *y)),
            Self::Leave | Self::TouchEnd => None,
        }
    }
}

/// 宿主事件
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// 滚动到指定偏移
    Scroll { x: f32, y: f32 },
    /// 视口尺寸变化
    Resize {
        width: f32,
        height: f32,
        document_height: f32,
    },
    /// 指针事件
    Pointer(PointerEvent),
}

impl HostEvent {
    pub fn scroll_to(y: f32) -> Self {
        Self::Scroll { x: 0.0, y }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::Pointer(PointerEvent::Move { x, y })
    }

    pub fn pointer_leave() -> Self {
        Self::Pointer(PointerEvent::Leave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_position() {
        assert_eq!(
            PointerEvent::TouchStart { x: 3.0, y: 4.0 }.position(),
            Some(Vec2::new(3.0, 4.0))
        );
        assert_eq!(PointerEvent::Leave.position(), None);
    }

    #[test]
    fn test_event_json() {
        let events: Vec<HostEvent> = serde_json::from_str(
            r#"[
                {"type": "scroll", "x": 0, "y": 120},
                {"type": "pointer", "kind": "move", "x": 10, "y": 20},
                {"type": "pointer", "kind": "leave"}
            ]"#,
        )
        .unwrap();
        assert_eq!(events[0], HostEvent::scroll_to(120.0));
        assert_eq!(events[1], HostEvent::pointer_move(10.0, 20.0));
        assert_eq!(events[2], HostEvent::pointer_leave());
    }
}
