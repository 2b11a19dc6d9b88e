//! # Geometry 模块
//!
//! 触发器需要的几何量：二维向量、文档坐标下的布局矩形与视口度量。

use serde::{Deserialize, Serialize};

/// 二维向量
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// 创建新的向量
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// 线性插值
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// 布局矩形（文档坐标，不随滚动变化）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// 文档坐标下的点是否落在矩形内（含边界）
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// 视口度量
///
/// 由宿主在每次滚动/尺寸变化时提供。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// 视口宽度
    pub width: f32,
    /// 视口高度
    pub height: f32,
    /// 水平滚动偏移
    pub scroll_x: f32,
    /// 垂直滚动偏移
    pub scroll_y: f32,
    /// 文档总高度
    pub document_height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            document_height: 720.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32, document_height: f32) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
            document_height,
        }
    }

    /// 最大可滚动距离
    pub fn max_scroll(&self) -> f32 {
        (self.document_height - self.height).max(0.0)
    }

    /// 将视口坐标转换为文档坐标
    pub fn to_document(&self, point: Vec2) -> Vec2 {
        Vec2::new(point.x + self.scroll_x, point.y + self.scroll_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_lerp() {
        let v1 = Vec2::new(0.0, 0.0);
        let v2 = Vec2::new(10.0, 20.0);
        let mid = v1.lerp(v2, 0.5);
        assert_eq!(mid, Vec2::new(5.0, 10.0));
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 100.0, 50.0, 20.0);
        assert!(rect.contains(Vec2::new(10.0, 100.0)));
        assert!(rect.contains(Vec2::new(35.0, 110.0)));
        assert!(!rect.contains(Vec2::new(35.0, 121.0)));
        assert_eq!(rect.bottom(), 120.0);
    }

    #[test]
    fn test_viewport_scroll_range() {
        let mut viewport = Viewport::new(800.0, 600.0, 2600.0);
        assert_eq!(viewport.max_scroll(), 2000.0);

        viewport.scroll_y = 300.0;
        assert_eq!(viewport.to_document(Vec2::new(5.0, 5.0)), Vec2::new(5.0, 305.0));

        let short = Viewport::new(800.0, 600.0, 400.0);
        assert_eq!(short.max_scroll(), 0.0);
    }
}
