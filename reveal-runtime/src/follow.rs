//! # Follow 模块
//!
//! 指针跟随：目标以固定延迟追向最新的指针位置（自定义光标与其跟随圈）。
//!
//! 每次指针移动都以当前位置为起点重新开始一段补间，因此快速移动时目标会平滑地
//! 追赶，而不是逐帧跳变。位置写入目标的 `x` / `y` 属性（视口坐标）。

use tracing::trace;

use crate::easing::EasingFunction;
use crate::error::sanitize_non_negative;
use crate::geometry::Vec2;
use crate::target::TargetHandle;
use crate::value::PropertyValue;

/// 单个跟随目标
#[derive(Debug, Clone)]
pub struct PointerFollow {
    target: TargetHandle,
    /// 追上指针所需的时间（秒）
    lag: f32,
    easing: EasingFunction,
    from: Vec2,
    to: Vec2,
    current: Vec2,
    elapsed: f32,
    settled: bool,
}

impl PointerFollow {
    pub fn new(target: TargetHandle, lag: f32, easing: EasingFunction) -> Self {
        Self {
            target,
            lag: sanitize_non_negative("lag", lag),
            easing,
            from: Vec2::zero(),
            to: Vec2::zero(),
            current: Vec2::zero(),
            elapsed: 0.0,
            settled: true,
        }
    }

    pub fn target(&self) -> &TargetHandle {
        &self.target
    }

    pub fn lag(&self) -> f32 {
        self.lag
    }

    /// 当前位置
    pub fn position(&self) -> Vec2 {
        self.current
    }

    /// 是否已追上最近一次的指针位置
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// 设置新的追赶目标
    ///
    /// 延迟为 0 时立即跳到目标位置并写入。
    pub fn retarget(&mut self, pointer: Vec2) {
        if pointer == self.to && !self.settled {
            return;
        }
        self.from = self.current;
        self.to = pointer;
        self.elapsed = 0.0;
        self.settled = false;
        if self.lag == 0.0 {
            self.current = pointer;
            self.settled = true;
            self.write();
        }
    }

    /// 推进追赶，返回本次是否写入了目标
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.settled {
            return false;
        }
        self.elapsed += sanitize_non_negative("dt", dt);
        let local = if self.lag > 0.0 {
            (self.elapsed / self.lag).min(1.0)
        } else {
            1.0
        };
        self.current = if local >= 1.0 {
            self.to
        } else {
            self.from.lerp(self.to, self.easing.apply(local))
        };
        self.settled = local >= 1.0;
        self.write()
    }

    fn write(&self) -> bool {
        let Some(target) = self.target.resolve() else {
            trace!(follower = ?self.target, "跟随目标不可用，跳过写入");
            return false;
        };
        let x = target.write_property("x", &PropertyValue::number(self.current.x));
        let y = target.write_property("y", &PropertyValue::number(self.current.y));
        x || y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::target::ElementTree;

    fn tree() -> ElementTree {
        let mut tree = ElementTree::new();
        tree.insert("follower", Rect::new(0.0, 0.0, 32.0, 32.0));
        tree
    }

    #[test]
    fn test_follow_catches_up_after_lag() {
        let tree = tree();
        let mut follow = PointerFollow::new(
            tree.handle("follower").unwrap(),
            0.4,
            EasingFunction::Linear,
        );
        follow.retarget(Vec2::new(100.0, 40.0));
        assert!(!follow.is_settled());

        assert!(follow.advance(0.1));
        assert_eq!(follow.position(), Vec2::new(25.0, 10.0));
        let node = tree.get("follower").unwrap();
        assert_eq!(node.style_f32("x"), Some(25.0));

        follow.advance(0.5);
        assert!(follow.is_settled());
        assert_eq!(node.style_f32("y"), Some(40.0));
        assert!(!follow.advance(0.1));
    }

    #[test]
    fn test_retarget_starts_from_current_position() {
        let tree = tree();
        let mut follow = PointerFollow::new(
            tree.handle("follower").unwrap(),
            0.2,
            EasingFunction::Linear,
        );
        follow.retarget(Vec2::new(100.0, 0.0));
        follow.advance(0.1);
        assert_eq!(follow.position().x, 50.0);

        // 中途改变方向，从 50 出发而不是从原点
        follow.retarget(Vec2::new(0.0, 0.0));
        follow.advance(0.1);
        assert_eq!(follow.position().x, 25.0);
    }

    #[test]
    fn test_zero_lag_jumps() {
        let tree = tree();
        let mut follow = PointerFollow::new(
            tree.handle("follower").unwrap(),
            0.0,
            EasingFunction::Linear,
        );
        follow.retarget(Vec2::new(12.0, 34.0));
        assert!(follow.is_settled());
        assert_eq!(tree.get("follower").unwrap().style_f32("x"), Some(12.0));
    }

    #[test]
    fn test_negative_lag_is_clamped() {
        let follow = PointerFollow::new(TargetHandle::detached(), -1.0, EasingFunction::Linear);
        assert_eq!(follow.lag(), 0.0);
    }

    #[test]
    fn test_released_target_is_skipped() {
        let mut tree = tree();
        let mut follow = PointerFollow::new(
            tree.handle("follower").unwrap(),
            0.2,
            EasingFunction::Linear,
        );
        tree.remove("follower");
        follow.retarget(Vec2::new(10.0, 10.0));
        assert!(!follow.advance(0.2));
        assert!(follow.is_settled());
    }
}
