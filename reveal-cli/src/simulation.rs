//! # Simulation 模块
//!
//! 无界面模拟：按帧向视图喂入滚动与指针事件，记录每帧的触发更新与属性写入。

use anyhow::Context;
use serde::Serialize;
use tracing::debug;

use reveal_runtime::{
    Choreography, HostEvent, PlayerEvent, SequencerConfig, TriggerUpdate, ViewScope, Viewport,
    WriteRecord,
};

use crate::config::SimulationConfig;

/// 一次模拟的完整轨迹
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub name: String,
    pub sections: usize,
    pub steps: usize,
    /// 安装时写入的初始值
    pub initial: Vec<WriteRecord>,
    /// 有事发生的帧
    pub frames: Vec<FrameTrace>,
    /// 模拟帧总数
    pub total_frames: usize,
}

impl Trace {
    /// 所有帧的写入总数（不含初始值）
    pub fn total_writes(&self) -> usize {
        self.frames.iter().map(|f| f.writes.len()).sum()
    }
}

/// 单帧轨迹
#[derive(Debug, Clone, Serialize)]
pub struct FrameTrace {
    pub frame: usize,
    pub time: f32,
    pub scroll: f32,
    pub updates: Vec<TriggerUpdate>,
    pub events: Vec<String>,
    pub writes: Vec<WriteRecord>,
}

impl FrameTrace {
    fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.events.is_empty() && self.writes.is_empty()
    }
}

fn describe_event(event: &PlayerEvent) -> String {
    match event {
        PlayerEvent::Started(handle) => format!("{} started", handle),
        PlayerEvent::Completed(handle) => format!("{} completed", handle),
        PlayerEvent::Stopped(handle) => format!("{} stopped", handle),
    }
}

/// 运行模拟
pub fn run(
    doc: &Choreography,
    config: &SimulationConfig,
    sequencer: SequencerConfig,
) -> anyhow::Result<Trace> {
    let tree = doc.build_tree();
    let viewport = Viewport::new(
        config.viewport_width,
        config.viewport_height,
        doc.document_height,
    );
    let mut view = ViewScope::new(doc.name.clone(), viewport, sequencer);
    view.mount();
    let report = doc
        .install(&mut view, &tree)
        .with_context(|| format!("安装 '{}' 失败", doc.name))?;
    debug!(
        sections = report.sections,
        steps = report.steps,
        missing = report.missing_targets.len(),
        "编排已安装"
    );

    let initial = tree.drain_writes();
    let max_scroll = viewport.max_scroll();
    let mut frames = Vec::new();

    for frame in 0..config.frames {
        let time = frame as f32 * config.frame_dt;
        let scroll = (config.scroll_speed * time).min(max_scroll);
        view.handle_event(HostEvent::scroll_to(scroll));
        for cue in config.pointer.iter().filter(|c| c.frame == frame) {
            view.handle_event(match cue.position {
                Some([x, y]) => HostEvent::pointer_move(x, y),
                None => HostEvent::pointer_leave(),
            });
        }

        let result = view.frame(config.frame_dt);
        let trace = FrameTrace {
            frame,
            time,
            scroll,
            updates: result.updates,
            events: result.events.iter().map(describe_event).collect(),
            writes: tree.drain_writes(),
        };
        if !trace.is_empty() {
            frames.push(trace);
        }
    }

    view.unmount();
    Ok(Trace {
        name: doc.name.clone(),
        sections: report.sections,
        steps: report.steps,
        initial,
        frames,
        total_frames: config.frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reveal_runtime::{PropertyValue, presets};

    fn quick_config(frames: usize) -> SimulationConfig {
        SimulationConfig {
            frames,
            frame_dt: 0.05,
            pointer: Vec::new(),
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn test_loading_preset_trace() {
        let doc = presets::load("loading").unwrap();
        let trace = run(&doc, &quick_config(80), SequencerConfig::default()).unwrap();

        assert_eq!(trace.name, "loading");
        assert!(!trace.initial.is_empty());
        let last_display = trace
            .frames
            .iter()
            .flat_map(|f| f.writes.iter())
            .filter(|w| w.element == "splash" && w.property == "display")
            .last()
            .unwrap();
        assert_eq!(last_display.value, PropertyValue::keyword("none"));
    }

    #[test]
    fn test_about_preset_scroll_updates() {
        let doc = presets::load("about").unwrap();
        let config = SimulationConfig {
            scroll_speed: 1200.0,
            ..quick_config(60)
        };
        let trace = run(&doc, &config, SequencerConfig::default()).unwrap();

        let activations = trace
            .frames
            .iter()
            .flat_map(|f| f.updates.iter())
            .filter(|u| u.became_active())
            .count();
        assert_eq!(activations, 1);
        assert!(trace.total_writes() > 0);
    }

    #[test]
    fn test_cursor_hover_script() {
        let doc = presets::load("cursor").unwrap();
        let config = SimulationConfig {
            frames: 60,
            frame_dt: 0.05,
            ..SimulationConfig::default()
        };
        let trace = run(&doc, &config, SequencerConfig::default()).unwrap();

        let hover = trace.frames.iter().find(|f| f.frame == 30).unwrap();
        assert!(hover.updates[0].became_active());
        assert!(hover.events.iter().any(|e| e.ends_with("started")));
    }

    #[test]
    fn test_cursor_follows_pointer() {
        let doc = presets::load("cursor").unwrap();
        let config = SimulationConfig {
            frames: 60,
            frame_dt: 0.05,
            ..SimulationConfig::default()
        };
        let trace = run(&doc, &config, SequencerConfig::default()).unwrap();

        let last = |element: &str, property: &str| {
            trace
                .frames
                .iter()
                .flat_map(|f| f.writes.iter())
                .filter(|w| w.element == element && w.property == property)
                .last()
                .map(|w| w.value.clone())
        };
        assert_eq!(last("cursor", "x"), Some(PropertyValue::number(1100.0)));
        assert_eq!(last("follower", "y"), Some(PropertyValue::number(44.0)));

        // 跟随圈比光标慢：第一帧只追上一部分
        let hover = trace.frames.iter().find(|f| f.frame == 30).unwrap();
        let first = hover
            .writes
            .iter()
            .find(|w| w.element == "follower" && w.property == "x")
            .and_then(|w| w.value.as_f32())
            .unwrap();
        assert!(first > 0.0 && first < 1100.0);
    }
}
