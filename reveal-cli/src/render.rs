//! # Render 模块
//!
//! 把模拟轨迹格式化为终端可读的文本，只输出有事发生的帧。

use std::fmt::Write;

use reveal_runtime::TriggerUpdate;

use crate::simulation::Trace;

/// 渲染整条轨迹
pub fn render_trace(trace: &Trace) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} sections, {} steps, {} frames",
        trace.name, trace.sections, trace.steps, trace.total_frames
    );
    let _ = writeln!(out, "initial: {} writes", trace.initial.len());

    for frame in &trace.frames {
        let _ = writeln!(
            out,
            "[{:>4}] t={:.2}s scroll={:.0}",
            frame.frame, frame.time, frame.scroll
        );
        for update in &frame.updates {
            let _ = writeln!(out, "  {}", describe_update(update));
        }
        for event in &frame.events {
            let _ = writeln!(out, "  {}", event);
        }
        for write in &frame.writes {
            let _ = writeln!(out, "  {}.{} = {}", write.element, write.property, write.value);
        }
    }

    let _ = write!(out, "total: {} writes", trace.total_writes());
    out
}

fn describe_update(update: &TriggerUpdate) -> String {
    let state = if update.became_active() {
        "enter"
    } else if update.became_inactive() {
        "leave"
    } else if update.state.is_active {
        "active"
    } else {
        "idle"
    };
    let mut line = format!(
        "trigger #{} {} progress={:.2}",
        update.subscription.value(),
        state,
        update.state.progress
    );
    if let Some(pointer) = update.pointer {
        let _ = write!(line, " pointer=({:.0}, {:.0})", pointer.x, pointer.y);
    }
    line
}
