//! # Presets 模块
//!
//! 内置的编排预设，JSON 源文件位于 crate 根目录的 `presets/` 下，编译期嵌入。

use crate::choreography::Choreography;
use crate::error::{SequencerError, SequencerResult};

/// 内置预设
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    source: &'static str,
}

impl Preset {
    /// JSON 源文本
    pub fn source(&self) -> &'static str {
        self.source
    }

    /// 解析为编排文档
    pub fn choreography(&self) -> SequencerResult<Choreography> {
        Choreography::from_json(self.source)
    }
}

const PRESETS: &[Preset] = &[
    Preset {
        name: "about",
        description: "三段引言随滚动渐亮再渐暗",
        source: include_str!("../presets/about.json"),
    },
    Preset {
        name: "hero",
        description: "首屏元素交错入场，背景图回弹放大",
        source: include_str!("../presets/hero.json"),
    },
    Preset {
        name: "skills",
        description: "技能卡片进入视口时各播放一次",
        source: include_str!("../presets/skills.json"),
    },
    Preset {
        name: "collaboration",
        description: "双向跑马灯与渐变文字循环",
        source: include_str!("../presets/collaboration.json"),
    },
    Preset {
        name: "cursor",
        description: "悬停链接时光标缩小、跟随圈放大",
        source: include_str!("../presets/cursor.json"),
    },
    Preset {
        name: "loading",
        description: "问候语轮播后启动画面上滑",
        source: include_str!("../presets/loading.json"),
    },
];

/// 所有内置预设
pub fn all() -> &'static [Preset] {
    PRESETS
}

/// 按名称查找预设
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// 按名称加载预设
pub fn load(name: &str) -> SequencerResult<Choreography> {
    find(name)
        .ok_or_else(|| SequencerError::UnknownPreset {
            name: name.to_string(),
        })?
        .choreography()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_is_valid() {
        for preset in all() {
            let doc = preset
                .choreography()
                .unwrap_or_else(|e| panic!("{}: {}", preset.name, e));
            assert_eq!(doc.name, preset.name);
            assert_eq!(doc.diagnostics(), Vec::new(), "{}", preset.name);
        }
    }

    #[test]
    fn test_find_is_case_insensitive() {
        assert_eq!(find("About").map(|p| p.name), Some("about"));
        assert!(find("footer").is_none());
    }

    #[test]
    fn test_unknown_preset() {
        assert_eq!(
            load("footer"),
            Err(SequencerError::UnknownPreset {
                name: "footer".to_string()
            })
        );
    }
}
