//! # Choreography 模块
//!
//! 声明式动画编排：用 JSON 描述元素布局、触发器与步骤，安装到 [`ViewScope`]。
//!
//! ## 格式
//!
//! ```json
//! {
//!   "name": "about",
//!   "document_height": 4000,
//!   "elements": [{ "id": "about", "rect": { "x": 0, "y": 1200, "width": 1280, "height": 900 } }],
//!   "sections": [{
//!     "name": "quotes",
//!     "trigger": { "element": "about", "start": "center 80%", "end": "center top" },
//!     "defaults": { "duration": 0.1, "easing": "none" },
//!     "steps": [
//!       { "target": "about-1", "properties": { "opacity": { "from": 0.2, "to": 1 } } },
//!       { "target": "about-1", "delay": 0.5, "properties": { "opacity": { "from": 1, "to": 0.2 } } },
//!       { "target": "about-2", "position": "<", "properties": { "opacity": { "from": 0.2, "to": 1 } } }
//!     ]
//!   }]
//! }
//! ```
//!
//! ## 步骤位置
//!
//! 未指定 `offset` / `position` 的步骤接在时间轴末尾。`position` 支持：
//! - 数字：绝对偏移
//! - `"+=0.5"` / `"-=0.5"`：相对时间轴末尾
//! - `"<"` / `"<0.4"`：相对上一步的开始
//! - `">"` / `">0.2"`：相对上一步的结束
//!
//! ## 错误处理
//!
//! 段级配置（触发元素、阈值）错误使安装失败，且失败时视图中不会留下任何订阅或播放；
//! 单个步骤的问题（未知目标、未知缓动）只跳过该步骤并记录警告。
//!
//! ## 指针跟随
//!
//! `"binding": "follow"` 的段不构建时间轴：每个步骤的目标在触发器激活时追随指针，
//! 步骤的 `duration` 即追赶延迟，`properties` 可省略。

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SequencerConfig;
use crate::easing::EasingFunction;
use crate::follow::PointerFollow;
use crate::error::{SequencerError, SequencerResult, sanitize_non_negative};
use crate::geometry::Rect;
use crate::player::PlaybackHandle;
use crate::registry;
use crate::step::{AnimationStep, Tween, stagger};
use crate::target::{ElementTree, TargetHandle};
use crate::timeline::{Driver, Timeline};
use crate::trigger::{SubscriptionId, Threshold, TriggerConfig, TriggerMode};
use crate::value::PropertyValue;
use crate::view::{Binding, ViewScope};

/// 按元素 ID 查找目标
pub trait TargetResolver {
    fn resolve_target(&self, id: &str) -> Option<TargetHandle>;
}

impl TargetResolver for ElementTree {
    fn resolve_target(&self, id: &str) -> Option<TargetHandle> {
        self.handle(id)
    }
}

/// 编排文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choreography {
    /// 名称
    #[serde(default)]
    pub name: String,

    /// 文档总高度
    #[serde(default = "default_document_height")]
    pub document_height: f32,

    /// 元素布局（无界面宿主用来构建元素树）
    #[serde(default)]
    pub elements: Vec<ElementSpec>,

    /// 动画段
    #[serde(default)]
    pub sections: Vec<SectionSpec>,
}

/// 元素布局
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub id: String,
    pub rect: Rect,
}

/// 动画段：一个可选触发器 + 一条时间轴
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    #[serde(default)]
    pub name: String,

    /// 触发器，缺省时作为自由播放在挂载后立即开始
    #[serde(default)]
    pub trigger: Option<TriggerSpec>,

    /// 绑定方式，缺省时由触发模式决定
    #[serde(default)]
    pub binding: Option<Binding>,

    /// 是否循环（仅时间驱动）
    #[serde(default)]
    pub looping: bool,

    /// 启动延迟（秒）
    #[serde(default)]
    pub delay: f32,

    /// 本段步骤的默认值
    #[serde(default)]
    pub defaults: SectionDefaults,

    pub steps: Vec<StepSpec>,
}

/// 段级默认值，未指定时使用 [`SequencerConfig`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionDefaults {
    #[serde(default)]
    pub duration: Option<f32>,
    #[serde(default)]
    pub easing: Option<String>,
}

/// 触发器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSpec {
    /// 触发元素 ID
    pub element: String,

    #[serde(default = "default_start")]
    pub start: String,

    #[serde(default = "default_end")]
    pub end: String,

    #[serde(default)]
    pub mode: TriggerMode,
}

/// 步骤配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    /// 目标元素 ID（一个或多个）
    pub target: TargetSelector,

    /// 绝对偏移（秒），优先于 `position`
    #[serde(default)]
    pub offset: Option<f32>,

    #[serde(default)]
    pub position: Option<Position>,

    /// 在计算出的位置上额外推迟（秒）
    #[serde(default)]
    pub delay: f32,

    #[serde(default)]
    pub duration: Option<f32>,

    #[serde(default)]
    pub easing: Option<String>,

    /// 多目标时相邻目标的间隔（秒）
    #[serde(default)]
    pub stagger: Option<f32>,

    /// 跟随段的步骤没有属性
    #[serde(default)]
    pub properties: BTreeMap<String, TweenSpec>,
}

/// 单个属性的起止值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenSpec {
    pub from: PropertyValue,
    pub to: PropertyValue,
}

/// 目标选择
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetSelector {
    One(String),
    Many(Vec<String>),
}

impl TargetSelector {
    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::One(id) => vec![id.as_str()],
            Self::Many(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

/// 步骤在时间轴上的位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPosition", into = "RawPosition")]
pub enum Position {
    /// 绝对偏移
    At(f32),
    /// 相对时间轴末尾
    FromEnd(f32),
    /// 相对上一步的开始
    WithPrevious(f32),
    /// 相对上一步的结束
    AfterPrevious(f32),
}

impl FromStr for Position {
    type Err = SequencerError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let s = input.trim();
        let err = || SequencerError::InvalidChoreography {
            message: format!("无效的步骤位置 '{}'", input),
        };
        let relative = |rest: &str| -> Result<f32, SequencerError> {
            let rest = rest.trim();
            if rest.is_empty() {
                return Ok(0.0);
            }
            let rest = rest.strip_prefix("+=").unwrap_or(rest);
            match rest.strip_prefix("-=") {
                Some(neg) => neg.parse::<f32>().map(|v| -v).map_err(|_| err()),
                None => rest.parse::<f32>().map_err(|_| err()),
            }
        };

        if let Some(rest) = s.strip_prefix('<') {
            return Ok(Self::WithPrevious(relative(rest)?));
        }
        if let Some(rest) = s.strip_prefix('>') {
            return Ok(Self::AfterPrevious(relative(rest)?));
        }
        if let Some(rest) = s.strip_prefix("+=") {
            return rest.parse().map(Self::FromEnd).map_err(|_| err());
        }
        if let Some(rest) = s.strip_prefix("-=") {
            return rest.parse::<f32>().map(|v| Self::FromEnd(-v)).map_err(|_| err());
        }
        s.parse().map(Self::At).map_err(|_| err())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::At(v) => write!(f, "{}", v),
            Self::FromEnd(v) if v < 0.0 => write!(f, "-={}", -v),
            Self::FromEnd(v) => write!(f, "+={}", v),
            Self::WithPrevious(v) if v == 0.0 => write!(f, "<"),
            Self::WithPrevious(v) => write!(f, "<{}", v),
            Self::AfterPrevious(v) if v == 0.0 => write!(f, ">"),
            Self::AfterPrevious(v) => write!(f, ">{}", v),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPosition {
    Number(f32),
    Text(String),
}

impl TryFrom<RawPosition> for Position {
    type Error = SequencerError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        match raw {
            RawPosition::Number(v) => Ok(Self::At(v)),
            RawPosition::Text(s) => s.parse(),
        }
    }
}

impl From<Position> for RawPosition {
    fn from(position: Position) -> Self {
        match position {
            Position::At(v) => RawPosition::Number(v),
            other => RawPosition::Text(other.to_string()),
        }
    }
}

// 默认值函数
fn default_document_height() -> f32 {
    720.0
}

fn default_start() -> String {
    "top bottom".to_string()
}

fn default_end() -> String {
    "bottom top".to_string()
}

/// 安装结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstallReport {
    /// 安装的段数
    pub sections: usize,
    /// 构建的步骤数
    pub steps: usize,
    /// 因配置问题跳过的步骤数
    pub skipped_steps: usize,
    /// 找不到的目标元素 ID
    pub missing_targets: Vec<String>,
    pub subscriptions: Vec<SubscriptionId>,
    pub playbacks: Vec<PlaybackHandle>,
}

/// 时间轴游标：记录上一步与时间轴末尾
#[derive(Debug, Default, Clone, Copy)]
struct Cursor {
    prev_start: f32,
    prev_end: f32,
    end: f32,
}

impl Cursor {
    fn place(&self, offset: Option<f32>, position: Option<Position>) -> f32 {
        if let Some(offset) = offset {
            return offset;
        }
        match position {
            None => self.end,
            Some(Position::At(v)) => v,
            Some(Position::FromEnd(d)) => self.end + d,
            Some(Position::WithPrevious(d)) => self.prev_start + d,
            Some(Position::AfterPrevious(d)) => self.prev_end + d,
        }
    }

    fn advance(&mut self, start: f32, end: f32) {
        self.prev_start = start;
        self.prev_end = end;
        self.end = self.end.max(end);
    }
}

impl Choreography {
    /// 从 JSON 文本解析
    pub fn from_json(json: &str) -> SequencerResult<Self> {
        serde_json::from_str(json).map_err(|e| SequencerError::InvalidChoreography {
            message: e.to_string(),
        })
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> SequencerResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SequencerError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> SequencerResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SequencerError::InvalidChoreography {
            message: e.to_string(),
        })
    }

    /// 按元素布局构建内存元素树
    pub fn build_tree(&self) -> ElementTree {
        let mut tree = ElementTree::new();
        for element in &self.elements {
            tree.insert(element.id.clone(), element.rect);
        }
        tree
    }

    /// 检查文档中的所有问题
    ///
    /// 会确保缓动表已注册。返回空列表表示文档有效。
    pub fn diagnostics(&self) -> Vec<SequencerError> {
        registry::init();
        let mut errors = Vec::new();

        let mut ids = HashSet::new();
        for element in &self.elements {
            if !ids.insert(element.id.as_str()) {
                errors.push(SequencerError::InvalidChoreography {
                    message: format!("元素 '{}' 重复定义", element.id),
                });
            }
        }
        let check_id = |id: &str, errors: &mut Vec<SequencerError>| {
            if !ids.contains(id) {
                errors.push(SequencerError::UnknownTarget { id: id.to_string() });
            }
        };

        for section in &self.sections {
            let follow = section.binding == Some(Binding::Follow);
            if let Some(trigger) = &section.trigger {
                check_id(&trigger.element, &mut errors);
                if follow && trigger.mode != TriggerMode::Pointer {
                    errors.push(SequencerError::InvalidChoreography {
                        message: format!("段 '{}' 的跟随绑定需要指针触发器", section.name),
                    });
                }
                for threshold in [&trigger.start, &trigger.end] {
                    if let Err(e) = threshold.parse::<Threshold>() {
                        errors.push(e);
                    }
                }
            }
            check_non_negative("delay", section.delay, &mut errors);
            if let Some(easing) = &section.defaults.easing
                && let Err(e) = registry::easing_by_name(easing)
            {
                errors.push(e);
            }

            for step in &section.steps {
                for id in step.target.ids() {
                    check_id(id, &mut errors);
                }
                if let Some(easing) = &step.easing
                    && let Err(e) = registry::easing_by_name(easing)
                {
                    errors.push(e);
                }
                if let Some(offset) = step.offset {
                    check_non_negative("offset", offset, &mut errors);
                }
                if let Some(duration) = step.duration {
                    check_non_negative("duration", duration, &mut errors);
                }
                if let Some(each) = step.stagger {
                    check_non_negative("stagger", each, &mut errors);
                }
                if step.properties.is_empty() && !follow {
                    errors.push(SequencerError::InvalidChoreography {
                        message: format!("段 '{}' 中有步骤没有任何属性", section.name),
                    });
                }
            }
        }
        errors
    }

    /// 检查文档，返回第一个问题
    pub fn validate(&self) -> SequencerResult<()> {
        match self.diagnostics().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// 安装到视图
    ///
    /// 视图必须已挂载。
    pub fn install(
        &self,
        view: &mut ViewScope,
        resolver: &impl TargetResolver,
    ) -> SequencerResult<InstallReport> {
        if !view.is_mounted() {
            return Err(SequencerError::InvalidChoreography {
                message: format!("视图 '{}' 尚未挂载", view.name()),
            });
        }

        // 先解析全部触发器，任何一段失败都不向视图安装任何东西
        let triggers = self
            .sections
            .iter()
            .map(|section| {
                section
                    .trigger
                    .as_ref()
                    .map(|spec| build_trigger(spec, resolver))
                    .transpose()
            })
            .collect::<SequencerResult<Vec<_>>>()?;

        let mut report = InstallReport::default();
        for (section, trigger) in self.sections.iter().zip(triggers) {
            match trigger {
                Some(trigger) => {
                    let binding = section
                        .binding
                        .unwrap_or_else(|| default_binding(trigger.mode));
                    if binding == Binding::Follow {
                        let followers =
                            build_followers(section, view.config(), resolver, &mut report);
                        report.steps += followers.len();
                        if let Some(subscription) = view.follow(trigger, followers) {
                            report.subscriptions.push(subscription);
                        }
                        report.sections += 1;
                        debug!(section = %section.name, "跟随段已安装");
                        continue;
                    }

                    let steps = build_steps(section, view.config(), resolver, &mut report);
                    report.steps += steps.len();
                    let driver = match binding {
                        Binding::Scrub => Driver::Progress,
                        _ => Driver::Time {
                            looping: section.looping,
                        },
                    };
                    let timeline = Timeline::new(steps, driver).with_delay(section.delay);
                    if let Some((subscription, playback)) =
                        view.bind_timeline(trigger, timeline, binding)
                    {
                        report.subscriptions.push(subscription);
                        report.playbacks.push(playback);
                    }
                }
                None => {
                    if section.binding.is_some() {
                        warn!(section = %section.name, "没有触发器的段忽略 binding");
                    }
                    let steps = build_steps(section, view.config(), resolver, &mut report);
                    report.steps += steps.len();
                    let driver = Driver::Time {
                        looping: section.looping,
                    };
                    let timeline = Timeline::new(steps, driver).with_delay(section.delay);
                    if let Some(playback) = view.play_timeline(timeline) {
                        report.playbacks.push(playback);
                    }
                }
            }
            report.sections += 1;
            debug!(section = %section.name, "动画段已安装");
        }
        Ok(report)
    }
}

fn check_non_negative(field: &str, value: f32, errors: &mut Vec<SequencerError>) {
    if value.is_nan() || value < 0.0 {
        errors.push(SequencerError::InvalidConfig {
            field: field.to_string(),
            value,
        });
    }
}

fn default_binding(mode: TriggerMode) -> Binding {
    match mode {
        TriggerMode::Scrub => Binding::Scrub,
        TriggerMode::OneShot => Binding::PlayOnce,
        TriggerMode::Pointer => Binding::Toggle,
    }
}

fn build_trigger(
    spec: &TriggerSpec,
    resolver: &impl TargetResolver,
) -> SequencerResult<TriggerConfig> {
    let element = resolver
        .resolve_target(&spec.element)
        .ok_or_else(|| SequencerError::UnknownTarget {
            id: spec.element.clone(),
        })?;
    let start: Threshold = spec.start.parse()?;
    let end: Threshold = spec.end.parse()?;
    Ok(TriggerConfig::new(element, start, end, spec.mode))
}

/// 段的默认时长与缓动
fn section_defaults(section: &SectionSpec, config: &SequencerConfig) -> (f32, EasingFunction) {
    let duration = section
        .defaults
        .duration
        .unwrap_or(config.step_defaults.duration);
    let easing = match &section.defaults.easing {
        Some(name) => resolve_easing(name).unwrap_or_else(|| config.default_easing()),
        None => config.default_easing(),
    };
    (duration, easing)
}

/// 步骤缓动，无法解析时计入跳过并返回 `None`
fn step_easing(
    spec: &StepSpec,
    default: EasingFunction,
    report: &mut InstallReport,
) -> Option<EasingFunction> {
    match &spec.easing {
        Some(name) => {
            let easing = resolve_easing(name);
            if easing.is_none() {
                report.skipped_steps += 1;
            }
            easing
        }
        None => Some(default),
    }
}

fn step_targets(
    section: &SectionSpec,
    spec: &StepSpec,
    resolver: &impl TargetResolver,
    report: &mut InstallReport,
) -> Vec<TargetHandle> {
    spec.target
        .ids()
        .into_iter()
        .map(|id| {
            resolver.resolve_target(id).unwrap_or_else(|| {
                let err = SequencerError::UnknownTarget { id: id.to_string() };
                warn!(error = %err, section = %section.name, "步骤目标不存在，已跳过");
                report.missing_targets.push(id.to_string());
                TargetHandle::detached()
            })
        })
        .collect()
}

fn build_followers(
    section: &SectionSpec,
    config: &SequencerConfig,
    resolver: &impl TargetResolver,
    report: &mut InstallReport,
) -> Vec<PointerFollow> {
    let (default_duration, default_easing) = section_defaults(section, config);
    let mut followers = Vec::new();
    for spec in &section.steps {
        let Some(easing) = step_easing(spec, default_easing, report) else {
            continue;
        };
        let lag = spec.duration.unwrap_or(default_duration);
        followers.extend(
            step_targets(section, spec, resolver, report)
                .into_iter()
                .map(|target| PointerFollow::new(target, lag, easing)),
        );
    }
    followers
}

fn build_steps(
    section: &SectionSpec,
    config: &SequencerConfig,
    resolver: &impl TargetResolver,
    report: &mut InstallReport,
) -> Vec<AnimationStep> {
    let (default_duration, default_easing) = section_defaults(section, config);

    let mut cursor = Cursor::default();
    let mut steps = Vec::new();
    for spec in &section.steps {
        let Some(easing) = step_easing(spec, default_easing, report) else {
            continue;
        };

        let targets = step_targets(section, spec, resolver, report);
        let tweens: Vec<Tween> = spec
            .properties
            .iter()
            .map(|(name, tween)| Tween::new(name.clone(), tween.from.clone(), tween.to.clone()))
            .collect();

        let duration = spec.duration.unwrap_or(default_duration);
        let each = spec.stagger.unwrap_or(0.0);
        // 时间轴开头的 "-=" 会算出负数
        let start = sanitize_non_negative(
            "position",
            cursor.place(spec.offset, spec.position) + spec.delay,
        );

        let group = stagger(&targets, &tweens, start, each, duration, easing);
        let end = group.iter().map(AnimationStep::end).fold(start, f32::max);
        cursor.advance(start, end);
        steps.extend(group);
    }
    steps
}

fn resolve_easing(name: &str) -> Option<EasingFunction> {
    match registry::easing_by_name(name) {
        Ok(easing) => Some(easing),
        Err(e) => {
            warn!(error = %e, "缓动函数无法解析，已跳过");
            None
        }
    }
}
