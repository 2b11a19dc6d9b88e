//! # Target 模块
//!
//! 展示目标抽象。
//!
//! ## 设计说明
//!
//! 序列器不假设任何渲染树 API，只要求目标具备两种能力：
//! - 读取布局矩形（触发器计算阈值用）
//! - 写入样式属性（时间轴输出用）
//!
//! 目标由创建它的视图独占持有（`Rc`），时间轴与触发器只持有 [`TargetHandle`]
//! （内部是 `Weak`）。视图丢弃元素后，句柄自然失效，相关步骤被跳过。

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use serde::Serialize;

use crate::geometry::Rect;
use crate::value::PropertyValue;

/// 展示目标接口
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct DomElement { node: web_sys::HtmlElement }
///
/// impl PresentationTarget for DomElement {
///     fn bounding_box(&self) -> Option<Rect> { /* getBoundingClientRect + scroll */ }
///     fn write_property(&self, name: &str, value: &PropertyValue) -> bool {
///         self.node.style().set_property(name, &value.to_string()).is_ok()
///     }
/// }
/// ```
pub trait PresentationTarget: 'static {
    /// 文档坐标下的布局矩形，未参与布局时返回 `None`
    fn bounding_box(&self) -> Option<Rect>;

    /// 写入样式属性
    ///
    /// # 返回
    /// - `true`: 写入成功
    /// - `false`: 目标不支持该属性
    fn write_property(&self, name: &str, value: &PropertyValue) -> bool;

    /// 是否仍挂载在文档中
    fn is_attached(&self) -> bool {
        true
    }

    /// 调试用描述
    fn label(&self) -> String {
        "<target>".to_string()
    }
}

/// 目标在一次播放中的唯一键（用于把同一目标的多个步骤归并到一起）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey(usize);

/// 不透明的目标句柄
#[derive(Clone)]
pub struct TargetHandle {
    inner: Weak<dyn PresentationTarget>,
}

impl TargetHandle {
    /// 从视图持有的目标创建句柄
    pub fn new<T: PresentationTarget>(target: &Rc<T>) -> Self {
        let rc: Rc<dyn PresentationTarget> = target.clone();
        Self {
            inner: Rc::downgrade(&rc),
        }
    }

    /// 一个永远无效的句柄（相当于 `ref.current == null`）
    pub fn detached() -> Self {
        let weak: Weak<StyleNode> = Weak::new();
        Self { inner: weak }
    }

    /// 获取可用的目标
    ///
    /// 目标已被释放或已从文档中移除时返回 `None`。
    pub fn resolve(&self) -> Option<Rc<dyn PresentationTarget>> {
        self.inner.upgrade().filter(|target| target.is_attached())
    }

    /// 目标是否仍可用
    pub fn is_live(&self) -> bool {
        self.resolve().is_some()
    }

    pub fn key(&self) -> TargetKey {
        TargetKey(Weak::as_ptr(&self.inner) as *const () as usize)
    }

    /// 调试用描述
    pub fn describe(&self) -> String {
        match self.inner.upgrade() {
            Some(target) => target.label(),
            None => "<released>".to_string(),
        }
    }
}

impl fmt::Debug for TargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TargetHandle").field(&self.describe()).finish()
    }
}

/// 一次属性写入记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WriteRecord {
    pub element: String,
    pub property: String,
    pub value: PropertyValue,
}

type Journal = Rc<RefCell<Vec<WriteRecord>>>;

#[derive(Debug)]
struct StyleNodeData {
    id: String,
    bounds: Rect,
    attached: bool,
    styles: BTreeMap<String, PropertyValue>,
    writes: usize,
}

/// 内存中的元素节点
///
/// 无界面宿主与测试使用的 [`PresentationTarget`] 实现。
/// 使用 `RefCell` 实现内部可变性，允许多个步骤同时写入不同属性。
#[derive(Debug)]
pub struct StyleNode {
    data: RefCell<StyleNodeData>,
    journal: Option<Journal>,
}

impl StyleNode {
    pub fn new(id: impl Into<String>, bounds: Rect) -> Self {
        Self {
            data: RefCell::new(StyleNodeData {
                id: id.into(),
                bounds,
                attached: true,
                styles: BTreeMap::new(),
                writes: 0,
            }),
            journal: None,
        }
    }

    fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn id(&self) -> String {
        self.data.borrow().id.clone()
    }

    /// 读取当前样式
    pub fn style(&self, name: &str) -> Option<PropertyValue> {
        self.data.borrow().styles.get(name).cloned()
    }

    /// 读取当前样式的数值部分
    pub fn style_f32(&self, name: &str) -> Option<f32> {
        self.style(name).and_then(|v| v.as_f32())
    }

    pub fn write_count(&self) -> usize {
        self.data.borrow().writes
    }

    /// 更新布局矩形（内容插入、图片加载后）
    pub fn set_bounds(&self, bounds: Rect) {
        self.data.borrow_mut().bounds = bounds;
    }

    /// 从文档中移除（句柄随即失效）
    pub fn detach(&self) {
        self.data.borrow_mut().attached = false;
    }
}

impl PresentationTarget for StyleNode {
    fn bounding_box(&self) -> Option<Rect> {
        let data = self.data.borrow();
        data.attached.then_some(data.bounds)
    }

    fn write_property(&self, name: &str, value: &PropertyValue) -> bool {
        let mut data = self.data.borrow_mut();
        if !data.attached {
            return false;
        }
        data.styles.insert(name.to_string(), value.clone());
        data.writes += 1;
        if let Some(journal) = &self.journal {
            journal.borrow_mut().push(WriteRecord {
                element: data.id.clone(),
                property: name.to_string(),
                value: value.clone(),
            });
        }
        true
    }

    fn is_attached(&self) -> bool {
        self.data.borrow().attached
    }

    fn label(&self) -> String {
        format!("#{}", self.data.borrow().id)
    }
}

/// 内存元素树
///
/// 按 ID 持有元素（相当于视图的 ref 集合），并记录所有属性写入。
#[derive(Debug, Default)]
pub struct ElementTree {
    nodes: HashMap<String, Rc<StyleNode>>,
    journal: Journal,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入元素，同 ID 的旧元素被替换（旧句柄随之失效）
    pub fn insert(&mut self, id: impl Into<String>, bounds: Rect) -> Rc<StyleNode> {
        let id = id.into();
        let node = Rc::new(StyleNode::new(id.clone(), bounds).with_journal(self.journal.clone()));
        self.nodes.insert(id, node.clone());
        node
    }

    /// 从树中移除元素
    pub fn remove(&mut self, id: &str) -> Option<Rc<StyleNode>> {
        self.nodes.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Rc<StyleNode>> {
        self.nodes.get(id)
    }

    /// 获取元素句柄
    pub fn handle(&self, id: &str) -> Option<TargetHandle> {
        self.nodes.get(id).map(TargetHandle::new)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 取出并清空写入记录
    pub fn drain_writes(&self) -> Vec<WriteRecord> {
        std::mem::take(&mut *self.journal.borrow_mut())
    }

    /// 所有元素的累计写入次数
    pub fn total_writes(&self) -> usize {
        self.nodes.values().map(|n| n.write_count()).sum()
    }
}
