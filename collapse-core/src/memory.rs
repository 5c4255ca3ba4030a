//! Headless element tree implementing [`CollapseDom`].
//!
//! Supports the selector subset controllers rely on: tag, `#id`, `.class`, `[attr]`,
//! `[attr=value]`, `*`, the descendant and `>` combinators, and `,` groups.
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::constants::OPEN_CLASS;
use crate::dom::{CollapseDom, SectionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Default)]
struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: Option<String>,
    hidden: bool,
}

#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<ElementData>,
    events: Vec<(NodeId, SectionEvent)>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Empty document holding a single `body` element.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![ElementData {
                tag: "body".into(),
                ..ElementData::default()
            }],
            events: Vec::new(),
        }
    }

    /// A `div#<id>` container under `body` holding `count` `h3`/`div` pairs.
    ///
    /// Headers read "Section N", bodies "Body N".
    #[must_use]
    pub fn with_pairs(id: &str, count: usize) -> (Self, NodeId) {
        let mut dom = Self::new();
        let container = dom.append(dom.body(), "div");
        dom.set_id(container, id);
        dom.append_pairs(container, count);
        (dom, container)
    }

    /// Append `count` `h3`/`div` pairs to `parent`, returning the headers.
    pub fn append_pairs(&mut self, parent: NodeId, count: usize) -> Vec<NodeId> {
        (0..count)
            .map(|n| {
                let header = self.append(parent, "h3");
                self.set_text(header, format!("Section {n}"));
                let body = self.append(parent, "div");
                self.set_text(body, format!("Body {n}"));
                header
            })
            .collect()
    }

    #[must_use]
    pub const fn body(&self) -> NodeId {
        NodeId(0)
    }

    pub fn append(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ElementData {
            tag: tag.to_ascii_lowercase(),
            parent: Some(parent),
            ..ElementData::default()
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        self.nodes[node.0].attributes.insert("id".into(), id.into());
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        self.nodes[node.0].classes.insert(class.into());
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.nodes[node.0].text = Some(text.into());
    }

    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].text.as_deref()
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attributes.get(name).map(String::as_str)
    }

    /// Whether the default reveal effect currently leaves `node` visible.
    #[must_use]
    pub fn is_visible(&self, node: NodeId) -> bool {
        !self.nodes[node.0].hidden
    }

    #[must_use]
    pub fn is_marked_open(&self, node: NodeId) -> bool {
        self.nodes[node.0].classes.contains(OPEN_CLASS)
    }

    /// Notifications dispatched so far, oldest first.
    #[must_use]
    pub fn events(&self) -> &[(NodeId, SectionEvent)] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<(NodeId, SectionEvent)> {
        std::mem::take(&mut self.events)
    }

    fn ancestors_inclusive(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), |n| self.nodes[n.0].parent)
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.nodes[node.0].children.iter().rev().copied());
        }
        out
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector
            .groups
            .iter()
            .any(|steps| self.matches_steps(node, steps))
    }

    fn matches_steps(&self, node: NodeId, steps: &[Step]) -> bool {
        let Some((last, rest)) = steps.split_last() else {
            return false;
        };
        if !self.matches_compound(node, &last.compound) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }
        let Some(parent) = self.nodes[node.0].parent else {
            return false;
        };
        match last.combinator {
            Combinator::Child => self.matches_steps(parent, rest),
            Combinator::Descendant => self
                .ancestors_inclusive(parent)
                .any(|ancestor| self.matches_steps(ancestor, rest)),
        }
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound) -> bool {
        let data = &self.nodes[node.0];
        compound.tag.as_ref().is_none_or(|tag| *tag == data.tag)
            && compound
                .id
                .as_ref()
                .is_none_or(|id| data.attributes.get("id") == Some(id))
            && compound.classes.iter().all(|c| data.classes.contains(c))
            && compound
                .attributes
                .iter()
                .all(|(name, value)| match value {
                    Some(value) => data.attributes.get(name) == Some(value),
                    None => data.attributes.contains_key(name),
                })
    }

    fn parse_or_log(selector: &str) -> Option<Selector> {
        let parsed = Selector::parse(selector);
        if parsed.is_none() {
            log::debug!("unsupported selector `{selector}`");
        }
        parsed
    }
}

impl CollapseDom for MemoryDom {
    type Node = NodeId;

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes[node.0].children.clone()
    }

    fn select_all(&self, root: &NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Self::parse_or_log(selector) else {
            return Vec::new();
        };
        self.descendants(*root)
            .into_iter()
            .filter(|node| self.matches(*node, &selector))
            .collect()
    }

    fn next_element(&self, node: &NodeId) -> Option<NodeId> {
        let parent = self.nodes[node.0].parent?;
        let siblings = &self.nodes[parent.0].children;
        let position = siblings.iter().position(|n| n == node)?;
        siblings.get(position + 1).copied()
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.ancestors_inclusive(*node).any(|n| n == *ancestor)
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        let selector = Self::parse_or_log(selector)?;
        self.ancestors_inclusive(*node)
            .find(|n| self.matches(*n, &selector))
    }

    fn id(&self, node: &NodeId) -> Option<String> {
        self.attribute(*node, "id")
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    }

    fn has_attribute(&self, node: &NodeId, name: &str) -> bool {
        self.nodes[node.0].attributes.contains_key(name)
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.contains(class)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        self.nodes[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn set_class(&mut self, node: &NodeId, class: &str, enabled: bool) {
        let classes = &mut self.nodes[node.0].classes;
        if enabled {
            classes.insert(class.to_string());
        } else {
            classes.remove(class);
        }
    }

    fn wrap_in_link(&mut self, node: &NodeId) {
        let children = self.nodes[node.0].children.clone();
        if let [only] = children.as_slice()
            && self.nodes[only.0].tag == "a"
        {
            return;
        }
        let text = self.nodes[node.0].text.take();
        self.nodes[node.0].children.clear();
        let link = self.append(*node, "a");
        self.nodes[link.0]
            .attributes
            .insert("href".into(), "#".into());
        self.nodes[link.0].text = text;
        for child in children {
            self.nodes[child.0].parent = Some(link);
            self.nodes[link.0].children.push(child);
        }
    }

    fn show(&mut self, node: &NodeId) {
        self.nodes[node.0].hidden = false;
    }

    fn hide(&mut self, node: &NodeId) {
        self.nodes[node.0].hidden = true;
    }

    fn notify(&mut self, node: &NodeId, event: SectionEvent) {
        self.events.push((*node, event));
    }
}

/// A [`MemoryDom`] several controllers can drive at once, like nested containers on a page.
pub type SharedDom = Rc<RefCell<MemoryDom>>;

impl CollapseDom for SharedDom {
    type Node = NodeId;

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.borrow().children(node)
    }

    fn select_all(&self, root: &NodeId, selector: &str) -> Vec<NodeId> {
        self.borrow().select_all(root, selector)
    }

    fn next_element(&self, node: &NodeId) -> Option<NodeId> {
        self.borrow().next_element(node)
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        self.borrow().contains(ancestor, node)
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Option<NodeId> {
        self.borrow().closest(node, selector)
    }

    fn id(&self, node: &NodeId) -> Option<String> {
        self.borrow().id(node)
    }

    fn has_attribute(&self, node: &NodeId, name: &str) -> bool {
        self.borrow().has_attribute(node, name)
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.borrow().has_class(node, class)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        self.borrow_mut().set_attribute(node, name, value);
    }

    fn set_class(&mut self, node: &NodeId, class: &str, enabled: bool) {
        self.borrow_mut().set_class(node, class, enabled);
    }

    fn wrap_in_link(&mut self, node: &NodeId) {
        self.borrow_mut().wrap_in_link(node);
    }

    fn show(&mut self, node: &NodeId) {
        self.borrow_mut().show(node);
    }

    fn hide(&mut self, node: &NodeId) {
        self.borrow_mut().hide(node);
    }

    fn notify(&mut self, node: &NodeId, event: SectionEvent) {
        self.borrow_mut().notify(node, event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// Relation to the previous step; ignored on the first.
    combinator: Combinator,
    compound: Compound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector {
    groups: Vec<Vec<Step>>,
}

impl Selector {
    fn parse(input: &str) -> Option<Self> {
        let groups = input
            .split(',')
            .map(Self::parse_group)
            .collect::<Option<Vec<_>>>()?;
        Some(Self { groups })
    }

    fn parse_group(input: &str) -> Option<Vec<Step>> {
        let mut steps = Vec::new();
        let mut combinator = Combinator::Descendant;
        let mut chars = input.trim().chars().peekable();
        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
            } else if c == '>' {
                chars.next();
                combinator = Combinator::Child;
            } else {
                let mut raw = String::new();
                let mut in_brackets = false;
                while let Some(&c) = chars.peek() {
                    if !in_brackets && (c.is_whitespace() || c == '>') {
                        break;
                    }
                    match c {
                        '[' => in_brackets = true,
                        ']' => in_brackets = false,
                        _ => {}
                    }
                    raw.push(c);
                    chars.next();
                }
                steps.push(Step {
                    combinator,
                    compound: Self::parse_compound(&raw)?,
                });
                combinator = Combinator::Descendant;
            }
        }
        // A dangling `>` or an empty group is not a selector.
        (!steps.is_empty() && combinator == Combinator::Descendant).then_some(steps)
    }

    fn parse_compound(raw: &str) -> Option<Compound> {
        let mut compound = Compound::default();
        let mut rest = raw;
        while let Some(c) = rest.chars().next() {
            match c {
                '*' => rest = &rest[1..],
                '.' | '#' => {
                    let (ident, tail) = split_ident(&rest[1..]);
                    if ident.is_empty() {
                        return None;
                    }
                    if c == '.' {
                        compound.classes.push(ident.to_string());
                    } else {
                        compound.id = Some(ident.to_string());
                    }
                    rest = tail;
                }
                '[' => {
                    let end = rest.find(']')?;
                    let inner = &rest[1..end];
                    let attribute = match inner.split_once('=') {
                        Some((name, value)) => (
                            name.trim().to_string(),
                            Some(value.trim().trim_matches(['"', '\'']).to_string()),
                        ),
                        None => (inner.trim().to_string(), None),
                    };
                    if attribute.0.is_empty() {
                        return None;
                    }
                    compound.attributes.push(attribute);
                    rest = &rest[end + 1..];
                }
                _ => {
                    let (ident, tail) = split_ident(rest);
                    if ident.is_empty() || compound.tag.is_some() {
                        return None;
                    }
                    compound.tag = Some(ident.to_ascii_lowercase());
                    rest = tail;
                }
            }
        }
        Some(compound)
    }
}

fn split_ident(input: &str) -> (&str, &str) {
    let end = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(input.len());
    input.split_at(end)
}
