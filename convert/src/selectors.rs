//! XPath selector layer.
//!
//! Supports the location-path subset needed to address configuration
//! documents:
//!
//! - absolute (`/Cli/Commands`), descendant (`//Argument`, `Cli//Argument`)
//!   and relative (`Arguments/ArgumentRef`, `./Arguments`) paths;
//! - `.`, `..` and `*` steps;
//! - predicates `[@attr]`, `[@attr='value']`, `[Child='value']` and `[n]`
//!   (1-based position among the candidates of one context node).
//!
//! Functions, axes other than the abbreviated ones, unions and attribute
//! selection are rejected with [`SelectorError::Unsupported`].
//!
//! # Examples
//!
//! ```
//! use dyncli_convert::XmlDocument;
//!
//! let doc = XmlDocument::parse(
//!     r#"<Cli><Commands><Command name="get"/><Command name="put"/></Commands></Cli>"#,
//! ).unwrap();
//! let selectors = doc.selectors();
//!
//! let all = selectors.select("/Cli/Commands/Command", None).unwrap();
//! assert_eq!(all.len(), 2);
//!
//! let put = selectors.select_single("//Command[@name='put']", None).unwrap().unwrap();
//! assert_eq!(put.attributes.get("name").map(String::as_str), Some("put"));
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use xmltree::Element;

use crate::document::{XmlDocument, child_elements};
use crate::error::SelectorError;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][\w.\-:]*$").expect("static regex must compile"));
static POSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*$").expect("static regex must compile"));
static HAS_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*@([A-Za-z_][\w.\-:]*)\s*$").expect("static regex must compile")
});
static ATTR_EQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*@([A-Za-z_][\w.\-:]*)\s*=\s*(?:'([^']*)'|"([^"]*)")\s*$"#)
        .expect("static regex must compile")
});
static CHILD_EQ_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*([A-Za-z_][\w.\-:]*)\s*=\s*(?:'([^']*)'|"([^"]*)")\s*$"#)
        .expect("static regex must compile")
});

/// A node visited while evaluating a path.
#[derive(Debug, Clone, Copy)]
enum Node<'d> {
    /// The document node, parent of the document element.
    Document,
    Element(&'d Element),
}

impl<'d> Node<'d> {
    fn same(&self, other: &Node<'d>) -> bool {
        match (self, other) {
            (Node::Document, Node::Document) => true,
            (Node::Element(a), Node::Element(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Axis {
    Child,
    SelfNode,
    Parent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeTest {
    Name(String),
    Any,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Position(usize),
    HasAttribute(String),
    AttributeEquals(String, String),
    ChildEquals(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    /// Preceded by `//`.
    descendant: bool,
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LocationPath {
    absolute: bool,
    steps: Vec<Step>,
}

/// XPath selector functions bound to one [`XmlDocument`].
#[derive(Debug, Clone, Copy)]
pub struct Selectors<'d> {
    document: &'d XmlDocument,
}

impl<'d> Selectors<'d> {
    pub fn new(document: &'d XmlDocument) -> Self {
        Self { document }
    }

    /// Selects every element matching `expression`.
    ///
    /// Relative expressions are evaluated against `context`, or the document
    /// element when no context is given. The result may be empty.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] if the expression cannot be parsed.
    pub fn select(
        &self,
        expression: &str,
        context: Option<&'d Element>,
    ) -> Result<Vec<&'d Element>, SelectorError> {
        let path = parse_path(expression)?;
        let start = if path.absolute {
            Node::Document
        } else {
            Node::Element(context.unwrap_or(self.document.root()))
        };

        let mut current = vec![start];
        for step in &path.steps {
            current = self.apply_step(&current, step);
        }

        let mut selected: Vec<&'d Element> = current
            .into_iter()
            .filter_map(|node| match node {
                Node::Element(element) => Some(element),
                Node::Document => None,
            })
            .collect();
        self.sort_in_document_order(&mut selected);
        debug!(expression, count = selected.len(), "Evaluated XPath");
        Ok(selected)
    }

    /// Selects the first element matching `expression`, in document order.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] if the expression cannot be parsed.
    pub fn select_single(
        &self,
        expression: &str,
        context: Option<&'d Element>,
    ) -> Result<Option<&'d Element>, SelectorError> {
        Ok(self.select(expression, context)?.into_iter().next())
    }

    /// Finds the child `element_name` of `parent` whose `attribute` equals `id`.
    ///
    /// Returns `None` rather than failing when no such child exists. If
    /// several children match, the first one wins.
    pub fn select_by_id(
        &self,
        element_name: &str,
        id: &str,
        attribute: &str,
        parent: &'d Element,
    ) -> Option<&'d Element> {
        select_by_id(element_name, id, attribute, parent)
    }

    fn apply_step(&self, current: &[Node<'d>], step: &Step) -> Vec<Node<'d>> {
        let mut selected: Vec<Node<'d>> = Vec::new();

        for node in current {
            let contexts = if step.descendant {
                self.descendants_or_self(*node)
            } else {
                vec![*node]
            };

            for context in contexts {
                let candidates: Vec<Node<'d>> = match step.axis {
                    Axis::Child => self
                        .children(context)
                        .into_iter()
                        .filter(|child| matches_test(child, &step.test))
                        .map(Node::Element)
                        .collect(),
                    Axis::SelfNode => vec![context],
                    Axis::Parent => self.parent(context).into_iter().collect(),
                };

                for candidate in apply_predicates(candidates, &step.predicates) {
                    if !selected.iter().any(|seen| seen.same(&candidate)) {
                        selected.push(candidate);
                    }
                }
            }
        }

        selected
    }

    fn children(&self, node: Node<'d>) -> Vec<&'d Element> {
        match node {
            Node::Document => vec![self.document.root()],
            Node::Element(element) => child_elements(element).collect(),
        }
    }

    /// `node` and everything below it, in document order.
    fn descendants_or_self(&self, node: Node<'d>) -> Vec<Node<'d>> {
        let mut nodes = Vec::new();
        let mut pending = vec![node];
        while let Some(next) = pending.pop() {
            nodes.push(next);
            pending.extend(self.children(next).into_iter().rev().map(Node::Element));
        }
        nodes
    }

    fn sort_in_document_order(&self, elements: &mut [&'d Element]) {
        if elements.len() < 2 {
            return;
        }
        let positions: HashMap<*const Element, usize> = self
            .descendants_or_self(Node::Document)
            .into_iter()
            .filter_map(|node| match node {
                Node::Element(element) => Some(element as *const Element),
                Node::Document => None,
            })
            .enumerate()
            .map(|(position, element)| (element, position))
            .collect();
        elements.sort_by_key(|element| positions.get(&(*element as *const Element)).copied());
    }

    fn parent(&self, node: Node<'d>) -> Option<Node<'d>> {
        let target = match node {
            Node::Document => return None,
            Node::Element(element) => element,
        };
        let root = self.document.root();
        if std::ptr::eq(root, target) {
            return Some(Node::Document);
        }

        let mut pending = vec![root];
        while let Some(candidate) = pending.pop() {
            for child in child_elements(candidate) {
                if std::ptr::eq(child, target) {
                    return Some(Node::Element(candidate));
                }
                pending.push(child);
            }
        }
        None
    }
}

/// Finds the child `element_name` of `parent` whose `attribute` equals `id`.
pub fn select_by_id<'d>(
    element_name: &str,
    id: &str,
    attribute: &str,
    parent: &'d Element,
) -> Option<&'d Element> {
    child_elements(parent).find(|child| {
        child.name == element_name
            && child.attributes.get(attribute).map(String::as_str) == Some(id)
    })
}

fn matches_test(element: &Element, test: &NodeTest) -> bool {
    match test {
        NodeTest::Any => true,
        NodeTest::Name(name) => element.name == *name,
    }
}

fn apply_predicates<'d>(mut nodes: Vec<Node<'d>>, predicates: &[Predicate]) -> Vec<Node<'d>> {
    for predicate in predicates {
        nodes = match predicate {
            Predicate::Position(position) => nodes
                .get(position - 1)
                .copied()
                .into_iter()
                .collect(),
            other => nodes
                .into_iter()
                .filter(|node| match node {
                    Node::Element(element) => matches_predicate(element, other),
                    Node::Document => false,
                })
                .collect(),
        };
    }
    nodes
}

fn matches_predicate(element: &Element, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Position(_) => true,
        Predicate::HasAttribute(name) => element.attributes.contains_key(name),
        Predicate::AttributeEquals(name, value) => {
            element.attributes.get(name).map(String::as_str) == Some(value.as_str())
        }
        Predicate::ChildEquals(name, value) => child_elements(element)
            .filter(|child| child.name == *name)
            .any(|child| {
                child
                    .get_text()
                    .is_some_and(|text| text.trim() == value.as_str())
            }),
    }
}

fn parse_path(expression: &str) -> Result<LocationPath, SelectorError> {
    let invalid = |reason: &str| SelectorError::InvalidExpression {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(invalid("expression is empty"));
    }
    if trimmed == "/" {
        return Ok(LocationPath {
            absolute: true,
            steps: vec![Step {
                descendant: false,
                axis: Axis::Child,
                test: NodeTest::Any,
                predicates: Vec::new(),
            }],
        });
    }

    let absolute = trimmed.starts_with('/');
    let mut steps = Vec::new();
    for (descendant, segment) in split_segments(trimmed).map_err(|reason| invalid(&reason))? {
        steps.push(parse_step(expression, descendant, segment)?);
    }

    Ok(LocationPath { absolute, steps })
}

/// Splits a path on `/` and `//`, ignoring separators inside predicates and
/// string literals.
fn split_segments(path: &str) -> Result<Vec<(bool, &str)>, String> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    let mut descendant = false;
    let mut chars = path.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        match (quote, ch) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unbalanced ']'".to_string())?;
            }
            (None, '/') if depth == 0 => {
                if index > start {
                    segments.push((descendant, &path[start..index]));
                } else if index > 0 {
                    return Err("empty step".to_string());
                }
                descendant = false;
                if let Some((_, '/')) = chars.peek() {
                    chars.next();
                    descendant = true;
                    start = index + 2;
                } else {
                    start = index + 1;
                }
            }
            _ => {}
        }
    }

    if quote.is_some() {
        return Err("unterminated string literal".to_string());
    }
    if depth != 0 {
        return Err("unbalanced '['".to_string());
    }
    if start >= path.len() {
        return Err("path ends with a separator".to_string());
    }
    segments.push((descendant, &path[start..]));
    Ok(segments)
}

fn parse_step(expression: &str, descendant: bool, segment: &str) -> Result<Step, SelectorError> {
    let unsupported = |construct: &str| SelectorError::Unsupported {
        expression: expression.to_string(),
        construct: construct.to_string(),
    };
    let invalid = |reason: String| SelectorError::InvalidExpression {
        expression: expression.to_string(),
        reason,
    };

    let segment = segment.trim();
    let (head, mut rest) = match segment.find('[') {
        Some(index) => (segment[..index].trim(), &segment[index..]),
        None => (segment, ""),
    };

    let (axis, test) = match head {
        "." => (Axis::SelfNode, NodeTest::Any),
        ".." => (Axis::Parent, NodeTest::Any),
        "*" => (Axis::Child, NodeTest::Any),
        name if NAME_RE.is_match(name) && !name.contains("::") => {
            (Axis::Child, NodeTest::Name(name.to_string()))
        }
        other if other.contains("::") || other.contains('(') || other.starts_with('@') => {
            return Err(unsupported(other));
        }
        other => return Err(invalid(format!("invalid step '{other}'"))),
    };

    let mut predicates = Vec::new();
    while !rest.is_empty() {
        let close = closing_bracket(rest).ok_or_else(|| invalid("unbalanced '['".to_string()))?;
        let body = &rest[1..close];
        predicates.push(parse_predicate(body).ok_or_else(|| unsupported(body))?);
        rest = rest[close + 1..].trim_start();
        if !rest.is_empty() && !rest.starts_with('[') {
            return Err(invalid(format!("unexpected '{rest}' after predicate")));
        }
    }

    if !predicates.is_empty() && axis != Axis::Child {
        return Err(unsupported(segment));
    }

    Ok(Step {
        descendant,
        axis,
        test,
        predicates,
    })
}

fn closing_bracket(text: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (index, ch) in text.char_indices().skip(1) {
        match (quote, ch) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, ']') => return Some(index),
            _ => {}
        }
    }
    None
}

fn parse_predicate(body: &str) -> Option<Predicate> {
    if let Some(caps) = POSITION_RE.captures(body) {
        let position: usize = caps[1].parse().ok()?;
        return (position > 0).then_some(Predicate::Position(position));
    }
    if let Some(caps) = HAS_ATTR_RE.captures(body) {
        return Some(Predicate::HasAttribute(caps[1].to_string()));
    }
    let literal = |caps: &regex::Captures<'_>| {
        caps.get(2)
            .or_else(|| caps.get(3))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };
    if let Some(caps) = ATTR_EQ_RE.captures(body) {
        return Some(Predicate::AttributeEquals(caps[1].to_string(), literal(&caps)));
    }
    if let Some(caps) = CHILD_EQ_RE.captures(body) {
        return Some(Predicate::ChildEquals(caps[1].to_string(), literal(&caps)));
    }
    None
}
