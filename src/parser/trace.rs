//! # Parse Tracing
//!
//! A [`ParserTrace`] observes labelled parsers as they run. The observer is
//! picked once when the [`ParseState`](super::ParseState) is created:
//!
//! - [`DisabledTrace`] ignores everything and is the default,
//! - [`TreeTrace`] records a call tree of [`TraceNode`]s,
//! - [`LogTrace`] forwards every event to the `log` facade at trace level.
//!
//! Combinators call the observer unconditionally, so a disabled trace costs a
//! no-op virtual call and nothing else.

use std::fmt;

use log::trace;

/// One labelled parser invocation and the invocations nested inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceNode {
    pub name: String,
    pub result: Option<String>,
    pub children: Vec<TraceNode>,
}

impl TraceNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Finds the first node named `name` in this subtree, depth first.
    pub fn find(&self, name: &str) -> Option<&TraceNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

pub trait ParserTrace {
    fn push(&mut self, name: &str);
    fn pop(&mut self);
    fn set_current_result(&mut self, result: &dyn fmt::Debug);
    fn current_node(&self) -> Option<&TraceNode>;
    fn parent_node(&self) -> Option<&TraceNode>;
    /// Consumes the observer, yielding the top-level nodes it recorded.
    fn finish(self: Box<Self>) -> Vec<TraceNode>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledTrace;

impl ParserTrace for DisabledTrace {
    fn push(&mut self, _name: &str) {}

    fn pop(&mut self) {}

    fn set_current_result(&mut self, _result: &dyn fmt::Debug) {}

    fn current_node(&self) -> Option<&TraceNode> {
        None
    }

    fn parent_node(&self) -> Option<&TraceNode> {
        None
    }

    fn finish(self: Box<Self>) -> Vec<TraceNode> {
        Vec::new()
    }
}

#[derive(Debug, Default)]
pub struct TreeTrace {
    stack: Vec<TraceNode>,
    roots: Vec<TraceNode>,
}

impl TreeTrace {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParserTrace for TreeTrace {
    fn push(&mut self, name: &str) {
        self.stack.push(TraceNode::new(name));
    }

    fn pop(&mut self) {
        if let Some(node) = self.stack.pop() {
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => self.roots.push(node),
            }
        }
    }

    fn set_current_result(&mut self, result: &dyn fmt::Debug) {
        if let Some(node) = self.stack.last_mut() {
            node.result = Some(format!("{result:?}"));
        }
    }

    fn current_node(&self) -> Option<&TraceNode> {
        self.stack.last()
    }

    fn parent_node(&self) -> Option<&TraceNode> {
        self.stack
            .len()
            .checked_sub(2)
            .and_then(|index| self.stack.get(index))
    }

    fn finish(mut self: Box<Self>) -> Vec<TraceNode> {
        // unwind whatever a failed parse left open
        while !self.stack.is_empty() {
            self.pop();
        }
        self.roots
    }
}

#[derive(Debug, Default)]
pub struct LogTrace {
    names: Vec<String>,
}

impl LogTrace {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ParserTrace for LogTrace {
    fn push(&mut self, name: &str) {
        trace!("{:indent$}> {name}", "", indent = self.names.len() * 2);
        self.names.push(name.to_string());
    }

    fn pop(&mut self) {
        if let Some(name) = self.names.pop() {
            trace!("{:indent$}< {name}", "", indent = self.names.len() * 2);
        }
    }

    fn set_current_result(&mut self, result: &dyn fmt::Debug) {
        trace!("{:indent$}= {result:?}", "", indent = self.names.len() * 2);
    }

    fn current_node(&self) -> Option<&TraceNode> {
        None
    }

    fn parent_node(&self) -> Option<&TraceNode> {
        None
    }

    fn finish(self: Box<Self>) -> Vec<TraceNode> {
        Vec::new()
    }
}
