//! Error chain walking
//!
//! Flattens an error graph (cause links plus suppressed lists) into an
//! acyclic arena of [`ErrorNode`]s. The graph may be cyclic in degenerate
//! inputs; an identity that was already visited is simply not descended into
//! again.
//!
//! The walk uses an explicit work stack, so arbitrarily long cause chains do
//! not grow the call stack.

use crate::throwable::{identity, StackFrame, Throwable};
use std::collections::HashSet;

/// Index of a node inside its [`ErrorChain`]
pub type NodeId = usize;

/// How a node hangs off its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Root,
    CausedBy,
    Suppressed,
}

/// One error instance in the chain
#[derive(Debug, Clone)]
pub struct ErrorNode<'a> {
    pub class_name: &'a str,
    pub message: Option<&'a str>,
    pub frames: &'a [StackFrame],
    pub relation: Relation,
    pub parent: Option<NodeId>,
    pub cause: Option<NodeId>,
    pub suppressed: Vec<NodeId>,
    /// Nesting level: 1 for the root, +1 per suppressed hop
    pub indent: usize,
}

/// Arena of nodes, root at index 0, in depth-first presentation order
#[derive(Debug)]
pub struct ErrorChain<'a> {
    nodes: Vec<ErrorNode<'a>>,
}

struct Pending<'a> {
    throwable: &'a dyn Throwable,
    parent: Option<NodeId>,
    relation: Relation,
    indent: usize,
}

impl<'a> ErrorChain<'a> {
    /// Walk `root` and everything reachable from it
    pub fn walk(root: &'a dyn Throwable) -> Self {
        let mut nodes: Vec<ErrorNode<'a>> = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![Pending {
            throwable: root,
            parent: None,
            relation: Relation::Root,
            indent: 1,
        }];

        while let Some(pending) = stack.pop() {
            let throwable = pending.throwable;
            // Address plus type name: an inline field at offset 0 is not its owner
            if !visited.insert((identity(throwable), throwable.class_name())) {
                continue;
            }

            let id = nodes.len();
            nodes.push(ErrorNode {
                class_name: throwable.class_name(),
                message: throwable.message(),
                frames: throwable.stack_trace(),
                relation: pending.relation,
                parent: pending.parent,
                cause: None,
                suppressed: Vec::new(),
                indent: pending.indent,
            });

            // Popped in reverse: suppressed errors first, then the cause
            if let Some(cause) = throwable.cause() {
                stack.push(Pending {
                    throwable: cause,
                    parent: Some(id),
                    relation: Relation::CausedBy,
                    indent: pending.indent,
                });
            }
            for suppressed in throwable.suppressed().into_iter().rev() {
                stack.push(Pending {
                    throwable: suppressed,
                    parent: Some(id),
                    relation: Relation::Suppressed,
                    indent: pending.indent + 1,
                });
            }
        }

        // Child links are filled in once every node exists
        for id in 0..nodes.len() {
            let Some(parent) = nodes[id].parent else {
                continue;
            };
            match nodes[id].relation {
                Relation::CausedBy => nodes[parent].cause = Some(id),
                Relation::Suppressed => nodes[parent].suppressed.push(id),
                Relation::Root => {}
            }
        }

        Self { nodes }
    }

    pub fn root(&self) -> &ErrorNode<'a> {
        &self.nodes[0]
    }

    pub fn node(&self, id: NodeId) -> &ErrorNode<'a> {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> &[ErrorNode<'a>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Standard nested order: node, its suppressed subtrees, then its cause
    ///
    /// This is the arena order.
    pub fn nested_order(&self) -> Vec<NodeId> {
        (0..self.nodes.len()).collect()
    }

    /// Root-cause-first order
    ///
    /// Each cause chain is printed innermost first; every node is followed
    /// by its own suppressed subtrees, themselves in root-cause-first order.
    pub fn root_cause_first_order(&self) -> Vec<NodeId> {
        enum Task {
            Chain(NodeId),
            Emit(NodeId),
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        if self.nodes.is_empty() {
            return order;
        }

        let mut tasks = vec![Task::Chain(0)];
        while let Some(task) = tasks.pop() {
            match task {
                Task::Emit(id) => order.push(id),
                Task::Chain(head) => {
                    let mut links = vec![head];
                    let mut current = head;
                    while let Some(cause) = self.nodes[current].cause {
                        links.push(cause);
                        current = cause;
                    }

                    // Pushed so that the innermost cause pops first
                    for &id in &links {
                        for &suppressed in self.nodes[id].suppressed.iter().rev() {
                            tasks.push(Task::Chain(suppressed));
                        }
                        tasks.push(Task::Emit(id));
                    }
                }
            }
        }
        order
    }

    /// First node of the cause chain `id` belongs to
    pub fn chain_head(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while self.nodes[current].relation == Relation::CausedBy {
            match self.nodes[current].parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }
}
