//! Stack trace rendering
//!
//! Turns an [`ErrorChain`] into text lines. Per node the pipeline is:
//!
//! 1. exclusion filtering (hidden runs become "N frames excluded")
//! 2. common frame reduction against the parent's filtered frames
//! 3. depth truncation ("N frames truncated")
//!
//! Exclusion happens first, so a hidden run sitting inside the shared tail is
//! absorbed by the "common frames omitted" marker rather than reported on its
//! own.

use crate::abbreviator::ClassNameShortener;
use crate::chain::{ErrorChain, ErrorNode, NodeId, Relation};
use crate::common_frames::common_frame_count;
use crate::config::RenderConfig;
use crate::exclusion::{FilteredFrames, FrameEntry};
use crate::throwable::StackFrame;
use std::fmt;

pub const LINE_SEPARATOR: &str = "\n";
pub const CAUSED_BY: &str = "Caused by: ";
pub const WRAPPED_BY: &str = "Wrapped by: ";
pub const SUPPRESSED: &str = "Suppressed: ";

const TAB: char = '\t';

/// Synthetic placeholder lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Excluded(usize),
    Truncated(usize),
    CommonOmitted(usize),
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Excluded(n) => write!(f, "{} frames excluded", n),
            Marker::Truncated(n) => write!(f, "{} frames truncated", n),
            Marker::CommonOmitted(n) => write!(f, "{} common frames omitted", n),
        }
    }
}

/// One output line; `marker` is set for placeholder lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: String,
    pub marker: Option<Marker>,
}

impl RenderedLine {
    pub fn is_marker(&self) -> bool {
        self.marker.is_some()
    }
}

/// Renders chains according to a [`RenderConfig`]
pub struct TraceRenderer<'c> {
    config: &'c RenderConfig,
    shortener: ClassNameShortener,
}

impl<'c> TraceRenderer<'c> {
    pub fn new(config: &'c RenderConfig) -> Self {
        Self {
            config,
            shortener: config.shortener(),
        }
    }

    /// Render to a string, every line terminated by [`LINE_SEPARATOR`]
    pub fn render(&self, chain: &ErrorChain<'_>) -> String {
        let lines = self.render_lines(chain);
        let capacity = lines.iter().map(|l| l.text.len() + 1).sum();
        let mut out = String::with_capacity(capacity);
        for line in lines {
            out.push_str(&line.text);
            out.push_str(LINE_SEPARATOR);
        }
        out
    }

    pub fn render_lines(&self, chain: &ErrorChain<'_>) -> Vec<RenderedLine> {
        let exclusions = &self.config.exclusions;
        let filtered: Vec<FilteredFrames<'_>> = chain
            .nodes()
            .iter()
            .map(|node| exclusions.filter(node.frames))
            .collect();

        let order = if self.config.root_cause_first {
            chain.root_cause_first_order()
        } else {
            chain.nested_order()
        };

        let mut lines = Vec::new();
        for id in order {
            let node = chain.node(id);
            // Always child against parent, whatever the print order
            let common = node.parent.map_or(0, |parent| {
                common_frame_count(filtered[id].kept(), filtered[parent].kept())
            });

            lines.push(self.header_line(node, self.prefix(chain, id)));
            self.append_frames(&mut lines, node.indent, &filtered[id], common);
        }
        lines
    }

    fn prefix(&self, chain: &ErrorChain<'_>, id: NodeId) -> &'static str {
        let node = chain.node(id);
        if !self.config.root_cause_first {
            return relation_prefix(node.relation);
        }
        if node.cause.is_some() {
            WRAPPED_BY
        } else {
            // Innermost cause takes the place of its chain's head
            relation_prefix(chain.node(chain.chain_head(id)).relation)
        }
    }

    fn header_line(&self, node: &ErrorNode<'_>, prefix: &str) -> RenderedLine {
        let mut text = tabs(node.indent.saturating_sub(1));
        text.push_str(prefix);
        text.push_str(&self.shortener.shorten(node.class_name));
        if let Some(message) = node.message {
            text.push_str(": ");
            text.push_str(message);
        }
        RenderedLine { text, marker: None }
    }

    fn frame_line(&self, indent: usize, frame: &StackFrame) -> RenderedLine {
        let mut text = tabs(indent);
        text.push_str("at ");
        text.push_str(&self.shortener.shorten(&frame.class_name));
        text.push('.');
        text.push_str(&frame.method);
        text.push('(');
        text.push_str(&frame.location().to_string());
        text.push(')');
        RenderedLine { text, marker: None }
    }

    fn append_frames(
        &self,
        lines: &mut Vec<RenderedLine>,
        indent: usize,
        filtered: &FilteredFrames<'_>,
        common: usize,
    ) {
        let max_depth = self.config.max_depth_per_throwable;
        let visible = filtered.kept().len() - common;
        let mut seen = 0usize;
        let mut emitted = 0usize;
        let mut truncated = 0usize;

        for entry in filtered.entries() {
            match *entry {
                FrameEntry::Frame(frame) => {
                    if seen == visible {
                        // Start of the shared tail
                        break;
                    }
                    seen += 1;
                    if emitted < max_depth {
                        lines.push(self.frame_line(indent, frame));
                        emitted += 1;
                    } else {
                        truncated += 1;
                    }
                }
                FrameEntry::Excluded(count) => {
                    if emitted < max_depth {
                        lines.push(marker_line(indent, Marker::Excluded(count)));
                    } else {
                        truncated += count;
                    }
                }
            }
        }

        if truncated > 0 {
            lines.push(marker_line(indent, Marker::Truncated(truncated)));
        }
        if common > 0 {
            lines.push(marker_line(indent, Marker::CommonOmitted(common)));
        }
    }
}

fn relation_prefix(relation: Relation) -> &'static str {
    match relation {
        Relation::Root => "",
        Relation::CausedBy => CAUSED_BY,
        Relation::Suppressed => SUPPRESSED,
    }
}

fn marker_line(indent: usize, marker: Marker) -> RenderedLine {
    let mut text = tabs(indent);
    text.push_str("... ");
    text.push_str(&marker.to_string());
    RenderedLine {
        text,
        marker: Some(marker),
    }
}

fn tabs(count: usize) -> String {
    std::iter::repeat(TAB).take(count).collect()
}
