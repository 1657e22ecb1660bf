//! Class name shortening
//!
//! `net.logstash.logback.stacktrace.Converter` with a budget of 10 becomes
//! `n.l.l.s.Converter`: package segments collapse to their first character,
//! leftmost first, until the name fits. The simple class name is never
//! touched, so the result may still exceed the budget.

use std::borrow::Cow;

/// Shortens fully qualified class names to a character budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassNameShortener {
    target_length: usize,
}

impl ClassNameShortener {
    /// `0` keeps only the simple class name; `usize::MAX` never shortens
    pub fn new(target_length: usize) -> Self {
        Self { target_length }
    }

    pub fn target_length(&self) -> usize {
        self.target_length
    }

    pub fn shorten<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.target_length == 0 {
            return Cow::Borrowed(simple_name(name));
        }

        let length = name.chars().count();
        if length <= self.target_length {
            return Cow::Borrowed(name);
        }

        let Some((package, simple)) = name.rsplit_once('.') else {
            return Cow::Borrowed(name);
        };

        let mut excess = length - self.target_length;
        let mut out = String::with_capacity(name.len());
        for segment in package.split('.') {
            let segment_length = segment.chars().count();
            match segment.chars().next() {
                Some(first) if excess > 0 && segment_length > 1 => {
                    out.push(first);
                    excess = excess.saturating_sub(segment_length - 1);
                }
                _ => out.push_str(segment),
            }
            out.push('.');
        }
        out.push_str(simple);
        Cow::Owned(out)
    }
}

/// Segment after the last `.`
pub fn simple_name(name: &str) -> &str {
    name.rsplit_once('.').map_or(name, |(_, simple)| simple)
}
