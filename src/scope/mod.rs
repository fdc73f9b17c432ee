/*!
 * Scope
 * One layer of ambient, operation-local tags
 *
 * A `Scope` is plain data. Isolation between layers and flows comes from the
 * stack handing out deep copies on every push, not from the scope itself.
 */

pub mod flow;
pub mod guard;
pub mod stack;

pub use flow::{current_scope, current_stack, push_scope, spawn, spawn_thread, FlowContext};
pub use guard::ScopeGuard;
pub use stack::{LayerId, ScopeStack};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered collection of string tags
///
/// Insertion order is kept for rendering; duplicates are permitted.
/// `Clone` is a snapshot: later mutations to either copy stay local to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    tags: Vec<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag
    #[inline]
    pub fn add_tag(&mut self, name: impl Into<String>) {
        self.tags.push(name.into());
    }

    #[inline]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    #[inline]
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t == name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Deterministic, order-preserving rendering of the tags
    ///
    /// Tags are joined with `", "`; an empty scope renders as `""`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tag)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for Scope {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}
