//! Blame labels.
//!
//! A `Label` names one party of a contract (the producer `p` or the
//! consumer `q`) together with the position inside the type that is
//! currently being checked. Guards never mutate a label: every navigation
//! method returns a new label with one more [`PathStep`], so the label
//! that reaches a failing check spells out the whole route from the
//! top-level value to the violated position.
//!
//! The rendered form produced by [`Label::msg`] is the exact text of a
//! contract violation, e.g. `{- lib.dom(1).rng} expected Num, got "a"`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::config;
use crate::key::Key;

/// Counter for auto-generated label ids.
static NEXT_LABEL: AtomicU64 = AtomicU64::new(0);

/// Blame polarity. Flipped by every domain step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn flip(self) -> Polarity {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Polarity::Positive => write!(f, "+"),
            Polarity::Negative => write!(f, "-"),
        }
    }
}

/// One step of a blame path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PathStep {
    /// Into the arguments of a function. `None` addresses the argument
    /// list as a whole (arity), `Some(i)` the i-th argument.
    Domain(Option<usize>),
    /// Into the result of a function or constructor.
    Range,
    /// A checked read of a property or element.
    Get(Key),
    /// A checked write of a property or element.
    Set(Key),
    /// A write of an array's length.
    Length,
    /// The branch selection of a union.
    UnionBranch,
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Domain(None) => write!(f, ".dom"),
            PathStep::Domain(Some(i)) => write!(f, ".dom({})", i),
            PathStep::Range => write!(f, ".rng"),
            PathStep::Get(k) => write!(f, ".get({})", k),
            PathStep::Set(k) => write!(f, ".set({})", k),
            PathStep::Length => write!(f, ".length"),
            PathStep::UnionBranch => write!(f, ".union"),
        }
    }
}

/// An immutable blame label.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Label {
    id: String,
    polarity: Polarity,
    path: Vec<PathStep>,
}

impl Label {
    /// Create a positive label with an empty path.
    ///
    /// When `id` is `None` a process-unique id is generated from the
    /// configured label prefix.
    pub fn new(id: Option<&str>) -> Self {
        let id = match id {
            Some(id) => id.to_string(),
            None => {
                let n = NEXT_LABEL.fetch_add(1, Ordering::Relaxed);
                format!("{}{}", config::current().label_prefix, n)
            }
        };
        Label {
            id,
            polarity: Polarity::Positive,
            path: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn path(&self) -> &[PathStep] {
        &self.path
    }

    fn step(&self, step: PathStep, polarity: Polarity) -> Label {
        let mut path = self.path.clone();
        path.push(step);
        Label {
            id: self.id.clone(),
            polarity,
            path,
        }
    }

    /// The argument list as a whole. Contravariant.
    pub fn dom(&self) -> Label {
        self.step(PathStep::Domain(None), self.polarity.flip())
    }

    /// The argument at `index`. Contravariant.
    pub fn dom_at(&self, index: usize) -> Label {
        self.step(PathStep::Domain(Some(index)), self.polarity.flip())
    }

    pub fn rng(&self) -> Label {
        self.step(PathStep::Range, self.polarity)
    }

    pub fn get(&self, key: impl Into<Key>) -> Label {
        self.step(PathStep::Get(key.into()), self.polarity)
    }

    pub fn set(&self, key: impl Into<Key>) -> Label {
        self.step(PathStep::Set(key.into()), self.polarity)
    }

    pub fn length(&self) -> Label {
        self.step(PathStep::Length, self.polarity)
    }

    /// Union branch selection.
    pub fn l(&self) -> Label {
        self.step(PathStep::UnionBranch, self.polarity)
    }

    /// Same position, opposite polarity.
    pub fn negated(&self) -> Label {
        Label {
            id: self.id.clone(),
            polarity: self.polarity.flip(),
            path: self.path.clone(),
        }
    }

    /// Render the blame message for this position.
    pub fn msg(&self, note: Option<&str>) -> String {
        match note {
            Some(note) => format!("{} {}", self, note),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} {}", self.polarity, self.id)?;
        for step in &self.path {
            write!(f, "{}", step)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msg_renders_polarity_id_and_path() {
        let p = Label::new(Some("f"));
        assert_eq!(p.msg(None), "{+ f}");
        assert_eq!(p.rng().msg(Some("boom")), "{+ f.rng} boom");
        assert_eq!(
            p.dom_at(1).rng().get(0).msg(Some("x")),
            "{- f.dom(1).rng.get(0)} x"
        );
        assert_eq!(p.dom().msg(None), "{- f.dom}");
        assert_eq!(p.set("name").length().l().msg(None), "{+ f.set(name).length.union}");
    }

    #[test]
    fn only_domain_flips_polarity() {
        let p = Label::new(Some("f"));
        assert_eq!(p.dom().polarity(), Polarity::Negative);
        assert_eq!(p.dom_at(0).dom_at(0).polarity(), Polarity::Positive);
        assert_eq!(p.rng().get(1).set(2).length().l().polarity(), Polarity::Positive);
    }

    #[test]
    fn negated_keeps_path() {
        let p = Label::new(Some("f")).rng();
        let n = p.negated();
        assert_eq!(n.polarity(), Polarity::Negative);
        assert_eq!(n.path(), p.path());
        assert_eq!(n.negated(), p);
    }

    #[test]
    fn navigation_leaves_original_untouched() {
        let p = Label::new(Some("f"));
        let _ = p.dom_at(0).rng();
        assert!(p.path().is_empty());
        assert_eq!(p.polarity(), Polarity::Positive);
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = Label::new(None);
        let b = Label::new(None);
        assert_ne!(a.id(), b.id());
        assert!(a.id().starts_with(&config::current().label_prefix));
    }
}
