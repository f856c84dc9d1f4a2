//! Parameter and argument shape descriptors
//!
//! A method definition carries a descriptor of its parameters; a compiled call
//! site carries a descriptor of the arguments it pushes. Both are ordered
//! `(kind, name)` lists and share one representation.
//!
//! ```text
//! def f(a, b = 1, *rest)      params: [Normal a][Optioned b][Splat rest]
//! f(y: 100, 10)               args:   [OptionalKeyword y][Normal ""]
//! ```
//!
//! Descriptors are validated once at construction: at most one `Splat`
//! entry, and only in the last position. They are immutable afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Kind of a parameter or argument entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    /// Required positional (`x`)
    Normal,
    /// Positional with a default value (`x = 1`)
    Optioned,
    /// Keyword without a default (`x:`)
    RequiredKeyword,
    /// Keyword with a default (`x: 1`)
    OptionalKeyword,
    /// Variadic collector (`*xs`), or a spread at the call site
    Splat,
}

impl ParamKind {
    /// Normal or Optioned
    pub fn is_positional(self) -> bool {
        matches!(self, ParamKind::Normal | ParamKind::Optioned)
    }

    /// RequiredKeyword or OptionalKeyword
    pub fn is_keyword(self) -> bool {
        matches!(self, ParamKind::RequiredKeyword | ParamKind::OptionalKeyword)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamKind::Normal => "normal",
            ParamKind::Optioned => "optioned",
            ParamKind::RequiredKeyword => "required keyword",
            ParamKind::OptionalKeyword => "optional keyword",
            ParamKind::Splat => "splat",
        };
        f.write_str(name)
    }
}

/// One `(kind, name)` pair. The name only matters for keyword matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeEntry {
    pub kind: ParamKind,
    #[serde(default)]
    pub name: String,
}

impl ShapeEntry {
    pub fn new(kind: ParamKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// Descriptor construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("splat entry at index {index} must be the last entry")]
    SplatNotLast { index: usize },

    #[error("duplicate splat entries at indices {first} and {second}")]
    DuplicateSplat { first: usize, second: usize },
}

/// Ordered, validated list of shape entries
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ShapeEntry>", into = "Vec<ShapeEntry>")]
pub struct ShapeDescriptor {
    entries: Vec<ShapeEntry>,
}

impl ShapeDescriptor {
    /// Build a descriptor, rejecting a misplaced or repeated splat
    pub fn new(entries: Vec<ShapeEntry>) -> Result<Self, ShapeError> {
        let mut splat_at: Option<usize> = None;
        for (index, entry) in entries.iter().enumerate() {
            if entry.kind != ParamKind::Splat {
                continue;
            }
            if let Some(first) = splat_at {
                return Err(ShapeError::DuplicateSplat {
                    first,
                    second: index,
                });
            }
            splat_at = Some(index);
        }

        if let Some(index) = splat_at {
            if index + 1 != entries.len() {
                return Err(ShapeError::SplatNotLast { index });
            }
        }

        Ok(Self { entries })
    }

    /// Descriptor of unnamed Normal entries, the shape of a plain positional call
    pub fn positional(count: usize) -> Self {
        Self {
            entries: (0..count)
                .map(|_| ShapeEntry::new(ParamKind::Normal, ""))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[ShapeEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ShapeEntry> {
        self.entries.get(index)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ParamKind> + '_ {
        self.entries.iter().map(|e| e.kind)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn last_kind(&self) -> Option<ParamKind> {
        self.entries.last().map(|e| e.kind)
    }
}

impl TryFrom<Vec<ShapeEntry>> for ShapeDescriptor {
    type Error = ShapeError;

    fn try_from(entries: Vec<ShapeEntry>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<ShapeDescriptor> for Vec<ShapeEntry> {
    fn from(shape: ShapeDescriptor) -> Self {
        shape.entries
    }
}

/// Shorthand for building descriptors in compilers and tests
///
/// ```
/// use garnet_runtime::shape;
/// use garnet_runtime::shape::ParamKind;
///
/// let params = shape![Normal "x", RequiredKeyword "y"].unwrap();
/// assert_eq!(params.get(1).unwrap().kind, ParamKind::RequiredKeyword);
/// ```
#[macro_export]
macro_rules! shape {
    ($($kind:ident $name:expr),* $(,)?) => {
        $crate::shape::ShapeDescriptor::new(vec![
            $($crate::shape::ShapeEntry::new($crate::shape::ParamKind::$kind, $name)),*
        ])
    };
}
