//! Hierarchical keys
//!
//! A key is an ordered path of scalar segments, e.g. `(file, sheet, column)`.
//! Keys of different arity may live in the same map.

use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Deserializer, Serialize};

use super::errors::ConfigurationError;

/// A single scalar component of a hierarchical key.
///
/// Segments are equal only when variant and value both match: `Int(1)` and
/// `Float(1.0)` are different segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Bool(b) => write!(f, "{}", b),
            Segment::Int(i) => write!(f, "{}", i),
            Segment::Float(x) => write!(f, "{}", x.0),
            Segment::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::Str(s.to_string())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::Str(s)
    }
}

impl From<bool> for Segment {
    fn from(b: bool) -> Self {
        Segment::Bool(b)
    }
}

impl From<f64> for Segment {
    fn from(x: f64) -> Self {
        Segment::Float(OrderedFloat(x))
    }
}

macro_rules! segment_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Segment {
                fn from(i: $t) -> Self {
                    Segment::Int(i64::from(i))
                }
            }
        )*
    };
}

segment_from_int!(i32, i64, u32);

// Unsigned counters past i64::MAX are rejected.
macro_rules! segment_try_from_unsigned {
    ($($t:ty),*) => {
        $(
            impl TryFrom<$t> for Segment {
                type Error = ConfigurationError;

                fn try_from(i: $t) -> Result<Self, Self::Error> {
                    i64::try_from(i).map(Segment::Int).map_err(|_| ConfigurationError::Overflow {
                        op: concat!(stringify!($t), " -> i64"),
                    })
                }
            }
        )*
    };
}

segment_try_from_unsigned!(u64, usize);

/// An ordered sequence of segments identifying a nested category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct HierarchicalKey(Vec<Segment>);

impl HierarchicalKey {
    /// The empty key; as a prefix it selects everything
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if the first `prefix.len()` segments equal `prefix`.
    ///
    /// Keys shorter than the prefix never match.
    pub fn starts_with(&self, prefix: &HierarchicalKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Returns the key with its first `n` segments removed
    pub fn strip_leading(&self, n: usize) -> HierarchicalKey {
        Self(self.0.iter().skip(n).cloned().collect())
    }

    /// Returns the only segment of a one-element key
    pub fn as_singleton(&self) -> Option<&Segment> {
        match self.0.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.0
    }
}

impl fmt::Display for HierarchicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", segment)?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Accepts either an array of segments or a bare scalar
impl<'de> Deserialize<'de> for HierarchicalKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Path(Vec<Segment>),
            Scalar(Segment),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Path(segments) => Self(segments),
            Repr::Scalar(segment) => Self(vec![segment]),
        })
    }
}

impl From<Segment> for HierarchicalKey {
    fn from(segment: Segment) -> Self {
        Self(vec![segment])
    }
}

impl From<Vec<Segment>> for HierarchicalKey {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl From<&HierarchicalKey> for HierarchicalKey {
    fn from(key: &HierarchicalKey) -> Self {
        key.clone()
    }
}

impl From<()> for HierarchicalKey {
    fn from(_: ()) -> Self {
        Self::root()
    }
}

/// `None` is the empty key, i.e. the whole map when used as a prefix
impl<T: Into<HierarchicalKey>> From<Option<T>> for HierarchicalKey {
    fn from(key: Option<T>) -> Self {
        key.map(Into::into).unwrap_or_default()
    }
}

impl FromIterator<Segment> for HierarchicalKey {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// Bare scalars normalize to one-element keys.
macro_rules! key_from_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for HierarchicalKey {
                fn from(scalar: $t) -> Self {
                    Self(vec![Segment::from(scalar)])
                }
            }
        )*
    };
}

key_from_scalar!(&str, String, bool, f64, i32, i64, u32);

macro_rules! key_from_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Segment>),+> From<($($name,)+)> for HierarchicalKey {
            #[allow(non_snake_case)]
            fn from(($($name,)+): ($($name,)+)) -> Self {
                Self(vec![$($name.into()),+])
            }
        }
    };
}

key_from_tuple!(A);
key_from_tuple!(A, B);
key_from_tuple!(A, B, C);
key_from_tuple!(A, B, C, D);
key_from_tuple!(A, B, C, D, E);
key_from_tuple!(A, B, C, D, E, F);

/// A key as it appears in a report: one-element keys collapse to their bare
/// scalar, longer (or empty) keys stay a full path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ReportKey {
    Scalar(Segment),
    Path(HierarchicalKey),
}

impl ReportKey {
    /// Collapses a one-element key to its scalar
    pub fn collapse(key: HierarchicalKey) -> Self {
        match key.as_singleton() {
            Some(segment) => ReportKey::Scalar(segment.clone()),
            None => ReportKey::Path(key),
        }
    }

    /// Restores the full key this report key stands for
    pub fn to_key(&self) -> HierarchicalKey {
        match self {
            ReportKey::Scalar(segment) => HierarchicalKey::from(segment.clone()),
            ReportKey::Path(key) => key.clone(),
        }
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKey::Scalar(segment) => write!(f, "{}", segment),
            ReportKey::Path(key) => write!(f, "{}", key),
        }
    }
}
