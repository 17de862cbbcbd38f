//! Comparison operators for filter rules.
//!
//! The [`Op`] enum covers the data-grid operator codes. Codes travel as
//! two-letter strings (`eq`, `bw`, ...) and are parsed with [`str::parse`]
//! or through serde.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Comparison operator for a filter rule.
///
/// - **Equality**: `Eq`, `Ne`
/// - **Ordering**: `Lt`, `Le`, `Gt`, `Ge`
/// - **Text**: `BeginsWith`, `EndsWith`, `Contains` and their negations
/// - **Nullity**: `IsNull`, `IsNotNull`
/// - **Membership**: `In`, `NotIn`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Op {
    /// `eq`: equal; case-insensitive for text operands.
    Eq,
    /// `ne`: not equal; case-sensitive.
    Ne,
    /// `lt`: less than.
    Lt,
    /// `le`: less than or equal.
    Le,
    /// `gt`: greater than.
    Gt,
    /// `ge`: greater than or equal.
    Ge,
    /// `bw`: begins with, case-insensitive.
    BeginsWith,
    /// `bn`: does not begin with.
    NotBeginsWith,
    /// `ew`: ends with, case-insensitive.
    EndsWith,
    /// `en`: does not end with.
    NotEndsWith,
    /// `cn`: contains, case-insensitive.
    Contains,
    /// `nc`: does not contain.
    NotContains,
    /// `nu`: field is absent.
    IsNull,
    /// `nn`: field is present.
    IsNotNull,
    /// `in`: equal to one of a comma-separated list.
    In,
    /// `ni`: not equal to any of a comma-separated list.
    NotIn,
}

impl Op {
    /// Every operator, in code order.
    pub const ALL: [Op; 16] = [
        Op::Eq,
        Op::Ne,
        Op::Lt,
        Op::Le,
        Op::Gt,
        Op::Ge,
        Op::BeginsWith,
        Op::NotBeginsWith,
        Op::EndsWith,
        Op::NotEndsWith,
        Op::Contains,
        Op::NotContains,
        Op::IsNull,
        Op::IsNotNull,
        Op::In,
        Op::NotIn,
    ];

    /// Returns `true` for the ordering comparisons.
    pub fn is_ordering(self) -> bool {
        matches!(self, Op::Lt | Op::Le | Op::Gt | Op::Ge)
    }

    /// Returns `true` for operators that always work on the text form of
    /// the field.
    pub fn is_text_op(self) -> bool {
        self.positive().is_some()
    }

    /// Returns `true` for operators that ignore the operand.
    pub fn is_nullity(self) -> bool {
        matches!(self, Op::IsNull | Op::IsNotNull)
    }

    /// Returns `true` for list membership operators.
    pub fn is_membership(self) -> bool {
        matches!(self, Op::In | Op::NotIn)
    }

    /// For a text operator, returns its positive form and whether this
    /// operator negates it.
    pub fn positive(self) -> Option<(Op, bool)> {
        match self {
            Op::BeginsWith | Op::EndsWith | Op::Contains => Some((self, false)),
            Op::NotBeginsWith => Some((Op::BeginsWith, true)),
            Op::NotEndsWith => Some((Op::EndsWith, true)),
            Op::NotContains => Some((Op::Contains, true)),
            _ => None,
        }
    }

    /// Evaluates an equality or ordering comparison given an ordering result.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Ge => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Le => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the wire code of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Lt => "lt",
            Op::Le => "le",
            Op::Gt => "gt",
            Op::Ge => "ge",
            Op::BeginsWith => "bw",
            Op::NotBeginsWith => "bn",
            Op::EndsWith => "ew",
            Op::NotEndsWith => "en",
            Op::Contains => "cn",
            Op::NotContains => "nc",
            Op::IsNull => "nu",
            Op::IsNotNull => "nn",
            Op::In => "in",
            Op::NotIn => "ni",
        }
    }
}

impl FromStr for Op {
    type Err = GridError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let code = code.trim();
        Op::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(code))
            .ok_or_else(|| GridError::UnknownOperator(code.to_string()))
    }
}

impl TryFrom<String> for Op {
    type Error = GridError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<Op> for &'static str {
    fn from(op: Op) -> Self {
        op.as_str()
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
