//! Rule-trees and the filter compiler.
//!
//! A [`RuleGroup`] is the wire form of a search: a logical operator over a
//! list of field rules, optionally with nested sub-groups. [`compile_filter`]
//! resolves and coerces every rule against a record schema and produces a
//! [`Filter`], a small predicate tree evaluated per record.
//!
//! ```text
//! { "groupOp": "AND",
//!   "rules": [ { "field": "status", "op": "eq", "data": "Active" } ] }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, trace};

use crate::clause::{Clause, ClauseValue};
use crate::coerce::{coerce, coerce_list, Coerced};
use crate::config::GridConfig;
use crate::error::{GridError, Result};
use crate::op::Op;
use crate::schema::{FieldPath, Schema};
use crate::traits::Gridable;

/// Logical operator joining the members of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum GroupOp {
    /// Every member must match.
    #[default]
    And,
    /// At least one member must match.
    Or,
}

impl GroupOp {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupOp::And => "AND",
            GroupOp::Or => "OR",
        }
    }
}

impl FromStr for GroupOp {
    type Err = GridError;

    fn from_str(text: &str) -> std::result::Result<Self, Self::Err> {
        match text.trim() {
            t if t.eq_ignore_ascii_case("and") => Ok(GroupOp::And),
            t if t.eq_ignore_ascii_case("or") => Ok(GroupOp::Or),
            other => Err(GridError::UnknownOperator(other.to_string())),
        }
    }
}

impl TryFrom<String> for GroupOp {
    type Error = GridError;

    fn try_from(text: String) -> std::result::Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<GroupOp> for &'static str {
    fn from(op: GroupOp) -> Self {
        op.as_str()
    }
}

impl fmt::Display for GroupOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field comparison on the wire.
///
/// A rule whose `field` is empty is vacuous and ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub field: String,
    pub op: Op,
    #[serde(default, deserialize_with = "scalar_text")]
    pub data: Option<String>,
}

impl Rule {
    pub fn new(field: impl Into<String>, op: Op, data: Option<&str>) -> Self {
        Rule {
            field: field.into(),
            op,
            data: data.map(str::to_string),
        }
    }

    /// Returns `true` if the rule names no field.
    pub fn is_vacuous(&self) -> bool {
        self.field.trim().is_empty()
    }
}

/// A logical group of rules, as sent by the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGroup {
    #[serde(rename = "groupOp", default)]
    pub group_op: GroupOp,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<RuleGroup>,
}

impl RuleGroup {
    /// Creates an empty group with the given operator.
    pub fn new(group_op: GroupOp) -> Self {
        RuleGroup {
            group_op,
            rules: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Creates an empty AND group.
    pub fn and() -> Self {
        RuleGroup::new(GroupOp::And)
    }

    /// Creates an empty OR group.
    pub fn or() -> Self {
        RuleGroup::new(GroupOp::Or)
    }

    /// Adds a rule.
    pub fn rule(mut self, field: &str, op: Op, data: &str) -> Self {
        self.rules.push(Rule::new(field, op, Some(data)));
        self
    }

    /// Adds a rule with a null operand.
    pub fn rule_null(mut self, field: &str, op: Op) -> Self {
        self.rules.push(Rule::new(field, op, None));
        self
    }

    /// Adds a nested group.
    pub fn group(mut self, group: RuleGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Parses the JSON wire form.
    pub fn from_json(text: &str) -> Result<RuleGroup> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Accepts a string, number or bool for `data` and keeps its text.
fn scalar_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "rule data must be a string, number, bool or null, got {}",
            other
        ))),
    }
}

/// A compiled predicate over one record.
#[derive(Debug, Clone)]
pub enum Filter {
    /// A single field comparison.
    Clause(Clause),
    /// All members must match; an empty list matches everything.
    And(Vec<Filter>),
    /// At least one member must match.
    Or(Vec<Filter>),
}

impl Filter {
    /// The predicate that matches every record.
    pub fn always() -> Filter {
        Filter::And(Vec::new())
    }

    /// Returns `true` if this predicate places no constraint.
    pub fn is_always(&self) -> bool {
        matches!(self, Filter::And(members) if members.is_empty())
    }

    /// Evaluates the predicate against a record, short-circuiting in
    /// member order.
    pub fn matches(&self, record: &dyn Gridable) -> bool {
        match self {
            Filter::Clause(clause) => clause.evaluate(record),
            Filter::And(members) => members.iter().all(|m| m.matches(record)),
            Filter::Or(members) => members.iter().any(|m| m.matches(record)),
        }
    }

    /// Returns the records that match, in input order.
    pub fn apply<'a, T: Gridable>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(*item)).collect()
    }

    /// Visits every clause in the tree.
    pub fn clauses(&self) -> Vec<&Clause> {
        let mut out = Vec::new();
        self.collect_clauses(&mut out);
        out
    }

    fn collect_clauses<'a>(&'a self, out: &mut Vec<&'a Clause>) {
        match self {
            Filter::Clause(clause) => out.push(clause),
            Filter::And(members) | Filter::Or(members) => {
                for member in members {
                    member.collect_clauses(out);
                }
            }
        }
    }
}

/// Compiles a rule-tree against a schema.
///
/// Vacuous rules (empty field, or a reference rule carrying the configured
/// sentinel) are skipped. A group left with no members is dropped from its
/// parent; a top-level group with no members compiles to
/// [`Filter::always`].
///
/// Fails only on client input: an unknown or malformed field path.
pub fn compile_filter(group: &RuleGroup, schema: &Schema, config: &GridConfig) -> Result<Filter> {
    Ok(compile_group(group, schema, config)?.unwrap_or_else(Filter::always))
}

fn compile_group(group: &RuleGroup, schema: &Schema, config: &GridConfig) -> Result<Option<Filter>> {
    let mut members = Vec::with_capacity(group.rules.len() + group.groups.len());
    for rule in &group.rules {
        if let Some(clause) = compile_rule(rule, schema, config)? {
            members.push(Filter::Clause(clause));
        }
    }
    for nested in &group.groups {
        if let Some(filter) = compile_group(nested, schema, config)? {
            members.push(filter);
        }
    }

    if members.is_empty() {
        return Ok(None);
    }
    debug!(group_op = %group.group_op, members = members.len(), "compiled rule group");
    Ok(Some(match group.group_op {
        GroupOp::And => Filter::And(members),
        GroupOp::Or => Filter::Or(members),
    }))
}

fn compile_rule(rule: &Rule, schema: &Schema, config: &GridConfig) -> Result<Option<Clause>> {
    if rule.is_vacuous() {
        trace!(op = %rule.op, "skipping rule without a field");
        return Ok(None);
    }

    let accessor = schema.resolve(&FieldPath::parse(&rule.field)?)?;
    let data = rule.data.as_deref();

    if accessor.is_collapsed() && data.map(str::trim) == Some(config.reference_sentinel.as_str()) {
        trace!(field = %rule.field, "skipping reference rule carrying the sentinel");
        return Ok(None);
    }

    let coerced = if rule.op.is_nullity() {
        Coerced {
            value: ClauseValue::Null,
            fallback: false,
        }
    } else if rule.op.is_membership() {
        coerce_list(data, accessor.kind())
    } else if rule.op.is_text_op() {
        Coerced {
            value: data.map_or(ClauseValue::Null, ClauseValue::from),
            fallback: false,
        }
    } else {
        coerce(data, accessor.kind())
    };

    if coerced.fallback {
        debug!(
            field = %rule.field,
            op = %rule.op,
            kind = accessor.kind().name(),
            data = data.unwrap_or_default(),
            "operand did not coerce to the field type; comparing as text"
        );
    }
    debug!(field = %rule.field, op = %rule.op, "compiled rule");

    Ok(Some(
        Clause::new(accessor, rule.op, coerced.value).with_fallback(coerced.fallback),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, FieldKind};
    use crate::value::{Number, NumberKind, Value};

    struct Person {
        id: i64,
        name: &'static str,
        age: Option<i64>,
    }

    static PERSON: Schema = Schema::new(
        "Person",
        Some("id"),
        &[
            FieldDef::new("id", FieldKind::Number(NumberKind::Signed)),
            FieldDef::new("name", FieldKind::String),
            FieldDef::new("age", FieldKind::Number(NumberKind::Signed)).nullable(),
        ],
    );

    impl Gridable for Person {
        fn grid_schema() -> &'static Schema {
            &PERSON
        }
        fn grid_field(&self, field: &str) -> Value<'_> {
            match field {
                "id" => Value::Number(Number::I64(self.id)),
                "name" => Value::String(self.name),
                "age" => self.age.map(|a| Value::Number(Number::I64(a))).unwrap_or(Value::None),
                _ => Value::None,
            }
        }
    }

    fn people() -> Vec<Person> {
        vec![
            Person { id: 1, name: "Ann", age: Some(31) },
            Person { id: 2, name: "bob", age: Some(17) },
            Person { id: 3, name: "Bobby", age: None },
        ]
    }

    fn ids(group: RuleGroup) -> Vec<i64> {
        let filter = compile_filter(&group, &PERSON, &GridConfig::default()).unwrap();
        let people = people();
        let matched = filter.apply(&people);
        matched.iter().map(|p| p.id).collect()
    }

    #[test]
    fn parses_wire_payload() {
        let group = RuleGroup::from_json(
            r#"{"groupOp":"or","rules":[{"field":"name","op":"bw","data":"bo"},{"field":"age","op":"gt","data":30}]}"#,
        )
        .unwrap();
        assert_eq!(group.group_op, GroupOp::Or);
        assert_eq!(group.rules[1].data.as_deref(), Some("30"));
        assert!(group.groups.is_empty());
    }

    #[test]
    fn malformed_payload() {
        assert!(matches!(
            RuleGroup::from_json("{not json"),
            Err(GridError::MalformedFilterPayload(_))
        ));
        assert!(RuleGroup::from_json(r#"{"groupOp":"XOR","rules":[]}"#).is_err());
        assert!(RuleGroup::from_json(r#"{"rules":[{"field":"a","op":"zz"}]}"#).is_err());
    }

    #[test]
    fn empty_group_matches_everything() {
        assert_eq!(ids(RuleGroup::and()), vec![1, 2, 3]);
        assert_eq!(ids(RuleGroup::or()), vec![1, 2, 3]);
    }

    #[test]
    fn vacuous_rules_are_skipped() {
        let group = RuleGroup::or().rule("", Op::Eq, "anything");
        let filter = compile_filter(&group, &PERSON, &GridConfig::default()).unwrap();
        assert!(filter.is_always());
    }

    #[test]
    fn and_or() {
        let and = RuleGroup::and().rule("name", Op::BeginsWith, "b").rule("age", Op::Lt, "20");
        assert_eq!(ids(and), vec![2]);

        let or = RuleGroup::or().rule("name", Op::Eq, "ann").rule("age", Op::IsNull, "");
        assert_eq!(ids(or), vec![1, 3]);
    }

    #[test]
    fn nested_groups() {
        let group = RuleGroup::and()
            .rule("name", Op::Contains, "b")
            .group(RuleGroup::or().rule("age", Op::Lt, "18").rule_null("age", Op::IsNull));
        assert_eq!(ids(group), vec![2, 3]);

        let empty_nested = RuleGroup::or().rule("name", Op::Eq, "ann").group(RuleGroup::and());
        assert_eq!(ids(empty_nested), vec![1]);
    }

    #[test]
    fn fallback_is_flagged_not_raised() {
        let group = RuleGroup::and().rule("age", Op::Eq, "old");
        let filter = compile_filter(&group, &PERSON, &GridConfig::default()).unwrap();
        assert!(filter.clauses()[0].is_fallback());
        assert_eq!(ids(group), Vec::<i64>::new());
    }

    #[test]
    fn unknown_field_is_an_error() {
        let group = RuleGroup::and().rule("email", Op::Eq, "x");
        assert!(matches!(
            compile_filter(&group, &PERSON, &GridConfig::default()),
            Err(GridError::FieldNotFound { .. })
        ));
    }
}
