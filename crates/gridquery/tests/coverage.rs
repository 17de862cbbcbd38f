//! Operator coverage over a hand-written `Gridable` implementation.
//!
//! Each section runs wire rules through the filter compiler against a small
//! fixture and checks which records survive.

use gridquery::{
    compile_filter, EnumVariant, FieldDef, FieldKind, Filter, GridConfig, GridError, Gridable,
    GroupOp, Number, NumberKind, Op, Rule, RuleGroup, Schema, Timestamp, Value,
};

// ============================================================================
// Fixture
// ============================================================================

static PRIORITY: &[EnumVariant] = &[
    EnumVariant::new("Low", 10),
    EnumVariant::new("Normal", 20),
    EnumVariant::new("High", 30),
];

static OWNER: Schema = Schema::new(
    "Owner",
    Some("login"),
    &[
        FieldDef::new("login", FieldKind::String),
        FieldDef::new("age", FieldKind::Number(NumberKind::Unsigned)),
    ],
);

static TICKET: Schema = Schema::new(
    "Ticket",
    Some("id"),
    &[
        FieldDef::new("id", FieldKind::Number(NumberKind::Signed)),
        FieldDef::new("Title", FieldKind::String),
        FieldDef::new("score", FieldKind::Number(NumberKind::Float)).nullable(),
        FieldDef::new("priority", FieldKind::Enum(PRIORITY)),
        FieldDef::new("open", FieldKind::Bool),
        FieldDef::new("due", FieldKind::Timestamp).nullable(),
        FieldDef::new("owner", FieldKind::Reference(owner_schema)).nullable(),
    ],
);

fn owner_schema() -> &'static Schema {
    &OWNER
}

struct Owner {
    login: &'static str,
    age: u64,
}

impl Gridable for Owner {
    fn grid_schema() -> &'static Schema {
        &OWNER
    }

    fn grid_field(&self, field: &str) -> Value<'_> {
        match field {
            "login" => Value::String(self.login),
            "age" => Value::Number(Number::U64(self.age)),
            _ => Value::None,
        }
    }
}

struct Ticket {
    id: i64,
    title: &'static str,
    score: Option<f64>,
    priority: u32,
    open: bool,
    due: Option<Timestamp>,
    owner: Option<Owner>,
}

impl Gridable for Ticket {
    fn grid_schema() -> &'static Schema {
        &TICKET
    }

    fn grid_field(&self, field: &str) -> Value<'_> {
        match field {
            "id" => Value::Number(Number::I64(self.id)),
            "Title" => Value::String(self.title),
            "score" => self.score.map_or(Value::None, |s| Value::Number(Number::F64(s))),
            "priority" => Value::Enum(self.priority),
            "open" => Value::Bool(self.open),
            "due" => self.due.map_or(Value::None, Value::Timestamp),
            "owner" => self
                .owner
                .as_ref()
                .map_or(Value::None, |o| Value::Record(o)),
            _ => Value::None,
        }
    }
}

const DAY: i64 = 86_400_000;

fn tickets() -> Vec<Ticket> {
    vec![
        Ticket {
            id: 1,
            title: "Login page broken",
            score: Some(4.5),
            priority: 30,
            open: true,
            due: Some(Timestamp::from_millis(10 * DAY)),
            owner: Some(Owner { login: "ann", age: 40 }),
        },
        Ticket {
            id: 2,
            title: "Typo in footer",
            score: Some(1.0),
            priority: 10,
            open: false,
            due: None,
            owner: Some(Owner { login: "bob", age: 25 }),
        },
        Ticket {
            id: 3,
            title: "login timeout",
            score: None,
            priority: 20,
            open: true,
            due: Some(Timestamp::from_millis(20 * DAY)),
            owner: None,
        },
        Ticket {
            id: 4,
            title: "Slow search",
            score: Some(3.0),
            priority: 30,
            open: true,
            due: Some(Timestamp::from_millis(30 * DAY)),
            owner: Some(Owner { login: "Ann", age: 33 }),
        },
    ]
}

fn compile(group: &RuleGroup) -> Result<Filter, GridError> {
    compile_filter(group, &TICKET, &GridConfig::default())
}

fn matching(group: RuleGroup) -> Vec<i64> {
    let filter = compile(&group).unwrap();
    let tickets = tickets();
    let matched = filter.apply(&tickets);
    matched.iter().map(|t| t.id).collect()
}

fn one(field: &str, op: Op, data: &str) -> Vec<i64> {
    matching(RuleGroup::and().rule(field, op, data))
}

// ============================================================================
// Equality and ordering
// ============================================================================

#[test]
fn eq_on_text_ignores_case() {
    assert_eq!(one("Title", Op::Eq, "TYPO IN FOOTER"), vec![2]);
}

#[test]
fn ne_on_text_is_case_sensitive() {
    assert_eq!(one("Title", Op::Ne, "typo in footer"), vec![1, 2, 3, 4]);
    assert_eq!(one("Title", Op::Ne, "Typo in footer"), vec![1, 3, 4]);
}

#[test]
fn numeric_ordering() {
    assert_eq!(one("id", Op::Lt, "2"), vec![1]);
    assert_eq!(one("id", Op::Le, "2"), vec![1, 2]);
    assert_eq!(one("id", Op::Gt, "2"), vec![3, 4]);
    assert_eq!(one("id", Op::Ge, "2"), vec![2, 3, 4]);
    assert_eq!(one("id", Op::Ne, "2"), vec![1, 3, 4]);
}

#[test]
fn float_field_with_integer_operand() {
    assert_eq!(one("score", Op::Ge, "3"), vec![1, 4]);
}

#[test]
fn absent_values_only_satisfy_ne() {
    assert_eq!(one("score", Op::Lt, "100"), vec![1, 2, 4]);
    assert_eq!(one("score", Op::Ne, "1"), vec![1, 3, 4]);
}

#[test]
fn text_ordering_is_ordinal() {
    // Uppercase sorts before lowercase.
    assert_eq!(one("Title", Op::Lt, "M"), vec![1]);
    assert_eq!(one("Title", Op::Ge, "a"), vec![3]);
}

#[test]
fn enum_by_name_or_number() {
    assert_eq!(one("priority", Op::Eq, "high"), vec![1, 4]);
    assert_eq!(one("priority", Op::Eq, "10"), vec![2]);
    assert_eq!(one("priority", Op::Ge, "Normal"), vec![1, 3, 4]);
}

#[test]
fn bool_field() {
    assert_eq!(one("open", Op::Eq, "false"), vec![2]);
    assert_eq!(one("open", Op::Ne, "True"), vec![2]);
}

#[test]
fn timestamp_field() {
    assert_eq!(one("due", Op::Lt, "1970-01-15"), vec![1]);
    assert_eq!(one("due", Op::Gt, "1970-01-15T00:00:00Z"), vec![3, 4]);
    assert_eq!(one("due", Op::Eq, "1970-01-21 00:00:00"), vec![3]);
}

// ============================================================================
// Text operators
// ============================================================================

#[test]
fn begins_with() {
    assert_eq!(one("Title", Op::BeginsWith, "login"), vec![1, 3]);
    assert_eq!(one("Title", Op::NotBeginsWith, "login"), vec![2, 4]);
}

#[test]
fn ends_with() {
    assert_eq!(one("Title", Op::EndsWith, "BROKEN"), vec![1]);
    assert_eq!(one("Title", Op::NotEndsWith, "broken"), vec![2, 3, 4]);
}

#[test]
fn contains() {
    assert_eq!(one("Title", Op::Contains, "o"), vec![1, 2, 3, 4]);
    assert_eq!(one("Title", Op::Contains, "IN"), vec![1, 2, 3]);
    assert_eq!(one("Title", Op::NotContains, "in"), vec![4]);
}

#[test]
fn text_operators_on_non_text_fields_use_rendered_text() {
    assert_eq!(one("priority", Op::BeginsWith, "hi"), vec![1, 4]);
    assert_eq!(one("id", Op::EndsWith, "3"), vec![3]);
}

#[test]
fn negated_text_operators_include_absent_fields() {
    assert_eq!(one("score", Op::NotContains, "5"), vec![2, 3, 4]);
}

// ============================================================================
// Null and membership
// ============================================================================

#[test]
fn null_checks() {
    assert_eq!(one("score", Op::IsNull, ""), vec![3]);
    assert_eq!(one("score", Op::IsNotNull, ""), vec![1, 2, 4]);
    assert_eq!(one("owner", Op::IsNull, ""), vec![3]);
}

#[test]
fn null_operand() {
    assert_eq!(matching(RuleGroup::and().rule_null("due", Op::Eq)), vec![2]);
    assert_eq!(matching(RuleGroup::and().rule_null("due", Op::Ne)), vec![1, 3, 4]);
}

#[test]
fn in_and_not_in() {
    assert_eq!(one("id", Op::In, "1, 3,9"), vec![1, 3]);
    assert_eq!(one("id", Op::NotIn, "1,3"), vec![2, 4]);
    assert_eq!(one("priority", Op::In, "low,normal"), vec![2, 3]);
    assert_eq!(one("Title", Op::In, "slow search,nothing"), vec![4]);
}

// ============================================================================
// Paths and references
// ============================================================================

#[test]
fn field_lookup_falls_back_to_case_insensitive() {
    assert_eq!(one("title", Op::Eq, "slow search"), vec![4]);
    assert_eq!(one("ID", Op::Eq, "4"), vec![4]);
}

#[test]
fn reference_collapses_to_identity() {
    assert_eq!(one("owner", Op::Eq, "ANN"), vec![1, 4]);
    assert_eq!(one("owner", Op::Ne, "ann"), vec![2, 3, 4]);
}

#[test]
fn nested_scalar() {
    assert_eq!(one("owner.age", Op::Lt, "35"), vec![2, 4]);
}

#[test]
fn sentinel_skips_reference_rule_only() {
    assert_eq!(one("owner", Op::Eq, " -1 "), vec![1, 2, 3, 4]);
    // Not a reference path: the sentinel is an ordinary operand.
    assert_eq!(one("owner.age", Op::Eq, "-1"), Vec::<i64>::new());
}

#[test]
fn configurable_sentinel() {
    let config = GridConfig {
        reference_sentinel: "any".to_string(),
        ..GridConfig::default()
    };
    let filter = compile_filter(&RuleGroup::and().rule("owner", Op::Eq, "any"), &TICKET, &config)
        .unwrap();
    assert!(filter.is_always());
}

// ============================================================================
// Coercion fallback
// ============================================================================

#[test]
fn fallback_compares_text_without_error() {
    assert_eq!(one("id", Op::Eq, "one"), Vec::<i64>::new());
    assert_eq!(one("due", Op::Eq, "tomorrow"), Vec::<i64>::new());
    assert_eq!(one("open", Op::Eq, "yes"), Vec::<i64>::new());
}

#[test]
fn fallback_is_visible_on_the_clause() {
    let filter = compile(&RuleGroup::and().rule("id", Op::Eq, "one")).unwrap();
    assert!(filter.clauses().iter().all(|c| c.is_fallback()));
    let filter = compile(&RuleGroup::and().rule("id", Op::Eq, "1")).unwrap();
    assert!(filter.clauses().iter().all(|c| !c.is_fallback()));
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn or_group() {
    let group = RuleGroup::or()
        .rule("id", Op::Eq, "1")
        .rule("Title", Op::Contains, "search");
    assert_eq!(matching(group), vec![1, 4]);
}

#[test]
fn empty_rules_are_vacuous() {
    let mut group = RuleGroup::new(GroupOp::Or);
    group.rules.push(Rule::new("", Op::Eq, Some("x")));
    group.rules.push(Rule::new("  ", Op::Gt, None));
    assert!(compile(&group).unwrap().is_always());
    assert_eq!(matching(group), vec![1, 2, 3, 4]);
}

#[test]
fn json_payload_with_nested_groups() {
    let group = RuleGroup::from_json(
        r#"{
            "groupOp": "and",
            "rules": [{ "field": "open", "op": "eq", "data": "true" }],
            "groups": [{
                "groupOp": "OR",
                "rules": [
                    { "field": "priority", "op": "eq", "data": "High" },
                    { "field": "owner", "op": "nu", "data": null }
                ]
            }]
        }"#,
    )
    .unwrap();
    assert_eq!(matching(group), vec![1, 3, 4]);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn unknown_field() {
    let err = compile(&RuleGroup::and().rule("assignee", Op::Eq, "x")).unwrap_err();
    match err {
        GridError::FieldNotFound { schema, segment, .. } => {
            assert_eq!(schema, "Ticket");
            assert_eq!(segment, "assignee");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn invalid_path() {
    assert!(matches!(
        compile(&RuleGroup::and().rule("owner..age", Op::Eq, "1")),
        Err(GridError::InvalidFieldPath(_))
    ));
}

#[test]
fn unknown_operator_in_payload() {
    let err = RuleGroup::from_json(r#"{"groupOp":"AND","rules":[{"field":"id","op":"like","data":"1"}]}"#)
        .unwrap_err();
    assert!(matches!(err, GridError::MalformedFilterPayload(_)));
    assert!(err.is_client_error());
}
