use super::{Context, FilterSet, InputValues};
use crate::{
    error::FilterError,
    filter::{
        BooleanFilter, CharFilter, DateFilter, DateTimeFilter, LimitFilter, MethodFilter,
        NumberFilter, OffsetFilter, OrderingFilter, SearchingFilter, TimeFilter, UUIDFilter,
    },
    query::{CompareOp, JoinHop, OrderSpec, Operator, Predicate, Queryable, Select},
    schema::FilterSchema,
    test_fixtures::{PRODUCT, TestRow, products},
    value::{ScalarType, Value},
};
use proptest::prelude::*;
use serde_json::json;
use uuid::Uuid;

///
/// Recorder
///
/// Queryable that logs every call, in order, as text.
///

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<String>,
}

impl Queryable for Recorder {
    fn filter(&mut self, predicate: Predicate) {
        self.calls.push(format!("filter {predicate}"));
    }

    fn join(&mut self, hop: &JoinHop) {
        self.calls.push(format!("join {hop}"));
    }

    fn order_by(&mut self, order: OrderSpec) {
        self.calls.push(format!("order {order}"));
    }

    fn limit(&mut self, limit: u64) {
        self.calls.push(format!("limit {limit}"));
    }

    fn offset(&mut self, offset: u64) {
        self.calls.push(format!("offset {offset}"));
    }
}

fn in_stock(
    query: &mut dyn Queryable,
    field: &str,
    value: &Value,
    context: &Context,
) -> Result<(), FilterError> {
    let wanted = value
        .as_bool()
        .ok_or_else(|| FilterError::type_mismatch(field, "bool", value.type_name()))?;
    let threshold = context.get("threshold").cloned().unwrap_or(Value::Int(0));
    let op = if wanted { CompareOp::Gt } else { CompareOp::Lte };

    query.filter(Predicate::compare(field, op, threshold));

    Ok(())
}

fn catalog() -> FilterSchema {
    FilterSchema::builder()
        .model(&PRODUCT)
        .filter("title", CharFilter::new().operator(Operator::Ilike))
        .filter(
            "min_price",
            NumberFilter::new().field("price").operator(Operator::Ge),
        )
        .filter("maker", CharFilter::new().field("manufacturer.name"))
        .filter("q", SearchingFilter::new(["title", "description"]))
        .filter(
            "in_stock",
            MethodFilter::new(in_stock)
                .field("stock")
                .value_type(ScalarType::Bool),
        )
        .filter(
            "order",
            OrderingFilter::mapped([("name", "title"), ("price", "price")]),
        )
        .filter("offset", OffsetFilter::new())
        .filter("limit", LimitFilter::new().maximum(500))
        .build()
        .unwrap()
}

fn record(schema: &FilterSchema, input: InputValues) -> Result<Vec<String>, FilterError> {
    FilterSet::new(schema, input)
        .apply(Recorder::default())
        .map(|recorder| recorder.calls)
}

fn titles(rows: &[&TestRow]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get("title").and_then(Value::as_text))
        .map(str::to_string)
        .collect()
}

//
// Composition
//

#[test]
fn empty_input_contributes_only_defaults() {
    assert_eq!(record(&catalog(), InputValues::new()).unwrap(), vec!["limit 100"]);
}

#[test]
fn one_predicate_per_present_key() {
    let input = InputValues::new()
        .with("title", "%an%")
        .with("min_price", "10");

    assert_eq!(
        record(&catalog(), input).unwrap(),
        vec![
            "filter title ILIKE '%an%'",
            "filter price >= 10",
            "limit 100",
        ]
    );
}

#[test]
fn null_input_is_treated_as_absent() {
    let input = InputValues::new().with("title", Value::Null);

    assert_eq!(record(&catalog(), input).unwrap(), vec!["limit 100"]);
}

#[test]
fn joins_precede_their_predicate() {
    let input = InputValues::new().with("maker", "Acme");

    assert_eq!(
        record(&catalog(), input).unwrap(),
        vec![
            "join product.manufacturer -> manufacturer",
            "filter manufacturer.name = 'Acme'",
            "limit 100",
        ]
    );
}

#[test]
fn unknown_parameter_rejects_the_whole_call() {
    let schema = catalog();
    let input = InputValues::new()
        .with("title", "x")
        .with("bogus", 1);

    let mut recorder = Recorder::default();
    let err = FilterSet::new(&schema, input)
        .apply(&mut recorder)
        .unwrap_err();

    assert_eq!(
        err,
        FilterError::UnknownParameter {
            name: "bogus".to_string()
        }
    );
    assert!(recorder.calls.is_empty());
}

#[test]
fn invalid_value_surfaces_unchanged() {
    let input = InputValues::new().with("min_price", "cheap");

    assert!(matches!(
        record(&catalog(), input),
        Err(FilterError::TypeMismatch { ref field, .. }) if field == "price"
    ));
}

#[test]
fn failed_apply_leaves_queryable_as_given() {
    let schema = catalog();
    let input = InputValues::new()
        .with("title", "drill")
        .with("min_price", "not-a-number");

    let mut select = Select::new();
    let err = FilterSet::new(&schema, input)
        .apply(&mut select)
        .unwrap_err();

    assert!(matches!(err, FilterError::TypeMismatch { ref field, .. } if field == "price"));
    assert_eq!(select, Select::new());
}

#[test]
fn late_ordering_failure_discards_earlier_joins_and_predicates() {
    let schema = catalog();
    let input = InputValues::new()
        .with("maker", "Acme")
        .with("q", "anvil")
        .with("order", "bogus");

    let mut recorder = Recorder::default();
    let err = FilterSet::new(&schema, input)
        .apply(&mut recorder)
        .unwrap_err();

    assert!(matches!(err, FilterError::InvalidOrdering { .. }));
    assert!(recorder.calls.is_empty());
}

//
// Search
//

#[test]
fn search_is_an_or_group_conjoined_with_the_rest() {
    let schema = catalog();
    let input = InputValues::new().with("title", "%a%").with("q", "x");

    let select: Select = FilterSet::new(&schema, input).apply_model().unwrap();
    let title = Predicate::compare("title", CompareOp::ILike, "%a%".into());
    let search = Predicate::Or(vec![
        Predicate::compare("title", CompareOp::Contains, "x".into()),
        Predicate::compare("description", CompareOp::Contains, "x".into()),
    ]);

    assert_eq!(select.predicate, Some(Predicate::And(vec![title, search])));
}

#[test]
fn blank_search_contributes_nothing() {
    let input = InputValues::new().with("q", "   ");

    assert_eq!(record(&catalog(), input).unwrap(), vec!["limit 100"]);
}

#[test]
fn search_errors_surface_unchanged() {
    let schema = FilterSchema::builder()
        .model(&PRODUCT)
        .filter(
            "q",
            SearchingFilter::with_operators([
                ("title", Operator::Contains),
                ("description", Operator::Regexp),
            ]),
        )
        .build()
        .unwrap();

    let mut recorder = Recorder::default();
    let err = FilterSet::new(&schema, InputValues::new().with("q", "(unclosed"))
        .apply(&mut recorder)
        .unwrap_err();

    assert!(matches!(err, FilterError::InvalidValue { ref field, .. } if field == "description"));
    assert!(recorder.calls.is_empty());
}

#[test]
fn search_across_a_relationship_joins_once() {
    let schema = FilterSchema::builder()
        .model(&PRODUCT)
        .filter(
            "q",
            SearchingFilter::new(["^manufacturer.name", "manufacturer.country.name"]),
        )
        .build()
        .unwrap();

    let calls = record(&schema, InputValues::new().with("q", "Ac")).unwrap();
    assert_eq!(
        calls,
        vec![
            "join product.manufacturer -> manufacturer",
            "join manufacturer.country -> country",
            "filter (manufacturer.name STARTS WITH 'Ac' OR manufacturer.country.name CONTAINS 'Ac')",
        ]
    );
}

//
// Ordering
//

#[test]
fn ordering_maps_exposed_keys() {
    let input = InputValues::new().with("order", "-name");

    assert_eq!(
        record(&catalog(), input).unwrap(),
        vec!["order title DESC", "limit 100"]
    );
}

#[test]
fn ordering_accepts_lists_and_comma_text() {
    let listed = InputValues::new().with("order", vec!["price", "-name"]);
    let joined = InputValues::new().with("order", "price, -name");

    let expected = vec!["order price ASC, title DESC", "limit 100"];
    assert_eq!(record(&catalog(), listed).unwrap(), expected);
    assert_eq!(record(&catalog(), joined).unwrap(), expected);
}

#[test]
fn ordering_rejects_keys_outside_the_allow_list() {
    let input = InputValues::new().with("order", "bogus");

    assert_eq!(
        record(&catalog(), input),
        Err(FilterError::InvalidOrdering {
            key: "bogus".to_string()
        })
    );

    // the real field name is not an exposed key
    let input = InputValues::new().with("order", "title");
    assert!(matches!(
        record(&catalog(), input),
        Err(FilterError::InvalidOrdering { .. })
    ));
}

#[test]
fn ordering_default_applies_when_absent() {
    let schema = FilterSchema::builder()
        .filter(
            "order",
            OrderingFilter::mapped([("name", "title")]).with_default(["-name"]),
        )
        .build()
        .unwrap();

    assert_eq!(
        record(&schema, InputValues::new()).unwrap(),
        vec!["order title DESC"]
    );
    assert_eq!(
        record(&schema, InputValues::new().with("order", "name")).unwrap(),
        vec!["order title ASC"]
    );
}

//
// Offset and limit
//

#[test]
fn limit_uses_input_then_default_then_clamps() {
    let schema = FilterSchema::builder()
        .filter("limit", LimitFilter::new().with_default(100).maximum(500))
        .build()
        .unwrap();

    let limit = |input: InputValues| record(&schema, input).unwrap();

    assert_eq!(limit(InputValues::new().with("limit", 1000)), vec!["limit 500"]);
    assert_eq!(limit(InputValues::new()), vec!["limit 100"]);
    assert_eq!(limit(InputValues::new().with("limit", "50")), vec!["limit 50"]);
}

#[test]
fn limit_rejects_invalid_input() {
    let schema = FilterSchema::limit_offset().unwrap();

    assert!(matches!(
        record(&schema, InputValues::new().with("limit", -3)),
        Err(FilterError::InvalidValue { .. })
    ));
    assert!(matches!(
        record(&schema, InputValues::new().with("limit", "ten")),
        Err(FilterError::TypeMismatch { .. })
    ));
    assert!(matches!(
        record(&schema, InputValues::new().with("limit", 2.5)),
        Err(FilterError::TypeMismatch { .. })
    ));
}

#[test]
fn offset_is_validated_and_isolated() {
    let schema = FilterSchema::builder()
        .filter("offset", OffsetFilter::new())
        .build()
        .unwrap();

    assert!(matches!(
        record(&schema, InputValues::new().with("offset", -1)),
        Err(FilterError::InvalidValue { .. })
    ));
    assert_eq!(
        record(&schema, InputValues::new().with("offset", 5)).unwrap(),
        vec!["offset 5"]
    );
    assert!(record(&schema, InputValues::new()).unwrap().is_empty());
}

//
// Methods and context
//

#[test]
fn method_receives_terminal_name_coerced_value_and_context() {
    let schema = catalog();
    let input = InputValues::new().with("in_stock", "yes");
    let context = Context::new().with("threshold", 10);

    let calls = FilterSet::new(&schema, input)
        .with_context(context)
        .apply(Recorder::default())
        .unwrap()
        .calls;

    assert_eq!(calls, vec!["filter stock > 10", "limit 100"]);
}

#[test]
fn method_value_type_is_enforced() {
    let input = InputValues::new().with("in_stock", "maybe");

    assert!(matches!(
        record(&catalog(), input),
        Err(FilterError::TypeMismatch { .. })
    ));
}

//
// Model binding
//

#[test]
fn apply_model_starts_from_select_all() {
    let schema = catalog();
    let select: Select = FilterSet::new(&schema, InputValues::new())
        .apply_model()
        .unwrap();

    assert_eq!(select.model, Some("product"));
    assert_eq!(select.limit, Some(100));
}

#[test]
fn apply_model_needs_a_bound_schema() {
    let schema = FilterSchema::limit_offset().unwrap();
    let result = FilterSet::new(&schema, InputValues::new()).apply_model::<Select>();

    assert_eq!(result, Err(FilterError::Unbound));
}

#[test]
fn applied_plan_evaluates_against_rows() {
    let schema = catalog();
    let input = InputValues::new()
        .with("maker", "Acme")
        .with("order", "-price")
        .with("limit", 1);

    let select: Select = FilterSet::new(&schema, input).apply_model().unwrap();
    let rows = products();

    assert_eq!(titles(&select.execute(&rows)), vec!["Anvil"]);
}

//
// Typed filters
//

fn typed() -> FilterSchema {
    FilterSchema::builder()
        .model(&PRODUCT)
        .filter(
            "released_from",
            DateFilter::new().field("released").operator(Operator::Ge),
        )
        .filter(
            "updated_after",
            DateTimeFilter::new()
                .field("updated_at")
                .operator(Operator::Gt),
        )
        .filter(
            "opens_before",
            TimeFilter::new().field("opens").operator(Operator::Lt),
        )
        .filter("ids", UUIDFilter::new().field("id").operator(Operator::In))
        .filter("active", BooleanFilter::new())
        .build()
        .unwrap()
}

fn typed_titles(input: InputValues) -> Result<Vec<String>, FilterError> {
    let schema = typed();
    let select: Select = FilterSet::new(&schema, input).apply_model()?;

    Ok(titles(&select.execute(&products())))
}

fn rejects(key: &str, value: &str) -> bool {
    matches!(
        typed_titles(InputValues::new().with(key, value)),
        Err(FilterError::TypeMismatch { .. })
    )
}

#[test]
fn date_filter_compares_dates() {
    let input = InputValues::new().with("released_from", "2021-01-01");

    assert_eq!(typed_titles(input).unwrap(), vec!["Rocket Skates", "Bird Seed"]);
    assert!(rejects("released_from", "01/02/2021"));
}

#[test]
fn datetime_filter_accepts_naive_input_as_utc() {
    let input = InputValues::new().with("updated_after", "2024-05-01T12:00:00");

    assert_eq!(typed_titles(input).unwrap(), vec!["Rocket Skates", "Magnet"]);

    let input = InputValues::new().with("updated_after", "2024-05-02T14:00:00+02:00");
    assert_eq!(typed_titles(input).unwrap(), vec!["Rocket Skates", "Magnet"]);

    assert!(rejects("updated_after", "yesterday"));
}

#[test]
fn time_filter_compares_times() {
    let input = InputValues::new().with("opens_before", "09:00");
    assert_eq!(typed_titles(input).unwrap(), vec!["Anvil", "Bird Seed"]);

    let input = InputValues::new().with("opens_before", "10:00:00.75");
    assert_eq!(
        typed_titles(input).unwrap(),
        vec!["Anvil", "Rocket Skates", "Bird Seed", "Magnet"]
    );

    assert!(rejects("opens_before", "9am"));
}

#[test]
fn uuid_filter_matches_membership() {
    let ids = format!("{},{}", Uuid::from_u128(1), Uuid::from_u128(3));
    let input = InputValues::new().with("ids", ids);

    assert_eq!(typed_titles(input).unwrap(), vec!["Anvil", "Bird Seed"]);
    assert!(rejects("ids", "not-a-uuid"));
}

#[test]
fn boolean_filter_parses_flags() {
    let input = InputValues::new().with("active", "no");

    assert_eq!(typed_titles(input).unwrap(), vec!["Rocket Skates"]);
    assert!(rejects("active", "maybe"));
}

//
// Input maps
//

#[test]
fn input_values_from_json() {
    let input = InputValues::from_json(json!({ "title": "x", "limit": 5, "order": ["name"] }))
        .unwrap();

    assert_eq!(input.get("limit"), Some(&Value::Int(5)));
    assert_eq!(
        input.get("order"),
        Some(&Value::List(vec![Value::from("name")]))
    );
    assert!(InputValues::from_json(json!([1, 2])).is_err());
}

#[test]
fn input_values_collect_from_pairs() {
    let input: InputValues = [("title", "x"), ("maker", "Acme")].into_iter().collect();

    assert_eq!(input.len(), 2);
    assert_eq!(input.get("maker"), Some(&Value::from("Acme")));
}

//
// Properties
//

fn flat_schema() -> FilterSchema {
    FilterSchema::builder()
        .filter("a", CharFilter::new())
        .filter("b", NumberFilter::new().operator(Operator::Gt))
        .filter("c", CharFilter::new().operator(Operator::Contains))
        .filter("limit", LimitFilter::new())
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn exactly_one_predicate_per_present_key(
        a in proptest::option::of("[a-z]{1,8}"),
        b in proptest::option::of(0i64..1_000),
        c in proptest::option::of("[a-z]{1,8}"),
    ) {
        let mut input = InputValues::new();
        let mut expected = 0;
        if let Some(a) = a {
            input.insert("a", a);
            expected += 1;
        }
        if let Some(b) = b {
            input.insert("b", b);
            expected += 1;
        }
        if let Some(c) = c {
            input.insert("c", c);
            expected += 1;
        }

        let calls = record(&flat_schema(), input).unwrap();
        let filters = calls.iter().filter(|call| call.starts_with("filter ")).count();
        let limits = calls.iter().filter(|call| call.starts_with("limit ")).count();

        prop_assert_eq!(filters, expected);
        prop_assert_eq!(limits, 1);
    }

    #[test]
    fn unknown_key_always_fails(key in "[a-z]{3,8}", other in proptest::option::of("[a-z]{1,4}")) {
        prop_assume!(!["a", "b", "c", "limit"].contains(&key.as_str()));

        let mut input = InputValues::new().with(key.clone(), 1);
        if let Some(other) = other {
            input.insert("a", other);
        }

        prop_assert_eq!(
            record(&flat_schema(), input),
            Err(FilterError::UnknownParameter { name: key })
        );
    }
}
