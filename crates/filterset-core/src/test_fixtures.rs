use crate::{
    model::{
        entity::EntityModel,
        field::{FieldKind, FieldModel},
    },
    value::Value,
};
use std::collections::BTreeMap;
use time::macros::{date, datetime, time};
use uuid::Uuid;

///
/// Test models
///
/// product -> manufacturer -> country, plus a handful of scalar kinds.
///

pub(crate) static COUNTRY: EntityModel = EntityModel::new("country", &COUNTRY_FIELDS);

static COUNTRY_FIELDS: [FieldModel; 2] = [
    FieldModel::new("name", FieldKind::Text),
    FieldModel::new("code", FieldKind::Text),
];

pub(crate) static MANUFACTURER: EntityModel =
    EntityModel::new("manufacturer", &MANUFACTURER_FIELDS);

static MANUFACTURER_FIELDS: [FieldModel; 3] = [
    FieldModel::new("name", FieldKind::Text),
    FieldModel::new("founded", FieldKind::Int),
    FieldModel::new("country", FieldKind::Relation { target: &COUNTRY }),
];

pub(crate) static PRODUCT: EntityModel = EntityModel::new("product", &PRODUCT_FIELDS);

static PRODUCT_FIELDS: [FieldModel; 11] = [
    FieldModel::new("id", FieldKind::Uuid),
    FieldModel::new("title", FieldKind::Text),
    FieldModel::new("description", FieldKind::Text),
    FieldModel::new("price", FieldKind::Float),
    FieldModel::new("stock", FieldKind::Int),
    FieldModel::new("released", FieldKind::Date),
    FieldModel::new("updated_at", FieldKind::DateTime),
    FieldModel::new("opens", FieldKind::Time),
    FieldModel::new("active", FieldKind::Bool),
    FieldModel::new("metadata", FieldKind::Unsupported),
    FieldModel::new(
        "manufacturer",
        FieldKind::Relation {
            target: &MANUFACTURER,
        },
    ),
];

pub(crate) type TestRow = BTreeMap<String, Value>;

pub(crate) fn row<const N: usize>(fields: [(&str, Value); N]) -> TestRow {
    fields
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// Products with joined manufacturer fields flattened under dotted keys.
pub(crate) fn products() -> Vec<TestRow> {
    vec![
        row([
            ("id", Uuid::from_u128(1).into()),
            ("title", "Anvil".into()),
            ("released", date!(2019 - 03 - 01).into()),
            ("updated_at", datetime!(2024-05-01 09:00 UTC).into()),
            ("opens", time!(08:00).into()),
            ("description", "Heavy iron anvil".into()),
            ("price", 120.0.into()),
            ("stock", 3.into()),
            ("active", true.into()),
            ("manufacturer.name", "Acme".into()),
        ]),
        row([
            ("id", Uuid::from_u128(2).into()),
            ("title", "Rocket Skates".into()),
            ("released", date!(2021 - 07 - 15).into()),
            ("updated_at", datetime!(2024-05-02 12:30 UTC).into()),
            ("opens", time!(09:30).into()),
            ("description", "Fast, mostly safe".into()),
            ("price", 80.5.into()),
            ("stock", 0.into()),
            ("active", false.into()),
            ("manufacturer.name", "Acme".into()),
        ]),
        row([
            ("id", Uuid::from_u128(3).into()),
            ("title", "Bird Seed".into()),
            ("released", date!(2023 - 01 - 10).into()),
            ("updated_at", datetime!(2024-04-20 18:00 UTC).into()),
            ("opens", time!(07:00).into()),
            ("description", "Premium seed mix".into()),
            ("price", 4.25.into()),
            ("stock", 250.into()),
            ("active", true.into()),
            ("manufacturer.name", "Roadrunner Farms".into()),
        ]),
        row([
            ("id", Uuid::from_u128(4).into()),
            ("title", "Magnet".into()),
            ("released", date!(2020 - 11 - 05).into()),
            ("updated_at", datetime!(2024-05-03 10:00:00.5 UTC).into()),
            ("opens", time!(10:00:00.5).into()),
            ("description", Value::Null),
            ("price", 15.0.into()),
            ("stock", 40.into()),
            ("active", true.into()),
        ]),
    ]
}
