use crate::{
    filter::{FilterDef, FilterKind},
    query::Operator,
    value::ScalarType,
};
use serde::Serialize;

///
/// FilterDoc
///
/// Serializable description of one filter, for API documentation.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct FilterDoc {
    pub name: String,
    pub form: &'static str,
    pub field: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ScalarType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<Operator>,

    /// Search fields, or accepted ordering keys.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<u64>,
}

impl FilterDoc {
    pub(crate) fn from_def(def: &FilterDef) -> Self {
        let mut doc = Self {
            name: def.name().to_string(),
            form: def.form(),
            field: def.field_path().to_string(),
            description: def.description().to_string(),
            value_type: def.declared_type(),
            operator: None,
            allowed: Vec::new(),
            default: None,
            maximum: None,
        };

        match def.kind() {
            FilterKind::Value { .. } => doc.operator = Some(def.operator()),
            FilterKind::Method { .. } | FilterKind::Offset => {}
            FilterKind::Search(spec) => {
                doc.allowed = spec
                    .fields
                    .iter()
                    .map(|(path, op)| format!("{path} ({op})"))
                    .collect();
            }
            FilterKind::Ordering(spec) => {
                // each key is accepted bare or `-` prefixed
                doc.allowed = spec
                    .fields
                    .iter()
                    .flat_map(|(key, _)| [key.clone(), format!("-{key}")])
                    .collect();
                if !spec.default.is_empty() {
                    doc.default = Some(spec.default.join(","));
                }
            }
            FilterKind::Limit(spec) => {
                doc.default = Some(spec.default.to_string());
                doc.maximum = spec.maximum;
            }
        }

        doc
    }
}
