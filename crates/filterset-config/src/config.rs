use crate::{
    error::ConfigError,
    registry::{MethodRegistry, ModelRegistry},
};
use filterset_core::{
    filter::{
        BooleanFilter, CharFilter, DateFilter, DateTimeFilter, Filter, FilterDef, LimitFilter,
        MethodFilter, NumberFilter, OffsetFilter, OrderingFilter, SearchingFilter, TimeFilter,
        UUIDFilter,
    },
    query::Operator,
    schema::FilterSchema,
    value::ScalarType,
};
use serde::Deserialize;

///
/// SchemaConfig
///
/// Top-level config document. `[[filter]]` tables keep their order.
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    /// Registered model name to bind to.
    #[serde(default)]
    pub model: Option<String>,

    /// Model fields that get generic `eq` filters.
    #[serde(default)]
    pub fields: Vec<String>,

    /// Inherit the preset `limit` / `offset` filters.
    #[serde(default)]
    pub limit_offset: bool,

    #[serde(default, rename = "filter")]
    pub filters: Vec<FilterConfig>,
}

///
/// FilterConfig
///
/// One `[[filter]]` table. Kind-specific keys are rejected on kinds they do
/// not apply to.
///

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    pub name: String,
    pub kind: FilterKindConfig,

    #[serde(default)]
    pub field: Option<String>,

    #[serde(default)]
    pub operator: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub value_type: Option<ScalarType>,

    #[serde(default)]
    pub fields: Option<FieldsConfig>,

    #[serde(default)]
    pub default: Option<DefaultConfig>,

    #[serde(default)]
    pub maximum: Option<u64>,
}

///
/// FilterKindConfig
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum FilterKindConfig {
    Filter,
    Char,
    Number,
    DateTime,
    Time,
    Date,
    Bool,
    Uuid,
    Method,
    Search,
    Ordering,
    Offset,
    Limit,
}

impl FilterKindConfig {
    const fn accepts_operator(self) -> bool {
        !matches!(
            self,
            Self::Method | Self::Search | Self::Ordering | Self::Offset | Self::Limit
        )
    }
}

///
/// FieldsConfig
///
/// Search: list of paths (with `^`/`=` prefixes) or a path → operator table.
/// Ordering: list of paths or an exposed key → path table.
/// Tables keep their declared order.
///

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldsConfig {
    List(Vec<String>),
    Table(toml::Table),
}

///
/// DefaultConfig
///
/// `default` is a page size for limits and a key list for orderings.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum DefaultConfig {
    Limit(u64),
    Keys(Vec<String>),
}

// Field and description setters shared by every declaration form.
macro_rules! with_common {
    ($form:expr, $config:expr) => {{
        let mut form = $form;
        if let Some(field) = &$config.field {
            form = form.field(field);
        }
        if let Some(description) = &$config.description {
            form = form.description(description.clone());
        }
        FilterDef::from(form)
    }};
}

impl SchemaConfig {
    /// Resolve registry references and build the schema.
    pub fn build(
        &self,
        models: &ModelRegistry,
        methods: &MethodRegistry,
    ) -> Result<FilterSchema, ConfigError> {
        let mut builder = FilterSchema::builder();

        if let Some(name) = &self.model {
            let model = models
                .get(name)
                .ok_or_else(|| ConfigError::UnknownModel { name: name.clone() })?;
            builder = builder.model(model);
        }
        if self.limit_offset {
            builder = builder.extend(&FilterSchema::limit_offset()?);
        }
        if !self.fields.is_empty() {
            builder = builder.fields(self.fields.iter().cloned());
        }
        for filter in &self.filters {
            builder = builder.filter(filter.name.clone(), filter.to_def(methods)?);
        }

        let schema = builder.build()?;
        tracing::debug!(
            model = self.model.as_deref().unwrap_or("<unbound>"),
            filters = schema.len(),
            "filter schema loaded from config"
        );

        Ok(schema)
    }
}

impl FilterConfig {
    fn to_def(&self, methods: &MethodRegistry) -> Result<FilterDef, ConfigError> {
        self.check_keys()?;

        let operator = self.operator()?;
        let def = match self.kind {
            FilterKindConfig::Filter => with_common!(Filter::new().operator(operator), self),
            FilterKindConfig::Char => with_common!(CharFilter::new().operator(operator), self),
            FilterKindConfig::Number => with_common!(NumberFilter::new().operator(operator), self),
            FilterKindConfig::DateTime => {
                with_common!(DateTimeFilter::new().operator(operator), self)
            }
            FilterKindConfig::Time => with_common!(TimeFilter::new().operator(operator), self),
            FilterKindConfig::Date => with_common!(DateFilter::new().operator(operator), self),
            FilterKindConfig::Bool => with_common!(BooleanFilter::new().operator(operator), self),
            FilterKindConfig::Uuid => with_common!(UUIDFilter::new().operator(operator), self),

            FilterKindConfig::Method => {
                let name = self
                    .method
                    .as_deref()
                    .ok_or_else(|| ConfigError::invalid(&self.name, "method filters need `method`"))?;
                let method = methods.get(name).ok_or_else(|| ConfigError::UnknownMethod {
                    filter: self.name.clone(),
                    method: name.to_string(),
                })?;

                let mut form = MethodFilter::new(method);
                if let Some(ty) = self.value_type {
                    form = form.value_type(ty);
                }
                with_common!(form, self)
            }

            FilterKindConfig::Search => {
                let form = match self.required_fields()? {
                    FieldsConfig::List(paths) => SearchingFilter::new(paths),
                    FieldsConfig::Table(table) => {
                        let fields = self
                            .string_pairs(table)?
                            .into_iter()
                            .map(|(path, op)| Ok((path, self.parse_operator(op)?)))
                            .collect::<Result<Vec<_>, ConfigError>>()?;
                        SearchingFilter::with_operators(fields)
                    }
                };
                with_common!(form, self)
            }

            FilterKindConfig::Ordering => {
                let mut form = match self.required_fields()? {
                    FieldsConfig::List(paths) => OrderingFilter::new(paths),
                    FieldsConfig::Table(table) => OrderingFilter::mapped(self.string_pairs(table)?),
                };
                match &self.default {
                    Some(DefaultConfig::Keys(keys)) => form = form.with_default(keys.clone()),
                    Some(DefaultConfig::Limit(_)) => {
                        return Err(ConfigError::invalid(
                            &self.name,
                            "ordering `default` must be a list of keys",
                        ));
                    }
                    None => {}
                }
                with_common!(form, self)
            }

            FilterKindConfig::Offset => with_common!(OffsetFilter::new(), self),

            FilterKindConfig::Limit => {
                let mut form = LimitFilter::new();
                match &self.default {
                    Some(DefaultConfig::Limit(limit)) => form = form.with_default(*limit),
                    Some(DefaultConfig::Keys(_)) => {
                        return Err(ConfigError::invalid(
                            &self.name,
                            "limit `default` must be an integer",
                        ));
                    }
                    None => {}
                }
                if let Some(maximum) = self.maximum {
                    form = form.maximum(maximum);
                }
                with_common!(form, self)
            }
        };

        Ok(def)
    }

    // Reject keys the kind would silently ignore.
    fn check_keys(&self) -> Result<(), ConfigError> {
        let kind = self.kind;
        let unexpected = [
            ("operator", self.operator.is_some() && !kind.accepts_operator()),
            (
                "method",
                self.method.is_some() && kind != FilterKindConfig::Method,
            ),
            (
                "value_type",
                self.value_type.is_some() && kind != FilterKindConfig::Method,
            ),
            (
                "fields",
                self.fields.is_some()
                    && !matches!(kind, FilterKindConfig::Search | FilterKindConfig::Ordering),
            ),
            (
                "default",
                self.default.is_some()
                    && !matches!(kind, FilterKindConfig::Ordering | FilterKindConfig::Limit),
            ),
            (
                "maximum",
                self.maximum.is_some() && kind != FilterKindConfig::Limit,
            ),
        ];

        match unexpected.iter().find(|(_, present)| *present) {
            Some((key, _)) => Err(ConfigError::invalid(
                &self.name,
                format!("`{key}` does not apply to {kind:?} filters"),
            )),
            None => Ok(()),
        }
    }

    fn operator(&self) -> Result<Operator, ConfigError> {
        self.operator
            .as_deref()
            .map_or(Ok(Operator::default()), |op| self.parse_operator(op))
    }

    fn parse_operator(&self, op: &str) -> Result<Operator, ConfigError> {
        op.parse().map_err(|source| ConfigError::Operator {
            filter: self.name.clone(),
            source,
        })
    }

    // `fields` tables map strings to strings, in declared order.
    fn string_pairs<'t>(
        &self,
        table: &'t toml::Table,
    ) -> Result<Vec<(&'t str, &'t str)>, ConfigError> {
        table
            .iter()
            .map(|(key, value)| {
                value.as_str().map(|value| (key.as_str(), value)).ok_or_else(|| {
                    ConfigError::invalid(
                        &self.name,
                        format!("`fields.{key}` must be a string, found {}", value.type_str()),
                    )
                })
            })
            .collect()
    }

    fn required_fields(&self) -> Result<&FieldsConfig, ConfigError> {
        self.fields
            .as_ref()
            .ok_or_else(|| ConfigError::invalid(&self.name, "`fields` is required"))
    }
}
