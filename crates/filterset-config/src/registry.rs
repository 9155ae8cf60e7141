use filterset_core::{filter::MethodFn, model::entity::EntityModel};
use std::{collections::BTreeMap, fmt};

///
/// ModelRegistry
///
/// Models a config may bind to, keyed by entity name.
///

#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: BTreeMap<&'static str, &'static EntityModel>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, model: &'static EntityModel) -> Self {
        self.register(model);
        self
    }

    pub fn register(&mut self, model: &'static EntityModel) {
        self.models.insert(model.name, model);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static EntityModel> {
        self.models.get(name).copied()
    }
}

///
/// MethodRegistry
///
/// Filter methods a config may reference by name. Lookup happens once, at
/// load time.
///

#[derive(Clone, Default)]
pub struct MethodRegistry {
    methods: BTreeMap<String, MethodFn>,
}

impl MethodRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, method: MethodFn) -> Self {
        self.register(name, method);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, method: MethodFn) {
        self.methods.insert(name.into(), method);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<MethodFn> {
        self.methods.get(name).copied()
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.methods.keys()).finish()
    }
}
