use crate::model::field::FieldModel;

///
/// EntityModel
/// Minimal runtime model for one entity.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Stable external name used in joins and diagnostics.
    pub name: &'static str,
    /// Ordered field list.
    pub fields: &'static [FieldModel],
}

impl EntityModel {
    #[must_use]
    pub const fn new(name: &'static str, fields: &'static [FieldModel]) -> Self {
        Self { name, fields }
    }

    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl PartialEq for EntityModel {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for EntityModel {}
