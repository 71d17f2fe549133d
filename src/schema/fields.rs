use crate::core::types::Record;

/// Record fields that feed the text index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextField {
    Name,
    SourceDetail,
    Zone,
    Tags,
}

impl TextField {
    /// Raw field values of a record; absent optional fields yield nothing
    pub fn values<'a>(&self, record: &'a Record) -> Vec<&'a str> {
        match self {
            TextField::Name => vec![record.name.as_str()],
            TextField::SourceDetail => vec![record.source_detail.as_str()],
            TextField::Zone => record.zone.as_deref().into_iter().collect(),
            TextField::Tags => record.tags().iter().map(String::as_str).collect(),
        }
    }
}

/// Field definition with its ranking weight
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub field: TextField,
    pub weight: f32,
}

/// Which fields are searchable and how much a hit in each is worth
#[derive(Debug, Clone)]
pub struct SearchSchema {
    pub fields: Vec<FieldDefinition>,
}

impl SearchSchema {
    pub fn new() -> Self {
        SearchSchema { fields: Vec::new() }
    }

    pub fn add_text_field(mut self, field: TextField, weight: f32) -> Self {
        self.fields.retain(|f| f.field != field);
        self.fields.push(FieldDefinition { field, weight });
        self
    }

    /// Name outranks the source text, which outranks zone, then tags
    pub fn mounts() -> Self {
        SearchSchema::new()
            .add_text_field(TextField::Name, 4.0)
            .add_text_field(TextField::SourceDetail, 3.0)
            .add_text_field(TextField::Zone, 2.0)
            .add_text_field(TextField::Tags, 1.0)
    }

    pub fn weight(&self, field: TextField) -> f32 {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.weight)
            .unwrap_or(0.0)
    }
}

impl Default for SearchSchema {
    fn default() -> Self {
        Self::mounts()
    }
}
