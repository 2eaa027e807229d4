use bson::{Bson, Document};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The `1` / `-1` the wire format uses for key and sort directions.
    pub fn as_i32(self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }

    /// Accepts any numeric `1`/`-1` style value; anything negative is descending.
    pub fn from_bson(value: &Bson) -> Option<Self> {
        let n = match value {
            Bson::Int32(n) => *n as f64,
            Bson::Int64(n) => *n as f64,
            Bson::Double(n) => *n,
            _ => return None,
        };
        if n > 0.0 {
            Some(SortDirection::Asc)
        } else if n < 0.0 {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    pub fn to_document(sorts: &[Sort]) -> Document {
        let mut doc = Document::new();
        for sort in sorts {
            doc.insert(sort.field.clone(), sort.direction.as_i32());
        }
        doc
    }

    pub fn from_document(doc: &Document) -> Option<Vec<Sort>> {
        doc.iter()
            .map(|(field, value)| {
                SortDirection::from_bson(value).map(|direction| Sort {
                    field: field.clone(),
                    direction,
                })
            })
            .collect()
    }
}
