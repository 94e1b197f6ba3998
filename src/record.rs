/// Server-assigned product key.
pub type RecordId = i64;

/// A persisted product row.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

impl Record {
    pub fn new(id: RecordId, name: impl Into<String>, unit_price: f64, quantity: i64) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            quantity,
        }
    }
}

/// A product that has not been stored yet and so has no key.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
}

impl NewRecord {
    pub fn new(name: impl Into<String>, unit_price: f64, quantity: i64) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Attach a key, e.g. to describe the replacement values of an update.
    pub fn with_id(self, id: RecordId) -> Record {
        Record {
            id,
            name: self.name,
            unit_price: self.unit_price,
            quantity: self.quantity,
        }
    }
}
