use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stable identifier for an asset across edits and restarts.
///
/// Assigned by the store when a record first enters the collection and
/// persisted as the trailing column of its line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(u64);

impl AssetId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }

    /// `None` once the id space is exhausted.
    pub(crate) fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AssetId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// One owned item as the user describes it.
///
/// Text fields are always present but may be empty. The purchase value is
/// kept as typed; it is never interpreted as a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub name: String,
    pub category: String,
    pub location: String,
    pub purchase_date: Option<NaiveDate>,
    pub description: String,
    pub purchase_value: String,
    pub warranty_expiration_date: Option<NaiveDate>,
}

impl AssetRecord {
    /// Creates a record with only a name; every other field is empty.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_purchase_value(mut self, value: impl Into<String>) -> Self {
        self.purchase_value = value.into();
        self
    }

    pub fn purchased_on(mut self, date: NaiveDate) -> Self {
        self.purchase_date = Some(date);
        self
    }

    pub fn warranty_until(mut self, date: NaiveDate) -> Self {
        self.warranty_expiration_date = Some(date);
        self
    }

    /// Case-insensitive substring match on the name.
    ///
    /// `folded_needle` must already be lowercased.
    pub(crate) fn name_contains(&self, folded_needle: &str) -> bool {
        self.name.to_lowercase().contains(folded_needle)
    }
}

/// A record together with its identity in the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: AssetId,
    #[serde(flatten)]
    pub record: AssetRecord,
}
