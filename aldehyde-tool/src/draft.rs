//! Editable text form of an asset's fields, shared by the CLI and the browser.

use aldehyde_assets::codec::{self, PURCHASE_DATE, WARRANTY_DATE};
use aldehyde_assets::{AssetRecord, NO_DATE};
use chrono::NaiveDate;

use crate::error::AldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Category,
    Location,
    PurchaseDate,
    Description,
    PurchaseValue,
    WarrantyDate,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Category,
        Field::Location,
        Field::PurchaseDate,
        Field::Description,
        Field::PurchaseValue,
        Field::WarrantyDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Category => "Category",
            Field::Location => "Location",
            Field::PurchaseDate => "Purchased",
            Field::Description => "Description",
            Field::PurchaseValue => "Value",
            Field::WarrantyDate => "Warranty until",
        }
    }

    pub fn is_date(self) -> bool {
        matches!(self, Field::PurchaseDate | Field::WarrantyDate)
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    values: [String; 7],
}

impl Draft {
    /// Dates without a value start out blank.
    pub fn from_record(record: &AssetRecord) -> Self {
        let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
        Self {
            values: [
                record.name.clone(),
                record.category.clone(),
                record.location.clone(),
                date(record.purchase_date),
                record.description.clone(),
                record.purchase_value.clone(),
                date(record.warranty_expiration_date),
            ],
        }
    }

    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        &mut self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    /// Builds the record, rejecting dates that are neither blank, the
    /// sentinel, nor `YYYY-MM-DD`.
    pub fn to_record(&self) -> Result<AssetRecord, AldError> {
        let text = |field: Field| self.get(field).trim().to_string();
        Ok(AssetRecord {
            name: text(Field::Name),
            category: text(Field::Category),
            location: text(Field::Location),
            purchase_date: parse_date_input(PURCHASE_DATE, self.get(Field::PurchaseDate))?,
            description: text(Field::Description),
            purchase_value: text(Field::PurchaseValue),
            warranty_expiration_date: parse_date_input(
                WARRANTY_DATE,
                self.get(Field::WarrantyDate),
            )?,
        })
    }
}

pub fn parse_date_input(field: &'static str, text: &str) -> Result<Option<NaiveDate>, AldError> {
    let text = text.trim();
    if text.is_empty() || text == NO_DATE {
        return Ok(None);
    }
    codec::parse_date(field, text).map_err(|_| AldError::InvalidDate {
        field,
        text: text.to_string(),
    })
}
