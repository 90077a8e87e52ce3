//! Input accepted when a new request is submitted

use crate::core::error::ValidationError;
use crate::core::timestamp;
use crate::entities::request::{Category, Checklist, Priority, ProcurementRequest, Status};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

/// Fields of a submission, before validation
///
/// Accepted either as a JSON body or assembled field by field from a
/// multipart form with [`NewRequest::set_form_field`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRequest {
    pub item_name_en: String,
    pub item_name_zh: String,
    pub category: Option<Category>,
    pub quantity: String,
    pub unit: String,
    pub estimated_price: String,
    pub supplier: String,
    pub priority: Option<Priority>,
    pub date_needed: String,
    pub requestor_name: String,
    pub department: String,
    pub comments: String,
    /// Set from the image store's output, never from the client body
    #[serde(skip)]
    pub image_path: String,
    pub status: Option<Status>,
    pub checklist: Checklist,
    pub purchaser_notes: String,
    #[serde(with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl NewRequest {
    /// Check required fields
    ///
    /// Enum fields are already typed, so only the two required names remain.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.item_name_en.trim().is_empty() {
            missing.push("itemNameEn");
        }
        if self.requestor_name.trim().is_empty() {
            missing.push("requestorName");
        }
        match ValidationError::missing(missing) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Validate and turn the submission into a fresh record
    ///
    /// Assigns a new id and sets `created_at == updated_at == now`.
    pub fn into_record(self) -> Result<ProcurementRequest, ValidationError> {
        self.validate()?;
        let now = timestamp::now();

        Ok(ProcurementRequest {
            id: Uuid::new_v4(),
            item_name_en: self.item_name_en.trim().to_string(),
            item_name_zh: self.item_name_zh.trim().to_string(),
            category: self.category.unwrap_or_default(),
            quantity: self.quantity,
            unit: self.unit,
            estimated_price: self.estimated_price,
            supplier: self.supplier,
            priority: self.priority.unwrap_or_default(),
            date_needed: self.date_needed,
            requestor_name: self.requestor_name.trim().to_string(),
            department: self.department,
            comments: self.comments,
            image_path: self.image_path,
            status: self.status.unwrap_or_default(),
            checklist: self.checklist,
            purchaser_notes: self.purchaser_notes,
            created_at: now,
            updated_at: now,
            completed_at: self.completed_at,
        })
    }

    /// Set one field from a text form value
    ///
    /// Returns `Ok(false)` when `name` is not a submission field. Blank enum
    /// values select the default. A `checklist` value that does not decode
    /// leaves the default checklist in place and is only logged: submissions
    /// are accepted with a malformed checklist rather than rejected.
    pub fn set_form_field(&mut self, name: &str, value: String) -> Result<bool, ValidationError> {
        match name {
            "itemNameEn" => self.item_name_en = value,
            "itemNameZh" => self.item_name_zh = value,
            "category" => self.category = parse_choice(&value)?,
            "quantity" => self.quantity = value,
            "unit" => self.unit = value,
            "estimatedPrice" => self.estimated_price = value,
            "supplier" => self.supplier = value,
            "priority" => self.priority = parse_choice(&value)?,
            "dateNeeded" => self.date_needed = value,
            "requestorName" => self.requestor_name = value,
            "department" => self.department = value,
            "comments" => self.comments = value,
            "status" => self.status = parse_choice(&value)?,
            "purchaserNotes" => self.purchaser_notes = value,
            "checklist" => match serde_json::from_str::<Checklist>(&value) {
                Ok(checklist) => self.checklist = checklist,
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring malformed checklist in submission");
                }
            },
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn parse_choice<T>(value: &str) -> Result<Option<T>, ValidationError>
where
    T: std::str::FromStr<Err = ValidationError>,
{
    let value = value.trim();
    if value.is_empty() {
        Ok(None)
    } else {
        value.parse().map(Some)
    }
}
