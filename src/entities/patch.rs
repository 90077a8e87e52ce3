//! Typed partial updates
//!
//! Every mutable field is optional; absent fields are left untouched by
//! [`ProcurementRequest::apply_patch`](crate::entities::ProcurementRequest::apply_patch).
//! Unknown keys, including the immutable `id`, `createdAt` and `updatedAt`,
//! are rejected at decode time. `imagePath` is not patchable: it only ever
//! holds a location issued by the image store.

use crate::core::error::ValidationError;
use crate::core::timestamp;
use crate::entities::request::{Category, Checklist, Priority, Status};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RequestPatch {
    pub item_name_en: Option<String>,
    pub item_name_zh: Option<String>,
    pub category: Option<Category>,
    pub quantity: Option<String>,
    pub unit: Option<String>,
    pub estimated_price: Option<String>,
    pub supplier: Option<String>,
    pub priority: Option<Priority>,
    pub date_needed: Option<String>,
    pub requestor_name: Option<String>,
    pub department: Option<String>,
    pub comments: Option<String>,
    pub status: Option<Status>,
    pub checklist: Option<ChecklistPatch>,
    pub purchaser_notes: Option<String>,
    /// `None`: untouched, `Some(None)`: cleared
    #[serde(default, deserialize_with = "timestamp::double_option")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl RequestPatch {
    /// Required names may be replaced but not blanked
    pub fn validate(&self) -> Result<(), ValidationError> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());

        let mut missing = Vec::new();
        if blank(&self.item_name_en) {
            missing.push("itemNameEn");
        }
        if blank(&self.requestor_name) {
            missing.push("requestorName");
        }
        match ValidationError::missing(missing) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Checklist flags to change; the others keep their value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChecklistPatch {
    pub quote_obtained: Option<bool>,
    pub manager_approved: Option<bool>,
    pub order_placed: Option<bool>,
    pub payment_processed: Option<bool>,
    pub item_received: Option<bool>,
    pub invoice_filed: Option<bool>,
}

impl ChecklistPatch {
    pub fn apply(&self, checklist: &mut Checklist) {
        let pairs = [
            (self.quote_obtained, &mut checklist.quote_obtained),
            (self.manager_approved, &mut checklist.manager_approved),
            (self.order_placed, &mut checklist.order_placed),
            (self.payment_processed, &mut checklist.payment_processed),
            (self.item_received, &mut checklist.item_received),
            (self.invoice_filed, &mut checklist.invoice_filed),
        ];
        for (update, flag) in pairs {
            if let Some(value) = update {
                *flag = value;
            }
        }
    }
}
