//! The procurement request record

use crate::core::error::ValidationError;
use crate::core::timestamp;
use crate::entities::patch::RequestPatch;
use crate::string_enum;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

string_enum!(
    /// Kind of item being requested
    Category,
    "category",
    default = Equipment,
    [Equipment, Ingredient, Consumable, Cleaning, Other]
);

string_enum!(
    /// How soon the item is needed
    Priority,
    "priority",
    default = Low,
    [Low, High, Urgent]
);

string_enum!(
    /// Purchasing status
    ///
    /// No transition graph is enforced: any value may replace any other.
    Status,
    "status",
    default = Pending,
    [Pending, Done, Approved, Ordered, Received, Cancelled]
);

/// Fixed purchasing checklist, every flag independent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Checklist {
    pub quote_obtained: bool,
    pub manager_approved: bool,
    pub order_placed: bool,
    pub payment_processed: bool,
    pub item_received: bool,
    pub invoice_filed: bool,
}

impl Checklist {
    /// Number of completed steps
    pub fn completed(&self) -> usize {
        [
            self.quote_obtained,
            self.manager_approved,
            self.order_placed,
            self.payment_processed,
            self.item_received,
            self.invoice_filed,
        ]
        .iter()
        .filter(|done| **done)
        .count()
    }
}

/// A stored procurement request
///
/// Serialized with camelCase keys, which is both the HTTP representation and
/// the document layout in the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcurementRequest {
    pub id: Uuid,

    // Item
    pub item_name_en: String,
    #[serde(default)]
    pub item_name_zh: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub estimated_price: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub date_needed: String,

    // Requester
    pub requestor_name: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub comments: String,

    /// Retrievable path or URL of the attached photo, empty when none
    #[serde(default)]
    pub image_path: String,

    // Purchasing
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub checklist: Checklist,
    #[serde(default)]
    pub purchaser_notes: String,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
    /// Never set automatically
    #[serde(default, with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProcurementRequest {
    /// Whether a photo is attached
    pub fn has_image(&self) -> bool {
        !self.image_path.is_empty()
    }

    /// Refresh `updated_at`, keeping it strictly increasing
    pub fn touch(&mut self) {
        self.updated_at = timestamp::advance(self.updated_at);
    }

    /// Merge a partial update into this record
    ///
    /// The patch is validated first; on error the record is left untouched.
    /// On success `updated_at` is refreshed, even for an empty patch.
    pub fn apply_patch(&mut self, patch: RequestPatch) -> Result<(), ValidationError> {
        patch.validate()?;

        let RequestPatch {
            item_name_en,
            item_name_zh,
            category,
            quantity,
            unit,
            estimated_price,
            supplier,
            priority,
            date_needed,
            requestor_name,
            department,
            comments,
            status,
            checklist,
            purchaser_notes,
            completed_at,
        } = patch;

        if let Some(v) = item_name_en {
            self.item_name_en = v.trim().to_string();
        }
        if let Some(v) = item_name_zh {
            self.item_name_zh = v.trim().to_string();
        }
        if let Some(v) = category {
            self.category = v;
        }
        if let Some(v) = quantity {
            self.quantity = v;
        }
        if let Some(v) = unit {
            self.unit = v;
        }
        if let Some(v) = estimated_price {
            self.estimated_price = v;
        }
        if let Some(v) = supplier {
            self.supplier = v;
        }
        if let Some(v) = priority {
            self.priority = v;
        }
        if let Some(v) = date_needed {
            self.date_needed = v;
        }
        if let Some(v) = requestor_name {
            self.requestor_name = v.trim().to_string();
        }
        if let Some(v) = department {
            self.department = v;
        }
        if let Some(v) = comments {
            self.comments = v;
        }
        if let Some(v) = status {
            self.status = v;
        }
        if let Some(flags) = checklist {
            flags.apply(&mut self.checklist);
        }
        if let Some(v) = purchaser_notes {
            self.purchaser_notes = v;
        }
        if let Some(v) = completed_at {
            self.completed_at = v;
        }

        self.touch();
        Ok(())
    }
}
