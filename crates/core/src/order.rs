use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::status::OrderStatus;

/// Color mode requested for a print job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Black and white.
    #[default]
    Bw,
    /// Full color.
    Color,
}

impl ColorMode {
    /// Stable lowercase name, matching the stored column value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bw => "bw",
            Self::Color => "color",
        }
    }
}

impl std::str::FromStr for ColorMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bw" => Ok(Self::Bw),
            "color" => Ok(Self::Color),
            other => Err(ValidationError::UnknownValue {
                field: "color_mode",
                value: other.to_owned(),
            }),
        }
    }
}

/// Single- or double-sided printing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintSides {
    #[default]
    Single,
    Double,
}

impl PrintSides {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
        }
    }
}

impl std::str::FromStr for PrintSides {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            other => Err(ValidationError::UnknownValue {
                field: "print_sides",
                value: other.to_owned(),
            }),
        }
    }
}

/// One print job, as persisted.
///
/// The field layout is the row contract shared by every storage backend.
/// The file fields reference content in external blob storage; this core
/// never touches file bytes. Orders are never physically deleted —
/// cancellation is a terminal status, not a delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier, assigned at creation.
    pub id: Uuid,
    /// Owning identity: an authenticated user id or a generated guest id.
    /// Opaque to this core.
    pub user_id: String,
    /// Email claim from the identity provider, when known.
    pub user_email: Option<String>,
    /// Whether the owning identity is a locally generated guest id.
    pub is_guest: bool,
    /// Location of the uploaded file in blob storage.
    pub file_url: String,
    pub file_name: String,
    /// MIME type of the uploaded file.
    pub file_type: String,
    /// File size in bytes, when the uploader reported it.
    pub file_size: Option<i64>,
    /// Number of copies. Always positive.
    pub quantity: i32,
    pub color_mode: ColorMode,
    pub print_sides: PrintSides,
    /// Free-text instructions from the customer.
    pub notes: Option<String>,
    pub status: OrderStatus,
    /// Populated if and only if `status` is [`OrderStatus::Cancelled`].
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Bumped on every mutation; never less than `created_at`.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an order: everything in [`Order`] except the fields
/// the system assigns (id, status, cancellation reason, timestamps).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderDraft {
    pub user_id: String,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub is_guest: bool,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    #[serde(default)]
    pub file_size: Option<i64>,
    /// Defaults to 1 when omitted.
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub color_mode: ColorMode,
    #[serde(default)]
    pub print_sides: PrintSides,
    #[serde(default)]
    pub notes: Option<String>,
}

impl OrderDraft {
    /// Check required fields and apply defaults.
    ///
    /// Rejects a missing owning identity or file reference, and a
    /// non-positive quantity. An omitted quantity defaults to 1.
    pub fn validate(self) -> Result<ValidOrderDraft, ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingField("user_id"));
        }
        if self.file_url.trim().is_empty() {
            return Err(ValidationError::MissingField("file_url"));
        }
        if self.file_name.trim().is_empty() {
            return Err(ValidationError::MissingField("file_name"));
        }
        if self.file_type.trim().is_empty() {
            return Err(ValidationError::MissingField("file_type"));
        }
        let quantity = self.quantity.unwrap_or(1);
        if quantity < 1 {
            return Err(ValidationError::NonPositiveQuantity(quantity));
        }
        Ok(ValidOrderDraft {
            user_id: self.user_id,
            user_email: self.user_email,
            is_guest: self.is_guest,
            file_url: self.file_url,
            file_name: self.file_name,
            file_type: self.file_type,
            file_size: self.file_size,
            quantity,
            color_mode: self.color_mode,
            print_sides: self.print_sides,
            notes: self.notes,
        })
    }
}

/// An [`OrderDraft`] that passed validation. Only this type reaches the
/// store, so backends never re-check field presence.
#[derive(Debug, Clone)]
pub struct ValidOrderDraft {
    pub user_id: String,
    pub user_email: Option<String>,
    pub is_guest: bool,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: Option<i64>,
    pub quantity: i32,
    pub color_mode: ColorMode,
    pub print_sides: PrintSides,
    pub notes: Option<String>,
}

impl ValidOrderDraft {
    /// Materialize the pending row a backend should persist, with a fresh
    /// id and the given creation timestamp.
    #[must_use]
    pub fn into_order(self, now: DateTime<Utc>) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            user_email: self.user_email,
            is_guest: self.is_guest,
            file_url: self.file_url,
            file_name: self.file_name,
            file_type: self.file_type,
            file_size: self.file_size,
            quantity: self.quantity,
            color_mode: self.color_mode,
            print_sides: self.print_sides,
            notes: self.notes,
            status: OrderStatus::Pending,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OrderDraft {
        OrderDraft {
            user_id: "user-1".into(),
            file_url: "https://blobs.example/report.pdf".into(),
            file_name: "report.pdf".into(),
            file_type: "application/pdf".into(),
            ..OrderDraft::default()
        }
    }

    #[test]
    fn valid_draft_applies_defaults() {
        let valid = draft().validate().unwrap();
        assert_eq!(valid.quantity, 1);
        assert_eq!(valid.color_mode, ColorMode::Bw);
        assert_eq!(valid.print_sides, PrintSides::Single);
    }

    #[test]
    fn into_order_starts_pending() {
        let now = Utc::now();
        let order = draft().validate().unwrap().into_order(now);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.cancellation_reason, None);
        assert_eq!(order.created_at, now);
        assert_eq!(order.updated_at, now);
    }

    #[test]
    fn missing_identity_rejected() {
        let mut d = draft();
        d.user_id = "  ".into();
        assert_eq!(
            d.validate().unwrap_err(),
            ValidationError::MissingField("user_id")
        );
    }

    #[test]
    fn missing_file_reference_rejected() {
        for field in ["file_url", "file_name", "file_type"] {
            let mut d = draft();
            match field {
                "file_url" => d.file_url.clear(),
                "file_name" => d.file_name.clear(),
                _ => d.file_type.clear(),
            }
            assert_eq!(d.validate().unwrap_err(), ValidationError::MissingField(field));
        }
    }

    #[test]
    fn non_positive_quantity_rejected() {
        let mut d = draft();
        d.quantity = Some(0);
        assert_eq!(
            d.clone().validate().unwrap_err(),
            ValidationError::NonPositiveQuantity(0)
        );
        d.quantity = Some(-3);
        assert!(d.validate().is_err());
    }

    #[test]
    fn draft_deserializes_with_defaults() {
        let d: OrderDraft = serde_json::from_str(
            r#"{
                "user_id": "guest-9",
                "file_url": "https://blobs.example/a.pdf",
                "file_name": "a.pdf",
                "file_type": "application/pdf"
            }"#,
        )
        .unwrap();
        let valid = d.validate().unwrap();
        assert_eq!(valid.quantity, 1);
        assert!(!valid.is_guest);
    }
}
