//! Event submission drafts and their field validation.

use chrono::{DateTime, Utc};

use agendatico_core::recurrence::RecurrenceRule;
use agendatico_db::db::enums::PriceType;

pub const TITLE_MAX: usize = 255;
pub const DESCRIPTION_MAX: usize = 5000;
pub const ADDRESS_MAX: usize = 500;
pub const URL_MAX: usize = 255;
pub const PRICE_AMOUNT_MAX: usize = 100;

/// One validated-or-not event submission. A recurring draft carries its
/// transient rule here; nothing about the rule is ever persisted.
#[derive(Debug, Clone)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub category_id: i64,
    pub town_id: i64,
    pub place_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub organizer_name: Option<String>,
    pub price_type: PriceType,
    pub price_amount: Option<String>,
    pub image_path: Option<String>,
    pub instagram_url: Option<String>,
    pub whatsapp_url: Option<String>,
    pub website_url: Option<String>,
    pub recurrence: Option<RecurrenceRule>,
}

/// One per-field validation failure, keyed by the form field name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// ## Summary
/// Pure field validation for a draft, mirroring the publish form rules.
/// Referential checks (category/town/place existence) happen in the service
/// against the database; the recurrence ceiling is enforced separately so
/// its message can name the computed count.
#[must_use]
pub fn validate_fields(draft: &EventDraft, now: DateTime<Utc>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if draft.title.trim().is_empty() {
        errors.push(FieldError::new("title", "El título es obligatorio."));
    } else if draft.title.chars().count() > TITLE_MAX {
        errors.push(FieldError::new(
            "title",
            format!("El título no puede superar {TITLE_MAX} caracteres."),
        ));
    }

    if draft.description.trim().is_empty() {
        errors.push(FieldError::new(
            "description",
            "La descripción es obligatoria.",
        ));
    } else if draft.description.chars().count() > DESCRIPTION_MAX {
        errors.push(FieldError::new(
            "description",
            format!("La descripción no puede superar {DESCRIPTION_MAX} caracteres."),
        ));
    }

    if draft.starts_at < now {
        errors.push(FieldError::new("starts_at", "La fecha debe ser futura."));
    }

    if let Some(ends_at) = draft.ends_at
        && ends_at <= draft.starts_at
    {
        errors.push(FieldError::new(
            "ends_at",
            "La fecha de fin debe ser posterior al inicio.",
        ));
    }

    if let Some(address) = &draft.address
        && address.chars().count() > ADDRESS_MAX
    {
        errors.push(FieldError::new(
            "address",
            format!("La dirección no puede superar {ADDRESS_MAX} caracteres."),
        ));
    }

    if let Some(latitude) = draft.latitude
        && !(-90.0..=90.0).contains(&latitude)
    {
        errors.push(FieldError::new("latitude", "Latitud fuera de rango."));
    }

    if let Some(longitude) = draft.longitude
        && !(-180.0..=180.0).contains(&longitude)
    {
        errors.push(FieldError::new("longitude", "Longitud fuera de rango."));
    }

    if draft.price_type == PriceType::Paid
        && draft
            .price_amount
            .as_ref()
            .is_none_or(|amount| amount.trim().is_empty())
    {
        errors.push(FieldError::new(
            "price_amount",
            "Indica el precio del evento.",
        ));
    }

    if let Some(amount) = &draft.price_amount
        && amount.chars().count() > PRICE_AMOUNT_MAX
    {
        errors.push(FieldError::new(
            "price_amount",
            format!("El precio no puede superar {PRICE_AMOUNT_MAX} caracteres."),
        ));
    }

    for (field, value) in [
        ("instagram_url", &draft.instagram_url),
        ("whatsapp_url", &draft.whatsapp_url),
        ("website_url", &draft.website_url),
    ] {
        if let Some(url) = value
            && url.chars().count() > URL_MAX
        {
            errors.push(FieldError::new(
                field,
                format!("El enlace no puede superar {URL_MAX} caracteres."),
            ));
        }
    }

    if let Some(url) = &draft.website_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        errors.push(FieldError::new(
            "website_url",
            "El sitio web debe ser una URL válida.",
        ));
    }

    if let Some(rule) = &draft.recurrence
        && rule.end_date <= draft.starts_at.date_naive()
    {
        errors.push(FieldError::new(
            "recurrence_end_date",
            "La fecha final debe ser posterior al inicio.",
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use agendatico_core::recurrence::RecurrenceFrequency;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn base_draft() -> EventDraft {
        EventDraft {
            title: "Noche de Salsa".to_string(),
            description: "Baile en la playa".to_string(),
            category_id: 1,
            town_id: 1,
            place_id: None,
            starts_at: utc(2025, 6, 20, 19),
            ends_at: None,
            address: None,
            latitude: None,
            longitude: None,
            organizer_name: None,
            price_type: PriceType::Free,
            price_amount: None,
            image_path: None,
            instagram_url: None,
            whatsapp_url: None,
            website_url: None,
            recurrence: None,
        }
    }

    #[test]
    fn valid_draft_has_no_errors() {
        let errors = validate_fields(&base_draft(), utc(2025, 6, 1, 0));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn empty_title_is_rejected() {
        let draft = EventDraft {
            title: "   ".to_string(),
            ..base_draft()
        };
        let errors = validate_fields(&draft, utc(2025, 6, 1, 0));
        assert!(errors.iter().any(|e| e.field == "title"));
    }

    #[test]
    fn past_start_is_rejected() {
        let errors = validate_fields(&base_draft(), utc(2025, 7, 1, 0));
        assert!(errors.iter().any(|e| e.field == "starts_at"));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let draft = EventDraft {
            ends_at: Some(utc(2025, 6, 20, 18)),
            ..base_draft()
        };
        let errors = validate_fields(&draft, utc(2025, 6, 1, 0));
        assert!(errors.iter().any(|e| e.field == "ends_at"));
    }

    #[test]
    fn paid_event_requires_an_amount() {
        let draft = EventDraft {
            price_type: PriceType::Paid,
            ..base_draft()
        };
        let errors = validate_fields(&draft, utc(2025, 6, 1, 0));
        assert!(errors.iter().any(|e| e.field == "price_amount"));
    }

    #[test]
    fn donation_event_needs_no_amount() {
        let draft = EventDraft {
            price_type: PriceType::Donation,
            ..base_draft()
        };
        let errors = validate_fields(&draft, utc(2025, 6, 1, 0));
        assert!(errors.is_empty());
    }

    #[test]
    fn website_must_look_like_a_url() {
        let draft = EventDraft {
            website_url: Some("ftp://example.com".to_string()),
            ..base_draft()
        };
        let errors = validate_fields(&draft, utc(2025, 6, 1, 0));
        assert!(errors.iter().any(|e| e.field == "website_url"));
    }

    #[test]
    fn recurrence_end_must_follow_start() {
        let draft = EventDraft {
            recurrence: Some(RecurrenceRule {
                frequency: RecurrenceFrequency::Weekly,
                end_date: utc(2025, 6, 20, 0).date_naive(),
            }),
            ..base_draft()
        };
        let errors = validate_fields(&draft, utc(2025, 6, 1, 0));
        assert!(errors.iter().any(|e| e.field == "recurrence_end_date"));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let draft = EventDraft {
            latitude: Some(95.0),
            longitude: Some(-200.0),
            ..base_draft()
        };
        let errors = validate_fields(&draft, utc(2025, 6, 1, 0));
        assert!(errors.iter().any(|e| e.field == "latitude"));
        assert!(errors.iter().any(|e| e.field == "longitude"));
    }
}
