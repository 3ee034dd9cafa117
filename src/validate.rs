use std::collections::BTreeMap;

use crate::format::phone_digits;
use crate::models::{ClientRecord, LeadRecord};

/// Field name to human-readable message, rendered inline by the forms.
pub type FieldErrors = BTreeMap<&'static str, String>;

fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message.to_string());
    }
}

fn check_phone(errors: &mut FieldErrors, phone: &str) {
    if phone.trim().is_empty() {
        errors.insert("phone", "Phone is required".to_string());
        return;
    }

    let digits = phone_digits(phone);
    if digits.len() != 10 && digits.len() != 11 {
        errors.insert(
            "phone",
            "Phone must have 10 or 11 digits".to_string(),
        );
    }
}

/// Validate a client record before submission.
pub fn validate_client(record: &ClientRecord) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    require(&mut errors, "name", &record.name, "Name is required");
    check_phone(&mut errors, &record.phone);
    require(&mut errors, "product", &record.product, "Product is required");

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Validate a lead record before submission.
pub fn validate_lead(record: &LeadRecord) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    require(&mut errors, "name", &record.name, "Name is required");
    check_phone(&mut errors, &record.phone);
    require(&mut errors, "interest", &record.interest, "Interest is required");

    // A reminder date without a reason is a row nobody can act on.
    if record.reminder_date.is_some() && record.reminder_reason.trim().is_empty() {
        errors.insert(
            "reminder_reason",
            "Reminder reason is required when a reminder date is set".to_string(),
        );
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn empty_client_reports_every_required_field() {
        let record = ClientRecord::new();
        let errors = validate_client(&record).unwrap_err();

        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("phone"));
        assert!(errors.contains_key("product"));
    }

    #[test]
    fn complete_client_passes() {
        let mut record = ClientRecord::new();
        record.name = "Maria Silva".to_string();
        record.phone = "11987654321".to_string();
        record.product = "Kit festa".to_string();

        assert!(validate_client(&record).is_ok());
    }

    #[test]
    fn short_phone_is_rejected() {
        let mut record = ClientRecord::new();
        record.name = "Maria Silva".to_string();
        record.phone = "1234".to_string();
        record.product = "Kit festa".to_string();

        let errors = validate_client(&record).unwrap_err();
        assert!(errors["phone"].contains("10 or 11"));
    }

    #[test]
    fn masked_phone_counts_digits_only() {
        let mut record = ClientRecord::new();
        record.name = "Maria Silva".to_string();
        record.phone = "(11) 98765-4321".to_string();
        record.product = "Kit festa".to_string();

        assert!(validate_client(&record).is_ok());
    }

    #[test]
    fn empty_lead_reports_required_fields() {
        let errors = validate_lead(&LeadRecord::new()).unwrap_err();

        assert!(errors.contains_key("name"));
        assert!(errors.contains_key("phone"));
        assert!(errors.contains_key("interest"));
        assert!(!errors.contains_key("reminder_reason"));
    }

    #[test]
    fn reminder_date_requires_a_reason() {
        let mut record = LeadRecord::new();
        record.name = "João".to_string();
        record.phone = "11987654321".to_string();
        record.interest = "Bolos".to_string();
        record.reminder_date = NaiveDate::from_ymd_opt(2025, 1, 10);

        let errors = validate_lead(&record).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains_key("reminder_reason"));

        record.reminder_reason = "Retornar ligação".to_string();
        assert!(validate_lead(&record).is_ok());
    }
}
