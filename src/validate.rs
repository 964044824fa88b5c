use std::collections::BTreeMap;

use crate::model::{Field, InvoiceDraft, parse_number};

/// Field → message. Fields without an error have no entry; iteration follows
/// form order.
pub type ErrorMap = BTreeMap<Field, String>;

const MIN_NAME_LEN: usize = 3;

/// Checks a single value. The draft supplies sibling state, which only
/// matters for the shipping fields.
pub fn validate_field(field: Field, value: &str, draft: &InvoiceDraft) -> Option<String> {
    let value = value.trim();

    if field.is_shipping() && draft.is_shipping_same_as_billing {
        return None;
    }

    match field {
        Field::Quantity => positive_number("Quantity", value),
        Field::PriceAfterTax => positive_number("Price", value),
        Field::SgstPercent => percentage("SGST", value),
        Field::CgstPercent => percentage("CGST", value),
        Field::IgstPercent => percentage("IGST", value),
        Field::VehicleNo => required(value, "Vehicle number is required"),
        Field::Gstin => None,
        Field::BillingName | Field::ShippingName => {
            if value.is_empty() {
                Some("Name is required".to_string())
            } else if value.chars().count() < MIN_NAME_LEN {
                Some("Name too short".to_string())
            } else {
                None
            }
        }
        Field::BillingAddrLine1
        | Field::BillingAddrLine2
        | Field::BillingStateCode
        | Field::ShippingAddrLine1
        | Field::ShippingAddrLine2
        | Field::ShippingStateCode => required(value, "This field is required"),
        Field::Password => required(value, "Password is required"),
    }
}

/// Wholesale check used by the Details → Review gate. GSTIN is skipped.
pub fn validate_all(draft: &InvoiceDraft) -> ErrorMap {
    Field::ALL
        .iter()
        .copied()
        .filter(|field| *field != Field::Gstin)
        .filter_map(|field| {
            validate_field(field, draft.value(field), draft).map(|message| (field, message))
        })
        .collect()
}

/// Joins every message, one per line, in form order.
pub fn summarize(errors: &ErrorMap) -> String {
    errors.values().cloned().collect::<Vec<_>>().join("\n")
}

fn required(value: &str, message: &str) -> Option<String> {
    value.is_empty().then(|| message.to_string())
}

fn positive_number(label: &str, value: &str) -> Option<String> {
    if value.is_empty() {
        return Some(format!("{label} is required"));
    }
    match parse_number(value) {
        None => Some(format!("{label} must be a number")),
        Some(n) if n <= 0.0 => Some(format!("{label} must be positive")),
        Some(_) => None,
    }
}

fn percentage(label: &str, value: &str) -> Option<String> {
    if value.is_empty() {
        return Some(format!("{label} is required"));
    }
    match parse_number(value) {
        None => Some(format!("{label} must be a number")),
        Some(n) if !(0.0..=100.0).contains(&n) => Some("Must be between 0-100".to_string()),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn complete() -> InvoiceDraft {
        InvoiceDraft {
            quantity: "1250".into(),
            price_after_tax: "4.00".into(),
            sgst_percent: "6".into(),
            cgst_percent: "6".into(),
            igst_percent: "0".into(),
            vehicle_no: "OR 16D 8410".into(),
            billing_name: "ABC Constructions".into(),
            billing_addr_line1: "Bisra".into(),
            billing_addr_line2: "Sundergarh".into(),
            billing_state_code: "Odisha, 770036".into(),
            password: "secret".into(),
            ..InvoiceDraft::default()
        }
    }

    #[rstest]
    #[case(Field::Quantity, "", Some("Quantity is required"))]
    #[case(Field::Quantity, "   ", Some("Quantity is required"))]
    #[case(Field::Quantity, "0", Some("Quantity must be positive"))]
    #[case(Field::Quantity, "-3", Some("Quantity must be positive"))]
    #[case(Field::Quantity, "ten", Some("Quantity must be a number"))]
    #[case(Field::Quantity, "0.5", None)]
    #[case(Field::Quantity, "1250", None)]
    #[case(Field::PriceAfterTax, "", Some("Price is required"))]
    #[case(Field::PriceAfterTax, "0", Some("Price must be positive"))]
    #[case(Field::PriceAfterTax, "4.00", None)]
    fn numeric_fields(#[case] field: Field, #[case] value: &str, #[case] expected: Option<&str>) {
        let draft = InvoiceDraft::default();
        assert_eq!(validate_field(field, value, &draft).as_deref(), expected);
    }

    #[rstest]
    #[case(Field::SgstPercent, "", Some("SGST is required"))]
    #[case(Field::CgstPercent, "", Some("CGST is required"))]
    #[case(Field::IgstPercent, "", Some("IGST is required"))]
    #[case(Field::SgstPercent, "-0.1", Some("Must be between 0-100"))]
    #[case(Field::CgstPercent, "100.5", Some("Must be between 0-100"))]
    #[case(Field::IgstPercent, "x", Some("IGST must be a number"))]
    #[case(Field::SgstPercent, "0", None)]
    #[case(Field::CgstPercent, "100", None)]
    #[case(Field::IgstPercent, "18", None)]
    fn percent_fields(#[case] field: Field, #[case] value: &str, #[case] expected: Option<&str>) {
        let draft = InvoiceDraft::default();
        assert_eq!(validate_field(field, value, &draft).as_deref(), expected);
    }

    #[rstest]
    #[case("", Some("Name is required"))]
    #[case("AB", Some("Name too short"))]
    #[case(" AB ", Some("Name too short"))]
    #[case("ABC", None)]
    fn billing_name(#[case] value: &str, #[case] expected: Option<&str>) {
        let draft = InvoiceDraft::default();
        assert_eq!(validate_field(Field::BillingName, value, &draft).as_deref(), expected);
    }

    #[test]
    fn text_fields_require_a_value() {
        let draft = InvoiceDraft::default();
        assert_eq!(
            validate_field(Field::VehicleNo, "", &draft).as_deref(),
            Some("Vehicle number is required")
        );
        assert_eq!(
            validate_field(Field::BillingAddrLine2, "", &draft).as_deref(),
            Some("This field is required")
        );
        assert_eq!(
            validate_field(Field::Password, "", &draft).as_deref(),
            Some("Password is required")
        );
        assert_eq!(validate_field(Field::BillingStateCode, "Odisha", &draft), None);
    }

    #[test]
    fn gstin_is_always_optional() {
        let draft = InvoiceDraft::default();
        assert_eq!(validate_field(Field::Gstin, "", &draft), None);
        assert_eq!(validate_field(Field::Gstin, "not-a-gstin", &draft), None);
    }

    #[test]
    fn shipping_fields_exempt_while_same_as_billing() {
        let mut draft = InvoiceDraft::default();
        assert_eq!(validate_field(Field::ShippingName, "", &draft), None);
        assert_eq!(validate_field(Field::ShippingAddrLine1, "", &draft), None);

        draft.is_shipping_same_as_billing = false;
        assert_eq!(
            validate_field(Field::ShippingName, "", &draft).as_deref(),
            Some("Name is required")
        );
        assert_eq!(
            validate_field(Field::ShippingName, "AB", &draft).as_deref(),
            Some("Name too short")
        );
        assert_eq!(
            validate_field(Field::ShippingStateCode, "", &draft).as_deref(),
            Some("This field is required")
        );
    }

    #[test]
    fn complete_draft_has_no_errors() {
        assert!(validate_all(&complete()).is_empty());
    }

    #[test]
    fn empty_draft_reports_every_required_field_in_order() {
        let errors = validate_all(&InvoiceDraft::default());
        let fields: Vec<Field> = errors.keys().copied().collect();
        assert_eq!(
            fields,
            vec![
                Field::Quantity,
                Field::PriceAfterTax,
                Field::SgstPercent,
                Field::CgstPercent,
                Field::IgstPercent,
                Field::VehicleNo,
                Field::BillingName,
                Field::BillingAddrLine1,
                Field::BillingAddrLine2,
                Field::BillingStateCode,
                Field::Password,
            ]
        );
    }

    #[test]
    fn separate_shipping_address_is_checked() {
        let mut draft = complete();
        draft.is_shipping_same_as_billing = false;
        let errors = validate_all(&draft);
        assert_eq!(errors.get(&Field::ShippingName).map(String::as_str), Some("Name is required"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn summary_joins_with_newlines() {
        let mut draft = complete();
        draft.quantity.clear();
        draft.vehicle_no.clear();
        assert_eq!(
            summarize(&validate_all(&draft)),
            "Quantity is required\nVehicle number is required"
        );
    }
}
