use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Every text-entered field of the form, in the order it is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Quantity,
    PriceAfterTax,
    SgstPercent,
    CgstPercent,
    IgstPercent,
    VehicleNo,
    Gstin,
    BillingName,
    BillingAddrLine1,
    BillingAddrLine2,
    BillingStateCode,
    ShippingName,
    ShippingAddrLine1,
    ShippingAddrLine2,
    ShippingStateCode,
    Password,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Quantity,
        Field::PriceAfterTax,
        Field::SgstPercent,
        Field::CgstPercent,
        Field::IgstPercent,
        Field::VehicleNo,
        Field::Gstin,
        Field::BillingName,
        Field::BillingAddrLine1,
        Field::BillingAddrLine2,
        Field::BillingStateCode,
        Field::ShippingName,
        Field::ShippingAddrLine1,
        Field::ShippingAddrLine2,
        Field::ShippingStateCode,
        Field::Password,
    ];

    /// Key used in the JSON body and in draft files.
    pub fn key(self) -> &'static str {
        match self {
            Field::Quantity => "quantity",
            Field::PriceAfterTax => "price_after_tax",
            Field::SgstPercent => "sgst_percent",
            Field::CgstPercent => "cgst_percent",
            Field::IgstPercent => "igst_percent",
            Field::VehicleNo => "vehicle_no",
            Field::Gstin => "gstin",
            Field::BillingName => "billing_name",
            Field::BillingAddrLine1 => "billing_addr_line1",
            Field::BillingAddrLine2 => "billing_addr_line2",
            Field::BillingStateCode => "billing_state_code",
            Field::ShippingName => "shipping_name",
            Field::ShippingAddrLine1 => "shipping_addr_line1",
            Field::ShippingAddrLine2 => "shipping_addr_line2",
            Field::ShippingStateCode => "shipping_state_code",
            Field::Password => "password",
        }
    }

    /// Label shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            Field::Quantity => "Quantity",
            Field::PriceAfterTax => "Price After Tax (₹)",
            Field::SgstPercent => "SGST %",
            Field::CgstPercent => "CGST %",
            Field::IgstPercent => "IGST %",
            Field::VehicleNo => "Vehicle Number",
            Field::Gstin => "GSTIN",
            Field::BillingName | Field::ShippingName => "Business Name",
            Field::BillingAddrLine1 | Field::ShippingAddrLine1 => "Address Line 1",
            Field::BillingAddrLine2 | Field::ShippingAddrLine2 => "Address Line 2",
            Field::BillingStateCode | Field::ShippingStateCode => "State & PIN",
            Field::Password => "Password",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Quantity => "1250",
            Field::PriceAfterTax => "4.00",
            Field::SgstPercent | Field::CgstPercent => "6",
            Field::IgstPercent => "0",
            Field::VehicleNo => "OR 16D 8410",
            Field::Gstin => "22AAAAA0000A1Z5 (Optional)",
            Field::BillingName => "ABC Constructions",
            Field::ShippingName => "ABC Const.",
            Field::BillingAddrLine1 | Field::ShippingAddrLine1 => "Bisra",
            Field::BillingAddrLine2 | Field::ShippingAddrLine2 => "Sundergarh",
            Field::BillingStateCode | Field::ShippingStateCode => "Odisha, 770036",
            Field::Password => "******",
        }
    }

    pub fn is_required(self) -> bool {
        self != Field::Gstin
    }

    pub fn is_shipping(self) -> bool {
        matches!(
            self,
            Field::ShippingName
                | Field::ShippingAddrLine1
                | Field::ShippingAddrLine2
                | Field::ShippingStateCode
        )
    }
}

/// The form's working copy. Values are kept as typed so that partial or
/// invalid input can be shown back and validated.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InvoiceDraft {
    #[serde(deserialize_with = "text_or_number")]
    pub quantity: String,
    #[serde(deserialize_with = "text_or_number")]
    pub price_after_tax: String,
    #[serde(deserialize_with = "text_or_number")]
    pub sgst_percent: String,
    #[serde(deserialize_with = "text_or_number")]
    pub cgst_percent: String,
    #[serde(deserialize_with = "text_or_number")]
    pub igst_percent: String,
    pub vehicle_no: String,
    pub gstin: String,
    pub is_shipping_same_as_billing: bool,
    pub billing_name: String,
    pub billing_addr_line1: String,
    pub billing_addr_line2: String,
    pub billing_state_code: String,
    pub shipping_name: String,
    pub shipping_addr_line1: String,
    pub shipping_addr_line2: String,
    pub shipping_state_code: String,
    pub password: String,
}

impl Default for InvoiceDraft {
    fn default() -> Self {
        Self {
            quantity: String::new(),
            price_after_tax: String::new(),
            sgst_percent: String::new(),
            cgst_percent: String::new(),
            igst_percent: String::new(),
            vehicle_no: String::new(),
            gstin: String::new(),
            is_shipping_same_as_billing: true,
            billing_name: String::new(),
            billing_addr_line1: String::new(),
            billing_addr_line2: String::new(),
            billing_state_code: String::new(),
            shipping_name: String::new(),
            shipping_addr_line1: String::new(),
            shipping_addr_line2: String::new(),
            shipping_state_code: String::new(),
            password: String::new(),
        }
    }
}

impl InvoiceDraft {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Quantity => &self.quantity,
            Field::PriceAfterTax => &self.price_after_tax,
            Field::SgstPercent => &self.sgst_percent,
            Field::CgstPercent => &self.cgst_percent,
            Field::IgstPercent => &self.igst_percent,
            Field::VehicleNo => &self.vehicle_no,
            Field::Gstin => &self.gstin,
            Field::BillingName => &self.billing_name,
            Field::BillingAddrLine1 => &self.billing_addr_line1,
            Field::BillingAddrLine2 => &self.billing_addr_line2,
            Field::BillingStateCode => &self.billing_state_code,
            Field::ShippingName => &self.shipping_name,
            Field::ShippingAddrLine1 => &self.shipping_addr_line1,
            Field::ShippingAddrLine2 => &self.shipping_addr_line2,
            Field::ShippingStateCode => &self.shipping_state_code,
            Field::Password => &self.password,
        }
    }

    pub fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Quantity => &mut self.quantity,
            Field::PriceAfterTax => &mut self.price_after_tax,
            Field::SgstPercent => &mut self.sgst_percent,
            Field::CgstPercent => &mut self.cgst_percent,
            Field::IgstPercent => &mut self.igst_percent,
            Field::VehicleNo => &mut self.vehicle_no,
            Field::Gstin => &mut self.gstin,
            Field::BillingName => &mut self.billing_name,
            Field::BillingAddrLine1 => &mut self.billing_addr_line1,
            Field::BillingAddrLine2 => &mut self.billing_addr_line2,
            Field::BillingStateCode => &mut self.billing_state_code,
            Field::ShippingName => &mut self.shipping_name,
            Field::ShippingAddrLine1 => &mut self.shipping_addr_line1,
            Field::ShippingAddrLine2 => &mut self.shipping_addr_line2,
            Field::ShippingStateCode => &mut self.shipping_state_code,
            Field::Password => &mut self.password,
        }
    }

    /// One-shot copy of the billing address into the shipping address.
    /// Later billing edits are not propagated.
    pub fn sync_shipping_from_billing(&mut self) {
        self.shipping_name = self.billing_name.clone();
        self.shipping_addr_line1 = self.billing_addr_line1.clone();
        self.shipping_addr_line2 = self.billing_addr_line2.clone();
        self.shipping_state_code = self.billing_state_code.clone();
    }

    /// Clears the draft after a successful submission. The password is kept.
    pub fn clear_after_submit(&mut self) {
        let password = std::mem::take(&mut self.password);
        *self = Self {
            password,
            ..Self::default()
        };
    }

    /// quantity × price_after_tax; unparseable values count as zero.
    pub fn total_amount(&self) -> f64 {
        lenient_number(&self.quantity) * lenient_number(&self.price_after_tax)
    }

    /// Builds the request body. Numeric fields are expected to have passed
    /// validation; anything unparseable is sent as 0.
    pub fn to_payload(&self) -> InvoicePayload {
        InvoicePayload {
            quantity: lenient_number(&self.quantity),
            price_after_tax: lenient_number(&self.price_after_tax),
            sgst_percent: lenient_number(&self.sgst_percent),
            cgst_percent: lenient_number(&self.cgst_percent),
            igst_percent: lenient_number(&self.igst_percent),
            vehicle_no: self.vehicle_no.clone(),
            gstin: self.gstin.clone(),
            is_shipping_same_as_billing: self.is_shipping_same_as_billing,
            billing_name: self.billing_name.clone(),
            billing_addr_line1: self.billing_addr_line1.clone(),
            billing_addr_line2: self.billing_addr_line2.clone(),
            billing_state_code: self.billing_state_code.clone(),
            shipping_name: self.shipping_name.clone(),
            shipping_addr_line1: self.shipping_addr_line1.clone(),
            shipping_addr_line2: self.shipping_addr_line2.clone(),
            shipping_state_code: self.shipping_state_code.clone(),
            password: self.password.clone(),
        }
    }
}

/// JSON body of `POST /print_invoice`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoicePayload {
    #[serde(serialize_with = "plain_number")]
    pub quantity: f64,
    #[serde(serialize_with = "plain_number")]
    pub price_after_tax: f64,
    #[serde(serialize_with = "plain_number")]
    pub sgst_percent: f64,
    #[serde(serialize_with = "plain_number")]
    pub cgst_percent: f64,
    #[serde(serialize_with = "plain_number")]
    pub igst_percent: f64,
    pub vehicle_no: String,
    pub gstin: String,
    pub is_shipping_same_as_billing: bool,
    pub billing_name: String,
    pub billing_addr_line1: String,
    pub billing_addr_line2: String,
    pub billing_state_code: String,
    pub shipping_name: String,
    pub shipping_addr_line1: String,
    pub shipping_addr_line2: String,
    pub shipping_state_code: String,
    pub password: String,
}

pub fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn lenient_number(value: &str) -> f64 {
    parse_number(value).unwrap_or(0.0)
}

// Whole numbers go out as integers (`10`, not `10.0`).
fn plain_number<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    const I64_LIMIT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= I64_LIMIT {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

// Draft files may write numbers either bare or quoted.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled() -> InvoiceDraft {
        InvoiceDraft {
            quantity: "10".into(),
            price_after_tax: "5".into(),
            sgst_percent: "6".into(),
            cgst_percent: "6".into(),
            igst_percent: "0".into(),
            vehicle_no: "OR 16D 8410".into(),
            billing_name: "ABC Constructions".into(),
            billing_addr_line1: "Bisra".into(),
            billing_addr_line2: "Sundergarh".into(),
            billing_state_code: "Odisha, 770036".into(),
            password: "hunter2".into(),
            ..InvoiceDraft::default()
        }
    }

    #[test]
    fn new_draft_is_empty_with_same_address_checked() {
        let draft = InvoiceDraft::default();
        assert!(draft.is_shipping_same_as_billing);
        assert!(Field::ALL.iter().all(|f| draft.value(*f).is_empty()));
    }

    #[test]
    fn field_accessors_agree() {
        let mut draft = InvoiceDraft::default();
        for field in Field::ALL {
            *draft.value_mut(field) = field.key().to_string();
        }
        for field in Field::ALL {
            assert_eq!(draft.value(field), field.key());
        }
    }

    #[test]
    fn sync_copies_billing_once() {
        let mut draft = filled();
        draft.sync_shipping_from_billing();
        assert_eq!(draft.shipping_name, "ABC Constructions");
        assert_eq!(draft.shipping_state_code, "Odisha, 770036");

        draft.billing_name = "Changed Name".into();
        assert_eq!(draft.shipping_name, "ABC Constructions");
    }

    #[test]
    fn clear_keeps_password_only() {
        let mut draft = filled();
        draft.is_shipping_same_as_billing = false;
        draft.clear_after_submit();
        assert_eq!(
            draft,
            InvoiceDraft {
                password: "hunter2".into(),
                ..InvoiceDraft::default()
            }
        );
    }

    #[test]
    fn payload_coerces_numbers() {
        let json = serde_json::to_value(filled().to_payload()).unwrap();
        assert_eq!(json["quantity"], serde_json::json!(10));
        assert_eq!(json["price_after_tax"], serde_json::json!(5));
        assert_eq!(json["igst_percent"], serde_json::json!(0));
        assert_eq!(json["gstin"], serde_json::json!(""));
        assert_eq!(json["is_shipping_same_as_billing"], serde_json::json!(true));
        assert_eq!(json["vehicle_no"], serde_json::json!("OR 16D 8410"));
    }

    #[test]
    fn whole_numbers_serialize_without_decimal_point() {
        let draft = InvoiceDraft {
            sgst_percent: "2.5".into(),
            ..filled()
        };
        let body = serde_json::to_string(&draft.to_payload()).unwrap();
        let numbers = concat!(
            r#"{"quantity":10,"price_after_tax":5,"#,
            r#""sgst_percent":2.5,"cgst_percent":6,"igst_percent":0,"#,
        );
        assert!(body.starts_with(numbers), "{body}");
    }

    #[test]
    fn payload_keys_match_field_keys() {
        let json = serde_json::to_value(filled().to_payload()).unwrap();
        let object = json.as_object().unwrap();
        for field in Field::ALL {
            assert!(object.contains_key(field.key()), "missing {}", field.key());
        }
        assert_eq!(object.len(), Field::ALL.len() + 1);
    }

    #[test]
    fn total_amount_multiplies() {
        assert_eq!(filled().total_amount(), 50.0);
        assert_eq!(InvoiceDraft::default().total_amount(), 0.0);
    }

    #[test]
    fn draft_accepts_bare_and_quoted_numbers() {
        let draft: InvoiceDraft = toml::from_str(
            r#"
            quantity = 1250
            price_after_tax = "4.00"
            sgst_percent = 2.5
            billing_name = "ABC"
            "#,
        )
        .unwrap();
        assert_eq!(draft.quantity, "1250");
        assert_eq!(draft.price_after_tax, "4.00");
        assert_eq!(draft.sgst_percent, "2.5");
        assert_eq!(draft.cgst_percent, "");
        assert!(draft.is_shipping_same_as_billing);
    }

    #[test]
    fn parse_number_trims_and_rejects_garbage() {
        assert_eq!(parse_number(" 4.5 "), Some(4.5));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }
}
