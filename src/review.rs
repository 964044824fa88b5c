use comfy_table::{Attribute, Cell, Table};

use crate::model::InvoiceDraft;

/// One titled block of the review screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewSection {
    pub title: &'static str,
    pub rows: Vec<(&'static str, String)>,
}

pub fn format_total(draft: &InvoiceDraft) -> String {
    format!("₹{}", two_decimals(draft.total_amount()))
}

// Halves round away from zero; `{:.2}` alone would round 2.125 down to 2.12.
fn two_decimals(amount: f64) -> String {
    format!("{:.2}", (amount * 100.0).round() / 100.0)
}

pub fn review_sections(draft: &InvoiceDraft) -> Vec<ReviewSection> {
    let gstin = if draft.gstin.trim().is_empty() {
        "N/A".to_string()
    } else {
        draft.gstin.clone()
    };

    vec![
        ReviewSection {
            title: "Product Information",
            rows: vec![
                ("Quantity", draft.quantity.clone()),
                ("Price After Tax", format!("₹{}", draft.price_after_tax)),
                ("SGST", format!("{}%", draft.sgst_percent)),
                ("CGST", format!("{}%", draft.cgst_percent)),
                ("IGST", format!("{}%", draft.igst_percent)),
                ("Total Amount", format_total(draft)),
            ],
        },
        ReviewSection {
            title: "Shipping Information",
            rows: vec![("Vehicle", draft.vehicle_no.clone()), ("GSTIN", gstin)],
        },
        ReviewSection {
            title: "Billing Address",
            rows: address_rows(
                &draft.billing_name,
                &draft.billing_addr_line1,
                &draft.billing_addr_line2,
                &draft.billing_state_code,
            ),
        },
        ReviewSection {
            title: "Shipping Address",
            rows: address_rows(
                &draft.shipping_name,
                &draft.shipping_addr_line1,
                &draft.shipping_addr_line2,
                &draft.shipping_state_code,
            ),
        },
    ]
}

fn address_rows(name: &str, line1: &str, line2: &str, state: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Name", name.to_string()),
        ("Address Line 1", line1.to_string()),
        ("Address Line 2", line2.to_string()),
        ("State & PIN", state.to_string()),
    ]
}

/// Terminal rendering of the review screen.
pub fn review_table(draft: &InvoiceDraft) -> Table {
    let mut table = Table::new();
    table.set_header(vec![Cell::new("Review Invoice Details"), Cell::new("")]);

    for section in review_sections(draft) {
        table.add_row(vec![
            Cell::new(section.title).add_attribute(Attribute::Bold),
            Cell::new(""),
        ]);
        for (label, value) in section.rows {
            let value_cell = if label == "Total Amount" {
                Cell::new(value).add_attribute(Attribute::Bold)
            } else {
                Cell::new(value)
            };
            table.add_row(vec![Cell::new(format!("  {label}")), value_cell]);
        }
    }
    table
}
