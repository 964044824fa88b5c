use std::thread;
use std::time::Instant;

use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select, Text};

use crate::form::{Alert, AlertKind, InvoiceForm, Step};
use crate::model::Field;
use crate::review::review_table;
use crate::submit::Submitter;

const SUBMIT_OPT: &str = "📨 Submit Invoice";
const BACK_OPT: &str = "← Back to Edit";

const PRODUCT_FIELDS: [Field; 2] = [Field::Quantity, Field::PriceAfterTax];
const TAX_FIELDS: [Field; 3] = [Field::SgstPercent, Field::CgstPercent, Field::IgstPercent];
const SHIPPING_DETAIL_FIELDS: [Field; 2] = [Field::VehicleNo, Field::Gstin];
const BILLING_FIELDS: [Field; 4] = [
    Field::BillingName,
    Field::BillingAddrLine1,
    Field::BillingAddrLine2,
    Field::BillingStateCode,
];
const SHIPPING_FIELDS: [Field; 4] = [
    Field::ShippingName,
    Field::ShippingAddrLine1,
    Field::ShippingAddrLine2,
    Field::ShippingStateCode,
];

/// Runs the two-step wizard until the user leaves. Escape or Ctrl-C ends it
/// quietly.
pub fn run(form: &mut InvoiceForm, submitter: &dyn Submitter) -> Result<(), InquireError> {
    match run_steps(form, submitter) {
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            println!("Cancelled");
            Ok(())
        }
        other => other,
    }
}

fn run_steps(form: &mut InvoiceForm, submitter: &dyn Submitter) -> Result<(), InquireError> {
    println!("\n🧾 Invoice Generator");
    loop {
        match form.step() {
            Step::Details => {
                enter_details(form)?;
                if !form.next() {
                    show_alert(form);
                }
            }
            Step::Review => {
                println!("\n--- Step 2/2: Review ---");
                println!("{}", review_table(form.draft()));

                let choice = Select::new("What next?", vec![SUBMIT_OPT, BACK_OPT]).prompt()?;
                if choice == BACK_OPT {
                    form.back();
                    continue;
                }

                println!("⏳ Submitting...");
                form.submit(submitter, Instant::now());
                let succeeded = form
                    .alert()
                    .is_some_and(|alert| alert.kind == AlertKind::Success);
                show_alert(form);

                if succeeded {
                    wait_for_reset(form);
                    let again = Confirm::new("Create another invoice?")
                        .with_default(false)
                        .prompt()?;
                    if !again {
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn enter_details(form: &mut InvoiceForm) -> Result<(), InquireError> {
    println!("\n--- Step 1/2: Details ---");

    println!("\n--- Product Details ---");
    enter_fields(form, &PRODUCT_FIELDS)?;

    println!("\n--- Tax Information ---");
    enter_fields(form, &TAX_FIELDS)?;

    println!("\n--- Shipping Details ---");
    enter_fields(form, &SHIPPING_DETAIL_FIELDS)?;

    println!("\n--- Billing Address ---");
    enter_fields(form, &BILLING_FIELDS)?;

    let same = Confirm::new("Shipping address is same as billing address?")
        .with_default(form.draft().is_shipping_same_as_billing)
        .prompt()?;
    form.set_shipping_same_as_billing(same);

    if !same {
        println!("\n--- Shipping Address ---");
        enter_fields(form, &SHIPPING_FIELDS)?;
    }

    println!();
    enter_password(form)
}

fn enter_fields(form: &mut InvoiceForm, fields: &[Field]) -> Result<(), InquireError> {
    for &field in fields {
        let label = prompt_label(field);
        let value = Text::new(&label)
            .with_placeholder(field.placeholder())
            .with_initial_value(form.draft().value(field))
            .prompt()?;
        form.set_field(field, value);
        show_field_error(form, field);
    }
    Ok(())
}

fn enter_password(form: &mut InvoiceForm) -> Result<(), InquireError> {
    let label = prompt_label(Field::Password);
    let current = form.draft().value(Field::Password).to_string();
    let prompt = if current.is_empty() {
        label
    } else {
        format!("{label} (Enter to keep)")
    };

    let value = Password::new(&prompt)
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    if value.is_empty() && !current.is_empty() {
        return Ok(());
    }
    form.set_field(Field::Password, value);
    show_field_error(form, Field::Password);
    Ok(())
}

fn prompt_label(field: Field) -> String {
    if field.is_required() {
        format!("{} *:", field.label())
    } else {
        format!("{}:", field.label())
    }
}

fn show_field_error(form: &InvoiceForm, field: Field) {
    if let Some(message) = form.error(field) {
        println!("   ⚠️  {message}");
    }
}

fn show_alert(form: &mut InvoiceForm) {
    if let Some(alert) = form.alert() {
        println!("\n{}", render_alert(alert));
    }
    form.dismiss_alert();
}

pub fn render_alert(alert: &Alert) -> String {
    let icon = match alert.kind {
        AlertKind::Success => "✅",
        AlertKind::Error => "❌",
    };
    format!("{icon} {}\n{}", alert.title, alert.message)
}

// The terminal has nothing else to do meanwhile, so just sleep it out.
fn wait_for_reset(form: &mut InvoiceForm) {
    if let Some(deadline) = form.pending_reset() {
        thread::sleep(deadline.saturating_duration_since(Instant::now()));
        form.tick(Instant::now());
    }
}
