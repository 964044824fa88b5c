//! Desktop front end.
//!
//! The request runs on a worker thread; the UI keeps repainting while the
//! form is loading or a reset is pending so both are noticed without input.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use eframe::egui;
use tracing::error;

use crate::form::{AlertKind, InvoiceForm, Step};
use crate::model::Field;
use crate::review::review_sections;
use crate::submit::{SubmitError, Submitter};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(185, 28, 28);
const SUCCESS_COLOR: egui::Color32 = egui::Color32::from_rgb(4, 120, 87);

pub fn run(form: InvoiceForm, submitter: Arc<dyn Submitter + Send + Sync>) -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Invoice Generator")
            .with_inner_size([720.0, 880.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Invoice Generator",
        options,
        Box::new(|_cc| Ok(Box::new(InvoiceApp::new(form, submitter)))),
    )
}

struct InvoiceApp {
    form: InvoiceForm,
    submitter: Arc<dyn Submitter + Send + Sync>,
    in_flight: Option<Receiver<Result<(), SubmitError>>>,
}

impl InvoiceApp {
    fn new(form: InvoiceForm, submitter: Arc<dyn Submitter + Send + Sync>) -> Self {
        Self {
            form,
            submitter,
            in_flight: None,
        }
    }

    fn start_submit(&mut self, ctx: &egui::Context) {
        let Some(payload) = self.form.begin_submit() else {
            return;
        };
        let (tx, rx) = mpsc::channel();
        let submitter = Arc::clone(&self.submitter);
        let ctx = ctx.clone();
        thread::spawn(move || {
            // The receiver is gone only if the window closed first.
            let _ = tx.send(submitter.submit(&payload));
            ctx.request_repaint();
        });
        self.in_flight = Some(rx);
    }

    fn poll_submission(&mut self) {
        let Some(rx) = &self.in_flight else {
            return;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.form.finish_submit(outcome, Instant::now());
                self.in_flight = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                error!("submission worker exited without a result");
                self.in_flight = None;
                self.form
                    .finish_submit(Err(SubmitError::Interrupted), Instant::now());
            }
        }
    }

    fn field(&mut self, ui: &mut egui::Ui, field: Field) {
        let label = if field.is_required() {
            format!("{} *", field.label())
        } else {
            field.label().to_string()
        };
        ui.label(egui::RichText::new(label).strong());

        let mut value = self.form.draft().value(field).to_string();
        let edit = egui::TextEdit::singleline(&mut value)
            .hint_text(field.placeholder())
            .password(field == Field::Password)
            .desired_width(f32::INFINITY);
        if ui.add(edit).changed() {
            self.form.set_field(field, value);
        }

        if let Some(message) = self.form.error(field) {
            ui.colored_label(ERROR_COLOR, format!("⚠ {message}"));
        }
        ui.add_space(6.0);
    }

    fn section(&mut self, ui: &mut egui::Ui, title: &str, fields: &[Field]) {
        ui.group(|ui| {
            ui.heading(title);
            ui.add_space(4.0);
            for &field in fields {
                self.field(ui, field);
            }
        });
        ui.add_space(10.0);
    }

    fn details(&mut self, ui: &mut egui::Ui) {
        self.section(ui, "Product Details", &[Field::Quantity, Field::PriceAfterTax]);
        self.section(
            ui,
            "Tax Information",
            &[Field::SgstPercent, Field::CgstPercent, Field::IgstPercent],
        );
        self.section(ui, "Shipping Details", &[Field::VehicleNo, Field::Gstin]);
        self.section(
            ui,
            "Billing Address",
            &[
                Field::BillingName,
                Field::BillingAddrLine1,
                Field::BillingAddrLine2,
                Field::BillingStateCode,
            ],
        );

        let mut same = self.form.draft().is_shipping_same_as_billing;
        if ui
            .checkbox(&mut same, "Shipping address is same as billing address")
            .changed()
        {
            self.form.set_shipping_same_as_billing(same);
        }
        ui.add_space(10.0);

        if !same {
            self.section(
                ui,
                "Shipping Address",
                &[
                    Field::ShippingName,
                    Field::ShippingAddrLine1,
                    Field::ShippingAddrLine2,
                    Field::ShippingStateCode,
                ],
            );
        }

        self.field(ui, Field::Password);
        ui.add_space(10.0);

        let pending = self.form.errors().len();
        if pending > 0 {
            ui.colored_label(ERROR_COLOR, format!("{pending} field(s) need attention"));
        }

        if ui.button("Continue to Review →").clicked() {
            self.form.next();
        }
    }

    fn review(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading("Review Invoice Details");
        ui.add_space(8.0);

        for section in review_sections(self.form.draft()) {
            ui.group(|ui| {
                ui.label(egui::RichText::new(section.title).strong());
                egui::Grid::new(section.title)
                    .num_columns(2)
                    .spacing([24.0, 4.0])
                    .show(ui, |ui| {
                        for (label, value) in &section.rows {
                            ui.label(*label);
                            ui.label(value.as_str());
                            ui.end_row();
                        }
                    });
            });
            ui.add_space(8.0);
        }

        ui.horizontal(|ui| {
            if ui.button("← Back to Edit").clicked() {
                self.form.back();
            }
            let loading = self.form.is_loading();
            if ui
                .add_enabled(!loading, egui::Button::new("Submit Invoice"))
                .clicked()
            {
                self.start_submit(ctx);
            }
            if loading {
                ui.spinner();
            }
        });
    }

    fn alert(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.form.alert().cloned() else {
            return;
        };
        let color = match alert.kind {
            AlertKind::Success => SUCCESS_COLOR,
            AlertKind::Error => ERROR_COLOR,
        };

        let mut dismissed = false;
        egui::Window::new(egui::RichText::new(alert.title.as_str()).color(color).strong())
            .id(egui::Id::new("alert"))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(alert.message.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.form.dismiss_alert();
        }
    }
}

impl eframe::App for InvoiceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_submission();
        self.form.tick(Instant::now());

        egui::TopBottomPanel::top("progress").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.heading("Invoice Generator");
            ui.horizontal(|ui| {
                for (n, name) in [(1, "1. Details"), (2, "2. Review")] {
                    let text = egui::RichText::new(name);
                    if self.form.step().number() >= n {
                        ui.label(text.strong());
                    } else {
                        ui.label(text.weak());
                    }
                }
            });
            ui.add(egui::ProgressBar::new(f32::from(self.form.step().number()) / 2.0));
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| match self.form.step() {
                Step::Details => self.details(ui),
                Step::Review => self.review(ui, ctx),
            });
        });

        self.alert(ctx);

        if self.in_flight.is_some() || self.form.pending_reset().is_some() {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}
