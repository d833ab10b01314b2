//! Invoice rendering for a persisted order.
//!
//! The layout is an askama text template. The rendered lines are typeset onto
//! A4 pages in a monospace font with `printpdf`.

use askama::Template;
use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use uuid::Uuid;

use crate::{
    dto::payments::{PaymentDetails, mask_prefix},
    error::{AppError, AppResult},
    models::OrderAddress,
    pricing::{LineItem, format_money},
};

pub const INVOICE_DIR: &str = "pet-shop/invoices";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 15.0;
const FONT_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 5.0;

pub fn invoice_path(order_id: Uuid) -> String {
    format!("{INVOICE_DIR}/{order_id}.pdf")
}

pub struct InvoiceCustomer {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
}

pub struct InvoicePayment {
    pub method: String,
    pub details: Option<PaymentDetails>,
}

/// Everything printed on an invoice.
pub struct InvoiceData {
    pub order_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub customer: InvoiceCustomer,
    pub address: OrderAddress,
    pub payment: Option<InvoicePayment>,
    pub products: Vec<LineItem>,
    pub delivery_fee: i64,
    pub amount: i64,
}

#[derive(Template)]
#[template(path = "invoice.txt")]
struct InvoiceTemplate {
    order_id: String,
    date: String,
    status: String,
    customer_name: String,
    customer_id: String,
    customer_phone: String,
    customer_email: String,
    customer_address: String,
    billing: String,
    shipping: String,
    payment_method: String,
    payment_lines: Vec<String>,
    header: String,
    rows: Vec<String>,
    subtotal: String,
    delivery_fee: String,
    total: String,
}

pub fn payment_lines(details: &PaymentDetails) -> Vec<String> {
    match details {
        PaymentDetails::CashOnDelivery(d) => vec![
            format!("First name: {}", d.first_name),
            format!("Last name:  {}", d.last_name),
            format!("Address:    {}", d.address),
        ],
        PaymentDetails::CreditCard(d) => vec![
            format!("Holder:     {}", d.holder_name),
            format!("Number:     {}", mask_prefix(&d.number, 12)),
        ],
        PaymentDetails::BankTransfer(d) => vec![
            format!("Name:       {}", d.name),
            format!("SWIFT:      {}", d.swift),
            format!("IBAN:       {}", mask_prefix(&d.iban, 8)),
        ],
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut out: String = value.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

fn row_line(index: &str, id: &str, title: &str, price: &str, qty: &str, total: &str) -> String {
    format!(
        "{:<3} {:<8} {:<18} {:>9} {:>4} {:>11}",
        index,
        truncate(id, 8),
        truncate(title, 18),
        price,
        qty,
        total
    )
}

/// Render the invoice layout as plain text.
pub fn render_text(data: &InvoiceData) -> AppResult<String> {
    let overflow = || AppError::BadRequest("Invoice total is too large".into());
    let subtotal = data
        .products
        .iter()
        .try_fold(0_i64, |acc, line| acc.checked_add(line.amount))
        .ok_or_else(overflow)?;
    let total = data.amount.checked_add(data.delivery_fee).ok_or_else(overflow)?;
    let rows = data
        .products
        .iter()
        .enumerate()
        .map(|(i, line)| {
            row_line(
                &(i + 1).to_string(),
                &line.uuid.to_string(),
                &line.title,
                &format_money(line.price),
                &line.quantity.to_string(),
                &format_money(line.amount),
            )
        })
        .collect();

    let (payment_method, payment_lines) = match &data.payment {
        Some(payment) => (
            payment.method.clone(),
            payment.details.as_ref().map(payment_lines).unwrap_or_default(),
        ),
        None => ("Not paid yet".to_string(), Vec::new()),
    };

    let template = InvoiceTemplate {
        order_id: data.order_id.to_string(),
        date: data.created_at.format("%Y-%m-%d").to_string(),
        status: data.status.clone(),
        customer_name: data.customer.name.clone(),
        customer_id: data.customer.id.to_string(),
        customer_phone: data.customer.phone.clone(),
        customer_email: data.customer.email.clone(),
        customer_address: data.customer.address.clone(),
        billing: data.address.billing.clone(),
        shipping: data.address.shipping.clone(),
        payment_method,
        payment_lines,
        header: row_line("#", "ID", "Product", "Price", "Qty", "Line total"),
        rows,
        subtotal: format_money(subtotal),
        delivery_fee: format_money(data.delivery_fee),
        total: format_money(total),
    };

    template
        .render()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to render invoice: {e}")))
}

/// Typeset text lines onto as many A4 pages as needed.
pub fn typeset_pdf(title: &str, text: &str) -> AppResult<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Courier)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to load pdf font: {e}")))?;

    let top = PAGE_HEIGHT - MARGIN;
    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = top;
    for line in text.lines() {
        if y < MARGIN {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            current = doc.get_page(page).get_layer(layer);
            y = top;
        }
        if !line.is_empty() {
            current.use_text(line, FONT_SIZE, Mm(MARGIN), Mm(y), &font);
        }
        y -= LINE_HEIGHT;
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to write pdf: {e}")))
}

pub fn render_pdf(data: &InvoiceData) -> AppResult<Vec<u8>> {
    let text = render_text(data)?;
    typeset_pdf(&format!("Invoice {}", data.order_id), &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::payments::{BankTransferDetails, CreditCardDetails};

    fn data(payment: Option<InvoicePayment>) -> InvoiceData {
        InvoiceData {
            order_id: Uuid::new_v4(),
            created_at: Utc::now(),
            status: "Paid".into(),
            customer: InvoiceCustomer {
                id: Uuid::new_v4(),
                name: "Robin Doe".into(),
                phone: "+4412345678901".into(),
                email: "robin@example.com".into(),
                address: "12 Kennel Road".into(),
            },
            address: OrderAddress {
                billing: "12 Kennel Road".into(),
                shipping: "7 Cattery Close".into(),
            },
            payment,
            products: vec![
                LineItem {
                    uuid: Uuid::new_v4(),
                    title: "Grain free kibble".into(),
                    price: 1299,
                    quantity: 2,
                    amount: 2598,
                },
                LineItem {
                    uuid: Uuid::new_v4(),
                    title: "Leash".into(),
                    price: 850,
                    quantity: 1,
                    amount: 850,
                },
            ],
            delivery_fee: 500,
            amount: 3448,
        }
    }

    #[test]
    fn masks_keep_the_tail_only() {
        assert_eq!(mask_prefix("4111111111111111", 12), "************1111");
        assert_eq!(mask_prefix("GB82WEST12345698765432", 8), "********12345698765432");
        assert_eq!(mask_prefix("123", 12), "************");
    }

    #[test]
    fn oversized_totals_fail_instead_of_panicking() {
        let mut invoice = data(None);
        invoice.delivery_fee = i64::MAX;
        assert!(matches!(render_text(&invoice), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn text_invoice_lists_customer_lines_and_totals() {
        let text = render_text(&data(None)).unwrap();
        assert!(text.contains("Robin Doe"));
        assert!(text.contains("robin@example.com"));
        assert!(text.contains("7 Cattery Close"));
        assert!(text.contains("Grain free kibble"));
        assert!(text.contains("25.98"));
        assert!(text.contains("Subtotal:     34.48 USD"));
        assert!(text.contains("Delivery fee: 5.00 USD"));
        assert!(text.contains("TOTAL:        39.48 USD"));
        assert!(text.contains("Not paid yet"));
    }

    #[test]
    fn card_and_iban_numbers_are_masked_on_the_invoice() {
        let card = data(Some(InvoicePayment {
            method: "Credit Card".into(),
            details: Some(PaymentDetails::CreditCard(CreditCardDetails {
                holder_name: "Robin Doe".into(),
                number: "4111111111111111".into(),
                ccv: "123".into(),
                expire_date: "12/30".into(),
            })),
        }));
        let text = render_text(&card).unwrap();
        assert!(text.contains("************1111"));
        assert!(!text.contains("4111111111111111"));

        let bank = data(Some(InvoicePayment {
            method: "Bank Transfer".into(),
            details: Some(PaymentDetails::BankTransfer(BankTransferDetails {
                name: "Robin Doe".into(),
                swift: "DEUTDEFF".into(),
                iban: "GB82WEST12345698765432".into(),
            })),
        }));
        let text = render_text(&bank).unwrap();
        assert!(text.contains("********12345698765432"));
        assert!(text.contains("DEUTDEFF"));
    }

    #[test]
    fn pdf_output_is_a_pdf_document() {
        let bytes = render_pdf(&data(None)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_invoices_spill_onto_more_pages() {
        let text = (0..200).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let one_page = typeset_pdf("short", "line").unwrap();
        let many_pages = typeset_pdf("long", &text).unwrap();
        assert!(many_pages.len() > one_page.len());
    }
}
