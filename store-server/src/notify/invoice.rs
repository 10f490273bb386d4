//! Order Confirmation Documents
//!
//! Plain-text confirmation rendered at enqueue time so the worker only
//! has to deliver bytes.

use super::Notification;
use shared::models::{Order, PaymentDisplayStatus, PaymentMethod};

/// One renderable line of the confirmation
#[derive(Debug, Clone)]
pub struct ConfirmationLine {
    pub product_name: String,
    pub quantity: i64,
    /// Cents
    pub unit_price: i64,
}

fn money(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, (cents % 100).abs())
}

/// Payment line of the document. COD has no ledger record at checkout,
/// so its line is synthesized from the tender itself.
fn payment_line(order: &Order) -> String {
    match order.payment_method {
        PaymentMethod::Cod => format!(
            "Payment: CASH ON DELIVERY - collect {} on handover",
            money(order.payable_amount)
        ),
        method => format!("Payment: {} - {}", method.as_str(), money(order.payable_amount)),
    }
}

/// Render the confirmation for a freshly checked-out order
pub fn build_confirmation(
    company_name: &str,
    order: &Order,
    lines: &[ConfirmationLine],
    recipient: Option<String>,
) -> Notification {
    let mut body = String::new();
    body.push_str(&format!("{company_name}\n"));
    body.push_str(&format!("Order confirmation #{}\n\n", order.id));

    for line in lines {
        body.push_str(&format!(
            "  {} x{} @ {} = {}\n",
            line.product_name,
            line.quantity,
            money(line.unit_price),
            money(line.quantity * line.unit_price)
        ));
    }

    body.push_str(&format!("\nSubtotal: {}\n", money(order.total_amount)));
    if order.discount_amount > 0 {
        body.push_str(&format!("Discount: -{}\n", money(order.discount_amount)));
    }
    body.push_str(&format!("Total due: {}\n", money(order.payable_amount)));
    body.push_str(&payment_line(order));
    body.push('\n');

    Notification {
        order_id: order.id,
        recipient,
        subject: format!("Order confirmation #{}", order.id),
        body,
    }
}

/// Render the final invoice once an order completes.
///
/// Carries the reconciled payment status next to the tender line; a COD
/// order that just completed reads as paid, settled tenders show their
/// ledger status.
pub fn build_invoice(
    company_name: &str,
    order: &Order,
    lines: &[ConfirmationLine],
    payment_status: PaymentDisplayStatus,
    recipient: Option<String>,
) -> Notification {
    let mut body = String::new();
    body.push_str(&format!("{company_name}\n"));
    body.push_str(&format!("Invoice for order #{}\n\n", order.id));

    for line in lines {
        body.push_str(&format!(
            "  {} x{} @ {} = {}\n",
            line.product_name,
            line.quantity,
            money(line.unit_price),
            money(line.quantity * line.unit_price)
        ));
    }

    body.push_str(&format!("\nSubtotal: {}\n", money(order.total_amount)));
    if order.discount_amount > 0 {
        body.push_str(&format!("Discount: -{}\n", money(order.discount_amount)));
    }
    body.push_str(&format!("Total: {}\n", money(order.payable_amount)));
    body.push_str(&payment_line(order));
    body.push_str(&format!("\nPayment status: {}\n", payment_status.as_str()));

    Notification {
        order_id: order.id,
        recipient,
        subject: format!("Invoice for order #{}", order.id),
        body,
    }
}

/// Render a payment receipt once a ledger row reaches SUCCESS
pub fn build_receipt(
    company_name: &str,
    order: &Order,
    reference: &str,
    recipient: Option<String>,
) -> Notification {
    let body = format!(
        "{company_name}\nPayment received for order #{}\n\n  {} via {}\n  Reference: {}\n",
        order.id,
        money(order.payable_amount),
        order.payment_method.as_str(),
        reference
    );
    Notification {
        order_id: order.id,
        recipient,
        subject: format!("Payment received for order #{}", order.id),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::OrderStatus;

    fn order(method: PaymentMethod, discount: i64) -> Order {
        Order {
            id: 7,
            customer_id: 1,
            total_amount: 3000,
            discount_amount: discount,
            payable_amount: 3000 - discount,
            payment_method: method,
            status: OrderStatus::Unprocessed,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn cod_line_is_synthesized() {
        let note = build_confirmation(
            "Demo Store",
            &order(PaymentMethod::Cod, 0),
            &[ConfirmationLine { product_name: "Kettle".into(), quantity: 3, unit_price: 1000 }],
            None,
        );
        assert!(note.body.contains("CASH ON DELIVERY - collect 30.00"));
        assert!(note.body.contains("Kettle x3 @ 10.00 = 30.00"));
    }

    #[test]
    fn invoice_carries_reconciled_payment_status() {
        let mut completed = order(PaymentMethod::Cod, 0);
        completed.status = OrderStatus::Completed;

        let note = build_invoice(
            "Demo Store",
            &completed,
            &[],
            PaymentDisplayStatus::Success,
            Some("ada@example.com".into()),
        );
        assert!(note.subject.contains("Invoice for order #7"));
        assert!(note.body.contains("Payment status: SUCCESS"));
        assert_eq!(note.recipient.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn discount_appears_only_when_nonzero() {
        let with = build_confirmation("S", &order(PaymentMethod::Card, 500), &[], None);
        assert!(with.body.contains("Discount: -5.00"));
        assert!(with.body.contains("Total due: 25.00"));

        let without = build_confirmation("S", &order(PaymentMethod::Card, 0), &[], None);
        assert!(!without.body.contains("Discount"));
    }
}
