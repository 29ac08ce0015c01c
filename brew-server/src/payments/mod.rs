//! Payment settlement
//!
//! A payment is a `SettlePayment` command run through the [`OrdersManager`],
//! so the payment record, the `paid` snapshot and the session ledger entry
//! commit together. Retrying with the same `command_id` after a lost response
//! returns the original settlement instead of charging twice.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{PaymentMethodConfig, PaymentRecord};
use shared::order::OrderCommandPayload;
use shared::request::PayOrderRequest;
use shared::response::{PaymentMethods, Settlement, UpiLink};

use crate::orders::OrdersManager;

#[derive(Debug, Clone)]
pub struct PaymentService {
    orders: OrdersManager,
}

impl PaymentService {
    pub fn new(orders: OrdersManager) -> Self {
        Self { orders }
    }

    pub fn enabled_methods(&self) -> PaymentMethods {
        let config: &PaymentMethodConfig = self.orders.payment_methods();
        PaymentMethods {
            methods: config.enabled.clone(),
            upi_id: config.upi_id.clone(),
            merchant_name: config.merchant_name.clone(),
        }
    }

    /// Settle an order's full total
    pub fn pay(&self, order_id: &str, request: PayOrderRequest) -> AppResult<Settlement> {
        let cmd = request.operator.command(OrderCommandPayload::SettlePayment {
            order_id: order_id.to_string(),
            payment: request.payment,
        });

        let response = self.orders.execute_command(cmd);
        if let Some(err) = response.error {
            return Err(AppError::from(err).with_detail("order_id", order_id));
        }

        let order = self
            .orders
            .get_order(order_id)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
        let payment = self
            .payments_for_order(order_id)?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal(format!("Payment for order {order_id} missing")))?;

        Ok(Settlement {
            order,
            payment,
            duplicate: response.duplicate,
        })
    }

    pub fn payments_for_order(&self, order_id: &str) -> AppResult<Vec<PaymentRecord>> {
        Ok(self.orders.payments_for_order(order_id)?)
    }

    /// UPI deep link for an order's total
    pub fn upi_link(&self, order_id: &str) -> AppResult<UpiLink> {
        let order = self
            .orders
            .get_order(order_id)?
            .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
        let link = self
            .orders
            .payment_methods()
            .upi_link(order.total_amount, &order.order_number)
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::PaymentMethodDisabled, "UPI is not configured")
            })?;
        Ok(UpiLink {
            order_id: order.order_id,
            order_number: order.order_number,
            amount: order.total_amount,
            link,
        })
    }
}
