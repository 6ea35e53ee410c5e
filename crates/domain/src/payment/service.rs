//! Payment service: initiation, provider callbacks and reads.

use chrono::Utc;
use common::{OrderId, OrderStatus, PayCode, PaymentStatus};
use rand::Rng;
use store::{NewPayment, Payment, Store};
use validator::Validate;

use super::{InitiatePayment, UpdatePaymentStatus};
use crate::error::DomainError;

const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const REFERENCE_SUFFIX_LEN: usize = 6;

/// Generates a transaction reference of the form `TXN-<unix millis>-<XXXXXX>`.
pub fn transaction_reference() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..REFERENCE_SUFFIX_LEN)
        .map(|_| REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())] as char)
        .collect();

    format!("TXN-{}-{suffix}", Utc::now().timestamp_millis())
}

/// Service for managing payment attempts.
#[derive(Clone)]
pub struct PaymentService<S: Store> {
    store: S,
}

impl<S: Store> PaymentService<S> {
    /// Creates a new payment service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Records a `Waiting` payment attempt for an unpaid order.
    ///
    /// The amount must equal the order price exactly. Nothing is written
    /// when any check fails.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id, amount = %cmd.amount))]
    pub async fn initiate(&self, cmd: InitiatePayment) -> Result<Payment, DomainError> {
        cmd.validate()?;

        let order = self
            .store
            .find_order(&cmd.order_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Order {} not found", cmd.order_id)))?;

        if !order.status.accepts_payment() {
            return Err(DomainError::InvalidState(format!(
                "Order {} is {} and cannot be paid",
                order.id, order.status
            )));
        }
        if cmd.amount != order.price {
            return Err(DomainError::AmountMismatch {
                expected: order.price,
                actual: cmd.amount,
            });
        }

        let payment = self
            .store
            .insert_payment(NewPayment {
                order_id: order.id,
                method: cmd.method,
                amount: cmd.amount,
                payment_phone: Some(cmd.payment_phone),
                transaction_number: transaction_reference(),
                payment_date: Utc::now(),
            })
            .await?;

        metrics::counter!("payments_initiated_total").increment(1);
        tracing::info!(pay_code = %payment.pay_code, method = %payment.method, "Payment initiated");

        Ok(payment)
    }

    /// Applies a provider outcome to a payment attempt.
    ///
    /// `Completed` moves the order from `Unpaid` to `Paid`. Repeating it, or
    /// completing an attempt on an order that is already paid or cancelled,
    /// leaves the order unchanged. `Failed` never touches the order.
    #[tracing::instrument(skip(self, cmd), fields(status = %cmd.status))]
    pub async fn update_status(
        &self,
        code: &PayCode,
        cmd: UpdatePaymentStatus,
    ) -> Result<Payment, DomainError> {
        cmd.validate()?;

        let mut payment = self.get(code).await?;
        payment.status = cmd.status;
        if let Some(reference) = cmd.transaction_number {
            payment.transaction_number = Some(reference);
        }
        let payment = self.store.save_payment(&payment).await?;

        metrics::counter!("payments_status_updated_total", "status" => payment.status.as_str())
            .increment(1);
        tracing::info!(pay_code = %payment.pay_code, status = %payment.status, "Payment status updated");

        if payment.status == PaymentStatus::Completed {
            self.propagate_paid(&payment.order_id).await?;
        }

        Ok(payment)
    }

    async fn propagate_paid(&self, order_id: &OrderId) -> Result<(), DomainError> {
        let moved = self
            .store
            .transition_order_status(order_id, OrderStatus::Unpaid, OrderStatus::Paid)
            .await?;

        if moved {
            metrics::counter!("order_paid_propagations_total").increment(1);
            metrics::counter!("orders_status_changed_total", "to" => OrderStatus::Paid.as_str())
                .increment(1);
            tracing::info!(%order_id, "Order marked paid");
            return Ok(());
        }

        match self.store.find_order(order_id).await? {
            Some(order) if order.status == OrderStatus::Cancelled => {
                tracing::warn!(%order_id, "Payment completed for a cancelled order");
            }
            Some(_) => {
                tracing::debug!(%order_id, "Order already paid");
            }
            None => {
                tracing::warn!(%order_id, "Payment completed for a missing order");
            }
        }
        Ok(())
    }

    pub async fn get(&self, code: &PayCode) -> Result<Payment, DomainError> {
        self.store
            .find_payment(code)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Payment {code} not found")))
    }

    pub async fn list(&self) -> Result<Vec<Payment>, DomainError> {
        Ok(self.store.list_payments().await?)
    }

    /// Returns the attempts made against one order, oldest first.
    pub async fn list_for_order(&self, order_id: &OrderId) -> Result<Vec<Payment>, DomainError> {
        if self.store.find_order(order_id).await?.is_none() {
            return Err(DomainError::NotFound(format!("Order {order_id} not found")));
        }
        Ok(self.store.list_payments_for_order(order_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveTime};
    use common::{CustomerRole, Money, PaymentMethod};
    use store::{
        CatalogStore, IdentityStore, InMemoryStore, NewDish, NewOrder, NewRegistration, OrderStore,
        PaymentStore,
    };

    async fn store_with_order(price: Money) -> (InMemoryStore, OrderId) {
        let store = InMemoryStore::new();
        let dish = store
            .create_dish(NewDish {
                name: "Thieb".to_string(),
                description: None,
                price,
                available: true,
                image_path: None,
            })
            .await
            .unwrap();
        let category = store.create_category("Lunch").await.unwrap();
        let reg = store
            .register_customer(NewRegistration {
                lastname: "Ndiaye".to_string(),
                firstname: "Moussa".to_string(),
                phone: "+221770000000".to_string(),
                email: "moussa@example.com".to_string(),
                username: "moussa".to_string(),
                password_hash: "hash".to_string(),
                role: CustomerRole::Teacher,
            })
            .await
            .unwrap();
        let order = store
            .insert_order(NewOrder {
                dish_id: dish.id,
                customer_id: reg.customer.id,
                category_id: category.id,
                order_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                order_time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                price,
                payment_phone: None,
                payment_deadline: Utc::now() + Duration::hours(2),
                delivery_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                pay_method: None,
            })
            .await
            .unwrap();
        (store, order.id)
    }

    fn initiate(order_id: &OrderId, cents: i64) -> InitiatePayment {
        InitiatePayment {
            order_id: order_id.clone(),
            amount: Money::from_cents(cents),
            method: PaymentMethod::Wave,
            payment_phone: "+221770000000".to_string(),
        }
    }

    #[test]
    fn test_transaction_reference_shape() {
        let reference = transaction_reference();
        let parts: Vec<&str> = reference.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TXN");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 6);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[tokio::test]
    async fn test_initiate_records_waiting_payment() {
        let (store, order_id) = store_with_order(Money::from_cents(1000)).await;
        let service = PaymentService::new(store);

        let payment = service.initiate(initiate(&order_id, 1000)).await.unwrap();

        assert_eq!(payment.pay_code.as_str(), "PAY0001");
        assert_eq!(payment.status, PaymentStatus::Waiting);
        assert!(payment.transaction_number.unwrap().starts_with("TXN-"));
        assert!(payment.payment_date.is_some());
    }

    #[tokio::test]
    async fn test_initiate_amount_mismatch_writes_nothing() {
        let (store, order_id) = store_with_order(Money::from_cents(1000)).await;
        let service = PaymentService::new(store.clone());

        for cents in [999, 1001, 0, 100_000] {
            let err = service.initiate(initiate(&order_id, cents)).await.unwrap_err();
            assert!(matches!(err, DomainError::AmountMismatch { .. }));
        }
        assert_eq!(store.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_initiate_requires_unpaid_order() {
        let (store, order_id) = store_with_order(Money::from_cents(500)).await;
        store
            .transition_order_status(&order_id, OrderStatus::Unpaid, OrderStatus::Cancelled)
            .await
            .unwrap();
        let service = PaymentService::new(store);

        let err = service.initiate(initiate(&order_id, 500)).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));

        let err = service
            .initiate(initiate(&OrderId::new("ORD0404"), 500))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_completion_propagates_once() {
        let (store, order_id) = store_with_order(Money::from_cents(1000)).await;
        let service = PaymentService::new(store.clone());
        let payment = service.initiate(initiate(&order_id, 1000)).await.unwrap();

        for _ in 0..2 {
            let updated = service
                .update_status(
                    &payment.pay_code,
                    UpdatePaymentStatus::new(PaymentStatus::Completed),
                )
                .await
                .unwrap();
            assert_eq!(updated.status, PaymentStatus::Completed);

            let order = store.find_order(&order_id).await.unwrap().unwrap();
            assert_eq!(order.status, OrderStatus::Paid);
        }
    }

    #[tokio::test]
    async fn test_failed_payment_leaves_order_unpaid() {
        let (store, order_id) = store_with_order(Money::from_cents(1000)).await;
        let service = PaymentService::new(store.clone());
        let first = service.initiate(initiate(&order_id, 1000)).await.unwrap();

        let failed = service
            .update_status(
                &first.pay_code,
                UpdatePaymentStatus {
                    status: PaymentStatus::Failed,
                    transaction_number: Some("PROVIDER-42".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(failed.transaction_number.as_deref(), Some("PROVIDER-42"));

        let order = store.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Unpaid);

        // A retry is a new attempt
        let retry = service.initiate(initiate(&order_id, 1000)).await.unwrap();
        assert_eq!(retry.pay_code.as_str(), "PAY0002");
        assert_eq!(service.list_for_order(&order_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_completion_on_cancelled_order_keeps_it_cancelled() {
        let (store, order_id) = store_with_order(Money::from_cents(1000)).await;
        let service = PaymentService::new(store.clone());
        let payment = service.initiate(initiate(&order_id, 1000)).await.unwrap();
        store
            .transition_order_status(&order_id, OrderStatus::Unpaid, OrderStatus::Cancelled)
            .await
            .unwrap();

        service
            .update_status(
                &payment.pay_code,
                UpdatePaymentStatus::new(PaymentStatus::Completed),
            )
            .await
            .unwrap();

        let order = store.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_update_unknown_payment_is_not_found() {
        let (store, _) = store_with_order(Money::from_cents(1000)).await;
        let service = PaymentService::new(store);

        let err = service
            .update_status(
                &PayCode::new("PAY0404"),
                UpdatePaymentStatus::new(PaymentStatus::Completed),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_transaction_number_longer_than_64_is_rejected() {
        let (store, order_id) = store_with_order(Money::from_cents(1000)).await;
        let service = PaymentService::new(store.clone());
        let payment = service.initiate(initiate(&order_id, 1000)).await.unwrap();

        let err = service
            .update_status(
                &payment.pay_code,
                UpdatePaymentStatus {
                    status: PaymentStatus::Completed,
                    transaction_number: Some("X".repeat(65)),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));

        let stored = store.find_payment(&payment.pay_code).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Waiting);
        let order = store.find_order(&order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Unpaid);

        service
            .update_status(
                &payment.pay_code,
                UpdatePaymentStatus {
                    status: PaymentStatus::Completed,
                    transaction_number: Some("X".repeat(64)),
                },
            )
            .await
            .unwrap();
    }
}
