//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use common::{
    CategoryId, CustomerId, CustomerRole, DishId, Money, OrderId, OrderStatus, PaymentMethod,
    PaymentStatus, StaffRole,
};
use sqlx::PgPool;
use store::{
    CatalogStore, IdentityStore, NewDish, NewOrder, NewPayment, NewRegistration, NewStaffUser,
    OrderStore, PaymentStore, PostgresStore, StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!("../../../migrations/001_create_tables.sql"))
                .execute(&temp_pool)
                .await
                .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query(
        "TRUNCATE TABLE payments, orders, accounts, customers, dishes, categories, staff_users \
         RESTART IDENTITY",
    )
    .execute(&pool)
    .await
    .unwrap();

    PostgresStore::new(pool)
}

fn registration(username: &str, email: &str) -> NewRegistration {
    NewRegistration {
        lastname: "Ndiaye".to_string(),
        firstname: "Fatou".to_string(),
        phone: "+221770000000".to_string(),
        email: email.to_string(),
        username: username.to_string(),
        password_hash: "hash".to_string(),
        role: CustomerRole::Teacher,
    }
}

async fn seed(store: &PostgresStore) -> (DishId, CustomerId, CategoryId) {
    let dish = store
        .create_dish(NewDish {
            name: "Thieboudienne".to_string(),
            description: Some("Rice and fish".to_string()),
            price: Money::from_cents(1000),
            available: true,
            image_path: None,
        })
        .await
        .unwrap();
    let category = store.create_category("Lunch").await.unwrap();
    let reg = store
        .register_customer(registration("fatou", "fatou@example.com"))
        .await
        .unwrap();
    (dish.id, reg.customer.id, category.id)
}

fn new_order(dish: DishId, customer: &CustomerId, category: CategoryId) -> NewOrder {
    NewOrder {
        dish_id: dish,
        customer_id: customer.clone(),
        category_id: category,
        order_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
        order_time: NaiveTime::from_hms_opt(11, 30, 0).unwrap(),
        price: Money::from_cents(1000),
        payment_phone: Some("+221770000000".to_string()),
        payment_deadline: Utc::now() + Duration::hours(1),
        delivery_date: NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
        pay_method: Some(PaymentMethod::OrangeMoney),
    }
}

#[tokio::test]
async fn register_customer_writes_both_records() {
    let store = get_test_store().await;

    let reg = store
        .register_customer(registration("fatou", "fatou@example.com"))
        .await
        .unwrap();
    assert_eq!(reg.customer.id.as_str(), "CUS0001");

    let account = store
        .find_account_by_username("fatou")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.customer_id, reg.customer.id);
    assert_eq!(account.role, CustomerRole::Teacher);
}

#[tokio::test]
async fn register_customer_rolls_back_on_duplicate_username() {
    let store = get_test_store().await;
    store
        .register_customer(registration("fatou", "fatou@example.com"))
        .await
        .unwrap();

    let err = store
        .register_customer(registration("fatou", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn concurrent_order_inserts_get_distinct_codes() {
    let store = get_test_store().await;
    let (dish, customer, category) = seed(&store).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let order = new_order(dish, &customer, category);
        handles.push(tokio::spawn(async move { store.insert_order(order).await }));
    }

    let mut codes = Vec::new();
    for handle in handles {
        codes.push(handle.await.unwrap().unwrap().id.into_inner());
    }
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), 8);
    assert_eq!(codes.first().map(String::as_str), Some("ORD0001"));
    assert_eq!(codes.last().map(String::as_str), Some("ORD0008"));
}

#[tokio::test]
async fn order_round_trips_all_fields() {
    let store = get_test_store().await;
    let (dish, customer, category) = seed(&store).await;

    let created = store
        .insert_order(new_order(dish, &customer, category))
        .await
        .unwrap();
    let found = store.find_order(&created.id).await.unwrap().unwrap();

    assert_eq!(found.status, OrderStatus::Unpaid);
    assert_eq!(found.price, Money::from_cents(1000));
    assert_eq!(found.pay_method, Some(PaymentMethod::OrangeMoney));
    assert_eq!(found.order_time, created.order_time);
}

#[tokio::test]
async fn insert_order_rejects_unknown_dish() {
    let store = get_test_store().await;
    let (_, customer, category) = seed(&store).await;

    let err = store
        .insert_order(new_order(DishId::new(404), &customer, category))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { entity: "dish", .. }));
}

#[tokio::test]
async fn transition_only_applies_from_expected_status() {
    let store = get_test_store().await;
    let (dish, customer, category) = seed(&store).await;
    let order = store
        .insert_order(new_order(dish, &customer, category))
        .await
        .unwrap();

    let applied = store
        .transition_order_status(&order.id, OrderStatus::Unpaid, OrderStatus::Paid)
        .await
        .unwrap();
    let repeated = store
        .transition_order_status(&order.id, OrderStatus::Unpaid, OrderStatus::Paid)
        .await
        .unwrap();

    assert!(applied);
    assert!(!repeated);

    let err = store
        .transition_order_status(
            &OrderId::new("ORD9999"),
            OrderStatus::Unpaid,
            OrderStatus::Paid,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn save_order_writes_nothing_once_status_moved() {
    let store = get_test_store().await;
    let (dish, customer, category) = seed(&store).await;
    let order = store
        .insert_order(new_order(dish, &customer, category))
        .await
        .unwrap();
    store
        .transition_order_status(&order.id, OrderStatus::Unpaid, OrderStatus::Paid)
        .await
        .unwrap();

    let mut stale = order.clone();
    stale.price = Money::from_cents(2000);
    stale.status = OrderStatus::Cancelled;
    assert!(store
        .save_order(&stale, OrderStatus::Unpaid)
        .await
        .unwrap()
        .is_none());

    let stored = store.find_order(&order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
    assert_eq!(stored.price, order.price);

    let saved = store
        .save_order(&stale, OrderStatus::Paid)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.status, OrderStatus::Cancelled);
    assert_eq!(saved.price, Money::from_cents(2000));

    stale.id = OrderId::new("ORD9999");
    let err = store
        .save_order(&stale, OrderStatus::Unpaid)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn payments_block_order_deletion() {
    let store = get_test_store().await;
    let (dish, customer, category) = seed(&store).await;
    let order = store
        .insert_order(new_order(dish, &customer, category))
        .await
        .unwrap();

    let payment = store
        .insert_payment(NewPayment {
            order_id: order.id.clone(),
            method: PaymentMethod::Wave,
            amount: Money::from_cents(1000),
            payment_phone: None,
            transaction_number: "TXN-1700000000000-ABC123".to_string(),
            payment_date: Utc::now(),
        })
        .await
        .unwrap();
    assert_eq!(payment.pay_code.as_str(), "PAY0001");
    assert_eq!(payment.status, PaymentStatus::Waiting);

    let err = store.delete_order(&order.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));

    let err = store.delete_dish(dish).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
    assert!(store.find_order(&order.id).await.unwrap().is_some());
}

#[tokio::test]
async fn save_payment_updates_status() {
    let store = get_test_store().await;
    let (dish, customer, category) = seed(&store).await;
    let order = store
        .insert_order(new_order(dish, &customer, category))
        .await
        .unwrap();
    let mut payment = store
        .insert_payment(NewPayment {
            order_id: order.id.clone(),
            method: PaymentMethod::MtnMomo,
            amount: Money::from_cents(1000),
            payment_phone: Some("+221770000000".to_string()),
            transaction_number: "TXN-1700000000000-XYZ789".to_string(),
            payment_date: Utc::now(),
        })
        .await
        .unwrap();

    payment.status = PaymentStatus::Completed;
    let saved = store.save_payment(&payment).await.unwrap();
    assert_eq!(saved.status, PaymentStatus::Completed);

    let listed = store.list_payments_for_order(&order.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].method, PaymentMethod::MtnMomo);
}

#[tokio::test]
async fn oversized_transaction_number_is_invalid() {
    let store = get_test_store().await;
    let (dish, customer, category) = seed(&store).await;
    let order = store
        .insert_order(new_order(dish, &customer, category))
        .await
        .unwrap();
    let mut payment = store
        .insert_payment(NewPayment {
            order_id: order.id.clone(),
            method: PaymentMethod::Wave,
            amount: Money::from_cents(1000),
            payment_phone: None,
            transaction_number: "TXN-1700000000000-LEN064".to_string(),
            payment_date: Utc::now(),
        })
        .await
        .unwrap();

    payment.transaction_number = Some("X".repeat(80));
    let err = store.save_payment(&payment).await.unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[tokio::test]
async fn staff_username_conflicts() {
    let store = get_test_store().await;
    let user = NewStaffUser {
        username: "admin".to_string(),
        password_hash: "hash".to_string(),
        role: StaffRole::Administrator,
    };

    let created = store.create_staff(user.clone()).await.unwrap();
    assert_eq!(created.role, StaffRole::Administrator);

    let err = store.create_staff(user).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[tokio::test]
async fn category_names_are_unique() {
    let store = get_test_store().await;
    store.create_category("Dinner").await.unwrap();

    let err = store.create_category("Dinner").await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}
