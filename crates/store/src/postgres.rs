use std::fmt::Display;
use std::str::FromStr;

use async_trait::async_trait;
use common::{
    AccountStatus, CategoryId, CodePrefix, CustomerId, DishId, Money, OrderId, OrderStatus, PayCode,
    PaymentMethod, StaffId, next_code,
};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};

use crate::records::{
    Account, Category, Customer, Dish, NewDish, NewOrder, NewPayment, NewRegistration,
    NewStaffUser, Order, Payment, Registration, StaffUser,
};
use crate::store::{CatalogStore, IdentityStore, OrderStore, PaymentStore};
use crate::{Result, StoreError};

const STAFF_COLUMNS: &str = "id, username, password_hash, role, created_at, updated_at";
const CUSTOMER_COLUMNS: &str = "id, lastname, firstname, phone, email, created_at";
const ACCOUNT_COLUMNS: &str =
    "id, customer_id, username, password_hash, role, status, created_at";
const DISH_COLUMNS: &str = "id, name, description, price, available, image_path";
const ORDER_COLUMNS: &str = "id, dish_id, customer_id, category_id, order_date, order_time, \
     price, payment_phone, status, payment_deadline, delivery_date, pay_method, \
     created_at, updated_at";
const PAYMENT_COLUMNS: &str = "pay_code, order_id, method, amount, payment_phone, \
     transaction_number, payment_date, status, created_at, updated_at";

/// PostgreSQL-backed store implementation.
///
/// Code allocation takes a transaction-scoped advisory lock keyed on the
/// code prefix, so concurrent inserts of the same kind are serialized
/// across every process sharing the database.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool to `url`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// SQLSTATE for a string that does not fit its `VARCHAR` column.
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";
/// SQLSTATE for a number that does not fit its `NUMERIC` column.
const NUMERIC_VALUE_OUT_OF_RANGE: &str = "22003";

/// Maps constraint violations to `Conflict` and oversized values to
/// `Invalid`, everything else to `Database`.
fn map_write_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = e {
        if let Some(code) = db_err.code() {
            if code == STRING_DATA_RIGHT_TRUNCATION || code == NUMERIC_VALUE_OUT_OF_RANGE {
                return StoreError::Invalid(db_err.message().to_string());
            }
        }
        if db_err.is_check_violation() {
            let constraint = db_err.constraint().unwrap_or("check");
            return StoreError::Invalid(format!("value violates {constraint}"));
        }
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique key");
            return StoreError::Conflict(format!("duplicate value violates {constraint}"));
        }
        if db_err.is_foreign_key_violation() {
            let constraint = db_err.constraint().unwrap_or("foreign key");
            return StoreError::Conflict(format!("record is still referenced ({constraint})"));
        }
    }
    StoreError::Database(e)
}

fn parse_column<T>(row: &PgRow, column: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw: String = row.try_get(column)?;
    raw.parse()
        .map_err(|e: T::Err| StoreError::Decode(format!("{column}: {e}")))
}

fn money_column(row: &PgRow, column: &str) -> Result<Money> {
    let raw: Decimal = row.try_get(column)?;
    Money::try_from(raw).map_err(|e| StoreError::Decode(format!("{column}: {e}")))
}

/// Serializes allocation of codes with `prefix` until the transaction ends.
async fn lock_prefix(conn: &mut PgConnection, prefix: CodePrefix) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(prefix.as_str())
        .execute(conn)
        .await?;
    Ok(())
}

/// Computes the next code from the identifiers already in `table`.
///
/// Must be called after [`lock_prefix`] in the same transaction.
async fn allocate_code(
    conn: &mut PgConnection,
    prefix: CodePrefix,
    table: &str,
    column: &str,
) -> Result<String> {
    let sql = format!("SELECT {column} FROM {table} WHERE {column} LIKE $1");
    let existing: Vec<String> = sqlx::query_scalar(&sql)
        .bind(format!("{}%", prefix.as_str()))
        .fetch_all(conn)
        .await?;
    Ok(next_code(prefix, existing.iter().map(String::as_str)))
}

async fn exists(conn: &mut PgConnection, table: &str, id: impl Display) -> Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id::text = $1)");
    let found: bool = sqlx::query_scalar(&sql)
        .bind(id.to_string())
        .fetch_one(conn)
        .await?;
    Ok(found)
}

async fn ensure_order_references(
    conn: &mut PgConnection,
    dish: DishId,
    customer: &CustomerId,
    category: CategoryId,
) -> Result<()> {
    if !exists(&mut *conn, "dishes", dish).await? {
        return Err(StoreError::not_found("dish", dish));
    }
    if !exists(&mut *conn, "customers", customer).await? {
        return Err(StoreError::not_found("customer", customer));
    }
    if !exists(&mut *conn, "categories", category).await? {
        return Err(StoreError::not_found("category", category));
    }
    Ok(())
}

fn row_to_staff(row: PgRow) -> Result<StaffUser> {
    Ok(StaffUser {
        id: StaffId::new(row.try_get("id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role: parse_column(&row, "role")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_customer(row: PgRow) -> Result<Customer> {
    Ok(Customer {
        id: CustomerId::new(row.try_get::<String, _>("id")?),
        lastname: row.try_get("lastname")?,
        firstname: row.try_get("firstname")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_account(row: PgRow) -> Result<Account> {
    Ok(Account {
        id: row.try_get("id")?,
        customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        role: parse_column(&row, "role")?,
        status: parse_column(&row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_dish(row: PgRow) -> Result<Dish> {
    Ok(Dish {
        id: DishId::new(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        price: money_column(&row, "price")?,
        available: row.try_get("available")?,
        image_path: row.try_get("image_path")?,
    })
}

fn row_to_category(row: PgRow) -> Result<Category> {
    Ok(Category {
        id: CategoryId::new(row.try_get("id")?),
        name: row.try_get("name")?,
    })
}

fn row_to_order(row: PgRow) -> Result<Order> {
    let pay_method: Option<String> = row.try_get("pay_method")?;
    let pay_method = pay_method
        .map(|m| m.parse::<PaymentMethod>())
        .transpose()
        .map_err(|e| StoreError::Decode(format!("pay_method: {e}")))?;

    Ok(Order {
        id: OrderId::new(row.try_get::<String, _>("id")?),
        dish_id: DishId::new(row.try_get("dish_id")?),
        customer_id: CustomerId::new(row.try_get::<String, _>("customer_id")?),
        category_id: CategoryId::new(row.try_get("category_id")?),
        order_date: row.try_get("order_date")?,
        order_time: row.try_get("order_time")?,
        price: money_column(&row, "price")?,
        payment_phone: row.try_get("payment_phone")?,
        status: parse_column(&row, "status")?,
        payment_deadline: row.try_get("payment_deadline")?,
        delivery_date: row.try_get("delivery_date")?,
        pay_method,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_payment(row: PgRow) -> Result<Payment> {
    Ok(Payment {
        pay_code: PayCode::new(row.try_get::<String, _>("pay_code")?),
        order_id: OrderId::new(row.try_get::<String, _>("order_id")?),
        method: parse_column(&row, "method")?,
        amount: money_column(&row, "amount")?,
        payment_phone: row.try_get("payment_phone")?,
        transaction_number: row.try_get("transaction_number")?,
        payment_date: row.try_get("payment_date")?,
        status: parse_column(&row, "status")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl IdentityStore for PostgresStore {
    async fn create_staff(&self, user: NewStaffUser) -> Result<StaffUser> {
        let row = sqlx::query(&format!(
            "INSERT INTO staff_users (username, password_hash, role) VALUES ($1, $2, $3) \
             RETURNING {STAFF_COLUMNS}"
        ))
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        row_to_staff(row)
    }

    async fn find_staff(&self, id: StaffId) -> Result<Option<StaffUser>> {
        sqlx::query(&format!("SELECT {STAFF_COLUMNS} FROM staff_users WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_staff)
            .transpose()
    }

    async fn find_staff_by_username(&self, username: &str) -> Result<Option<StaffUser>> {
        sqlx::query(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff_users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(row_to_staff)
        .transpose()
    }

    async fn list_staff(&self) -> Result<Vec<StaffUser>> {
        sqlx::query(&format!("SELECT {STAFF_COLUMNS} FROM staff_users ORDER BY id"))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(row_to_staff)
            .collect()
    }

    async fn save_staff(&self, user: &StaffUser) -> Result<StaffUser> {
        sqlx::query(&format!(
            "UPDATE staff_users SET username = $2, password_hash = $3, role = $4, \
             updated_at = NOW() WHERE id = $1 RETURNING {STAFF_COLUMNS}"
        ))
        .bind(user.id.as_i64())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .map(row_to_staff)
        .transpose()?
        .ok_or_else(|| StoreError::not_found("staff user", user.id))
    }

    async fn delete_staff(&self, id: StaffId) -> Result<()> {
        let result = sqlx::query("DELETE FROM staff_users WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("staff user", id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, registration), fields(username = %registration.username))]
    async fn register_customer(&self, registration: NewRegistration) -> Result<Registration> {
        let mut tx = self.pool.begin().await?;

        lock_prefix(&mut tx, CodePrefix::Customer).await?;
        let code = allocate_code(&mut tx, CodePrefix::Customer, "customers", "id").await?;

        let customer = sqlx::query(&format!(
            "INSERT INTO customers (id, lastname, firstname, phone, email) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(&code)
        .bind(&registration.lastname)
        .bind(&registration.firstname)
        .bind(&registration.phone)
        .bind(&registration.email)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;
        let customer = row_to_customer(customer)?;

        let account = sqlx::query(&format!(
            "INSERT INTO accounts (customer_id, username, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&code)
        .bind(&registration.username)
        .bind(&registration.password_hash)
        .bind(registration.role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;
        let account = row_to_account(account)?;

        // Dropping the transaction on any error above rolls back both rows
        tx.commit().await?;

        tracing::debug!(customer_id = %customer.id, "Customer registered");
        Ok(Registration { customer, account })
    }

    async fn find_customer(&self, id: &CustomerId) -> Result<Option<Customer>> {
        sqlx::query(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(row_to_customer)
        .transpose()
    }

    async fn find_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .map(row_to_account)
        .transpose()
    }

    async fn find_account_by_customer(&self, id: &CustomerId) -> Result<Option<Account>> {
        sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE customer_id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(row_to_account)
        .transpose()
    }

    async fn set_account_status(&self, id: &CustomerId, status: AccountStatus) -> Result<Account> {
        sqlx::query(&format!(
            "UPDATE accounts SET status = $2 WHERE customer_id = $1 RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id.as_str())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(row_to_account)
        .transpose()?
        .ok_or_else(|| StoreError::not_found("account", id))
    }

    async fn delete_customer(&self, id: &CustomerId) -> Result<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("customer", id));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PostgresStore {
    async fn create_dish(&self, dish: NewDish) -> Result<Dish> {
        let row = sqlx::query(&format!(
            "INSERT INTO dishes (name, description, price, available, image_path) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {DISH_COLUMNS}"
        ))
        .bind(&dish.name)
        .bind(&dish.description)
        .bind(dish.price.amount())
        .bind(dish.available)
        .bind(&dish.image_path)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        row_to_dish(row)
    }

    async fn find_dish(&self, id: DishId) -> Result<Option<Dish>> {
        sqlx::query(&format!("SELECT {DISH_COLUMNS} FROM dishes WHERE id = $1"))
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_dish)
            .transpose()
    }

    async fn list_dishes(&self) -> Result<Vec<Dish>> {
        sqlx::query(&format!("SELECT {DISH_COLUMNS} FROM dishes ORDER BY id"))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(row_to_dish)
            .collect()
    }

    async fn save_dish(&self, dish: &Dish) -> Result<Dish> {
        sqlx::query(&format!(
            "UPDATE dishes SET name = $2, description = $3, price = $4, available = $5, \
             image_path = $6 WHERE id = $1 RETURNING {DISH_COLUMNS}"
        ))
        .bind(dish.id.as_i64())
        .bind(&dish.name)
        .bind(&dish.description)
        .bind(dish.price.amount())
        .bind(dish.available)
        .bind(&dish.image_path)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .map(row_to_dish)
        .transpose()?
        .ok_or_else(|| StoreError::not_found("dish", dish.id))
    }

    async fn delete_dish(&self, id: DishId) -> Result<()> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("dish", id));
        }
        Ok(())
    }

    async fn create_category(&self, name: &str) -> Result<Category> {
        let row = sqlx::query("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        row_to_category(row)
    }

    async fn find_category(&self, id: CategoryId) -> Result<Option<Category>> {
        sqlx::query("SELECT id, name FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_category)
            .transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        sqlx::query("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(row_to_category)
            .collect()
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("category", id));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[tracing::instrument(skip(self, order))]
    async fn insert_order(&self, order: NewOrder) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        ensure_order_references(&mut tx, order.dish_id, &order.customer_id, order.category_id)
            .await?;

        lock_prefix(&mut tx, CodePrefix::Order).await?;
        let code = allocate_code(&mut tx, CodePrefix::Order, "orders", "id").await?;

        let row = sqlx::query(&format!(
            "INSERT INTO orders (id, dish_id, customer_id, category_id, order_date, order_time, \
             price, payment_phone, status, payment_deadline, delivery_date, pay_method) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&code)
        .bind(order.dish_id.as_i64())
        .bind(order.customer_id.as_str())
        .bind(order.category_id.as_i64())
        .bind(order.order_date)
        .bind(order.order_time)
        .bind(order.price.amount())
        .bind(&order.payment_phone)
        .bind(OrderStatus::Unpaid.as_str())
        .bind(order.payment_deadline)
        .bind(order.delivery_date)
        .bind(order.pay_method.map(|m| m.as_str()))
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;
        let order = row_to_order(row)?;

        tx.commit().await?;
        Ok(order)
    }

    async fn find_order(&self, id: &OrderId) -> Result<Option<Order>> {
        sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?
            .map(row_to_order)
            .transpose()
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY LENGTH(id), id"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(row_to_order)
        .collect()
    }

    async fn save_order(&self, order: &Order, expected: OrderStatus) -> Result<Option<Order>> {
        let mut tx = self.pool.begin().await?;

        ensure_order_references(&mut tx, order.dish_id, &order.customer_id, order.category_id)
            .await?;

        let row = sqlx::query(&format!(
            "UPDATE orders SET dish_id = $2, customer_id = $3, category_id = $4, \
             order_date = $5, order_time = $6, price = $7, payment_phone = $8, \
             payment_deadline = $9, delivery_date = $10, pay_method = $11, status = $12, \
             updated_at = NOW() WHERE id = $1 AND status = $13 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id.as_str())
        .bind(order.dish_id.as_i64())
        .bind(order.customer_id.as_str())
        .bind(order.category_id.as_i64())
        .bind(order.order_date)
        .bind(order.order_time)
        .bind(order.price.amount())
        .bind(&order.payment_phone)
        .bind(order.payment_deadline)
        .bind(order.delivery_date)
        .bind(order.pay_method.map(|m| m.as_str()))
        .bind(order.status.as_str())
        .bind(expected.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_write_error)?;

        let Some(row) = row else {
            let exists = sqlx::query("SELECT 1 FROM orders WHERE id = $1")
                .bind(order.id.as_str())
                .fetch_optional(&mut *tx)
                .await?
                .is_some();
            if !exists {
                return Err(StoreError::not_found("order", &order.id));
            }
            return Ok(None);
        };
        let saved = row_to_order(row)?;

        tx.commit().await?;
        Ok(Some(saved))
    }

    async fn transition_order_status(
        &self,
        id: &OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE orders SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id.as_str())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        let mut conn = self.pool.acquire().await?;
        if !exists(&mut conn, "orders", id).await? {
            return Err(StoreError::not_found("order", id));
        }
        Ok(false)
    }

    async fn delete_order(&self, id: &OrderId) -> Result<()> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("order", id));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentStore for PostgresStore {
    #[tracing::instrument(skip(self, payment), fields(order_id = %payment.order_id))]
    async fn insert_payment(&self, payment: NewPayment) -> Result<Payment> {
        let mut tx = self.pool.begin().await?;

        if !exists(&mut tx, "orders", &payment.order_id).await? {
            return Err(StoreError::not_found("order", &payment.order_id));
        }

        lock_prefix(&mut tx, CodePrefix::Payment).await?;
        let code = allocate_code(&mut tx, CodePrefix::Payment, "payments", "pay_code").await?;

        let row = sqlx::query(&format!(
            "INSERT INTO payments (pay_code, order_id, method, amount, payment_phone, \
             transaction_number, payment_date) VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(&code)
        .bind(payment.order_id.as_str())
        .bind(payment.method.as_str())
        .bind(payment.amount.amount())
        .bind(&payment.payment_phone)
        .bind(&payment.transaction_number)
        .bind(payment.payment_date)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_write_error)?;
        let payment = row_to_payment(row)?;

        tx.commit().await?;
        Ok(payment)
    }

    async fn find_payment(&self, code: &PayCode) -> Result<Option<Payment>> {
        sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE pay_code = $1"
        ))
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?
        .map(row_to_payment)
        .transpose()
    }

    async fn list_payments(&self) -> Result<Vec<Payment>> {
        sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments ORDER BY LENGTH(pay_code), pay_code"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(row_to_payment)
        .collect()
    }

    async fn list_payments_for_order(&self, id: &OrderId) -> Result<Vec<Payment>> {
        sqlx::query(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE order_id = $1 \
             ORDER BY LENGTH(pay_code), pay_code"
        ))
        .bind(id.as_str())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(row_to_payment)
        .collect()
    }

    async fn save_payment(&self, payment: &Payment) -> Result<Payment> {
        sqlx::query(&format!(
            "UPDATE payments SET method = $2, amount = $3, payment_phone = $4, \
             transaction_number = $5, payment_date = $6, status = $7, updated_at = NOW() \
             WHERE pay_code = $1 RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(payment.pay_code.as_str())
        .bind(payment.method.as_str())
        .bind(payment.amount.amount())
        .bind(&payment.payment_phone)
        .bind(&payment.transaction_number)
        .bind(payment.payment_date)
        .bind(payment.status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_write_error)?
        .map(row_to_payment)
        .transpose()?
        .ok_or_else(|| StoreError::not_found("payment", &payment.pay_code))
    }
}
