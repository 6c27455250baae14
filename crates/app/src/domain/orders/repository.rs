//! Orders Repository

use std::collections::HashMap;

use jiff::{Timestamp, civil::Date};
use jiff_sqlx::{Date as SqlxDate, Timestamp as SqlxTimestamp};
use rust_decimal::Decimal;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::{
    orders::{
        data::{DeliveryFilter, DriverStats, OrderFilter, SalesSummary},
        records::{
            DeliveryStatus, OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid, PaymentStatus,
        },
    },
    products::records::ProductUuid,
    users::records::{AddressUuid, UserUuid},
};

const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LOCK_ORDER_SQL: &str = include_str!("sql/lock_order.sql");
const FIND_ORDER_BY_INTENT_SQL: &str = include_str!("sql/find_order_by_intent.sql");
const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_ITEM_SQL: &str = include_str!("sql/create_order_item.sql");
const GET_ORDER_ITEMS_SQL: &str = include_str!("sql/get_order_items.sql");
const SET_PAYMENT_INTENT_SQL: &str = include_str!("sql/set_payment_intent.sql");
const SETTLE_PAYMENT_SQL: &str = include_str!("sql/settle_payment.sql");
const UPDATE_PAYMENT_STATUS_SQL: &str = include_str!("sql/update_payment_status.sql");
const UPDATE_DELIVERY_STATUS_SQL: &str = include_str!("sql/update_delivery_status.sql");
const DRIVER_UPDATE_STATUS_SQL: &str = include_str!("sql/driver_update_status.sql");
const ASSIGN_DRIVER_SQL: &str = include_str!("sql/assign_driver.sql");
const UNASSIGN_DRIVER_SQL: &str = include_str!("sql/unassign_driver.sql");
const LIST_USER_ORDERS_SQL: &str = include_str!("sql/list_user_orders.sql");
const LIST_DRIVER_DELIVERIES_SQL: &str = include_str!("sql/list_driver_deliveries.sql");
const LIST_UNASSIGNED_ORDERS_SQL: &str = include_str!("sql/list_unassigned_orders.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const COUNT_ORDERS_SQL: &str = include_str!("sql/count_orders.sql");
const DRIVER_STATS_SQL: &str = include_str!("sql/driver_stats.sql");
const SALES_SUMMARY_SQL: &str = include_str!("sql/sales_summary.sql");

/// Order row to insert at checkout.
#[derive(Debug, Clone)]
pub(crate) struct OrderInsert<'a> {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub order_number: &'a str,
    pub address_uuid: AddressUuid,
    pub scheduled_delivery_date: Date,
    pub customer_note: Option<&'a str>,
    pub subtotal: Decimal,
    pub delivery_charges: Decimal,
    pub total: Decimal,
    pub currency: &'a str,
}

/// Half-open UTC periods used by the sales summary.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SalesPeriods {
    pub today_start: Timestamp,
    pub tomorrow_start: Timestamp,
    pub yesterday_start: Timestamp,
    pub this_week_start: Timestamp,
    pub next_week_start: Timestamp,
    pub last_week_start: Timestamp,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        let record = query_as::<Postgres, OrderRecord>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        self.with_items(tx, record).await
    }

    /// Fetch an order and hold its row lock until the transaction ends.
    pub(crate) async fn lock_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(LOCK_ORDER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_order_by_intent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        intent_id: &str,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        let record = query_as::<Postgres, OrderRecord>(FIND_ORDER_BY_INTENT_SQL)
            .bind(intent_id)
            .fetch_optional(&mut **tx)
            .await?;

        match record {
            Some(record) => Ok(Some(self.with_items(tx, record).await?)),
            None => Ok(None),
        }
    }

    /// Insert an order. Returns `None` when the order number is already taken.
    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: &OrderInsert<'_>,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(order.user_uuid.into_uuid())
            .bind(order.order_number)
            .bind(order.address_uuid.into_uuid())
            .bind(SqlxDate::from(order.scheduled_delivery_date))
            .bind(order.customer_note)
            .bind(order.subtotal)
            .bind(order.delivery_charges)
            .bind(order.total)
            .bind(order.currency)
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn create_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        item: &OrderItemRecord,
    ) -> Result<(), sqlx::Error> {
        let quantity = i32::try_from(item.quantity).map_err(|e| sqlx::Error::ColumnDecode {
            index: "quantity".to_string(),
            source: Box::new(e),
        })?;

        query(CREATE_ORDER_ITEM_SQL)
            .bind(item.uuid.into_uuid())
            .bind(order.into_uuid())
            .bind(item.product_uuid.into_uuid())
            .bind(&item.product_name)
            .bind(quantity)
            .bind(item.unit_price)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Record the gateway reference. Returns `None` if one was already set.
    pub(crate) async fn set_payment_intent(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        intent_id: &str,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(SET_PAYMENT_INTENT_SQL)
            .bind(order.into_uuid())
            .bind(intent_id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Move a `Pending` payment to `status`. Returns `None` if the order had
    /// already left `Pending`.
    pub(crate) async fn settle_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<Option<OrderRecord>, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(SETTLE_PAYMENT_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_optional(&mut **tx)
            .await
    }

    pub(crate) async fn update_payment_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_PAYMENT_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_delivery_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: DeliveryStatus,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UPDATE_DELIVERY_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn driver_update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        status: DeliveryStatus,
        notes: Option<&str>,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(DRIVER_UPDATE_STATUS_SQL)
            .bind(order.into_uuid())
            .bind(status.as_str())
            .bind(notes)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn assign_driver(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        driver: UserUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(ASSIGN_DRIVER_SQL)
            .bind(order.into_uuid())
            .bind(driver.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn unassign_driver(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
    ) -> Result<OrderRecord, sqlx::Error> {
        query_as::<Postgres, OrderRecord>(UNASSIGN_DRIVER_SQL)
            .bind(order.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_user_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let orders = query_as::<Postgres, OrderRecord>(LIST_USER_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        self.with_all_items(tx, orders).await
    }

    pub(crate) async fn list_driver_deliveries(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        driver: UserUuid,
        filter: DeliveryFilter,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let orders = query_as::<Postgres, OrderRecord>(LIST_DRIVER_DELIVERIES_SQL)
            .bind(driver.into_uuid())
            .bind(filter.status.map(DeliveryStatus::as_str))
            .bind(filter.date.map(SqlxDate::from))
            .fetch_all(&mut **tx)
            .await?;

        self.with_all_items(tx, orders).await
    }

    pub(crate) async fn list_unassigned_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        date: Option<Date>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let orders = query_as::<Postgres, OrderRecord>(LIST_UNASSIGNED_ORDERS_SQL)
            .bind(date.map(SqlxDate::from))
            .fetch_all(&mut **tx)
            .await?;

        self.with_all_items(tx, orders).await
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        let orders = query_as::<Postgres, OrderRecord>(LIST_ORDERS_SQL)
            .bind(filter.status.map(DeliveryStatus::as_str))
            .bind(filter.driver.map(UserUuid::into_uuid))
            .bind(filter.date.map(SqlxDate::from))
            .bind(i64::from(filter.limit))
            .bind(filter.offset())
            .fetch_all(&mut **tx)
            .await?;

        self.with_all_items(tx, orders).await
    }

    pub(crate) async fn count_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        filter: &OrderFilter,
    ) -> Result<u64, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_ORDERS_SQL)
            .bind(filter.status.map(DeliveryStatus::as_str))
            .bind(filter.driver.map(UserUuid::into_uuid))
            .bind(filter.date.map(SqlxDate::from))
            .fetch_one(&mut **tx)
            .await?;

        to_count("count", count)
    }

    pub(crate) async fn driver_stats(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        driver: UserUuid,
        today: Date,
    ) -> Result<DriverStats, sqlx::Error> {
        let row = query(DRIVER_STATS_SQL)
            .bind(driver.into_uuid())
            .bind(SqlxDate::from(today))
            .fetch_one(&mut **tx)
            .await?;

        Ok(DriverStats {
            total: to_count("total", row.try_get("total")?)?,
            completed: to_count("completed", row.try_get("completed")?)?,
            pending: to_count("pending", row.try_get("pending")?)?,
            on_my_way: to_count("on_my_way", row.try_get("on_my_way")?)?,
            today: to_count("today", row.try_get("today")?)?,
            today_completed: to_count("today_completed", row.try_get("today_completed")?)?,
        })
    }

    pub(crate) async fn sales_summary(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        periods: SalesPeriods,
    ) -> Result<SalesSummary, sqlx::Error> {
        let row = query(SALES_SUMMARY_SQL)
            .bind(SqlxTimestamp::from(periods.today_start))
            .bind(SqlxTimestamp::from(periods.tomorrow_start))
            .bind(SqlxTimestamp::from(periods.yesterday_start))
            .bind(SqlxTimestamp::from(periods.this_week_start))
            .bind(SqlxTimestamp::from(periods.next_week_start))
            .bind(SqlxTimestamp::from(periods.last_week_start))
            .fetch_one(&mut **tx)
            .await?;

        Ok(SalesSummary {
            total: row.try_get("total")?,
            today: row.try_get("today")?,
            yesterday: row.try_get("yesterday")?,
            this_week: row.try_get("this_week")?,
            last_week: row.try_get("last_week")?,
        })
    }

    /// Attach line items to a single order.
    pub(crate) async fn with_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderRecord,
    ) -> Result<OrderRecord, sqlx::Error> {
        let mut orders = self.with_all_items(tx, vec![order]).await?;

        orders.pop().ok_or(sqlx::Error::RowNotFound)
    }

    async fn with_all_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut orders: Vec<OrderRecord>,
    ) -> Result<Vec<OrderRecord>, sqlx::Error> {
        if orders.is_empty() {
            return Ok(orders);
        }

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let rows = query(GET_ORDER_ITEMS_SQL)
            .bind(&uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut items: HashMap<Uuid, Vec<OrderItemRecord>> = HashMap::new();

        for row in &rows {
            let order_uuid: Uuid = row.try_get("order_uuid")?;

            items
                .entry(order_uuid)
                .or_default()
                .push(OrderItemRecord::from_row(row)?);
        }

        for order in &mut orders {
            order.items = items.remove(&order.uuid.into_uuid()).unwrap_or_default();
        }

        Ok(orders)
    }
}

fn to_count(column: &str, value: i64) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn decode_column<T, E>(column: &str, value: Result<T, E>) -> Result<T, sqlx::Error>
where
    E: std::error::Error + Send + Sync + 'static,
{
    value.map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let payment_status: String = row.try_get("payment_status")?;
        let delivery_status: String = row.try_get("delivery_status")?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            order_number: row.try_get("order_number")?,
            address_uuid: AddressUuid::from_uuid(row.try_get("address_uuid")?),
            scheduled_delivery_date: row
                .try_get::<SqlxDate, _>("scheduled_delivery_date")?
                .to_jiff(),
            customer_note: row.try_get("customer_note")?,
            items: Vec::new(),
            subtotal: row.try_get("subtotal")?,
            delivery_charges: row.try_get("delivery_charges")?,
            total: row.try_get("total")?,
            currency: row.try_get("currency")?,
            payment_status: decode_column("payment_status", payment_status.parse())?,
            payment_intent_id: row.try_get("payment_intent_id")?,
            delivery_status: decode_column("delivery_status", delivery_status.parse())?,
            assigned_driver_uuid: row
                .try_get::<Option<Uuid>, _>("assigned_driver_uuid")?
                .map(UserUuid::from_uuid),
            driver_assigned_at: row
                .try_get::<Option<SqlxTimestamp>, _>("driver_assigned_at")?
                .map(SqlxTimestamp::to_jiff),
            delivered_at: row
                .try_get::<Option<SqlxTimestamp>, _>("delivered_at")?
                .map(SqlxTimestamp::to_jiff),
            driver_notes: row.try_get("driver_notes")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let quantity: i32 = row.try_get("quantity")?;

        Ok(Self {
            uuid: OrderItemUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: ProductUuid::from_uuid(row.try_get("product_uuid")?),
            product_name: row.try_get("product_name")?,
            quantity: decode_column("quantity", u32::try_from(quantity))?,
            unit_price: row.try_get("unit_price")?,
        })
    }
}
