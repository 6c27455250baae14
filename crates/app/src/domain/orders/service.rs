//! Orders service.

use std::{
    collections::BTreeMap,
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use async_trait::async_trait;
use jiff::{Timestamp, ToSpan, civil::Date, tz::TimeZone};
use mockall::automock;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{
    database::Db,
    domain::{
        carts::repositories::{PgCartItemsRepository, PgCartsRepository},
        orders::{
            data::{
                CheckoutReceipt, DeliveryFilter, DriverStats, MAX_ORDER_AMOUNT, NewOrder,
                OrderFilter, Page, PaymentCheck, PaymentOutcome, SalesSummary, WebhookOutcome,
            },
            errors::OrdersServiceError,
            number::{MAX_ORDER_NUMBER_ATTEMPTS, generate_order_number},
            records::{
                DeliveryStatus, OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid,
                PaymentStatus,
            },
            repository::{OrderInsert, PgOrdersRepository, SalesPeriods},
        },
        users::{
            records::{Role, UserRecord, UserUuid},
            repository::PgUsersRepository,
        },
    },
    money::{self, MoneyError},
    payments::{GatewayEvent, IntentStatus, NewPaymentIntent, PaymentGateway},
};

#[derive(Clone)]
pub struct PgOrdersService {
    db: Db,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
    repository: PgOrdersRepository,
    users_repository: PgUsersRepository,
    carts_repository: PgCartsRepository,
    cart_items_repository: PgCartItemsRepository,
}

impl Debug for PgOrdersService {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PgOrdersService")
            .field("db", &self.db)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl PgOrdersService {
    /// Create the service, charging orders in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error if `currency` is not an ISO 4217 code.
    pub fn new(
        db: Db,
        gateway: Arc<dyn PaymentGateway>,
        currency: &str,
    ) -> Result<Self, MoneyError> {
        let currency = money::currency(currency)?.iso_alpha_code.to_ascii_lowercase();

        Ok(Self {
            db,
            gateway,
            currency,
            repository: PgOrdersRepository::new(),
            users_repository: PgUsersRepository::new(),
            carts_repository: PgCartsRepository::new(),
            cart_items_repository: PgCartItemsRepository::new(),
        })
    }

    async fn get_order(&self, order: OrderUuid) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let order = self.repository.get_order(&mut tx, order).await?;

        tx.commit().await?;

        Ok(order)
    }

    async fn get_customer(&self, user: UserUuid) -> Result<UserRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let customer = self
            .users_repository
            .get_user(&mut tx, user)
            .await
            .map_err(|error| missing_as(error, OrdersServiceError::InvalidReference))?;

        tx.commit().await?;

        Ok(customer)
    }

    /// Ask the gateway for a new intent covering `order` and store its reference.
    async fn request_payment(
        &self,
        order: OrderRecord,
        customer: &UserRecord,
    ) -> Result<CheckoutReceipt, OrdersServiceError> {
        let amount_minor = money::to_minor_units(order.total, &order.currency)?;

        let metadata = BTreeMap::from([
            ("user_id".to_string(), order.user_uuid.to_string()),
            ("order_id".to_string(), order.uuid.to_string()),
            ("order_number".to_string(), order.order_number.clone()),
            ("address_id".to_string(), order.address_uuid.to_string()),
            ("total_amount".to_string(), order.total.to_string()),
        ]);

        let intent = self
            .gateway
            .create_intent(NewPaymentIntent {
                amount_minor,
                currency: order.currency.clone(),
                description: format!("Order {}", order.order_number),
                receipt_email: Some(customer.email.clone()),
                metadata,
            })
            .await
            .inspect_err(|error| {
                warn!(order = %order.uuid, "payment intent creation failed: {error}");
            })?;

        let client_secret = intent
            .client_secret
            .ok_or(OrdersServiceError::MissingClientSecret)?;

        let mut tx = self.db.begin().await?;

        let order = match self
            .repository
            .set_payment_intent(&mut tx, order.uuid, &intent.id)
            .await?
        {
            Some(updated) => self.repository.with_items(&mut tx, updated).await?,
            None => {
                warn!(order = %order.uuid, intent_id = %intent.id, "order already has a payment intent");

                self.repository.get_order(&mut tx, order.uuid).await?
            }
        };

        tx.commit().await?;

        Ok(CheckoutReceipt {
            order,
            client_secret,
            amount_minor,
        })
    }

    /// Move a pending payment to `target`, clearing the owner's cart when the
    /// order ends up paid. A lost race reports the winner's state.
    async fn settle(
        &self,
        order: OrderRecord,
        target: PaymentStatus,
    ) -> Result<PaymentCheck, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let settled = self
            .repository
            .settle_payment(&mut tx, order.uuid, target)
            .await?;

        let won = settled.is_some();

        let current = match settled {
            Some(updated) => self.repository.with_items(&mut tx, updated).await?,
            None => self.repository.get_order(&mut tx, order.uuid).await?,
        };

        if current.payment_status == PaymentStatus::Completed {
            self.carts_repository
                .clear_cart(&mut tx, current.user_uuid)
                .await?;
        }

        tx.commit().await?;

        if won {
            info!(order = %current.uuid, status = %target, "payment settled");
        } else {
            debug!(order = %current.uuid, status = %current.payment_status, "payment already settled");
        }

        let outcome = match current.payment_status {
            PaymentStatus::Completed => PaymentOutcome::Completed,
            PaymentStatus::Failed if won => PaymentOutcome::Canceled,
            PaymentStatus::Failed => PaymentOutcome::Failed,
            PaymentStatus::Pending => PaymentOutcome::AwaitingPayment,
        };

        Ok(PaymentCheck {
            order: current,
            outcome,
        })
    }

    /// The single reconciliation rule shared by polling and webhooks.
    async fn apply_intent_status(
        &self,
        order: OrderRecord,
        status: &IntentStatus,
    ) -> Result<PaymentCheck, OrdersServiceError> {
        let outcome = match status {
            IntentStatus::Succeeded => return self.settle(order, PaymentStatus::Completed).await,
            IntentStatus::Canceled => return self.settle(order, PaymentStatus::Failed).await,
            IntentStatus::Processing => PaymentOutcome::Processing,
            IntentStatus::RequiresPaymentMethod => PaymentOutcome::RequiresPaymentMethod,
            other => PaymentOutcome::Unsettled(other.clone()),
        };

        Ok(PaymentCheck { order, outcome })
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn create_order(
        &self,
        user: UserUuid,
        new_order: NewOrder,
    ) -> Result<CheckoutReceipt, OrdersServiceError> {
        if new_order.delivery_charges < Decimal::ZERO {
            return Err(OrdersServiceError::NegativeDeliveryCharges);
        }

        if new_order.delivery_charges > MAX_ORDER_AMOUNT {
            return Err(OrdersServiceError::AmountOutOfRange);
        }

        if new_order.scheduled_delivery_date < today() {
            return Err(OrdersServiceError::ScheduledDateInPast);
        }

        let mut tx = self.db.begin().await?;

        let customer = self
            .users_repository
            .get_user(&mut tx, user)
            .await
            .map_err(|error| missing_as(error, OrdersServiceError::InvalidReference))?;

        let lines = match self.carts_repository.find_cart(&mut tx, user).await? {
            Some(cart) => {
                self.cart_items_repository
                    .get_cart_items(&mut tx, cart.uuid)
                    .await?
            }
            None => Vec::new(),
        };

        if lines.is_empty() {
            return Err(OrdersServiceError::EmptyCart);
        }

        self.users_repository
            .get_user_address(&mut tx, user, new_order.address_uuid)
            .await?
            .ok_or(OrdersServiceError::AddressNotFound)?;

        let items: Vec<OrderItemRecord> = lines
            .into_iter()
            .map(|line| OrderItemRecord {
                uuid: OrderItemUuid::new(),
                product_uuid: line.product_uuid,
                product_name: line.product_name,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        let subtotal: Decimal = items.iter().map(OrderItemRecord::line_total).sum();

        let total = subtotal
            .checked_add(new_order.delivery_charges)
            .filter(|total| *total <= MAX_ORDER_AMOUNT)
            .ok_or(OrdersServiceError::AmountOutOfRange)?;

        // Reject unpayable totals before anything is written.
        money::to_minor_units(total, &self.currency).map_err(|error| match error {
            MoneyError::Overflow => OrdersServiceError::AmountOutOfRange,
            other => OrdersServiceError::Money(other),
        })?;

        let order_uuid = OrderUuid::new();
        let mut created = None;

        for attempt in 1..=MAX_ORDER_NUMBER_ATTEMPTS {
            let order_number = generate_order_number(&mut rand::thread_rng());

            let insert = OrderInsert {
                uuid: order_uuid,
                user_uuid: user,
                order_number: &order_number,
                address_uuid: new_order.address_uuid,
                scheduled_delivery_date: new_order.scheduled_delivery_date,
                customer_note: new_order.customer_note.as_deref(),
                subtotal,
                delivery_charges: new_order.delivery_charges,
                total,
                currency: &self.currency,
            };

            if let Some(order) = self.repository.create_order(&mut tx, &insert).await? {
                created = Some(order);
                break;
            }

            debug!(attempt, %order_number, "order number already taken");
        }

        let Some(mut order) = created else {
            return Err(OrdersServiceError::OrderNumberExhausted);
        };

        for item in &items {
            self.repository
                .create_order_item(&mut tx, order.uuid, item)
                .await?;
        }

        tx.commit().await?;

        order.items = items;

        info!(order = %order.uuid, order_number = %order.order_number, %total, "order created");

        self.request_payment(order, &customer).await
    }

    async fn retry_payment(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<CheckoutReceipt, OrdersServiceError> {
        let order = self.get_order(order).await?;

        if !order.is_owned_by(user) {
            return Err(OrdersServiceError::NotOrderOwner);
        }

        if order.payment_status != PaymentStatus::Pending {
            return Err(OrdersServiceError::PaymentNotRetryable);
        }

        let Some(intent_id) = order.payment_intent_id.clone() else {
            let customer = self.get_customer(user).await?;

            return self.request_payment(order, &customer).await;
        };

        let intent = self.gateway.retrieve_intent(&intent_id).await?;

        match intent.status {
            IntentStatus::Succeeded | IntentStatus::Canceled => {
                self.apply_intent_status(order, &intent.status).await?;

                Err(OrdersServiceError::PaymentNotRetryable)
            }
            _ => Ok(CheckoutReceipt {
                amount_minor: intent.amount_minor,
                client_secret: intent
                    .client_secret
                    .ok_or(OrdersServiceError::MissingClientSecret)?,
                order,
            }),
        }
    }

    async fn check_payment_status(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<PaymentCheck, OrdersServiceError> {
        let order = self.get_order(order).await?;

        if !order.is_owned_by(user) {
            return Err(OrdersServiceError::NotOrderOwner);
        }

        match order.payment_status {
            PaymentStatus::Completed => {
                let mut tx = self.db.begin().await?;

                self.carts_repository.clear_cart(&mut tx, user).await?;

                tx.commit().await?;

                Ok(PaymentCheck {
                    order,
                    outcome: PaymentOutcome::Completed,
                })
            }
            PaymentStatus::Failed => Ok(PaymentCheck {
                order,
                outcome: PaymentOutcome::Failed,
            }),
            PaymentStatus::Pending => {
                let Some(intent_id) = order.payment_intent_id.clone() else {
                    return Ok(PaymentCheck {
                        order,
                        outcome: PaymentOutcome::AwaitingPayment,
                    });
                };

                let intent = self.gateway.retrieve_intent(&intent_id).await?;

                self.apply_intent_status(order, &intent.status).await
            }
        }
    }

    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookOutcome, OrdersServiceError> {
        let event = self.gateway.verify_event(payload, signature)?;

        self.handle_gateway_event(event).await
    }

    async fn handle_gateway_event(
        &self,
        event: GatewayEvent,
    ) -> Result<WebhookOutcome, OrdersServiceError> {
        let (event_id, kind, intent) = match event {
            GatewayEvent::PaymentIntent { id, kind, intent } => (id, kind, intent),
            GatewayEvent::Other { id, kind } => {
                info!(event_id = %id, %kind, "ignoring gateway event");

                return Ok(WebhookOutcome::Ignored { kind });
            }
        };

        let mut tx = self.db.begin().await?;

        let found = self
            .repository
            .find_order_by_intent(&mut tx, &intent.id)
            .await?;

        tx.commit().await?;

        let Some(order) = found else {
            warn!(%event_id, %kind, intent_id = %intent.id, "no order for payment intent");

            return Ok(WebhookOutcome::UnknownIntent {
                intent_id: intent.id,
            });
        };

        debug!(%event_id, %kind, order = %order.uuid, status = %intent.status, "reconciling order");

        let check = match order.payment_status {
            PaymentStatus::Pending => self.apply_intent_status(order, &intent.status).await?,
            PaymentStatus::Completed => PaymentCheck {
                order,
                outcome: PaymentOutcome::Completed,
            },
            PaymentStatus::Failed => PaymentCheck {
                order,
                outcome: PaymentOutcome::Failed,
            },
        };

        Ok(WebhookOutcome::Reconciled(check))
    }

    async fn update_delivery_status(
        &self,
        order: OrderUuid,
        status: DeliveryStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_delivery_status(&mut tx, order, status)
            .await?;

        let updated = self.repository.with_items(&mut tx, updated).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn update_payment_status(
        &self,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_payment_status(&mut tx, order, status)
            .await?;

        let updated = self.repository.with_items(&mut tx, updated).await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn assign_driver(
        &self,
        order: OrderUuid,
        driver: UserUuid,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let candidate = self
            .users_repository
            .get_user(&mut tx, driver)
            .await
            .map_err(|error| missing_as(error, OrdersServiceError::DriverNotFound))?;

        if candidate.role != Role::Driver {
            return Err(OrdersServiceError::NotADriver);
        }

        if !candidate.is_available {
            return Err(OrdersServiceError::DriverUnavailable);
        }

        let current = self.repository.lock_order(&mut tx, order).await?;

        if current.delivery_status == DeliveryStatus::Delivered {
            return Err(OrdersServiceError::AssignDelivered);
        }

        let updated = self.repository.assign_driver(&mut tx, order, driver).await?;
        let updated = self.repository.with_items(&mut tx, updated).await?;

        tx.commit().await?;

        info!(
            %order,
            %driver,
            previous = ?current.assigned_driver_uuid,
            "driver assigned"
        );

        Ok(updated)
    }

    async fn unassign_driver(
        &self,
        order: OrderUuid,
        expected_driver: Option<UserUuid>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.repository.lock_order(&mut tx, order).await?;

        let Some(assigned) = current.assigned_driver_uuid else {
            return Err(OrdersServiceError::NoDriverAssigned);
        };

        if current.delivery_status == DeliveryStatus::Delivered {
            return Err(OrdersServiceError::UnassignDelivered);
        }

        if expected_driver.is_some_and(|expected| expected != assigned) {
            return Err(OrdersServiceError::DriverMismatch);
        }

        let updated = self.repository.unassign_driver(&mut tx, order).await?;
        let updated = self.repository.with_items(&mut tx, updated).await?;

        tx.commit().await?;

        info!(%order, driver = %assigned, "driver unassigned");

        Ok(updated)
    }

    async fn driver_update_status(
        &self,
        order: OrderUuid,
        driver: UserUuid,
        status: DeliveryStatus,
        notes: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.repository.lock_order(&mut tx, order).await?;

        if !current.is_assigned_to(driver) {
            return Err(OrdersServiceError::NotAssignedDriver);
        }

        if status == DeliveryStatus::Pending {
            return Err(OrdersServiceError::InvalidDriverStatus);
        }

        let notes = notes.as_deref().filter(|notes| !notes.trim().is_empty());

        let updated = self
            .repository
            .driver_update_status(&mut tx, order, status, notes)
            .await?;

        let updated = self.repository.with_items(&mut tx, updated).await?;

        tx.commit().await?;

        info!(%order, %driver, %status, "delivery status updated by driver");

        Ok(updated)
    }

    async fn list_user_orders(
        &self,
        user: UserUuid,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.repository.list_user_orders(&mut tx, user).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_driver_deliveries(
        &self,
        driver: UserUuid,
        filter: DeliveryFilter,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self
            .repository
            .list_driver_deliveries(&mut tx, driver, filter)
            .await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_unassigned_orders(
        &self,
        date: Option<Date>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let orders = self.repository.list_unassigned_orders(&mut tx, date).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn list_orders(
        &self,
        filter: OrderFilter,
    ) -> Result<Page<OrderRecord>, OrdersServiceError> {
        if !filter.is_valid() {
            return Err(OrdersServiceError::InvalidPagination);
        }

        let mut tx = self.db.begin().await?;

        let items = self.repository.list_orders(&mut tx, &filter).await?;
        let total = self.repository.count_orders(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(Page {
            items,
            total,
            page: filter.page,
            limit: filter.limit,
        })
    }

    async fn driver_stats(&self, driver: UserUuid) -> Result<DriverStats, OrdersServiceError> {
        let mut tx = self.db.begin().await?;

        let user = self
            .users_repository
            .get_user(&mut tx, driver)
            .await
            .map_err(|error| missing_as(error, OrdersServiceError::DriverNotFound))?;

        if user.role != Role::Driver {
            return Err(OrdersServiceError::NotADriver);
        }

        let stats = self
            .repository
            .driver_stats(&mut tx, driver, today())
            .await?;

        tx.commit().await?;

        Ok(stats)
    }

    async fn sales_summary(&self) -> Result<SalesSummary, OrdersServiceError> {
        let periods = sales_periods(today())?;

        let mut tx = self.db.begin().await?;

        let summary = self.repository.sales_summary(&mut tx, periods).await?;

        tx.commit().await?;

        Ok(summary)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Turn the user's cart into a `Pending` order and open a payment intent.
    async fn create_order(
        &self,
        user: UserUuid,
        new_order: NewOrder,
    ) -> Result<CheckoutReceipt, OrdersServiceError>;

    /// Hand out a client secret again for a still-pending order.
    async fn retry_payment(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<CheckoutReceipt, OrdersServiceError>;

    /// Reconcile an order by asking the gateway for its intent.
    async fn check_payment_status(
        &self,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<PaymentCheck, OrdersServiceError>;

    /// Verify a raw webhook delivery and reconcile the order it refers to.
    async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookOutcome, OrdersServiceError>;

    /// Reconcile from an already verified gateway event.
    async fn handle_gateway_event(
        &self,
        event: GatewayEvent,
    ) -> Result<WebhookOutcome, OrdersServiceError>;

    /// Set the delivery status. Any transition is allowed.
    async fn update_delivery_status(
        &self,
        order: OrderUuid,
        status: DeliveryStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Set the payment status. Any transition is allowed.
    async fn update_payment_status(
        &self,
        order: OrderUuid,
        status: PaymentStatus,
    ) -> Result<OrderRecord, OrdersServiceError>;

    async fn assign_driver(
        &self,
        order: OrderUuid,
        driver: UserUuid,
    ) -> Result<OrderRecord, OrdersServiceError>;

    async fn unassign_driver(
        &self,
        order: OrderUuid,
        expected_driver: Option<UserUuid>,
    ) -> Result<OrderRecord, OrdersServiceError>;

    /// Delivery progress reported by the assigned driver.
    async fn driver_update_status(
        &self,
        order: OrderUuid,
        driver: UserUuid,
        status: DeliveryStatus,
        notes: Option<String>,
    ) -> Result<OrderRecord, OrdersServiceError>;

    async fn list_user_orders(&self, user: UserUuid)
    -> Result<Vec<OrderRecord>, OrdersServiceError>;

    async fn list_driver_deliveries(
        &self,
        driver: UserUuid,
        filter: DeliveryFilter,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    /// Paid, undelivered orders still waiting for a driver.
    async fn list_unassigned_orders(
        &self,
        date: Option<Date>,
    ) -> Result<Vec<OrderRecord>, OrdersServiceError>;

    async fn list_orders(
        &self,
        filter: OrderFilter,
    ) -> Result<Page<OrderRecord>, OrdersServiceError>;

    async fn driver_stats(&self, driver: UserUuid) -> Result<DriverStats, OrdersServiceError>;

    async fn sales_summary(&self) -> Result<SalesSummary, OrdersServiceError>;
}

/// Current calendar day in UTC.
fn today() -> Date {
    Timestamp::now().to_zoned(TimeZone::UTC).date()
}

fn sales_periods(today: Date) -> Result<SalesPeriods, jiff::Error> {
    let offset = i64::from(today.weekday().to_monday_zero_offset());
    let this_week = today.checked_sub(offset.days())?;

    Ok(SalesPeriods {
        today_start: start_of_day(today)?,
        tomorrow_start: start_of_day(today.tomorrow()?)?,
        yesterday_start: start_of_day(today.yesterday()?)?,
        this_week_start: start_of_day(this_week)?,
        next_week_start: start_of_day(this_week.checked_add(7.days())?)?,
        last_week_start: start_of_day(this_week.checked_sub(7.days())?)?,
    })
}

fn start_of_day(date: Date) -> Result<Timestamp, jiff::Error> {
    Ok(date.to_zoned(TimeZone::UTC)?.timestamp())
}

fn missing_as(error: sqlx::Error, missing: OrdersServiceError) -> OrdersServiceError {
    match error {
        sqlx::Error::RowNotFound => missing,
        other => other.into(),
    }
}
