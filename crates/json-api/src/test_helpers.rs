//! Test helpers.

use std::sync::Arc;

use jiff::{Timestamp, civil::date};
use rust_decimal::Decimal;
use salvo::{affix_state::inject, catcher::Catcher, prelude::*};

use dispatch_app::{
    auth::{Identity, MockAuthService},
    context::AppContext,
    domain::{
        carts::MockCartsService,
        orders::{
            MockOrdersService,
            records::{
                DeliveryStatus, OrderItemRecord, OrderItemUuid, OrderRecord, OrderUuid,
                PaymentStatus,
            },
        },
        products::{MockProductsService, records::ProductUuid},
        users::{
            MockUsersService,
            records::{AddressUuid, Role, UserRecord, UserUuid},
        },
    },
};

use crate::{envelope::catch_errors, state::State};

/// Application state whose services reject any call not explicitly expected.
#[derive(Default)]
pub(crate) struct StateBuilder {
    users: Option<MockUsersService>,
    carts: Option<MockCartsService>,
    orders: Option<MockOrdersService>,
    auth: Option<MockAuthService>,
}

impl StateBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn users(mut self, users: MockUsersService) -> Self {
        self.users = Some(users);
        self
    }

    pub(crate) fn carts(mut self, carts: MockCartsService) -> Self {
        self.carts = Some(carts);
        self
    }

    pub(crate) fn orders(mut self, orders: MockOrdersService) -> Self {
        self.orders = Some(orders);
        self
    }

    pub(crate) fn auth(mut self, auth: MockAuthService) -> Self {
        self.auth = Some(auth);
        self
    }

    pub(crate) fn build(self) -> Arc<State> {
        State::from_app_context(AppContext {
            users: Arc::new(self.users.unwrap_or_else(strict_users_mock)),
            products: Arc::new(strict_products_mock()),
            carts: Arc::new(self.carts.unwrap_or_else(strict_carts_mock)),
            orders: Arc::new(self.orders.unwrap_or_else(strict_orders_mock)),
            auth: Arc::new(self.auth.unwrap_or_else(strict_auth_mock)),
        })
    }
}

fn strict_users_mock() -> MockUsersService {
    let mut users = MockUsersService::new();

    users.expect_get_user().never();
    users.expect_create_user().never();
    users.expect_add_address().never();
    users.expect_list_drivers().never();
    users.expect_set_availability().never();

    users
}

fn strict_products_mock() -> MockProductsService {
    let mut products = MockProductsService::new();

    products.expect_list_products().never();
    products.expect_get_product().never();
    products.expect_create_product().never();

    products
}

fn strict_carts_mock() -> MockCartsService {
    let mut carts = MockCartsService::new();

    carts.expect_get_cart().never();
    carts.expect_add_item().never();
    carts.expect_clear_cart().never();

    carts
}

pub(crate) fn strict_orders_mock() -> MockOrdersService {
    let mut orders = MockOrdersService::new();

    orders.expect_create_order().never();
    orders.expect_retry_payment().never();
    orders.expect_check_payment_status().never();
    orders.expect_handle_webhook().never();
    orders.expect_handle_gateway_event().never();
    orders.expect_update_delivery_status().never();
    orders.expect_update_payment_status().never();
    orders.expect_assign_driver().never();
    orders.expect_unassign_driver().never();
    orders.expect_driver_update_status().never();
    orders.expect_list_user_orders().never();
    orders.expect_list_driver_deliveries().never();
    orders.expect_list_unassigned_orders().never();
    orders.expect_list_orders().never();
    orders.expect_driver_stats().never();
    orders.expect_sales_summary().never();

    orders
}

fn strict_auth_mock() -> MockAuthService {
    let mut auth = MockAuthService::new();

    auth.expect_authenticate_bearer().never();

    auth
}

/// Mount `route` with state and a fixed caller identity, as the auth
/// middleware would.
pub(crate) fn service_as(identity: Identity, state: Arc<State>, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(inject(identity))
            .push(route),
    )
    .catcher(Catcher::default().hoop(catch_errors))
}

pub(crate) fn identity(role: Role) -> Identity {
    Identity {
        user: UserUuid::new(),
        role,
    }
}

pub(crate) fn make_order(owner: UserUuid) -> OrderRecord {
    let product = ProductUuid::new();

    OrderRecord {
        uuid: OrderUuid::new(),
        user_uuid: owner,
        order_number: "#482913".to_string(),
        address_uuid: AddressUuid::new(),
        scheduled_delivery_date: date(2026, 11, 2),
        customer_note: Some("Ring twice".to_string()),
        items: vec![
            OrderItemRecord {
                uuid: OrderItemUuid::new(),
                product_uuid: product,
                product_name: "Sourdough".to_string(),
                quantity: 2,
                unit_price: Decimal::new(10_00, 2),
            },
            OrderItemRecord {
                uuid: OrderItemUuid::new(),
                product_uuid: ProductUuid::new(),
                product_name: "Butter".to_string(),
                quantity: 1,
                unit_price: Decimal::new(5_50, 2),
            },
        ],
        subtotal: Decimal::new(25_50, 2),
        delivery_charges: Decimal::new(3_00, 2),
        total: Decimal::new(28_50, 2),
        currency: "usd".to_string(),
        payment_status: PaymentStatus::Pending,
        payment_intent_id: Some("pi_123".to_string()),
        delivery_status: DeliveryStatus::Pending,
        assigned_driver_uuid: None,
        driver_assigned_at: None,
        delivered_at: None,
        driver_notes: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_user(role: Role) -> UserRecord {
    UserRecord {
        uuid: UserUuid::new(),
        name: "Dana".to_string(),
        email: "dana@example.test".to_string(),
        phone: None,
        role,
        is_available: true,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}
