//! App Router

use salvo::Router;

use crate::{auth, carts, drivers, orders, webhooks};

/// Every versioned route. The webhook is authenticated by its signature;
/// everything else needs a bearer token.
pub(crate) fn app_router() -> Router {
    Router::with_path("api/v1")
        .push(Router::with_path("gateway/webhook").post(webhooks::receive::handler))
        .push(
            Router::new()
                .hoop(auth::middleware::handler)
                .push(customer_router())
                .push(Router::new().hoop(auth::guards::staff).push(admin_router()))
                .push(Router::new().hoop(auth::guards::driver).push(driver_router())),
        )
}

fn customer_router() -> Router {
    Router::new()
        .push(
            Router::with_path("cart")
                .get(carts::get::handler)
                .delete(carts::clear::handler)
                .push(Router::with_path("items").post(carts::items::create::handler)),
        )
        .push(Router::with_path("order/create").post(orders::create::handler))
        .push(
            Router::with_path("order/check-payment-status")
                .post(orders::payment_status::handler),
        )
        .push(Router::with_path("order/retry-payment").post(orders::retry_payment::handler))
        .push(Router::with_path("order/history").get(orders::history::handler))
}

fn admin_router() -> Router {
    Router::with_path("order")
        .push(Router::with_path("update-status").put(orders::update_status::handler))
        .push(
            Router::with_path("update-payment-status")
                .put(orders::update_payment_status::handler),
        )
        .push(Router::with_path("assign-driver").post(orders::assign_driver::handler))
        .push(Router::with_path("unassign-driver").put(orders::unassign_driver::handler))
        .push(
            Router::with_path("drivers")
                .get(orders::drivers::handler)
                .push(Router::with_path("{driver}/stats").get(orders::driver_stats::handler)),
        )
        .push(Router::with_path("unassigned").get(orders::unassigned::handler))
        .push(Router::with_path("admin").get(orders::index::handler))
        .push(Router::with_path("sales").get(orders::sales::handler))
}

fn driver_router() -> Router {
    Router::with_path("order")
        .push(
            Router::with_path("update-delivery-status")
                .put(drivers::update_delivery_status::handler),
        )
        .push(
            Router::with_path("update-availability").put(drivers::update_availability::handler),
        )
        .push(Router::with_path("my-deliveries").get(drivers::deliveries::handler))
        .push(Router::with_path("driver-stats").get(drivers::stats::handler))
}

#[cfg(test)]
mod tests {
    use salvo::{
        Service,
        affix_state::inject,
        catcher::Catcher,
        http::{StatusCode, header::AUTHORIZATION},
        test::{ResponseExt, TestClient},
    };
    use testresult::TestResult;

    use dispatch_app::{
        auth::{AuthServiceError, Identity, MockAuthService},
        domain::{
            orders::{
                MockOrdersService,
                data::{SalesSummary, WebhookOutcome},
            },
            users::records::Role,
        },
    };

    use crate::{
        envelope::{ErrorBody, catch_errors},
        test_helpers::{StateBuilder, identity},
    };

    use super::*;

    fn make_service(state: StateBuilder) -> Service {
        Service::new(Router::new().hoop(inject(state.build())).push(app_router()))
            .catcher(Catcher::default().hoop(catch_errors))
    }

    fn authenticating_as(caller: Identity) -> MockAuthService {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .withf(|token| token == "token-123")
            .returning(move |_| Ok(caller));

        auth
    }

    #[tokio::test]
    async fn test_routes_require_a_bearer_token() -> TestResult {
        let mut res = TestClient::get("http://example.com/api/v1/order/history")
            .send(&make_service(StateBuilder::new()))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(body.status_code, 401);
        assert_eq!(body.message, "Unauthorized request");

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_tokens_are_unauthorized() -> TestResult {
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .returning(|_| Err(AuthServiceError::NotFound));

        let mut res = TestClient::get("http://example.com/api/v1/order/history")
            .add_header(AUTHORIZATION, "Bearer token-123", true)
            .send(&make_service(StateBuilder::new().auth(auth)))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(body.status_code, 401);
        assert_eq!(body.message, "Invalid access token");

        Ok(())
    }

    #[tokio::test]
    async fn test_admin_routes_reject_customers_and_drivers() -> TestResult {
        for role in [Role::User, Role::Driver] {
            let mut res = TestClient::get("http://example.com/api/v1/order/sales")
                .add_header(AUTHORIZATION, "Bearer token-123", true)
                .send(&make_service(
                    StateBuilder::new().auth(authenticating_as(identity(role))),
                ))
                .await;

            let body: ErrorBody = res.take_json().await?;

            assert_eq!(body.status_code, 403, "{role}");
            assert_eq!(
                body.message,
                "You are not authorized to access this resource"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_driver_routes_reject_admins() -> TestResult {
        let res = TestClient::get("http://example.com/api/v1/order/driver-stats")
            .add_header(AUTHORIZATION, "Bearer token-123", true)
            .send(&make_service(
                StateBuilder::new().auth(authenticating_as(identity(Role::Admin))),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::FORBIDDEN));

        Ok(())
    }

    #[tokio::test]
    async fn test_staff_reach_admin_routes() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_sales_summary()
            .once()
            .returning(|| Ok(SalesSummary::default()));

        let res = TestClient::get("http://example.com/api/v1/order/sales")
            .add_header(AUTHORIZATION, "Bearer token-123", true)
            .send(&make_service(
                StateBuilder::new()
                    .auth(authenticating_as(identity(Role::SuperAdmin)))
                    .orders(orders),
            ))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }

    #[tokio::test]
    async fn test_webhook_skips_bearer_authentication() -> TestResult {
        let mut orders = MockOrdersService::new();

        orders
            .expect_handle_webhook()
            .once()
            .returning(|_, _| {
                Ok(WebhookOutcome::Ignored {
                    kind: "charge.refunded".to_string(),
                })
            });

        let res = TestClient::post("http://example.com/api/v1/gateway/webhook")
            .add_header("stripe-signature", "t=1,v1=abc", true)
            .body("{}")
            .send(&make_service(StateBuilder::new().orders(orders)))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        Ok(())
    }
}
