//! Role guards.
//!
//! Mounted after the auth middleware; they only read the depot identity.

use salvo::prelude::*;

use dispatch_app::domain::users::records::Role;

use crate::{envelope::ApiError, extensions::*};

async fn require(
    allowed: fn(Role) -> bool,
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    match depot.identity_or_401() {
        Ok(identity) if allowed(identity.role) => {
            ctrl.call_next(req, depot, res).await;
        }
        Ok(_) => {
            res.render(ApiError::forbidden(
                "You are not authorized to access this resource",
            ));
            ctrl.skip_rest();
        }
        Err(error) => {
            res.render(error);
            ctrl.skip_rest();
        }
    }
}

/// Admins and super admins.
#[salvo::handler]
pub(crate) async fn staff(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    require(Role::is_staff, req, depot, res, ctrl).await;
}

/// Delivery drivers.
#[salvo::handler]
pub(crate) async fn driver(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    require(|role| role == Role::Driver, req, depot, res, ctrl).await;
}

#[cfg(test)]
mod tests {
    use dispatch_app::{auth::Identity, domain::users::records::UserUuid};
    use salvo::test::TestClient;
    use testresult::TestResult;

    use super::*;

    fn with_role(role: Option<Role>, guard: Router) -> Service {
        #[salvo::handler]
        async fn ok(res: &mut Response) {
            res.render("ok");
        }

        let router = Router::new().push(guard.get(ok));

        let Some(role) = role else {
            return Service::new(router);
        };

        let identity = Identity {
            user: UserUuid::new(),
            role,
        };

        Service::new(Router::new().hoop(salvo::affix_state::inject(identity)).push(router))
    }

    async fn status(role: Option<Role>, guard: Router) -> Option<StatusCode> {
        TestClient::get("http://example.com")
            .send(&with_role(role, guard))
            .await
            .status_code
    }

    #[tokio::test]
    async fn staff_guard_admits_admins_only() -> TestResult {
        for (role, expected) in [
            (Some(Role::Admin), StatusCode::OK),
            (Some(Role::SuperAdmin), StatusCode::OK),
            (Some(Role::Driver), StatusCode::FORBIDDEN),
            (Some(Role::User), StatusCode::FORBIDDEN),
            (None, StatusCode::UNAUTHORIZED),
        ] {
            assert_eq!(
                status(role, Router::new().hoop(staff)).await,
                Some(expected),
                "role {role:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn driver_guard_admits_drivers_only() -> TestResult {
        for (role, expected) in [
            (Some(Role::Driver), StatusCode::OK),
            (Some(Role::Admin), StatusCode::FORBIDDEN),
            (Some(Role::User), StatusCode::FORBIDDEN),
            (None, StatusCode::UNAUTHORIZED),
        ] {
            assert_eq!(
                status(role, Router::new().hoop(driver)).await,
                Some(expected),
                "role {role:?}"
            );
        }

        Ok(())
    }
}
