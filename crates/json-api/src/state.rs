//! Shared server state injected into every request.

use std::sync::Arc;

use dispatch_app::context::AppContext;
use jiff::{SignedDuration, Timestamp};

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,
    started_at: Timestamp,
}

impl State {
    pub(crate) fn from_app_context(app: AppContext) -> Arc<Self> {
        Arc::new(Self {
            app,
            started_at: Timestamp::now(),
        })
    }

    pub(crate) fn uptime(&self) -> SignedDuration {
        Timestamp::now().duration_since(self.started_at)
    }
}
