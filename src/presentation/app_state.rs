// Application state shared by the command handlers
use crate::application::auth_service::AuthService;
use crate::application::battery_api::BatteryApi;
use crate::application::dashboard_service::DashboardService;
use crate::application::refresh_scheduler::RefreshScheduler;
use crate::application::session_store::SessionContext;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionContext,
    pub api: Arc<BatteryApi>,
    pub auth_service: AuthService,
    pub dashboard_service: DashboardService,
    pub scheduler: Arc<RefreshScheduler>,
}
