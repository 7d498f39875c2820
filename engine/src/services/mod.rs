// Service layer: the dashboard facade and its load handlers.
pub mod dashboard_service;

pub use dashboard_service::{DashboardService, DataNotice, LoadReport, PeriodStatus};
