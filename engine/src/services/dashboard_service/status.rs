// Per-period load status and the global notice shown next to the dashboard.
use crate::data::{PeriodId, PeriodRegistry};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodStatus {
    pub period: PeriodId,
    pub success: bool,
    pub synthetic: bool,
    pub message: Option<String>,
}

impl PeriodStatus {
    pub fn loaded(period: PeriodId) -> Self {
        Self { period, success: true, synthetic: false, message: None }
    }

    // Real data failed; the period shows synthetic figures instead.
    pub fn failed(period: PeriodId, reason: impl Into<String>) -> Self {
        Self {
            period,
            success: false,
            synthetic: true,
            message: Some(format!("{} (using synthetic data)", reason.into())),
        }
    }

    pub fn demo(period: PeriodId) -> Self {
        Self {
            period,
            success: true,
            synthetic: true,
            message: Some("synthetic data".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataNotice {
    // Some periods could not be loaded and show synthetic figures
    SomeSimulated,
    // No period could be loaded
    AllSimulated,
    // Demo mode was requested explicitly
    Demo,
}

impl DataNotice {
    pub fn message(&self) -> &'static str {
        match self {
            DataNotice::SomeSimulated => {
                "Warning: some months show synthetic data because their CSV exports could not be loaded."
            }
            DataNotice::AllSimulated => {
                "Error: no CSV export could be loaded; every month shows synthetic data."
            }
            DataNotice::Demo => "Warning: showing synthetic demo data. Values do not represent real sales.",
        }
    }

    // Notice for a finished load, None when every period has real data.
    pub fn for_statuses(statuses: &[PeriodStatus]) -> Option<Self> {
        let failed = statuses.iter().filter(|s| !s.success).count();
        if failed == 0 {
            None
        } else if failed == statuses.len() {
            Some(DataNotice::AllSimulated)
        } else {
            Some(DataNotice::SomeSimulated)
        }
    }
}

// Outcome of a load: every configured period has an aggregate, real or synthetic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub registry: PeriodRegistry,
    pub statuses: Vec<PeriodStatus>,
    pub notice: Option<DataNotice>,
}

impl LoadReport {
    pub fn status_of(&self, period: &PeriodId) -> Option<&PeriodStatus> {
        self.statuses.iter().find(|s| s.period == *period)
    }

    pub fn failed_periods(&self) -> impl Iterator<Item = &PeriodId> {
        self.statuses.iter().filter(|s| !s.success).map(|s| &s.period)
    }
}
