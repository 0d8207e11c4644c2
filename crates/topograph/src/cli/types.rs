//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{Category, NodeStatus};

/// Node category for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryArg {
    /// Business layer (actors, processes)
    Business,
    /// Application layer (services, databases)
    Application,
    /// Infrastructure layer (servers, networks)
    Infrastructure,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Business => Self::Business,
            CategoryArg::Application => Self::Application,
            CategoryArg::Infrastructure => Self::Infrastructure,
        }
    }
}

/// Node status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusArg {
    /// Not reported
    Unknown,
    /// Working normally
    Healthy,
    /// Failing or degraded
    Unhealthy,
    /// Taken down on purpose
    Maintenance,
}

impl From<StatusArg> for NodeStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Unknown => Self::Unknown,
            StatusArg::Healthy => Self::Healthy,
            StatusArg::Unhealthy => Self::Unhealthy,
            StatusArg::Maintenance => Self::Maintenance,
        }
    }
}
