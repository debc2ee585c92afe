pub mod dashboard;
pub mod goal;
pub mod reminder;
pub mod tip;
mod validation;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use dashboard::{create_dashboard_service, DashboardServiceError, DashboardServiceTrait, DashboardSummary, DashboardUser};
pub use goal::{create_goal_service, GoalServiceError, GoalServiceTrait};
pub use reminder::{create_reminder_service, ReminderServiceError, ReminderServiceTrait};
pub use tip::{create_tip_service, TipServiceError, TipServiceTrait};
