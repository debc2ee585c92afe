// Storage models mirror table rows; typed enums and dates live in the domain crate
pub mod goal;
pub mod reminder;
pub mod tip;

pub use goal::{GoalFilter, GoalLog, NewWellnessGoal, WellnessGoal};
pub use reminder::{NewReminder, PreventiveCareReminder};
pub use tip::{HealthTip, NewHealthTip};
