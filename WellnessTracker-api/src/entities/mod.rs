// Public entities for the WellnessTracker API
// These are the JSON shapes exchanged with clients; handlers convert them
// to and from the domain entities.

// Error response and shared serde helpers
pub mod common;

pub mod dashboard;
pub mod goal;
pub mod reminder;
pub mod tip;
