// WellnessTracker Data
// This crate handles persistence for goals, reminders and health tips

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
