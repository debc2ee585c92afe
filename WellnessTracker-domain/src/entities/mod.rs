//! Domain entities for the wellness tracker

pub mod conversions;
pub mod goal;
pub mod reminder;
pub mod tip;

pub use goal::*;
pub use reminder::*;
pub use tip::*;
