use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Topic of a health tip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TipCategory {
    Nutrition,
    Exercise,
    Sleep,
    MentalHealth,
    Hydration,
    #[default]
    General,
}

impl TipCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TipCategory::Nutrition => "nutrition",
            TipCategory::Exercise => "exercise",
            TipCategory::Sleep => "sleep",
            TipCategory::MentalHealth => "mental_health",
            TipCategory::Hydration => "hydration",
            TipCategory::General => "general",
        }
    }
}

impl fmt::Display for TipCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TipCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nutrition" => Ok(TipCategory::Nutrition),
            "exercise" => Ok(TipCategory::Exercise),
            "sleep" => Ok(TipCategory::Sleep),
            "mental_health" => Ok(TipCategory::MentalHealth),
            "hydration" => Ok(TipCategory::Hydration),
            "general" => Ok(TipCategory::General),
            other => Err(format!("Unknown tip category: {}", other)),
        }
    }
}

/// A shared piece of health advice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthTip {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: TipCategory,
    pub is_active: bool,
    /// Day this tip is pinned to as tip of the day
    pub display_date: Option<NaiveDate>,
    /// `None` only for the built-in fallback tip, which is never stored
    pub created_at: Option<DateTime<Utc>>,
}

pub const FALLBACK_TIP_TITLE: &str = "Stay Hydrated";
pub const FALLBACK_TIP_CONTENT: &str =
    "Aim to drink at least 8 glasses of water per day to keep your body hydrated and functioning optimally.";
/// Shorter wording shown on the dashboard when no tip is stored
pub const DASHBOARD_FALLBACK_TIP_CONTENT: &str = "Aim to drink at least 8 glasses of water per day.";

impl HealthTip {
    /// The tip served when no stored tip is available
    pub fn fallback() -> Self {
        Self {
            id: Uuid::nil().to_string(),
            title: FALLBACK_TIP_TITLE.to_string(),
            content: FALLBACK_TIP_CONTENT.to_string(),
            category: TipCategory::Hydration,
            is_active: true,
            display_date: None,
            created_at: None,
        }
    }

    /// The dashboard's fallback, same tip with shorter wording
    pub fn dashboard_fallback() -> Self {
        Self {
            content: DASHBOARD_FALLBACK_TIP_CONTENT.to_string(),
            ..Self::fallback()
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.created_at.is_none() && self.id == Uuid::nil().to_string()
    }
}

/// A built-in tip inserted at start-up
#[derive(Debug, Clone, Copy)]
pub struct DefaultTip {
    pub title: &'static str,
    pub content: &'static str,
    pub category: TipCategory,
}

pub const DEFAULT_TIPS: [DefaultTip; 5] = [
    DefaultTip {
        title: FALLBACK_TIP_TITLE,
        content: FALLBACK_TIP_CONTENT,
        category: TipCategory::Hydration,
    },
    DefaultTip {
        title: "Get Moving",
        content: "Try to get at least 30 minutes of moderate exercise daily. Even a brisk walk counts!",
        category: TipCategory::Exercise,
    },
    DefaultTip {
        title: "Sleep Well",
        content: "Adults need 7-9 hours of sleep per night. Maintain a consistent sleep schedule for better rest.",
        category: TipCategory::Sleep,
    },
    DefaultTip {
        title: "Eat Your Vegetables",
        content: "Include a variety of colorful vegetables in your diet. They provide essential vitamins and minerals.",
        category: TipCategory::Nutrition,
    },
    DefaultTip {
        title: "Take Mental Breaks",
        content: "Practice mindfulness or take short breaks throughout the day to reduce stress and improve focus.",
        category: TipCategory::MentalHealth,
    },
];
