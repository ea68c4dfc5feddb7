use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown risk level '{0}' (expected low, medium or high)")]
pub struct UnknownRiskLevel(pub String);

impl FromStr for RiskLevel {
    type Err = UnknownRiskLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(UnknownRiskLevel(s.to_string())),
        }
    }
}

/// Visual treatment a result is presented with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    #[serde(rename = "alert_card")]
    Alert,
    #[serde(rename = "info_card")]
    Info,
    #[serde(rename = "success_card")]
    Success,
}

impl Variant {
    pub fn for_risk(risk: RiskLevel) -> Self {
        match risk {
            RiskLevel::High => Variant::Alert,
            RiskLevel::Medium => Variant::Info,
            RiskLevel::Low => Variant::Success,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Alert => "alert_card",
            Variant::Info => "info_card",
            Variant::Success => "success_card",
        }
    }
}

/// One health assessment as shown to the user.
///
/// The presentation variant is never stored: it is derived from
/// `risk_level` on demand and only materialized as `ui_component` when
/// serialized. An incoming `ui_component` key is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScanResult {
    pub id: String,
    pub product_name: String,
    pub image: String,
    pub summary: String,
    pub reasoning: String,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub highlight_ingredients: Vec<String>,
}

impl ScanResult {
    pub fn variant(&self) -> Variant {
        Variant::for_risk(self.risk_level)
    }

    pub fn with_image(&self, image: impl Into<String>) -> Self {
        ScanResult {
            image: image.into(),
            ..self.clone()
        }
    }
}

impl Serialize for ScanResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScanResult", 8)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("product_name", &self.product_name)?;
        state.serialize_field("image", &self.image)?;
        state.serialize_field("summary", &self.summary)?;
        state.serialize_field("reasoning", &self.reasoning)?;
        state.serialize_field("risk_level", &self.risk_level)?;
        state.serialize_field("ui_component", &self.variant())?;
        state.serialize_field("highlight_ingredients", &self.highlight_ingredients)?;
        state.end()
    }
}

/// A completed scan as kept in the history list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Milliseconds since the Unix epoch at creation, strictly increasing.
    pub id: u64,
    /// ISO-8601, UTC, millisecond precision.
    pub timestamp: String,
    pub result: ScanResult,
}

impl HistoryEntry {
    /// Stamp `result` with `now`. `newest_id` is the id of the newest entry
    /// already in the list; the new id always lands above it, even when the
    /// clock has not moved.
    pub fn new(result: ScanResult, now: DateTime<Utc>, newest_id: Option<u64>) -> Self {
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = match newest_id {
            Some(newest) if millis <= newest => newest.saturating_add(1),
            _ => millis,
        };

        HistoryEntry {
            id,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            result,
        }
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
