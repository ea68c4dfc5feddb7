pub mod catalog;
mod result;

pub use result::{HistoryEntry, RiskLevel, ScanResult, UnknownRiskLevel, Variant};
