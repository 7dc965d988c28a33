use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumString};

/// Stock availability options a user can tick.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Availability {
    InStock,
    PreOrder,
    OutOfStock,
}

/// Filters to refine search results.
///
/// The orchestrator never interprets these; they are handed to the backend
/// exactly as the user configured them.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Filters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub availability: BTreeSet<Availability>,

    /// Minimum average rating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_shipping: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cod_available: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_type: Option<String>,
}

impl Filters {
    /// True when no option is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
