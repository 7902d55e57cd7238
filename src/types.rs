use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A canonical coordinate pair. Providers that report longitude first are
/// swapped into this order before anything else sees the values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One row of the geocoded shop table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodedRow {
    #[serde(rename = "SHOP_NAME")]
    pub name: String,
    #[serde(rename = "ADDRESS")]
    pub address: String,
    #[serde(rename = "PHONE_NUMBER")]
    pub phone_number: String,
    #[serde(rename = "TYPE_OF_SHOP")]
    pub shop_type: String,
    #[serde(rename = "LATITUDE")]
    pub latitude: String,
    #[serde(rename = "LONGITUDE")]
    pub longitude: String,
}

/// Service categories a shop can be listed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopCategory {
    Nail,
    Eyelash,
    Waxing,
    EyebrowTattoo,
    Hair,
}

impl ShopCategory {
    pub const ALL: [ShopCategory; 5] = [
        ShopCategory::Nail,
        ShopCategory::Eyelash,
        ShopCategory::Waxing,
        ShopCategory::EyebrowTattoo,
        ShopCategory::Hair,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShopCategory::Nail => "nail",
            ShopCategory::Eyelash => "eyelash",
            ShopCategory::Waxing => "waxing",
            ShopCategory::EyebrowTattoo => "eyebrow_tattoo",
            ShopCategory::Hair => "hair",
        }
    }
}

impl fmt::Display for ShopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so width specifiers work in the progress log
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnershipStatus {
    NonPartnered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    PendingApproval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
}

/// Upload-ready shop record. Built once per usable row and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedShop {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone_number: String,
    pub latitude: f64,
    pub longitude: f64,
    pub main_category: ShopCategory,
    pub sub_categories: Option<Vec<ShopCategory>>,
    pub shop_type: PartnershipStatus,
    pub shop_status: ApprovalStatus,
    pub verification_status: VerificationStatus,
    pub commission_rate: f64,
    pub total_bookings: u32,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Capability shared by every geocoding service: resolve an address to its
/// best single coordinate pair.
#[async_trait::async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Name used in logs and summaries
    fn provider_name(&self) -> &'static str;

    /// Look up one address. `Ok(None)` means the service answered but had no
    /// candidate; transport problems come back as `Err`.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;
}
