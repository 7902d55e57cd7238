use crate::category::parse_shop_type;
use crate::constants::{
    DEFAULT_COMMISSION_RATE, SERVICE_AREA_MAX_LAT, SERVICE_AREA_MAX_LON, SERVICE_AREA_MIN_LAT,
    SERVICE_AREA_MIN_LON,
};
use crate::types::{
    ApprovalStatus, GeocodedRow, NormalizedShop, PartnershipStatus, VerificationStatus,
};
use chrono::Utc;
use std::fmt;
use tracing::warn;
use uuid::Uuid;

/// Why a row produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingCoordinates,
    InvalidCoordinates,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingCoordinates => write!(f, "no coordinates"),
            SkipReason::InvalidCoordinates => write!(f, "invalid coordinates"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum BuildOutcome {
    Built {
        shop: NormalizedShop,
        /// False when the coordinates fell outside the service area
        within_bounds: bool,
    },
    Skipped(SkipReason),
}

/// Collapse whitespace runs and make sure the number carries its leading
/// trunk `0`.
pub fn clean_phone_number(phone: &str) -> String {
    let cleaned = phone.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.starts_with('0') {
        cleaned
    } else {
        format!("0{cleaned}")
    }
}

/// Inclusive bounding box around Seoul
pub fn within_service_area(latitude: f64, longitude: f64) -> bool {
    (SERVICE_AREA_MIN_LAT..=SERVICE_AREA_MAX_LAT).contains(&latitude)
        && (SERVICE_AREA_MIN_LON..=SERVICE_AREA_MAX_LON).contains(&longitude)
}

fn parse_coordinates(row: &GeocodedRow) -> Result<(f64, f64), SkipReason> {
    let (lat, lon) = (row.latitude.trim(), row.longitude.trim());
    if lat.is_empty() || lon.is_empty() {
        return Err(SkipReason::MissingCoordinates);
    }
    // f64 parsing accepts NaN and inf, which would serialize as null
    match (lat.parse::<f64>(), lon.parse::<f64>()) {
        (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => Ok((lat, lon)),
        _ => Err(SkipReason::InvalidCoordinates),
    }
}

/// Turn one geocoded row into an upload-ready shop, or say why not.
///
/// Rows outside the service area are still built; only a warning is logged.
pub fn build_shop(row: &GeocodedRow) -> BuildOutcome {
    let (latitude, longitude) = match parse_coordinates(row) {
        Ok(coords) => coords,
        Err(reason) => {
            warn!("⚠️  Skipping {} - {}", row.name, reason);
            return BuildOutcome::Skipped(reason);
        }
    };

    let within_bounds = within_service_area(latitude, longitude);
    if !within_bounds {
        warn!(
            "⚠️  Warning: {} coordinates outside Seoul bounds: {}, {}",
            row.name, latitude, longitude
        );
    }

    let (main_category, sub_categories) = parse_shop_type(&row.shop_type);
    let now = Utc::now();

    let shop = NormalizedShop {
        id: Uuid::new_v4(),
        name: row.name.trim().to_string(),
        address: row.address.trim().to_string(),
        phone_number: clean_phone_number(&row.phone_number),
        latitude,
        longitude,
        main_category,
        sub_categories,
        shop_type: PartnershipStatus::NonPartnered,
        shop_status: ApprovalStatus::PendingApproval,
        verification_status: VerificationStatus::Pending,
        commission_rate: DEFAULT_COMMISSION_RATE,
        total_bookings: 0,
        is_featured: false,
        created_at: now,
        updated_at: now,
    };

    BuildOutcome::Built { shop, within_bounds }
}
