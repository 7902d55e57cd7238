/// Provider names as accepted on the command line and shown in logs
pub const KAKAO_PROVIDER: &str = "kakao";
pub const GOOGLE_PROVIDER: &str = "google";

// Credential environment variables
pub const KAKAO_API_KEY_VAR: &str = "KAKAO_API_KEY";
pub const GOOGLE_API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";

// Provider endpoints
pub const KAKAO_ADDRESS_SEARCH_URL: &str = "https://dapi.kakao.com/v2/local/search/address.json";
pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const GOOGLE_REGION_BIAS: &str = "kr";

// Column names of the shop table
pub const COL_SHOP_NAME: &str = "SHOP_NAME";
pub const COL_ADDRESS: &str = "ADDRESS";
pub const COL_PHONE_NUMBER: &str = "PHONE_NUMBER";
pub const COL_TYPE_OF_SHOP: &str = "TYPE_OF_SHOP";
pub const COL_LATITUDE: &str = "LATITUDE";
pub const COL_LONGITUDE: &str = "LONGITUDE";

/// Columns the geocoder needs in its input header
pub const GEOCODER_REQUIRED_COLUMNS: [&str; 2] = [COL_ADDRESS, COL_SHOP_NAME];

/// Columns the transformer needs in its input header
pub const TRANSFORMER_REQUIRED_COLUMNS: [&str; 6] = [
    COL_SHOP_NAME,
    COL_ADDRESS,
    COL_PHONE_NUMBER,
    COL_TYPE_OF_SHOP,
    COL_LATITUDE,
    COL_LONGITUDE,
];

// Default file names
pub const DEFAULT_SHOP_CSV: &str = "shop.csv";
pub const DEFAULT_GEOCODED_CSV: &str = "shop_with_coordinates.csv";
pub const DEFAULT_SHOPS_JSON: &str = "shops_for_supabase.json";
pub const DEFAULT_SAMPLE_JSON: &str = "shops_test_batch.json";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

// Defaults for tunables
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 100;
pub const DEFAULT_SAMPLE_SIZE: usize = 10;

/// Number of built records echoed to the progress log
pub const ECHOED_RECORDS: usize = 5;

// Seoul metropolitan bounding box, inclusive
pub const SERVICE_AREA_MIN_LAT: f64 = 37.4;
pub const SERVICE_AREA_MAX_LAT: f64 = 37.7;
pub const SERVICE_AREA_MIN_LON: f64 = 126.8;
pub const SERVICE_AREA_MAX_LON: f64 = 127.2;

// Fixed defaults for newly imported shops
pub const DEFAULT_COMMISSION_RATE: f64 = 0.15;
