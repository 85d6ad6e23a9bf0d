//! Defaults for file locations and validity thresholds.
//! These feed `Config::default()`; nothing reads them as process-wide state.

pub const DEFAULT_SOURCE_FILE: &str = "scraping_data.jsonl";
pub const DEFAULT_DATABASE_FILE: &str = "pricehubble.db";
pub const DEFAULT_TABLE_NAME: &str = "property_offers";
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";
pub const DEFAULT_LOG_DIR: &str = "logs";

pub const MIN_PRICE_PER_AREA: f64 = 500.0;
pub const MAX_PRICE_PER_AREA: f64 = 15000.0;
pub const ALLOWED_PROPERTY_TYPES: [&str; 2] = ["apartment", "house"];
/// Records must be scraped strictly after this date.
pub const SCRAPING_DATE_CUTOFF: &str = "2020-03-05";

/// Output date representation.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Raw column names
pub const COL_ID: &str = "id";
pub const COL_RAW_PRICE: &str = "raw_price";
pub const COL_LIVING_AREA: &str = "living_area";
pub const COL_PROPERTY_TYPE: &str = "property_type";
pub const COL_MUNICIPALITY: &str = "municipality";
pub const COL_SCRAPING_DATE: &str = "scraping_date";

/// Every raw record must carry these keys, even if the value is null.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    COL_ID,
    COL_RAW_PRICE,
    COL_LIVING_AREA,
    COL_PROPERTY_TYPE,
    COL_MUNICIPALITY,
    COL_SCRAPING_DATE,
];

/// Output table columns, in persisted order.
pub const OUTPUT_COLUMNS: [&str; 7] = [
    "id",
    "scraping_date",
    "property_type",
    "municipality",
    "price",
    "living_area",
    "price_per_square_meter",
];
