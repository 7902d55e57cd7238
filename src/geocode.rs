use crate::apis::create_provider;
use crate::config::GeocoderConfig;
use crate::constants::{COL_ADDRESS, COL_LATITUDE, COL_LONGITUDE, COL_SHOP_NAME, GEOCODER_REQUIRED_COLUMNS};
use crate::error::{IngestError, Result};
use crate::types::{Coordinates, GeocodeProvider};
use csv::StringRecord;
use metrics::counter;
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Result of looking up a single row
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Resolved(Coordinates),
    /// Service answered without a candidate
    NotFound,
    /// Transport or response error
    Failed(String),
    /// Nothing to look up; the provider was not called
    EmptyAddress,
}

impl LookupOutcome {
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            LookupOutcome::Resolved(coords) => Some(*coords),
            _ => None,
        }
    }
}

/// Counts for one geocoding run
#[derive(Debug, Default, Clone, Serialize)]
pub struct GeocodeSummary {
    pub provider: String,
    pub total_rows: usize,
    pub geocoded: usize,
    pub not_found: usize,
    pub lookup_errors: usize,
    pub empty_address: usize,
}

impl GeocodeSummary {
    /// Rows left without coordinates, empty addresses included
    pub fn failed(&self) -> usize {
        self.total_rows - self.geocoded
    }
}

/// Appends coordinates to a shop table, one provider call per row.
pub struct Geocoder {
    provider: Box<dyn GeocodeProvider>,
    delay: Duration,
}

impl Geocoder {
    pub fn new(provider: Box<dyn GeocodeProvider>, delay: Duration) -> Self {
        Self { provider, delay }
    }

    pub fn from_config(config: &GeocoderConfig) -> Result<Self> {
        Ok(Self::new(create_provider(config)?, config.settings.delay()))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Resolve one address. Never fails: lookup problems become outcomes.
    pub async fn lookup(&self, address: &str) -> LookupOutcome {
        let address = address.trim();
        if address.is_empty() {
            return LookupOutcome::EmptyAddress;
        }

        let provider = self.provider.provider_name();
        counter!("shop_ingest_geocode_requests_total", "provider" => provider).increment(1);
        let outcome = match self.provider.geocode(address).await {
            Ok(Some(coords)) => LookupOutcome::Resolved(coords),
            Ok(None) => {
                warn!("No results found for: {}", address);
                LookupOutcome::NotFound
            }
            Err(e) => {
                warn!("Error geocoding {}: {}", address, e);
                LookupOutcome::Failed(e.to_string())
            }
        };
        if outcome.coordinates().is_none() {
            counter!("shop_ingest_geocode_failures_total", "provider" => provider).increment(1);
        }

        // Stay under the provider's request rate
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        outcome
    }

    /// Geocode every row of `input` and write the widened table to `output`.
    /// Each row is written and flushed before the next lookup starts.
    pub async fn process_table<R: Read, W: Write>(&self, input: R, output: W) -> Result<GeocodeSummary> {
        let (reader, headers) = open_table(input, &GEOCODER_REQUIRED_COLUMNS)?;
        self.geocode_rows(reader, headers, output).await
    }

    /// File-based wrapper around [`Geocoder::process_table`]. The output file
    /// is only created once the input header has been checked.
    #[instrument(skip(self), fields(provider = self.provider_name()))]
    pub async fn process_file(&self, input_path: &Path, output_path: &Path) -> Result<GeocodeSummary> {
        ensure_input_exists(input_path)?;
        let (reader, headers) = open_table(File::open(input_path)?, &GEOCODER_REQUIRED_COLUMNS)?;
        info!("Using {} Maps API for geocoding...", self.provider_name());
        let output = File::create(output_path)?;
        self.geocode_rows(reader, headers, output).await
    }

    async fn geocode_rows<R: Read, W: Write>(
        &self,
        mut reader: csv::Reader<R>,
        headers: StringRecord,
        output: W,
    ) -> Result<GeocodeSummary> {
        let address_idx = column_index(&headers, COL_ADDRESS).unwrap_or_default();
        let name_idx = column_index(&headers, COL_SHOP_NAME).unwrap_or_default();

        let mut writer = csv::Writer::from_writer(output);
        let mut out_headers = headers.clone();
        out_headers.push_field(COL_LATITUDE);
        out_headers.push_field(COL_LONGITUDE);
        writer.write_record(&out_headers)?;
        writer.flush()?;

        let mut summary = GeocodeSummary {
            provider: self.provider_name().to_string(),
            ..Default::default()
        };

        for record in reader.records() {
            let mut record = record?;
            summary.total_rows += 1;
            let address = record.get(address_idx).unwrap_or_default().trim().to_string();
            let name = record.get(name_idx).filter(|n| !n.is_empty()).unwrap_or("Unknown");

            if !address.is_empty() {
                info!("Processing {}: {}", summary.total_rows, name);
                debug!("Address: {}", address);
            }

            let outcome = self.lookup(&address).await;
            match &outcome {
                LookupOutcome::Resolved(coords) => {
                    summary.geocoded += 1;
                    info!("✓ Geocoded: {}, {}", coords.latitude, coords.longitude);
                }
                LookupOutcome::NotFound => {
                    summary.not_found += 1;
                    info!("✗ Failed to geocode");
                }
                LookupOutcome::Failed(_) => {
                    summary.lookup_errors += 1;
                    info!("✗ Failed to geocode");
                }
                LookupOutcome::EmptyAddress => summary.empty_address += 1,
            }

            match outcome.coordinates() {
                Some(coords) => {
                    record.push_field(&coords.latitude.to_string());
                    record.push_field(&coords.longitude.to_string());
                }
                None => {
                    record.push_field("");
                    record.push_field("");
                }
            }
            writer.write_record(&record)?;
            writer.flush()?;
        }

        Ok(summary)
    }
}

/// Fail before any processing when the input table is absent.
pub fn ensure_input_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(IngestError::MissingInputFile(path.display().to_string()))
    }
}

/// Open a shop table and check its header. Header names are trimmed here so
/// the column check and serde's header-keyed deserialization see the same
/// names.
pub(crate) fn open_table<R: Read>(input: R, required: &[&str]) -> Result<(csv::Reader<R>, StringRecord)> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(input);
    let headers = reader.headers()?.clone();
    for column in required {
        if column_index(&headers, column).is_none() {
            return Err(IngestError::MissingColumn(column.to_string()));
        }
    }
    Ok((reader, headers))
}

fn column_index(headers: &StringRecord, column: &str) -> Option<usize> {
    headers.iter().position(|h| h == column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Answers from a fixed table and counts calls
    struct StubProvider {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait::async_trait]
    impl GeocodeProvider for StubProvider {
        fn provider_name(&self) -> &'static str {
            "stub"
        }

        async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match address {
                "서울 강남구 테헤란로 1" => Ok(Some(Coordinates { latitude: 37.5, longitude: 127.03 })),
                "timeout" => Err(IngestError::Api { message: "timed out".into() }),
                _ => Ok(None),
            }
        }
    }

    fn stub_geocoder() -> (Geocoder, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = StubProvider { calls: calls.clone() };
        (Geocoder::new(Box::new(provider), Duration::ZERO), calls)
    }

    #[tokio::test]
    async fn test_empty_address_skips_provider() {
        let (geocoder, calls) = stub_geocoder();
        assert_eq!(geocoder.lookup("   ").await, LookupOutcome::EmptyAddress);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_errors_become_outcomes() {
        let (geocoder, calls) = stub_geocoder();
        assert!(matches!(geocoder.lookup("timeout").await, LookupOutcome::Failed(_)));
        assert_eq!(geocoder.lookup("nowhere").await, LookupOutcome::NotFound);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_process_table_appends_columns() {
        let (geocoder, calls) = stub_geocoder();
        let input = "SHOP_NAME,ADDRESS,PHONE_NUMBER\n\
                     A,서울 강남구 테헤란로 1,02 111 2222\n\
                     B,,02 333 4444\n\
                     C,timeout,010 1234 5678\n\
                     D,nowhere,\n";
        let mut output = Vec::new();
        let summary = geocoder.process_table(input.as_bytes(), &mut output).await.unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "SHOP_NAME,ADDRESS,PHONE_NUMBER,LATITUDE,LONGITUDE");
        assert_eq!(lines[1], "A,서울 강남구 테헤란로 1,02 111 2222,37.5,127.03");
        assert_eq!(lines[2], "B,,02 333 4444,,");
        assert_eq!(lines[3], "C,timeout,010 1234 5678,,");
        assert_eq!(lines[4], "D,nowhere,,,");

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(summary.total_rows, 4);
        assert_eq!(summary.geocoded, 1);
        assert_eq!(summary.not_found, 1);
        assert_eq!(summary.lookup_errors, 1);
        assert_eq!(summary.empty_address, 1);
        assert_eq!(summary.failed(), 3);
    }

    #[tokio::test]
    async fn test_missing_address_column() {
        let (geocoder, calls) = stub_geocoder();
        let input = "SHOP_NAME,PHONE_NUMBER\nA,02\n";
        let err = geocoder.process_table(input.as_bytes(), Vec::new()).await.unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn(ref c) if c == "ADDRESS"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_header_leaves_output_untouched() {
        let (geocoder, calls) = stub_geocoder();
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("shop.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "SHOP_NAME,PHONE_NUMBER\nA,02\n").unwrap();
        std::fs::write(&output, "previous run\n").unwrap();

        let err = geocoder.process_file(&input, &output).await.unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn(ref c) if c == "ADDRESS"));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "previous run\n");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let fresh = dir.path().join("fresh.csv");
        assert!(geocoder.process_file(&input, &fresh).await.is_err());
        assert!(!fresh.exists());
    }

    #[tokio::test]
    async fn test_padded_header_names() {
        let (geocoder, _) = stub_geocoder();
        let input = "SHOP_NAME, ADDRESS \nA,서울 강남구 테헤란로 1\n";
        let mut output = Vec::new();
        let summary = geocoder.process_table(input.as_bytes(), &mut output).await.unwrap();
        assert_eq!(summary.geocoded, 1);
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.lines().next(), Some("SHOP_NAME,ADDRESS,LATITUDE,LONGITUDE"));
    }

    #[tokio::test]
    async fn test_missing_input_file() {
        let (geocoder, _) = stub_geocoder();
        let dir = tempfile::tempdir().unwrap();
        let err = geocoder
            .process_file(&dir.path().join("shop.csv"), &dir.path().join("out.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingInputFile(_)));
        assert!(!dir.path().join("out.csv").exists());
    }
}
