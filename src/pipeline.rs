use crate::config::{Config, GeocoderConfig, Provider};
use crate::constants::{ECHOED_RECORDS, TRANSFORMER_REQUIRED_COLUMNS};
use crate::error::Result;
use crate::geocode::{ensure_input_exists, open_table, GeocodeSummary, Geocoder};
use crate::transform::{build_shop, BuildOutcome, SkipReason};
use crate::types::{GeocodedRow, NormalizedShop, ShopCategory};
use metrics::counter;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Records produced from one geocoded table, plus the counts behind them
#[derive(Debug, Default)]
pub struct TransformOutput {
    pub shops: Vec<NormalizedShop>,
    pub summary: TransformSummary,
}

/// Counts for one transformer run
#[derive(Debug, Default, Clone, Serialize)]
pub struct TransformSummary {
    pub total_rows: usize,
    pub transformed: usize,
    pub skipped_missing_coordinates: usize,
    pub skipped_invalid_coordinates: usize,
    pub out_of_bounds: usize,
    pub category_counts: HashMap<ShopCategory, usize>,
}

impl TransformSummary {
    pub fn skipped(&self) -> usize {
        self.skipped_missing_coordinates + self.skipped_invalid_coordinates
    }

    /// Main-category histogram, most common first
    pub fn category_distribution(&self) -> Vec<(ShopCategory, usize)> {
        let mut counts: Vec<(ShopCategory, usize)> =
            self.category_counts.iter().map(|(c, n)| (*c, *n)).collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        counts
    }
}

/// Where the transformer writes its results
#[derive(Debug, Clone)]
pub struct TransformPaths {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sample_output: PathBuf,
}

/// Build normalized shops from a geocoded table held in `input`.
pub fn transform_rows<R: Read>(input: R) -> Result<TransformOutput> {
    let (mut reader, _) = open_table(input, &TRANSFORMER_REQUIRED_COLUMNS)?;

    let mut output = TransformOutput::default();
    for row in reader.deserialize::<GeocodedRow>() {
        let row = row?;
        output.summary.total_rows += 1;

        match build_shop(&row) {
            BuildOutcome::Built { shop, within_bounds } => {
                if !within_bounds {
                    output.summary.out_of_bounds += 1;
                }
                *output.summary.category_counts.entry(shop.main_category).or_insert(0) += 1;
                if output.shops.len() < ECHOED_RECORDS {
                    let name: String = shop.name.chars().take(30).collect();
                    info!(
                        "✓ {}. {:30} -> {:15} ({:.4}, {:.4})",
                        output.summary.total_rows,
                        name,
                        shop.main_category,
                        shop.latitude,
                        shop.longitude
                    );
                }
                output.shops.push(shop);
            }
            BuildOutcome::Skipped(SkipReason::MissingCoordinates) => {
                output.summary.skipped_missing_coordinates += 1;
            }
            BuildOutcome::Skipped(SkipReason::InvalidCoordinates) => {
                output.summary.skipped_invalid_coordinates += 1;
            }
        }
    }
    output.summary.transformed = output.shops.len();

    counter!("shop_ingest_shops_transformed_total").increment(output.summary.transformed as u64);
    counter!("shop_ingest_shops_skipped_total").increment(output.summary.skipped() as u64);
    Ok(output)
}

/// Serialize shops as a pretty-printed JSON array. Non-ASCII text is kept as is.
pub fn write_shops_json(shops: &[NormalizedShop], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json_content = serde_json::to_string_pretty(shops)?;
    fs::write(path, json_content)?;
    Ok(())
}

/// Read the geocoded table, write the full array and the sample batch.
#[instrument(skip(paths), fields(input = %paths.input.display()))]
pub fn run_transform(paths: &TransformPaths, sample_size: usize) -> Result<TransformSummary> {
    ensure_input_exists(&paths.input)?;
    info!("🔄 Transforming shop data for Supabase...");
    info!("📂 Reading from: {}", paths.input.display());

    let TransformOutput { shops, summary } = transform_rows(File::open(&paths.input)?)?;

    write_shops_json(&shops, &paths.output)?;
    info!("✅ Output saved to: {}", paths.output.display());

    let sample = &shops[..shops.len().min(sample_size)];
    write_shops_json(sample, &paths.sample_output)?;
    info!(
        "📝 Test batch ({} shops) saved to: {}",
        sample.len(),
        paths.sample_output.display()
    );

    Ok(summary)
}

/// Geocode `input` with `provider`, taking its credential from the
/// environment. Input and credential checks run before the first row is read.
pub async fn run_geocode(
    provider: Provider,
    config: &Config,
    input: &Path,
    output: &Path,
) -> Result<GeocodeSummary> {
    ensure_input_exists(input)?;
    let geocoder_config = GeocoderConfig::from_env(provider, config.geocoder.clone())?;
    let geocoder = Geocoder::from_config(&geocoder_config)?;
    geocoder.process_file(input, output).await
}

/// Result of running both stages back to back
#[derive(Debug)]
pub struct PipelineResult {
    pub geocode: GeocodeSummary,
    pub transform: TransformSummary,
}

pub struct Pipeline;

impl Pipeline {
    /// Geocode `input` into `paths.input`, then transform that file.
    pub async fn run(
        provider: Provider,
        config: &Config,
        input: &Path,
        paths: &TransformPaths,
    ) -> Result<PipelineResult> {
        info!("📥 Step 1: geocoding {}", input.display());
        let geocode = run_geocode(provider, config, input, &paths.input).await?;

        info!("🔨 Step 2: transforming {}", paths.input.display());
        let transform = run_transform(paths, config.transform.sample_size)?;

        Ok(PipelineResult { geocode, transform })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;

    const HEADER: &str = "SHOP_NAME,ADDRESS,PHONE_NUMBER,TYPE_OF_SHOP,LATITUDE,LONGITUDE\n";

    #[test]
    fn test_transform_rows_counts() {
        let input = format!(
            "{HEADER}\
             Nail A,서울 강남구 1,02  123  4567,\"네일미용업, 화장ㆍ분장 미용업\",37.5,127.0\n\
             Mixed,서울 종로구 2,2 555 6666,\"일반미용업, 네일미용업, 화장ㆍ분장 미용업\",37.57,126.98\n\
             No Coords,서울 중구 3,02 000 0000,피부미용업,,\n\
             Bad Coords,서울 중구 4,02 000 0000,피부미용업,abc,127.0\n\
             Far Away,부산 해운대구 5,051 000 0000,피부미용업,40.0,127.0\n"
        );
        let TransformOutput { shops, summary } = transform_rows(input.as_bytes()).unwrap();

        assert_eq!(summary.total_rows, 5);
        assert_eq!(summary.transformed, 3);
        assert_eq!(summary.skipped_missing_coordinates, 1);
        assert_eq!(summary.skipped_invalid_coordinates, 1);
        assert_eq!(summary.skipped(), 2);
        assert_eq!(summary.out_of_bounds, 1);

        let names: Vec<&str> = shops.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Nail A", "Mixed", "Far Away"]);
        assert_eq!(shops[1].main_category, ShopCategory::Hair);
        assert_eq!(
            shops[1].sub_categories,
            Some(vec![ShopCategory::Nail, ShopCategory::EyebrowTattoo])
        );
        assert_eq!(shops[1].phone_number, "02 555 6666");
    }

    #[test]
    fn test_category_distribution_order() {
        let mut summary = TransformSummary::default();
        summary.category_counts.insert(ShopCategory::Nail, 2);
        summary.category_counts.insert(ShopCategory::Hair, 5);
        summary.category_counts.insert(ShopCategory::Waxing, 2);
        assert_eq!(
            summary.category_distribution(),
            vec![
                (ShopCategory::Hair, 5),
                (ShopCategory::Nail, 2),
                (ShopCategory::Waxing, 2)
            ]
        );
    }

    #[test]
    fn test_padded_coordinate_headers() {
        let input = "SHOP_NAME,ADDRESS,PHONE_NUMBER,TYPE_OF_SHOP,LATITUDE, LONGITUDE\n\
                     A,서울 중구 1,02 1,네일미용업,37.5,127.0\n";
        let TransformOutput { shops, summary } = transform_rows(input.as_bytes()).unwrap();
        assert_eq!(summary.transformed, 1);
        assert_eq!(summary.skipped_missing_coordinates, 0);
        assert_eq!(shops[0].longitude, 127.0);
    }

    #[test]
    fn test_non_finite_coordinates_are_skipped() {
        let input = format!(
            "{HEADER}\
             A,서울 중구 1,02 1,네일미용업,NaN,127.0\n\
             B,서울 중구 2,02 2,네일미용업,37.5,inf\n"
        );
        let TransformOutput { shops, summary } = transform_rows(input.as_bytes()).unwrap();
        assert!(shops.is_empty());
        assert_eq!(summary.skipped_invalid_coordinates, 2);
    }

    #[test]
    fn test_missing_type_column() {
        let input = "SHOP_NAME,ADDRESS,PHONE_NUMBER,LATITUDE,LONGITUDE\nA,B,02,37.5,127.0\n";
        let err = transform_rows(input.as_bytes()).unwrap_err();
        assert!(matches!(err, IngestError::MissingColumn(ref c) if c == "TYPE_OF_SHOP"));
    }

    #[test]
    fn test_run_transform_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let paths = TransformPaths {
            input: dir.path().join("missing.csv"),
            output: dir.path().join("out.json"),
            sample_output: dir.path().join("sample.json"),
        };
        assert!(matches!(run_transform(&paths, 10), Err(IngestError::MissingInputFile(_))));
        assert!(!paths.output.exists());
    }
}
