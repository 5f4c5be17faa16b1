//! Data loading utilities

use super::dataset::Dataset;
use crate::error::{DashboardError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Rows scanned to infer CSV column types
const INFER_SCHEMA_ROWS: usize = 1000;

/// Loader for the tabular valuation source
#[derive(Debug, Clone, Default)]
pub struct DataLoader;

impl DataLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a delimited text file with a header row
    pub fn load_csv(&self, path: &Path, delimiter: u8) -> Result<DataFrame> {
        let file = open(path)?;

        let parse_opts = CsvParseOptions::default().with_separator(delimiter);

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| DashboardError::DataLoad(e.to_string()))
    }

    /// Load a Parquet file
    pub fn load_parquet(&self, path: &Path) -> Result<DataFrame> {
        let file = open(path)?;

        ParquetReader::new(file)
            .finish()
            .map_err(|e| DashboardError::DataLoad(e.to_string()))
    }

    /// Load a JSON file, either one object per line or a single array
    pub fn load_json(&self, path: &Path, format: JsonFormat) -> Result<DataFrame> {
        let file = open(path)?;

        JsonReader::new(file)
            .with_json_format(format)
            .finish()
            .map_err(|e| DashboardError::DataLoad(e.to_string()))
    }

    /// Detect file format from extension and load
    pub fn load_auto(&self, path: &Path) -> Result<DataFrame> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "tsv" => self.load_csv(path, b'\t'),
            "parquet" | "pq" => self.load_parquet(path),
            "jsonl" | "ndjson" => self.load_json(path, JsonFormat::JsonLines),
            "json" => self.load_json(path, sniff_json_format(path)?),
            // CSV is the default
            _ => self.load_csv(path, b','),
        }
    }

    /// Load and type the valuation dataset
    pub fn load_dataset(&self, path: &Path) -> Result<Dataset> {
        let start = Instant::now();
        let df = self.load_auto(path)?;
        let dataset = Dataset::from_frame(&df)?;

        info!(
            path = %path.display(),
            rows = dataset.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Dataset loaded"
        );
        Ok(dataset)
    }
}

/// A `.json` source holding a top-level array is read as one document,
/// anything else as line-delimited records
fn sniff_json_format(path: &Path) -> Result<JsonFormat> {
    let mut head = [0u8; 512];
    let n = open(path)?
        .read(&mut head)
        .map_err(|e| DashboardError::DataLoad(format!("cannot read {}: {}", path.display(), e)))?;

    match head[..n].iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'[') => Ok(JsonFormat::Json),
        _ => Ok(JsonFormat::JsonLines),
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path)
        .map_err(|e| DashboardError::DataLoad(format!("cannot open {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "No,X1 transaction date,X2 house age,X3 distance to the nearest MRT station,X4 number of convenience stores,X5 latitude,X6 longitude,Y house price of unit area";

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "{}\n1,2012.917,32,84.87882,10,24.98298,121.54024,37.9\n2,2012.917,19.5,306.5947,9,24.98034,121.53951,42.2\n3,2013.583,13.3,561.9845,5,24.98746,121.54391,47.3\n",
            HEADER
        );
        let path = write_file(&dir, "estate.csv", &content);

        let dataset = DataLoader::new().load_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 3);

        let first = dataset.records()[0];
        assert_eq!(first.id, 1);
        assert_eq!(first.house_age, 32.0);
        assert_eq!(first.num_convenience_stores, 10);
        assert_eq!(first.price_per_unit_area, 37.9);
        assert_eq!(dataset.records()[2].transaction_date, 2013.583);
    }

    #[test]
    fn test_load_tsv_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "{}\n1\t2012.917\t32\t84.87882\t10\t24.98298\t121.54024\t37.9\n",
            HEADER.replace(',', "\t")
        );
        let path = write_file(&dir, "estate.tsv", &content);

        let dataset = DataLoader::new().load_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    const ROWS: [&str; 2] = [
        r#"{"No":1,"X1":2012.917,"X2":32.0,"X3":84.87882,"X4":10,"X5":24.98298,"X6":121.54024,"Y":37.9}"#,
        r#"{"No":2,"X1":2012.917,"X2":19.5,"X3":306.5947,"X4":9,"X5":24.98034,"X6":121.53951,"Y":42.2}"#,
    ];

    #[test]
    fn test_load_line_delimited_json() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!("{}\n{}\n", ROWS[0], ROWS[1]);

        for name in ["estate.json", "estate.jsonl", "estate.ndjson"] {
            let path = write_file(&dir, name, &content);
            let dataset = DataLoader::new().load_dataset(&path).unwrap();
            assert_eq!(dataset.len(), 2, "{name}");
            assert_eq!(dataset.records()[1].house_age, 19.5);
            assert_eq!(dataset.records()[0].num_convenience_stores, 10);
        }
    }

    #[test]
    fn test_load_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!("\n  [{},\n{}]\n", ROWS[0], ROWS[1]);
        let path = write_file(&dir, "estate.json", &content);

        let dataset = DataLoader::new().load_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[1].price_per_unit_area, 42.2);
    }

    #[test]
    fn test_load_parquet_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("estate.parquet");

        let mut df = DataFrame::new(vec![
            Series::new("No".into(), &[1i64, 2]).into(),
            Series::new("X1".into(), &[2012.917, 2013.583]).into(),
            Series::new("X2".into(), &[32.0, 13.3]).into(),
            Series::new("X3".into(), &[84.87882, 561.9845]).into(),
            Series::new("X4".into(), &[10i64, 5]).into(),
            Series::new("X5".into(), &[24.98298, 24.98746]).into(),
            Series::new("X6".into(), &[121.54024, 121.54391]).into(),
            Series::new("Y".into(), &[37.9, 47.3]).into(),
        ])
        .unwrap();
        let mut file = File::create(&path).unwrap();
        ParquetWriter::new(&mut file).finish(&mut df).unwrap();

        let dataset = DataLoader::new().load_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[1].num_convenience_stores, 5);
        assert_eq!(dataset.records()[1].distance_to_mrt, 561.9845);
    }

    #[test]
    fn test_missing_file_is_data_load_error() {
        let err = DataLoader::new()
            .load_dataset(Path::new("/nonexistent/estate.csv"))
            .unwrap_err();
        assert!(matches!(err, DashboardError::DataLoad(_)));
    }

    #[test]
    fn test_wrong_column_count_is_data_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "narrow.csv", "a,b,c\n1,2,3\n");

        let err = DataLoader::new().load_dataset(&path).unwrap_err();
        assert!(err.to_string().contains("expected 8 columns"));
    }

    #[test]
    fn test_non_numeric_value_is_data_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let content = format!(
            "{}\n1,2012.917,32,84.87882,10,24.98298,121.54024,37.9\n2,2012.917,old,306.5947,9,24.98034,121.53951,42.2\n",
            HEADER
        );
        let path = write_file(&dir, "dirty.csv", &content);

        let err = DataLoader::new().load_dataset(&path).unwrap_err();
        assert!(matches!(err, DashboardError::DataLoad(_)));
    }
}
