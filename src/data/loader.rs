use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{float_text, parse_note, RawListing};

/// Keys every record must carry.
const REQUIRED_FIELDS: [&str; 3] = ["title", "price", "ai_note"];

/// String-valued keys of a [`RawListing`].
const TEXT_FIELDS: [&str; 11] = [
    "title",
    "url",
    "price",
    "mileage",
    "year",
    "city",
    "fuel_type",
    "transmission",
    "body_type",
    "description",
    "ai_comment",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load raw listings from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – `[{ "title": ..., "price": ..., "ai_note": ... }, ...]`
/// * `.csv`     – header row with the listing keys as column names
/// * `.parquet` – one column per listing key
pub fn load_file(path: &Path) -> Result<Vec<RawListing>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => load_json(path),
        "csv" => load_csv(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Decode the records-oriented JSON published by the listings feed:
///
/// ```json
/// [
///   {
///     "title": "Peugeot 208",
///     "price": "12 345 €",
///     "mileage": "45 000 km",
///     "year": "2019",
///     "ai_note": 4,
///     ...
///   },
///   ...
/// ]
/// ```
pub fn parse_json(text: &str) -> Result<Vec<RawListing>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            if !rec.is_object() {
                bail!("Row {i} is not a JSON object");
            }
            RawListing::deserialize(rec).with_context(|| format!("Row {i}"))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Vec<RawListing>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with the listing keys, one listing per row.
/// Columns other than the listing keys are ignored.
fn load_csv(path: &Path) -> Result<Vec<RawListing>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;

    reader
        .deserialize::<RawListing>()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {row_no}")))
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Expected schema: one column per listing key. Text columns may be any of
/// Utf8 / LargeUtf8 / integer / float / boolean; `ai_note` integer, float
/// or numeric string. Optional columns may be missing.
fn load_parquet(path: &Path) -> Result<Vec<RawListing>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut listings = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for required in REQUIRED_FIELDS {
            if schema.index_of(required).is_err() {
                bail!("Parquet file missing '{required}' column");
            }
        }

        let text_cols: Vec<(&str, &ArrayRef)> = TEXT_FIELDS
            .iter()
            .filter_map(|name| {
                let idx = schema.index_of(name).ok()?;
                Some((*name, batch.column(idx)))
            })
            .collect();
        let note_col = batch.column(schema.index_of("ai_note")?);

        for row in 0..batch.num_rows() {
            let mut raw = RawListing::default();
            for (name, col) in &text_cols {
                set_text_field(&mut raw, name, cell_text(col, row));
            }
            raw.ai_note = parse_note(&cell_text(note_col, row));
            listings.push(raw);
        }
    }

    Ok(listings)
}

fn set_text_field(raw: &mut RawListing, name: &str, value: String) {
    let slot = match name {
        "title" => &mut raw.title,
        "url" => &mut raw.url,
        "price" => &mut raw.price,
        "mileage" => &mut raw.mileage,
        "year" => &mut raw.year,
        "city" => &mut raw.city,
        "fuel_type" => &mut raw.fuel_type,
        "transmission" => &mut raw.transmission,
        "body_type" => &mut raw.body_type,
        "description" => &mut raw.description,
        "ai_comment" => &mut raw.ai_comment,
        _ => return,
    };
    *slot = value;
}

/// Render one Arrow cell as text; nulls become the empty string.
fn cell_text(col: &ArrayRef, row: usize) -> String {
    if col.is_null(row) {
        return String::new();
    }
    match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::Float32 => float_text(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float_text(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => col.as_boolean().value(row).to_string(),
        other => {
            log::warn!("Unsupported parquet column type {other:?}, reading as empty");
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use arrow::array::{Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("listings-loader-{}-{name}", std::process::id()))
    }

    #[test]
    fn parses_records_in_order() {
        let listings = parse_json(
            r#"[
                {"title": "a", "price": "1 000 €", "ai_note": 3, "fuel_type": "diesel"},
                {"title": "b", "price": "2 000 €", "ai_note": null}
            ]"#,
        )
        .unwrap();
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].fuel_type, "diesel");
        assert_eq!(listings[1].title, "b");
        assert_eq!(listings[1].ai_note, None);
    }

    #[test]
    fn rejects_non_array_root() {
        let err = parse_json(r#"{"title": "a"}"#).unwrap_err();
        assert!(format!("{err:#}").contains("top-level JSON array"));
    }

    #[test]
    fn names_the_failing_row() {
        let err = parse_json(r#"[{"title": "a", "price": "1", "ai_note": 1}, {"title": "b"}]"#)
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("Row 1"), "{msg}");
        assert!(msg.contains("price"), "{msg}");

        let err = parse_json(r#"[42]"#).unwrap_err();
        assert!(format!("{err:#}").contains("Row 0 is not a JSON object"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_json("[{").is_err());
    }

    #[test]
    fn loads_csv_with_header() {
        let path = temp_path("listings.csv");
        std::fs::write(
            &path,
            "title,url,price,mileage,year,city,fuel_type,transmission,body_type,description,ai_comment,ai_note\n\
             Clio,http://x,9 500 €,80 000 km,2019,Lyon,diesel,manual,hatchback,,ok,4\n\
             Zoe,http://y,14 000 €,,N/A,Paris,electric,automatic,hatchback,,,\n",
        )
        .unwrap();

        let listings = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].year, "2019");
        assert_eq!(listings[0].ai_note, Some(4));
        assert_eq!(listings[1].mileage, "");
        assert_eq!(listings[1].ai_note, None);
    }

    #[test]
    fn loads_parquet_columns() {
        let path = temp_path("listings.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("title", DataType::Utf8, false),
            Field::new("price", DataType::Utf8, true),
            Field::new("year", DataType::Float64, true),
            Field::new("ai_note", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["a", "b"])),
                Arc::new(StringArray::from(vec![Some("5 000 €"), None])),
                Arc::new(Float64Array::from(vec![Some(2018.0), None])),
                Arc::new(Float64Array::from(vec![Some(4.0), Some(2.5)])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let listings = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price, "5 000 €");
        assert_eq!(listings[0].year, "2018");
        assert_eq!(listings[0].ai_note, Some(4));
        assert_eq!(listings[1].price, "");
        assert_eq!(listings[1].ai_note, None);
        assert_eq!(listings[1].city, "");
    }

    #[test]
    fn parquet_text_notes_follow_json_rules() {
        let path = temp_path("text-notes.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("title", DataType::Utf8, false),
            Field::new("price", DataType::Float64, false),
            Field::new("ai_note", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["a", "b", "c"])),
                Arc::new(Float64Array::from(vec![9500.5, 8000.0, 1234.567])),
                Arc::new(StringArray::from(vec![Some("4.0"), Some(" 2 "), Some("7")])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let listings = load_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let notes: Vec<Option<i64>> = listings.iter().map(|l| l.ai_note).collect();
        assert_eq!(notes, vec![Some(4), Some(2), None]);
        assert_eq!(listings[0].price, "9500.50");
        assert_eq!(listings[1].price, "8000");
        assert_eq!(listings[2].price, "1234.56");
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("listings.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
