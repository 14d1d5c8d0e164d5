use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{hour_of_day, Record, SalesDataset};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Fixed schema
// ---------------------------------------------------------------------------

/// Columns the sales table must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SalesColumn {
    OrderId,
    Time,
    City,
    CustomerType,
    Gender,
    ProductLine,
    Total,
    Rating,
}

impl SalesColumn {
    const ALL: [SalesColumn; 8] = [
        SalesColumn::OrderId,
        SalesColumn::Time,
        SalesColumn::City,
        SalesColumn::CustomerType,
        SalesColumn::Gender,
        SalesColumn::ProductLine,
        SalesColumn::Total,
        SalesColumn::Rating,
    ];

    fn header(self) -> &'static str {
        match self {
            SalesColumn::OrderId => "order_id",
            SalesColumn::Time => "time",
            SalesColumn::City => "city",
            SalesColumn::CustomerType => "customer_type",
            SalesColumn::Gender => "gender",
            SalesColumn::ProductLine => "product_line",
            SalesColumn::Total => "total",
            SalesColumn::Rating => "rating",
        }
    }

    /// Header used by the supermarket workbook export.
    fn alternate(self) -> &'static str {
        match self {
            SalesColumn::OrderId => "订单号",
            SalesColumn::Time => "时间",
            SalesColumn::City => "城市",
            SalesColumn::CustomerType => "顾客类型",
            SalesColumn::Gender => "性别",
            SalesColumn::ProductLine => "产品类型",
            SalesColumn::Total => "总价",
            SalesColumn::Rating => "评分",
        }
    }

    fn matches(self, name: &str) -> bool {
        let name = name.trim();
        name.eq_ignore_ascii_case(self.header()) || name == self.alternate()
    }
}

/// Locate every [`SalesColumn`] among `names`; fails on the first one absent.
fn resolve_columns<'a, I>(names: I) -> Result<[usize; 8], LoadError>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let mut positions = [0usize; 8];
    for (slot, column) in positions.iter_mut().zip(SalesColumn::ALL) {
        *slot = names
            .clone()
            .into_iter()
            .position(|name| column.matches(name))
            .ok_or(LoadError::MissingColumn {
                column: column.header(),
            })?;
    }
    Ok(positions)
}

// ---------------------------------------------------------------------------
// Cell → Record conversion shared by every format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Number(f64),
    Null,
}

impl Cell {
    fn from_text(s: &str) -> Cell {
        let s = s.trim();
        if s.is_empty() {
            Cell::Null
        } else {
            Cell::Text(s.to_string())
        }
    }
}

fn invalid(row: usize, column: SalesColumn, message: impl Into<String>) -> LoadError {
    LoadError::InvalidValue {
        row,
        column: column.header(),
        message: message.into(),
    }
}

fn text_cell(row: usize, column: SalesColumn, cell: Cell) -> Result<String, LoadError> {
    match cell {
        Cell::Text(s) => Ok(s),
        // Integral ids stored as numbers (e.g. by Excel exports) print without ".0".
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Ok(format!("{}", n as i64)),
        Cell::Number(n) => Ok(n.to_string()),
        Cell::Null => Err(invalid(row, column, "value is missing")),
    }
}

fn number_cell(row: usize, column: SalesColumn, cell: Cell) -> Result<Option<f64>, LoadError> {
    let value = match cell {
        Cell::Number(n) => n,
        Cell::Text(s) => s
            .parse::<f64>()
            .map_err(|_| invalid(row, column, format!("'{s}' is not a number")))?,
        Cell::Null => return Ok(None),
    };
    if value.is_nan() {
        Ok(None)
    } else {
        Ok(Some(value))
    }
}

/// Build one record; `cell` yields the raw value of each column for `row`.
fn build_record<F>(row: usize, mut cell: F) -> Result<Record, LoadError>
where
    F: FnMut(SalesColumn) -> Result<Cell, LoadError>,
{
    let time = text_cell(row, SalesColumn::Time, cell(SalesColumn::Time)?)?;
    let hour = hour_of_day(&time)
        .map_err(|e| invalid(row, SalesColumn::Time, format!("'{time}': {e}")))?;
    let total = number_cell(row, SalesColumn::Total, cell(SalesColumn::Total)?)?
        .ok_or_else(|| invalid(row, SalesColumn::Total, "value is missing"))?;

    Ok(Record {
        order_id: text_cell(row, SalesColumn::OrderId, cell(SalesColumn::OrderId)?)?,
        city: text_cell(row, SalesColumn::City, cell(SalesColumn::City)?)?,
        customer_type: text_cell(row, SalesColumn::CustomerType, cell(SalesColumn::CustomerType)?)?,
        gender: text_cell(row, SalesColumn::Gender, cell(SalesColumn::Gender)?)?,
        product_line: text_cell(row, SalesColumn::ProductLine, cell(SalesColumn::ProductLine)?)?,
        total,
        rating: number_cell(row, SalesColumn::Rating, cell(SalesColumn::Rating)?)?,
        time,
        hour,
    })
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Options that adjust how a source is read.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Rows discarded before the header row (CSV only).
    pub skip_rows: usize,
}

/// Load the sales table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row followed by one row per order
/// * `.json`    – `[{ "order_id": "...", "time": "10:29:00", ... }, ...]`
/// * `.parquet` – one column per field, text or numeric
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<SalesDataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path, options.skip_rows)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };
    log::debug!("parsed {} rows from {}", records.len(), path.display());

    SalesDataset::from_records(records)
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: `skip_rows` free-form rows (e.g. a sheet title), then the
/// header row, then data.
fn load_csv(path: &Path, skip_rows: usize) -> Result<Vec<Record>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(open(path)?);
    let mut rows = reader.records().skip(skip_rows);

    let headers = match rows.next() {
        Some(result) => result?,
        None => return Err(LoadError::MissingColumn { column: SalesColumn::OrderId.header() }),
    };
    let positions = resolve_columns(headers.iter())?;

    let mut records = Vec::new();
    for (i, result) in rows.enumerate() {
        let row = result?;
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let row_no = i + 1;
        let record = build_record(row_no, |column| {
            let idx = positions[column as usize];
            Ok(Cell::from_text(row.get(idx).unwrap_or("")))
        })?;
        records.push(record);
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "order_id": "750-67-8428", "time": "13:08:00", "city": "Yangon",
///     "customer_type": "Member", "gender": "Female",
///     "product_line": "Health and beauty", "total": 548.97, "rating": 9.1 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Record>, LoadError> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;
    let Some(rows) = root.as_array() else {
        return Err(LoadError::InvalidValue {
            row: 0,
            column: SalesColumn::OrderId.header(),
            message: "expected a top-level JSON array".to_string(),
        });
    };

    rows.iter()
        .enumerate()
        .map(|(i, value)| {
            let row_no = i + 1;
            let obj = value
                .as_object()
                .ok_or_else(|| invalid(row_no, SalesColumn::OrderId, "row is not a JSON object"))?;
            build_record(row_no, |column| {
                let value = obj
                    .iter()
                    .find(|(key, _)| column.matches(key))
                    .map(|(_, v)| v)
                    .ok_or(LoadError::MissingColumn {
                        column: column.header(),
                    })?;
                Ok(json_to_cell(value))
            })
        })
        .collect()
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::from_text(s),
        JsonValue::Number(n) => n.as_f64().map(Cell::Number).unwrap_or(Cell::Null),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Record>, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    // Checked against the file schema so a file without rows is still validated.
    let positions = resolve_columns(builder.schema().fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let row_no = records.len() + 1;
            let record = build_record(row_no, |column| {
                extract_cell(batch.column(positions[column as usize]), row)
            })?;
            records.push(record);
        }
    }
    Ok(records)
}

/// Extract a single value from an Arrow column at a given row.
fn extract_cell(col: &ArrayRef, row: usize) -> Result<Cell, LoadError> {
    if col.is_null(row) {
        return Ok(Cell::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => Cell::from_text(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => Cell::from_text(col.as_string::<i64>().value(row)),
        DataType::Int32 => Cell::Number(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => Cell::Number(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Float32 => Cell::Number(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Cell::Number(col.as_primitive::<Float64Type>().value(row)),
        // Time64, Date32, dictionary strings, ... render through Arrow's formatter.
        _ => Cell::from_text(&array_value_to_string(col.as_ref(), row)?),
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_resolve_by_canonical_or_alternate_header() {
        let names = [
            "评分", "总价", "产品类型", "性别", "顾客类型", "城市", "时间", "订单号", "extra",
        ];
        let pos = resolve_columns(names.iter().copied()).unwrap();
        assert_eq!(pos[SalesColumn::OrderId as usize], 7);
        assert_eq!(pos[SalesColumn::Rating as usize], 0);

        let names = [
            "Order_ID", "time", "city", "customer_type", "gender", "product_line", "total",
            "rating",
        ];
        let pos = resolve_columns(names.iter().copied()).unwrap();
        assert_eq!(pos[SalesColumn::OrderId as usize], 0);
    }

    #[test]
    fn missing_column_is_named() {
        let names = ["order_id", "time", "city", "customer_type", "gender", "total", "rating"];
        let err = resolve_columns(names.iter().copied()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column: "product_line" }));
    }

    #[test]
    fn blank_rating_is_missing_but_blank_total_is_an_error() {
        let cells = |total: Cell, rating: Cell| {
            move |column: SalesColumn| -> Result<Cell, LoadError> {
                Ok(match column {
                    SalesColumn::OrderId => Cell::Number(101.0),
                    SalesColumn::Time => Cell::Text("19:45:00".into()),
                    SalesColumn::Total => total.clone(),
                    SalesColumn::Rating => rating.clone(),
                    _ => Cell::Text("x".into()),
                })
            }
        };

        let rec = build_record(1, cells(Cell::Text("12.5".into()), Cell::Null)).unwrap();
        assert_eq!(rec.order_id, "101");
        assert_eq!(rec.hour, 19);
        assert_eq!(rec.total, 12.5);
        assert_eq!(rec.rating, None);

        let err = build_record(3, cells(Cell::Null, Cell::Number(5.0))).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { row: 3, column: "total", .. }));
    }

    fn write_empty_parquet(path: &Path, columns: &[&str]) {
        use std::sync::Arc;

        use arrow::datatypes::{Field, Schema};
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(
            columns
                .iter()
                .map(|name| Field::new(*name, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ));
        let writer = ArrowWriter::try_new(File::create(path).unwrap(), schema, None).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn parquet_schema_is_checked_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.parquet");
        write_empty_parquet(&path, &["foo"]);
        let err = load_file(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column: "order_id" }));

        let path = dir.path().join("empty.parquet");
        let all = SalesColumn::ALL.map(SalesColumn::header);
        write_empty_parquet(&path, &all);
        assert!(load_file(&path, &LoadOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = load_file(Path::new("sales.xlsx"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "xlsx"));
    }
}
