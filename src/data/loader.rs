use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type, Schema};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Category, LoadReport, StudentRecord, StudentTable, Subject, SubjectScores};
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a student table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one row per student (the usual export)
/// * `.json`    – `[{ "gender": "...", "math score": 72, ... }, ...]`
/// * `.parquet` – flat columns with the same names as the CSV header
///
/// Headers are normalised before matching (see [`normalize_header`]).
/// Rows whose scores are missing or non-numeric are dropped and counted in
/// the table's [`LoadReport`].
pub fn load_file(path: &Path) -> Result<StudentTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DashboardError::UnsupportedExtension(other.to_string())),
    };

    log::info!(
        "Loaded {} students from {} ({} of {} rows dropped for non-numeric scores)",
        table.len(),
        path.display(),
        table.report.rows_dropped,
        table.report.rows_read
    );
    Ok(table)
}

/// Lowercase a header and replace spaces with underscores.
///
/// `"Math Score"` → `"math_score"`, `"race/ethnicity"` is unchanged.
pub fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace(' ', "_")
}

/// Interpret a score cell.  Empty, non-numeric and non-finite text is missing.
pub fn coerce_score(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// Row assembly shared by all formats
// ---------------------------------------------------------------------------

/// Category values of one row, in `Category::ALL` order.
type CategoryCells = [String; 5];

/// Score values of one row, in `Subject::ALL` order.
type ScoreCells = [Option<f64>; 3];

#[derive(Default)]
struct RowCollector {
    records: Vec<StudentRecord>,
    report: LoadReport,
}

impl RowCollector {
    fn push(&mut self, row_no: usize, categories: CategoryCells, scores: ScoreCells) {
        self.report.rows_read += 1;

        let [Some(math), Some(reading), Some(writing)] = scores else {
            let bad: Vec<&str> = Subject::ALL
                .iter()
                .zip(scores.iter())
                .filter(|(_, v)| v.is_none())
                .map(|(s, _)| s.column())
                .collect();
            log::debug!("Row {row_no}: dropped, non-numeric {}", bad.join(", "));
            self.report.rows_dropped += 1;
            return;
        };

        let [gender, race, education, lunch, prep] = categories;
        self.records.push(StudentRecord::new(
            gender,
            race,
            education,
            lunch,
            prep,
            SubjectScores {
                math,
                reading,
                writing,
            },
        ));
    }

    fn finish(self) -> StudentTable {
        StudentTable::from_records(self.records, self.report)
    }
}

/// Positions of the required columns within a normalised header row.
struct ColumnIndex {
    categories: [usize; 5],
    scores: [usize; 3],
}

impl ColumnIndex {
    fn locate(headers: &[String]) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
        };

        let mut categories = [0usize; 5];
        for (slot, category) in categories.iter_mut().zip(Category::ALL) {
            *slot = find(category.column())?;
        }
        let mut scores = [0usize; 3];
        for (slot, subject) in scores.iter_mut().zip(Subject::ALL) {
            *slot = find(subject.column())?;
        }
        Ok(ColumnIndex { categories, scores })
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<StudentTable> {
    let file = File::open(path).map_err(|e| DashboardError::file_access(path, e))?;
    read_csv(file)
}

/// Parse CSV from any reader.  Exposed for in-memory inputs.
pub fn read_csv<R: std::io::Read>(input: R) -> Result<StudentTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let index = ColumnIndex::locate(&headers)?;

    let mut rows = RowCollector::default();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        let cell = |i: usize| record.get(i).unwrap_or("");

        let categories = index.categories.map(|i| cell(i).to_string());
        let scores = index.scores.map(|i| coerce_score(cell(i)));
        rows.push(row_no, categories, scores);
    }

    Ok(rows.finish())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "gender": "female", "race/ethnicity": "group B", "math score": 72, ... },
///   ...
/// ]
/// ```
///
/// Scores may be JSON numbers or numeric strings.
fn load_json(path: &Path) -> Result<StudentTable> {
    let text = std::fs::read_to_string(path).map_err(|e| DashboardError::file_access(path, e))?;
    parse_json(&text)
}

/// Parse records-oriented JSON text.
pub fn parse_json(text: &str) -> Result<StudentTable> {
    let root: JsonValue = serde_json::from_str(text)?;
    let records = root.as_array().ok_or_else(|| DashboardError::InvalidRecord {
        row: 0,
        reason: "expected a top-level JSON array".to_string(),
    })?;

    let mut rows = RowCollector::default();
    for (row_no, rec) in records.iter().enumerate() {
        let obj = rec.as_object().ok_or_else(|| DashboardError::InvalidRecord {
            row: row_no,
            reason: "not a JSON object".to_string(),
        })?;
        let fields: BTreeMap<String, &JsonValue> =
            obj.iter().map(|(k, v)| (normalize_header(k), v)).collect();
        let field = |name: &str| {
            fields
                .get(name)
                .copied()
                .ok_or_else(|| DashboardError::MissingColumn(name.to_string()))
        };

        let mut categories = CategoryCells::default();
        for (slot, category) in categories.iter_mut().zip(Category::ALL) {
            *slot = json_to_text(field(category.column())?);
        }
        let mut scores: ScoreCells = [None; 3];
        for (slot, subject) in scores.iter_mut().zip(Subject::ALL) {
            *slot = json_to_score(field(subject.column())?);
        }
        rows.push(row_no, categories, scores);
    }

    Ok(rows.finish())
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_to_score(val: &JsonValue) -> Option<f64> {
    match val {
        JsonValue::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        JsonValue::String(s) => coerce_score(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the student table.
///
/// Expected schema:
/// - category columns: Utf8 or LargeUtf8 (nulls read as empty text)
/// - score columns: Int32, Int64, Float32, Float64, or Utf8 (coerced like CSV)
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<StudentTable> {
    let file = File::open(path).map_err(|e| DashboardError::file_access(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut rows = RowCollector::default();
    let mut row_no = 0usize;

    for batch_result in reader {
        let batch = batch_result?;
        let index = parquet_column_index(&batch.schema())?;

        let category_cols: Vec<(&str, &ArrayRef)> = Category::ALL
            .iter()
            .zip(index.categories)
            .map(|(c, i)| (c.column(), batch.column(i)))
            .collect();
        let score_cols: Vec<(&str, &ArrayRef)> = Subject::ALL
            .iter()
            .zip(index.scores)
            .map(|(s, i)| (s.column(), batch.column(i)))
            .collect();

        for row in 0..batch.num_rows() {
            let mut categories = CategoryCells::default();
            for (slot, (name, col)) in categories.iter_mut().zip(&category_cols) {
                *slot = category_at(col, row, name)?;
            }
            let mut scores: ScoreCells = [None; 3];
            for (slot, (name, col)) in scores.iter_mut().zip(&score_cols) {
                *slot = score_at(col, row, name)?;
            }
            rows.push(row_no, categories, scores);
            row_no += 1;
        }
    }

    Ok(rows.finish())
}

// -- Parquet / Arrow helpers --

fn parquet_column_index(schema: &Schema) -> Result<ColumnIndex> {
    let headers: Vec<String> = schema
        .fields()
        .iter()
        .map(|f| normalize_header(f.name()))
        .collect();
    ColumnIndex::locate(&headers)
}

fn column_type_error(col: &ArrayRef, name: &str) -> DashboardError {
    DashboardError::ColumnType {
        column: name.to_string(),
        data_type: format!("{:?}", col.data_type()),
    }
}

/// Read a category cell as text.
fn category_at(col: &ArrayRef, row: usize, name: &str) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    match col.data_type() {
        DataType::Utf8 => Ok(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        _ => Err(column_type_error(col, name)),
    }
}

/// Read a score cell, coercing text and treating nulls as missing.
fn score_at(col: &ArrayRef, row: usize, name: &str) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Int32 => Some(col.as_primitive::<Int32Type>().value(row) as f64),
        DataType::Int64 => Some(col.as_primitive::<Int64Type>().value(row) as f64),
        DataType::Float32 => Some(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => Some(col.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8 => coerce_score(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => coerce_score(col.as_string::<i64>().value(row)),
        _ => return Err(column_type_error(col, name)),
    };
    Ok(value.filter(|v| v.is_finite()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::Field;
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "gender,race/ethnicity,parental level of education,lunch,test preparation course,math score,reading score,writing score";

    fn csv_table(rows: &[&str]) -> StudentTable {
        let text = format!("{HEADER}\n{}\n", rows.join("\n"));
        read_csv(text.as_bytes()).unwrap()
    }

    #[test]
    fn headers_are_normalised() {
        assert_eq!(normalize_header("Math Score"), "math_score");
        assert_eq!(normalize_header(" race/ethnicity "), "race/ethnicity");
        assert_eq!(
            normalize_header("parental level of education"),
            "parental_level_of_education"
        );
    }

    #[test]
    fn coercion_rejects_non_numeric() {
        assert_eq!(coerce_score(" 72 "), Some(72.0));
        assert_eq!(coerce_score("88.5"), Some(88.5));
        assert_eq!(coerce_score(""), None);
        assert_eq!(coerce_score("absent"), None);
        assert_eq!(coerce_score("NaN"), None);
        assert_eq!(coerce_score("inf"), None);
    }

    #[test]
    fn csv_rows_with_bad_scores_are_dropped() {
        let table = csv_table(&[
            "female,group B,bachelor's degree,standard,none,72,72,74",
            "male,group A,high school,free/reduced,completed,n/a,60,61",
            "male,group C,some college,standard,none,47,,44",
            "female,group C,master's degree,standard,completed,90,95,93",
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.report,
            LoadReport {
                rows_read: 4,
                rows_dropped: 2
            }
        );
        assert_eq!(table.records[0].race_ethnicity, "group B");
        assert_eq!(table.records[1].score(Subject::Reading), 95.0);
        assert!((table.records[0].avg_score() - 218.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn csv_short_row_is_dropped() {
        let table = csv_table(&[
            "female,group B,bachelor's degree,standard,none,72,72,74",
            "male,group A,high school,standard,none,50,60",
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.report,
            LoadReport {
                rows_read: 2,
                rows_dropped: 1
            }
        );
    }

    #[test]
    fn csv_header_case_and_order_do_not_matter() {
        let text = "Writing Score,Math Score,Reading Score,Lunch,Gender,Race/Ethnicity,Test Preparation Course,Parental Level Of Education\n\
                    80,70,75,standard,female,group D,none,high school\n";
        let table = read_csv(text.as_bytes()).unwrap();
        let rec = &table.records[0];
        assert_eq!(rec.score(Subject::Math), 70.0);
        assert_eq!(rec.score(Subject::Writing), 80.0);
        assert_eq!(rec.parental_level_of_education, "high school");
    }

    #[test]
    fn csv_missing_column_is_reported() {
        let text = "gender,race/ethnicity,lunch,math score,reading score,writing score\n";
        let err = read_csv(text.as_bytes()).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumn(c) if c == "parental_level_of_education"));
    }

    #[test]
    fn missing_file_is_file_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::FileAccess { .. }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("scores.xlsx")).unwrap_err();
        assert!(matches!(err, DashboardError::UnsupportedExtension(e) if e == "xlsx"));
    }

    #[test]
    fn load_csv_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        writeln!(file, "female,group B,some college,standard,none,60,70,80").unwrap();
        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].avg_score(), 70.0);
    }

    #[test]
    fn json_accepts_numbers_and_numeric_strings() {
        let text = r#"[
            {"gender": "female", "race/ethnicity": "group A", "parental level of education": "high school",
             "lunch": "standard", "test preparation course": "none",
             "math score": 60, "reading score": "70", "writing score": 80.0},
            {"gender": "male", "race/ethnicity": "group B", "parental level of education": "high school",
             "lunch": "standard", "test preparation course": "none",
             "math score": null, "reading score": 70, "writing score": 80}
        ]"#;
        let table = parse_json(text).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.report.rows_dropped, 1);
        assert_eq!(table.records[0].avg_score(), 70.0);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        assert!(matches!(
            parse_json(r#"{"gender": "female"}"#),
            Err(DashboardError::InvalidRecord { row: 0, .. })
        ));
        assert!(matches!(
            parse_json("[1, 2]"),
            Err(DashboardError::InvalidRecord { row: 0, .. })
        ));
    }

    #[test]
    fn parquet_round_trip_with_mixed_score_types() {
        let text_col = |v: Vec<&str>| Arc::new(StringArray::from(v)) as ArrayRef;
        let schema = Arc::new(Schema::new(vec![
            Field::new("gender", DataType::Utf8, false),
            Field::new("race/ethnicity", DataType::Utf8, false),
            Field::new("parental level of education", DataType::Utf8, false),
            Field::new("lunch", DataType::Utf8, false),
            Field::new("test preparation course", DataType::Utf8, false),
            Field::new("math score", DataType::Int64, true),
            Field::new("reading score", DataType::Float64, false),
            Field::new("writing score", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                text_col(vec!["female", "male"]),
                text_col(vec!["group A", "group B"]),
                text_col(vec!["high school", "some college"]),
                text_col(vec!["standard", "free/reduced"]),
                text_col(vec!["none", "completed"]),
                Arc::new(Int64Array::from(vec![Some(60), None])),
                Arc::new(Float64Array::from(vec![70.0, 80.0])),
                text_col(vec!["80", "90"]),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(file.path()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.report.rows_dropped, 1);
        assert_eq!(table.records[0].avg_score(), 70.0);
        assert_eq!(table.records[0].lunch, "standard");
    }
}
