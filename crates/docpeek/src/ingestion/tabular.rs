//! Spreadsheet and CSV readers producing a row preview
//!
//! Both readers parse the whole input, so a malformed record anywhere in the
//! file is reported, but only the first `max_rows` data rows are kept. The
//! first row supplies column names. Cell typing is decided per column over
//! every row: a column is numeric or boolean only if all of its non-empty
//! cells are.

use calamine::{Data, ExcelDateTime, Reader};
use serde_json::{Map, Number, Value};
use std::collections::HashSet;
use std::io::Cursor;

use crate::error::{Error, Result};

/// One previewed row: column name -> cell value, in column order
pub type Row = Map<String, Value>;

/// Leading rows of a parsed table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TablePreview {
    /// Column names in order
    pub columns: Vec<String>,
    /// At most `max_rows` rows
    pub rows: Vec<Row>,
    /// Data rows in the whole table (not reported to clients)
    pub total_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Unknown,
    Int,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    fn merge(self, other: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, other) {
            (Unknown, k) | (k, Unknown) => k,
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Text,
        }
    }
}

/// Parse CSV bytes
pub fn read_csv(filename: &str, data: &[u8], max_rows: usize) -> Result<TablePreview> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| Error::file_parse(filename, e.to_string()))?
        .clone();

    if headers.is_empty() {
        return Err(Error::file_parse(filename, "No columns to parse from file"));
    }

    let columns = column_names(headers.iter().map(|h| Some(h.to_string())));
    let width = columns.len();
    let mut kinds = vec![ColumnKind::Unknown; width];
    let mut head: Vec<csv::StringRecord> = Vec::with_capacity(max_rows);
    let mut total_rows = 0usize;

    for result in reader.records() {
        let record = result.map_err(|e| Error::file_parse(filename, e.to_string()))?;

        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(Error::file_parse(
                filename,
                format!(
                    "Error tokenizing data. Expected {} fields in line {}, saw {}",
                    width,
                    line,
                    record.len()
                ),
            ));
        }

        for (kind, cell) in kinds.iter_mut().zip(record.iter()) {
            if !cell.is_empty() {
                *kind = kind.merge(text_kind(cell));
            }
        }

        if head.len() < max_rows {
            head.push(record);
        }
        total_rows += 1;
    }

    let rows = head
        .iter()
        .map(|record| {
            columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value = record
                        .get(i)
                        .map(|cell| text_value(cell, kinds[i]))
                        .unwrap_or(Value::Null);
                    (column.clone(), value)
                })
                .collect::<Row>()
        })
        .collect();

    Ok(TablePreview {
        columns,
        rows,
        total_rows,
    })
}

/// Parse an Excel workbook (.xls / .xlsx), first worksheet only
pub fn read_spreadsheet(filename: &str, data: &[u8], max_rows: usize) -> Result<TablePreview> {
    let cursor = Cursor::new(data);
    let mut workbook = calamine::open_workbook_auto_from_rs(cursor)
        .map_err(|e| Error::file_parse(filename, e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::file_parse(filename, "Workbook contains no worksheets"))?
        .map_err(|e| Error::file_parse(filename, e.to_string()))?;

    let mut rows_iter = range
        .rows()
        .filter(|row| !row.iter().all(|cell| matches!(cell, Data::Empty)));

    let Some(header) = rows_iter.next() else {
        return Ok(TablePreview::default());
    };

    let columns = column_names(header.iter().map(header_name));
    let mut kinds = vec![ColumnKind::Unknown; columns.len()];
    let mut head: Vec<&[Data]> = Vec::with_capacity(max_rows);
    let mut total_rows = 0usize;

    for row in rows_iter {
        for (kind, cell) in kinds.iter_mut().zip(row.iter()) {
            if let Some(cell_kind) = cell_kind(cell) {
                *kind = kind.merge(cell_kind);
            }
        }
        if head.len() < max_rows {
            head.push(row);
        }
        total_rows += 1;
    }

    let rows = head
        .iter()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value = row
                        .get(i)
                        .map(|cell| cell_value(cell, kinds[i]))
                        .unwrap_or(Value::Null);
                    (column.clone(), value)
                })
                .collect::<Row>()
        })
        .collect();

    Ok(TablePreview {
        columns,
        rows,
        total_rows,
    })
}

/// Name header cells, filling blanks and suffixing duplicates (`a`, `a.1`, `a.2`)
fn column_names<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut names = Vec::new();
    let mut taken = HashSet::new();

    for (index, name) in raw.into_iter().enumerate() {
        let base = match name {
            Some(n) if !n.is_empty() => n,
            _ => format!("Unnamed: {}", index),
        };

        let mut candidate = base.clone();
        let mut suffix = 0;
        while taken.contains(&candidate) {
            suffix += 1;
            candidate = format!("{}.{}", base, suffix);
        }

        taken.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

fn text_kind(cell: &str) -> ColumnKind {
    let trimmed = cell.trim();
    if trimmed.parse::<i64>().is_ok() {
        ColumnKind::Int
    } else if parse_bool(trimmed).is_some() {
        ColumnKind::Bool
    } else if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
        ColumnKind::Float
    } else {
        ColumnKind::Text
    }
}

fn text_value(cell: &str, kind: ColumnKind) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }

    let trimmed = cell.trim();
    let parsed = match kind {
        ColumnKind::Int => trimmed.parse::<i64>().ok().map(Value::from),
        ColumnKind::Float => trimmed.parse::<f64>().ok().map(float_value),
        ColumnKind::Bool => parse_bool(trimmed).map(Value::Bool),
        ColumnKind::Unknown | ColumnKind::Text => None,
    };

    parsed.unwrap_or_else(|| Value::String(cell.to_string()))
}

/// Non-finite floats have no JSON representation and become null
fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15
}

/// ISO-8601 text of a date, time or duration cell
fn datetime_text(cell: &ExcelDateTime) -> Option<String> {
    if cell.is_duration() {
        cell.as_duration().map(|d| d.to_string())
    } else {
        cell.as_datetime()
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }
}

fn header_name(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::DateTime(dt) => Some(datetime_text(dt).unwrap_or_else(|| dt.to_string())),
        Data::Float(f) if is_integral(*f) => Some((*f as i64).to_string()),
        other => Some(other.to_string()),
    }
}

fn cell_kind(cell: &Data) -> Option<ColumnKind> {
    match cell {
        Data::Empty => None,
        Data::Int(_) => Some(ColumnKind::Int),
        Data::Float(f) if is_integral(*f) => Some(ColumnKind::Int),
        Data::Float(_) => Some(ColumnKind::Float),
        Data::Bool(_) => Some(ColumnKind::Bool),
        _ => Some(ColumnKind::Text),
    }
}

fn cell_value(cell: &Data, kind: ColumnKind) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Int(i) if kind == ColumnKind::Float => float_value(*i as f64),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) if kind != ColumnKind::Float && is_integral(*f) => Value::from(*f as i64),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::DateTime(dt) => datetime_text(dt).map(Value::String).unwrap_or(Value::Null),
        other => Value::String(other.to_string()),
    }
}
