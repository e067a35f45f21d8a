//! Reading strip and tree tables from delimited text.
//!
//! Field exports from spreadsheet software in Portuguese-speaking locales are the
//! common case: `;` separated, `,` as the decimal mark, Latin-1 encoded. All three
//! are handled here, so the mapper only ever sees finite `f64` values.

use crate::index::StripIndex;
use crate::transect::Strip;
use csv::StringRecord;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: column {column:?} holds {value:?}, which is not a finite number")]
pub struct ParseError {
    pub line: u64,
    pub column: String,
    pub value: String,
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing column {column:?}; the header has: {found}")]
    MissingColumn { column: String, found: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Header names of the tree table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TreeColumns {
    pub id: String,
    pub x: String,
    pub y: String,
    pub strip: String,
}

impl Default for TreeColumns {
    fn default() -> Self {
        TreeColumns {
            id: "ID".to_string(),
            x: "X".to_string(),
            y: "Y".to_string(),
            strip: "ID_faixa".to_string(),
        }
    }
}

/// Header names of the strip table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StripColumns {
    pub id: String,
    pub x0: String,
    pub y0: String,
    pub x1: String,
    pub y1: String,
}

impl Default for StripColumns {
    fn default() -> Self {
        StripColumns {
            id: "ID_faixa".to_string(),
            x0: "X0".to_string(),
            y0: "Y0".to_string(),
            x1: "X1".to_string(),
            y1: "Y1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    pub delimiter: u8,
    pub decimal_separator: char,
    pub trees: TreeColumns,
    pub strips: StripColumns,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            delimiter: b';',
            decimal_separator: ',',
            trees: TreeColumns::default(),
            strips: StripColumns::default(),
        }
    }
}

/// One row of the tree table.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    pub id: String,
    /// Lateral offset.
    pub x: f64,
    /// Offset along the strip.
    pub y: f64,
    pub strip_id: String,
    /// Every field of the input row, in header order.
    pub fields: StringRecord,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreeTable {
    pub headers: StringRecord,
    pub trees: Vec<Tree>,
}

/// Parse a number written with `decimal_separator` as its decimal mark.
///
/// Returns `None` for anything that is not a finite number.
pub fn parse_decimal(raw: &str, decimal_separator: char) -> Option<f64> {
    let raw = raw.trim();
    let value = if decimal_separator == '.' {
        raw.parse::<f64>().ok()?
    } else {
        raw.replace(decimal_separator, ".").parse::<f64>().ok()?
    };
    value.is_finite().then_some(value)
}

/// Decode text as UTF-8, falling back to Latin-1.
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        // Latin-1 code points map one to one onto the first 256 chars.
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

struct Columns<'a> {
    headers: &'a StringRecord,
}

impl Columns<'_> {
    fn position(&self, name: &str) -> Result<usize, TableError> {
        self.headers
            .iter()
            .position(|header| header.trim().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| TableError::MissingColumn {
                column: name.to_string(),
                found: self.headers.iter().collect::<Vec<_>>().join(", "),
            })
    }
}

fn reader<'a>(text: &'a str, options: &TableOptions) -> csv::Reader<&'a [u8]> {
    csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes())
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn number(
    record: &StringRecord,
    index: usize,
    column: &str,
    options: &TableOptions,
) -> Result<f64, ParseError> {
    let raw = record.get(index).unwrap_or("");
    parse_decimal(raw, options.decimal_separator).ok_or_else(|| ParseError {
        line: record.position().map_or(0, |p| p.line()),
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// Parse the strip table into an index.
pub fn parse_strips(text: &str, options: &TableOptions) -> Result<StripIndex, TableError> {
    let mut reader = reader(text, options);
    let headers = reader.headers()?.clone();
    let columns = Columns { headers: &headers };
    let names = &options.strips;
    let id = columns.position(&names.id)?;
    let x0 = columns.position(&names.x0)?;
    let y0 = columns.position(&names.y0)?;
    let x1 = columns.position(&names.x1)?;
    let y1 = columns.position(&names.y1)?;

    let mut index = StripIndex::new();
    for record in reader.records() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        index.insert(Strip {
            id: record.get(id).unwrap_or("").to_string(),
            x0: number(&record, x0, &names.x0, options)?,
            y0: number(&record, y0, &names.y0, options)?,
            x1: number(&record, x1, &names.x1, options)?,
            y1: number(&record, y1, &names.y1, options)?,
        });
    }
    Ok(index)
}

/// Parse the tree table, keeping every input column.
pub fn parse_trees(text: &str, options: &TableOptions) -> Result<TreeTable, TableError> {
    let mut reader = reader(text, options);
    let headers = reader.headers()?.clone();
    let columns = Columns { headers: &headers };
    let names = &options.trees;
    let id = columns.position(&names.id)?;
    let x = columns.position(&names.x)?;
    let y = columns.position(&names.y)?;
    let strip = columns.position(&names.strip)?;

    let mut trees = Vec::new();
    for record in reader.records() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        trees.push(Tree {
            id: record.get(id).unwrap_or("").to_string(),
            x: number(&record, x, &names.x, options)?,
            y: number(&record, y, &names.y, options)?,
            strip_id: record.get(strip).unwrap_or("").to_string(),
            fields: record,
        });
    }
    Ok(TreeTable { headers, trees })
}

fn read_text(path: &Path) -> Result<String, TableError> {
    let bytes = fs::read(path).map_err(|source| TableError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(decode_text(bytes))
}

pub fn read_strips<P: AsRef<Path>>(
    path: P,
    options: &TableOptions,
) -> Result<StripIndex, TableError> {
    parse_strips(&read_text(path.as_ref())?, options)
}

pub fn read_trees<P: AsRef<Path>>(
    path: P,
    options: &TableOptions,
) -> Result<TreeTable, TableError> {
    parse_trees(&read_text(path.as_ref())?, options)
}
