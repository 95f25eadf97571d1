use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid JSON records: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Shape(String),

    #[error("unsupported data file '{0}' (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::Text(_) => ColumnKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell values as JSON, missing cells as `null`.
    pub fn values(&self) -> Vec<Value> {
        match self {
            Self::Numeric(v) => v.iter().map(|c| c.map(Value::from).unwrap_or(Value::Null)).collect(),
            Self::Text(v) => v
                .iter()
                .map(|c| c.clone().map(Value::String).unwrap_or(Value::Null))
                .collect(),
        }
    }

    /// A column is numeric when every present cell parses as a number.
    fn infer(cells: Vec<Option<String>>) -> Self {
        let parsed: Option<Vec<Option<f64>>> = cells
            .iter()
            .map(|c| match c {
                None => Some(None),
                Some(s) => s.trim().parse::<f64>().ok().map(Some),
            })
            .collect();
        match parsed {
            Some(nums) if nums.iter().any(Option::is_some) => Self::Numeric(nums),
            _ => Self::Text(cells),
        }
    }
}

/// A small in-memory table: named columns of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    names: Vec<String>,
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self, DataError> {
        let rows = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        if let Some((name, col)) = columns.iter().find(|(_, c)| c.len() != rows) {
            return Err(DataError::Shape(format!(
                "column '{}' has {} rows, expected {}",
                name,
                col.len(),
                rows
            )));
        }
        let (names, columns) = columns.into_iter().unzip();
        Ok(Self {
            names,
            columns,
            rows,
        })
    }

    /// Load by extension: `.csv` or `.json`.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => Self::from_csv(path),
            Some("json") => Self::from_json_records(path),
            _ => Err(DataError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// CSV with a header row. Empty cells are missing values.
    pub fn from_csv(path: &Path) -> Result<Self, DataError> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

        for record in reader.records() {
            let record = record?;
            for (i, column) in cells.iter_mut().enumerate() {
                let cell = record.get(i).map(str::trim).filter(|s| !s.is_empty());
                column.push(cell.map(str::to_string));
            }
        }

        debug!("loaded {} columns from {}", headers.len(), path.display());
        Self::new(
            headers
                .into_iter()
                .zip(cells)
                .map(|(name, cells)| (name, Column::infer(cells)))
                .collect(),
        )
    }

    /// A JSON array of flat objects, e.g. `[{"date": "2024-01", "revenue": 10}]`.
    /// Columns appear in first-seen order; absent keys are missing values.
    pub fn from_json_records(path: &Path) -> Result<Self, DataError> {
        let data = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_json::from_str(&data)?;
        Self::from_records(&value)
    }

    pub fn from_records(value: &Value) -> Result<Self, DataError> {
        let records = value
            .as_array()
            .ok_or_else(|| DataError::Shape("expected a JSON array of records".to_string()))?;

        let mut names: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let obj = record
                .as_object()
                .ok_or_else(|| DataError::Shape(format!("record {} is not an object", i)))?;
            for key in obj.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let cells: Vec<&Value> = records
                    .iter()
                    .map(|r| r.get(&name).unwrap_or(&Value::Null))
                    .collect();
                let column = if cells.iter().all(|c| c.is_number() || c.is_null())
                    && cells.iter().any(|c| c.is_number())
                {
                    Column::Numeric(cells.iter().map(|c| c.as_f64()).collect())
                } else {
                    Column::Text(
                        cells
                            .iter()
                            .map(|c| match c {
                                Value::Null => None,
                                Value::String(s) => Some(s.clone()),
                                other => Some(other.to_string()),
                            })
                            .collect(),
                    )
                };
                (name, column)
            })
            .collect();
        Self::new(columns)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(String::as_str).zip(self.columns.iter())
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[Option<f64>])> {
        self.columns().filter_map(|(name, col)| match col {
            Column::Numeric(values) => Some((name, values.as_slice())),
            Column::Text(_) => None,
        })
    }
}
