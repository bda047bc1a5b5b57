use std::io::Read;

use crate::embedding::types::Embedding;
use crate::errors::{EmbedError, EmbedResult};

/// One data record. Cell values are stored in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    values: Vec<String>,
    embedding: Option<Embedding>,
}

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Self {
            values,
            embedding: None,
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    pub fn embedding(&self) -> Option<&[f64]> {
        self.embedding.as_deref()
    }

    pub fn attach_embedding(&mut self, embedding: Embedding) {
        debug_assert!(self.embedding.is_none(), "row embedded twice");
        self.embedding = Some(embedding);
    }
}

/// Header plus every row of one CSV file, fully materialised.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Parses delimited text whose first record is the header.
    /// Ragged rows, bad quoting and invalid UTF-8 are `Read` errors.
    pub fn from_csv_reader<R: Read>(reader: R, delimiter: u8) -> EmbedResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(|e| EmbedError::Read(format!("invalid header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();
        if headers.is_empty() {
            return Err(EmbedError::Read("input has no header row".to_string()));
        }

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| EmbedError::Read(e.to_string()))?;
            rows.push(Row::new(record.iter().map(str::to_string).collect()));
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell lookup by row position and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.value(index)
    }

    /// Serializes the enriched dataset: original columns then `embedding_column`.
    /// Every row must already carry an embedding.
    pub fn to_csv_bytes(&self, embedding_column: &str, delimiter: u8) -> EmbedResult<Vec<u8>> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        let header = self
            .headers
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(embedding_column));
        wtr.write_record(header)
            .map_err(|e| EmbedError::Write(e.to_string()))?;

        for (i, row) in self.rows.iter().enumerate() {
            let embedding = row.embedding().ok_or_else(|| {
                EmbedError::Write(format!("row {} has no embedding", i + 1))
            })?;
            let vector = format_embedding(embedding)?;
            let record = row
                .values
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(vector.as_str()));
            wtr.write_record(record)
                .map_err(|e| EmbedError::Write(e.to_string()))?;
        }

        wtr.into_inner()
            .map_err(|e| EmbedError::Write(e.to_string()))
    }
}

/// Textual form of a vector inside one CSV cell, e.g. `[0.1,-0.2]`.
pub fn format_embedding(embedding: &[f64]) -> EmbedResult<String> {
    serde_json::to_string(embedding).map_err(|e| EmbedError::Write(e.to_string()))
}
