use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use super::{AttributeValue, FeatureFilter, FeatureId, FeatureLayer, LayerError};

/// In-memory feature layer loaded from a headered CSV export.
///
/// Edits are only accepted inside an edit session and stay in memory until
/// one of the `commit_*` methods writes the table out.
#[derive(Debug, Clone)]
pub struct CsvLayer {
    fields: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<AttributeValue>>,
    read_only: bool,
    editing: bool,
}

impl CsvLayer {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LayerError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LayerError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let fields: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').to_string())
            .collect();

        let mut index = HashMap::with_capacity(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if index.insert(field.clone(), position).is_some() {
                return Err(LayerError::DuplicateField(field.clone()));
            }
        }

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(AttributeValue::parse).collect());
        }

        Ok(Self {
            fields,
            index,
            rows,
            read_only: false,
            editing: false,
        })
    }

    /// Marks the layer as read-only; edit sessions will be refused.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self.editing = false;
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the edited table and closes the edit session.
    pub fn commit_to_writer<W: Write>(&mut self, writer: W) -> Result<(), LayerError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(&self.fields)?;
        for row in &self.rows {
            csv_writer.write_record(row.iter().map(ToString::to_string))?;
        }
        csv_writer.flush()?;
        self.editing = false;
        Ok(())
    }

    pub fn commit_to_path<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LayerError> {
        let file = std::fs::File::create(path)?;
        self.commit_to_writer(file)
    }

    pub fn commit_to_string(&mut self) -> Result<String, LayerError> {
        let mut buffer = Vec::new();
        self.commit_to_writer(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    fn field_position(&mut self, field: &str) -> usize {
        if let Some(position) = self.index.get(field) {
            return *position;
        }

        let position = self.fields.len();
        self.fields.push(field.to_string());
        self.index.insert(field.to_string(), position);
        for row in &mut self.rows {
            row.push(AttributeValue::Null);
        }
        position
    }
}

impl FeatureLayer for CsvLayer {
    fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(String::as_str).collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    fn start_editing(&mut self) -> bool {
        if !self.read_only {
            self.editing = true;
        }
        self.editing
    }

    fn is_editable(&self) -> bool {
        self.editing
    }

    fn feature_ids(&self, filter: &FeatureFilter) -> Result<Vec<FeatureId>, LayerError> {
        match filter {
            FeatureFilter::All => Ok((0..self.rows.len()).map(FeatureId).collect()),
            FeatureFilter::FieldIsTrue(field) => {
                let position = *self
                    .index
                    .get(field)
                    .ok_or_else(|| LayerError::MissingField(field.clone()))?;
                Ok(self
                    .rows
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| row[position].is_truthy())
                    .map(|(id, _)| FeatureId(id))
                    .collect())
            }
        }
    }

    fn attribute(&self, id: FeatureId, field: &str) -> Option<&AttributeValue> {
        let position = self.index.get(field)?;
        self.rows.get(id.0).and_then(|row| row.get(*position))
    }

    fn set_attribute(
        &mut self,
        id: FeatureId,
        field: &str,
        value: AttributeValue,
    ) -> Result<(), LayerError> {
        if !self.editing {
            return Err(LayerError::NotEditable);
        }
        if id.0 >= self.rows.len() {
            return Err(LayerError::UnknownFeature(id));
        }

        let position = self.field_position(field);
        self.rows[id.0][position] = value;
        Ok(())
    }
}
