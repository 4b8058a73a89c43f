//! Record: a [Format] whose values are bound to field names.
//!
//! Use [Record::compile] to bind a format string to names, then
//! [Record::unpack] to decode bytes into a name to [Value] map and
//! [Record::pack] to encode such a map.

use std::{
    collections::{BTreeMap, HashSet},
    fmt::Write,
};

use crate::{errors::RecordError, format::Format, hooks::Hooks, value::Value};

/// A named, reusable record layout.
#[derive(Debug, Clone)]
pub struct Record {
    name: String,
    format: Format,
    fields: Vec<String>,
    hooks: Hooks,
}

impl Record {
    /// Parses `format` and binds its values, in order, to `fields`.
    ///
    /// Fails if a field name is empty or repeated, or if the format has no
    /// hooks and carries a different number of values than there are names.
    pub fn compile<I, S>(
        name: impl Into<String>,
        format: &str,
        fields: I,
    ) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_format(name, Format::parse(format)?, fields)
    }

    pub fn from_format<I, S>(
        name: impl Into<String>,
        format: Format,
        fields: I,
    ) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if field.trim().is_empty() || !seen.insert(field.as_str()) {
                return Err(RecordError::InvalidFieldName(field.clone()));
            }
        }

        if let Some(values) = format.value_count() {
            if values != fields.len() {
                return Err(RecordError::FieldCountMismatch {
                    names: fields.len(),
                    values,
                });
            }
        }

        Ok(Self {
            name: name.into(),
            format,
            fields,
            hooks: Hooks::default(),
        })
    }

    /// Attaches the hooks used for `[name]` tokens in both directions.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Size of the fixed-width part of the record.
    pub fn size(&self) -> usize {
        self.format.fixed_size()
    }

    /// Decodes `data` from `offset`. Returns the field map and the number of
    /// bytes consumed.
    pub fn unpack(
        &self,
        data: &[u8],
        offset: usize,
    ) -> Result<(BTreeMap<String, Value>, usize), RecordError> {
        let (values, consumed) = self.format.unpack(data, offset, Some(&self.hooks))?;

        if values.len() != self.fields.len() {
            return Err(RecordError::FieldCountMismatch {
                names: self.fields.len(),
                values: values.len(),
            });
        }

        let map = self.fields.iter().cloned().zip(values).collect();

        Ok((map, consumed))
    }

    /// Encodes `values`, taking one entry per field name in order. Entries
    /// not named by the record are ignored.
    pub fn pack(&self, values: &BTreeMap<String, Value>) -> Result<Vec<u8>, RecordError> {
        let mut members = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = values
                .get(field)
                .ok_or_else(|| RecordError::MissingField(field.clone()))?;
            members.push(value.clone());
        }

        Ok(self.format.pack(&members, Some(&self.hooks))?)
    }

    /// A zero-filled buffer of [Record::size] bytes.
    pub fn new_raw(&self) -> Result<Vec<u8>, RecordError> {
        let size = self.size();
        let mut raw = Vec::new();
        raw.try_reserve_exact(size)
            .map_err(|_| RecordError::TooLarge(size))?;
        raw.resize(size, 0);

        Ok(raw)
    }

    /// The field map decoded from [Record::new_raw].
    pub fn zeroed(&self) -> Result<BTreeMap<String, Value>, RecordError> {
        Ok(self.unpack(&self.new_raw()?, 0)?.0)
    }

    /// Human-readable dump of `values`, one `name: value` line per field.
    pub fn describe(&self, values: &BTreeMap<String, Value>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}:", self.name);
        let _ = writeln!(out, "--------------------");

        for field in &self.fields {
            match values.get(field) {
                Some(value) => {
                    let _ = writeln!(out, "{field}: {value}");
                }
                None => {
                    let _ = writeln!(out, "{field}: <missing>");
                }
            }
        }

        out
    }
}
