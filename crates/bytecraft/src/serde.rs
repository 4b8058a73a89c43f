//! JSON‑deserializable record description.
//!
//! These types describe a [crate::record::Record] as data, for example a
//! layout file shipped with your application, and are compiled into core
//! `bytecraft` types with `TryFrom`.
//!
//! ```
//! use bytecraft::{record::Record, serde::RecordDef};
//!
//! let def: RecordDef = serde_json::from_str(
//!     r#"{ "name": "header", "format": "Bhb", "fields": ["length", "kind"] }"#,
//! ).unwrap();
//! let record = Record::try_from(def).unwrap();
//! assert_eq!(record.size(), 3);
//! ```

use serde::{Deserialize, Serialize};

use crate::{errors::RecordError, record::Record};

/// Top‑level record definition.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RecordDef {
    /// Human‑readable record name, used by `describe`.
    pub name: String,
    /// Format string, including the optional byte‑order prefix.
    pub format: String,
    /// One name per value the format carries, in order.
    pub fields: Vec<String>,
}

impl TryFrom<RecordDef> for Record {
    type Error = RecordError;

    fn try_from(value: RecordDef) -> Result<Self, Self::Error> {
        Record::compile(value.name, &value.format, value.fields)
    }
}

impl From<&Record> for RecordDef {
    fn from(record: &Record) -> Self {
        RecordDef {
            name: record.name().to_string(),
            format: record.format().to_string(),
            fields: record.fields().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_record_def_from_json() {
        let def: RecordDef = serde_json::from_str(
            r#"{
                "name": "Image Descriptor",
                "format": "Lbhhhh(1 1 1 2 3)",
                "fields": ["separator", "left", "top", "width", "height",
                           "local color table flag", "interlace flag", "sort flag",
                           "reserved", "local color table size"]
            }"#,
        )
        .unwrap();

        let record = Record::try_from(def.clone()).unwrap();
        assert_eq!(record.size(), 10);
        assert_eq!(RecordDef::from(&record), def);
    }

    #[test]
    fn test_record_def_mismatch() {
        let def = RecordDef {
            name: "bad".into(),
            format: "Lbb".into(),
            fields: vec!["only".into()],
        };
        assert_eq!(
            Record::try_from(def).unwrap_err(),
            RecordError::FieldCountMismatch { names: 1, values: 2 }
        );
    }

    #[test]
    fn test_value_json() {
        let values = vec![Value::Int(3), Value::Char(b'a'), Value::Str("hi".into())];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[{"Int":3},{"Char":97},{"Str":"hi"}]"#);
        assert_eq!(serde_json::from_str::<Vec<Value>>(&json).unwrap(), values);
    }
}
