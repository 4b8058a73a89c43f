//! WASM bindings for the `bytecraft` pack/unpack engine.
//!
//! This crate exposes a compact API to JavaScript for packing values into
//! binary payloads and unpacking them again, driven by `bytecraft` format
//! strings such as `"Bh(3 5)xc"`.
//!
//! Two entry points are provided:
//! - [`WasmFormat`] wraps a single parsed format string and works on plain
//!   arrays of values.
//! - [`WasmRecord`] is built from a JSON record definition (see
//!   `bytecraft::serde::RecordDef`) and works on objects keyed by field name.
//!
//! ```text
//! // Pseudo TypeScript example
//! //
//! // const fmt = new WasmFormat("Bh(3 5)xc");
//! // const bytes = fmt.pack([258, 5, 20, "!"]);   // Uint8Array [1, 2, 180, 0, 33]
//! // const { values, consumed } = fmt.unpack(bytes, 0);
//! //
//! // const rec = new WasmRecord(JSON.stringify({
//! //   name: "header", format: "Bhb", fields: ["length", "kind"],
//! // }));
//! // rec.unpack(new Uint8Array([0, 3, 1]), 0).values;  // { kind: 1, length: 3 }
//! ```
//!
//! User hooks are not exposed; formats containing `[name]` tokens fail with
//! an unknown-user-function error. Errors are returned as strings.

mod convert;

use std::collections::BTreeMap;

use bytecraft::{Format, record::Record, serde::RecordDef};
use wasm_bindgen::prelude::*;

/// A parsed format string usable from JavaScript.
#[wasm_bindgen]
pub struct WasmFormat {
    format: Format,
}

#[wasm_bindgen]
impl WasmFormat {
    #[wasm_bindgen(constructor)]
    pub fn new(format: &str) -> Result<WasmFormat, JsValue> {
        let format = Format::parse(format).map_err(convert::error_to_js)?;
        Ok(WasmFormat { format })
    }

    /// Packs a JS array of values.
    ///
    /// Numbers map to integers when integral and to floats otherwise;
    /// one-character strings map to `c` characters.
    pub fn pack(&self, values: JsValue) -> Result<Vec<u8>, JsValue> {
        let raw: Vec<serde_json::Value> =
            serde_wasm_bindgen::from_value(values).map_err(convert::error_to_js)?;

        let values = raw
            .into_iter()
            .map(convert::convert_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| JsValue::from_str(&e))?;

        self.format.pack(&values, None).map_err(convert::error_to_js)
    }

    /// Unpacks `data` from `offset`, returning `{ values, consumed }`.
    pub fn unpack(&self, data: &[u8], offset: usize) -> Result<JsValue, JsValue> {
        let (values, consumed) = self
            .format
            .unpack(data, offset, None)
            .map_err(convert::error_to_js)?;
        convert::unpacked_to_js(values, consumed)
    }

    #[wasm_bindgen(js_name = fixedSize)]
    pub fn fixed_size(&self) -> usize {
        self.format.fixed_size()
    }

    #[wasm_bindgen(js_name = toString)]
    pub fn to_js_string(&self) -> String {
        self.format.to_string()
    }
}

/// A record compiled from a JSON definition.
#[wasm_bindgen]
pub struct WasmRecord {
    record: Record,
}

#[wasm_bindgen]
impl WasmRecord {
    /// Creates a record from JSON shaped like `RecordDef`:
    /// `{ "name": ..., "format": ..., "fields": [...] }`.
    #[wasm_bindgen(constructor)]
    pub fn new(record_json: &str) -> Result<WasmRecord, JsValue> {
        let def: RecordDef = serde_json::from_str(record_json).map_err(convert::error_to_js)?;
        let record = Record::try_from(def).map_err(convert::error_to_js)?;
        Ok(WasmRecord { record })
    }

    /// Packs a JS object keyed by field name.
    pub fn pack(&self, obj: JsValue) -> Result<Vec<u8>, JsValue> {
        let raw: BTreeMap<String, serde_json::Value> =
            serde_wasm_bindgen::from_value(obj).map_err(convert::error_to_js)?;

        let mut map = BTreeMap::new();
        for (k, v) in raw {
            map.insert(k, convert::convert_json_value(v).map_err(|e| JsValue::from_str(&e))?);
        }

        self.record.pack(&map).map_err(convert::error_to_js)
    }

    /// Unpacks `data` from `offset`, returning `{ values, consumed }` where
    /// `values` is keyed by field name.
    pub fn unpack(&self, data: &[u8], offset: usize) -> Result<JsValue, JsValue> {
        let (map, consumed) = self
            .record
            .unpack(data, offset)
            .map_err(convert::error_to_js)?;
        convert::map_to_js(map, consumed)
    }

    /// `name:` header followed by one `field: value` line per field.
    pub fn describe(&self, data: &[u8], offset: usize) -> Result<String, JsValue> {
        let (map, _) = self
            .record
            .unpack(data, offset)
            .map_err(convert::error_to_js)?;
        Ok(self.record.describe(&map))
    }

    pub fn size(&self) -> usize {
        self.record.size()
    }
}

/// `"little"` or `"big"`, the byte order `N` formats resolve to.
#[wasm_bindgen(js_name = nativeEndian)]
pub fn native_endian() -> String {
    bytecraft::native_endian().to_string()
}
