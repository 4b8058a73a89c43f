use std::{collections::BTreeMap, fmt};

use bytecraft::Value;
use serde::Serialize;
use wasm_bindgen::JsValue;

/// Shape of an unpacked value as handed back to JavaScript.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum JsValueOut {
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<JsValueOut>),
}

#[derive(Serialize)]
pub struct Unpacked<T> {
    pub values: T,
    pub consumed: usize,
}

pub fn error_to_js(e: impl fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Maps a JSON value coming from JS onto a [Value].
///
/// Integral numbers become `Int`, other numbers `Float`. Integers above
/// `i64::MAX` are rejected. A one-character string whose code point fits a
/// byte becomes `Char`.
pub fn convert_json_value(v: serde_json::Value) -> Result<Value, String> {
    match v {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if n.is_u64() {
                Err(format!("unsupported number: {n}"))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(format!("unsupported number: {n}"))
            }
        }
        serde_json::Value::Bool(b) => Ok(Value::Int(b as i64)),
        serde_json::Value::String(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if (c as u32) < 256 => Ok(Value::Char(c as u8)),
                _ => Ok(Value::Str(s)),
            }
        }
        serde_json::Value::Array(items) => Ok(Value::List(
            items
                .into_iter()
                .map(convert_json_value)
                .collect::<Result<_, _>>()?,
        )),
        other => Err(format!("unsupported value: {other}")),
    }
}

pub fn value_to_js(v: Value) -> JsValueOut {
    match v {
        Value::Int(x) => JsValueOut::Int(x),
        Value::Float(x) => JsValueOut::Float(x),
        Value::Char(c) => JsValueOut::Str((c as char).to_string()),
        Value::Bytes(b) => JsValueOut::Bytes(b),
        Value::Str(s) => JsValueOut::Str(s),
        Value::List(xs) => JsValueOut::List(xs.into_iter().map(value_to_js).collect()),
    }
}

pub fn unpacked_to_js(values: Vec<Value>, consumed: usize) -> Result<JsValue, JsValue> {
    let out = Unpacked {
        values: values.into_iter().map(value_to_js).collect::<Vec<_>>(),
        consumed,
    };

    serde_wasm_bindgen::to_value(&out).map_err(error_to_js)
}

pub fn map_to_js(map: BTreeMap<String, Value>, consumed: usize) -> Result<JsValue, JsValue> {
    let out = Unpacked {
        values: map
            .into_iter()
            .map(|(k, v)| (k, value_to_js(v)))
            .collect::<BTreeMap<_, _>>(),
        consumed,
    };

    serde_wasm_bindgen::to_value(&out).map_err(error_to_js)
}
