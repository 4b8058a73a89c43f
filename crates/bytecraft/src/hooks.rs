//! User hooks: named codecs invoked for `[name]` tokens.
//!
//! A [Hook] carries up to two halves. The pack half receives the value the
//! token consumes and returns the bytes to append. The unpack half receives
//! the values decoded so far, the full source buffer and the current offset,
//! and returns the values it produced plus the number of bytes it consumed.
//! Either half may call back into [crate::pack] or [crate::unpack].

use std::{collections::HashMap, fmt, sync::Arc};

use log::debug;

use crate::{
    errors::{HookError, PackError, UnpackError},
    value::Value,
};

pub type PackFn = dyn Fn(&Value) -> Result<Vec<u8>, HookError> + Send + Sync;
pub type UnpackFn =
    dyn Fn(&[Value], &[u8], usize) -> Result<(Vec<Value>, usize), HookError> + Send + Sync;

/// A user-defined field codec.
#[derive(Clone, Default)]
pub struct Hook {
    pack: Option<Arc<PackFn>>,
    unpack: Option<Arc<UnpackFn>>,
}

impl Hook {
    /// A hook usable in both directions.
    pub fn new<P, U>(pack: P, unpack: U) -> Self
    where
        P: Fn(&Value) -> Result<Vec<u8>, HookError> + Send + Sync + 'static,
        U: Fn(&[Value], &[u8], usize) -> Result<(Vec<Value>, usize), HookError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            pack: Some(Arc::new(pack)),
            unpack: Some(Arc::new(unpack)),
        }
    }

    pub fn pack_only<P>(pack: P) -> Self
    where
        P: Fn(&Value) -> Result<Vec<u8>, HookError> + Send + Sync + 'static,
    {
        Self {
            pack: Some(Arc::new(pack)),
            unpack: None,
        }
    }

    pub fn unpack_only<U>(unpack: U) -> Self
    where
        U: Fn(&[Value], &[u8], usize) -> Result<(Vec<Value>, usize), HookError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            pack: None,
            unpack: Some(Arc::new(unpack)),
        }
    }

    pub fn can_pack(&self) -> bool {
        self.pack.is_some()
    }

    pub fn can_unpack(&self) -> bool {
        self.unpack.is_some()
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hook")
            .field("pack", &self.can_pack())
            .field("unpack", &self.can_unpack())
            .finish()
    }
}

/// Name to [Hook] mapping passed alongside a format.
#[derive(Debug, Clone, Default)]
pub struct Hooks {
    hooks: HashMap<String, Hook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `hook` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, hook: Hook) -> &mut Self {
        self.hooks.insert(name.into(), hook);
        self
    }

    /// Builder-style [Hooks::insert].
    pub fn with(mut self, name: impl Into<String>, hook: Hook) -> Self {
        self.insert(name, hook);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Hook> {
        self.hooks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.hooks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

/// Runs the pack half of hook `name` on `value`.
pub(crate) fn call_pack(
    hooks: Option<&Hooks>,
    name: &str,
    value: &Value,
) -> Result<Vec<u8>, PackError> {
    let hook = hooks
        .and_then(|h| h.get(name))
        .ok_or_else(|| PackError::UnknownUserFunction(name.to_string()))?;
    let pack = hook
        .pack
        .as_ref()
        .ok_or_else(|| PackError::NotCallable(name.to_string()))?;

    debug!("packing {} value with hook {name:?}", value.kind());

    pack(value).map_err(|source| PackError::BadUserFunctionResult {
        name: name.to_string(),
        source,
    })
}

/// Runs the unpack half of hook `name` at `offset`. Checks that the hook did
/// not claim more bytes than remain in `data`.
pub(crate) fn call_unpack(
    hooks: Option<&Hooks>,
    name: &str,
    decoded: &[Value],
    data: &[u8],
    offset: usize,
) -> Result<(Vec<Value>, usize), UnpackError> {
    let hook = hooks
        .and_then(|h| h.get(name))
        .ok_or_else(|| UnpackError::UnknownUserFunction(name.to_string()))?;
    let unpack = hook
        .unpack
        .as_ref()
        .ok_or_else(|| UnpackError::NotCallable(name.to_string()))?;

    debug!("unpacking with hook {name:?} at offset {offset}");

    let bad_result = |source: HookError| UnpackError::BadUserFunctionResult {
        name: name.to_string(),
        source,
    };

    let (values, consumed) = unpack(decoded, data, offset).map_err(bad_result)?;

    let remaining = data.len().saturating_sub(offset);
    if consumed > remaining {
        return Err(bad_result(HookError(format!(
            "consumed {consumed} bytes but only {remaining} remain"
        ))));
    }

    Ok((values, consumed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo_hooks() -> Hooks {
        Hooks::new()
            .with(
                "byte",
                Hook::new(
                    |v| {
                        v.as_int()
                            .map(|i| vec![i as u8])
                            .ok_or_else(|| HookError::new("expected int"))
                    },
                    |_, data, pos| Ok((vec![Value::Int(data[pos] as i64)], 1)),
                ),
            )
            .with("reader", Hook::unpack_only(|_, _, _| Ok((vec![], 0))))
            .with("greedy", Hook::unpack_only(|_, data, _| Ok((vec![], data.len() + 1))))
    }

    #[test]
    fn test_call_pack() {
        let hooks = echo_hooks();
        assert_eq!(call_pack(Some(&hooks), "byte", &Value::Int(7)).unwrap(), vec![7]);
    }

    #[test]
    fn test_call_pack_errors() {
        let hooks = echo_hooks();
        assert_eq!(
            call_pack(None, "byte", &Value::Int(7)).unwrap_err(),
            PackError::UnknownUserFunction("byte".into())
        );
        assert_eq!(
            call_pack(Some(&hooks), "missing", &Value::Int(7)).unwrap_err(),
            PackError::UnknownUserFunction("missing".into())
        );
        assert_eq!(
            call_pack(Some(&hooks), "reader", &Value::Int(7)).unwrap_err(),
            PackError::NotCallable("reader".into())
        );
        assert_eq!(
            call_pack(Some(&hooks), "byte", &Value::Float(1.0)).unwrap_err(),
            PackError::BadUserFunctionResult {
                name: "byte".into(),
                source: HookError::new("expected int"),
            }
        );
    }

    #[test]
    fn test_call_unpack() {
        let hooks = echo_hooks();
        let (values, consumed) = call_unpack(Some(&hooks), "byte", &[], &[1, 2, 3], 1).unwrap();
        assert_eq!(values, vec![Value::Int(2)]);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_call_unpack_overrun() {
        let hooks = echo_hooks();
        assert!(matches!(
            call_unpack(Some(&hooks), "greedy", &[], &[1, 2], 0),
            Err(UnpackError::BadUserFunctionResult { .. })
        ));
    }

    #[test]
    fn test_hook_debug() {
        let hook = Hook::pack_only(|_| Ok(vec![]));
        assert_eq!(format!("{hook:?}"), "Hook { pack: true, unpack: false }");
    }
}
