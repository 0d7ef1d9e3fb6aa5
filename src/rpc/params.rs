//! Binding loosely-typed JSON parameters to a method's declared parameters

use super::methods::{MethodSpec, ParamDefault};
use crate::errors::RpcError;
use serde_json::Value;

/// Parameters bound positionally to a method's declaration, defaults applied
#[derive(Debug)]
pub struct Args {
    method: &'static MethodSpec,
    values: Vec<Value>,
}

impl Args {
    /// Bind a JSON array (positional) or object (named, case-insensitive)
    ///
    /// Absent or null parameters take their default; optional ones bind to
    /// null; required ones fail.
    pub fn bind(method: &'static MethodSpec, params: Option<Value>) -> Result<Self, RpcError> {
        let declared = method.params;
        let mut supplied: Vec<Option<Value>> = vec![None; declared.len()];

        match params {
            None | Some(Value::Null) => {}
            Some(Value::Array(values)) => {
                if values.len() > declared.len() {
                    return Err(RpcError::TooManyParams {
                        method: method.name,
                        expected: declared.len(),
                        got: values.len(),
                    });
                }
                for (slot, value) in supplied.iter_mut().zip(values) {
                    *slot = Some(value);
                }
            }
            Some(Value::Object(map)) => {
                for (key, value) in map {
                    let index = declared
                        .iter()
                        .position(|p| p.name.eq_ignore_ascii_case(&key))
                        .ok_or_else(|| RpcError::UnknownParam {
                            method: method.name,
                            param: key.clone(),
                        })?;
                    supplied[index] = Some(value);
                }
            }
            Some(_) => {
                return Err(RpcError::InvalidParam {
                    method: method.name,
                    param: "params",
                    reason: "expected an array or an object".to_string(),
                })
            }
        }

        let values = declared
            .iter()
            .zip(supplied)
            .map(|(param, value)| match (value, param.default) {
                (Some(v), _) if !v.is_null() => Ok(v),
                (_, ParamDefault::Required) => Err(RpcError::MissingParam {
                    method: method.name,
                    param: param.name,
                }),
                (_, ParamDefault::Optional) => Ok(Value::Null),
                (_, ParamDefault::Int(n)) => Ok(Value::from(n)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { method, values })
    }

    fn invalid(&self, index: usize, reason: impl Into<String>) -> RpcError {
        RpcError::InvalidParam {
            method: self.method.name,
            param: self.method.params[index].name,
            reason: reason.into(),
        }
    }

    fn value(&self, index: usize) -> &Value {
        self.values.get(index).unwrap_or(&Value::Null)
    }

    pub fn opt_string(&self, index: usize) -> Result<Option<String>, RpcError> {
        match self.value(index) {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => Err(self.invalid(index, "expected a string")),
        }
    }

    pub fn string(&self, index: usize) -> Result<String, RpcError> {
        self.opt_string(index)?.ok_or(RpcError::MissingParam {
            method: self.method.name,
            param: self.method.params[index].name,
        })
    }

    pub fn int(&self, index: usize) -> Result<i32, RpcError> {
        let value = self.value(index);
        value
            .as_i64()
            .ok_or_else(|| self.invalid(index, "expected an integer"))
            .and_then(|n| {
                i32::try_from(n).map_err(|_| self.invalid(index, format!("{n} is out of range")))
            })
    }

    /// List items: strings verbatim, anything else as its JSON text
    pub fn items(&self, index: usize) -> Result<Vec<String>, RpcError> {
        match self.value(index) {
            Value::Array(values) => Ok(values
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()),
            _ => Err(self.invalid(index, "expected a JSON array")),
        }
    }

    /// Selected indices; null binds to an empty selection
    pub fn indices(&self, index: usize) -> Result<Vec<usize>, RpcError> {
        match self.value(index) {
            Value::Null => Ok(Vec::new()),
            Value::Array(values) => values
                .iter()
                .map(|v| {
                    v.as_u64()
                        .and_then(|n| usize::try_from(n).ok())
                        .ok_or_else(|| self.invalid(index, format!("{v} is not an item index")))
                })
                .collect(),
            _ => Err(self.invalid(index, "expected a JSON array")),
        }
    }
}
