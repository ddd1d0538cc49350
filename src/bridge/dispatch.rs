// Tue Jan 20 2026 - Alex

use crate::bridge::api::is_base_capability;
use crate::bridge::error::DispatchError;
use crate::bridge::registry::SharedRegistry;
use crate::bridge::types::{HostType, HostValue};
use itertools::Itertools;
use serde_json::{json, Value};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Routes proxy calls to the bound object's capability table
#[derive(Clone)]
pub struct Dispatcher {
    registry: SharedRegistry,
}

impl Dispatcher {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// Resolve `object`, pick `method` by arity and argument runtime types, and invoke it.
    pub fn dispatch(
        &self,
        object: &str,
        method: &str,
        args: &[HostValue],
    ) -> Result<HostValue, DispatchError> {
        // clone the handle so the lock is released before the host method runs
        let target = self.registry.read().resolve(object)?;

        let arg_types: Vec<HostType> = args.iter().map(HostValue::host_type).collect();
        let not_found = || DispatchError::MethodNotFound {
            object: object.to_string(),
            method: method.to_string(),
            signature: arg_types.iter().join(", "),
        };

        if is_base_capability(method) {
            return Err(not_found());
        }

        let resolved = target
            .method(method, args.len())
            .filter(|m| m.accepts(&arg_types))
            .ok_or_else(not_found)?;

        log::debug!("Dispatching {}.{}", object, resolved.signature());

        // a panicking handler must not unwind through the script engine
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| resolved.invoke(args)))
            .unwrap_or_else(|payload| Err(anyhow::anyhow!("host method panicked: {}", panic_message(&*payload))));

        outcome.map_err(|cause| DispatchError::DispatchFailure {
            object: object.to_string(),
            method: method.to_string(),
            cause,
        })
    }

    /// JSON form of `dispatch` used by the runtime hook.
    ///
    /// `args_json` must be a JSON array. The reply is `{"value": ...}` on
    /// success or `{"error": "...", "kind": "..."}` on failure.
    pub fn dispatch_json(&self, object: &str, method: &str, args_json: &str) -> String {
        let reply = match self.decode_args(args_json) {
            Ok(args) => match self.dispatch(object, method, &args) {
                Ok(value) => json!({ "value": value.to_json() }),
                Err(e) => error_reply(&e),
            },
            Err(e) => error_reply(&e),
        };
        reply.to_string()
    }

    fn decode_args(&self, args_json: &str) -> Result<Vec<HostValue>, DispatchError> {
        let value: Value = serde_json::from_str(args_json)
            .map_err(|e| DispatchError::BadArguments(e.to_string()))?;
        match value {
            Value::Array(items) => Ok(items.iter().map(HostValue::from_json).collect()),
            other => Err(DispatchError::BadArguments(format!(
                "expected an argument array, got {}",
                other
            ))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

fn error_reply(err: &DispatchError) -> Value {
    log::debug!("Dispatch failed: {}", err);
    json!({ "error": err.to_string(), "kind": err.kind() })
}
