// Tue Jan 20 2026 - Alex

//! Script-side proxy generation.
//!
//! Every bound object becomes a global JavaScript object whose methods forward
//! `(object name, method name, arguments)` to `__bridgeInvoke`, which hands the
//! call to the host through the runtime's `__bridge_call` hook.

use crate::bridge::api::{is_base_capability, HostObject};
use crate::bridge::registry::ObjectRegistry;
use itertools::Itertools;
use serde_json::Value;

/// Script-side dispatch entry point used by every proxy method
pub const INVOKE_FN: &str = "__bridgeInvoke";
/// Native hook installed by the runtime: `(object, method, argsJson) -> replyJson`
pub const HOST_CALL_FN: &str = "__bridge_call";
/// Native hook installed by the runtime: appends one line to captured stdout
pub const HOST_PRINT_FN: &str = "__bridge_print";
/// Locked global that writes the result line; scripts cannot replace it
pub const EMIT_FN: &str = "__bridgeEmit";

/// Installed once per runtime, before any proxy is defined.
pub const DISPATCH_PRELUDE: &str = r#"
(function (global) {
  var hostPrint = __bridge_print;
  var hostCall = __bridge_call;
  var print = function () {
    hostPrint(Array.prototype.map.call(arguments, function (a) { return String(a); }).join(" "));
  };
  var locked = function (name, value) {
    Object.defineProperty(global, name, { value: value, writable: false, configurable: false, enumerable: false });
  };
  global.console = { log: print, info: print, warn: print, error: print, debug: print };
  global.print = print;
  locked("__bridgeEmit", function (line) { hostPrint(line); });
  locked("__bridgeInvoke", function (objectName, methodName, args) {
    var reply = JSON.parse(hostCall(objectName, methodName, JSON.stringify(args)));
    if (reply.error !== undefined) {
      throw new Error(reply.error);
    }
    return reply.value;
  });
})(globalThis);
"#;

/// Emit proxy definitions for every bound object, in registry order.
pub fn synthesize(registry: &ObjectRegistry) -> String {
    let mut out = String::new();
    for (name, object) in registry.iter() {
        out.push_str(&synthesize_object(name, object));
    }
    out
}

/// Emit the proxy definition for one bound object.
pub fn synthesize_object(name: &str, object: &HostObject) -> String {
    let quoted_name = quote(name);
    let mut out = format!("globalThis[{}] = {{\n", quoted_name);

    for (method, arities) in object.method_arities() {
        if is_base_capability(method) {
            log::debug!("Skipping base capability {}.{}", name, method);
            continue;
        }

        let quoted_method = quote(method);
        let line = match arities.as_slice() {
            [arity] => {
                let params = (0..*arity).map(|i| format!("arg{}", i)).join(", ");
                format!(
                    "  {m}: function({p}) {{ return {f}({o}, {m}, [{p}]); }},\n",
                    m = quoted_method,
                    p = params,
                    f = INVOKE_FN,
                    o = quoted_name,
                )
            }
            // overloaded: forward everything, the dispatcher picks by arity
            _ => format!(
                "  {m}: function() {{ return {f}({o}, {m}, Array.prototype.slice.call(arguments)); }},\n",
                m = quoted_method,
                f = INVOKE_FN,
                o = quoted_name,
            ),
        };
        out.push_str(&line);
    }

    out.push_str("};\n");
    out
}

/// Remove the proxies of objects that are no longer bound.
pub fn retire(names: &[String]) -> String {
    names
        .iter()
        .map(|name| format!("delete globalThis[{}];\n", quote(name)))
        .collect()
}

/// JavaScript string literal for `s`.
pub fn quote(s: &str) -> String {
    Value::from(s).to_string()
}
