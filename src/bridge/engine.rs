// Tue Jan 20 2026 - Alex

use crate::bridge::api::{HostBinding, HostObject};
use crate::bridge::dispatch::Dispatcher;
use crate::bridge::error::{EvaluationError, EvaluationResult};
use crate::bridge::proxy;
use crate::bridge::registry::{ObjectRegistry, SharedRegistry};
use crate::bridge::runtime::{QuickJsRuntime, ScriptRuntime};
use crate::bridge::translate::{translate, TranslatedValue};
use crate::config::{BridgeConfig, SentinelMode};
use ahash::RandomState;
use serde_json::{json, Value};
use std::hash::BuildHasher;
use std::sync::Arc;
use std::time::Instant;

/// Literal that starts every result line
pub const RESULT_MARKER: &str = "QUICJS_RESULT:";

/// Host objects in, typed results out
pub struct QuickJsBridge {
    config: BridgeConfig,
    registry: SharedRegistry,
    runtime: Option<Box<dyn ScriptRuntime>>,
    token_seed: RandomState,
    evaluations: u64,
    retired: Vec<String>,
}

impl QuickJsBridge {
    /// Start a QuickJS runtime with the default configuration.
    pub fn create() -> EvaluationResult<Self> {
        Self::with_config(BridgeConfig::default())
    }

    pub fn with_config(config: BridgeConfig) -> EvaluationResult<Self> {
        let runtime = QuickJsRuntime::new(&config)?;
        Self::with_runtime(config, Box::new(runtime))
    }

    /// Build a bridge over any runtime implementation.
    pub fn with_runtime(
        config: BridgeConfig,
        mut runtime: Box<dyn ScriptRuntime>,
    ) -> EvaluationResult<Self> {
        let registry = ObjectRegistry::shared();
        runtime.attach(Dispatcher::new(registry.clone()))?;
        log::info!("Bridge ready ({:?} sentinel)", config.sentinel);

        Ok(Self {
            config,
            registry,
            runtime: Some(runtime),
            token_seed: RandomState::new(),
            evaluations: 0,
            retired: Vec::new(),
        })
    }

    /// Register `object` under `name`, replacing any previous binding.
    pub fn bind(&mut self, name: &str, object: impl Into<Arc<HostObject>>) {
        self.registry.write().bind(name, object.into());
    }

    /// Same as `bind`.
    pub fn set(&mut self, name: &str, object: impl Into<Arc<HostObject>>) {
        self.bind(name, object);
    }

    /// Bind a value that describes its own capabilities. The caller keeps its `Arc`.
    pub fn bind_shared<T: HostBinding>(&mut self, name: &str, value: Arc<T>) {
        self.bind(name, value.capabilities());
    }

    /// Forget `name`. Its proxy is deleted from the script globals on the next evaluation.
    pub fn unbind(&mut self, name: &str) -> bool {
        let removed = self.registry.write().unbind(name).is_some();
        if removed && !self.retired.iter().any(|n| n == name) {
            self.retired.push(name.to_string());
        }
        removed
    }

    pub fn bound_names(&self) -> Vec<String> {
        self.registry.read().names()
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.runtime.is_none()
    }

    /// Run `script` with every bound object in scope and translate its value.
    pub fn evaluate(&mut self, script: &str) -> EvaluationResult<TranslatedValue> {
        if self.runtime.is_none() {
            return Err(EvaluationError::Closed);
        }

        let start = Instant::now();
        let sentinel = self.next_sentinel();
        let retired = std::mem::take(&mut self.retired);
        let wrapped = self.compose(script, &sentinel, &retired);

        if self.config.log_scripts {
            log::debug!("Composed script:\n{}", wrapped);
        }

        let runtime = self.runtime.as_mut().ok_or(EvaluationError::Closed)?;
        runtime.clear_stdout();
        if let Err(e) = runtime.compile_and_exec(&wrapped) {
            log::warn!("Script submission failed: {}", e);
            let payload = json!({ "error": format!("JavaScript execution failed: {}", e) });
            return Ok(translate(&payload));
        }

        let output = runtime.stdout();
        let result = scrape_result(&output, &sentinel)?;
        log::debug!(
            "Evaluated in {}ms -> {}",
            start.elapsed().as_millis(),
            result.type_name()
        );
        Ok(result)
    }

    /// The file name is only used for diagnostics.
    pub fn evaluate_named(&mut self, script: &str, file_name: &str) -> EvaluationResult<TranslatedValue> {
        log::debug!("Evaluating {}", file_name);
        self.evaluate(script)
    }

    /// Encode `source` for a later `execute`.
    pub fn compile(&self, source: &str, file_name: &str) -> Vec<u8> {
        log::debug!("Compiling {} ({} bytes)", file_name, source.len());
        source.as_bytes().to_vec()
    }

    pub fn execute(&mut self, bytecode: &[u8]) -> EvaluationResult<TranslatedValue> {
        let source = String::from_utf8(bytecode.to_vec())?;
        self.evaluate(&source)
    }

    /// Release the runtime. Later evaluations fail with `Closed`.
    pub fn close(&mut self) {
        if let Some(mut runtime) = self.runtime.take() {
            runtime.close();
            log::info!("Bridge closed after {} evaluations", self.evaluations);
        }
    }

    fn next_sentinel(&mut self) -> String {
        self.evaluations += 1;
        match self.config.sentinel {
            SentinelMode::Fixed => RESULT_MARKER.to_string(),
            SentinelMode::Unique => format!(
                "{}{:016x}:",
                RESULT_MARKER,
                self.token_seed.hash_one(self.evaluations)
            ),
        }
    }

    /// Proxy preamble plus the user script inside a guarded block that prints one result line.
    ///
    /// Values JSON cannot represent (functions, symbols, `undefined`) come back as `null`.
    fn compose(&self, script: &str, sentinel: &str, retired: &[String]) -> String {
        let preamble = proxy::synthesize(&self.registry.read());
        let marker = proxy::quote(sentinel);
        let source = proxy::quote(script);

        format!(
            r#"try {{
{retired}{preamble}var __json = JSON.stringify((0, eval)({source}));
{emit}({marker} + (__json === undefined ? 'null' : __json));
}} catch (e) {{
{emit}({marker} + JSON.stringify({{ error: String(e && e.message !== undefined ? e.message : e) }}));
}}
"#,
            retired = proxy::retire(retired),
            preamble = preamble,
            source = source,
            marker = marker,
            emit = proxy::EMIT_FN,
        )
    }
}

impl Drop for QuickJsBridge {
    fn drop(&mut self) {
        self.close();
    }
}

/// Find the first `sentinel` line in `output` and translate what follows it.
pub fn scrape_result(output: &str, sentinel: &str) -> EvaluationResult<TranslatedValue> {
    let line = output
        .lines()
        .find(|line| line.starts_with(sentinel))
        .ok_or_else(|| EvaluationError::NoResultMarker {
            output: output.trim().to_string(),
        })?;

    let payload = line[sentinel.len()..].trim_end_matches('\r');
    if payload.is_empty() {
        return Err(EvaluationError::EmptyResult);
    }

    let value: Value = serde_json::from_str(payload).map_err(|source| EvaluationError::MalformedResult {
        text: payload.to_string(),
        source,
    })?;
    Ok(translate(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::error::RuntimeError;
    use crate::bridge::types::{HostType, HostValue};
    use parking_lot::Mutex;

    /// Runtime that ignores the script and prints canned output
    struct CannedRuntime {
        output: String,
        fail_with: Option<String>,
        closes: Arc<Mutex<usize>>,
        printed: String,
    }

    impl CannedRuntime {
        fn printing(output: &str) -> Self {
            Self {
                output: output.to_string(),
                fail_with: None,
                closes: Arc::new(Mutex::new(0)),
                printed: String::new(),
            }
        }
    }

    impl ScriptRuntime for CannedRuntime {
        fn attach(&mut self, _dispatcher: Dispatcher) -> Result<(), RuntimeError> {
            Ok(())
        }

        fn compile_and_exec(&mut self, _source: &str) -> Result<(), RuntimeError> {
            if let Some(message) = &self.fail_with {
                return Err(RuntimeError::Exception(message.clone()));
            }
            self.printed.push_str(&self.output);
            Ok(())
        }

        fn stdout(&self) -> String {
            self.printed.clone()
        }

        fn clear_stdout(&mut self) {
            self.printed.clear();
        }

        fn close(&mut self) {
            *self.closes.lock() += 1;
        }

        fn is_closed(&self) -> bool {
            false
        }
    }

    fn fixed() -> BridgeConfig {
        BridgeConfig::default().with_sentinel(SentinelMode::Fixed)
    }

    fn canned(output: &str) -> QuickJsBridge {
        QuickJsBridge::with_runtime(fixed(), Box::new(CannedRuntime::printing(output))).unwrap()
    }

    fn math() -> HostObject {
        HostObject::builder("Math")
            .method("add", &[HostType::Integer, HostType::Integer], |args| {
                Ok(HostValue::Integer(args[0].as_int().unwrap_or(0) + args[1].as_int().unwrap_or(0)))
            })
            .method("div", &[HostType::Number, HostType::Number], |args| {
                let b = args[1].as_float().unwrap_or(0.0);
                if b == 0.0 {
                    anyhow::bail!("division by zero");
                }
                Ok(HostValue::Float(args[0].as_float().unwrap_or(0.0) / b))
            })
            .method("range", &[HostType::Integer], |args| {
                let n = args[0].as_int().unwrap_or(0);
                Ok(HostValue::from((0..n).collect::<Vec<i64>>()))
            })
            .build()
    }

    #[test]
    fn test_scrape_first_marker_wins() {
        let output = "noise\nQUICJS_RESULT:1\nQUICJS_RESULT:2\n";
        assert_eq!(scrape_result(output, RESULT_MARKER).unwrap(), TranslatedValue::Integer(1));
    }

    #[test]
    fn test_scrape_missing_marker() {
        let err = scrape_result("just logs\n", RESULT_MARKER).unwrap_err();
        assert!(matches!(err, EvaluationError::NoResultMarker { .. }));
    }

    #[test]
    fn test_scrape_empty_result() {
        let err = scrape_result("QUICJS_RESULT:\n", RESULT_MARKER).unwrap_err();
        assert!(matches!(err, EvaluationError::EmptyResult));
    }

    #[test]
    fn test_scrape_malformed_result() {
        let err = scrape_result("QUICJS_RESULT:{nope\n", RESULT_MARKER).unwrap_err();
        match err {
            EvaluationError::MalformedResult { text, .. } => assert_eq!(text, "{nope"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        let err = scrape_result("quicjs_result:1\n", RESULT_MARKER).unwrap_err();
        assert!(matches!(err, EvaluationError::NoResultMarker { .. }));
    }

    #[test]
    fn test_corrupted_output_is_no_result_marker() {
        let mut bridge = canned("garbage without a marker\n");
        let err = bridge.evaluate("1+1").unwrap_err();
        assert!(matches!(err, EvaluationError::NoResultMarker { .. }));
    }

    #[test]
    fn test_canned_result_is_translated() {
        let mut bridge = canned("QUICJS_RESULT:[1,2,3]\n");
        assert_eq!(
            bridge.evaluate("anything").unwrap(),
            TranslatedValue::NumberArray(vec![1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn test_submission_failure_becomes_error_payload() {
        let mut runtime = CannedRuntime::printing("QUICJS_RESULT:1\n");
        runtime.fail_with = Some("engine exploded".to_string());
        let mut bridge = QuickJsBridge::with_runtime(fixed(), Box::new(runtime)).unwrap();
        let result = bridge.evaluate("1").unwrap();
        assert_eq!(result.error_message(), Some("JavaScript execution failed: engine exploded"));
    }

    #[test]
    fn test_close_is_idempotent_and_final() {
        let runtime = CannedRuntime::printing("QUICJS_RESULT:1\n");
        let closes = runtime.closes.clone();
        let mut bridge = QuickJsBridge::with_runtime(fixed(), Box::new(runtime)).unwrap();
        bridge.close();
        bridge.close();
        drop(bridge);
        assert_eq!(*closes.lock(), 1);
    }

    #[test]
    fn test_evaluate_after_close_fails() {
        let mut bridge = canned("QUICJS_RESULT:1\n");
        bridge.close();
        assert!(bridge.is_closed());
        assert!(matches!(bridge.evaluate("1"), Err(EvaluationError::Closed)));
    }

    #[test]
    fn test_unique_sentinels_differ_per_call() {
        let mut bridge = QuickJsBridge::with_runtime(
            BridgeConfig::default(),
            Box::new(CannedRuntime::printing("")),
        )
        .unwrap();
        let first = bridge.next_sentinel();
        let second = bridge.next_sentinel();
        assert_ne!(first, second);
        assert!(first.starts_with(RESULT_MARKER));
        assert!(first.ends_with(':'));
    }

    #[test]
    fn test_compose_embeds_script_as_string() {
        let mut bridge = canned("");
        bridge.bind("math", math());
        let composed = bridge.compose("math.add(2, 3)", RESULT_MARKER, &[]);
        assert!(composed.contains("globalThis[\"math\"] = {"));
        assert!(composed.contains("(0, eval)(\"math.add(2, 3)\")"));
        assert!(composed.contains("__bridgeEmit(\"QUICJS_RESULT:\" + (__json === undefined"));
        assert!(!composed.contains("console.log"));
        assert!(!composed.contains("delete globalThis"));
    }

    #[test]
    fn test_unbind_retires_proxy_once() {
        let mut bridge = canned("QUICJS_RESULT:1\n");
        bridge.bind("math", math());
        assert!(bridge.unbind("math"));
        assert_eq!(bridge.retired, vec!["math".to_string()]);
        bridge.evaluate("1").unwrap();
        assert!(bridge.retired.is_empty());
    }

    #[test]
    fn test_closed_bridge_does_not_count_evaluations() {
        let mut bridge = canned("QUICJS_RESULT:1\n");
        bridge.close();
        assert!(matches!(bridge.evaluate("1"), Err(EvaluationError::Closed)));
        assert_eq!(bridge.evaluations, 0);
    }

    #[test]
    fn test_compile_and_execute_bytes() {
        let mut bridge = canned("QUICJS_RESULT:\"ok\"\n");
        let bytes = bridge.compile("'ok'", "test.js");
        assert_eq!(bytes, b"'ok'".to_vec());
        assert_eq!(bridge.execute(&bytes).unwrap(), TranslatedValue::String("ok".to_string()));
        assert!(matches!(bridge.execute(&[0xff, 0xfe]), Err(EvaluationError::InvalidBytecode(_))));
    }

    #[test]
    fn test_bind_set_and_unbind() {
        let mut bridge = canned("");
        bridge.bind("b", math());
        bridge.set("a", math());
        assert_eq!(bridge.bound_names(), vec!["b".to_string(), "a".to_string()]);
        assert!(bridge.unbind("b"));
        assert!(!bridge.unbind("b"));
    }

    // end-to-end against the embedded QuickJS engine

    #[test]
    fn test_e2e_bound_method() {
        let mut bridge = QuickJsBridge::create().unwrap();
        bridge.bind("math", math());
        assert_eq!(bridge.evaluate("math.add(2, 3)").unwrap(), TranslatedValue::Integer(5));
    }

    #[test]
    fn test_e2e_plain_expression() {
        let mut bridge = QuickJsBridge::create().unwrap();
        assert_eq!(bridge.evaluate("1+1").unwrap(), TranslatedValue::Integer(2));
        assert_eq!(bridge.evaluate("2.5").unwrap(), TranslatedValue::Float(2.5));
        assert_eq!(bridge.evaluate("[]").unwrap(), TranslatedValue::NumberArray(vec![]));
        assert!(bridge.evaluate("undefined").unwrap().is_null());
    }

    #[test]
    fn test_e2e_statements_yield_completion_value() {
        let mut bridge = QuickJsBridge::create().unwrap();
        let result = bridge.evaluate("var xs = ['a']; xs.push('b'); xs").unwrap();
        assert_eq!(result, TranslatedValue::StringArray(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_e2e_thrown_error_becomes_error_object() {
        let mut bridge = QuickJsBridge::create().unwrap();
        let result = bridge.evaluate("throw new Error('it broke \"badly\"')").unwrap();
        assert_eq!(result.error_message(), Some("it broke \"badly\""));
    }

    #[test]
    fn test_e2e_dispatch_failures_surface_as_script_errors() {
        let mut bridge = QuickJsBridge::create().unwrap();
        bridge.bind("math", math());

        let failed = bridge.evaluate("math.div(1, 0)").unwrap();
        assert!(failed.error_message().unwrap().contains("division by zero"));

        let wrong_type = bridge.evaluate("math.add(1.5, 2)").unwrap();
        assert!(wrong_type.error_message().unwrap().starts_with("No method add"));

        let caught = bridge
            .evaluate("try { math.div(1, 0); 'no' } catch (e) { 'caught' }")
            .unwrap();
        assert_eq!(caught, TranslatedValue::String("caught".to_string()));
    }

    #[test]
    fn test_e2e_array_results() {
        let mut bridge = QuickJsBridge::create().unwrap();
        bridge.bind("math", math());
        assert_eq!(
            bridge.evaluate("math.range(3)").unwrap(),
            TranslatedValue::NumberArray(vec![0.0, 1.0, 2.0])
        );
    }

    #[test]
    fn test_e2e_user_output_cannot_forge_result() {
        let mut bridge = QuickJsBridge::create().unwrap();
        let result = bridge.evaluate("console.log('QUICJS_RESULT:999'); 7").unwrap();
        assert_eq!(result, TranslatedValue::Integer(7));
    }

    #[test]
    fn test_e2e_replaced_console_keeps_result_channel() {
        let mut bridge = QuickJsBridge::create().unwrap();
        assert_eq!(
            bridge.evaluate("console.log = function () {}; __bridgeEmit = null; 1").unwrap(),
            TranslatedValue::Integer(1)
        );
        assert_eq!(bridge.evaluate("1+1").unwrap(), TranslatedValue::Integer(2));
        assert_eq!(bridge.evaluate("console = undefined; 3").unwrap(), TranslatedValue::Integer(3));
        assert_eq!(bridge.evaluate("4").unwrap(), TranslatedValue::Integer(4));
    }

    #[test]
    fn test_e2e_unserializable_values_become_null() {
        let mut bridge = QuickJsBridge::create().unwrap();
        assert!(bridge.evaluate("(function () {})").unwrap().is_null());
        assert!(bridge.evaluate("Symbol('s')").unwrap().is_null());
    }

    #[test]
    fn test_e2e_panicking_handler_becomes_error_result() {
        let mut bridge = QuickJsBridge::create().unwrap();
        bridge.bind(
            "k",
            HostObject::builder("Broken")
                .method("boom", &[], |_| -> anyhow::Result<HostValue> { panic!("handler bug") })
                .build(),
        );
        let result = bridge.evaluate("k.boom()").unwrap();
        assert!(result.error_message().unwrap().contains("handler bug"));
        assert_eq!(bridge.evaluate("1+1").unwrap(), TranslatedValue::Integer(2));
    }

    #[test]
    fn test_e2e_unbound_proxy_is_removed() {
        let mut bridge = QuickJsBridge::create().unwrap();
        bridge.bind("math", math());
        assert_eq!(bridge.evaluate("math.add(1, 1)").unwrap(), TranslatedValue::Integer(2));
        bridge.unbind("math");
        assert_eq!(
            bridge.evaluate("typeof math").unwrap(),
            TranslatedValue::String("undefined".to_string())
        );
        let result = bridge.evaluate("math.add(1, 1)").unwrap();
        assert!(result.error_message().unwrap().contains("not defined"));
    }

    #[test]
    fn test_e2e_rebinding_between_evaluations() {
        let mut bridge = QuickJsBridge::create().unwrap();
        bridge.bind("k", HostObject::builder("One").method("get", &[], |_| Ok(HostValue::Integer(1))).build());
        assert_eq!(bridge.evaluate("k.get()").unwrap(), TranslatedValue::Integer(1));
        bridge.bind("k", HostObject::builder("Two").method("get", &[], |_| Ok(HostValue::Integer(2))).build());
        assert_eq!(bridge.evaluate("k.get()").unwrap(), TranslatedValue::Integer(2));
    }

    struct Counter {
        hits: Mutex<i64>,
    }

    impl HostBinding for Counter {
        fn capabilities(self: Arc<Self>) -> HostObject {
            HostObject::builder("Counter")
                .method("hit", &[], move |_| {
                    let mut hits = self.hits.lock();
                    *hits += 1;
                    Ok(HostValue::Integer(*hits))
                })
                .build()
        }
    }

    #[test]
    fn test_e2e_shared_binding_keeps_caller_state() {
        let counter = Arc::new(Counter { hits: Mutex::new(0) });
        let mut bridge = QuickJsBridge::create().unwrap();
        bridge.bind_shared("counter", counter.clone());
        assert_eq!(bridge.evaluate("counter.hit(); counter.hit()").unwrap(), TranslatedValue::Integer(2));
        bridge.close();
        assert_eq!(*counter.hits.lock(), 2);
    }
}
