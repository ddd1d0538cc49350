// Tue Jan 20 2026 - Alex

use crate::bridge::dispatch::Dispatcher;
use crate::bridge::error::RuntimeError;
use crate::bridge::proxy::{DISPATCH_PRELUDE, HOST_CALL_FN, HOST_PRINT_FN};
use crate::config::BridgeConfig;
use parking_lot::Mutex;
use rquickjs::{Context, Ctx, Function, Runtime};
use std::sync::Arc;

/// Embedded script engine as seen by the bridge
pub trait ScriptRuntime {
    /// Install the host-call hook that proxies reach through.
    fn attach(&mut self, dispatcher: Dispatcher) -> Result<(), RuntimeError>;

    /// Compile and run `source`. Fails on compile errors and uncaught exceptions.
    fn compile_and_exec(&mut self, source: &str) -> Result<(), RuntimeError>;

    /// Text printed since the last `clear_stdout`.
    fn stdout(&self) -> String;

    fn clear_stdout(&mut self);

    /// Release the engine. Safe to call more than once.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

struct Engine {
    context: Context,
    #[allow(dead_code)] // owns the heap the context lives in
    runtime: Runtime,
}

/// QuickJS-backed runtime with captured console output
pub struct QuickJsRuntime {
    engine: Option<Engine>,
    output: Arc<Mutex<String>>,
}

impl QuickJsRuntime {
    pub fn new(config: &BridgeConfig) -> Result<Self, RuntimeError> {
        let runtime = Runtime::new().map_err(|e| RuntimeError::Init(e.to_string()))?;
        if let Some(limit) = config.memory_limit {
            runtime.set_memory_limit(limit);
        }
        if let Some(size) = config.max_stack_size {
            runtime.set_max_stack_size(size);
        }
        let context = Context::full(&runtime).map_err(|e| RuntimeError::Init(e.to_string()))?;

        let output = Arc::new(Mutex::new(String::new()));
        let print_sink = output.clone();
        context
            .with(|ctx| -> rquickjs::Result<()> {
                let print = Function::new(ctx.clone(), move |line: String| {
                    let mut out = print_sink.lock();
                    out.push_str(&line);
                    out.push('\n');
                })?;
                ctx.globals().set(HOST_PRINT_FN, print)?;
                Ok(())
            })
            .map_err(|e| RuntimeError::Init(e.to_string()))?;

        Ok(Self {
            engine: Some(Engine { context, runtime }),
            output,
        })
    }

    fn engine(&self) -> Result<&Engine, RuntimeError> {
        self.engine.as_ref().ok_or(RuntimeError::Closed)
    }
}

impl ScriptRuntime for QuickJsRuntime {
    fn attach(&mut self, dispatcher: Dispatcher) -> Result<(), RuntimeError> {
        let engine = self.engine()?;
        engine.context.with(|ctx| {
            let install = || -> rquickjs::Result<()> {
                let call = Function::new(
                    ctx.clone(),
                    move |object: String, method: String, args: String| -> String {
                        dispatcher.dispatch_json(&object, &method, &args)
                    },
                )?;
                ctx.globals().set(HOST_CALL_FN, call)?;
                ctx.eval::<(), _>(DISPATCH_PRELUDE)?;
                Ok(())
            };
            install().map_err(|e| RuntimeError::Init(exception_message(&ctx, &e)))
        })
    }

    fn compile_and_exec(&mut self, source: &str) -> Result<(), RuntimeError> {
        let engine = self.engine()?;
        engine.context.with(|ctx| {
            ctx.eval::<(), _>(source)
                .map_err(|e| RuntimeError::Exception(exception_message(&ctx, &e)))
        })
    }

    fn stdout(&self) -> String {
        self.output.lock().clone()
    }

    fn clear_stdout(&mut self) {
        self.output.lock().clear();
    }

    fn close(&mut self) {
        if self.engine.take().is_some() {
            log::debug!("QuickJS runtime released");
        }
    }

    fn is_closed(&self) -> bool {
        self.engine.is_none()
    }
}

/// Message of the pending JS exception behind `err`, or `err` itself.
fn exception_message(ctx: &Ctx<'_>, err: &rquickjs::Error) -> String {
    if matches!(err, rquickjs::Error::Exception) {
        let caught = ctx.catch();
        if let Some(message) = caught
            .as_object()
            .and_then(|obj| obj.get::<_, String>("message").ok())
        {
            return message;
        }
        if let Some(text) = caught.as_string().and_then(|s| s.to_string().ok()) {
            return text;
        }
    }
    err.to_string()
}
