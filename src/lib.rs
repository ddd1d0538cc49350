// Tue Jan 20 2026 - Alex

//! Bind host objects into an embedded QuickJS runtime and read typed results back.
//!
//! ```no_run
//! use quickjs_bridge::{HostObject, HostType, HostValue, QuickJsBridge};
//!
//! let mut bridge = QuickJsBridge::create()?;
//! bridge.bind(
//!     "math",
//!     HostObject::builder("Math")
//!         .method("add", &[HostType::Integer, HostType::Integer], |args| {
//!             Ok(HostValue::Integer(args[0].as_int().unwrap_or(0) + args[1].as_int().unwrap_or(0)))
//!         })
//!         .build(),
//! );
//! assert_eq!(bridge.evaluate("math.add(2, 3)")?.as_int(), Some(5));
//! # Ok::<(), quickjs_bridge::EvaluationError>(())
//! ```

pub mod config;
pub mod bridge;
pub mod ui;

pub use config::{BridgeConfig, SentinelMode};
pub use bridge::{
    DispatchError, Dispatcher, EvaluationError, HostBinding, HostObject, HostType, HostValue,
    QuickJsBridge, ScriptRuntime, TranslatedValue,
};
