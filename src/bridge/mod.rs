// Tue Jan 20 2026 - Alex

pub mod types;
pub mod translate;
pub mod api;
pub mod registry;
pub mod proxy;
pub mod dispatch;
pub mod runtime;
pub mod engine;
pub mod error;
pub mod builtins;

pub use types::{HostType, HostValue};
pub use translate::{translate, translate_str, TranslatedValue};
pub use api::{HostBinding, HostMethod, HostObject, HostObjectBuilder, MethodKey, BASE_CAPABILITIES};
pub use registry::{ObjectRegistry, SharedRegistry};
pub use proxy::{synthesize, synthesize_object};
pub use dispatch::Dispatcher;
pub use runtime::{QuickJsRuntime, ScriptRuntime};
pub use engine::{scrape_result, QuickJsBridge, RESULT_MARKER};
pub use error::{DispatchError, EvaluationError, EvaluationResult, RuntimeError};
pub use builtins::{register_builtins, BuiltinObjects};
