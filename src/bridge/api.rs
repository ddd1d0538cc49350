// Tue Jan 20 2026 - Alex

use crate::bridge::types::{HostType, HostValue};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Names every script value already answers to. These are never proxied or dispatched.
pub const BASE_CAPABILITIES: &[&str] = &[
    "constructor",
    "toString",
    "toLocaleString",
    "valueOf",
    "hasOwnProperty",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
    "equals",
    "hashCode",
    "getClass",
];

pub fn is_base_capability(name: &str) -> bool {
    BASE_CAPABILITIES.contains(&name)
}

pub type MethodHandler = Box<dyn Fn(&[HostValue]) -> anyhow::Result<HostValue> + Send + Sync>;

/// Key of a capability table entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    pub name: String,
    pub arity: usize,
}

impl MethodKey {
    pub fn new(name: &str, arity: usize) -> Self {
        Self {
            name: name.to_string(),
            arity,
        }
    }
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A script-invocable operation on a bound object
pub struct HostMethod {
    pub name: String,
    pub params: Vec<HostType>,
    pub description: String,
    pub handler: MethodHandler,
}

impl HostMethod {
    pub fn new<F>(name: &str, params: &[HostType], handler: F) -> Self
    where
        F: Fn(&[HostValue]) -> anyhow::Result<HostValue> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            params: params.to_vec(),
            description: String::new(),
            handler: Box::new(handler),
        }
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = desc.to_string();
        self
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn key(&self) -> MethodKey {
        MethodKey::new(&self.name, self.params.len())
    }

    /// True when every argument's runtime type is accepted by the declared parameter.
    pub fn accepts(&self, arg_types: &[HostType]) -> bool {
        self.params.len() == arg_types.len()
            && self.params.iter().zip(arg_types).all(|(p, a)| p.accepts(*a))
    }

    pub fn invoke(&self, args: &[HostValue]) -> anyhow::Result<HostValue> {
        (self.handler)(args)
    }

    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        format!("{}({})", self.name, params.join(", "))
    }
}

impl fmt::Debug for HostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostMethod")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

/// Capability table of one bound object, keyed by (name, arity)
pub struct HostObject {
    pub type_name: String,
    methods: IndexMap<MethodKey, HostMethod>,
}

impl HostObject {
    pub fn new(type_name: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            methods: IndexMap::new(),
        }
    }

    pub fn builder(type_name: &str) -> HostObjectBuilder {
        HostObjectBuilder::new(type_name)
    }

    /// Adds a method, replacing any previous one with the same name and arity.
    pub fn add_method(&mut self, method: HostMethod) {
        if is_base_capability(&method.name) {
            log::warn!(
                "{}: '{}' shadows a base capability and will not be exposed",
                self.type_name,
                method.name
            );
        }
        if let Some(old) = self.methods.insert(method.key(), method) {
            log::debug!("{}: replaced {}", self.type_name, old.signature());
        }
    }

    pub fn method(&self, name: &str, arity: usize) -> Option<&HostMethod> {
        self.methods.get(&MethodKey::new(name, arity))
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.keys().any(|k| k.name == name)
    }

    /// Methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &HostMethod> {
        self.methods.values()
    }

    /// Distinct method names in declaration order, each with every arity it is declared with.
    pub fn method_arities(&self) -> IndexMap<&str, Vec<usize>> {
        let mut out: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for key in self.methods.keys() {
            out.entry(key.name.as_str()).or_default().push(key.arity);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn help_text(&self) -> String {
        let mut help = format!("{}\n", self.type_name);
        for method in self.methods.values() {
            help.push_str(&format!("  {}", method.signature()));
            if !method.description.is_empty() {
                help.push_str(&format!("  {}", method.description));
            }
            help.push('\n');
        }
        help
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObject")
            .field("type_name", &self.type_name)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for capability tables
pub struct HostObjectBuilder {
    object: HostObject,
}

impl HostObjectBuilder {
    pub fn new(type_name: &str) -> Self {
        Self {
            object: HostObject::new(type_name),
        }
    }

    pub fn method<F>(mut self, name: &str, params: &[HostType], handler: F) -> Self
    where
        F: Fn(&[HostValue]) -> anyhow::Result<HostValue> + Send + Sync + 'static,
    {
        self.object.add_method(HostMethod::new(name, params, handler));
        self
    }

    pub fn method_with_meta(mut self, method: HostMethod) -> Self {
        self.object.add_method(method);
        self
    }

    pub fn build(self) -> HostObject {
        self.object
    }
}

/// Host types that describe their own capability table.
///
/// The table's handlers usually capture a clone of `self`, so the bridge and
/// the caller share the value.
pub trait HostBinding: Send + Sync + 'static {
    fn capabilities(self: Arc<Self>) -> HostObject;
}
