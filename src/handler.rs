//! Capability interfaces consumed from the web framework.
//!
//! The documentation pipeline never reflects over handlers. Everything it needs is
//! expressed as a trait with no-op defaults: a handler either answers a capability
//! query or is treated as not supporting it.
//!
//! - [`Handler`] - a view class: docstrings, allowed methods, optional serializer and model
//! - [`FieldDescriptor`] / [`FieldSpec`] - request payload descriptors ("serializers")
//! - [`ModelType`] - data models and their declared relations
//! - [`Callback`] - how a route leaf wraps its handler, plus the dispatch action map

use crate::docstring;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// HTTP methods a handler can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// All methods in the order handlers conventionally declare them
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Options,
        HttpMethod::Trace,
    ];

    /// Uppercase wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Parse a method name, case-insensitively
    pub fn parse(name: &str) -> Option<HttpMethod> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Whether requests with this method carry form/body parameters
    pub fn accepts_payload(&self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two handler shapes the introspectors understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    /// One method per HTTP verb (`get`, `post`, ...)
    #[default]
    Simple,
    /// Named actions bound to HTTP verbs through the route callback's action map
    Dispatch,
}

/// A view class exposed through the routing tree.
pub trait Handler {
    /// Type name of the handler (e.g. `UserListView`)
    fn name(&self) -> &str;

    /// Module the handler type originates from
    fn module(&self) -> &str;

    fn kind(&self) -> HandlerKind {
        HandlerKind::Simple
    }

    /// Human-readable display name, used to derive operation identifiers
    fn view_name(&self) -> String {
        docstring::view_name(self.name())
    }

    /// Class-level docstring
    fn docstring(&self) -> Option<&str>;

    /// Docstring of the named method (`get`, `list`, ...), `None` if the method is
    /// undefined or undocumented
    fn method_docstring(&self, method: &str) -> Option<&str>;

    fn allowed_methods(&self) -> Vec<HttpMethod>;

    /// Request/response payload descriptor, if the handler declares one
    fn serializer(&self) -> Option<Arc<dyn FieldDescriptor>> {
        None
    }

    /// Root data model, if the handler declares one
    fn model(&self) -> Option<Arc<dyn ModelType>> {
        None
    }

    /// True for the documentation system's own views
    fn is_documentation_view(&self) -> bool {
        false
    }
}

/// A payload descriptor that can be introspected into named fields.
pub trait FieldDescriptor {
    fn name(&self) -> &str;

    /// Declared fields, in declaration order
    fn fields(&self) -> Vec<(String, FieldSpec)> {
        Vec::new()
    }
}

/// A single declared field of a [`FieldDescriptor`].
#[derive(Debug, Clone, Default)]
pub struct FieldSpec {
    /// Semantic type label (e.g. `string`, `integer`, `datetime`)
    pub type_label: String,
    pub read_only: bool,
    pub max_length: Option<u64>,
    pub min_length: Option<u64>,
    pub help_text: Option<String>,
    pub default: Option<FieldDefault>,
    pub required: Option<bool>,
}

impl FieldSpec {
    pub fn new(type_label: impl Into<String>) -> Self {
        Self {
            type_label: type_label.into(),
            ..Self::default()
        }
    }
}

/// A field default, either a plain value or a factory invoked on demand.
#[derive(Clone)]
pub enum FieldDefault {
    Value(serde_json::Value),
    Callable(Arc<dyn Fn() -> serde_json::Value + Send + Sync>),
}

impl FieldDefault {
    pub fn resolve(&self) -> serde_json::Value {
        match self {
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Callable(factory) => factory(),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::Value(value) => f.debug_tuple("Value").field(value).finish(),
            FieldDefault::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

/// A documented data model.
pub trait ModelType {
    fn name(&self) -> &str;

    fn docstring(&self) -> Option<&str>;

    /// Directly related models; `None` when the model declares no relation hook
    fn related_models(&self) -> Option<Vec<Arc<dyn ModelType>>> {
        None
    }
}

/// HTTP verb to action name bindings of a dispatch handler, in declaration order.
pub type ActionMap = Vec<(HttpMethod, String)>;

/// How a route leaf wraps the handler it dispatches to.
#[derive(Clone)]
pub enum Callback {
    /// Callable exposing the handler class directly
    Class {
        handler: Arc<dyn Handler>,
        actions: Option<ActionMap>,
    },
    /// Older convention exposing a handler instance
    Instance {
        handler: Arc<dyn Handler>,
        actions: Option<ActionMap>,
    },
    /// Plain function with no handler behind it
    Function { name: String },
}

impl Callback {
    pub fn class(handler: Arc<dyn Handler>) -> Self {
        Callback::Class {
            handler,
            actions: None,
        }
    }

    pub fn instance(handler: Arc<dyn Handler>) -> Self {
        Callback::Instance {
            handler,
            actions: None,
        }
    }

    pub fn function(name: impl Into<String>) -> Self {
        Callback::Function { name: name.into() }
    }

    /// Attach a dispatch action map to the callback
    pub fn with_actions(self, map: ActionMap) -> Self {
        match self {
            Callback::Class { handler, .. } => Callback::Class {
                handler,
                actions: Some(map),
            },
            Callback::Instance { handler, .. } => Callback::Instance {
                handler,
                actions: Some(map),
            },
            function => function,
        }
    }

    /// The wrapped handler, if any
    pub fn handler(&self) -> Option<&Arc<dyn Handler>> {
        match self {
            Callback::Class { handler, .. } | Callback::Instance { handler, .. } => Some(handler),
            Callback::Function { .. } => None,
        }
    }

    pub fn action_map(&self) -> Option<&ActionMap> {
        match self {
            Callback::Class { actions, .. } | Callback::Instance { actions, .. } => {
                actions.as_ref()
            }
            Callback::Function { .. } => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Callback::Class { handler, .. } | Callback::Instance { handler, .. } => handler.name(),
            Callback::Function { name } => name,
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Class { handler, actions } => f
                .debug_struct("Class")
                .field("handler", &handler.name())
                .field("actions", actions)
                .finish(),
            Callback::Instance { handler, actions } => f
                .debug_struct("Instance")
                .field("handler", &handler.name())
                .field("actions", actions)
                .finish(),
            Callback::Function { name } => f.debug_struct("Function").field("name", name).finish(),
        }
    }
}
