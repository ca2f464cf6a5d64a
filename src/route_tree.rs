//! Route tree flattening.
//!
//! A routing tree is a sequence of [`RouteNode`]s. Leaves bind a regex fragment to a
//! callback; resolvers prefix a subtree with their own fragment and may carry a
//! namespace. Flattening walks the tree depth-first and produces one [`Endpoint`] per
//! documentable leaf:
//!
//! - resolvers whose namespace is excluded are pruned with their whole subtree
//! - callbacks wrapping no handler, the router's generated root view and the
//!   documentation views themselves are skipped
//! - paths are simplified from the regex (`^users/(?P<pk>[^/.]+)/$` → `/users/{pk}/`)
//!   and format-suffix variants (`.{format}`) are dropped
//!
//! After flattening, every endpoint is enriched with the structured block of its
//! handler's class docstring.

use crate::handler::{Callback, Handler};
use crate::marker_block::{MarkerBlock, API_KEY};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Module of the framework's auto-generated API root view
pub const ROUTER_ROOT_MODULE: &str = "rest_framework.routers";

/// Format-suffix placeholder excluded from documented paths
pub const FORMAT_SUFFIX: &str = ".{format}";

static NAMED_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\?P?(<\w+>).+?\)").expect("named group regex should be valid"));

static UNNAMED_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(.*?\)").expect("unnamed group regex should be valid"));

/// A node of the routing tree.
#[derive(Debug, Clone)]
pub enum RouteNode {
    Leaf {
        pattern: String,
        callback: Callback,
    },
    Resolver {
        pattern: String,
        namespace: Option<String>,
        children: Vec<RouteNode>,
    },
}

impl RouteNode {
    pub fn leaf(pattern: impl Into<String>, callback: Callback) -> Self {
        RouteNode::Leaf {
            pattern: pattern.into(),
            callback,
        }
    }

    pub fn resolver(
        pattern: impl Into<String>,
        namespace: Option<&str>,
        children: Vec<RouteNode>,
    ) -> Self {
        RouteNode::Resolver {
            pattern: pattern.into(),
            namespace: namespace.map(str::to_string),
            children,
        }
    }
}

/// One discovered (path, handler) pair.
#[derive(Clone)]
pub struct Endpoint {
    /// Simplified path with `{name}` captures
    pub path: String,
    /// The leaf's own pattern, as declared
    pub pattern: String,
    /// Compiled `pattern`; `None` when it uses constructs the regex engine lacks
    /// (look-around, backreferences)
    pub matcher: Option<Regex>,
    pub callback: Callback,
    pub handler: Arc<dyn Handler>,
    /// Top-level structured block of the handler docstring
    pub metadata: Mapping,
}

impl Endpoint {
    /// Top-level API the endpoint is grouped under
    pub fn api(&self) -> Option<&str> {
        self.metadata.get(API_KEY).and_then(Value::as_str)
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("path", &self.path)
            .field("pattern", &self.pattern)
            .field("handler", &self.handler.name())
            .field("metadata", &self.metadata)
            .finish()
    }
}

/// Flattens routing trees into endpoints.
#[derive(Debug, Clone, Default)]
pub struct RouteTreeFlattener {
    exclude_namespaces: HashSet<String>,
}

impl RouteTreeFlattener {
    pub fn new<I, S>(exclude_namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude_namespaces: exclude_namespaces.into_iter().map(Into::into).collect(),
        }
    }

    /// Flatten the tree and attach each handler's top-level structured block
    pub fn discover(&self, nodes: &[RouteNode]) -> Vec<Endpoint> {
        let mut endpoints = self.flatten(nodes);
        enrich(&mut endpoints);
        endpoints
    }

    pub fn flatten(&self, nodes: &[RouteNode]) -> Vec<Endpoint> {
        self.flatten_with_prefix(nodes, "")
    }

    pub fn flatten_with_prefix(&self, nodes: &[RouteNode], prefix: &str) -> Vec<Endpoint> {
        let mut endpoints = Vec::new();

        for node in nodes {
            match node {
                RouteNode::Leaf { pattern, callback } => {
                    if let Some(endpoint) = self.assemble_endpoint(pattern, callback, prefix) {
                        endpoints.push(endpoint);
                    }
                }
                RouteNode::Resolver {
                    pattern,
                    namespace,
                    children,
                } => {
                    if let Some(ns) = namespace {
                        if self.exclude_namespaces.contains(ns) {
                            debug!("Skipping excluded namespace {}", ns);
                            continue;
                        }
                    }
                    let nested = format!("{}{}", prefix, pattern);
                    endpoints.extend(self.flatten_with_prefix(children, &nested));
                }
            }
        }

        endpoints
    }

    fn assemble_endpoint(
        &self,
        pattern: &str,
        callback: &Callback,
        prefix: &str,
    ) -> Option<Endpoint> {
        let Some(handler) = callback.handler() else {
            debug!("Skipping {}: callback {} wraps no handler", pattern, callback.name());
            return None;
        };

        if is_router_root(handler.as_ref()) || handler.is_documentation_view() {
            debug!("Skipping framework view {}", handler.name());
            return None;
        }

        let full_pattern = format!("{}{}", prefix, pattern);
        let path = normalize_path(&full_pattern);
        if path.contains(FORMAT_SUFFIX) {
            debug!("Skipping format suffix route {}", path);
            return None;
        }

        let matcher = match Regex::new(pattern) {
            Ok(matcher) => Some(matcher),
            Err(e) => {
                warn!("Route pattern {} of {} has no matcher: {}", pattern, path, e);
                None
            }
        };

        Some(Endpoint {
            path,
            pattern: pattern.to_string(),
            matcher,
            callback: callback.clone(),
            handler: handler.clone(),
            metadata: Mapping::new(),
        })
    }
}

fn is_router_root(handler: &dyn Handler) -> bool {
    handler.module() == ROUTER_ROOT_MODULE
}

/// Merge every endpoint's top-level structured block into its metadata
pub fn enrich(endpoints: &mut [Endpoint]) {
    for endpoint in endpoints.iter_mut() {
        let block = MarkerBlock::parse(endpoint.handler.docstring());
        endpoint.metadata.extend(block.into_mapping());
    }
}

/// Endpoints whose `api` metadata, trimmed of slashes, equals `path`
pub fn filter_by_path<'a>(
    endpoints: &'a [Endpoint],
    path: &'a str,
) -> impl Iterator<Item = &'a Endpoint> + 'a {
    endpoints
        .iter()
        .filter(move |endpoint| endpoint.api().unwrap_or_default().trim_matches('/') == path)
}

/// Distinct top-level APIs declared by the endpoints
pub fn top_level_apis(endpoints: &[Endpoint]) -> BTreeSet<String> {
    endpoints
        .iter()
        .filter_map(|endpoint| endpoint.api().map(str::to_string))
        .collect()
}

/// Reduce a route regex to a readable path with `<name>` placeholders
pub fn simplify_regex(pattern: &str) -> String {
    let simplified = NAMED_GROUP.replace_all(pattern, "$1");
    let simplified = UNNAMED_GROUP.replace_all(&simplified, "<var>");
    let mut simplified = simplified
        .replace('^', "")
        .replace('$', "")
        .replace('?', "")
        .replace("//", "/")
        .replace('\\', "");
    if !simplified.starts_with('/') {
        simplified.insert(0, '/');
    }
    simplified
}

/// Simplified path with `{name}` placeholders
pub fn normalize_path(pattern: &str) -> String {
    simplify_regex(pattern).replace('<', "{").replace('>', "}")
}
