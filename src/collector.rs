//! Documentation collection.
//!
//! The collector drives the whole pipeline: it loads a routing tree from a
//! [`RouteSource`], flattens and enriches it, narrows it to one top-level API when
//! asked to, documents every endpoint's operations and finally resolves the models
//! the remaining endpoints reference.

use crate::error::Result;
use crate::introspector::ViewIntrospector;
use crate::model_resolver::{self, ModelDoc};
use crate::operation::Operation;
use crate::route_tree::{self, Endpoint, RouteNode, RouteTreeFlattener};
use log::{debug, info};
use serde::Serialize;
use serde_yaml::Mapping;
use std::collections::{BTreeMap, BTreeSet};

/// Explicit configuration of one documentation run
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Dotted name of the root route module; `None` lets the source pick its default
    pub route_module: Option<String>,
    /// Resolver namespaces pruned from the tree
    pub exclude_namespaces: Vec<String>,
    /// Only document endpoints whose `api` metadata equals this value
    pub filter_path: Option<String>,
}

/// Something that can produce a routing tree.
pub trait RouteSource {
    /// Load the routing tree of `module`, or of the source's default module.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RouteImport`](crate::error::Error::RouteImport) when the module
    /// cannot be found or read.
    fn load(&self, module: Option<&str>) -> Result<Vec<RouteNode>>;
}

/// Documentation of one endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiDoc {
    pub path: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    /// Top-level structured block of the handler
    #[serde(skip_serializing_if = "Mapping::is_empty")]
    pub metadata: Mapping,
    pub operations: Vec<Operation>,
}

/// The complete documentation object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiDocumentation {
    pub apis: Vec<ApiDoc>,
    pub models: BTreeMap<String, ModelDoc>,
}

impl ApiDocumentation {
    /// Distinct top-level APIs declared by the documented endpoints
    pub fn top_level_apis(&self) -> BTreeSet<String> {
        self.apis.iter().filter_map(|api| api.api.clone()).collect()
    }

    pub fn operation_count(&self) -> usize {
        self.apis.iter().map(|api| api.operations.len()).sum()
    }
}

/// Builds [`ApiDocumentation`] from a route source.
pub struct DocumentationCollector {
    config: GeneratorConfig,
}

impl DocumentationCollector {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run the whole pipeline against `source`.
    ///
    /// # Errors
    ///
    /// Fails when the route module cannot be loaded or a dispatch handler has no
    /// action map.
    pub fn generate(&self, source: &dyn RouteSource) -> Result<ApiDocumentation> {
        let module = self.config.route_module.as_deref();
        info!("Loading routes from {}", module.unwrap_or("default route module"));
        let tree = source.load(module)?;

        let flattener = RouteTreeFlattener::new(self.config.exclude_namespaces.iter().cloned());
        let endpoints = flattener.discover(&tree);
        info!("Discovered {} endpoints", endpoints.len());

        self.collect(&endpoints)
    }

    /// Document already discovered endpoints.
    pub fn collect(&self, endpoints: &[Endpoint]) -> Result<ApiDocumentation> {
        let selected: Vec<&Endpoint> = match self.config.filter_path.as_deref() {
            Some(filter) => {
                let kept: Vec<_> = route_tree::filter_by_path(endpoints, filter).collect();
                debug!("Filter {} kept {} of {} endpoints", filter, kept.len(), endpoints.len());
                kept
            }
            None => endpoints.iter().collect(),
        };

        let apis = selected
            .iter()
            .map(|endpoint| document_endpoint(endpoint))
            .collect::<Result<Vec<_>>>()?;
        let models = model_resolver::resolve(selected.iter().copied());

        Ok(ApiDocumentation { apis, models })
    }
}

fn document_endpoint(endpoint: &Endpoint) -> Result<ApiDoc> {
    let view = ViewIntrospector::for_endpoint(endpoint);
    let operations: Vec<Operation> = view.operations()?.collect();
    debug!("{}: {} operations", endpoint.path, operations.len());

    Ok(ApiDoc {
        path: endpoint.path.clone(),
        description: view.description(),
        api: endpoint.api().map(str::to_string),
        metadata: endpoint.metadata.clone(),
        operations,
    })
}
