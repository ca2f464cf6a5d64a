//! Data model documentation.
//!
//! Each handler may name a root model; models may in turn declare related models.
//! The resolver walks these relations transitively and documents every model it finds
//! from the structured block of the model's docstring.

use crate::docstring;
use crate::handler::{Handler, ModelType};
use crate::marker_block::MarkerBlock;
use crate::route_tree::Endpoint;
use log::debug;
use serde::Serialize;
use serde_yaml::Mapping;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Documentation of one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDoc {
    pub name: String,
    /// Prose of the model docstring, when it has any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Structured block of the model docstring
    pub properties: Mapping,
}

impl ModelDoc {
    pub fn from_model(model: &dyn ModelType) -> Self {
        let docstring = model.docstring();
        let description = docstring
            .map(docstring::strip_params)
            .filter(|text| !text.is_empty());

        Self {
            name: model.name().to_string(),
            description,
            properties: MarkerBlock::parse(docstring).into_mapping(),
        }
    }
}

/// The handler's root model followed by every model reachable through declared
/// relations, depth-first. Each model name is visited once, so relation cycles end.
pub fn models_for(handler: &dyn Handler) -> Vec<Arc<dyn ModelType>> {
    let Some(root) = handler.model() else {
        return Vec::new();
    };

    let mut visited = HashSet::new();
    visited.insert(root.name().to_string());

    let mut models = vec![root.clone()];
    collect_related(root.as_ref(), &mut visited, &mut models);
    models
}

fn collect_related(
    model: &dyn ModelType,
    visited: &mut HashSet<String>,
    out: &mut Vec<Arc<dyn ModelType>>,
) {
    let Some(related) = model.related_models() else {
        return;
    };

    for child in related {
        if !visited.insert(child.name().to_string()) {
            debug!("Model {} already visited from {}", child.name(), model.name());
            continue;
        }
        out.push(child.clone());
        collect_related(child.as_ref(), visited, out);
    }
}

/// Document every model referenced by the endpoints. Later discoveries overwrite
/// earlier ones with the same name.
pub fn resolve<'a, I>(endpoints: I) -> BTreeMap<String, ModelDoc>
where
    I: IntoIterator<Item = &'a Endpoint>,
{
    let mut docs = BTreeMap::new();

    for endpoint in endpoints {
        for model in models_for(endpoint.handler.as_ref()) {
            let doc = ModelDoc::from_model(model.as_ref());
            docs.insert(doc.name.clone(), doc);
        }
    }

    debug!("Resolved {} models", docs.len());
    docs
}
