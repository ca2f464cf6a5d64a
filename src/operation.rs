//! Documentation units produced per handler and HTTP method.

use crate::docstring::InlineParam;
use crate::handler::HttpMethod;
use serde::{Deserialize, Serialize};

/// Where a parameter is read from in a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Body,
    Form,
}

/// Kind of constraint carried by [`AllowedValues`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueKind {
    Range,
}

/// Allowed values of a parameter, currently only length ranges
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedValues {
    pub min: Option<u64>,
    pub max: Option<u64>,
    #[serde(rename = "valueType")]
    pub kind: ValueKind,
}

impl AllowedValues {
    pub fn range(min: Option<u64>, max: Option<u64>) -> Self {
        Self {
            min,
            max,
            kind: ValueKind::Range,
        }
    }
}

/// One documented parameter of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    pub data_type: String,
    #[serde(rename = "paramType")]
    pub location: ParamLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    #[serde(rename = "allowableValues", skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<AllowedValues>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            location,
            required: None,
            default_value: None,
            allowed_values: None,
            description: None,
        }
    }

    /// A required string parameter captured from the URL path
    pub fn path(name: impl Into<String>) -> Self {
        Self {
            required: Some(true),
            ..Self::new(name, "string", ParamLocation::Path)
        }
    }

    /// Overlay the fields a docstring line declares. Fields the line does not
    /// mention keep their current values.
    pub fn apply(&mut self, doc: &InlineParam) {
        if let Some(location) = doc.location {
            self.location = location;
        }
        if let Some(required) = doc.required {
            self.required = Some(required);
        }
        if let Some(data_type) = &doc.data_type {
            self.data_type = data_type.clone();
        }
        self.description = Some(doc.description.clone());
    }
}

impl From<&InlineParam> for Parameter {
    fn from(doc: &InlineParam) -> Self {
        Self {
            required: doc.required,
            description: Some(doc.description.clone()),
            ..Self::new(
                doc.name.clone(),
                doc.data_type.clone().unwrap_or_default(),
                doc.location.unwrap_or(ParamLocation::Query),
            )
        }
    }
}

/// One (handler, HTTP method) documentation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(rename = "httpMethod")]
    pub http_method: HttpMethod,
    #[serde(rename = "nickname")]
    pub operation_id: String,
    pub summary: String,
    pub notes: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,
    pub parameters: Vec<Parameter>,
}
