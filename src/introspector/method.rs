use crate::docstring::{self, InlineParam};
use crate::fields;
use crate::handler::{Handler, HttpMethod};
use crate::marker_block::MarkerBlock;
use crate::operation::{Operation, Parameter};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static PATH_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^}/]+)\}").expect("path parameter regex should be valid"));

/// The handler method an operation is documented from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodTarget {
    /// A method named after the HTTP verb (`get`, `post`, ...)
    Simple(HttpMethod),
    /// A named action bound to an HTTP verb
    Dispatch {
        http_method: HttpMethod,
        action: String,
    },
}

impl MethodTarget {
    pub fn http_method(&self) -> HttpMethod {
        match self {
            MethodTarget::Simple(method) => *method,
            MethodTarget::Dispatch { http_method, .. } => *http_method,
        }
    }

    /// Name of the handler method carrying the docstring
    pub fn method_name(&self) -> String {
        match self {
            MethodTarget::Simple(method) => method.as_str().to_ascii_lowercase(),
            MethodTarget::Dispatch { action, .. } => action.clone(),
        }
    }
}

/// Builds the [`Operation`] of one handler method.
pub struct MethodIntrospector<'a> {
    handler: &'a dyn Handler,
    path: &'a str,
    target: MethodTarget,
}

impl<'a> MethodIntrospector<'a> {
    pub fn new(handler: &'a dyn Handler, path: &'a str, target: MethodTarget) -> Self {
        Self {
            handler,
            path,
            target,
        }
    }

    pub fn target(&self) -> &MethodTarget {
        &self.target
    }

    pub fn http_method(&self) -> HttpMethod {
        self.target.http_method()
    }

    /// Docstring of the target method, if it exists and is documented
    pub fn docs(&self) -> Option<&'a str> {
        self.handler.method_docstring(&self.target.method_name())
    }

    pub fn marker_block(&self) -> MarkerBlock {
        MarkerBlock::parse(self.docs())
    }

    /// First line of the method docstring, or of the class description when the
    /// method is undocumented
    pub fn summary(&self) -> String {
        match self.docs() {
            Some(docs) => docstring::summary(docs),
            None => docstring::summary(&docstring::short_description(self.handler.docstring())),
        }
    }

    pub fn notes(&self) -> String {
        docstring::notes(self.handler.docstring(), self.docs())
    }

    pub fn operation_id(&self) -> String {
        self.handler.view_name().replace(' ', "_")
    }

    /// One required string parameter per `{name}` capture in the path
    pub fn path_parameters(&self) -> Vec<Parameter> {
        PATH_PARAM
            .captures_iter(self.path)
            .map(|caps| Parameter::path(&caps[1]))
            .collect()
    }

    /// Path, form/body and docstring parameters merged into one list
    pub fn parameters(&self) -> Vec<Parameter> {
        let mut params = self.path_parameters();

        if self.http_method().accepts_payload() {
            let extraction = fields::extract(self.handler);
            let payload: Vec<Parameter> = if extraction.form_params.is_empty() {
                extraction.body_param.into_iter().collect()
            } else {
                extraction.form_params
            };
            // a path capture keeps precedence over a payload field of the same name
            for param in payload {
                if params.iter().any(|p| p.name == param.name) {
                    debug!("Skipping payload parameter {} shadowed by the path", param.name);
                    continue;
                }
                params.push(param);
            }
        }

        let mut doc_text = self.docs().unwrap_or_default().to_string();
        doc_text.push('\n');
        doc_text.push_str(&docstring::view_description(self.handler.docstring()));

        merge_parameters(params, &docstring::inline_params(&doc_text))
    }

    /// Response type declared in the method's structured block, falling back to the
    /// serializer name
    pub fn response_type(&self) -> Option<String> {
        self.marker_block()
            .response_type()
            .map(str::to_string)
            .or_else(|| fields::serializer_name(self.handler))
    }

    pub fn build(&self) -> Operation {
        debug!(
            "Building operation {} {} ({})",
            self.http_method(),
            self.path,
            self.handler.name()
        );

        Operation {
            http_method: self.http_method(),
            operation_id: self.operation_id(),
            summary: self.summary(),
            notes: self.notes(),
            response_type: self.response_type(),
            parameters: self.parameters(),
        }
    }
}

/// Merge docstring parameters into an existing list. A docstring parameter naming an
/// existing one updates it in place; any other is appended.
pub fn merge_parameters(mut params: Vec<Parameter>, doc_params: &[InlineParam]) -> Vec<Parameter> {
    for doc in doc_params {
        match params.iter_mut().find(|p| p.name == doc.name) {
            Some(existing) => existing.apply(doc),
            None => params.push(Parameter::from(doc)),
        }
    }
    params
}
