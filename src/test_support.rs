//! In-memory handlers, serializers and models shared by unit tests.

use crate::handler::{
    FieldDescriptor, FieldSpec, Handler, HandlerKind, HttpMethod, ModelType,
};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct StubHandler {
    pub name: String,
    pub module: String,
    pub kind: HandlerKind,
    pub doc: Option<String>,
    pub method_docs: HashMap<String, String>,
    pub allowed: Vec<HttpMethod>,
    pub serializer: Option<Arc<dyn FieldDescriptor>>,
    pub model: Option<Arc<dyn ModelType>>,
    pub documentation_view: bool,
}

impl StubHandler {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            module: "app.views".to_string(),
            ..Self::default()
        }
    }

    pub fn doc(mut self, doc: &str) -> Self {
        self.doc = Some(doc.to_string());
        self
    }

    pub fn method(mut self, name: &str, doc: &str) -> Self {
        self.method_docs.insert(name.to_string(), doc.to_string());
        self
    }

    pub fn allow(mut self, methods: &[HttpMethod]) -> Self {
        self.allowed = methods.to_vec();
        self
    }

    pub fn dispatch(mut self) -> Self {
        self.kind = HandlerKind::Dispatch;
        self
    }

    pub fn module(mut self, module: &str) -> Self {
        self.module = module.to_string();
        self
    }

    pub fn serializer(mut self, serializer: Arc<dyn FieldDescriptor>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    pub fn model(mut self, model: Arc<dyn ModelType>) -> Self {
        self.model = Some(model);
        self
    }

    pub fn documentation_view(mut self) -> Self {
        self.documentation_view = true;
        self
    }

    pub fn shared(self) -> Arc<dyn Handler> {
        Arc::new(self)
    }
}

impl Handler for StubHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn module(&self) -> &str {
        &self.module
    }

    fn kind(&self) -> HandlerKind {
        self.kind
    }

    fn docstring(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn method_docstring(&self, method: &str) -> Option<&str> {
        self.method_docs.get(method).map(String::as_str)
    }

    fn allowed_methods(&self) -> Vec<HttpMethod> {
        self.allowed.clone()
    }

    fn serializer(&self) -> Option<Arc<dyn FieldDescriptor>> {
        self.serializer.clone()
    }

    fn model(&self) -> Option<Arc<dyn ModelType>> {
        self.model.clone()
    }

    fn is_documentation_view(&self) -> bool {
        self.documentation_view
    }
}

pub struct StubSerializer {
    pub name: String,
    pub fields: Vec<(String, FieldSpec)>,
}

impl StubSerializer {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, spec: FieldSpec) -> Self {
        self.fields.push((name.to_string(), spec));
        self
    }
}

impl FieldDescriptor for StubSerializer {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Vec<(String, FieldSpec)> {
        self.fields.clone()
    }
}

pub struct StubModel {
    pub name: String,
    pub doc: Option<String>,
    pub related: Option<Vec<Arc<dyn ModelType>>>,
}

impl StubModel {
    pub fn new(name: &str, doc: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            doc: doc.map(str::to_string),
            related: None,
        }
    }

    pub fn related(mut self, related: Vec<Arc<dyn ModelType>>) -> Self {
        self.related = Some(related);
        self
    }

    pub fn shared(self) -> Arc<dyn ModelType> {
        Arc::new(self)
    }
}

impl ModelType for StubModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn docstring(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    fn related_models(&self) -> Option<Vec<Arc<dyn ModelType>>> {
        self.related.clone()
    }
}
