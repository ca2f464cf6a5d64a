//! YAML route modules.
//!
//! A routes directory holds one YAML file per route module. Each file may declare
//! `urlpatterns`, and the `views`, `serializers` and `models` those patterns refer to:
//!
//! ```yaml
//! module: api.urls
//! urlpatterns:
//!   - pattern: '^users/(?P<pk>\d+)/$'
//!     view: UserDetailView
//!   - pattern: '^accounts/$'
//!     instance: AccountViewSet
//!     actions: { get: list, post: create }
//!   - pattern: '^v2/'
//!     namespace: v2
//!     include: api.v2.urls
//! views:
//!   UserDetailView:
//!     doc: |
//!       A single user.
//!     methods:
//!       get: Fetch a user.
//!     serializer: UserSerializer
//! ```
//!
//! Names are resolved across every loaded module. [`ManifestSource`] turns the
//! modules into routing trees for the [`DocumentationCollector`](crate::collector::DocumentationCollector).

use crate::collector::RouteSource;
use crate::docstring;
use crate::error::{Error, Result};
use crate::handler::{
    ActionMap, Callback, FieldDefault, FieldDescriptor, FieldSpec, Handler, HandlerKind,
    HttpMethod, ModelType,
};
use crate::route_tree::RouteNode;
use crate::scanner::FileScanner;
use anyhow::Context;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Route module loaded when none is configured
pub const DEFAULT_ROUTE_MODULE: &str = "urls";

/// Top-level layout of a route module file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RouteModuleFile {
    /// Overrides the module name derived from the file path
    pub module: Option<String>,
    pub urlpatterns: Vec<PatternEntry>,
    pub views: BTreeMap<String, ViewDef>,
    pub serializers: BTreeMap<String, SerializerDef>,
    pub models: BTreeMap<String, ModelDef>,
}

/// One `urlpatterns` entry: a leaf when it names a callback, a resolver when it has
/// nested `urlpatterns` or an `include`.
#[derive(Debug, Clone, Deserialize)]
pub struct PatternEntry {
    pub pattern: String,
    pub view: Option<String>,
    pub instance: Option<String>,
    pub function: Option<String>,
    /// HTTP verb to action name, in declaration order
    pub actions: Option<Mapping>,
    pub namespace: Option<String>,
    pub urlpatterns: Option<Vec<PatternEntry>>,
    pub include: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewDef {
    /// Module the view type lives in; defaults to the declaring route module
    pub module: Option<String>,
    pub kind: HandlerKind,
    pub doc: Option<String>,
    pub display_name: Option<String>,
    /// Method name to docstring; a null docstring marks an undocumented method
    pub methods: BTreeMap<String, Option<String>>,
    /// Defaults to the methods named after HTTP verbs
    pub allowed_methods: Option<Vec<String>>,
    pub serializer: Option<String>,
    pub model: Option<String>,
    /// Marks the documentation system's own views
    pub documentation: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SerializerDef {
    /// Field name to [`FieldDef`], in declaration order
    pub fields: Mapping,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldDef {
    #[serde(rename = "type")]
    pub type_label: String,
    pub read_only: bool,
    pub max_length: Option<u64>,
    pub min_length: Option<u64>,
    pub help_text: Option<String>,
    pub default: Option<serde_json::Value>,
    pub required: Option<bool>,
}

impl Default for FieldDef {
    fn default() -> Self {
        Self {
            type_label: "string".to_string(),
            read_only: false,
            max_length: None,
            min_length: None,
            help_text: None,
            default: None,
            required: None,
        }
    }
}

impl From<FieldDef> for FieldSpec {
    fn from(def: FieldDef) -> Self {
        FieldSpec {
            type_label: def.type_label,
            read_only: def.read_only,
            max_length: def.max_length,
            min_length: def.min_length,
            help_text: def.help_text,
            default: def.default.map(FieldDefault::Value),
            required: def.required,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ModelDef {
    pub doc: Option<String>,
    /// Names of directly related models; absent when the model has no relation hook
    pub related: Option<Vec<String>>,
}

/// A parsed route module file.
#[derive(Debug, Clone)]
pub struct RouteModule {
    pub name: String,
    pub path: PathBuf,
    pub file: RouteModuleFile,
}

/// A route module file that could not be read or parsed.
#[derive(Debug, Clone)]
pub struct ModuleFailure {
    pub module: String,
    pub path: PathBuf,
    pub message: String,
}

/// Reads route module files.
pub struct ModuleParser;

impl ModuleParser {
    /// Parses one route module file. `module` is the name derived from its path and
    /// is overridden by the file's own `module` key.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid route module.
    pub fn parse_file(module: &str, path: &Path) -> anyhow::Result<RouteModule> {
        debug!("Parsing route module file: {}", path.display());

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        let file = parse_module(module, &content)
            .with_context(|| format!("Failed to parse route module in file: {}", path.display()))?;

        Ok(RouteModule {
            name: file.module.clone().unwrap_or_else(|| module.to_string()),
            path: path.to_path_buf(),
            file,
        })
    }

    /// Parses every file. Files that fail are logged and returned as failures
    /// instead of modules.
    pub fn parse_files(files: &[(String, PathBuf)]) -> (Vec<RouteModule>, Vec<ModuleFailure>) {
        let mut modules = Vec::new();
        let mut failures = Vec::new();

        for (module, path) in files {
            match Self::parse_file(module, path) {
                Ok(parsed) => modules.push(parsed),
                Err(e) => {
                    warn!("Skipping {}: {:#}", path.display(), e);
                    failures.push(ModuleFailure {
                        module: module.clone(),
                        path: path.clone(),
                        message: format!("{:#}", e),
                    });
                }
            }
        }

        debug!(
            "Parsing complete: {} succeeded, {} failed",
            modules.len(),
            failures.len()
        );
        (modules, failures)
    }
}

fn parse_module(module: &str, content: &str) -> Result<RouteModuleFile> {
    if content.trim().is_empty() {
        return Ok(RouteModuleFile::default());
    }
    serde_yaml::from_str(content).map_err(|e| import_error(module, e.to_string()))
}

fn import_error(module: &str, message: impl Into<String>) -> Error {
    Error::RouteImport {
        module: module.to_string(),
        message: message.into(),
    }
}

/// A handler declared in a route module.
pub struct ManifestView {
    name: String,
    module: String,
    def: ViewDef,
    allowed: Vec<HttpMethod>,
    serializer: Option<Arc<dyn FieldDescriptor>>,
    model: Option<Arc<dyn ModelType>>,
}

impl Handler for ManifestView {
    fn name(&self) -> &str {
        &self.name
    }

    fn module(&self) -> &str {
        &self.module
    }

    fn kind(&self) -> HandlerKind {
        self.def.kind
    }

    fn view_name(&self) -> String {
        match &self.def.display_name {
            Some(name) => name.clone(),
            None => docstring::view_name(&self.name),
        }
    }

    fn docstring(&self) -> Option<&str> {
        self.def.doc.as_deref()
    }

    fn method_docstring(&self, method: &str) -> Option<&str> {
        self.def.methods.get(method).and_then(Option::as_deref)
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
        self.def.documentation
    }
}

/// A serializer declared in a route module.
pub struct ManifestSerializer {
    name: String,
    fields: Vec<(String, FieldSpec)>,
}

impl FieldDescriptor for ManifestSerializer {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Vec<(String, FieldSpec)> {
        self.fields.clone()
    }
}

/// A model declared in a route module. Relations are looked up by name on demand, so
/// models may refer to each other cyclically.
pub struct ManifestModel {
    name: String,
    defs: Arc<BTreeMap<String, ModelDef>>,
}

impl ModelType for ManifestModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn docstring(&self) -> Option<&str> {
        self.defs.get(&self.name).and_then(|def| def.doc.as_deref())
    }

    fn related_models(&self) -> Option<Vec<Arc<dyn ModelType>>> {
        let related = self.defs.get(&self.name)?.related.as_ref()?;
        Some(
            related
                .iter()
                .map(|name| {
                    Arc::new(ManifestModel {
                        name: name.clone(),
                        defs: self.defs.clone(),
                    }) as Arc<dyn ModelType>
                })
                .collect(),
        )
    }
}

/// Route source backed by parsed YAML route modules.
pub struct ManifestSource {
    modules: BTreeMap<String, RouteModule>,
    views: HashMap<String, Arc<ManifestView>>,
    failures: BTreeMap<String, ModuleFailure>,
}

impl ManifestSource {
    /// Scans `root` for route module files and loads them.
    ///
    /// Files that cannot be read or parsed are skipped with a warning; loading a
    /// skipped module later reports the original parse error.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be scanned or the loaded modules
    /// refer to undeclared serializers, models or methods.
    pub fn load_dir(root: &Path) -> anyhow::Result<Self> {
        info!("Scanning route modules in {}", root.display());
        let scan = FileScanner::new(root.to_path_buf()).scan()?;
        for warning in &scan.warnings {
            warn!("{}", warning);
        }

        let files: Vec<(String, PathBuf)> = scan
            .route_files
            .into_iter()
            .map(|file| (file.module, file.path))
            .collect();
        let (modules, failures) = ModuleParser::parse_files(&files);
        info!("Loaded {} route modules", modules.len());

        let source = Self::from_modules(modules)
            .with_context(|| format!("Invalid route modules in {}", root.display()))?;
        Ok(source.with_failures(failures))
    }

    /// Builds a source from in-memory YAML documents, keyed by module name.
    pub fn from_documents(documents: &[(&str, &str)]) -> Result<Self> {
        let modules = documents
            .iter()
            .map(|(module, content)| -> Result<RouteModule> {
                let file = parse_module(module, content)?;
                Ok(RouteModule {
                    name: file.module.clone().unwrap_or_else(|| module.to_string()),
                    path: PathBuf::new(),
                    file,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_modules(modules)
    }

    /// Resolves the names declared across `modules` into handlers.
    pub fn from_modules(modules: Vec<RouteModule>) -> Result<Self> {
        let mut model_defs = BTreeMap::new();
        let mut serializer_defs = BTreeMap::new();
        let mut view_defs = BTreeMap::new();

        for module in &modules {
            for (name, def) in &module.file.models {
                if model_defs.insert(name.clone(), (module.name.clone(), def.clone())).is_some() {
                    warn!("Model {} redeclared in {}", name, module.name);
                }
            }
            for (name, def) in &module.file.serializers {
                if serializer_defs.insert(name.clone(), (module.name.clone(), def.clone())).is_some() {
                    warn!("Serializer {} redeclared in {}", name, module.name);
                }
            }
            for (name, def) in &module.file.views {
                if view_defs.insert(name.clone(), (module.name.clone(), def.clone())).is_some() {
                    warn!("View {} redeclared in {}", name, module.name);
                }
            }
        }

        for (name, (module, def)) in &model_defs {
            for related in def.related.iter().flatten() {
                if !model_defs.contains_key(related) {
                    return Err(import_error(
                        module,
                        format!("model {} relates to undeclared model {}", name, related),
                    ));
                }
            }
        }
        let model_defs: Arc<BTreeMap<String, ModelDef>> = Arc::new(
            model_defs
                .into_iter()
                .map(|(name, (_, def))| (name, def))
                .collect(),
        );

        let mut serializers: HashMap<String, Arc<ManifestSerializer>> = HashMap::new();
        for (name, (module, def)) in serializer_defs {
            let serializer = build_serializer(&module, name.clone(), def)?;
            serializers.insert(name, Arc::new(serializer));
        }

        let mut views = HashMap::new();
        for (name, (module, def)) in view_defs {
            let view = build_view(&module, name.clone(), def, &serializers, &model_defs)?;
            views.insert(name, Arc::new(view));
        }

        let modules = modules
            .into_iter()
            .map(|module| (module.name.clone(), module))
            .collect();

        Ok(Self {
            modules,
            views,
            failures: BTreeMap::new(),
        })
    }

    /// Records files that failed to load, so that importing them names the cause.
    pub fn with_failures(mut self, failures: Vec<ModuleFailure>) -> Self {
        self.failures
            .extend(failures.into_iter().map(|failure| (failure.module.clone(), failure)));
        self
    }

    /// Names of the loaded route modules
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn view(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.views
            .get(name)
            .map(|view| Arc::clone(view) as Arc<dyn Handler>)
    }

    fn build_module(&self, name: &str, stack: &mut Vec<String>) -> Result<Vec<RouteNode>> {
        if stack.iter().any(|included| included == name) {
            return Err(import_error(
                name,
                format!("include cycle {} -> {}", stack.join(" -> "), name),
            ));
        }
        let Some(module) = self.modules.get(name) else {
            return Err(self.missing_module(name));
        };

        stack.push(name.to_string());
        let nodes = self.build_nodes(name, &module.file.urlpatterns, stack);
        stack.pop();
        nodes
    }

    fn missing_module(&self, name: &str) -> Error {
        match self.failures.get(name) {
            Some(failure) => import_error(
                name,
                format!(
                    "{} could not be loaded: {}",
                    failure.path.display(),
                    failure.message
                ),
            ),
            None => import_error(name, "module not found"),
        }
    }

    fn build_nodes(
        &self,
        module: &str,
        entries: &[PatternEntry],
        stack: &mut Vec<String>,
    ) -> Result<Vec<RouteNode>> {
        entries
            .iter()
            .map(|entry| self.build_node(module, entry, stack))
            .collect()
    }

    fn build_node(
        &self,
        module: &str,
        entry: &PatternEntry,
        stack: &mut Vec<String>,
    ) -> Result<RouteNode> {
        let namespace = entry.namespace.as_deref();
        match (&entry.include, &entry.urlpatterns) {
            (Some(_), Some(_)) => Err(import_error(
                module,
                format!("pattern {} has both include and urlpatterns", entry.pattern),
            )),
            (Some(target), None) => {
                debug!("{} includes {}", module, target);
                let children = self.build_module(target, stack)?;
                Ok(RouteNode::resolver(&entry.pattern, namespace, children))
            }
            (None, Some(nested)) => {
                let children = self.build_nodes(module, nested, stack)?;
                Ok(RouteNode::resolver(&entry.pattern, namespace, children))
            }
            (None, None) => Ok(RouteNode::leaf(&entry.pattern, self.build_callback(module, entry)?)),
        }
    }

    fn build_callback(&self, module: &str, entry: &PatternEntry) -> Result<Callback> {
        let callback = match (&entry.view, &entry.instance, &entry.function) {
            (Some(name), None, None) => Callback::class(self.resolve_view(module, name)?),
            (None, Some(name), None) => Callback::instance(self.resolve_view(module, name)?),
            (None, None, Some(name)) => Callback::function(name.as_str()),
            _ => {
                return Err(import_error(
                    module,
                    format!(
                        "pattern {} must name exactly one of view, instance or function",
                        entry.pattern
                    ),
                ))
            }
        };

        match &entry.actions {
            Some(actions) => Ok(callback.with_actions(parse_actions(module, actions)?)),
            None => Ok(callback),
        }
    }

    fn resolve_view(&self, module: &str, name: &str) -> Result<Arc<dyn Handler>> {
        self.view(name)
            .ok_or_else(|| import_error(module, format!("unknown view {}", name)))
    }
}

impl RouteSource for ManifestSource {
    fn load(&self, module: Option<&str>) -> Result<Vec<RouteNode>> {
        let name = module.unwrap_or(DEFAULT_ROUTE_MODULE);
        let mut stack = Vec::new();
        let tree = self.build_module(name, &mut stack)?;
        debug!("Loaded {} top-level patterns from {}", tree.len(), name);
        Ok(tree)
    }
}

fn parse_actions(module: &str, actions: &Mapping) -> Result<ActionMap> {
    actions
        .iter()
        .map(|(verb, action)| -> Result<(HttpMethod, String)> {
            let verb = verb.as_str().and_then(HttpMethod::parse).ok_or_else(|| {
                import_error(module, format!("invalid HTTP method in actions: {:?}", verb))
            })?;
            let action = action.as_str().ok_or_else(|| {
                import_error(module, format!("action bound to {} must be a string", verb))
            })?;
            Ok((verb, action.to_string()))
        })
        .collect()
}

fn build_serializer(module: &str, name: String, def: SerializerDef) -> Result<ManifestSerializer> {
    let mut fields = Vec::with_capacity(def.fields.len());
    for (field, value) in def.fields {
        let Some(field_name) = field.as_str() else {
            return Err(import_error(
                module,
                format!("serializer {} has a non-string field name", name),
            ));
        };
        let field_def: FieldDef = match value {
            Value::Null => FieldDef::default(),
            Value::String(type_label) => FieldDef {
                type_label,
                ..FieldDef::default()
            },
            other => serde_yaml::from_value(other).map_err(|e| {
                import_error(module, format!("field {}.{}: {}", name, field_name, e))
            })?,
        };
        fields.push((field_name.to_string(), field_def.into()));
    }

    Ok(ManifestSerializer { name, fields })
}

fn build_view(
    module: &str,
    name: String,
    def: ViewDef,
    serializers: &HashMap<String, Arc<ManifestSerializer>>,
    models: &Arc<BTreeMap<String, ModelDef>>,
) -> Result<ManifestView> {
    let allowed = match &def.allowed_methods {
        Some(methods) => methods
            .iter()
            .map(|method| {
                HttpMethod::parse(method).ok_or_else(|| {
                    import_error(module, format!("view {} allows unknown method {}", name, method))
                })
            })
            .collect::<Result<Vec<_>>>()?,
        None => HttpMethod::ALL
            .into_iter()
            .filter(|method| def.methods.contains_key(&method.as_str().to_ascii_lowercase()))
            .collect(),
    };

    let serializer = match &def.serializer {
        Some(serializer) => Some(serializers.get(serializer).cloned().ok_or_else(|| {
            import_error(module, format!("view {} uses unknown serializer {}", name, serializer))
        })? as Arc<dyn FieldDescriptor>),
        None => None,
    };

    let model = match &def.model {
        Some(model) if models.contains_key(model) => Some(Arc::new(ManifestModel {
            name: model.clone(),
            defs: models.clone(),
        }) as Arc<dyn ModelType>),
        Some(model) => {
            return Err(import_error(
                module,
                format!("view {} uses unknown model {}", name, model),
            ))
        }
        None => None,
    };

    Ok(ManifestView {
        module: def.module.clone().unwrap_or_else(|| module.to_string()),
        name,
        def,
        allowed,
        serializer,
        model,
    })
}
