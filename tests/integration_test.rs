use docstr_swagger::{
    collector::{ApiDoc, ApiDocumentation, DocumentationCollector, GeneratorConfig},
    error::Error,
    handler::HttpMethod,
    manifest::ManifestSource,
    operation::{Operation, ParamLocation, ValueKind},
    serializer::{serialize_json, serialize_yaml},
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const SHOP_URLS: &str = include_str!("fixtures/shop/urls.yaml");
const SHOP_API_URLS: &str = include_str!("fixtures/shop/api/urls.yaml");

/// Helper function to create a temporary routes directory
fn create_routes_dir(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write route module");
    }

    temp_dir
}

fn shop_dir() -> TempDir {
    create_routes_dir(vec![("urls.yaml", SHOP_URLS), ("api/urls.yaml", SHOP_API_URLS)])
}

fn generate(config: GeneratorConfig) -> ApiDocumentation {
    let temp_dir = shop_dir();
    let source = ManifestSource::load_dir(temp_dir.path()).expect("Failed to load route modules");
    DocumentationCollector::new(config)
        .generate(&source)
        .expect("Failed to generate documentation")
}

fn api<'a>(docs: &'a ApiDocumentation, path: &str) -> &'a ApiDoc {
    docs.apis
        .iter()
        .find(|api| api.path == path)
        .unwrap_or_else(|| panic!("no endpoint documented at {}", path))
}

fn operation(api: &ApiDoc, method: HttpMethod) -> &Operation {
    api.operations
        .iter()
        .find(|op| op.http_method == method)
        .unwrap_or_else(|| panic!("no {} operation at {}", method, api.path))
}

fn param_names(op: &Operation) -> Vec<&str> {
    op.parameters.iter().map(|p| p.name.as_str()).collect()
}

#[test]
fn test_shop_end_to_end_generation() {
    let docs = generate(GeneratorConfig::default());

    let paths: Vec<_> = docs.apis.iter().map(|api| api.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["/api/users/", "/api/users/{pk}/", "/api/accounts/", "/admin/audit/"],
        "router root, documentation views, plain functions and format suffixes are skipped"
    );

    assert_eq!(
        docs.top_level_apis().into_iter().collect::<Vec<_>>(),
        vec!["accounts".to_string(), "users".to_string()]
    );
    assert_eq!(
        docs.models.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["Account", "Group", "User"]
    );
}

#[test]
fn test_simple_handler_operations() {
    let docs = generate(GeneratorConfig::default());
    let users = api(&docs, "/api/users/");

    assert_eq!(users.description, "Users of the shop");
    assert_eq!(users.api.as_deref(), Some("users"));

    let list = operation(users, HttpMethod::Get);
    assert_eq!(list.summary, "Page through users.");
    assert_eq!(list.operation_id, "User_List");
    assert_eq!(list.response_type.as_deref(), Some("UserSerializer"));
    assert_eq!(param_names(list), vec!["page", "ordering"]);
    assert_eq!(list.parameters[0].data_type, "integer");
    assert_eq!(list.parameters[0].location, ParamLocation::Query);
    assert_eq!(list.parameters[1].description.as_deref(), Some("Sort key"));
    assert!(list.notes.starts_with("Users of the shop."));
    assert!(!list.notes.contains("ordering"));
    assert!(!list.notes.contains("api:"));

    let create = operation(users, HttpMethod::Post);
    assert_eq!(create.response_type.as_deref(), Some("UserSummary"));
    assert_eq!(param_names(create), vec!["username", "email", "ordering"]);

    let username = &create.parameters[0];
    assert_eq!(username.location, ParamLocation::Form);
    assert_eq!(username.data_type, "string");
    assert_eq!(username.description.as_deref(), Some("Login name"));
    let range = username.allowed_values.as_ref().expect("max_length yields a range");
    assert_eq!(range.kind, ValueKind::Range);
    assert_eq!(range.max, Some(30));
    assert_eq!(create.parameters[1].data_type, "email");
}

#[test]
fn test_hidden_method_and_path_parameters() {
    let docs = generate(GeneratorConfig::default());
    let detail = api(&docs, "/api/users/{pk}/");

    assert_eq!(detail.operations.len(), 1, "DELETE is hidden");
    let fetch = operation(detail, HttpMethod::Get);
    assert_eq!(fetch.summary, "Fetch a user.");
    assert_eq!(param_names(fetch), vec!["pk"]);
    assert_eq!(fetch.parameters[0].required, Some(true));
    assert_eq!(fetch.parameters[0].location, ParamLocation::Path);
}

#[test]
fn test_dispatch_handler_operations() {
    let docs = generate(GeneratorConfig::default());
    let accounts = api(&docs, "/api/accounts/");

    let methods: Vec<_> = accounts.operations.iter().map(|op| op.http_method).collect();
    assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Post]);

    let list = operation(accounts, HttpMethod::Get);
    assert_eq!(list.summary, "List accounts.");
    assert_eq!(list.operation_id, "Account");
    assert!(list.parameters.is_empty());

    let create = operation(accounts, HttpMethod::Post);
    assert_eq!(param_names(create), vec!["AccountSerializer", "currency"]);
    assert_eq!(create.parameters[0].location, ParamLocation::Body);
    assert_eq!(create.parameters[1].location, ParamLocation::Form);
    assert_eq!(create.parameters[1].required, Some(true));
    assert_eq!(create.parameters[1].description.as_deref(), Some("ISO code"));
}

#[test]
fn test_namespace_exclusion() {
    let docs = generate(GeneratorConfig {
        exclude_namespaces: vec!["admin".to_string()],
        ..Default::default()
    });
    assert_eq!(docs.apis.len(), 3);
    assert!(docs.apis.iter().all(|api| !api.path.starts_with("/admin/")));
}

#[test]
fn test_filter_path() {
    let docs = generate(GeneratorConfig {
        filter_path: Some("users".to_string()),
        ..Default::default()
    });

    let paths: Vec<_> = docs.apis.iter().map(|api| api.path.as_str()).collect();
    assert_eq!(paths, vec!["/api/users/", "/api/users/{pk}/"]);
    assert_eq!(
        docs.models.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["Group", "User"]
    );

    let user = &docs.models["User"];
    assert_eq!(user.description.as_deref(), Some("A registered user."));
    assert_eq!(user.properties.len(), 2);
}

#[test]
fn test_non_default_root_module() {
    let docs = generate(GeneratorConfig {
        route_module: Some("api.urls".to_string()),
        ..Default::default()
    });

    let paths: Vec<_> = docs.apis.iter().map(|api| api.path.as_str()).collect();
    assert_eq!(paths, vec!["/users/", "/users/{pk}/", "/accounts/"]);
}

#[test]
fn test_yaml_serialization_format() {
    let docs = generate(GeneratorConfig::default());
    let yaml = serialize_yaml(&docs).expect("Failed to serialize to YAML");

    let value: serde_yaml::Value = serde_yaml::from_str(&yaml).expect("Output should be valid YAML");
    assert_eq!(value["apis"][0]["path"], "/api/users/");
    assert_eq!(value["apis"][0]["operations"][0]["httpMethod"], "GET");
    assert_eq!(value["models"]["Account"]["description"], "A customer account.");
}

#[test]
fn test_json_serialization_format() {
    let docs = generate(GeneratorConfig::default());
    let json = serialize_json(&docs).expect("Failed to serialize to JSON");

    let value: serde_json::Value = serde_json::from_str(&json).expect("Output should be valid JSON");
    let post = &value["apis"][0]["operations"][1];
    assert_eq!(post["httpMethod"], "POST");
    assert_eq!(post["nickname"], "User_List");
    assert_eq!(post["type"], "UserSummary");
    assert_eq!(post["parameters"][0]["paramType"], "form");
    assert_eq!(post["parameters"][0]["allowableValues"]["valueType"], "RANGE");
    assert_eq!(post["parameters"][0]["allowableValues"]["max"], 30);
}

#[test]
fn test_missing_root_module() {
    let temp_dir = shop_dir();
    let source = ManifestSource::load_dir(temp_dir.path()).unwrap();
    let config = GeneratorConfig {
        route_module: Some("project.urls".to_string()),
        ..Default::default()
    };

    match DocumentationCollector::new(config).generate(&source) {
        Err(Error::RouteImport { module, .. }) => assert_eq!(module, "project.urls"),
        other => panic!("expected a route import error, got {:?}", other),
    }
}

#[test]
fn test_dispatch_handler_without_action_map() {
    let urls = "\
urlpatterns:
  - pattern: '^accounts/$'
    view: AccountViewSet
views:
  AccountViewSet:
    kind: dispatch
    methods:
      list: List accounts.
";
    let temp_dir = create_routes_dir(vec![("urls.yaml", urls)]);
    let source = ManifestSource::load_dir(temp_dir.path()).unwrap();

    match DocumentationCollector::new(GeneratorConfig::default()).generate(&source) {
        Err(Error::UnsupportedHandler { handler, path }) => {
            assert_eq!(handler, "AccountViewSet");
            assert_eq!(path, "/accounts/");
        }
        other => panic!("expected an unsupported handler error, got {:?}", other),
    }
}

#[test]
fn test_look_around_leaf_pattern_is_still_documented() {
    let urls = "\
urlpatterns:
  - pattern: '^(?!admin/)(?P<slug>[\\w-]+)/$'
    view: PageView
  - pattern: '^users/$'
    view: UserView
views:
  PageView:
    methods:
      get: Render a page.
  UserView:
    methods:
      get: List users.
";
    let temp_dir = create_routes_dir(vec![("urls.yaml", urls)]);
    let source = ManifestSource::load_dir(temp_dir.path()).unwrap();

    let docs = DocumentationCollector::new(GeneratorConfig::default())
        .generate(&source)
        .expect("look-around patterns must not abort generation");

    let paths: Vec<_> = docs.apis.iter().map(|api| api.path.as_str()).collect();
    assert_eq!(paths, vec!["/{var}{slug}/", "/users/"]);
    assert_eq!(operation(&docs.apis[0], HttpMethod::Get).summary, "Render a page.");
}

#[test]
fn test_unparsable_root_module_names_the_cause() {
    let temp_dir = create_routes_dir(vec![(
        "urls.yaml",
        "urlpatterns:\n  - pattern: '^users/$'\n    view: [unclosed\n",
    )]);
    let source = ManifestSource::load_dir(temp_dir.path()).unwrap();

    match DocumentationCollector::new(GeneratorConfig::default()).generate(&source) {
        Err(err @ Error::RouteImport { .. }) => {
            let message = err.to_string();
            assert!(message.contains("urls.yaml could not be loaded"), "{}", message);
            assert!(!message.contains("module not found"), "{}", message);
        }
        other => panic!("expected a route import error, got {:?}", other),
    }
}

#[test]
fn test_empty_routes_directory() {
    let temp_dir = create_routes_dir(vec![]);
    let source = ManifestSource::load_dir(temp_dir.path()).unwrap();

    assert_eq!(source.module_names().count(), 0);
    let result = DocumentationCollector::new(GeneratorConfig::default()).generate(&source);
    assert!(matches!(result, Err(Error::RouteImport { .. })));
}
