use crate::collector::{DocumentationCollector, GeneratorConfig};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{debug, info};
use std::path::PathBuf;

/// Generate API documentation from the docstrings of a routed web application
#[derive(Parser, Debug)]
#[command(name = "docstr-swagger")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Directory holding the YAML route modules
    #[arg(value_name = "ROUTES_PATH")]
    pub routes_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Dotted name of the root route module
    #[arg(short = 'm', long = "module", value_name = "MODULE", default_value = "urls")]
    pub route_module: String,

    /// Namespace to leave out of the documentation (repeatable)
    #[arg(short = 'x', long = "exclude-namespace", value_name = "NAMESPACE")]
    pub exclude_namespaces: Vec<String>,

    /// Only document endpoints grouped under this top-level API
    #[arg(short = 'p', long = "filter-path", value_name = "API")]
    pub filter_path: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

impl CliArgs {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            route_module: Some(self.route_module.clone()),
            exclude_namespaces: self.exclude_namespaces.clone(),
            filter_path: self.filter_path.clone(),
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.routes_path.exists() {
        anyhow::bail!("Routes path does not exist: {}", args.routes_path.display());
    }

    if !args.routes_path.is_dir() {
        anyhow::bail!("Routes path is not a directory: {}", args.routes_path.display());
    }

    info!("Routes path: {}", args.routes_path.display());
    info!("Root module: {}", args.route_module);
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    if !args.exclude_namespaces.is_empty() {
        info!("Excluded namespaces: {}", args.exclude_namespaces.join(", "));
    }
    if let Some(ref filter) = args.filter_path {
        info!("Filter: {}", filter);
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    use crate::manifest::ManifestSource;
    use crate::serializer::{serialize_json, serialize_yaml, write_to_file};

    info!("Starting documentation generation...");

    // Step 1: Load route modules
    let source = ManifestSource::load_dir(&args.routes_path)?;
    let module_count = source.module_names().count();
    if module_count == 0 {
        anyhow::bail!("No route modules found in {}", args.routes_path.display());
    }

    // Step 2: Collect documentation
    let collector = DocumentationCollector::new(args.generator_config());
    let documentation = collector.generate(&source)?;

    if documentation.apis.is_empty() {
        log::warn!("No documented endpoints found");
    }

    // Step 3: Serialize to requested format
    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&documentation)?,
        OutputFormat::Json => serialize_json(&documentation)?,
    };

    // Step 4: Output to file or stdout
    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Route modules: {}", module_count);
    info!("  - Endpoints: {}", documentation.apis.len());
    info!("  - Operations: {}", documentation.operation_count());
    info!("  - Models: {}", documentation.models.len());
    let apis = documentation.top_level_apis();
    if !apis.is_empty() {
        info!("  - APIs: {}", apis.into_iter().collect::<Vec<_>>().join(", "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["docstr-swagger", "routes"]).unwrap();

        assert_eq!(args.routes_path, PathBuf::from("routes"));
        assert_eq!(args.route_module, "urls");
        assert!(matches!(args.output_format, OutputFormat::Yaml));
        assert!(args.exclude_namespaces.is_empty());
        assert_eq!(args.filter_path, None);
        assert!(!args.verbose);
    }

    #[test]
    fn test_generator_config_from_flags() {
        let args = CliArgs::try_parse_from([
            "docstr-swagger",
            "routes",
            "-f",
            "json",
            "-m",
            "project.urls",
            "-x",
            "admin",
            "--exclude-namespace",
            "internal",
            "-p",
            "users",
        ])
        .unwrap();

        assert!(matches!(args.output_format, OutputFormat::Json));
        let config = args.generator_config();
        assert_eq!(config.route_module.as_deref(), Some("project.urls"));
        assert_eq!(config.exclude_namespaces, vec!["admin", "internal"]);
        assert_eq!(config.filter_path.as_deref(), Some("users"));
    }

    #[test]
    fn test_rejects_missing_routes_path() {
        let args = CliArgs::try_parse_from(["docstr-swagger", "/nonexistent/routes"]).unwrap();
        let err = parse_args_from_parsed(args).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_rejects_file_as_routes_path() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("urls.yaml");
        fs::write(&file, "urlpatterns: []").unwrap();

        let args = CliArgs::try_parse_from(["docstr-swagger".into(), file.into_os_string()]).unwrap();
        let err = parse_args_from_parsed(args).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_run_writes_output_file() {
        let temp_dir = TempDir::new().unwrap();
        let routes = temp_dir.path().join("routes");
        fs::create_dir(&routes).unwrap();
        fs::write(
            routes.join("urls.yaml"),
            "urlpatterns:\n  - pattern: '^ping/$'\n    view: PingView\nviews:\n  PingView:\n    doc: Liveness probe.\n    methods:\n      get: Answer pong.\n",
        )
        .unwrap();
        let output = temp_dir.path().join("out/api.json");

        let args = CliArgs::try_parse_from([
            "docstr-swagger".into(),
            routes.into_os_string(),
            "-f".into(),
            "json".into(),
            "-o".into(),
            output.clone().into_os_string(),
        ])
        .unwrap();
        run(args).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["apis"][0]["path"], "/ping/");
        assert_eq!(written["apis"][0]["operations"][0]["summary"], "Answer pong.");
    }
}
