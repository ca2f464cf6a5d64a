//! docstr-swagger - API documentation from routing trees and handler docstrings.
//!
//! This library walks a URL routing tree, finds every endpoint backed by a handler and
//! reads the handler's docstrings to produce Swagger-style operation descriptions:
//! summaries, notes, parameters declared in the docstring text, form and body
//! parameters derived from the handler's serializer, and the data models it references.
//!
//! # Architecture
//!
//! 1. [`handler`] - Capability interfaces a framework exposes for its handlers
//! 2. [`docstring`] and [`marker_block`] - Docstring annotation parsing
//! 3. [`fields`] - Form and body parameters from serializer fields
//! 4. [`introspector`] - Per-handler and per-method operation building
//! 5. [`route_tree`] - Routing tree flattening and path simplification
//! 6. [`model_resolver`] - Transitive model documentation
//! 7. [`collector`] - The complete documentation object
//! 8. [`scanner`] and [`manifest`] - YAML route modules as a route source
//! 9. [`serializer`] - YAML or JSON output
//!
//! # Example Usage
//!
//! ```no_run
//! use docstr_swagger::{
//!     collector::{DocumentationCollector, GeneratorConfig},
//!     manifest::ManifestSource,
//!     serializer::serialize_yaml,
//! };
//! use std::path::Path;
//!
//! let source = ManifestSource::load_dir(Path::new("./routes")).unwrap();
//! let collector = DocumentationCollector::new(GeneratorConfig {
//!     exclude_namespaces: vec!["admin".to_string()],
//!     ..Default::default()
//! });
//! let documentation = collector.generate(&source).unwrap();
//! println!("{}", serialize_yaml(&documentation).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod collector;
pub mod docstring;
pub mod error;
pub mod fields;
pub mod handler;
pub mod introspector;
pub mod manifest;
pub mod marker_block;
pub mod model_resolver;
pub mod operation;
pub mod route_tree;
pub mod scanner;
pub mod serializer;

#[cfg(test)]
mod test_support;
