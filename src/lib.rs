//! idoc-gen - API documentation from a web application's route table.
//!
//! Route metadata is normalized into [`route::RouteRecord`]s and rendered into a
//! Markdown document (plus an HTML site), a Postman collection and an OpenAPI 3.0
//! document. Each route occupies a marked fragment of the Markdown, which lets a
//! later run keep fragments that were edited by hand.
//!
//! # Architecture
//!
//! 1. [`source`] - `RouteSource` adapters (manifest files, external command) and route rules
//! 2. [`scanner`] - Finds route manifest files in a directory
//! 3. [`normalizer`] - Turns raw routes into grouped [`route::RouteRecord`]s
//! 4. [`markdown`] - Renders route fragments and assembles the document
//! 5. [`samples`] - Example request snippets per language
//! 6. [`merge`] - Detects manual edits against the previous baseline
//! 7. [`postman`] - Postman collection encoder
//! 8. [`schema_generator`] / [`openapi_builder`] - OpenAPI 3.0 encoder
//! 9. [`site`] - HTML output and the interactive viewer
//! 10. [`serializer`] - JSON serialization and atomic writes
//! 11. [`pipeline`] - Runs all of the above for one configuration
//!
//! # Example Usage
//!
//! ```no_run
//! use idoc_gen::{config::DocConfig, pipeline::Generator, source};
//! use std::path::Path;
//!
//! let config = DocConfig::load(Path::new("idoc.yaml")).unwrap();
//! let routes = source::from_config(&config);
//! let report = Generator::new(&config, false).run(routes.as_ref()).unwrap();
//! println!("{} routes, {} kept edits", report.route_count(), report.preserved().len());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod error;
pub mod markdown;
pub mod merge;
pub mod normalizer;
pub mod openapi_builder;
pub mod pipeline;
pub mod postman;
pub mod route;
pub mod samples;
pub mod scanner;
pub mod schema_generator;
pub mod serializer;
pub mod site;
pub mod source;
