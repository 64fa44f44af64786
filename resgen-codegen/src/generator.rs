//! Run-level generation over every selected package.

use crate::category::Category;
use crate::error::CodegenError;
use crate::fields::{ObjectRef, Vocabulary};
use crate::generate::MethodWriter;
use crate::matcher::ObjectMatcher;
use crate::method::MethodSet;
use crate::sink::OutputSink;
use resgen_schema::{LoadedPackages, Package, TypeGraph};
use std::path::{Path, PathBuf};

/// Output filename per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filenames {
    /// Managed resources.
    pub managed: String,
    /// Managed resource lists.
    pub managed_list: String,
    /// Target configs.
    pub target_config: String,
    /// Target config usages.
    pub target_config_usage: String,
    /// Target config usage lists.
    pub target_config_usage_list: String,
}

impl Filenames {
    /// Returns the filename for a category.
    #[must_use]
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::Managed => &self.managed,
            Category::ManagedList => &self.managed_list,
            Category::TargetConfig => &self.target_config,
            Category::TargetConfigUsage => &self.target_config_usage,
            Category::TargetConfigUsageList => &self.target_config_usage_list,
        }
    }
}

impl Default for Filenames {
    fn default() -> Self {
        Self {
            managed: Category::Managed.default_filename().to_string(),
            managed_list: Category::ManagedList.default_filename().to_string(),
            target_config: Category::TargetConfig.default_filename().to_string(),
            target_config_usage: Category::TargetConfigUsage.default_filename().to_string(),
            target_config_usage_list: Category::TargetConfigUsageList.default_filename().to_string(),
        }
    }
}

/// Generator configuration.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Header text placed at the top of every file.
    pub header: String,
    /// Output filenames.
    pub filenames: Filenames,
    /// Framework type names the recognizers look for.
    pub vocabulary: Vocabulary,
    /// Fail instead of warning when a declaration matches several categories.
    pub strict: bool,
}

/// One category, ready to write.
#[derive(Debug)]
struct CategoryWriter {
    category: Category,
    filename: String,
    matcher: ObjectMatcher,
    methods: MethodSet,
    writer: MethodWriter,
}

/// Files written by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Destination paths, in write order.
    pub written: Vec<PathBuf>,
}

/// Generates method sets for every category.
#[derive(Debug)]
pub struct Generator {
    strict: bool,
    categories: Vec<CategoryWriter>,
}

impl Generator {
    /// Creates a generator, building every category's method set.
    ///
    /// # Errors
    /// Returns `CodegenError::DuplicateMethod` if a method set is invalid.
    pub fn new(config: GeneratorConfig) -> Result<Self, CodegenError> {
        let categories = Category::ALL
            .into_iter()
            .map(|category| -> Result<CategoryWriter, CodegenError> {
                let matcher = category.matcher(&config.vocabulary);
                Ok(CategoryWriter {
                    category,
                    filename: config.filenames.get(category).to_string(),
                    writer: MethodWriter::new(matcher.clone())
                        .with_header(config.header.clone())
                        .with_import_aliases(category.import_aliases()),
                    matcher,
                    methods: category.method_set()?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            strict: config.strict,
            categories,
        })
    }

    /// Generates every category for every selected package.
    ///
    /// Stops at the first error.
    ///
    /// # Errors
    /// Returns `CodegenError::CategoryOverlap` in strict mode, or
    /// `CodegenError::Write` if a file cannot be written.
    pub fn generate(
        &self,
        loaded: &LoadedPackages,
        sink: &mut dyn OutputSink,
    ) -> Result<GenerationReport, CodegenError> {
        let mut report = GenerationReport::default();
        for pkg in loaded.selected_packages() {
            self.generate_package(&loaded.graph, pkg, sink, &mut report)?;
        }
        tracing::info!("generated {} file(s)", report.written.len());
        Ok(report)
    }

    fn generate_package(
        &self,
        graph: &TypeGraph,
        pkg: &Package,
        sink: &mut dyn OutputSink,
        report: &mut GenerationReport,
    ) -> Result<(), CodegenError> {
        self.check_overlap(graph, pkg)?;

        for c in &self.categories {
            let path = pkg.dir.join(&c.filename);
            let written = c
                .writer
                .write(graph, pkg, &c.methods, &path, sink)
                .map_err(|source| CodegenError::Write {
                    category: c.category.name().to_string(),
                    package: pkg.path.clone(),
                    path: path.clone(),
                    source,
                })?;
            if written {
                tracing::debug!("{}: wrote {} methods to {}", pkg.path, c.category, path.display());
                report.written.push(path);
            }
        }
        Ok(())
    }

    /// Reports declarations matching more than one category.
    fn check_overlap(&self, graph: &TypeGraph, pkg: &Package) -> Result<(), CodegenError> {
        for decl in pkg.exported_declarations() {
            let obj = ObjectRef::new(decl, graph);
            let categories: Vec<String> = self
                .categories
                .iter()
                .filter(|c| c.matcher.matches(obj))
                .map(|c| c.category.name().to_string())
                .collect();
            if categories.len() < 2 {
                continue;
            }

            let declaration = decl.qualified_name().to_string();
            if self.strict {
                return Err(CodegenError::CategoryOverlap {
                    declaration,
                    categories,
                });
            }
            tracing::warn!(
                "{} matches more than one category: {}",
                declaration,
                categories.join(", ")
            );
        }
        Ok(())
    }
}

/// Reads the header file, or returns an empty header when none is
/// configured.
///
/// # Errors
/// Returns `CodegenError::Header` if the file cannot be read.
pub fn read_header(path: Option<&Path>) -> Result<String, CodegenError> {
    match path {
        None => Ok(String::new()),
        Some(path) => std::fs::read_to_string(path).map_err(|source| CodegenError::Header {
            path: path.to_path_buf(),
            source,
        }),
    }
}
