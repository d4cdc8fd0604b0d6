//! Build orchestration.
//!
//! [`Site`] runs the pipeline end to end:
//!
//! 1. create one raw page per content document
//! 2. convert frontmatter and bodies, dropping unpublished and broken documents
//! 3. run the generator passes, merging each pass into the collection
//! 4. assemble menus and resolve a layout per page ([`Site::plan`])
//! 5. render, write and copy static files ([`Site::build`])

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quire_config::{Config, MissingLayoutPolicy};
use quire_storage::{FsStorage, Storage, StorageError};
use quire_templates::{TemplateError, TemplateRenderer, Templates};
use serde_json::{Value, json};

use crate::collection::PageCollection;
use crate::content::{Converted, convert_page, create_page};
use crate::generator::{Alias, GeneratorPipeline, Homepage, Pagination, Section, Taxonomy};
use crate::layout::{self, FsProbe, LayoutError, TemplateProbe};
use crate::menu::{Menus, assemble_menus};
use crate::page::{NodeType, pages_value};
use crate::progress::{Progress, ProgressFn, Step};

/// Build error.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Content directory does not exist.
    #[error("Content directory not found: {}", .0.display())]
    MissingContentDir(PathBuf),
    /// No layout search path exists.
    #[error("No layouts directory found (looked in: {})", display_paths(.0))]
    MissingLayouts(Vec<PathBuf>),
    /// Configured theme does not exist.
    #[error("Theme directory not found: {}", .0.display())]
    MissingTheme(PathBuf),
    /// Content source failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// No layout for a page (abort policy).
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// Template rendering failed.
    #[error("Failed to render page '{page_id}': {source}")]
    Render {
        page_id: String,
        #[source]
        source: TemplateError,
    },
    /// Output could not be written.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Render context could not be serialized.
    #[error("Failed to build render context: {0}")]
    Context(#[from] serde_json::Error),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A document removed from the build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// A page left out because no layout exists for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPage {
    pub page_id: String,
    pub error: LayoutError,
}

/// One page ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPage {
    pub page_id: String,
    /// Template name relative to the search paths.
    pub template: String,
    /// Render context: `{page, site, quire}`.
    pub context: Value,
    /// Output file path relative to the output directory.
    pub output_path: PathBuf,
}

/// Loaded pages and the documents dropped along the way.
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub pages: PageCollection,
    pub dropped: Vec<DroppedDocument>,
}

/// Everything needed to render, without side effects.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub pages: PageCollection,
    pub menus: Menus,
    pub renders: Vec<PlannedPage>,
    pub skipped: Vec<SkippedPage>,
    pub dropped: Vec<DroppedDocument>,
}

/// Outcome of a build.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Written files, relative to the output directory.
    pub written: Vec<PathBuf>,
    /// Static files copied.
    pub static_files: usize,
    pub skipped: Vec<SkippedPage>,
    pub dropped: Vec<DroppedDocument>,
}

/// A site build over one configuration snapshot.
pub struct Site {
    config: Config,
    storage: Arc<dyn Storage>,
    extra_passes: Vec<GeneratorPipeline>,
}

impl Site {
    /// Create a site over an explicit content source.
    ///
    /// Structural checks are skipped; use [`Site::open`] for a filesystem site.
    #[must_use]
    pub fn new(config: Config, storage: Arc<dyn Storage>) -> Self {
        Self {
            config,
            storage,
            extra_passes: Vec::new(),
        }
    }

    /// Open a filesystem site after checking its directory structure.
    ///
    /// # Errors
    ///
    /// Returns a structural [`BuildError`] if the content directory, the
    /// theme, or every layouts directory is missing.
    pub fn open(config: Config) -> Result<Self, BuildError> {
        check_structure(&config)?;
        let storage = FsStorage::with_extensions(
            config.paths.content_dir.clone(),
            config.content.ext.clone(),
        );
        Ok(Self::new(config, Arc::new(storage)))
    }

    /// Append a generator pass that runs after the built-in ones.
    #[must_use]
    pub fn with_pass(mut self, pipeline: GeneratorPipeline) -> Self {
        self.extra_passes.push(pipeline);
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Built-in generator passes in execution order.
    fn passes(&self) -> Vec<GeneratorPipeline> {
        let site = &self.config.site;
        vec![
            GeneratorPipeline::new()
                .with(0, Section)
                .with(10, Alias)
                .with(20, Taxonomy::new(site.taxonomies.clone(), site.terms_sort))
                .with(30, Homepage),
            GeneratorPipeline::new().with(0, Pagination::new(site.paginate.clone())),
            GeneratorPipeline::new().with(0, Alias),
        ]
    }

    /// Create, convert and generate every page.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Storage`] if the content source cannot be scanned.
    pub fn load(&self, progress: &mut ProgressFn<'_>) -> Result<Loaded, BuildError> {
        let mut loaded = self.create_pages(progress)?;
        self.convert_pages(&mut loaded, progress);

        for pipeline in self.passes().iter().chain(&self.extra_passes) {
            let generated = pipeline.run(&loaded.pages, progress);
            loaded.pages.merge(generated);
        }

        tracing::info!(
            pages = loaded.pages.len(),
            dropped = loaded.dropped.len(),
            "Site loaded"
        );
        Ok(loaded)
    }

    fn create_pages(&self, progress: &mut ProgressFn<'_>) -> Result<Loaded, BuildError> {
        let documents = self.storage.scan()?;
        let total = documents.len();
        tracing::debug!(documents = total, "Content scanned");

        let mut loaded = Loaded::default();
        for (i, document) in documents.into_iter().enumerate() {
            progress(
                &Progress::new(Step::Create, document.path.display().to_string())
                    .with_count(i + 1, total),
            );
            let raw = match self.storage.read(&document.path) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(path = %document.path.display(), error = %e, "Failed to read document");
                    loaded.dropped.push(DroppedDocument {
                        path: document.path,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };
            let page = create_page(&document.path, &raw);
            if let Err(e) = loaded.pages.add(page) {
                tracing::warn!(path = %document.path.display(), error = %e, "Skipping document");
                loaded.dropped.push(DroppedDocument {
                    path: document.path,
                    reason: e.to_string(),
                });
            }
        }
        Ok(loaded)
    }

    fn convert_pages(&self, loaded: &mut Loaded, progress: &mut ProgressFn<'_>) {
        let format = self.config.frontmatter.format;
        let drafts = self.config.drafts;
        let raw_pages: Vec<_> = loaded.pages.iter().cloned().collect();
        let total = raw_pages.len();

        for (i, page) in raw_pages.into_iter().enumerate() {
            let path = page.source_path.clone().unwrap_or_default();
            match convert_page(&page, format, drafts) {
                Ok(Converted::Published(converted)) => {
                    progress(
                        &Progress::new(Step::Convert, page.id.clone()).with_count(i + 1, total),
                    );
                    loaded.pages.replace(&page.id, converted);
                }
                Ok(Converted::Unpublished(_)) => {
                    tracing::debug!(page = %page.id, "Skipping unpublished page");
                    loaded.pages.remove(&page.id);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Dropping document");
                    progress(
                        &Progress::new(Step::Convert, format!("{}: {e}", path.display()))
                            .with_count(i + 1, total)
                            .failed(),
                    );
                    loaded.pages.remove(&page.id);
                    loaded.dropped.push(DroppedDocument {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    /// Load the site and resolve a layout and context for every page.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if loading fails, or a layout is missing under
    /// the `abort` policy.
    pub fn plan(&self, progress: &mut ProgressFn<'_>) -> Result<Plan, BuildError> {
        self.plan_with(&FsProbe, progress)
    }

    /// [`plan`](Self::plan) with a custom template probe.
    ///
    /// # Errors
    ///
    /// See [`plan`](Self::plan).
    pub fn plan_with(
        &self,
        probe: &impl TemplateProbe,
        progress: &mut ProgressFn<'_>,
    ) -> Result<Plan, BuildError> {
        let loaded = self.load(progress)?;
        let menus = assemble_menus(&loaded.pages, &self.config.site.menu);
        let site_context = self.site_context(&loaded.pages, &menus)?;
        let search_paths = self.config.paths.layout_search_paths();

        let mut renders = Vec::with_capacity(loaded.pages.len());
        let mut skipped = Vec::new();
        for page in &loaded.pages {
            let template = match layout::resolve(page, &search_paths, probe) {
                Ok(template) => template,
                Err(e) => match self.config.build.on_missing_layout {
                    MissingLayoutPolicy::Abort => return Err(e.into()),
                    MissingLayoutPolicy::Skip => {
                        tracing::warn!(page = %page.id, error = %e, "Skipping page without layout");
                        skipped.push(SkippedPage {
                            page_id: page.id.clone(),
                            error: e,
                        });
                        continue;
                    }
                },
            };
            renders.push(PlannedPage {
                page_id: page.id.clone(),
                template,
                context: json!({
                    "page": page.to_context(),
                    "site": site_context,
                    "quire": { "version": env!("CARGO_PKG_VERSION") },
                }),
                output_path: output_path(page.permalink(), &self.config.output.filename),
            });
        }

        Ok(Plan {
            pages: loaded.pages,
            menus,
            renders,
            skipped,
            dropped: loaded.dropped,
        })
    }

    fn site_context(&self, pages: &PageCollection, menus: &Menus) -> Result<Value, BuildError> {
        let mut site = serde_json::to_value(&self.config.site)?;
        if let Value::Object(map) = &mut site {
            map.insert("menus".to_owned(), serde_json::to_value(menus)?);
            map.insert(
                "pages".to_owned(),
                pages_value(
                    pages
                        .iter()
                        .filter(|p| p.node_type == NodeType::Page && !p.is_virtual),
                ),
            );
        }
        Ok(site)
    }

    /// Render every planned page, write it, and copy static files.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] on load, layout, render or write failure.
    pub fn build(&self, progress: &mut ProgressFn<'_>) -> Result<BuildReport, BuildError> {
        let plan = self.plan(progress)?;
        let templates = Templates::new(
            self.config.paths.layout_search_paths(),
            &self.config.site.baseurl,
        );
        let output_dir = &self.config.paths.output_dir;

        let written = render_plan(&plan, &templates, output_dir, progress)?;

        let mut static_files = 0;
        for dir in self.config.paths.static_dirs() {
            progress(&Progress::new(Step::Copy, dir.display().to_string()));
            static_files += copy_dir(&dir, output_dir)?;
        }

        tracing::info!(
            pages = written.len(),
            static_files,
            output = %output_dir.display(),
            "Build complete"
        );
        Ok(BuildReport {
            written,
            static_files,
            skipped: plan.skipped,
            dropped: plan.dropped,
        })
    }
}

/// Render and write every page of a plan under `output_dir`.
///
/// # Errors
///
/// Returns [`BuildError::Render`] or [`BuildError::Write`] on the first failure.
pub fn render_plan(
    plan: &Plan,
    renderer: &impl TemplateRenderer,
    output_dir: &Path,
    progress: &mut ProgressFn<'_>,
) -> Result<Vec<PathBuf>, BuildError> {
    let total = plan.renders.len();
    let mut written = Vec::with_capacity(total);
    for (i, planned) in plan.renders.iter().enumerate() {
        progress(
            &Progress::new(Step::Render, planned.output_path.display().to_string())
                .with_count(i + 1, total),
        );
        let html = renderer
            .render(&planned.template, &planned.context)
            .map_err(|source| BuildError::Render {
                page_id: planned.page_id.clone(),
                source,
            })?;
        let path = output_dir.join(&planned.output_path);
        write_file(&path, &html)?;
        tracing::debug!(page = %planned.page_id, path = %path.display(), "Page written");
        written.push(planned.output_path.clone());
    }
    Ok(written)
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    let write_error = |source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, contents).map_err(write_error)
}

/// Output file for a permalink, relative to the output directory.
///
/// A permalink whose last segment has an extension names the file itself;
/// otherwise the configured filename goes inside the permalink directory.
#[must_use]
pub fn output_path(permalink: &str, filename: &str) -> PathBuf {
    let segments: Vec<&str> = permalink
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .collect();
    let path: PathBuf = segments.iter().collect();
    match segments.last() {
        Some(last) if Path::new(last).extension().is_some() => path,
        _ => path.join(filename),
    }
}

/// Check the directories a filesystem build needs.
///
/// # Errors
///
/// Returns the first structural [`BuildError`] found.
pub fn check_structure(config: &Config) -> Result<(), BuildError> {
    let paths = &config.paths;
    if !paths.content_dir.is_dir() {
        return Err(BuildError::MissingContentDir(paths.content_dir.clone()));
    }
    if let Some(theme_dir) = &paths.theme_dir
        && !theme_dir.is_dir()
    {
        return Err(BuildError::MissingTheme(theme_dir.clone()));
    }
    let search_paths = paths.layout_search_paths();
    if !search_paths.iter().any(|p| p.is_dir()) {
        return Err(BuildError::MissingLayouts(search_paths));
    }
    Ok(())
}

/// Recursively copy `src` into `dest`, returning the number of files copied.
///
/// A missing `src` copies nothing. Hidden entries are skipped.
fn copy_dir(src: &Path, dest: &Path) -> Result<usize, BuildError> {
    if !src.is_dir() {
        return Ok(0);
    }
    let read_error = |source| BuildError::Write {
        path: src.to_path_buf(),
        source,
    };

    let mut copied = 0;
    let mut entries: Vec<_> = fs::read_dir(src)
        .map_err(read_error)?
        .filter_map(Result::ok)
        .collect();
    entries.sort_by_key(fs::DirEntry::file_name);

    for entry in entries {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with('.') {
            continue;
        }
        let from = entry.path();
        let to = dest.join(&name);
        if from.is_dir() {
            copied += copy_dir(&from, &to)?;
        } else {
            if let Some(parent) = to.parent() {
                fs::create_dir_all(parent).map_err(|source| BuildError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::copy(&from, &to).map_err(|source| BuildError::Write {
                path: to.clone(),
                source,
            })?;
            copied += 1;
        }
    }
    Ok(copied)
}
