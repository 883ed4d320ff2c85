//! Template rendering collaborator.
//!
//! The framework only ever asks a renderer for `render(name, context) -> String`;
//! the template language is the renderer's business. [`HandlebarsTemplates`]
//! is the bundled implementation.
//!
//! # Example
//!
//! ```
//! use poridhi_core::{HandlebarsTemplates, Templates};
//! use serde_json::json;
//!
//! let mut engine = HandlebarsTemplates::new();
//! engine.register("index.html", "<h1>{{title}}</h1><p>{{name}}</p>").unwrap();
//!
//! let templates = Templates::new(engine);
//! let html = templates
//!     .render("index.html", &json!({"title": "Best Framework", "name": "Poridhi"}))
//!     .unwrap();
//! assert_eq!(html, "<h1>Best Framework</h1><p>Poridhi</p>");
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while loading or rendering templates.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template is registered under the name.
    #[error("template '{0}' not found")]
    NotFound(String),

    /// A template failed to parse.
    #[error("failed to load template '{name}': {message}")]
    Load {
        /// Template name.
        name: String,
        /// Parser message.
        message: String,
    },

    /// A template failed to render.
    #[error("failed to render template '{name}': {message}")]
    Render {
        /// Template name.
        name: String,
        /// Renderer message.
        message: String,
    },

    /// The render context could not be serialized.
    #[error("invalid template context: {0}")]
    Context(#[from] serde_json::Error),

    /// The template directory could not be read.
    #[error("failed to read template directory '{path}': {source}")]
    Io {
        /// Directory or file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Renders a named template against a JSON context.
pub trait TemplateRenderer: Send + Sync + 'static {
    /// Renders `name` with `context`.
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, TemplateError>;
}

/// Handlebars-backed renderer.
///
/// Templates are keyed by their path relative to the template directory, with
/// `/` separators, so `templates/index.html` is rendered as `"index.html"`.
pub struct HandlebarsTemplates {
    registry: Handlebars<'static>,
}

impl HandlebarsTemplates {
    /// Creates an empty renderer.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        Self { registry }
    }

    /// Loads every file under `dir`, recursively.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let dir = dir.as_ref();
        let mut templates = Self::new();
        templates.load_dir(dir, dir)?;
        tracing::debug!(
            dir = %dir.display(),
            count = templates.registry.get_templates().len(),
            "templates loaded"
        );
        Ok(templates)
    }

    fn load_dir(&mut self, root: &Path, dir: &Path) -> Result<(), TemplateError> {
        let io_err = |source| TemplateError::Io {
            path: dir.to_path_buf(),
            source,
        };

        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_dir() {
                self.load_dir(root, &path)?;
                continue;
            }

            let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
            let name = template_name(root, &path);
            self.register(&name, &source)?;
        }
        Ok(())
    }

    /// Registers a template from source text.
    pub fn register(&mut self, name: &str, source: &str) -> Result<(), TemplateError> {
        self.registry
            .register_template_string(name, source)
            .map_err(|e| TemplateError::Load {
                name: name.to_string(),
                message: e.to_string(),
            })
    }

    /// Returns true if a template is registered under `name`.
    #[must_use]
    pub fn has_template(&self, name: &str) -> bool {
        self.registry.has_template(name)
    }
}

impl Default for HandlebarsTemplates {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlebarsTemplates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.registry.get_templates().keys().collect();
        names.sort();
        f.debug_struct("HandlebarsTemplates")
            .field("templates", &names)
            .finish()
    }
}

impl TemplateRenderer for HandlebarsTemplates {
    fn render(&self, name: &str, context: &serde_json::Value) -> Result<String, TemplateError> {
        if !self.has_template(name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        self.registry
            .render(name, context)
            .map_err(|e| TemplateError::Render {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}

fn template_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// A cheap, cloneable handle to the application's renderer.
#[derive(Clone)]
pub struct Templates {
    renderer: Arc<dyn TemplateRenderer>,
}

impl Templates {
    /// Wraps a renderer.
    pub fn new(renderer: impl TemplateRenderer) -> Self {
        Self {
            renderer: Arc::new(renderer),
        }
    }

    /// Renders `name` with any serializable context.
    pub fn render<C: Serialize + ?Sized>(&self, name: &str, context: &C) -> Result<String, TemplateError> {
        let context = serde_json::to_value(context)?;
        self.renderer.render(name, &context)
    }
}

impl fmt::Debug for Templates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Templates").finish_non_exhaustive()
    }
}
