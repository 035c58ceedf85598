//! Build configuration and the annotation handlers a build runs.
//!
//! A `Context` is created once and shared by the units built from it.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use javelin::{Context, UnitConfig};
//! use std::sync::Arc;
//!
//! let ctx = Arc::new(Context::with_config(UnitConfig::default().with_lenient_parsing(true)));
//!
//! let mut unit = ctx.create_unit();
//! unit.add_source("Main.java", "class Main { void run() { } }").unwrap();
//!
//! let arena = Bump::new();
//! let output = unit.build(&arena).unwrap();
//! assert!(output.is_success());
//! ```

use std::fmt;
use std::sync::Arc;

use javelin_compiler::{AnnotationHandler, ExtensionConfig, ExtensionMethodHandler};

use crate::unit::Unit;

/// Settings for building units.
#[derive(Debug, Clone)]
pub struct UnitConfig {
    /// Register the bundled `java.lang`/`java.io`/`java.util` declarations
    /// before user sources.
    pub load_prelude: bool,
    /// Keep going after parse errors, reporting them as diagnostics.
    pub lenient_parsing: bool,
    /// Which annotation names trigger the extension method rewrite.
    pub extension: ExtensionConfig,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            load_prelude: true,
            lenient_parsing: false,
            extension: ExtensionConfig::default(),
        }
    }
}

impl UnitConfig {
    pub fn with_prelude(mut self, load_prelude: bool) -> Self {
        self.load_prelude = load_prelude;
        self
    }

    pub fn with_lenient_parsing(mut self, lenient: bool) -> Self {
        self.lenient_parsing = lenient;
        self
    }

    pub fn with_extension(mut self, extension: ExtensionConfig) -> Self {
        self.extension = extension;
        self
    }
}

/// Shared build configuration plus the installed annotation handlers.
///
/// The extension method handler is installed by every constructor; further
/// handlers run after it, in installation order.
pub struct Context {
    config: UnitConfig,
    handlers: Vec<Box<dyn AnnotationHandler + Send + Sync>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl Context {
    /// A context with the default configuration.
    pub fn new() -> Self {
        Self::with_config(UnitConfig::default())
    }

    pub fn with_config(config: UnitConfig) -> Self {
        let extension = ExtensionMethodHandler::new(config.extension.clone());
        Self {
            config,
            handlers: vec![Box::new(extension)],
        }
    }

    /// Install another annotation handler.
    pub fn install(&mut self, handler: impl AnnotationHandler + Send + Sync + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub fn config(&self) -> &UnitConfig {
        &self.config
    }

    pub fn handlers(&self) -> impl Iterator<Item = &dyn AnnotationHandler> {
        self.handlers.iter().map(|h| h.as_ref() as &dyn AnnotationHandler)
    }

    /// Whether any installed handler needs the symbol table.
    pub fn needs_resolution(&self) -> bool {
        self.handlers.iter().any(|h| h.is_resolution_based())
    }

    /// Create an empty unit built with this context.
    pub fn create_unit(self: &Arc<Self>) -> Unit {
        Unit::with_context(Arc::clone(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = UnitConfig::default();
        assert!(config.load_prelude);
        assert!(!config.lenient_parsing);
        assert!(config.extension.matches_name("ExtensionMethod"));
    }

    #[test]
    fn builder_methods() {
        let config = UnitConfig::default()
            .with_prelude(false)
            .with_lenient_parsing(true)
            .with_extension(ExtensionConfig::default().with_simple_name("Extends"));
        assert!(!config.load_prelude);
        assert!(config.lenient_parsing);
        assert!(config.extension.matches_name("Extends"));
        assert!(!config.extension.matches_name("ExtensionMethod"));
    }

    #[test]
    fn extension_handler_is_installed() {
        let ctx = Context::new();
        assert_eq!(ctx.handlers().count(), 1);
        assert!(ctx.needs_resolution());
    }

    #[test]
    fn create_unit_shares_context() {
        let ctx = Arc::new(Context::new());
        let unit = ctx.create_unit();
        assert_eq!(unit.source_count(), 0);
        assert_eq!(Arc::strong_count(&ctx), 2);
    }
}
