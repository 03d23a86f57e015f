//! Page templates.
//!
//! Templates are looked up in an [`AssetSource`] and compiled with
//! `minijinja` on every request; a [`Page`] only exists once compilation
//! succeeded.

use std::sync::Arc;

use minijinja::Environment;
use serde::Serialize;

use crate::assets::AssetSource;
use crate::observability::{log_error, RequestSpan};

/// Failure to load, compile or render a template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template {0:?} not found")]
    ResourceNotFound(String),

    #[error("template {0:?} is not valid UTF-8")]
    Encoding(String),

    #[error("could not parse template {name:?}: {source}")]
    Parse {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("could not execute template: {0}")]
    Render(#[source] minijinja::Error),
}

/// A compiled template, ready to render.
pub struct Page {
    env: Environment<'static>,
    name: String,
}

impl Page {
    /// Render the page with `ctx`. Missing variables render as empty.
    pub fn render<C: Serialize>(&self, ctx: C) -> Result<String, TemplateError> {
        self.env
            .get_template(&self.name)
            .and_then(|template| template.render(ctx))
            .map_err(TemplateError::Render)
    }
}

/// Loads templates from the asset filesystem.
#[derive(Clone)]
pub struct TemplateRenderer {
    assets: Arc<dyn AssetSource>,
}

impl TemplateRenderer {
    pub fn new(assets: Arc<dyn AssetSource>) -> Self {
        Self { assets }
    }

    /// Look up `name` and compile it.
    ///
    /// Failures are logged against the request's trace before being returned.
    pub fn get_template(&self, span: &RequestSpan, name: &str) -> Result<Page, TemplateError> {
        let contents = match self.assets.open(name) {
            Some(contents) => contents,
            None => {
                let err = TemplateError::ResourceNotFound(name.to_string());
                log_error(span, "could not find template", &err);
                return Err(err);
            }
        };

        let source = match String::from_utf8(contents.into_owned()) {
            Ok(source) => source,
            Err(_) => {
                let err = TemplateError::Encoding(name.to_string());
                log_error(span, "could not parse template", &err);
                return Err(err);
            }
        };

        let mut env = Environment::new();
        if let Err(source) = env.add_template_owned(name.to_string(), source) {
            let err = TemplateError::Parse {
                name: name.to_string(),
                source,
            };
            log_error(span, "could not parse template", &err);
            return Err(err);
        }

        Ok(Page {
            env,
            name: name.to_string(),
        })
    }
}
