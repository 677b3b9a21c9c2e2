//! HTML rendering of views.
//!
//! Templates are compiled into the binary and looked up by view name with an
//! `.html` suffix.

use grid::path;
use minijinja::{context, AutoEscape, Environment};
use serde::Serialize;

use crate::controller::View;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("error.html", include_str!("../templates/error.html")),
    (
        "collections/collectionManagement.html",
        include_str!("../templates/collections/collectionManagement.html"),
    ),
    (
        "collections/info.html",
        include_str!("../templates/collections/info.html"),
    ),
];

/// Renders views to HTML.
pub struct ViewRenderer {
    env: Environment<'static>,
}

impl ViewRenderer {
    /// Build a renderer with the bundled templates.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_filter("encode_path", |value: Option<String>| {
            value.map(|v| path::encode_component(&v)).unwrap_or_default()
        });
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render a view.
    pub fn render<M: Serialize>(&self, view: &View<M>) -> Result<String, minijinja::Error> {
        let template = self.env.get_template(&format!("{}.html", view.name))?;
        template.render(&view.model)
    }

    /// Render the page shown for requests that could not be served.
    pub fn render_error(
        &self,
        status: u16,
        message: &str,
        request_header: &str,
    ) -> Result<String, minijinja::Error> {
        self.env.get_template("error.html")?.render(context! {
            status,
            message,
            requestHeader => request_header,
            unexpectedError => false,
        })
    }
}
