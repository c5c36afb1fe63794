//! Gallery rendering with Tera

use super::elements::RenderInstruction;
use crate::config::UiSettings;
use crate::error::Result;
use serde::Serialize;
use tera::{Context, Tera};

#[derive(Serialize)]
struct GalleryContext<'a> {
    elements: &'a [RenderInstruction],
    ui: &'a UiSettings,
    title: &'a str,
    status: Option<&'a str>,
}

/// Template renderer
pub struct Templates {
    tera: Tera,
    ui: UiSettings,
}

impl Templates {
    /// Create a new template renderer with embedded templates
    pub fn new(ui: UiSettings) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("gallery.html", include_str!("../templates/gallery.html")),
            ("page.html", include_str!("../templates/page.html")),
        ])?;

        Ok(Self { tera, ui })
    }

    /// Render the gallery container alone
    pub fn render_gallery(&self, elements: &[RenderInstruction]) -> Result<String> {
        self.render("gallery.html", elements, "", None)
    }

    /// Render a standalone HTML page with the gallery and an optional status line
    pub fn render_page(
        &self,
        title: &str,
        elements: &[RenderInstruction],
        status: Option<&str>,
    ) -> Result<String> {
        self.render("page.html", elements, title, status)
    }

    fn render(
        &self,
        template: &str,
        elements: &[RenderInstruction],
        title: &str,
        status: Option<&str>,
    ) -> Result<String> {
        let ctx = Context::from_serialize(GalleryContext {
            elements,
            ui: &self.ui,
            title,
            status,
        })?;
        Ok(self.tera.render(template, &ctx)?)
    }
}
