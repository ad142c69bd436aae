//! HTML pages, rendered with Handlebars from templates built into the binary.

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde_json::json;

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
const LOGIN_TEMPLATE: &str = include_str!("../templates/login.html");
pub const SCRIPT_JS: &str = include_str!("../static/script.js");

const TITLE: &str = "IMDG MSDS Analyzer";

pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars
            .register_template_string("index", INDEX_TEMPLATE)
            .context("Invalid index template")?;
        handlebars
            .register_template_string("login", LOGIN_TEMPLATE)
            .context("Invalid login template")?;
        Ok(Self { handlebars })
    }

    pub fn index(&self, username: Option<&str>) -> Result<String> {
        self.handlebars
            .render("index", &json!({ "title": TITLE, "username": username }))
            .context("Failed to render index page")
    }

    pub fn login(&self) -> Result<String> {
        self.handlebars
            .render("login", &json!({ "title": TITLE }))
            .context("Failed to render login page")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_escapes_username() {
        let pages = PageRenderer::new().unwrap();
        let html = pages.index(Some("<script>")).unwrap();
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("/static/script.js"));
        assert!(html.contains("id=\"uploadForm\""));
    }

    #[test]
    fn test_login_form_posts_credentials() {
        let html = PageRenderer::new().unwrap().login().unwrap();
        assert!(html.contains("action=\"/login\""));
        assert!(html.contains("name=\"password\""));
    }
}
