//! HTML presentation of the analysis form and its outcome.

use askama::Template;
use pulldown_cmark::{html, Event, Options, Parser};

use crate::analysis::orchestrator::AnalysisResult;
use crate::errors::AppError;

/// The single page: form on top, outcome (if any) underneath.
#[derive(Template, Default)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub job_description: String,
    pub heading: String,
    /// Already-rendered HTML, emitted with `|safe`.
    pub result_html: String,
    pub warning: String,
    pub error: String,
}

impl IndexPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_result(job_description: String, result: &AnalysisResult) -> Self {
        Self {
            job_description,
            heading: result.heading.clone(),
            result_html: render_markdown(&result.analysis),
            ..Self::default()
        }
    }

    pub fn with_error(job_description: String, err: &AppError) -> Self {
        let message = err.user_message();
        if err.is_warning() {
            Self {
                job_description,
                warning: message,
                ..Self::default()
            }
        } else {
            Self {
                job_description,
                error: message,
                ..Self::default()
            }
        }
    }
}

/// Renders model markdown to HTML. Raw HTML in the model output is shown
/// as text, never injected.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markdown_formats_lists_and_emphasis() {
        let html = render_markdown("**Match: 78%**\n\n- Kafka\n- Terraform\n");
        assert!(html.contains("<strong>Match: 78%</strong>"));
        assert!(html.contains("<li>Kafka</li>"));
    }

    #[test]
    fn test_render_markdown_escapes_raw_html() {
        let html = render_markdown("<script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_empty_page_renders_both_triggers() {
        let html = IndexPage::empty().render().unwrap();
        assert!(html.contains(r#"value="evaluate""#));
        assert!(html.contains(r#"value="match""#));
        assert!(html.contains(r#"accept="application/pdf,.pdf""#));
    }

    #[test]
    fn test_warning_page_shows_upload_prompt() {
        let html = IndexPage::with_error("JD".to_string(), &AppError::MissingDocument)
            .render()
            .unwrap();
        assert!(html.contains("Please upload your resume to proceed."));
        assert!(html.contains("class=\"alert warning\""));
    }

    #[test]
    fn test_job_description_is_escaped() {
        let html = IndexPage::with_error("<b>Rust</b>".to_string(), &AppError::MissingDocument)
            .render()
            .unwrap();
        assert!(!html.contains("<b>Rust</b>"));
    }
}
