//! HTML rendering.
//!
//! Pages are built with [maud](https://maud.lambda.xyz/): type-checked
//! templates compiled into the binary, all user-supplied text escaped.
//! The stylesheet is inlined so the server needs no static file route.
//!
//! ## Pages
//!
//! - **Index**: upload form, optionally followed by the last result
//! - **Error**: the same form with a message above it, served with a 400

use crate::filters::FilterKind;
use crate::process::ProcessedUpload;
use maud::{DOCTYPE, Markup, html};

const CSS_STATIC: &str = include_str!("../static/style.css");

const TITLE: &str = "snapfilter";

/// What the form should show pre-filled.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub selected: Vec<FilterKind>,
    pub intensity: u32,
}

/// Upload form plus the most recent result, if any.
pub fn index_page(form: &FormState, last: Option<&ProcessedUpload>) -> Markup {
    let content = html! {
        h1 { (TITLE) }
        (upload_form(form))
        @if let Some(result) = last {
            (result_section(result))
        }
    };
    base_document(TITLE, CSS_STATIC, None, content)
}

/// Upload form with an error message above it.
pub fn error_page(form: &FormState, message: &str) -> Markup {
    let content = html! {
        h1 { (TITLE) }
        p.error role="alert" { (message) }
        (upload_form(form))
    };
    base_document(TITLE, CSS_STATIC, Some("has-error"), content)
}

fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (css) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

fn upload_form(form: &FormState) -> Markup {
    html! {
        form.upload method="post" action="/" enctype="multipart/form-data" {
            label {
                "Image "
                input type="file" name="image" accept="image/*" required;
            }
            fieldset.filters {
                legend { "Filters (applied in this order)" }
                @for kind in FilterKind::ALL {
                    label {
                        input type="checkbox" name="filter" value=(kind.name())
                            checked[form.selected.contains(&kind)];
                        " " (kind.display_name())
                    }
                }
            }
            label {
                "Blur intensity "
                input type="number" name="intensity" min="1" value=(form.intensity);
            }
            button type="submit" { "Apply" }
        }
    }
}

fn result_section(result: &ProcessedUpload) -> Markup {
    let original = upload_url(&result.original);
    let filtered = upload_url(&result.filtered);
    html! {
        section.result {
            h2 { "Filter: " (result.filter_label()) }
            div.pair {
                figure {
                    img src=(original) alt="Original image";
                    figcaption {
                        "Original " (result.width) "×" (result.height) " · "
                        a href=(original) download=(result.original) { "Download" }
                    }
                }
                figure {
                    img src=(filtered) alt="Filtered image";
                    figcaption {
                        "Filtered · "
                        a href=(filtered) download=(result.filtered) { "Download" }
                    }
                }
            }
        }
    }
}

fn upload_url(filename: &str) -> String {
    format!("/uploads/{filename}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> ProcessedUpload {
        ProcessedUpload {
            original: "original_cat.png".into(),
            filtered: "filtered_cat.png".into(),
            filters: vec![FilterKind::Sepia, FilterKind::Blur],
            width: 800,
            height: 600,
        }
    }

    #[test]
    fn base_document_includes_doctype() {
        let content = html! { p { "test" } };
        let doc = base_document("Test", "body {}", None, content).into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn base_document_applies_body_class() {
        let doc = base_document("Test", "", Some("has-error"), html! {}).into_string();
        assert!(doc.contains(r#"<body class="has-error">"#));
    }

    #[test]
    fn index_lists_every_filter() {
        let page = index_page(&FormState::default(), None).into_string();
        for kind in FilterKind::ALL {
            assert!(page.contains(&format!(r#"value="{}""#, kind.name())));
        }
        assert!(page.contains("Black &amp; White"));
        assert!(page.contains(r#"enctype="multipart/form-data""#));
        assert!(!page.contains("section class=\"result\""));
    }

    #[test]
    fn index_prefills_form_state() {
        let form = FormState {
            selected: vec![FilterKind::Edges],
            intensity: 9,
        };
        let page = index_page(&form, None).into_string();
        assert!(page.contains(r#"value="edges" checked"#));
        assert!(!page.contains(r#"value="bw" checked"#));
        assert!(page.contains(r#"value="9""#));
    }

    #[test]
    fn index_shows_last_result() {
        let page = index_page(&FormState::default(), Some(&result())).into_string();
        assert!(page.contains(r#"src="/uploads/original_cat.png""#));
        assert!(page.contains(r#"src="/uploads/filtered_cat.png""#));
        assert!(page.contains("Sepia → Blur"));
        assert!(page.contains("800×600"));
    }

    #[test]
    fn error_page_escapes_message() {
        let page = error_page(&FormState::default(), "bad <script>").into_string();
        assert!(page.contains("bad &lt;script&gt;"));
        assert!(page.contains(r#"role="alert""#));
    }
}
