//! HTML pages, rendered with [maud](https://maud.lambda.xyz/).
//!
//! All interpolation is auto-escaped, so client-supplied file names and query
//! values are safe to echo back.

use crate::imaging::Operation;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../../assets/style.css");

/// Renders the base HTML document structure
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                header.site-header {
                    a href="/" { "Image Converter" }
                }
                main { (content) }
            }
        }
    }
}

/// Upload form, optionally with an inline error message.
pub fn render_index(error: Option<&str>) -> Markup {
    let content = html! {
        h1 { "Upload an image" }
        @if let Some(message) = error {
            p.error role="alert" { (message) }
        }
        form.upload-form method="post" action="/" enctype="multipart/form-data" {
            label for="image" { "Image" }
            input id="image" type="file" name="image" accept="image/*";
            fieldset {
                legend { "Operation" }
                @for op in Operation::ALL {
                    label.operation {
                        input type="radio" name="operation" value=(op.name());
                        " " (op.label())
                    }
                }
            }
            button type="submit" { "Process" }
        }
    };

    base_document("Image Converter", content)
}

/// The uploaded image next to its processed version.
pub fn render_result(input_image: &str, output_image: &str, original_name: Option<&str>) -> Markup {
    let caption = original_name.unwrap_or(input_image);
    let content = html! {
        h1 { "Result" }
        div.comparison {
            figure {
                img src={ "/uploads/" (input_image) } alt={ "Original: " (caption) };
                figcaption { "Original: " (caption) }
            }
            figure {
                img src={ "/static/" (output_image) } alt="Processed image";
                figcaption {
                    "Processed "
                    a href={ "/static/" (output_image) } download { "(download)" }
                }
            }
        }
        p { a href="/" { "Process another image" } }
    };

    base_document("Result", content)
}
