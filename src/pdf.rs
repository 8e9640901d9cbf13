use std::path::Path;

use anyhow::{anyhow, Result};
use colored::*;
use tokio::fs;
use tracing::{info, warn};

use crate::fetch::HttpFetch;
use crate::html;
use crate::render::Renderer;

/// Inputs for converting one page's extracted content to a PDF buffer.
pub struct PdfRequest<'a> {
    pub html: String,
    pub css_links: Vec<String>,
    pub base_url: &'a str,
    pub custom_styles: Option<&'a str>,
    pub force_images: bool,
}

/// Produces one PDF buffer from extracted page content.
///
/// Stylesheets are fetched and inlined so the printed page looks like the
/// live one; a stylesheet that cannot be fetched is logged and skipped, the
/// page still renders without it.
pub async fn generate_pdf<R: Renderer, F: HttpFetch>(
    renderer: &R,
    fetcher: &F,
    request: PdfRequest<'_>,
) -> Result<Vec<u8>> {
    let mut markup = html::resolve_image_urls(&request.html, request.base_url);
    markup = html::wrap_document(&markup);
    markup = inject_styles(fetcher, markup, &request.css_links, request.custom_styles).await;

    if request.force_images {
        markup = html::strip_lazy_loading(&markup);
    }

    renderer.print_pdf(&markup).await
}

/// Fetches every stylesheet and inlines it, plus any custom styles, just
/// before the closing head tag. Inserts nothing when there is nothing to
/// inject.
async fn inject_styles<F: HttpFetch>(
    fetcher: &F,
    mut markup: String,
    css_links: &[String],
    custom_styles: Option<&str>,
) -> String {
    let mut blocks = String::new();

    for link in css_links {
        match fetcher.get_text(link).await {
            Ok(css) => blocks.push_str(&format!("<style>{}</style>", css)),
            Err(e) => warn!("Failed to fetch CSS from {}: {}", link, e),
        }
    }

    if let Some(styles) = custom_styles {
        blocks.push_str(&format!("<style>{}</style>", styles));
    }

    if blocks.is_empty() {
        return markup;
    }

    if let Some(position) = markup.find("</head>") {
        markup.insert_str(position, &blocks);
    }
    markup
}

/// Writes the merged PDF, creating parent directories as needed.
pub async fn save_pdf(data: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow!("Failed to create directory {}: {}", parent.display(), e))?;
    }

    fs::write(path, data)
        .await
        .map_err(|e| anyhow!("Failed to write PDF to {}: {}", path.display(), e))?;

    info!("PDF saved at: {}", path.display().to_string().green());
    Ok(())
}
