use anyhow::Result;

use crate::fetch::HttpFetch;
use crate::html;
use crate::pdf::{self, PdfRequest};
use crate::progress::ProgressSink;
use crate::render::Renderer;
use crate::sidebar::SidebarNode;

/// Converts every sidebar node to a PDF buffer, depth-first in pre-order,
/// so the merged document reads in the same order as the navigation menu.
///
/// Strictly sequential: one render/convert at a time, a directory's
/// children immediately after the directory itself. Any render or convert
/// failure aborts the whole run.
pub async fn generate_all_pdfs<R, F, P>(
    renderer: &R,
    fetcher: &F,
    nodes: &[SidebarNode],
    base_url: &str,
    progress: &mut P,
    custom_styles: Option<&str>,
    force_images: bool,
) -> Result<Vec<Vec<u8>>>
where
    R: Renderer,
    F: HttpFetch,
    P: ProgressSink,
{
    let mut aggregate = Vec::new();

    for node in nodes {
        if let Some(link) = &node.canonical_link {
            let url = format!("{}{}", base_url, link);
            let page = renderer.render(&url).await?;
            let content = html::extract_main_content(&page.html);

            let buffer = pdf::generate_pdf(
                renderer,
                fetcher,
                PdfRequest {
                    html: content,
                    css_links: page.css_links,
                    base_url,
                    custom_styles,
                    force_images,
                },
            )
            .await?;

            aggregate.push(buffer);
            progress.update(&url);
        } else {
            // Container entries without an href have no page of their own.
            progress.update(&node.text);
        }

        if let Some(children) = &node.sub_items {
            let sub_pdfs = Box::pin(generate_all_pdfs(
                renderer,
                fetcher,
                children,
                base_url,
                progress,
                custom_styles,
                force_images,
            ))
            .await?;
            aggregate.extend(sub_pdfs);
        }
    }

    Ok(aggregate)
}
