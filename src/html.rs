use kuchikikiki::traits::TendrilSink;
use kuchikikiki::NodeRef;
use tracing::warn;
use url::Url;

/// Class marking the main content region of a Docusaurus page.
const MAIN_CONTENT_SELECTOR: &str = ".theme-doc-markdown";

fn parse(markup: &str) -> NodeRef {
    kuchikikiki::parse_html().one(markup)
}

fn inner_html(node: &NodeRef) -> String {
    node.children().map(|child| child.to_string()).collect()
}

/// Returns the inner markup of the main content region, or an empty string
/// when the page has no such region.
pub fn extract_main_content(markup: &str) -> String {
    let document = parse(markup);
    match document.select_first(MAIN_CONTENT_SELECTOR) {
        Ok(region) => inner_html(region.as_node()),
        Err(()) => String::new(),
    }
}

/// Rewrites every relative image source to an absolute URL resolved against
/// `base_url`. Sources that are already absolute are left untouched.
pub fn resolve_image_urls(markup: &str, base_url: &str) -> String {
    let document = parse(markup);
    if let Ok(images) = document.select("img") {
        for image in images {
            let mut attributes = image.attributes.borrow_mut();
            let src = match attributes.get("src") {
                Some(src) if !src.starts_with("http") => src.to_string(),
                _ => continue,
            };
            match Url::parse(base_url).and_then(|base| base.join(&src)) {
                Ok(absolute) => {
                    attributes.insert("src", absolute.to_string());
                }
                Err(e) => warn!("Could not resolve image URL {} against {}: {}", src, base_url, e),
            }
        }
    }
    document.to_string()
}

/// Removes the lazy-loading hint from every image so a static renderer
/// paints them immediately instead of waiting for viewport visibility.
pub fn strip_lazy_loading(markup: &str) -> String {
    let document = parse(markup);
    if let Ok(images) = document.select("img") {
        for image in images {
            image.attributes.borrow_mut().remove("loading");
        }
    }
    document.to_string()
}

/// Wraps a bare fragment in a minimal document shell when `<head>` is
/// missing, so the renderer always gets a valid document to style.
pub fn wrap_document(markup: &str) -> String {
    if markup.contains("<head>") {
        return markup.to_string();
    }
    format!(
        "<!DOCTYPE html>\n<html>\n  <head></head>\n  <body>{}</body>\n</html>",
        markup
    )
}
