use std::collections::HashSet;

use anyhow::{anyhow, Result};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fetch::HttpFetch;

/// One entry in the documentation sidebar.
///
/// `sub_items` is `Some` only for entries marked as expandable directories;
/// `None` means the entry is a leaf page, `Some(vec![])` a directory that
/// was not (or could not be) expanded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarNode {
    pub text: String,
    pub canonical_link: Option<String>,
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_items: Option<Vec<SidebarNode>>,
}

struct MenuLink {
    text: String,
    href: Option<String>,
    has_sublist: bool,
}

/// Scrapes the sidebar starting at `url` into a tree of nodes.
///
/// Directories are expanded by recursively fetching `base_url` joined with
/// their href. A single set of normalized URLs is shared across the whole
/// walk, so a page reached through one branch is never emitted again by a
/// sibling branch — this is also what terminates the recursion, since every
/// sub-page repeats the full menu.
pub async fn scrape_sidebar<F: HttpFetch>(
    fetcher: &F,
    url: &str,
    base_url: &str,
    required_dirs: &[String],
) -> Result<Vec<SidebarNode>> {
    let mut processed_urls = HashSet::new();
    walk(fetcher, url, base_url, required_dirs, &mut processed_urls).await
}

async fn walk<F: HttpFetch>(
    fetcher: &F,
    url: &str,
    base_url: &str,
    required_dirs: &[String],
    processed_urls: &mut HashSet<String>,
) -> Result<Vec<SidebarNode>> {
    let markup = fetcher
        .get_text(url)
        .await
        .map_err(|e| anyhow!("Failed to scrape sidebar for URL {}: {}", url, e))?;

    let links = collect_menu_links(&markup, required_dirs);
    if links.is_empty() {
        debug!("No sidebar links found at {}", url);
        return Ok(Vec::new());
    }

    // First pass: one node per unseen link, in menu order. Links without an
    // href carry no dedup key and are always retained.
    let mut nodes = Vec::new();
    for link in links {
        if let Some(href) = &link.href {
            let normalized = normalize_url(href);
            if processed_urls.contains(&normalized) {
                continue;
            }
            processed_urls.insert(normalized);
        }

        nodes.push(SidebarNode {
            text: link.text,
            canonical_link: link.href.clone(),
            path: link.href,
            sub_items: if link.has_sublist {
                Some(Vec::new())
            } else {
                None
            },
        });
    }

    // Second pass: expand directories sequentially, sharing the dedup set.
    for node in &mut nodes {
        if node.sub_items.is_none() {
            continue;
        }
        if let Some(link) = node.canonical_link.clone() {
            let sub_url = format!("{}{}", base_url, link);
            let sub_items =
                Box::pin(walk(fetcher, &sub_url, base_url, required_dirs, processed_urls)).await?;
            node.sub_items = Some(sub_items);
        }
    }

    Ok(nodes)
}

/// Collects `.menu__link` elements in document order, keeping only those
/// whose href contains one of `required_dirs` when the list is non-empty.
fn collect_menu_links(markup: &str, required_dirs: &[String]) -> Vec<MenuLink> {
    let document = Html::parse_document(markup);
    let selector = Selector::parse(".menu__link").unwrap();

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let href = element.value().attr("href").map(str::to_string);

        if !required_dirs.is_empty() {
            let keep = href
                .as_deref()
                .map_or(false, |h| required_dirs.iter().any(|dir| h.contains(dir)));
            if !keep {
                continue;
            }
        }

        let has_sublist = element.value().attr("class").map_or(false, |classes| {
            classes
                .split_whitespace()
                .any(|class| class == "menu__link--sublist")
        });

        links.push(MenuLink {
            text: element.text().collect::<String>().trim_start().to_string(),
            href,
            has_sublist,
        });
    }

    links
}

/// Strips a single trailing slash so `/docs/x/` and `/docs/x` dedup together.
fn normalize_url(url: &str) -> String {
    url.strip_suffix('/').unwrap_or(url).to_string()
}

/// Counts every node in the tree, directories included.
pub fn count_items(nodes: &[SidebarNode]) -> usize {
    nodes
        .iter()
        .map(|node| 1 + node.sub_items.as_deref().map_or(0, count_items))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FakeFetch {
        pages: HashMap<String, String>,
    }

    impl FakeFetch {
        fn with(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, markup)| (url.to_string(), markup.to_string()))
                    .collect(),
            }
        }
    }

    impl HttpFetch for FakeFetch {
        async fn get_text(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("404 Not Found: {}", url))
        }
    }

    fn menu(links: &str) -> String {
        format!(
            "<html><body><nav class=\"menu\"><ul>{}</ul></nav></body></html>",
            links
        )
    }

    const BASE: &str = "https://example.com";

    #[tokio::test]
    async fn returns_empty_list_when_page_has_no_sidebar() {
        let fetcher = FakeFetch::with(&[(
            "https://example.com/docs",
            "<html><body><h1>No menu here</h1></body></html>",
        )]);

        let result = scrape_sidebar(&fetcher, "https://example.com/docs", BASE, &[])
            .await
            .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn builds_leaf_nodes_in_menu_order() {
        let fetcher = FakeFetch::with(&[(
            "https://example.com/docs",
            &menu(
                r#"<li><a class="menu__link" href="/docs/intro"> Intro</a></li>
                   <li><a class="menu__link" href="/docs/setup">Setup</a></li>"#,
            ),
        )]);

        let result = scrape_sidebar(&fetcher, "https://example.com/docs", BASE, &[])
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "Intro");
        assert_eq!(result[0].canonical_link.as_deref(), Some("/docs/intro"));
        assert_eq!(result[0].path.as_deref(), Some("/docs/intro"));
        assert!(result[0].sub_items.is_none());
        assert_eq!(result[1].canonical_link.as_deref(), Some("/docs/setup"));
    }

    #[tokio::test]
    async fn filters_links_by_required_directories() {
        let fetcher = FakeFetch::with(&[(
            "https://example.com/docs",
            &menu(
                r#"<li><a class="menu__link" href="/docs/auth/x">Auth X</a></li>
                   <li><a class="menu__link" href="/docs/billing/y">Billing Y</a></li>"#,
            ),
        )]);

        let result = scrape_sidebar(
            &fetcher,
            "https://example.com/docs",
            BASE,
            &["auth".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].canonical_link.as_deref(), Some("/docs/auth/x"));
    }

    #[tokio::test]
    async fn expands_sublist_directories_recursively() {
        let fetcher = FakeFetch::with(&[
            (
                "https://example.com/docs",
                &menu(
                    r#"<li><a class="menu__link menu__link--sublist" href="/docs/item1">Item 1</a></li>
                       <li><a class="menu__link" href="/docs/item2">Item 2</a></li>"#,
                ),
            ),
            (
                "https://example.com/docs/item1",
                // Sub-pages repeat the full menu, parent link included.
                &menu(
                    r#"<li><a class="menu__link menu__link--sublist" href="/docs/item1">Item 1</a></li>
                       <li><a class="menu__link" href="/docs/item1/sub1">Sub 1</a></li>
                       <li><a class="menu__link" href="/docs/item2">Item 2</a></li>"#,
                ),
            ),
        ]);

        let result = scrape_sidebar(&fetcher, "https://example.com/docs", BASE, &[])
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        let sub_items = result[0].sub_items.as_ref().unwrap();
        assert_eq!(sub_items.len(), 1);
        assert_eq!(
            sub_items[0].canonical_link.as_deref(),
            Some("/docs/item1/sub1")
        );
        assert!(result[1].sub_items.is_none());
    }

    #[tokio::test]
    async fn dedups_urls_across_branches_with_trailing_slash_normalization() {
        let fetcher = FakeFetch::with(&[
            (
                "https://example.com/docs",
                &menu(
                    r#"<li><a class="menu__link menu__link--sublist" href="/docs/a">A</a></li>
                       <li><a class="menu__link menu__link--sublist" href="/docs/b">B</a></li>"#,
                ),
            ),
            (
                "https://example.com/docs/a",
                &menu(r#"<li><a class="menu__link" href="/docs/shared">Shared</a></li>"#),
            ),
            (
                "https://example.com/docs/b",
                &menu(r#"<li><a class="menu__link" href="/docs/shared/">Shared</a></li>"#),
            ),
        ]);

        let result = scrape_sidebar(&fetcher, "https://example.com/docs", BASE, &[])
            .await
            .unwrap();

        let a_subs = result[0].sub_items.as_ref().unwrap();
        let b_subs = result[1].sub_items.as_ref().unwrap();
        assert_eq!(a_subs.len(), 1);
        assert_eq!(a_subs[0].canonical_link.as_deref(), Some("/docs/shared"));
        assert!(b_subs.is_empty());
    }

    #[tokio::test]
    async fn link_without_href_is_kept_but_never_expanded() {
        let fetcher = FakeFetch::with(&[(
            "https://example.com/docs",
            &menu(
                r#"<li><a class="menu__link menu__link--sublist">Group</a></li>
                   <li><a class="menu__link" href="/docs/page">Page</a></li>"#,
            ),
        )]);

        let result = scrape_sidebar(&fetcher, "https://example.com/docs", BASE, &[])
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "Group");
        assert!(result[0].canonical_link.is_none());
        assert_eq!(result[0].sub_items, Some(Vec::new()));
    }

    #[tokio::test]
    async fn fetch_failure_aborts_the_walk_naming_the_url() {
        let fetcher = FakeFetch::with(&[(
            "https://example.com/docs",
            &menu(r#"<li><a class="menu__link menu__link--sublist" href="/docs/broken">Broken</a></li>"#),
        )]);

        let error = scrape_sidebar(&fetcher, "https://example.com/docs", BASE, &[])
            .await
            .unwrap_err();

        let message = error.to_string();
        assert!(message.contains("Failed to scrape sidebar"));
        assert!(message.contains("https://example.com/docs/broken"));
    }

    #[test]
    fn counts_all_nodes_recursively() {
        let leaf = |text: &str| SidebarNode {
            text: text.to_string(),
            canonical_link: None,
            path: None,
            sub_items: None,
        };
        let tree = vec![
            SidebarNode {
                sub_items: Some(vec![
                    leaf("Subitem 1"),
                    SidebarNode {
                        sub_items: Some(vec![leaf("Subsubitem 1")]),
                        ..leaf("Subitem 2")
                    },
                ]),
                ..leaf("Item 1")
            },
            leaf("Item 2"),
        ];

        assert_eq!(count_items(&tree), 5);
        assert_eq!(count_items(&[]), 0);
    }
}
