use std::time::Duration;

use anyhow::{anyhow, Result};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// Everything the converter needs from one rendered page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub html: String,
    pub css_links: Vec<String>,
}

/// The headless-browser operations the pipeline depends on.
#[allow(async_fn_in_trait)]
pub trait Renderer {
    /// Navigates to `url`, waits for the DOM, and captures the realized
    /// markup together with the hrefs of its stylesheet links.
    async fn render(&self, url: &str) -> Result<RenderedPage>;

    /// Loads `html` into a fresh page and prints it as a PDF.
    async fn print_pdf(&self, html: &str) -> Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub paper_width: f64,
    pub paper_height: f64,
    pub margin: f64,
    pub scale: f64,
}

impl Default for PdfOptions {
    /// A4 paper with 20mm margins, both expressed in inches.
    fn default() -> Self {
        Self {
            paper_width: 8.27,
            paper_height: 11.69,
            margin: 0.79,
            scale: 1.0,
        }
    }
}

/// A running headless Chrome instance. One browser serves the whole run;
/// every render gets a fresh page that is closed on all exit paths.
pub struct Chrome {
    browser: Browser,
    handler: JoinHandle<()>,
    options: PdfOptions,
}

impl Chrome {
    pub async fn launch() -> Result<Self> {
        Self::launch_with_options(PdfOptions::default()).await
    }

    pub async fn launch_with_options(options: PdfOptions) -> Result<Self> {
        let config = BrowserConfig::builder()
            .window_size(1920, 1080)
            .build()
            .map_err(|e| anyhow!("Failed to create browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| anyhow!("Failed to launch browser: {}", e))?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(err) = h {
                    // Only log if it's not a common websocket deserialization error
                    let err_str = err.to_string();
                    if !err_str.contains("data did not match any variant")
                        && !err_str.contains("untagged enum Message")
                    {
                        error!("Browser handler error: {}", err);
                    } else {
                        debug!("Chrome protocol message ignored: {}", err);
                    }
                }
            }
        });

        Ok(Self {
            browser,
            handler: handle,
            options,
        })
    }

    pub async fn close(mut self) -> Result<()> {
        self.browser.close().await.ok();
        self.handler.abort();
        Ok(())
    }

    async fn new_page(&self) -> Result<Page> {
        self.browser
            .new_page("about:blank")
            .await
            .map_err(|e| anyhow!("Failed to create new page: {}", e))
    }
}

impl Renderer for Chrome {
    async fn render(&self, url: &str) -> Result<RenderedPage> {
        let page = self.new_page().await?;
        let result = render_on(&page, url).await;
        page.close().await.ok();
        result
    }

    async fn print_pdf(&self, html: &str) -> Result<Vec<u8>> {
        let page = self.new_page().await?;
        let result = print_on(&page, html, &self.options).await;
        page.close().await.ok();
        result
    }
}

const STYLESHEET_HREFS_JS: &str = r#"
    (() => Array.from(document.querySelectorAll('link[rel="stylesheet"]')).map((link) => link.href))()
"#;

async fn render_on(page: &Page, url: &str) -> Result<RenderedPage> {
    page.goto(url)
        .await
        .map_err(|e| anyhow!("Failed to navigate to {}: {}", url, e))?;

    page.wait_for_navigation()
        .await
        .map_err(|e| anyhow!("Failed to wait for navigation to {}: {}", url, e))?;

    let html = page
        .content()
        .await
        .map_err(|e| anyhow!("Failed to get page content for {}: {}", url, e))?;

    let css_links = page
        .evaluate(STYLESHEET_HREFS_JS)
        .await
        .map_err(|e| anyhow!("Failed to collect stylesheet links from {}: {}", url, e))?
        .into_value::<Vec<String>>()
        .map_err(|e| anyhow!("Failed to parse stylesheet links from {}: {}", url, e))?;

    Ok(RenderedPage { html, css_links })
}

async fn print_on(page: &Page, html: &str, options: &PdfOptions) -> Result<Vec<u8>> {
    page.set_content(html)
        .await
        .map_err(|e| anyhow!("Failed to set page content: {}", e))?;

    // Let injected stylesheets and resolved images settle before printing.
    page.wait_for_navigation().await.ok();
    tokio::time::sleep(Duration::from_millis(500)).await;

    let params = PrintToPdfParams {
        scale: Some(options.scale),
        paper_width: Some(options.paper_width),
        paper_height: Some(options.paper_height),
        margin_top: Some(options.margin),
        margin_right: Some(options.margin),
        margin_bottom: Some(options.margin),
        margin_left: Some(options.margin),
        print_background: Some(true),
        ..Default::default()
    };

    page.pdf(params)
        .await
        .map_err(|e| anyhow!("Failed to generate PDF: {}", e))
}
