//! # docs2pdf
//!
//! Turns a Docusaurus documentation website into a single merged PDF:
//! the sidebar is scraped into a tree of navigation entries, each entry's
//! main content is rendered to a PDF buffer with headless Chrome, and the
//! buffers are concatenated in navigation order.
//!
//! ## Usage
//!
//! ```bash
//! docs2pdf --baseUrl https://docs.example.com --entryPoint https://docs.example.com/docs
//! ```
//!
//! Options can also come from a `scraper.config.json` found in the current
//! directory or any of its parents; command-line flags take precedence.

pub mod config;
pub mod fetch;
pub mod html;
pub mod pdf;
pub mod pdf_merger;
pub mod pipeline;
pub mod progress;
pub mod render;
pub mod sidebar;

pub use fetch::{HttpClient, HttpFetch};
pub use progress::{LogProgress, ProgressSink};
pub use render::{Chrome, PdfOptions, RenderedPage, Renderer};
pub use sidebar::SidebarNode;
