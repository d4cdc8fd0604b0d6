//! Markdown to HTML conversion for Quire pages.
//!
//! [`MarkdownConverter`] turns a page body into HTML with the extensions a
//! blog-style site needs (tables, footnotes, strikethrough, task lists), and
//! optionally rewrites relative `.md` links to site URLs. [`urlize`] is the
//! slug function shared by page identifiers and templates.
//!
//! # Example
//!
//! ```
//! use quire_renderer::MarkdownConverter;
//!
//! let result = MarkdownConverter::new()
//!     .with_title_extraction()
//!     .convert("# Hello\n\n**Bold** text");
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! ```

mod html;
mod util;

pub use html::{MarkdownConverter, RenderResult};
pub use util::{escape_html, resolve_link, urlize};
