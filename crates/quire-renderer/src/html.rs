//! Markdown to HTML converter.
//!
//! Produces HTML5 output with pulldown-cmark, optionally capturing the first
//! H1 as the page title and rewriting relative `.md` links.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};

use crate::util::resolve_link;

/// Result of converting a markdown body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered HTML.
    pub html: String,
    /// Text of the first H1 heading (if title extraction was enabled).
    pub title: Option<String>,
}

/// Markdown to HTML converter.
///
/// Converts with GitHub-flavored extensions enabled: tables, footnotes,
/// strikethrough and task lists.
#[derive(Debug, Clone)]
pub struct MarkdownConverter {
    options: Options,
    extract_title: bool,
    link_base: Option<String>,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// Create a converter with the default extension set.
    #[must_use]
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        Self {
            options,
            extract_title: false,
            link_base: None,
        }
    }

    /// Enable title extraction from the first H1 heading.
    ///
    /// The heading is still rendered in the output.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.extract_title = true;
        self
    }

    /// Rewrite relative `.md` links against `base_dir` (the linking page's directory).
    #[must_use]
    pub fn with_link_base(mut self, base_dir: impl Into<String>) -> Self {
        self.link_base = Some(base_dir.into());
        self
    }

    /// Convert markdown to HTML.
    #[must_use]
    pub fn convert(&self, markdown: &str) -> RenderResult {
        let mut title: Option<String> = None;
        let mut capturing: Option<String> = None;

        let events = Parser::new_ext(markdown, self.options).map(|event| match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if self.extract_title && title.is_none() && capturing.is_none() => {
                capturing = Some(String::new());
                event
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if capturing.is_some() => {
                title = capturing.take().map(|t| t.trim().to_owned());
                event
            }
            Event::Text(ref text) | Event::Code(ref text) => {
                if let Some(buf) = capturing.as_mut() {
                    buf.push_str(text);
                }
                event
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title: link_title,
                id,
            }) => {
                let dest_url = match &self.link_base {
                    Some(base) => CowStr::from(resolve_link(&dest_url, base)),
                    None => dest_url,
                };
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title: link_title,
                    id,
                })
            }
            other => other,
        });

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events);

        RenderResult {
            html: output,
            title: title.filter(|t| !t.is_empty()),
        }
    }
}
