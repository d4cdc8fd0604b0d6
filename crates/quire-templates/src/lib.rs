//! Template environment for rendering Quire pages.
//!
//! [`Templates`] wraps a minijinja environment whose loader searches an ordered
//! list of layout directories (local layouts first, then the theme), with a
//! built-in `redirect.html` used for alias pages. Templates get these helpers:
//!
//! - `url(path)` function and filter: absolute URL under the site base URL
//! - `excerpt(length=450, suffix="…")`: tag-stripped, truncated text
//! - `urlize`: slug a string the way page paths are slugged
//! - `date(format="%B %-d, %Y")`: format a page date
//!
//! Output is not auto-escaped: page bodies are already HTML.

mod engine;
mod filters;

pub use engine::{REDIRECT_TEMPLATE, TemplateError, TemplateRenderer, Templates};
