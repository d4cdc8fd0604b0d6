//! Page model, virtual page generators and the build pipeline for Quire.
//!
//! A build turns content documents into [`Page`]s, converts them, runs the
//! [`generator`] passes (sections, aliases, taxonomies, homepage,
//! pagination), assembles [`Menus`], resolves a layout per page and renders.
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use quire_config::Config;
//! use quire_site::Site;
//!
//! let config = Config::load(None, None)?;
//! let site = Site::open(config)?;
//! let report = site.build(&mut |progress| eprintln!("{}", progress.message))?;
//! println!("{} pages written", report.written.len());
//! # Ok(())
//! # }
//! ```

mod build;
mod collection;
mod content;
mod frontmatter;
pub mod generator;
mod layout;
mod menu;
mod page;
mod progress;

pub use build::{
    BuildError, BuildReport, DroppedDocument, Loaded, Plan, PlannedPage, Site, SkippedPage,
    check_structure, output_path, render_plan,
};
pub use collection::{CollectionError, PageCollection};
pub use content::{Converted, convert_page, create_page};
pub use frontmatter::{ConversionError, convert as convert_frontmatter, parse_date, split as split_frontmatter};
pub use layout::{FsProbe, LayoutError, TemplateProbe, candidates, resolve};
pub use menu::{Entry, Menu, MenuSpec, Menus, assemble_menus};
pub use page::{NodeType, Page, PageRef};
pub use progress::{Progress, ProgressFn, Step};
