//! CLI command handlers, one file per subcommand.

mod download;
mod status;

pub use download::run_download;
pub use status::run_status;

#[cfg(test)]
pub(crate) use download::{filter_from_args, page_size_from_args};
#[cfg(test)]
pub(crate) use status::render_status;
