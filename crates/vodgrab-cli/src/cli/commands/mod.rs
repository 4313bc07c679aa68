//! CLI command handlers, one file per command.

pub(crate) mod completions;
pub(crate) mod download;
pub(crate) mod inspect;
pub(crate) mod manpage;
pub(crate) mod status;

pub use completions::run_completions;
pub use download::run_download;
pub use inspect::run_inspect;
pub use manpage::run_manpage;
pub use status::run_status;
