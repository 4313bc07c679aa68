//! URL-derived names: part file extensions and storage directory names.

mod path;
mod sanitize;

pub use path::{extension_from_url_path, filename_from_url_path};
pub use sanitize::storage_dir_name;
