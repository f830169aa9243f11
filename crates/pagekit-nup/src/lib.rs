mod constants;
pub mod layout;
mod options;
mod process;
mod progress;
mod render;
mod types;

pub use constants::PDF_MIME;
pub use options::NUpOptions;
pub use process::{derive_filename, process};
pub use progress::{CancelFlag, ProgressSink};
pub use types::*;
