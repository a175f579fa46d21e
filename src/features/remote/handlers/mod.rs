pub mod remote_handler;

pub use remote_handler::{__path_download_by_url, download_by_url};
