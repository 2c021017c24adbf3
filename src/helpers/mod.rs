//! Helper functions shared by the content store, the image pipeline and
//! the views: URL building, HTML text utilities and date formatting.

mod date;
mod hash;
mod html;
mod url;

pub use date::*;
pub use hash::*;
pub use html::*;
pub use url::*;
