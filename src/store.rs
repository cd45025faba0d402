//! Metadata store: one JSON document per recording, mirrored on the source
//! tree, plus the two singleton documents for site settings and the about
//! page.

mod documents;
mod model;
mod singletons;

pub use documents::{DocumentEntry, MetadataStore};
pub use model::*;
pub use singletons::{AboutContent, SiteConfig};
