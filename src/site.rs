//! Static site generation: turns the record set into a publish tree with a
//! listing page, an about page, staged audio and the discovery files.

mod generator;
mod publish;
mod render;
mod seo;

pub use generator::{Generator, listing_order};
pub use render::HtmlRenderer;

#[cfg(test)]
mod tests;
