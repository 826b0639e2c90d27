//! Document acquisition: folder listing, fetching and text extraction

mod extractor;
mod fetcher;
mod lister;

pub use extractor::TextExtractor;
pub use fetcher::DocumentFetcher;
pub use lister::FolderLister;
