mod remove_splitter;
mod reverse;

pub use remove_splitter::RemoveSplitter;
pub use reverse::Reverse;
