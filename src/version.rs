/// Crate version, reported to the data store in the User-Agent header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
