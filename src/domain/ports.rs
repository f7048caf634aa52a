use crate::utils::error::Result;

/// Byte source for the raw name tables.
pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
}

pub trait ConfigProvider {
    fn boys_file(&self) -> &str;
    fn girls_file(&self) -> &str;
    /// Metadata rows above the real header.
    fn skip_rows(&self) -> usize;
    /// Entries per list in the score report.
    fn list_size(&self) -> usize;
}
