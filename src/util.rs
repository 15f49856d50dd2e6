use std::path::Path;

use chrono::Utc;
use rand::{thread_rng, Rng};


const MAX_EXTENSION_LEN: usize = 10;


pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Builds `<millis>-<random>` with an optional extension appended.
pub fn generate_upload_name(ext: Option<&str>) -> String {
    let suffix: u32 = thread_rng().gen_range(0..1_000_000_000);

    match ext {
        Some(ext) => format!("{}-{}.{}", now_millis(), suffix, ext),
        None => format!("{}-{}", now_millis(), suffix),
    }
}

/// Extension of a client supplied file name, if it is safe to reuse.
pub fn file_extension(file_name: &str) -> Option<&str> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| is_safe_extension(ext))
}

pub fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
}
