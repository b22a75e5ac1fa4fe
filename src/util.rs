use std::time::{SystemTime, UNIX_EPOCH};

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Length as counted by the share targets' text fields (UTF-16 code units).
pub(crate) fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}
