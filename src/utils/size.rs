//! Human readable sizes and counts for reports.

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;

/// Truncating byte count: `512 bytes`, `3 KB`, `12 MB`.
pub fn display_size(bytes: u64) -> String {
    match bytes {
        b if b >= GB => format!("{} GB", b / GB),
        b if b >= MB => format!("{} MB", b / MB),
        b if b >= KB => format!("{} KB", b / KB),
        b => format!("{b} bytes"),
    }
}

/// Size change between two measurements: `43% size decrease`.
pub fn change_percent(original: u64, size: u64) -> String {
    if original == 0 {
        return "not changed".to_string();
    }
    let percent = (original as i128 - size as i128) * 100 / original as i128;
    match percent {
        0 => "not changed".to_string(),
        p if p > 0 => format!("{p}% size decrease"),
        p => format!("{}% size increase(!)", -p),
    }
}

/// `1 page`, `3 pages`.
pub fn plural_count(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_size() {
        assert_eq!(display_size(0), "0 bytes");
        assert_eq!(display_size(1023), "1023 bytes");
        assert_eq!(display_size(1024), "1 KB");
        assert_eq!(display_size(5 * MB + 10), "5 MB");
        assert_eq!(display_size(2 * GB), "2 GB");
    }

    #[test]
    fn test_change_percent() {
        assert_eq!(change_percent(100, 57), "43% size decrease");
        assert_eq!(change_percent(100, 100), "not changed");
        assert_eq!(change_percent(100, 120), "20% size increase(!)");
        assert_eq!(change_percent(0, 10), "not changed");
    }

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(1, "page"), "1 page");
        assert_eq!(plural_count(0, "page"), "0 pages");
        assert_eq!(plural_count(4, "resource"), "4 resources");
    }
}
