const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human readable size with one decimal, binary multiples.
pub fn format_size(bytes: u64) -> String {
    let mut n = bytes as f64;
    for unit in UNITS {
        if n < 1024.0 {
            return format!("{:.1} {}", n, unit);
        }
        n /= 1024.0;
    }
    format!("{:.1} TB", n)
}
