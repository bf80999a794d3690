//! Builds the `./Results/<network_name><start_iso>` directory name (§7),
//! with colons and dots mapped to filesystem-safe characters.

use chrono::{DateTime, Utc};

pub fn results_dir_name(network_name: &str, start: DateTime<Utc>) -> String {
    let iso = start.to_rfc3339();
    let sanitized: String = iso.chars().map(|c| match c {
        ':' => '-',
        '.' => '_',
        other => other,
    }).collect();
    format!("{network_name}{sanitized}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn sanitizes_colons_and_dots() {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let name = results_dir_name("net", t);
        assert!(!name.contains(':'));
        assert!(name.starts_with("net2024-03-01"));
    }
}
