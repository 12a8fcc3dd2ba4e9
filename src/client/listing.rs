//! Directory listing parser.
//!
//! `ls` output is free text: entry lines carry a name, attribute letters,
//! a size and a ctime-style date, surrounded by banners and a blocks
//! footer. Lines that do not look like entries are discarded; a date that
//! does not parse degrades to its raw text instead of failing the call.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use log::trace;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Name, then attribute letters, then the size integer. The name is the
/// longest prefix before a metadata block.
static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*[^ \t])[ \t]+[ABDHNRS]+[ \t]+[0-9]+").expect("entry pattern")
});

static SIZE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("size pattern"));

/// The date text sits after the two-space padding that follows the size.
static DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]  ([^0-9].*)$").expect("date pattern"));

const DATE_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Entry kind as reported by the listing's attribute letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// Modification time of a listed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Modified {
    /// The date column parsed as a timestamp.
    Timestamp(NaiveDateTime),

    /// The date column kept verbatim (empty when the line had none).
    Raw(String),
}

/// One parsed listing line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingEntry {
    pub name: String,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub modified: Modified,
}

/// Name-keyed directory listing, sorted by name ascending.
pub type Listing = IndexMap<String, ListingEntry>;

/// Parse raw `ls` output into a listing.
///
/// Rebuilt fresh on every call; an empty result is a valid outcome.
pub fn parse_listing(raw: &str) -> Listing {
    let mut listing = Listing::new();

    for line in raw.lines() {
        let line = line.trim();
        let Some((name, rest)) = split_entry(line) else {
            if !line.is_empty() {
                trace!("skipping non-entry line: {line:?}");
            }
            continue;
        };

        let rest = rest.trim();
        let kind = if rest.starts_with('D') {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let size = SIZE.find(rest).and_then(|m| m.as_str().parse().ok());
        let date = DATE
            .captures(rest)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let modified = match NaiveDateTime::parse_from_str(date.trim(), DATE_FORMAT) {
            Ok(timestamp) => Modified::Timestamp(timestamp),
            Err(_) => Modified::Raw(date),
        };

        listing.insert(
            name.to_string(),
            ListingEntry {
                name: name.to_string(),
                kind,
                size,
                modified,
            },
        );
    }

    listing.sort_keys();
    listing
}

/// Split an entry line into its name and the metadata remainder.
///
/// Falls back to the literal current/parent-directory markers; anything
/// else is not an entry.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    if let Some(m) = ENTRY.captures(line).and_then(|caps| caps.get(1)) {
        return Some((m.as_str(), &line[m.end()..]));
    }
    if let Some(rest) = line.strip_prefix("..") {
        return Some(("..", rest));
    }
    if let Some(rest) = line.strip_prefix('.') {
        return Some((".", rest));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn timestamp(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Modified {
        Modified::Timestamp(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, min, s)
                .unwrap(),
        )
    }

    #[test]
    fn test_parse_file_entry() {
        let listing =
            parse_listing("testfile1.txt          A     5  Mon Jan  1 00:00:00 2024");
        let entry = &listing["testfile1.txt"];
        assert_eq!(entry.name, "testfile1.txt");
        assert_eq!(entry.kind, EntryKind::File);
        assert_eq!(entry.size, Some(5));
        assert_eq!(entry.modified, timestamp(2024, 1, 1, 0, 0, 0));
    }

    #[test]
    fn test_parse_directory_entry() {
        let listing = parse_listing("subdir                    D        0  Tue Feb 20 12:30:45 2024");
        let entry = &listing["subdir"];
        assert_eq!(entry.kind, EntryKind::Directory);
        assert_eq!(entry.size, Some(0));
        assert_eq!(entry.modified, timestamp(2024, 2, 20, 12, 30, 45));
    }

    #[test]
    fn test_name_with_spaces() {
        let listing = parse_listing(
            "my dir with   consecutive spaces in name     D   0  Mon Jan  1 00:00:00 2024",
        );
        assert!(listing.contains_key("my dir with   consecutive spaces in name"));
    }

    #[test]
    fn test_dot_entries() {
        let raw = "\
  .                                   D        0  Mon Jan  1 00:00:00 2024
  ..                                  D        0  Mon Jan  1 00:00:00 2024
";
        let listing = parse_listing(raw);
        assert_eq!(listing[&".".to_string()].kind, EntryKind::Directory);
        assert_eq!(listing[&"..".to_string()].kind, EntryKind::Directory);
    }

    #[test]
    fn test_headers_and_footer_discarded() {
        let raw = "\
Domain=[WORKGROUP] OS=[Unix] Server=[Samba 4.15.13]
  testfile1.txt                       A        5  Mon Jan  1 00:00:00 2024

\t\t65535 blocks of size 1024. 65000 blocks available
";
        let listing = parse_listing(raw);
        assert_eq!(listing.len(), 1);
        assert!(listing.contains_key("testfile1.txt"));
    }

    #[test]
    fn test_empty_listing_is_valid() {
        assert!(parse_listing("").is_empty());
        assert!(parse_listing("\t\t65535 blocks of size 1024. 65000 blocks available\n").is_empty());
    }

    #[test]
    fn test_unparseable_date_degrades_to_raw() {
        let listing = parse_listing("weird.txt     A    12  sometime last week");
        assert_eq!(
            listing["weird.txt"].modified,
            Modified::Raw("sometime last week".to_string())
        );
    }

    #[test]
    fn test_missing_date_degrades_to_empty_raw() {
        let listing = parse_listing("nodate.txt     A    7");
        let entry = &listing["nodate.txt"];
        assert_eq!(entry.size, Some(7));
        assert_eq!(entry.modified, Modified::Raw(String::new()));
    }

    #[test]
    fn test_sorted_by_name() {
        let raw = "\
  zebra.txt        A   1  Mon Jan  1 00:00:00 2024
  alpha.txt        A   2  Mon Jan  1 00:00:00 2024
  midway           D   0  Mon Jan  1 00:00:00 2024
";
        let listing = parse_listing(raw);
        let names: Vec<&str> = listing.keys().map(|name| name.as_str()).collect();
        assert_eq!(names, ["alpha.txt", "midway", "zebra.txt"]);
    }

    #[test]
    fn test_double_digit_day() {
        let listing = parse_listing("report.pdf     A    2048  Wed Nov 13 08:15:00 2024");
        assert_eq!(
            listing["report.pdf"].modified,
            timestamp(2024, 11, 13, 8, 15, 0)
        );
    }

    #[test]
    fn test_duplicate_name_last_write_wins() {
        let raw = "\
  twice.txt        A   1  Mon Jan  1 00:00:00 2024
  twice.txt        A   2  Mon Jan  1 00:00:00 2024
";
        let listing = parse_listing(raw);
        assert_eq!(listing.len(), 1);
        assert_eq!(listing["twice.txt"].size, Some(2));
    }
}
