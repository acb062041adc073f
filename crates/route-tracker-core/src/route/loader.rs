use std::borrow::Cow;
use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::route::{Checklist, ChecklistEntry};

/// Parse route text, one `Name<TAB>Type<TAB>Threshold[<TAB>Coordinates]` per line.
///
/// Blank lines, lines with fewer than three fields, blank names and
/// non-integer thresholds are skipped.
pub fn parse_route(content: &str) -> Vec<ChecklistEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let entry = parse_line(line);
            if entry.is_none() && !line.trim().is_empty() {
                trace!("Skipping route line {}: {:?}", index + 1, line);
            }
            entry
        })
        .collect()
}

fn parse_line(line: &str) -> Option<ChecklistEntry> {
    let mut fields = line.split('\t').map(str::trim);
    let name = fields.next().filter(|name| !name.is_empty())?;
    let type_tag = fields.next()?;
    let threshold = fields.next()?.parse::<i32>().ok()?;

    let entry = ChecklistEntry::new(name, type_tag, threshold);
    Some(match fields.next().filter(|coords| !coords.is_empty()) {
        Some(coords) => entry.with_coordinates(coords),
        None => entry,
    })
}

/// Decode route file bytes.
///
/// A byte-order mark selects its encoding; otherwise UTF-8 is tried first
/// and Windows-1252 (what spreadsheet exports commonly produce) is the
/// fallback.
pub fn decode_route_bytes(bytes: &[u8]) -> Cow<'_, str> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text;
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            debug!("Route file is not UTF-8, decoding as Windows-1252");
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text
        }
    }
}

/// Load a route file into a fresh checklist
pub fn load_route_file<P: AsRef<Path>>(path: P) -> Result<Checklist> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let entries = parse_route(&decode_route_bytes(&bytes));

    if entries.is_empty() {
        return Err(Error::EmptyRoute(path.to_path_buf()));
    }

    debug!("Loaded {} route entries from {}", entries.len(), path.display());
    Ok(Checklist::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::EntryKind;
    use crate::stats::Stat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_route() {
        let content = "Viewpoint Havana\tViewpoint\t1\n\
                       \n\
                       Too short\tchest\n\
                       \tchest\t3\n\
                       Bad threshold\tchest\tmany\n\
                       Chest Nassau\t Chests \t 12 \t-400, 220\n\
                       Upgrade hull\tUpgrades\t0\t\n";

        let entries = parse_route(content);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].name, "Viewpoint Havana");
        assert_eq!(entries[0].kind, EntryKind::Counter(Stat::Viewpoints));
        assert_eq!(entries[0].coordinates, None);

        assert_eq!(entries[1].type_tag, "Chests");
        assert_eq!(entries[1].threshold, 12);
        assert_eq!(entries[1].display_text(), "Chest Nassau [-400, 220]");

        assert_eq!(entries[2].kind, EntryKind::Manual);
        assert_eq!(entries[2].coordinates, None);
        assert!(entries.iter().all(|entry| !entry.completed));
    }

    #[test]
    fn test_parse_route_crlf_and_negative_threshold() {
        let entries = parse_route("A\tfort\t2\r\nB\tfort\t-1\r\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].threshold, 2);
        assert_eq!(entries[1].threshold, -1);
    }

    #[test]
    fn test_decode_utf8_bom() {
        let bytes = b"\xEF\xBB\xBFCaf\xC3\xA9\tfort\t1";
        assert_eq!(decode_route_bytes(bytes), "Café\tfort\t1");
    }

    #[test]
    fn test_decode_windows_1252_fallback() {
        let bytes = b"Caf\xE9\tfort\t1";
        assert_eq!(decode_route_bytes(bytes), "Café\tfort\t1");
    }

    #[test]
    fn test_load_route_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Fort Charlotte\tfort\t1").unwrap();
        writeln!(file, "Kingston Tavern\ttavern\t1").unwrap();

        let checklist = load_route_file(file.path()).unwrap();
        assert_eq!(checklist.len(), 2);
        assert_eq!(checklist.entries()[1].name, "Kingston Tavern");
    }

    #[test]
    fn test_load_empty_route_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "just a comment").unwrap();

        let err = load_route_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::EmptyRoute(_)));
    }

    #[test]
    fn test_load_missing_route_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_route_file(dir.path().join("missing.tsv")).unwrap_err();
        assert!(err.is_not_found());
    }
}
