//! CSV output in the import target's column layout.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Local};
use cmcsv_core::{OutputRecord, CSV_HEADER};

/// Attempts at a free file name before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// `out-YYYY-MM-DD_HH-MM-SS.csv` for the given wall-clock time, with a
/// `-N` suffix for the N-th retry when that name is taken.
pub(crate) fn output_file_name(now: DateTime<Local>, attempt: u32) -> String {
    let stamp = now.format("%Y-%m-%d_%H-%M-%S");
    if attempt == 0 {
        format!("out-{stamp}.csv")
    } else {
        format!("out-{stamp}-{attempt}.csv")
    }
}

/// Writes the header and one row per record to `writer`.
pub(crate) fn write_records<W: Write>(writer: W, records: &[OutputRecord]) -> anyhow::Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for record in records {
        csv.write_record(record.csv_fields())?;
    }
    csv.flush()?;
    Ok(())
}

/// Writes `records` to a new timestamped file in `dir` and returns its path.
/// An existing file is never overwritten.
pub(crate) fn write_output_file(dir: &Path, records: &[OutputRecord]) -> anyhow::Result<PathBuf> {
    write_output_file_at(dir, Local::now(), records)
}

fn write_output_file_at(
    dir: &Path,
    now: DateTime<Local>,
    records: &[OutputRecord],
) -> anyhow::Result<PathBuf> {
    let (path, file) = create_unique(dir, now)?;
    write_records(std::io::BufWriter::new(file), records)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(path)
}

fn create_unique(dir: &Path, now: DateTime<Local>) -> anyhow::Result<(PathBuf, File)> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let path = dir.join(output_file_name(now, attempt));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to create output file {}", path.display()));
            }
        }
    }
    anyhow::bail!(
        "no free output file name in {} after {MAX_NAME_ATTEMPTS} attempts",
        dir.display()
    )
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::str::FromStr;

    use chrono::TimeZone;
    use cmcsv_core::{Condition, Finish, MatchConfidence};
    use rust_decimal::Decimal;

    use super::*;

    fn record(id: Option<&str>, name: &str) -> OutputRecord {
        OutputRecord {
            quantity: NonZeroU32::new(2).unwrap(),
            name: name.to_owned(),
            finish: Finish::Foil,
            condition: Some(Condition::NearMint),
            language: Some("en".to_owned()),
            price_usd: Some(Decimal::from_str("1.5").unwrap()),
            canonical_id: id.map(str::to_owned),
            confidence: if id.is_some() {
                MatchConfidence::Exact
            } else {
                MatchConfidence::NoMatch
            },
            needs_manual_review: id.is_none(),
            candidates: Vec::new(),
        }
    }

    fn render(records: &[OutputRecord]) -> String {
        let mut buf = Vec::new();
        write_records(&mut buf, records).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn file_name_uses_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(output_file_name(now, 0), "out-2024-03-09_07-05-01.csv");
        assert_eq!(output_file_name(now, 2), "out-2024-03-09_07-05-01-2.csv");
    }

    #[test]
    fn same_second_runs_do_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();

        let first = write_output_file_at(dir.path(), now, &[record(Some("abc"), "Sol Ring")]).unwrap();
        let second = write_output_file_at(dir.path(), now, &[record(None, "Forest")]).unwrap();

        assert_ne!(first, second);
        assert_eq!(second.file_name().unwrap(), "out-2024-03-09_07-05-01-1.csv");
        assert!(std::fs::read_to_string(&first).unwrap().contains("Sol Ring"));
        assert!(std::fs::read_to_string(&second).unwrap().contains("Forest"));
    }

    #[test]
    fn writes_header_and_rows() {
        let csv = render(&[record(Some("abc"), "Sol Ring"), record(None, "Forest")]);
        assert_eq!(
            csv,
            "quantity,name,finish,condition,ignore,language,price,scryfall_id\n\
             2,Sol Ring,Foil,NM,,en,1.50,abc\n\
             2,Forest,Foil,NM,,en,1.50,MANUAL_REVIEW\n"
        );
    }

    #[test]
    fn names_with_commas_are_quoted() {
        let csv = render(&[record(Some("x"), "Borborygmos, Enraged")]);
        assert!(csv.contains("\"Borborygmos, Enraged\""));
    }

    #[test]
    fn empty_record_list_still_has_header() {
        assert_eq!(
            render(&[]),
            "quantity,name,finish,condition,ignore,language,price,scryfall_id\n"
        );
    }
}
