use anyhow::Result;
use std::path::Path;

use super::{save_sheet, Cell, Sheet};
use crate::URL_COLUMN;

/// Links cycled through when generating a sample sheet. Covers short links with and without a
/// share query, `v=` links, a link that is not a video and an empty cell.
const SAMPLE_VIDEOS: &[(&str, &str)] = &[
    ("Never Gonna Give You Up", "https://youtu.be/dQw4w9WgXcQ"),
    ("Shared with tracking", "https://youtu.be/CF52N-w4anI?si=abc"),
    ("Watch page link", "https://www.youtube.com/watch?v=jNQXAC9IVRw"),
    ("Watch page with playlist", "https://www.youtube.com/watch?v=9bZkp7q19f0&list=PL1"),
    ("Not a video", "https://example.com/not-youtube"),
    ("Missing link", ""),
];

/// Build a sheet of dummy links with the given number of data rows
pub fn sample_sheet(sheet_name: &str, rows: usize) -> Sheet {
    let headers = vec!["Title".to_string(), URL_COLUMN.to_string()];
    let rows = SAMPLE_VIDEOS
        .iter()
        .cycle()
        .take(rows)
        .map(|(title, url)| {
            let url = if url.is_empty() {
                Cell::Empty
            } else {
                Cell::Text(url.to_string())
            };
            vec![Cell::Text(title.to_string()), url]
        })
        .collect();

    Sheet::new(sheet_name, headers, rows)
}

/// Write a sample spreadsheet for manual testing
pub fn write_sample(path: &Path, sheet_name: &str, rows: usize) -> Result<()> {
    let sheet = sample_sheet(sheet_name, rows);
    save_sheet(path, &sheet)?;
    tracing::info!("Wrote {} sample rows to {}", rows, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::extract_video_id;

    #[test]
    fn test_sample_cycles_links() {
        let sheet = sample_sheet("Sheet1", 8);
        let url = sheet.require_column(URL_COLUMN).unwrap();
        assert_eq!(sheet.len(), 8);
        assert_eq!(sheet.cell(6, url), sheet.cell(0, url));
        assert!(sheet.cell(5, url).is_empty());
    }

    #[test]
    fn test_sample_covers_skips_and_ids() {
        let sheet = sample_sheet("Sheet1", SAMPLE_VIDEOS.len());
        let url = sheet.require_column(URL_COLUMN).unwrap();
        let ids: Vec<_> = (0..sheet.len())
            .map(|row| extract_video_id(sheet.cell(row, url)))
            .collect();
        assert_eq!(ids.iter().filter(|id| id.is_some()).count(), 4);
        assert_eq!(ids[4], None);
        assert_eq!(ids[5], None);
    }
}
