//! Entry-table helpers: search filtering, paging, and CSV export.
//!
//! All pure except [`download_csv`], which hands the generated file to the
//! platform (an object-URL anchor click on web, the downloads directory on
//! native).

use api::Entry;

/// Rows shown per table page.
pub const PAGE_SIZE: usize = 5;

/// Substring match over the three visible columns. An empty term keeps
/// everything.
pub fn filter_entries<'a>(entries: &'a [Entry], term: &str) -> Vec<&'a Entry> {
    if term.is_empty() {
        return entries.iter().collect();
    }
    entries
        .iter()
        .filter(|e| e.number.contains(term) || e.cab_out.contains(term) || e.block.contains(term))
        .collect()
}

/// True if `number` is already present in the loaded entries. A fast local
/// pre-check; the server enforces the same rule authoritatively.
pub fn duplicate_number(entries: &[Entry], number: &str) -> bool {
    entries.iter().any(|e| e.number == number)
}

/// One-indexed pagination over a filtered row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub page: usize,
    pub total: usize,
}

impl Pager {
    /// Build a pager, clamping the requested page into range. Shrinking the
    /// row set (a narrower search) can strand a stale page index; clamping
    /// keeps the view on the last page instead of an empty one.
    pub fn new(total: usize, page: usize) -> Self {
        let mut pager = Self { page: 1, total };
        pager.page = page.clamp(1, pager.page_count());
        pager
    }

    pub fn page_count(&self) -> usize {
        self.total.div_ceil(PAGE_SIZE).max(1)
    }

    /// Index range of the current page's rows.
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = (self.page - 1) * PAGE_SIZE;
        start..(start + PAGE_SIZE).min(self.total)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }
}

/// Export file name for a cabinet's entries.
pub fn csv_filename(cabinet: &str) -> String {
    format!("{cabinet}-entries.csv")
}

/// Render rows to CSV, all rows regardless of paging.
pub fn entries_csv(entries: &[&Entry]) -> String {
    let mut csv = String::from("Number,Cab Out,Block,Date\n");
    for entry in entries {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            entry.number,
            entry.cab_out,
            entry.block,
            format_timestamp(entry.timestamp)
        ));
    }
    csv
}

/// Save a CSV export through the browser: a Blob behind a temporary object
/// URL, clicked via a synthetic anchor.
#[cfg(target_arch = "wasm32")]
pub fn download_csv(filename: &str, content: &str) -> Result<(), String> {
    use wasm_bindgen::JsCast;

    let parts = js_sys::Array::new();
    parts.push(&wasm_bindgen::JsValue::from_str(content));
    let props = web_sys::BlobPropertyBag::new();
    props.set_type("text/csv");
    let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &props)
        .map_err(|e| format!("{e:?}"))?;
    let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(|e| format!("{e:?}"))?;

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or("no document")?;
    let anchor: web_sys::HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| format!("{e:?}"))?
        .dyn_into()
        .map_err(|e| format!("{e:?}"))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();

    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}

/// Save a CSV export to the downloads directory (home as a fallback).
#[cfg(not(target_arch = "wasm32"))]
pub fn download_csv(filename: &str, content: &str) -> Result<(), String> {
    let dir = dirs::download_dir()
        .or_else(dirs::home_dir)
        .ok_or("no download directory")?;
    let path = dir.join(filename);
    std::fs::write(&path, content).map_err(|e| e.to_string())?;
    tracing::info!(path = %path.display(), "saved export");
    Ok(())
}

/// Entry timestamp (epoch milliseconds) in the viewer's locale.
#[cfg(target_arch = "wasm32")]
pub fn format_timestamp(millis: i64) -> String {
    let date = js_sys::Date::new(&wasm_bindgen::JsValue::from_f64(millis as f64));
    date.to_locale_string("default", &wasm_bindgen::JsValue::UNDEFINED)
        .into()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn format_timestamp(millis: i64) -> String {
    use chrono::TimeZone;

    match chrono::Local.timestamp_millis_opt(millis) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(number: &str, cab_out: &str, block: &str) -> Entry {
        Entry {
            id: format!("e-{number}"),
            user_id: "u1".to_string(),
            cabinet_code: "03-3-20-53".to_string(),
            number: number.to_string(),
            cab_out: cab_out.to_string(),
            block: block.to_string(),
            timestamp: 1_700_000_000_000,
        }
    }

    #[test]
    fn filter_matches_any_column() {
        let entries = vec![entry("1234", "50", "10"), entry("5678", "12", "3")];

        assert_eq!(filter_entries(&entries, "").len(), 2);
        assert_eq!(filter_entries(&entries, "123")[0].number, "1234");
        // "12" appears in the first row's number and the second row's cab out.
        assert_eq!(filter_entries(&entries, "12").len(), 2);
        assert!(filter_entries(&entries, "99").is_empty());
    }

    #[test]
    fn duplicate_check_is_exact() {
        let entries = vec![entry("1234", "50", "10")];
        assert!(duplicate_number(&entries, "1234"));
        assert!(!duplicate_number(&entries, "123"));
        assert!(!duplicate_number(&entries, "12345"));
    }

    #[test]
    fn pager_splits_into_pages_of_five() {
        let pager = Pager::new(12, 1);
        assert_eq!(pager.page_count(), 3);
        assert_eq!(pager.range(), 0..5);
        assert!(!pager.has_prev());
        assert!(pager.has_next());

        let last = Pager::new(12, 3);
        assert_eq!(last.range(), 10..12);
        assert!(last.has_prev());
        assert!(!last.has_next());
    }

    #[test]
    fn pager_clamps_out_of_range_pages() {
        // A narrowed search can leave the page index past the end.
        assert_eq!(Pager::new(6, 9).page, 2);
        assert_eq!(Pager::new(6, 0).page, 1);

        let empty = Pager::new(0, 4);
        assert_eq!(empty.page, 1);
        assert_eq!(empty.page_count(), 1);
        assert_eq!(empty.range(), 0..0);
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let entries = vec![entry("1234", "50", "10"), entry("5678", "12", "3")];
        let rows: Vec<&Entry> = entries.iter().collect();

        let csv = entries_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Number,Cab Out,Block,Date");
        assert!(lines[1].starts_with("1234,50,10,"));
        assert!(lines[2].starts_with("5678,12,3,"));
    }

    #[test]
    fn csv_filename_includes_the_cabinet() {
        assert_eq!(csv_filename("03-3-20-53"), "03-3-20-53-entries.csv");
    }
}
