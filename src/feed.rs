use crate::event::{Event, Status};
use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::io::Read;
use std::path::PathBuf;
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date};

/// CSV export of the activities spreadsheet
pub(crate) const DEFAULT_FEED_URL: &str = "https://docs.google.com/spreadsheets/d/12CGeY7acJRrVg05eYoNOY7TrO6tg2-FxqKAdnx0s7MU/export?format=csv&gid=0";

static DMY_FMT: &[FormatItem<'_>] =
    format_description!("[day padding:none]/[month padding:none]/[year]");

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

const START_LABELS: &[&str] = &["Data inicial", "Data de início", "Início"];
const END_LABELS: &[&str] = &["Data final", "Data de término", "Término"];
const SECTOR_LABELS: &[&str] = &["Setor / Área", "Setor"];
const RESPONSIBLE_LABELS: &[&str] = &["Responsável"];
const ACTIVITY_LABELS: &[&str] = &["Atividade"];
const STATUS_LABELS: &[&str] = &["Status"];

/// Anything that can produce the current set of events.  Implementations
/// must not fail: problems are logged and yield an empty list.
pub(crate) trait EventSource {
    fn fetch_events(&self) -> Vec<Event>;

    /// Where a person can look at the data behind the events, if anywhere
    fn sheet_link(&self) -> Option<String> {
        None
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum FeedSource {
    Url(String),
    File(PathBuf),
}

impl FeedSource {
    fn read_text(&self) -> Result<String, FeedError> {
        match self {
            FeedSource::Url(url) => {
                let response = reqwest::blocking::get(url)?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FeedError::Status(status));
                }
                Ok(response.text()?)
            }
            FeedSource::File(path) => fs::read_to_string(path).map_err(|source| FeedError::Read {
                path: path.clone(),
                source,
            }),
        }
    }

    pub(crate) fn load(&self) -> Result<Vec<Event>, FeedError> {
        let text = self.read_text()?;
        parse_events(text.as_bytes())
    }
}

impl EventSource for FeedSource {
    fn sheet_link(&self) -> Option<String> {
        match self {
            FeedSource::Url(url) => Some(edit_link(url).unwrap_or_else(|| url.clone())),
            FeedSource::File(_) => None,
        }
    }

    fn fetch_events(&self) -> Vec<Event> {
        match self.load() {
            Ok(events) => {
                tracing::info!(source = ?self, count = events.len(), "Loaded events from feed");
                events
            }
            Err(e) => {
                tracing::error!(source = ?self, error = %e, "Failed to load events from feed");
                Vec::new()
            }
        }
    }
}

/// Turns a Google Sheets export URL into the URL for viewing the sheet
fn edit_link(url: &str) -> Option<String> {
    const MARKER: &str = "/spreadsheets/d/";
    let start = url.find(MARKER)? + MARKER.len();
    let id_len = url[start..].find(['/', '?', '#']).unwrap_or(url.len() - start);
    if id_len == 0 {
        return None;
    }
    let base = &url[..start + id_len];
    let gid = url
        .split(['?', '&', '#'])
        .find_map(|param| param.strip_prefix("gid="));
    Some(match gid {
        Some(gid) => format!("{base}/edit?gid={gid}#gid={gid}"),
        None => format!("{base}/edit"),
    })
}

#[derive(Debug, Error)]
pub(crate) enum FeedError {
    #[error("failed to fetch feed")]
    Http(#[from] reqwest::Error),
    #[error("feed request returned {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to read feed from {}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse feed header")]
    Header(#[source] csv::Error),
}

/// Positions of the known columns within the header row
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
struct Columns {
    start: Option<usize>,
    end: Option<usize>,
    sector: Option<usize>,
    responsible: Option<usize>,
    activity: Option<usize>,
    status: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Columns {
        let labels = header
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect::<Vec<_>>();
        let find = |wanted: &[&str]| labels.iter().position(|h| wanted.contains(h));
        Columns {
            start: find(START_LABELS),
            end: find(END_LABELS),
            sector: find(SECTOR_LABELS),
            responsible: find(RESPONSIBLE_LABELS),
            activity: find(ACTIVITY_LABELS),
            status: find(STATUS_LABELS),
        }
    }

    // Returns `None` if the row has to be dropped
    fn event(&self, record: &StringRecord) -> Option<Event> {
        let cell = |col: Option<usize>| {
            col.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let end = parse_date(cell(self.end)?)?;
        let start = if self.start.is_some() {
            parse_date(cell(self.start)?)?
        } else {
            end
        };
        if start > end {
            return None;
        }
        Some(Event {
            start,
            end,
            sector: cell(self.sector)?.to_owned(),
            responsible: cell(self.responsible).map(ToOwned::to_owned),
            activity: cell(self.activity).map(ToOwned::to_owned),
            status: Status::from(cell(self.status).unwrap_or_default()),
        })
    }
}

/// Parses CSV text with a header row into events.  Rows that lack a
/// required field or carry an unparsable date are skipped.  Only a broken
/// header is reported as an error.
pub(crate) fn parse_events<R: Read>(reader: R) -> Result<Vec<Event>, FeedError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::from_header(reader.headers().map_err(FeedError::Header)?);
    if columns.end.is_none() || columns.sector.is_none() {
        tracing::warn!(
            ?columns,
            "Feed header lacks the end date or sector column; every row will be dropped"
        );
    }
    if columns.start.is_none() {
        tracing::debug!("Feed has no start date column; events last a single day");
    }
    let mut events = Vec::new();
    let mut dropped = 0usize;
    for (i, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(row = i + 1, error = %e, "Dropping malformed feed row");
                dropped += 1;
                continue;
            }
        };
        if record.iter().all(|s| s.trim().is_empty()) {
            continue;
        }
        match columns.event(&record) {
            Some(ev) => events.push(ev),
            None => {
                tracing::debug!(row = i + 1, ?record, "Dropping incomplete feed row");
                dropped += 1;
            }
        }
    }
    if dropped > 0 {
        tracing::info!(dropped, kept = events.len(), "Dropped invalid feed rows");
    }
    Ok(events)
}

/// Parses a date cell: `D/M/YYYY` when a slash is present, otherwise an ISO
/// date.  Either may be followed by a time of day, which is ignored.
pub(crate) fn parse_date(s: &str) -> Option<Date> {
    let s = s.trim();
    if s.contains('/') {
        let (dmy, time) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let time = time.trim_start();
        let is_time = time.starts_with(|c: char| c.is_ascii_digit()) && time.contains(':');
        if !time.is_empty() && !is_time {
            return None;
        }
        Date::parse(dmy, &DMY_FMT).ok()
    } else {
        let ymd = s.get(..10).unwrap_or(s);
        if ymd.len() < s.len() && !s[ymd.len()..].starts_with(['T', 't', ' ']) {
            return None;
        }
        Date::parse(ymd, &YMD_FMT).ok()
    }
}
