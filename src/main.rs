mod app;
mod calendar;
mod detail;
mod event;
mod feed;
mod filter;
mod help;
mod jumpto;
mod loader;
mod logging;
mod theme;
use crate::app::App;
use crate::calendar::MonthGrid;
use crate::feed::{FeedSource, DEFAULT_FEED_URL};
use crate::loader::Loader;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// Environment variable naming the CSV feed URL
const URL_VAR: &str = "SHEETCAL_URL";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        date: Option<Date>,
        source: Option<FeedSource>,
        log_file: Option<PathBuf>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut date = None;
        let mut url = None;
        let mut file = None;
        let mut log_file = None;
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('u') | Arg::Long("url") => url = Some(parser.value()?.string()?),
                Arg::Short('f') | Arg::Long("file") => file = Some(PathBuf::from(parser.value()?)),
                Arg::Long("log-file") => log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if date.is_none() => {
                    let value = value.string()?;
                    match Date::parse(&value, &YMD_FMT) {
                        Ok(d) => date = Some(d),
                        Err(e) => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: Box::new(e),
                            })
                        }
                    }
                }
                _ => return Err(arg.unexpected()),
            }
        }
        // A local file takes precedence over any URL
        let source = file
            .map(FeedSource::File)
            .or_else(|| url.map(FeedSource::Url));
        Ok(Command::Run {
            date,
            source,
            log_file,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                date,
                source,
                log_file,
            } => {
                if let Some(path) = log_file
                    .or_else(|| std::env::var_os(logging::LOG_FILE_VAR).map(PathBuf::from))
                    .or_else(logging::default_log_file)
                {
                    logging::init(&path);
                }
                let source = source.unwrap_or_else(|| {
                    FeedSource::Url(
                        std::env::var(URL_VAR).unwrap_or_else(|_| DEFAULT_FEED_URL.to_owned()),
                    )
                });
                tracing::info!(?source, "Using event feed");
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let grid = MonthGrid::new(date.unwrap_or(today))
                    .context("failed to lay out the requested month")?;
                with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(today, grid, Loader::new(source)).run(terminal)?;
                    Ok(())
                })
            }
            Command::Help => {
                println!("Usage: sheetcal [<options>] [YYYY-MM-DD]");
                println!();
                println!("Monthly terminal calendar of the activities in a shared spreadsheet");
                println!();
                println!("Options:");
                println!("  -u, --url <URL>        Fetch events from the CSV at the given URL");
                println!("                         [env: {URL_VAR}]");
                println!("  -f, --file <PATH>      Read events from a local CSV file");
                println!("      --log-file <PATH>  Write logs to the given file");
                println!("                         [env: {}]", logging::LOG_FILE_VAR);
                println!("  -h, --help             Display this help message and exit");
                println!("  -V, --version          Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn parse(args: &[&str]) -> Result<Command, lexopt::Error> {
        Command::from_parser(Parser::from_iter(
            std::iter::once("sheetcal").chain(args.iter().copied()),
        ))
    }

    #[test]
    fn test_no_args() {
        assert_eq!(
            parse(&[]).unwrap(),
            Command::Run {
                date: None,
                source: None,
                log_file: None,
            }
        );
    }

    #[test]
    fn test_date_and_url() {
        assert_eq!(
            parse(&["--url", "https://example.com/feed.csv", "2026-03-18"]).unwrap(),
            Command::Run {
                date: Some(date!(2026 - 03 - 18)),
                source: Some(FeedSource::Url(String::from(
                    "https://example.com/feed.csv"
                ))),
                log_file: None,
            }
        );
    }

    #[test]
    fn test_file_beats_url() {
        assert_eq!(
            parse(&["-u", "https://example.com/feed.csv", "-f", "events.csv"]).unwrap(),
            Command::Run {
                date: None,
                source: Some(FeedSource::File(PathBuf::from("events.csv"))),
                log_file: None,
            }
        );
    }

    #[test]
    fn test_log_file() {
        assert_eq!(
            parse(&["--log-file", "/tmp/sheetcal.log"]).unwrap(),
            Command::Run {
                date: None,
                source: None,
                log_file: Some(PathBuf::from("/tmp/sheetcal.log")),
            }
        );
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse(&["-h"]).unwrap(), Command::Help);
        assert_eq!(parse(&["--version"]).unwrap(), Command::Version);
    }

    #[test]
    fn test_bad_date() {
        assert!(parse(&["18/03/2026"]).is_err());
        assert!(parse(&["2026-03-18", "2026-04-01"]).is_err());
    }
}
