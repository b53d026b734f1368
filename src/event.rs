use std::fmt;
use time::Date;

/// A single activity read from the feed.  `start <= end` always holds for
/// events built by the feed adapter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Event {
    pub(crate) start: Date,
    pub(crate) end: Date,
    pub(crate) sector: String,
    pub(crate) responsible: Option<String>,
    pub(crate) activity: Option<String>,
    pub(crate) status: Status,
}

impl Event {
    /// Returns true if the event covers any day in `first..=last`
    pub(crate) fn intersects(&self, first: Date, last: Date) -> bool {
        !(self.end < first || self.start > last)
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Status {
    NotStarted,
    InProgress,
    Cancelled,
    Finished,
    Other(String),
}

impl Status {
    pub(crate) fn label(&self) -> &str {
        match self {
            Status::NotStarted => "Não Iniciada",
            Status::InProgress => "Em Andamento",
            Status::Cancelled => "Cancelada",
            Status::Finished => "Finalizada",
            Status::Other(s) => s,
        }
    }
}

impl From<&str> for Status {
    fn from(s: &str) -> Status {
        match s.trim() {
            // The second spelling is what the label turns into when the
            // sheet's UTF-8 gets read as Latin-1 somewhere upstream.
            "Não Iniciada" | "NÃ£o Iniciada" => Status::NotStarted,
            "Em Andamento" => Status::InProgress,
            "Cancelada" => Status::Cancelled,
            "Finalizada" => Status::Finished,
            other => Status::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
