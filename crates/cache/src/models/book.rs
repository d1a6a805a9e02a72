use crate::error::{Error, ErrorKind};
use exn::{OptionExt, ResultExt};
use shelfsync_records::{Record, Source, Status, join_words, split_words};
use time::UtcDateTime;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BookRow {
    pub(crate) source: String,
    pub(crate) id: String,
    pub(crate) isbn: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) narrator: Option<String>,
    pub(crate) status: Option<String>,
    pub(crate) percent_complete: Option<i64>,
    pub(crate) marked_finished: bool,
    pub(crate) finished_at: Option<i64>,
    pub(crate) added_at: Option<i64>,
    pub(crate) url: Option<String>,
}

impl TryFrom<&Record> for BookRow {
    type Error = Error;
    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let id = record
            .id()
            .ok_or_raise(|| ErrorKind::MissingId(record.title_and_authors()))?;
        Ok(Self {
            source: record.source.as_str().to_string(),
            id: id.to_string(),
            isbn: record.isbn.clone(),
            title: record.title.clone(),
            author: (!record.authors.is_empty()).then(|| join_words(&record.authors)),
            narrator: (!record.narrators.is_empty()).then(|| join_words(&record.narrators)),
            status: record.status.as_ref().map(|status| status.as_str().to_string()),
            percent_complete: record.percent_complete.map(i64::from),
            marked_finished: record.marked_finished,
            finished_at: record.finished_at.map(UtcDateTime::unix_timestamp),
            added_at: record.added_at.map(UtcDateTime::unix_timestamp),
            url: record.url.clone(),
        })
    }
}

impl TryFrom<BookRow> for Record {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let source = row.source.parse::<Source>().or_raise(|| ErrorKind::InvalidData("source"))?;
        let mut record = Record::new(source, Some(row.id));
        record.isbn = row.isbn;
        record.title = row.title;
        record.authors = row.author.as_deref().map(split_words).unwrap_or_default();
        record.narrators = row.narrator.as_deref().map(split_words).unwrap_or_default();
        record.status = row.status.as_deref().map(Status::from);
        record.percent_complete = row
            .percent_complete
            .map(|pct| u8::try_from(pct.clamp(0, 100)))
            .transpose()
            .or_raise(|| ErrorKind::InvalidData("percent complete"))?;
        record.marked_finished = row.marked_finished;
        record.finished_at = row.finished_at.map(timestamp).transpose()?;
        record.added_at = row.added_at.map(timestamp).transpose()?;
        record.url = row.url;
        Ok(record)
    }
}

fn timestamp(seconds: i64) -> Result<UtcDateTime, Error> {
    UtcDateTime::from_unix_timestamp(seconds).or_raise(|| ErrorKind::InvalidData("timestamp"))
}
