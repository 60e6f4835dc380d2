use snafu::Snafu;

/// Errors raised while building or querying the results model.
///
/// None of these are recoverable: they either indicate malformed input
/// (shape and reference errors) or a query issued in the wrong order.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ResultsError {
    // ***** Definition loading *****
    #[snafu(display("{kind} object does not have an id: {data}"))]
    MissingId { kind: &'static str, data: String },

    #[snafu(display("duplicate {kind} id: {id:?}"))]
    DuplicateId { kind: &'static str, id: String },

    #[snafu(display("{kind} id {id:?} not found (referenced by {referrer})"))]
    UnknownReference {
        kind: &'static str,
        id: String,
        referrer: String,
    },

    #[snafu(display("invalid ballot item type: {type_name:?}"))]
    InvalidContestType { type_name: String },

    #[snafu(display("invalid value for key {key:?}: {reason}"))]
    InvalidField { key: String, reason: String },

    #[snafu(display("invalid date {value:?} for key {key:?}"))]
    ParsingDate {
        key: String,
        value: String,
        source: chrono::ParseError,
    },

    // ***** Index resolution *****
    #[snafu(display("stat id {id:?} is not part of result style {style:?}"))]
    UnknownStat { id: String, style: String },

    #[snafu(display("voting group id {id:?} is not part of result style {style:?}"))]
    UnknownVotingGroup { id: String, style: String },

    #[snafu(display("choice id {id:?} is not part of the results mapping"))]
    UnknownChoice { id: String },

    #[snafu(display("choice {id:?} does not have an index"))]
    UnindexedChoice { id: String },

    #[snafu(display("{name}: expected exactly one total for {key}, found {count}"))]
    AmbiguousTotal {
        name: String,
        key: String,
        count: usize,
    },

    #[snafu(display("{name}: no totals found for {key:?}"))]
    EmptyTotals { name: String, key: String },

    #[snafu(display("no value present at indices {indices:?}"))]
    NoValues { indices: Vec<usize> },

    // ***** Tabular results *****
    #[snafu(display("{origin}: header column {column}: expected {expected:?}, found {found:?}"))]
    HeaderMismatch {
        origin: String,
        column: usize,
        expected: String,
        found: String,
    },

    #[snafu(display("{origin}:{lineno}: expected {expected} columns, found {found}"))]
    ColumnCount {
        origin: String,
        lineno: usize,
        expected: usize,
        found: usize,
    },

    #[snafu(display("{origin}:{lineno}: column {column}: not a number: {content:?}"))]
    InvalidNumber {
        origin: String,
        lineno: usize,
        column: usize,
        content: String,
    },

    #[snafu(display(
        "{origin}:{lineno}: no reporting group for area {area_id:?} and subtotal {voting_group_id:?}"
    ))]
    UnknownReportingGroup {
        origin: String,
        lineno: usize,
        area_id: String,
        voting_group_id: String,
    },

    #[snafu(display(
        "{origin}:{lineno}: duplicate row for area {area_id:?} and subtotal {voting_group_id:?}"
    ))]
    DuplicateRow {
        origin: String,
        lineno: usize,
        area_id: String,
        voting_group_id: String,
    },

    #[snafu(display("{origin}: missing row for area {area_id:?} and subtotal {voting_group_id:?}"))]
    MissingRow {
        origin: String,
        area_id: String,
        voting_group_id: String,
    },

    #[snafu(display("{origin}:{lineno}: unexpected RCV round label {label:?}"))]
    UnexpectedRound {
        origin: String,
        lineno: usize,
        label: String,
    },

    // ***** Aggregates *****
    #[snafu(display("contest {contest:?}: expected {expected} RCV rounds, found {found}"))]
    RcvRoundsMismatch {
        contest: String,
        expected: usize,
        found: usize,
    },

    #[snafu(display("round {round} is out of range (1..={count})"))]
    RoundOutOfRange { round: usize, count: usize },

    #[snafu(display("contest {contest:?} is not a ranked-choice contest"))]
    NotRcv { contest: String },

    #[snafu(display("summary results have not been loaded (requested by {item:?})"))]
    SummaryNotLoaded { item: String },

    #[snafu(display("results source failed for {item:?}: {message}"))]
    SourceFailed { item: String, message: String },
}

pub type ResultsResult<T> = Result<T, ResultsError>;
