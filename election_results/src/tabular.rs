// The hand-off format between the file readers and the model, and its
// validation into result matrices.
//
// A contest table has the columns
//   area_id, subtotal_type, <stat ids in style order>, <choice ids in contest order>
// Choice columns may also be written `id:title`. Ranked-choice contests add
// one row per round, labelled `RCV{n}` in the first column, from the last
// round down to the first.

use log::{debug, info};
use snafu::prelude::*;
use std::sync::Arc;

use crate::area::{ReportingGroup, ReportingGroups};
use crate::catalog::{Party, ResultStyle};
use crate::error::*;
use crate::mapping::ResultsMapping;
use crate::rcv::{RoundId, RoundTotals};

pub const AREA_ID_COLUMN: &str = "area_id";
pub const SUBTOTAL_TYPE_COLUMN: &str = "subtotal_type";
const RCV_ROUND_PREFIX: &str = "RCV";

/// One line of a results file, with its position in the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub lineno: usize,
    pub cells: Vec<String>,
}

/// The untyped content of one results file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    /// Where the table comes from, for error messages.
    pub source: String,
    pub header: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    pub fn new(source: &str, header: Vec<String>) -> RawTable {
        RawTable {
            source: source.to_string(),
            header,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, lineno: usize, cells: Vec<String>) {
        self.rows.push(RawRow { lineno, cells });
    }
}

/// How much of a table to keep.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum LoadScope {
    /// Only the rows of the aggregate area.
    Summary,
    /// Every reporting group.
    Detail,
}

/// The validated content of a contest table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContestTable {
    /// `results[row][col]`, rows in reporting group order.
    pub results: Vec<Vec<i64>>,
    /// Round totals, round 1 first. A blank cell is `None`.
    pub rcv_totals: Vec<RoundTotals>,
}

/// Turnout values: `[reporting group][party][stat]`.
pub type TurnoutMatrix = Vec<Vec<Vec<i64>>>;

/// Column names expected in a contest table, choices written by id.
pub fn contest_header(mapping: &ResultsMapping<'_>) -> Vec<String> {
    let mut res = vec![
        AREA_ID_COLUMN.to_string(),
        SUBTOTAL_TYPE_COLUMN.to_string(),
    ];
    res.extend(mapping.all_items().iter().map(|item| item.id().to_string()));
    res
}

/// Column names expected in a turnout table: `party:stat`, party-major.
pub fn turnout_header(style: &ResultStyle, parties: &[Arc<Party>]) -> Vec<String> {
    let mut res = vec![
        AREA_ID_COLUMN.to_string(),
        SUBTOTAL_TYPE_COLUMN.to_string(),
    ];
    for party in parties.iter() {
        for stat in style.result_stat_types() {
            res.push(format!("{}:{}", party.id, stat.id));
        }
    }
    res
}

fn header_matches(expected: &str, found: &str) -> bool {
    found == expected
        || found
            .strip_prefix(expected)
            .map_or(false, |rest| rest.starts_with(':'))
}

fn check_header(table: &RawTable, expected: &[String]) -> ResultsResult<()> {
    for (column, exp) in expected.iter().enumerate() {
        let found = table.header.get(column).map(|s| s.trim()).unwrap_or("");
        ensure!(
            header_matches(exp, found),
            HeaderMismatchSnafu {
                origin: &table.source,
                column,
                expected: exp,
                found,
            }
        );
    }
    ensure!(
        table.header.len() == expected.len(),
        ColumnCountSnafu {
            origin: &table.source,
            lineno: 1_usize,
            expected: expected.len(),
            found: table.header.len()
        }
    );
    Ok(())
}

fn parse_cell(table: &RawTable, row: &RawRow, column: usize) -> ResultsResult<Option<i64>> {
    let content = row.cells[column].trim();
    if content.is_empty() {
        return Ok(None);
    }
    let value = content.parse::<i64>().ok().context(InvalidNumberSnafu {
        origin: &table.source,
        lineno: row.lineno,
        column,
        content,
    })?;
    Ok(Some(value))
}

fn parse_values(table: &RawTable, row: &RawRow) -> ResultsResult<Vec<Option<i64>>> {
    (2..row.cells.len())
        .map(|column| parse_cell(table, row, column))
        .collect()
}

fn round_label(cell: &str) -> Option<RoundId> {
    cell.strip_prefix(RCV_ROUND_PREFIX)
        .and_then(|n| n.parse::<RoundId>().ok())
}

/// Validates the widths and keys of every row and collects the values of
/// the reporting groups in scope. Round rows are handed back untouched.
fn load_grid<'t>(
    table: &'t RawTable,
    groups: &ReportingGroups,
    scope: LoadScope,
    width: usize,
) -> ResultsResult<(Vec<Vec<i64>>, Vec<(RoundId, &'t RawRow)>)> {
    let row_count = match scope {
        LoadScope::Summary => groups.summary_len(),
        LoadScope::Detail => groups.len(),
    };
    let mut grid: Vec<Option<Vec<i64>>> = vec![None; row_count];
    let mut seen: Vec<bool> = vec![false; groups.len()];
    let mut round_rows: Vec<(RoundId, &'t RawRow)> = Vec::new();

    for row in table.rows.iter() {
        ensure!(
            row.cells.len() == width,
            ColumnCountSnafu {
                origin: &table.source,
                lineno: row.lineno,
                expected: width,
                found: row.cells.len()
            }
        );
        let area_id = row.cells[0].trim();
        let vg_id = row.cells[1].trim();
        if let Some(round) = round_label(area_id) {
            round_rows.push((round, row));
            continue;
        }
        let rg: &ReportingGroup = groups.find(area_id, vg_id).context(
            UnknownReportingGroupSnafu {
                origin: &table.source,
                lineno: row.lineno,
                area_id,
                voting_group_id: vg_id,
            },
        )?;
        ensure!(
            !seen[rg.index],
            DuplicateRowSnafu {
                origin: &table.source,
                lineno: row.lineno,
                area_id,
                voting_group_id: vg_id,
            }
        );
        seen[rg.index] = true;
        let values: Vec<i64> = parse_values(table, row)?
            .into_iter()
            .map(|v| v.unwrap_or(0))
            .collect();
        if rg.index < row_count {
            grid[rg.index] = Some(values);
        }
    }

    let results = grid
        .into_iter()
        .zip(groups.iter())
        .map(|(values, rg)| -> ResultsResult<Vec<i64>> {
            values.context(MissingRowSnafu {
                origin: &table.source,
                area_id: &rg.area.id,
                voting_group_id: &rg.voting_group.id,
            })
        })
        .collect::<ResultsResult<Vec<Vec<i64>>>>()?;
    debug!(
        "load_grid: {}: {} rows in scope {:?}, {} round rows",
        table.source,
        results.len(),
        scope,
        round_rows.len()
    );
    Ok((results, round_rows))
}

fn load_rounds(
    table: &RawTable,
    round_rows: &[(RoundId, &RawRow)],
    rcv_rounds: usize,
) -> ResultsResult<Vec<RoundTotals>> {
    let mut res: Vec<RoundTotals> = vec![Vec::new(); rcv_rounds];
    for (pos, (round, row)) in round_rows.iter().enumerate() {
        let expected = rcv_rounds.checked_sub(pos);
        ensure!(
            expected == Some(*round) && *round >= 1,
            UnexpectedRoundSnafu {
                origin: &table.source,
                lineno: row.lineno,
                label: row.cells[0].trim(),
            }
        );
        res[*round - 1] = parse_values(table, row)?;
    }
    ensure!(
        round_rows.len() == rcv_rounds,
        RcvRoundsMismatchSnafu {
            contest: &table.source,
            expected: rcv_rounds,
            found: round_rows.len()
        }
    );
    Ok(res)
}

/// Validates a contest table against the columns of the contest and its
/// reporting groups.
pub fn load_contest_table(
    table: &RawTable,
    mapping: &ResultsMapping<'_>,
    groups: &ReportingGroups,
    rcv_rounds: usize,
    scope: LoadScope,
) -> ResultsResult<ContestTable> {
    check_header(table, &contest_header(mapping))?;
    let width = 2 + mapping.column_count();
    let (results, round_rows) = load_grid(table, groups, scope, width)?;
    let rcv_totals = load_rounds(table, &round_rows, rcv_rounds)?;
    info!(
        "load_contest_table: {}: {} result rows, {} rounds",
        table.source,
        results.len(),
        rcv_totals.len()
    );
    Ok(ContestTable {
        results,
        rcv_totals,
    })
}

/// Validates a turnout table. Values are split by party.
pub fn load_turnout_table(
    table: &RawTable,
    style: &ResultStyle,
    parties: &[Arc<Party>],
    groups: &ReportingGroups,
    scope: LoadScope,
) -> ResultsResult<TurnoutMatrix> {
    check_header(table, &turnout_header(style, parties))?;
    let stat_count = style.stat_count();
    let width = 2 + parties.len() * stat_count;
    let (grid, round_rows) = load_grid(table, groups, scope, width)?;
    if let Some((_, row)) = round_rows.first() {
        return UnexpectedRoundSnafu {
            origin: &table.source,
            lineno: row.lineno,
            label: row.cells[0].trim(),
        }
        .fail();
    }
    let res: TurnoutMatrix = grid
        .into_iter()
        .map(|values| {
            if stat_count == 0 {
                vec![Vec::new(); parties.len()]
            } else {
                values.chunks(stat_count).map(|c| c.to_vec()).collect()
            }
        })
        .collect();
    info!(
        "load_turnout_table: {}: {} result rows, {} parties",
        table.source,
        res.len(),
        parties.len()
    );
    Ok(res)
}
