// Behaviour shared by contests and the turnout: both own a results
// matrix shaped by a result style and indexed by reporting groups.

use log::debug;
use snafu::prelude::*;
use std::collections::HashMap;

use crate::area::{ReportingGroup, ReportingGroups, ALL_AREA_ID};
use crate::catalog::ResultStyle;
use crate::error::*;
use crate::format::format_number;
use crate::mapping::ResultsMapping;
use crate::tabular::RawTable;
use crate::totals::IndexedTotals;

/// Heading of the label column of detail rows.
pub const AREA_HEADING: &str = "Area";

/// Where result tables come from. Implementations do the file I/O.
pub trait ResultsSource {
    /// Reads the table of a contest or of the turnout, by table name.
    fn read_table(&self, name: &str) -> ResultsResult<RawTable>;
}

impl ResultsSource for HashMap<String, RawTable> {
    fn read_table(&self, name: &str) -> ResultsResult<RawTable> {
        self.get(name).cloned().context(SourceFailedSnafu {
            item: name,
            message: "no such table",
        })
    }
}

/// A ballot item with results.
pub trait Reportable {
    fn id(&self) -> &str;

    /// The name of the table holding the results of this item.
    fn table_name(&self) -> String;

    fn result_style(&self) -> &ResultStyle;

    fn reporting_groups(&self) -> &ReportingGroups;

    fn results_mapping(&self) -> ResultsMapping<'_>;

    fn can_vote_for_multiple(&self) -> bool {
        false
    }

    /// A row of the summary results. Fails if the summary is not loaded.
    fn summary_row(&self, row: usize) -> ResultsResult<&[i64]>;

    /// A row of the detail results, loading them on first use.
    fn detail_row(&self, source: &dyn ResultsSource, row: usize) -> ResultsResult<&[i64]>;
}

/// The aggregate row of a voting group. `None` picks the total group.
pub fn summary_reporting_group<'a, R: Reportable + ?Sized>(
    item: &'a R,
    voting_group_id: Option<&str>,
) -> ResultsResult<&'a ReportingGroup> {
    let style = item.result_style();
    let vg_id = match voting_group_id {
        Some(vg_id) => vg_id,
        None => style
            .default_voting_group()
            .map(|vg| vg.id.as_str())
            .context(UnknownVotingGroupSnafu {
                id: "",
                style: style.id.clone(),
            })?,
    };
    item.reporting_groups()
        .find(ALL_AREA_ID, vg_id)
        .context(UnknownVotingGroupSnafu {
            id: vg_id,
            style: style.id.clone(),
        })
}

pub(crate) fn indexed_totals<'a, R: Reportable + ?Sized>(
    item: &'a R,
    name: String,
    row: &'a [i64],
) -> IndexedTotals<'a> {
    let mapping = item.results_mapping();
    let headers: Vec<String> = mapping
        .all_items()
        .iter()
        .map(|it| it.display_text().to_string())
        .collect();
    IndexedTotals::new(&name, row, move |key| mapping.get_summary_index(key))
        .with_headers(headers)
        .with_vote_for_multiple(item.can_vote_for_multiple())
}

/// The summary totals of an item for one voting group, queryable by stat
/// or choice.
pub fn get_contest_totals_by_stat<'a, R: Reportable + ?Sized>(
    item: &'a R,
    voting_group_id: Option<&str>,
) -> ResultsResult<IndexedTotals<'a>> {
    let rg = summary_reporting_group(item, voting_group_id)?;
    let row = item.summary_row(rg.index)?;
    Ok(indexed_totals(
        item,
        format!("{} ({})", item.id(), rg.voting_group.id),
        row,
    ))
}

/// Headings of the detail rows: the label column, then the selected columns.
pub fn detail_headings<R: Reportable + ?Sized>(
    item: &R,
    column_selector: &str,
) -> ResultsResult<Vec<String>> {
    let mut res = vec![AREA_HEADING.to_string()];
    res.extend(item.results_mapping().headers(column_selector)?);
    Ok(res)
}

/// One formatted row per reporting group: its label, then the selected
/// values. `None` lists every reporting group.
pub fn detail_rows<R: Reportable + ?Sized>(
    item: &R,
    source: &dyn ResultsSource,
    column_selector: &str,
    reporting_groups: Option<&[ReportingGroup]>,
) -> ResultsResult<Vec<Vec<String>>> {
    let indices = item
        .results_mapping()
        .iter_indices_by_spaced_ids(column_selector)?;
    let groups = reporting_groups.unwrap_or_else(|| item.reporting_groups().as_slice());
    let mut res: Vec<Vec<String>> = Vec::with_capacity(groups.len());
    for rg in groups.iter() {
        let row = item.detail_row(source, rg.index)?;
        let mut line = vec![rg.label()];
        for idx in indices.iter() {
            let value = row
                .get(*idx)
                .context(NoValuesSnafu { indices: vec![*idx] })?;
            line.push(format_number(*value));
        }
        res.push(line);
    }
    debug!(
        "detail_rows: {}: {} rows for {:?}",
        item.id(),
        res.len(),
        column_selector
    );
    Ok(res)
}
