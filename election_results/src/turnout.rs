use log::info;
use snafu::prelude::*;
use std::sync::{Arc, OnceLock};

use crate::area::{Area, ReportingGroups};
use crate::catalog::{Party, ResultStyle};
use crate::error::*;
use crate::mapping::ResultsMapping;
use crate::reportable::{indexed_totals, summary_reporting_group, Reportable, ResultsSource};
use crate::tabular::{load_turnout_table, LoadScope, TurnoutMatrix};
use crate::totals::IndexedTotals;

/// Registration and ballots cast, broken down by party.
///
/// The matrix is `[reporting group][party][stat]`. The first party stands
/// for all parties: it is the one used when a query does not name a party.
#[derive(Debug)]
pub struct Turnout {
    pub id: String,
    pub voting_district: Arc<Area>,
    pub(crate) result_style: Arc<ResultStyle>,
    pub(crate) parties: Vec<Arc<Party>>,
    pub(crate) reporting_groups: ReportingGroups,
    pub(crate) summary: OnceLock<TurnoutMatrix>,
    pub(crate) detail: OnceLock<TurnoutMatrix>,
}

impl Turnout {
    pub fn parties(&self) -> &[Arc<Party>] {
        &self.parties
    }

    pub fn is_summary_loaded(&self) -> bool {
        self.summary.get().is_some()
    }

    fn party_index(&self, party_id: &str) -> ResultsResult<usize> {
        self.parties
            .iter()
            .position(|p| p.id == party_id)
            .context(UnknownReferenceSnafu {
                kind: "party",
                id: party_id,
                referrer: &self.id,
            })
    }

    fn load(&self, source: &dyn ResultsSource, scope: LoadScope) -> ResultsResult<TurnoutMatrix> {
        let table = source.read_table(&self.table_name())?;
        load_turnout_table(
            &table,
            &self.result_style,
            &self.parties,
            &self.reporting_groups,
            scope,
        )
    }

    pub(crate) fn load_summary(&self, source: &dyn ResultsSource) -> ResultsResult<()> {
        if self.summary.get().is_none() {
            let matrix = self.load(source, LoadScope::Summary)?;
            let _ = self.summary.set(matrix);
        }
        Ok(())
    }

    fn summary_matrix(&self) -> ResultsResult<&TurnoutMatrix> {
        self.summary
            .get()
            .context(SummaryNotLoadedSnafu { item: &self.id })
    }

    pub fn detail_results(&self, source: &dyn ResultsSource) -> ResultsResult<&TurnoutMatrix> {
        if let Some(matrix) = self.detail.get() {
            return Ok(matrix);
        }
        let matrix = self.load(source, LoadScope::Detail)?;
        info!(
            "detail_results: turnout {:?}: loaded {} rows",
            self.id,
            matrix.len()
        );
        Ok(self.detail.get_or_init(|| matrix))
    }

    /// Summary totals of one party for a voting group (default: total).
    pub fn get_totals_by_party(
        &self,
        voting_group_id: Option<&str>,
        party_id: &str,
    ) -> ResultsResult<IndexedTotals<'_>> {
        let party = self.party_index(party_id)?;
        let rg = summary_reporting_group(self, voting_group_id)?;
        let row = party_row(self.summary_matrix()?, rg.index, party)?;
        Ok(indexed_totals(
            self,
            format!("{} ({}, {})", self.id, rg.voting_group.id, party_id),
            row,
        ))
    }
}

fn party_row(matrix: &TurnoutMatrix, row: usize, party: usize) -> ResultsResult<&[i64]> {
    matrix
        .get(row)
        .and_then(|parties| parties.get(party))
        .map(|stats| stats.as_slice())
        .context(NoValuesSnafu {
            indices: vec![row, party],
        })
}

impl Reportable for Turnout {
    fn id(&self) -> &str {
        &self.id
    }

    fn table_name(&self) -> String {
        "turnout".to_string()
    }

    fn result_style(&self) -> &ResultStyle {
        &self.result_style
    }

    fn reporting_groups(&self) -> &ReportingGroups {
        &self.reporting_groups
    }

    fn results_mapping(&self) -> ResultsMapping<'_> {
        ResultsMapping::new(&self.result_style, &[])
    }

    fn summary_row(&self, row: usize) -> ResultsResult<&[i64]> {
        party_row(self.summary_matrix()?, row, 0)
    }

    fn detail_row(&self, source: &dyn ResultsSource, row: usize) -> ResultsResult<&[i64]> {
        party_row(self.detail_results(source)?, row, 0)
    }
}
