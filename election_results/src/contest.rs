use log::info;
use snafu::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::area::{Area, ReportingGroups};
use crate::catalog::ResultStyle;
use crate::choice::Choice;
use crate::error::*;
use crate::mapping::ResultsMapping;
use crate::rcv::RcvResults;
use crate::reportable::{Reportable, ResultsSource};
use crate::tabular::{load_contest_table, ContestTable, LoadScope};

/// The kind of a contest.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ContestType {
    /// Candidates running for an office.
    Office,
    /// A proposition or measure.
    Measure,
    /// A yes/no question about an office holder, e.g. a retention vote.
    YnOffice,
}

impl ContestType {
    pub fn parse(type_name: &str) -> ResultsResult<ContestType> {
        match type_name {
            "office" => Ok(ContestType::Office),
            "measure" => Ok(ContestType::Measure),
            "ynoffice" => Ok(ContestType::YnOffice),
            _ => InvalidContestTypeSnafu { type_name }.fail(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContestType::Office => "office",
            ContestType::Measure => "measure",
            ContestType::YnOffice => "ynoffice",
        }
    }

    /// Office contests carry candidates; the others carry plain choices.
    pub fn has_candidates(&self) -> bool {
        matches!(self, ContestType::Office)
    }
}

/// A contest with its choices and results.
///
/// The summary results are set for the whole election at once; the detail
/// results are read from the source on first use and kept.
#[derive(Debug)]
pub struct Contest {
    pub id: String,
    pub contest_type: ContestType,
    pub ballot_title: String,
    pub ballot_subtitle: Option<String>,
    pub header_id: Option<String>,
    pub voting_district: Arc<Area>,
    pub number_elected: usize,
    pub vote_for_msg: Option<String>,
    pub writeins_allowed: bool,
    /// Number of ranked-choice rounds, 0 for other contests.
    pub rcv_rounds: usize,
    pub(crate) result_style: Arc<ResultStyle>,
    pub(crate) choices: Vec<Choice>,
    pub(crate) choices_by_id: HashMap<String, usize>,
    pub(crate) reporting_groups: ReportingGroups,
    pub(crate) summary: OnceLock<ContestTable>,
    pub(crate) detail: OnceLock<ContestTable>,
}

impl Contest {
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn get_choice(&self, choice_id: &str) -> ResultsResult<&Choice> {
        self.choices_by_id
            .get(choice_id)
            .map(|idx| &self.choices[*idx])
            .context(UnknownChoiceSnafu { id: choice_id })
    }

    pub fn is_rcv(&self) -> bool {
        self.result_style.is_rcv
    }

    pub fn is_summary_loaded(&self) -> bool {
        self.summary.get().is_some()
    }

    fn load(&self, source: &dyn ResultsSource, scope: LoadScope) -> ResultsResult<ContestTable> {
        let table = source.read_table(&self.table_name())?;
        load_contest_table(
            &table,
            &self.results_mapping(),
            &self.reporting_groups,
            self.rcv_rounds,
            scope,
        )
    }

    /// Reads the rows of the aggregate area and the rounds. Loading twice
    /// keeps the first value.
    pub(crate) fn load_summary(&self, source: &dyn ResultsSource) -> ResultsResult<()> {
        if self.summary.get().is_none() {
            let table = self.load(source, LoadScope::Summary)?;
            let _ = self.summary.set(table);
        }
        Ok(())
    }

    pub(crate) fn summary_table(&self) -> ResultsResult<&ContestTable> {
        self.summary
            .get()
            .context(SummaryNotLoadedSnafu { item: &self.id })
    }

    /// The full results matrix, read on first use.
    pub fn detail_results(&self, source: &dyn ResultsSource) -> ResultsResult<&ContestTable> {
        if let Some(table) = self.detail.get() {
            return Ok(table);
        }
        let table = self.load(source, LoadScope::Detail)?;
        info!(
            "detail_results: contest {:?}: loaded {} rows",
            self.id,
            table.results.len()
        );
        // Another thread may have stored the same table in the meantime.
        Ok(self.detail.get_or_init(|| table))
    }

    /// The round by round view of a ranked-choice contest.
    pub fn rcv_results(&self, continuing_stat_id: &str) -> ResultsResult<RcvResults<'_>> {
        ensure!(self.is_rcv(), NotRcvSnafu { contest: &self.id });
        let summary = self.summary_table()?;
        RcvResults::new(
            &self.id,
            self.rcv_rounds,
            &summary.rcv_totals,
            self.results_mapping(),
            continuing_stat_id,
        )
    }
}

impl Reportable for Contest {
    fn id(&self) -> &str {
        &self.id
    }

    fn table_name(&self) -> String {
        format!("contest_{}", self.id)
    }

    fn result_style(&self) -> &ResultStyle {
        &self.result_style
    }

    fn reporting_groups(&self) -> &ReportingGroups {
        &self.reporting_groups
    }

    fn results_mapping(&self) -> ResultsMapping<'_> {
        ResultsMapping::new(&self.result_style, &self.choices)
    }

    fn can_vote_for_multiple(&self) -> bool {
        self.number_elected > 1
    }

    fn summary_row(&self, row: usize) -> ResultsResult<&[i64]> {
        self.summary_table()?
            .results
            .get(row)
            .map(|r| r.as_slice())
            .context(NoValuesSnafu { indices: vec![row] })
    }

    fn detail_row(&self, source: &dyn ResultsSource, row: usize) -> ResultsResult<&[i64]> {
        self.detail_results(source)?
            .results
            .get(row)
            .map(|r| r.as_slice())
            .context(NoValuesSnafu { indices: vec![row] })
    }
}

impl crate::catalog::Identified for Contest {
    const KIND: &'static str = "contest";
    fn id(&self) -> &str {
        &self.id
    }
}
