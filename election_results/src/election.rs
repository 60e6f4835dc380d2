use chrono::NaiveDate;
use log::info;
use snafu::prelude::*;
use std::sync::Arc;

use crate::area::{Area, ALL_AREA_ID};
use crate::catalog::{Catalog, Identified, Party, ResultStatType, ResultStyle, VotingGroup};
use crate::contest::Contest;
use crate::error::*;
use crate::reportable::{get_contest_totals_by_stat, ResultsSource};
use crate::totals::IndexedTotals;
use crate::turnout::Turnout;

/// The catalogs every contest refers to.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    pub result_stat_types: Catalog<ResultStatType>,
    pub voting_groups: Catalog<VotingGroup>,
    pub parties: Catalog<Party>,
    pub result_styles: Catalog<ResultStyle>,
    pub areas: Catalog<Area>,
}

impl ReferenceData {
    pub fn all_area(&self) -> ResultsResult<Arc<Area>> {
        self.areas.lookup(ALL_AREA_ID, "reference data")
    }

    /// The areas a district reports results for, in report order.
    pub fn reporting_areas(&self, district: &Area) -> ResultsResult<Vec<Arc<Area>>> {
        let referrer = format!("area {}", district.id);
        district
            .consolidated_ids
            .iter()
            .map(|area_id| self.areas.lookup(area_id, &referrer))
            .collect()
    }
}

/// An entry below a header.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum BallotItemRef {
    Header(String),
    Contest(String),
}

/// A heading grouping contests on the ballot.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Header {
    pub id: String,
    pub ballot_title: String,
    pub classification: Option<String>,
    /// The parent header, if any.
    pub header_id: Option<String>,
    /// Headers and contests placed under this header, in ballot order.
    pub ballot_items: Vec<BallotItemRef>,
}

impl Identified for Header {
    const KIND: &'static str = "header";
    fn id(&self) -> &str {
        &self.id
    }
}

/// An election: its reference data, its ballot items and their results.
#[derive(Debug)]
pub struct Election {
    pub ballot_title: String,
    pub election_area: Option<String>,
    pub date: Option<NaiveDate>,
    pub reference: ReferenceData,
    pub headers: Catalog<Header>,
    pub contests: Catalog<Contest>,
    pub turnout: Option<Turnout>,
    summary_loaded: bool,
}

impl Election {
    pub(crate) fn new(
        ballot_title: String,
        reference: ReferenceData,
        headers: Catalog<Header>,
        contests: Catalog<Contest>,
        turnout: Option<Turnout>,
    ) -> Election {
        Election {
            ballot_title,
            election_area: None,
            date: None,
            reference,
            headers,
            contests,
            turnout,
            summary_loaded: false,
        }
    }

    pub fn is_summary_loaded(&self) -> bool {
        self.summary_loaded
    }

    /// Reads the summary results of every contest and of the turnout.
    pub fn load_summary_results(&mut self, source: &dyn ResultsSource) -> ResultsResult<()> {
        for contest in self.contests.iter() {
            contest.load_summary(source)?;
        }
        if let Some(turnout) = self.turnout.as_ref() {
            turnout.load_summary(source)?;
        }
        self.summary_loaded = true;
        info!(
            "load_summary_results: loaded {} contests (turnout: {})",
            self.contests.len(),
            self.turnout.is_some()
        );
        Ok(())
    }

    pub fn get_contest(&self, contest_id: &str) -> ResultsResult<&Arc<Contest>> {
        self.contests.get(contest_id).context(UnknownReferenceSnafu {
            kind: "contest",
            id: contest_id,
            referrer: "election",
        })
    }

    /// The summary totals of a contest. The summary results must be loaded.
    pub fn get_contest_totals_by_stat(
        &self,
        contest_id: &str,
        voting_group_id: Option<&str>,
    ) -> ResultsResult<IndexedTotals<'_>> {
        ensure!(
            self.summary_loaded,
            SummaryNotLoadedSnafu { item: contest_id }
        );
        get_contest_totals_by_stat(self.get_contest(contest_id)?.as_ref(), voting_group_id)
    }

    /// Headers without a parent, in ballot order.
    pub fn top_headers(&self) -> impl Iterator<Item = &Arc<Header>> {
        self.headers.iter().filter(|h| h.header_id.is_none())
    }
}
