// Builders for the ballot items, resolving their references against the
// reference data.

use log::{debug, warn};
use snafu::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::area::ReportingGroups;
use crate::catalog::Party;
use crate::choice::{Choice, ChoiceKind};
use crate::contest::{Contest, ContestType};
use crate::election::ReferenceData;
use crate::error::*;
use crate::turnout::Turnout;

/// A contest as described in a definition, before its references are
/// resolved.
///
/// ```
/// use election_results::builder::ContestBuilder;
/// use election_results::Choice;
///
/// let builder = ContestBuilder::new("1", "measure", "Measure A")
///     .result_style("RS")
///     .choice(Choice::new("11", "Yes"))
///     .choice(Choice::new("12", "No"));
/// assert_eq!(builder.choices.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContestBuilder {
    pub id: String,
    pub type_name: String,
    pub ballot_title: String,
    pub ballot_subtitle: Option<String>,
    pub header_id: Option<String>,
    pub result_style_id: String,
    /// Defaults to the aggregate area.
    pub voting_district_id: Option<String>,
    pub number_elected: Option<usize>,
    pub vote_for_msg: Option<String>,
    pub writeins_allowed: bool,
    pub rcv_rounds: usize,
    pub choices: Vec<Choice>,
}

impl ContestBuilder {
    pub fn new(id: &str, type_name: &str, ballot_title: &str) -> ContestBuilder {
        ContestBuilder {
            id: id.to_string(),
            type_name: type_name.to_string(),
            ballot_title: ballot_title.to_string(),
            ..Default::default()
        }
    }

    pub fn result_style(mut self, result_style_id: &str) -> ContestBuilder {
        self.result_style_id = result_style_id.to_string();
        self
    }

    pub fn voting_district(mut self, area_id: &str) -> ContestBuilder {
        self.voting_district_id = Some(area_id.to_string());
        self
    }

    pub fn number_elected(mut self, number_elected: usize) -> ContestBuilder {
        self.number_elected = Some(number_elected);
        self
    }

    pub fn rcv_rounds(mut self, rcv_rounds: usize) -> ContestBuilder {
        self.rcv_rounds = rcv_rounds;
        self
    }

    pub fn choice(mut self, choice: Choice) -> ContestBuilder {
        self.choices.push(choice);
        self
    }

    pub fn build(self, reference: &ReferenceData) -> ResultsResult<Contest> {
        let contest_type = ContestType::parse(&self.type_name)?;
        let referrer = format!("contest {}", self.id);
        let result_style = reference
            .result_styles
            .lookup(&self.result_style_id, &referrer)?;
        let all_area = reference.all_area()?;
        let voting_district = match self.voting_district_id.as_deref() {
            Some(area_id) => reference.areas.lookup(area_id, &referrer)?,
            None => all_area.clone(),
        };
        let reporting_areas = reference.reporting_areas(&voting_district)?;
        let reporting_groups =
            ReportingGroups::enumerate(&all_area, &reporting_areas, &result_style)?;

        if self.rcv_rounds > 0 && !result_style.is_rcv {
            return InvalidFieldSnafu {
                key: "rcv_rounds",
                reason: format!(
                    "contest {} has rounds but result style {} is not ranked-choice",
                    self.id, result_style.id
                ),
            }
            .fail();
        }
        if result_style.is_rcv && self.rcv_rounds == 0 {
            warn!("contest {:?}: ranked-choice style without rounds", self.id);
        }

        let mut choices: Vec<Choice> = Vec::with_capacity(self.choices.len());
        let mut choices_by_id: HashMap<String, usize> = HashMap::new();
        for (idx, choice) in self.choices.into_iter().enumerate() {
            ensure!(
                !choice.id.is_empty(),
                MissingIdSnafu {
                    kind: "choice",
                    data: choice.ballot_title.clone()
                }
            );
            let previous = choices_by_id.insert(choice.id.clone(), idx);
            ensure!(
                previous.is_none(),
                DuplicateIdSnafu {
                    kind: "choice",
                    id: choice.id.clone()
                }
            );
            let mut choice = choice.with_index(idx);
            if contest_type.has_candidates() && choice.kind == ChoiceKind::Plain {
                choice.kind = ChoiceKind::Candidate {
                    ballot_designation: None,
                    candidate_party: None,
                };
            }
            choices.push(choice);
        }

        debug!(
            "build: contest {:?}: {} choices, {} reporting groups",
            self.id,
            choices.len(),
            reporting_groups.len()
        );
        Ok(Contest {
            id: self.id,
            contest_type,
            ballot_title: self.ballot_title,
            ballot_subtitle: self.ballot_subtitle,
            header_id: self.header_id,
            voting_district,
            number_elected: self.number_elected.unwrap_or(1),
            vote_for_msg: self.vote_for_msg,
            writeins_allowed: self.writeins_allowed,
            rcv_rounds: self.rcv_rounds,
            result_style,
            choices,
            choices_by_id,
            reporting_groups,
            summary: OnceLock::new(),
            detail: OnceLock::new(),
        })
    }
}

/// The turnout of an election, before its references are resolved.
#[derive(Debug, Clone, Default)]
pub struct TurnoutBuilder {
    pub id: String,
    pub result_style_id: String,
    pub voting_district_id: Option<String>,
}

impl TurnoutBuilder {
    pub fn build(self, reference: &ReferenceData) -> ResultsResult<Turnout> {
        let referrer = format!("turnout {}", self.id);
        let result_style = reference
            .result_styles
            .lookup(&self.result_style_id, &referrer)?;
        let all_area = reference.all_area()?;
        let voting_district = match self.voting_district_id.as_deref() {
            Some(area_id) => reference.areas.lookup(area_id, &referrer)?,
            None => all_area.clone(),
        };
        let reporting_areas = reference.reporting_areas(&voting_district)?;
        let reporting_groups =
            ReportingGroups::enumerate(&all_area, &reporting_areas, &result_style)?;
        let parties: Vec<Arc<Party>> = if reference.parties.is_empty() {
            vec![Arc::new(Party::all_parties())]
        } else {
            reference.parties.iter().cloned().collect()
        };
        Ok(Turnout {
            id: self.id,
            voting_district,
            result_style,
            parties,
            reporting_groups,
            summary: OnceLock::new(),
            detail: OnceLock::new(),
        })
    }
}
