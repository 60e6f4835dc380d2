use crate::catalog::Identified;
use crate::error::*;

/// The outcome flag attached to a choice by the results provider.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default, Hash)]
pub enum WinningStatus {
    Tied,
    ToRunoff,
    Winning,
    #[default]
    None,
}

impl WinningStatus {
    pub fn parse(s: &str) -> ResultsResult<WinningStatus> {
        match s {
            "tied" => Ok(WinningStatus::Tied),
            "to_runoff" => Ok(WinningStatus::ToRunoff),
            "winning" => Ok(WinningStatus::Winning),
            "" | "none" => Ok(WinningStatus::None),
            x => InvalidFieldSnafu {
                key: "winning_status",
                reason: format!("unknown status {:?}", x),
            }
            .fail(),
        }
    }
}

/// The ordering of a choice id. Ids written as integers compare as numbers,
/// ids written as text compare as text.
#[derive(Eq, PartialEq, Debug, Clone, PartialOrd, Ord, Hash)]
pub enum IdKey {
    Int(i64),
    Text(String),
}

impl Default for IdKey {
    fn default() -> IdKey {
        IdKey::Text(String::new())
    }
}

/// What kind of selection a choice is.
///
/// Measures and yes/no offices carry plain choices; office contests carry
/// candidates, with their designation and party.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub enum ChoiceKind {
    #[default]
    Plain,
    Candidate {
        ballot_designation: Option<String>,
        candidate_party: Option<String>,
    },
}

/// A selectable option in a contest.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Choice {
    pub id: String,
    pub id_key: IdKey,
    pub ballot_title: String,
    /// Position in the contest, in source order. Set when the contest is built.
    pub index: Option<usize>,
    pub winning_status: WinningStatus,
    pub kind: ChoiceKind,
}

impl Choice {
    pub fn new(id: &str, ballot_title: &str) -> Choice {
        Choice {
            id: id.to_string(),
            id_key: IdKey::Text(id.to_string()),
            ballot_title: ballot_title.to_string(),
            ..Default::default()
        }
    }

    pub fn candidate(id: &str, ballot_title: &str, party: Option<&str>) -> Choice {
        Choice {
            kind: ChoiceKind::Candidate {
                ballot_designation: None,
                candidate_party: party.map(|p| p.to_string()),
            },
            ..Choice::new(id, ballot_title)
        }
    }

    pub fn with_index(mut self, index: usize) -> Choice {
        self.index = Some(index);
        self
    }

    /// Marks the id as written with an integer.
    pub fn with_int_id(mut self, id: i64) -> Choice {
        self.id = id.to_string();
        self.id_key = IdKey::Int(id);
        self
    }

    pub fn is_candidate(&self) -> bool {
        matches!(self.kind, ChoiceKind::Candidate { .. })
    }

    pub fn party(&self) -> Option<&str> {
        match &self.kind {
            ChoiceKind::Candidate {
                candidate_party, ..
            } => candidate_party.as_deref(),
            ChoiceKind::Plain => None,
        }
    }

    /// A choice is successful if it won outright or advanced to a runoff.
    pub fn is_successful(&self) -> bool {
        matches!(
            self.winning_status,
            WinningStatus::Winning | WinningStatus::ToRunoff
        )
    }
}

impl Identified for Choice {
    const KIND: &'static str = "choice";
    fn id(&self) -> &str {
        &self.id
    }
}
