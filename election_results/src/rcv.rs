// Round by round view of ranked-choice results.
//
// The tabulation itself is done upstream: each round arrives as a row of
// totals aligned with the contest columns, where an eliminated candidate
// has no value. This module derives transfers, leaders, eliminations and
// the finishing order from those rows.

use log::debug;
use snafu::prelude::*;

use crate::choice::Choice;
use crate::error::*;
use crate::format::compute_percent;
use crate::mapping::ResultsMapping;

/// 1-based round number.
pub type RoundId = usize;

/// One raw round: totals aligned with the mapping columns.
pub type RoundTotals = Vec<Option<i64>>;

/// The state of one candidate in one round.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateRound {
    pub round: RoundId,
    pub votes: i64,
    /// Change since the previous round.
    pub transfer: i64,
    /// Continuing ballots in this round.
    pub continuing: i64,
    /// Ties for the most votes count as leading.
    pub is_leading: bool,
    /// The candidate was eliminated before this round. The votes are zero.
    pub after_eliminated: bool,
}

impl CandidateRound {
    /// Share of the continuing ballots, 0 if there are none.
    pub fn percent(&self) -> f64 {
        compute_percent(self.votes, self.continuing)
    }
}

/// The key of the finishing order.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct OrderInfo {
    /// Last round the candidate was still running in.
    pub max_round: RoundId,
    /// Votes at that round (0 if the candidate never ran).
    pub total: i64,
}

/// The maximum of the present values at the given positions.
pub fn get_max_total(totals: &[Option<i64>], indices: &[usize]) -> ResultsResult<i64> {
    indices
        .iter()
        .filter_map(|idx| totals.get(*idx).cloned().flatten())
        .max()
        .context(NoValuesSnafu { indices })
}

/// The last round a candidate was running in, given its rounds.
pub fn find_max_round(rounds: &[CandidateRound]) -> RoundId {
    match rounds.last() {
        Some(cr) if cr.after_eliminated => cr.round - 1,
        Some(cr) => cr.round,
        None => 0,
    }
}

/// Ranked-choice rounds of one contest.
#[derive(Debug, Clone, Copy)]
pub struct RcvResults<'a> {
    name: &'a str,
    rcv_totals: &'a [RoundTotals],
    mapping: ResultsMapping<'a>,
    continuing_index: usize,
}

impl<'a> RcvResults<'a> {
    /// `rcv_rounds` is the number of rounds the contest declares; it must
    /// match the rounds present.
    pub fn new(
        name: &'a str,
        rcv_rounds: usize,
        rcv_totals: &'a [RoundTotals],
        mapping: ResultsMapping<'a>,
        continuing_stat_id: &str,
    ) -> ResultsResult<RcvResults<'a>> {
        ensure!(
            rcv_rounds == rcv_totals.len(),
            RcvRoundsMismatchSnafu {
                contest: name,
                expected: rcv_rounds,
                found: rcv_totals.len()
            }
        );
        let continuing_index = mapping.result_style().stat_index(continuing_stat_id)?;
        Ok(RcvResults {
            name,
            rcv_totals,
            mapping,
            continuing_index,
        })
    }

    pub fn round_count(&self) -> usize {
        self.rcv_totals.len()
    }

    pub fn mapping(&self) -> ResultsMapping<'a> {
        self.mapping
    }

    pub fn get_continuing_index(&self) -> usize {
        self.continuing_index
    }

    pub fn get_round_totals(&self, round: RoundId) -> ResultsResult<&'a [Option<i64>]> {
        ensure!(
            round >= 1 && round <= self.round_count(),
            RoundOutOfRangeSnafu {
                round,
                count: self.round_count()
            }
        );
        Ok(&self.rcv_totals[round - 1])
    }

    /// Continuing ballots in a round. A missing value counts as 0.
    pub fn get_continuing_total(&self, round: RoundId) -> ResultsResult<i64> {
        let totals = self.get_round_totals(round)?;
        Ok(totals
            .get(self.continuing_index)
            .cloned()
            .flatten()
            .unwrap_or(0))
    }

    /// The votes of a candidate in a round, `None` once eliminated.
    pub fn get_candidate_total(
        &self,
        candidate: &Choice,
        round: RoundId,
    ) -> ResultsResult<Option<i64>> {
        let col = self.mapping.get_choice_index(candidate)?;
        let totals = self.get_round_totals(round)?;
        let value = totals.get(col).context(UnknownChoiceSnafu {
            id: &candidate.id,
        })?;
        Ok(*value)
    }

    fn candidate_columns(&self) -> ResultsResult<Vec<usize>> {
        self.mapping
            .choices()
            .iter()
            .map(|c| self.mapping.get_choice_index(c))
            .collect()
    }

    /// The highest candidate total in a round.
    pub fn get_round_max_total(&self, round: RoundId) -> ResultsResult<i64> {
        let totals = self.get_round_totals(round)?;
        get_max_total(totals, &self.candidate_columns()?)
    }

    /// Walks the rounds of a candidate, stopping at the first round after
    /// its elimination.
    pub fn get_candidate_rounds(&self, candidate: &Choice) -> ResultsResult<Vec<CandidateRound>> {
        let columns = self.candidate_columns()?;
        let mut res: Vec<CandidateRound> = Vec::new();
        let mut prev_total: i64 = 0;
        for round in 1..=self.round_count() {
            let totals = self.get_round_totals(round)?;
            let continuing = self.get_continuing_total(round)?;
            let cr = match self.get_candidate_total(candidate, round)? {
                Some(votes) => CandidateRound {
                    round,
                    votes,
                    transfer: votes - prev_total,
                    continuing,
                    is_leading: votes == get_max_total(totals, &columns)?,
                    after_eliminated: false,
                },
                None => CandidateRound {
                    round,
                    votes: 0,
                    transfer: -prev_total,
                    continuing,
                    is_leading: false,
                    after_eliminated: true,
                },
            };
            prev_total = cr.votes;
            let stop = cr.after_eliminated;
            res.push(cr);
            if stop {
                break;
            }
        }
        debug!(
            "get_candidate_rounds: {}: candidate {:?}: {:?}",
            self.name, candidate.id, res
        );
        Ok(res)
    }

    /// The state of a candidate at one round, if the candidate got there.
    pub fn get_candidate_round(
        &self,
        candidate: &Choice,
        round: RoundId,
    ) -> ResultsResult<Option<CandidateRound>> {
        self.get_round_totals(round)?;
        Ok(self
            .get_candidate_rounds(candidate)?
            .into_iter()
            .find(|cr| cr.round == round))
    }

    pub fn compute_order_info(&self, candidate: &Choice) -> ResultsResult<OrderInfo> {
        let rounds = self.get_candidate_rounds(candidate)?;
        let max_round = find_max_round(&rounds);
        let total = rounds
            .iter()
            .find(|cr| cr.round == max_round)
            .map(|cr| cr.votes)
            .unwrap_or(0);
        Ok(OrderInfo { max_round, total })
    }

    /// The last round each candidate ran in, in contest order.
    pub fn compute_max_rounds(&self) -> ResultsResult<Vec<(&'a Choice, RoundId)>> {
        self.mapping
            .choices()
            .iter()
            .map(|c| -> ResultsResult<(&'a Choice, RoundId)> {
                Ok((c, self.compute_order_info(c)?.max_round))
            })
            .collect()
    }

    /// Candidates in finishing order: the last round reached, then the
    /// votes in that round, both descending, then the id.
    pub fn compute_candidate_order(&self) -> ResultsResult<Vec<&'a Choice>> {
        let mut keyed: Vec<(&'a Choice, OrderInfo)> = self
            .mapping
            .choices()
            .iter()
            .map(|c| -> ResultsResult<(&'a Choice, OrderInfo)> {
                Ok((c, self.compute_order_info(c)?))
            })
            .collect::<ResultsResult<_>>()?;
        keyed.sort_by(|(c1, o1), (c2, o2)| {
            o2.max_round
                .cmp(&o1.max_round)
                .then(o2.total.cmp(&o1.total))
                .then(c1.id_key.cmp(&c2.id_key))
        });
        debug!(
            "compute_candidate_order: {}: {:?}",
            self.name,
            keyed
                .iter()
                .map(|(c, o)| (c.id.as_str(), o.max_round, o.total))
                .collect::<Vec<_>>()
        );
        Ok(keyed.into_iter().map(|(c, _)| c).collect())
    }

    /// Every candidate with its rounds, in finishing order.
    pub fn summary(&self) -> ResultsResult<Vec<(&'a Choice, Vec<CandidateRound>)>> {
        self.compute_candidate_order()?
            .into_iter()
            .map(|c| -> ResultsResult<(&'a Choice, Vec<CandidateRound>)> {
                Ok((c, self.get_candidate_rounds(c)?))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ResultStatType, ResultStyle, VotingGroup};
    use std::sync::Arc;

    fn style() -> ResultStyle {
        ResultStyle::new(
            "RCV",
            "Ranked choice",
            true,
            vec![
                Arc::new(ResultStatType::new("RSReg", "Registered Voters")),
                Arc::new(ResultStatType::new("RSCon", "Continuing Ballots")),
            ],
            vec![Arc::new(VotingGroup::new("TO", "Total"))],
        )
        .unwrap()
    }

    fn candidates() -> Vec<Choice> {
        ["ANNA", "BRUNO", "CARLA", "DMITRI"]
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                Choice::candidate(&format!("10{}", idx + 2), name, None).with_index(idx)
            })
            .collect()
    }

    fn rounds() -> Vec<RoundTotals> {
        vec![
            vec![
                Some(10000),
                Some(2000),
                Some(400),
                Some(600),
                Some(640),
                Some(200),
            ],
            vec![
                Some(10000),
                Some(1900),
                Some(480),
                Some(700),
                Some(660),
                None,
            ],
            vec![Some(10000), Some(1850), None, Some(1120), Some(730), None],
        ]
    }

    fn check_log() {
        let _ = env_logger::try_init();
    }

    #[test]
    fn round_values() {
        check_log();
        let style = style();
        let cands = candidates();
        let totals = rounds();
        let mapping = ResultsMapping::new(&style, &cands);
        let rcv = RcvResults::new("mayor", 3, &totals, mapping, "RSCon").unwrap();
        assert_eq!(rcv.get_continuing_index(), 1);

        // Column 3.
        let cr = rcv.get_candidate_round(&cands[1], 2).unwrap().unwrap();
        assert_eq!(cr.votes, 700);
        assert_eq!(cr.transfer, 100);
        assert_eq!(cr.continuing, 1900);
        assert!((cr.percent() - 36.8421).abs() < 1e-4);
    }

    #[test]
    fn eliminated_candidate() {
        check_log();
        let style = style();
        let cands = candidates();
        let totals = rounds();
        let rcv = RcvResults::new("mayor", 3, &totals, ResultsMapping::new(&style, &cands), "RSCon")
            .unwrap();

        // Column 2.
        let crs = rcv.get_candidate_rounds(&cands[0]).unwrap();
        let votes: Vec<i64> = crs.iter().map(|cr| cr.votes).collect();
        let transfers: Vec<i64> = crs.iter().map(|cr| cr.transfer).collect();
        assert_eq!(votes, vec![400, 480, 0]);
        assert_eq!(transfers, vec![400, 80, -480]);
        assert!(crs[2].after_eliminated);
        assert_eq!(find_max_round(&crs), 2);

        // Column 5 is gone after the first round.
        let crs = rcv.get_candidate_rounds(&cands[3]).unwrap();
        assert_eq!(crs.len(), 2);
        assert_eq!(find_max_round(&crs), 1);
        assert_eq!(rcv.get_candidate_round(&cands[3], 3).unwrap(), None);
    }

    #[test]
    fn leaders() {
        let style = style();
        let cands = candidates();
        let totals = rounds();
        let rcv = RcvResults::new("mayor", 3, &totals, ResultsMapping::new(&style, &cands), "RSCon")
            .unwrap();
        let leading = |c: &Choice| -> Vec<bool> {
            rcv.get_candidate_rounds(c)
                .unwrap()
                .iter()
                .map(|cr| cr.is_leading)
                .collect()
        };
        assert_eq!(leading(&cands[1]), vec![false, true, true]);
        assert_eq!(leading(&cands[2]), vec![true, false, false]);
        assert_eq!(leading(&cands[0]), vec![false, false, false]);
        assert_eq!(rcv.get_round_max_total(1).unwrap(), 640);
    }

    #[test]
    fn absent_candidate_fails() {
        let style = style();
        let cands = candidates();
        let totals = rounds();
        let rcv = RcvResults::new("mayor", 3, &totals, ResultsMapping::new(&style, &cands), "RSCon")
            .unwrap();
        let stranger = Choice::candidate("ZZZ", "NOBODY", None).with_index(0);
        assert!(matches!(
            rcv.get_candidate_rounds(&stranger),
            Err(ResultsError::UnknownChoice { .. })
        ));
    }

    #[test]
    fn ties_all_lead() {
        let style = style();
        let cands = candidates();
        let totals = vec![vec![
            Some(100),
            Some(100),
            Some(30),
            Some(30),
            Some(20),
            Some(20),
        ]];
        let rcv = RcvResults::new("tie", 1, &totals, ResultsMapping::new(&style, &cands), "RSCon")
            .unwrap();
        let rounds0 = rcv.get_candidate_rounds(&cands[0]).unwrap();
        let rounds1 = rcv.get_candidate_rounds(&cands[1]).unwrap();
        assert!(rounds0[0].is_leading);
        assert!(rounds1[0].is_leading);
        // Equal rounds and totals fall back to the id.
        let order: Vec<&str> = rcv
            .compute_candidate_order()
            .unwrap()
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(order, vec!["102", "103", "104", "105"]);
    }

    #[test]
    fn finishing_order() {
        let style = style();
        let cands = candidates();
        let totals = rounds();
        let rcv = RcvResults::new("mayor", 3, &totals, ResultsMapping::new(&style, &cands), "RSCon")
            .unwrap();
        let max_rounds: Vec<(&str, usize)> = rcv
            .compute_max_rounds()
            .unwrap()
            .iter()
            .map(|(c, r)| (c.ballot_title.as_str(), *r))
            .collect();
        assert_eq!(
            max_rounds,
            vec![("ANNA", 2), ("BRUNO", 3), ("CARLA", 3), ("DMITRI", 1)]
        );
        let order: Vec<&str> = rcv
            .summary()
            .unwrap()
            .iter()
            .map(|(c, _)| c.ballot_title.as_str())
            .collect();
        assert_eq!(order, vec!["BRUNO", "CARLA", "ANNA", "DMITRI"]);
    }

    #[test]
    fn max_total_skips_missing_values() {
        let totals = [Some(4), Some(6), Some(5), None];
        assert_eq!(get_max_total(&totals, &[0, 2, 3]).unwrap(), 5);
        assert!(matches!(
            get_max_total(&totals, &[3]),
            Err(ResultsError::NoValues { .. })
        ));
    }

    #[test]
    fn inconsistent_rounds() {
        let style = style();
        let cands = candidates();
        let totals = rounds();
        let mapping = ResultsMapping::new(&style, &cands);
        assert!(matches!(
            RcvResults::new("mayor", 4, &totals, mapping, "RSCon"),
            Err(ResultsError::RcvRoundsMismatch { .. })
        ));
        assert!(matches!(
            RcvResults::new("mayor", 3, &totals, mapping, "RSExh"),
            Err(ResultsError::UnknownStat { .. })
        ));
        let rcv = RcvResults::new("mayor", 3, &totals, mapping, "RSCon").unwrap();
        assert!(matches!(
            rcv.get_round_totals(0),
            Err(ResultsError::RoundOutOfRange { .. })
        ));
        assert!(rcv.get_round_totals(4).is_err());
        let stranger = Choice::candidate("999", "STRANGER", None);
        assert!(rcv.get_candidate_rounds(&stranger).is_err());
    }
}
