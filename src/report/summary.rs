// Assembles the JSON summary of an election.

use serde_json::json;
use serde_json::Map as JSMap;

use crate::report::config_reader::ReportConfig;
use crate::report::*;

fn stats_to_json(totals: &IndexedTotals<'_>) -> ResultsResult<JSMap<String, JSValue>> {
    let mut stats: JSMap<String, JSValue> = JSMap::new();
    for rt in totals.iter_totals(ALL_STATS_TOKEN)? {
        stats.insert(rt.item.id().to_string(), json!(rt.total));
    }
    Ok(stats)
}

fn round_to_json(cr: &CandidateRound) -> JSValue {
    json!({
        "round": cr.round,
        "votes": cr.votes,
        "transfer": cr.transfer,
        "percent": format_percent(cr.percent()),
        "isLeading": cr.is_leading,
        "afterEliminated": cr.after_eliminated,
    })
}

fn rcv_to_json(contest: &Contest, continuing_stat_id: &str) -> ResultsResult<JSValue> {
    let rcv = contest.rcv_results(continuing_stat_id)?;
    let candidates: Vec<JSValue> = rcv
        .summary()?
        .iter()
        .map(|(candidate, rounds)| {
            json!({
                "id": candidate.id,
                "name": candidate.ballot_title,
                "rounds": rounds.iter().map(round_to_json).collect::<Vec<JSValue>>(),
            })
        })
        .collect();
    let continuing = (1..=rcv.round_count())
        .map(|round| rcv.get_continuing_total(round))
        .collect::<ResultsResult<Vec<i64>>>()?;
    Ok(json!({
        "rounds": rcv.round_count(),
        "continuing": continuing,
        "candidates": candidates,
    }))
}

fn details_to_json<R: Reportable + ?Sized>(
    item: &R,
    source: &dyn ResultsSource,
    column_selector: &str,
) -> ResultsResult<JSValue> {
    Ok(json!({
        "headings": detail_headings(item, column_selector)?,
        "rows": detail_rows(item, source, column_selector, None)?,
    }))
}

pub fn contest_to_json(
    contest: &Contest,
    config: &ReportConfig,
    source: &dyn ResultsSource,
) -> ResultsResult<JSValue> {
    let totals = get_contest_totals_by_stat(contest, None)?;
    // Styles without ballot counts have no denominator.
    let voted_ballots: Option<i64> = match totals.get_voted_ballots() {
        Ok(rt) => Some(rt.total),
        Err(e) => {
            debug!("contest_to_json: {}: no voted ballots: {}", contest.id, e);
            None
        }
    };
    let choices: Vec<JSValue> = totals
        .sorted_totals(CHOICES_TOKEN)?
        .iter()
        .map(|rt| {
            let mut js = json!({
                "id": rt.item.id(),
                "name": rt.item.display_text(),
                "votes": rt.total,
                "formatted": format_number(rt.total),
            });
            if let Some(denominator) = voted_ballots {
                js["percent"] = json!(format_percent(rt.percent_of(denominator)));
            }
            if let Some(choice) = rt.item.as_choice() {
                js["successful"] = json!(choice.is_successful());
            }
            js
        })
        .collect();

    let mut res = json!({
        "id": contest.id,
        "type": contest.contest_type.as_str(),
        "title": contest.ballot_title,
        "district": contest.voting_district.display_name(),
        "numberElected": contest.number_elected,
        "stats": stats_to_json(&totals)?,
        "votedBallots": voted_ballots,
        "choices": choices,
    });
    if contest.is_rcv() {
        res["rcv"] = rcv_to_json(contest, config.continuing_stat_id())?;
    }
    if let Some(selector) = config.column_selector.as_ref() {
        res["areas"] = details_to_json(contest, source, selector)?;
    }
    Ok(res)
}

pub fn turnout_to_json(
    turnout: &Turnout,
    config: &ReportConfig,
    source: &dyn ResultsSource,
) -> ResultsResult<JSValue> {
    let totals = get_contest_totals_by_stat(turnout, None)?;
    let mut parties: JSMap<String, JSValue> = JSMap::new();
    for party in turnout.parties().iter() {
        let by_party = turnout.get_totals_by_party(None, &party.id)?;
        parties.insert(party.id.clone(), JSValue::Object(stats_to_json(&by_party)?));
    }
    let mut res = json!({
        "id": turnout.id,
        "stats": stats_to_json(&totals)?,
        "parties": parties,
    });
    // The turnout has no choices: every stat is listed.
    if config.column_selector.is_some() {
        res["areas"] = details_to_json(turnout, source, ALL_STATS_TOKEN)?;
    }
    Ok(res)
}

pub fn build_summary_js(
    election: &Election,
    config: &ReportConfig,
    source: &dyn ResultsSource,
) -> ResultsResult<JSValue> {
    let contests = election
        .contests
        .iter()
        .map(|contest| contest_to_json(contest, config, source))
        .collect::<ResultsResult<Vec<JSValue>>>()?;
    let turnout = match election.turnout.as_ref() {
        Some(turnout) => Some(turnout_to_json(turnout, config, source)?),
        None => None,
    };
    info!("build_summary_js: {} contests", contests.len());
    Ok(json!({
        "election": {
            "title": election.ballot_title,
            "area": election.election_area,
            "date": election.date.map(|d| d.format("%Y-%m-%d").to_string()),
        },
        "turnout": turnout,
        "contests": contests,
    }))
}
