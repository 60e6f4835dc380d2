// Builds an election from its JSON definition.
//
// Every object kind is described by a table of fields: the JSON key and
// the function storing the parsed value into the target. Unknown keys are
// reported and skipped.

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::collections::HashMap;

use crate::area::Area;
use crate::builder::{ContestBuilder, TurnoutBuilder};
use crate::catalog::{Catalog, Party, ResultStatType, ResultStyle, VotingGroup};
use crate::choice::{Choice, ChoiceKind, IdKey, WinningStatus};
use crate::election::{BallotItemRef, Election, Header, ReferenceData};
use crate::error::*;

/// Language picked from translated texts.
const DEFAULT_LANG: &str = "en";

type Apply<T> = fn(&mut T, &JSValue) -> ResultsResult<()>;

struct FieldSpec<T> {
    key: &'static str,
    apply: Apply<T>,
}

fn field<T>(key: &'static str, apply: Apply<T>) -> FieldSpec<T> {
    FieldSpec { key, apply }
}

fn load_object<T: Default>(kind: &str, data: &JSValue, fields: &[FieldSpec<T>]) -> ResultsResult<T> {
    let obj = data.as_object().context(InvalidFieldSnafu {
        key: kind,
        reason: format!("expected an object, found {}", data),
    })?;
    let mut res = T::default();
    for (key, value) in obj.iter() {
        match fields.iter().find(|f| f.key == key) {
            Some(f) => (f.apply)(&mut res, value)?,
            None => warn!("load_object: {}: ignoring unknown key {:?}", kind, key),
        }
    }
    Ok(res)
}

fn load_list<T: Default>(kind: &str, data: &JSValue, fields: &[FieldSpec<T>]) -> ResultsResult<Vec<T>> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    let items = data.as_array().context(InvalidFieldSnafu {
        key: kind,
        reason: "expected a list".to_string(),
    })?;
    items
        .iter()
        .map(|item| load_object(kind, item, fields))
        .collect()
}

// ***** Value parsers *****

/// Ids may be written as strings or integers.
pub fn parse_id(key: &str, value: &JSValue) -> ResultsResult<String> {
    match value {
        JSValue::String(s) if !s.is_empty() => Ok(s.clone()),
        JSValue::Number(n) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        _ => InvalidFieldSnafu {
            key,
            reason: format!("not an id: {}", value),
        }
        .fail(),
    }
}

/// The sort key of an id: integers keep their numeric order.
pub fn parse_id_key(key: &str, value: &JSValue) -> ResultsResult<IdKey> {
    match value.as_i64() {
        Some(n) => Ok(IdKey::Int(n)),
        None => Ok(IdKey::Text(parse_id(key, value)?)),
    }
}

/// A text, or a table of translations from which the default language is
/// picked.
pub fn parse_i18n(key: &str, value: &JSValue) -> ResultsResult<String> {
    match value {
        JSValue::Null => Ok(String::new()),
        JSValue::String(s) => Ok(s.clone()),
        JSValue::Object(translations) => {
            let text = translations
                .get(DEFAULT_LANG)
                .or_else(|| translations.values().next())
                .and_then(|v| v.as_str())
                .unwrap_or("");
            Ok(text.to_string())
        }
        _ => InvalidFieldSnafu {
            key,
            reason: format!("not a text: {}", value),
        }
        .fail(),
    }
}

pub fn parse_opt_text(key: &str, value: &JSValue) -> ResultsResult<Option<String>> {
    let text = parse_i18n(key, value)?;
    Ok(if text.is_empty() { None } else { Some(text) })
}

pub fn parse_bool(key: &str, value: &JSValue) -> ResultsResult<bool> {
    match value {
        JSValue::Null => Ok(false),
        JSValue::Bool(b) => Ok(*b),
        JSValue::Number(n) if n.as_u64() == Some(0) => Ok(false),
        JSValue::Number(n) if n.as_u64() == Some(1) => Ok(true),
        _ => InvalidFieldSnafu {
            key,
            reason: format!("not a boolean: {}", value),
        }
        .fail(),
    }
}

pub fn parse_int(key: &str, value: &JSValue) -> ResultsResult<usize> {
    let res = match value {
        JSValue::Number(n) => n.as_u64().map(|x| x as usize),
        JSValue::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    res.context(InvalidFieldSnafu {
        key,
        reason: format!("not a positive integer: {}", value),
    })
}

/// A list of ids, as a JSON list or as a space-separated string.
pub fn parse_id_list(key: &str, value: &JSValue) -> ResultsResult<Vec<String>> {
    match value {
        JSValue::Null => Ok(Vec::new()),
        JSValue::String(s) => Ok(s.split_whitespace().map(|x| x.to_string()).collect()),
        JSValue::Array(items) => items.iter().map(|v| parse_id(key, v)).collect(),
        _ => InvalidFieldSnafu {
            key,
            reason: format!("not a list of ids: {}", value),
        }
        .fail(),
    }
}

/// Dates are written `YYYY-MM-DD`.
pub fn parse_date(key: &str, value: &JSValue) -> ResultsResult<NaiveDate> {
    let s = value.as_str().context(InvalidFieldSnafu {
        key,
        reason: format!("not a date: {}", value),
    })?;
    NaiveDate::parse_from_str(s, "%Y-%m-%d").context(ParsingDateSnafu { key, value: s })
}

// ***** Field tables *****

fn stat_type_fields() -> Vec<FieldSpec<ResultStatType>> {
    vec![
        field("_id", |t: &mut ResultStatType, v: &JSValue| {
            t.id = parse_id("_id", v)?;
            Ok(())
        }),
        field("text", |t: &mut ResultStatType, v: &JSValue| {
            t.display_text = parse_i18n("text", v)?;
            Ok(())
        }),
        field("is_percent", |t: &mut ResultStatType, v: &JSValue| {
            t.is_percent = parse_bool("is_percent", v)?;
            Ok(())
        }),
    ]
}

fn voting_group_fields() -> Vec<FieldSpec<VotingGroup>> {
    vec![
        field("_id", |t: &mut VotingGroup, v: &JSValue| {
            t.id = parse_id("_id", v)?;
            Ok(())
        }),
        field("text", |t: &mut VotingGroup, v: &JSValue| {
            t.display_text = parse_i18n("text", v)?;
            Ok(())
        }),
    ]
}

fn party_fields() -> Vec<FieldSpec<Party>> {
    vec![
        field("_id", |t: &mut Party, v: &JSValue| {
            t.id = parse_id("_id", v)?;
            Ok(())
        }),
        field("text", |t: &mut Party, v: &JSValue| {
            t.display_text = parse_i18n("text", v)?;
            Ok(())
        }),
    ]
}

#[derive(Debug, Default)]
struct StyleDef {
    id: String,
    description: String,
    is_rcv: bool,
    stat_ids: Vec<String>,
    voting_group_ids: Vec<String>,
}

fn style_fields() -> Vec<FieldSpec<StyleDef>> {
    vec![
        field("_id", |t: &mut StyleDef, v: &JSValue| {
            t.id = parse_id("_id", v)?;
            Ok(())
        }),
        field("description", |t: &mut StyleDef, v: &JSValue| {
            t.description = parse_i18n("description", v)?;
            Ok(())
        }),
        field("is_rcv", |t: &mut StyleDef, v: &JSValue| {
            t.is_rcv = parse_bool("is_rcv", v)?;
            Ok(())
        }),
        field("result_stat_type_ids", |t: &mut StyleDef, v: &JSValue| {
            t.stat_ids = parse_id_list("result_stat_type_ids", v)?;
            Ok(())
        }),
        field("voting_group_ids", |t: &mut StyleDef, v: &JSValue| {
            t.voting_group_ids = parse_id_list("voting_group_ids", v)?;
            Ok(())
        }),
    ]
}

fn area_fields() -> Vec<FieldSpec<Area>> {
    vec![
        field("_id", |t: &mut Area, v: &JSValue| {
            t.id = parse_id("_id", v)?;
            Ok(())
        }),
        field("classification", |t: &mut Area, v: &JSValue| {
            t.classification = parse_opt_text("classification", v)?;
            Ok(())
        }),
        field("name", |t: &mut Area, v: &JSValue| {
            t.name = parse_i18n("name", v)?;
            Ok(())
        }),
        field("short_name", |t: &mut Area, v: &JSValue| {
            t.short_name = parse_opt_text("short_name", v)?;
            Ok(())
        }),
        field("is_vbm", |t: &mut Area, v: &JSValue| {
            t.is_vbm = parse_bool("is_vbm", v)?;
            Ok(())
        }),
        field("consolidated_ids", |t: &mut Area, v: &JSValue| {
            t.consolidated_ids = parse_id_list("consolidated_ids", v)?;
            Ok(())
        }),
        field("reporting_group_ids", |t: &mut Area, v: &JSValue| {
            t.reporting_group_ids = parse_id_list("reporting_group_ids", v)?;
            Ok(())
        }),
    ]
}

fn candidate_info(choice: &Choice) -> (Option<String>, Option<String>) {
    match &choice.kind {
        ChoiceKind::Candidate {
            ballot_designation,
            candidate_party,
        } => (ballot_designation.clone(), candidate_party.clone()),
        ChoiceKind::Plain => (None, None),
    }
}

fn choice_fields() -> Vec<FieldSpec<Choice>> {
    vec![
        field("_id", |t: &mut Choice, v: &JSValue| {
            t.id = parse_id("_id", v)?;
            t.id_key = parse_id_key("_id", v)?;
            Ok(())
        }),
        field("ballot_title", |t: &mut Choice, v: &JSValue| {
            t.ballot_title = parse_i18n("ballot_title", v)?;
            Ok(())
        }),
        field("ballot_designation", |t: &mut Choice, v: &JSValue| {
            let (_, candidate_party) = candidate_info(t);
            t.kind = ChoiceKind::Candidate {
                ballot_designation: parse_opt_text("ballot_designation", v)?,
                candidate_party,
            };
            Ok(())
        }),
        field("candidate_party", |t: &mut Choice, v: &JSValue| {
            let (ballot_designation, _) = candidate_info(t);
            t.kind = ChoiceKind::Candidate {
                ballot_designation,
                candidate_party: parse_opt_text("candidate_party", v)?,
            };
            Ok(())
        }),
        field("winning_status", |t: &mut Choice, v: &JSValue| {
            t.winning_status = match v {
                JSValue::Null => WinningStatus::None,
                JSValue::String(s) => WinningStatus::parse(s)?,
                _ => {
                    return InvalidFieldSnafu {
                        key: "winning_status",
                        reason: format!("not a status: {}", v),
                    }
                    .fail()
                }
            };
            Ok(())
        }),
    ]
}

fn contest_fields() -> Vec<FieldSpec<ContestBuilder>> {
    vec![
        field("_id", |t: &mut ContestBuilder, v: &JSValue| {
            t.id = parse_id("_id", v)?;
            Ok(())
        }),
        field("_type", |t: &mut ContestBuilder, v: &JSValue| {
            t.type_name = parse_i18n("_type", v)?;
            Ok(())
        }),
        field("ballot_title", |t: &mut ContestBuilder, v: &JSValue| {
            t.ballot_title = parse_i18n("ballot_title", v)?;
            Ok(())
        }),
        field("ballot_subtitle", |t: &mut ContestBuilder, v: &JSValue| {
            t.ballot_subtitle = parse_opt_text("ballot_subtitle", v)?;
            Ok(())
        }),
        field("header_id", |t: &mut ContestBuilder, v: &JSValue| {
            t.header_id = if v.is_null() {
                None
            } else {
                Some(parse_id("header_id", v)?)
            };
            Ok(())
        }),
        field("result_style", |t: &mut ContestBuilder, v: &JSValue| {
            t.result_style_id = parse_id("result_style", v)?;
            Ok(())
        }),
        field("voting_district", |t: &mut ContestBuilder, v: &JSValue| {
            t.voting_district_id = if v.is_null() {
                None
            } else {
                Some(parse_id("voting_district", v)?)
            };
            Ok(())
        }),
        field("number_elected", |t: &mut ContestBuilder, v: &JSValue| {
            t.number_elected = Some(parse_int("number_elected", v)?);
            Ok(())
        }),
        field("vote_for_msg", |t: &mut ContestBuilder, v: &JSValue| {
            t.vote_for_msg = parse_opt_text("vote_for_msg", v)?;
            Ok(())
        }),
        field("writeins_allowed", |t: &mut ContestBuilder, v: &JSValue| {
            t.writeins_allowed = parse_bool("writeins_allowed", v)?;
            Ok(())
        }),
        field("rcv_rounds", |t: &mut ContestBuilder, v: &JSValue| {
            t.rcv_rounds = if v.is_null() {
                0
            } else {
                parse_int("rcv_rounds", v)?
            };
            Ok(())
        }),
        field("choices", |t: &mut ContestBuilder, v: &JSValue| {
            t.choices = load_list("choice", v, &choice_fields())?;
            Ok(())
        }),
    ]
}

fn header_fields() -> Vec<FieldSpec<Header>> {
    vec![
        field("_id", |t: &mut Header, v: &JSValue| {
            t.id = parse_id("_id", v)?;
            Ok(())
        }),
        field("ballot_title", |t: &mut Header, v: &JSValue| {
            t.ballot_title = parse_i18n("ballot_title", v)?;
            Ok(())
        }),
        field("classification", |t: &mut Header, v: &JSValue| {
            t.classification = parse_opt_text("classification", v)?;
            Ok(())
        }),
        field("header_id", |t: &mut Header, v: &JSValue| {
            t.header_id = if v.is_null() {
                None
            } else {
                Some(parse_id("header_id", v)?)
            };
            Ok(())
        }),
    ]
}

fn turnout_fields() -> Vec<FieldSpec<TurnoutBuilder>> {
    vec![
        field("_id", |t: &mut TurnoutBuilder, v: &JSValue| {
            t.id = parse_id("_id", v)?;
            Ok(())
        }),
        field("result_style", |t: &mut TurnoutBuilder, v: &JSValue| {
            t.result_style_id = parse_id("result_style", v)?;
            Ok(())
        }),
        field("voting_district", |t: &mut TurnoutBuilder, v: &JSValue| {
            t.voting_district_id = if v.is_null() {
                None
            } else {
                Some(parse_id("voting_district", v)?)
            };
            Ok(())
        }),
    ]
}

#[derive(Debug, Default)]
struct ElectionDef {
    ballot_title: String,
    election_area: Option<String>,
    date: Option<NaiveDate>,
    headers: Vec<Header>,
    contests: Vec<ContestBuilder>,
    turnout: Option<TurnoutBuilder>,
}

fn election_fields() -> Vec<FieldSpec<ElectionDef>> {
    vec![
        field("ballot_title", |t: &mut ElectionDef, v: &JSValue| {
            t.ballot_title = parse_i18n("ballot_title", v)?;
            Ok(())
        }),
        field("election_area", |t: &mut ElectionDef, v: &JSValue| {
            t.election_area = parse_opt_text("election_area", v)?;
            Ok(())
        }),
        field("date", |t: &mut ElectionDef, v: &JSValue| {
            t.date = Some(parse_date("date", v)?);
            Ok(())
        }),
        field("headers", |t: &mut ElectionDef, v: &JSValue| {
            t.headers = load_list("header", v, &header_fields())?;
            Ok(())
        }),
        field("contests", |t: &mut ElectionDef, v: &JSValue| {
            t.contests = load_list("contest", v, &contest_fields())?;
            Ok(())
        }),
        field("turnout", |t: &mut ElectionDef, v: &JSValue| {
            t.turnout = if v.is_null() {
                None
            } else {
                Some(load_object("turnout", v, &turnout_fields())?)
            };
            Ok(())
        }),
    ]
}

#[derive(Debug, Default)]
struct RootDef {
    result_stat_types: Vec<ResultStatType>,
    voting_groups: Vec<VotingGroup>,
    parties: Vec<Party>,
    result_styles: Vec<StyleDef>,
    areas: Vec<Area>,
    election: Option<ElectionDef>,
}

fn root_fields() -> Vec<FieldSpec<RootDef>> {
    vec![
        field("result_stat_types", |t: &mut RootDef, v: &JSValue| {
            t.result_stat_types = load_list("result stat type", v, &stat_type_fields())?;
            Ok(())
        }),
        field("voting_groups", |t: &mut RootDef, v: &JSValue| {
            t.voting_groups = load_list("voting group", v, &voting_group_fields())?;
            Ok(())
        }),
        field("parties", |t: &mut RootDef, v: &JSValue| {
            t.parties = load_list("party", v, &party_fields())?;
            Ok(())
        }),
        field("result_styles", |t: &mut RootDef, v: &JSValue| {
            t.result_styles = load_list("result style", v, &style_fields())?;
            Ok(())
        }),
        field("areas", |t: &mut RootDef, v: &JSValue| {
            t.areas = load_list("area", v, &area_fields())?;
            Ok(())
        }),
        field("election", |t: &mut RootDef, v: &JSValue| {
            t.election = Some(load_object("election", v, &election_fields())?);
            Ok(())
        }),
    ]
}

// ***** Assembly *****

fn build_reference(root: RootDef) -> ResultsResult<(ReferenceData, Option<ElectionDef>)> {
    let result_stat_types = Catalog::from_items(root.result_stat_types)?;
    let voting_groups = Catalog::from_items(root.voting_groups)?;
    let parties = Catalog::from_items(root.parties)?;

    let mut result_styles: Catalog<ResultStyle> = Catalog::new();
    for def in root.result_styles.into_iter() {
        let referrer = format!("result style {}", def.id);
        let stats = def
            .stat_ids
            .iter()
            .map(|id| result_stat_types.lookup(id, &referrer))
            .collect::<ResultsResult<Vec<_>>>()?;
        let vgs = def
            .voting_group_ids
            .iter()
            .map(|id| voting_groups.lookup(id, &referrer))
            .collect::<ResultsResult<Vec<_>>>()?;
        result_styles.insert(ResultStyle::new(
            &def.id,
            &def.description,
            def.is_rcv,
            stats,
            vgs,
        )?)?;
    }

    let mut areas: Catalog<Area> = Catalog::new();
    if !root.areas.iter().any(|a| a.is_all()) {
        debug!("build_reference: adding the aggregate area");
        areas.insert(Area::all_area())?;
    }
    for area in root.areas.into_iter() {
        areas.insert(area)?;
    }

    Ok((
        ReferenceData {
            result_stat_types,
            voting_groups,
            parties,
            result_styles,
            areas,
        },
        root.election,
    ))
}

/// Attaches every header and contest to its parent header.
fn link_headers(headers: &mut [Header], contests: &[ContestBuilder]) -> ResultsResult<()> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    for (idx, h) in headers.iter().enumerate() {
        let previous = positions.insert(h.id.clone(), idx);
        ensure!(
            previous.is_none(),
            DuplicateIdSnafu {
                kind: "header",
                id: h.id.clone()
            }
        );
    }
    let mut links: Vec<(String, String, BallotItemRef)> = Vec::new();
    for h in headers.iter() {
        if let Some(parent) = h.header_id.as_ref() {
            links.push((parent.clone(), h.id.clone(), BallotItemRef::Header(h.id.clone())));
        }
    }
    for c in contests.iter() {
        if let Some(parent) = c.header_id.as_ref() {
            links.push((parent.clone(), c.id.clone(), BallotItemRef::Contest(c.id.clone())));
        }
    }
    for (parent, child, item) in links.into_iter() {
        let pos = positions.get(&parent).context(UnknownReferenceSnafu {
            kind: "header",
            id: &parent,
            referrer: &child,
        })?;
        headers[*pos].ballot_items.push(item);
    }
    Ok(())
}

/// Builds an election from the root object of a definition.
pub fn load_election(data: &JSValue) -> ResultsResult<Election> {
    let root: RootDef = load_object("root", data, &root_fields())?;
    let (reference, election_def) = build_reference(root)?;
    let mut def = election_def.context(InvalidFieldSnafu {
        key: "election",
        reason: "missing election object".to_string(),
    })?;

    link_headers(&mut def.headers, &def.contests)?;
    let headers = Catalog::from_items(def.headers)?;

    let mut contests = Catalog::new();
    for builder in def.contests.into_iter() {
        contests.insert(builder.build(&reference)?)?;
    }
    let turnout = match def.turnout {
        Some(builder) => Some(builder.build(&reference)?),
        None => None,
    };

    info!(
        "load_election: {:?}: {} areas, {} result styles, {} contests",
        def.ballot_title,
        reference.areas.len(),
        reference.result_styles.len(),
        contests.len()
    );
    let mut election = Election::new(def.ballot_title, reference, headers, contests, turnout);
    election.election_area = def.election_area;
    election.date = def.date;
    Ok(election)
}
