/*!

This is the long-form manual for `election_results` and `results-reporter`.

## Election definition

The election is described by a single JSON document. Ids may be written
as strings or as integers; texts may be plain strings or tables of
translations (the English text is used).

```json
{
  "result_stat_types": [{"_id": "RSTot", "text": "Total Votes"}],
  "voting_groups": [{"_id": "TO", "text": "Total"}, {"_id": "MV", "text": "Vote by Mail"}],
  "parties": [{"_id": "0", "text": "All Parties"}],
  "result_styles": [{
    "_id": "RS1",
    "is_rcv": false,
    "result_stat_type_ids": ["RSReg", "RSCst", "RSTot"],
    "voting_group_ids": ["TO", "ED", "MV"]
  }],
  "areas": [
    {"_id": "CITY", "name": "City", "consolidated_ids": ["P1", "P2"]},
    {"_id": "P1", "name": "Precinct 1", "reporting_group_ids": ["ED", "MV"]}
  ],
  "election": {
    "ballot_title": "General Election",
    "date": "2018-06-05",
    "headers": [{"_id": "H1", "ballot_title": "City"}],
    "contests": [{
      "_id": "100",
      "_type": "office",
      "ballot_title": "Mayor",
      "header_id": "H1",
      "result_style": "RS1",
      "voting_district": "CITY",
      "number_elected": 1,
      "choices": [{"_id": "101", "ballot_title": "ALICE", "candidate_party": "DEM"}]
    }],
    "turnout": {"_id": "TT", "result_style": "RST", "voting_district": "CITY"}
  }
}
```

The contest types are `office` (candidates), `measure` and `ynoffice`.
The area `ALL` stands for the whole contest and is added when it is not
declared. A contest reports results for the areas listed in the
`consolidated_ids` of its voting district, each broken down into its
`reporting_group_ids` (all the voting groups of the result style when
empty).

Unknown keys are logged and ignored. Duplicate or missing ids, and ids
that refer to nothing, stop the load.

## Result tables

Each contest has a table named `contest_<id>`, the turnout a table named
`turnout`. Tables are tab-separated files (`.tsv`) or Excel workbooks
(`.xlsx`, first sheet). The first row is the header:

| area_id | subtotal_type | RSReg | RSCst | RSTot | 101:ALICE | 102:BOB |
|---------|---------------|-------|-------|-------|-----------|---------|
| ALL     | TO            | 1000  | 800   | 790   | 500       | 290     |
| ALL     | MV            | 600   | 500   | 495   | 300       | 195     |
| P1      | MV            | 300   | 250   | 248   | 150       | 98      |

The stat columns follow the result style, the choice columns follow the
contest. Choice columns may be written `id` or `id:title`. Every reporting
group has exactly one row; blank cells count as 0.

Ranked-choice contests add one row per round, from the last round down to
the first, with `RCV<n>` in the first column. A blank cell in a round row
means that the candidate has been eliminated.

| area_id | subtotal_type | RSReg | RSCon | 101:ALICE | 102:BOB | 103:CARLA |
|---------|---------------|-------|-------|-----------|---------|-----------|
| RCV2    | TO            | 1000  | 760   | 410       | 350     |           |
| RCV1    | TO            | 1000  | 790   | 380       | 290     | 120       |

The turnout table has one column per party and stat, written
`<party>:<stat>`, all the stats of the first party first.

## Reports

`results-reporter` writes a JSON summary: for each contest the totals of
the aggregate area, the choices by decreasing votes, and for ranked-choice
contests the candidates in finishing order with their rounds. The
finishing order ranks candidates by the last round they reached, then by
their votes in that round, then by id.
*/
