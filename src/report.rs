//! Join, average and rank flat-file records.
//!
//! Feeds on two comma-delimited datasets: a *measures* file whose
//! records score some entity repeatedly, and a *directory* file that
//! names each entity once. Produces the entities ranked by their
//! average measure.

use crate::Score;
use rayon::prelude::*;
use std::collections::HashMap;

/// Default index of the averaged field, counting after the leading key.
pub const SCORE_FIELD: usize = 2;
/// Default number of ranked entries reported.
pub const TOP: usize = 10;

/// One comma-delimited record: the first field is the key, the rest
/// ride along unparsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub key: String,
    pub fields: Vec<String>,
}

/// A joined entry: the key, its average, and the directory fields it
/// joined against.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub key: String,
    pub score: Option<Score>,
    pub fields: Vec<String>,
}

/// Reads comma-delimited records. No header row; ragged rows are fine.
pub fn records(input: impl std::io::Read) -> Result<Vec<Record>, csv::Error> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input)
        .records()
        .map(|record| {
            let record = record?;
            let mut fields = record.iter().map(String::from);
            Ok(Record {
                key: fields.next().unwrap_or_default(),
                fields: fields.collect(),
            })
        })
        .collect()
}

/// Per-key average of the designated field, fanned out across groups.
///
/// Fields that fail integer parsing drop out of both the sum and the
/// count, without a warning. A key whose every record fails to parse
/// averages to `None`.
pub fn averages(records: Vec<Record>, field: usize) -> HashMap<String, Option<Score>> {
    let mut groups: HashMap<String, Vec<Vec<String>>> = HashMap::new();
    for record in records {
        groups.entry(record.key).or_default().push(record.fields);
    }
    groups
        .into_par_iter()
        .map(|(key, group)| (key, average(&group, field)))
        .collect()
}

fn average(group: &[Vec<String>], field: usize) -> Option<Score> {
    let scores = group
        .iter()
        .filter_map(|fields| fields.get(field))
        .filter_map(|raw| raw.trim().parse::<i64>().ok())
        .collect::<Vec<_>>();
    match scores.len() {
        0 => None,
        n => Some(scores.iter().sum::<i64>() as Score / n as Score),
    }
}

/// Inner-joins averages with the directory by key and sorts the result
/// descending by average.
///
/// Keys present on only one side are dropped. A directory key listed
/// twice joins twice. Entries with no average sort after every scored
/// entry; ties keep their encounter order.
pub fn rank(scores: &HashMap<String, Option<Score>>, directory: Vec<Record>) -> Vec<Ranked> {
    let mut ranked = directory
        .into_iter()
        .filter_map(|record| {
            scores.get(&record.key).map(|&score| Ranked {
                key: record.key,
                score,
                fields: record.fields,
            })
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|x, y| match (x.score, y.score) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEASURES: &str = "P1,c1,10,n1\nP1,c2,20,n2\nP2,c1,abc,n1\n";
    const DIRECTORY: &str = "P1,CityA\nP2,CityB\nP3,CityC\n";

    #[test]
    fn first_field_is_the_key() {
        let records = records(MEASURES.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].key, "P1");
        assert_eq!(records[0].fields, vec!["c1", "10", "n1"]);
    }

    #[test]
    fn ragged_rows_parse() {
        let records = records("K1,a\nK2\nK3,a,b,c\n".as_bytes()).unwrap();
        assert_eq!(records[1].key, "K2");
        assert!(records[1].fields.is_empty());
        assert_eq!(records[2].fields.len(), 3);
    }

    #[test]
    fn unparseable_fields_drop_out_of_the_average() {
        let records = records(MEASURES.as_bytes()).unwrap();
        let scores = averages(records, 1);
        assert_eq!(scores["P1"], Some(15.0));
    }

    #[test]
    fn a_group_with_no_parseable_field_averages_to_none() {
        let records = records(MEASURES.as_bytes()).unwrap();
        let scores = averages(records, 1);
        assert_eq!(scores["P2"], None);
    }

    #[test]
    fn out_of_range_field_index_averages_to_none() {
        let records = records("K1,5\n".as_bytes()).unwrap();
        let scores = averages(records, 7);
        assert_eq!(scores["K1"], None);
    }

    #[test]
    fn integer_parsing_tolerates_surrounding_whitespace() {
        let records = records("K1,a, 10 \nK1,b,20\n".as_bytes()).unwrap();
        let scores = averages(records, 1);
        assert_eq!(scores["K1"], Some(15.0));
    }

    #[test]
    fn scored_entries_outrank_missing_ones() {
        let measures = records(MEASURES.as_bytes()).unwrap();
        let directory = records(DIRECTORY.as_bytes()).unwrap();
        let ranked = rank(&averages(measures, 1), directory);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].key, "P1");
        assert_eq!(ranked[0].score, Some(15.0));
        assert_eq!(ranked[0].fields, vec!["CityA"]);
        assert_eq!(ranked[1].key, "P2");
        assert_eq!(ranked[1].score, None);
    }

    #[test]
    fn join_is_inner_on_both_sides() {
        let measures = records("P1,c,10,n\nP9,c,10,n\n".as_bytes()).unwrap();
        let directory = records(DIRECTORY.as_bytes()).unwrap();
        let ranked = rank(&averages(measures, 1), directory);
        let keys = ranked.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["P1"]);
    }

    #[test]
    fn duplicate_directory_rows_join_twice() {
        let measures = records("P1,c,10,n\n".as_bytes()).unwrap();
        let directory = records("P1,CityA\nP1,CityA2\n".as_bytes()).unwrap();
        let ranked = rank(&averages(measures, 1), directory);
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn descending_order_by_average() {
        let measures = records("A,3\nB,9\nC,6\n".as_bytes()).unwrap();
        let directory = records("A,x\nB,x\nC,x\n".as_bytes()).unwrap();
        let ranked = rank(&averages(measures, 0), directory);
        let keys = ranked.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["B", "C", "A"]);
    }
}
