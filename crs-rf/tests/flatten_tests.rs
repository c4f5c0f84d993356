//! Relational flattener integration tests

use crs_common::layout::{discover_schools, Source};
use crs_common::output::read_csv_rows;
use crs_rf::{flatten_all, output_dir, write_relations, Relation};
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "keyword_frequencies,matched_groups,matched_keywords,relevance_score,title\n";

fn write_file(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn setup_schools(root: &Path) {
    let alpha = root.join("priority").join("alpha");
    let beta = root.join("non_priority").join("beta");
    std::fs::create_dir_all(root.join("priority").join("gamma")).unwrap();

    write_file(
        &alpha.join("processed_data").join("processed.csv"),
        &format!(
            "{}{}{}",
            HEADER,
            "\"{\"\"python\"\":2}\",programming-3,\"python, coding\",6,Python\n",
            "{broken,data-1;ethics,data,2,Data Ethics\n"
        ),
    );
    write_file(
        &beta.join("processed_data").join("processed.csv"),
        &format!("{}{}", HEADER, "\"{\"\"data\"\":1}\",data-1,data,1.5,Stats\n"),
    );
    write_file(
        &beta.join("pdfs").join("processed.csv"),
        &format!("{}{}", HEADER, "{},ethics,ethics,1,Ethics\n"),
    );
}

#[test]
fn test_flatten_all_writes_four_relations() {
    let temp = TempDir::new().unwrap();
    let schools_dir = temp.path().join("schools");
    setup_schools(&schools_dir);
    let out = temp.path().join("relational_output");

    let relations = flatten_all(&discover_schools(&schools_dir), Source::Web).unwrap();
    let results = write_relations(&relations, &out);
    assert!(results.iter().all(|(_, r)| r.is_ok()));

    let scores = read_csv_rows(&out.join("relevance_scores.csv")).unwrap();
    let ids: Vec<&str> = scores.iter().map(|r| r["course_id"].as_str()).collect();
    assert_eq!(ids, vec!["alpha__0", "alpha__1", "beta__0"]);
    assert_eq!(scores[2]["relevance_score"], "1.5");

    let groups = read_csv_rows(&out.join("group_matches.csv")).unwrap();
    assert_eq!(groups.len(), 4);
    assert_eq!(groups[1]["group"], "data-1");
    assert_eq!(groups[2]["group"], "ethics");

    let keywords = read_csv_rows(&out.join("keyword_matches.csv")).unwrap();
    assert_eq!(keywords[0]["keyword"], "python, coding");

    let frequencies = read_csv_rows(&out.join("keyword_frequencies.csv")).unwrap();
    assert_eq!(frequencies.len(), 2);
    assert_eq!(frequencies[0]["course_id"], "alpha__0");
    assert_eq!(frequencies[0]["count"], "2");
    assert_eq!(frequencies[1]["school"], "beta");
}

#[test]
fn test_pdf_source_reads_pdf_tables() {
    let temp = TempDir::new().unwrap();
    let schools_dir = temp.path().join("schools");
    setup_schools(&schools_dir);

    let relations = flatten_all(&discover_schools(&schools_dir), Source::Pdf).unwrap();

    assert_eq!(relations.relevance.len(), 1);
    assert_eq!(relations.relevance[0].course_id, "beta__0");
    assert!(relations.frequencies.is_empty());
    assert_eq!(output_dir(temp.path(), Source::Pdf), temp.path().join("pdf"));
}

#[test]
fn test_no_tables_means_nothing_to_write() {
    let temp = TempDir::new().unwrap();
    let schools_dir = temp.path().join("schools");
    std::fs::create_dir_all(schools_dir.join("priority").join("empty")).unwrap();

    assert!(flatten_all(&discover_schools(&schools_dir), Source::Web).is_none());
}

#[test]
fn test_failed_relation_does_not_block_others() {
    let temp = TempDir::new().unwrap();
    let schools_dir = temp.path().join("schools");
    setup_schools(&schools_dir);
    let out = temp.path().join("relational_output");
    std::fs::create_dir_all(out.join("group_matches.csv")).unwrap();

    let relations = flatten_all(&discover_schools(&schools_dir), Source::Web).unwrap();
    let results = write_relations(&relations, &out);

    for (relation, result) in &results {
        assert_eq!(result.is_err(), *relation == Relation::GroupMatches, "{relation}");
    }
    assert!(out.join("relevance_scores.csv").is_file());
    assert!(out.join("keyword_frequencies.csv").is_file());
}
