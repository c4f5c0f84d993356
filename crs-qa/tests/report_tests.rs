//! Comparison report integration tests
//!
//! Builds school trees with processed tables and checks the written
//! `comparison_report.txt`.

use crs_common::layout::{discover_schools, Source};
use crs_qa::{compare_all, write_school_report, DuplicateReason, SimilarityBand};
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str = "description,relevance_score,source,title\n";

fn write_file(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn table(rows: &[(&str, &str, &str)]) -> String {
    let mut out = HEADER.to_string();
    for (title, description, score) in rows {
        out.push_str(&format!("\"{}\",{},catalog,\"{}\"\n", description, score, title));
    }
    out
}

#[test]
fn test_report_for_matching_sources_with_duplicates() {
    let temp = TempDir::new().unwrap();
    let schools_dir = temp.path().join("schools");
    let school_dir = schools_dir.join("priority").join("alpha");

    let web = table(&[
        ("HIST 101", "Basic survey of world history", "4"),
        ("HIST 102", "Basic survey of world history", "4"),
    ]);
    let pdf = table(&[("HIST 101", "World history survey", "3"), ("ECON 1", "Markets", "5")]);
    write_file(&school_dir.join("processed_data").join("processed.csv"), &web);
    write_file(&school_dir.join("pdfs").join("processed.csv"), &pdf);

    let school = discover_schools(&schools_dir).remove(0);
    let report = write_school_report(&school).unwrap();

    assert_eq!(report.web.course_count, 2);
    assert_eq!(report.pdf.course_count, 2);
    assert_eq!(report.web.duplicates.len(), 1);
    assert_eq!(report.web.duplicates[0].reason, DuplicateReason::Description);
    assert_eq!(report.comparison.band, SimilarityBand::VeryHigh);

    let text = std::fs::read_to_string(school.comparison_report()).unwrap();
    assert!(text.contains(&format!("WEB file: {}\n", school.processed_csv(Source::Web).display())));
    assert!(text.contains("Both sources have the same number of courses\n"));
    assert!(text.contains("WEB average relevance: 4.00\n"));
    assert!(text.contains("Both sources have the same average relevance\n"));
    assert!(text.contains("WEB duplicates found: 1\n"));
    assert!(text.contains("Title: HIST 102\nDescription: Basic survey of world history...\n"));
    assert!(text.contains("Reason: duplicate description\n"));
}

#[test]
fn test_missing_pdf_table_reports_zero_and_notice() {
    let temp = TempDir::new().unwrap();
    let schools_dir = temp.path().join("schools");
    let school_dir = schools_dir.join("non_priority").join("beta");
    write_file(
        &school_dir.join("processed_data").join("processed.csv"),
        &table(&[("A", "a", "2"), ("B", "b", "2")]),
    );

    let school = discover_schools(&schools_dir).remove(0);
    let report = write_school_report(&school).unwrap();

    assert_eq!(report.pdf.course_count, 0);
    assert_eq!(report.comparison.count_difference, 2);

    let text = std::fs::read_to_string(school.comparison_report()).unwrap();
    assert!(text.contains("=== NOTICES ===\nPDF processed data not found\n"));
    assert!(text.contains("PDF courses: 0\n"));
    assert!(text.contains("WEB has 2 more courses than PDF\n"));
}

#[test]
fn test_compare_all_isolates_failures() {
    let temp = TempDir::new().unwrap();
    let schools_dir = temp.path().join("schools");
    let good = schools_dir.join("priority").join("alpha");
    let bad = schools_dir.join("priority").join("beta");
    std::fs::create_dir_all(&good).unwrap();
    // A directory in place of the report file makes the final rename fail
    std::fs::create_dir_all(bad.join("comparison_report.txt")).unwrap();

    let results = compare_all(&discover_schools(&schools_dir));

    assert_eq!(results.len(), 2);
    let alpha = results.iter().find(|(id, _)| id == "priority/alpha").unwrap();
    assert!(alpha.1.is_ok());
    let beta = results.iter().find(|(id, _)| id == "priority/beta").unwrap();
    assert!(beta.1.is_err());
    assert!(good.join("comparison_report.txt").is_file());
}
