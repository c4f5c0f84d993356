//! Plain-text comparison report

use crate::comparison::{ComparisonReport, CorpusStats};
use std::fmt::Write;

/// Characters of a duplicate's description shown in the details section
pub const DESCRIPTION_EXCERPT_CHARS: usize = 100;

/// Render the report exactly as written to `comparison_report.txt`
pub fn render(report: &ComparisonReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, report);
    out
}

fn write_report(out: &mut String, report: &ComparisonReport) -> std::fmt::Result {
    let pdf = &report.pdf;
    let web = &report.web;
    let cmp = &report.comparison;

    writeln!(out, "=== COURSE COMPARISON REPORT ===")?;
    writeln!(out)?;

    writeln!(out, "=== FILE INFORMATION ===")?;
    writeln!(out, "PDF file: {}", pdf.path.display())?;
    writeln!(out, "WEB file: {}", web.path.display())?;
    writeln!(out)?;

    let notices: Vec<&str> = report.notices().collect();
    if !notices.is_empty() {
        writeln!(out, "=== NOTICES ===")?;
        for notice in notices {
            writeln!(out, "{}", notice)?;
        }
        writeln!(out)?;
    }

    writeln!(out, "=== COURSE COUNTS ===")?;
    writeln!(out, "PDF courses: {}", pdf.course_count)?;
    writeln!(out, "WEB courses: {}", web.course_count)?;
    match cmp.count_difference {
        d if d > 0 => writeln!(out, "WEB has {} more courses than PDF", d)?,
        d if d < 0 => writeln!(out, "PDF has {} more courses than WEB", d.unsigned_abs())?,
        _ => writeln!(out, "Both sources have the same number of courses")?,
    }
    writeln!(out)?;

    writeln!(out, "=== AVERAGE RELEVANCE SCORES ===")?;
    writeln!(out, "PDF average relevance: {:.2}", pdf.avg_relevance)?;
    writeln!(out, "WEB average relevance: {:.2}", web.avg_relevance)?;
    let delta = cmp.score_difference;
    if delta > 0.0 {
        writeln!(out, "WEB has higher average relevance by {:.2}", delta)?;
    } else if delta < 0.0 {
        writeln!(out, "PDF has higher average relevance by {:.2}", delta.abs())?;
    } else {
        writeln!(out, "Both sources have the same average relevance")?;
    }
    writeln!(out)?;

    writeln!(out, "=== DUPLICATES SUMMARY ===")?;
    writeln!(out, "PDF duplicates found: {}", pdf.duplicate_count())?;
    writeln!(out, "WEB duplicates found: {}", web.duplicate_count())?;
    writeln!(out)?;

    write_duplicate_details(out, pdf)?;
    write_duplicate_details(out, web)?;

    writeln!(out, "=== OVERALL SIMILARITY ASSESSMENT ===")?;
    writeln!(out, "Course count similarity: {:.1}%", cmp.count_similarity * 100.0)?;
    writeln!(out, "Relevance score similarity: {:.1}%", cmp.score_similarity * 100.0)?;
    writeln!(out)?;
    writeln!(
        out,
        "Overall similarity between sources: {:.1}%",
        cmp.overall_similarity * 100.0
    )?;
    writeln!(out, "{} similarity between sources", cmp.band)?;

    Ok(())
}

fn write_duplicate_details(out: &mut String, stats: &CorpusStats) -> std::fmt::Result {
    if stats.duplicates.is_empty() {
        return Ok(());
    }

    writeln!(out, "=== {} DUPLICATES DETAILS ===", stats.source.label())?;
    for (i, dup) in stats.duplicates.iter().enumerate() {
        writeln!(out, "Duplicate {}:", i + 1)?;
        writeln!(out, "Title: {}", dup.title)?;
        writeln!(out, "Description: {}...", dup.description_excerpt(DESCRIPTION_EXCERPT_CHARS))?;
        writeln!(out, "Source: {}", dup.source)?;
        writeln!(out, "Reason: {}", dup.reason)?;
        writeln!(out)?;
    }
    Ok(())
}
