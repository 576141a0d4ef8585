use std::panic::{self, AssertUnwindSafe};

use crate::analyzer::{analyze, Role, SentenceRecord};
use crate::lexicon::Lexicon;
use crate::segmenter::segment;
use crate::simplifier::simplify;

/// Returned when no usable text was supplied.
pub const EMPTY_SUMMARY: &str = "暂无内容摘要";

/// Returned when digest assembly faulted; callers still get a summary.
pub const FAILED_SUMMARY: &str = "摘要生成失败，请查看原文";

/// Area named by the fallback digest when nothing matched.
const DEFAULT_AREA: &str = "游戏开发";

const MAX_CONTENT_CHARS: usize = 3000;
const MAX_SUMMARY_CHARS: usize = 500;
const MAX_SUMMARY_LINES: usize = 8;

/// Minimum score for a sentence to appear as a key point.
const MIN_POINT_SCORE: u32 = 3;
/// Simplified points at or below this length carry no information.
const MIN_POINT_CHARS: usize = 10;

const MAX_AREAS: usize = 3;
const MAX_POINTS: usize = 3;
const MAX_PAIRS: usize = 2;
const MAX_RESULTS: usize = 2;
const PAIR_SIDE_CHARS: usize = 50;

/// Produce the structured digest for one article. All three fields are
/// optional plain text; the body is capped at 3000 characters before
/// analysis. This function never fails: empty input yields the fixed
/// no-summary constant, and any fault inside the heuristics degrades to the
/// fixed failure constant instead of unwinding into the caller.
pub fn generate_summary(lexicon: &Lexicon, title: &str, description: &str, content: &str) -> String {
    let mut full_text = String::new();
    if !title.trim().is_empty() {
        full_text.push_str(&format!("标题: {}\n", title));
    }
    if !description.trim().is_empty() {
        full_text.push_str(&format!("描述: {}\n", description));
    }
    if !content.trim().is_empty() {
        let capped: String = content.chars().take(MAX_CONTENT_CHARS).collect();
        full_text.push_str(&format!("内容: {}\n", capped));
    }

    if full_text.trim().is_empty() {
        return EMPTY_SUMMARY.to_string();
    }

    panic::catch_unwind(AssertUnwindSafe(|| assemble(&full_text, lexicon)))
        .unwrap_or_else(|_| FAILED_SUMMARY.to_string())
}

/// Run the full pipeline over prepared text and render the digest.
fn assemble(text: &str, lexicon: &Lexicon) -> String {
    let mut records: Vec<SentenceRecord> = segment(text)
        .iter()
        .filter_map(|sentence| analyze(sentence, lexicon))
        .collect();
    // Stable: ties keep original sentence order.
    records.sort_by(|a, b| b.score.cmp(&a.score));

    let areas = top_areas(&records);

    let mut lines: Vec<String> = Vec::new();
    let mut sections = 0;

    if !areas.is_empty() {
        lines.push(format!("📋 **技术领域**: {}", areas.join(", ")));
        sections += 1;
    }

    let key_points = extract_points(&records, Role::Implementation);
    if !key_points.is_empty() {
        lines.push("🔧 **关键技术点**:".to_string());
        push_numbered(&mut lines, &key_points);
        sections += 1;
    }

    let arguments = extract_points(&records, Role::Argument);
    if !arguments.is_empty() {
        lines.push("💡 **主要论点**:".to_string());
        push_numbered(&mut lines, &arguments);
        sections += 1;
    }

    let pairs = problem_solution_pairs(&records);
    if !pairs.is_empty() {
        lines.push("⚡ **问题与解决方案**:".to_string());
        push_numbered(&mut lines, &pairs);
        sections += 1;
    }

    let results: Vec<String> = extract_points(&records, Role::Result)
        .into_iter()
        .take(MAX_RESULTS)
        .collect();
    if !results.is_empty() {
        lines.push("📈 **效果与收益**:".to_string());
        push_numbered(&mut lines, &results);
        sections += 1;
    }

    // Too little structure extracted: fall back to a one-line statement
    // plus the single best sentence, if any survived analysis.
    if sections < 2 {
        lines.clear();
        let area = areas.first().map(String::as_str).unwrap_or(DEFAULT_AREA);
        lines.push(format!("这是一篇关于{}的技术文章", area));
        if let Some(best) = records.first() {
            let simplified = simplify(&best.text);
            if !simplified.is_empty() {
                lines.push(simplified);
            }
        }
    }

    cap_length(lines.join("\n"))
}

fn push_numbered(lines: &mut Vec<String>, entries: &[String]) {
    for (index, entry) in entries.iter().enumerate() {
        lines.push(format!("   {}. {}", index + 1, entry));
    }
}

/// Tally category occurrences across all records and keep the most frequent
/// three. The tally preserves first-seen order, so stable sorting breaks
/// frequency ties in favor of earlier categories.
fn top_areas(records: &[SentenceRecord]) -> Vec<String> {
    let mut tally: Vec<(String, usize)> = Vec::new();
    for record in records {
        for area in &record.categories {
            match tally.iter_mut().find(|(name, _)| name == area) {
                Some((_, count)) => *count += 1,
                None => tally.push((area.clone(), 1)),
            }
        }
    }
    tally.sort_by(|a, b| b.1.cmp(&a.1));
    tally.into_iter()
        .take(MAX_AREAS)
        .map(|(name, _)| name)
        .collect()
}

/// Simplified texts of the highest-ranked sentences with the given role,
/// subject to the minimum score and a minimum useful length.
fn extract_points(records: &[SentenceRecord], role: Role) -> Vec<String> {
    records
        .iter()
        .filter(|record| record.role == role && record.score >= MIN_POINT_SCORE)
        .map(|record| simplify(&record.text))
        .filter(|point| point.chars().count() > MIN_POINT_CHARS)
        .take(MAX_POINTS)
        .collect()
}

/// Pair problem sentences with implementation sentences positionally, in
/// ranked order. The correspondence is a heuristic: the n-th problem is
/// assumed to be addressed by the n-th implementation sentence.
fn problem_solution_pairs(records: &[SentenceRecord]) -> Vec<String> {
    let mut problems = Vec::new();
    let mut solutions = Vec::new();
    for record in records {
        match record.role {
            Role::Problem => problems.push(simplify(&record.text)),
            Role::Implementation => solutions.push(simplify(&record.text)),
            _ => {}
        }
    }

    problems
        .iter()
        .zip(&solutions)
        .filter(|(problem, solution)| !problem.is_empty() && !solution.is_empty())
        .map(|(problem, solution)| {
            format!(
                "问题: {}... → 解决: {}...",
                truncate_chars(problem, PAIR_SIDE_CHARS),
                truncate_chars(solution, PAIR_SIDE_CHARS)
            )
        })
        .take(MAX_PAIRS)
        .collect()
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Cap the rendered digest: past 500 characters only the first 8 lines are
/// kept, with an ellipsis marker line appended.
fn cap_length(summary: String) -> String {
    if summary.chars().count() <= MAX_SUMMARY_CHARS {
        return summary;
    }
    let kept: Vec<&str> = summary.lines().take(MAX_SUMMARY_LINES).collect();
    format!("{}\n...", kept.join("\n"))
}
