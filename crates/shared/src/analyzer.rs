use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexicon::Lexicon;

/// Rhetorical classification of a sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Implementation,
    Problem,
    Result,
    Argument,
    General,
}

/// Per-sentence analysis result, consumed only by the digest assembler
/// within a single summary call.
#[derive(Debug, Clone)]
pub struct SentenceRecord {
    pub text: String,
    /// Matched category names, in first-seen order, each at most once.
    pub categories: Vec<String>,
    pub role: Role,
    pub score: u32,
    /// Every matched lexicon keyword, duplicates across categories allowed.
    pub keywords: Vec<String>,
}

/// Percentages and multipliers ("40%", "3倍", "10x") earn a score bonus.
static NUMERIC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+%|\d+倍|\d+x").expect("valid numeric pattern"));

const KEYWORD_SCORE: u32 = 2;
const NUMERIC_BONUS: u32 = 1;
const LENGTH_BONUS: u32 = 1;
const LENGTH_BONUS_MIN: usize = 30;
const LENGTH_BONUS_MAX: usize = 150;

/// Score a sentence against the lexicon and classify its role.
///
/// Keyword detection is plain substring containment over the lowercased
/// sentence: it has to catch inflections ("implemented" for "implement")
/// and CJK keywords, where regex word boundaries never match. Returns
/// `None` when the sentence scores zero, dropping it from the digest
/// entirely.
pub fn analyze(sentence: &str, lexicon: &Lexicon) -> Option<SentenceRecord> {
    let lower = sentence.to_lowercase();

    let mut categories = Vec::new();
    let mut keywords = Vec::new();
    let mut score = 0;

    for category in lexicon.categories() {
        let mut matched = false;
        for keyword in &category.keywords {
            if lower.contains(keyword.as_str()) {
                matched = true;
                keywords.push(keyword.clone());
                score += KEYWORD_SCORE;
            }
        }
        if matched {
            categories.push(category.name.clone());
        }
    }

    let mut role = Role::General;
    for rule in lexicon.role_rules() {
        if rule.keywords.iter().any(|kw| lower.contains(kw.as_str())) {
            role = rule.role;
            score += rule.bonus;
            break;
        }
    }

    if NUMERIC_PATTERN.is_match(sentence) {
        score += NUMERIC_BONUS;
    }
    let length = sentence.trim().chars().count();
    if length > LENGTH_BONUS_MIN && length < LENGTH_BONUS_MAX {
        score += LENGTH_BONUS;
    }

    if score == 0 {
        return None;
    }

    Some(SentenceRecord {
        text: sentence.to_string(),
        categories,
        role,
        score,
        keywords,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze_default(sentence: &str) -> Option<SentenceRecord> {
        analyze(sentence, &Lexicon::default())
    }

    // ==================== Scoring Tests ====================

    #[test]
    fn test_shader_optimization_sentence() {
        let record = analyze_default(
            "We implemented a new shader optimization technique that improved rendering performance by 40%",
        )
        .unwrap();

        assert_eq!(record.role, Role::Implementation);
        assert!(record.categories.contains(&"渲染技术".to_string()));
        assert!(record.categories.contains(&"性能优化".to_string()));
        // shader + render + optimization + performance (2 each), +3 role,
        // +1 numeric, +1 length
        assert!(record.score >= 8);
    }

    #[test]
    fn test_unmatched_sentence_is_dropped() {
        // No keyword, no numeric pattern, under the length-bonus window.
        assert!(analyze_default("Nice weather today, friends").is_none());
    }

    #[test]
    fn test_category_recorded_once_keywords_per_match() {
        let record =
            analyze_default("The shader pass and gpu lighting path share one graphics queue")
                .unwrap();
        let render_count = record
            .categories
            .iter()
            .filter(|c| c.as_str() == "渲染技术")
            .count();
        assert_eq!(render_count, 1);
        // shader, gpu, lighting, graphics each matched individually.
        assert!(record.keywords.len() >= 4);
    }

    #[test]
    fn test_chinese_keywords_match() {
        let record = analyze_default("这套新的渲染流程采用了独特的实现方案来降低显存占用开销").unwrap();
        assert_eq!(record.role, Role::Implementation);
    }

    // ==================== Role Priority Tests ====================

    #[test]
    fn test_implementation_wins_over_problem() {
        let record = analyze_default(
            "The technique solves the memory bottleneck problem on older hardware",
        )
        .unwrap();
        assert_eq!(record.role, Role::Implementation);
    }

    #[test]
    fn test_problem_wins_over_result() {
        let record =
            analyze_default("A serious performance issue appeared after the engine upgrade")
                .unwrap();
        assert_eq!(record.role, Role::Problem);
    }

    #[test]
    fn test_argument_role_from_novelty_markers() {
        let record =
            analyze_default("They propose an innovative gpu lighting model for open worlds")
                .unwrap();
        assert_eq!(record.role, Role::Argument);
    }

    #[test]
    fn test_general_role_gets_no_bonus() {
        // "vulkan" alone: 2 points, +1 length bonus, no role bonus.
        let record = analyze_default("Everyone at the studio keeps talking about vulkan").unwrap();
        assert_eq!(record.role, Role::General);
        assert_eq!(record.score, 3);
    }

    // ==================== Bonus Tests ====================

    #[test]
    fn test_numeric_bonus_variants() {
        // Each sentence is under 30 chars: score is keyword +2, numeric +1.
        for text in [
            "shader speedup hits 40% now",
            "shader speedup hits 3倍 now",
            "shader speedup hits 10x now",
        ] {
            assert_eq!(analyze_default(text).unwrap().score, 3, "for {text}");
        }
        assert_eq!(analyze_default("shader speedup hits top now").unwrap().score, 2);
    }

    #[test]
    fn test_length_bonus_boundaries() {
        // "vulkan" is the only keyword (+2); 30 chars exactly: no bonus.
        let at_min = "vulkan padding padding paddin+";
        assert_eq!(at_min.chars().count(), 30);
        assert_eq!(analyze_default(at_min).unwrap().score, 2);

        // 31 chars: strictly inside the window, +1.
        let above_min = "vulkan padding padding padding+";
        assert_eq!(above_min.chars().count(), 31);
        assert_eq!(analyze_default(above_min).unwrap().score, 3);
    }
}
