use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};

/// Ordered replacement table, English technical term to Chinese. Multi-word
/// terms come before their prefixes so the alternation prefers them.
const TERM_RULES: &[(&str, &str)] = &[
    ("Unreal Engine", "Unreal引擎"),
    ("Unity", "Unity引擎"),
    ("rendering", "渲染"),
    ("performance", "性能"),
    ("optimization", "优化"),
    ("shader", "着色器"),
    ("physics", "物理"),
    ("animation", "动画"),
    ("AI", "人工智能"),
    ("VR", "虚拟现实"),
    ("AR", "增强现实"),
    ("GPU", "图形处理器"),
    ("CPU", "处理器"),
    ("framework", "框架"),
    ("algorithm", "算法"),
    ("gameplay", "游戏玩法"),
];

/// Simplified sentences longer than this are cut back to one clause.
const MAX_SIMPLIFIED_CHARS: usize = 100;

/// One combined whole-word alternation: the whole sentence is rewritten in
/// a single left-to-right pass, so a replacement is never re-matched by a
/// later rule.
static TERM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternation = TERM_RULES
        .iter()
        .map(|(term, _)| regex::escape(term))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
        .case_insensitive(true)
        .build()
        .expect("valid term pattern")
});

static TERM_TARGETS: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    TERM_RULES
        .iter()
        .map(|(term, target)| (term.to_lowercase(), *target))
        .collect()
});

/// Rewrite recognized technical terms into Chinese and truncate overlong
/// sentences to their first clause. Never fails; empty input yields empty
/// output.
pub fn simplify(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let replaced = TERM_PATTERN.replace_all(text, |caps: &Captures| {
        let matched = &caps[0];
        match TERM_TARGETS.get(&matched.to_lowercase()) {
            Some(target) => (*target).to_string(),
            None => matched.to_string(),
        }
    });

    let mut result = replaced.into_owned();
    if result.chars().count() > MAX_SIMPLIFIED_CHARS {
        if let Some(first_clause) = result.split(['.', '。']).next() {
            result = format!("{}。", first_clause);
        }
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Replacement Tests ====================

    #[test]
    fn test_replaces_known_terms() {
        let result = simplify("This uses Unreal Engine and GPU acceleration for rendering.");
        assert_eq!(result, "This uses Unreal引擎 and 图形处理器 acceleration for 渲染.");
    }

    #[test]
    fn test_case_insensitive_whole_word() {
        assert_eq!(simplify("unity shipped a new gpu profiler"), "Unity引擎 shipped a new 图形处理器 profiler");
    }

    #[test]
    fn test_word_boundary_does_not_corrupt_adjacent_letters() {
        // "GPUs" must not be rewritten as "图形处理器s".
        assert_eq!(simplify("Modern GPUs are fast"), "Modern GPUs are fast");
        assert_eq!(simplify("The AIs debated"), "The AIs debated");
    }

    #[test]
    fn test_replacement_not_rematched() {
        // "Unreal引擎" contains no further source term once rewritten.
        let result = simplify("Unreal Engine beats Unreal Engine");
        assert_eq!(result, "Unreal引擎 beats Unreal引擎");
    }

    #[test]
    fn test_multi_word_term_preferred() {
        // "Unreal Engine" is rewritten as a unit, not stopping at "Unreal".
        assert!(simplify("Built on Unreal Engine today").contains("Unreal引擎"));
    }

    // ==================== Truncation Tests ====================

    #[test]
    fn test_long_sentence_cut_to_first_clause() {
        let long = format!("{}. {}", "a".repeat(80), "b".repeat(80));
        let result = simplify(&long);
        assert_eq!(result, format!("{}。", "a".repeat(80)));
    }

    #[test]
    fn test_short_sentence_untouched_by_truncation() {
        let text = "a short sentence stays whole";
        assert_eq!(simplify(text), text);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(simplify(""), "");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(simplify("  padded out  "), "padded out");
    }
}
