use crate::analyzer::Role;

/// A technical subject area and the lowercase keywords that signal it.
#[derive(Debug, Clone)]
pub struct Category {
    pub name: String,
    pub keywords: Vec<String>,
}

/// One rhetorical-role rule: if any keyword matches, the sentence gets this
/// role and score bonus. Rules are evaluated in declaration order and the
/// first hit wins.
#[derive(Debug, Clone)]
pub struct RoleRule {
    pub role: Role,
    pub keywords: Vec<String>,
    pub bonus: u32,
}

/// Static keyword tables driving sentence analysis. Built once at startup
/// and shared read-only across every analyzer call.
#[derive(Debug, Clone)]
pub struct Lexicon {
    categories: Vec<Category>,
    role_rules: Vec<RoleRule>,
}

const TECH_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "游戏引擎",
        &["unreal", "unity", "godot", "engine", "framework", "runtime"],
    ),
    (
        "渲染技术",
        &[
            "render", "shader", "graphics", "gpu", "vulkan", "directx", "opengl", "lighting",
            "shadow", "material",
        ],
    ),
    (
        "物理仿真",
        &[
            "physics",
            "collision",
            "rigidbody",
            "simulation",
            "dynamics",
            "constraint",
        ],
    ),
    (
        "动画系统",
        &[
            "animation", "skeletal", "blend", "timeline", "motion", "ik", "bone",
        ],
    ),
    (
        "人工智能",
        &[
            "ai",
            "ml",
            "neural",
            "behavior",
            "pathfinding",
            "decision",
            "learning",
        ],
    ),
    (
        "性能优化",
        &[
            "optimization",
            "performance",
            "profiling",
            "memory",
            "cpu",
            "fps",
            "bottleneck",
        ],
    ),
    (
        "架构设计",
        &[
            "architecture",
            "pattern",
            "design",
            "component",
            "system",
            "modular",
            "ecs",
        ],
    ),
    (
        "网络编程",
        &[
            "network",
            "multiplayer",
            "server",
            "client",
            "synchronization",
            "latency",
        ],
    ),
    (
        "虚拟现实",
        &[
            "vr", "ar", "xr", "virtual", "augmented", "headset", "tracking",
        ],
    ),
    (
        "工具开发",
        &[
            "tool", "editor", "pipeline", "automation", "workflow", "asset",
        ],
    ),
];

const IMPLEMENTATION_KEYWORDS: &[&str] = &[
    "implement",
    "algorithm",
    "approach",
    "method",
    "technique",
    "solution",
    "实现",
    "算法",
    "方法",
    "技术",
    "解决方案",
    "策略",
];

const PROBLEM_KEYWORDS: &[&str] = &[
    "problem",
    "issue",
    "challenge",
    "limitation",
    "bottleneck",
    "bug",
    "问题",
    "挑战",
    "限制",
    "瓶颈",
    "困难",
    "缺陷",
];

const RESULT_KEYWORDS: &[&str] = &[
    "result",
    "performance",
    "improvement",
    "benefit",
    "advantage",
    "effect",
    "结果",
    "性能",
    "改进",
    "优势",
    "效果",
    "提升",
];

const ARGUMENT_KEYWORDS: &[&str] = &["新", "new", "创新", "innovative", "提出", "propose"];

impl Lexicon {
    /// Build a lexicon from caller-supplied tables. Role rules keep their
    /// given order, so the caller controls role priority.
    pub fn new(categories: Vec<Category>, role_rules: Vec<RoleRule>) -> Self {
        Self {
            categories,
            role_rules,
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn role_rules(&self) -> &[RoleRule] {
        &self.role_rules
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        let categories = TECH_CATEGORIES
            .iter()
            .map(|(name, keywords)| Category {
                name: (*name).to_string(),
                keywords: keywords.iter().map(|kw| (*kw).to_string()).collect(),
            })
            .collect();

        // Priority order: implementation > problem > result > argument.
        let role_rules = vec![
            RoleRule {
                role: Role::Implementation,
                keywords: owned(IMPLEMENTATION_KEYWORDS),
                bonus: 3,
            },
            RoleRule {
                role: Role::Problem,
                keywords: owned(PROBLEM_KEYWORDS),
                bonus: 2,
            },
            RoleRule {
                role: Role::Result,
                keywords: owned(RESULT_KEYWORDS),
                bonus: 2,
            },
            RoleRule {
                role: Role::Argument,
                keywords: owned(ARGUMENT_KEYWORDS),
                bonus: 2,
            },
        ];

        Self::new(categories, role_rules)
    }
}

fn owned(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|kw| (*kw).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_ten_categories() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.categories().len(), 10);
        assert_eq!(lexicon.categories()[0].name, "游戏引擎");
    }

    #[test]
    fn test_role_rule_priority_order() {
        let lexicon = Lexicon::default();
        let roles: Vec<Role> = lexicon.role_rules().iter().map(|r| r.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Implementation,
                Role::Problem,
                Role::Result,
                Role::Argument
            ]
        );
    }

    #[test]
    fn test_implementation_rule_has_highest_bonus() {
        let lexicon = Lexicon::default();
        assert_eq!(lexicon.role_rules()[0].bonus, 3);
        assert!(lexicon.role_rules()[1..].iter().all(|r| r.bonus == 2));
    }

    #[test]
    fn test_custom_tables() {
        let lexicon = Lexicon::new(
            vec![Category {
                name: "音频".to_string(),
                keywords: vec!["audio".to_string(), "sound".to_string()],
            }],
            vec![RoleRule {
                role: Role::Result,
                keywords: vec!["faster".to_string()],
                bonus: 2,
            }],
        );
        assert_eq!(lexicon.categories().len(), 1);
        assert_eq!(lexicon.role_rules().len(), 1);
    }
}
