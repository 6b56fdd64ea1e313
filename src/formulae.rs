use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Formula {
    pub name: &'static str,
    pub formula: &'static str,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FormulaCategory {
    pub category: &'static str,
    pub formulas: Vec<Formula>,
}

/// Search outcome. `similar` is only filled when nothing matched.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FormulaSearch {
    pub results: Vec<FormulaCategory>,
    pub similar: Vec<Formula>,
}

const MAX_SIMILAR: usize = 3;

const CATALOG: &[(&str, &[Formula])] = &[
    (
        "Algebra",
        &[
            Formula { name: "Quadratic Formula", formula: "x = (-b ± √(b² - 4ac)) / 2a" },
            Formula { name: "Binomial Expansion", formula: "(a + b)² = a² + 2ab + b²" },
            Formula { name: "Linear Equation", formula: "y = mx + c" },
        ],
    ),
    (
        "Geometry",
        &[
            Formula { name: "Circle Area", formula: "A = πr²" },
            Formula { name: "Triangle Area", formula: "A = ½bh" },
            Formula { name: "Pythagorean Theorem", formula: "a² + b² = c²" },
        ],
    ),
    (
        "Calculus",
        &[
            Formula { name: "Power Rule", formula: "d/dx(xⁿ) = nx(n-1)" },
            Formula { name: "Chain Rule", formula: "dy/dx = dy/du × du/dx" },
            Formula { name: "Product Rule", formula: "d/dx(uv) = u(dv/dx) + v(du/dx)" },
        ],
    ),
    (
        "Trigonometry",
        &[
            Formula { name: "Sine Law", formula: "a/sin(A) = b/sin(B) = c/sin(C)" },
            Formula { name: "Cosine Law", formula: "c² = a² + b² - 2ab×cos(C)" },
            Formula { name: "Basic Identities", formula: "sin²θ + cos²θ = 1" },
        ],
    ),
];

pub fn catalog() -> Vec<FormulaCategory> {
    CATALOG
        .iter()
        .map(|&(category, formulas)| FormulaCategory {
            category,
            formulas: formulas.to_vec(),
        })
        .collect()
}

/// Case-insensitive substring search over names and formulas.
pub fn search(query: &str) -> FormulaSearch {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return FormulaSearch {
            results: catalog(),
            similar: Vec::new(),
        };
    }

    let results: Vec<FormulaCategory> = catalog()
        .into_iter()
        .filter_map(|mut cat| {
            cat.formulas.retain(|f| {
                f.name.to_lowercase().contains(&query) || f.formula.to_lowercase().contains(&query)
            });
            (!cat.formulas.is_empty()).then_some(cat)
        })
        .collect();

    let similar = if results.is_empty() {
        similar_formulas(&query)
    } else {
        Vec::new()
    };

    FormulaSearch { results, similar }
}

/// Formulas sharing a word fragment with the query, ranked by summed
/// per-word fuzzy score.
fn similar_formulas(query: &str) -> Vec<Formula> {
    let matcher = SkimMatcherV2::default();
    let search_words: Vec<&str> = query.split_whitespace().collect();

    let mut scored: Vec<(i64, Formula)> = CATALOG
        .iter()
        .flat_map(|(_, formulas)| formulas.iter().copied())
        .filter(|f| {
            let name = f.name.to_lowercase();
            name.split(' ').any(|word| {
                search_words
                    .iter()
                    .any(|sw| word.contains(sw) || sw.contains(word))
            })
        })
        .map(|f| {
            let score = search_words
                .iter()
                .filter_map(|sw| matcher.fuzzy_match(f.name, sw))
                .sum();
            (score, f)
        })
        .collect();

    // stable sort keeps catalog order among equal scores
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(MAX_SIMILAR).map(|(_, f)| f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_returns_catalog() {
        let all = search("  ");
        assert_eq!(all.results.len(), 4);
        assert!(all.results.iter().all(|c| c.formulas.len() == 3));
        assert!(all.similar.is_empty());
    }

    #[test]
    fn test_search_matches_name_and_formula() {
        let by_name = search("RULE");
        assert_eq!(by_name.results.len(), 1);
        assert_eq!(by_name.results[0].category, "Calculus");
        assert_eq!(by_name.results[0].formulas.len(), 3);

        let by_formula = search("πr²");
        assert_eq!(by_formula.results[0].formulas[0].name, "Circle Area");

        let across = search("area");
        assert_eq!(across.results.len(), 1);
        assert_eq!(across.results[0].formulas.len(), 2);
    }

    #[test]
    fn test_no_match_suggests_similar() {
        let found = search("rules of law");
        assert!(found.results.is_empty());
        assert!(!found.similar.is_empty());
        assert!(found.similar.len() <= MAX_SIMILAR);
        assert!(found.similar.iter().any(|f| f.name.ends_with("Law")));
    }

    #[test]
    fn test_nonsense_has_no_suggestions() {
        let found = search("zzzz");
        assert!(found.results.is_empty());
        assert!(found.similar.is_empty());
    }
}
