use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::{read_file, Result, TallyError};

/// Seeded into `rules.json` by `tally init`.
pub const DEFAULT_RULES: &str = r#"{
  "contains_rules": [
    {"target": "whole foods", "category": "groceries"},
    {"target": "trader joe", "category": "groceries"},
    {"target": "starbucks", "category": "dining"},
    {"target": "uber", "category": "transport"},
    {"target": "spotify", "category": "subscriptions"}
  ],
  "equals_rules": [],
  "regex_rules": []
}
"#;

/// How a rule tests the lower-cased transaction name.
#[derive(Debug, Clone)]
pub enum Predicate {
    Contains(String),
    Equals(String),
    /// Case-insensitive search anywhere in the name.
    Regex(Regex),
}

impl Predicate {
    fn matches(&self, name: &str) -> bool {
        match self {
            Predicate::Contains(target) => name.contains(target.as_str()),
            Predicate::Equals(target) => name == target,
            Predicate::Regex(re) => re.is_match(name),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    predicate: Predicate,
    category: String,
}

impl Rule {
    pub fn contains(target: &str, category: &str) -> Self {
        Self {
            predicate: Predicate::Contains(target.to_lowercase()),
            category: category.to_lowercase(),
        }
    }

    pub fn equals(target: &str, category: &str) -> Self {
        Self {
            predicate: Predicate::Equals(target.to_lowercase()),
            category: category.to_lowercase(),
        }
    }

    pub fn regex(pattern: &str, category: &str) -> std::result::Result<Self, regex::Error> {
        let re = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            predicate: Predicate::Regex(re),
            category: category.to_lowercase(),
        })
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RulesFile {
    contains_rules: Vec<TargetRule>,
    #[serde(default)]
    equals_rules: Vec<TargetRule>,
    #[serde(default)]
    regex_rules: Vec<PatternRule>,
}

#[derive(Deserialize)]
struct TargetRule {
    target: String,
    category: String,
}

#[derive(Deserialize)]
struct PatternRule {
    pattern: String,
    category: String,
}

/// Ordered categorization rules. The first rule that matches decides.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    #[cfg(test)]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Load `rules.json`. Any problem with the file is fatal: a partial rule set
    /// is never returned.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_file(path)?;
        Self::from_json(&content).map_err(|reason| TallyError::Malformed {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Contains rules first, then equality rules, then regex rules, each in file order.
    pub fn from_json(content: &str) -> std::result::Result<Self, String> {
        let file: RulesFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
        let mut rules: Vec<Rule> = file
            .contains_rules
            .iter()
            .map(|r| Rule::contains(&r.target, &r.category))
            .collect();
        rules.extend(
            file.equals_rules
                .iter()
                .map(|r| Rule::equals(&r.target, &r.category)),
        );
        for r in &file.regex_rules {
            let rule = Rule::regex(&r.pattern, &r.category)
                .map_err(|e| format!("regex rule '{}': {e}", r.pattern))?;
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Best-guess category for a transaction. `merchant_name` is accepted for
    /// future rules and not consulted yet.
    pub fn guess_category(&self, name: &str, _merchant_name: Option<&str>) -> Option<&str> {
        let name = name.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.predicate.matches(&name))
            .map(|rule| rule.category.as_str())
    }
}
