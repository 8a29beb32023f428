//! Server-side flag data and evaluation
//!
//! Supports the subset of the flag model an AI config needs: on/off,
//! individual targets, clause rules and percentage rollouts. Segment
//! clauses and prerequisites are not evaluated.

use crate::aiconfig::EvaluationContext;
use serde::Deserialize;
use serde_json::Value;
use sha1::{Digest, Sha1};
use std::collections::HashMap;

const BUCKET_SCALE: f64 = 0xFFF_FFFF_FFFF_FFFFu64 as f64;
const TOTAL_WEIGHT: f64 = 100_000.0;

/// Payload of the flag delivery endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlagData {
    #[serde(default)]
    pub flags: HashMap<String, Flag>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub key: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub on: bool,
    #[serde(default)]
    pub salt: String,
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub context_targets: Vec<ContextTarget>,
    #[serde(default)]
    pub rules: Vec<Rule>,
    #[serde(default)]
    pub fallthrough: VariationOrRollout,
    pub off_variation: Option<usize>,
    #[serde(default)]
    pub variations: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Target {
    #[serde(default)]
    pub values: Vec<String>,
    pub variation: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextTarget {
    #[serde(default = "default_kind")]
    pub context_kind: String,
    #[serde(default)]
    pub values: Vec<String>,
    pub variation: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub clauses: Vec<Clause>,
    #[serde(flatten)]
    pub outcome: VariationOrRollout,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    pub context_kind: Option<String>,
    pub attribute: String,
    pub op: String,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub negate: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariationOrRollout {
    pub variation: Option<usize>,
    pub rollout: Option<Rollout>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rollout {
    #[serde(default)]
    pub variations: Vec<WeightedVariation>,
    pub bucket_by: Option<String>,
    pub seed: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeightedVariation {
    pub variation: usize,
    #[serde(default)]
    pub weight: u32,
}

fn default_kind() -> String {
    "user".to_string()
}

/// Outcome of evaluating a flag for a context
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation<'a> {
    pub variation_index: usize,
    pub value: &'a Value,
}

impl Flag {
    /// Evaluate the flag; `None` means no variation applies
    pub fn evaluate(&self, context: &EvaluationContext) -> Option<Evaluation<'_>> {
        let index = if !self.on {
            self.off_variation?
        } else if let Some(index) = self.target_match(context) {
            index
        } else if let Some(rule) = self
            .rules
            .iter()
            .find(|rule| rule.clauses.iter().all(|clause| clause.matches(context)))
        {
            tracing::debug!("Flag {} matched rule '{}'", self.key, rule.id);
            self.resolve(&rule.outcome, context)?
        } else {
            self.resolve(&self.fallthrough, context)?
        };

        self.variations.get(index).map(|value| Evaluation {
            variation_index: index,
            value,
        })
    }

    fn target_match(&self, context: &EvaluationContext) -> Option<usize> {
        let context_target = self
            .context_targets
            .iter()
            .filter(|target| target.context_kind == context.kind)
            .find(|target| target.values.iter().any(|value| *value == context.key))
            .map(|target| target.variation);

        context_target.or_else(|| {
            if context.kind != "user" {
                return None;
            }
            self.targets
                .iter()
                .find(|target| target.values.iter().any(|value| *value == context.key))
                .map(|target| target.variation)
        })
    }

    fn resolve(&self, outcome: &VariationOrRollout, context: &EvaluationContext) -> Option<usize> {
        if let Some(index) = outcome.variation {
            return Some(index);
        }

        let rollout = outcome.rollout.as_ref()?;
        let last = rollout.variations.last()?;

        let bucket_by = rollout.bucket_by.as_deref().unwrap_or("key");
        let bucket_value = match context.attribute(bucket_by) {
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            _ => None,
        };

        // Contexts without a usable bucketing attribute land in bucket zero
        let bucket = bucket_value
            .map(|value| bucket_value_for(&self.key, &self.salt, rollout.seed, &value))
            .unwrap_or(0.0);
        let mut cumulative = 0.0;
        for weighted in &rollout.variations {
            cumulative += weighted.weight as f64 / TOTAL_WEIGHT;
            if bucket < cumulative {
                return Some(weighted.variation);
            }
        }

        // Weights summing below 100% put the remainder in the last bucket
        Some(last.variation)
    }
}

impl Clause {
    fn matches(&self, context: &EvaluationContext) -> bool {
        if self.attribute != "kind" {
            let kind = self.context_kind.as_deref().unwrap_or("user");
            if kind != context.kind {
                return false;
            }
        }

        // A missing attribute never matches, negated or not
        let Some(actual) = context.attribute(&self.attribute) else {
            return false;
        };

        let matched = self.values.iter().any(|expected| apply_op(&self.op, &actual, expected));
        matched != self.negate
    }
}

fn apply_op(op: &str, actual: &Value, expected: &Value) -> bool {
    match op {
        "in" => actual == expected,
        "startsWith" | "endsWith" | "contains" | "matches" => {
            let (Some(actual), Some(expected)) = (actual.as_str(), expected.as_str()) else {
                return false;
            };
            match op {
                "startsWith" => actual.starts_with(expected),
                "endsWith" => actual.ends_with(expected),
                "contains" => actual.contains(expected),
                _ => regex::Regex::new(expected)
                    .map(|re| re.is_match(actual))
                    .unwrap_or(false),
            }
        }
        _ => false,
    }
}

/// Position of a context in the `[0, 1)` rollout range
pub fn bucket_value_for(flag_key: &str, salt: &str, seed: Option<i64>, value: &str) -> f64 {
    let input = match seed {
        Some(seed) => format!("{}.{}", seed, value),
        None => format!("{}.{}.{}", flag_key, salt, value),
    };

    let digest = Sha1::digest(input.as_bytes());
    let hex: String = digest.iter().map(|byte| format!("{:02x}", byte)).collect();
    let prefix = u64::from_str_radix(&hex[..15], 16).unwrap_or(0);
    prefix as f64 / BUCKET_SCALE
}
