//! @ai:module:intent Compare ground truth with scanner findings for one module
//! @ai:module:layer application
//! @ai:module:public_api Matcher, MatcherTrait
//! @ai:module:stateless true

use crate::corpus::{Category, Granularity, LocationDecoder, ModuleAnnotation, ModuleResult};
use crate::error::{EvalError, Result};
use crate::matcher::types::{
    CategoryOutcome, Classification, Diagnostic, DiagnosticKind, ModuleOutcome, UnitRef,
};
use std::collections::BTreeMap;

/// @ai:intent Trait for per-unit classification
pub trait MatcherTrait: Send + Sync {
    /// @ai:intent Classify one category of one module
    /// @ai:post function granularity: TP + FN == sum of expected counts
    fn classify(
        &self,
        unit: &UnitRef,
        annotation: &ModuleAnnotation,
        result: &ModuleResult,
        category: Category,
    ) -> Result<CategoryOutcome>;

    /// @ai:intent Classify every category of one module, failing as a whole
    fn classify_module(
        &self,
        unit: &UnitRef,
        annotation: &ModuleAnnotation,
        result: &ModuleResult,
        categories: &[Category],
    ) -> Result<ModuleOutcome> {
        let categories = categories
            .iter()
            .map(|&category| self.classify(unit, annotation, result, category))
            .collect::<Result<Vec<_>>>()?;

        Ok(ModuleOutcome {
            unit: unit.clone(),
            categories,
        })
    }
}

/// @ai:intent Pure classifier of benchmark annotations against findings
pub struct Matcher {
    decoder: LocationDecoder,
}

impl Matcher {
    /// @ai:intent Create a new matcher
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            decoder: LocationDecoder::new(),
        }
    }

    /// @ai:intent Count findings per function name
    /// @ai:effects pure
    fn tally(&self, result: &ModuleResult, category: Category) -> BTreeMap<String, u64> {
        let form = category.location_form();
        let mut tally = BTreeMap::new();

        for finding in result.findings_for(category) {
            let location = self.decoder.decode(finding, form);
            *tally.entry(location.function).or_insert(0) += 1;
        }

        tally
    }

    /// @ai:intent Module-granularity comparison for unused constants
    /// @ai:pre detected <= annotated <= declared constants
    /// @ai:effects pure
    fn classify_constants(
        &self,
        unit: &UnitRef,
        annotation: &ModuleAnnotation,
        result: &ModuleResult,
        category: Category,
    ) -> Result<CategoryOutcome> {
        let benchmark = u64::from(annotation.constant_defect_count);
        let detected = result.findings_for(category).len() as u64;
        let total = result.constant_total_count;

        let inconsistent = |message: &str| EvalError::InconsistentCount {
            package: unit.package.clone(),
            module: unit.module.clone(),
            benchmark,
            detected,
            total,
            message: message.to_string(),
        };

        if detected > benchmark {
            return Err(inconsistent(
                "scanner reported more unused constants than the benchmark annotates",
            ));
        }

        let true_negatives = total.checked_sub(benchmark).ok_or_else(|| {
            inconsistent("benchmark annotates more unused constants than the module declares")
        })?;

        let missed = benchmark - detected;
        let mut diagnostics = Vec::new();

        if missed > 0 {
            diagnostics.push(Diagnostic::new(
                unit,
                None,
                category,
                DiagnosticKind::Missed,
                missed,
            ));
        }

        Ok(CategoryOutcome {
            category,
            classification: Classification {
                defects: detected,
                benchmark,
                true_positives: detected,
                true_negatives,
                false_positives: 0,
                false_negatives: missed,
            },
            diagnostics,
        })
    }

    /// @ai:intent Function-granularity comparison, TP capped at min(found, expected)
    /// @ai:effects pure
    fn classify_functions(
        &self,
        unit: &UnitRef,
        annotation: &ModuleAnnotation,
        result: &ModuleResult,
        category: Category,
    ) -> CategoryOutcome {
        let tally = self.tally(result, category);
        let mut c = Classification {
            defects: result.findings_for(category).len() as u64,
            ..Default::default()
        };
        let mut diagnostics = Vec::new();

        for (function, function_annotation) in &annotation.functions {
            let expected = u64::from(function_annotation.expected(category));
            let found = tally.get(function).copied().unwrap_or(0);

            if expected == 0 {
                if found > 0 {
                    c.false_positives += found;
                    diagnostics.push(Diagnostic::new(
                        unit,
                        Some(function.as_str()),
                        category,
                        DiagnosticKind::Unexpected,
                        found,
                    ));
                } else {
                    c.true_negatives += 1;
                }
                continue;
            }

            c.benchmark += expected;
            c.true_positives += found.min(expected);

            if found < expected {
                c.false_negatives += expected - found;
                diagnostics.push(Diagnostic::new(
                    unit,
                    Some(function.as_str()),
                    category,
                    DiagnosticKind::Missed,
                    expected - found,
                ));
            } else if found > expected {
                c.false_positives += found - expected;
                diagnostics.push(Diagnostic::new(
                    unit,
                    Some(function.as_str()),
                    category,
                    DiagnosticKind::OverFlagged,
                    found - expected,
                ));
            }
        }

        // implicit negatives
        for (function, &found) in &tally {
            if !annotation.functions.contains_key(function) {
                c.false_positives += found;
                diagnostics.push(Diagnostic::new(
                    unit,
                    Some(function.as_str()),
                    category,
                    DiagnosticKind::Unannotated,
                    found,
                ));
            }
        }

        CategoryOutcome {
            category,
            classification: c,
            diagnostics,
        }
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MatcherTrait for Matcher {
    /// @ai:intent Classify one category of one module
    /// @ai:effects pure
    fn classify(
        &self,
        unit: &UnitRef,
        annotation: &ModuleAnnotation,
        result: &ModuleResult,
        category: Category,
    ) -> Result<CategoryOutcome> {
        match category.granularity() {
            Granularity::Module => self.classify_constants(unit, annotation, result, category),
            Granularity::Function => {
                Ok(self.classify_functions(unit, annotation, result, category))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{ChainType, Finding, ToolReport};
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    fn unit() -> UnitRef {
        UnitRef::new(ChainType::Aptos, "pkg", "pool")
    }

    fn module_result(constant_count: u64, detectors: &[(&str, &[&str])]) -> ModuleResult {
        ModuleResult {
            constant_total_count: constant_count,
            findings: detectors
                .iter()
                .map(|(name, items)| {
                    (
                        name.to_string(),
                        items.iter().map(|s| Finding::Legacy(s.to_string())).collect(),
                    )
                })
                .collect(),
            function_count: None,
        }
    }

    #[test]
    fn test_over_flagged_function() {
        let annotation = ModuleAnnotation::new(0).with_function("f", [(Category::Overflow, 2)]);
        let result = module_result(0, &[("overflow", &["f(x)", "f(y)", "f(z)"])]);

        let outcome = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::Overflow)
            .unwrap();

        assert_eq!(
            outcome.classification,
            Classification {
                defects: 3,
                benchmark: 2,
                true_positives: 2,
                true_negatives: 0,
                false_positives: 1,
                false_negatives: 0,
            }
        );
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].message(), "over-flagged 1 instance in f");
    }

    #[test]
    fn test_annotated_negative_flagged() {
        let annotation = ModuleAnnotation::new(0).with_function("g", [(Category::Overflow, 0)]);
        let result = module_result(0, &[("overflow", &["g(x)"])]);

        let outcome = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::Overflow)
            .unwrap();

        assert_eq!(outcome.classification.true_negatives, 0);
        assert_eq!(outcome.classification.false_positives, 1);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::Unexpected);
        assert!(outcome.diagnostics[0].message().starts_with("should not have flagged"));
        assert!(outcome.diagnostics[0].message().ends_with("in g"));
    }

    #[test]
    fn test_annotated_negative_clean_is_true_negative() {
        let annotation = ModuleAnnotation::new(0)
            .with_function("a", [(Category::Overflow, 0)])
            .with_function("b", std::iter::empty());
        let result = module_result(0, &[]);

        let outcome = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::Overflow)
            .unwrap();

        assert_eq!(outcome.classification.true_negatives, 2);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_under_detection() {
        let annotation = ModuleAnnotation::new(0)
            .with_function("swap", [(Category::UncheckedReturn, 3)])
            .with_function("quote", [(Category::UncheckedReturn, 1)]);
        let result = module_result(0, &[("unchecked_return", &["swap(call)"])]);

        let outcome = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::UncheckedReturn)
            .unwrap();
        let c = outcome.classification;

        assert_eq!(c.true_positives, 1);
        assert_eq!(c.false_negatives, 3);
        assert_eq!(c.true_positives + c.false_negatives, c.benchmark);
        assert_eq!(outcome.diagnostics.len(), 2);
        assert!(outcome
            .diagnostics
            .iter()
            .all(|d| d.kind == DiagnosticKind::Missed));
    }

    #[test]
    fn test_unannotated_function_is_false_positive() {
        let annotation = ModuleAnnotation::new(0).with_function("f", [(Category::Overflow, 1)]);
        let result = module_result(0, &[("overflow", &["f(a)", "helper(b)", "helper(c)"])]);

        let outcome = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::Overflow)
            .unwrap();

        assert_eq!(outcome.classification.true_positives, 1);
        assert_eq!(outcome.classification.false_positives, 2);
        let d = &outcome.diagnostics[0];
        assert_eq!(d.kind, DiagnosticKind::Unannotated);
        assert_eq!(d.function.as_deref(), Some("helper"));
        assert_eq!(d.delta, 2);
    }

    #[test]
    fn test_unused_private_functions_use_verbatim_names() {
        let annotation = ModuleAnnotation::new(0)
            .with_function("dead", [(Category::UnusedPrivateFunctions, 1)]);
        let result = module_result(0, &[("unused_private_functions", &["dead"])]);

        let outcome = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::UnusedPrivateFunctions)
            .unwrap();

        assert_eq!(outcome.classification.true_positives, 1);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_absent_category_is_zero_findings() {
        let annotation = ModuleAnnotation::new(0).with_function("f", [(Category::InfiniteLoop, 1)]);
        let result = module_result(0, &[]);

        let outcome = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::InfiniteLoop)
            .unwrap();

        assert_eq!(outcome.classification.defects, 0);
        assert_eq!(outcome.classification.false_negatives, 1);
    }

    #[test]
    fn test_constants_exact_match() {
        let annotation = ModuleAnnotation::new(3);
        let result = module_result(10, &[("unused_constant", &["A", "B", "C"])]);

        let outcome = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::UnusedConstant)
            .unwrap();

        assert_eq!(
            outcome.classification,
            Classification {
                defects: 3,
                benchmark: 3,
                true_positives: 3,
                true_negatives: 7,
                false_positives: 0,
                false_negatives: 0,
            }
        );
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_constants_under_detection_keeps_true_negatives() {
        let annotation = ModuleAnnotation::new(3);
        let result = module_result(10, &[("unused_constant", &["A"])]);

        let outcome = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::UnusedConstant)
            .unwrap();

        assert_eq!(outcome.classification.true_positives, 1);
        assert_eq!(outcome.classification.false_negatives, 2);
        assert_eq!(outcome.classification.true_negatives, 7);
        assert_eq!(outcome.diagnostics[0].kind, DiagnosticKind::Missed);
    }

    #[test]
    fn test_constants_over_detection_is_inconsistent() {
        let annotation = ModuleAnnotation::new(3);
        let result = module_result(10, &[("unused_constant", &["A", "B", "C", "D", "E"])]);

        let err = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::UnusedConstant)
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InconsistentCount);
    }

    #[test]
    fn test_constants_annotation_above_total_is_inconsistent() {
        let annotation = ModuleAnnotation::new(4);
        let result = module_result(2, &[]);

        let err = Matcher::new()
            .classify(&unit(), &annotation, &result, Category::UnusedConstant)
            .unwrap_err();

        assert!(err.to_string().contains("more unused constants than the module declares"));
    }

    #[test]
    fn test_classify_module_fails_as_a_whole() {
        let annotation = ModuleAnnotation::new(1).with_function("f", [(Category::Overflow, 1)]);
        let result = module_result(5, &[("unused_constant", &["A", "B"]), ("overflow", &["f()"])]);

        let matcher = Matcher::new();
        assert!(matcher
            .classify_module(&unit(), &annotation, &result, &Category::ALL)
            .is_err());

        let outcome = matcher
            .classify_module(&unit(), &annotation, &result, &[Category::Overflow])
            .unwrap();
        assert_eq!(outcome.categories.len(), 1);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let report = ToolReport::from_json(
            "pkg",
            r#"{"modules": {"pool": {"constant_count": 4, "detectors": {
                "overflow": ["f(a)", "g(b)", "g(c)"],
                "precision_loss": [{"function": "f", "span": "div"}],
                "unused_constant": ["X"]
            }}}}"#,
        )
        .unwrap();
        let result = &report.modules["pool"];
        let annotation = ModuleAnnotation::new(2)
            .with_function("f", [(Category::Overflow, 1), (Category::PrecisionLoss, 1)])
            .with_function("g", [(Category::Overflow, 0)]);

        let matcher = Matcher::new();
        let first = matcher
            .classify_module(&unit(), &annotation, result, &Category::ALL)
            .unwrap();
        let second = matcher
            .classify_module(&unit(), &annotation, result, &Category::ALL)
            .unwrap();

        assert_eq!(first, second);

        for outcome in &first.categories {
            let c = outcome.classification;
            assert!(c.true_positives <= c.defects);
        }
    }
}
