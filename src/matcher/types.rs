//! @ai:module:intent Classification results and disagreement records
//! @ai:module:layer domain
//! @ai:module:public_api UnitRef, Classification, Diagnostic, DiagnosticKind, CategoryOutcome, ModuleOutcome
//! @ai:module:stateless true

use crate::corpus::{Category, ChainType};
use serde::{Deserialize, Serialize};

/// @ai:intent Identity of one evaluated module
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitRef {
    pub chain: ChainType,
    pub package: String,
    pub module: String,
}

impl UnitRef {
    pub fn new(chain: ChainType, package: &str, module: &str) -> Self {
        Self {
            chain,
            package: package.to_string(),
            module: module.to_string(),
        }
    }
}

impl std::fmt::Display for UnitRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.package, self.module)
    }
}

/// @ai:intent Classified counts for one (module, category) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// Raw number of findings reported by the scanner
    pub defects: u64,
    /// Ground-truth positive instances
    pub benchmark: u64,
    pub true_positives: u64,
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

/// @ai:intent Kind of disagreement between benchmark and scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Annotated instances the scanner did not report (FN)
    Missed,
    /// More findings than annotated instances (FP)
    OverFlagged,
    /// Findings in a function annotated negative (FP)
    Unexpected,
    /// Findings in a function the benchmark does not list (FP)
    Unannotated,
    /// Module-level counts that cannot both be right; unit excluded
    InconsistentCount,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Missed => "missed",
            DiagnosticKind::OverFlagged => "over_flagged",
            DiagnosticKind::Unexpected => "unexpected",
            DiagnosticKind::Unannotated => "unannotated",
            DiagnosticKind::InconsistentCount => "inconsistent_count",
        }
    }
}

/// @ai:intent One benchmark/scanner disagreement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub package: String,
    pub module: String,
    pub function: Option<String>,
    pub category: Category,
    pub kind: DiagnosticKind,
    pub delta: u64,
}

impl Diagnostic {
    /// @ai:intent Build a diagnostic for a unit
    /// @ai:effects pure
    pub fn new(
        unit: &UnitRef,
        function: Option<&str>,
        category: Category,
        kind: DiagnosticKind,
        delta: u64,
    ) -> Self {
        Self {
            package: unit.package.clone(),
            module: unit.module.clone(),
            function: function.map(str::to_string),
            category,
            kind,
            delta,
        }
    }

    /// @ai:intent Human-readable description of the disagreement
    /// @ai:effects pure
    /// @ai:example (OverFlagged, delta=1, function=f) -> "over-flagged 1 instance in f"
    pub fn message(&self) -> String {
        let amount = plural(self.delta, "instance", "instances");
        let place = self.function.as_deref().unwrap_or("module scope");

        match self.kind {
            DiagnosticKind::Missed => format!("missed {} in {}", amount, place),
            DiagnosticKind::OverFlagged => format!("over-flagged {} in {}", amount, place),
            DiagnosticKind::Unexpected => {
                format!("should not have flagged {} in {}", amount, place)
            }
            DiagnosticKind::Unannotated => {
                format!("flagged {} in unannotated function {}", amount, place)
            }
            DiagnosticKind::InconsistentCount => {
                format!("inconsistent {} count, off by {}; unit excluded", self.category, self.delta)
            }
        }
    }

    /// @ai:intent Sort key giving a stable report order
    /// @ai:effects pure
    pub fn sort_key(&self) -> (Category, &str, &str, &str, DiagnosticKind) {
        (
            self.category,
            self.package.as_str(),
            self.module.as_str(),
            self.function.as_deref().unwrap_or(""),
            self.kind,
        )
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}: {}", self.package, self.module, self.message())
    }
}

fn plural(n: u64, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

/// @ai:intent Classification of one category in one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOutcome {
    pub category: Category,
    pub classification: Classification,
    pub diagnostics: Vec<Diagnostic>,
}

/// @ai:intent Classification of every selected category in one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOutcome {
    pub unit: UnitRef,
    pub categories: Vec<CategoryOutcome>,
}
