//! @ai:module:intent Ground-truth benchmark entries and their validation
//! @ai:module:layer domain
//! @ai:module:public_api BenchmarkSet, BenchmarkEntry, RejectedEntry, ChainType, ModuleAnnotation, FunctionAnnotation
//! @ai:module:stateless true

use crate::config::FilterConfig;
use crate::corpus::category::Category;
use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// @ai:intent Blockchain a package was collected from
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ChainType {
    Aptos,
    Sui,
}

impl ChainType {
    /// @ai:intent Name used for report directories and partition labels
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Aptos => "Aptos",
            ChainType::Sui => "Sui",
        }
    }
}

impl TryFrom<u8> for ChainType {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ChainType::Aptos),
            1 => Ok(ChainType::Sui),
            other => Err(format!("unknown chain_type {}", other)),
        }
    }
}

impl From<ChainType> for u8 {
    fn from(chain: ChainType) -> Self {
        match chain {
            ChainType::Aptos => 0,
            ChainType::Sui => 1,
        }
    }
}

impl std::fmt::Display for ChainType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChainType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "aptos" | "0" => Ok(ChainType::Aptos),
            "sui" | "1" => Ok(ChainType::Sui),
            other => Err(format!("unknown chain: {}", other)),
        }
    }
}

/// @ai:intent Expected defect counts of one function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionAnnotation {
    expected: BTreeMap<Category, u32>,
}

impl FunctionAnnotation {
    /// @ai:intent Build an annotation from (category, count) pairs
    /// @ai:effects pure
    pub fn from_counts<I: IntoIterator<Item = (Category, u32)>>(counts: I) -> Self {
        Self {
            expected: counts.into_iter().collect(),
        }
    }

    /// @ai:intent Expected count for a category, absent means annotated negative
    /// @ai:effects pure
    pub fn expected(&self, category: Category) -> u32 {
        self.expected.get(&category).copied().unwrap_or(0)
    }

    /// @ai:intent Whether any category is annotated positive
    /// @ai:effects pure
    pub fn is_defective(&self) -> bool {
        self.expected.values().any(|&n| n > 0)
    }

    pub fn counts(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        self.expected.iter().map(|(c, n)| (*c, *n))
    }
}

/// @ai:intent Ground truth for one module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleAnnotation {
    pub constant_defect_count: u32,
    pub functions: BTreeMap<String, FunctionAnnotation>,
}

impl ModuleAnnotation {
    /// @ai:intent Create an annotation with no functions
    /// @ai:effects pure
    pub fn new(constant_defect_count: u32) -> Self {
        Self {
            constant_defect_count,
            functions: BTreeMap::new(),
        }
    }

    /// @ai:intent Add a function annotation (builder style)
    /// @ai:effects pure
    pub fn with_function<I>(mut self, name: &str, counts: I) -> Self
    where
        I: IntoIterator<Item = (Category, u32)>,
    {
        self.functions
            .insert(name.to_string(), FunctionAnnotation::from_counts(counts));
        self
    }

    /// @ai:intent Whether the module carries at least one annotated defect
    /// @ai:effects pure
    pub fn is_defective(&self) -> bool {
        self.constant_defect_count > 0 || self.functions.values().any(|f| f.is_defective())
    }
}

/// @ai:intent One annotated package of the benchmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkEntry {
    pub package_id: String,
    pub chain_type: ChainType,
    pub modules: BTreeMap<String, ModuleAnnotation>,
}

/// @ai:intent A package record that could not be read; its modules are never evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub package_id: String,
    /// Present when the record's `chain_type` itself was readable
    pub chain_type: Option<ChainType>,
    pub message: String,
}

impl RejectedEntry {
    /// @ai:intent The per-package error this record is reported as
    /// @ai:effects pure
    pub fn to_error(&self) -> EvalError {
        EvalError::malformed(&self.package_id, self.message.clone())
    }
}

/// @ai:intent The complete ground truth, keyed by package id
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchmarkSet {
    entries: BTreeMap<String, BenchmarkEntry>,
    rejected: BTreeMap<String, RejectedEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    chain_type: ChainType,
    #[serde(default)]
    modules: BTreeMap<String, RawModule>,
}

#[derive(Debug, Deserialize)]
struct RawModule {
    constant: i64,
    #[serde(default)]
    function: BTreeMap<String, BTreeMap<String, i64>>,
}

impl BenchmarkSet {
    /// @ai:intent Build a set from already validated entries
    /// @ai:effects pure
    pub fn from_entries<I: IntoIterator<Item = BenchmarkEntry>>(entries: I) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|e| (e.package_id.clone(), e))
                .collect(),
            rejected: BTreeMap::new(),
        }
    }

    /// @ai:intent Parse and validate the benchmark JSON document
    /// @ai:pre json is an object keyed by package id
    /// @ai:post Err(InvalidAnnotation) if any record holds a negative count
    /// @ai:post every other unreadable record is kept as a RejectedEntry
    /// @ai:effects pure
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Value> = serde_json::from_str(json)
            .map_err(|e| EvalError::malformed("<benchmark>", e.to_string()))?;

        // Negative counts abort the load whatever else is wrong in the document.
        for (package_id, value) in &raw {
            if let Some(err) = find_negative_count(package_id, value) {
                return Err(err);
            }
        }

        let mut entries = BTreeMap::new();
        let mut rejected = BTreeMap::new();

        for (package_id, value) in raw {
            let chain_type = value
                .get("chain_type")
                .and_then(Value::as_u64)
                .and_then(|n| u8::try_from(n).ok())
                .and_then(|n| ChainType::try_from(n).ok());

            let parsed = serde_json::from_value::<RawEntry>(value)
                .map_err(|e| EvalError::malformed(&package_id, e.to_string()))
                .and_then(|entry| validate_entry(&package_id, entry));

            match parsed {
                Ok(entry) => {
                    entries.insert(package_id, entry);
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    tracing::warn!("Skipping benchmark record: {}", err);
                    let message = match err {
                        EvalError::MalformedInput { message, .. } => message,
                        other => other.to_string(),
                    };
                    rejected.insert(
                        package_id.clone(),
                        RejectedEntry {
                            package_id,
                            chain_type,
                            message,
                        },
                    );
                }
            }
        }

        Ok(Self { entries, rejected })
    }

    /// @ai:intent Load the benchmark file from disk
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| EvalError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// @ai:intent Keep only entries accepted by the filter
    /// @ai:effects pure
    pub fn filtered(&self, filter: &FilterConfig) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(_, e)| filter.matches(e.chain_type, &e.package_id))
                .map(|(k, e)| (k.clone(), e.clone()))
                .collect(),
            rejected: self
                .rejected
                .iter()
                .filter(|(_, r)| match r.chain_type {
                    Some(chain) => filter.matches(chain, &r.package_id),
                    None => filter.matches_package(&r.package_id),
                })
                .map(|(k, r)| (k.clone(), r.clone()))
                .collect(),
        }
    }

    pub fn get(&self, package_id: &str) -> Option<&BenchmarkEntry> {
        self.entries.get(package_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BenchmarkEntry> {
        self.entries.values()
    }

    /// @ai:intent Records dropped at load, in package order
    /// @ai:effects pure
    pub fn rejected(&self) -> impl Iterator<Item = &RejectedEntry> {
        self.rejected.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// @ai:intent Convert a raw entry into the typed model, rejecting negative counts
/// @ai:effects pure
fn validate_entry(package_id: &str, raw: RawEntry) -> Result<BenchmarkEntry> {
    let mut modules = BTreeMap::new();

    for (module_name, raw_module) in raw.modules {
        let constant_defect_count = checked_count(
            raw_module.constant,
            package_id,
            &module_name,
            "<module>",
            Category::UnusedConstant.as_str(),
        )?;

        let mut functions = BTreeMap::new();

        for (function_name, raw_counts) in raw_module.function {
            let mut expected = BTreeMap::new();

            for (category_name, count) in raw_counts {
                let count =
                    checked_count(count, package_id, &module_name, &function_name, &category_name)?;

                match category_name.parse::<Category>() {
                    Ok(Category::UnusedConstant) | Err(_) => {
                        tracing::warn!(
                            "Ignoring function-level annotation '{}' in {}->{}::{}",
                            category_name,
                            package_id,
                            module_name,
                            function_name
                        );
                    }
                    Ok(category) => {
                        expected.insert(category, count);
                    }
                }
            }

            functions.insert(function_name, FunctionAnnotation { expected });
        }

        modules.insert(
            module_name,
            ModuleAnnotation {
                constant_defect_count,
                functions,
            },
        );
    }

    Ok(BenchmarkEntry {
        package_id: package_id.to_string(),
        chain_type: raw.chain_type,
        modules,
    })
}

/// @ai:intent First negative count of a record, read before its shape is checked
/// @ai:effects pure
fn find_negative_count(package_id: &str, value: &Value) -> Option<EvalError> {
    let modules = value.get("modules")?.as_object()?;

    for (module_name, module) in modules {
        if let Some(n) = module.get("constant").and_then(Value::as_i64) {
            if n < 0 {
                return Some(negative_count(
                    n,
                    package_id,
                    module_name,
                    "<module>",
                    Category::UnusedConstant.as_str(),
                ));
            }
        }

        let Some(functions) = module.get("function").and_then(Value::as_object) else {
            continue;
        };
        for (function_name, counts) in functions {
            let Some(counts) = counts.as_object() else {
                continue;
            };
            for (category_name, count) in counts {
                if let Some(n) = count.as_i64().filter(|n| *n < 0) {
                    return Some(negative_count(
                        n,
                        package_id,
                        module_name,
                        function_name,
                        category_name,
                    ));
                }
            }
        }
    }

    None
}

fn negative_count(value: i64, package: &str, module: &str, function: &str, category: &str) -> EvalError {
    EvalError::InvalidAnnotation {
        package: package.to_string(),
        module: module.to_string(),
        function: function.to_string(),
        category: category.to_string(),
        message: format!("negative count {}", value),
    }
}

/// @ai:intent Validate a raw count as a non-negative u32
/// @ai:effects pure
fn checked_count(
    value: i64,
    package: &str,
    module: &str,
    function: &str,
    category: &str,
) -> Result<u32> {
    if value < 0 {
        return Err(negative_count(value, package, module, function, category));
    }

    u32::try_from(value).map_err(|_| {
        EvalError::malformed(
            package,
            format!("count {} out of range in {}::{}", value, module, function),
        )
    })
}
