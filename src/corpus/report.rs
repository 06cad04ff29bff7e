//! @ai:module:intent Scanner report model and finding location decoding
//! @ai:module:layer domain
//! @ai:module:public_api ToolReport, ModuleResult, Finding, Location, LocationDecoder
//! @ai:module:stateless true

use crate::corpus::category::{Category, LocationForm};
use crate::error::{EvalError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// @ai:intent Raw scanner output for one package
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolReport {
    #[serde(default)]
    pub modules: BTreeMap<String, ModuleResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modules_status: Option<ModulesStatus>,
    /// Analysis time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_time: Option<f64>,
}

/// @ai:intent Scanner output for one module
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleResult {
    #[serde(rename = "constant_count")]
    pub constant_total_count: u64,
    #[serde(rename = "detectors", default)]
    pub findings: BTreeMap<String, Vec<Finding>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_count: Option<FunctionCount>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulesStatus {
    #[serde(default)]
    pub pass: u64,
    #[serde(default)]
    pub wrong: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCount {
    #[serde(default)]
    pub all: u64,
    #[serde(default)]
    pub native: u64,
}

/// @ai:intent One reported defect instance
/// @ai:effects pure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Finding {
    Structured(Location),
    /// Plain string as emitted by current scanner builds
    Legacy(String),
}

/// @ai:intent Structured location of a finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Finding::Legacy(text) => write!(f, "{}", text),
            Finding::Structured(Location {
                function,
                span: Some(span),
            }) => write!(f, "{}({})", function, span),
            Finding::Structured(Location { function, span: None }) => write!(f, "{}", function),
        }
    }
}

impl ModuleResult {
    /// @ai:intent Findings of a category, absent means none
    /// @ai:effects pure
    pub fn findings_for(&self, category: Category) -> &[Finding] {
        self.findings
            .get(category.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl ToolReport {
    /// @ai:intent Parse one report document
    /// @ai:effects pure
    pub fn from_json(package: &str, json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EvalError::malformed(package, e.to_string()))
    }

    /// @ai:intent Read and parse a report file
    /// @ai:effects fs:read
    pub fn load(package: &str, path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| EvalError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(package, &content).map_err(|e| match e {
            EvalError::MalformedInput { package, message } => EvalError::MalformedInput {
                package,
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    /// @ai:intent Merge another report file of the same package into this one
    /// @ai:pre both reports describe the same package
    /// @ai:post module sets are disjoint, statistics are summed
    /// @ai:effects pure
    pub fn merge(&mut self, package: &str, other: ToolReport) -> Result<()> {
        for (name, module) in other.modules {
            if self.modules.contains_key(&name) {
                return Err(EvalError::malformed(
                    package,
                    format!("module {} reported twice", name),
                ));
            }
            self.modules.insert(name, module);
        }

        self.modules_status = match (self.modules_status, other.modules_status) {
            (Some(a), Some(b)) => Some(ModulesStatus {
                pass: a.pass + b.pass,
                wrong: a.wrong + b.wrong,
            }),
            (a, b) => a.or(b),
        };

        self.total_time = match (self.total_time, other.total_time) {
            (Some(a), Some(b)) => Some(a + b),
            (a, b) => a.or(b),
        };

        Ok(())
    }
}

/// @ai:intent Decodes findings into structured locations
pub struct LocationDecoder {
    call_site: Regex,
}

impl LocationDecoder {
    /// @ai:intent Create a decoder for `name(args)` strings
    /// @ai:effects pure
    pub fn new() -> Self {
        Self {
            call_site: Regex::new(r"(?s)^(?P<function>[^(]*)\((?P<span>.*?)\)?$")
                .expect("call-site pattern is valid"),
        }
    }

    /// @ai:intent Resolve the function a finding points at
    /// @ai:effects pure
    /// @ai:example (Legacy("f(x)"), CallSite) -> Location { function: "f", span: Some("x") }
    pub fn decode(&self, finding: &Finding, form: LocationForm) -> Location {
        match finding {
            Finding::Structured(location) => location.clone(),
            Finding::Legacy(text) => self.decode_legacy(text, form),
        }
    }

    fn decode_legacy(&self, text: &str, form: LocationForm) -> Location {
        let verbatim = || Location {
            function: text.trim().to_string(),
            span: None,
        };

        if form == LocationForm::FunctionName {
            return verbatim();
        }

        match self.call_site.captures(text) {
            Some(caps) => {
                let function = caps.name("function").map_or("", |m| m.as_str()).trim();

                if function.is_empty() {
                    return verbatim();
                }

                Location {
                    function: function.to_string(),
                    span: caps.name("span").map(|m| m.as_str().to_string()),
                }
            }
            None => verbatim(),
        }
    }
}

impl Default for LocationDecoder {
    fn default() -> Self {
        Self::new()
    }
}
