//! @ai:module:intent Defect categories tracked by the benchmark
//! @ai:module:layer domain
//! @ai:module:public_api Category, Granularity, LocationForm
//! @ai:module:stateless true

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// @ai:intent A defect kind with its own confusion bucket
/// @ai:effects pure
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    UncheckedReturn,
    Overflow,
    PrecisionLoss,
    InfiniteLoop,
    UnusedConstant,
    UnusedPrivateFunctions,
    UnnecessaryTypeConversion,
    UnnecessaryBoolJudgment,
}

/// @ai:intent Level at which benchmark and findings are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Counted per module, findings are not matched by name
    Module,
    /// Matched per function name
    Function,
}

/// @ai:intent How a legacy finding string encodes its function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationForm {
    /// `name(args)`
    CallSite,
    /// The finding is the function name itself
    FunctionName,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::UncheckedReturn,
        Category::Overflow,
        Category::PrecisionLoss,
        Category::InfiniteLoop,
        Category::UnusedConstant,
        Category::UnusedPrivateFunctions,
        Category::UnnecessaryTypeConversion,
        Category::UnnecessaryBoolJudgment,
    ];

    /// @ai:intent Detector name used by the scanner and the benchmark file
    /// @ai:effects pure
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::UncheckedReturn => "unchecked_return",
            Category::Overflow => "overflow",
            Category::PrecisionLoss => "precision_loss",
            Category::InfiniteLoop => "infinite_loop",
            Category::UnusedConstant => "unused_constant",
            Category::UnusedPrivateFunctions => "unused_private_functions",
            Category::UnnecessaryTypeConversion => "unnecessary_type_conversion",
            Category::UnnecessaryBoolJudgment => "unnecessary_bool_judgment",
        }
    }

    /// @ai:intent Comparison granularity of this category
    /// @ai:effects pure
    pub fn granularity(&self) -> Granularity {
        match self {
            Category::UnusedConstant => Granularity::Module,
            _ => Granularity::Function,
        }
    }

    /// @ai:intent Encoding of legacy finding strings for this category
    /// @ai:effects pure
    pub fn location_form(&self) -> LocationForm {
        match self {
            Category::UnusedPrivateFunctions => LocationForm::FunctionName,
            _ => LocationForm::CallSite,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();

        // the benchmark file names the module-level category "constant"
        if name == "constant" {
            return Ok(Category::UnusedConstant);
        }

        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == name)
            .ok_or_else(|| format!("unknown category: {}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category_names() {
        assert_eq!("overflow".parse::<Category>(), Ok(Category::Overflow));
        assert_eq!("constant".parse::<Category>(), Ok(Category::UnusedConstant));
        assert_eq!(
            " unused_private_functions ".parse::<Category>(),
            Ok(Category::UnusedPrivateFunctions)
        );
        assert!("repeated_function_call".parse::<Category>().is_err());
    }

    #[test]
    fn test_granularity() {
        assert_eq!(Category::UnusedConstant.granularity(), Granularity::Module);
        assert_eq!(Category::Overflow.granularity(), Granularity::Function);
    }

    #[test]
    fn test_location_form() {
        assert_eq!(
            Category::UnusedPrivateFunctions.location_form(),
            LocationForm::FunctionName
        );
        assert_eq!(Category::PrecisionLoss.location_form(), LocationForm::CallSite);
    }
}
