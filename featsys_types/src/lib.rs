//! Feature System Types - Level 1 Foundation Types
//!
//! Pure data structures shared by the feature-structure engine and anything
//! that hosts feature structures (parts of speech, analyses, rule contexts).
//!
//! ## Contents
//!
//! - Object identifiers (GUID-backed newtypes)
//! - Localized text keyed by writing system
//! - Value kind discriminant
//! - Validation issue structures
//! - The `FeatureError` enum
//!
//! ## Rules
//!
//! 1. **NO BUSINESS LOGIC** - only data structures, constructors and accessors
//! 2. **NO WORKSPACE DEPENDENCIES**
//! 3. **SERIALIZABLE** - all types support serde

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

// ============================================================================
// OBJECT IDENTIFIERS
// ============================================================================

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Allocate a fresh random identity
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing GUID (e.g. one embedded in a catalog)
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identity of a feature definition (closed or complex)
    FeatureId
);
define_id!(
    /// Identity of a symbolic value owned by a closed feature
    SymbolId
);
define_id!(
    /// Identity of a feature structure type
    TypeId
);
define_id!(
    /// Identity of a feature value (specification) inside a structure
    ValueId
);
define_id!(
    /// Identity of a feature structure
    StructureId
);
define_id!(
    /// Identity of a disjunction of feature structures
    DisjunctionId
);

// ============================================================================
// LOCALIZED TEXT
// ============================================================================

/// Text with one alternative per writing system (e.g. "en", "fr").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiString {
    alternatives: BTreeMap<String, String>,
}

impl MultiString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a string with a single alternative
    pub fn with(ws: impl Into<String>, text: impl Into<String>) -> Self {
        let mut s = Self::new();
        s.set(ws, text);
        s
    }

    /// The same text in every listed writing system
    pub fn replicated<S: AsRef<str>>(text: &str, writing_systems: &[S]) -> Self {
        let mut s = Self::new();
        for ws in writing_systems {
            s.set(ws.as_ref(), text);
        }
        s
    }

    pub fn set(&mut self, ws: impl Into<String>, text: impl Into<String>) {
        self.alternatives.insert(ws.into(), text.into());
    }

    pub fn get(&self, ws: &str) -> Option<&str> {
        self.alternatives.get(ws).map(String::as_str)
    }

    /// First non-empty alternative in preference order, falling back to any
    /// non-empty alternative at all.
    pub fn best<S: AsRef<str>>(&self, preferred: &[S]) -> Option<&str> {
        preferred
            .iter()
            .filter_map(|ws| self.get(ws.as_ref()))
            .find(|t| !t.is_empty())
            .or_else(|| {
                self.alternatives
                    .values()
                    .map(String::as_str)
                    .find(|t| !t.is_empty())
            })
    }

    pub fn is_empty(&self) -> bool {
        self.alternatives.values().all(|t| t.is_empty())
    }
}

// ============================================================================
// VALUE KINDS
// ============================================================================

/// Discriminant of the feature value tagged union
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Closed,
    Complex,
    Negated,
    Disjunctive,
    Shared,
    Open,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Closed => "closed",
            ValueKind::Complex => "complex",
            ValueKind::Negated => "negated",
            ValueKind::Disjunctive => "disjunctive",
            ValueKind::Shared => "shared",
            ValueKind::Open => "open",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// VALIDATION STRUCTURES
// ============================================================================

/// How serious a structural validation finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    /// Legal but unusual (e.g. a feature not declared on the structure type)
    Warning,
    /// Breaks a model invariant
    Error,
}

impl IssueSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
        }
    }
}

/// A single finding from structural validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Short rule code, e.g. "FS1"
    pub rule: String,
    pub severity: IssueSeverity,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity: IssueSeverity::Error,
            message: message.into(),
        }
    }

    pub fn warning(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            severity: IssueSeverity::Warning,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.rule, self.severity.as_str(), self.message)
    }
}

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Contract violations and lookup failures raised by the engine.
///
/// Malformed catalog input is not represented here: it is absorbed locally
/// and surfaces as `None` from the bootstrap calls.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("value kind mismatch: expected {expected}, found {found}")]
    KindMismatch { expected: ValueKind, found: ValueKind },

    #[error("symbolic value {symbol} is not owned by feature {feature}")]
    NotOwned { feature: FeatureId, symbol: SymbolId },

    #[error("feature {0} is not a closed feature")]
    NotClosedFeature(FeatureId),

    #[error("feature not found: {0}")]
    FeatureNotFound(FeatureId),

    #[error("symbolic value not found: {0}")]
    SymbolNotFound(SymbolId),

    #[error("structure type not found: {0}")]
    TypeNotFound(TypeId),

    #[error("feature value not found: {0}")]
    ValueNotFound(ValueId),

    #[error("configuration error: {details}")]
    Configuration { details: String },
}

pub type FeatureResult<T> = Result<T, FeatureError>;

// ============================================================================
// TESTS
// ============================================================================
