//! Bracketed gloss strings for feature structures.
//!
//! ```text
//! long:   [agr:[gen:f num:pl] tns:pst]
//! short:  [agr.[f.gen pl] pst]
//! ```
//!
//! Labels are resolved through the catalog in the configured writing-system
//! order; anything that cannot be resolved renders as the configured
//! placeholder. Symbols with `show_in_gloss` unset are blank in the short
//! form, leaving only the feature label (or nothing) for their pair.

use featsys_types::{FeatureId, MultiString, SymbolId};

use crate::catalog::{FeatureCatalog, FeatureDefinition};
use crate::config::FeatureSystemConfig;
use crate::structure::{FeatureStructure, FeatureStructureDisjunction};
use crate::value::{FeatureValue, ValuePayload};

/// Greek letters used for co-indexed (shared) values, by ref number
const ALPHA_VARIABLES: [&str; 24] = [
    "α", "β", "γ", "δ", "ε", "ζ", "η", "θ", "ι", "κ", "λ", "μ", "ν", "ξ", "ο", "π", "ρ", "σ",
    "τ", "υ", "φ", "χ", "ψ", "ω",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Always `feature:value`, ignoring per-feature gloss settings
    pub long_form: bool,
    /// Order pairs by feature display name
    pub sorted: bool,
}

impl RenderOptions {
    pub fn short() -> Self {
        Self::default()
    }

    pub fn long() -> Self {
        Self {
            long_form: true,
            sorted: false,
        }
    }

    pub fn sorted(mut self) -> Self {
        self.sorted = true;
        self
    }
}

impl FeatureStructure {
    pub fn render(
        &self,
        catalog: &FeatureCatalog,
        config: &FeatureSystemConfig,
        options: RenderOptions,
    ) -> String {
        Renderer {
            catalog,
            config,
            options,
        }
        .structure(self)
    }
}

struct Renderer<'a> {
    catalog: &'a FeatureCatalog,
    config: &'a FeatureSystemConfig,
    options: RenderOptions,
}

impl Renderer<'_> {
    fn structure(&self, fs: &FeatureStructure) -> String {
        let mut specs: Vec<&FeatureValue> = fs.specs().iter().collect();
        if self.options.sorted {
            specs.sort_by_cached_key(|v| self.feature_name(v.feature()));
        }

        let mut parts: Vec<String> = specs
            .into_iter()
            .map(|v| self.pair(v))
            .filter(|part| !part.is_empty())
            .collect();
        parts.extend(fs.disjunctions().iter().map(|d| self.disjunction(d)));
        format!("[{}]", parts.join(" "))
    }

    fn disjunction(&self, disjunction: &FeatureStructureDisjunction) -> String {
        let alternatives: Vec<String> = disjunction
            .contents()
            .iter()
            .map(|alt| self.structure(alt))
            .collect();
        format!("{{{}}}", alternatives.join(" | "))
    }

    fn pair(&self, value: &FeatureValue) -> String {
        let def = self.catalog.feature_by_id(value.feature());
        let feature = self.feature_abbreviation(value.feature());
        let rendered = self.value(value);

        if self.options.long_form {
            return format!("{}:{}", feature, rendered);
        }

        match def {
            Some(def) if def.show_in_gloss && rendered.is_empty() => feature,
            Some(def) if def.show_in_gloss => {
                let separator = self.separator(def);
                if def.display_to_right_of_values {
                    format!("{}{}{}", rendered, separator, feature)
                } else {
                    format!("{}{}{}", feature, separator, rendered)
                }
            }
            _ => rendered,
        }
    }

    fn value(&self, value: &FeatureValue) -> String {
        match value.payload() {
            ValuePayload::Closed { value } => self.symbol(*value),
            ValuePayload::Complex { structure } => match structure {
                Some(nested) => self.structure(nested),
                None => "[]".to_string(),
            },
            ValuePayload::Negated { value } => match self.symbol(*value) {
                symbol if symbol.is_empty() => symbol,
                symbol => format!("!{}", symbol),
            },
            ValuePayload::Disjunctive { values } => {
                let mut symbols: Vec<String> = values
                    .iter()
                    .map(|s| self.symbol(Some(*s)))
                    .filter(|symbol| !symbol.is_empty())
                    .collect();
                if symbols.is_empty() && !values.is_empty() {
                    return String::new();
                }
                symbols.sort();
                format!("{{{}}}", symbols.join(","))
            }
            ValuePayload::Shared { .. } => alpha_variable(value.ref_number).to_string(),
            ValuePayload::Open { text } => self.text(text),
        }
    }

    fn separator<'d>(&'d self, def: &'d FeatureDefinition) -> &'d str {
        def.right_gloss_separator
            .as_deref()
            .unwrap_or(self.config.default_gloss_separator.as_str())
    }

    /// Symbol abbreviation; blank in short form when the symbol is kept out
    /// of glosses
    fn symbol(&self, symbol: Option<SymbolId>) -> String {
        match symbol.and_then(|id| self.catalog.symbolic_value_by_id(id)) {
            Some(sv) if !sv.show_in_gloss && !self.options.long_form => String::new(),
            Some(sv) => self.text(&sv.labels.abbreviation),
            None => self.config.missing_text.clone(),
        }
    }

    fn feature_abbreviation(&self, feature: FeatureId) -> String {
        self.catalog
            .feature_by_id(feature)
            .map(|def| self.text(&def.labels.abbreviation))
            .unwrap_or_else(|| self.config.missing_text.clone())
    }

    fn feature_name(&self, feature: FeatureId) -> String {
        self.catalog
            .feature_by_id(feature)
            .map(|def| self.text(&def.labels.name))
            .unwrap_or_else(|| self.config.missing_text.clone())
    }

    fn text(&self, text: &MultiString) -> String {
        text.best(&self.config.analysis_writing_systems)
            .unwrap_or(self.config.missing_text.as_str())
            .to_string()
    }
}

fn alpha_variable(ref_number: i32) -> &'static str {
    let index = (ref_number.max(1) - 1) as usize % ALPHA_VARIABLES.len();
    ALPHA_VARIABLES[index]
}
