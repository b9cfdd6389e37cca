//! Template model
//!
//! A template is a named list of modifications applied in order to a copy
//! of a recipe's component tree.

use forkline_model::ForkTag;
use serde::{Deserialize, Serialize};

/// One declarative edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Modification {
    /// Rename matching ingredients and note the swap
    SubstituteIngredient {
        /// Words to match
        target: String,
        /// New ingredient name
        replacement: String,
        /// Note appended to the ingredient
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Drop matching ingredients
    RemoveIngredient {
        /// Words to match
        target: String,
    },
    /// Halve the numeric quantity of matching ingredients
    ReduceQuantity {
        /// Words to match
        target: String,
        /// Note appended to the ingredient
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    /// Prepend text to the first step of the first section
    AddInstruction {
        /// Text to prepend
        text: String,
    },
    /// Tag the first step of every section as simplified
    SimplifySteps {
        /// Tag text
        tag: String,
    },
    /// Tag the first step of every section with a new cooking method
    ChangeCookingMethod {
        /// Tag text
        tag: String,
    },
}

impl Modification {
    /// Ingredient target, if this edit works on ingredients
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::SubstituteIngredient { target, .. }
            | Self::RemoveIngredient { target }
            | Self::ReduceQuantity { target, .. } => Some(target),
            Self::AddInstruction { .. } | Self::SimplifySteps { .. } | Self::ChangeCookingMethod { .. } => None,
        }
    }
}

/// Named list of modifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoForkTemplate {
    /// Stable identifier (`make_vegan`)
    pub id: String,
    /// Display name
    pub name: String,
    /// What the template does
    pub description: String,
    /// Appended to the derived fork's title
    pub title_suffix: String,
    /// Tags the derived fork carries
    pub fork_tags: Vec<ForkTag>,
    /// Edits, applied in order
    pub modifications: Vec<Modification>,
}

impl AutoForkTemplate {
    /// Create an empty template
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: id.into(),
            title_suffix: format!("({name})"),
            name,
            description: String::new(),
            fork_tags: Vec::new(),
            modifications: Vec::new(),
        }
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With fork tag
    #[inline]
    #[must_use]
    pub fn with_tag(mut self, tag: ForkTag) -> Self {
        self.fork_tags.push(tag);
        self
    }

    /// With substitution
    #[must_use]
    pub fn substitute(mut self, target: &str, replacement: &str, note: Option<&str>) -> Self {
        self.modifications.push(Modification::SubstituteIngredient {
            target: target.to_string(),
            replacement: replacement.to_string(),
            note: note.map(str::to_string),
        });
        self
    }

    /// With removal
    #[must_use]
    pub fn remove(mut self, target: &str) -> Self {
        self.modifications.push(Modification::RemoveIngredient {
            target: target.to_string(),
        });
        self
    }

    /// With halved quantity
    #[must_use]
    pub fn reduce(mut self, target: &str, note: Option<&str>) -> Self {
        self.modifications.push(Modification::ReduceQuantity {
            target: target.to_string(),
            note: note.map(str::to_string),
        });
        self
    }

    /// With leading instruction
    #[must_use]
    pub fn instruction(mut self, text: &str) -> Self {
        self.modifications.push(Modification::AddInstruction { text: text.to_string() });
        self
    }

    /// With any other modification
    #[must_use]
    pub fn with_modification(mut self, modification: Modification) -> Self {
        self.modifications.push(modification);
        self
    }

    /// Fork tags in stored string form
    #[must_use]
    pub fn tag_strings(&self) -> Vec<String> {
        self.fork_tags.iter().map(|t| t.as_str().to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn modification_json_uses_type_tag() {
        let json = serde_json::json!({"type": "reduce_quantity", "target": "sugar"});
        let m: Modification = serde_json::from_value(json).unwrap();
        assert_eq!(
            m,
            Modification::ReduceQuantity {
                target: "sugar".into(),
                note: None
            }
        );
        assert_eq!(m.target(), Some("sugar"));
    }

    #[test]
    fn builder_derives_suffix_and_tags() {
        let t = AutoForkTemplate::new("x", "Lighter").with_tag(ForkTag::Healthier);
        assert_eq!(t.title_suffix, "(Lighter)");
        assert_eq!(t.tag_strings(), vec!["healthier".to_string()]);
    }
}
