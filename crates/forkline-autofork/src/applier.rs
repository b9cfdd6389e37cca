//! Template application
//!
//! Preview and apply share one pass over a copy of the recipe's
//! components, so both report exactly the same changes.

use crate::catalog::find_template;
use crate::error::AutoForkError;
use crate::matcher::IngredientMatcher;
use crate::quantity::halve;
use crate::template::{AutoForkTemplate, Modification};
use forkline_model::{ComponentSection, Recipe, RecipeId, RecipeMetadata};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// What a change did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Ingredient renamed
    Substitute,
    /// Ingredient dropped
    Remove,
    /// Ingredient quantity halved
    Reduce,
    /// Text prepended to a step
    AddInstruction,
    /// Step tagged
    TagStep,
}

/// Single change proposed (or made) by a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedChange {
    /// Kind of change
    pub kind: ChangeKind,
    /// Section title the change lands in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Ingredient name, quantity or step text before
    pub before: String,
    /// Value after; absent for removals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

/// Result of previewing a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoForkPreview {
    /// Template id
    pub template_id: String,
    /// Template name
    pub template_name: String,
    /// Tags the fork would carry
    pub fork_tags: Vec<String>,
    /// Changes that would be made
    pub changes: Vec<ProposedChange>,
    /// Modifications that would have no effect
    pub warnings: Vec<String>,
}

/// Payload for creating the derived fork
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedFork {
    /// Title with the template suffix
    pub title: String,
    /// Recipe the template was applied to
    pub parent_id: RecipeId,
    /// Root of the parent's lineage
    pub root_id: RecipeId,
    /// Template tags
    pub fork_tags: Vec<String>,
    /// Provenance note
    pub fork_note: String,
    /// Modified component tree
    pub components: Vec<ComponentSection>,
    /// Metadata copied from the parent
    pub metadata: RecipeMetadata,
}

/// Result of applying a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoForkResult {
    /// Template id
    pub template_id: String,
    /// Derived fork payload
    pub fork: DerivedFork,
    /// Ingredients touched
    pub ingredients_changed: usize,
    /// Steps touched
    pub steps_changed: usize,
    /// Changes made
    pub changes: Vec<ProposedChange>,
    /// Modifications that had no effect
    pub warnings: Vec<String>,
}

/// Boundary result for payloads that may be malformed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoForkResponse {
    /// Whether the template was applied
    pub success: bool,
    /// Result on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AutoForkResult>,
    /// Message on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AutoForkResponse {
    fn ok(result: AutoForkResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    fn failed(err: &AutoForkError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(err.to_string()),
        }
    }
}

/// Position in the input recipe: (section, ingredient or step index)
#[derive(Debug, Clone, Copy)]
enum Touched {
    Ingredient(usize, usize),
    Step(usize, usize),
}

#[derive(Default)]
struct Pass {
    components: Vec<ComponentSection>,
    // input index of each surviving ingredient, per section
    origins: Vec<Vec<usize>>,
    changes: Vec<ProposedChange>,
    warnings: Vec<String>,
    touched_ingredients: HashSet<(usize, usize)>,
    touched_steps: HashSet<(usize, usize)>,
}

impl Pass {
    fn new(components: &[ComponentSection]) -> Self {
        Self {
            components: components.to_vec(),
            origins: components
                .iter()
                .map(|s| (0..s.ingredients.len()).collect())
                .collect(),
            ..Self::default()
        }
    }

    fn ingredients_changed(&self) -> usize {
        self.touched_ingredients.len()
    }

    fn steps_changed(&self) -> usize {
        self.touched_steps.len()
    }

    fn record(&mut self, kind: ChangeKind, at: Touched, section: Option<&String>, before: String, after: Option<String>) {
        match at {
            Touched::Ingredient(section, index) => self.touched_ingredients.insert((section, index)),
            Touched::Step(section, index) => self.touched_steps.insert((section, index)),
        };
        self.changes.push(ProposedChange {
            kind,
            section: section.cloned(),
            before,
            after,
        });
    }

    fn substitute(&mut self, target: &str, replacement: &str, note: Option<&String>) {
        let matcher = IngredientMatcher::new(target);
        let mut hits = Vec::new();
        for (si, section) in self.components.iter_mut().enumerate() {
            for (ii, ingredient) in section.ingredients.iter_mut().enumerate() {
                if !matcher.matches(ingredient) {
                    continue;
                }
                let before = std::mem::replace(&mut ingredient.name, replacement.to_string());
                let note = note.cloned().unwrap_or_else(|| format!("Substituted for {before}"));
                ingredient.append_note(&note);
                hits.push((Touched::Ingredient(si, self.origins[si][ii]), section.title.clone(), before));
            }
        }
        self.finish_ingredient_edit(target, ChangeKind::Substitute, hits, Some(replacement));
    }

    fn remove(&mut self, target: &str) {
        let matcher = IngredientMatcher::new(target);
        let mut hits = Vec::new();
        for (si, section) in self.components.iter_mut().enumerate() {
            let ingredients = std::mem::take(&mut section.ingredients);
            let origins = std::mem::take(&mut self.origins[si]);
            for (ingredient, origin) in ingredients.into_iter().zip(origins) {
                if matcher.matches(&ingredient) {
                    hits.push((Touched::Ingredient(si, origin), section.title.clone(), ingredient.name));
                } else {
                    section.ingredients.push(ingredient);
                    self.origins[si].push(origin);
                }
            }
        }
        self.finish_ingredient_edit(target, ChangeKind::Remove, hits, None);
    }

    fn reduce(&mut self, target: &str, note: Option<&String>) {
        let matcher = IngredientMatcher::new(target);
        let mut matched_any = false;
        let mut changes = Vec::new();
        let mut warnings = Vec::new();
        for (si, section) in self.components.iter_mut().enumerate() {
            for (ii, ingredient) in section.ingredients.iter_mut().enumerate() {
                if !matcher.matches(ingredient) {
                    continue;
                }
                matched_any = true;
                let Some(halved) = ingredient.quantity.as_deref().and_then(halve) else {
                    warnings.push(format!("Could not halve \"{}\": no numeric quantity", ingredient.name));
                    continue;
                };
                let before = ingredient.quantity.replace(halved.clone()).unwrap_or_default();
                let note = note.cloned().unwrap_or_else(|| format!("Reduced from {before}"));
                ingredient.append_note(&note);
                changes.push((Touched::Ingredient(si, self.origins[si][ii]), section.title.clone(), before, halved));
            }
        }
        if !matched_any {
            self.warnings.push(format!("No ingredient matched \"{target}\""));
        }
        self.warnings.extend(warnings);
        for (at, section, before, after) in changes {
            self.record(ChangeKind::Reduce, at, section.as_ref(), before, Some(after));
        }
    }

    fn finish_ingredient_edit(
        &mut self,
        target: &str,
        kind: ChangeKind,
        hits: Vec<(Touched, Option<String>, String)>,
        after: Option<&str>,
    ) {
        if hits.is_empty() {
            self.warnings.push(format!("No ingredient matched \"{target}\""));
        }
        for (at, section, before) in hits {
            self.record(kind, at, section.as_ref(), before, after.map(str::to_string));
        }
    }

    fn add_instruction(&mut self, text: &str) {
        let Some(step_edit) = self.components.first_mut().and_then(|section| {
            let title = section.title.clone();
            let step = section.steps.first_mut()?;
            let before = std::mem::take(&mut step.instruction);
            step.instruction = format!("{text} {before}");
            Some((title, before, step.instruction.clone()))
        }) else {
            self.warnings.push("No step to add the instruction to".to_string());
            return;
        };
        let (section, before, after) = step_edit;
        self.record(ChangeKind::AddInstruction, Touched::Step(0, 0), section.as_ref(), before, Some(after));
    }

    fn tag_first_steps(&mut self, tag: &str) {
        let mut tagged = Vec::new();
        for (si, section) in self.components.iter_mut().enumerate() {
            if let Some(step) = section.steps.first_mut() {
                let before = std::mem::take(&mut step.instruction);
                step.instruction = format!("[{tag}] {before}");
                tagged.push((Touched::Step(si, 0), section.title.clone(), before, step.instruction.clone()));
            }
        }
        if tagged.is_empty() {
            self.warnings.push(format!("No step to tag with \"{tag}\""));
        }
        for (at, section, before, after) in tagged {
            self.record(ChangeKind::TagStep, at, section.as_ref(), before, Some(after));
        }
    }
}

/// Applies auto-fork templates to recipes
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoForkApplier;

impl AutoForkApplier {
    /// Create applier
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Built-in template by id
    pub fn template(&self, id: &str) -> Result<&'static AutoForkTemplate, AutoForkError> {
        find_template(id).ok_or_else(|| AutoForkError::UnknownTemplate(id.to_string()))
    }

    fn run(recipe: &Recipe, template: &AutoForkTemplate) -> Pass {
        let mut pass = Pass::new(&recipe.components);
        for modification in &template.modifications {
            match modification {
                Modification::SubstituteIngredient {
                    target,
                    replacement,
                    note,
                } => pass.substitute(target, replacement, note.as_ref()),
                Modification::RemoveIngredient { target } => pass.remove(target),
                Modification::ReduceQuantity { target, note } => pass.reduce(target, note.as_ref()),
                Modification::AddInstruction { text } => pass.add_instruction(text),
                Modification::SimplifySteps { tag } | Modification::ChangeCookingMethod { tag } => {
                    pass.tag_first_steps(tag);
                }
            }
        }
        debug!(
            "Template {} on {}: {} ingredient(s), {} step(s), {} warning(s)",
            template.id,
            recipe.id,
            pass.ingredients_changed(),
            pass.steps_changed(),
            pass.warnings.len()
        );
        pass
    }

    /// Changes a template would make, without building a fork
    #[must_use]
    pub fn preview(&self, recipe: &Recipe, template: &AutoForkTemplate) -> AutoForkPreview {
        let pass = Self::run(recipe, template);
        AutoForkPreview {
            template_id: template.id.clone(),
            template_name: template.name.clone(),
            fork_tags: template.tag_strings(),
            changes: pass.changes,
            warnings: pass.warnings,
        }
    }

    /// Build the derived fork payload; the input recipe is not modified
    #[must_use]
    pub fn apply(&self, recipe: &Recipe, template: &AutoForkTemplate) -> AutoForkResult {
        let pass = Self::run(recipe, template);
        let (ingredients_changed, steps_changed) = (pass.ingredients_changed(), pass.steps_changed());
        let fork = DerivedFork {
            title: format!("{} {}", recipe.title, template.title_suffix),
            parent_id: recipe.id,
            root_id: recipe.root_id.unwrap_or(recipe.id),
            fork_tags: template.tag_strings(),
            fork_note: format!("Created automatically with the {} template", template.name),
            components: pass.components,
            metadata: recipe.metadata,
        };
        AutoForkResult {
            template_id: template.id.clone(),
            fork,
            ingredients_changed,
            steps_changed,
            changes: pass.changes,
            warnings: pass.warnings,
        }
    }

    /// Apply to an undecoded recipe payload, folding failures into the
    /// response instead of returning them
    #[must_use]
    pub fn apply_raw(&self, recipe: serde_json::Value, template_id: &str) -> AutoForkResponse {
        match self.try_apply_raw(recipe, template_id) {
            Ok(result) => AutoForkResponse::ok(result),
            Err(err) => {
                warn!("Auto-fork with {} failed: {}", template_id, err);
                AutoForkResponse::failed(&err)
            }
        }
    }

    fn try_apply_raw(&self, recipe: serde_json::Value, template_id: &str) -> Result<AutoForkResult, AutoForkError> {
        let template = self.template(template_id)?;
        let recipe: Recipe = serde_json::from_value(recipe)?;
        Ok(self.apply(&recipe, template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forkline_model::{EngineError, Ingredient};
    use forkline_test_utils::{sample_recipe, RecipeBuilder};
    use pretty_assertions::assert_eq;

    fn applier() -> AutoForkApplier {
        AutoForkApplier::new()
    }

    fn names(components: &[ComponentSection]) -> Vec<String> {
        components
            .iter()
            .flat_map(|s| s.ingredients.iter().map(|i| i.name.clone()))
            .collect()
    }

    #[test]
    fn egg_target_over_matches_eggplant() {
        let recipe = RecipeBuilder::root(1, "Moussaka")
            .components(vec![ComponentSection::new("Base")
                .with_ingredient(Ingredient::new("2 large eggs"))
                .with_ingredient(Ingredient::new("eggplant, sliced"))
                .with_step("Layer and bake")])
            .build();
        let template = AutoForkTemplate::new("t", "No Egg").substitute("egg", "flax egg", None);
        let result = applier().apply(&recipe, &template);
        assert_eq!(names(&result.fork.components), vec!["flax egg", "flax egg"]);
        assert_eq!(result.ingredients_changed, 2);
        assert_eq!(
            result.fork.components[0].ingredients[1].notes.as_deref(),
            Some("Substituted for eggplant, sliced")
        );
    }

    #[test]
    fn vegan_on_pancakes() {
        let recipe = sample_recipe(1);
        let template = applier().template("make_vegan").unwrap();
        let result = applier().apply(&recipe, template);
        assert_eq!(
            names(&result.fork.components),
            vec!["flour", "flax egg", "oat milk", "sugar", "vegan butter"]
        );
        assert_eq!(result.ingredients_changed, 3);
        assert_eq!(result.steps_changed, 0);
        assert_eq!(result.warnings.len(), 5);
        assert_eq!(result.fork.title, "Buttermilk Pancakes (Vegan)");
        assert_eq!(result.fork.parent_id, recipe.id);
        assert_eq!(result.fork.root_id, recipe.id);
        assert_eq!(result.fork.fork_tags, vec!["vegan".to_string(), "dairy_free".to_string()]);
    }

    #[test]
    fn apply_is_pure_and_repeatable() {
        let recipe = sample_recipe(1);
        let before = recipe.clone();
        let template = applier().template("air_fryer").unwrap();
        let first = applier().apply(&recipe, template);
        let second = applier().apply(&recipe, template);
        assert_eq!(recipe, before);
        assert_eq!(first, second);
    }

    #[test]
    fn preview_reports_what_apply_does() {
        let recipe = sample_recipe(1);
        for template in crate::builtin_templates() {
            let preview = applier().preview(&recipe, template);
            let result = applier().apply(&recipe, template);
            assert_eq!(preview.changes, result.changes, "{}", template.id);
            assert_eq!(preview.warnings, result.warnings, "{}", template.id);
        }
    }

    #[test]
    fn reduce_sugar_halves_quantity() {
        let recipe = sample_recipe(1);
        let result = applier().apply(&recipe, applier().template("reduce_sugar").unwrap());
        let sugar = &result.fork.components[0].ingredients[3];
        assert_eq!(sugar.quantity.as_deref(), Some("1"));
        assert_eq!(sugar.unit.as_deref(), Some("tbsp"));
        assert_eq!(sugar.notes.as_deref(), Some("Halved for a less sweet result"));
        assert_eq!(result.ingredients_changed, 1);
        assert_eq!(result.warnings, vec!["No ingredient matched \"honey syrup\"".to_string()]);
    }

    #[test]
    fn reduce_without_quantity_warns() {
        let recipe = sample_recipe(1);
        let template = AutoForkTemplate::new("t", "Fewer Eggs").reduce("egg", None);
        let result = applier().apply(&recipe, &template);
        assert_eq!(result.ingredients_changed, 0);
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("no numeric quantity"));
    }

    #[test]
    fn air_fryer_touches_first_steps() {
        let recipe = sample_recipe(1);
        let result = applier().apply(&recipe, applier().template("air_fryer").unwrap());
        let first_steps: Vec<_> = result
            .fork
            .components
            .iter()
            .map(|s| s.steps[0].instruction.as_str())
            .collect();
        assert_eq!(
            first_steps,
            vec![
                "[Air fryer] Preheat the air fryer to 375°F (190°C). Whisk the dry ingredients",
                "[Air fryer] Heat a griddle and melt the butter",
            ]
        );
        assert_eq!(result.steps_changed, 2);
        assert_eq!(result.changes.len(), 3);
    }

    #[test]
    fn repeated_edits_count_each_ingredient_once() {
        let recipe = RecipeBuilder::root(1, "Brownies")
            .components(vec![
                ComponentSection::new("Batter")
                    .with_ingredient(Ingredient::new("sugar").with_amount("2", "cups"))
                    .with_ingredient(Ingredient::new("flour").with_amount("1", "cup"))
                    .with_step("Mix"),
                ComponentSection::new("Glaze")
                    .with_ingredient(Ingredient::new("flour").with_amount("1", "tbsp"))
                    .with_ingredient(Ingredient::new("sugar").with_amount("1", "cup"))
                    .with_step("Whisk"),
            ])
            .build();
        let template = AutoForkTemplate::new("t", "Lighter")
            .remove("flour")
            .substitute("sugar", "coconut sugar", None)
            .reduce("coconut sugar", None);

        let result = applier().apply(&recipe, &template);

        assert_eq!(result.changes.len(), 6);
        assert_eq!(result.ingredients_changed, 4);
        assert_eq!(
            result.fork.components[1].ingredients[0].quantity.as_deref(),
            Some("1/2")
        );
    }

    #[test]
    fn remove_drops_matches() {
        let recipe = sample_recipe(1);
        let template = AutoForkTemplate::new("t", "No Sugar").remove("sugar");
        let result = applier().apply(&recipe, &template);
        assert!(!names(&result.fork.components).contains(&"sugar".to_string()));
        assert_eq!(result.changes[0].kind, ChangeKind::Remove);
        assert_eq!(result.changes[0].after, None);
    }

    #[test]
    fn unknown_template_maps_to_invalid_template() {
        let err = applier().template("make_keto").unwrap_err();
        assert!(matches!(err, AutoForkError::UnknownTemplate(ref id) if id == "make_keto"));
        let engine: EngineError = err.into();
        assert!(matches!(engine, EngineError::InvalidTemplate(_)));
    }

    #[test]
    fn malformed_recipe_maps_to_malformed_recipe() {
        let err = serde_json::from_value::<Recipe>(serde_json::json!({"title": 5})).unwrap_err();
        let engine: EngineError = AutoForkError::from(err).into();
        assert!(matches!(engine, EngineError::MalformedRecipe(_)));
        assert!(engine.to_string().starts_with("malformed recipe"));
    }

    #[test]
    fn raw_apply_folds_errors() {
        let response = applier().apply_raw(serde_json::json!({"title": 5}), "make_vegan");
        assert!(!response.success);
        assert!(response.error.unwrap().starts_with("malformed recipe"));

        let response = applier().apply_raw(serde_json::json!({}), "make_keto");
        assert!(!response.success);

        let payload = serde_json::to_value(sample_recipe(1)).unwrap();
        let response = applier().apply_raw(payload, "make_dairy_free");
        assert!(response.success);
        assert!(response.result.unwrap().ingredients_changed > 0);
    }
}
