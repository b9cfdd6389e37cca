//! Built-in templates

use crate::template::{AutoForkTemplate, Modification};
use forkline_model::ForkTag;
use once_cell::sync::Lazy;

static BUILTIN: Lazy<Vec<AutoForkTemplate>> = Lazy::new(|| {
    vec![
        // milk before butter so buttermilk is caught by the milk swap
        AutoForkTemplate::new("make_vegan", "Vegan")
            .with_description("Replace animal products with plant-based alternatives")
            .with_tag(ForkTag::Vegan)
            .with_tag(ForkTag::DairyFree)
            .substitute("milk", "oat milk", None)
            .substitute("butter", "vegan butter", None)
            .substitute("egg", "flax egg", Some("1 tbsp ground flaxseed + 3 tbsp water per egg"))
            .substitute("cream", "coconut cream", None)
            .substitute("cheese", "nutritional yeast", None)
            .substitute("honey", "maple syrup", None)
            .substitute("chicken", "extra-firm tofu", None)
            .substitute("beef", "seitan", None),
        AutoForkTemplate::new("make_vegetarian", "Vegetarian")
            .with_description("Swap meat and fish for vegetarian proteins")
            .with_tag(ForkTag::Vegetarian)
            .substitute("broth stock", "vegetable broth", None)
            .substitute("chicken", "extra-firm tofu", None)
            .substitute("beef", "mushrooms", Some("Use a mix of cremini and shiitake"))
            .substitute("pork", "jackfruit", None)
            .substitute("bacon", "smoked tempeh", None)
            .substitute("fish", "marinated tofu", None),
        AutoForkTemplate::new("make_gluten_free", "Gluten-Free")
            .with_description("Use gluten-free flours, pasta and sauces")
            .with_tag(ForkTag::GlutenFree)
            .substitute("flour", "gluten-free flour blend", Some("Add 1/2 tsp xanthan gum if the blend has none"))
            .substitute("pasta", "gluten-free pasta", None)
            .substitute("breadcrumb", "gluten-free breadcrumbs", None)
            .substitute("soy", "tamari", None),
        AutoForkTemplate::new("make_dairy_free", "Dairy-Free")
            .with_description("Replace dairy with non-dairy alternatives")
            .with_tag(ForkTag::DairyFree)
            .substitute("milk", "oat milk", None)
            .substitute("butter", "olive oil", Some("Use 3/4 the amount"))
            .substitute("cream", "coconut cream", None)
            .substitute("cheese", "dairy-free cheese", None)
            .substitute("yogurt", "coconut yogurt", None),
        AutoForkTemplate::new("reduce_sugar", "Less Sugar")
            .with_description("Halve sugar and sweeteners")
            .with_tag(ForkTag::LowerSugar)
            .reduce("sugar", Some("Halved for a less sweet result"))
            .reduce("honey syrup", Some("Halved for a less sweet result")),
        AutoForkTemplate::new("make_healthier", "Healthier")
            .with_description("Cut fat and salt, lighten rich ingredients")
            .with_tag(ForkTag::Healthier)
            .reduce("butter oil", Some("Halved to cut fat"))
            .reduce("salt", Some("Season to taste at the end"))
            .substitute("sour", "greek yogurt", None)
            .instruction("Use a light hand with fat and salt."),
        AutoForkTemplate::new("quick_version", "Quick")
            .with_description("Shortcut steps for a faster weeknight version")
            .with_tag(ForkTag::Quicker)
            .with_tag(ForkTag::Simpler)
            .instruction("Prep every ingredient before you start.")
            .with_modification(Modification::SimplifySteps {
                tag: "Shortcut".to_string(),
            }),
        AutoForkTemplate::new("air_fryer", "Air Fryer")
            .with_description("Adapt the cooking method for an air fryer")
            .with_tag(ForkTag::AirFryer)
            .reduce("oil", Some("An air fryer needs far less oil"))
            .instruction("Preheat the air fryer to 375°F (190°C).")
            .with_modification(Modification::ChangeCookingMethod {
                tag: "Air fryer".to_string(),
            }),
    ]
});

/// Every built-in template
#[must_use]
pub fn builtin_templates() -> &'static [AutoForkTemplate] {
    &BUILTIN
}

/// Look up a built-in template by id
#[must_use]
pub fn find_template(id: &str) -> Option<&'static AutoForkTemplate> {
    BUILTIN.iter().find(|t| t.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_ids_are_unique_and_complete() {
        let ids: HashSet<_> = builtin_templates().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), builtin_templates().len());
        for id in [
            "make_vegan",
            "make_vegetarian",
            "make_gluten_free",
            "make_dairy_free",
            "reduce_sugar",
            "make_healthier",
            "quick_version",
            "air_fryer",
        ] {
            assert!(ids.contains(id), "missing {id}");
        }
    }

    #[test]
    fn every_template_has_tags_and_modifications() {
        for t in builtin_templates() {
            assert!(!t.fork_tags.is_empty(), "{}", t.id);
            assert!(!t.modifications.is_empty(), "{}", t.id);
            assert!(!t.description.is_empty(), "{}", t.id);
        }
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(find_template("make_keto").is_none());
        assert_eq!(find_template("air_fryer").map(|t| t.name.as_str()), Some("Air Fryer"));
    }
}
