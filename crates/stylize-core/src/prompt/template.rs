//! Composition of the image-generation prompt from extracted features.

use super::features::ExtractedFeatures;

const SOUTH_PARK_LEAD: &str = "A South Park cartoon style character. Thick black outlines, \
                               flat colors, simple geometric shapes, construction paper cutout \
                               style, dot eyes.";

const CLOSING: &str = " Simple background, white space.";

/// Lead sentence for a style.
///
/// Styles without a dedicated descriptor get a generic flat-cartoon lead.
fn style_lead(style: &str) -> String {
    let style = style.trim();
    if style.to_ascii_lowercase().contains("south park") {
        SOUTH_PARK_LEAD.to_string()
    } else {
        format!("A {style} character. Bold outlines, flat colors, simplified shapes.")
    }
}

/// Build the generation prompt.
///
/// Each non-empty feature adds one sentence; a missing or `neutral`
/// expression becomes an explicit neutral one. An edit instruction, if any,
/// goes right before the closing background clause.
pub fn compose_prompt(
    style: &str,
    features: &ExtractedFeatures,
    instruction: Option<&str>,
) -> String {
    let mut prompt = style_lead(style);

    if !features.hair_color.is_empty() {
        prompt.push_str(&format!(" The character has {} hair.", features.hair_color));
    }
    if !features.clothing_description.is_empty() {
        prompt.push_str(&format!(" Wearing a {}.", features.clothing_description));
    }
    if !features.accessory.is_empty() {
        prompt.push_str(&format!(" With a {}.", features.accessory));
    }
    let expression = features.expression.as_str();
    if !expression.is_empty() && !expression.eq_ignore_ascii_case("neutral") {
        prompt.push_str(&format!(" Showing a simple, {expression} expression."));
    } else {
        prompt.push_str(" With a neutral expression.");
    }

    if let Some(instruction) = instruction.map(str::trim).filter(|i| !i.is_empty()) {
        prompt.push(' ');
        prompt.push_str(instruction);
        if !instruction.ends_with(['.', '!', '?']) {
            prompt.push('.');
        }
    }

    prompt.push_str(CLOSING);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(
        hair: &str,
        clothing: &str,
        accessory: &str,
        expression: &str,
    ) -> ExtractedFeatures {
        ExtractedFeatures {
            hair_color: hair.to_string(),
            clothing_description: clothing.to_string(),
            accessory: accessory.to_string(),
            expression: expression.to_string(),
        }
    }

    #[test]
    fn test_full_south_park_prompt() {
        let prompt = compose_prompt(
            "South Park cartoon style",
            &features("green", "white sleeveless top", "green necklace", "serious"),
            None,
        );
        assert_eq!(
            prompt,
            "A South Park cartoon style character. Thick black outlines, flat colors, simple \
             geometric shapes, construction paper cutout style, dot eyes. The character has \
             green hair. Wearing a white sleeveless top. With a green necklace. Showing a \
             simple, serious expression. Simple background, white space."
        );
    }

    #[test]
    fn test_empty_features_fall_back_to_neutral() {
        let prompt = compose_prompt("south park", &ExtractedFeatures::default(), None);
        assert!(prompt.starts_with("A South Park cartoon style character."));
        assert!(!prompt.contains("hair"));
        assert!(!prompt.contains("Wearing"));
        assert!(prompt.ends_with("With a neutral expression. Simple background, white space."));
    }

    #[test]
    fn test_neutral_expression_not_repeated() {
        let prompt = compose_prompt("South Park", &features("", "", "", "Neutral"), None);
        assert!(prompt.contains("With a neutral expression."));
        assert!(!prompt.contains("Showing a simple"));
    }

    #[test]
    fn test_generic_style_lead() {
        let prompt = compose_prompt("Simpsons", &features("blue", "", "", "smiling"), None);
        assert!(prompt.starts_with("A Simpsons character. Bold outlines"));
        assert!(prompt.contains("The character has blue hair."));
        assert!(prompt.contains("Showing a simple, smiling expression."));
    }

    #[test]
    fn test_instruction_inserted_before_closing() {
        let prompt = compose_prompt(
            "South Park",
            &features("", "", "", ""),
            Some("  Add a Binance (BNB) logo on the shirt "),
        );
        assert!(prompt.ends_with(
            "Add a Binance (BNB) logo on the shirt. Simple background, white space."
        ));
    }

    #[test]
    fn test_blank_instruction_ignored() {
        let with = compose_prompt("South Park", &ExtractedFeatures::default(), Some("   "));
        let without = compose_prompt("South Park", &ExtractedFeatures::default(), None);
        assert_eq!(with, without);
    }
}
