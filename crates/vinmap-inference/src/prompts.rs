//! Prompt templates for the enrichment pipeline.

use vinmap_core::Country;

use crate::pipeline::LabelExtraction;

/// Words in a wine name that fix its type, by target type.
pub(crate) const WHITE_WORDS: &[&str] = &["blanc", "bianco", "blanco", "branco", "weiss", "white", "화이트", "블랑"];
pub(crate) const RED_WORDS: &[&str] = &["rouge", "rosso", "tinto", "rot", "red", "레드", "루즈"];
pub(crate) const ROSE_WORDS: &[&str] = &["rosé", "rose", "rosato", "rosado", "로제"];

const OUTPUT_SCHEMA: &str = r#"{
  "name": "full wine name including vintage",
  "winery": "winery name only",
  "wineryInfo": "short description of the winery (2-3 sentences)",
  "country": "one of the country codes below, lower case",
  "wineType": "Red, White, Rosé, Sparkling or Natural",
  "sweetness": integer 1-5 (1 = dry, 5 = sweet),
  "acidity": integer 1-5,
  "body": integer 1-5 (1 = light, 5 = full),
  "description": "aroma, palate and character (3-4 sentences)"
}"#;

fn type_word_rules() -> String {
    format!(
        "If the wine name contains any of these words, wineType is fixed regardless of anything else:\n\
         - White: {}\n\
         - Red: {}\n\
         - Rosé: {}",
        WHITE_WORDS.join(", "),
        RED_WORDS.join(", "),
        ROSE_WORDS.join(", ")
    )
}

/// Step A: read only what is printed on the label.
pub fn label_extraction_prompt(wine_name: Option<&str>) -> String {
    let hint = match wine_name {
        Some(name) => format!(
            "The operator says this bottle is \"{}\". Use that only to help you read the label.\n\n",
            name
        ),
        None => String::new(),
    };

    format!(
        "{hint}Read the text visible on this wine bottle label and return ONLY a JSON object \
         with exactly these fields:\n\
         {{\n  \"wineName\": string or null,\n  \"winery\": string or null,\n  \
         \"vintage\": string or null,\n  \"wineType\": string or null,\n  \
         \"region\": string or null,\n  \"grapeVariety\": string or null,\n  \
         \"otherText\": string or null\n}}\n\n\
         Do not guess. If a value is not legible on the label, use null. \
         Respond with the JSON object only."
    )
}

/// Inputs to the detail synthesis prompt.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisPrompt<'a> {
    pub label: Option<&'a LabelExtraction>,
    pub wine_name: Option<&'a str>,
    pub reviews: Option<&'a str>,
    pub output_language: &'a str,
}

/// Step B (or the single-shot call): produce the full description.
pub fn detail_synthesis_prompt(input: SynthesisPrompt<'_>) -> String {
    let mut prompt = String::from(
        "You are a sommelier writing catalog entries for a wine shop.\n\n",
    );

    match input.wine_name {
        Some(name) => {
            prompt.push_str(&format!("Wine name (authoritative): \"{}\"\n", name));
        }
        None => prompt.push_str(
            "No wine name was given. Identify the wine from the label and what you know of it.\n",
        ),
    }

    if let Some(label) = input.label {
        let label_json = serde_json::to_string_pretty(label).unwrap_or_default();
        prompt.push_str(&format!("Text read from the label:\n{}\n", label_json));
    }

    if let Some(reviews) = input.reviews {
        prompt.push_str(&format!("Customer reviews: \"{}\"\n", reviews));
    }

    prompt.push_str("\nRules:\n");
    if input.wine_name.is_some() {
        prompt.push_str(
            "- The wine name above is authoritative. If the label or image suggests a \
             different type, follow the name.\n\
             - Every field must be filled in. Do not return null.\n",
        );
    } else {
        prompt.push_str(
            "- Use null only for a field you are confidently unable to determine.\n",
        );
    }
    prompt.push_str(&format!("- {}\n", type_word_rules()));
    prompt.push_str(&format!(
        "- country must be one of: {}\n\
         - sweetness, acidity and body are integers from 1 to 5.\n\
         - Write wineryInfo and description in {}.\n\n",
        Country::code_list(),
        input.output_language
    ));

    prompt.push_str("Return ONLY this JSON object:\n");
    prompt.push_str(OUTPUT_SCHEMA);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_prompt_forbids_guessing() {
        let prompt = label_extraction_prompt(None);
        assert!(prompt.contains("\"grapeVariety\""));
        assert!(prompt.contains("Do not guess"));
        assert!(!prompt.contains("operator says"));
    }

    #[test]
    fn test_label_prompt_with_name_hint() {
        let prompt = label_extraction_prompt(Some("Sassicaia 2019"));
        assert!(prompt.contains("\"Sassicaia 2019\""));
    }

    #[test]
    fn test_synthesis_prompt_name_anchored() {
        let prompt = detail_synthesis_prompt(SynthesisPrompt {
            label: None,
            wine_name: Some("Chablis Blanc"),
            reviews: Some("crisp"),
            output_language: "Korean",
        });
        assert!(prompt.contains("authoritative"));
        assert!(prompt.contains("Do not return null"));
        assert!(prompt.contains("Customer reviews: \"crisp\""));
        assert!(prompt.contains("southafrica"));
        assert!(prompt.contains("in Korean"));
        assert!(prompt.contains("weiss"));
    }

    #[test]
    fn test_synthesis_prompt_discovery_embeds_label() {
        let label = LabelExtraction {
            wine_name: Some("Tignanello".to_string()),
            vintage: Some("2018".to_string()),
            ..Default::default()
        };
        let prompt = detail_synthesis_prompt(SynthesisPrompt {
            label: Some(&label),
            wine_name: None,
            reviews: None,
            output_language: "English",
        });
        assert!(prompt.contains("Tignanello"));
        assert!(prompt.contains("null only"));
        assert!(!prompt.contains("Customer reviews"));
    }
}
