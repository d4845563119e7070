//! Analysis prompt construction
//!
//! Asks the model for a JSON object in the shape the normalizer expects.

const CATEGORY_PLATFORM: &str = "tuchong";

const CATEGORIES: [&str; 12] = [
    "city scenery",
    "natural scenery",
    "wildlife",
    "still life and food",
    "pets",
    "business portrait",
    "lifestyle",
    "interior space",
    "biomedical",
    "sports and health",
    "holidays",
    "other",
];

/// Builds the instruction sent alongside the image
pub fn analysis_prompt(platform: &str, language: &str) -> String {
    let answer_in = match language {
        "zh" => "Simplified Chinese",
        "en" => "English",
        other => other,
    };

    let type_hint = if platform == CATEGORY_PLATFORM {
        format!("one of: {}", CATEGORIES.join(", "))
    } else {
        "landscape/portrait/animal/architecture/food/product/abstract/other".to_string()
    };

    format!(
        "Analyze this image and reply with a single JSON object only:\n\
         {{\n  \"image_type\": \"{type_hint}\",\n  \
         \"description\": \"concise description of subject, composition, color and light\",\n  \
         \"keywords\": [\"at least five keywords\"]\n}}\n\
         Write every value in {answer_in}."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_platform_lists_categories() {
        let prompt = analysis_prompt("tuchong", "zh");
        assert!(prompt.contains("natural scenery"));
        assert!(prompt.contains("Simplified Chinese"));
    }

    #[test]
    fn test_general_prompt() {
        let prompt = analysis_prompt("general", "en");
        assert!(prompt.contains("landscape/portrait"));
        assert!(prompt.contains("\"keywords\""));
        assert!(prompt.ends_with("Write every value in English."));
    }
}
