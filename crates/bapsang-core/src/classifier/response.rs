//! Normalization of generative-service responses into dish records.
//!
//! Models wrap their JSON in prose, code fences, or stray objects, so
//! extraction tries several shapes in order before giving up. Field
//! coercion is deliberately forgiving: each nutrient falls back to its
//! documented default independently, and an unknown category becomes
//! `main`. Everything here is pure and synchronous.

use serde_json::Value;

use bapsang_db::models::{Category, Dish};

use super::trait_def::{
    ClassifierError, DEFAULT_CALORIES, DEFAULT_CARBS, DEFAULT_CATEGORY, DEFAULT_FAT,
    DEFAULT_PROTEIN, DEFAULT_SODIUM,
};

// ---------------------------------------------------------------------------
// Payload extraction
// ---------------------------------------------------------------------------

/// Extract the contents of a ```json fenced block, if present.
fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Extract a single JSON object from free-form model output.
///
/// Tries, in order: a ```json fenced block, then the outermost brace pair.
pub fn extract_object(text: &str) -> Result<Value, ClassifierError> {
    if let Some(fenced) = fenced_json(text) {
        return Ok(serde_json::from_str(fenced)?);
    }

    let start = text.find('{').ok_or(ClassifierError::MissingJson)?;
    let end = text.rfind('}').ok_or(ClassifierError::MissingJson)?;
    if end < start {
        return Err(ClassifierError::MissingJson);
    }
    Ok(serde_json::from_str(&text[start..=end])?)
}

/// Extract a JSON array of objects from free-form model output.
///
/// Tries, in order: a ```json fenced block, the outermost bracket pair,
/// and finally every flat `{...}` run stitched into one array.
pub fn extract_array(text: &str) -> Result<Vec<Value>, ClassifierError> {
    if let Some(fenced) = fenced_json(text) {
        return as_object_array(serde_json::from_str(fenced)?);
    }

    if let (Some(start), Some(end)) = (text.find('['), text.rfind(']')) {
        if start < end {
            if let Ok(value) = serde_json::from_str::<Value>(&text[start..=end]) {
                return as_object_array(value);
            }
        }
    }

    // Last resort: collect every top-level brace-balanced run in the text.
    let objects = balanced_objects(text);
    if objects.is_empty() {
        return Err(ClassifierError::MissingJson);
    }
    objects
        .into_iter()
        .map(|s| serde_json::from_str::<Value>(s).map_err(ClassifierError::from))
        .collect()
}

fn as_object_array(value: Value) -> Result<Vec<Value>, ClassifierError> {
    match value {
        Value::Array(items) => Ok(items),
        // A single object where an array was expected still counts.
        obj @ Value::Object(_) => Ok(vec![obj]),
        _ => Err(ClassifierError::MissingJson),
    }
}

/// Find every top-level `{...}` run, balancing nested braces.
fn balanced_objects(text: &str) -> Vec<&str> {
    let mut found = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '{' => {
                if depth == 0 {
                    start = i;
                }
                depth += 1;
            }
            '}' => {
                if depth == 1 {
                    found.push(&text[start..=i]);
                }
                depth = depth.saturating_sub(1);
            }
            _ => {}
        }
    }
    found
}

// ---------------------------------------------------------------------------
// Field coercion
// ---------------------------------------------------------------------------

/// Coerce one nutrient field to a non-negative integer value, falling back
/// to `default` when the field is absent, non-numeric, or negative. Numeric
/// strings with thousands separators ("1,200") are accepted.
fn coerce_nutrient(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.replace(',', "").trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => v.trunc(),
        _ => default,
    }
}

/// Parse a category field, falling back to `main` on anything unknown.
fn coerce_category(value: Option<&Value>) -> Category {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Turn one parsed JSON object into a dish record.
///
/// `fallback_name` supplies the name when the object omits it (the single-
/// dish classification path always knows the name it asked about); invented
/// records must carry their own.
pub fn dish_from_value(value: &Value, fallback_name: Option<&str>) -> Result<Dish, ClassifierError> {
    let name = match value.get("name").and_then(Value::as_str) {
        Some(n) if !n.trim().is_empty() => n.trim().to_owned(),
        _ => fallback_name
            .map(str::to_owned)
            .ok_or(ClassifierError::MissingField("name"))?,
    };

    Ok(Dish {
        name,
        category: coerce_category(value.get("category")),
        calories: coerce_nutrient(value.get("calories"), DEFAULT_CALORIES),
        protein: coerce_nutrient(value.get("protein"), DEFAULT_PROTEIN),
        fat: coerce_nutrient(value.get("fat"), DEFAULT_FAT),
        carbs: coerce_nutrient(value.get("carbs"), DEFAULT_CARBS),
        sodium: coerce_nutrient(value.get("sodium"), DEFAULT_SODIUM),
    })
}

/// Parse a single-dish classification response.
pub fn parse_dish(text: &str, dish_name: &str) -> Result<Dish, ClassifierError> {
    let value = extract_object(text)?;
    dish_from_value(&value, Some(dish_name))
}

/// Parse an invented-dish-list response. Objects without a usable name are
/// skipped rather than failing the batch.
pub fn parse_dish_list(text: &str) -> Result<Vec<Dish>, ClassifierError> {
    let values = extract_array(text)?;
    Ok(values
        .iter()
        .filter_map(|v| dish_from_value(v, None).ok())
        .collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json_object() {
        let text = "Here you go:\n```json\n{\"name\": \"된장국\", \"category\": \"soup\", \
                    \"calories\": 150, \"protein\": 8, \"fat\": 5, \"carbs\": 12, \"sodium\": 900}\n```\nEnjoy!";
        let dish = parse_dish(text, "된장국").unwrap();
        assert_eq!(dish.category, Category::Soup);
        assert_eq!(dish.calories, 150.0);
        assert_eq!(dish.sodium, 900.0);
    }

    #[test]
    fn parses_bare_object_with_surrounding_prose() {
        let text = "The dish is classified as follows: {\"name\": \"제육볶음\", \
                    \"category\": \"main\", \"calories\": 450, \"protein\": 25, \
                    \"fat\": 22, \"carbs\": 30, \"sodium\": 1100} -- hope that helps.";
        let dish = parse_dish(text, "제육볶음").unwrap();
        assert_eq!(dish.category, Category::Main);
        assert_eq!(dish.calories, 450.0);
    }

    #[test]
    fn missing_json_is_an_error() {
        let err = parse_dish("I cannot classify that dish.", "x").unwrap_err();
        assert!(matches!(err, ClassifierError::MissingJson));
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_dish("{not json at all}", "x").unwrap_err();
        assert!(matches!(err, ClassifierError::MalformedJson(_)));
    }

    #[test]
    fn unknown_category_falls_back_to_main() {
        let text = "{\"name\": \"x\", \"category\": \"dessert\", \"calories\": 100, \
                    \"protein\": 1, \"fat\": 1, \"carbs\": 1, \"sodium\": 1}";
        let dish = parse_dish(text, "x").unwrap();
        assert_eq!(dish.category, Category::Main);
    }

    #[test]
    fn nutrient_fields_fall_back_independently() {
        // calories is a comma-grouped string, protein is garbage, fat is
        // negative, carbs is missing, sodium is fine.
        let text = "{\"name\": \"x\", \"category\": \"side\", \"calories\": \"1,200\", \
                    \"protein\": \"lots\", \"fat\": -3, \"sodium\": 700}";
        let dish = parse_dish(text, "x").unwrap();
        assert_eq!(dish.calories, 1200.0);
        assert_eq!(dish.protein, 10.0);
        assert_eq!(dish.fat, 5.0);
        assert_eq!(dish.carbs, 50.0);
        assert_eq!(dish.sodium, 700.0);
    }

    #[test]
    fn fractional_values_truncate_to_integers() {
        let text = "{\"name\": \"x\", \"category\": \"soup\", \"calories\": 150.9, \
                    \"protein\": 8.2, \"fat\": 5, \"carbs\": 12, \"sodium\": 900}";
        let dish = parse_dish(text, "x").unwrap();
        assert_eq!(dish.calories, 150.0);
        assert_eq!(dish.protein, 8.0);
    }

    #[test]
    fn missing_name_uses_fallback() {
        let text = "{\"category\": \"soup\", \"calories\": 150}";
        let dish = parse_dish(text, "미역국").unwrap();
        assert_eq!(dish.name, "미역국");
    }

    #[test]
    fn parses_fenced_array() {
        let text = "```json\n[{\"name\": \"a\", \"category\": \"soup\"}, \
                    {\"name\": \"b\", \"category\": \"side\"}]\n```";
        let dishes = parse_dish_list(text).unwrap();
        assert_eq!(dishes.len(), 2);
        assert_eq!(dishes[0].name, "a");
        assert_eq!(dishes[1].category, Category::Side);
    }

    #[test]
    fn parses_bare_array() {
        let text = "Sure: [{\"name\": \"a\", \"category\": \"main\"}] done";
        let dishes = parse_dish_list(text).unwrap();
        assert_eq!(dishes.len(), 1);
    }

    #[test]
    fn stitches_scattered_objects_into_a_list() {
        let text = "First: {\"name\": \"a\", \"category\": \"soup\"}\n\
                    Second: {\"name\": \"b\", \"category\": \"main\"}";
        let dishes = parse_dish_list(text).unwrap();
        assert_eq!(dishes.len(), 2);
    }

    #[test]
    fn single_object_counts_as_one_element_list() {
        let text = "```json\n{\"name\": \"solo\", \"category\": \"side\"}\n```";
        let dishes = parse_dish_list(text).unwrap();
        assert_eq!(dishes.len(), 1);
        assert_eq!(dishes[0].name, "solo");
    }

    #[test]
    fn list_entries_without_names_are_skipped() {
        let text = "[{\"category\": \"soup\"}, {\"name\": \"kept\", \"category\": \"side\"}]";
        let dishes = parse_dish_list(text).unwrap();
        assert_eq!(dishes.len(), 1);
        assert_eq!(dishes[0].name, "kept");
    }

    #[test]
    fn empty_text_has_no_list() {
        assert!(matches!(
            parse_dish_list("no structured data here"),
            Err(ClassifierError::MissingJson)
        ));
    }
}
