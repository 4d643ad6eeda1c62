use serde::{Deserialize, Serialize};

use crate::models::campaign::deserialize_id_flexible;

/// An approved WhatsApp message template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(deserialize_with = "deserialize_id_flexible")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, alias = "variableCount")]
    pub variable_count: usize,
}

impl Template {
    /// Substitutes `{{1}}`..`{{N}}` placeholders in the body with `values`.
    /// Substituted values are never scanned again, and placeholders without
    /// a value are left as they are.
    pub fn render(&self, values: &[String]) -> Option<String> {
        let body = self.body.as_deref()?;
        let mut out = String::with_capacity(body.len());
        let mut rest = body;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let value = after.find("}}").and_then(|end| {
                let n: usize = after[..end].trim().parse().ok()?;
                let value = values.get(n.checked_sub(1)?).filter(|_| n <= self.variable_count)?;
                Some((value, end))
            });
            match value {
                Some((value, end)) => {
                    out.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_positional_placeholders() {
        let template: Template = serde_json::from_value(json!({
            "id": 3,
            "name": "appointment_reminder",
            "body": "Hi {{1}}, your visit is on {{2}}.",
            "variableCount": 2
        }))
        .unwrap();

        assert_eq!(template.id, "3");
        let text = template
            .render(&["Ravi".to_string(), "Monday".to_string()])
            .unwrap();
        assert_eq!(text, "Hi Ravi, your visit is on Monday.");
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let template = Template {
            id: "4".to_string(),
            name: "follow_up".to_string(),
            language: None,
            category: None,
            body: Some("Hi {{1}}, see {{2}} and {{3}}".to_string()),
            variable_count: 2,
        };

        let text = template
            .render(&["{{2}}".to_string(), "Monday".to_string()])
            .unwrap();
        assert_eq!(text, "Hi {{2}}, see Monday and {{3}}");
    }
}
