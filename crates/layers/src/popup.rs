use foundation::{NumberFormat, NumberLocale};
use formats::Feature;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric display options for one field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFormat {
    pub places: u32,
    #[serde(default)]
    pub digit_separator: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldInfo {
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FieldFormat>,
}

/// Title and content text with `{field}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupTemplate {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_infos: Vec<FieldInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPopup {
    pub title: String,
    pub content: String,
}

impl PopupTemplate {
    pub fn render(&self, feature: &Feature, locale: &NumberLocale) -> RenderedPopup {
        RenderedPopup {
            title: self.expand(&self.title, feature, locale),
            content: self.expand(&self.content, feature, locale),
        }
    }

    fn field_format(&self, field: &str) -> Option<FieldFormat> {
        self.field_infos
            .iter()
            .find(|info| info.field_name == field)
            .and_then(|info| info.format)
    }

    fn field_text(&self, field: &str, feature: &Feature, locale: &NumberLocale) -> String {
        let Some(value) = feature.attribute(field) else {
            return String::new();
        };
        match (value, self.field_format(field)) {
            (Value::Null, _) => String::new(),
            (Value::String(s), None) => s.clone(),
            (_, Some(fmt)) => match feature.numeric(field) {
                Some(n) => locale.format_with(
                    n,
                    NumberFormat::fixed(fmt.places, fmt.digit_separator),
                ),
                None => plain_text(value),
            },
            (other, None) => plain_text(other),
        }
    }

    fn expand(&self, text: &str, feature: &Feature, locale: &NumberLocale) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let Some(close) = after.find('}') else {
                // Unterminated placeholder: keep the remainder as-is.
                out.push_str(&rest[open..]);
                return out;
            };
            let field = after[..close].trim();
            out.push_str(&self.field_text(field, feature, locale));
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        out
    }
}

fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldFormat, FieldInfo, PopupTemplate};
    use foundation::NumberLocale;
    use formats::{Feature, Geometry, Position};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn template() -> PopupTemplate {
        PopupTemplate {
            title: "{nom_mun}, {nom_ent}".to_string(),
            content: "Population: {pobtot}".to_string(),
            field_infos: vec![FieldInfo {
                field_name: "pobtot".to_string(),
                format: Some(FieldFormat {
                    places: 0,
                    digit_separator: true,
                }),
            }],
        }
    }

    fn feature(attrs: serde_json::Value) -> Feature {
        Feature {
            id: None,
            attributes: attrs.as_object().cloned().unwrap_or_default(),
            geometry: Geometry::Point(Position::new(0.0, 0.0)),
        }
    }

    #[test]
    fn renders_title_and_formatted_content() {
        let f = feature(json!({"nom_mun": "León", "nom_ent": "Guanajuato", "pobtot": 1721215}));
        let popup = template().render(&f, &NumberLocale::en_us());
        assert_eq!(popup.title, "León, Guanajuato");
        assert_eq!(popup.content, "Population: 1,721,215");

        let small = feature(json!({"pobtot": 1234}));
        let popup = template().render(&small, &NumberLocale::en_us());
        assert_eq!(popup.content, "Population: 1,234");
    }

    #[test]
    fn missing_and_null_fields_render_empty() {
        let f = feature(json!({"nom_mun": "Tepetlixpa", "pobtot": null}));
        let popup = template().render(&f, &NumberLocale::en_us());
        assert_eq!(popup.title, "Tepetlixpa, ");
        assert_eq!(popup.content, "Population: ");
    }

    #[test]
    fn unformatted_numbers_and_unterminated_braces() {
        let t = PopupTemplate {
            title: "{code} {broken".to_string(),
            content: "no placeholders".to_string(),
            field_infos: Vec::new(),
        };
        let f = feature(json!({"code": 2004}));
        let popup = t.render(&f, &NumberLocale::en_us());
        assert_eq!(popup.title, "2004 {broken");
        assert_eq!(popup.content, "no placeholders");
    }
}
