use serde::{Deserialize, Serialize};
use validator::Validate;

/// Prefilled values the form submits alongside the typed name and phone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefaults {
    pub city: String,
    pub customer_type: String,
    pub credit_limit: String,
    pub show_initial_credit: bool,
}

impl Default for FormDefaults {
    fn default() -> Self {
        Self {
            city: "Mianwali".to_string(),
            customer_type: "Permanent".to_string(),
            credit_limit: DEFAULT_CREDIT_LIMIT.to_string(),
            show_initial_credit: false,
        }
    }
}

pub const DEFAULT_CREDIT_LIMIT: f64 = 50000.0;

/// Payload handed to the external create operation once the guard passes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewCustomer {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub phone: String,
    pub city: String,
    #[serde(rename = "type")]
    pub customer_type: String,
    #[serde(rename = "creditLimit")]
    #[validate(range(min = 0.0))]
    pub credit_limit: f64,
    #[serde(rename = "initialCredit", skip_serializing_if = "Option::is_none", default)]
    #[validate(range(min = 0.0))]
    pub initial_credit: Option<f64>,
}

impl NewCustomer {
    /// Assemble the payload from raw form text.
    ///
    /// The credit limit is read from its leading number ("123abc" is 123); an empty,
    /// zero or unparseable value falls back to [`DEFAULT_CREDIT_LIMIT`].
    /// The initial credit is only sent when the form shows that field and it is non-empty.
    pub fn from_form(
        name: &str,
        phone: &str,
        defaults: &FormDefaults,
        initial_credit: Option<f64>,
    ) -> Self {
        let credit_limit = leading_number(&defaults.credit_limit)
            .filter(|v| v.is_finite() && *v != 0.0)
            .unwrap_or(DEFAULT_CREDIT_LIMIT);

        Self {
            name: name.trim().to_string(),
            phone: phone.trim().to_string(),
            city: defaults.city.trim().to_string(),
            customer_type: defaults.customer_type.clone(),
            credit_limit,
            initial_credit: if defaults.show_initial_credit { initial_credit } else { None },
        }
    }
}

/// Longest numeric prefix of `text`, ignoring leading whitespace
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let end = text
        .find(|c: char| !matches!(c, '0'..='9' | '.' | '+' | '-' | 'e' | 'E'))
        .unwrap_or(text.len());

    (1..=end).rev().find_map(|len| text[..len].parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_uses_prefilled_defaults() {
        let payload = NewCustomer::from_form("  Ahmed Raza ", " +923331112222 ", &FormDefaults::default(), None);

        assert_eq!(payload.name, "Ahmed Raza");
        assert_eq!(payload.phone, "+923331112222");
        assert_eq!(payload.city, "Mianwali");
        assert_eq!(payload.customer_type, "Permanent");
        assert_eq!(payload.credit_limit, 50000.0);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_bad_credit_limit_falls_back() {
        let defaults = FormDefaults {
            credit_limit: "lots".to_string(),
            ..FormDefaults::default()
        };
        let payload = NewCustomer::from_form("A", "+921234567", &defaults, None);
        assert_eq!(payload.credit_limit, DEFAULT_CREDIT_LIMIT);
    }

    #[test]
    fn test_credit_limit_reads_leading_number() {
        let limit = |text: &str| {
            let defaults = FormDefaults {
                credit_limit: text.to_string(),
                ..FormDefaults::default()
            };
            NewCustomer::from_form("A", "+921234567", &defaults, None).credit_limit
        };

        assert_eq!(limit("123abc"), 123.0);
        assert_eq!(limit(" 7500.5 PKR"), 7500.5);
        assert_eq!(limit("0"), DEFAULT_CREDIT_LIMIT);
        assert_eq!(limit(""), DEFAULT_CREDIT_LIMIT);
        assert_eq!(limit("-"), DEFAULT_CREDIT_LIMIT);
    }

    #[test]
    fn test_initial_credit_only_when_field_shown() {
        let hidden = NewCustomer::from_form("A", "+921234567", &FormDefaults::default(), Some(500.0));
        assert_eq!(hidden.initial_credit, None);

        let defaults = FormDefaults {
            show_initial_credit: true,
            ..FormDefaults::default()
        };
        let shown = NewCustomer::from_form("A", "+921234567", &defaults, Some(500.0));
        assert_eq!(shown.initial_credit, Some(500.0));

        let json = serde_json::to_value(&hidden).unwrap();
        assert!(json.get("initialCredit").is_none());
        assert_eq!(json["creditLimit"], 50000.0);
        assert_eq!(json["type"], "Permanent");
    }

    #[test]
    fn test_negative_initial_credit_fails_validation() {
        let defaults = FormDefaults {
            show_initial_credit: true,
            ..FormDefaults::default()
        };
        let payload = NewCustomer::from_form("A", "+921234567", &defaults, Some(-1.0));
        assert!(payload.validate().is_err());
    }
}
