//! Declarative shape validation for form input and LLM output.
//!
//! A `Shape` declares named fields with a kind (number with bounds, text,
//! enum, nested object, text array) and a required flag. `validate` checks a
//! JSON value against a shape and returns either the coerced object or the
//! full list of field-level violations. Numeric-looking strings coerce to
//! numbers; nothing else is coerced. No side effects.

use serde::Serialize;
use serde_json::{Map, Value};

/// What a single declared field accepts.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// JSON number, or a string that parses as one. Bounds are inclusive.
    Number { min: Option<f64>, max: Option<f64> },
    Text,
    Enum(&'static [&'static str]),
    Object(Shape),
    TextArray,
}

/// One declared field of a shape.
#[derive(Debug, Clone)]
pub struct FieldShape {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

/// An ordered set of declared fields. Undeclared fields pass through.
#[derive(Debug, Clone)]
pub struct Shape {
    pub fields: Vec<FieldShape>,
}

/// A single field-level violation, identifying the field and the constraint
/// it failed. Nested fields use dotted paths (`doctorReference.name`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub field: String,
    pub constraint: Constraint,
}

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Constraint {
    #[error("is required")]
    Required,
    #[error("must be a number")]
    NotANumber,
    #[error("must be at least {min}")]
    BelowMin { min: f64 },
    #[error("must be at most {max}")]
    AboveMax { max: f64 },
    #[error("must be one of: {options}")]
    NotInEnum { options: String },
    #[error("has the wrong type, expected {expected}")]
    WrongType { expected: &'static str },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.constraint)
    }
}

/// Input failed its declared shape. Carries every violation so the caller
/// can surface them inline per field.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("validation failed on {} field(s)", .0.len())]
pub struct ValidationError(pub Vec<Violation>);

impl ValidationError {
    /// Does any violation name this field (exactly or as a nested path)?
    pub fn mentions(&self, field: &str) -> bool {
        self.0
            .iter()
            .any(|v| v.field == field || v.field.starts_with(&format!("{field}.")))
    }
}

/// Validate `value` against `shape`, returning the coerced object.
pub fn validate(shape: &Shape, value: &Value) -> Result<Value, ValidationError> {
    let mut violations = Vec::new();
    let coerced = validate_object(shape, value, "", &mut violations);
    if violations.is_empty() {
        Ok(coerced)
    } else {
        Err(ValidationError(violations))
    }
}

fn validate_object(
    shape: &Shape,
    value: &Value,
    prefix: &str,
    violations: &mut Vec<Violation>,
) -> Value {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => {
            violations.push(Violation {
                field: path(prefix, "$"),
                constraint: Constraint::WrongType { expected: "object" },
            });
            return Value::Null;
        }
    };

    let mut out = Map::new();
    for field in &shape.fields {
        let field_path = path(prefix, field.name);
        match obj.get(field.name) {
            None | Some(Value::Null) => {
                if field.required {
                    violations.push(Violation {
                        field: field_path,
                        constraint: Constraint::Required,
                    });
                }
            }
            Some(raw) => {
                if let Some(coerced) = validate_field(&field.kind, raw, &field_path, violations) {
                    out.insert(field.name.to_string(), coerced);
                }
            }
        }
    }

    // Undeclared fields pass through untouched.
    for (name, raw) in obj {
        if !shape.fields.iter().any(|f| f.name == name) {
            out.insert(name.clone(), raw.clone());
        }
    }

    Value::Object(out)
}

fn validate_field(
    kind: &FieldKind,
    raw: &Value,
    field_path: &str,
    violations: &mut Vec<Violation>,
) -> Option<Value> {
    match kind {
        FieldKind::Number { min, max } => {
            let parsed = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            let num = match parsed {
                Some(n) if n.is_finite() => n,
                _ => {
                    violations.push(Violation {
                        field: field_path.to_string(),
                        constraint: Constraint::NotANumber,
                    });
                    return None;
                }
            };
            if let Some(min) = min {
                if num < *min {
                    violations.push(Violation {
                        field: field_path.to_string(),
                        constraint: Constraint::BelowMin { min: *min },
                    });
                    return None;
                }
            }
            if let Some(max) = max {
                if num > *max {
                    violations.push(Violation {
                        field: field_path.to_string(),
                        constraint: Constraint::AboveMax { max: *max },
                    });
                    return None;
                }
            }
            Some(coerce_number(num))
        }
        FieldKind::Text => match raw {
            Value::String(s) => Some(Value::String(s.clone())),
            _ => {
                violations.push(Violation {
                    field: field_path.to_string(),
                    constraint: Constraint::WrongType { expected: "string" },
                });
                None
            }
        },
        FieldKind::Enum(options) => match raw.as_str() {
            Some(s) if options.contains(&s) => Some(Value::String(s.to_string())),
            _ => {
                violations.push(Violation {
                    field: field_path.to_string(),
                    constraint: Constraint::NotInEnum {
                        options: options.join(", "),
                    },
                });
                None
            }
        },
        FieldKind::Object(inner) => {
            let before = violations.len();
            let coerced = validate_object(inner, raw, field_path, violations);
            (violations.len() == before).then_some(coerced)
        }
        FieldKind::TextArray => match raw {
            Value::Array(items) => {
                let mut ok = true;
                for (i, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        violations.push(Violation {
                            field: format!("{field_path}[{i}]"),
                            constraint: Constraint::WrongType { expected: "string" },
                        });
                        ok = false;
                    }
                }
                ok.then(|| raw.clone())
            }
            _ => {
                violations.push(Violation {
                    field: field_path.to_string(),
                    constraint: Constraint::WrongType { expected: "array of strings" },
                });
                None
            }
        },
    }
}

/// Integral values stay integers on the wire; 80 must not become 80.0.
fn coerce_number(num: f64) -> Value {
    if num.fract() == 0.0 && num.abs() < i64::MAX as f64 {
        Value::Number((num as i64).into())
    } else {
        serde_json::Number::from_f64(num)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

// ═══════════════════════════════════════════
// Declared shapes
// ═══════════════════════════════════════════

fn number(name: &'static str, min: f64, max: f64) -> FieldShape {
    FieldShape {
        name,
        kind: FieldKind::Number { min: Some(min), max: Some(max) },
        required: true,
    }
}

fn text(name: &'static str, required: bool) -> FieldShape {
    FieldShape { name, kind: FieldKind::Text, required }
}

/// Prediction form input: the six health metric fields.
pub fn health_metrics_shape() -> Shape {
    Shape {
        fields: vec![
            number("heartRate", 30.0, 220.0),
            FieldShape {
                name: "steps",
                kind: FieldKind::Number { min: Some(0.0), max: None },
                required: true,
            },
            FieldShape {
                name: "calories",
                kind: FieldKind::Number { min: Some(0.0), max: None },
                required: true,
            },
            number("age", 1.0, 120.0),
            FieldShape {
                name: "gender",
                kind: FieldKind::Enum(&["male", "female", "other"]),
                required: true,
            },
            text("existingConditions", false),
        ],
    }
}

/// What the prediction flow requires of the model's output.
pub fn prediction_output_shape() -> Shape {
    Shape {
        fields: vec![
            text("prediction", true),
            text("suggestedMedication", true),
            FieldShape {
                name: "doctorReference",
                kind: FieldKind::Object(Shape {
                    fields: vec![
                        text("name", true),
                        text("specialization", true),
                        text("contact", true),
                    ],
                }),
                required: true,
            },
        ],
    }
}

/// What the chat flow requires of the model's output.
pub fn chat_output_shape() -> Shape {
    Shape {
        fields: vec![
            text("response", true),
            FieldShape {
                name: "suggestions",
                kind: FieldKind::TextArray,
                required: false,
            },
        ],
    }
}
