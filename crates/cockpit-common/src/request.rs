use serde_json::{Map, Value};

/// Canonical request shape handed to whichever backend is active.
///
/// Callers send several payload conventions (`{"input": ...}`,
/// `{"input": {"query": ...}}`, `{"question": ...}`, chat-style
/// `{"messages": [...]}`). They are folded into this one shape once, at the
/// gateway boundary, so no backend has to guess.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvocationRequest {
    /// The primary input of the call. `Null` when the caller sent none.
    pub input: Value,
    /// Every other field the caller sent, passed through untouched.
    pub context: Map<String, Value>,
}

impl InvocationRequest {
    pub fn new(input: impl Into<Value>) -> Self {
        Self {
            input: input.into(),
            context: Map::new(),
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Fold a raw caller payload into the canonical shape.
    pub fn normalize(payload: Value) -> Self {
        let mut fields = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => return Self::new(other),
        };

        if let Some(input) = fields.remove("input") {
            return match input {
                Value::Object(mut inner) => match take_text(&mut inner, &["query", "question"]) {
                    Some(text) => {
                        // top-level keys win over keys lifted from the nested object
                        for (key, value) in inner {
                            fields.entry(key).or_insert(value);
                        }
                        Self {
                            input: text,
                            context: fields,
                        }
                    }
                    None => Self {
                        input: Value::Object(inner),
                        context: fields,
                    },
                },
                other => Self {
                    input: other,
                    context: fields,
                },
            };
        }

        for key in ["question", "query"] {
            if let Some(value) = fields.remove(key) {
                return Self {
                    input: value,
                    context: fields,
                };
            }
        }

        let last_message = fields
            .get("messages")
            .and_then(Value::as_array)
            .and_then(|messages| messages.last())
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .map(|content| Value::String(content.to_string()));

        Self {
            input: last_message.unwrap_or(Value::Null),
            context: fields,
        }
    }

    /// Wire form: `{"input": <input>, ...context}`.
    pub fn to_payload(&self) -> Value {
        let mut map = self.context.clone();
        map.insert("input".to_string(), self.input.clone());
        Value::Object(map)
    }

    /// Human-readable rendering of `input`: strings verbatim, `null` as
    /// empty, anything else as compact JSON.
    pub fn input_text(&self) -> String {
        match &self.input {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

fn take_text(map: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let key = keys
        .iter()
        .find(|key| map.get(**key).is_some_and(Value::is_string))?;
    map.remove(*key)
}
