/// Convert PascalCase to camelCase by lowercasing the first character.
pub fn pascal_to_camel_case(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let mut chars: Vec<char> = s.chars().collect();
    chars[0] = chars[0].to_lowercase().next().unwrap_or(chars[0]);
    chars.into_iter().collect()
}

/// Define an SSE event enum with its wire-format helpers.
///
/// The enum is internally tagged so every `data:` payload carries a `type`
/// discriminator, and variant names double as the `event:` line in camelCase.
/// Generated items:
/// - `event_name()` returning the camelCase event name
/// - `data()` serializing the whole event (including the `type` tag) to JSON
/// - `From<Enum> for axum::response::sse::Event`
///
/// If serialization fails the conversion degrades to a minimal terminal
/// `done`/`error` frame instead of dropping the event, so a client is never
/// left without a terminal signal.
#[macro_export]
macro_rules! sse_event_enum {
    (
        $(#[$attr:meta])*
        $vis:vis enum $enum_name:ident {
            $($variant:ident($data_type:ty)),+ $(,)?
        }
    ) => {
        $(#[$attr])*
        #[serde(tag = "type", rename_all = "camelCase")]
        $vis enum $enum_name {
            $($variant($data_type),)+
        }

        impl $enum_name {
            pub fn event_name(&self) -> &'static str {
                match self {
                    $(
                        Self::$variant(_) => {
                            static EVENT_NAME: std::sync::OnceLock<String> = std::sync::OnceLock::new();
                            EVENT_NAME.get_or_init(|| {
                                $crate::api::macros::pascal_to_camel_case(stringify!($variant))
                            })
                        },
                    )+
                }
            }

            pub fn data(&self) -> Result<String, serde_json::Error> {
                serde_json::to_string(self)
            }
        }

        impl From<$enum_name> for axum::response::sse::Event {
            fn from(event: $enum_name) -> Self {
                let name = event.event_name();
                match event.data() {
                    Ok(data) => axum::response::sse::Event::default().event(name).data(data),
                    Err(err) => {
                        tracing::error!(event = name, error = %err, "failed to serialize stream event payload");
                        axum::response::sse::Event::default().event("done").data(
                            r#"{"type":"done","status":"error","error":"Failed to serialize payload"}"#,
                        )
                    }
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    struct PingData {
        value: u32,
    }

    crate::sse_event_enum! {
        #[derive(Debug, Clone, Serialize)]
        enum TestEvent {
            Ping(PingData),
            DeepDive(PingData),
        }
    }

    #[test]
    fn converts_pascal_case_to_camel_case() {
        assert_eq!(pascal_to_camel_case("Start"), "start");
        assert_eq!(pascal_to_camel_case("DeepDive"), "deepDive");
        assert_eq!(pascal_to_camel_case(""), "");
    }

    #[test]
    fn event_name_matches_variant() {
        assert_eq!(TestEvent::Ping(PingData { value: 1 }).event_name(), "ping");
        assert_eq!(TestEvent::DeepDive(PingData { value: 1 }).event_name(), "deepDive");
    }

    #[test]
    fn data_includes_type_tag() {
        let event = TestEvent::Ping(PingData { value: 7 });
        let json: serde_json::Value = serde_json::from_str(&event.data().unwrap()).unwrap();
        assert_eq!(json["type"], "ping");
        assert_eq!(json["value"], 7);
    }
}
