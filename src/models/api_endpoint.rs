use crate::error::LoadError;
use crate::models::payload::AppointmentRequest;
use handlebars::Handlebars;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};

const BODY_TEMPLATE: &str = "body";

/// Where the request body of each iteration comes from.
#[derive(Clone, Debug)]
pub enum PayloadSource {
    /// The same appointment on every call.
    Fixed(AppointmentRequest),
    /// Handlebars template rendered with `vu` and `iteration`.
    Template(String),
}

impl Default for PayloadSource {
    fn default() -> Self {
        PayloadSource::Fixed(AppointmentRequest::default())
    }
}

/// The scheduling endpoint every virtual user posts to.
#[derive(Clone, Debug)]
pub struct ScheduleEndpoint {
    pub name: String,
    pub url: String,
    pub payload: PayloadSource,
    headers: HeaderMap,
    templates: Handlebars<'static>,
}

impl ScheduleEndpoint {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        token: &str,
        payload: PayloadSource,
    ) -> Result<Self, LoadError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", token)).map_err(|e| LoadError::Header {
                name: AUTHORIZATION.to_string(),
                reason: e.to_string(),
            })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);
        let mut templates = Handlebars::new();
        templates.register_escape_fn(handlebars::no_escape);
        if let PayloadSource::Template(template) = &payload {
            templates.register_template_string(BODY_TEMPLATE, template)?;
        }
        let endpoint = Self {
            name: name.into(),
            url: url.into(),
            payload,
            headers,
            templates,
        };
        // reject a broken template before any request goes out
        endpoint.render_body(0, 0)?;
        Ok(endpoint)
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    /// Serialized JSON body for one iteration.
    pub fn render_body(&self, vu: usize, iteration: u64) -> Result<Vec<u8>, LoadError> {
        match &self.payload {
            PayloadSource::Fixed(request) => Ok(serde_json::to_vec(request)?),
            PayloadSource::Template(_) => {
                let rendered = self
                    .templates
                    .render(BODY_TEMPLATE, &json!({ "vu": vu, "iteration": iteration }))?;
                let value: Value = serde_json::from_str(&rendered)?;
                Ok(serde_json::to_vec(&value)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_carry_json_and_bearer() {
        let endpoint = ScheduleEndpoint::new(
            "consultas",
            "http://localhost:8080/consultas",
            "abc.def.ghi",
            PayloadSource::default(),
        )
        .unwrap();
        let headers = endpoint.headers();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc.def.ghi");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let res = ScheduleEndpoint::new("c", "http://x", "bad\ntoken", PayloadSource::default());
        assert!(matches!(res, Err(LoadError::Header { .. })));
    }

    #[test]
    fn template_renders_per_vu_and_iteration() {
        let template = r#"{"pacienteId": {{vu}}, "medicoId": 6, "data": "2025-12-12", "hora": "14:{{iteration}}", "valor": 150.0}"#;
        let endpoint =
            ScheduleEndpoint::new("c", "http://x", "t", PayloadSource::Template(template.into()))
                .unwrap();
        let body: Value = serde_json::from_slice(&endpoint.render_body(3, 15).unwrap()).unwrap();
        assert_eq!(body["pacienteId"], 3);
        assert_eq!(body["hora"], "14:15");
    }

    #[test]
    fn template_that_is_not_json_fails_at_construction() {
        let res = ScheduleEndpoint::new(
            "c",
            "http://x",
            "t",
            PayloadSource::Template("not json {{vu}}".into()),
        );
        assert!(matches!(res, Err(LoadError::Payload(_))));
    }

    #[test]
    fn unclosed_template_fails_at_construction() {
        let res = ScheduleEndpoint::new(
            "c",
            "http://x",
            "t",
            PayloadSource::Template("{\"a\": {{#if vu}}1}".into()),
        );
        assert!(matches!(res, Err(LoadError::TemplateSyntax(_))));
    }

    #[test]
    fn template_is_compiled_once_and_reused() {
        let template = r#"{"pacienteId": {{vu}}, "medicoId": 6}"#;
        let endpoint =
            ScheduleEndpoint::new("c", "http://x", "t", PayloadSource::Template(template.into()))
                .unwrap();
        assert!(endpoint.templates.has_template(BODY_TEMPLATE));
        for vu in 0..3 {
            let body: Value =
                serde_json::from_slice(&endpoint.render_body(vu, 0).unwrap()).unwrap();
            assert_eq!(body["pacienteId"], vu);
        }
        let fixed = ScheduleEndpoint::new("c", "http://x", "t", PayloadSource::default()).unwrap();
        assert!(!fixed.templates.has_template(BODY_TEMPLATE));
    }
}
