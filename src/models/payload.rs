use serde::{Deserialize, Serialize};

/// Body of `POST /consultas`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct AppointmentRequest {
    #[serde(rename = "pacienteId")]
    pub patient_id: i64,
    #[serde(rename = "medicoId")]
    pub doctor_id: i64,
    #[serde(rename = "data")]
    pub date: String,
    #[serde(rename = "hora")]
    pub time: String,
    #[serde(rename = "valor")]
    pub amount: f64,
}

impl Default for AppointmentRequest {
    fn default() -> Self {
        Self {
            patient_id: 7,
            doctor_id: 6,
            date: "2025-12-12".to_string(),
            time: "14:00".to_string(),
            amount: 150.00,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn default_payload_uses_wire_names() {
        let value = serde_json::to_value(AppointmentRequest::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "pacienteId": 7,
                "medicoId": 6,
                "data": "2025-12-12",
                "hora": "14:00",
                "valor": 150.0
            })
        );
    }

    #[test]
    fn payload_is_identical_every_time() {
        let first = serde_json::to_vec(&AppointmentRequest::default()).unwrap();
        for _ in 0..100 {
            assert_eq!(serde_json::to_vec(&AppointmentRequest::default()).unwrap(), first);
        }
    }

    #[test]
    fn payload_parses_back_from_wire_json() {
        let raw = r#"{"pacienteId":7,"medicoId":6,"data":"2025-12-12","hora":"14:00","valor":150.00}"#;
        let parsed: AppointmentRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed, AppointmentRequest::default());
        let value: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(value["valor"].as_f64(), Some(150.0));
    }
}
