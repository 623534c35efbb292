use chrono::{DateTime, Utc};
use foundation::PartId;
use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::facility::Facility;
use crate::validate;

/// A user-submitted annotation pinned to a part at a facility-local point.
///
/// Issues are immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(alias = "_id")]
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub facility: Facility,
    pub author: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub part_id: PartId,
}

impl Issue {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Body of an issue creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    pub part_id: PartId,
    pub author: String,
    pub text: String,
    #[serde(default)]
    pub img: Option<String>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl NewIssue {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate::author(&self.author)?;
        validate::text(&self.text)?;
        if let Some(img) = &self.img {
            validate::img(img)?;
        }
        validate::coordinate("x", self.x)?;
        validate::coordinate("y", self.y)?;
        validate::coordinate("z", self.z)?;
        Ok(())
    }

    /// Stamps identity and creation time. Does not validate.
    pub fn into_issue(self, facility: Facility, created_at: DateTime<Utc>) -> Issue {
        Issue {
            id: uuid::Uuid::new_v4().to_string(),
            created_at,
            facility,
            author: self.author,
            text: self.text,
            img: self.img,
            x: self.x,
            y: self.y,
            z: self.z,
            part_id: self.part_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> NewIssue {
        NewIssue {
            part_id: PartId(4021),
            author: "Jane Doe".into(),
            text: "Pipe leaking near valve.".into(),
            img: None,
            x: 1.5,
            y: -2.0,
            z: 10.25,
        }
    }

    #[test]
    fn request_body_uses_camel_case() {
        let body = r#"{"partId":7,"author":"Al","text":"Hi","x":1,"y":2,"z":3}"#;
        let parsed: NewIssue = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.part_id, PartId(7));
        assert_eq!(parsed.img, None);
    }

    #[test]
    fn validate_reports_first_failing_field() {
        let mut bad = sample();
        bad.author = "John5".into();
        assert_eq!(bad.validate(), Err(ValidationError::Author));

        let mut bad = sample();
        bad.img = Some("nope".into());
        assert_eq!(bad.validate(), Err(ValidationError::Img));

        let mut bad = sample();
        bad.z = f64::INFINITY;
        assert_eq!(bad.validate(), Err(ValidationError::Coordinate { axis: "z" }));
    }

    #[test]
    fn into_issue_keeps_fields_and_assigns_id() {
        let now = Utc::now();
        let issue = sample().into_issue(Facility::El, now);
        assert!(!issue.id.is_empty());
        assert_eq!(issue.created_at, now);
        assert_eq!(issue.facility, Facility::El);
        assert_eq!(issue.position(), Vec3::new(1.5, -2.0, 10.25));
        assert_eq!(issue.part_id, PartId(4021));
    }

    #[test]
    fn stored_documents_with_legacy_id_field_deserialize() {
        let doc = r#"{
            "_id": "5c1a2b",
            "createdAt": "2019-01-02T03:04:05Z",
            "facility": "montreal",
            "author": "Bob",
            "text": "Noise",
            "x": 0.0, "y": 1.0, "z": 2.0,
            "partId": 12
        }"#;
        let issue: Issue = serde_json::from_str(doc).unwrap();
        assert_eq!(issue.id, "5c1a2b");
        assert_eq!(issue.facility, Facility::Montreal);
        assert_eq!(issue.part_id, PartId(12));

        let out = serde_json::to_value(&issue).unwrap();
        assert_eq!(out["id"], "5c1a2b");
        assert_eq!(out["createdAt"], "2019-01-02T03:04:05Z");
        assert!(out.get("img").is_none());
    }
}
