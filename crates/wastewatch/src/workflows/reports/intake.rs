//! Multipart form decoding for `POST /api/reports`.
//!
//! Fields arrive individually; `location` is a JSON document and `image` is the file part.

use std::collections::HashMap;

use axum::extract::multipart::{Field, Multipart, MultipartError};

use super::domain::{GeoLocation, IntakeError, PhotoRef, ReportSubmission, Reporter, WasteType};

pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Default)]
pub struct SubmissionForm {
    fields: HashMap<String, String>,
    photo: Option<PhotoRef>,
}

impl SubmissionForm {
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_photo(mut self, photo: PhotoRef) -> Self {
        self.photo = Some(photo);
        self
    }

    pub async fn read(mut multipart: Multipart) -> Result<Self, IntakeError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(form_error)? {
            let name = field.name().unwrap_or_default().to_string();
            if name == IMAGE_FIELD {
                form.photo = read_photo(field).await?;
            } else if !name.is_empty() {
                let value = field.text().await.map_err(form_error)?;
                form.fields.insert(name, value);
            }
        }
        Ok(form)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<&str, IntakeError> {
        self.text(name).ok_or(IntakeError::MissingField(name))
    }

    fn number(&self, name: &'static str) -> Result<Option<f32>, IntakeError> {
        self.text(name)
            .map(|raw| {
                raw.parse::<f32>().map_err(|err| IntakeError::InvalidField {
                    field: name,
                    reason: err.to_string(),
                })
            })
            .transpose()
    }

    pub fn into_submission(self) -> Result<ReportSubmission, IntakeError> {
        let waste_label = self.required("wasteType")?;
        let waste_type =
            WasteType::from_label(waste_label).ok_or_else(|| IntakeError::InvalidField {
                field: "wasteType",
                reason: format!("unknown waste type '{waste_label}'"),
            })?;

        let location: GeoLocation = serde_json::from_str(self.required("location")?)
            .map_err(|err| IntakeError::InvalidField {
                field: "location",
                reason: err.to_string(),
            })?;

        let submission = ReportSubmission {
            reporter: Reporter {
                name: self.required("name")?.to_string(),
                phone: self.required("phone")?.to_string(),
            },
            location,
            waste_type,
            severity: self
                .number("severity")?
                .ok_or(IntakeError::MissingField("severity"))?,
            // Classification confidence comes from an external model and may be absent.
            confidence: self.number("confidence")?.unwrap_or(0.0),
            description: self.text("description").map(str::to_string),
            photo: self.photo,
        };
        submission.validate()?;
        Ok(submission)
    }
}

async fn read_photo(field: Field<'_>) -> Result<Option<PhotoRef>, IntakeError> {
    let file_name = field
        .file_name()
        .map(str::to_string)
        .unwrap_or_else(|| "upload".to_string());
    let content_type = field
        .content_type()
        .map(str::to_string)
        .unwrap_or_else(|| {
            mime_guess::from_path(&file_name)
                .first_or_octet_stream()
                .to_string()
        });
    let bytes = field.bytes().await.map_err(form_error)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(PhotoRef {
        file_name,
        content_type,
        size_bytes: bytes.len() as u64,
    }))
}

fn form_error(err: MultipartError) -> IntakeError {
    IntakeError::InvalidField {
        field: "form",
        reason: err.body_text(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::reports::domain::Zone;

    fn complete_form() -> SubmissionForm {
        SubmissionForm::default()
            .with_field("name", " Priya Nair ")
            .with_field("phone", "+91-9876543210")
            .with_field("wasteType", "e-waste")
            .with_field("severity", "7.5")
            .with_field("confidence", "0.9")
            .with_field(
                "location",
                r#"{"latitude":28.61,"longitude":77.2,"address":"12 MG Road","zone":"North"}"#,
            )
    }

    #[test]
    fn decodes_individual_fields_and_location_json() {
        let submission = complete_form()
            .with_photo(PhotoRef {
                file_name: "pile.jpg".to_string(),
                content_type: "image/jpeg".to_string(),
                size_bytes: 2048,
            })
            .into_submission()
            .expect("valid form");

        assert_eq!(submission.reporter.name, "Priya Nair");
        assert_eq!(submission.waste_type, WasteType::EWaste);
        assert_eq!(submission.location.zone, Some(Zone::North));
        assert_eq!(submission.location.address.as_deref(), Some("12 MG Road"));
        assert_eq!(submission.photo.map(|photo| photo.size_bytes), Some(2048));
    }

    #[test]
    fn blank_required_fields_are_missing() {
        let err = complete_form()
            .with_field("phone", "   ")
            .into_submission()
            .expect_err("blank phone rejected");
        assert_eq!(err, IntakeError::MissingField("phone"));
    }

    #[test]
    fn rejects_out_of_range_and_malformed_values() {
        assert_eq!(
            complete_form()
                .with_field("severity", "12")
                .into_submission()
                .expect_err("severity too high"),
            IntakeError::SeverityOutOfRange(12.0)
        );
        assert!(matches!(
            complete_form()
                .with_field("location", "{not json")
                .into_submission(),
            Err(IntakeError::InvalidField {
                field: "location",
                ..
            })
        ));
        assert!(matches!(
            complete_form()
                .with_field("location", r#"{"latitude":123.0,"longitude":77.2}"#)
                .into_submission(),
            Err(IntakeError::InvalidCoordinates { .. })
        ));
        assert!(matches!(
            complete_form().with_field("wasteType", "Paper").into_submission(),
            Err(IntakeError::InvalidField {
                field: "wasteType",
                ..
            })
        ));
    }

    #[test]
    fn confidence_defaults_when_absent() {
        let mut form = complete_form();
        form.fields.remove("confidence");
        let submission = form.into_submission().expect("valid without confidence");
        assert_eq!(submission.confidence, 0.0);
    }
}
