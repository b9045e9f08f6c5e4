use super::MetadataRecord;
use crate::error::{Error, Result};
use chrono::Local;

/// Field name of the certificate identifier
pub const CERTIFICATE_ID: &str = "Certificate ID";
/// Field name of the certificate subject
pub const NAME: &str = "Name";
/// Field name of the course or procedure certified
pub const COURSE: &str = "Course";
/// Field name of the human-readable issue date
pub const ISSUED_DATE: &str = "Issued Date";
/// Field name of the issuer's creation timestamp
pub const CREATED_AT: &str = "Created At";

/// Course recorded when the issuer does not name one
pub const DEFAULT_COURSE: &str = "Data Wipe";

/// Format of the `Created At` timestamp
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Typed certificate metadata.
///
/// Converts to a [`MetadataRecord`] with the fixed field order `Certificate ID`,
/// `Name`, `Course`, `Issued Date`, then `Created At` when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateMetadata {
    pub certificate_id: String,
    pub name: String,
    pub course: String,
    pub issued_date: String,
    pub created_at: Option<String>,
}

impl CertificateMetadata {
    /// Creates metadata with the default course and no creation timestamp
    pub fn new(
        certificate_id: impl Into<String>,
        name: impl Into<String>,
        issued_date: impl Into<String>,
    ) -> Self {
        Self {
            certificate_id: certificate_id.into(),
            name: name.into(),
            course: DEFAULT_COURSE.to_string(),
            issued_date: issued_date.into(),
            created_at: None,
        }
    }

    /// Sets the course
    pub fn with_course(mut self, course: impl Into<String>) -> Self {
        self.course = course.into();
        self
    }

    /// Sets the creation timestamp
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Builds the ordered record
    pub fn to_record(&self) -> MetadataRecord {
        let mut fields = vec![
            (CERTIFICATE_ID, self.certificate_id.as_str()),
            (NAME, self.name.as_str()),
            (COURSE, self.course.as_str()),
            (ISSUED_DATE, self.issued_date.as_str()),
        ];
        if let Some(created_at) = &self.created_at {
            fields.push((CREATED_AT, created_at.as_str()));
        }
        fields.into_iter().collect()
    }
}

impl From<&CertificateMetadata> for MetadataRecord {
    fn from(metadata: &CertificateMetadata) -> Self {
        metadata.to_record()
    }
}

impl TryFrom<&MetadataRecord> for CertificateMetadata {
    type Error = Error;

    fn try_from(record: &MetadataRecord) -> Result<Self> {
        let required = |key: &str| {
            record
                .get(key)
                .map(str::to_string)
                .ok_or_else(|| Error::Encoding(format!("certificate field `{}` is missing", key)))
        };

        Ok(Self {
            certificate_id: required(CERTIFICATE_ID)?,
            name: required(NAME)?,
            course: required(COURSE)?,
            issued_date: required(ISSUED_DATE)?,
            created_at: record.get(CREATED_AT).map(str::to_string),
        })
    }
}

/// Current local time in [`CREATED_AT_FORMAT`]
pub fn now_timestamp() -> String {
    Local::now().format(CREATED_AT_FORMAT).to_string()
}
