//! Certificate CRUD, PDF artifact fetching and roster upload.

use super::ApiClient;
use crate::error::{Error, Result};
use crate::types::{Certificate, CertificateDraft, CertificateId, ImportReport};
use reqwest::Method;

/// Result of a bulk delete pass
///
/// Deletion is per-record on the backend, so one failing record never aborts
/// the rest. Failed ids are kept so the caller can report or retry them.
#[derive(Clone, Debug, Default)]
pub struct DeleteOutcome {
    /// Number of records deleted
    pub deleted: usize,
    /// Ids that could not be deleted, in input order
    pub failed: Vec<CertificateId>,
}

impl ApiClient {
    /// List all certificate records visible to the current user
    pub async fn list_certificates(&self) -> Result<Vec<Certificate>> {
        self.fetch_json(Method::GET, "certificates").await
    }

    /// Get a single certificate, including its PDF generation history
    pub async fn get_certificate(&self, id: &CertificateId) -> Result<Certificate> {
        self.fetch_json(Method::GET, &format!("certificates/{id}"))
            .await
    }

    /// Create a certificate record
    pub async fn create_certificate(&self, draft: &CertificateDraft) -> Result<Certificate> {
        let created: Certificate = self.send_json(Method::POST, "certificates", draft).await?;
        tracing::info!(id = %created.id, name = %created.full_name, "Certificate created");
        Ok(created)
    }

    /// Update an existing certificate record
    pub async fn update_certificate(
        &self,
        id: &CertificateId,
        draft: &CertificateDraft,
    ) -> Result<Certificate> {
        let updated: Certificate = self
            .send_json(Method::PUT, &format!("certificates/{id}"), draft)
            .await?;
        tracing::info!(id = %id, "Certificate updated");
        Ok(updated)
    }

    /// Delete a certificate record
    pub async fn delete_certificate(&self, id: &CertificateId) -> Result<()> {
        let response = self
            .request(Method::DELETE, &format!("certificates/{id}"))
            .await?
            .send()
            .await?;
        Self::check(response).await?;
        tracing::info!(id = %id, "Certificate deleted");
        Ok(())
    }

    /// Delete several certificate records, one by one
    ///
    /// Each deletion is independent; failures are collected rather than
    /// aborting the pass.
    pub async fn delete_certificates(&self, ids: &[CertificateId]) -> Result<DeleteOutcome> {
        let mut outcome = DeleteOutcome::default();

        for id in ids {
            match self.delete_certificate(id).await {
                Ok(()) => outcome.deleted += 1,
                Err(e) => {
                    tracing::error!(id = %id, error = %e, "Failed to delete certificate");
                    outcome.failed.push(id.clone());
                }
            }
        }

        tracing::info!(
            deleted = outcome.deleted,
            failed = outcome.failed.len(),
            "Bulk delete finished"
        );
        Ok(outcome)
    }

    /// Fetch the rendered PDF for a certificate
    ///
    /// The backend occasionally answers a PDF route with a JSON error and a
    /// 200 status; anything that is not `application/pdf` is therefore decoded
    /// as an error message and surfaced as [`Error::UnexpectedPayload`],
    /// never returned as artifact bytes.
    pub async fn fetch_pdf(&self, id: &CertificateId) -> Result<Vec<u8>> {
        let response = self
            .request(Method::GET, &format!("certificates/{id}/pdf"))
            .await?
            .send()
            .await?;
        let response = Self::check(response).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.starts_with("application/pdf") {
            let detail = match response.json::<super::ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("content type '{content_type}'"),
            };
            return Err(Error::UnexpectedPayload {
                id: id.clone(),
                detail,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Upload a roster spreadsheet for server-side import into a group
    ///
    /// The backend parses the file, creates one certificate per row, and
    /// returns its own per-row report.
    pub async fn import_roster(
        &self,
        file: Vec<u8>,
        filename: &str,
        group_code: &str,
    ) -> Result<ImportReport> {
        let part = reqwest::multipart::Part::bytes(file)
            .file_name(filename.to_string())
            .mime_str("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("groupCode", group_code.to_string());

        let response = self
            .request(Method::POST, "certificates/import")
            .await?
            .multipart(form)
            .send()
            .await?;
        let response = Self::check(response).await?;
        let report: ImportReport = response.json().await?;

        tracing::info!(
            group_code = group_code,
            success = report.success,
            total = report.total,
            "Roster import finished"
        );
        Ok(report)
    }
}
