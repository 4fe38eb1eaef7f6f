//! Core types for cert-desk

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a certificate record
///
/// The backend assigns opaque hex object ids; this crate never interprets them
/// beyond using them as URL path segments and in artifact filenames.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(pub String);

impl CertificateId {
    /// Create a new CertificateId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CertificateId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CertificateId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for CertificateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User role, mirroring the backend's permission tiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access: certificates, users, groups, deletion, import
    Admin,
    /// Can create and edit certificates, but not manage users or delete
    Manager,
    /// Read-only access to the certificate list
    Classique,
}

impl Role {
    /// Whether this role may create or edit certificate records
    pub fn can_modify(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }

    /// Whether this role has administrative access (users, groups, deletion)
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// An authenticated backend user
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    /// Backend-assigned user id
    #[serde(rename = "_id")]
    pub id: String,
    /// Login name
    pub username: String,
    /// Permission tier
    pub role: Role,
}

/// Lightweight reference to a user, as embedded in audit fields
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRef {
    /// Login name of the referenced user
    pub username: String,
}

/// One PDF generation recorded in a certificate's history
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRecord {
    /// Who triggered the generation, when the backend recorded it
    #[serde(default)]
    pub generated_by: Option<UserRef>,
    /// When the PDF was generated
    pub generated_at: DateTime<Utc>,
}

/// A language-course completion certificate record
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// Backend-assigned record id
    #[serde(rename = "_id")]
    pub id: CertificateId,
    /// Trainee's full name
    #[serde(default)]
    pub full_name: String,
    /// Trainee's date of birth
    #[serde(default)]
    pub date_of_birth: Option<DateTime<Utc>>,
    /// Trainee's place of birth
    #[serde(default)]
    pub place_of_birth: Option<String>,
    /// Backend-assigned reference number printed on the certificate
    #[serde(default)]
    pub reference_number: Option<String>,
    /// CEFR reference level attained (free text, e.g. "B1")
    #[serde(default)]
    pub reference_level: Option<String>,
    /// First day of the course
    #[serde(default)]
    pub course_start_date: Option<DateTime<Utc>>,
    /// Last day of the course
    #[serde(default)]
    pub course_end_date: Option<DateTime<Utc>>,
    /// Number of lesson units in the course
    #[serde(default)]
    pub lesson_units: Option<u32>,
    /// Number of lessons the trainee attended
    #[serde(default)]
    pub lessons_attended: Option<u32>,
    /// Free-form comments
    #[serde(default)]
    pub comments: Option<String>,
    /// Evaluation result
    #[serde(default)]
    pub evaluation: Option<String>,
    /// Additional course information printed on the certificate
    #[serde(default)]
    pub course_info: Option<String>,
    /// Code of the course group this certificate belongs to
    #[serde(default)]
    pub group_code: Option<String>,
    /// Who created the record
    #[serde(default)]
    pub created_by: Option<UserRef>,
    /// When the record was created
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Audit trail of PDF generations
    #[serde(default)]
    pub generation_history: Vec<GenerationRecord>,
}

/// Payload for creating or updating a certificate record
///
/// All fields are optional except the trainee name; omitted fields are left
/// untouched by the backend on update.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDraft {
    /// Trainee's full name
    pub full_name: String,
    /// Trainee's date of birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    /// Trainee's place of birth
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_of_birth: Option<String>,
    /// CEFR reference level attained
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_level: Option<String>,
    /// First day of the course
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_start_date: Option<NaiveDate>,
    /// Last day of the course
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_end_date: Option<NaiveDate>,
    /// Number of lesson units in the course
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lesson_units: Option<u32>,
    /// Number of lessons the trainee attended
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons_attended: Option<u32>,
    /// Free-form comments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Evaluation result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation: Option<String>,
    /// Additional course information
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_info: Option<String>,
    /// Code of the course group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_code: Option<String>,
}

/// CEFR level a course group teaches
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    /// Beginner
    A1,
    /// Elementary
    A2,
    /// Intermediate
    B1,
    /// Upper intermediate
    B2,
    /// Advanced
    C1,
    /// Proficient
    C2,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Daily time slot a course group meets in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeSlot {
    /// Morning ("MO")
    #[serde(rename = "MO")]
    Morning,
    /// Midday ("MI")
    #[serde(rename = "MI")]
    Midday,
    /// Afternoon ("NM")
    #[serde(rename = "NM")]
    Afternoon,
    /// Evening ("AB")
    #[serde(rename = "AB")]
    Evening,
}

impl TimeSlot {
    /// Two-letter code used in group codes and the backend API
    pub fn code(&self) -> &'static str {
        match self {
            TimeSlot::Morning => "MO",
            TimeSlot::Midday => "MI",
            TimeSlot::Afternoon => "NM",
            TimeSlot::Evening => "AB",
        }
    }
}

/// A course group
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    /// Backend-assigned group id
    #[serde(rename = "_id")]
    pub id: String,
    /// Backend-derived unique group code
    pub group_code: String,
    /// CEFR level the group teaches
    pub level: Level,
    /// First day of the group's course
    pub start_date: DateTime<Utc>,
    /// Daily time slot
    pub time_slot: TimeSlot,
    /// Human-readable group name
    #[serde(default)]
    pub name: Option<String>,
}

/// Payload for creating or updating a group
///
/// The group code is derived by the backend from level, start date and slot.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDraft {
    /// CEFR level the group teaches
    pub level: Level,
    /// First day of the group's course
    pub start_date: NaiveDate,
    /// Daily time slot
    pub time_slot: TimeSlot,
    /// Human-readable group name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Outcome of one certificate in an export run
///
/// One is produced per requested id and never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ItemOutcome {
    /// The certificate this outcome belongs to
    pub id: CertificateId,
    /// Whether any attempt produced a saved artifact
    pub succeeded: bool,
    /// Number of fetch attempts made (1..=max_attempts)
    pub attempts: u32,
}

/// Terminal report of one export run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of certificates whose artifact was fetched and saved
    pub succeeded: usize,
    /// Number of certificates that failed every attempt
    pub failed: usize,
    /// Total number of retries taken across all items
    pub retried: u32,
    /// Ids that failed permanently, in input order
    ///
    /// Callers re-run the exporter with exactly this list to retry the
    /// failed subset.
    pub failed_ids: Vec<CertificateId>,
    /// Per-id outcomes, in input order
    pub outcomes: Vec<ItemOutcome>,
}

impl RunSummary {
    /// Whether every requested certificate was exported
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}

/// Per-row outcome of a roster import or validation pass
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowOutcome {
    /// Trainee name from the roster row
    #[serde(default)]
    pub full_name: Option<String>,
    /// Whether the row was accepted
    pub success: bool,
    /// Human-readable status or rejection reason
    pub message: String,
}

/// Aggregate result of a roster import or validation pass
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImportReport {
    /// Per-row outcomes, in roster order
    pub results: Vec<RowOutcome>,
    /// Number of accepted rows
    pub success: usize,
    /// Total number of rows considered
    pub total: usize,
}

impl ImportReport {
    /// Whether every row was accepted
    pub fn all_ok(&self) -> bool {
        self.success == self.total
    }
}

/// Event emitted during an export run
///
/// Consumers subscribe via [`crate::export::BulkExporter::subscribe`]; events
/// are broadcast after each step so progress can be rendered without polling.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// An export run started
    ExportStarted {
        /// Number of certificates in the run
        total: usize,
    },

    /// Processing of one certificate began
    ItemStarted {
        /// Certificate being processed
        id: CertificateId,
        /// 1-based position in the run
        position: usize,
        /// Number of certificates in the run
        total: usize,
    },

    /// A failed attempt is about to be retried after a backoff wait
    ItemRetrying {
        /// Certificate being retried
        id: CertificateId,
        /// The attempt about to be made (2..=max_attempts)
        attempt: u32,
        /// Backoff wait before this attempt, in milliseconds
        delay_ms: u64,
    },

    /// A certificate's artifact was fetched and saved
    ItemSucceeded {
        /// Certificate that succeeded
        id: CertificateId,
        /// Number of attempts it took
        attempts: u32,
    },

    /// A certificate failed every attempt
    ItemFailed {
        /// Certificate that failed
        id: CertificateId,
        /// Number of attempts made
        attempts: u32,
        /// Final error message
        error: String,
    },

    /// Aggregate progress after a certificate finished (success or failure)
    Progress {
        /// Rounded completion percentage (0–100)
        percent: u8,
        /// Number of certificates processed so far
        current_index: usize,
        /// Number of certificates in the run
        total: usize,
    },

    /// An export run finished
    ExportFinished {
        /// Number of certificates exported
        succeeded: usize,
        /// Number of certificates that failed permanently
        failed: usize,
        /// Total retries taken
        retried: u32,
        /// Ids that failed permanently
        failed_ids: Vec<CertificateId>,
    },
}
