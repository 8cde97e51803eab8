use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::course::models::CourseId;
use crate::domain::project::models::ProjectId;
use crate::domain::user::models::UserId;
use crate::payment::errors::AmountError;
use crate::payment::errors::PaymentIdError;
use crate::payment::errors::ReferenceError;
use crate::payment::errors::StatusError;

/// Opaque payment identifier: `qris_<unix-millis>_<9 random chars>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentId(String);

impl PaymentId {
    const MAX_LENGTH: usize = 64;
    const RANDOM_SUFFIX_LENGTH: usize = 9;

    /// Generate a fresh identifier stamped with `now`.
    pub fn generate(now: DateTime<Utc>) -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!(
            "qris_{}_{}",
            now.timestamp_millis(),
            &random[..Self::RANDOM_SUFFIX_LENGTH]
        ))
    }

    /// Accept an identifier received from a client or provider.
    ///
    /// Only length is checked; unknown ids are resolved by lookup.
    pub fn from_string(id: &str) -> Result<Self, PaymentIdError> {
        let trimmed = id.trim();
        let length = trimmed.chars().count();
        if length == 0 {
            Err(PaymentIdError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(PaymentIdError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Amount in the smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    pub fn new(value: i64) -> Result<Self, AmountError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(AmountError::NotPositive(value))
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Correlation string tying a payment to the caller's order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReference(String);

impl PaymentReference {
    const MAX_LENGTH: usize = 100;

    pub fn new(reference: String) -> Result<Self, ReferenceError> {
        let trimmed = reference.trim();
        let length = trimmed.chars().count();
        if length == 0 {
            Err(ReferenceError::Empty)
        } else if length > Self::MAX_LENGTH {
            Err(ReferenceError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Reference derived from what is being paid for.
    ///
    /// `PROJECT_<id>_<millis>` or `COURSE_<id>_<millis>`.
    pub fn for_purpose(purpose: &PaymentPurpose, now: DateTime<Utc>) -> Self {
        let (kind, id) = match purpose {
            PaymentPurpose::Project(id) => ("PROJECT", id.as_i32()),
            PaymentPurpose::Course(id) => ("COURSE", id.as_i32()),
        };
        Self(format!("{}_{}_{}", kind, id, now.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a payment settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentPurpose {
    Project(ProjectId),
    Course(CourseId),
}

impl PaymentPurpose {
    /// Discriminator as persisted in `payment_requests.purpose_type`.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentPurpose::Project(_) => "project",
            PaymentPurpose::Course(_) => "course",
        }
    }

    pub fn target_id(&self) -> i32 {
        match self {
            PaymentPurpose::Project(id) => id.as_i32(),
            PaymentPurpose::Course(id) => id.as_i32(),
        }
    }

    /// Rebuild from persisted columns. Unknown kinds read as `None`.
    pub fn from_parts(kind: &str, target_id: i32) -> Option<Self> {
        match kind {
            "project" => Some(PaymentPurpose::Project(ProjectId(target_id))),
            "course" => Some(PaymentPurpose::Course(CourseId(target_id))),
            _ => None,
        }
    }
}

/// Lifecycle state of a payment request.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    /// Whether reaching this status owes a downstream event.
    pub fn emits_event(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Failed)
    }
}

impl FromStr for PaymentStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "failed" => Ok(PaymentStatus::Failed),
            "expired" => Ok(PaymentStatus::Expired),
            other => Err(StatusError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target of a `pending -> terminal` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminalStatus {
    Paid,
    Failed,
    Expired,
}

impl TerminalStatus {
    /// Map a provider status word onto a terminal status.
    ///
    /// Matching is case-insensitive. Unrecognized words return `None` and
    /// must be rejected by the caller.
    pub fn from_provider(status: &str) -> Option<Self> {
        match status.trim().to_ascii_lowercase().as_str() {
            "paid" | "completed" | "settlement" | "success" => Some(TerminalStatus::Paid),
            "failed" | "failure" | "deny" | "cancel" => Some(TerminalStatus::Failed),
            "expired" | "expire" => Some(TerminalStatus::Expired),
            _ => None,
        }
    }
}

impl From<TerminalStatus> for PaymentStatus {
    fn from(status: TerminalStatus) -> Self {
        match status {
            TerminalStatus::Paid => PaymentStatus::Paid,
            TerminalStatus::Failed => PaymentStatus::Failed,
            TerminalStatus::Expired => PaymentStatus::Expired,
        }
    }
}

impl FromStr for TerminalStatus {
    type Err = StatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<PaymentStatus>()? {
            PaymentStatus::Paid => Ok(TerminalStatus::Paid),
            PaymentStatus::Failed => Ok(TerminalStatus::Failed),
            PaymentStatus::Expired => Ok(TerminalStatus::Expired),
            PaymentStatus::Pending => Err(StatusError::NotTerminal(s.to_string())),
        }
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        PaymentStatus::from(*self).fmt(f)
    }
}

/// Payment request aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub id: PaymentId,
    pub amount: Amount,
    pub reference: PaymentReference,
    pub qris_string: String,
    pub payer_id: Option<UserId>,
    pub purpose: Option<PaymentPurpose>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// When the event owed by the terminal status reached the broker.
    pub event_published_at: Option<DateTime<Utc>>,
}

impl PaymentRequest {
    /// Pending and past its expiry at `now`.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == PaymentStatus::Pending && now >= self.expires_at
    }

    /// Settled or failed, and the matching event is not confirmed yet.
    pub fn owes_event(&self) -> bool {
        self.status.emits_event() && self.event_published_at.is_none()
    }
}

/// Price attached to a payment purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurposeQuote {
    /// Payment must cover at least this amount.
    Fixed(i64),
    /// Any amount above the minimum is accepted.
    Open,
}

/// Command to create a payment request.
#[derive(Debug, Clone)]
pub struct CreatePaymentCommand {
    pub amount: Amount,
    pub reference: Option<PaymentReference>,
    pub payer_id: Option<UserId>,
    pub purpose: Option<PaymentPurpose>,
}

/// Result of a compare-and-set from `pending`.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// This call moved the record out of `pending`.
    Applied(PaymentRequest),

    /// The record was already terminal; nothing changed.
    AlreadyTerminal(PaymentRequest),
}

impl TransitionOutcome {
    pub fn payment(&self) -> &PaymentRequest {
        match self {
            TransitionOutcome::Applied(p) | TransitionOutcome::AlreadyTerminal(p) => p,
        }
    }

    pub fn into_payment(self) -> PaymentRequest {
        match self {
            TransitionOutcome::Applied(p) | TransitionOutcome::AlreadyTerminal(p) => p,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionOutcome::Applied(_))
    }
}

/// Acknowledgement returned for every signature-valid, well-formed webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookAck {
    pub payment_id: PaymentId,
    pub status: Option<PaymentStatus>,
    pub applied: bool,
}
