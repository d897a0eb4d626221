//! Credential records and their validation rules.
//!
//! The password column of a record is tracked as a [`SecretField`] so the
//! store can tell a value it loaded from disk apart from a new plaintext
//! the caller just supplied.  Only the latter is ever encrypted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use zeroize::Zeroizing;

use crate::crypto::RevealedSecret;
use crate::errors::{Result, VaultError};

/// Category assigned when the caller gives none.
pub const DEFAULT_CATEGORY: &str = "General";

const TITLE_MAX: usize = 100;
const USERNAME_MAX: usize = 100;
const PASSWORD_MAX: usize = 500;
const WEBSITE_MAX: usize = 200;
const CATEGORY_MAX: usize = 50;
const NOTES_MAX: usize = 1000;

/// State of a record's password column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretField {
    /// Exactly what is persisted: an envelope, or legacy plaintext.
    Stored(String),
    /// A new plaintext from the caller, not yet sealed.
    Pending(Zeroizing<String>),
}

impl SecretField {
    /// `true` when the value differs from what was last persisted.
    pub fn is_modified(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// A stored credential entry.
#[derive(Debug, Clone)]
pub struct VaultRecord {
    /// Row id; `None` until the record is first saved.
    pub id: Option<i64>,
    pub owner: String,
    pub title: String,
    pub username: String,
    pub secret: SecretField,
    pub website: String,
    pub category: String,
    pub notes: String,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VaultRecord {
    /// Replace the password with a new plaintext.
    pub fn set_password(&mut self, plaintext: &str) {
        self.secret = SecretField::Pending(Zeroizing::new(plaintext.to_owned()));
    }

    /// Trim text fields and apply the length limits.
    pub fn normalize(&mut self) -> Result<()> {
        if self.owner.trim().is_empty() {
            return Err(VaultError::Validation("owner is required".into()));
        }

        trim_in_place(&mut self.title);
        trim_in_place(&mut self.username);
        trim_in_place(&mut self.website);
        trim_in_place(&mut self.category);
        trim_in_place(&mut self.notes);

        if self.category.is_empty() {
            self.category = DEFAULT_CATEGORY.to_owned();
        }

        require("title", &self.title)?;
        require("username", &self.username)?;
        check_len("title", &self.title, TITLE_MAX)?;
        check_len("username", &self.username, USERNAME_MAX)?;
        check_len("website", &self.website, WEBSITE_MAX)?;
        check_len("category", &self.category, CATEGORY_MAX)?;
        check_len("notes", &self.notes, NOTES_MAX)?;

        // Limits apply to what the caller typed, not to the envelope.
        if let SecretField::Pending(plaintext) = &self.secret {
            require("password", plaintext)?;
            check_len("password", plaintext, PASSWORD_MAX)?;
        }

        Ok(())
    }
}

/// Input for creating a record.
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub title: String,
    pub username: String,
    pub password: Zeroizing<String>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl NewRecord {
    pub fn new(title: &str, username: &str, password: &str) -> Self {
        Self {
            title: title.to_owned(),
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
            ..Self::default()
        }
    }

    pub fn website(mut self, website: &str) -> Self {
        self.website = Some(website.to_owned());
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_owned());
        self
    }

    /// Build an unsaved record owned by `owner`.
    pub fn into_record(self, owner: &str) -> VaultRecord {
        let now = Utc::now();
        VaultRecord {
            id: None,
            owner: owner.to_owned(),
            title: self.title,
            username: self.username,
            secret: SecretField::Pending(self.password),
            website: self.website.unwrap_or_default(),
            category: self
                .category
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
            notes: self.notes.unwrap_or_default(),
            last_updated: now,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update.
///
/// `title`, `username`, `password` and `category` are ignored when empty.
/// `website` and `notes` may be set to an empty string to clear them.
#[derive(Debug, Clone, Default)]
pub struct RecordUpdate {
    pub title: Option<String>,
    pub username: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub website: Option<String>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

impl RecordUpdate {
    /// Apply the update to `record`. Returns `true` if anything changed.
    pub fn apply_to(self, record: &mut VaultRecord) -> bool {
        let mut changed = false;

        if let Some(title) = self.title.filter(|v| !v.is_empty()) {
            record.title = title;
            changed = true;
        }
        if let Some(username) = self.username.filter(|v| !v.is_empty()) {
            record.username = username;
            changed = true;
        }
        if let Some(password) = self.password.filter(|v| !v.is_empty()) {
            record.secret = SecretField::Pending(password);
            changed = true;
        }
        if let Some(website) = self.website {
            record.website = website;
            changed = true;
        }
        if let Some(category) = self.category.filter(|v| !v.is_empty()) {
            record.category = category;
            changed = true;
        }
        if let Some(notes) = self.notes {
            record.notes = notes;
            changed = true;
        }

        changed
    }
}

/// A record with its password revealed, ready for display or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    pub id: Option<i64>,
    pub owner: String,
    pub title: String,
    pub username: String,
    pub password: String,
    /// Set when `password` holds the failure placeholder.
    pub decryption_failed: bool,
    pub website: String,
    pub category: String,
    pub notes: String,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecordView {
    pub fn new(record: &VaultRecord, revealed: RevealedSecret) -> Self {
        let decryption_failed = revealed.is_failed();
        Self {
            id: record.id,
            owner: record.owner.clone(),
            title: record.title.clone(),
            username: record.username.clone(),
            password: revealed.into_display_value(),
            decryption_failed,
            website: record.website.clone(),
            category: record.category.clone(),
            notes: record.notes.clone(),
            last_updated: record.last_updated,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_owned();
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(VaultError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(VaultError::Validation(format!(
            "{field} cannot exceed {max} characters"
        )));
    }
    Ok(())
}
