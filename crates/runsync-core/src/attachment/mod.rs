//! Attachment kinds, classification, and request construction.
//!
//! Classification is an ordered rule table evaluated against the file-name
//! component of a path, case-insensitively. The first matching rule wins and
//! anything unmatched is a general attachment:
//!
//! | Rule | Kind |
//! |------|------|
//! | extension `.trx` | [`AttachmentKind::RunSummary`] |
//! | name `testimpact.xml` | [`AttachmentKind::TestImpactDetails`] |
//! | name `systeminformation.xml` | [`AttachmentKind::IntermediateCollectorData`] |
//! | anything else | [`AttachmentKind::General`] |
//!
//! Console logs never go through the table; they are synthesized with
//! [`AttachmentKind::ConsoleLog`].

pub mod upload;

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

pub use upload::AttachmentUploader;

/// File name used for synthesized console-log attachments.
pub const CONSOLE_LOG_FILE_NAME: &str = "Standard_Console_Output.log";

/// Semantic role of an attachment. Serialized with the service's wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttachmentKind {
    #[serde(rename = "GeneralAttachment")]
    General,
    #[serde(rename = "TmiTestRunSummary")]
    RunSummary,
    TestImpactDetails,
    IntermediateCollectorData,
    ConsoleLog,
}

impl AttachmentKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "GeneralAttachment",
            Self::RunSummary => "TmiTestRunSummary",
            Self::TestImpactDetails => "TestImpactDetails",
            Self::IntermediateCollectorData => "IntermediateCollectorData",
            Self::ConsoleLog => "ConsoleLog",
        }
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
enum Matcher {
    Extension(&'static str),
    FileName(&'static str),
}

impl Matcher {
    fn matches(&self, file_name: &str) -> bool {
        match self {
            // A bare ".trx" still counts as the extension.
            Self::Extension(ext) => file_name
                .to_ascii_lowercase()
                .strip_suffix(ext)
                .is_some_and(|stem| stem.ends_with('.')),
            Self::FileName(name) => file_name.eq_ignore_ascii_case(name),
        }
    }
}

const RULES: &[(Matcher, AttachmentKind)] = &[
    (Matcher::Extension("trx"), AttachmentKind::RunSummary),
    (
        Matcher::FileName("testimpact.xml"),
        AttachmentKind::TestImpactDetails,
    ),
    (
        Matcher::FileName("systeminformation.xml"),
        AttachmentKind::IntermediateCollectorData,
    ),
];

/// Classify an attachment by its file name (or a path ending in one).
pub fn classify(file_name: impl AsRef<Path>) -> AttachmentKind {
    let path = file_name.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy());

    RULES
        .iter()
        .find(|(matcher, _)| matcher.matches(&name))
        .map(|(_, kind)| *kind)
        .unwrap_or(AttachmentKind::General)
}

/// Upload payload for one attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRequest {
    #[serde(rename = "attachmentType")]
    pub kind: AttachmentKind,

    pub file_name: String,

    #[serde(default)]
    pub comment: String,

    /// Base64 of the attachment bytes.
    #[serde(rename = "stream")]
    pub content: String,
}

impl AttachmentRequest {
    /// Build a request from raw bytes.
    pub fn from_bytes(kind: AttachmentKind, file_name: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            kind,
            file_name: file_name.into(),
            comment: String::new(),
            content: STANDARD.encode(bytes),
        }
    }

    /// Synthesize a console-log attachment; `None` when there is nothing to publish.
    pub fn console_log(log: &str) -> Option<Self> {
        if log.is_empty() {
            return None;
        }
        Some(Self::from_bytes(
            AttachmentKind::ConsoleLog,
            CONSOLE_LOG_FILE_NAME,
            log.as_bytes(),
        ))
    }

    /// Decode the transport content back to bytes.
    pub fn decode_content(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.content)
    }
}
