use crate::epoch::{RequestEpoch, Ticket};
use crate::error::ValidationError;
use crate::types::{MeetingSummary, SummarizeTextRequest};

pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["txt", "docx"];

/// Value for the file picker's `accept` attribute.
pub const ACCEPT_ATTRIBUTE: &str = ".txt,.docx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    PlainText,
    WordDocument,
}

impl UploadKind {
    pub fn mime_type(self) -> &'static str {
        match self {
            UploadKind::PlainText => "text/plain",
            UploadKind::WordDocument => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// Accept only `.txt` and `.docx` names (case-insensitive).
pub fn validate_upload(file_name: &str) -> Result<UploadKind, ValidationError> {
    let name = file_name.trim();
    if name.is_empty() {
        return Err(ValidationError::MissingFile);
    }
    let extension = name
        .rsplit_once('.')
        .map(|(stem, ext)| (stem, ext.to_ascii_lowercase()));

    match extension {
        Some((stem, ext)) if !stem.is_empty() && ext == ACCEPTED_EXTENSIONS[0] => {
            Ok(UploadKind::PlainText)
        }
        Some((stem, ext)) if !stem.is_empty() && ext == ACCEPTED_EXTENSIONS[1] => {
            Ok(UploadKind::WordDocument)
        }
        _ => Err(ValidationError::UnsupportedFile(name.to_string())),
    }
}

/// Raw-text submission form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextSubmission {
    pub title: String,
    pub content: String,
}

impl TextSubmission {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<SummarizeTextRequest, ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::MissingContent);
        }
        Ok(SummarizeTextRequest {
            title: title.to_string(),
            content: self.content.clone(),
        })
    }
}

/// File submission form; the bytes stay with the platform layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSubmission {
    pub title: String,
    pub file_name: Option<String>,
}

impl FileSubmission {
    pub fn validate(&self) -> Result<(String, UploadKind), ValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        let file_name = self
            .file_name
            .as_deref()
            .ok_or(ValidationError::MissingFile)?;
        let kind = validate_upload(file_name)?;
        Ok((title.to_string(), kind))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummarizerTab {
    #[default]
    Text,
    File,
    History,
}

/// Client state for the meeting summarizer.
#[derive(Debug, Clone, Default)]
pub struct SummarizerState {
    pub tab: SummarizerTab,
    pub loading: bool,
    pub result: Option<MeetingSummary>,
    pub meetings: Vec<MeetingSummary>,
    meetings_epoch: RequestEpoch,
}

impl SummarizerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a submission in flight. Both submission paths share this flag;
    /// `false` means another submission already holds it.
    pub fn begin_submit(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn finish_submit(&mut self, outcome: Option<MeetingSummary>) {
        self.loading = false;
        if let Some(summary) = outcome {
            self.result = Some(summary);
        }
    }

    pub fn begin_meetings_fetch(&mut self) -> Ticket {
        self.meetings_epoch.issue()
    }

    /// Returns `false` when a newer fetch superseded this one.
    pub fn apply_meetings(&mut self, ticket: Ticket, meetings: Vec<MeetingSummary>) -> bool {
        if !self.meetings_epoch.is_current(ticket) {
            log::debug!("discarding stale meetings response");
            return false;
        }
        self.meetings = meetings;
        true
    }

    pub fn show_meeting(&mut self, id: &str) -> bool {
        match self.meetings.iter().find(|meeting| meeting.id == id) {
            Some(meeting) => {
                self.result = Some(meeting.clone());
                true
            }
            None => false,
        }
    }

    pub fn clear_result(&mut self) {
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting(id: &str) -> MeetingSummary {
        MeetingSummary {
            id: id.into(),
            title: format!("Meeting {id}"),
            summary: "Discussed Q1 planning".into(),
            key_points: vec!["Dashboard in 3 weeks".into()],
            action_items: vec!["Lisa: mockups by Friday".into()],
            created_at: "2024-01-15T10:00:00".into(),
        }
    }

    #[test]
    fn accepts_txt_and_docx_any_case() {
        assert_eq!(validate_upload("notes.txt"), Ok(UploadKind::PlainText));
        assert_eq!(validate_upload("Minutes.DOCX"), Ok(UploadKind::WordDocument));
        assert_eq!(validate_upload("q1.plan.txt"), Ok(UploadKind::PlainText));
    }

    #[test]
    fn rejects_other_extensions() {
        for name in ["notes.pdf", "notes.doc", "txt", ".txt", "archive.txt.zip"] {
            assert_eq!(
                validate_upload(name),
                Err(ValidationError::UnsupportedFile(name.to_string())),
                "{name} should be rejected"
            );
        }
        assert_eq!(validate_upload("  "), Err(ValidationError::MissingFile));
    }

    #[test]
    fn text_submission_requires_title_and_body() {
        assert_eq!(
            TextSubmission::new(" ", "body").validate().unwrap_err(),
            ValidationError::MissingTitle
        );
        assert_eq!(
            TextSubmission::new("Standup", "\n\t").validate().unwrap_err(),
            ValidationError::MissingContent
        );
        let request = TextSubmission::new("  Standup ", "Mike: API done").validate().unwrap();
        assert_eq!(request.title, "Standup");
    }

    #[test]
    fn file_submission_checks_title_then_file() {
        let mut form = FileSubmission::default();
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingTitle);
        form.title = "Retro".into();
        assert_eq!(form.validate().unwrap_err(), ValidationError::MissingFile);
        form.file_name = Some("retro.pdf".into());
        assert!(matches!(
            form.validate().unwrap_err(),
            ValidationError::UnsupportedFile(_)
        ));
        form.file_name = Some("retro.docx".into());
        assert_eq!(
            form.validate().unwrap(),
            ("Retro".to_string(), UploadKind::WordDocument)
        );
    }

    #[test]
    fn shared_loading_flag_and_result() {
        let mut state = SummarizerState::new();
        assert!(state.begin_submit());
        assert!(state.loading);
        assert!(!state.begin_submit(), "second submission must wait");
        state.finish_submit(None);
        assert!(!state.loading);
        assert!(state.result.is_none());

        assert!(state.begin_submit());
        state.finish_submit(Some(meeting("1")));
        assert_eq!(state.result.as_ref().map(|m| m.id.as_str()), Some("1"));
    }

    #[test]
    fn stale_meeting_lists_are_dropped() {
        let mut state = SummarizerState::new();
        let first = state.begin_meetings_fetch();
        let second = state.begin_meetings_fetch();

        assert!(state.apply_meetings(second, vec![meeting("new")]));
        assert!(!state.apply_meetings(first, vec![meeting("old")]));
        assert_eq!(state.meetings.len(), 1);
        assert_eq!(state.meetings[0].id, "new");

        assert!(state.show_meeting("new"));
        assert!(!state.show_meeting("missing"));
    }
}
