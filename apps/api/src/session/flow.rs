//! Page state machine for one coaching session.
//!
//! `Page` is the only state tag. Every change goes through `Session::apply`,
//! which checks the transition first and only then updates the context.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::case::ScoredCase;
use crate::models::diagnosis::Diagnosis;
use crate::models::note::NoteFields;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Input,
    Edit,
    Results,
    Template,
}

impl Page {
    /// Pages from which a note (typed or transcribed) can be submitted.
    pub fn accepts_note(self) -> bool {
        matches!(self, Page::Input | Page::Edit)
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Input => "input",
            Page::Edit => "edit",
            Page::Results => "results",
            Page::Template => "template",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Cannot move from '{from}' to '{to}'")]
    InvalidTransition { from: Page, to: Page },

    #[error("Case {index} is out of range ({available} similar cases)")]
    CaseOutOfRange { index: usize, available: usize },

    #[error("No diagnosis results in this session yet")]
    NoResults,
}

/// A user action that moves the session between pages.
#[derive(Debug, Clone)]
pub enum Event {
    Transcribed {
        transcript: String,
        fields: NoteFields,
    },
    Diagnosed {
        fields: NoteFields,
        note: String,
        diagnosis: Diagnosis,
        similar_cases: Vec<ScoredCase>,
    },
    SelectCase(usize),
    Back(Page),
}

/// Everything one user session carries across requests.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub page: Page,
    pub created_at: DateTime<Utc>,
    pub transcript: Option<String>,
    pub fields: NoteFields,
    pub note: Option<String>,
    pub diagnosis: Option<Diagnosis>,
    pub similar_cases: Vec<ScoredCase>,
    pub selected_case: Option<usize>,
    pub responses: BTreeMap<String, String>,
    /// Generated plans keyed by case index; cleared by a new diagnosis.
    #[serde(skip)]
    pub templates: HashMap<usize, String>,
    /// Bumped by every diagnosis. Plans are only cached against the revision
    /// they were generated for.
    #[serde(skip)]
    pub revision: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            page: Page::Input,
            created_at: Utc::now(),
            transcript: None,
            fields: NoteFields::default(),
            note: None,
            diagnosis: None,
            similar_cases: Vec::new(),
            selected_case: None,
            responses: BTreeMap::new(),
            templates: HashMap::new(),
            revision: 0,
        }
    }

    /// The page `event` would move to, or why it cannot happen from here.
    pub fn next_page(&self, event: &Event) -> Result<Page, FlowError> {
        let to = match event {
            Event::Transcribed { .. } => Page::Edit,
            Event::Diagnosed { .. } => Page::Results,
            Event::SelectCase(_) => Page::Template,
            Event::Back(target) => *target,
        };

        let allowed = match event {
            Event::Transcribed { .. } | Event::Diagnosed { .. } => self.page.accepts_note(),
            Event::SelectCase(index) => {
                if self.page != Page::Results {
                    false
                } else {
                    self.case_index(*index)?;
                    true
                }
            }
            Event::Back(target) => *target < self.page,
        };

        if allowed {
            Ok(to)
        } else {
            Err(FlowError::InvalidTransition {
                from: self.page,
                to,
            })
        }
    }

    /// Checks and applies `event`, returning the new page.
    pub fn apply(&mut self, event: Event) -> Result<Page, FlowError> {
        let next = self.next_page(&event)?;

        match event {
            Event::Transcribed { transcript, fields } => {
                self.transcript = Some(transcript);
                self.fields = fields;
            }
            Event::Diagnosed {
                fields,
                note,
                diagnosis,
                similar_cases,
            } => {
                self.fields = fields;
                self.note = Some(note);
                self.diagnosis = Some(diagnosis);
                self.similar_cases = similar_cases;
                self.selected_case = None;
                self.templates.clear();
                self.responses.clear();
                self.revision += 1;
            }
            Event::SelectCase(index) => {
                self.selected_case = Some(index);
            }
            Event::Back(_) => {}
        }

        self.page = next;
        Ok(next)
    }

    /// Validates a case index against the current results.
    pub fn case_index(&self, index: usize) -> Result<usize, FlowError> {
        if self.similar_cases.is_empty() {
            return Err(FlowError::NoResults);
        }
        if index >= self.similar_cases.len() {
            return Err(FlowError::CaseOutOfRange {
                index,
                available: self.similar_cases.len(),
            });
        }
        Ok(index)
    }

    pub fn selected(&self) -> Option<&ScoredCase> {
        self.selected_case.and_then(|i| self.similar_cases.get(i))
    }

    pub fn cached_template(&self) -> Option<&str> {
        self.selected_case
            .and_then(|i| self.templates.get(&i))
            .map(String::as_str)
    }

    /// Caches a plan generated for case `index` under `revision`. Returns
    /// false and leaves the cache alone if the session has since been
    /// re-diagnosed or has left that case's Template page.
    pub fn store_template(&mut self, revision: u64, index: usize, template: String) -> bool {
        let current = self.revision == revision
            && self.page == Page::Template
            && self.selected_case == Some(index);
        if current {
            self.templates.insert(index, template);
        }
        current
    }

    /// Requires the session to be on `page`.
    pub fn expect_page(&self, page: Page) -> Result<(), FlowError> {
        if self.page == page {
            Ok(())
        } else {
            Err(FlowError::InvalidTransition {
                from: self.page,
                to: page,
            })
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
