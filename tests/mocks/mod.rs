//! Stand-ins for the language model, the operator and the CalDAV server

#![allow(dead_code)]

use std::collections::HashSet;
use std::error::Error;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use daybook::config::Config;
use daybook::confirm::Prompter;
use daybook::llm::LanguageModel;
use daybook::traits::CalendarPublisher;

/// A model that always gives the same answer, and remembers the prompts it received
pub struct CannedModel {
    response: String,
    pub prompts: Mutex<Vec<String>>,
}

impl CannedModel {
    pub fn new<S: ToString>(response: S) -> Self {
        Self { response: response.to_string(), prompts: Mutex::new(Vec::new()) }
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for CannedModel {
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error>> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.response.clone())
    }
}

/// A model whose server cannot be reached
pub struct UnreachableModel;

#[async_trait]
impl LanguageModel for UnreachableModel {
    async fn generate(&self, _prompt: &str) -> Result<String, Box<dyn Error>> {
        Err("connection refused".into())
    }
}

/// Replays canned answers, in order
pub struct ScriptedPrompter {
    answers: Vec<String>,
    pub questions: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: answers.iter().rev().map(|a| a.to_string()).collect(),
            questions: Vec::new(),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn ask_line(&mut self, question: &str) -> io::Result<String> {
        self.questions.push(question.to_string());
        self.answers.pop().ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more answers"))
    }
}

/// A calendar that stores documents in memory, and can be told to reject some of them
#[derive(Default)]
pub struct MockCalendar {
    /// Zero-based indices of the uploads that fail
    pub fail_on: HashSet<usize>,
    pub fail_init: bool,
    pub initialized: bool,
    /// File names of every attempted upload
    pub attempts: Vec<String>,
    /// Documents that have been accepted
    pub stored: Vec<String>,
}

impl MockCalendar {
    pub fn failing_on(indices: &[usize]) -> Self {
        Self { fail_on: indices.iter().cloned().collect(), ..Self::default() }
    }
}

#[async_trait]
impl CalendarPublisher for MockCalendar {
    async fn init(&mut self) -> daybook::error::Result<()> {
        if self.fail_init {
            return Err(daybook::error::transport_init_error("Calendar 'AVMIL' not found."));
        }
        self.initialized = true;
        Ok(())
    }

    async fn add_event(&mut self, ical_text: String, file_name: &str) -> Result<(), Box<dyn Error>> {
        let index = self.attempts.len();
        self.attempts.push(file_name.to_string());
        if self.fail_on.contains(&index) {
            return Err("Unexpected HTTP status code 500".into());
        }
        self.stored.push(ical_text);
        Ok(())
    }
}

/// A configuration that writes its backup in `dir`
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::from_lookup(|key| match key {
        "CALDAV_USERNAME" => Some("john".to_string()),
        "CALDAV_PASSWORD" => Some("secret".to_string()),
        "TIMEZONE" => Some("Europe/Paris".to_string()),
        _ => None,
    }).unwrap();
    config.backup_path = dir.join("events.ics");
    config
}
