use crossterm::event::KeyCode;

/// Chip-style tag input state
///
/// Keeps an insertion-ordered list of unique, non-empty tags together with the
/// text currently being typed. The hidden field value is recomputed after every
/// mutation so it always equals `tags.join(",")`.
#[derive(Debug, Clone, Default)]
pub struct TagInputState {
    /// Committed tags, in insertion order
    tags: Vec<String>,

    /// Text currently in the input box
    input: String,

    /// Whether `,` commits the current input like Enter does
    comma_commits: bool,

    /// Serialized value submitted with the form
    hidden_value: String,
}

/// Result of a key press on the tag input
#[derive(Debug, Clone, PartialEq)]
pub enum TagEvent {
    Added(String),
    Removed(String),
    InputChanged,
    Ignored,
}

impl TagInputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variant where typing a comma also commits the current input
    pub fn with_comma_commit() -> Self {
        Self {
            comma_commits: true,
            ..Self::default()
        }
    }

    /// Committed tags
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Current input text
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
    }

    /// Value of the hidden tag-list field
    pub fn hidden_value(&self) -> &str {
        &self.hidden_value
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Add a tag. Returns false when the trimmed text is empty or already present.
    pub fn add_tag(&mut self, text: &str) -> bool {
        let tag = text.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        self.sync_hidden();
        true
    }

    /// Remove a tag by exact value. Returns false when it was not present.
    pub fn remove_tag(&mut self, text: &str) -> bool {
        match self.tags.iter().position(|t| t == text) {
            Some(pos) => {
                self.tags.remove(pos);
                self.sync_hidden();
                true
            }
            None => false,
        }
    }

    /// Remove the most recently added tag
    pub fn remove_last(&mut self) -> Option<String> {
        let removed = self.tags.pop();
        if removed.is_some() {
            self.sync_hidden();
        }
        removed
    }

    /// Commit the current input as a tag and clear the input
    pub fn commit_input(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.input);
        let tag = text.trim().to_string();
        if self.add_tag(&tag) { Some(tag) } else { None }
    }

    /// Handle a key press while the input has focus
    pub fn handle_key(&mut self, key: KeyCode) -> TagEvent {
        match key {
            KeyCode::Enter => match self.commit_input() {
                Some(tag) => TagEvent::Added(tag),
                None => TagEvent::Ignored,
            },
            KeyCode::Char(',') if self.comma_commits => match self.commit_input() {
                Some(tag) => TagEvent::Added(tag),
                None => TagEvent::Ignored,
            },
            KeyCode::Backspace => {
                if self.input.is_empty() {
                    match self.remove_last() {
                        Some(tag) => TagEvent::Removed(tag),
                        None => TagEvent::Ignored,
                    }
                } else {
                    self.input.pop();
                    TagEvent::InputChanged
                }
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                TagEvent::InputChanged
            }
            _ => TagEvent::Ignored,
        }
    }

    /// Click delegated from the chip container. `data_tag` is the `data-tag`
    /// value of the clicked remove control, or None when the click missed one.
    pub fn handle_container_click(&mut self, data_tag: Option<&str>) -> TagEvent {
        match data_tag {
            Some(tag) if self.remove_tag(tag) => TagEvent::Removed(tag.to_string()),
            _ => TagEvent::Ignored,
        }
    }

    /// Replace all tags with the entries of a comma-separated string
    pub fn seed_from_csv(&mut self, csv: &str) {
        self.reset();
        for part in csv.split(',') {
            self.add_tag(part);
        }
    }

    /// Drop all tags and the pending input
    pub fn reset(&mut self) {
        self.tags.clear();
        self.input.clear();
        self.sync_hidden();
    }

    fn sync_hidden(&mut self) {
        self.hidden_value = self.tags.join(",");
    }
}
