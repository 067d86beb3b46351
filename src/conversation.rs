//! Per-conversation menu state.
//!
//! A conversation is either idle (menu commands are recognized) or waiting
//! for a keyword line after the user picked search. [`Conversations`] keeps
//! one state per conversation id and is owned by whatever loop reads input.

use std::collections::HashMap;

use crate::domain::Mode;

pub type ConversationId = i64;

pub const GREETING: &str = "Hi! I'm a MemeBot. What do you wanna do?";
pub const MODE_PROMPT: &str = "Choose post type:";
pub const KEYWORD_PROMPT: &str = "Enter keywords separated by commas";

pub const MENU_BROWSE: &str = "🔥 Hot posts";
pub const MENU_SEARCH: &str = "🔍 Search by topic";
pub const MENU_BACK: &str = "↩️ Back";

/// Buttons offered with the main menu.
pub const MAIN_MENU: [&str; 2] = [MENU_BROWSE, MENU_SEARCH];
/// Buttons offered after picking browse.
pub const MODE_MENU: [&str; 5] = ["Hot", "New", "Top", "Rising", MENU_BACK];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,
    AwaitingKeywords,
}

/// What the front-end should do in response to one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ShowMenu,
    ShowModes,
    Browse(Mode),
    PromptKeywords,
    Search(String),
    Unrecognized(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    BrowseMenu,
    SearchMenu,
    Back,
    Listing(Mode),
}

/// Recognize menu input. Leading emoji and case are ignored.
fn parse_command(input: &str) -> Option<Command> {
    let text = input
        .trim()
        .trim_start_matches(|c: char| !c.is_alphanumeric() && c != '/')
        .trim()
        .to_lowercase();

    match text.as_str() {
        "/start" | "start" | "menu" => Some(Command::Start),
        "hot posts" | "browse" => Some(Command::BrowseMenu),
        "search by topic" | "search" => Some(Command::SearchMenu),
        "back" => Some(Command::Back),
        "hot" => Some(Command::Listing(Mode::Hot)),
        "new" => Some(Command::Listing(Mode::New)),
        "top" => Some(Command::Listing(Mode::Top)),
        "rising" => Some(Command::Listing(Mode::Rising)),
        _ => None,
    }
}

/// Next state and action for `input` received in `state`.
pub fn transition(state: ConversationState, input: &str) -> (ConversationState, Action) {
    use ConversationState::{AwaitingKeywords, Idle};

    let command = parse_command(input);
    match (state, command) {
        (_, Some(Command::Start | Command::Back)) => (Idle, Action::ShowMenu),
        (AwaitingKeywords, _) => (Idle, Action::Search(input.trim().to_string())),
        (Idle, Some(Command::BrowseMenu)) => (Idle, Action::ShowModes),
        (Idle, Some(Command::SearchMenu)) => (AwaitingKeywords, Action::PromptKeywords),
        (Idle, Some(Command::Listing(mode))) => (Idle, Action::Browse(mode)),
        (Idle, None) => (Idle, Action::Unrecognized(input.trim().to_string())),
    }
}

#[derive(Debug, Default)]
pub struct Conversations {
    states: HashMap<ConversationId, ConversationState>,
}

impl Conversations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: ConversationId) -> ConversationState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    pub fn handle(&mut self, id: ConversationId, input: &str) -> Action {
        let (next, action) = transition(self.state(id), input);
        tracing::debug!(conversation = id, state = ?next, action = ?action, "Conversation step");

        match next {
            ConversationState::Idle => {
                self.states.remove(&id);
            }
            state => {
                self.states.insert(id, state);
            }
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_buttons_recognized() {
        let mut convs = Conversations::new();
        assert_eq!(convs.handle(1, "/start"), Action::ShowMenu);
        assert_eq!(convs.handle(1, MENU_BROWSE), Action::ShowModes);
        assert_eq!(convs.handle(1, "Rising"), Action::Browse(Mode::Rising));
        assert_eq!(convs.handle(1, MENU_BACK), Action::ShowMenu);
    }

    #[test]
    fn test_search_round_trip() {
        let mut convs = Conversations::new();
        assert_eq!(convs.handle(7, MENU_SEARCH), Action::PromptKeywords);
        assert_eq!(convs.state(7), ConversationState::AwaitingKeywords);

        assert_eq!(
            convs.handle(7, "  cat, dog "),
            Action::Search("cat, dog".to_string())
        );
        assert_eq!(convs.state(7), ConversationState::Idle);
    }

    #[test]
    fn test_keyword_line_matching_a_mode_is_still_a_search() {
        let mut convs = Conversations::new();
        convs.handle(1, "search");
        assert_eq!(convs.handle(1, "top"), Action::Search("top".to_string()));
    }

    #[test]
    fn test_back_cancels_keyword_prompt() {
        let mut convs = Conversations::new();
        convs.handle(1, MENU_SEARCH);
        assert_eq!(convs.handle(1, "back"), Action::ShowMenu);
        assert_eq!(convs.state(1), ConversationState::Idle);
    }

    #[test]
    fn test_conversations_are_independent() {
        let mut convs = Conversations::new();
        convs.handle(1, MENU_SEARCH);

        assert_eq!(convs.state(2), ConversationState::Idle);
        assert_eq!(convs.handle(2, "hot"), Action::Browse(Mode::Hot));
        assert_eq!(convs.state(1), ConversationState::AwaitingKeywords);
    }

    #[test]
    fn test_unrecognized_input() {
        let mut convs = Conversations::new();
        assert_eq!(
            convs.handle(1, "controversial"),
            Action::Unrecognized("controversial".to_string())
        );
    }

    #[test]
    fn test_every_menu_label_parses() {
        for label in MAIN_MENU.iter().chain(MODE_MENU.iter()) {
            assert!(parse_command(label).is_some(), "label {label:?}");
        }
    }
}
