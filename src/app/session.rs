use crate::config::BotSettings;
use crate::domain::model::SearchCriteria;
use std::collections::HashMap;

pub const SALARY_FROM_PREFIX: &str = "salary_from:";
pub const SALARY_TO_PREFIX: &str = "salary_to:";
pub const EXPERIENCE_PREFIX: &str = "experience:";
pub const EXPERIENCE_RESET: &str = "experience_reset";
pub const EXPERIENCE_COMPLETE: &str = "experience_complete";
const ANY: &str = "any";

const MENU: &str = "Hello! I'm a bot that can find resumes on Work.ua and Robota.ua \
based on the parameters you provide.\n\
Choose your option:\n\
/keywords - search query\n\
/region - region\n\
/salary - salary range\n\
/experience - required experience\n\
/search - start searching\n\
/clear - clear all parameters";

const NOT_STARTED: &str = "Please type /start to make a request.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Stop,
    Clear,
    Help,
    /// `/keywords rust developer` sets the query in one step.
    Keywords(Option<String>),
    Region(Option<String>),
    Salary,
    Experience,
    Search,
}

impl BotCommand {
    /// Parses `/command[@botname] [argument]`. Returns `None` for plain text
    /// and unknown commands.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;
        let (head, argument) = match rest.split_once(char::is_whitespace) {
            Some((head, argument)) => (head, argument.trim()),
            None => (rest, ""),
        };
        let name = head.split('@').next().unwrap_or_default().to_lowercase();
        let argument = (!argument.is_empty()).then(|| argument.to_string());

        let command = match name.as_str() {
            "start" => BotCommand::Start,
            "stop" => BotCommand::Stop,
            "clear" => BotCommand::Clear,
            "help" => BotCommand::Help,
            "keywords" => BotCommand::Keywords(argument),
            "region" => BotCommand::Region(argument),
            "salary" => BotCommand::Salary,
            "experience" => BotCommand::Experience,
            "search" => BotCommand::Search,
            _ => return None,
        };
        Some(command)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatState {
    #[default]
    Free,
    AskingKeywords,
    AskingRegion,
    AskingSalaryFrom,
    AskingSalaryTo,
    AskingExperience,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatSession {
    pub state: ChatState,
    pub criteria: SearchCriteria,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }
}

pub type Keyboard = Vec<Vec<Button>>;

/// What the chat front end should do next. Produced by `SessionStore`,
/// executed by the Telegram handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Keyboard { text: String, keyboard: Keyboard },
    /// Replace the message the pressed button belongs to.
    Edit {
        text: String,
        keyboard: Option<Keyboard>,
    },
    Search(SearchCriteria),
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }
}

/// Per-chat search parameters and dialogue state.
pub struct SessionStore {
    sessions: HashMap<i64, ChatSession>,
    options: BotSettings,
}

impl SessionStore {
    pub fn new(options: BotSettings) -> Self {
        Self {
            sessions: HashMap::new(),
            options,
        }
    }

    pub fn session(&self, chat_id: i64) -> Option<&ChatSession> {
        self.sessions.get(&chat_id)
    }

    /// Runs `f` on the chat's session, or asks the user to /start first.
    fn with_session<F>(&mut self, chat_id: i64, f: F) -> Reply
    where
        F: FnOnce(&mut ChatSession, &BotSettings) -> Reply,
    {
        let options = &self.options;
        match self.sessions.get_mut(&chat_id) {
            Some(session) => f(session, options),
            None => Reply::text(NOT_STARTED),
        }
    }

    pub fn handle_command(&mut self, chat_id: i64, command: BotCommand) -> Reply {
        match command {
            BotCommand::Start => {
                self.sessions.insert(chat_id, ChatSession::default());
                Reply::text(MENU)
            }
            BotCommand::Help => Reply::text(MENU),
            BotCommand::Stop => {
                self.sessions.remove(&chat_id);
                Reply::text("Goodbye! Hope I was helpful.")
            }
            BotCommand::Clear => {
                self.sessions.insert(chat_id, ChatSession::default());
                Reply::text("All parameters cleared. You can now provide new parameters.")
            }
            BotCommand::Keywords(Some(keywords)) => self.with_session(chat_id, |session, _| {
                session.state = ChatState::Free;
                session.criteria.keywords = keywords;
                Reply::text(format!("Search query set to: {}", session.criteria.keywords))
            }),
            BotCommand::Keywords(None) => self.with_session(chat_id, |session, _| {
                session.state = ChatState::AskingKeywords;
                Reply::text("Please provide your search query.")
            }),
            BotCommand::Region(Some(region)) => self.with_session(chat_id, |session, _| {
                session.state = ChatState::Free;
                let reply = Reply::text(format!("Region set to: {}", region));
                session.criteria.region = Some(region);
                reply
            }),
            BotCommand::Region(None) => self.with_session(chat_id, |session, _| {
                session.state = ChatState::AskingRegion;
                Reply::text("Please provide your desired region.")
            }),
            BotCommand::Salary => self.with_session(chat_id, |session, options| {
                session.state = ChatState::AskingSalaryFrom;
                Reply::Keyboard {
                    text: "Select the minimum salary:".to_string(),
                    keyboard: salary_keyboard(SALARY_FROM_PREFIX, &options.salary_from, None),
                }
            }),
            BotCommand::Experience => self.with_session(chat_id, |session, options| {
                session.state = ChatState::AskingExperience;
                Reply::Keyboard {
                    text: "Please choose experience levels (you can select multiple):".to_string(),
                    keyboard: experience_keyboard(&options.experience, &session.criteria.experience),
                }
            }),
            BotCommand::Search => self.with_session(chat_id, |session, _| {
                session.state = ChatState::Free;
                if session.criteria.is_searchable() {
                    Reply::Search(session.criteria.clone())
                } else {
                    Reply::text("Please provide at least keywords with /keywords.")
                }
            }),
        }
    }

    /// Free text answers whatever the session last asked for.
    pub fn handle_text(&mut self, chat_id: i64, text: &str) -> Reply {
        let Some(session) = self.sessions.get_mut(&chat_id) else {
            return Reply::text(NOT_STARTED);
        };
        let text = text.trim();

        let reply = match session.state {
            ChatState::AskingKeywords if !text.is_empty() => {
                session.criteria.keywords = text.to_string();
                Reply::text(format!("Search query set to: {}", text))
            }
            ChatState::AskingRegion if !text.is_empty() => {
                session.criteria.region = Some(text.to_string());
                Reply::text(format!("Region set to: {}", text))
            }
            ChatState::AskingKeywords | ChatState::AskingRegion => {
                return Reply::text("Please send a non-empty value.");
            }
            ChatState::AskingSalaryFrom | ChatState::AskingSalaryTo | ChatState::AskingExperience => {
                return Reply::text("Please use the buttons above to choose.");
            }
            ChatState::Free => {
                return Reply::text(
                    "It seems you're not choosing any parameter, type one of the following \
                     commands: /keywords, /region, /salary, /experience, /search, /clear",
                );
            }
        };
        session.state = ChatState::Free;
        reply
    }

    /// Inline keyboard presses. Returns `None` for data this store does not
    /// understand so the front end can just acknowledge the press.
    pub fn handle_callback(&mut self, chat_id: i64, data: &str) -> Option<Reply> {
        let options = &self.options;
        let Some(session) = self.sessions.get_mut(&chat_id) else {
            return Some(Reply::Edit {
                text: format!("This menu has expired. {}", NOT_STARTED),
                keyboard: None,
            });
        };

        if let Some(value) = data.strip_prefix(SALARY_FROM_PREFIX) {
            session.criteria.salary_from = parse_amount(value)?;
            session.state = ChatState::AskingSalaryTo;
            let floor = session.criteria.salary_from;
            return Some(Reply::Edit {
                text: "Select the maximum salary:".to_string(),
                keyboard: Some(salary_keyboard(SALARY_TO_PREFIX, &options.salary_to, floor)),
            });
        }

        if let Some(value) = data.strip_prefix(SALARY_TO_PREFIX) {
            session.criteria.salary_to = parse_amount(value)?;
            session.state = ChatState::Free;
            return Some(Reply::Edit {
                text: format!(
                    "Salary range set: {}",
                    salary_range(session.criteria.salary_from, session.criteria.salary_to)
                ),
                keyboard: None,
            });
        }

        let selected = &mut session.criteria.experience;
        match data {
            EXPERIENCE_COMPLETE => {
                session.state = ChatState::Free;
                Some(Reply::Edit {
                    text: format!("Experience selection completed: {}.", selected_text(selected)),
                    keyboard: None,
                })
            }
            EXPERIENCE_RESET => {
                selected.clear();
                Some(Reply::Edit {
                    text: "Experience options have been reset. Please select again.".to_string(),
                    keyboard: Some(experience_keyboard(&options.experience, selected)),
                })
            }
            _ => {
                let index: usize = data.strip_prefix(EXPERIENCE_PREFIX)?.parse().ok()?;
                let label = options.experience.get(index)?;
                match selected.iter().position(|s| s == label) {
                    Some(pos) => {
                        selected.remove(pos);
                    }
                    None => selected.push(label.clone()),
                }
                Some(Reply::Edit {
                    text: format!(
                        "Experience options selected: {}\nYou can toggle options, reset, or complete your selection.",
                        selected_text(selected)
                    ),
                    keyboard: Some(experience_keyboard(&options.experience, selected)),
                })
            }
        }
    }
}

/// `Some(None)` is the "Any" button; `None` is unparseable data.
fn parse_amount(value: &str) -> Option<Option<u32>> {
    if value == ANY {
        Some(None)
    } else {
        value.parse().ok().map(Some)
    }
}

fn salary_keyboard(prefix: &str, amounts: &[u32], floor: Option<u32>) -> Keyboard {
    let mut rows: Keyboard = amounts
        .iter()
        .filter(|amount| floor.map_or(true, |floor| **amount > floor))
        .map(|amount| vec![Button::new(format!("{} UAH", amount), format!("{}{}", prefix, amount))])
        .collect();
    rows.push(vec![Button::new("Any", format!("{}{}", prefix, ANY))]);
    rows
}

fn experience_keyboard(labels: &[String], selected: &[String]) -> Keyboard {
    let mut rows: Keyboard = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            let text = if selected.contains(label) {
                format!("✅ {}", label)
            } else {
                label.clone()
            };
            vec![Button::new(text, format!("{}{}", EXPERIENCE_PREFIX, index))]
        })
        .collect();
    rows.push(vec![
        Button::new("🔄 Reset", EXPERIENCE_RESET),
        Button::new("✔️ Complete", EXPERIENCE_COMPLETE),
    ]);
    rows
}

fn selected_text(selected: &[String]) -> String {
    if selected.is_empty() {
        "None".to_string()
    } else {
        selected.join(", ")
    }
}

fn salary_range(from: Option<u32>, to: Option<u32>) -> String {
    match (from, to) {
        (None, None) => "any".to_string(),
        (Some(from), None) => format!("from {} UAH", from),
        (None, Some(to)) => format!("up to {} UAH", to),
        (Some(from), Some(to)) => format!("{} - {} UAH", from, to),
    }
}
