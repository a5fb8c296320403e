//! Interactive question-answering session.
//!
//! A session holds the episode filter, the debug flag and the previous
//! exchange. Input is either a slash command or a question; questions are
//! normalized, retrieved and answered. Rendering is left to the caller.

use crate::error::ClipcastError;
use crate::index::SearchFilter;
use crate::library::Library;
use crate::rag::{AnswerGenerator, Exchange, RagResponse};
use tracing::{debug, instrument};

/// Commands understood by [`Session::handle`].
pub const COMMAND_HELP: &str = "/episode [n|id]  /all  /list  /debug  /help  /quit";

/// One line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Restrict to an episode; no selector asks the user to choose.
    Episode(Option<String>),
    /// Search every episode again.
    All,
    List,
    /// Toggle showing retrieved segments.
    Debug,
    Help,
    Quit,
    /// A slash command we don't know.
    Unknown(String),
    Question(String),
    Empty,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Command::Empty;
        }

        let lower = input.to_lowercase();
        if matches!(lower.as_str(), "/quit" | "/exit" | "quit" | "exit" | "q") {
            return Command::Quit;
        }

        let Some(rest) = input.strip_prefix('/') else {
            return Command::Question(input.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };

        match name.to_lowercase().as_str() {
            "episode" => Command::Episode(arg.map(str::to_string)),
            "all" => Command::All,
            "list" => Command::List,
            "debug" => Command::Debug,
            "help" => Command::Help,
            _ => Command::Unknown(input.to_string()),
        }
    }
}

/// What a turn produced.
#[derive(Debug)]
pub enum Turn {
    Answer {
        response: RagResponse,
        /// Human-readable search scope.
        scope: String,
    },
    /// The user should pick an episode.
    ChooseEpisode,
    EpisodeSelected { id: String, title: String },
    AllEpisodes,
    ListEpisodes,
    DebugToggled(bool),
    Help,
    Unknown(String),
    Quit,
    Empty,
    /// The turn failed; the session continues.
    Failed(ClipcastError),
}

/// Per-user conversational state over a shared library.
pub struct Session<'a> {
    library: &'a Library,
    generator: AnswerGenerator,
    episode_filter: Option<String>,
    debug: bool,
    last_exchange: Option<Exchange>,
}

impl<'a> Session<'a> {
    pub fn new(library: &'a Library, generator: AnswerGenerator) -> Self {
        Self {
            library,
            generator,
            episode_filter: None,
            debug: false,
            last_exchange: None,
        }
    }

    pub fn library(&self) -> &Library {
        self.library
    }

    pub fn episode_filter(&self) -> Option<&str> {
        self.episode_filter.as_deref()
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn last_exchange(&self) -> Option<&Exchange> {
        self.last_exchange.as_ref()
    }

    /// Restrict questions to one episode, by position or id.
    pub fn select_episode(&mut self, selector: &str) -> Turn {
        match self.library.find_episode(selector) {
            Ok(episode) => {
                let (id, title) = (episode.id().to_string(), episode.title().to_string());
                self.episode_filter = Some(id.clone());
                self.last_exchange = None;
                Turn::EpisodeSelected { id, title }
            }
            Err(e) => Turn::Failed(e),
        }
    }

    /// Search every episode.
    pub fn clear_episode(&mut self) {
        self.episode_filter = None;
        self.last_exchange = None;
    }

    /// Handle one line of input.
    pub async fn handle(&mut self, input: &str) -> Turn {
        match Command::parse(input) {
            Command::Empty => Turn::Empty,
            Command::Quit => Turn::Quit,
            Command::Help => Turn::Help,
            Command::List => Turn::ListEpisodes,
            Command::Unknown(cmd) => Turn::Unknown(cmd),
            Command::Debug => {
                self.debug = !self.debug;
                Turn::DebugToggled(self.debug)
            }
            Command::All => {
                self.clear_episode();
                Turn::AllEpisodes
            }
            Command::Episode(None) => Turn::ChooseEpisode,
            Command::Episode(Some(selector)) => self.select_episode(&selector),
            Command::Question(question) => self.ask(&question).await,
        }
    }

    /// Answer a question within the current scope.
    #[instrument(skip(self))]
    pub async fn ask(&mut self, question: &str) -> Turn {
        let filter = match &self.episode_filter {
            Some(id) => SearchFilter::episode(id.clone()),
            None => SearchFilter::all(),
        };

        let retrieved = self.library.search(question, &filter);
        debug!("Retrieved {} segments", retrieved.len());

        match self
            .generator
            .generate(question, retrieved, self.last_exchange.as_ref())
            .await
        {
            Ok(response) => {
                self.last_exchange = Some(Exchange {
                    question: question.to_string(),
                    answer: response.answer.clone(),
                });
                Turn::Answer {
                    response,
                    scope: self.scope(),
                }
            }
            Err(e) => Turn::Failed(e.into()),
        }
    }

    /// Title of the selected episode, or "all episodes".
    pub fn scope(&self) -> String {
        self.episode_filter
            .as_deref()
            .map(|id| {
                self.library
                    .episode(id)
                    .map(|e| e.title().to_string())
                    .unwrap_or_else(|| id.to_string())
            })
            .unwrap_or_else(|| "all episodes".to_string())
    }
}
