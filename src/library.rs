//! The loaded podcast library.
//!
//! Loads every episode once, chunks it, builds the segment index and hands
//! out retrieval and answer generation over it. Nothing changes after
//! loading; share a `Library` by reference or behind an `Arc`.

use crate::chunking::ChunkingConfig;
use crate::config::{Prompts, Settings};
use crate::episode::Episode;
use crate::error::{ClipcastError, Result};
use crate::index::{normalize_query, RetrievalResult, SearchFilter, SegmentIndex};
use crate::rag::{AnswerGenerator, Completer, Exchange, OpenAICompleter, RagResponse, Retriever};
use crate::transcript::{load_transcripts, EpisodeTranscript};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// All episodes plus the index built over them.
pub struct Library {
    settings: Settings,
    episodes: Vec<Episode>,
    index: SegmentIndex,
    retriever: Retriever,
}

impl Library {
    /// Load from the episodes directory named in settings.
    pub fn load(settings: Settings) -> Result<Self> {
        let dir = settings.episodes_dir();
        Self::load_from(&dir, settings)
    }

    /// Load every episode file under `dir`.
    ///
    /// The first file that fails to parse or chunk aborts loading.
    #[instrument(skip(settings))]
    pub fn load_from(dir: &Path, settings: Settings) -> Result<Self> {
        let config = ChunkingConfig::from(&settings.chunking);

        let episodes = load_transcripts(dir)?
            .into_iter()
            .map(|(path, transcript)| {
                Episode::build(transcript, &config).map_err(|e| ClipcastError::EpisodeLoad {
                    path,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_episodes(episodes, settings)
    }

    /// Build a library from transcripts already in memory.
    pub fn from_transcripts(transcripts: Vec<EpisodeTranscript>, settings: Settings) -> Result<Self> {
        let config = ChunkingConfig::from(&settings.chunking);
        let episodes = transcripts
            .into_iter()
            .map(|t| Episode::build(t, &config))
            .collect::<Result<Vec<_>>>()?;
        Self::from_episodes(episodes, settings)
    }

    /// Index built episodes. Episode ids must be unique.
    pub fn from_episodes(mut episodes: Vec<Episode>, settings: Settings) -> Result<Self> {
        let mut seen = HashSet::new();
        for episode in &episodes {
            if !seen.insert(episode.id().to_string()) {
                return Err(ClipcastError::InvalidInput(format!(
                    "Duplicate episode id: {}",
                    episode.id()
                )));
            }
        }

        episodes.sort_by_key(|e| {
            let t = e.transcript();
            (
                number(t.season.as_deref()),
                number(t.episode_number.as_deref()),
                e.id().to_string(),
            )
        });

        let index = SegmentIndex::build(&episodes);
        let retriever = Retriever::from_settings(&settings.retrieval);

        info!(
            "Library ready: {} episode(s), {} segments",
            episodes.len(),
            index.len()
        );

        Ok(Self {
            settings,
            episodes,
            index,
            retriever,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Episodes ordered by season and episode number.
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn index(&self) -> &SegmentIndex {
        &self.index
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    /// Episode by exact id.
    pub fn episode(&self, id: &str) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.id() == id)
    }

    /// Resolve a selector: a 1-based position in [`Self::episodes`] or an id.
    pub fn find_episode(&self, selector: &str) -> Result<&Episode> {
        let selector = selector.trim();

        if let Some(episode) = self.episode(selector) {
            return Ok(episode);
        }

        selector
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.episodes.get(i))
            .ok_or_else(|| ClipcastError::EpisodeNotFound(selector.to_string()))
    }

    /// Rewrite a question against the index vocabulary.
    pub fn normalize_query(&self, question: &str) -> String {
        normalize_query(question, self.index.vocabulary())
    }

    /// Retrieve segments for a query.
    pub fn search(&self, query: &str, filter: &SearchFilter) -> RetrievalResult {
        let normalized = self.normalize_query(query);
        self.retriever.retrieve(&self.index, &normalized, filter)
    }

    /// Answer generator over the configured completion endpoint.
    pub fn answer_generator(&self) -> Result<AnswerGenerator> {
        let completer = OpenAICompleter::new(&self.settings.generation)?;
        self.answer_generator_with(Arc::new(completer))
    }

    /// Answer generator over a given completer, with configured prompts and policy.
    pub fn answer_generator_with(&self, completer: Arc<dyn Completer>) -> Result<AnswerGenerator> {
        let prompts = Prompts::load(
            self.settings.prompts.custom_dir.as_deref(),
            Some(&self.settings.prompts.variables),
        )?;

        Ok(AnswerGenerator::new(completer)
            .with_prompts(prompts)
            .with_policy(self.settings.generation.grounding_policy))
    }

    /// Retrieve and answer in one step.
    #[instrument(skip(self, generator, previous))]
    pub async fn ask(
        &self,
        generator: &AnswerGenerator,
        question: &str,
        filter: &SearchFilter,
        previous: Option<&Exchange>,
    ) -> Result<RagResponse> {
        let retrieved = self.search(question, filter);
        Ok(generator.generate(question, retrieved, previous).await?)
    }
}

fn number(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_transcript, SAMPLE_EPISODE};

    fn second_episode() -> EpisodeTranscript {
        let mut transcript = sample_transcript();
        transcript.id = "second".to_string();
        transcript.title = "Feature Stores in Practice".to_string();
        transcript.season = Some("2".to_string());
        transcript.episode_number = Some("1".to_string());
        transcript
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("episode.md"), SAMPLE_EPISODE).unwrap();

        let library = Library::load_from(dir.path(), Settings::default()).unwrap();
        assert_eq!(library.episodes().len(), 1);
        assert!(!library.index().is_empty());
        assert!(library.episode("IDzhmmKeNG4").is_some());
    }

    #[test]
    fn test_chunking_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = SAMPLE_EPISODE.replace(
            "  - header: A/B Testing as Personalization Foundation",
            "  - header: A section nobody clipped",
        );
        std::fs::write(dir.path().join("broken.md"), broken).unwrap();

        let err = Library::load_from(dir.path(), Settings::default())
            .err()
            .unwrap();
        match err {
            ClipcastError::EpisodeLoad { path, source } => {
                assert!(path.ends_with("broken.md"));
                assert!(matches!(*source, ClipcastError::Chunking(_)));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_episodes_sorted_and_selectable() {
        let library =
            Library::from_transcripts(vec![sample_transcript(), second_episode()], Settings::default())
                .unwrap();

        let ids: Vec<&str> = library.episodes().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["second", "IDzhmmKeNG4"]);

        assert_eq!(library.find_episode("1").unwrap().id(), "second");
        assert_eq!(library.find_episode("IDzhmmKeNG4").unwrap().id(), "IDzhmmKeNG4");
        assert!(matches!(
            library.find_episode("7"),
            Err(ClipcastError::EpisodeNotFound(_))
        ));
        assert!(library.find_episode("0").is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Library::from_transcripts(
            vec![sample_transcript(), sample_transcript()],
            Settings::default(),
        );
        assert!(matches!(result, Err(ClipcastError::InvalidInput(_))));
    }

    #[test]
    fn test_search_respects_episode_filter() {
        let library =
            Library::from_transcripts(vec![sample_transcript(), second_episode()], Settings::default())
                .unwrap();

        let result = library.search("recommender agenda", &SearchFilter::episode("second"));
        assert!(!result.is_empty());
        assert!(result.segments().all(|s| s.episode_id == "second"));
    }
}
