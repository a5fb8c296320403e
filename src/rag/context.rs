//! Context formatting for prompts and display.

use crate::index::RetrievalResult;

/// Format retrieved segments as numbered context blocks for a prompt.
pub fn format_context_for_prompt(result: &RetrievalResult) -> String {
    result
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            let segment = &scored.segment;
            format!(
                "[Context {}]\nEpisode  : {}\nSection  : {}\nTimestamp: {}  (second {})\nLink     : {}\nSpeakers : {}\nContent  : {}\n",
                i + 1,
                segment.episode_title,
                segment.label(),
                segment.format_timestamp(),
                segment.start_seconds.floor() as u64,
                segment.deep_link,
                segment.speakers.join(", "),
                segment.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format retrieved segments for display to the user.
pub fn format_context_for_display(result: &RetrievalResult) -> String {
    result
        .iter()
        .map(|scored| {
            let segment = &scored.segment;
            format!(
                "[{}] [{}] {} (score: {:.2})\n  {}",
                segment.format_timestamp(),
                segment.strategy,
                segment.label(),
                scored.score,
                segment.deep_link
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkStrategy;
    use crate::testing::{scored, segment};

    #[test]
    fn test_prompt_blocks_are_numbered() {
        let mut first = segment("ep1", ChunkStrategy::Header, 2139.0, 2397.0);
        first.text = "Stefan: We build a recommender.".to_string();
        first.speakers = vec!["Stefan".to_string()];
        let second = segment("ep1", ChunkStrategy::Window, 90.0, 150.0);

        let result = RetrievalResult::new(vec![scored(first, 2.0), scored(second, 1.0)]);
        let context = format_context_for_prompt(&result);

        assert!(context.starts_with("[Context 1]\n"));
        assert!(context.contains("[Context 2]\n"));
        assert!(context.contains("Timestamp: 35:39  (second 2139)"));
        assert!(context.contains("Link     : https://www.youtube.com/watch?v=ep1&t=2139"));
        assert!(context.contains("Speakers : Stefan"));
        assert!(context.contains("Section  : ~01:30"));
    }

    #[test]
    fn test_display_format() {
        let result = RetrievalResult::new(vec![scored(
            segment("ep1", ChunkStrategy::Window, 90.0, 150.0),
            0.5,
        )]);
        let display = format_context_for_display(&result);
        assert_eq!(
            display,
            "[01:30] [window] ~01:30 (score: 0.50)\n  https://www.youtube.com/watch?v=ep1&t=90"
        );
    }
}
