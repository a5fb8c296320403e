//! Interactive chat command.

use super::load_library;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::library::Library;
use crate::session::{Session, Turn, COMMAND_HELP};
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(episode: Option<&str>, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'clipcast doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let library = load_library(settings)?;
    let generator = library.answer_generator()?;
    let mut session = Session::new(&library, generator);

    if let Some(selector) = episode {
        render(&library, session.select_episode(selector), false);
    }

    println!("\n{}", style("clipcast chat").bold().cyan());
    match library.episodes() {
        [only] => println!("{}", style(format!("Loaded: {}", only.title())).dim()),
        episodes => println!("{}", style(format!("Loaded: {} episodes", episodes.len())).dim()),
    }
    println!("{}\n", style(format!("Ask anything. Commands: {}", COMMAND_HELP)).dim());

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            Output::info("Goodbye!");
            break;
        }

        let turn = match session.handle(&input).await {
            Turn::ChooseEpisode => {
                print_episodes(&library);
                print!("Episode number or id (Enter for all episodes): ");
                stdout.flush()?;

                let mut choice = String::new();
                stdin.lock().read_line(&mut choice)?;
                if choice.trim().is_empty() {
                    session.clear_episode();
                    Turn::AllEpisodes
                } else {
                    session.select_episode(&choice)
                }
            }
            Turn::Answer { response, scope } => {
                println!("{}", style(format!("Searched {}", scope)).dim());
                if session.debug() {
                    Output::header(&format!("Retrieved {} segments", response.sources.len()));
                    for source in &response.sources {
                        Output::segment_result(source);
                    }
                }
                Turn::Answer { response, scope }
            }
            other => other,
        };

        if !render(&library, turn, true) {
            break;
        }
    }

    Ok(())
}

/// Print the outcome of a turn. Returns false when the session should end.
fn render(library: &Library, turn: Turn, interactive: bool) -> bool {
    match turn {
        Turn::Quit => {
            Output::info("Goodbye!");
            return false;
        }
        Turn::Empty | Turn::ChooseEpisode => {}
        Turn::Answer { response, .. } => {
            println!("\n{}", style("clipcast:").cyan().bold());
            Output::answer(&response);
        }
        Turn::EpisodeSelected { title, .. } => Output::success(&format!("Now searching: {}", title)),
        Turn::AllEpisodes => Output::info("Now searching all episodes."),
        Turn::ListEpisodes => print_episodes(library),
        Turn::DebugToggled(on) => {
            Output::info(&format!("Debug mode: {}", if on { "on" } else { "off" }))
        }
        Turn::Help => Output::info(&format!("Commands: {}", COMMAND_HELP)),
        Turn::Unknown(cmd) => {
            Output::warning(&format!("Unknown command {}. Try: {}", cmd, COMMAND_HELP))
        }
        Turn::Failed(e) => {
            Output::error(&format!("Error: {}", e));
            if !interactive {
                Output::info("Searching all episodes.");
            }
        }
    }
    true
}

fn print_episodes(library: &Library) {
    Output::header(&format!("Episodes ({})", library.episodes().len()));
    for (i, episode) in library.episodes().iter().enumerate() {
        Output::episode_info(i + 1, episode);
    }
    println!();
}
