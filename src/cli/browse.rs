use std::io::Write;
use std::process::ExitCode;

use color_print::cformat;
use eyre::Result;

use crate::cli::chat::prompt;
use crate::client::ApiClient;
use crate::recommender::{RecommendationRecord, DEFAULT_TOP_N};

const MAX_LISTED: usize = 25;

/// Recommendation browser: pick a song from the catalogue, see similar ones.
pub struct Browser {
    output: Box<dyn Write>,
    api_client: ApiClient,
    top_n: usize,
}

impl Browser {
    pub fn new(output: Box<dyn Write>, api_client: ApiClient, top_n: Option<usize>) -> Self {
        Self {
            output,
            api_client,
            top_n: top_n.unwrap_or(DEFAULT_TOP_N),
        }
    }

    /// Look up one song and exit.
    pub async fn run_once(&mut self, song: &str) -> Result<ExitCode> {
        self.show_recommendations(song).await?;
        Ok(ExitCode::SUCCESS)
    }

    pub async fn run(&mut self, filter: Option<&str>) -> Result<ExitCode> {
        let songs = match self.api_client.get_all_songs().await {
            Ok(songs) => songs,
            Err(e) => {
                writeln!(self.output, "{}", cformat!("<red>Error loading songs: {}</red>", e))?;
                return Ok(ExitCode::FAILURE);
            }
        };

        let matches = filter_songs(&songs, filter);
        if matches.is_empty() {
            writeln!(self.output, "No songs available. Check API connection or filter.")?;
            return Ok(ExitCode::FAILURE);
        }

        writeln!(self.output, "{}", cformat!("<bold>Select a Song</bold> ({} total)", matches.len()))?;
        for (idx, title) in matches.iter().take(MAX_LISTED).enumerate() {
            writeln!(self.output, "{:>3}. {}", idx + 1, title)?;
        }
        if matches.len() > MAX_LISTED {
            writeln!(
                self.output,
                "     … {} more; narrow the list with --filter",
                matches.len() - MAX_LISTED
            )?;
        }
        writeln!(self.output, "\nEnter a number or a title, empty line or /quit to exit.")?;

        let mut rl = prompt::rl()?;
        loop {
            let line = match rl.readline(&prompt::generate_prompt(Some("song> "))) {
                Ok(line) => line,
                Err(_) => break,
            };
            let choice = line.trim();
            if choice.is_empty() || choice == "/quit" {
                break;
            }
            rl.add_history_entry(choice);

            let song = pick(&matches, choice).unwrap_or(choice).to_owned();
            if let Err(e) = self.show_recommendations(&song).await {
                writeln!(self.output, "Error: {}", e)?;
            }
        }

        Ok(ExitCode::SUCCESS)
    }

    async fn show_recommendations(&mut self, song: &str) -> Result<()> {
        writeln!(self.output, "Analyzing lyrics for '{}'...", song)?;
        match self.api_client.get_recommendations(song, self.top_n).await {
            Ok(Some(records)) => {
                writeln!(self.output, "{}", cformat!("\n<bold>Recommended Tracks</bold>"))?;
                for record in &records {
                    writeln!(self.output, "{}", song_card(record))?;
                }
                writeln!(self.output)?;
            }
            Ok(None) => writeln!(self.output, "{}", cformat!("<yellow>Song not found in dataset</yellow>"))?,
            Err(e) => writeln!(self.output, "{}", cformat!("<red>Error: {}</red>", e))?,
        }
        Ok(())
    }
}

/// Case-insensitive substring filter; `None` keeps everything.
pub fn filter_songs<'a>(songs: &'a [String], filter: Option<&str>) -> Vec<&'a str> {
    let needle = filter.map(|f| f.trim().to_lowercase()).unwrap_or_default();
    songs
        .iter()
        .map(String::as_str)
        .filter(|s| needle.is_empty() || s.to_lowercase().contains(&needle))
        .collect()
}

/// A 1-based index into `songs`, if `choice` is one.
fn pick<'a>(songs: &[&'a str], choice: &str) -> Option<&'a str> {
    let idx: usize = choice.parse().ok()?;
    songs.get(idx.checked_sub(1)?).copied()
}

fn song_card(record: &RecommendationRecord) -> String {
    let mut card = cformat!("  <cyan>♪ {}</cyan>\n    by {}", record.song, record.artist);
    if let Some(link) = record.link.as_deref().filter(|l| !l.is_empty()) {
        card.push_str(&format!("\n    {}", link));
    }
    card
}
