use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trait_mapper::config::Config;
use trait_mapper::models::*;
use trait_mapper::scoring::{QuestionnaireSession, Step};
use trait_mapper::store::{self, AppSettings, SettingsStore};
use trait_mapper::update::{ReleaseVersion, UpdateClient};
use trait_mapper::{ordering, render};

#[derive(Parser)]
#[command(name = "tmap")]
#[command(about = "Map fictional characters across sixteen personality traits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty project file
    New {
        file: PathBuf,
        /// Project title
        #[arg(short, long, default_value = "")]
        name: String,
    },
    /// Print the roster and every trait line
    Show { file: PathBuf },
    /// List the sixteen traits
    Traits,
    /// Add a character
    Add {
        file: PathBuf,
        /// Leave empty for an automatic "Character N"
        #[arg(short, long, default_value = "")]
        name: String,
        /// Palette name or #RRGGBB
        #[arg(short, long, default_value = "Red")]
        color: String,
        /// large/main, medium/supporting or small/background
        #[arg(short, long, default_value = "large", value_parser = parse_size)]
        size: BubbleSize,
    },
    /// Change a character's name, color or size
    Edit {
        file: PathBuf,
        character: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
        #[arg(short, long, value_parser = parse_size)]
        size: Option<BubbleSize>,
    },
    /// Delete a character
    Remove { file: PathBuf, character: String },
    /// Place a character on a trait line (0.0 - 1.0)
    Set {
        file: PathBuf,
        character: String,
        #[arg(value_name = "TRAIT")]
        trait_key: String,
        value: f64,
    },
    /// Toggle a character's lock
    Lock { file: PathBuf, character: String },
    /// Toggle a character's visibility
    Hide { file: PathBuf, character: String },
    /// Move a character within its group
    Reorder {
        file: PathBuf,
        character: String,
        /// Place before this character
        #[arg(long, conflicts_with = "after")]
        before: Option<String>,
        /// Place after this character
        #[arg(long)]
        after: Option<String>,
    },
    /// Set or clear the note for a trait
    Note {
        file: PathBuf,
        #[arg(value_name = "TRAIT")]
        trait_key: String,
        /// Omit to clear the note
        text: Option<String>,
    },
    /// Write all trait notes as text
    ExportNotes {
        file: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the questionnaire items
    Questions,
    /// Score a character from questionnaire answers
    Questionnaire {
        file: PathBuf,
        character: String,
        /// KEY=VALUE answer (1-5, 0 clears); prompts interactively when no answers are given
        #[arg(short, long = "answer")]
        answers: Vec<String>,
        /// JSON object of resource key to answer
        #[arg(long)]
        answers_file: Option<PathBuf>,
        /// Trait to leave out of scoring
        #[arg(long)]
        exclude: Vec<String>,
        /// Previously excluded trait to score again
        #[arg(long)]
        include: Vec<String>,
    },
    /// Show or change user settings
    Settings {
        #[arg(long)]
        dark_mode: Option<bool>,
        #[arg(long)]
        language: Option<String>,
    },
    /// Check whether a newer release is available
    CheckUpdate,
}

fn parse_size(s: &str) -> Result<BubbleSize, String> {
    BubbleSize::from_str(s).ok_or_else(|| format!("unknown size '{}'", s))
}

/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "trait_mapper=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn settings_store(config: &Config) -> Result<SettingsStore> {
    match &config.config_dir {
        Some(dir) => Ok(SettingsStore::in_dir(dir)),
        None => SettingsStore::open_default().context("Could not locate settings directory"),
    }
}

fn load(file: &Path) -> Result<Project> {
    store::load(file).with_context(|| format!("Error loading project {}", file.display()))
}

fn save(project: &Project, file: &Path) -> Result<()> {
    store::save(project, file).with_context(|| format!("Error saving project {}", file.display()))
}

/// Settings of the current session, defaults when none can be located.
fn session_settings(config: &Config) -> AppSettings {
    settings_store(config).map(|s| s.load()).unwrap_or_default()
}

/// Load, mutate and save in one step. The saved file records the session
/// language.
fn edit_project(
    config: &Config,
    file: &Path,
    f: impl FnOnce(&mut Project) -> Result<()>,
) -> Result<()> {
    let mut project = load(file)?;
    f(&mut project)?;
    session_settings(config).stamp(&mut project);
    save(&project, file)
}

fn character_index(project: &Project, name: &str) -> Result<usize> {
    project
        .find_character(name)
        .with_context(|| format!("No character named '{}'", name))
}

fn trait_for(key: &str) -> Result<&'static Trait> {
    lookup_trait(key).with_context(|| format!("Unknown trait '{}'", key))
}

fn color_for(input: &str) -> Result<String> {
    resolve_color(input).with_context(|| format!("'{}' is not a palette color or #RRGGBB", input))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let config = Config::from_env();

    match cli.command {
        Commands::New { file, name } => {
            if file.exists() {
                bail!("{} already exists", file.display());
            }
            if !store::is_project_path(&file) {
                tracing::warn!("project files normally end in .{}", store::PROJECT_EXTENSION);
            }
            let mut project = Project::named(name);
            session_settings(&config).stamp(&mut project);
            save(&project, &file)?;
            println!("Created {}", file.display());
        }
        Commands::Show { file } => {
            let (project, error) = store::load_or_new(&file);
            if let Some(e) = error {
                eprintln!("Error loading project: {}", e);
            }
            println!("{}", project.default_file_name());
            println!();
            print!("{}", render::render_roster(&project));
            println!();
            print!("{}", render::render_trait_lines(&project));
        }
        Commands::Traits => {
            for t in all_traits() {
                println!("{:<20} {} ({} ↔ {})", t.id, t.description, t.low_label, t.high_label);
            }
        }
        Commands::Add {
            file,
            name,
            color,
            size,
        } => {
            let color = color_for(&color)?;
            edit_project(&config, &file, |project| {
                let index = project.add_character(Character::new(name, color, size));
                println!("Added {}", project.characters[index].name);
                Ok(())
            })?;
        }
        Commands::Edit {
            file,
            character,
            rename,
            color,
            size,
        } => {
            let color = color.as_deref().map(color_for).transpose()?;
            edit_project(&config, &file, |project| {
                let index = character_index(project, &character)?;
                let mut changed = false;
                if let Some(size) = size {
                    changed |= project.set_character_size(index, size);
                }
                let c = &mut project.characters[index];
                if let Some(name) = rename {
                    changed |= c.set_name(name);
                }
                if let Some(color) = color {
                    changed |= c.set_color_hex(color);
                }
                println!("{}", if changed { "Updated" } else { "Nothing to change" });
                Ok(())
            })?;
        }
        Commands::Remove { file, character } => {
            edit_project(&config, &file, |project| {
                let index = character_index(project, &character)?;
                if let Some(removed) = project.remove_character(index) {
                    println!("Deleted {}", removed.name);
                }
                Ok(())
            })?;
        }
        Commands::Set {
            file,
            character,
            trait_key,
            value,
        } => {
            let t = trait_for(&trait_key)?;
            edit_project(&config, &file, |project| {
                let index = character_index(project, &character)?;
                let c = &mut project.characters[index];
                if !c.drag_trait_position(t, value) {
                    bail!("{} is locked", c.name);
                }
                let position = c.trait_position(t);
                println!("{} on {}: {:.2}", c.name, t.name, position);
                Ok(())
            })?;
        }
        Commands::Lock { file, character } => {
            edit_project(&config, &file, |project| {
                let index = character_index(project, &character)?;
                let c = &mut project.characters[index];
                let locked = c.toggle_locked();
                println!("{} {}", c.name, if locked { "locked" } else { "unlocked" });
                Ok(())
            })?;
        }
        Commands::Hide { file, character } => {
            edit_project(&config, &file, |project| {
                let index = character_index(project, &character)?;
                let c = &mut project.characters[index];
                let visible = c.toggle_visible();
                println!("{} {}", c.name, if visible { "shown" } else { "hidden" });
                Ok(())
            })?;
        }
        Commands::Reorder {
            file,
            character,
            before,
            after,
        } => {
            edit_project(&config, &file, |project| {
                let dropped = character_index(project, &character)?;
                let moved = match (before, after) {
                    (Some(target), _) => {
                        let target = character_index(project, &target)?;
                        project.reorder(dropped, target, false)
                    }
                    (None, Some(target)) => {
                        let target = character_index(project, &target)?;
                        project.reorder(dropped, target, true)
                    }
                    (None, None) => project.move_to_end(dropped),
                };
                if !moved {
                    bail!("Characters can only be reordered within their own group");
                }
                debug_assert!(ordering::is_contiguous(&project.characters));
                print!("{}", render::render_roster(project));
                Ok(())
            })?;
        }
        Commands::Note {
            file,
            trait_key,
            text,
        } => {
            let t = trait_for(&trait_key)?;
            edit_project(&config, &file, |project| {
                project.set_note(t.id, text.unwrap_or_default());
                Ok(())
            })?;
        }
        Commands::ExportNotes { file, output } => {
            let project = load(&file)?;
            let text = render::render_notes(&project);
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("Error exporting notes to {}", path.display()))?;
                    println!("Notes exported to {}", path.display());
                }
                None => print!("{}", text),
            }
        }
        Commands::Questions => {
            let bank = QuestionBank::embedded();
            for q in bank.questions() {
                let keying = if q.is_reverse_keyed { " (reversed)" } else { "" };
                println!("{:<24} {:<20} {}{}", q.resource_key, q.trait_id, q.text, keying);
            }
        }
        Commands::Questionnaire {
            file,
            character,
            answers,
            answers_file,
            exclude,
            include,
        } => {
            let bank = QuestionBank::embedded();
            let mut given = parse_answers(&answers)?;
            if let Some(path) = answers_file {
                let json = std::fs::read_to_string(&path)
                    .with_context(|| format!("Could not read {}", path.display()))?;
                let from_file: BTreeMap<String, i32> =
                    serde_json::from_str(&json).context("Answers file must map keys to numbers")?;
                given.extend(from_file);
            }

            let mut project = load(&file)?;
            let index = character_index(&project, &character)?;
            let mut session = QuestionnaireSession::for_character(&bank, &project.characters[index]);

            for key in &exclude {
                session.set_included(trait_for(key)?.id, false);
            }
            for key in &include {
                session.set_included(trait_for(key)?.id, true);
            }

            if given.is_empty() {
                let stdin = io::stdin();
                if run_interactive(&mut session, stdin.lock())? == Prompt::Cancel {
                    println!("Questionnaire cancelled; nothing saved");
                    return Ok(());
                }
            } else {
                for (key, value) in &given {
                    let key = bank.find(key).map(|q| q.resource_key.as_str()).unwrap_or(key.as_str());
                    if !session.answer(key, *value) {
                        bail!("Invalid answer {}={}", key, value);
                    }
                }
            }

            let outcome = session.submit();
            for (trait_id, score) in &outcome.scores {
                let name = find_trait(trait_id).map(|t| t.name).unwrap_or(trait_id.as_str());
                println!("{:<20} {:.2}", name, score);
            }
            if outcome.scores.is_empty() {
                println!("No traits were scored; positions unchanged");
            }
            outcome.apply_to(&mut project.characters[index]);
            session_settings(&config).stamp(&mut project);
            save(&project, &file)?;
        }
        Commands::Settings {
            dark_mode,
            language,
        } => {
            let settings_file = settings_store(&config)?;
            let mut settings = settings_file.load();
            let mut changed = false;
            if let Some(dark) = dark_mode {
                changed |= settings.is_dark_mode != dark;
                settings.is_dark_mode = dark;
            }
            if let Some(code) = language {
                let code = store::normalize_language(&code).to_string();
                changed |= settings.language_code != code;
                settings.language_code = code;
            }
            if changed && !settings_file.save(&settings) {
                eprintln!("Settings could not be saved to {}", settings_file.path().display());
            }
            println!("dark mode: {}", settings.is_dark_mode);
            println!("language:  {}", settings.language_code);
        }
        Commands::CheckUpdate => {
            let client = UpdateClient::from_config(&config)?;
            let current = ReleaseVersion::current();
            match client.check_for_update(&current).await {
                Some(info) => {
                    println!(
                        "A new version ({}) is available! You are currently using version {}.",
                        info.version.as_deref().unwrap_or("?"),
                        current
                    );
                    if let Some(notes) = info.release_notes.filter(|n| !n.trim().is_empty()) {
                        println!("\nRelease Notes:\n{}", notes);
                    }
                    if let Some(url) = info.url {
                        println!("\nDownload: {}", url);
                    }
                }
                None => println!("You are using the latest version ({}).", current),
            }
        }
    }

    Ok(())
}

fn parse_answers(pairs: &[String]) -> Result<BTreeMap<String, i32>> {
    pairs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("Expected KEY=VALUE, got '{}'", pair))?;
            let value: i32 = value
                .trim()
                .parse()
                .with_context(|| format!("Answer for {} is not a number", key))?;
            Ok((key.trim().to_string(), value))
        })
        .collect()
}

/// How an interactive questionnaire ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prompt {
    Submit,
    Cancel,
}

/// Walk the groups, reading one line per question. Each question takes 1-5,
/// empty to keep the current answer, or `0` to clear it. `s` skips the rest
/// of the group, `x` toggles whether the group is scored, `f` submits right
/// away and `q` cancels. End of input submits.
fn run_interactive(session: &mut QuestionnaireSession, input: impl BufRead) -> Result<Prompt> {
    let mut lines = input.lines();
    let mut stdout = io::stdout();

    loop {
        let Some(group) = session.current_group().cloned() else {
            return Ok(Prompt::Submit);
        };
        println!(
            "\n[{}/{}] {}{}",
            session.current_index() + 1,
            session.total_groups(),
            group.title,
            if group.include_in_calculation { "" } else { " (excluded)" }
        );

        for state in &group.questions {
            let current = if state.is_answered() {
                state.answer.to_string()
            } else {
                "-".to_string()
            };
            print!("  {} [{}] > ", state.question.text, current);
            stdout.flush()?;

            let Some(line) = lines.next().transpose()? else {
                return Ok(Prompt::Submit);
            };
            match line.trim() {
                "" => {}
                "q" => return Ok(Prompt::Cancel),
                "f" => return Ok(Prompt::Submit),
                "s" => break,
                "x" => {
                    session.set_included(&group.trait_id, !group.include_in_calculation);
                    break;
                }
                input => {
                    let value: i32 = input.parse().unwrap_or(-1);
                    if !session.answer(&state.question.resource_key, value) {
                        println!("  (ignored: answers are 1-5, 0 clears)");
                    }
                }
            }
        }

        if session.next() == Step::Finished {
            return Ok(Prompt::Submit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> QuestionnaireSession {
        QuestionnaireSession::new(&QuestionBank::embedded())
    }

    #[test]
    fn test_interactive_cancel() {
        let mut session = session();
        let prompt = run_interactive(&mut session, "5\nq\n".as_bytes()).unwrap();
        assert_eq!(prompt, Prompt::Cancel);
    }

    #[test]
    fn test_interactive_end_of_input_submits() {
        let mut session = session();
        let prompt = run_interactive(&mut session, "5\n".as_bytes()).unwrap();
        assert_eq!(prompt, Prompt::Submit);
        assert_eq!(session.submit().scores.len(), 1);
    }

    #[test]
    fn test_interactive_finish_early() {
        let mut session = session();
        let prompt = run_interactive(&mut session, "4\nf\n3\n".as_bytes()).unwrap();
        assert_eq!(prompt, Prompt::Submit);
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.submit().answers.len(), 1);
    }

    #[test]
    fn test_parse_answers() {
        let parsed = parse_answers(&["Q_Warmth_1 = 4".to_string()]).unwrap();
        assert_eq!(parsed.get("Q_Warmth_1"), Some(&4));
        assert!(parse_answers(&["Q_Warmth_1".to_string()]).is_err());
    }
}
