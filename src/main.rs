//! spectrAI command line front end.
//!
//! ```text
//! spectrai <project-dir> labels
//! spectrai <project-dir> add-label <name>
//! spectrai <project-dir> rename-label <index> <name>
//! spectrai <project-dir> delete-label <index>
//! spectrai <project-dir> stats
//! spectrai <project-dir> show <image-file>
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use spectrai::config::AppConfig;
use spectrai::format;
use spectrai::session::Session;

const USAGE: &str = "usage: spectrai <project-dir> <labels | add-label NAME | rename-label INDEX NAME | delete-label INDEX | stats | show IMAGE>";

enum Command {
    Labels,
    AddLabel(String),
    RenameLabel(usize, String),
    DeleteLabel(usize),
    Stats,
    Show(PathBuf),
}

fn parse_args(args: &[String]) -> Result<(PathBuf, Command), String> {
    let (root, rest) = args.split_first().ok_or_else(|| USAGE.to_string())?;
    let index = |s: &String| {
        s.parse::<usize>()
            .map_err(|_| format!("invalid label index '{}'", s))
    };
    let command = match rest {
        [cmd] if cmd == "labels" => Command::Labels,
        [cmd] if cmd == "stats" => Command::Stats,
        [cmd, name] if cmd == "add-label" => Command::AddLabel(name.clone()),
        [cmd, idx, name] if cmd == "rename-label" => Command::RenameLabel(index(idx)?, name.clone()),
        [cmd, idx] if cmd == "delete-label" => Command::DeleteLabel(index(idx)?),
        [cmd, image] if cmd == "show" => Command::Show(PathBuf::from(image)),
        _ => return Err(USAGE.to_string()),
    };
    Ok((PathBuf::from(root), command))
}

fn run(root: &Path, command: Command, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new(&config.preferences);
    session.open_project(root)?;

    match command {
        Command::Labels => {
            if let Some(labels) = session.labels() {
                for (i, name) in labels.labels().iter().enumerate() {
                    println!("{:>3}  {}", i, name);
                }
            }
        }
        Command::AddLabel(name) => {
            let index = session.add_label(&name)?;
            println!("Added label {} ({})", index, name);
        }
        Command::RenameLabel(index, name) => {
            session.rename_label(index, &name)?;
            println!("Renamed label {} to {}", index, name);
        }
        Command::DeleteLabel(index) => {
            let summary = session.delete_label(index)?;
            println!(
                "Deleted label {}: {} boxes removed, {} shifted, {} files rewritten",
                index, summary.removed, summary.shifted, summary.files_rewritten
            );
            if summary.files_failed > 0 {
                println!("{} files could not be rewritten", summary.files_failed);
            }
        }
        Command::Stats => print_stats(&session)?,
        Command::Show(image) => {
            let image = if image.is_absolute() {
                image
            } else {
                session
                    .project()
                    .map(|p| p.images_dir.join(&image))
                    .unwrap_or(image)
            };
            let count = session.open_image(&image)?;
            let (width, height) = session.transform().image_size().unwrap_or_default();
            println!("{:?}: {}x{}, {} boxes", image, width, height, count);
            for bbox in session.boxes().iter() {
                let name = session
                    .labels()
                    .and_then(|l| l.get(bbox.label_index))
                    .unwrap_or("?");
                println!(
                    "  {:<14} x={} y={} w={} h={}",
                    name, bbox.rect.x, bbox.rect.y, bbox.rect.width, bbox.rect.height
                );
            }
        }
    }
    Ok(())
}

fn print_stats(session: &Session) -> Result<(), Box<dyn std::error::Error>> {
    let Some(labels) = session.labels() else {
        return Ok(());
    };
    let mut per_label = vec![0usize; labels.len()];
    let mut stale = 0;
    let mut annotated = 0;

    if let Some(dir) = session.annotation_dir().filter(|d| d.is_dir()) {
        for path in spectrai::labels::reindex::annotation_files(dir)? {
            let records = format::read_records(&path)?;
            if !records.is_empty() {
                annotated += 1;
            }
            for record in records {
                match per_label.get_mut(record.label_index) {
                    Some(count) => *count += 1,
                    None => stale += 1,
                }
            }
        }
    }

    println!("Images:    {}", session.images().len());
    println!("Annotated: {}", annotated);
    for (name, count) in labels.labels().iter().zip(&per_label) {
        println!("  {:<14} {}", name, count);
    }
    if stale > 0 {
        println!("  {} boxes reference unknown labels", stale);
    }
    Ok(())
}

fn init_logging(config: &AppConfig) {
    let level = config.preferences.log_level;
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();
    log::debug!("Log level from settings: {:?}", level);
}

/// Record `root` as the most recent project in the user settings.
fn remember_project(config: &mut AppConfig, root: &Path) {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    if config.preferences.last_project.as_deref() == Some(root.as_path()) {
        return;
    }
    config.preferences.last_project = Some(root);
    if let Err(e) = config.save_to_default_path() {
        log::warn!("Failed to save settings: {}", e);
    }
}

fn main() -> ExitCode {
    let mut config = AppConfig::load_from_default_path().unwrap_or_default();
    init_logging(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (root, command) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(&root, command, &config) {
        Ok(()) => {
            remember_project(&mut config, &root);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
