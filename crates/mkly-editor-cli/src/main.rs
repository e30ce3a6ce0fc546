mod args;
mod inspect;
mod report;

use anyhow::{Context, Result, bail};
use args::{Command, Invocation, USAGE, parse_args};
use mkly_editor_config::Config;
use mkly_editor_engine::{
    EditorSession, SerializeOptions, StyleEdit, TargetOptions, io, next_identifier,
};
use std::{env, path::PathBuf, process};

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args: Vec<String> = env::args().collect();
    let invocation = match parse_args(&args[1..]) {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let path = match document_path(&invocation, &config) {
        Some(path) => path,
        None => {
            eprintln!("Error: No document given and no default_document configured");
            eprintln!("{USAGE}");
            eprintln!("Or set default_document in {}", Config::config_path().display());
            process::exit(1);
        }
    };

    run(invocation.command, path, &config)
}

fn document_path(invocation: &Invocation, config: &Config) -> Option<PathBuf> {
    invocation
        .file
        .clone()
        .or_else(|| config.default_document.clone())
}

fn session_options(config: &Config) -> (SerializeOptions, TargetOptions) {
    (
        SerializeOptions {
            indent: config.style.indent,
        },
        TargetOptions {
            class_prefix: config.targets.class_prefix.clone(),
            positional: config.targets.positional,
        },
    )
}

fn run(command: Command, path: PathBuf, config: &Config) -> Result<()> {
    let source = io::read_document(&path)
        .with_context(|| format!("Failed to open document '{}'", path.display()))?;
    let (serialize, targets) = session_options(config);
    let mut session = EditorSession::from_source(source).with_options(serialize, targets);
    for diagnostic in session.diagnostics() {
        log::warn!("{}", report::describe_diagnostic(diagnostic));
    }

    let writes = command.writes();
    let generation = session.generation();
    match command {
        Command::Locate { line } => {
            session.set_cursor(line);
            let Some(block) = session.cursor_block() else {
                bail!("No block at line {line}");
            };
            for text in report::describe_block(&block, session.style_graph()) {
                println!("{text}");
            }
        }
        Command::SetProp { line, key, value } => {
            session.set_cursor(line);
            if session.set_property(&key, &value)? {
                println!("Updated '{key}'");
            } else {
                println!("No change");
            }
        }
        Command::SetStyle {
            block_type,
            target,
            property,
            value,
            label,
        } => {
            let mut edit = StyleEdit::new(block_type, target, property, value);
            if let Some(label) = label {
                edit = edit.with_label(label);
            }
            let patch = session.apply_style(&edit)?;
            println!(
                "Style updated ({:+} lines from line {})",
                patch.line_delta, patch.shift_after_line
            );
        }
        Command::Label { line } => {
            session.set_cursor(line);
            let label = session.scope_cursor_block_to_instance()?;
            println!("{label}");
        }
        Command::Tag { line } => match session.tag_content_line(line) {
            Some(target) => println!("{target}"),
            None => bail!("Line {line} cannot be tagged"),
        },
        Command::NextId => println!("{}", next_identifier(session.source())),
        Command::Styles => println!(
            "{}",
            report::describe_styles(
                session.style_graph(),
                session.serialize_options(),
                &session.target_options().class_prefix
            )
        ),
        Command::Inspect => return inspect::run(session, &path),
    }

    if writes && session.generation() != generation {
        io::write_document(&path, session.source())
            .with_context(|| format!("Failed to save document '{}'", path.display()))?;
        log::info!("Saved {}", path.display());
    }
    Ok(())
}
