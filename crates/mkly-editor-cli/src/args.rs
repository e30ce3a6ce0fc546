use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: mkly-editor [file] <command> [args...]

Commands:
  locate <line>                                   Show the block at a line
  set-prop <line> <key> [value]                   Set or remove a block property
  set-style <block-type> <target> <property> [value] [--label <label>]
                                                  Set or remove a style property
  label <header-line>                             Scope a block to its own instance
  tag <content-line>                              Tag a content line with a class
  next-id                                         Print the next free identifier
  styles                                          Print the style block and descendant CSS
  inspect                                         Open the terminal inspector

Without [file] the default_document from the config file is used.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Locate {
        line: usize,
    },
    SetProp {
        line: usize,
        key: String,
        value: String,
    },
    SetStyle {
        block_type: String,
        target: String,
        property: String,
        value: String,
        label: Option<String>,
    },
    Label {
        line: usize,
    },
    Tag {
        line: usize,
    },
    NextId,
    Styles,
    Inspect,
}

impl Command {
    /// Whether running the command may rewrite the document.
    pub fn writes(&self) -> bool {
        matches!(
            self,
            Command::SetProp { .. }
                | Command::SetStyle { .. }
                | Command::Label { .. }
                | Command::Tag { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// `None` means "use the configured default document".
    pub file: Option<PathBuf>,
    pub command: Command,
}

const COMMANDS: &[&str] = &[
    "locate",
    "set-prop",
    "set-style",
    "label",
    "tag",
    "next-id",
    "styles",
    "inspect",
];

/// Parses everything after the program name.
pub fn parse_args(args: &[String]) -> Result<Invocation, String> {
    let (file, rest) = match args.first() {
        None => return Err("Missing command".to_string()),
        Some(first) if COMMANDS.contains(&first.as_str()) => (None, args),
        Some(first) => (Some(PathBuf::from(first)), &args[1..]),
    };

    let Some((name, params)) = rest.split_first() else {
        return Err("Missing command".to_string());
    };
    let command = parse_command(name, params)?;
    Ok(Invocation { file, command })
}

fn parse_command(name: &str, params: &[String]) -> Result<Command, String> {
    match name {
        "locate" => {
            expect_params(name, params, 1, 1)?;
            Ok(Command::Locate {
                line: parse_line(&params[0])?,
            })
        }
        "set-prop" => {
            expect_params(name, params, 2, 3)?;
            Ok(Command::SetProp {
                line: parse_line(&params[0])?,
                key: params[1].clone(),
                value: params.get(2).cloned().unwrap_or_default(),
            })
        }
        "set-style" => {
            let (positional, label) = split_label_flag(params)?;
            expect_params(name, &positional, 3, 4)?;
            Ok(Command::SetStyle {
                block_type: positional[0].clone(),
                target: positional[1].clone(),
                property: positional[2].clone(),
                value: positional.get(3).cloned().unwrap_or_default(),
                label,
            })
        }
        "label" => {
            expect_params(name, params, 1, 1)?;
            Ok(Command::Label {
                line: parse_line(&params[0])?,
            })
        }
        "tag" => {
            expect_params(name, params, 1, 1)?;
            Ok(Command::Tag {
                line: parse_line(&params[0])?,
            })
        }
        "next-id" => expect_params(name, params, 0, 0).map(|_| Command::NextId),
        "styles" => expect_params(name, params, 0, 0).map(|_| Command::Styles),
        "inspect" => expect_params(name, params, 0, 0).map(|_| Command::Inspect),
        other => Err(format!("Unknown command '{other}'")),
    }
}

fn expect_params<'a>(
    name: &str,
    params: &'a [String],
    min: usize,
    max: usize,
) -> Result<&'a [String], String> {
    if params.len() < min || params.len() > max {
        let expected = if min == max {
            format!("{min}")
        } else {
            format!("{min} to {max}")
        };
        return Err(format!(
            "'{name}' takes {expected} argument(s), got {}",
            params.len()
        ));
    }
    Ok(params)
}

fn split_label_flag(params: &[String]) -> Result<(Vec<String>, Option<String>), String> {
    let mut positional = Vec::new();
    let mut label = None;
    let mut iter = params.iter();
    while let Some(param) = iter.next() {
        if param == "--label" {
            let value = iter.next().ok_or("'--label' needs a value")?;
            label = Some(value.clone());
        } else {
            positional.push(param.clone());
        }
    }
    Ok((positional, label))
}

fn parse_line(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(line) if line > 0 => Ok(line),
        _ => Err(format!("'{value}' is not a line number (lines start at 1)")),
    }
}
