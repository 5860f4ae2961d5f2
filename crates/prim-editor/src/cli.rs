//! Command-line arguments

use anyhow::{anyhow, bail, Context, Result};
use clap::{App, Arg, ArgMatches, SubCommand};
use stage::{PrimPath, PrimPurpose, StageEdit};
use std::path::PathBuf;

/// What to do once the stage is open
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the tree, expanded to `depth` (the configured depth by default)
    Outline { depth: Option<usize> },
    /// Print a prim's attributes
    Attributes(PrimPath),
    /// Print a prim's time samples
    Samples(PrimPath),
    /// Apply an edit, save the stage and print the tree
    Edit(StageEdit),
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub stage: PathBuf,
    pub config: Option<PathBuf>,
    pub command: Command,
}

fn path_arg() -> Arg<'static, 'static> {
    Arg::with_name("path")
        .required(true)
        .index(1)
        .help("Prim path, e.g. /world/geo")
}

pub fn app() -> App<'static, 'static> {
    App::new("prim-editor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Browse and edit the prims of a stage")
        .arg(
            Arg::with_name("stage")
                .required(true)
                .index(1)
                .help("Stage file (JSON)"),
        )
        .arg(
            Arg::with_name("config")
                .long("config")
                .takes_value(true)
                .help("Settings file, instead of ~/.usd_prim_editor/config.json"),
        )
        .subcommand(
            SubCommand::with_name("outline")
                .about("Print the prim tree")
                .arg(Arg::with_name("depth").index(1).help("Expand to this depth")),
        )
        .subcommand(
            SubCommand::with_name("attributes")
                .about("Print the attributes of a prim")
                .arg(path_arg()),
        )
        .subcommand(
            SubCommand::with_name("samples")
                .about("Print the time samples of a prim")
                .arg(path_arg()),
        )
        .subcommand(
            SubCommand::with_name("kind")
                .about("Set the kind of a prim")
                .arg(path_arg())
                .arg(Arg::with_name("kind").required(true).index(2)),
        )
        .subcommand(
            SubCommand::with_name("purpose")
                .about("Set the purpose of a prim")
                .arg(path_arg())
                .arg(
                    Arg::with_name("purpose")
                        .required(true)
                        .index(2)
                        .possible_values(&["default", "render", "proxy", "guide"]),
                ),
        )
        .subcommand(
            SubCommand::with_name("set")
                .about("Set an attribute value")
                .arg(path_arg())
                .arg(Arg::with_name("attribute").required(true).index(2))
                .arg(Arg::with_name("value").required(true).index(3)),
        )
        .subcommand(
            SubCommand::with_name("add-attribute")
                .about("Add a custom string attribute")
                .arg(path_arg())
                .arg(Arg::with_name("attribute").required(true).index(2))
                .arg(Arg::with_name("value").required(true).index(3)),
        )
        .subcommand(
            SubCommand::with_name("add-primvar")
                .about("Add a primvar")
                .arg(path_arg())
                .arg(
                    Arg::with_name("primvar")
                        .required(true)
                        .index(2)
                        .help("Name without the primvars: prefix"),
                )
                .arg(Arg::with_name("value").required(true).index(3)),
        )
        .subcommand(
            SubCommand::with_name("remove")
                .about("Remove an attribute")
                .arg(path_arg())
                .arg(Arg::with_name("attribute").required(true).index(2)),
        )
        .subcommand(
            SubCommand::with_name("sample")
                .about("Set a time sample")
                .arg(path_arg())
                .arg(Arg::with_name("attribute").required(true).index(2))
                .arg(Arg::with_name("time").required(true).index(3))
                .arg(Arg::with_name("value").required(true).index(4)),
        )
        .subcommand(
            SubCommand::with_name("remove-sample")
                .about("Remove a time sample")
                .arg(path_arg())
                .arg(Arg::with_name("attribute").required(true).index(2))
                .arg(Arg::with_name("time").required(true).index(3)),
        )
        .subcommand(
            SubCommand::with_name("variant")
                .about("Select a variant")
                .arg(path_arg())
                .arg(Arg::with_name("set").required(true).index(2))
                .arg(Arg::with_name("variant").required(true).index(3)),
        )
        .subcommand(
            SubCommand::with_name("load")
                .about("Load a prim's payload")
                .arg(path_arg()),
        )
        .subcommand(
            SubCommand::with_name("unload")
                .about("Unload a prim's payload")
                .arg(path_arg()),
        )
}

fn value<'a>(matches: &'a ArgMatches<'_>, name: &str) -> Result<&'a str> {
    matches
        .value_of(name)
        .ok_or_else(|| anyhow!("Missing argument <{}>", name))
}

fn prim_path(matches: &ArgMatches<'_>) -> Result<PrimPath> {
    PrimPath::new(value(matches, "path")?)
}

fn time(matches: &ArgMatches<'_>) -> Result<f64> {
    let text = value(matches, "time")?;
    text.parse::<f64>()
        .with_context(|| format!("Time must be a number, got {}", text))
}

pub fn from_matches(matches: &ArgMatches<'_>) -> Result<Invocation> {
    let stage = PathBuf::from(value(matches, "stage")?);
    let config = matches.value_of("config").map(PathBuf::from);

    let command = match matches.subcommand() {
        ("", _) => Command::Outline { depth: None },
        ("outline", Some(sub)) => Command::Outline {
            depth: sub
                .value_of("depth")
                .map(str::parse::<usize>)
                .transpose()
                .context("Depth must be a number")?,
        },
        ("attributes", Some(sub)) => Command::Attributes(prim_path(sub)?),
        ("samples", Some(sub)) => Command::Samples(prim_path(sub)?),
        ("kind", Some(sub)) => Command::Edit(StageEdit::SetKind {
            path: prim_path(sub)?,
            kind: value(sub, "kind")?.to_string(),
        }),
        ("purpose", Some(sub)) => Command::Edit(StageEdit::SetPurpose {
            path: prim_path(sub)?,
            purpose: value(sub, "purpose")?.parse::<PrimPurpose>()?,
        }),
        ("set", Some(sub)) => Command::Edit(StageEdit::SetAttribute {
            path: prim_path(sub)?,
            name: value(sub, "attribute")?.to_string(),
            value: value(sub, "value")?.to_string(),
        }),
        ("add-attribute", Some(sub)) => Command::Edit(StageEdit::AddAttribute {
            path: prim_path(sub)?,
            name: value(sub, "attribute")?.to_string(),
            value: value(sub, "value")?.to_string(),
        }),
        ("add-primvar", Some(sub)) => Command::Edit(StageEdit::AddPrimvar {
            path: prim_path(sub)?,
            name: value(sub, "primvar")?.to_string(),
            value: value(sub, "value")?.to_string(),
        }),
        ("remove", Some(sub)) => Command::Edit(StageEdit::RemoveAttribute {
            path: prim_path(sub)?,
            name: value(sub, "attribute")?.to_string(),
        }),
        ("sample", Some(sub)) => Command::Edit(StageEdit::SetTimeSample {
            path: prim_path(sub)?,
            name: value(sub, "attribute")?.to_string(),
            time: time(sub)?,
            value: value(sub, "value")?.to_string(),
        }),
        ("remove-sample", Some(sub)) => Command::Edit(StageEdit::RemoveTimeSample {
            path: prim_path(sub)?,
            name: value(sub, "attribute")?.to_string(),
            time: time(sub)?,
        }),
        ("variant", Some(sub)) => Command::Edit(StageEdit::SelectVariant {
            path: prim_path(sub)?,
            set: value(sub, "set")?.to_string(),
            variant: value(sub, "variant")?.to_string(),
        }),
        ("load", Some(sub)) => Command::Edit(StageEdit::LoadPayload {
            path: prim_path(sub)?,
        }),
        ("unload", Some(sub)) => Command::Edit(StageEdit::UnloadPayload {
            path: prim_path(sub)?,
        }),
        (other, _) => bail!("Unknown command {}", other),
    };

    Ok(Invocation {
        stage,
        config,
        command,
    })
}
