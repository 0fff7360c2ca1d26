use std::process::ExitCode;
use std::str::FromStr;

use custom_feature_params::{
    ConverterRegistry, HostTypes, IndexList, ParamsError, SchemaVersion, VersionMigrator,
};

struct CliHost;

impl HostTypes for CliHost {
    type Selection = ();
    type Body = ();
    type Feature = ();
}

#[derive(Debug)]
struct CliConfig {
    type_name: String,
}

#[derive(Debug)]
enum Command {
    VersionCmp {
        left: SchemaVersion,
        right: SchemaVersion,
    },
    Indices {
        property: String,
        text: String,
    },
    MigrationPlan {
        stored: SchemaVersion,
        current: Option<SchemaVersion>,
        converters: Vec<SchemaVersion>,
    },
    Help,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if matches!(err, ParamsError::MissingMigration { .. }) {
                eprintln!(
                    "hint: pass the versions of the registered converters after the current version; the current version itself must be one of them."
                );
            }
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<(), ParamsError> {
    let (config, command) = parse_args()?;

    match command {
        Command::VersionCmp { left, right } => {
            let relation = match left.cmp(&right) {
                std::cmp::Ordering::Less => "<",
                std::cmp::Ordering::Equal => "==",
                std::cmp::Ordering::Greater => ">",
            };
            println!("{left} {relation} {right}");
        }
        Command::Indices { property, text } => {
            let indices = IndexList::parse(&property, &text)?;
            if indices.is_absent() {
                println!("property={property} absent");
            } else {
                println!("property={property} count={}", indices.len());
                for (position, index) in indices.indices().iter().enumerate() {
                    println!("[{position}] index={index}");
                }
            }
        }
        Command::MigrationPlan {
            stored,
            current,
            converters,
        } => {
            let registry = converters
                .into_iter()
                .fold(ConverterRegistry::<CliHost>::new(), |registry, version| {
                    registry.register(version, |_raw| Ok(()))
                });
            let migrator =
                VersionMigrator::new(&config.type_name, current.as_ref(), Some(&registry));

            let plan = migrator.plan(&stored)?;
            if plan.is_empty() {
                println!("type={} stored={stored} up to date", config.type_name);
            } else {
                println!(
                    "type={} stored={stored} steps={}",
                    config.type_name,
                    plan.len()
                );
                for (step, version) in plan.iter().enumerate() {
                    println!("[{step}] converter={version}");
                }
            }
        }
        Command::Help => print_help(),
    }

    Ok(())
}

fn parse_args() -> Result<(CliConfig, Command), ParamsError> {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let mut config = default_config();
    let mut index = 0;

    while index < args.len() {
        if args[index] == "--type-name" {
            let value = args.get(index + 1).ok_or_else(|| ParamsError::Config {
                reason: "missing value for --type-name".to_string(),
            })?;
            config.type_name = value.clone();
            args.drain(index..=index + 1);
            continue;
        }
        index += 1;
    }

    if args.is_empty() {
        return Ok((config, Command::Help));
    }

    let command = match args[0].as_str() {
        "help" | "--help" | "-h" => Command::Help,
        "version-cmp" => {
            let left = positional(&args, 1, "version-cmp <left>")?;
            let right = positional(&args, 2, "version-cmp <right>")?;
            Command::VersionCmp {
                left: SchemaVersion::from_str(left)?,
                right: SchemaVersion::from_str(right)?,
            }
        }
        "indices" => Command::Indices {
            property: positional(&args, 1, "indices <property>")?.to_string(),
            text: positional(&args, 2, "indices <text>")?.to_string(),
        },
        "migration-plan" => {
            let stored = SchemaVersion::from_str(positional(&args, 1, "migration-plan <stored>")?)?;
            let current = match positional(&args, 2, "migration-plan <current>")? {
                "none" => None,
                value => Some(SchemaVersion::from_str(value)?),
            };
            let converters = args[3..]
                .iter()
                .map(|value| SchemaVersion::from_str(value))
                .collect::<Result<Vec<_>, _>>()?;
            Command::MigrationPlan {
                stored,
                current,
                converters,
            }
        }
        other => {
            return Err(ParamsError::Config {
                reason: format!("unknown command `{other}`"),
            });
        }
    };

    Ok((config, command))
}

fn positional<'a>(args: &'a [String], position: usize, usage: &str) -> Result<&'a str, ParamsError> {
    args.get(position)
        .map(String::as_str)
        .ok_or_else(|| ParamsError::Config {
            reason: format!("missing argument for {usage}"),
        })
}

fn default_config() -> CliConfig {
    CliConfig {
        type_name: "CustomFeatureParameters".to_string(),
    }
}

fn print_help() {
    println!(
        "feature-params-cli\n\nUSAGE:\n  cargo run --bin feature-params-cli -- [--type-name NAME] <command> [command args]\n\nCOMMANDS:\n  version-cmp <a> <b>                          Compare two schema versions\n  indices <property> <text>                    Decode a stored reference index list\n  migration-plan <stored> <current|none> [v..] List converters that would run, given registered versions\n  help                                         Show help\n\nVERSIONS:\n  dotted numeric, e.g. 1.0 or 2.1.3; trailing zeros are insignificant\n"
    );
}
