use anyhow::{bail, Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;

use crate::host::Host;
use crate::install::Registrar;
use crate::manifest::{self, ServiceOptions, DEFAULTS};

pub const USAGE: &str =
    "Usage: bootsvc install --name MyApp --company MyCompany --script /usr/bin/myscript\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Install,
    Uninstall,
    Help,
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub options: ServiceOptions,
    pub config_file: Option<PathBuf>,
}

/// Parse arguments (without the program name).
///
/// The command is the first positional argument, falling back to an
/// `--install` / `--uninstall` flag. Options are `--key value` or `--key=value`.
pub fn parse_args(args: &[String]) -> Result<Invocation> {
    let mut positional: Vec<&str> = Vec::new();
    let mut flag_command = None;
    let mut help = false;
    let mut options = ServiceOptions::default();
    let mut config_file = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let Some(flag) = arg.strip_prefix("--") else {
            if arg == "-h" {
                help = true;
            } else {
                positional.push(arg);
            }
            continue;
        };

        match flag {
            "install" | "uninstall" => {
                if flag_command.is_none() {
                    flag_command = Some(if flag == "install" {
                        Command::Install
                    } else {
                        Command::Uninstall
                    });
                }
                continue;
            }
            "help" => {
                help = true;
                continue;
            }
            _ => {}
        }

        let (key, value) = match flag.split_once('=') {
            Some((key, value)) => (key, value.to_string()),
            None => {
                let value = iter
                    .next()
                    .with_context(|| format!("Missing value for --{}", flag))?;
                (flag, value.clone())
            }
        };

        if key == "config" {
            config_file = Some(PathBuf::from(value));
        } else {
            options.set(key, &value)?;
        }
    }

    // A help flag anywhere wins over the command
    let command = match positional.as_slice() {
        _ if help => Command::Help,
        [] => match flag_command {
            Some(command) => command,
            None => bail!("No command given"),
        },
        ["install"] => Command::Install,
        ["uninstall"] => Command::Uninstall,
        ["help"] => Command::Help,
        [other] => bail!("Unknown command: {}", other),
        [_, extra, ..] => bail!("Unexpected argument: {}", extra),
    };

    Ok(Invocation {
        command,
        options,
        config_file,
    })
}

/// Layer flags over the options file over package.json
pub fn gather_options(host: &dyn Host, invocation: &Invocation) -> Result<ServiceOptions> {
    let mut options = invocation.options.clone();

    if let Some(path) = &invocation.config_file {
        options = options.or(&manifest::load(path)?);
    }

    if options.name.is_none() || options.script.is_none() {
        let cwd = host
            .current_dir()
            .context("Failed to read working directory")?;
        options = options.or(&manifest::package_defaults(&cwd)?);
    }

    Ok(options)
}

/// Run the command line against `host`, returning the process exit code
pub fn run(host: &dyn Host, args: &[String]) -> i32 {
    let stdout = io::stdout();
    let stderr = io::stderr();
    run_with(host, args, &mut stdout.lock(), &mut stderr.lock())
}

pub fn run_with(host: &dyn Host, args: &[String], out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    dispatch(host, args, out, err).unwrap_or(1)
}

fn dispatch(
    host: &dyn Host,
    args: &[String],
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<i32> {
    let invocation = match parse_args(args) {
        Ok(invocation) => invocation,
        Err(e) => {
            writeln!(err, "{}", e)?;
            write!(err, "{}", USAGE)?;
            return Ok(1);
        }
    };

    if invocation.command == Command::Help {
        write!(out, "{}", USAGE)?;
        return Ok(0);
    }

    let options = match gather_options(host, &invocation) {
        Ok(options) => options,
        Err(e) => {
            writeln!(err, "Error: {:#}", e)?;
            return Ok(1);
        }
    };

    if invocation.command == Command::Install && options.script.is_none() {
        write!(err, "{}", USAGE)?;
        return Ok(1);
    }

    // npm already prints a blank line before lifecycle scripts
    if host.env_var("npm_package_name").is_none() {
        writeln!(out)?;
    }

    let name = options
        .name
        .clone()
        .or_else(|| DEFAULTS.name.clone())
        .unwrap_or_default();
    let registrar = Registrar::new(host);

    let (result, done) = if invocation.command == Command::Install {
        write!(out, "Installing startup service: {}...", name)?;
        out.flush()?;
        (
            registrar.install(options).map(|i| i.descriptor),
            "Successfully registered startup service.",
        )
    } else {
        write!(out, "Removing startup service: {}...", name)?;
        out.flush()?;
        (
            registrar.uninstall(options).map(|r| r.descriptor),
            "Successfully removed startup service.",
        )
    };

    match result {
        Ok(descriptor) => {
            tracing::debug!("Descriptor: {}", descriptor.display());
            writeln!(out, "OK.")?;
            writeln!(out, "{}\n", done)?;
            Ok(0)
        }
        Err(e) => {
            writeln!(out, "ERROR.")?;
            writeln!(out, "{}\n", e)?;
            Ok(1)
        }
    }
}
