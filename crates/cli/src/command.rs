//! Parsing of REPL input lines.

use anyhow::{anyhow, bail, Context, Result};
use lookup::{PrefixMap, TableUpdate};

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the table with these prefixes.
    Build(Vec<Vec<u8>>),
    /// Apply an update; `full` replaces instead of patching.
    Update { full: bool, args: UpdateArgs },
    List,
    Has(Vec<u8>),
    Meta,
    Save,
    Clear,
    Stats,
    Exit,
    /// Blank line.
    Empty,
}

/// `key=value` arguments of `UPDATE` / `FULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateArgs {
    pub add: Vec<Vec<u8>>,
    pub remove: Vec<u32>,
    pub state: Vec<u8>,
    pub checksum: Vec<u8>,
}

impl UpdateArgs {
    pub fn into_table_update(self, full: bool) -> TableUpdate {
        TableUpdate {
            prefixes: PrefixMap::from_prefixes(self.add),
            removal_indices: self.remove,
            client_state: self.state,
            checksum: self.checksum,
            full_update: full,
        }
    }
}

pub fn parse(line: &str) -> Result<Command> {
    let mut parts = line.split_whitespace();
    let Some(cmd) = parts.next() else {
        return Ok(Command::Empty);
    };

    let command = match cmd.to_uppercase().as_str() {
        "BUILD" => {
            let prefixes = parts.map(parse_hex).collect::<Result<Vec<_>>>()?;
            if prefixes.is_empty() {
                bail!("usage: BUILD hex [hex ...]");
            }
            Command::Build(prefixes)
        }
        "UPDATE" | "FULL" => Command::Update {
            full: cmd.eq_ignore_ascii_case("FULL"),
            args: parse_update_args(parts)?,
        },
        "LIST" => Command::List,
        "HAS" => {
            let hash = parts.next().ok_or_else(|| anyhow!("usage: HAS hex"))?;
            Command::Has(parse_hex(hash)?)
        }
        "META" => Command::Meta,
        "SAVE" => Command::Save,
        "CLEAR" => Command::Clear,
        "STATS" => Command::Stats,
        "EXIT" | "QUIT" => Command::Exit,
        other => bail!("unknown command: {}", other),
    };
    Ok(command)
}

fn parse_update_args<'a>(parts: impl Iterator<Item = &'a str>) -> Result<UpdateArgs> {
    let mut args = UpdateArgs::default();
    for part in parts {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| anyhow!("expected key=value, got '{}'", part))?;
        match key.to_lowercase().as_str() {
            "add" => {
                args.add = split_list(value)
                    .map(parse_hex)
                    .collect::<Result<Vec<_>>>()?;
            }
            "remove" => {
                args.remove = split_list(value)
                    .map(|s| {
                        s.parse::<u32>()
                            .with_context(|| format!("invalid removal index '{}'", s))
                    })
                    .collect::<Result<Vec<_>>>()?;
            }
            "state" => args.state = value.as_bytes().to_vec(),
            "checksum" => args.checksum = value.as_bytes().to_vec(),
            other => bail!("unknown update argument: {}", other),
        }
    }
    Ok(args)
}

fn split_list<'a>(value: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    value.split(',').filter(|s| !s.is_empty())
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(s).with_context(|| format!("invalid hex prefix '{}'", s))?;
    if bytes.is_empty() {
        bail!("empty prefix");
    }
    Ok(bytes)
}
