//! # CLI - prefix cache shell
//!
//! A REPL over a single table's lookup cache. Reads commands from stdin,
//! applies them to the cache and prints results to stdout. Works both
//! interactively and with commands piped in.
//!
//! ## Commands
//!
//! ```text
//! BUILD hex [hex ...]                        Replace the table with these prefixes
//! UPDATE [add=hex,..] [remove=i,..] [state=s] [checksum=s]
//!                                            Apply a partial update
//! FULL [add=hex,..] [state=s] [checksum=s]   Apply a full update
//! LIST                                       Print every prefix in global order
//! HAS hex                                    Completion lookup
//! META                                       Print stored state and checksum
//! SAVE                                       Write the prefix file
//! CLEAR                                      Remove every prefix
//! STATS                                      Print cache debug info
//! EXIT / QUIT                                Save and shut down
//! ```
//!
//! ## Configuration
//!
//! ```text
//! PREFIXCACHE_DIR    cache directory (default: "data/safebrowsing")
//! PREFIXCACHE_TABLE  table name      (default: "goog-malware-proto")
//! RUST_LOG           log filter for env_logger (e.g. "debug")
//! ```
//!
//! ## Example
//!
//! ```text
//! $ cargo run -p cli
//! prefixcache started (table=goog-malware-proto, dir=data/safebrowsing, prefixes=0)
//! > BUILD 61616161 63636363
//! OK (2 prefixes)
//! > UPDATE add=62626262 remove=1 state=s1 checksum=c1
//! OK (2 prefixes)
//! > LIST
//! 61616161
//! 62626262
//! (2 prefixes)
//! > EXIT
//! bye
//! ```

mod command;

use anyhow::Result;
use command::{parse, Command};
use log::debug;
use lookup::{CacheConfig, CursorSet, FilePrefixStore, LookupCache, PrefixMap, UpdateError};
use std::io::{self, BufRead, Write};

type Cache = LookupCache<FilePrefixStore>;

fn main() -> Result<()> {
    env_logger::init();

    let config = CacheConfig::from_env()?;
    let mut cache = LookupCache::new(config, FilePrefixStore::new());
    cache.init()?;
    cache.load()?;

    println!(
        "prefixcache started (table={}, dir={}, prefixes={})",
        cache.table_name(),
        cache.store_dir().display(),
        cache.store().prefixes().count()
    );
    println!("Commands: BUILD hex.. | UPDATE k=v.. | FULL k=v.. | LIST | HAS hex");
    println!("          META | SAVE | CLEAR | STATS | EXIT");
    print!("> ");
    io::stdout().flush().ok();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse(&line) {
            Ok(Command::Exit) => break,
            Ok(cmd) => {
                debug!("executing {:?}", cmd);
                execute(&mut cache, cmd)
            }
            Err(e) => println!("ERR {}", e),
        }
        print!("> ");
        io::stdout().flush().ok();
    }

    match cache.save() {
        Ok(()) => println!("bye"),
        Err(e) => println!("ERR save failed: {}", e),
    }
    Ok(())
}

fn execute(cache: &mut Cache, cmd: Command) {
    match cmd {
        Command::Build(prefixes) => {
            report(cache, "build", |c| c.build(PrefixMap::from_prefixes(prefixes)))
        }
        Command::Update { full, args } => {
            let update = args.into_table_update(full);
            report(cache, "update", |c| c.apply_update(&update))
        }
        Command::List => {
            let mut set = CursorSet::new(cache.store().prefixes());
            let mut n = 0;
            while let Some(prefix) = set.get_smallest() {
                println!("{}", hex::encode(prefix));
                n += 1;
            }
            println!("({} prefixes)", n);
        }
        Command::Has(hash) => {
            let result = cache.has(&hash);
            if result.has {
                println!("found (complete={})", result.complete);
            } else {
                println!("not found (completion lookup unsupported)");
            }
        }
        Command::Meta => match cache.load_metadata() {
            Ok(meta) => println!(
                "state={} checksum={}",
                String::from_utf8_lossy(&meta.state),
                String::from_utf8_lossy(&meta.checksum)
            ),
            Err(UpdateError::Io(e)) if e.kind() == io::ErrorKind::NotFound => println!("(none)"),
            Err(e) => println!("ERR metadata read failed: {}", e),
        },
        Command::Save => match cache.save() {
            Ok(()) => println!("OK"),
            Err(e) => println!("ERR save failed: {}", e),
        },
        Command::Clear => report(cache, "clear", |c| c.clear_prefixes()),
        Command::Stats => {
            println!("{:?}", cache);
            let map = cache.store().prefixes();
            for (length, blob) in map.iter() {
                println!("  len={} count={}", length, blob.len() / length as usize);
            }
        }
        Command::Exit | Command::Empty => {}
    }
}

/// Runs a mutating operation and prints `OK (<n> prefixes)` or the error.
fn report<F>(cache: &mut Cache, what: &str, op: F)
where
    F: FnOnce(&mut Cache) -> Result<(), UpdateError>,
{
    match op(cache) {
        Ok(()) => println!("OK ({} prefixes)", cache.store().prefixes().count()),
        Err(e) if e.requires_full_update() => {
            println!("ERR {} failed: {} (full update required)", what, e)
        }
        Err(e) => println!("ERR {} failed: {}", what, e),
    }
}
