// src/main.rs
use std::{env, fs, io, process};

use anyhow::{Context, Result};

fn main() -> Result<()> {
    env_logger::init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: simplc <input-file>");
        process::exit(1);
    };

    let source = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    simplc::compile(&source, &mut out).map_err(anyhow::Error::msg)?;
    Ok(())
}
