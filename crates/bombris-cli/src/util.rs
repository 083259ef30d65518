use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::Path,
};

use anyhow::Context;
use bombris_engine::EngineConfig;
use serde::{Serialize, de::DeserializeOwned};

use crate::schema::saved_game::SavedGame;

/// Destination of machine-readable output: a file, or stdout when no path is given.
pub struct Output {
    writer: Box<dyn Write>,
    name: String,
}

impl Output {
    pub fn open(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self {
                writer: Box::new(io::stdout().lock()),
                name: "stdout".to_owned(),
            });
        };
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self {
            writer: Box::new(BufWriter::new(file)),
            name: path.display().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writes `value` as pretty JSON followed by a newline.
    pub fn write_json<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        serde_json::to_writer_pretty(&mut self.writer, value)
            .with_context(|| format!("Failed to write JSON to {}", self.name))?;
        writeln!(self.writer)
            .and_then(|()| self.writer.flush())
            .with_context(|| format!("Failed to flush output to {}", self.name))?;
        Ok(())
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {file_kind} file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse {file_kind} JSON file: {}", path.display()))
}

/// Reads a saved game written by `simulate`.
pub fn read_saved_game_file<P>(path: P) -> anyhow::Result<SavedGame>
where
    P: AsRef<Path>,
{
    read_json_file("saved game", path)
}

/// Reads an engine config file. Missing fields take their defaults.
pub fn read_config_file<P>(path: P) -> anyhow::Result<EngineConfig>
where
    P: AsRef<Path>,
{
    read_json_file("config", path)
}
