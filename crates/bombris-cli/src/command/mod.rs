use clap::{Parser, Subcommand};

use self::{show::ShowArg, simulate::SimulateArg};

mod show;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play a seeded game with a scripted input policy and save it as JSON
    Simulate(#[clap(flatten)] SimulateArg),
    /// Print a saved game
    Show(#[clap(flatten)] ShowArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Show(arg) => show::run(&arg)?,
    }
    Ok(())
}
