//! Build script rendering manual pages for the `errorframe` binary and each
//! of its subcommands.

use std::{fs, path::Path};

use clap::CommandFactory;
use clap_mangen::Man;

#[path = "src/cli.rs"]
#[allow(dead_code, reason = "only the command definition is used here")]
mod cli;

const MAN_DIR: &str = "target/generated-man";

fn render(command: clap::Command, file: &Path) -> std::io::Result<()> {
    let mut page = Vec::new();
    Man::new(command).render(&mut page)?;
    fs::write(file, page)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    let out_dir = Path::new(MAN_DIR);
    fs::create_dir_all(out_dir)?;

    let command = cli::Cli::command();
    let name = command.get_name().to_owned();
    for sub in command.get_subcommands() {
        let file = out_dir.join(format!("{name}-{}.1", sub.get_name()));
        render(sub.clone(), &file)?;
    }
    render(command, &out_dir.join(format!("{name}.1")))?;

    Ok(())
}
