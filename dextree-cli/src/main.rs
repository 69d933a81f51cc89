mod app;
mod color;
mod output;

use std::io::{self, BufWriter, Write};

use anyhow::Context;
use clap::Parser;
use dextree::{disassemble_with, Options};

use crate::{
    app::Cli,
    output::{print_output, write_listing, TreeOutput},
};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nCancelled.");
        std::process::exit(130);
    })
    .context("failed to set Ctrl+C handler")?;

    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays clean; RUST_LOG overrides
    env_logger::Builder::new()
        .filter_module("dextree", cli.global.log_level())
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    let options = Options::default()
        .with_strict(cli.strict)
        .with_verify_integrity(cli.verify);

    let tree = disassemble_with(&cli.files, &options).with_context(|| {
        let files: Vec<_> = cli.files.iter().map(|path| path.display().to_string()).collect();
        format!("failed to disassemble: {}", files.join(", "))
    })?;
    log::debug!("{} classes in {} files", tree.classes().count(), tree.containers().len());

    let color = !cli.global.no_color;
    print_output(&TreeOutput::from(&tree), &cli.global, |out| {
        let stdout = io::stdout();
        let mut w = BufWriter::new(stdout.lock());
        write_listing(&mut w, out, color)?;
        w.flush()?;
        Ok(())
    })
}
