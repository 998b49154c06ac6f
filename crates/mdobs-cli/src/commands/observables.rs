use crate::error::Result;
use mdobs::core::analysis::builtin::BuiltinObservable;
use std::io::{self, Write};

pub fn run() -> Result<()> {
    let stdout = io::stdout();
    write_table(&mut stdout.lock())?;
    Ok(())
}

fn write_table(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{:<20} {:<16} {:<8} Description", "Key", "Name", "Unit")?;
    for builtin in BuiltinObservable::ALL {
        writeln!(
            out,
            "{:<20} {:<16} {:<8} {}",
            builtin.key(),
            builtin.default_name(),
            builtin.unit(),
            builtin.description()
        )?;
    }
    Ok(())
}
