//! `pupil-build flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use pupil_build::builder::DetectorModule;
use pupil_build::ops::{configure, ConfigureOptions};

pub fn execute(args: FlagsArgs) -> Result<()> {
    let module: DetectorModule = args.module.parse()?;

    let opts = ConfigureOptions::detect(&args.host.root, args.host.overrides())?;
    let plan = configure(&opts)?;
    let ext = plan.extension(module);

    if !args.link {
        println!("# Compile flags for `{}`:", ext.name);
        for flag in ext.compile_flags() {
            println!("  {}", flag);
        }
        if let Some(entry) = ext.entry() {
            println!("# Cython entry: {}", entry.display());
        }
        println!("# C++ sources:");
        for source in ext.cxx_sources() {
            println!("  {}", source.display());
        }
    }

    if !args.compile && !args.link {
        println!();
    }

    if !args.compile {
        println!("# Link flags for `{}`:", ext.name);
        let flags = ext.link_flags();
        if flags.is_empty() {
            println!("  (none)");
        }
        for flag in flags {
            println!("  {}", flag);
        }
    }

    Ok(())
}
