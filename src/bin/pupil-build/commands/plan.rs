//! `pupil-build plan` command

use anyhow::Result;

use crate::cli::PlanArgs;
use pupil_build::ops::{configure, ConfigureOptions};
use pupil_build::util::fs::write_string;

pub fn execute(args: PlanArgs) -> Result<()> {
    let opts = ConfigureOptions::detect(&args.host.root, args.host.overrides())?;
    let plan = configure(&opts)?;
    let json = plan.to_json()?;

    match args.output {
        Some(path) => {
            write_string(&path, &json)?;
            tracing::info!("Wrote build plan to {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
