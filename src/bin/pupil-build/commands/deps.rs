//! `pupil-build deps` command

use anyhow::Result;

use crate::cli::DepsArgs;
use pupil_build::ops::scan_dependencies;
use pupil_build::util::config::{global_config_path, load_config, project_config_path};
use pupil_build::util::fs::absolute_path;

pub fn execute(args: DepsArgs) -> Result<()> {
    let root = absolute_path(&args.root);
    let config = load_config(global_config_path().as_deref(), &project_config_path(&root));

    let depends = scan_dependencies(&root, &config)?;
    let fingerprint = depends.fingerprint(&root)?;

    if args.fingerprint {
        println!("{}", fingerprint);
        return Ok(());
    }

    for header in depends.iter() {
        println!("{}", header.display());
    }
    println!();
    println!("{} headers, fingerprint {}", depends.len(), fingerprint);

    Ok(())
}
