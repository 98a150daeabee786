//! `kiln clean`: removes the recorded build output.

use kiln_driver::{Driver, LoadedModules};

use crate::pipeline::load_project;
use crate::GlobalArgs;

/// Runs the `kiln clean` command. Always exits 0 unless removal failed.
pub fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project = load_project(global)?;
    let output_dir = project.output_dir.clone();
    let driver = Driver::from_project(project);

    let removed = driver.clean(&mut LoadedModules::new())?;

    if !global.quiet {
        if removed {
            eprintln!("{:>12} {}", "Removed", output_dir.display());
        } else {
            eprintln!("{:>12} nothing to clean", "Clean");
        }
    }
    Ok(0)
}
