use tt_tracker::TrackerResult;

use super::{Session, plural};

pub fn run(tracker: &mut Session) -> TrackerResult<()> {
    let report = tracker.sweep_orphans()?;
    if report.is_empty() {
        println!("  No orphaned records.");
    } else {
        println!(
            "  Removed {} and {}",
            plural(report.characters.len(), "orphaned character"),
            plural(report.encounters.len(), "orphaned encounter"),
        );
    }
    Ok(())
}
