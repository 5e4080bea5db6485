use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Bar advanced once per visited directory and file. `entries` excludes the
/// source root, which the walk also visits.
pub fn copy_progress_bar(entries: u64, hidden: bool) -> Result<ProgressBar> {
    let bar = ProgressBar::new(entries + 1);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%, ETA {eta})")?
            .progress_chars("=> "),
    );
    bar.set_prefix("File Copy Progress");

    if hidden {
        bar.set_draw_target(ProgressDrawTarget::hidden());
    }

    Ok(bar)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_counts_root() {
        let bar = copy_progress_bar(4, true).unwrap();

        assert_eq!(bar.length(), Some(5));
        for _ in 0..5 {
            bar.inc(1);
        }
        assert_eq!(bar.position(), 5);
    }
}
