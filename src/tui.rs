//! Utilities for terminal output during scanning.

/// Terminal User Interface Module for rangescan
/// Defines macros to use
#[macro_export]
macro_rules! warning {
    ($name:expr) => {
        eprintln!("{} {}", ansi_term::Colour::Red.bold().paint("[!]"), $name);
    };
    ($name:expr, $greppable:expr, $accessible:expr) => {
        // if not greppable then print, otherwise no else statement so do not print.
        if !$greppable {
            if $accessible {
                // Don't print the ascii art
                eprintln!("{}", $name);
            } else {
                eprintln!("{} {}", ansi_term::Colour::Red.bold().paint("[!]"), $name);
            }
        }
    };
}

#[macro_export]
macro_rules! detail {
    ($name:expr) => {
        println!("{} {}", ansi_term::Colour::Blue.bold().paint("[~]"), $name);
    };
    ($name:expr, $greppable:expr, $accessible:expr) => {
        // if not greppable then print, otherwise no else statement so do not print.
        if !$greppable {
            if $accessible {
                // Don't print the ascii art
                println!("{}", $name);
            } else {
                println!("{} {}", ansi_term::Colour::Blue.bold().paint("[~]"), $name);
            }
        }
    };
}

#[macro_export]
macro_rules! output {
    ($name:expr) => {
        println!(
            "{} {}",
            ansi_term::Colour::RGB(0, 255, 9).bold().paint("[>]"),
            $name
        );
    };
    ($name:expr, $greppable:expr, $accessible:expr) => {
        // if not greppable then print, otherwise no else statement so do not print.
        if !$greppable {
            if $accessible {
                // Don't print the ascii art
                println!("{}", $name);
            } else {
                println!(
                    "{} {}",
                    ansi_term::Colour::RGB(0, 255, 9).bold().paint("[>]"),
                    $name
                );
            }
        }
    };
}

/// Progress bar for a scan of `total` ports, hidden when nothing should
/// be drawn.
pub fn progress_bar(total: usize, hidden: bool) -> indicatif::ProgressBar {
    if hidden {
        return indicatif::ProgressBar::hidden();
    }

    let bar = indicatif::ProgressBar::new(total as u64);
    let style = indicatif::ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ports ({eta})")
        .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
        .progress_chars("=>-");
    bar.set_style(style);
    bar
}

#[cfg(test)]
mod tests {
    use super::progress_bar;
    use crate::scanner::Progress;

    #[test]
    fn hidden_bar_still_counts() {
        let bar = progress_bar(10, true);
        bar.advance();
        bar.advance();
        assert_eq!(bar.position(), 2);
        assert!(bar.is_hidden());
    }

    #[test]
    fn macros_respect_greppable() {
        // greppable suppresses output entirely; these only need to expand
        crate::warning!("warn", true, false);
        crate::detail!("detail", true, true);
        crate::output!("output", true, false);
        crate::detail!("detail");
    }
}
