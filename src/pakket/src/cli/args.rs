use clap::{ArgAction, Args};
use log::Level;

/// Log output controls shared by all subcommands.
#[derive(Clone, Copy, Debug, Args)]
pub struct Verbosity {
    /// Logs more about what the bit buffers do.
    ///
    /// `-v` reports exhausted writers, `-vv` also every rejected read
    /// and write.
    #[clap(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Logs less. `-q` only shows warnings, `-qq` only errors.
    #[clap(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        conflicts_with = "verbose"
    )]
    pub quiet: u8,
}

impl Verbosity {
    /// Installs a stderr logger at the selected level, keeping
    /// stdout free for decoded values and encoded bytes.
    pub fn setup(self) {
        let level = self.log_level();

        // Only fails when a logger is already installed.
        let _ = simple_logger::init_with_level(level);
    }

    fn log_level(self) -> Level {
        match (self.quiet, self.verbose) {
            (0, 0) => Level::Info,
            (0, 1) => Level::Debug,
            (0, _) => Level::Trace,
            (1, _) => Level::Warn,
            _ => Level::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    struct Harness {
        #[clap(flatten)]
        verbosity: Verbosity,
    }

    fn level_for(args: &[&str]) -> Level {
        let args = std::iter::once("pakket").chain(args.iter().copied());
        Harness::parse_from(args).verbosity.log_level()
    }

    #[test]
    fn levels_from_flags() {
        assert_eq!(level_for(&[]), Level::Info);
        assert_eq!(level_for(&["-v"]), Level::Debug);
        assert_eq!(level_for(&["-vvv"]), Level::Trace);
        assert_eq!(level_for(&["-q"]), Level::Warn);
        assert_eq!(level_for(&["--quiet", "--quiet"]), Level::Error);
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Harness::try_parse_from(["pakket", "-v", "-q"]).is_err());
    }
}
