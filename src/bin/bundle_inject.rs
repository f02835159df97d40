//! bundle-inject CLI
//!
//! Usage: `bundle-inject [CONFIG] [watch]`
//! Returns non-zero when the manifest is missing or the run fails.

use std::env;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::Level;

use bundle_inject::{Injector, ManifestWatcher, Settings, report, watch};

#[derive(Parser)]
#[command(name = "bundle-inject", version)]
#[command(about = "Inject hashed bundle references from a build manifest into HTML templates")]
struct Cli {
    /// Config file, or a directory containing html.config.json
    config: Option<PathBuf>,

    /// Pass `watch` to rebuild whenever the manifest changes
    mode: Option<Mode>,

    /// Same as the `watch` argument
    #[arg(long)]
    watch: bool,

    /// Log classification and file activity to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Watch,
}

impl Cli {
    /// Config path and whether to watch. A lone `watch` argument is the mode, not a path.
    fn invocation(&self) -> (Option<&Path>, bool) {
        let config = self.config.as_deref();
        if self.mode.is_none() && config == Some(Path::new("watch")) {
            return (None, true);
        }
        (config, self.watch || self.mode.is_some())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    report::set_color_enabled(io::stdout().is_terminal());

    let (config_path, watch) = cli.invocation();
    let working_dir = match env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("error: cannot read working directory: {e}");
            return ExitCode::FAILURE;
        }
    };

    let settings = match Settings::resolve(config_path, &working_dir) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if watch {
        watch_manifest(settings)
    } else {
        run_once(settings)
    }
}

fn run_once(settings: Settings) -> ExitCode {
    report::print_processing(&settings);

    let mut injector = Injector::new(settings);
    match injector.run_with(report::print_destination) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            report::print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn watch_manifest(settings: Settings) -> ExitCode {
    report::print_watching(&settings);

    let watcher = match ManifestWatcher::new(&settings) {
        Ok(watcher) => watcher,
        Err(e) => {
            report::print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    let mut injector = Injector::new(settings);
    watch::rebuild(&mut injector);
    watcher.run(move || {
        watch::rebuild(&mut injector);
    });
    ExitCode::SUCCESS
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(args: &[&str]) -> (Option<PathBuf>, bool) {
        let cli = Cli::try_parse_from(args).expect("parse");
        let (config, watch) = cli.invocation();
        (config.map(Path::to_path_buf), watch)
    }

    #[test]
    fn lone_watch_argument_is_the_mode() {
        assert_eq!(invocation(&["bundle-inject", "watch"]), (None, true));
    }

    #[test]
    fn config_followed_by_watch() {
        assert_eq!(
            invocation(&["bundle-inject", "a.yaml", "watch"]),
            (Some(PathBuf::from("a.yaml")), true)
        );
    }

    #[test]
    fn config_alone_runs_once() {
        assert_eq!(invocation(&["bundle-inject", "a.yaml"]), (Some(PathBuf::from("a.yaml")), false));
        assert_eq!(invocation(&["bundle-inject", "a.yaml", "--watch"]), (Some(PathBuf::from("a.yaml")), true));
        assert_eq!(invocation(&["bundle-inject"]), (None, false));
    }
}
