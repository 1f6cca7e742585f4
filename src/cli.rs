//! Command-line surface: `parfind [ROOT] [-type d|f] [-name GLOB] [-iname GLOB]`.
//!
//! `find` spells its long options with a single dash. Those are rewritten
//! to the double-dash form before clap sees them, so both spellings work.

use std::error::Error;
use std::ffi::OsString;
use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;

use parfind::{FindError, FinderBuilder, Strategy, TypeFilter};

/// Options that take a value and may be written with a single dash.
const FIND_STYLE: &[&str] = &["type", "name", "iname"];

#[derive(Parser, Debug)]
#[command(name = "parfind", version, about = "Search a directory tree for matching entries")]
pub struct CliArgs {
    /// Directory to search
    pub root: Option<PathBuf>,

    /// Only print directories (`d`) or regular files (`f`)
    #[arg(long = "type", value_name = "d|f", allow_hyphen_values = true)]
    pub kind: Option<String>,

    /// Only print entries whose file name matches GLOB (`*` is the only wildcard)
    #[arg(long, value_name = "GLOB", allow_hyphen_values = true)]
    pub name: Option<String>,

    /// Like --name, ignoring case
    #[arg(long, value_name = "GLOB", allow_hyphen_values = true)]
    pub iname: Option<String>,

    /// Walk the tree on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// Parse `find`-style arguments. The first item is the program name.
    pub fn parse_find_style<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self::try_parse_from(normalize(args))
    }

    /// Turn the parsed arguments into a configured search.
    pub fn into_builder(self) -> Result<FinderBuilder, FindError> {
        let mut builder = parfind::find();

        if let Some(root) = self.root {
            builder = builder.root(root);
        }
        if let Some(kind) = self.kind {
            builder = builder.type_filter(kind.parse::<TypeFilter>()?);
        }
        if let Some(glob) = self.name {
            builder = builder.name(glob);
        }
        if let Some(glob) = self.iname {
            builder = builder.iname(glob);
        }
        if self.sequential {
            builder = builder.strategy(Strategy::Sequential);
        }

        Ok(builder)
    }
}

/// Map a clap failure onto the crate's error kinds. Returns `None` for
/// help and version requests, which clap should print itself.
pub fn to_find_error(err: &clap::Error) -> Option<FindError> {
    let detail = err.to_string();
    let first_line = detail.lines().next().unwrap_or_default();
    let first_line = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();

    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => None,
        ErrorKind::ArgumentConflict => Some(FindError::DuplicateArg(first_line)),
        ErrorKind::UnknownArgument => Some(FindError::UnknownArg(first_line)),
        _ => Some(FindError::Generic(first_line)),
    }
}

/// The single line written to stderr for a failed run.
pub fn render(err: &FindError) -> String {
    match err.source() {
        Some(cause) => format!("ERROR: {err}: {cause}"),
        None => format!("ERROR: {err}"),
    }
}

fn normalize<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut args = args.into_iter().map(Into::into);
    let mut out: Vec<OsString> = args.next().into_iter().collect();
    let mut expect_value = false;

    for arg in args {
        if expect_value {
            expect_value = false;
            out.push(arg);
            continue;
        }

        let option = arg
            .to_str()
            .and_then(|s| s.strip_prefix("--").or_else(|| s.strip_prefix('-')))
            .filter(|name| FIND_STYLE.contains(name));

        match option {
            Some(name) => {
                out.push(format!("--{name}").into());
                expect_value = true;
            }
            None => out.push(arg),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::parse_find_style(std::iter::once("parfind").chain(args.iter().copied()))
    }

    #[test]
    fn parses_find_style_options() {
        let args = parse(&["/tmp", "-type", "f", "-name", "*.log", "-iname", "APP*"]).unwrap();
        assert_eq!(args.root, Some(PathBuf::from("/tmp")));
        assert_eq!(args.kind.as_deref(), Some("f"));
        assert_eq!(args.name.as_deref(), Some("*.log"));
        assert_eq!(args.iname.as_deref(), Some("APP*"));
        assert!(!args.sequential);
    }

    #[test]
    fn accepts_double_dash_spelling() {
        let args = parse(&["/tmp", "--type", "d", "--sequential"]).unwrap();
        assert_eq!(args.kind.as_deref(), Some("d"));
        assert!(args.sequential);
    }

    #[test]
    fn root_is_optional_at_parse_time() {
        let args = parse(&["-name", "x"]).unwrap();
        assert!(args.root.is_none());
    }

    #[test]
    fn pattern_values_may_start_with_a_dash() {
        let args = parse(&["/tmp", "-name", "-type"]).unwrap();
        assert_eq!(args.name.as_deref(), Some("-type"));
        assert!(args.kind.is_none());
    }

    #[test]
    fn repeated_modifier_is_a_duplicate() {
        let err = parse(&["/tmp", "-name", "a", "-name", "b"]).unwrap_err();
        let err = to_find_error(&err).unwrap();
        assert!(matches!(err, FindError::DuplicateArg(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn unknown_modifier_is_rejected() {
        let err = parse(&["/tmp", "-size", "10"]).unwrap_err();
        let err = to_find_error(&err).unwrap();
        assert!(matches!(err, FindError::UnknownArg(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_value_keeps_only_clap_detail() {
        let err = parse(&["/tmp", "-name"]).unwrap_err();
        let err = to_find_error(&err).unwrap();
        let FindError::Generic(msg) = &err else {
            panic!("expected a generic error, got {err:?}");
        };
        assert!(!msg.starts_with("error"), "{msg}");
        assert!(msg.contains("--name"), "{msg}");
        assert_eq!(render(&err), format!("ERROR: {msg}"));
    }

    #[test]
    fn rendered_errors_include_their_cause() {
        let err = FindError::Output(std::io::Error::other("disk gone"));
        assert_eq!(render(&err), "ERROR: could not write output: disk gone");
        assert_eq!(
            render(&FindError::PathAbsent),
            "ERROR: Please specify a directory to proceed!"
        );
    }

    #[test]
    fn help_is_left_to_clap() {
        let err = parse(&["--help"]).unwrap_err();
        assert!(to_find_error(&err).is_none());
    }

    #[test]
    fn bad_type_value_fails_when_building() {
        let args = parse(&["/tmp", "-type", "x"]).unwrap();
        let err = args.into_builder().err().unwrap();
        assert!(matches!(err, FindError::InvalidType(t) if t == "x"));
    }

    #[test]
    fn missing_root_fails_when_run() {
        let args = parse(&["-type", "f"]).unwrap();
        let err = args.into_builder().unwrap().run().unwrap_err();
        assert!(matches!(err, FindError::PathAbsent));
        assert_eq!(err.exit_code(), 4);
    }
}
