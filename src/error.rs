use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FindError {
    // Arguments
    #[error("Use one modifier at most one time!")]
    DuplicateArg(String),

    #[error("Unknown modifier!")]
    UnknownArg(String),

    #[error("{0}")]
    Generic(String),

    // Root validation
    #[error("Please specify a directory to proceed!")]
    PathAbsent,

    #[error("The path is not accessible or does not exist!")]
    PathNotExist(PathBuf),

    #[error("The path is not a directory!")]
    PathNotDir(PathBuf),

    // Filters
    #[error("Unknown type `{0}`, expected `d` or `f`")]
    InvalidType(String),

    #[error("invalid name pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // Runtime
    #[error("could not start traversal thread")]
    Spawn(#[source] std::io::Error),

    #[error("could not write output")]
    Output(#[source] std::io::Error),
}

impl FindError {
    /// Process exit code for this error. Codes are stable across releases.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::DuplicateArg(_) => 1,
            Self::UnknownArg(_) => 2,
            Self::Generic(_) => 3,
            Self::PathAbsent => 4,
            Self::PathNotExist(_) => 5,
            Self::PathNotDir(_) => 6,
            Self::InvalidType(_) => 7,
            Self::InvalidPattern { .. } => 8,
            Self::Spawn(_) => 9,
            Self::Output(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let errs = [
            FindError::DuplicateArg("-name".into()),
            FindError::UnknownArg("-size".into()),
            FindError::Generic("x".into()),
            FindError::PathAbsent,
            FindError::PathNotExist(PathBuf::from("/nope")),
            FindError::PathNotDir(PathBuf::from("/etc/passwd")),
            FindError::InvalidType("x".into()),
            FindError::Spawn(std::io::Error::other("x")),
            FindError::Output(std::io::Error::other("x")),
        ];
        let mut codes = errs.iter().map(FindError::exit_code).collect::<Vec<_>>();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errs.len());
        assert!(!codes.contains(&0));
    }

    #[test]
    fn messages_match_the_error_kind() {
        let err = FindError::PathNotDir(PathBuf::from("/etc/passwd"));
        assert_eq!(err.to_string(), "The path is not a directory!");
        assert_eq!(
            FindError::DuplicateArg("-name".into()).to_string(),
            "Use one modifier at most one time!"
        );
    }
}
