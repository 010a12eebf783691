use std::path::PathBuf;

/// Failures loading or validating a content pack.
///
/// Per the fail-fast contract, every variant names the offending file; a
/// [`ContentError::Invalid`] additionally enumerates every problem found
/// rather than stopping at the first one.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read content pack {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse content pack {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("content pack {path} failed validation: {}", problems.join("; "))]
    Invalid { path: PathBuf, problems: Vec<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_display_joins_all_problems() {
        let err = ContentError::Invalid {
            path: PathBuf::from("questions.en.json"),
            problems: vec!["dup id q1".into(), "bad difficulty".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("dup id q1"));
        assert!(msg.contains("bad difficulty"));
    }
}
