use std::env;

use deskbot_core::ports::LocalUser;

/// Logged-in user from the environment (`USER`/`LOGNAME` on Unix, `USERNAME`
/// on Windows).
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvUser;

impl LocalUser for EnvUser {
    fn name(&self) -> Option<String> {
        first_non_empty(["USER", "LOGNAME", "USERNAME"].map(|k| env::var(k).ok()))
    }
}

fn first_non_empty<const N: usize>(candidates: [Option<String>; N]) -> Option<String> {
    candidates
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_candidates() {
        let got = first_non_empty([None, Some("  ".to_string()), Some(" bob ".to_string())]);
        assert_eq!(got.as_deref(), Some("bob"));
    }

    #[test]
    fn none_when_nothing_set() {
        assert_eq!(first_non_empty::<2>([None, Some(String::new())]), None);
    }
}
