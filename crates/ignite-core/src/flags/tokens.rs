use ignite_model::{FlagMap, FlagValue};

#[derive(Clone, Copy)]
enum Scan {
    ExpectFlag,
    ConsumedAsValue,
}

/// Parse loose daemon flag tokens into a flag map.
///
/// - tokens that do not start with `-`, or are empty once hyphens are stripped, are dropped;
/// - `--name=value` is split on the first `=`;
/// - `--name value` takes the next token as its value unless that token starts with `-`;
/// - a trailing `--name`, or one followed by another flag, is a boolean `true`.
///
/// Malformed tokens are skipped rather than rejected.
pub fn parse_flag_tokens<S: AsRef<str>>(tokens: &[S]) -> FlagMap {
    let mut parsed = FlagMap::new();
    let mut scan = Scan::ExpectFlag;

    for (i, raw) in tokens.iter().enumerate() {
        if let Scan::ConsumedAsValue = scan {
            scan = Scan::ExpectFlag;
            continue;
        }

        let token = raw.as_ref().trim();
        if !token.starts_with('-') {
            continue;
        }
        let name = token.trim_start_matches('-').trim();
        if name.is_empty() {
            continue;
        }

        if let Some((name, value)) = name.split_once('=') {
            let name = name.trim();
            if !name.is_empty() {
                parsed.insert(name, value.trim());
            }
            continue;
        }

        match tokens.get(i + 1).map(|next| next.as_ref().trim()) {
            Some(next) if !next.starts_with('-') => {
                parsed.insert(name, next);
                scan = Scan::ConsumedAsValue;
            }
            _ => {
                parsed.insert(name, FlagValue::Bool(true));
            }
        }
    }
    parsed
}

/// Split a flag string on whitespace and parse it with [`parse_flag_tokens`].
pub fn parse_flag_string(s: &str) -> FlagMap {
    let tokens: Vec<&str> = s.split_whitespace().collect();
    parse_flag_tokens(&tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(m: &FlagMap) -> Vec<(String, String)> {
        m.iter().map(|(k, v)| (k.to_string(), v.render())).collect()
    }

    fn pairs(p: &[(&str, &str)]) -> Vec<(String, String)> {
        p.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn trailing_flag_is_boolean() {
        let m = parse_flag_string("-x --y=1 -z");
        assert_eq!(rendered(&m), pairs(&[("x", "true"), ("y", "1"), ("z", "true")]));
    }

    #[test]
    fn next_non_flag_token_is_consumed_as_value() {
        let m = parse_flag_string("-x 5 -y");
        assert_eq!(rendered(&m), pairs(&[("x", "5"), ("y", "true")]));
    }

    #[test]
    fn value_splits_on_first_equals_only() {
        let m = parse_flag_tokens(&["--logger-log-level=exception=debug"]);
        assert_eq!(
            m.rendered("logger-log-level").as_deref(),
            Some("exception=debug")
        );
    }

    #[test]
    fn non_flag_and_empty_tokens_are_dropped() {
        let m = parse_flag_tokens(&["stray", "--", "-", "  ", "--=x", "--ok"]);
        assert_eq!(rendered(&m), pairs(&[("ok", "true")]));
    }

    #[test]
    fn tokens_are_trimmed() {
        let m = parse_flag_tokens(&["  --smp ", " 4 ", " --mbind = false "]);
        assert_eq!(rendered(&m), pairs(&[("mbind", "false"), ("smp", "4")]));
    }

    #[test]
    fn non_hyphen_tokens_never_become_keys() {
        let sequences: [&[&str]; 5] = [
            &["a", "b", "c"],
            &["-a", "b", "c", "-d"],
            &["x", "-y", "z", "w"],
            &["--k=v", "plain", "--q"],
            &["-", "val", "--", "other"],
        ];

        for tokens in sequences {
            let parsed = parse_flag_tokens(tokens);
            for t in tokens.iter().filter(|t| !t.trim().starts_with('-')) {
                assert!(
                    !parsed.contains(t.trim()),
                    "non-flag token {t:?} became a key in {parsed:?}"
                );
            }
        }
    }

    #[test]
    fn later_duplicate_wins() {
        let m = parse_flag_string("--smp 2 --smp=3");
        assert_eq!(m.rendered("smp").as_deref(), Some("3"));
    }
}
