//! Command strings and response parsing for the text control protocol.

use mcbroker_core::{BrokerError, BrokerResult, StatEntry};

/// Request general-purpose statistics.
pub const STATS_COMMAND: &str = "stats\n";

/// Invalidate every item in the cache.
pub const FLUSH_ALL_COMMAND: &str = "flush_all\n";

/// Reserved token opening every statistic line.
pub const STAT_PREFIX: &str = "STAT";

/// Parse a complete `stats` response body.
///
/// Lines starting with `STAT` are split on single spaces into
/// `STAT <key> <value> ...`; the value is whitespace-trimmed and any further
/// tokens are ignored. All other lines, including `END`, are dropped. A
/// `STAT` line without a key and value fails the whole parse.
pub fn parse_stats(body: &str) -> BrokerResult<Vec<StatEntry>> {
    let mut stats = Vec::new();
    for (index, line) in body.split('\n').enumerate() {
        if !line.starts_with(STAT_PREFIX) {
            continue;
        }
        let mut tokens = line.split(' ');
        tokens.next();
        let key = tokens.next().filter(|k| !k.is_empty());
        let value = tokens.next();
        match (key, value) {
            (Some(key), Some(value)) => stats.push(StatEntry::new(key, value.trim())),
            _ => {
                return Err(BrokerError::MalformedResponse(format!(
                    "stat line {} missing key or value: {:?}",
                    index + 1,
                    line.trim_end()
                )));
            }
        }
    }
    Ok(stats)
}

/// The flush acknowledgement is returned verbatim, minus surrounding whitespace.
pub fn parse_flush_response(body: &str) -> String {
    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stat_lines_and_drops_end() {
        let body = "STAT pid 123\r\nSTAT uptime 456\r\nEND\r\n";
        let stats = parse_stats(body).unwrap();
        assert_eq!(
            stats,
            vec![StatEntry::new("pid", "123"), StatEntry::new("uptime", "456")]
        );
    }

    #[test]
    fn missing_value_is_malformed() {
        let err = parse_stats("STAT onlykey\r\n").unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
        assert!(err.to_string().contains("onlykey"));
    }

    #[test]
    fn bare_prefix_is_malformed() {
        let err = parse_stats("STAT\r\nEND\r\n").unwrap_err();
        assert!(matches!(err, BrokerError::MalformedResponse(_)));
    }

    #[test]
    fn malformed_line_fails_even_after_good_lines() {
        let body = "STAT pid 1\r\nSTAT broken\r\nSTAT uptime 2\r\nEND\r\n";
        assert!(parse_stats(body).is_err());
    }

    #[test]
    fn duplicate_keys_are_preserved_in_order() {
        let body = "STAT threads 4\r\nSTAT pid 9\r\nSTAT threads 8\r\nEND\r\n";
        let stats = parse_stats(body).unwrap();
        let keys: Vec<&str> = stats.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["threads", "pid", "threads"]);
        assert_eq!(stats[2].value, "8");
    }

    #[test]
    fn extra_tokens_are_ignored() {
        let stats = parse_stats("STAT libevent 2.1.12-stable extra\r\n").unwrap();
        assert_eq!(stats, vec![StatEntry::new("libevent", "2.1.12-stable")]);
    }

    #[test]
    fn bare_newlines_are_accepted() {
        let stats = parse_stats("STAT curr_items 0\nEND\n").unwrap();
        assert_eq!(stats, vec![StatEntry::new("curr_items", "0")]);
    }

    #[test]
    fn empty_body_yields_no_stats() {
        assert!(parse_stats("").unwrap().is_empty());
        assert!(parse_stats("END\r\n").unwrap().is_empty());
    }

    #[test]
    fn error_lines_are_not_stats() {
        assert!(parse_stats("ERROR\r\n").unwrap().is_empty());
    }

    #[test]
    fn flush_response_is_trimmed() {
        assert_eq!(parse_flush_response("  OK\r\n"), "OK");
        assert_eq!(parse_flush_response(""), "");
    }

    #[test]
    fn commands_are_newline_terminated() {
        assert_eq!(STATS_COMMAND, "stats\n");
        assert_eq!(FLUSH_ALL_COMMAND, "flush_all\n");
    }
}
