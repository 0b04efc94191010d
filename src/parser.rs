//! トークナイザ: 入力行を引数ベクタとバックグラウンドフラグに分解する。
//!
//! - 空白区切りでトークンを切り出す
//! - シングルクォートで囲まれた区間は空白を含めて 1 引数
//! - 末尾の `&` トークンは自身を取り除いてバックグラウンドフラグを立てる
//! - 空行は空の引数ベクタになる

// ── データ構造 ───────────────────────────────────────────────────────

/// パース結果。`argv` が空なら実行するものがない。
#[derive(Debug, PartialEq, Eq)]
pub struct ParsedLine {
    /// コマンドと引数。`argv[0]` がコマンド名。
    pub argv: Vec<String>,
    /// 末尾に `&` があった場合 true。
    pub background: bool,
}

// ── パース ───────────────────────────────────────────────────────────

/// 1 行をトークナイズする。構文エラーは存在しない（未閉クォートは行末まで扱う）。
pub fn parse(line: &str) -> ParsedLine {
    let mut argv = Vec::new();
    let mut chars = line.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }
        if c == '\'' {
            // クォート区間: 次のシングルクォートまでを 1 引数として切り出す
            chars.next();
            let content_start = start + 1;
            let mut content_end = line.len();
            for (i, qc) in chars.by_ref() {
                if qc == '\'' {
                    content_end = i;
                    break;
                }
            }
            argv.push(line[content_start..content_end.min(line.len())].to_string());
        } else {
            let mut end = line.len();
            for (i, wc) in chars.by_ref() {
                if wc.is_whitespace() {
                    end = i;
                    break;
                }
            }
            if end == line.len() {
                argv.push(line[start..].to_string());
            } else {
                argv.push(line[start..end].to_string());
            }
        }
    }

    let background = argv.last().map(|s| s == "&").unwrap_or(false);
    if background {
        argv.pop();
    }

    ParsedLine { argv, background }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(input: &str) -> Vec<String> {
        parse(input).argv
    }

    // ── 単純コマンド ──

    #[test]
    fn simple_command() {
        assert_eq!(argv("echo hello world"), vec!["echo", "hello", "world"]);
    }

    #[test]
    fn single_arg() {
        assert_eq!(argv("ls"), vec!["ls"]);
    }

    #[test]
    fn extra_whitespace() {
        assert_eq!(argv("  echo   hello  "), vec!["echo", "hello"]);
    }

    #[test]
    fn blank_line_yields_empty_argv() {
        let parsed = parse("   \n");
        assert!(parsed.argv.is_empty());
        assert!(!parsed.background);
    }

    // ── クォート ──

    #[test]
    fn single_quotes_span_one_argument() {
        assert_eq!(argv("echo 'hello world'"), vec!["echo", "hello world"]);
    }

    #[test]
    fn unterminated_quote_runs_to_end_of_line() {
        assert_eq!(argv("echo 'abc def"), vec!["echo", "abc def"]);
    }

    // ── バックグラウンドフラグ ──

    #[test]
    fn trailing_ampersand_sets_background_and_strips_itself() {
        let parsed = parse("sleep 1 &");
        assert_eq!(parsed.argv, vec!["sleep", "1"]);
        assert!(parsed.background);
    }

    #[test]
    fn ampersand_must_be_its_own_token() {
        let parsed = parse("echo a&b");
        assert_eq!(parsed.argv, vec!["echo", "a&b"]);
        assert!(!parsed.background);
    }

    #[test]
    fn lone_ampersand_yields_empty_background_line() {
        let parsed = parse("&");
        assert!(parsed.argv.is_empty());
        assert!(parsed.background);
    }
}
