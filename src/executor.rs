//! コマンド評価: ビルトイン判定と外部コマンドの起動シーケンス。
//!
//! 起動パスのレース回避規約:
//! 1. レジストリロックを取る（シグナル消費スレッドの SIGCHLD 処理を排除）
//! 2. `posix_spawnp` で子を起動（新プロセスグループ + シグナル SIG_DFL）
//! 3. ロックを保持したままレジストリへ登録
//! 4. ロックを解放
//! 5. foreground → 待機ゲート / background → 確認行を表示して即座に返る
//!
//! 子が登録前に終了しても、その SIGCHLD の drain はロック解放後にしか
//! 走らないため、「挿入 1 回 → 削除 1 回」の順序が常に保たれる。

use std::sync::Arc;

use crate::builtins;
use crate::job::JobState;
use crate::parser::{self, ParsedLine};
use crate::shell::Shell;
use crate::spawn;

/// 入力 1 行を評価して終了ステータスを返す。
///
/// 空行は何もしない。ビルトインはプロセス内で実行し、
/// それ以外は外部コマンドとして起動する。
pub fn execute(shell: &mut Shell, line: &str) -> i32 {
    let parsed = parser::parse(line);
    if parsed.argv.is_empty() {
        return shell.last_status;
    }

    if let Some(status) = builtins::try_exec(shell, &parsed.argv) {
        return status;
    }

    launch(shell, &parsed, line.trim())
}

/// 外部コマンドを起動する。`cmdline` はジョブテーブルの表示用文字列。
fn launch(shell: &mut Shell, parsed: &ParsedLine, cmdline: &str) -> i32 {
    let args: Vec<&str> = parsed.argv.iter().map(|s| s.as_str()).collect();
    let state = if parsed.background {
        JobState::Background
    } else {
        JobState::Foreground
    };

    let jobs = Arc::clone(&shell.jobs);

    // spawn から登録完了までロックを保持する（起動レース回避規約の 1〜4）
    let mut table = jobs.lock();
    let pid = match spawn::spawn(&args) {
        Ok(pid) => pid,
        Err(e) => {
            drop(table);
            println!("{}", e);
            return e.exit_status();
        }
    };
    let added = table.add(pid, state, cmdline);
    let jid = table.pid_to_jid(pid);
    drop(table);

    if parsed.background {
        // テーブル満杯で登録に失敗した場合は確認行を出さない
        // （プロセス自体は起動済み。終了時に未追跡 pid として黙って回収される）
        if added {
            println!("[{}] ({}) {}", jid, pid, cmdline);
        }
        0
    } else {
        jobs.wait_for_fg(pid);
        0
    }
}

// ── Tests ───────────────────────────────────────────────────────────
