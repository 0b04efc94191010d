//! ビルトインコマンドの実装。
//!
//! ビルトインは spawn を経由せずプロセス内で直接実行される。
//! `try_exec()` が `Some(status)` を返せばビルトインとして処理済み、
//! `None` なら外部コマンドとして executor に委ねる。
//!
//! `bg` / `fg` のターゲットは `%N`（ジョブ番号）または PID で指定する。

use libc::pid_t;

use crate::job::JobState;
use crate::shell::Shell;
use crate::signals;

/// ビルトインコマンドの実行を試みる。
///
/// 戻り値:
/// - `Some(status)` — ビルトインとして実行済み
/// - `None` — 該当するビルトインなし（外部コマンドとして実行すべき）
pub fn try_exec(shell: &mut Shell, argv: &[String]) -> Option<i32> {
    match argv[0].as_str() {
        "quit" => {
            shell.should_exit = true;
            Some(0)
        }
        // 単独の & は無視する
        "&" => Some(0),
        "jobs" => Some(builtin_jobs(shell)),
        "bg" | "fg" => Some(builtin_bgfg(shell, argv)),
        _ => None,
    }
}

/// `jobs` — ジョブテーブルをテーブル順に表示する。
fn builtin_jobs(shell: &Shell) -> i32 {
    for line in shell.jobs.lock().list() {
        println!("{}", line);
    }
    0
}

// ── bg / fg ─────────────────────────────────────────────────────────

/// `bg` / `fg` のターゲット指定。
enum Target {
    Jid(u32),
    Pid(pid_t),
}

/// `bg <pid|%jobid>` / `fg <pid|%jobid>` の共通処理。
///
/// ターゲット解決 → プロセスグループへ SIGCONT → 状態変更（と bg の確認行）を
/// レジストリロックを保持したまま行う。シグナル消費スレッドは SIGCONT 後の
/// 状態変化をロック解放まで処理できないため、状態変更が削除に追い越されない。
/// `fg` はロック解放後に待機ゲートへ入る。
fn builtin_bgfg(shell: &mut Shell, argv: &[String]) -> i32 {
    let name = argv[0].as_str();

    let Some(arg) = argv.get(1) else {
        println!("{} command requires PID or %jobid argument", name);
        return 1;
    };

    let target = if let Some(rest) = arg.strip_prefix('%') {
        match rest.parse::<u32>() {
            Ok(jid) => Target::Jid(jid),
            Err(_) => {
                println!("{}: argument must be a PID or %jobid", name);
                return 1;
            }
        }
    } else {
        match arg.parse::<pid_t>() {
            Ok(pid) => Target::Pid(pid),
            Err(_) => {
                println!("{}: argument must be a PID or %jobid", name);
                return 1;
            }
        }
    };

    let to_background = name == "bg";
    let fg_target;
    {
        let mut table = shell.jobs.lock();
        let job = match target {
            Target::Jid(jid) => {
                let Some(job) = table.get_mut_by_jid(jid) else {
                    println!("%{}: No such job", jid);
                    return 1;
                };
                job
            }
            Target::Pid(pid) => {
                let Some(job) = table.get_mut_by_pid(pid) else {
                    println!("({}): No such process", pid);
                    return 1;
                };
                job
            }
        };

        signals::continue_group(job.pid);

        if to_background {
            job.state = JobState::Background;
            println!("[{}] ({}) {}", job.jid, job.pid, job.cmdline);
            fg_target = None;
        } else {
            job.state = JobState::Foreground;
            fg_target = Some(job.pid);
        }
    }

    if let Some(pid) = fg_target {
        shell.jobs.wait_for_fg(pid);
    }
    0
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(false)
    }

    #[test]
    fn quit_sets_exit_flag() {
        let mut sh = shell();
        let status = try_exec(&mut sh, &["quit".to_string()]);
        assert_eq!(status, Some(0));
        assert!(sh.should_exit);
    }

    #[test]
    fn lone_ampersand_is_ignored() {
        let mut sh = shell();
        assert_eq!(try_exec(&mut sh, &["&".to_string()]), Some(0));
    }

    #[test]
    fn external_command_is_not_a_builtin() {
        let mut sh = shell();
        assert_eq!(try_exec(&mut sh, &["ls".to_string()]), None);
    }

    // ── ターゲット解決エラー ──

    #[test]
    fn fg_with_unknown_jid_changes_nothing() {
        let mut sh = shell();
        sh.jobs.lock().add(100, JobState::Stopped, "cat");
        let before = sh.jobs.lock().list();
        let status = try_exec(&mut sh, &["fg".to_string(), "%99".to_string()]);
        assert_eq!(status, Some(1));
        assert_eq!(sh.jobs.lock().list(), before);
    }

    #[test]
    fn bg_without_argument_fails() {
        let mut sh = shell();
        let status = try_exec(&mut sh, &["bg".to_string()]);
        assert_eq!(status, Some(1));
    }

    #[test]
    fn bg_with_malformed_argument_fails() {
        let mut sh = shell();
        assert_eq!(
            try_exec(&mut sh, &["bg".to_string(), "%abc".to_string()]),
            Some(1),
        );
        assert_eq!(
            try_exec(&mut sh, &["fg".to_string(), "abc".to_string()]),
            Some(1),
        );
    }

    #[test]
    fn bg_with_unknown_pid_reports_no_such_process() {
        let mut sh = shell();
        let status = try_exec(&mut sh, &["bg".to_string(), "12345".to_string()]);
        assert_eq!(status, Some(1));
        assert!(sh.jobs.lock().is_empty());
    }
}
