//! シグナル消費スレッド: SIGCHLD の drain、SIGINT / SIGTSTP の中継、SIGQUIT 終了。
//!
//! `signal-hook` のイテレータを専用スレッドで回し、そのスレッドだけが
//! 非同期のレジストリ更新を行う単一コンシューマ構成。シグナル種別ごとの処理:
//!
//! - SIGCHLD → [`reap_children`]: `waitpid(-1, WNOHANG | WUNTRACED)` を
//!   報告可能な子がなくなるまでループし、終了/シグナル死/停止を分類して
//!   レジストリに反映する（SIGCHLD はカーネル側で合流するため 1 回の起床で
//!   保留分を全部 drain する必要がある）
//! - SIGINT / SIGTSTP → [`relay_to_foreground`]: フォアグラウンドジョブの
//!   プロセスグループ全体に同じシグナルを転送する（シェル自身には送らない）
//! - SIGQUIT → メッセージを出力して exit(1)（ドライバからの終了要求）

use std::process;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use libc::pid_t;
use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use signal_hook::consts::signal::{SIGCHLD, SIGINT, SIGQUIT, SIGTSTP};
use signal_hook::iterator::Signals;

use crate::job::{JobState, JobTable, Jobs};

// ── スレッド起動 ─────────────────────────────────────────────────────

/// シグナル消費スレッドを起動する。
///
/// ハンドラ登録によりシェル本体は SIGINT / SIGTSTP / SIGQUIT のデフォルト動作
/// （終了・停止）を受けなくなる。子プロセスは spawn 時に SIG_DFL へ戻される。
pub fn spawn_signal_thread(jobs: Arc<Jobs>) -> Result<()> {
    let mut signals = Signals::new([SIGCHLD, SIGINT, SIGTSTP, SIGQUIT])
        .context("failed to install signal handlers")?;

    thread::Builder::new()
        .name("signals".into())
        .spawn(move || {
            for sig in signals.forever() {
                match sig {
                    SIGCHLD => reap_children(&jobs),
                    SIGINT => relay_to_foreground(&jobs, Signal::SIGINT),
                    SIGTSTP => relay_to_foreground(&jobs, Signal::SIGTSTP),
                    SIGQUIT => {
                        println!("Terminating after receipt of SIGQUIT signal");
                        process::exit(1);
                    }
                    _ => unreachable!(),
                }
            }
        })
        .context("failed to spawn signal thread")?;
    Ok(())
}

// ── SIGCHLD drain ────────────────────────────────────────────────────

/// 保留中の子プロセス状態変化をすべて回収し、レジストリに反映する。
///
/// ロックは drain 全体で保持する。起動パス（spawn → add）が同じロックを
/// 保持している間はここへ到達しないため、「登録前の子を削除する」レースは
/// 起きない。drain 後に待機ゲートへ通知する。
pub fn reap_children(jobs: &Jobs) {
    let mut table = jobs.lock();
    loop {
        match waitpid(
            Pid::from_raw(-1),
            Some(WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED),
        ) {
            // WNOHANG で報告可能な子がない → drain 完了
            Ok(WaitStatus::StillAlive) => break,
            Ok(status) => apply_status(&mut table, status),
            // 子が 1 つもいないのは正常（追跡対象なしの呼び出し）
            Err(Errno::ECHILD) => break,
            Err(e) => fatal("waitpid", e),
        }
    }
    drop(table);
    jobs.notify();
}

/// waitpid が報告した 1 件の状態変化を分類してレジストリに適用する。
///
/// - 正常終了 → 黙って削除（通常の完了は表示しない）
/// - シグナル死 → 終了行を出力してから削除
/// - 停止 → 状態を Stopped に変更して停止行を出力
///
/// 追跡していない pid の報告は正当なレース（前の drain で削除済みなど）
/// なので黙って無視する。
pub fn apply_status(table: &mut JobTable, status: WaitStatus) {
    match status {
        WaitStatus::Exited(pid, _) => {
            table.remove(pid.as_raw());
        }
        WaitStatus::Signaled(pid, sig, _) => {
            let jid = table.pid_to_jid(pid.as_raw());
            if jid != 0 {
                println!(
                    "Job [{}] ({}) terminated by signal {}",
                    jid,
                    pid.as_raw(),
                    sig as i32
                );
            }
            table.remove(pid.as_raw());
        }
        WaitStatus::Stopped(pid, sig) => {
            if let Some(job) = table.get_mut_by_pid(pid.as_raw()) {
                job.state = JobState::Stopped;
                println!(
                    "Job [{}] ({}) stopped by signal {}",
                    job.jid,
                    pid.as_raw(),
                    sig as i32
                );
            }
        }
        _ => {}
    }
}

// ── 対話シグナル中継 ─────────────────────────────────────────────────

/// キーボード由来のシグナルをフォアグラウンドジョブへ転送する。
///
/// 宛先は pid の負値、つまりジョブのプロセスグループ全体。シェル自身や
/// バックグラウンドジョブには届かない。フォアグラウンドジョブがなければ何もしない。
pub fn relay_to_foreground(jobs: &Jobs, sig: Signal) {
    let target = jobs.lock().fg_pid();
    if let Some(pid) = target {
        if let Err(e) = kill(Pid::from_raw(-pid), sig) {
            fatal("kill", e);
        }
    }
}

// ── 致命的エラー ─────────────────────────────────────────────────────

/// プロセス/シグナル系システムコールの回復不能な失敗。
/// 失敗した操作名と OS の理由を出力してシェルを終了する。
pub fn fatal(op: &str, err: Errno) -> ! {
    eprintln!("jsh: {}: {}", op, err);
    process::exit(1);
}

/// SIGCONT をジョブのプロセスグループへ送る。`bg` / `fg` ビルトインから呼ばれる。
pub fn continue_group(pid: pid_t) {
    if let Err(e) = kill(Pid::from_raw(-pid), Signal::SIGCONT) {
        fatal("kill", e);
    }
}

// ── Tests ───────────────────────────────────────────────────────────
