//! jsh — ジョブ制御つきの小さなシェル
//!
//! REPL ループ: プロンプト表示 → 1 行読み取り → パース → 実行 → ループ
//!
//! 非同期の子プロセス状態変化（SIGCHLD）は専用のシグナル消費スレッドが
//! 処理し、メインループとはジョブレジストリの Mutex + Condvar で同期する。
//!
//! ## モジュール構成
//!
//! | モジュール | 役割 |
//! |-----------|------|
//! | [`parser`] | トークナイザ（空白区切り、シングルクォート、末尾 `&`） |
//! | [`job`] | ジョブレジストリ（固定容量スロットテーブル）とフォアグラウンド待機ゲート |
//! | [`signals`] | シグナル消費スレッド（SIGCHLD drain、SIGINT/SIGTSTP 中継、SIGQUIT） |
//! | [`executor`] | コマンド評価（ビルトイン判定、レースフリーな起動シーケンス） |
//! | [`builtins`] | ビルトイン（`quit`, `jobs`, `bg`, `fg`） |
//! | [`shell`] | シェルのグローバル状態（終了ステータス、ジョブレジストリのハンドル） |
//! | [`spawn`] | `posix_spawnp` ラッパー（新プロセスグループ + シグナルリセット） |

mod builtins;
mod executor;
mod job;
mod parser;
mod shell;
mod signals;
mod spawn;

use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

use shell::Shell;

/// コマンドラインフラグ。
struct Opts {
    /// `-v`: ジョブ追加時の診断を出力する。
    verbose: bool,
    /// `-p` で false: プロンプトを出さない（ドライバによる自動テスト用）。
    emit_prompt: bool,
}

/// `-h` / `-v` / `-p` を処理する。未知のフラグは usage を表示して終了。
fn parse_opts() -> Opts {
    let mut opts = Opts {
        verbose: false,
        emit_prompt: true,
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" => usage(),
            "-v" => opts.verbose = true,
            "-p" => opts.emit_prompt = false,
            _ => usage(),
        }
    }
    opts
}

fn usage() -> ! {
    println!("Usage: jsh [-hvp]");
    println!("   -h   print this message");
    println!("   -v   print additional diagnostic information");
    println!("   -p   do not emit a command prompt");
    process::exit(1);
}

fn main() {
    let opts = parse_opts();
    let mut shell = Shell::new(opts.verbose);

    // シグナル消費スレッド: SIGCHLD の reap、SIGINT/SIGTSTP の中継、SIGQUIT。
    // 登録後はシェル本体がキーボードシグナルで死ななくなる。
    if let Err(e) = signals::spawn_signal_thread(Arc::clone(&shell.jobs)) {
        eprintln!("jsh: {:#}", e);
        process::exit(1);
    }

    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        if opts.emit_prompt {
            print!("jsh> ");
            let _ = io::stdout().flush();
        }

        line.clear();
        match stdin.lock().read_line(&mut line) {
            // EOF (Ctrl+D): 正常終了
            Ok(0) => break,
            Ok(_) => {
                shell.last_status = executor::execute(&mut shell, &line);
                if shell.should_exit {
                    break;
                }
            }
            Err(e) => {
                eprintln!("jsh: read error: {}", e);
                process::exit(1);
            }
        }
    }

    process::exit(shell.last_status);
}
