//! jsh ライブラリ — ベンチマーク・テスト用にモジュールを公開する。
//!
//! バイナリ本体は `main.rs` の REPL ループ。
//! この `lib.rs` は `benches/bench_main.rs` 等の外部クレートから
//! パーサー・ジョブレジストリに直接アクセスするために存在する。
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

pub mod builtins;
pub mod executor;
pub mod job;
pub mod parser;
pub mod shell;
pub mod signals;
pub mod spawn;
