//! シェルのグローバル状態を保持するモジュール。
//!
//! ジョブレジストリ（[`Jobs`]）は暗黙のグローバルではなく [`Shell`] が所有し、
//! 起動パス・ビルトイン・シグナル消費スレッドへ `Arc` ハンドルで明示的に渡す。
//! 共有箇所と排他の必要性が呼び出し側から見えるようにするための構成。

use std::sync::Arc;

use crate::job::Jobs;

/// シェルの実行状態。REPL ループ全体で共有される。
pub struct Shell {
    /// 直前のコマンドの終了ステータス。プロセスの終了コードに使う。
    pub last_status: i32,
    /// `quit` ビルトインで true にセットされ、REPL ループを終了させる。
    pub should_exit: bool,
    /// ジョブレジストリ。シグナル消費スレッドと共有する。
    /// `-v` の診断フラグはレジストリ側（[`crate::job::JobTable`]）が持つ。
    pub jobs: Arc<Jobs>,
}

impl Shell {
    pub fn new(verbose: bool) -> Self {
        Self {
            last_status: 0,
            should_exit: false,
            jobs: Arc::new(Jobs::new(verbose)),
        }
    }
}
