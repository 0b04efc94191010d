//! `posix_spawnp()` の安全な Rust ラッパー。
//!
//! 子プロセスは起動時点で
//! - 自身をリーダーとする新しいプロセスグループに入り（`POSIX_SPAWN_SETPGROUP`）、
//! - シェルが捕捉しているキーボード系シグナルを `SIG_DFL` に戻し、
//! - 親の環境をそのまま継承する。
//!
//! グループ設定が spawn と同時に行われるため、「子が先に exec して
//! グループ未設定のままシグナルを受ける」レースがない。
//!
//! | 型 | 役割 |
//! |-----|------|
//! | [`SpawnAttr`] | `posix_spawnattr_t` の RAII ラッパー（プロセスグループ、シグナル設定） |
//! | [`CStringVec`] | argv 用の NULL 終端ポインタ配列 |
//! | [`spawn`] | 上記を組み合わせて `posix_spawnp` を呼ぶ公開関数 |

use std::ffi::CString;
use std::fmt;

// ── エラー型 ──────────────────────────────────────────────────────

/// `posix_spawnp` の失敗を表すエラー。
#[derive(Debug)]
pub struct SpawnError {
    /// errno 値。
    pub errno: i32,
    /// コマンド名（エラーメッセージ用）。
    pub command: String,
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errno {
            libc::ENOENT => write!(f, "{}: Command not found", self.command),
            libc::EACCES => write!(f, "{}: Permission denied", self.command),
            _ => write!(f, "jsh: {}: spawn failed (errno {})", self.command, self.errno),
        }
    }
}

impl SpawnError {
    /// エラーに対応する終了ステータスを返す。
    /// 127 = command not found, 126 = permission denied, 1 = その他。
    pub fn exit_status(&self) -> i32 {
        match self.errno {
            libc::ENOENT => 127,
            libc::EACCES => 126,
            _ => 1,
        }
    }
}

// ── SpawnAttr ─────────────────────────────────────────────────────

/// `posix_spawnattr_t` の RAII ラッパー。Drop で自動 destroy。
struct SpawnAttr {
    inner: libc::posix_spawnattr_t,
}

impl SpawnAttr {
    /// `posix_spawnattr_init` で初期化する。
    fn new() -> Self {
        unsafe {
            let mut attr: libc::posix_spawnattr_t = std::mem::zeroed();
            libc::posix_spawnattr_init(&mut attr);
            Self { inner: attr }
        }
    }

    /// 子を新しいプロセスグループのリーダーにする。
    ///
    /// `POSIX_SPAWN_SETPGROUP` + pgid 0 で、子の PID がそのままグループ ID になる。
    /// ターミナル由来のシグナルがシェルのグループ経由で子に届かなくなる。
    fn set_new_pgroup(&mut self) {
        unsafe {
            let mut flags: libc::c_short = 0;
            libc::posix_spawnattr_getflags(&self.inner, &mut flags);
            flags |= libc::POSIX_SPAWN_SETPGROUP as libc::c_short;
            libc::posix_spawnattr_setflags(&mut self.inner, flags);
            libc::posix_spawnattr_setpgroup(&mut self.inner, 0);
        }
    }

    /// シグナルをデフォルトにリセットする。
    ///
    /// シェルが捕捉している SIGINT, SIGTSTP, SIGQUIT, SIGCHLD を
    /// 子では `SIG_DFL` に戻す。
    fn set_sigdefault(&mut self) {
        unsafe {
            let mut flags: libc::c_short = 0;
            libc::posix_spawnattr_getflags(&self.inner, &mut flags);
            flags |= libc::POSIX_SPAWN_SETSIGDEF as libc::c_short;
            libc::posix_spawnattr_setflags(&mut self.inner, flags);

            let mut sigset: libc::sigset_t = std::mem::zeroed();
            libc::sigemptyset(&mut sigset);
            libc::sigaddset(&mut sigset, libc::SIGINT);
            libc::sigaddset(&mut sigset, libc::SIGTSTP);
            libc::sigaddset(&mut sigset, libc::SIGQUIT);
            libc::sigaddset(&mut sigset, libc::SIGCHLD);
            libc::posix_spawnattr_setsigdefault(&mut self.inner, &sigset);
        }
    }

    fn as_ptr(&self) -> *const libc::posix_spawnattr_t {
        &self.inner
    }
}

impl Drop for SpawnAttr {
    fn drop(&mut self) {
        unsafe {
            libc::posix_spawnattr_destroy(&mut self.inner);
        }
    }
}

// ── CStringVec ────────────────────────────────────────────────────

/// argv 用の CString ベクタ。NULL 終端のポインタ配列を構築する。
struct CStringVec {
    _strings: Vec<CString>,
    ptrs: Vec<*mut libc::c_char>,
}

impl CStringVec {
    /// 引数リストから構築する。各要素を `CString` に変換し、NULL 終端ポインタ配列を作る。
    fn from_args(args: &[&str]) -> Self {
        let strings: Vec<CString> = args
            .iter()
            .map(|s| CString::new(*s).unwrap_or_else(|_| CString::default()))
            .collect();
        let mut ptrs: Vec<*mut libc::c_char> = strings
            .iter()
            .map(|s| s.as_ptr() as *mut libc::c_char)
            .collect();
        ptrs.push(std::ptr::null_mut()); // NULL 終端
        Self {
            _strings: strings,
            ptrs,
        }
    }

    /// NULL 終端ポインタ配列を返す。
    fn as_ptr(&self) -> *const *mut libc::c_char {
        self.ptrs.as_ptr()
    }
}

// ── spawn 関数 ────────────────────────────────────────────────────

/// `posix_spawnp` で子プロセスを起動する。成功時は子 PID を返す。
///
/// `args[0]` がコマンド名（PATH 検索付き）。プログラムが見つからない場合は
/// `ENOENT` の [`SpawnError`]（表示は `<command>: Command not found`）になり、
/// 親の制御フローには影響しない。
pub fn spawn(args: &[&str]) -> Result<libc::pid_t, SpawnError> {
    let argv = CStringVec::from_args(args);

    // 属性: 新プロセスグループ + シグナルリセット
    let mut attr = SpawnAttr::new();
    attr.set_new_pgroup();
    attr.set_sigdefault();

    // environ を継承（std::env::set_var で設定済みの環境がそのまま渡る）
    extern "C" {
        static environ: *const *mut libc::c_char;
    }

    let mut pid: libc::pid_t = 0;

    let ret = unsafe {
        libc::posix_spawnp(
            &mut pid,
            argv.as_ptr().read() as *const libc::c_char,
            std::ptr::null(),
            attr.as_ptr(),
            argv.as_ptr(),
            environ as *const *mut libc::c_char,
        )
    };

    if ret != 0 {
        return Err(SpawnError {
            errno: ret,
            command: args[0].to_string(),
        });
    }

    Ok(pid)
}

// ── Tests ───────────────────────────────────────────────────────────
