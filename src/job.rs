//! ジョブレジストリとフォアグラウンド待機ゲート。
//!
//! 固定容量のスロットテーブル（[`JobTable`]）でジョブを管理し、
//! Mutex + Condvar のラッパー（[`Jobs`]）でメインループとシグナル消費スレッドの
//! 両方から共有する。フォアグラウンド待機（[`Jobs::wait_for_fg`]）は
//! レジストリ更新と同じロック下で条件を判定するため、wakeup の取りこぼしがない。

use std::sync::{Condvar, Mutex, MutexGuard};

use libc::pid_t;

/// ジョブテーブルの固定容量。超過時は追加を拒否する（クラッシュしない）。
pub const MAX_JOBS: usize = 16;

/// 保存するコマンド文字列の最大バイト数。超過分は切り詰める。
pub const MAX_CMDLINE: usize = 1024;

// ── データ構造 ───────────────────────────────────────────────────────

/// ジョブの実行状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// メインループをブロックしている唯一のジョブ。
    Foreground,
    /// `&` で起動されたか `bg` で再開されたジョブ。
    Background,
    /// SIGTSTP / SIGSTOP で停止中。SIGCONT で再開される。
    Stopped,
}

impl JobState {
    /// `jobs` 出力用の状態ラベル。
    pub fn label(self) -> &'static str {
        match self {
            JobState::Foreground => "Foreground",
            JobState::Background => "Running",
            JobState::Stopped => "Stopped",
        }
    }
}

/// ジョブレコード。占有スロットの pid と jid は常に正。
#[derive(Debug, Clone)]
pub struct Job {
    /// OS のプロセス ID。`kill(-pid, sig)` のプロセスグループ宛先にも使う。
    pub pid: pid_t,
    /// シェルが割り当てるジョブ番号。`%N` でユーザから参照される。
    pub jid: u32,
    /// 現在の実行状態。
    pub state: JobState,
    /// 表示用コマンド文字列（入力行そのまま、最大 [`MAX_CMDLINE`] バイト）。
    pub cmdline: String,
}

// ── JobTable ─────────────────────────────────────────────────────────

/// ジョブテーブル本体。固定長スロットの線形走査で全操作を行う。
///
/// どの操作もブロックしないため、シグナル消費スレッドからロック越しに
/// 呼んでも安全。対話シェルのワーキングセットは小さいので線形走査で足りる。
pub struct JobTable {
    slots: [Option<Job>; MAX_JOBS],
    next_jid: u32,
    verbose: bool,
}

impl JobTable {
    pub fn new(verbose: bool) -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            next_jid: 1,
            verbose,
        }
    }

    /// 全スロットを空にし、jid カウンタを 1 に戻す。
    pub fn clear(&mut self) {
        self.slots = std::array::from_fn(|_| None);
        self.next_jid = 1;
    }

    /// jid が占有スロットで使用中か。
    fn jid_in_use(&self, jid: u32) -> bool {
        self.slots.iter().flatten().any(|job| job.jid == jid)
    }

    /// 次のジョブ番号を割り当てる。カウンタ位置から昇順に探し、
    /// MAX_JOBS を超えたら 1 に巻き戻す。使用中の jid はスキップする。
    ///
    /// 呼び出し前に空きスロットの存在を確認している（占有数 < MAX_JOBS）ため
    /// 探索は必ず停止する。
    fn alloc_jid(&mut self) -> u32 {
        // remove() の再計算でカウンタが容量を超えていることがある
        let mut jid = self.next_jid;
        if jid > MAX_JOBS as u32 {
            jid = 1;
        }
        while self.jid_in_use(jid) {
            jid += 1;
            if jid > MAX_JOBS as u32 {
                jid = 1;
            }
        }
        self.next_jid = if jid + 1 > MAX_JOBS as u32 { 1 } else { jid + 1 };
        jid
    }

    /// ジョブを追加する。成功時は true。
    ///
    /// `pid < 1` は拒否。テーブル満杯時は診断を出力して false を返し、
    /// 既存スロットには一切触れない。
    pub fn add(&mut self, pid: pid_t, state: JobState, cmdline: &str) -> bool {
        if pid < 1 {
            return false;
        }
        let Some(idx) = self.slots.iter().position(|s| s.is_none()) else {
            println!("Tried to create too many jobs");
            return false;
        };

        let jid = self.alloc_jid();

        // 文字境界を保って MAX_CMDLINE バイトに切り詰める
        let mut end = MAX_CMDLINE.min(cmdline.len());
        while !cmdline.is_char_boundary(end) {
            end -= 1;
        }

        let job = Job {
            pid,
            jid,
            state,
            cmdline: cmdline[..end].to_string(),
        };
        if self.verbose {
            println!("Added job [{}] {} {}", job.jid, job.pid, job.cmdline);
        }
        self.slots[idx] = Some(job);
        true
    }

    /// pid のジョブを削除する。見つからなければ黙って false。
    ///
    /// 削除後の jid カウンタは「使用中の最大 jid + 1」に再計算され、
    /// 空いた番号ができるだけ小さい値から再利用される。
    pub fn remove(&mut self, pid: pid_t) -> bool {
        if pid < 1 {
            return false;
        }
        for slot in &mut self.slots {
            if matches!(slot, Some(job) if job.pid == pid) {
                *slot = None;
                self.next_jid = self.max_jid() + 1;
                return true;
            }
        }
        false
    }

    /// 使用中の最大 jid。空テーブルなら 0。
    fn max_jid(&self) -> u32 {
        self.slots
            .iter()
            .flatten()
            .map(|job| job.jid)
            .max()
            .unwrap_or(0)
    }

    /// pid でジョブを検索する。不在は正常な結果。
    pub fn get_by_pid(&self, pid: pid_t) -> Option<&Job> {
        if pid < 1 {
            return None;
        }
        self.slots.iter().flatten().find(|job| job.pid == pid)
    }

    /// pid でジョブを検索する（可変参照）。
    pub fn get_mut_by_pid(&mut self, pid: pid_t) -> Option<&mut Job> {
        if pid < 1 {
            return None;
        }
        self.slots.iter_mut().flatten().find(|job| job.pid == pid)
    }

    /// jid でジョブを検索する。
    pub fn get_by_jid(&self, jid: u32) -> Option<&Job> {
        if jid < 1 {
            return None;
        }
        self.slots.iter().flatten().find(|job| job.jid == jid)
    }

    /// jid でジョブを検索する（可変参照）。
    pub fn get_mut_by_jid(&mut self, jid: u32) -> Option<&mut Job> {
        if jid < 1 {
            return None;
        }
        self.slots.iter_mut().flatten().find(|job| job.jid == jid)
    }

    /// pid → jid 変換。不在なら 0。
    pub fn pid_to_jid(&self, pid: pid_t) -> u32 {
        self.get_by_pid(pid).map(|job| job.jid).unwrap_or(0)
    }

    /// フォアグラウンドジョブの pid。高々 1 件。
    pub fn fg_pid(&self) -> Option<pid_t> {
        self.slots
            .iter()
            .flatten()
            .find(|job| job.state == JobState::Foreground)
            .map(|job| job.pid)
    }

    /// 占有ジョブ数。
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `jobs` ビルトイン用の表示行。テーブル順に 1 ジョブ 1 行。
    pub fn list(&self) -> Vec<String> {
        self.slots
            .iter()
            .flatten()
            .map(|job| {
                format!(
                    "[{}] ({}) {} {}",
                    job.jid,
                    job.pid,
                    job.state.label(),
                    job.cmdline
                )
            })
            .collect()
    }
}

// ── 共有ハンドルと待機ゲート ─────────────────────────────────────────

/// プロセス全体で共有されるジョブレジストリ。
///
/// メインループ（起動・ビルトイン）とシグナル消費スレッド（reap・中継）の両方が
/// [`Jobs::lock`] で同じ Mutex を取るため、複数ステップの更新はロック保持で
/// 原子的に見える。更新後は [`Jobs::notify`] で待機ゲートを起こす。
pub struct Jobs {
    table: Mutex<JobTable>,
    changed: Condvar,
}

impl Jobs {
    pub fn new(verbose: bool) -> Self {
        Self {
            table: Mutex::new(JobTable::new(verbose)),
            changed: Condvar::new(),
        }
    }

    /// テーブルをロックする。
    pub fn lock(&self) -> MutexGuard<'_, JobTable> {
        self.table.lock().unwrap()
    }

    /// レジストリ更新後に待機ゲートへ通知する。シグナル消費スレッドが
    /// reap / 状態変更のたびに呼ぶ。
    pub fn notify(&self) {
        self.changed.notify_all();
    }

    /// フォアグラウンド待機ゲート。
    ///
    /// `pid` がフォアグラウンドでなくなるまでブロックする。終了・シグナル死で
    /// レジストリから削除された場合も、SIGTSTP で Stopped に降格した場合も返る。
    /// 条件判定は更新側と同じ Mutex 下で行うため missed-wakeup は起きない。
    pub fn wait_for_fg(&self, pid: pid_t) {
        let mut table = self.lock();
        while table.fg_pid() == Some(pid) {
            table = self.changed.wait(table).unwrap();
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
