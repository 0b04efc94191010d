//! jsh ベンチマーク: パーサーとジョブレジストリ操作の計測。
//!
//! `std::time::Instant` による手動計測（外部クレート不要）。
//!
//! 実行: `cargo bench`

use std::time::{Duration, Instant};

use jsh::job::{JobState, JobTable, MAX_JOBS};

// ── ベンチマークインフラ ──────────────────────────────────────────

struct BenchResult {
    category: &'static str,
    name: &'static str,
    avg: Duration,
    iters: u64,
}

impl BenchResult {
    fn print(&self) {
        let avg_us = self.avg.as_nanos() as f64 / 1000.0;
        println!(
            "[{:<8}] {:<40}: avg {:>10.2}µs  ({} iters)",
            self.category, self.name, avg_us, self.iters,
        );
    }
}

fn bench<F: FnMut()>(
    category: &'static str,
    name: &'static str,
    iters: u64,
    mut f: F,
) -> BenchResult {
    // ウォームアップ
    for _ in 0..iters.min(100) {
        f();
    }

    let start = Instant::now();
    for _ in 0..iters {
        f();
    }
    let elapsed = start.elapsed();

    BenchResult {
        category,
        name,
        avg: elapsed / iters as u32,
        iters,
    }
}

// ── メイン ────────────────────────────────────────────────────────

fn main() {
    println!("jsh benchmark suite");
    println!("{}", "=".repeat(80));

    let mut results = Vec::new();

    // ── パーサーベンチマーク ──
    println!("\n--- Parser ---");

    results.push(bench("parser", "echo hello", 10_000, || {
        let _ = jsh::parser::parse("echo hello");
    }));

    results.push(bench("parser", "sleep 1 &", 10_000, || {
        let _ = jsh::parser::parse("sleep 1 &");
    }));

    results.push(bench("parser", "echo 'quoted span here'", 10_000, || {
        let _ = jsh::parser::parse("echo 'quoted span here'");
    }));

    // ── ジョブレジストリベンチマーク ──
    println!("\n--- JobTable ---");

    results.push(bench("jobtable", "add + remove", 10_000, || {
        let mut t = JobTable::new(false);
        t.add(100, JobState::Background, "sleep 1 &");
        t.remove(100);
    }));

    results.push(bench("jobtable", "add to full table", 10_000, || {
        let mut t = JobTable::new(false);
        for pid in 1..=(MAX_JOBS as i32) {
            t.add(pid, JobState::Background, "cmd &");
        }
    }));

    let mut lookup_table = JobTable::new(false);
    for pid in 1..=(MAX_JOBS as i32) {
        lookup_table.add(pid, JobState::Background, "cmd &");
    }
    results.push(bench("jobtable", "pid lookup (full table)", 100_000, || {
        let _ = lookup_table.get_by_pid(MAX_JOBS as i32);
    }));

    results.push(bench("jobtable", "fg scan (no foreground)", 100_000, || {
        let _ = lookup_table.fg_pid();
    }));

    results.push(bench("jobtable", "list (full table)", 10_000, || {
        let _ = lookup_table.list();
    }));

    // ── 結果サマリ ──
    println!("\n{}", "=".repeat(80));
    println!("Summary:");
    for r in &results {
        r.print();
    }
}
