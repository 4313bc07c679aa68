use std::sync::{Arc, Mutex};
use std::thread;

use super::*;

#[derive(Default)]
struct Recorder {
    progress: Mutex<Vec<u64>>,
    counts: Mutex<Vec<(DownloadStatus, usize)>>,
}

impl ProgressListener for Recorder {
    fn progress_changed(&self, value: u64, _resolution: u64) {
        self.progress.lock().unwrap().push(value);
    }

    fn count_changed(&self, status: DownloadStatus, count: usize) {
        self.counts.lock().unwrap().push((status, count));
    }
}

fn id(n: usize) -> String {
    format!("http://h/seg{n}.ts")
}

/// Runs each id in its own thread, streaming `size` bytes in `chunk` steps then finishing.
fn transfer_all(store: &ProgressStore, ids: Vec<String>, size: u64, chunk: u64) {
    let handles: Vec<_> = ids
        .into_iter()
        .map(|id| {
            let store = store.clone();
            thread::spawn(move || {
                let mut part = store.track(id);
                let mut done = 0;
                while done < size {
                    done = (done + chunk).min(size);
                    part.update(done, Some(size));
                }
                part.finish();
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}

fn seeded_store(dir: &std::path::Path, downloaded: usize) -> ProgressStore {
    let store = ProgressStore::open_in(dir);
    for n in 0..downloaded {
        let mut part = store.track(id(n));
        part.update(10, Some(10));
        part.finish();
    }
    ProgressStore::open_in(dir)
}

#[test]
fn reset_reports_downloaded_share() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path(), 2);
    store.reset(10);
    assert_eq!(store.progress(), 200);
    assert_eq!(store.count(DownloadStatus::Downloaded), 2);
    assert_eq!(store.count(DownloadStatus::Untracked), 8);
}

#[test]
fn ten_concurrent_segments_reach_full_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProgressStore::open_in(dir.path());
    let recorder = Arc::new(Recorder::default());
    store.set_listener(recorder.clone());
    store.reset(10);

    transfer_all(&store, (0..10).map(id).collect(), 100_000, 4096);

    assert_eq!(store.progress(), 1000);
    assert_eq!(store.count(DownloadStatus::Downloaded), 10);
    let seen = recorder.progress.lock().unwrap();
    assert!(seen.iter().all(|v| *v <= 1000));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {seen:?}");
    assert_eq!(seen.last(), Some(&1000));
}

#[test]
fn resumed_run_with_five_of_eight_finished_reads_700() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path(), 2);
    store.reset(10);

    transfer_all(&store, (2..7).map(id).collect(), 50_000, 1000);

    assert_eq!(store.progress(), 700);
    assert_eq!(store.count(DownloadStatus::Downloaded), 7);
}

#[test]
fn progress_stays_bounded_and_monotonic_with_failures() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProgressStore::open_in(dir.path());
    let recorder = Arc::new(Recorder::default());
    store.set_listener(recorder.clone());
    store.reset(6);

    let handles: Vec<_> = (0..6)
        .map(|n| {
            let store = store.clone();
            thread::spawn(move || {
                let mut part = store.track(id(n));
                let size = 1000 * (n as u64 + 1);
                for step in 1..=10 {
                    part.update(size * step / 10, Some(size));
                }
                if n % 3 == 0 {
                    part.invalidate();
                } else {
                    part.finish();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let seen = recorder.progress.lock().unwrap();
    assert!(seen.iter().all(|v| *v <= 1000));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(store.count(DownloadStatus::Failed), 2);
    assert_eq!(store.count(DownloadStatus::Downloaded), 4);
    assert!(store.progress() <= 1000);
}

#[test]
fn failed_entries_are_persisted_but_dropped_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProgressStore::open_in(dir.path());
    store.reset(2);
    let mut ok = store.track(id(0));
    ok.update(5, Some(5));
    ok.finish();
    let mut bad = store.track(id(1));
    bad.update(3, Some(5));
    bad.invalidate();

    let text = std::fs::read_to_string(dir.path().join(STATUS_FILE_NAME)).unwrap();
    assert!(text.contains("\"FAILED\""));
    assert!(text.contains("\"DOWNLOADED\""));

    let reopened = ProgressStore::open_in(dir.path());
    assert_eq!(reopened.status(&id(0)), DownloadStatus::Downloaded);
    assert_eq!(reopened.status(&id(1)), DownloadStatus::Untracked);
}

#[test]
fn reset_discards_failures_from_this_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProgressStore::open_in(dir.path());
    store.reset(1);
    store.track(id(0)).invalidate();
    assert_eq!(store.status(&id(0)), DownloadStatus::Failed);
    store.reset(1);
    assert_eq!(store.status(&id(0)), DownloadStatus::Untracked);
    assert_eq!(store.count(DownloadStatus::Failed), 0);
}

#[test]
fn terminal_calls_are_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProgressStore::open_in(dir.path());
    let recorder = Arc::new(Recorder::default());
    store.set_listener(recorder.clone());
    store.reset(2);

    let mut part = store.track(id(0));
    part.update(50, Some(100));
    part.finish();
    part.invalidate();
    part.update(100, Some(100));
    assert_eq!(store.status(&id(0)), DownloadStatus::Downloaded);
    assert_eq!(store.progress(), 500);

    let counts = recorder.counts.lock().unwrap();
    assert_eq!(counts.last(), Some(&(DownloadStatus::Downloaded, 1)));
    assert!(!counts.contains(&(DownloadStatus::Failed, 1)));
}

#[test]
fn unknown_length_counts_bytes_seen() {
    let dir = tempfile::tempdir().unwrap();
    let store = ProgressStore::open_in(dir.path());
    store.reset(1);
    let mut part = store.track(id(0));
    part.update(10, None);
    part.update(30, None);
    assert_eq!(part.bytes_so_far(), 30);
    assert_eq!(store.progress(), 1000);
    part.finish();
    assert_eq!(store.progress(), 1000);
}

#[test]
fn forget_removes_record_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(dir.path(), 1);
    store.forget(&id(0));
    assert_eq!(store.status(&id(0)), DownloadStatus::Untracked);
    let reopened = ProgressStore::open_in(dir.path());
    assert_eq!(reopened.count(DownloadStatus::Downloaded), 0);
}

#[test]
fn unwritable_status_file_keeps_memory_state() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be makes the rename fail.
    let path = dir.path().join(STATUS_FILE_NAME);
    std::fs::create_dir_all(path.join("occupied")).unwrap();
    let store = ProgressStore::open(&path, DEFAULT_RESOLUTION);
    store.reset(1);
    let mut part = store.track(id(0));
    part.update(1, Some(1));
    part.finish();
    assert_eq!(store.status(&id(0)), DownloadStatus::Downloaded);
    assert_eq!(store.progress(), 1000);
}
