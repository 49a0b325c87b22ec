// Two handles on one database file, as when the background engine and an
// HTTP-triggered sweep run at the same time.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use postdeck_core::time;
use postdeck_posts::{PostDraft, PostManager, PostStore};
use postdeck_scheduler::{SweepReport, Sweeper};

fn open(path: &str) -> PostStore {
    PostStore::open(path).expect("open db file")
}

fn seed(posts: &PostManager, count: usize, scheduled: DateTime<Utc>) -> Vec<i64> {
    let cat = posts
        .create_category(&format!("cat-{}", scheduled.timestamp_micros()))
        .unwrap();
    let raw = scheduled.to_rfc3339_opts(SecondsFormat::Micros, true);
    (0..count)
        .map(|i| posts.create(PostDraft::new(&format!("post {i}"), cat.id, &raw)).unwrap().id)
        .collect()
}

/// Every claimed post carries the publish instant of the sweep that claimed it.
fn assert_stamped_by(posts: &PostManager, report: &SweepReport) {
    for id in &report.post_ids {
        assert_eq!(posts.get(*id).unwrap().published_time, Some(report.swept_at));
    }
}

#[test]
fn racing_sweeps_never_claim_the_same_post() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("postdeck.db").to_string_lossy().into_owned();
    let posts = PostManager::new(open(&path));
    let base = time::now();
    let ids = seed(&posts, 200, base - Duration::minutes(5));

    let barrier = Arc::new(Barrier::new(2));
    let handles: Vec<_> = [base, base + Duration::seconds(1)]
        .into_iter()
        .map(|now| {
            let sweeper = Sweeper::new(open(&path));
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                sweeper.sweep_at(now).unwrap()
            })
        })
        .collect();
    let reports: Vec<SweepReport> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let first: HashSet<i64> = reports[0].post_ids.iter().copied().collect();
    let second: HashSet<i64> = reports[1].post_ids.iter().copied().collect();
    assert!(first.is_disjoint(&second));
    let claimed: HashSet<i64> = first.union(&second).copied().collect();
    assert_eq!(claimed, ids.into_iter().collect());

    for report in &reports {
        assert_stamped_by(&posts, report);
    }
}

#[test]
fn later_sweep_on_another_handle_leaves_earlier_stamps_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("postdeck.db").to_string_lossy().into_owned();
    let posts = PostManager::new(open(&path));
    let t1 = time::now();
    let t2 = t1 + Duration::minutes(10);

    let early = seed(&posts, 3, t1 - Duration::minutes(1));
    let late = seed(&posts, 2, t1 + Duration::minutes(5));

    let first = Sweeper::new(open(&path)).sweep_at(t1).unwrap();
    let second = Sweeper::new(open(&path)).sweep_at(t2).unwrap();

    assert_eq!(first.post_ids, early);
    assert_eq!(second.post_ids, late);
    assert_stamped_by(&posts, &first);
    assert_stamped_by(&posts, &second);
}
