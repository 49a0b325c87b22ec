// End-to-end lifecycle: create through the manager, publish through the
// sweeper, observe through the manager's listings.

use chrono::{Duration, SecondsFormat};
use postdeck_core::time;
use postdeck_posts::{PostDraft, PostManager, PostPatch, PostState, PostStore};
use postdeck_scheduler::Sweeper;

fn setup() -> (PostManager, Sweeper) {
    let store = PostStore::open_in_memory().expect("open memory db");
    (PostManager::new(store.clone()), Sweeper::new(store))
}

fn ts(offset: Duration) -> String {
    (time::now() + offset).to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[test]
fn overdue_post_is_published_and_archived() {
    let (posts, sweeper) = setup();
    let news = posts.create_category("News").unwrap();
    assert_eq!(news.id, 1);

    let post = posts
        .create(PostDraft::new("Hello", news.id, &ts(-Duration::hours(1))))
        .unwrap();
    assert_eq!(post.state(time::now()), PostState::Due);

    let first = sweeper.sweep().unwrap();
    assert_eq!(first.published, 1);
    assert_eq!(first.post_ids, vec![post.id]);

    let refreshed = posts.get(post.id).unwrap();
    assert!(refreshed.is_posted());
    assert_eq!(refreshed.published_time, Some(first.swept_at));

    let archived = posts.list_archived();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].id, post.id);

    let second = sweeper.sweep().unwrap();
    assert_eq!(second.published, 0);
}

#[test]
fn unarchived_overdue_post_is_picked_up_again() {
    let (posts, sweeper) = setup();
    let cat = posts.create_category("News").unwrap();
    let post = posts
        .create(PostDraft::new("Hello", cat.id, &ts(-Duration::minutes(5))))
        .unwrap();

    assert_eq!(sweeper.sweep().unwrap().published, 1);
    posts.update(post.id, PostPatch::is_posted(false)).unwrap();
    assert!(posts.list_archived().is_empty());

    let again = sweeper.sweep().unwrap();
    assert_eq!(again.post_ids, vec![post.id]);
}

#[test]
fn manually_archived_post_is_not_republished() {
    let (posts, sweeper) = setup();
    let cat = posts.create_category("News").unwrap();
    let post = posts
        .create(PostDraft::new("Hello", cat.id, &ts(-Duration::minutes(5))))
        .unwrap();

    let archived = posts.update(post.id, PostPatch::is_posted(true)).unwrap();
    assert!(sweeper.sweep().unwrap().is_empty());
    assert_eq!(
        posts.get(post.id).unwrap().published_time,
        archived.published_time
    );
}

#[test]
fn rescheduling_into_the_past_makes_a_post_due() {
    let (posts, sweeper) = setup();
    let cat = posts.create_category("News").unwrap();
    let post = posts
        .create(PostDraft::new("Later", cat.id, &ts(Duration::days(2))))
        .unwrap();
    assert!(sweeper.sweep().unwrap().is_empty());

    let patch = PostPatch {
        scheduled_time: Some(ts(-Duration::minutes(1))),
        ..PostPatch::default()
    };
    posts.update(post.id, patch).unwrap();

    let preview = sweeper.preview(time::now()).unwrap();
    assert_eq!(preview.len(), 1);
    assert_eq!(sweeper.sweep().unwrap().post_ids, vec![post.id]);
}
