use learning_platform::{
    auth::{hash_password, verify_password},
    fallbacks::{fallback_problems, fallback_roadmap},
    Database, ProblemDraft, User,
};
use uuid::Uuid;

async fn setup_database() -> Database {
    Database::new("sqlite::memory:").await.unwrap()
}

async fn create_user(db: &Database, email: &str) -> User {
    db.create_user("Learner", email, &hash_password("secret"), Some("Python"))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_user_lookup_by_email() {
    let db = setup_database().await;
    let user = create_user(&db, "learner@example.com").await;

    let found = db
        .find_user_by_email("learner@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);
    assert_eq!(found.interest.as_deref(), Some("Python"));
    assert!(verify_password("secret", &found.password_hash));

    assert!(db
        .find_user_by_email("missing@example.com")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let db = setup_database().await;
    create_user(&db, "learner@example.com").await;

    let result = db
        .create_user("Twin", "learner@example.com", &hash_password("other"), None)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_quiz_records_newest_first() {
    let db = setup_database().await;
    let user = create_user(&db, "learner@example.com").await;
    let other = create_user(&db, "other@example.com").await;

    db.create_quiz_record(user.id, "Python", "3/5").await.unwrap();
    db.create_quiz_record(user.id, "SQL", "5/5").await.unwrap();
    db.create_quiz_record(other.id, "Java", "1/5").await.unwrap();

    let records = db.list_quiz_records_by_user(user.id).await.unwrap();
    let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["SQL", "Python"]);
    assert_eq!(records[0].score, "5/5");
}

#[tokio::test]
async fn test_roadmap_round_trip_and_update() {
    let db = setup_database().await;
    let user = create_user(&db, "learner@example.com").await;

    let created = db
        .create_roadmap_record(&user, &fallback_roadmap("Python"))
        .await
        .unwrap();
    assert_eq!(created.email, "learner@example.com");
    assert_eq!(created.lessons, 12);
    assert_eq!(created.progress, 0);

    let mut stored = db.get_roadmap_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(stored.roadmap, created.roadmap);
    assert_eq!(stored.created_at.timestamp(), created.created_at.timestamp());

    stored.set_module_completed(2, 3, true).unwrap();
    db.update_roadmap_record(&stored).await.unwrap();

    let reloaded = db.get_roadmap_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(reloaded.completed, 1);
    assert_eq!(reloaded.progress, 8);
    assert!(reloaded.roadmap[2].modules[3].completed);

    assert!(db.get_roadmap_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_updating_missing_roadmap_fails() {
    let db = setup_database().await;
    let user = create_user(&db, "learner@example.com").await;
    let mut roadmap = db
        .create_roadmap_record(&user, &fallback_roadmap("Go"))
        .await
        .unwrap();

    roadmap.id = Uuid::new_v4();
    assert!(db.update_roadmap_record(&roadmap).await.is_err());
}

#[tokio::test]
async fn test_roadmaps_listed_newest_first() {
    let db = setup_database().await;
    let user = create_user(&db, "learner@example.com").await;

    for language in ["Python", "Go", "Rust"] {
        db.create_roadmap_record(&user, &fallback_roadmap(language))
            .await
            .unwrap();
    }

    let roadmaps = db.list_roadmaps_by_user(user.id).await.unwrap();
    let names: Vec<_> = roadmaps.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Rust Fundamentals", "Go Fundamentals", "Python Fundamentals"]
    );
}

#[tokio::test]
async fn test_problems_scoped_and_in_creation_order() {
    let db = setup_database().await;
    let user = create_user(&db, "learner@example.com").await;
    let other = create_user(&db, "other@example.com").await;

    let drafts = fallback_problems();
    for draft in &drafts {
        db.create_problem_record(user.id, draft).await.unwrap();
    }

    let problems = db.list_problems_by_user(user.id).await.unwrap();
    assert_eq!(problems.len(), drafts.len());
    for (problem, draft) in problems.iter().zip(&drafts) {
        assert_eq!(problem.title, draft.title);
        assert_eq!(problem.examples, draft.examples);
        assert!(!problem.solved);
    }

    let first = &problems[0];
    assert!(db.get_problem_by_id(first.id, other.id).await.unwrap().is_none());
    assert!(db.list_problems_by_user(other.id).await.unwrap().is_empty());

    let mut solved = db.get_problem_by_id(first.id, user.id).await.unwrap().unwrap();
    solved.solved = true;
    db.update_problem_record(&solved).await.unwrap();

    let reloaded = db.get_problem_by_id(first.id, user.id).await.unwrap().unwrap();
    assert!(reloaded.solved);
}

#[tokio::test]
async fn test_problem_batch_is_all_or_nothing() {
    let db = setup_database().await;
    let user = create_user(&db, "learner@example.com").await;

    let mut drafts = fallback_problems();
    drafts[2] = ProblemDraft {
        title: String::new(),
        ..drafts[2].clone()
    };

    assert!(db.create_problem_records(user.id, &drafts).await.is_err());
    assert!(db.list_problems_by_user(user.id).await.unwrap().is_empty());

    let stored = db
        .create_problem_records(user.id, &fallback_problems())
        .await
        .unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(db.list_problems_by_user(user.id).await.unwrap().len(), 4);
}
