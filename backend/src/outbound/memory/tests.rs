//! Behaviour of the in-memory adapters.

use chrono::{Duration, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{
    ApplicationStatus, CategoryName, Comment, Description, EmailAddress, ImageKind,
    NewApplication, PersonName, Title, UserDraft, WorkflowError,
};

fn user(name: &str, is_staff: bool) -> User {
    User::new(UserDraft {
        id: UserId::random(),
        username: Username::new(name).expect("valid username"),
        email: EmailAddress::new(format!("{name}@example.com")).expect("valid email"),
        first_name: PersonName::default(),
        last_name: PersonName::default(),
        is_staff,
    })
}

fn digest() -> PasswordDigest {
    PasswordDigest::derive_with_rounds("correct horse", 1)
}

fn category(name: &str) -> Category {
    Category::new(
        CategoryId::random(),
        CategoryName::new(name).expect("valid category"),
    )
}

fn application(owner: &User, category: &Category, title: &str, age_minutes: i64) -> Application {
    Application::submit(NewApplication {
        id: ApplicationId::random(),
        applicant: owner.id().clone(),
        title: Title::new(title).expect("valid title"),
        description: Description::new("Needs a fresh look").expect("valid description"),
        category: category.id(),
        image: ImageLocation::generate(ImageArea::Applications, ImageKind::Png),
        created_at: Utc::now() - Duration::minutes(age_minutes),
    })
}

struct Seeded {
    store: MemoryStore,
    alice: User,
    bob: User,
    posters: Category,
}

#[fixture]
async fn seeded() -> Seeded {
    let store = MemoryStore::new();
    let alice = user("alice", false);
    let bob = user("bob", false);
    let posters = category("Posters");
    UserRepository::insert(&store, &alice, &digest())
        .await
        .expect("insert alice");
    UserRepository::insert(&store, &bob, &digest())
        .await
        .expect("insert bob");
    CategoryRepository::insert(&store, &posters)
        .await
        .expect("insert category");
    Seeded {
        store,
        alice,
        bob,
        posters,
    }
}

#[rstest]
#[tokio::test]
async fn duplicate_usernames_and_emails_are_refused(#[future] seeded: Seeded) {
    let seeded = seeded.await;
    let again = user("alice", false);
    let err = UserRepository::insert(&seeded.store, &again, &digest())
        .await
        .expect_err("duplicate username");
    assert_eq!(err, UserPersistenceError::duplicate_username());

    let same_mail = User::new(UserDraft {
        id: UserId::random(),
        username: Username::new("alice2").expect("valid username"),
        email: seeded.alice.email().clone(),
        first_name: PersonName::default(),
        last_name: PersonName::default(),
        is_staff: false,
    });
    let err = UserRepository::insert(&seeded.store, &same_mail, &digest())
        .await
        .expect_err("duplicate email");
    assert_eq!(err, UserPersistenceError::duplicate_email());
}

#[rstest]
#[tokio::test]
async fn credentials_are_found_by_username(#[future] seeded: Seeded) {
    let seeded = seeded.await;
    let stored = seeded
        .store
        .find_credentials(seeded.bob.username())
        .await
        .expect("lookup")
        .expect("bob exists");
    assert_eq!(stored.user, seeded.bob);
    assert!(stored.digest.verify("correct horse"));
}

#[rstest]
#[tokio::test]
async fn listing_filters_and_orders_newest_first(#[future] seeded: Seeded) {
    let seeded = seeded.await;
    let older = application(&seeded.alice, &seeded.posters, "Festival poster", 30);
    let newer = application(&seeded.alice, &seeded.posters, "Menu card", 5);
    let other = application(&seeded.bob, &seeded.posters, "Logo", 10);
    for app in [&older, &newer, &other] {
        ApplicationRepository::insert(&seeded.store, app)
            .await
            .expect("insert application");
    }

    let all = ApplicationRepository::list(&seeded.store, &ApplicationFilter::default())
        .await
        .expect("list");
    let titles: Vec<&str> = all.iter().map(|app| app.title().as_ref()).collect();
    assert_eq!(titles, ["Menu card", "Logo", "Festival poster"]);

    let mine = ApplicationRepository::list(
        &seeded.store,
        &ApplicationFilter {
            applicant: Some(seeded.alice.id().clone()),
            ..ApplicationFilter::default()
        },
    )
    .await
    .expect("list own");
    assert_eq!(mine.len(), 2);

    let by_username = ApplicationRepository::list(
        &seeded.store,
        &ApplicationFilter {
            query: Some("  BOB ".to_owned()),
            ..ApplicationFilter::default()
        },
    )
    .await
    .expect("search");
    assert_eq!(by_username, vec![other]);
}

#[rstest]
#[tokio::test]
async fn unknown_category_is_refused(#[future] seeded: Seeded) {
    let seeded = seeded.await;
    let stray = application(&seeded.alice, &category("Unsaved"), "Poster", 0);
    let err = ApplicationRepository::insert(&seeded.store, &stray)
        .await
        .expect_err("unknown category");
    assert_eq!(err, ApplicationRepositoryError::unknown_category());
}

#[rstest]
#[tokio::test]
async fn referenced_categories_cannot_be_deleted(#[future] seeded: Seeded) {
    let seeded = seeded.await;
    let app = application(&seeded.alice, &seeded.posters, "Poster", 0);
    ApplicationRepository::insert(&seeded.store, &app)
        .await
        .expect("insert");
    let err = CategoryRepository::delete(&seeded.store, &seeded.posters.id())
        .await
        .expect_err("category in use");
    assert!(matches!(err, CategoryRepositoryError::InUse { .. }));

    let empty = category("Flyers");
    CategoryRepository::insert(&seeded.store, &empty)
        .await
        .expect("insert");
    assert!(
        CategoryRepository::delete(&seeded.store, &empty.id())
            .await
            .expect("delete")
    );
    assert!(
        !CategoryRepository::delete(&seeded.store, &empty.id())
            .await
            .expect("delete twice")
    );
}

#[rstest]
#[tokio::test]
async fn transitions_are_checked_against_the_stored_row(#[future] seeded: Seeded) {
    let seeded = seeded.await;
    let app = application(&seeded.alice, &seeded.posters, "Poster", 0);
    ApplicationRepository::insert(&seeded.store, &app)
        .await
        .expect("insert");
    let reviewer = Principal::staff(UserId::random());

    let command = TransitionCommand {
        requested: ApplicationStatus::InProgress,
        comment: Comment::optional(Some("Started")),
        design_image: None,
        actor: reviewer.clone(),
    };
    let updated = seeded
        .store
        .transition(&app.id(), &command)
        .await
        .expect("transition");
    assert_eq!(updated.application.status(), ApplicationStatus::InProgress);
    assert_eq!(updated.replaced_design, None);

    let back = TransitionCommand {
        requested: ApplicationStatus::New,
        comment: None,
        design_image: None,
        actor: reviewer,
    };
    let err = seeded
        .store
        .transition(&app.id(), &back)
        .await
        .expect_err("locked");
    assert!(matches!(
        err,
        ApplicationRepositoryError::Rejected {
            reason: WorkflowError::TransitionLocked { .. }
        }
    ));
    let stored = ApplicationRepository::find_by_id(&seeded.store, &app.id())
        .await
        .expect("find")
        .expect("present");
    assert_eq!(stored.status(), ApplicationStatus::InProgress);
}

#[rstest]
#[tokio::test]
async fn only_the_owner_deletes_new_applications(#[future] seeded: Seeded) {
    let seeded = seeded.await;
    let app = application(&seeded.alice, &seeded.posters, "Poster", 0);
    ApplicationRepository::insert(&seeded.store, &app)
        .await
        .expect("insert");

    let err = ApplicationRepository::delete(
        &seeded.store,
        &app.id(),
        &Principal::from(&seeded.bob),
    )
    .await
    .expect_err("not the owner");
    assert!(matches!(
        err,
        ApplicationRepositoryError::Rejected {
            reason: WorkflowError::Unauthorized
        }
    ));

    let removed =
        ApplicationRepository::delete(&seeded.store, &app.id(), &Principal::from(&seeded.alice))
            .await
            .expect("owner deletes");
    assert_eq!(removed.id(), app.id());
    let gone = ApplicationRepository::find_by_id(&seeded.store, &app.id())
        .await
        .expect("find");
    assert!(gone.is_none());
}

#[rstest]
#[tokio::test]
async fn favourite_flag_is_persisted(#[future] seeded: Seeded) {
    let seeded = seeded.await;
    let app = application(&seeded.alice, &seeded.posters, "Poster", 0);
    ApplicationRepository::insert(&seeded.store, &app)
        .await
        .expect("insert");
    let updated = seeded
        .store
        .set_favorite(&app.id(), true)
        .await
        .expect("favourite");
    assert!(updated.favorite());

    let missing = seeded
        .store
        .set_favorite(&ApplicationId::random(), true)
        .await
        .expect_err("missing");
    assert!(matches!(missing, ApplicationRepositoryError::NotFound { .. }));
}

#[rstest]
#[tokio::test]
async fn images_round_trip_through_the_memory_store() {
    let images = MemoryImageStore::new();
    let upload = ImageUpload::new("image/png", vec![1, 2, 3]).expect("valid upload");
    let location = images
        .store(ImageArea::Designs, &upload)
        .await
        .expect("store");
    assert_eq!(location.area(), ImageArea::Designs);
    assert_eq!(images.len(), 1);

    let loaded = images
        .load(&location)
        .await
        .expect("load")
        .expect("present");
    assert_eq!(loaded.bytes, vec![1, 2, 3]);
    assert_eq!(loaded.kind, ImageKind::Png);

    images.remove(&location).await.expect("remove");
    images.remove(&location).await.expect("remove twice");
    assert!(images.is_empty());
}
