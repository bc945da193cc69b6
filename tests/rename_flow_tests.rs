//! End-to-end processing of files in a temporary directory.

mod common;

use common::{FakeProvider, ScriptedPrompt, file_names, scrubs, touch};
use renamarr::Error;
use renamarr::config::{Config, LookupErrorPolicy};
use renamarr::library::relocate::Disposition;
use renamarr::services::{Answer, FileOutcome, LookupError, RenameService};
use std::sync::Arc;
use std::sync::atomic::Ordering;

fn service(provider: FakeProvider, configure: impl FnOnce(&mut Config)) -> RenameService {
    let mut config = Config::default();
    configure(&mut config);
    config.validate().unwrap();
    RenameService::new(&config, Arc::new(provider)).unwrap()
}

#[tokio::test]
async fn test_batch_rename() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("scrubs.s01e01.avi"), "one");
    touch(&dir.path().join("scrubs.s01e02.avi"), "two");

    let service = service(scrubs(), |c| c.general.batch = true);
    let mut prompt = ScriptedPrompt::new(&[]);
    let summary = service
        .process_all(&[dir.path().to_path_buf()], &mut prompt)
        .await
        .unwrap();

    assert_eq!(summary.renamed, 2);
    assert!(!summary.has_failures());
    assert!(prompt.asked.is_empty());
    assert_eq!(
        file_names(dir.path()),
        vec![
            "Scrubs - [01x01] - My First Day.avi",
            "Scrubs - [01x02] - My Mentor.avi",
        ]
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("Scrubs - [01x02] - My Mentor.avi")).unwrap(),
        "two"
    );
}

#[tokio::test]
async fn test_always_answer_stops_prompting() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("scrubs.s01e01.avi"), "");
    touch(&dir.path().join("scrubs.s01e02.avi"), "");
    touch(&dir.path().join("scrubs.s01e03.avi"), "");

    let service = service(scrubs(), |_| {});
    let mut prompt = ScriptedPrompt::new(&[Answer::No, Answer::Always]);
    let summary = service
        .process_all(&[dir.path().to_path_buf()], &mut prompt)
        .await
        .unwrap();

    assert_eq!(prompt.asked.len(), 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.renamed, 2);
    assert_eq!(
        file_names(dir.path()),
        vec![
            "Scrubs - [01x02] - My Mentor.avi",
            "Scrubs - [01x03] - My Best Friend's Mistake.avi",
            "scrubs.s01e01.avi",
        ]
    );
}

#[tokio::test]
async fn test_quit_aborts_run() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("scrubs.s01e01.avi"), "");
    touch(&dir.path().join("scrubs.s01e02.avi"), "");

    let service = service(scrubs(), |_| {});
    let mut prompt = ScriptedPrompt::new(&[Answer::Quit]);
    let err = service
        .process_all(&[dir.path().to_path_buf()], &mut prompt)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UserAbort));
    assert_eq!(prompt.asked.len(), 1);
    assert_eq!(
        file_names(dir.path()),
        vec!["scrubs.s01e01.avi", "scrubs.s01e02.avi"]
    );
}

#[tokio::test]
async fn test_lookup_failure_policies() {
    let failing = || FakeProvider::new().failing(|| LookupError::DataRetrieval("offline".to_string()));

    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("scrubs.s01e01.avi"), "");

    let skip = service(failing(), |c| c.general.batch = true);
    let summary = skip
        .process_all(&[dir.path().to_path_buf()], &mut ScriptedPrompt::new(&[]))
        .await
        .unwrap();
    assert_eq!(summary.skipped, 1);
    assert_eq!(file_names(dir.path()), vec!["scrubs.s01e01.avi"]);

    let abort = service(failing(), |c| {
        c.general.batch = true;
        c.general.on_lookup_error = LookupErrorPolicy::Abort;
    });
    let err = abort
        .process_all(&[dir.path().to_path_buf()], &mut ScriptedPrompt::new(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Lookup(LookupError::DataRetrieval(_))));
    assert_eq!(file_names(dir.path()), vec!["scrubs.s01e01.avi"]);

    let proceed = service(failing(), |c| {
        c.general.batch = true;
        c.general.on_lookup_error = LookupErrorPolicy::Proceed;
    });
    let summary = proceed
        .process_all(&[dir.path().to_path_buf()], &mut ScriptedPrompt::new(&[]))
        .await
        .unwrap();
    assert_eq!(summary.renamed, 1);
    assert_eq!(file_names(dir.path()), vec!["scrubs - [01x01].avi"]);
}

#[tokio::test]
async fn test_interactive_lookup_failure_still_prompts() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("unknown.s02e05.avi"), "");

    let service = service(scrubs(), |_| {});
    let mut prompt = ScriptedPrompt::new(&[Answer::Yes]);
    let summary = service
        .process_all(&[dir.path().to_path_buf()], &mut prompt)
        .await
        .unwrap();

    assert_eq!(prompt.asked.len(), 1);
    assert_eq!(summary.renamed, 1);
    assert_eq!(file_names(dir.path()), vec!["unknown - [02x05].avi"]);
}

#[tokio::test]
async fn test_correct_name_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("Scrubs - [01x01] - My First Day.avi"), "");

    let service = service(scrubs(), |c| c.general.batch = true);
    let summary = service
        .process_all(&[dir.path().to_path_buf()], &mut ScriptedPrompt::new(&[]))
        .await
        .unwrap();

    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.renamed, 0);
}

#[tokio::test]
async fn test_dry_run_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("scrubs.s01e04.avi"), "");

    let service = service(scrubs(), |c| c.general.dry_run = true);
    let mut prompt = ScriptedPrompt::new(&[]);
    let summary = service
        .process_all(&[dir.path().to_path_buf()], &mut prompt)
        .await
        .unwrap();

    assert_eq!(summary.previewed, 1);
    assert!(prompt.asked.is_empty());
    assert_eq!(file_names(dir.path()), vec!["scrubs.s01e04.avi"]);
}

#[tokio::test]
async fn test_move_into_series_directory() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("incoming/scrubs.s01e02.avi"), "");

    let library = dir.path().join("library");
    let destination = format!("{}/%(seriesname)s/Season %(seasonnumber)d", library.display());
    let service = service(scrubs(), |c| {
        c.general.batch = true;
        c.relocation.enable = true;
        c.relocation.destination = destination;
    });

    let episodes = service
        .collect_episodes(&[dir.path().join("incoming/scrubs.s01e02.avi")])
        .unwrap();
    let episode = episodes.into_iter().next().unwrap();
    let (outcome, _) = service
        .process_file(episode, Default::default(), &mut ScriptedPrompt::new(&[]))
        .await
        .unwrap();

    let relocation = match outcome {
        FileOutcome::Renamed(relocation) => relocation,
        other => panic!("expected a rename, got {other:?}"),
    };
    assert_eq!(relocation.disposition, Disposition::Renamed);
    assert_eq!(
        relocation.destination,
        library.join("Scrubs/Season 1/Scrubs - [01x02] - My Mentor.avi")
    );
    assert!(relocation.destination.is_file());
    assert!(file_names(&dir.path().join("incoming")).is_empty());
}

#[tokio::test]
async fn test_existing_destination_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("scrubs.s01e01.avi"), "new");
    touch(&dir.path().join("Scrubs - [01x01] - My First Day.avi"), "old");

    let service = service(scrubs(), |c| c.general.batch = true);
    let episodes = service
        .collect_episodes(&[dir.path().join("scrubs.s01e01.avi")])
        .unwrap();
    let (outcome, _) = service
        .process_file(
            episodes.into_iter().next().unwrap(),
            Default::default(),
            &mut ScriptedPrompt::new(&[]),
        )
        .await
        .unwrap();

    assert!(matches!(outcome, FileOutcome::Failed { error: Error::Filesystem(_), .. }));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("scrubs.s01e01.avi")).unwrap(),
        "new"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("Scrubs - [01x01] - My First Day.avi")).unwrap(),
        "old"
    );
}

#[tokio::test]
async fn test_anime_uses_absolute_numbers() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("[ANBU-AonE]_Naruto_43_[3811CBB5].avi"), "");

    let episodes: Vec<(u32, u32, &str)> = (1..=43)
        .map(|n| {
            let title = if n == 43 {
                "Killer Kunoichi and a Shaky Shikamaru"
            } else {
                "Filler"
            };
            (1, n, title)
        })
        .collect();
    let provider = FakeProvider::new().with_series(78857, "Naruto", &episodes);

    let service = service(provider, |c| c.general.batch = true);
    service
        .process_all(&[dir.path().to_path_buf()], &mut ScriptedPrompt::new(&[]))
        .await
        .unwrap();

    assert_eq!(
        file_names(dir.path()),
        vec!["[ANBU-AonE] Naruto - 43 - Killer Kunoichi and a Shaky Shikamaru [3811CBB5].avi"]
    );
}

#[tokio::test]
async fn test_series_id_override() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("s01e03.avi"), "");

    let provider = scrubs();
    let service = service(provider, |c| {
        c.general.batch = true;
        c.metadata.series_id = Some(76156);
    });
    service
        .process_all(&[dir.path().to_path_buf()], &mut ScriptedPrompt::new(&[]))
        .await
        .unwrap();

    assert_eq!(
        file_names(dir.path()),
        vec!["Scrubs - [01x03] - My Best Friend's Mistake.avi"]
    );
}

#[tokio::test]
async fn test_unparsable_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("notes.txt"), "");

    let provider = scrubs();
    let service = service(provider, |c| c.general.batch = true);
    let err = service
        .process_all(&[dir.path().to_path_buf()], &mut ScriptedPrompt::new(&[]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoValidFiles));
}

#[tokio::test]
async fn test_provider_called_once_per_file() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("scrubs.s01e01.avi"), "");
    touch(&dir.path().join("scrubs.s01e02.avi"), "");

    let provider = Arc::new(scrubs());
    let mut config = Config::default();
    config.general.batch = true;
    config.general.dry_run = true;
    let service = RenameService::new(&config, provider.clone()).unwrap();

    service
        .process_all(&[dir.path().to_path_buf()], &mut ScriptedPrompt::new(&[]))
        .await
        .unwrap();
    assert_eq!(provider.lookups.load(Ordering::SeqCst), 2);
}
